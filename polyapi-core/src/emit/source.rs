//! A small structured model of a source file.
//!
//! Profiles build a [`SourceFile`] out of [`Stmt`]s and never concatenate
//! indentation themselves; [`SourceFile::render`] owns layout.

use super::artifact::OutputArtifact;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// One line, indented at the current depth
    Line(String),
    /// An empty line
    Blank,
    /// A line comment using the style's prefix
    Comment(String),
    /// Multi-line text written verbatim, without indentation
    Raw(String),
    /// `open`, then `body` one level deeper, then `close`
    Block {
        open: String,
        body: Vec<Stmt>,
        close: String,
    },
}

impl Stmt {
    pub fn line(text: impl Into<String>) -> Stmt {
        Stmt::Line(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Stmt {
        Stmt::Comment(text.into())
    }

    pub fn raw(text: impl Into<String>) -> Stmt {
        Stmt::Raw(text.into())
    }

    pub fn block(open: impl Into<String>, body: Vec<Stmt>, close: impl Into<String>) -> Stmt {
        Stmt::Block {
            open: open.into(),
            body,
            close: close.into(),
        }
    }
}

/// Per-language layout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub indent: &'static str,
    pub comment: &'static str,
}

pub const PHP_STYLE: Style = Style {
    indent: "    ",
    comment: "//",
};

pub const JS_STYLE: Style = Style {
    indent: "  ",
    comment: "//",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub statements: Vec<Stmt>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>) -> Self {
        SourceFile {
            path: path.into(),
            statements: Vec::new(),
        }
    }

    pub fn push(&mut self, stmt: Stmt) -> &mut Self {
        self.statements.push(stmt);
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Stmt::line(text))
    }

    pub fn blank(&mut self) -> &mut Self {
        self.push(Stmt::Blank)
    }

    pub fn extend(&mut self, stmts: impl IntoIterator<Item = Stmt>) -> &mut Self {
        self.statements.extend(stmts);
        self
    }

    pub fn render(&self, style: &Style) -> OutputArtifact {
        let mut out = String::new();
        for stmt in &self.statements {
            render_stmt(stmt, style, 0, &mut out);
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        OutputArtifact::new(self.path.clone(), out)
    }
}

fn render_stmt(stmt: &Stmt, style: &Style, depth: usize, out: &mut String) {
    match stmt {
        Stmt::Line(text) => push_line(text, style, depth, out),
        Stmt::Blank => out.push('\n'),
        Stmt::Comment(text) => {
            for line in text.lines() {
                push_line(&format!("{} {}", style.comment, line), style, depth, out);
            }
        }
        Stmt::Raw(text) => {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        Stmt::Block { open, body, close } => {
            push_line(open, style, depth, out);
            for inner in body {
                render_stmt(inner, style, depth + 1, out);
            }
            push_line(close, style, depth, out);
        }
    }
}

fn push_line(text: &str, style: &Style, depth: usize, out: &mut String) {
    if text.is_empty() {
        out.push('\n');
        return;
    }
    for _ in 0..depth {
        out.push_str(style.indent);
    }
    out.push_str(text.trim_end());
    out.push('\n');
}
