use serde::Serialize;

/// A rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputArtifact {
    pub relative_path: String,
    pub text_content: String,
}

impl OutputArtifact {
    pub fn new(relative_path: impl Into<String>, text_content: impl Into<String>) -> Self {
        OutputArtifact {
            relative_path: relative_path.into(),
            text_content: text_content.into(),
        }
    }
}
