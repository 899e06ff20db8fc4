use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use polyapi_core::ast::{BackendHandledDocument, RoleBindingDocument, SchemaDocument};
use polyapi_core::config::GeneratorConfig;
use polyapi_core::generator::{analyze_documents, write_artifacts, Generator};
use polyapi_core::parser;
use polyapi_core::profiles::ProfileKind;
use polyapi_core::AnalyzedSchema;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Schema document (JSON)
    #[arg(short, long)]
    schema: PathBuf,

    /// Role binding document (JSON)
    #[arg(short, long)]
    roles: PathBuf,

    /// Backend-handled columns document (JSON)
    #[arg(short, long)]
    backend_columns: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every configured profile and the auxiliary documents
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Generator configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Profile to render; repeat for several. Replaces the configured list
        #[arg(short, long, value_enum)]
        profile: Vec<ProfileKind>,

        /// Enable the look-aside cache in emitted resolvers
        #[arg(long)]
        cache: bool,

        /// Default page size of list queries
        #[arg(long)]
        page_limit: Option<u64>,

        /// Skip the field configuration, label and manual documents
        #[arg(long)]
        no_docs: bool,
    },
    /// Print the analyzed schema as JSON
    Analyze {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn load_schema(input: &InputArgs) -> Result<AnalyzedSchema> {
    let schema: SchemaDocument = parser::load_schema(&input.schema)
        .with_context(|| format!("Failed to load schema from {}", input.schema.display()))?;
    let roles: RoleBindingDocument = parser::load_roles(&input.roles)
        .with_context(|| format!("Failed to load role binding from {}", input.roles.display()))?;
    let backend: BackendHandledDocument = match &input.backend_columns {
        Some(path) => parser::load_backend_columns(path)
            .with_context(|| format!("Failed to load backend-handled columns from {}", path.display()))?,
        None => BackendHandledDocument::default(),
    };

    analyze_documents(&schema, &roles, &backend).context("Schema analysis failed")
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            config,
            out,
            profile,
            cache,
            page_limit,
            no_docs,
        } => {
            let mut config = load_config(config.as_deref())?;
            if !profile.is_empty() {
                config.profiles = profile;
            }
            if cache {
                config.look_aside_cache = true;
            }
            if let Some(limit) = page_limit {
                config.default_page_limit = limit;
            }
            if no_docs {
                config.emit_documents = false;
            }

            let schema = load_schema(&input)?;
            let output = Generator::new(config)
                .generate(&schema)
                .context("Generation failed")?;
            let written = write_artifacts(&out, &output.artifacts)
                .with_context(|| format!("Failed to write artifacts to {}", out.display()))?;

            log::info!("wrote {} files to {}", written.len(), out.display());
        }
        Commands::Analyze { input } => {
            let schema = load_schema(&input)?;
            let json = serde_json::to_string_pretty(&schema).context("Failed to serialize analyzed schema")?;
            println!("{}", json);
        }
    }

    Ok(())
}
