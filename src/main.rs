use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use codementor::config::Config;
use codementor::model::RequestKind;
use codementor::model::gemini::GeminiProvider;
use codementor::render;
use codementor::repl;
use codementor::review::{ReviewService, schema};
use codementor::session::Workbench;

#[derive(Parser)]
#[command(name = "codementor", version, about = "Code review and execution tracing tutor")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = "")]
    config: String,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a source file
    Analyze {
        file: PathBuf,
        /// Print the parsed reply as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate the execution of a source file
    Trace {
        file: PathBuf,
        /// Print every step and exit
        #[arg(long)]
        all: bool,
    },
    /// Interactive session
    Session { file: Option<PathBuf> },
    /// Print the response schema declared for a request kind
    Schema {
        kind: SchemaKind,
        /// Generate a JSON Schema from the Rust types instead
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Analysis,
    Trace,
    Refine,
}

impl From<SchemaKind> for RequestKind {
    fn from(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::Analysis => RequestKind::Analyze,
            SchemaKind::Trace => RequestKind::Trace,
            SchemaKind::Refine => RequestKind::Refine,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_workbench(config: &Config) -> Result<Workbench> {
    let provider = GeminiProvider::from_config(config).context("failed to build HTTP client")?;
    if !provider.has_credentials() {
        warn!(
            "No API key found in {}; model requests will fail",
            config.key_sources()
        );
    }
    info!("Using model {}", config.model.name);
    let service = ReviewService::new(Arc::new(provider), config.generation);
    Ok(Workbench::new(service))
}

async fn load(workbench: &Workbench, file: &Path) -> Result<()> {
    workbench
        .session()
        .await
        .editor
        .load_file(file)
        .with_context(|| format!("cannot load {}", file.display()))
}

/// The REPL, ended by `quit`, end of input or Ctrl-C.
async fn interactive(workbench: &Workbench) -> Result<()> {
    tokio::select! {
        res = repl::run(workbench) => res,
        _ = tokio::signal::ctrl_c() => {
            println!();
            Ok(())
        }
    }
}

async fn run_analyze(workbench: &Workbench, file: &Path, json: bool) -> Result<()> {
    load(workbench, file).await?;
    if let repl::Flow::Continue(text) = repl::execute(workbench, repl::Command::Analyze).await {
        let session = workbench.session().await;
        match session.analysis().data() {
            Some(result) if json => println!("{}", serde_json::to_string_pretty(result)?),
            Some(_) => println!("{text}"),
            None => bail!("{}", session.error_message().unwrap_or(text.as_str())),
        }
    }
    Ok(())
}

async fn run_trace(workbench: &Workbench, file: &Path, all: bool) -> Result<()> {
    load(workbench, file).await?;
    if let repl::Flow::Continue(text) = repl::execute(workbench, repl::Command::Trace).await {
        let session = workbench.session().await;
        match session.trace().data() {
            Some(stepper) if all => {
                println!("{}", render::render_full_trace(stepper));
                return Ok(());
            }
            Some(_) => println!("{text}"),
            None => bail!("{}", session.error_message().unwrap_or(text.as_str())),
        }
    }
    interactive(workbench).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Schema { kind, json_schema } = cli.command {
        let kind = RequestKind::from(kind);
        let schema = if json_schema {
            schema::json_schema_for(kind)
        } else {
            schema::schema_for(kind)
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;
    let workbench = build_workbench(&config)?;

    match cli.command {
        Commands::Analyze { file, json } => run_analyze(&workbench, &file, json).await,
        Commands::Trace { file, all } => run_trace(&workbench, &file, all).await,
        Commands::Session { file } => {
            if let Some(file) = file {
                load(&workbench, &file).await?;
            }
            interactive(&workbench).await
        }
        Commands::Schema { .. } => Ok(()),
    }
}
