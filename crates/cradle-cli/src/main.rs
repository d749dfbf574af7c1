//! cradle CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use cradle_core::source::catalog::{demo_keys, DEMO_APIS};
use cradle_core::{
    archive_file_name, project_dir_name, Config, GenerationOutcome, Selection, Session, SourceMode,
    TemplateKind,
};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_FILE: &str = "cradle.yaml";
const CUSTOM_CHOICE: &str = "Custom requirement";
const DEFAULT_REQUIREMENT: &str = "I want a simple API that manages tasks.";

#[derive(Parser)]
#[command(name = "cradle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in demo APIs and their endpoints
    Demos,
    /// Generate an OpenAPI document, server scaffold and client demo
    Generate {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        options: GenerateOptions,
    },
    /// Pick a demo or type a requirement, then generate
    Interactive {
        #[command(flatten)]
        options: GenerateOptions,
    },
    /// Write the default configuration file
    InitConfig {
        /// Where to write the configuration
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SelectionArgs {
    /// Key of a built-in demo API (see `cradle demos`)
    #[arg(long)]
    demo: Option<String>,
    /// Free-text requirement sent to the configured providers
    #[arg(long)]
    prompt: Option<String>,
}

impl SelectionArgs {
    fn into_selection(self) -> Selection {
        match (self.demo, self.prompt) {
            (Some(key), _) => Selection::Demo(key),
            (None, Some(text)) => Selection::Custom(text),
            (None, None) => Selection::Custom(String::new()),
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateOptions {
    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// What to do when providers fail: fallback or strict
    #[arg(long)]
    mode: Option<SourceMode>,
    /// Server template (python_fastapi, rust_axum)
    #[arg(long)]
    server_template: Option<TemplateKind>,
    /// Client template (python_requests, curl)
    #[arg(long)]
    client_template: Option<TemplateKind>,
    /// Directory overriding built-in templates
    #[arg(long)]
    template_dir: Option<PathBuf>,
    /// Output directory (default: API name with spaces replaced by `_`, other
    /// characters outside `[A-Za-z0-9_-]` dropped)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Also write a zip archive, optionally at the given path
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    archive: Option<Option<PathBuf>>,
    /// Print every generated file to stdout
    #[arg(long)]
    print: bool,
}

impl GenerateOptions {
    /// Config file, then environment, then flags
    async fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };
        config.apply_env_overrides();

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(kind) = self.server_template {
            config.server_template = kind;
        }
        if let Some(kind) = self.client_template {
            config.client_template = kind;
        }
        if let Some(dir) = &self.template_dir {
            config.template_dir = Some(dir.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Demos => list_demos(),
        Commands::Generate { selection, options } => {
            generate(selection.into_selection(), &options).await
        }
        Commands::Interactive { options } => {
            let selection = prompt_selection()?;
            generate(selection, &options).await
        }
        Commands::InitConfig { path, force } => init_config(&path, force).await,
    }
}

fn init_logging(verbose: u8) {
    let base_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| match verbose {
        0 => "info".to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    });
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn list_demos() -> anyhow::Result<()> {
    for demo in DEMO_APIS {
        println!("{}", demo.key);
        for endpoint in demo.endpoints {
            println!(
                "  {:<6} {:<12} {} ({})",
                endpoint.method.as_upper(),
                endpoint.path,
                endpoint.summary,
                endpoint.function_name
            );
        }
    }
    Ok(())
}

fn prompt_selection() -> anyhow::Result<Selection> {
    let theme = ColorfulTheme::default();
    let mut items: Vec<&str> = demo_keys().collect();
    items.push(CUSTOM_CHOICE);

    let choice = Select::with_theme(&theme)
        .with_prompt("Choose Demo API")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to read selection")?;

    if items[choice] == CUSTOM_CHOICE {
        let text: String = Input::with_theme(&theme)
            .with_prompt("Enter requirement")
            .default(DEFAULT_REQUIREMENT.to_string())
            .allow_empty(true)
            .interact_text()
            .context("Failed to read requirement")?;
        Ok(Selection::Custom(text))
    } else {
        Ok(Selection::Demo(items[choice].to_string()))
    }
}

async fn generate(selection: Selection, options: &GenerateOptions) -> anyhow::Result<()> {
    let config = options.load_config().await?;
    tracing::debug!(
        "Generating with mode={}, server={}, client={}",
        config.mode,
        config.server_template,
        config.client_template
    );

    let mut session = Session::from_config(&config)
        .await
        .context("Failed to prepare generation")?;
    let outcome = session.generate_for(selection).await?;
    write_outcome(outcome, options).await
}

async fn write_outcome(outcome: &GenerationOutcome, options: &GenerateOptions) -> anyhow::Result<()> {
    for note in &outcome.notes {
        eprintln!("Note: {}", note);
    }

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(project_dir_name(&outcome.descriptor.name)));
    outcome
        .artifacts
        .write_to_dir(&output_dir)
        .await
        .with_context(|| format!("Failed to write files to {}", output_dir.display()))?;
    println!(
        "Generated {} ({} endpoints) in {}",
        outcome.descriptor.name,
        outcome.endpoints.len(),
        output_dir.display()
    );
    for name in outcome.artifacts.file_names() {
        println!("  {}", name);
    }

    if let Some(archive) = &options.archive {
        let path = archive_path(archive.as_deref(), &outcome.descriptor.name);
        let bytes = outcome.artifacts.to_zip()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write archive {}", path.display()))?;
        println!("Archive: {}", path.display());
    }

    if options.print {
        for artifact in outcome.artifacts.iter() {
            println!("\n==> {} <==\n{}", artifact.name, artifact.content);
        }
    }

    println!("\nTry API now (simulated):");
    for response in &outcome.simulated_responses {
        println!("{}", serde_json::to_string(response)?);
    }
    Ok(())
}

/// An explicit directory gets the default archive name inside it
fn archive_path(requested: Option<&Path>, api_name: &str) -> PathBuf {
    match requested {
        Some(path) if path.is_dir() => path.join(archive_file_name(api_name)),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(archive_file_name(api_name)),
    }
}

async fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    Config::default()
        .save(path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
