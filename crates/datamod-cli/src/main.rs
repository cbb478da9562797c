mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use datamod::common::{default_mods_dir, default_settings_path};
use datamod::{JsonContentRegistry, Pipeline, RunOutcome, Settings};

#[derive(Parser, Debug)]
#[command(name = "datamod", about = "Discover, validate and load data-only packages")]
struct Args {
    /// Directories whose subdirectories hold packages
    roots: Vec<PathBuf>,

    /// Settings file (defaults to ~/.datamod/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host version to check declared bounds against
    #[arg(long)]
    host_version: Option<String>,

    /// Declaration filename to look for in each package directory
    #[arg(long)]
    declaration_file: Option<String>,

    /// Skip loading, as if disabled in settings
    #[arg(long)]
    disable: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    let mut pipeline = Pipeline::from_settings(&settings).context("invalid settings")?;
    for root in &args.roots {
        pipeline
            .add_search_root(root)
            .with_context(|| format!("failed to add search root {}", root.display()))?;
    }

    if args.roots.is_empty() && settings.search_roots.is_empty() {
        if let Ok(mods) = default_mods_dir() {
            tracing::info!("No search roots given, using {:?}", mods);
            pipeline.add_search_root(mods)?;
        }
    }

    let mut content = JsonContentRegistry::new();
    match pipeline.run(&mut content)? {
        RunOutcome::Completed(report) => {
            let accepted = pipeline
                .accepted()
                .context("pipeline completed without an accepted map")?;
            if args.json {
                println!("{}", output::to_json(accepted, &report)?);
            } else {
                print!("{}", output::to_text(accepted, &report));
            }
        }
        RunOutcome::Disabled => {
            if args.json {
                println!("{}", serde_json::json!({ "disabled": true }));
            } else {
                println!("Data-only packages are disabled.");
            }
        }
        RunOutcome::AlreadyProcessed => {
            tracing::warn!("Packages were already processed; nothing to report");
        }
    }

    Ok(())
}

/// Settings file plus command-line overrides
fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => match default_settings_path() {
            Ok(path) => Settings::load_or_default(&path)?,
            Err(_) => Settings::default(),
        },
    };

    if let Some(version) = &args.host_version {
        settings.host_version = Some(version.clone());
    }
    if let Some(filename) = &args.declaration_file {
        settings.declaration_filename = filename.clone();
    }
    if args.disable {
        settings.enable_data_only_mods = false;
    }
    Ok(settings)
}
