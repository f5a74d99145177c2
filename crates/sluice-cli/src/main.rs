//! `sluice`: inspect configs and fire their lifecycle events by hand.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use sluice_config::logging::{init_logging, LoggingConfig};
use sluice_config::{ConfigLoader, RootConfig};

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "Inspect sluice pipeline configs", long_about = None)]
struct Cli {
    /// Log filter in env_logger syntax, e.g. "debug" or "sluice_config=trace"
    #[arg(long, env = "SLUICE_LOG", global = true)]
    log: Option<String>,

    /// System property, value read as YAML (e.g. -X log_level=debug)
    #[arg(short = 'X', value_name = "KEY=VALUE", global = true)]
    system: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a config (DSL, JSON or YAML) and print its tree as JSON
    Check {
        /// Path to the config file
        path: PathBuf,
        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Fire a lifecycle event of a DSL config and print what the callback built
    Fire {
        /// Path to the DSL config file
        path: PathBuf,
        /// Event name: "start" or "complete"
        event: String,
        /// JSON value forwarded to the callback
        payload: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let system = system_config(&cli.system)?;
    let mut logging = LoggingConfig::from_system(&system);
    if let Some(filter) = cli.log {
        logging = logging.with_filter(filter);
    }
    init_logging(logging);
    log::debug!("system config: {}", Value::Object(system));

    match cli.command {
        Commands::Check { path, compact } => {
            println!("{}", check(&path, compact)?);
        }
        Commands::Fire { path, event, payload } => {
            let config = ConfigLoader::new().load_root(&path)?;
            match fire(&config, &event, payload.as_deref())? {
                Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                None => log::info!("event '{}' returned nothing", event),
            }
        }
    }
    Ok(())
}

fn check(path: &Path, compact: bool) -> anyhow::Result<String> {
    let exec = ConfigLoader::new()
        .from_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    log::info!(
        "loaded {}: {} top-level entries, event hook: {}",
        path.display(),
        exec.source().len(),
        if exec.event().is_some() { "yes" } else { "no" }
    );

    let tree = Value::Object(exec.into_source());
    let out = if compact {
        serde_json::to_string(&tree)?
    } else {
        serde_json::to_string_pretty(&tree)?
    };
    Ok(out)
}

/// Collect `-X key=value` properties into a system config.
fn system_config(props: &[String]) -> anyhow::Result<Map<String, Value>> {
    let pairs = props
        .iter()
        .map(|p| p.split_once('=').with_context(|| format!("expected KEY=VALUE, got {:?}", p)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(ConfigLoader::new().from_properties(pairs, "")?)
}

fn fire(config: &RootConfig, event: &str, payload: Option<&str>) -> anyhow::Result<Option<Value>> {
    let args: Vec<Value> = match payload {
        Some(p) => vec![serde_json::from_str(p).context("payload is not valid JSON")?],
        None => Vec::new(),
    };
    log::info!("Run event: '{}'", event);
    config.dispatch_event(event, &args)
}
