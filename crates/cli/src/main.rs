mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use ward_engine::EvaluationMode;

use crate::{
    commands::{OutputFormat, RunRequest, build_store, parse_override_value, render_resolve, render_trace},
    config::WardConfig,
};

#[derive(Debug, Parser)]
#[command(name = "ward", version, about = "Resolve compliance profile attributes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every attribute of a profile with its resolved value
    Resolve(SourceArgs),
    /// Print the contribution history of one attribute
    Trace {
        #[command(flatten)]
        source: SourceArgs,
        /// Attribute to trace
        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Profile whose attributes are resolved
    #[arg(long)]
    profile: String,
    /// Attribute file (YAML or JSON); may be repeated
    #[arg(long = "attrs", value_name = "FILE")]
    attrs: Vec<PathBuf>,
    /// Profile alias as ALIAS=CANONICAL; may be repeated
    #[arg(long = "alias", value_name = "ALIAS=CANONICAL", value_parser = parse_key_value)]
    aliases: Vec<(String, String)>,
    /// Attribute value as NAME=VALUE (VALUE parsed as JSON when possible); may be repeated
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    overrides: Vec<(String, String)>,
    /// exec enforces required attributes; check tolerates missing values
    #[arg(long)]
    mode: Option<EvaluationMode>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = WardConfig::load();

    let output = match cli.command {
        Command::Resolve(source) => {
            let format = source.format;
            let request = run_request(&config, source);
            let mut store = build_store(&request)?;
            render_resolve(&mut store, &request.profile, format)?
        }
        Command::Trace { source, name } => {
            let format = source.format;
            let request = run_request(&config, source);
            let store = build_store(&request)?;
            render_trace(&store, &request.profile, &name, format)?
        }
    };
    print!("{}", output);
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Merges config defaults with command-line arguments; flags come last and win.
fn run_request(config: &WardConfig, source: SourceArgs) -> RunRequest {
    let mut attrs = config.attrs.clone();
    attrs.extend(source.attrs);

    let mut aliases: Vec<(String, String)> = config
        .aliases
        .iter()
        .map(|(alias, canonical)| (alias.clone(), canonical.clone()))
        .collect();
    aliases.extend(source.aliases);

    RunRequest {
        profile: source.profile,
        attrs,
        aliases,
        overrides: source
            .overrides
            .into_iter()
            .map(|(name, raw)| (name, parse_override_value(&raw)))
            .collect(),
        mode: source.mode.or(config.mode).unwrap_or_default(),
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
