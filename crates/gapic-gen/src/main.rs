//! CLI for `gapic-gen`.
//!
//! Builds the unified API model from a Protobuf, `OpenAPI` or Discovery
//! source and prints it.
//!
//! # Subcommands
//!
//! ```text
//! # Everything from a config file
//! gapic-gen model --config gapic-gen.toml
//!
//! # Or from flags, dumping the whole model as YAML
//! gapic-gen model \
//!   --specification-format protobuf \
//!   --specification-source google/cloud/secretmanager/v1 \
//!   --service-config googleapis/google/cloud/secretmanager/v1/secretmanager_v1.yaml \
//!   --source googleapis-root=googleapis \
//!   --format yaml
//!
//! # Only check that the model assembles and validates
//! gapic-gen validate --config gapic-gen.toml
//! ```

#![forbid(unsafe_code)]

mod config;
mod summary;

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use gapic_gen_model::{Api, SpecificationFormat};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{GeneratorConfig, Overrides};

/// Unified API model builder for Google-style client library generators.
#[derive(Parser)]
#[command(name = "gapic-gen", version, about)]
struct Cli {
    /// Increase log verbosity from `info` (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the model and print it.
    Model(ModelArgs),

    /// Build the model and report whether it is consistent.
    Validate(SourceArgs),
}

#[derive(Args)]
struct ModelArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One line per service, method, message and enum.
    Summary,
    /// The complete model as YAML.
    Yaml,
}

#[derive(Args)]
struct SourceArgs {
    /// Path to a `gapic-gen.toml` config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source format: `discovery`, `openapi` or `protobuf`.
    #[arg(long)]
    specification_format: Option<SpecificationFormat>,

    /// Specification file, descriptor set, or `.proto` directory.
    #[arg(long)]
    specification_source: Option<PathBuf>,

    /// Service config YAML file.
    #[arg(long)]
    service_config: Option<PathBuf>,

    /// Source option as `key=value` (repeatable), e.g. `skipped-ids=.pkg.Foo`.
    #[arg(long = "source", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    source: Vec<(String, String)>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Model(args) => {
            let api = build(args.source)?;
            match args.format {
                OutputFormat::Summary => print!("{}", summary::render(&api)),
                OutputFormat::Yaml => {
                    let yaml = serde_yaml_ng::to_string(&api).context("Failed to serialize model")?;
                    print!("{yaml}");
                }
            }
        }
        Command::Validate(args) => {
            let api = build(args)?;
            eprintln!(
                "OK: {} ({} services, {} messages, {} enums)",
                api.package_name,
                api.services.len(),
                api.all_messages().len(),
                api.all_enums().len(),
            );
        }
    }

    Ok(())
}

fn build(args: SourceArgs) -> anyhow::Result<Api> {
    let file = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let config = file.into_model_config(Overrides {
        specification_format: args.specification_format,
        specification_source: args.specification_source,
        service_config: args.service_config,
        source: args.source,
    })?;
    tracing::debug!(
        format = %config.specification_format(),
        source = %config.specification_source().display(),
        "building model"
    );

    gapic_gen_model::create_model(&config).with_context(|| {
        format!(
            "Failed to build model from {}",
            config.specification_source().display()
        )
    })
}

/// Logs go to stderr so model output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    });
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Parse a `key=value` pair; the value may itself contain `=`.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}
