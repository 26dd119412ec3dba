//! Core of the `cfn-resolve` command: argument model, input loading and
//! output rendering. `main.rs` only parses arguments, installs logging and
//! prints.

use anyhow::{Context, Result};
use cfn_resolve::{CloudProvider, OfflineCloud, ResolveOptions, StaticCloud};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve intrinsic functions and conditions in a CloudFormation template.
#[derive(Parser, Debug)]
#[command(name = "cfn-resolve", version)]
pub struct Args {
    /// Template file, or `-` to read stdin
    pub template: PathBuf,

    /// Default region. Falls back to AWS_REGION, then AWS_DEFAULT_REGION
    #[arg(long, short = 'r')]
    pub region: Option<String>,

    /// Input format. Guessed from the file extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// JSON file with `availability_zones` and `exports` tables
    #[arg(long)]
    pub cloud_fixture: Option<PathBuf>,

    /// Template parameter value in format KEY=VALUE (can be repeated)
    #[arg(long = "parameter", short = 'p', value_parser = parse_key_val)]
    pub parameters: Vec<(String, String)>,

    /// Print single-line JSON
    #[arg(long)]
    pub compact: bool,

    /// Log resolution steps to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.yaml`, `.yml` and `.template` files are YAML, anything else JSON.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ["yaml", "yml", "template"].contains(&ext.to_ascii_lowercase().as_str()) => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

/// Parses a `KEY=VALUE` pair. The value may contain further `=`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid KEY=VALUE pair: {}", s)),
    }
}

pub fn options(args: &Args) -> Result<ResolveOptions> {
    let mut options = match &args.region {
        Some(region) => ResolveOptions::new(region.as_str()),
        None => ResolveOptions::from_env()?,
    };
    for (name, value) in &args.parameters {
        options = options.with_parameter(name, value.as_str());
    }
    options.validate()?;
    Ok(options)
}

/// The cloud provider: a fixture if given, otherwise offline.
pub fn cloud(args: &Args) -> Result<Box<dyn CloudProvider>> {
    match &args.cloud_fixture {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading cloud fixture {}", path.display()))?;
            let fixture: StaticCloud = serde_json::from_str(&text)
                .with_context(|| format!("parsing cloud fixture {}", path.display()))?;
            debug!(
                regions = fixture.availability_zones.len(),
                exports = fixture.exports.len(),
                "loaded cloud fixture"
            );
            Ok(Box::new(fixture))
        }
        None => Ok(Box::new(OfflineCloud)),
    }
}

pub fn read_template(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading template from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading template {}", path.display()))
}

/// Resolves template `text` and renders the result.
pub fn resolve_text(text: &str, format: Format, args: &Args) -> Result<String> {
    let options = options(args)?;
    let cloud = cloud(args)?;
    let resolved: Value = match format {
        Format::Json => cfn_resolve::load_json(text, &options, cloud.as_ref())?,
        Format::Yaml => cfn_resolve::load_yaml(text, &options, cloud.as_ref())?,
    };
    let rendered = if args.compact {
        serde_json::to_string(&resolved)?
    } else {
        serde_json::to_string_pretty(&resolved)?
    };
    Ok(rendered)
}

pub fn run(args: &Args) -> Result<String> {
    let format = args
        .format
        .unwrap_or_else(|| Format::detect(&args.template));
    debug!(template = %args.template.display(), ?format, "resolving");
    let text = read_template(&args.template)?;
    resolve_text(&text, format, args)
}
