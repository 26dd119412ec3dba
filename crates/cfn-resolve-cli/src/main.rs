//! `cfn-resolve` resolves a CloudFormation template and prints it as JSON.
//!
//! Usage:
//!   cfn-resolve stack.yaml --region eu-west-1
//!   cat stack.json | cfn-resolve - --parameter Env=prod --compact
//!
//! Without `--cloud-fixture`, `Fn::GetAZs` and `Fn::ImportValue` fail.

use cfn_resolve_cli::{run, Args};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let output = run(&args)?;
    println!("{}", output);
    Ok(())
}
