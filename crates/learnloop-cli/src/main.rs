use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;

fn main() {
    // stdout carries JSON only; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        tracing::debug!(error = %format!("{error:#}"), "command failed");
        let body = serde_json::json!({
            "status": "error",
            "message": format!("{error:#}"),
        });
        if commands::print_json(&body).is_err() {
            eprintln!("error: {error:#}");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let project = commands::Project::open(cli.project)?;
    commands::dispatch(&project, cli.command)
}
