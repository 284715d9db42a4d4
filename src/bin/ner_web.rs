use anyhow::{Context, Result};
use clap::Parser;
use nerlens::entity::rules::{resolve_rules, RuleSet};
use nerlens::pipeline;
use nerlens::web::{serve, AppState};
use nerlens::{build_pipeline, logging, PipelineOptions};
use std::path::PathBuf;

/// Interactive entity highlighter served over HTTP.
#[derive(Parser)]
#[clap(name = "ner-web", about = "Serve a form that highlights named entities in submitted text")]
struct Cli {
    /// Address to bind
    #[clap(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[clap(long, env = "PORT", default_value = "8501")]
    port: u16,

    /// Built-in override rule set
    #[clap(long, value_enum, default_value = "ai")]
    rule_set: RuleSet,

    /// JSON file of override rules, replacing the built-in set
    #[clap(long)]
    rules: Option<PathBuf>,

    /// Match override patterns regardless of case
    #[clap(long)]
    case_insensitive: bool,

    /// Apply override rules only, without loading the statistical model
    #[clap(long)]
    no_model: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging("ner_web");
    let args = Cli::parse();

    let rules = resolve_rules(args.rule_set, args.rules.as_deref())?;
    let mut options = PipelineOptions::new(rules);
    options.case_insensitive = args.case_insensitive;
    options.ruler_only = args.no_model;

    pipeline::init_global(
        build_pipeline(&options)
            .await
            .context("Failed to build recognition pipeline")?,
    )?;

    let addr = format!("{}:{}", args.host, args.port);
    serve(&addr, AppState::from_global()?).await
}
