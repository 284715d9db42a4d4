use anyhow::{Context, Result};
use clap::Parser;
use nerlens::corpus::{load_corpus, Corpus};
use nerlens::entity::rules::{resolve_rules, RuleSet};
use nerlens::export::{format_entity_list, write_csv};
use nerlens::pipeline::{self, TARGET_PIPELINE};
use nerlens::{build_pipeline, logging, PipelineOptions};
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the entity pipeline over a tagged corpus and export the results.
///
/// Usage:
///    cargo run --bin ner_batch -- --train data/train.txt --limit 25 --output results.csv
#[derive(Parser)]
#[clap(name = "ner-batch", about = "Recognize entities in corpus sentences and write them to CSV")]
struct Cli {
    /// Training split; its first sentences are processed
    #[clap(long, default_value = "train.txt")]
    train: PathBuf,

    /// Validation split (loaded and counted)
    #[clap(long, default_value = "valid.txt")]
    valid: PathBuf,

    /// Test split (loaded and counted)
    #[clap(long, default_value = "test.txt")]
    test: PathBuf,

    /// Output CSV path
    #[clap(short, long, default_value = "ner_output.csv")]
    output: PathBuf,

    /// Number of training sentences to process
    #[clap(short, long, default_value = "10")]
    limit: usize,

    /// Built-in override rule set
    #[clap(long, value_enum, default_value = "automotive")]
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

fn load_split(name: &str, path: &Path) -> Result<Corpus> {
    let corpus = load_corpus(path).with_context(|| format!("Failed to load {} split", name))?;
    info!("Loaded {} {} sentences from {}", corpus.len(), name, path.display());
    Ok(corpus)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging("ner_batch");
    let args = Cli::parse();

    let train = load_split("training", &args.train)?;
    let _valid = load_split("validation", &args.valid)?;
    let _test = load_split("test", &args.test)?;

    let texts = train.texts();
    if let Some(first) = texts.first() {
        info!("Example from training set: {}", first);
    }

    let rules = resolve_rules(args.rule_set, args.rules.as_deref())?;
    let mut options = PipelineOptions::new(rules);
    options.case_insensitive = args.case_insensitive;
    options.ruler_only = args.no_model;

    let pipeline = pipeline::init_global(
        build_pipeline(&options)
            .await
            .context("Failed to build recognition pipeline")?,
    )?;

    info!(target: TARGET_PIPELINE, "Running NER on {} sentences", args.limit.min(texts.len()));
    let mut docs = Vec::new();
    for text in texts.iter().take(args.limit) {
        let doc = pipeline
            .process(text)
            .with_context(|| format!("Recognition failed for: {}", text))?;
        info!("Text: {}", doc.text);
        info!("Entities: {}", format_entity_list(&doc.entity_pairs()));
        docs.push(doc);
    }

    write_csv(&args.output, &docs)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Results saved to {}", args.output.display());

    Ok(())
}
