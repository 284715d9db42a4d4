use std::io;
use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const STDOUT_FILTER: &str = "info,ner_model=info,web_request=info,tokenizers=warn,hyper=warn";
const FILE_FILTER: &str = "info,ner_pipeline=debug,ner_model=debug,corpus=debug,entity=debug";

/// Install the stdout and daily rolling file (`logs/<app_name>.log`) subscribers.
///
/// `RUST_LOG`, when set, replaces the stdout filter.
pub fn configure_logging(app_name: &str) {
    // Tokenizer parallelism chatter is noise at warn level
    let custom_filter = FilterFn::new(|metadata| {
        !(metadata.level() == &Level::WARN && metadata.target().starts_with("tokenizers"))
    });

    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(STDOUT_FILTER)))
        .with_filter(custom_filter);

    let file_appender = rolling::daily("logs", format!("{}.log", app_name));
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
