pub mod loader;
pub mod types;

pub use loader::{load_corpus, parse_corpus, parse_corpus_str};
pub use types::*;

pub const TARGET_CORPUS: &str = "corpus";
