use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use super::types::{Corpus, Sentence, Token};
use super::TARGET_CORPUS;
use crate::error::{NerError, Result};

/// Load a tagged-token file into a `Corpus`.
///
/// One token per line, the first field is the surface text and the last field
/// is the tag. Blank lines close sentences and lines with fewer than two fields
/// are skipped without error.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| NerError::from_io(path, e))?;

    let corpus = parse_corpus(BufReader::new(file)).map_err(|e| match e {
        NerError::Io { source, .. } => NerError::from_io(path, source),
        other => other,
    })?;

    debug!(
        target: TARGET_CORPUS,
        "Loaded {} sentences ({} tokens) from {}",
        corpus.len(),
        corpus.token_count(),
        path.display()
    );

    Ok(corpus)
}

/// Parse tagged-token lines from any buffered reader.
pub fn parse_corpus<R: BufRead>(reader: R) -> Result<Corpus> {
    let mut builder = CorpusBuilder::default();

    for line in reader.lines() {
        let line = line.map_err(|source| NerError::Io {
            path: "<reader>".into(),
            source,
        })?;
        builder.push_line(&line);
    }

    Ok(builder.finish())
}

/// Parse tagged-token content already held in memory.
pub fn parse_corpus_str(content: &str) -> Corpus {
    let mut builder = CorpusBuilder::default();
    for line in content.lines() {
        builder.push_line(line);
    }
    builder.finish()
}

/// Completed sentences plus the one still being filled.
#[derive(Default)]
struct CorpusBuilder {
    sentences: Vec<Sentence>,
    open: Vec<Token>,
}

impl CorpusBuilder {
    fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            self.close_sentence();
        } else if let Some(token) = parse_line(line) {
            self.open.push(token);
        }
    }

    // No-op on an empty buffer, so runs of blank lines never emit empty sentences.
    fn close_sentence(&mut self) {
        if !self.open.is_empty() {
            self.sentences
                .push(Sentence::new(std::mem::take(&mut self.open)));
        }
    }

    fn finish(mut self) -> Corpus {
        self.close_sentence();
        Corpus::new(self.sentences)
    }
}

/// First and last whitespace-delimited fields of a non-blank line, if it has at least two.
fn parse_line(line: &str) -> Option<Token> {
    let mut fields = line.split_whitespace();
    let text = fields.next()?;
    let tag = fields.last()?;
    Some(Token::new(text, tag))
}
