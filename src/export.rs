use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::entity::Doc;
use crate::error::{NerError, Result};

pub const TARGET_EXPORT: &str = "export";

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRow {
    pub text: String,
    pub entities: String,
}

impl From<&Doc> for EntityRow {
    fn from(doc: &Doc) -> Self {
        EntityRow {
            text: doc.text.clone(),
            entities: format_entity_list(&doc.entity_pairs()),
        }
    }
}

/// Quote a string the way the corpus tooling prints string literals: single
/// quotes unless the text contains a single quote and no double quote.
pub fn quote_literal(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push(quote);
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == quote => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(quote);
    quoted
}

/// `[('Elon Musk', 'PERSON'), ('Tesla', 'ORG')]`
pub fn format_entity_list(pairs: &[(String, String)]) -> String {
    let items = pairs
        .iter()
        .map(|(text, label)| format!("({}, {})", quote_literal(text), quote_literal(label)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", items)
}

/// Write rows with a `text,entities` header to any writer.
pub fn write_rows<W: Write>(writer: W, rows: &[EntityRow]) -> std::result::Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(["text", "entities"])?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one row per document to a CSV file at `path`.
pub fn write_csv(path: impl AsRef<Path>, docs: &[Doc]) -> Result<()> {
    let path = path.as_ref();
    let rows: Vec<EntityRow> = docs.iter().map(EntityRow::from).collect();

    let file = File::create(path).map_err(|e| NerError::from_io(path, e))?;
    write_rows(file, &rows).map_err(|e| NerError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    info!(target: TARGET_EXPORT, "Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
