use crate::entity::{EntityLabel, EntitySource, EntitySpan};

/// Model output for one sub-word token.
#[derive(Debug, Clone, Copy)]
pub struct TokenPrediction<'a> {
    /// Word index from the tokenizer; `None` for special tokens.
    pub word: Option<u32>,
    pub start: usize,
    pub end: usize,
    pub label: &'a str,
}

#[derive(Debug)]
struct Word<'a> {
    start: usize,
    end: usize,
    label: &'a str,
}

#[derive(Debug)]
struct OpenEntity<'a> {
    start: usize,
    end: usize,
    kind: &'a str,
}

/// Group sub-word predictions into words, then decode BIO(ES) tags into entity spans.
///
/// A word takes the label of its first sub-word. `I-X` continues an open entity
/// of type X and opens a new one otherwise; bare `X` tags are read as `I-X`.
pub fn decode_entities(text: &str, predictions: &[TokenPrediction<'_>]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut open: Option<OpenEntity<'_>> = None;

    for word in group_words(predictions) {
        let (prefix, kind) = split_tag(word.label);

        match prefix {
            'O' => close(text, &mut open, &mut spans),
            'B' | 'S' => {
                close(text, &mut open, &mut spans);
                open = Some(OpenEntity {
                    start: word.start,
                    end: word.end,
                    kind,
                });
            }
            _ => match open.as_mut() {
                Some(entity) if entity.kind == kind => entity.end = word.end,
                _ => {
                    close(text, &mut open, &mut spans);
                    open = Some(OpenEntity {
                        start: word.start,
                        end: word.end,
                        kind,
                    });
                }
            },
        }

        if matches!(prefix, 'S' | 'E') {
            close(text, &mut open, &mut spans);
        }
    }

    close(text, &mut open, &mut spans);
    spans
}

fn group_words<'a>(predictions: &[TokenPrediction<'a>]) -> Vec<Word<'a>> {
    let mut words: Vec<Word<'a>> = Vec::new();
    let mut last_word = None;

    for prediction in predictions {
        let Some(word) = prediction.word else {
            continue;
        };
        if prediction.start >= prediction.end {
            continue;
        }

        match words.last_mut() {
            Some(current) if last_word == Some(word) => current.end = prediction.end,
            _ => words.push(Word {
                start: prediction.start,
                end: prediction.end,
                label: prediction.label,
            }),
        }
        last_word = Some(word);
    }

    words
}

fn split_tag(tag: &str) -> (char, &str) {
    if tag == "O" || tag.is_empty() {
        return ('O', "");
    }
    match tag.split_once('-') {
        Some((prefix, kind)) if prefix.len() == 1 && !kind.is_empty() => {
            (prefix.chars().next().unwrap_or('I'), kind)
        }
        _ => ('I', tag),
    }
}

fn close(text: &str, open: &mut Option<OpenEntity<'_>>, spans: &mut Vec<EntitySpan>) {
    if let Some(entity) = open.take() {
        if text.get(entity.start..entity.end).is_some() {
            spans.push(EntitySpan::new(
                text,
                entity.start,
                entity.end,
                model_label(entity.kind),
                EntitySource::Model,
            ));
        }
    }
}

/// CoNLL checkpoints tag people as `PER`; report them under the same code as override rules.
fn model_label(kind: &str) -> EntityLabel {
    match kind {
        "PER" => EntityLabel::Person,
        other => EntityLabel::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(word: Option<u32>, start: usize, end: usize, label: &str) -> TokenPrediction<'_> {
        TokenPrediction {
            word,
            start,
            end,
            label,
        }
    }

    fn pairs(spans: &[EntitySpan]) -> Vec<(&str, String)> {
        spans
            .iter()
            .map(|s| (s.text.as_str(), s.label.to_string()))
            .collect()
    }

    #[test]
    fn test_bio_decoding_with_subwords() {
        // [CLS] Elon Musk founded Space ##X [SEP]
        let text = "Elon Musk founded SpaceX";
        let predictions = vec![
            prediction(None, 0, 0, "O"),
            prediction(Some(0), 0, 4, "B-PER"),
            prediction(Some(1), 5, 9, "I-PER"),
            prediction(Some(2), 10, 17, "O"),
            prediction(Some(3), 18, 23, "B-ORG"),
            prediction(Some(3), 23, 24, "I-ORG"),
            prediction(None, 0, 0, "O"),
        ];
        let spans = decode_entities(text, &predictions);
        assert_eq!(
            pairs(&spans),
            vec![("Elon Musk", "PERSON".to_string()), ("SpaceX", "ORG".to_string())]
        );
        assert!(spans.iter().all(|s| s.source == EntitySource::Model));
    }

    #[test]
    fn test_word_uses_first_subword_label() {
        let text = "SpaceX";
        let predictions = vec![
            prediction(Some(0), 0, 5, "B-ORG"),
            prediction(Some(0), 5, 6, "B-MISC"),
        ];
        assert_eq!(
            pairs(&decode_entities(text, &predictions)),
            vec![("SpaceX", "ORG".to_string())]
        );
    }

    #[test]
    fn test_dangling_inside_tag_opens_entity() {
        let text = "in Paris France";
        let predictions = vec![
            prediction(Some(0), 0, 2, "O"),
            prediction(Some(1), 3, 8, "I-LOC"),
            prediction(Some(2), 9, 15, "I-LOC"),
        ];
        assert_eq!(
            pairs(&decode_entities(text, &predictions)),
            vec![("Paris France", "LOC".to_string())]
        );
    }

    #[test]
    fn test_type_change_splits_entities() {
        let text = "Tesla Berlin";
        let predictions = vec![
            prediction(Some(0), 0, 5, "I-ORG"),
            prediction(Some(1), 6, 12, "I-LOC"),
        ];
        assert_eq!(
            pairs(&decode_entities(text, &predictions)),
            vec![("Tesla", "ORG".to_string()), ("Berlin", "LOC".to_string())]
        );
    }

    #[test]
    fn test_adjacent_begin_tags_are_separate() {
        let text = "Tesla SpaceX";
        let predictions = vec![
            prediction(Some(0), 0, 5, "B-ORG"),
            prediction(Some(1), 6, 12, "B-ORG"),
        ];
        assert_eq!(decode_entities(text, &predictions).len(), 2);
    }

    #[test]
    fn test_conll_codes_map_to_labels() {
        let text = "Musk Berlin Rivian";
        let predictions = vec![
            prediction(Some(0), 0, 4, "B-PER"),
            prediction(Some(1), 5, 11, "B-LOC"),
            prediction(Some(2), 12, 18, "B-ORG"),
        ];
        let spans = decode_entities(text, &predictions);
        assert_eq!(spans[0].label, EntityLabel::Person);
        assert_eq!(spans[1].label, EntityLabel::Location);
        assert_eq!(spans[2].label, EntityLabel::Organization);
    }

    #[test]
    fn test_all_outside_gives_nothing() {
        let text = "hello world";
        let predictions = vec![
            prediction(Some(0), 0, 5, "O"),
            prediction(Some(1), 6, 11, "O"),
        ];
        assert!(decode_entities(text, &predictions).is_empty());
    }
}
