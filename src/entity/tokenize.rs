use unicode_segmentation::UnicodeSegmentation;

const POSSESSIVE_SUFFIXES: &[&str] = &["'s", "\u{2019}s", "'S", "\u{2019}S"];

/// A word-level token with its byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextToken<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Split text on Unicode word boundaries, splitting off possessive `'s`.
///
/// A single space between words is a separator and yields no token. Any other
/// whitespace (line breaks, tabs, runs of spaces) is kept as a token of its
/// own, so a multi-word pattern never matches across it.
pub fn tokenize(text: &str) -> Vec<TextToken<'_>> {
    let mut tokens = Vec::new();

    for (start, word) in text.split_word_bound_indices() {
        if word == " " {
            continue;
        }
        let end = start + word.len();

        match possessive_stem_len(word) {
            Some(stem_len) => {
                let split = start + stem_len;
                tokens.push(TextToken {
                    text: &word[..stem_len],
                    start,
                    end: split,
                });
                tokens.push(TextToken {
                    text: &word[stem_len..],
                    start: split,
                    end,
                });
            }
            None => tokens.push(TextToken {
                text: word,
                start,
                end,
            }),
        }
    }

    tokens
}

fn possessive_stem_len(word: &str) -> Option<usize> {
    POSSESSIVE_SUFFIXES.iter().find_map(|suffix| {
        word.strip_suffix(suffix)
            .filter(|stem| !stem.is_empty())
            .map(str::len)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<&str> {
        tokenize(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_punctuation_is_split() {
        assert_eq!(
            words("Tesla, CyberTruck and StarLink."),
            vec!["Tesla", ",", "CyberTruck", "and", "StarLink", "."]
        );
    }

    #[test]
    fn test_possessive_is_split() {
        assert_eq!(words("Elon Musk's company"), vec!["Elon", "Musk", "'s", "company"]);
        assert_eq!(words("Musk\u{2019}s"), vec!["Musk", "\u{2019}s"]);
    }

    #[test]
    fn test_offsets_point_into_source() {
        let text = "  Open AI\tChatGPT ";
        for token in tokenize(text) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
        assert_eq!(words(text), vec!["  ", "Open", "AI", "\t", "ChatGPT"]);
    }

    #[test]
    fn test_extra_whitespace_is_a_token() {
        assert_eq!(words("Elon Musk"), vec!["Elon", "Musk"]);
        assert_eq!(words("Elon\nMusk"), vec!["Elon", "\n", "Musk"]);
        assert_eq!(words("Elon  Musk"), vec!["Elon", "  ", "Musk"]);
    }

    #[test]
    fn test_single_space_yields_nothing() {
        assert!(tokenize(" ").is_empty());
        assert!(tokenize("").is_empty());
    }
}
