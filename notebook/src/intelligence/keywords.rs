use std::collections::HashMap;

/// Maximum number of keywords kept per document.
pub const MAX_KEYWORDS: usize = 10;

/// Tokens must be strictly longer than this many characters.
pub const MIN_KEYWORD_LEN: usize = 4;

/// Fixed English stopword list. Compared against lowercased tokens.
pub const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "almost", "along", "already", "also",
    "although", "always", "among", "another", "anyone", "anything", "around", "because",
    "become", "becomes", "before", "being", "below", "between", "beyond", "both", "could",
    "didn't", "doesn't", "during", "each", "either", "enough", "every", "everyone",
    "everything", "first", "following", "found", "from", "further", "given", "however",
    "into", "itself", "just", "known", "large", "later", "least", "like", "little", "made",
    "many", "might", "more", "most", "much", "must", "never", "often", "only", "other",
    "others", "otherwise", "over", "perhaps", "quite", "rather", "really", "same", "second",
    "several", "shall", "should", "since", "small", "some", "something", "still", "such",
    "than", "that", "their", "theirs", "them", "themselves", "then", "there", "therefore",
    "these", "they", "things", "think", "third", "this", "those", "though", "three",
    "through", "thus", "together", "toward", "towards", "under", "until", "upon", "used",
    "using", "usually", "various", "very", "want", "well", "were", "what", "whatever",
    "when", "where", "whether", "which", "while", "whole", "whom", "whose", "will", "with",
    "within", "without", "would", "years", "your", "yours", "yourself",
];

fn is_delimiter(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | ';'
                | ':'
                | '!'
                | '?'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '<'
                | '>'
                | '"'
                | '\''
                | '`'
                | '-'
                | '_'
                | '/'
                | '\\'
                | '|'
                | '*'
                | '#'
                | '='
                | '+'
                | '&'
                | '~'
        )
}

pub fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.contains(&lower.as_str())
}

/// Extract up to [`MAX_KEYWORDS`] lowercase keywords ranked by frequency.
///
/// Ties keep the order in which the words first appear.
pub fn extract_keywords(content: &str) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (position, token) in content
        .split(is_delimiter)
        .filter(|token| token.chars().count() > MIN_KEYWORD_LEN)
        .enumerate()
    {
        let key = token.to_lowercase();
        if is_stopword(&key) {
            continue;
        }
        counts
            .entry(key)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(key, (count, first_seen))| (key, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(key, _, _)| key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_words_are_dropped() {
        let keywords = extract_keywords("cat dogs mouse horse tiger");
        assert_eq!(keywords, vec!["mouse", "horse", "tiger"]);
    }

    #[test]
    fn test_stopwords_are_dropped_case_insensitively() {
        let keywords = extract_keywords("Which THEIR because Rusty");
        assert_eq!(keywords, vec!["rusty"]);
    }

    #[test]
    fn test_ranked_by_frequency_then_first_seen() {
        let text = "gamma alpha beta- beta! alpha, delta gamma. alpha";
        // only words longer than four chars count: gamma, alpha, delta
        let keywords = extract_keywords(text);
        assert_eq!(keywords, vec!["alpha", "gamma", "delta"]);
    }

    #[test]
    fn test_case_insensitive_grouping() {
        let keywords = extract_keywords("Tokio tokio TOKIO runtime");
        assert_eq!(keywords, vec!["tokio", "runtime"]);
    }

    #[test]
    fn test_caps_at_ten() {
        let text = (0..25)
            .map(|i| format!("keyword{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");
        let keywords = extract_keywords(&text);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "keyword00");
        assert_eq!(keywords[9], "keyword09");
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let keywords = extract_keywords("(ownership)[borrowing]{lifetimes}\"traits\"");
        assert_eq!(keywords, vec!["ownership", "borrowing", "lifetimes", "traits"]);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(extract_keywords("   \n\t  ").is_empty());
        assert!(extract_keywords("").is_empty());
    }

    #[test]
    fn test_length_is_measured_in_characters() {
        // four characters, eight bytes
        assert!(extract_keywords("äöüß").is_empty());
        assert_eq!(extract_keywords("äöüßé"), vec!["äöüßé"]);
    }

    #[test]
    fn test_is_stopword() {
        assert!(is_stopword("Because"));
        assert!(!is_stopword("compiler"));
    }
}
