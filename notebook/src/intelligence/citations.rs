/// Extract `[name]` citations from model output.
///
/// Naive bracket matching: each `[` pairs with the next `]`, nesting is not
/// understood and an unmatched `[` ends the scan. Citations are trimmed and
/// deduplicated by exact string, first occurrence wins.
pub fn extract_citations(text: &str) -> Vec<String> {
    let mut citations: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find(']') else {
            break;
        };

        let citation = after_open[..close].trim();
        if !citation.is_empty() && !citations.iter().any(|c| c == citation) {
            citations.push(citation.to_string());
        }

        rest = &after_open[close + 1..];
    }

    citations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let citations = extract_citations("See [DocA] and [DocB], also [DocA]");
        assert_eq!(citations, vec!["DocA", "DocB"]);
    }

    #[test]
    fn test_blank_citations_are_skipped() {
        assert_eq!(extract_citations("[] [   ] [Real]"), vec!["Real"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        assert_eq!(extract_citations("[doc] [Doc]"), vec!["doc", "Doc"]);
    }

    #[test]
    fn test_unmatched_bracket_stops_scan() {
        assert_eq!(extract_citations("[One] then [broken and [Two]"), vec!["One", "broken and [Two"]);
        assert_eq!(extract_citations("[One] then [never closed"), vec!["One"]);
    }

    #[test]
    fn test_no_brackets() {
        assert!(extract_citations("plain answer").is_empty());
        assert!(extract_citations("").is_empty());
    }

    #[test]
    fn test_names_with_spaces_and_unicode() {
        let citations = extract_citations("Per [Lecture Notes – Week 3.pdf] and [Ünïcode.md].");
        assert_eq!(citations, vec!["Lecture Notes – Week 3.pdf", "Ünïcode.md"]);
    }
}
