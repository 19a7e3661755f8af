//! Lexical helpers shared by the detector heuristics

use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "to", "in", "on", "for", "with", "by", "at",
    "from", "as", "is", "are", "was", "were", "be", "been", "being", "it", "its", "this", "that",
    "these", "those", "has", "have", "had", "do", "does", "did", "can", "will", "would", "should",
    "could", "may", "might", "i", "you", "your", "we", "they", "he", "she", "what", "which",
    "who", "how", "why", "when", "there", "their", "so", "if", "then", "than", "any", "all",
    "also", "very", "into", "about",
];

const NEGATIONS: &[&str] = &["no", "not", "never", "none", "nothing", "cannot", "without", "neither", "nor"];

/// Lowercase word tokens; apostrophes stay inside words
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

/// Whether the text contains a negation word
pub fn is_negated(text: &str) -> bool {
    words(text).iter().any(|w| is_negation(w))
}

/// Content words: no stopwords, no negations, no single characters
pub fn content_words(text: &str) -> HashSet<String> {
    words(text)
        .into_iter()
        .filter(|w| w.chars().count() > 1 && !STOPWORDS.contains(&w.as_str()) && !is_negation(w))
        .collect()
}

/// Jaccard overlap of two word sets, 0.0 when both are empty
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Whether `term` occurs in `text` on word boundaries, case-insensitively
pub fn contains_term(text: &str, term: &str) -> bool {
    let haystack = text.to_lowercase();
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(&needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// The terms of `lexicon` found in `text`, in lexicon order
pub fn find_terms<'a>(text: &str, lexicon: &[&'a str]) -> Vec<&'a str> {
    lexicon
        .iter()
        .copied()
        .filter(|term| contains_term(text, term))
        .collect()
}

/// Whether the text contains a fenced or indented code block
pub fn has_code(text: &str) -> bool {
    text.contains("```")
        || text.lines().any(|l| l.starts_with("    ") && !l.trim().is_empty())
}

/// Whether the text contains a bulleted or numbered list
pub fn has_list(text: &str) -> bool {
    text.lines().map(str::trim_start).any(|l| {
        l.starts_with("- ")
            || l.starts_with("* ")
            || l.split_once(". ")
                .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Whether the text contains a digit
pub fn has_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_keep_contractions() {
        assert_eq!(words("It isn't SAFE, right?"), vec!["it", "isn't", "safe", "right"]);
    }

    #[test]
    fn test_negation() {
        assert!(is_negated("Aspirin has no side effects"));
        assert!(is_negated("It doesn't work"));
        assert!(!is_negated("Aspirin has side effects"));
    }

    #[test]
    fn test_content_words_drop_stopwords_and_negations() {
        let words = content_words("The drug is not safe for children");
        assert!(words.contains("drug"));
        assert!(words.contains("safe"));
        assert!(words.contains("children"));
        assert!(!words.contains("not"));
        assert!(!words.contains("the"));
    }

    #[test]
    fn test_jaccard() {
        let a = content_words("aspirin thins blood");
        let b = content_words("aspirin thins blood quickly");
        assert!((jaccard(&a, &b) - 0.75).abs() < 1e-9);
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        assert!(contains_term("It ALWAYS works", "always"));
        assert!(contains_term("Works for everyone.", "for everyone"));
        assert!(contains_term("It is 100% safe", "100%"));
        assert!(!contains_term("Hallways are long", "always"));
        assert!(!contains_term("justice", "just"));
    }

    #[test]
    fn test_structure_detection() {
        assert!(has_code("Use:\n```rust\nfn main() {}\n```"));
        assert!(has_list("Steps:\n1. Install\n2. Run"));
        assert!(has_list("- first\n- second"));
        assert!(!has_list("Version 2.0 is out"));
        assert!(has_number("Wait 5 minutes"));
        assert!(!has_code("plain prose"));
    }
}
