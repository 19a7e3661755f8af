//! Claim post-processing and the sentence-split fallback

use crate::parser::ClaimCandidate;
use faris_domain::{Claim, ClaimId};
use std::collections::HashSet;

/// Comparison key: lowercase with whitespace runs collapsed
fn dedup_key(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase word tokens with their byte offsets in `text`
fn word_spans(text: &str) -> Vec<(usize, String)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (idx, c) in text.char_indices() {
        match (c.is_alphanumeric(), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                spans.push((s, text[s..idx].to_lowercase()));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text[s..].to_lowercase()));
    }
    spans
}

/// Where a reworded claim is supported in the answer
///
/// Finds the longest run of consecutive claim words that also occurs in the
/// answer and returns the offset of its first word. Earliest run wins ties.
/// Runs of one short word are too weak to place a claim.
fn locate_reworded(claim: &str, answer_words: &[(usize, String)]) -> Option<usize> {
    let claim_words: Vec<String> = word_spans(claim).into_iter().map(|(_, w)| w).collect();
    if claim_words.is_empty() || answer_words.is_empty() {
        return None;
    }

    // lengths[j] = run ending at answer word j and the current claim word
    let mut best: Option<(usize, usize)> = None;
    let mut previous = vec![0usize; answer_words.len() + 1];
    for word in &claim_words {
        let mut current = vec![0usize; answer_words.len() + 1];
        for (j, (_, answer_word)) in answer_words.iter().enumerate() {
            if answer_word != word {
                continue;
            }
            let run = previous[j] + 1;
            current[j + 1] = run;
            let first = j + 1 - run;
            let better = match best {
                None => true,
                Some((len, at)) => run > len || (run == len && first < at),
            };
            if better {
                best = Some((run, first));
            }
        }
        previous = current;
    }

    let (len, first) = best?;
    let strong = len >= 2 || answer_words[first].1.chars().count() >= 4;
    strong.then(|| answer_words[first].0)
}

/// Turn candidates into the final, ordered claim list
///
/// Trims text, drops empty and duplicate claims, orders claims by where
/// their text appears in `answer` and assigns ids `c1..cn` after capping at
/// `max_claims`. A reworded claim is placed at its longest run of words
/// shared with the answer. A claim that cannot be located at all sorts
/// right after its predecessor.
pub fn normalize_claims(candidates: Vec<ClaimCandidate>, answer: &str, max_claims: usize) -> Vec<Claim> {
    let answer_key = answer.to_lowercase();
    let answer_words = word_spans(answer);
    let mut seen = HashSet::new();
    let mut positioned = Vec::new();
    let mut last_position = 0;

    for (index, candidate) in candidates.into_iter().enumerate() {
        let text = candidate.text.trim();
        if text.is_empty() || !seen.insert(dedup_key(text)) {
            continue;
        }
        let position = answer_key
            .find(&text.to_lowercase())
            .or_else(|| locate_reworded(text, &answer_words))
            .unwrap_or(last_position);
        last_position = position;
        positioned.push(((position, index), text.to_string(), candidate));
    }

    positioned.sort_by_key(|(key, _, _)| *key);

    positioned
        .into_iter()
        .take(max_claims)
        .enumerate()
        .map(|(idx, (_, text, candidate))| {
            Claim::new(ClaimId::from_ordinal(idx as u32 + 1), text)
                .with_type(candidate.claim_type)
                .with_assumptions(candidate.implicit_assumptions)
        })
        .collect()
}

/// Split `answer` into sentences after `.`, `!` or `?` followed by whitespace
///
/// Fragments of `min_chars` characters or fewer are skipped.
pub fn split_sentences(answer: &str, min_chars: usize) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = answer.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_idx, next)) = chars.peek() {
            if next.is_whitespace() {
                push_sentence(&mut sentences, &answer[start..next_idx], min_chars);
                start = next_idx;
            }
        } else {
            push_sentence(&mut sentences, &answer[start..idx + c.len_utf8()], min_chars);
            start = answer.len();
        }
    }
    if start < answer.len() {
        push_sentence(&mut sentences, &answer[start..], min_chars);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str, min_chars: usize) {
    let sentence = raw.trim();
    if sentence.chars().count() > min_chars {
        sentences.push(sentence.to_string());
    }
}
