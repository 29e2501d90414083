//! Fuzzy title matching.
//!
//! Titles are compared as token sets so that word order, letter case and
//! punctuation do not matter, and a title that merely adds words to the
//! query (sequels, subtitles) still scores as a full match.

use std::collections::BTreeSet;

/// Score a title must exceed to count as a fuzzy match (0-100 scale).
pub const MATCH_THRESHOLD: u8 = 80;

/// Token set similarity of two titles on a 0-100 scale.
pub fn token_set_ratio(left: &str, right: &str) -> u8 {
    let left_processed = normalize(left);
    let right_processed = normalize(right);
    let left_tokens: BTreeSet<&str> = left_processed.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right_processed.split_whitespace().collect();

    if left_tokens.is_empty() || right_tokens.is_empty() {
        return 0;
    }

    let intersection: Vec<&str> = left_tokens.intersection(&right_tokens).copied().collect();
    let only_left: Vec<&str> = left_tokens.difference(&right_tokens).copied().collect();
    let only_right: Vec<&str> = right_tokens.difference(&left_tokens).copied().collect();

    // One title's tokens are a subset of the other's
    if !intersection.is_empty() && (only_left.is_empty() || only_right.is_empty()) {
        return 100;
    }

    let sect = intersection.join(" ");
    let combined_left = join_nonempty(&sect, &only_left.join(" "));
    let combined_right = join_nonempty(&sect, &only_right.join(" "));

    ratio(&sect, &combined_left)
        .max(ratio(&sect, &combined_right))
        .max(ratio(&combined_left, &combined_right))
}

/// Whether `candidate` matches the free-text `query`.
///
/// Accepts when the token set score exceeds [`MATCH_THRESHOLD`] or when the
/// query is a case-insensitive substring of the candidate.
pub fn is_title_match(query: &str, candidate: &str) -> bool {
    token_set_ratio(query, candidate) > MATCH_THRESHOLD
        || candidate.to_lowercase().contains(&query.to_lowercase())
}

fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

/// Indel similarity `2 * lcs / (len_a + len_b)` on a 0-100 scale.
///
/// Lengths count chars. The score is rounded half to even.
fn ratio(left: &str, right: &str) -> u8 {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    let numerator = 200 * longest_common_subsequence(&left, &right);
    let total = left.len() + right.len();
    let (quotient, remainder) = (numerator / total, numerator % total);
    let rounded = match (2 * remainder).cmp(&total) {
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    };

    u8::try_from(rounded).unwrap_or(100)
}

fn longest_common_subsequence(left: &[char], right: &[char]) -> usize {
    let mut row = vec![0usize; right.len() + 1];
    for &l in left {
        let mut diagonal = 0;
        for (j, &r) in right.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if l == r {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[right.len()]
}
