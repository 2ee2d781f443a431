//! Weighted approximate-substring scoring.
//!
//! Scores run from 0.0 (exact) to 1.0 (nothing in common); lower is better.
//! A field matches when the best edit distance between the pattern and any
//! substring of the field, divided by the pattern length, is at most
//! [`THRESHOLD`]. Where the match sits inside the field does not matter.

/// Largest per-field score still counted as a match.
pub const THRESHOLD: f64 = 0.38;

/// A searchable field and its relative weight.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub text: &'a str,
    pub weight: f64,
}

/// Combined score of `pattern` against `fields`, or `None` when no field
/// matches.
///
/// Matched fields multiply in as `score ^ (weight * norm)`, where `norm`
/// shrinks for fields with many words; fields that do not match are left
/// out.
pub fn weighted_score(pattern: &str, fields: &[Field<'_>]) -> Option<f64> {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    if pattern.is_empty() {
        return None;
    }
    let total_weight: f64 = fields.iter().map(|f| f.weight).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let mut combined = 1.0;
    let mut matched = false;
    for field in fields {
        let Some(score) = field_score(&pattern, field.text) else {
            continue;
        };
        matched = true;
        let exponent = field.weight / total_weight * field_norm(field.text);
        combined *= score.max(f64::EPSILON).powf(exponent);
    }

    matched.then_some(combined)
}

/// Score of a lowercase pattern against one field, if within [`THRESHOLD`].
pub fn field_score(pattern: &[char], text: &str) -> Option<f64> {
    if pattern.is_empty() {
        return None;
    }
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let score = substring_distance(pattern, &text) as f64 / pattern.len() as f64;
    (score <= THRESHOLD).then_some(score)
}

/// Fewest edits turning `pattern` into some substring of `text`.
fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    // prev[i]: edits for pattern[..i] against a substring ending at the
    // previous text position. Starting anywhere in the text is free.
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut best = prev[m];

    for &c in text {
        let mut current = vec![0; m + 1];
        for i in 1..=m {
            let substitution = prev[i - 1] + usize::from(pattern[i - 1] != c);
            current[i] = substitution.min(prev[i] + 1).min(current[i - 1] + 1);
        }
        best = best.min(current[m]);
        prev = current;
    }

    best
}

fn field_norm(text: &str) -> f64 {
    let words = text.split(' ').filter(|w| !w.is_empty()).count().max(1);
    (1000.0 / (words as f64).sqrt()).round() / 1000.0
}
