use crate::catalog::ValidResponse;

/// Trims surrounding whitespace and lowercases a raw model response.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks a raw model response against a valid-response rule.
///
/// Returns the normalized response when accepted:
/// - `ExactSet`: the normalized text must equal one member exactly
/// - `WordCount(n)`: the normalized text must split into exactly `n` whitespace tokens
pub fn validate(raw: &str, rule: &ValidResponse) -> Option<String> {
    let normalized = normalize(raw);
    let accepted = match rule {
        ValidResponse::ExactSet(members) => members.contains(&normalized),
        ValidResponse::WordCount(n) => normalized.split_whitespace().count() == *n,
    };
    accepted.then_some(normalized)
}
