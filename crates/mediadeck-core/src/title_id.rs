//! Title identifier validation.
//!
//! Training records are keyed by a title identifier: the literal prefix
//! `tt` followed by 7 or 8 decimal digits (`tt1234567`, `tt12345678`).
//! Every mutating call keyed by such an identifier must pass this check
//! before any request is sent.

/// Returns `true` only for `tt` followed by exactly 7 or 8 ASCII digits.
///
/// The check is byte-exact: no surrounding whitespace, no uppercase
/// prefix, no shorter or longer digit runs.
pub fn is_valid_title_id(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 9 || bytes.len() > 10 {
        return false;
    }
    if &bytes[..2] != b"tt" {
        return false;
    }
    bytes[2..].iter().all(|b| b.is_ascii_digit())
}
