use crate::identity::Owner;
use sha2::{Digest, Sha256};

/// Digits, then upper case, then lower case. Codes already handed out depend on this order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// One character per SHA-256 byte, so no code can be longer than the digest.
pub const MAX_CODE_LENGTH: usize = 32;

/// Maps every byte to `ALPHABET[byte % 62]`.
pub fn encode_base62(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| ALPHABET[usize::from(*byte) % ALPHABET.len()] as char)
        .collect()
}

/// Derives the short code for `original_url` submitted by `owner`.
///
/// The same pair always yields the same code. `length` is capped at
/// [`MAX_CODE_LENGTH`]; callers validate it up front.
pub fn generate_code(original_url: &str, owner: &Owner, length: usize) -> String {
    generate_code_attempt(original_url, owner, 0, length)
}

/// Like [`generate_code`], but for `attempt > 0` the decimal attempt counter is
/// appended to the digest input, giving a fresh candidate after a collision.
pub fn generate_code_attempt(
    original_url: &str,
    owner: &Owner,
    attempt: u32,
    length: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original_url.as_bytes());
    hasher.update(owner.to_string().as_bytes());
    if attempt > 0 {
        hasher.update(attempt.to_string().as_bytes());
    }
    let digest = hasher.finalize();
    let mut code = encode_base62(&digest);
    code.truncate(length.min(MAX_CODE_LENGTH));
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn owner() -> Owner {
        Owner::new(Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap())
    }

    #[test]
    fn encodes_bytes_modulo_alphabet() {
        assert_eq!(encode_base62(&[0, 9, 10, 35, 36, 61, 62, 255]), "09AZaz07");
    }

    #[test]
    fn code_is_stable_for_same_input() {
        let first = generate_code("https://example.com", &owner(), 8);
        let second = generate_code("https://example.com", &owner(), 8);
        assert_eq!(first, second);
    }

    #[test]
    fn code_changes_when_url_or_owner_differs() {
        let base = generate_code("https://example.com", &owner(), 8);
        assert_ne!(base, generate_code("https://example.org", &owner(), 8));
        assert_ne!(base, generate_code("https://example.com", &Owner::random(), 8));
    }

    #[test]
    fn code_matches_digest_of_url_and_owner() {
        let digest = Sha256::digest(
            "https://example.com67e55044-10b1-426f-9247-bb680e5fe0c8".as_bytes(),
        );
        let expected: String = encode_base62(&digest).chars().take(10).collect();
        assert_eq!(generate_code("https://example.com", &owner(), 10), expected);
    }

    #[test]
    fn attempts_produce_distinct_candidates() {
        let first = generate_code_attempt("https://example.com", &owner(), 0, 8);
        let second = generate_code_attempt("https://example.com", &owner(), 1, 8);
        assert_eq!(first, generate_code("https://example.com", &owner(), 8));
        assert_ne!(first, second);
    }

    #[test]
    fn code_has_requested_length_and_alphabet() {
        for length in 1..=MAX_CODE_LENGTH {
            let code = generate_code("https://example.com/some/path?q=1", &owner(), length);
            assert_eq!(code.len(), length);
            assert!(code.bytes().all(|c| ALPHABET.contains(&c)));
        }
    }

    #[test]
    fn length_is_capped_at_digest_size() {
        assert_eq!(generate_code("https://example.com", &owner(), 64).len(), MAX_CODE_LENGTH);
    }
}
