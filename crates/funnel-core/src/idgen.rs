//! SHA256 + base36 ID generation for funnel entities.
//!
//! IDs look like `ld-3kf0z`: a short entity-kind prefix plus a base36 slice
//! of a content hash. Creation sites retry with an incremented nonce on the
//! rare collision.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};

/// Base36 alphabet (0-9, a-z).
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hash slice length used for all funnel IDs.
const ID_LENGTH: usize = 5;

/// Entity kinds with their ID prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Lead,
    Call,
    Client,
    Rule,
}

impl EntityKind {
    /// The ID prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Lead => "ld",
            Self::Call => "ca",
            Self::Client => "cl",
            Self::Rule => "fr",
        }
    }
}

/// Converts a byte slice to a base36 string of the specified length,
/// zero-padded on the left and truncated to the least significant digits.
pub fn encode_base36(data: &[u8], length: usize) -> String {
    let mut num = BigUint::from_bytes_be(data);
    let base = BigUint::from(36u32);
    let zero = BigUint::zero();

    let mut chars: Vec<char> = Vec::with_capacity(length);
    while num > zero {
        let rem = &num % &base;
        num /= &base;
        let digits = rem.to_u32_digits();
        let i = if digits.is_empty() { 0 } else { digits[0] as usize };
        chars.push(BASE36_ALPHABET[i] as char);
    }
    chars.reverse();

    let mut s: String = chars.into_iter().collect();
    if s.len() < length {
        s = "0".repeat(length - s.len()) + &s;
    }
    if s.len() > length {
        s = s[s.len() - length..].to_owned();
    }
    s
}

/// Creates a hash-based ID for an entity.
///
/// The seed is whatever identifying content the creation site has (name,
/// handle, message text); the timestamp and nonce make retries distinct.
pub fn generate_id(kind: EntityKind, seed: &str, timestamp: DateTime<Utc>, nonce: i32) -> String {
    let content = format!(
        "{}|{}|{}|{}",
        kind.prefix(),
        seed,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        nonce
    );
    let hash = Sha256::digest(content.as_bytes());

    // 4 hash bytes = 32 bits, comfortably more entropy than 5 base36 chars.
    let short = encode_base36(&hash[..4], ID_LENGTH);
    format!("{}-{}", kind.prefix(), short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_base36_pads_empty_input() {
        assert_eq!(encode_base36(&[], 4), "0000");
    }

    #[test]
    fn encode_base36_exact_length() {
        assert_eq!(encode_base36(&[0xFF, 0xFF], 4).len(), 4);
        assert_eq!(encode_base36(&[0xFF, 0xFF, 0xFF, 0xFF], 3).len(), 3);
    }

    #[test]
    fn generate_id_format() {
        let id = generate_id(EntityKind::Lead, "Ada|@ada", Utc::now(), 0);
        assert!(id.starts_with("ld-"));
        assert_eq!(id.len(), "ld-".len() + ID_LENGTH);
    }

    #[test]
    fn generate_id_deterministic() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            generate_id(EntityKind::Client, "Ada", ts, 0),
            generate_id(EntityKind::Client, "Ada", ts, 0)
        );
    }

    #[test]
    fn generate_id_nonce_changes_output() {
        let ts = Utc::now();
        assert_ne!(
            generate_id(EntityKind::Rule, "msg", ts, 0),
            generate_id(EntityKind::Rule, "msg", ts, 1)
        );
    }

    #[test]
    fn prefixes_are_distinct() {
        let kinds = [
            EntityKind::Lead,
            EntityKind::Call,
            EntityKind::Client,
            EntityKind::Rule,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.prefix(), b.prefix());
            }
        }
    }
}
