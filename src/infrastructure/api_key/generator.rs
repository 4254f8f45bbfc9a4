//! API key secret generation and hashing

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of the random portion kept in the lookup prefix
const LOOKUP_CHARS: usize = 8;

const RANDOM_BYTES: usize = 32;

/// A freshly generated secret with its stored forms
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// Plaintext secret, handed to the caller once
    pub secret: String,
    /// Type prefix plus the first random characters, used for lookup
    pub key_prefix: String,
    pub key_hash: String,
}

/// Generates `tk_live_...` style secrets
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    type_prefix: String,
}

impl ApiKeyGenerator {
    pub fn new(type_prefix: impl Into<String>) -> Self {
        Self {
            type_prefix: type_prefix.into(),
        }
    }

    pub fn live() -> Self {
        Self::new("tk_live_")
    }

    pub fn test() -> Self {
        Self::new("tk_test_")
    }

    pub fn generate(&self) -> GeneratedApiKey {
        let mut bytes = [0u8; RANDOM_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        self.from_random_part(&URL_SAFE_NO_PAD.encode(&bytes))
    }

    /// Build a key around a caller-chosen random part
    pub fn from_random_part(&self, random: &str) -> GeneratedApiKey {
        let secret = format!("{}{}", self.type_prefix, random);
        let lookup_len: usize = random.chars().take(LOOKUP_CHARS).map(char::len_utf8).sum();
        let lookup_end = self.type_prefix.len() + lookup_len;

        GeneratedApiKey {
            key_prefix: secret[..lookup_end].to_string(),
            key_hash: hash_secret(&secret),
            secret,
        }
    }

    /// Lookup prefix of a presented secret, or `None` if it was not issued
    /// by this generator
    pub fn lookup_prefix<'a>(&self, secret: &'a str) -> Option<&'a str> {
        let random = secret.strip_prefix(self.type_prefix.as_str())?;
        let (lookup_end, _) = random.char_indices().nth(LOOKUP_CHARS - 1)?;
        let lookup_end = lookup_end + random[lookup_end..].chars().next()?.len_utf8();

        Some(&secret[..self.type_prefix.len() + lookup_end])
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::live()
    }
}

/// `sha256$<base64url digest>`
pub fn hash_secret(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    format!("sha256${}", URL_SAFE_NO_PAD.encode(digest))
}

/// Compare a presented secret against a stored hash in constant time
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    constant_time_eq(hash_secret(secret).as_bytes(), stored_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_live_key() {
        let key = ApiKeyGenerator::live().generate();

        assert!(key.secret.starts_with("tk_live_"));
        assert_eq!(key.key_prefix.len(), "tk_live_".len() + 8);
        assert!(key.secret.starts_with(&key.key_prefix));
        assert!(key.key_hash.starts_with("sha256$"));
        // 32 bytes encode to 43 base64url characters
        assert_eq!(key.secret.len(), "tk_live_".len() + 43);
    }

    #[test]
    fn test_generated_keys_differ() {
        let generator = ApiKeyGenerator::test();
        let a = generator.generate();
        let b = generator.generate();

        assert_ne!(a.secret, b.secret);
        assert_ne!(a.key_hash, b.key_hash);
    }

    #[test]
    fn test_verify_secret() {
        let key = ApiKeyGenerator::live().generate();

        assert!(verify_secret(&key.secret, &key.key_hash));
        assert!(!verify_secret("tk_live_tampered", &key.key_hash));
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_secret("tk_test_abc"), hash_secret("tk_test_abc"));
        assert_ne!(hash_secret("tk_test_abc"), hash_secret("tk_test_abd"));
    }

    #[test]
    fn test_from_random_part() {
        let key = ApiKeyGenerator::test().from_random_part("abcdefghijkl");

        assert_eq!(key.secret, "tk_test_abcdefghijkl");
        assert_eq!(key.key_prefix, "tk_test_abcdefgh");
    }

    #[test]
    fn test_non_ascii_random_part() {
        let generator = ApiKeyGenerator::test();
        let key = generator.from_random_part("aéééééééééé");

        assert_eq!(key.key_prefix, "tk_test_aééééééé");
        assert_eq!(generator.lookup_prefix(&key.secret), Some(key.key_prefix.as_str()));

        let short = generator.from_random_part("éé");
        assert_eq!(short.key_prefix, "tk_test_éé");
        assert_eq!(generator.lookup_prefix(&short.secret), None);
    }

    #[test]
    fn test_lookup_prefix() {
        let generator = ApiKeyGenerator::live();

        assert_eq!(
            generator.lookup_prefix("tk_live_abcdefghXYZ"),
            Some("tk_live_abcdefgh")
        );
        assert_eq!(generator.lookup_prefix("tk_test_abcdefghXYZ"), None);
        assert_eq!(generator.lookup_prefix("tk_live_abc"), None);
        assert_eq!(generator.lookup_prefix("garbage"), None);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"same", b"same"));
        assert!(!constant_time_eq(b"same", b"sane"));
        assert!(!constant_time_eq(b"same", b"sam"));
    }
}
