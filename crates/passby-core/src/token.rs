//! Token blob checks
//!
//! The relay never looks inside a token. The only requirement is that it
//! decodes as standard (padded) Base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Decoded size of a token in bytes, or `None` if it is not valid Base64
pub fn decoded_len(token: &str) -> Option<usize> {
    STANDARD.decode(token).ok().map(|bytes| bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tokens() {
        assert!(decoded_len("QQ==").is_some());
        assert!(decoded_len("Qg==").is_some());
        assert!(decoded_len("aGVsbG8gd29ybGQ=").is_some());
        assert!(decoded_len("AAECAwQFBgcICQoLDA0ODw==").is_some());
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(decoded_len("not base64!").is_none());
        assert!(decoded_len("QQ=").is_none());
        assert!(decoded_len("Q").is_none());
        assert!(decoded_len("QQ==QQ==").is_none());
    }

    #[test]
    fn test_decoded_len() {
        assert_eq!(decoded_len("QQ=="), Some(1));
        assert_eq!(decoded_len("aGVsbG8gd29ybGQ="), Some(11));
        assert_eq!(decoded_len("%%%"), None);
    }
}
