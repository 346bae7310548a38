// ============================================================================
// Message Cipher - Symmetric encryption for text messages at rest
// ============================================================================
//
// Stored text is never plaintext. Each encryption draws a fresh random
// 96-bit nonce, so the same plaintext encrypts to different ciphertexts;
// the nonce is prepended to the AEAD output and the whole thing is base64.
//
// Wire format: base64( nonce[12] || chacha20poly1305(plaintext) )
//
// ============================================================================

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    AeadCore, ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::config::ENCRYPTION_KEY_LEN;

const NONCE_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("ciphertext is not valid base64")]
    InvalidEncoding,

    #[error("ciphertext is too short to contain a nonce")]
    Truncated,

    /// Wrong key, corrupted record, or a forged tag. The AEAD gives no
    /// further detail and neither do we.
    #[error("decryption failed")]
    Aead,

    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("encryption failed")]
    Encrypt,
}

/// Process-wide symmetric cipher, constructed once from config.
pub struct MessageCipher {
    cipher: ChaCha20Poly1305,
}

impl MessageCipher {
    pub fn new(key: &[u8; ENCRYPTION_KEY_LEN]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(key.into()),
        }
    }

    /// Encrypt plaintext for storage. Repeated calls with the same input
    /// produce different ciphertexts (random nonce), all of which decrypt
    /// back to the original string.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let mut buf = Vec::with_capacity(NONCE_LEN + sealed.len());
        buf.extend_from_slice(&nonce);
        buf.extend_from_slice(&sealed);
        Ok(BASE64.encode(buf))
    }

    /// Decrypt a stored ciphertext. Fails on malformed input or a key
    /// mismatch; callers on the read path must treat this as a per-record
    /// failure, not a fatal one.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let raw = BASE64
            .decode(ciphertext)
            .map_err(|_| CryptoError::InvalidEncoding)?;
        if raw.len() < NONCE_LEN {
            return Err(CryptoError::Truncated);
        }

        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Aead)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> MessageCipher {
        MessageCipher::new(&[3u8; ENCRYPTION_KEY_LEN])
    }

    #[test]
    fn round_trip_preserves_exact_input() {
        let cipher = cipher();
        for plaintext in [
            "hello",
            "",
            "line one\nline two\n",
            "καλημέρα κόσμε",
            "🎙️ voice note — ответ",
            "  leading and trailing  ",
        ] {
            let sealed = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&sealed).unwrap(), plaintext);
        }
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let cipher = cipher();
        let first = cipher.encrypt("hello").unwrap();
        let second = cipher.encrypt("hello").unwrap();
        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first).unwrap(), "hello");
        assert_eq!(cipher.decrypt(&second).unwrap(), "hello");
    }

    #[test]
    fn ciphertext_is_not_plaintext() {
        let cipher = cipher();
        let sealed = cipher.encrypt("top secret").unwrap();
        assert!(!sealed.contains("top secret"));
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let sealed = cipher().encrypt("hello").unwrap();
        let other = MessageCipher::new(&[4u8; ENCRYPTION_KEY_LEN]);
        assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Aead)));
    }

    #[test]
    fn tampered_ciphertext_fails_to_decrypt() {
        let cipher = cipher();
        let sealed = cipher.encrypt("hello").unwrap();
        let mut raw = BASE64.decode(&sealed).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = BASE64.encode(raw);
        assert!(matches!(cipher.decrypt(&tampered), Err(CryptoError::Aead)));
    }

    #[test]
    fn malformed_inputs_fail_cleanly() {
        let cipher = cipher();
        assert!(matches!(
            cipher.decrypt("not base64 !!!"),
            Err(CryptoError::InvalidEncoding)
        ));
        assert!(matches!(
            cipher.decrypt(&BASE64.encode(b"short")),
            Err(CryptoError::Truncated)
        ));
    }
}
