//! RSA decryption of configuration values.
//!
//! Responsibilities:
//! - Parse the configured private key (base64 of a PKCS#8 DER RSA key).
//! - Decrypt single base64 ciphertext blocks (RSA PKCS#1 v1.5) into UTF-8 text.
//!
//! Does NOT handle:
//! - Bulk data encryption; a single RSA block only fits short secrets.
//! - Deciding which entries are encrypted (see the materializer in `confsync-sync`).
//!
//! Invariants:
//! - A malformed key is reported as [`ConfigError::InvalidPrivateKey`] when the
//!   store is built, never on first use.
//! - Any decryption failure is reported as [`ConfigError::KeyMismatch`]; the
//!   underlying cryptographic error text is never surfaced.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use secrecy::{ExposeSecret, SecretString};

use crate::loader::ConfigError;

/// Holds the instance's RSA private key and decrypts configuration values.
pub struct CredentialStore {
    private_key: RsaPrivateKey,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Build a store from a base64-encoded PKCS#8 DER private key.
    ///
    /// Whitespace inside the encoded value is ignored so keys pasted across
    /// several lines still parse.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrivateKey`] if the value is not valid
    /// base64, not PKCS#8, or not an RSA key.
    pub fn from_base64_pkcs8(encoded: &SecretString) -> Result<Self, ConfigError> {
        let compact: String = encoded
            .expose_secret()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let der = STANDARD
            .decode(compact.as_bytes())
            .map_err(|_| ConfigError::InvalidPrivateKey("not valid base64".to_string()))?;

        let private_key = RsaPrivateKey::from_pkcs8_der(&der)
            .map_err(|_| ConfigError::InvalidPrivateKey("not a PKCS#8 RSA key".to_string()))?;

        Ok(Self { private_key })
    }

    /// Modulus size of the configured key, in bits.
    pub fn key_bits(&self) -> usize {
        self.private_key.size() * 8
    }

    /// Decrypt a base64-encoded ciphertext into plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyMismatch`] when the ciphertext cannot be
    /// decoded, was encrypted for a different key, or does not decrypt to UTF-8.
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<String, ConfigError> {
        let ciphertext = STANDARD.decode(ciphertext_b64.trim().as_bytes()).map_err(|_| {
            tracing::debug!("Encrypted value is not valid base64");
            ConfigError::KeyMismatch
        })?;

        let plaintext = self
            .private_key
            .decrypt(Pkcs1v15Encrypt, &ciphertext)
            .map_err(|_| ConfigError::KeyMismatch)?;

        String::from_utf8(plaintext).map_err(|_| ConfigError::KeyMismatch)
    }
}
