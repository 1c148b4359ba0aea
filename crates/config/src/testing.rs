//! Test fixtures shared across the workspace.
//!
//! Enabled by the `test-utils` feature. The keys were generated with OpenSSL
//! (`genpkey -algorithm RSA`, exported as base64 PKCS#8 DER) and are only
//! ever used by tests.

use rand_core::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use secrecy::SecretString;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::encryption::CredentialStore;

/// 2048-bit RSA private key.
pub const PRIVATE_KEY: &str = include_str!("../tests/fixtures/private_key.b64");

/// A second, unrelated 2048-bit RSA private key.
pub const OTHER_PRIVATE_KEY: &str = include_str!("../tests/fixtures/other_private_key.b64");

/// P-256 EC private key in PKCS#8 form.
pub const EC_PRIVATE_KEY: &str = include_str!("../tests/fixtures/ec_private_key.b64");

/// `"secret"` encrypted for [`PRIVATE_KEY`] with PKCS#1 v1.5 padding.
pub const SECRET_CIPHERTEXT: &str = include_str!("../tests/fixtures/secret_ciphertext.b64");

/// A [`CredentialStore`] holding [`PRIVATE_KEY`].
pub fn credential_store() -> CredentialStore {
    CredentialStore::from_base64_pkcs8(&SecretString::new(PRIVATE_KEY.to_string().into()))
        .expect("fixture key parses")
}

/// Encrypt `plaintext` for [`PRIVATE_KEY`] and return it base64-encoded.
pub fn encrypt_with_test_key(plaintext: &str) -> String {
    use rsa::pkcs8::DecodePrivateKey;

    let der = STANDARD.decode(PRIVATE_KEY.trim()).expect("fixture key is base64");
    let private_key = rsa::RsaPrivateKey::from_pkcs8_der(&der).expect("fixture key parses");
    let public_key = RsaPublicKey::from(&private_key);
    let ciphertext = public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext.as_bytes())
        .expect("plaintext fits in one block");
    STANDARD.encode(ciphertext)
}
