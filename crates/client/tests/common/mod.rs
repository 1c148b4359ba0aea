//! Common test utilities for integration tests.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

#[allow(unused_imports)]
pub use confsync_client::testing::load_fixture;

#[allow(unused_imports)]
pub use confsync_client::{AuthStrategy, ConfigAuthorityClient, endpoints};
#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

use secrecy::SecretString;

#[allow(dead_code)]
pub fn secret(value: &str) -> SecretString {
    SecretString::new(value.to_string().into())
}

#[allow(dead_code)]
pub fn shared_secret_client(base_url: &str) -> ConfigAuthorityClient {
    ConfigAuthorityClient::builder()
        .base_url(base_url.to_string())
        .auth_strategy(AuthStrategy::SharedSecret {
            key: secret("shared-secret-key"),
        })
        .build()
        .expect("client should build")
}

#[allow(dead_code)]
pub fn client_credentials_client(base_url: &str, environment: &str) -> ConfigAuthorityClient {
    ConfigAuthorityClient::builder()
        .base_url(base_url.to_string())
        .auth_strategy(AuthStrategy::ClientCredentials {
            client_id: "billing-client".to_string(),
            client_secret: secret("client-secret"),
            environment: environment.to_string(),
        })
        .build()
        .expect("client should build")
}
