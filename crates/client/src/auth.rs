//! Authentication strategies and authority sessions.

use secrecy::{ExposeSecret, SecretString};

use confsync_config::constants::BEARER_TOKEN_PREFIX;

/// Strategy for authenticating with the config authority.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Static shared secret sent as a bearer token on every fetch.
    SharedSecret { key: SecretString },
    /// Client id/secret exchanged for a session before every fetch.
    /// `environment` selects the configuration set to fetch.
    ClientCredentials {
        client_id: String,
        client_secret: SecretString,
        environment: String,
    },
}

impl AuthStrategy {
    /// Whether a login round trip precedes each fetch.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::ClientCredentials { .. })
    }
}

impl From<&confsync_config::AuthStrategy> for AuthStrategy {
    fn from(strategy: &confsync_config::AuthStrategy) -> Self {
        match strategy {
            confsync_config::AuthStrategy::SharedSecret { key } => {
                Self::SharedSecret { key: key.clone() }
            }
            confsync_config::AuthStrategy::ClientCredentials {
                client_id,
                client_secret,
                environment,
            } => Self::ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                environment: environment.as_str().to_string(),
            },
        }
    }
}

/// Session returned by client-credential login. Lives for one fetch cycle.
pub struct AuthoritySession {
    token_type: String,
    access_token: SecretString,
}

impl std::fmt::Debug for AuthoritySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthoritySession")
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

impl AuthoritySession {
    pub fn new(token_type: String, access_token: SecretString) -> Self {
        Self {
            token_type,
            access_token,
        }
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Value for the `Authorization` header: `<tokenType> <accessToken>`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }
}

/// `Authorization` header value for a shared secret.
pub(crate) fn bearer_header(key: &SecretString) -> String {
    format!("{} {}", BEARER_TOKEN_PREFIX, key.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsync_config::TargetEnvironment;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string().into())
    }

    #[test]
    fn test_session_authorization_header() {
        let session = AuthoritySession::new("Bearer".to_string(), secret("abc123"));
        assert_eq!(session.authorization_header(), "Bearer abc123");
        assert_eq!(session.token_type(), "Bearer");
    }

    #[test]
    fn test_session_debug_hides_access_token() {
        let session = AuthoritySession::new("Bearer".to_string(), secret("abc123"));
        let debug_output = format!("{:?}", session);
        assert!(!debug_output.contains("abc123"));
    }

    #[test]
    fn test_bearer_header_for_shared_secret() {
        assert_eq!(bearer_header(&secret("shh")), "Bearer shh");
    }

    #[test]
    fn test_from_config_client_credentials() {
        let config = confsync_config::AuthStrategy::ClientCredentials {
            client_id: "billing".to_string(),
            client_secret: secret("s3cr3t"),
            environment: TargetEnvironment::Production,
        };
        let strategy = AuthStrategy::from(&config);
        assert!(strategy.requires_login());
        match strategy {
            AuthStrategy::ClientCredentials { environment, .. } => {
                assert_eq!(environment, "production");
            }
            AuthStrategy::SharedSecret { .. } => panic!("Expected client credentials"),
        }
    }

    #[test]
    fn test_from_config_shared_secret() {
        let config = confsync_config::AuthStrategy::SharedSecret { key: secret("k") };
        assert!(!AuthStrategy::from(&config).requires_login());
    }
}
