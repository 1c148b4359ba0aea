//! Pub/sub broker settings.
//!
//! Responsibilities:
//! - Hold the broker address, security protocol, and SASL settings.
//! - Derive the key/value client properties a broker client is built from.
//!
//! Invariants:
//! - `sasl.*` properties are only emitted for SASL protocols.
//! - The JAAS config may embed a password and is kept in a `SecretString`.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;

/// Transport security for the broker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityProtocol {
    Plaintext,
    Ssl,
    SaslPlaintext,
    SaslSsl,
}

impl SecurityProtocol {
    pub const ALL: [SecurityProtocol; 4] = [
        Self::Plaintext,
        Self::Ssl,
        Self::SaslPlaintext,
        Self::SaslSsl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::Ssl => "SSL",
            Self::SaslPlaintext => "SASL_PLAINTEXT",
            Self::SaslSsl => "SASL_SSL",
        }
    }

    pub fn uses_sasl(&self) -> bool {
        matches!(self, Self::SaslPlaintext | Self::SaslSsl)
    }
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.as_str()).collect();
                format!("must be one of {}", names.join(", "))
            })
    }
}

/// Connection settings for the pub/sub broker.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub bootstrap_servers: String,
    pub security_protocol: SecurityProtocol,
    pub sasl_mechanism: String,
    pub sasl_jaas_config: SecretString,
    pub session_timeout_ms: u64,
    pub client_dns_lookup: String,
}

impl BrokerSettings {
    /// Client properties for a broker client.
    ///
    /// Pass a `group_id` when building a consumer; producers and admin
    /// clients take none.
    pub fn client_properties(&self, group_id: Option<&str>) -> Vec<(String, String)> {
        let mut properties = vec![
            (
                "bootstrap.servers".to_string(),
                self.bootstrap_servers.clone(),
            ),
            (
                "client.dns.lookup".to_string(),
                self.client_dns_lookup.clone(),
            ),
            (
                "session.timeout.ms".to_string(),
                self.session_timeout_ms.to_string(),
            ),
            (
                "security.protocol".to_string(),
                self.security_protocol.as_str().to_string(),
            ),
        ];

        if let Some(group_id) = group_id {
            properties.push(("group.id".to_string(), group_id.to_string()));
        }

        if self.security_protocol.uses_sasl() {
            properties.push(("sasl.mechanism".to_string(), self.sasl_mechanism.clone()));
            properties.push((
                "sasl.jaas.config".to_string(),
                self.sasl_jaas_config.expose_secret().to_string(),
            ));
        }

        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(protocol: SecurityProtocol) -> BrokerSettings {
        BrokerSettings {
            bootstrap_servers: "kafka-1:9092,kafka-2:9092".to_string(),
            security_protocol: protocol,
            sasl_mechanism: "PLAIN".to_string(),
            sasl_jaas_config: SecretString::new("jaas-with-password".to_string().into()),
            session_timeout_ms: 45_000,
            client_dns_lookup: "use_all_dns_ips".to_string(),
        }
    }

    fn lookup<'a>(props: &'a [(String, String)], key: &str) -> Option<&'a str> {
        props
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_sasl_ssl_properties_include_sasl() {
        let props = settings(SecurityProtocol::SaslSsl).client_properties(Some("pod-a"));
        assert_eq!(lookup(&props, "security.protocol"), Some("SASL_SSL"));
        assert_eq!(lookup(&props, "sasl.mechanism"), Some("PLAIN"));
        assert_eq!(lookup(&props, "sasl.jaas.config"), Some("jaas-with-password"));
        assert_eq!(lookup(&props, "group.id"), Some("pod-a"));
        assert_eq!(lookup(&props, "session.timeout.ms"), Some("45000"));
    }

    #[test]
    fn test_plaintext_properties_omit_sasl() {
        let props = settings(SecurityProtocol::Plaintext).client_properties(None);
        assert_eq!(lookup(&props, "security.protocol"), Some("PLAINTEXT"));
        assert!(lookup(&props, "sasl.mechanism").is_none());
        assert!(lookup(&props, "sasl.jaas.config").is_none());
        assert!(lookup(&props, "group.id").is_none());
    }

    #[test]
    fn test_security_protocol_parse() {
        assert_eq!(
            "sasl_ssl".parse::<SecurityProtocol>(),
            Ok(SecurityProtocol::SaslSsl)
        );
        assert!("TLS".parse::<SecurityProtocol>().is_err());
    }

    #[test]
    fn test_jaas_config_not_exposed_in_debug() {
        let debug_output = format!("{:?}", settings(SecurityProtocol::SaslSsl));
        assert!(!debug_output.contains("jaas-with-password"));
    }
}
