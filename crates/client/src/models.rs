//! Wire models for the config authority API.

use serde::{Deserialize, Serialize};

/// A single configuration entry as served by the authority.
///
/// `value` holds base64 ciphertext when `encrypted` is true, plaintext otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    #[serde(rename = "configKey")]
    pub key: String,
    #[serde(rename = "configValue")]
    pub value: String,
    #[serde(default)]
    pub encrypted: bool,
}

impl ConfigEntry {
    pub fn plain(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            encrypted: false,
        }
    }

    pub fn encrypted(key: impl Into<String>, ciphertext: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: ciphertext.into(),
            encrypted: true,
        }
    }
}

/// Body of `POST /auth/client-login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLoginRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Response of `POST /auth/client-login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLoginResponse {
    pub token_type: String,
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_entry_wire_names() {
        let entry: ConfigEntry = serde_json::from_str(
            r#"{"configKey":"DB_HOST","configValue":"db.internal","encrypted":false}"#,
        )
        .unwrap();
        assert_eq!(entry, ConfigEntry::plain("DB_HOST", "db.internal"));

        let json = serde_json::to_value(ConfigEntry::encrypted("DB_PASS", "AAAA")).unwrap();
        assert_eq!(json["configKey"], "DB_PASS");
        assert_eq!(json["configValue"], "AAAA");
        assert_eq!(json["encrypted"], true);
    }

    #[test]
    fn test_config_entry_encrypted_defaults_to_false() {
        let entry: ConfigEntry =
            serde_json::from_str(r#"{"configKey":"A","configValue":"b"}"#).unwrap();
        assert!(!entry.encrypted);
    }

    #[test]
    fn test_client_login_request_is_camel_case() {
        let json = serde_json::to_value(ClientLoginRequest {
            client_id: "id",
            client_secret: "secret",
        })
        .unwrap();
        assert_eq!(json["clientId"], "id");
        assert_eq!(json["clientSecret"], "secret");
    }
}
