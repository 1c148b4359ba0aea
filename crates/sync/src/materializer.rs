//! Materialization of configuration entries into the local environment file.
//!
//! Responsibilities:
//! - Decrypt encrypted entries through the [`CredentialStore`].
//! - Render entries as `key=value` lines in input order.
//! - Replace the environment file atomically (temp file in the same directory, then rename).
//!
//! Does NOT handle:
//! - Escaping. Keys containing `=` and values containing newlines corrupt the file;
//!   the authority must not send them.
//! - Loading the written file into the host process (the host reads it on relaunch).
//!
//! Invariants:
//! - Every entry is decrypted before the file is touched, so a decryption
//!   failure leaves the previous file intact.
//! - The target is either fully replaced or untouched; no stale keys survive a persist.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use confsync_client::ConfigEntry;
use confsync_config::{ConfigError, CredentialStore};

use crate::error::{PersistError, SyncError};

/// Writes configuration entries to the environment file.
#[derive(Debug, Clone)]
pub struct ConfigMaterializer {
    credentials: Arc<CredentialStore>,
    path: PathBuf,
}

impl ConfigMaterializer {
    pub fn new(credentials: Arc<CredentialStore>, path: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            path: path.into(),
        }
    }

    /// Path of the environment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render entries as `key=value\n` lines, decrypting as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyMismatch`] if any encrypted value cannot be decrypted.
    pub fn render(&self, entries: &[ConfigEntry]) -> Result<String, ConfigError> {
        let mut contents = String::new();
        for entry in entries {
            if entry.encrypted {
                let plaintext = self.credentials.decrypt(&entry.value).inspect_err(|_| {
                    tracing::error!(key = %entry.key, "Failed to decrypt configuration value");
                })?;
                push_line(&mut contents, &entry.key, &plaintext);
            } else {
                push_line(&mut contents, &entry.key, &entry.value);
            }
        }
        Ok(contents)
    }

    /// Decrypt and persist entries, replacing the environment file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] for decryption failures (file untouched)
    /// and [`SyncError::Persist`] for I/O failures.
    pub fn persist(&self, entries: &[ConfigEntry]) -> Result<(), SyncError> {
        let contents = self.render(entries)?;

        write_atomic(&self.path, &contents).map_err(|source| PersistError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.path.display(),
            entries = entries.len(),
            "Application config persisted"
        );
        Ok(())
    }
}

fn push_line(contents: &mut String, key: &str, value: &str) {
    contents.push_str(key);
    contents.push('=');
    contents.push_str(value);
    contents.push('\n');
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
    temp_file.write_all(contents.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsync_config::testing;
    use tempfile::TempDir;

    fn materializer(dir: &TempDir) -> ConfigMaterializer {
        ConfigMaterializer::new(
            Arc::new(testing::credential_store()),
            dir.path().join(".env"),
        )
    }

    #[test]
    fn test_plain_and_encrypted_entries() {
        let dir = TempDir::new().unwrap();
        let materializer = materializer(&dir);

        materializer
            .persist(&[
                ConfigEntry::plain("A", "plain"),
                ConfigEntry::encrypted("B", testing::SECRET_CIPHERTEXT),
            ])
            .unwrap();

        let written = std::fs::read_to_string(materializer.path()).unwrap();
        assert_eq!(written, "A=plain\nB=secret\n");
    }

    #[test]
    fn test_plain_values_are_written_verbatim() {
        let dir = TempDir::new().unwrap();
        let materializer = materializer(&dir);

        // Would fail if decryption were attempted.
        materializer
            .persist(&[ConfigEntry::plain("TOKEN", "bm90LWNpcGhlcnRleHQ=")])
            .unwrap();

        let written = std::fs::read_to_string(materializer.path()).unwrap();
        assert_eq!(written, "TOKEN=bm90LWNpcGhlcnRleHQ=\n");
    }

    #[test]
    fn test_persist_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let materializer = materializer(&dir);

        materializer
            .persist(&[ConfigEntry::plain("OLD", "1"), ConfigEntry::plain("KEEP", "1")])
            .unwrap();
        materializer
            .persist(&[ConfigEntry::plain("KEEP", "2")])
            .unwrap();

        let written = std::fs::read_to_string(materializer.path()).unwrap();
        assert_eq!(written, "KEEP=2\n");
    }

    #[test]
    fn test_decrypt_failure_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let materializer = materializer(&dir);
        std::fs::write(materializer.path(), "EXISTING=1\n").unwrap();

        let err = materializer
            .persist(&[
                ConfigEntry::plain("A", "plain"),
                ConfigEntry::encrypted("B", "bm90LWNpcGhlcnRleHQ="),
            ])
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Configuration(ConfigError::KeyMismatch)
        ));
        let written = std::fs::read_to_string(materializer.path()).unwrap();
        assert_eq!(written, "EXISTING=1\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_parent_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let materializer = ConfigMaterializer::new(
            Arc::new(testing::credential_store()),
            dir.path().join("nested/config/.env"),
        );

        materializer.persist(&[ConfigEntry::plain("A", "1")]).unwrap();
        assert_eq!(
            std::fs::read_to_string(materializer.path()).unwrap(),
            "A=1\n"
        );
    }

    #[test]
    fn test_unwritable_target_is_persist_error() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the file makes the final rename fail.
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("inner"), "x").unwrap();

        let materializer =
            ConfigMaterializer::new(Arc::new(testing::credential_store()), target);
        let err = materializer
            .persist(&[ConfigEntry::plain("A", "1")])
            .unwrap_err();
        assert!(matches!(err, SyncError::Persist(_)));
    }

    #[test]
    fn test_empty_entries_write_empty_file() {
        let dir = TempDir::new().unwrap();
        let materializer = materializer(&dir);
        materializer.persist(&[]).unwrap();
        assert_eq!(std::fs::read_to_string(materializer.path()).unwrap(), "");
    }
}
