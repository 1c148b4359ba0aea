//! Tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test the disabled/enabled decision and issue reporting.
//! - Test environment variable handling and precedence.
//! - Test dotenv loading behavior.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (tested in env.rs).
//! - Key parsing and decryption (tested in encryption.rs).
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Tests use `global_test_lock()` for additional synchronization.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::sync::Mutex;


/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}
