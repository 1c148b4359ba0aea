//! Config authority REST client.
//!
//! This crate provides a type-safe client for fetching configuration entries
//! from the config authority. It supports shared-secret bearer authentication
//! and client-credential login with a fresh session per fetch cycle.

mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{AuthStrategy, AuthoritySession};
pub use client::ConfigAuthorityClient;
pub use client::builder::ConfigAuthorityClientBuilder;
pub use error::{ClientError, Result};
pub use models::{ClientLoginRequest, ClientLoginResponse, ConfigEntry};
