//! Authentication module for managing the token-pair session and credentials.
//!
//! This module provides:
//! - `SessionStore`/`TokenPair`: persistence for the access/refresh token pair
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! The persisted pair is the single source of truth for authentication
//! state; refresh and retry behavior live in [`crate::api::ApiClient`].

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{SessionStore, TokenPair};
