//! REST API client module for the nutrition-tracker backend.
//!
//! This module provides the `ApiClient` for authenticating and for
//! reading/writing foods and daily tracker entries.
//!
//! The API uses short-lived JWT access tokens with a longer-lived refresh
//! token; every authenticated call goes through a guarded send path that
//! refreshes and retries once on a 401.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
