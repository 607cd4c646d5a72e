//! nutritrack - a client for a nutrition-tracking REST API.
//!
//! The backend issues a short-lived access token and a longer-lived
//! refresh token on login. [`ApiClient`] owns that pair: it persists it
//! across runs, attaches the access token to every authenticated request,
//! and when a request comes back 401 it exchanges the refresh token for a
//! new pair and retries the original request exactly once. Concurrent
//! requests that fail at the same time share a single exchange.
//!
//! The crate is organized like the application it serves:
//! - [`api`]: the HTTP client, guarded send path, and error taxonomy
//! - [`auth`]: token-pair persistence and keychain credential storage
//! - [`models`]: wire types for profile, foods, and tracker entries
//! - [`config`]: base URL and user preferences

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionStore, TokenPair};
pub use config::Config;
