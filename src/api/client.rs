//! API client for communicating with the nutrition-tracker REST API.
//!
//! This module provides the `ApiClient` struct for authenticating and
//! making bearer-token requests against the backend. All authenticated
//! endpoints funnel through a single guarded send path that detects 401
//! responses, performs one refresh-token exchange, and retries the
//! original request exactly once. Concurrent callers that hit a 401 at
//! the same time share a single exchange instead of issuing duplicates.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Request, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::auth::{SessionStore, TokenPair};
use crate::models::{Food, FoodCreate, TrackerEntry, TrackerEntryCreate, UserProfile};

use super::ApiError;

/// HTTP request timeout in seconds.
/// Applies to every request including the refresh exchange, so a hung
/// refresh cannot stall callers indefinitely.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

/// Registration may or may not return a token pair depending on backend
/// configuration; a session is only established when it does.
#[derive(Debug, Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Shared session state behind the client.
///
/// `tokens` is an in-memory cache of the persisted pair; the session file
/// stays the source of truth and both are always updated together.
/// `refresh_lock` serializes the refresh exchange: the first 401ed caller
/// performs it, later callers acquire the lock, observe the rotated pair
/// and reuse it without a second exchange.
struct SessionState {
    store: SessionStore,
    tokens: RwLock<Option<TokenPair>>,
    refresh_lock: Mutex<()>,
}

/// API client for the nutrition-tracker backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionState>,
}

impl ApiClient {
    /// Create a new API client, initializing session state from the
    /// pair persisted under `data_dir` (if any).
    pub fn new(base_url: impl Into<String>, data_dir: PathBuf) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let store = SessionStore::new(data_dir);
        let tokens = store
            .load()
            .map_err(|e| ApiError::Storage(format!("{e:#}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Arc::new(SessionState {
                store,
                tokens: RwLock::new(tokens),
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    /// Whether a session is currently established
    pub async fn is_authenticated(&self) -> bool {
        self.session.tokens.read().await.is_some()
    }

    // ===== Session lifecycle =====

    /// Authenticate with username/password and establish a session.
    ///
    /// On failure the existing persisted session (if any) is left intact.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = format!("{}/auth/token", self.base_url);
        debug!(%username, "Sending login request");

        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse token response: {e}")))?;

        self.install_pair(TokenPair {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
        .await?;
        debug!("Login succeeded, session established");
        Ok(())
    }

    /// Create a new account. Returns `true` if the backend returned a
    /// token pair and a session was established, `false` if the account
    /// was created but a separate login is required.
    pub async fn register(&self, username: &str, password: &str) -> Result<bool, ApiError> {
        let url = format!("{}/auth/register", self.base_url);
        let body = serde_json::json!({ "username": username, "password": password });

        let response = self.http.post(&url).json(&body).send().await?;
        let response = Self::check_response(response).await?;

        let parsed: RegisterResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse register response: {e}")))?;

        match (parsed.access_token, parsed.refresh_token) {
            (Some(access_token), Some(refresh_token)) => {
                self.install_pair(TokenPair {
                    access_token,
                    refresh_token,
                })
                .await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Drop the session unconditionally. Idempotent; storage errors are
    /// logged rather than surfaced since there is nothing for the caller
    /// to recover.
    pub async fn logout(&self) {
        *self.session.tokens.write().await = None;
        if let Err(e) = self.session.store.clear() {
            warn!(error = %e, "Failed to remove session file during logout");
        }
    }

    // ===== Authenticated endpoints =====

    /// Fetch the current user's profile
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/auth/me").await
    }

    /// Fetch the user's food catalog
    pub async fn list_foods(&self) -> Result<Vec<Food>, ApiError> {
        self.get_json("/foods").await
    }

    /// Add a new food to the user's catalog
    pub async fn add_food(&self, food: &FoodCreate) -> Result<Food, ApiError> {
        self.post_json("/foods", food).await
    }

    /// Fetch all tracker entries for the user
    pub async fn tracker_entries(&self) -> Result<Vec<TrackerEntry>, ApiError> {
        self.get_json("/tracker").await
    }

    /// Record a manual tracker entry
    pub async fn add_tracker_entry(
        &self,
        entry: &TrackerEntryCreate,
    ) -> Result<TrackerEntry, ApiError> {
        self.post_json("/tracker", entry).await
    }

    /// Add a cataloged food's macros to today's tracker entry
    pub async fn add_food_to_tracker(&self, food_id: i64) -> Result<TrackerEntry, ApiError> {
        let request = self
            .http
            .post(format!("{}/tracker/add-food", self.base_url))
            .query(&[("food_id", food_id)])
            .build()?;
        let response = self.send_authenticated(request).await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    // ===== Guarded send path =====

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .build()?;
        let response = self.send_authenticated(request).await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .build()?;
        let response = self.send_authenticated(request).await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    /// Send `request` with the current access token attached.
    ///
    /// Non-401 responses pass through unchanged. A 401 triggers one
    /// (coalesced) refresh exchange followed by exactly one retry of the
    /// original request; a 401 on the retry clears the session and yields
    /// `SessionExpired`. Transport errors surface immediately and never
    /// trigger a refresh.
    async fn send_authenticated(&self, request: Request) -> Result<reqwest::Response, ApiError> {
        let access = match self.current_access_token().await {
            Some(token) => token,
            None => return Err(ApiError::SessionExpired),
        };

        let response = self
            .http
            .execute(Self::with_bearer(&request, &access)?)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url = %request.url(), "Access token rejected, attempting refresh");
        let rotated = self.refresh_after(&access).await?;

        let retry = self
            .http
            .execute(Self::with_bearer(&request, &rotated)?)
            .await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %request.url(), "Request still unauthorized after refresh, clearing session");
            self.clear_session().await;
            return Err(ApiError::SessionExpired);
        }
        Ok(retry)
    }

    /// Exchange the refresh token for a new pair, serialized across
    /// concurrent callers.
    ///
    /// `failed_access` is the access token the caller just saw rejected.
    /// If the stored pair has already rotated past it by the time the
    /// lock is acquired, another caller completed the exchange and its
    /// result is reused. Any failure of the exchange itself is terminal:
    /// the session is cleared and the caller must log in again.
    async fn refresh_after(&self, failed_access: &str) -> Result<String, ApiError> {
        let _guard = self.session.refresh_lock.lock().await;

        let pair = match self.session.tokens.read().await.clone() {
            Some(pair) => pair,
            // A concurrent failure already tore the session down
            None => return Err(ApiError::SessionExpired),
        };
        if pair.access_token != failed_access {
            debug!("Token pair already rotated by a concurrent refresh");
            return Ok(pair.access_token);
        }

        // Refresh endpoint takes the refresh token as the bearer
        // credential with no body
        let url = format!("{}/auth/refresh", self.base_url);
        let response = match self
            .http
            .post(&url)
            .bearer_auth(&pair.refresh_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.clear_session().await;
                return Err(ApiError::Network(e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Refresh exchange rejected, clearing session");
            self.clear_session().await;
            // Preserve the server's reason for non-auth failures
            return match ApiError::from_status(status, &body) {
                ApiError::Auth(_) => Err(ApiError::SessionExpired),
                other => Err(other),
            };
        }

        let tokens: TokenResponse = match response.json().await {
            Ok(tokens) => tokens,
            Err(e) => {
                self.clear_session().await;
                return Err(ApiError::InvalidResponse(format!(
                    "Failed to parse refresh response: {e}"
                )));
            }
        };

        let rotated = TokenPair {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        };
        self.install_pair(rotated.clone()).await?;
        debug!("Refresh exchange succeeded, token pair rotated");
        Ok(rotated.access_token)
    }

    // ===== Helpers =====

    async fn current_access_token(&self) -> Option<String> {
        self.session
            .tokens
            .read()
            .await
            .as_ref()
            .map(|p| p.access_token.clone())
    }

    /// Persist a pair and update the in-memory cache together
    async fn install_pair(&self, pair: TokenPair) -> Result<(), ApiError> {
        self.session
            .store
            .save(&pair)
            .map_err(|e| ApiError::Storage(format!("{e:#}")))?;
        *self.session.tokens.write().await = Some(pair);
        Ok(())
    }

    async fn clear_session(&self) {
        *self.session.tokens.write().await = None;
        if let Err(e) = self.session.store.clear() {
            warn!(error = %e, "Failed to remove session file");
        }
    }

    /// Clone the request with the given bearer token attached. The clone
    /// is what makes the single retry possible: the original stays
    /// untouched as the replay template.
    fn with_bearer(request: &Request, token: &str) -> Result<Request, ApiError> {
        let mut cloned = request.try_clone().ok_or_else(|| {
            ApiError::InvalidResponse("Request body cannot be replayed".to_string())
        })?;
        let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::InvalidResponse("Token is not a valid header value".to_string()))?;
        cloned.headers_mut().insert(header::AUTHORIZATION, value);
        Ok(cloned)
    }

    /// Check if response is successful, returning an error with the
    /// server-provided detail if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {e}")))
    }
}
