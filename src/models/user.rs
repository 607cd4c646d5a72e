use serde::{Deserialize, Serialize};

/// Profile returned by `GET /auth/me`.
///
/// Body metrics are optional - accounts created through the registration
/// endpoint may not have filled them in yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub scopes: Option<String>,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Preferred display name, falling back to the username
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}
