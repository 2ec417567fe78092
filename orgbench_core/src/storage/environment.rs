use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A user-named CRM environment record.
///
/// Secrets never appear in this struct's JSON: the password and security
/// token live in a [`super::SecretStore`] keyed by the environment name.
/// JSON looks like:
/// `{ "name":"dev", "login_url":"https://login.example.com", "username":"me@example.com", "active":true }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub login_url: String,
    pub username: String,
    /// Resolved by the first successful authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_url: Option<String>,
    /// At most one record in a list is active at a time.
    #[serde(default)]
    pub active: bool,
    /// Last successful authentication; cleared on disconnect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_connected_at: Option<DateTime<Utc>>,
}

impl Environment {
    /// A record is stale when it never authenticated or its last
    /// authentication is older than `ttl`.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.last_connected_at {
            Some(at) => now.signed_duration_since(at) > ttl,
            None => true,
        }
    }
}

/// Everything the add-environment form collects, secrets included.
///
/// Drafts only live for the duration of one form exchange; on success the
/// non-secret fields become an [`Environment`] and the secrets go to the
/// secret store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentDraft {
    pub name: String,
    pub login_url: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_token: Option<String>,
}

impl EnvironmentDraft {
    /// First problem with the draft, phrased for the user.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Environment name must not be empty".into());
        }
        if !self.login_url.starts_with("http://") && !self.login_url.starts_with("https://") {
            return Err(format!("Login URL '{}' is not an http(s) URL", self.login_url));
        }
        if self.username.trim().is_empty() {
            return Err("Username must not be empty".into());
        }
        if self.password.is_empty() {
            return Err("Password must not be empty".into());
        }
        Ok(())
    }

    pub fn secret(&self) -> EnvironmentSecret {
        EnvironmentSecret {
            password: self.password.clone(),
            security_token: self.security_token.clone(),
        }
    }
}

/// The secret half of a record, serialized as one secret-store entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSecret {
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_token: Option<String>,
}

impl EnvironmentSecret {
    /// The credential actually sent to the token endpoint: password with
    /// the security token appended when one is set.
    pub fn login_password(&self) -> String {
        match &self.security_token {
            Some(token) => format!("{}{}", self.password, token),
            None => self.password.clone(),
        }
    }
}
