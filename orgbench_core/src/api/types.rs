use serde::{Deserialize, Serialize};

/// One result row: field name to JSON value, in the order the service
/// returned them. The service's own `attributes` entry is kept here and
/// dropped at render time.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// What a successful authentication yields: where to send queries and the
/// bearer token to send them with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub instance_url: String,
}

/// A query response, passed through as the service shaped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    #[serde(rename = "totalSize")]
    pub total_size: u64,
    pub done: bool,
    pub records: Vec<Record>,
}

/// Body of the token endpoint's success response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub instance_url: String,
}

/// Body of the token endpoint's error response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenErrorBody {
    #[allow(dead_code)]
    pub error: String,
    pub error_description: String,
}

/// The query endpoint reports errors as a list of these.
#[derive(Debug, Deserialize)]
pub(crate) struct RestErrorBody {
    pub message: String,
    #[serde(rename = "errorCode")]
    #[allow(dead_code)]
    pub error_code: String,
}
