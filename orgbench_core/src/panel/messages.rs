use serde::{Deserialize, Serialize};

use crate::storage::EnvironmentDraft;

/// Messages a panel's page side sends to its host.
///
/// The enum is `#[serde(tag = "command")]` so a serialized message looks
/// like `{ "command":"runQuery", "query":"SELECT Id FROM Account" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PageMessage {
    /// Add-environment form submission.
    Submit { data: EnvironmentDraft },
    /// Close the dialog without doing anything.
    Cancel,
    /// Query-editor run request.
    RunQuery { query: String },
}

/// Messages the host pushes back to a panel's page side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// The submitted environment was probed and persisted.
    Saved { name: String },
    /// A query finished; rows are already projected onto `columns`.
    Results {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        total_size: u64,
        done: bool,
    },
    /// Whatever went wrong, in the service's or validator's own words.
    Error { message: String },
    /// The panel is gone; subscribers should stop listening.
    Closed,
}
