pub mod api;
pub mod config;
pub mod panel;
pub mod render;
pub mod storage;
pub mod utils;
pub mod workbench;

// re‑export ergonomic entry points
pub use api::{AuthSession, HttpQueryApi, QueryApi, QueryOutcome};
pub use panel::hub::PanelHub;
pub use storage::{Environment, EnvironmentProvider, EnvironmentStore};
pub use workbench::Workbench;
