use std::sync::Arc;

use orgbench_core::api::QueryApi;
use orgbench_core::panel::HostMessage;
use orgbench_core::storage::{
    EnvironmentDraft, EnvironmentProvider, EnvironmentStore, MemorySecretStore,
};
use orgbench_core::Workbench;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{timeout, Duration};

/// A workbench over a temp-dir store and in-memory secrets.
pub fn workbench(api: Arc<dyn QueryApi>, dir: &std::path::Path) -> Workbench {
    let store = EnvironmentStore::at(dir.to_path_buf()).expect("store in temp dir");
    let provider =
        EnvironmentProvider::open(store, Box::new(MemorySecretStore::new())).expect("empty list");
    Workbench::new(
        Arc::new(Mutex::new(provider)),
        api,
        chrono::Duration::minutes(120),
    )
}

pub fn draft(name: &str) -> EnvironmentDraft {
    EnvironmentDraft {
        name: name.into(),
        login_url: "https://login.example.com".into(),
        username: "me@example.com".into(),
        password: "hunter2".into(),
        security_token: Some("TOKEN".into()),
    }
}

/// Next host message, or panic after a generous timeout.
pub async fn next_update(rx: &mut broadcast::Receiver<HostMessage>) -> HostMessage {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timed out waiting for a host message")
        .expect("panel broadcast closed unexpectedly")
}
