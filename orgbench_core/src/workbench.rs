//! Host-side wiring: the two dialog handlers and the state they share.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use tokio::sync::Mutex;

use crate::api::{AuthSession, QueryApi};
use crate::panel::{Control, HostMessage, PageMessage, PanelHandler, UpdateSink};
use crate::render::table;
use crate::storage::{EnvironmentDraft, EnvironmentProvider};

/// Panel id of the add-environment form.
pub const ENVIRONMENT_FORM_PANEL: &str = "environment-form";
/// Panel id of the query editor.
pub const QUERY_EDITOR_PANEL: &str = "query-editor";

/// Shared state behind both dialogs: the environment list, the remote
/// client, and the staleness threshold.
#[derive(Clone)]
pub struct Workbench {
    provider: Arc<Mutex<EnvironmentProvider>>,
    api: Arc<dyn QueryApi>,
    session_ttl: chrono::Duration,
    /// The one live session, tagged with its environment name. Shared so
    /// a disconnect can revoke what the query editor authenticated.
    session: Arc<Mutex<Option<(String, AuthSession)>>>,
}

impl Workbench {
    pub fn new(
        provider: Arc<Mutex<EnvironmentProvider>>,
        api: Arc<dyn QueryApi>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            provider,
            api,
            session_ttl,
            session: Arc::new(Mutex::new(None)),
        }
    }

    pub fn provider(&self) -> Arc<Mutex<EnvironmentProvider>> {
        self.provider.clone()
    }

    pub fn environment_form(&self) -> Box<EnvironmentFormHandler> {
        Box::new(EnvironmentFormHandler {
            workbench: self.clone(),
        })
    }

    pub fn query_editor(&self) -> Box<QueryEditorHandler> {
        Box::new(QueryEditorHandler {
            workbench: self.clone(),
        })
    }

    /// Log out of `name` (the active record when `None`) and clear its
    /// timestamp. Revocation failures are logged and swallowed; the local
    /// record is cleared either way.
    pub async fn disconnect(&self, name: Option<&str>) -> Result<String, String> {
        let mut provider = self.provider.lock().await;
        let env = match name {
            Some(n) => provider.get(n),
            None => provider.active(),
        }
        .ok_or_else(|| match name {
            Some(n) => format!("no environment named '{n}'"),
            None => "no active environment".to_string(),
        })?;
        let env_name = env.name.clone();

        let mut session = self.session.lock().await;
        if session.as_ref().is_some_and(|(n, _)| *n == env_name) {
            if let Some((_, auth)) = session.take() {
                if let Err(e) = self.api.logout(&auth).await {
                    warn!("token revocation for '{}' failed: {}", env_name, e);
                }
            }
        }

        provider
            .mark_disconnected(&env_name)
            .map_err(|e| e.to_string())?;
        info!("disconnected environment '{}'", env_name);
        Ok(env_name)
    }
}

/// Handles the add-environment form: validate, probe, persist, close.
pub struct EnvironmentFormHandler {
    workbench: Workbench,
}

#[async_trait]
impl PanelHandler for EnvironmentFormHandler {
    async fn on_message(&mut self, message: PageMessage, sink: &UpdateSink) -> Control {
        match message {
            PageMessage::Submit { data } => self.submit(data, sink).await,
            PageMessage::Cancel => Control::Close,
            PageMessage::RunQuery { .. } => {
                sink.send(HostMessage::Error {
                    message: "this panel does not run queries".into(),
                });
                Control::Keep
            }
        }
    }
}

impl EnvironmentFormHandler {
    async fn submit(&self, draft: EnvironmentDraft, sink: &UpdateSink) -> Control {
        if let Err(message) = draft.validate() {
            sink.send(HostMessage::Error { message });
            return Control::Keep;
        }

        {
            let provider = self.workbench.provider.lock().await;
            if provider.get(&draft.name).is_some() {
                sink.send(HostMessage::Error {
                    message: format!("an environment named '{}' already exists", draft.name),
                });
                return Control::Keep;
            }
        }

        // Authentication probe: a record only exists once its credentials
        // have worked at least once.
        let secret = draft.secret();
        let session = match self
            .workbench
            .api
            .login(&draft.login_url, &draft.username, &secret.login_password())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                warn!("authentication probe failed for '{}': {}", draft.name, e);
                sink.send(HostMessage::Error {
                    message: format!("Failed to login: {e}"),
                });
                return Control::Keep;
            }
        };

        let mut provider = self.workbench.provider.lock().await;
        match provider.add(&draft, session.instance_url.clone(), Utc::now()) {
            Ok(record) => {
                sink.send(HostMessage::Saved {
                    name: record.name.clone(),
                });
                Control::Close
            }
            Err(e) => {
                sink.send(HostMessage::Error {
                    message: e.to_string(),
                });
                Control::Keep
            }
        }
    }
}

/// Handles the query editor: resolve the active record, re-authenticate
/// when the record is stale or no session is cached, run the query, and
/// push projected results back.
pub struct QueryEditorHandler {
    workbench: Workbench,
}

#[async_trait]
impl PanelHandler for QueryEditorHandler {
    async fn on_message(&mut self, message: PageMessage, sink: &UpdateSink) -> Control {
        match message {
            PageMessage::RunQuery { query } => {
                let soql = query.trim().to_string();
                if soql.is_empty() {
                    sink.send(HostMessage::Error {
                        message: "Please enter a query".into(),
                    });
                    return Control::Keep;
                }
                match self.run(&soql).await {
                    Ok(message) => sink.send(message),
                    Err(message) => sink.send(HostMessage::Error { message }),
                }
                Control::Keep
            }
            PageMessage::Cancel => Control::Close,
            PageMessage::Submit { .. } => {
                sink.send(HostMessage::Error {
                    message: "this panel does not accept form submissions".into(),
                });
                Control::Keep
            }
        }
    }
}

impl QueryEditorHandler {
    async fn run(&mut self, soql: &str) -> Result<HostMessage, String> {
        let session = self.ensure_session().await?;
        let outcome = self
            .workbench
            .api
            .query(&session, soql)
            .await
            .map_err(|e| format!("Query failed: {e}"))?;

        let columns = table::columns(&outcome.records);
        let rows = table::project(&outcome.records, &columns);
        Ok(HostMessage::Results {
            columns,
            rows,
            total_size: outcome.total_size,
            done: outcome.done,
        })
    }

    /// Reuse the cached session while the active record stays fresh;
    /// otherwise authenticate again and refresh the record.
    async fn ensure_session(&mut self) -> Result<AuthSession, String> {
        let mut provider = self.workbench.provider.lock().await;
        let env = provider
            .active()
            .ok_or("No active environment. Add one with 'env add' or pick one with 'env use'.")?
            .clone();

        let mut cached = self.workbench.session.lock().await;
        if let Some((name, session)) = cached.as_ref() {
            if *name == env.name && !env.is_stale(self.workbench.session_ttl, Utc::now()) {
                return Ok(session.clone());
            }
        }

        let secret = provider.secret(&env.name).map_err(|e| e.to_string())?;
        let session = self
            .workbench
            .api
            .login(&env.login_url, &env.username, &secret.login_password())
            .await
            .map_err(|e| format!("Failed to login: {e}"))?;

        provider
            .mark_connected(&env.name, session.instance_url.clone(), Utc::now())
            .map_err(|e| e.to_string())?;
        *cached = Some((env.name.clone(), session.clone()));
        Ok(session)
    }
}
