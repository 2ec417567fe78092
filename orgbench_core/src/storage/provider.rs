use chrono::{DateTime, Utc};
use log::{info, warn};

use super::environment::{Environment, EnvironmentDraft, EnvironmentSecret};
use super::errors::StoreError;
use super::secrets::SecretStore;
use super::store::EnvironmentStore;

/// Owner of the in-memory environment list.
///
/// Every mutation rewrites the whole persisted list before returning, so
/// the file always matches what callers last saw. The single-active-record
/// invariant is enforced the same way: `set_active` rewrites the flag on
/// every record.
pub struct EnvironmentProvider {
    environments: Vec<Environment>,
    store: EnvironmentStore,
    secrets: Box<dyn SecretStore>,
}

impl EnvironmentProvider {
    pub fn open(store: EnvironmentStore, secrets: Box<dyn SecretStore>) -> Result<Self, StoreError> {
        let environments = store.load()?;
        Ok(Self {
            environments,
            store,
            secrets,
        })
    }

    pub fn list(&self) -> &[Environment] {
        &self.environments
    }

    pub fn get(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    pub fn active(&self) -> Option<&Environment> {
        self.environments.iter().find(|e| e.active)
    }

    /// Add a record from a validated draft. The caller has already run the
    /// authentication probe; `instance_url` is what it resolved. The first
    /// record in an empty list becomes active.
    pub fn add(
        &mut self,
        draft: &EnvironmentDraft,
        instance_url: String,
        connected_at: DateTime<Utc>,
    ) -> Result<&Environment, StoreError> {
        if self.get(&draft.name).is_some() {
            return Err(StoreError::DuplicateName(draft.name.clone()));
        }

        let secret = draft.secret();
        self.secrets.store(&draft.name, &serialize_secret(&secret)?)?;

        let record = Environment {
            name: draft.name.clone(),
            login_url: draft.login_url.clone(),
            username: draft.username.clone(),
            instance_url: Some(instance_url),
            active: self.environments.is_empty(),
            last_connected_at: Some(connected_at),
        };
        self.environments.push(record);
        self.persist()?;
        info!("added environment '{}'", draft.name);
        Ok(self.environments.last().unwrap())
    }

    /// Remove a record and its secret. Confirmation is the caller's job.
    pub fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        let idx = self
            .position(name)
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))?;
        self.environments.remove(idx);
        if let Err(e) = self.secrets.delete(name) {
            warn!("could not delete secret for '{}': {}", name, e);
        }
        self.persist()?;
        info!("removed environment '{}'", name);
        Ok(())
    }

    /// Designate `name` as the active record, clearing the flag everywhere
    /// else, and rewrite the list.
    pub fn set_active(&mut self, name: &str) -> Result<(), StoreError> {
        if self.get(name).is_none() {
            return Err(StoreError::UnknownName(name.to_string()));
        }
        for env in &mut self.environments {
            env.active = env.name == name;
        }
        self.persist()?;
        info!("environment '{}' is now active", name);
        Ok(())
    }

    /// Record a successful authentication: refresh the timestamp and the
    /// resolved instance URL.
    pub fn mark_connected(
        &mut self,
        name: &str,
        instance_url: String,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let idx = self
            .position(name)
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))?;
        self.environments[idx].instance_url = Some(instance_url);
        self.environments[idx].last_connected_at = Some(at);
        self.persist()
    }

    /// Clear the last-authentication timestamp.
    pub fn mark_disconnected(&mut self, name: &str) -> Result<(), StoreError> {
        let idx = self
            .position(name)
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))?;
        self.environments[idx].last_connected_at = None;
        self.persist()
    }

    /// Fetch the secret half of a record.
    pub fn secret(&self, name: &str) -> Result<EnvironmentSecret, StoreError> {
        if self.get(name).is_none() {
            return Err(StoreError::UnknownName(name.to_string()));
        }
        let raw = self.secrets.retrieve(name)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.environments.iter().position(|e| e.name == name)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save_all(&self.environments)
    }
}

fn serialize_secret(secret: &EnvironmentSecret) -> Result<String, StoreError> {
    Ok(serde_json::to_string(secret)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::secrets::MemorySecretStore;
    use anyhow::Result;

    fn provider(dir: &std::path::Path) -> Result<EnvironmentProvider> {
        let store = EnvironmentStore::at(dir.to_path_buf())?;
        Ok(EnvironmentProvider::open(
            store,
            Box::new(MemorySecretStore::new()),
        )?)
    }

    fn draft(name: &str) -> EnvironmentDraft {
        EnvironmentDraft {
            name: name.into(),
            login_url: "https://login.example.com".into(),
            username: "me@example.com".into(),
            password: "hunter2".into(),
            security_token: Some("TOKEN".into()),
        }
    }

    #[test]
    fn first_added_record_becomes_active() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut provider = provider(dir.path())?;

        provider.add(&draft("dev"), "https://dev.example.com".into(), Utc::now())?;
        provider.add(&draft("prod"), "https://prod.example.com".into(), Utc::now())?;

        assert_eq!(provider.active().unwrap().name, "dev");
        Ok(())
    }

    #[test]
    fn duplicate_names_are_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut provider = provider(dir.path())?;

        provider.add(&draft("dev"), "https://dev.example.com".into(), Utc::now())?;
        let err = provider
            .add(&draft("dev"), "https://dev.example.com".into(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
        Ok(())
    }

    #[test]
    fn set_active_keeps_exactly_one_flag() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut active_provider = provider(dir.path())?;

        active_provider.add(&draft("dev"), "https://dev.example.com".into(), Utc::now())?;
        active_provider.add(&draft("prod"), "https://prod.example.com".into(), Utc::now())?;
        active_provider.set_active("prod")?;

        let flags: Vec<bool> = active_provider.list().iter().map(|e| e.active).collect();
        assert_eq!(flags.iter().filter(|f| **f).count(), 1);
        assert_eq!(active_provider.active().unwrap().name, "prod");

        // The rewrite reaches the file, not just the in-memory list.
        let reloaded = provider(dir.path())?;
        assert_eq!(reloaded.active().unwrap().name, "prod");
        Ok(())
    }

    #[test]
    fn disconnect_clears_the_timestamp_only() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut provider = provider(dir.path())?;

        provider.add(&draft("dev"), "https://dev.example.com".into(), Utc::now())?;
        provider.mark_disconnected("dev")?;

        let env = provider.get("dev").unwrap();
        assert!(env.last_connected_at.is_none());
        assert_eq!(env.instance_url.as_deref(), Some("https://dev.example.com"));
        Ok(())
    }

    #[test]
    fn remove_deletes_the_secret_too() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut provider = provider(dir.path())?;

        provider.add(&draft("dev"), "https://dev.example.com".into(), Utc::now())?;
        assert_eq!(provider.secret("dev")?.login_password(), "hunter2TOKEN");

        provider.remove("dev")?;
        assert!(provider.get("dev").is_none());
        assert!(matches!(
            provider.secret("dev"),
            Err(StoreError::UnknownName(_))
        ));
        Ok(())
    }

    #[test]
    fn unknown_names_error_on_every_mutation() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut provider = provider(dir.path())?;
        assert!(matches!(
            provider.set_active("ghost"),
            Err(StoreError::UnknownName(_))
        ));
        assert!(matches!(
            provider.mark_disconnected("ghost"),
            Err(StoreError::UnknownName(_))
        ));
        assert!(matches!(
            provider.remove("ghost"),
            Err(StoreError::UnknownName(_))
        ));
        Ok(())
    }
}
