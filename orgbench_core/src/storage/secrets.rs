use std::collections::HashMap;
use std::sync::Mutex;

use super::errors::SecretError;

/// Key-value storage for environment secrets.
///
/// Production: OS keychain via the `keyring` crate.
/// Testing and headless setups: in-memory map.
pub trait SecretStore: Send + Sync {
    fn store(&self, key: &str, value: &str) -> Result<(), SecretError>;
    fn retrieve(&self, key: &str) -> Result<String, SecretError>;
    /// `Ok(true)` if removed, `Ok(false)` if there was nothing under `key`.
    fn delete(&self, key: &str) -> Result<bool, SecretError>;
}

/// OS keychain backend. One keyring entry per environment, under a fixed
/// service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service("orgbench")
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, SecretError> {
        keyring::Entry::new(&self.service, key).map_err(SecretError::from)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn store(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.entry(key)?.set_password(value).map_err(SecretError::from)
    }

    fn retrieve(&self, key: &str) -> Result<String, SecretError> {
        self.entry(key)?.get_password().map_err(SecretError::from)
    }

    fn delete(&self, key: &str) -> Result<bool, SecretError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(SecretError::from(e)),
        }
    }
}

/// In-memory backend for tests and environments without a keychain.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn store(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.entries
            .lock()
            .expect("secret map poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<String, SecretError> {
        self.entries
            .lock()
            .expect("secret map poisoned")
            .get(key)
            .cloned()
            .ok_or(SecretError::NotFound)
    }

    fn delete(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self
            .entries
            .lock()
            .expect("secret map poisoned")
            .remove(key)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_and_deletes() {
        let store = MemorySecretStore::new();
        store.store("dev", "s3cret").unwrap();
        assert_eq!(store.retrieve("dev").unwrap(), "s3cret");
        assert!(store.delete("dev").unwrap());
        assert!(!store.delete("dev").unwrap());
        assert!(matches!(store.retrieve("dev"), Err(SecretError::NotFound)));
    }
}
