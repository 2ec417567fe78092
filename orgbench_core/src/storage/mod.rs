pub mod environment;
pub mod errors;
pub mod provider;
pub mod secrets;
pub mod store;

pub use environment::{Environment, EnvironmentDraft, EnvironmentSecret};
pub use errors::{SecretError, StoreError};
pub use provider::EnvironmentProvider;
pub use secrets::{KeyringStore, MemorySecretStore, SecretStore};
pub use store::EnvironmentStore;
