use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use super::environment::Environment;
use super::errors::StoreError;

/// Persistence for the environment list: one JSON file holding every
/// record, rewritten wholesale on each mutation. Last write wins.
#[derive(Debug, Clone)]
pub struct EnvironmentStore {
    dir: PathBuf,
}

const LIST_FILE: &str = "environments.json";

impl EnvironmentStore {
    /// `~/.config/orgbench` on Linux, `%APPDATA%\orgbench` on Windows, etc.
    pub fn open_default() -> Result<Self, StoreError> {
        let proj = ProjectDirs::from("", "", "orgbench").ok_or(StoreError::NoConfigDir)?;
        Self::at(proj.config_dir().to_path_buf())
    }

    /// Use an explicit directory (tests point this at a temp dir).
    pub fn at(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn list_file(&self) -> PathBuf {
        self.dir.join(LIST_FILE)
    }

    /// Returns every stored record; a missing file is an empty list.
    pub fn load(&self) -> Result<Vec<Environment>, StoreError> {
        let path = self.list_file();
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_reader(file)?)
    }

    /// Replace the stored list with `environments`.
    pub fn save_all(&self, environments: &[Environment]) -> Result<(), StoreError> {
        let file = fs::File::create(self.list_file())?;
        serde_json::to_writer_pretty(file, environments)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn record(name: &str) -> Environment {
        Environment {
            name: name.into(),
            login_url: "https://login.example.com".into(),
            username: "me@example.com".into(),
            instance_url: None,
            active: false,
            last_connected_at: None,
        }
    }

    #[test]
    fn missing_file_loads_as_empty_list() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = EnvironmentStore::at(dir.path().to_path_buf())?;
        assert!(store.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn save_all_replaces_the_whole_list() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = EnvironmentStore::at(dir.path().to_path_buf())?;

        store.save_all(&[record("dev"), record("prod")])?;
        assert_eq!(store.load()?.len(), 2);

        store.save_all(&[record("prod")])?;
        let names: Vec<String> = store.load()?.into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["prod"]);
        Ok(())
    }

    #[test]
    fn malformed_list_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = EnvironmentStore::at(dir.path().to_path_buf())?;
        std::fs::write(dir.path().join("environments.json"), b"{ not json")?;
        assert!(matches!(store.load(), Err(StoreError::Malformed(_))));
        Ok(())
    }
}
