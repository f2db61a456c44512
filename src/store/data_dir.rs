use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{BackendKind, Config};
use crate::error::{JuneError, Result};
use crate::store::RecordStore;
use crate::store::files::FileBackend;
use crate::store::sqlite::SqliteBackend;

pub const DATA_DIR_NAME: &str = ".june";

/// A data directory: `config.json` plus whatever the configured backend keeps.
#[derive(Debug)]
pub struct DataDir {
    root: PathBuf,
    config: Config,
    cap_override: Option<usize>,
}

impl DataDir {
    /// Open an existing data directory.
    pub fn open(root: &Path) -> Result<Self> {
        let config_path = root.join("config.json");
        if !config_path.exists() {
            return Err(JuneError::NotInitialized);
        }
        let config: Config = serde_json::from_str(&fs::read_to_string(config_path)?)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            cap_override: None,
        })
    }

    /// Initialize a new data directory and seed its collections.
    pub fn init(root: &Path, config: Config) -> Result<Self> {
        if root.join("config.json").exists() {
            return Err(JuneError::AlreadyInitialized(root.display().to_string()));
        }
        fs::create_dir_all(root)?;
        fs::write(
            root.join("config.json"),
            serde_json::to_string_pretty(&config)?,
        )?;

        let dir = Self {
            root: root.to_path_buf(),
            config,
            cap_override: None,
        };
        dir.open_store()?;
        info!(root = %root.display(), backend = %dir.config.backend, "initialized data directory");
        Ok(dir)
    }

    /// Use `cap` instead of the configured audit cap for stores opened from here on.
    /// The override is not written to `config.json`.
    pub fn with_audit_cap(mut self, cap: Option<usize>) -> Self {
        self.cap_override = cap;
        self
    }

    /// Build the configured backend and wrap it in a [`RecordStore`].
    pub fn open_store(&self) -> Result<RecordStore> {
        let cap = self.config.effective_audit_cap(self.cap_override);
        let store = match self.config.backend {
            BackendKind::Files => {
                RecordStore::open(Box::new(FileBackend::open(&self.root.join("store"))?), cap)
            }
            BackendKind::Sqlite => {
                RecordStore::open(Box::new(SqliteBackend::open(&self.root.join("june.db"))?), cap)
            }
        };
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join("session.json")
    }
}

/// The nearest initialized `.june` directory at or above the cwd.
pub fn find_data_dir() -> Result<PathBuf> {
    let mut dir = std::env::current_dir().map_err(JuneError::Io)?;
    loop {
        let candidate = dir.join(DATA_DIR_NAME);
        if candidate.join("config.json").exists() {
            return Ok(candidate);
        }
        if !dir.pop() {
            return Err(JuneError::NotInitialized);
        }
    }
}
