//! Admin session gate.
//!
//! The session is a flag file next to the store, never one of the persisted
//! collections. It gates the CLI only; the record store performs no
//! authorization of its own, and anyone who can edit the data directory can
//! forge a session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{JuneError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSession {
    pub user: String,
    pub at: DateTime<Utc>,
    pub token: Uuid,
}

impl AdminSession {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            at: Utc::now(),
            token: Uuid::new_v4(),
        }
    }
}

pub struct SessionGate {
    path: PathBuf,
}

impl SessionGate {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn begin(&self, session: &AdminSession) -> Result<()> {
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// The active session, if any. An unreadable session file counts as signed out.
    pub fn current(&self) -> Option<AdminSession> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "session unreadable");
                return None;
            }
        };
        serde_json::from_str(&data).ok()
    }

    pub fn require(&self) -> Result<AdminSession> {
        self.current().ok_or(JuneError::NotSignedIn)
    }

    /// Returns whether a session was open.
    pub fn end(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
