use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Retained audit entries when nothing else is configured.
pub const DEFAULT_AUDIT_CAP: usize = 1000;
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Files,
    Sqlite,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Files => write!(f, "files"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Contents of `config.json` in a data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_audit_cap")]
    pub audit_cap: usize,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_audit_cap() -> usize {
    DEFAULT_AUDIT_CAP
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: BackendKind::default(),
            audit_cap: DEFAULT_AUDIT_CAP,
        }
    }
}

impl Config {
    /// The audit cap after a runtime override (`--audit-cap` / `JUNE_AUDIT_CAP`). Zero is ignored.
    pub fn effective_audit_cap(&self, override_cap: Option<usize>) -> usize {
        override_cap
            .filter(|cap| *cap > 0)
            .unwrap_or(self.audit_cap)
    }
}
