use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::secret;

/// Threat and clearance fall back to this when the submitted value is absent or unparsable.
pub const DEFAULT_LEVEL: i64 = 3;
pub const DEFAULT_ROLE: &str = "Operative";
pub const UNKNOWN: &str = "Unknown";

pub const DEMO_ADMIN_USER: &str = "director_admin";
pub const DEMO_ADMIN_PASS: &str = "JUNE!R8pQ2";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default)]
    pub id: String,
    pub codename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_level")]
    pub threat: i64,
    #[serde(default = "default_level")]
    pub clearance: i64,
    #[serde(default = "unknown")]
    pub last_seen: String,
    /// Rendering hint only; never authoritative and freely regenerated by viewers.
    #[serde(default)]
    pub avatar: String,
    /// Obfuscated with [`secret::obfuscate`].
    #[serde(default)]
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Fields this crate does not model (e.g. a legacy `bio`), carried through rewrites untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_level() -> i64 {
    DEFAULT_LEVEL
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

impl Agent {
    /// The identity key. Older records may lack an `id`, in which case the codename stands in.
    pub fn identity(&self) -> &str {
        if self.id.is_empty() {
            &self.codename
        } else {
            &self.id
        }
    }

    /// Legacy free-text biography, superseded by `notes`.
    pub fn bio(&self) -> Option<&str> {
        self.extra.get("bio").and_then(Value::as_str)
    }

    /// True if `key` (already uppercased) names this agent by id or codename.
    pub fn matches(&self, key: &str) -> bool {
        self.identity() == key || self.codename == key
    }

    fn demo(
        codename: &str,
        real: &str,
        role: &str,
        level: i64,
        seen: &str,
        plain_secret: &str,
        notes: &str,
    ) -> Self {
        Self {
            id: codename.to_string(),
            codename: codename.to_string(),
            real: Some(real.to_string()),
            role: role.to_string(),
            threat: level,
            clearance: level,
            last_seen: seen.to_string(),
            avatar: String::new(),
            secret: secret::obfuscate(plain_secret),
            notes: Some(notes.to_string()),
            extra: Map::new(),
        }
    }
}

/// The fixed roster seeded into an empty store.
pub fn demo_agents() -> Vec<Agent> {
    vec![
        Agent::demo(
            "SHADOW-1",
            "A. Keating",
            "Field Operative",
            3,
            "Sector 7",
            "alpha77",
            "Operative specialising in close-quarters infiltration and signal interception.",
        ),
        Agent::demo(
            "ECHO-7",
            "M. Lin",
            "Recon Specialist",
            2,
            "Sector 12",
            "echo-42",
            "Long-range reconnaissance and overwatch.",
        ),
        Agent::demo(
            "VIPER-3",
            "R. Zhou",
            "Cyber Warfare",
            4,
            "Sector 3",
            "v1p3r!",
            "Rapid response cyber operator.",
        ),
    ]
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Assigned,
    Complete,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assigned => write!(f, "assigned"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// Not enforced against the roster; a dangling id renders as [`UNKNOWN`].
    pub agent_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub action: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredential {
    pub username: String,
    pub pass_hash: String,
}

impl AdminCredential {
    pub fn demo() -> Self {
        Self {
            username: DEMO_ADMIN_USER.to_string(),
            pass_hash: secret::obfuscate(DEMO_ADMIN_PASS),
        }
    }
}
