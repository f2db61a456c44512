use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{JuneError, Result};
use crate::model::{Agent, UNKNOWN};
use crate::roster::{find_agent, normalize_id};
use crate::store::RecordStore;

/// Holds the identity of the agent the dossier viewer last showed.
pub const SELECT_KEY: &str = "june_selected";

const DASH: &str = "—";

/// The selection is stored as a JSON string. Older stores kept the bare id, which still reads.
fn load_selection(store: &RecordStore) -> Option<String> {
    let raw = store.read_raw(SELECT_KEY)?;
    let id = serde_json::from_str::<String>(&raw).unwrap_or(raw);
    Some(normalize_id(&id))
}

fn save_selection(store: &mut RecordStore, agent: &Agent) {
    store.write_raw(SELECT_KEY, &Value::from(agent.identity()).to_string());
}

pub fn select(store: &mut RecordStore, id: &str) -> Result<Agent> {
    let agent = find_agent(store, id).ok_or_else(|| JuneError::AgentNotFound(normalize_id(id)))?;
    save_selection(store, &agent);
    Ok(agent)
}

/// The selected agent and its roster position. A missing or stale selection
/// resolves to the first agent; an empty roster resolves to nothing.
pub fn current(store: &RecordStore) -> Option<(usize, Agent)> {
    let agents: Vec<Agent> = store.get();
    let selected = load_selection(store);
    let idx = selected
        .and_then(|key| agents.iter().position(|a| a.matches(&key)))
        .unwrap_or(0);
    agents.into_iter().nth(idx).map(|a| (idx, a))
}

/// Move the selection `delta` places through the roster, wrapping at both ends.
pub fn step(store: &mut RecordStore, delta: isize) -> Option<Agent> {
    let agents: Vec<Agent> = store.get();
    if agents.is_empty() {
        return None;
    }
    let (idx, _) = current(store)?;
    let len = agents.len() as isize;
    let next = (idx as isize + delta).rem_euclid(len) as usize;
    let agent = agents.into_iter().nth(next)?;
    save_selection(store, &agent);
    Some(agent)
}

pub fn clear_selection(store: &mut RecordStore) {
    store.remove_raw(SELECT_KEY);
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { DASH } else { value }
}

pub fn report(agent: &Agent) -> String {
    let real = agent.real.as_deref().unwrap_or("");
    let last_seen = if agent.last_seen.is_empty() {
        UNKNOWN
    } else {
        agent.last_seen.as_str()
    };
    let bio = agent
        .notes
        .as_deref()
        .filter(|n| !n.is_empty())
        .or_else(|| agent.bio().filter(|b| !b.is_empty()))
        .unwrap_or("No further data.");
    format!(
        "Codename: {}\nReal name: {}\nRole: {}\nThreat level: {}\nLast seen: {}\n\nBio:\n{}\n\n(End of report)",
        agent.codename,
        or_dash(real),
        or_dash(&agent.role),
        agent.threat,
        last_seen,
        bio,
    )
}

pub fn report_file_name(agent: &Agent) -> String {
    let name = if agent.codename.is_empty() {
        agent.identity()
    } else {
        agent.codename.as_str()
    };
    if name.is_empty() {
        "dossier.txt".to_string()
    } else {
        format!("{name}_report.txt")
    }
}

/// Write the report into `dir`, returning the file path.
pub fn export_report(agent: &Agent, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(report_file_name(agent));
    fs::write(&path, report(agent))?;
    Ok(path)
}
