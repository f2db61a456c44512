use crate::error::{JuneError, Result};
use crate::model::Agent;
use crate::output::{self, Format};
use crate::roster::{self, AgentForm};
use crate::store::RecordStore;

pub fn list(store: &RecordStore, format: Format) -> Result<()> {
    let agents: Vec<Agent> = store.get();
    output::print_agents(&agents, format)
}

pub fn show(store: &RecordStore, id: &str, format: Format) -> Result<()> {
    let agent = roster::find_agent(store, id)
        .ok_or_else(|| JuneError::AgentNotFound(roster::normalize_id(id)))?;
    output::print_agent(&agent, format)
}

pub fn save(store: &mut RecordStore, form: AgentForm, format: Format) -> Result<()> {
    let saved = roster::save_agent(store, &form)?;
    if format != Format::Json {
        let verb = if saved.created { "created" } else { "updated" };
        eprintln!("Agent {} {}", saved.agent.codename, verb);
    }
    output::print_agent(&saved.agent, format)
}

pub fn delete(store: &mut RecordStore, id: &str, format: Format) -> Result<()> {
    let removed = roster::delete_agent(store, id);
    let id = roster::normalize_id(id);
    match format {
        Format::Json => println!(
            "{}",
            serde_json::json!({ "id": id, "deleted": removed })
        ),
        _ if removed => eprintln!("Agent {id} deleted"),
        _ => eprintln!("No agent {id}; nothing deleted"),
    }
    Ok(())
}

pub fn passwd(store: &mut RecordStore, id: &str, secret: &str) -> Result<()> {
    roster::change_agent_secret(store, id, secret)?;
    eprintln!("Secret changed for {}", roster::normalize_id(id));
    Ok(())
}

/// Check a secret, failing with `InvalidCredentials` on mismatch.
pub fn verify(store: &RecordStore, id: &str, secret: &str, format: Format) -> Result<()> {
    if !roster::verify_agent_secret(store, id, secret) {
        return Err(JuneError::InvalidCredentials);
    }
    if format == Format::Json {
        println!(
            "{}",
            serde_json::json!({ "id": roster::normalize_id(id), "verified": true })
        );
    } else {
        eprintln!("Access granted");
    }
    Ok(())
}
