use tracing::debug;

use crate::error::{JuneError, Result};
use crate::model::{Agent, DEFAULT_LEVEL, DEFAULT_ROLE, UNKNOWN};
use crate::secret;
use crate::store::RecordStore;

/// Length of the secret generated for agents created without one.
const GENERATED_SECRET_LEN: usize = 6;

/// Raw form input for creating or editing an agent. Every field is unparsed text.
#[derive(Debug, Default, Clone)]
pub struct AgentForm {
    pub codename: String,
    pub real: String,
    pub role: String,
    pub threat: String,
    pub clearance: String,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub agent: Agent,
    pub created: bool,
}

/// Identity keys are uppercased codenames.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Parse a threat or clearance level. Blank, unparsable and zero fall back to
/// [`DEFAULT_LEVEL`]; anything else is kept as given, without range clamping.
pub fn parse_level(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(0) | Err(_) => DEFAULT_LEVEL,
        Ok(level) => level,
    }
}

pub fn find_agent(store: &RecordStore, id: &str) -> Option<Agent> {
    let key = normalize_id(id);
    store.get::<Agent>().into_iter().find(|a| a.matches(&key))
}

/// Create or update an agent keyed by its uppercased codename.
///
/// An existing record keeps its `id`, `lastSeen`, avatar and notes; its secret
/// changes only when a non-empty one is submitted.
pub fn save_agent(store: &mut RecordStore, form: &AgentForm) -> Result<Saved> {
    let codename = normalize_id(&form.codename);
    if codename.is_empty() {
        return Err(JuneError::validation("Codename required"));
    }
    let real = Some(form.real.trim().to_string()).filter(|r| !r.is_empty());
    let role = match form.role.trim() {
        "" => DEFAULT_ROLE.to_string(),
        role => role.to_string(),
    };
    let threat = parse_level(&form.threat);
    let clearance = parse_level(&form.clearance);
    let submitted_secret = form.secret.trim();

    let mut agents: Vec<Agent> = store.get();
    let saved = match agents.iter().position(|a| a.matches(&codename)) {
        Some(idx) => {
            let agent = &mut agents[idx];
            agent.codename = codename.clone();
            agent.real = real;
            agent.role = role;
            agent.threat = threat;
            agent.clearance = clearance;
            if !submitted_secret.is_empty() {
                agent.secret = secret::obfuscate(submitted_secret);
            }
            Saved {
                agent: agent.clone(),
                created: false,
            }
        }
        None => {
            let plain = if submitted_secret.is_empty() {
                secret::random_token(GENERATED_SECRET_LEN)?
            } else {
                submitted_secret.to_string()
            };
            let agent = Agent {
                id: codename.clone(),
                codename: codename.clone(),
                real,
                role,
                threat,
                clearance,
                last_seen: UNKNOWN.to_string(),
                avatar: String::new(),
                secret: secret::obfuscate(&plain),
                notes: None,
                extra: Default::default(),
            };
            agents.push(agent.clone());
            Saved {
                agent,
                created: true,
            }
        }
    };

    let action = if saved.created {
        "agent:create"
    } else {
        "agent:update"
    };
    store.commit(&agents, action, &codename);
    debug!(id = %codename, action, "agent saved");
    Ok(saved)
}

/// Remove the agent matching `id` by id or codename. Returns false, writing
/// nothing, when no agent matches. Tasks pointing at the agent are left as they are.
pub fn delete_agent(store: &mut RecordStore, id: &str) -> bool {
    let key = normalize_id(id);
    let mut agents: Vec<Agent> = store.get();
    let before = agents.len();
    agents.retain(|a| !a.matches(&key));
    if agents.len() == before {
        return false;
    }
    store.commit(&agents, "agent:delete", &key);
    true
}

pub fn change_agent_secret(store: &mut RecordStore, id: &str, new_secret: &str) -> Result<()> {
    if new_secret.is_empty() {
        return Err(JuneError::validation("Enter a new secret"));
    }
    let key = normalize_id(id);
    let mut agents: Vec<Agent> = store.get();
    let agent = agents
        .iter_mut()
        .find(|a| a.matches(&key))
        .ok_or_else(|| JuneError::AgentNotFound(key.clone()))?;
    agent.secret = secret::obfuscate(new_secret);
    store.commit(&agents, "agent:pw", &key);
    Ok(())
}

/// Check an agent's secret. Unknown agents never verify.
pub fn verify_agent_secret(store: &RecordStore, id: &str, candidate: &str) -> bool {
    find_agent(store, id).is_some_and(|a| secret::matches(&a.secret, candidate))
}

/// Record a monitor ping. Nothing else about the agent changes.
pub fn ping(store: &mut RecordStore, id: &str) -> Result<()> {
    let agent = find_agent(store, id).ok_or_else(|| JuneError::AgentNotFound(normalize_id(id)))?;
    store.append_audit("monitor:ping", agent.identity());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuditEntry;
    use crate::store::memory::MemoryBackend;

    fn store() -> RecordStore {
        RecordStore::open(Box::new(MemoryBackend::new()), 1000)
    }

    fn form(codename: &str) -> AgentForm {
        AgentForm {
            codename: codename.into(),
            ..AgentForm::default()
        }
    }

    fn audit(store: &RecordStore) -> Vec<(String, String)> {
        store
            .get::<AuditEntry>()
            .into_iter()
            .map(|e| (e.action, e.details))
            .collect()
    }

    #[test]
    fn parse_level_defaults_and_passes_through() {
        assert_eq!(parse_level(""), 3);
        assert_eq!(parse_level("abc"), 3);
        assert_eq!(parse_level("0"), 3);
        assert_eq!(parse_level(" 5 "), 5);
        assert_eq!(parse_level("9"), 9);
        assert_eq!(parse_level("-2"), -2);
    }

    #[test]
    fn create_normalizes_and_fills_defaults() {
        let mut store = store();
        let saved = save_agent(
            &mut store,
            &AgentForm {
                codename: "nova".into(),
                real: "J. Park".into(),
                role: "".into(),
                threat: "abc".into(),
                clearance: "9".into(),
                secret: "".into(),
            },
        )
        .unwrap();
        assert!(saved.created);

        let nova = find_agent(&store, "Nova").unwrap();
        assert_eq!(nova.id, "NOVA");
        assert_eq!(nova.codename, "NOVA");
        assert_eq!(nova.real.as_deref(), Some("J. Park"));
        assert_eq!(nova.role, "Operative");
        assert_eq!(nova.threat, 3);
        assert_eq!(nova.clearance, 9);
        assert_eq!(nova.last_seen, "Unknown");
        let generated = secret::reveal(&nova.secret).unwrap();
        assert_eq!(generated.len(), 6);

        assert_eq!(audit(&store), vec![("agent:create".into(), "NOVA".into())]);
    }

    #[test]
    fn update_keeps_identity_and_secret_when_blank() {
        let mut store = store();
        let before = find_agent(&store, "ECHO-7").unwrap();
        let saved = save_agent(
            &mut store,
            &AgentForm {
                codename: " echo-7 ".into(),
                role: "Overwatch".into(),
                threat: "4".into(),
                ..AgentForm::default()
            },
        )
        .unwrap();
        assert!(!saved.created);

        let after = find_agent(&store, "ECHO-7").unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.secret, before.secret);
        assert_eq!(after.last_seen, before.last_seen);
        assert_eq!(after.role, "Overwatch");
        assert_eq!(after.threat, 4);
        assert_eq!(after.clearance, 3);
        assert_eq!(after.real, None);
        assert_eq!(store.get::<Agent>().len(), 3);
        assert_eq!(audit(&store), vec![("agent:update".into(), "ECHO-7".into())]);
    }

    #[test]
    fn update_replaces_secret_when_supplied() {
        let mut store = store();
        save_agent(
            &mut store,
            &AgentForm {
                codename: "VIPER-3".into(),
                secret: "n3w".into(),
                ..AgentForm::default()
            },
        )
        .unwrap();
        assert!(verify_agent_secret(&store, "viper-3", "n3w"));
        assert!(!verify_agent_secret(&store, "viper-3", "v1p3r!"));
    }

    #[test]
    fn empty_codename_is_rejected_without_writes() {
        let mut store = store();
        let err = save_agent(&mut store, &form("   ")).unwrap_err();
        assert!(matches!(err, JuneError::Validation(_)));
        assert_eq!(store.get::<Agent>().len(), 3);
        assert!(audit(&store).is_empty());
    }

    #[test]
    fn delete_removes_exactly_one_and_is_noop_when_absent() {
        let mut store = store();
        assert!(delete_agent(&mut store, "shadow-1"));
        let ids: Vec<String> = store.get::<Agent>().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["ECHO-7", "VIPER-3"]);
        assert_eq!(audit(&store), vec![("agent:delete".into(), "SHADOW-1".into())]);

        assert!(!delete_agent(&mut store, "SHADOW-1"));
        assert_eq!(store.get::<Agent>().len(), 2);
        assert_eq!(audit(&store).len(), 1);
    }

    #[test]
    fn change_secret_audits_and_requires_known_agent() {
        let mut store = store();
        change_agent_secret(&mut store, "echo-7", "fresh").unwrap();
        assert!(verify_agent_secret(&store, "ECHO-7", "fresh"));
        assert_eq!(audit(&store), vec![("agent:pw".into(), "ECHO-7".into())]);

        let err = change_agent_secret(&mut store, "GHOST", "x").unwrap_err();
        assert!(matches!(err, JuneError::AgentNotFound(id) if id == "GHOST"));
        let err = change_agent_secret(&mut store, "ECHO-7", "").unwrap_err();
        assert!(matches!(err, JuneError::Validation(_)));
        assert_eq!(audit(&store).len(), 1);
    }

    #[test]
    fn demo_secrets_verify() {
        let store = store();
        assert!(verify_agent_secret(&store, "SHADOW-1", "alpha77"));
        assert!(verify_agent_secret(&store, "echo-7", "echo-42"));
        assert!(!verify_agent_secret(&store, "NOBODY", "alpha77"));
    }

    #[test]
    fn ping_audits_known_agents_only() {
        let mut store = store();
        ping(&mut store, "viper-3").unwrap();
        assert_eq!(audit(&store), vec![("monitor:ping".into(), "VIPER-3".into())]);
        assert!(ping(&mut store, "GHOST").is_err());
        assert_eq!(audit(&store).len(), 1);
    }

    #[test]
    fn unmodelled_fields_survive_roster_rewrites() {
        let mut store = store();
        store.write_raw(
            crate::store::AGENTS_KEY,
            r#"[{"id":"OWL","codename":"OWL","secret":"eA==","bio":"legacy bio"}]"#,
        );

        save_agent(&mut store, &form("new")).unwrap();
        save_agent(
            &mut store,
            &AgentForm {
                role: "Handler".into(),
                ..form("owl")
            },
        )
        .unwrap();

        let raw = store.read_raw(crate::store::AGENTS_KEY).unwrap();
        let roster: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(roster[0]["bio"], "legacy bio");
        assert_eq!(roster[0]["role"], "Handler");
        assert_eq!(roster[1]["id"], "NEW");

        let owl = find_agent(&store, "OWL").unwrap();
        assert!(crate::dossier::report(&owl).contains("Bio:\nlegacy bio\n"));
    }
}
