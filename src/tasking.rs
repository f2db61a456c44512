use chrono::Utc;

use crate::error::{JuneError, Result};
use crate::model::{Agent, Task, TaskStatus, UNKNOWN};
use crate::roster::normalize_id;
use crate::secret;
use crate::store::RecordStore;

const TASK_ID_PREFIX: &str = "T";
const TASK_ID_LEN: usize = 6;
const MAX_ID_ATTEMPTS: usize = 16;

fn transition(current: TaskStatus, target: TaskStatus) -> std::result::Result<(), (String, String)> {
    let allowed = matches!(
        (current, target),
        (TaskStatus::Assigned, TaskStatus::Complete)
    );
    if allowed {
        Ok(())
    } else {
        Err((current.to_string(), target.to_string()))
    }
}

fn fresh_task_id(existing: &[Task]) -> Result<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = format!("{TASK_ID_PREFIX}{}", secret::random_token(TASK_ID_LEN)?);
        if !existing.iter().any(|t| t.id == id) {
            return Ok(id);
        }
    }
    Err(JuneError::Random("could not allocate a unique task id".into()))
}

/// Assign a new task to an agent. The new task goes to the head of the list.
///
/// The agent reference is normalized but not checked against the roster.
pub fn assign_task(
    store: &mut RecordStore,
    agent_id: &str,
    title: &str,
    details: &str,
) -> Result<Task> {
    let agent_id = normalize_id(agent_id);
    let title = title.trim();
    if agent_id.is_empty() || title.is_empty() {
        return Err(JuneError::validation("Select agent and title"));
    }

    let mut tasks: Vec<Task> = store.get();
    let task = Task {
        id: fresh_task_id(&tasks)?,
        agent_id,
        title: title.to_string(),
        details: Some(details.trim().to_string()).filter(|d| !d.is_empty()),
        status: TaskStatus::Assigned,
        created_at: Utc::now(),
    };
    tasks.insert(0, task.clone());
    store.commit(&tasks, "task:create", &format!("{} -> {}", task.id, task.agent_id));
    Ok(task)
}

pub fn complete_task(store: &mut RecordStore, id: &str) -> Result<Task> {
    let mut tasks: Vec<Task> = store.get();
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| JuneError::TaskNotFound(id.to_string()))?;

    transition(task.status, TaskStatus::Complete)
        .map_err(|(from, to)| JuneError::InvalidTransition(from, to))?;

    task.status = TaskStatus::Complete;
    let done = task.clone();
    store.commit(&tasks, "task:complete", id);
    Ok(done)
}

pub fn delete_task(store: &mut RecordStore, id: &str) -> Result<Task> {
    let mut tasks: Vec<Task> = store.get();
    let idx = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| JuneError::TaskNotFound(id.to_string()))?;
    let removed = tasks.remove(idx);
    store.commit(&tasks, "task:delete", id);
    Ok(removed)
}

/// Codename of the assigned agent, or `Unknown` for a dangling reference.
pub fn assignee_label<'a>(task: &Task, agents: &'a [Agent]) -> &'a str {
    agents
        .iter()
        .find(|a| a.identity() == task.agent_id)
        .map(|a| a.codename.as_str())
        .unwrap_or(UNKNOWN)
}
