use crate::error::Result;
use crate::model::{Agent, Task, TaskStatus};
use crate::output::{self, Format};
use crate::roster::normalize_id;
use crate::store::RecordStore;
use crate::tasking;

pub fn list(
    store: &RecordStore,
    agent: Option<String>,
    status: Option<TaskStatus>,
    format: Format,
) -> Result<()> {
    let agents: Vec<Agent> = store.get();
    let mut tasks: Vec<Task> = store.get();
    if let Some(ref a) = agent {
        let key = normalize_id(a);
        tasks.retain(|t| t.agent_id == key);
    }
    if let Some(s) = status {
        tasks.retain(|t| t.status == s);
    }
    output::print_tasks(&tasks, &agents, format)
}

pub fn assign(
    store: &mut RecordStore,
    agent: &str,
    title: &str,
    details: Option<String>,
    format: Format,
) -> Result<()> {
    let task = tasking::assign_task(store, agent, title, details.as_deref().unwrap_or(""))?;
    output::print_task(&task, &store.get::<Agent>(), format)
}

pub fn done(store: &mut RecordStore, id: &str, format: Format) -> Result<()> {
    let task = tasking::complete_task(store, id)?;
    output::print_task(&task, &store.get::<Agent>(), format)
}

pub fn delete(store: &mut RecordStore, id: &str, format: Format) -> Result<()> {
    let task = tasking::delete_task(store, id)?;
    match format {
        Format::Json => println!(
            "{}",
            serde_json::json!({ "id": task.id, "deleted": true })
        ),
        _ => eprintln!("Task {} deleted", task.id),
    }
    Ok(())
}
