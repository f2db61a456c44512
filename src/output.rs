use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Agent, AuditEntry, Task, TaskStatus, UNKNOWN};
use crate::tasking::assignee_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

/// Agent as shown to users: everything but the stored secret.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentView<'a> {
    id: &'a str,
    codename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    real: Option<&'a str>,
    role: &'a str,
    threat: i64,
    clearance: i64,
    last_seen: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

impl<'a> From<&'a Agent> for AgentView<'a> {
    fn from(a: &'a Agent) -> Self {
        Self {
            id: a.identity(),
            codename: &a.codename,
            real: a.real.as_deref(),
            role: &a.role,
            threat: a.threat,
            clearance: a.clearance,
            last_seen: &a.last_seen,
            notes: a.notes.as_deref(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskView<'a> {
    #[serde(flatten)]
    task: &'a Task,
    assignee: &'a str,
}

pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let truncated: String = text.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn or_unknown(text: &str) -> &str {
    if text.is_empty() { UNKNOWN } else { text }
}

pub fn print_agent(agent: &Agent, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(&AgentView::from(agent))?),
        Format::Pretty => {
            println!("{}", agent.codename.bold());
            println!("  {} • {}", agent.role, or_unknown(&agent.last_seen));
            if let Some(ref real) = agent.real {
                println!("  real name: {}", real);
            }
            println!(
                "  threat: {} | clearance: {}",
                agent.threat, agent.clearance
            );
        }
        Format::Minimal => println!(
            "{:12} {:18} {:>2} {:>2} {}",
            truncate(agent.identity(), 12),
            truncate(&agent.role, 18),
            agent.threat,
            agent.clearance,
            or_unknown(&agent.last_seen)
        ),
    }
    Ok(())
}

pub fn print_agents(agents: &[Agent], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let views: Vec<AgentView> = agents.iter().map(AgentView::from).collect();
            println!("{}", serde_json::to_string(&views)?);
        }
        Format::Pretty => {
            for agent in agents {
                print_agent(agent, Format::Pretty)?;
                println!();
            }
        }
        Format::Minimal => {
            println!("{:12} {:18} {:>2} {:>2} LAST SEEN", "ID", "ROLE", "TH", "CL");
            println!("{}", "-".repeat(50));
            for agent in agents {
                print_agent(agent, Format::Minimal)?;
            }
        }
    }
    Ok(())
}

pub fn print_task(task: &Task, agents: &[Agent], format: Format) -> Result<()> {
    let assignee = assignee_label(task, agents);
    match format {
        Format::Json => println!("{}", serde_json::to_string(&TaskView { task, assignee })?),
        Format::Pretty => {
            let status = match task.status {
                TaskStatus::Assigned => task.status.to_string().yellow(),
                TaskStatus::Complete => task.status.to_string().green(),
            };
            println!("[{}] {} ({})", task.id, task.title.bold(), status);
            println!(
                "  assigned to: {} • {}",
                assignee,
                task.created_at.to_rfc3339()
            );
            if let Some(ref details) = task.details {
                println!("  {}", details);
            }
        }
        Format::Minimal => println!(
            "{:8} {:20} {:12} {}",
            task.id,
            truncate(&task.title, 20),
            truncate(assignee, 12),
            task.status
        ),
    }
    Ok(())
}

pub fn print_tasks(tasks: &[Task], agents: &[Agent], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let views: Vec<TaskView> = tasks
                .iter()
                .map(|task| TaskView {
                    task,
                    assignee: assignee_label(task, agents),
                })
                .collect();
            println!("{}", serde_json::to_string(&views)?);
        }
        Format::Pretty => {
            for task in tasks {
                print_task(task, agents, Format::Pretty)?;
                println!();
            }
        }
        Format::Minimal => {
            println!("{:8} {:20} {:12} STATUS", "ID", "TITLE", "AGENT");
            println!("{}", "-".repeat(50));
            for task in tasks {
                print_task(task, agents, Format::Minimal)?;
            }
        }
    }
    Ok(())
}

pub fn print_audit(entries: &[AuditEntry], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(entries)?),
        Format::Pretty | Format::Minimal => {
            if entries.is_empty() {
                println!("{}", "No audit events".dimmed());
            }
            for entry in entries {
                let at = entry.at.to_rfc3339();
                if entry.details.is_empty() {
                    println!("{} {}", at.dimmed(), entry.action);
                } else {
                    println!("{} {} — {}", at.dimmed(), entry.action, entry.details);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::demo_agents;
    use chrono::Utc;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("SHADOW-1", 12), "SHADOW-1");
        assert_eq!(truncate("Recon Specialist Lead", 12), "Recon Spe...");
        assert_eq!(truncate("ééééééééééééé", 5), "éé...");
    }

    #[test]
    fn agent_view_hides_secret() {
        let agents = demo_agents();
        let agent = &agents[0];
        let json = serde_json::to_string(&AgentView::from(agent)).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains(&agent.secret));
        assert!(json.contains(r#""lastSeen":"Sector 7""#));
    }

    #[test]
    fn task_view_flattens_and_labels() {
        let task = Task {
            id: "Tabc123".into(),
            agent_id: "GONE-1".into(),
            title: "Sweep".into(),
            details: None,
            status: TaskStatus::Assigned,
            created_at: Utc::now(),
        };
        let agents = demo_agents();
        let view = TaskView {
            task: &task,
            assignee: assignee_label(&task, &agents),
        };
        let json: serde_json::Value = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "Tabc123");
        assert_eq!(json["agentId"], "GONE-1");
        assert_eq!(json["assignee"], "Unknown");
        assert_eq!(json["status"], "assigned");
    }
}
