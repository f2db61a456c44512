use crate::error::Result;
use crate::model::AuditEntry;
use crate::output::{self, Format};
use crate::store::RecordStore;

/// Print the audit trail, newest first, optionally filtered by action prefix (`agent:`, `task:delete`).
pub fn run(
    store: &RecordStore,
    limit: Option<usize>,
    action: Option<String>,
    format: Format,
) -> Result<()> {
    let mut entries: Vec<AuditEntry> = store.get();
    if let Some(ref prefix) = action {
        entries.retain(|e| e.action.starts_with(prefix.as_str()));
    }
    if let Some(n) = limit {
        entries.truncate(n);
    }
    output::print_audit(&entries, format)
}
