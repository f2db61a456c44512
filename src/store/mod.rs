//! Typed collections over a string key-value backend.
//!
//! Every collection is one JSON document under one key. Reads never fail:
//! a missing, unreadable or malformed document yields the collection default.
//! Writes never fail either: backend errors are logged and the caller carries on.

pub mod data_dir;
pub mod files;
pub mod lock;
pub mod memory;
pub mod sqlite;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{self, AdminCredential, Agent, AuditEntry, Task};

pub const AGENTS_KEY: &str = "june_agents_v1";
pub const TASKS_KEY: &str = "june_tasks_v1";
pub const AUDIT_KEY: &str = "june_audit_v1";
pub const ADMIN_KEY: &str = "june_admin_v1";

/// Raw string storage, the moral equivalent of a browser's local storage.
pub trait KvBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    /// Human-readable location, for `june info` and log fields.
    fn describe(&self) -> String;
}

/// A record type stored as a JSON array under a fixed key.
pub trait Collection: Serialize + DeserializeOwned + Sized {
    const KEY: &'static str;
    /// Action tag for the summary entry `put` appends. `None` means writes never self-audit.
    const SAVE_ACTION: Option<&'static str>;

    fn defaults() -> Vec<Self>;
}

impl Collection for Agent {
    const KEY: &'static str = AGENTS_KEY;
    const SAVE_ACTION: Option<&'static str> = Some("agents:save");

    fn defaults() -> Vec<Self> {
        model::demo_agents()
    }
}

impl Collection for Task {
    const KEY: &'static str = TASKS_KEY;
    const SAVE_ACTION: Option<&'static str> = Some("tasks:save");

    fn defaults() -> Vec<Self> {
        Vec::new()
    }
}

impl Collection for AuditEntry {
    const KEY: &'static str = AUDIT_KEY;
    const SAVE_ACTION: Option<&'static str> = None;

    fn defaults() -> Vec<Self> {
        Vec::new()
    }
}

pub struct RecordStore {
    backend: Box<dyn KvBackend>,
    audit_cap: usize,
}

impl RecordStore {
    /// Wrap a backend and seed any missing collections.
    pub fn open(backend: Box<dyn KvBackend>, audit_cap: usize) -> Self {
        let mut store = Self {
            backend,
            audit_cap: audit_cap.max(1),
        };
        store.ensure_defaults();
        store
    }

    /// Seed every absent collection key with its default. Existing documents,
    /// even malformed ones, are left alone.
    pub fn ensure_defaults(&mut self) {
        self.seed(AGENTS_KEY, &Agent::defaults());
        self.seed(TASKS_KEY, &Task::defaults());
        self.seed(AUDIT_KEY, &AuditEntry::defaults());
        self.seed(ADMIN_KEY, &AdminCredential::demo());
    }

    fn seed<D: Serialize + ?Sized>(&mut self, key: &str, value: &D) {
        match self.backend.read(key) {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(key, "seeding default");
                self.write_json(key, value);
            }
            Err(e) => warn!(key, error = %e, "store unavailable; defaults not seeded"),
        }
    }

    pub fn get<T: Collection>(&self) -> Vec<T> {
        self.read_json(T::KEY).unwrap_or_else(T::defaults)
    }

    /// Overwrite a collection, auditing `<collection>:save count=N` where the collection self-audits.
    pub fn put<T: Collection>(&mut self, items: &[T]) -> bool {
        match T::SAVE_ACTION {
            Some(action) => self.commit(items, action, &format!("count={}", items.len())),
            None => self.write_json(T::KEY, items),
        }
    }

    /// Overwrite a collection and record exactly one audit entry describing the change.
    ///
    /// Returns whether the collection write reached the backend. The audit entry
    /// is appended either way.
    pub fn commit<T: Collection>(&mut self, items: &[T], action: &str, details: &str) -> bool {
        let written = self.write_json(T::KEY, items);
        if T::SAVE_ACTION.is_some() {
            self.append_audit(action, details);
        }
        written
    }

    /// Prepend an audit entry and drop anything beyond the cap.
    pub fn append_audit(&mut self, action: &str, details: &str) -> bool {
        let mut list: Vec<AuditEntry> = self.get();
        let mut at = Utc::now();
        if let Some(head) = list.first()
            && head.at > at
        {
            at = head.at;
        }
        list.insert(
            0,
            AuditEntry {
                at,
                action: action.to_string(),
                details: details.to_string(),
            },
        );
        list.truncate(self.audit_cap);
        self.write_json(AUDIT_KEY, &list)
    }

    pub fn admin(&self) -> AdminCredential {
        self.read_json(ADMIN_KEY)
            .unwrap_or_else(AdminCredential::demo)
    }

    /// Admin writes never self-audit; callers record their own action.
    pub fn put_admin(&mut self, admin: &AdminCredential) -> bool {
        self.write_json(ADMIN_KEY, admin)
    }

    /// Read a non-collection key verbatim.
    pub fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "store read failed");
                None
            }
        }
    }

    pub fn write_raw(&mut self, key: &str, value: &str) -> bool {
        match self.backend.write(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "store write failed; continuing");
                false
            }
        }
    }

    pub fn remove_raw(&mut self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "store remove failed; continuing");
                false
            }
        }
    }

    pub fn audit_cap(&self) -> usize {
        self.audit_cap
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    fn read_json<D: DeserializeOwned>(&self, key: &str) -> Option<D> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "malformed document; using default");
                None
            }
        }
    }

    fn write_json<D: Serialize + ?Sized>(&mut self, key: &str, value: &D) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => {
                warn!(key, error = %e, "serialize failed; nothing written");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryBackend;
    use super::*;
    use crate::error::JuneError;
    use crate::model::TaskStatus;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Shares its map with the test so documents can be inspected or corrupted in place.
    #[derive(Clone, Default)]
    struct SharedBackend {
        entries: Rc<RefCell<HashMap<String, String>>>,
        fail_writes: bool,
        fail_reads: bool,
    }

    impl KvBackend for SharedBackend {
        fn read(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(JuneError::Io(std::io::Error::other("unavailable")));
            }
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn write(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(JuneError::Io(std::io::Error::other("quota exceeded")));
            }
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.entries.borrow_mut().remove(key);
            Ok(())
        }

        fn describe(&self) -> String {
            "shared".into()
        }
    }

    fn memory_store(cap: usize) -> RecordStore {
        RecordStore::open(Box::new(MemoryBackend::new()), cap)
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            agent_id: "ECHO-7".into(),
            title: "Sweep".into(),
            details: None,
            status: TaskStatus::Assigned,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_store_serves_demo_defaults() {
        let store = memory_store(1000);
        let agents: Vec<Agent> = store.get();
        assert_eq!(agents.len(), 3);
        assert!(store.get::<Task>().is_empty());
        assert!(store.get::<AuditEntry>().is_empty());
        assert_eq!(store.admin().username, "director_admin");
    }

    #[test]
    fn ensure_defaults_seeds_every_key_once() {
        let backend = SharedBackend::default();
        let mut store = RecordStore::open(Box::new(backend.clone()), 1000);
        for key in [AGENTS_KEY, TASKS_KEY, AUDIT_KEY, ADMIN_KEY] {
            assert!(backend.entries.borrow().contains_key(key), "{key} not seeded");
        }

        store.put::<Agent>(&[]);
        store.ensure_defaults();
        // An emptied roster stays empty: only absent keys are seeded.
        assert!(store.get::<Agent>().is_empty());
    }

    #[test]
    fn put_tasks_audits_count_summary() {
        let mut store = memory_store(1000);
        assert!(store.put(&[task("T1"), task("T2")]));
        let audit: Vec<AuditEntry> = store.get();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "tasks:save");
        assert_eq!(audit[0].details, "count=2");
    }

    #[test]
    fn commit_records_exactly_one_entry_with_caller_tag() {
        let mut store = memory_store(1000);
        store.commit(&[task("T1")], "task:create", "T1 -> ECHO-7");
        let audit: Vec<AuditEntry> = store.get();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "task:create");
        assert_eq!(audit[0].details, "T1 -> ECHO-7");
    }

    #[test]
    fn audit_and_admin_writes_do_not_self_audit() {
        let mut store = memory_store(1000);
        store.put::<AuditEntry>(&[]);
        store.put_admin(&AdminCredential::demo());
        assert!(store.get::<AuditEntry>().is_empty());
    }

    #[test]
    fn audit_is_newest_first_and_capped() {
        let mut store = memory_store(5);
        for i in 0..12 {
            store.append_audit("monitor:ping", &format!("{i}"));
            assert!(store.get::<AuditEntry>().len() <= 5);
        }
        let audit: Vec<AuditEntry> = store.get();
        let details: Vec<&str> = audit.iter().map(|e| e.details.as_str()).collect();
        assert_eq!(details, vec!["11", "10", "9", "8", "7"]);
        assert!(audit.windows(2).all(|w| w[0].at >= w[1].at));
    }

    #[test]
    fn audit_timestamps_never_go_backwards() {
        let backend = SharedBackend::default();
        let mut store = RecordStore::open(Box::new(backend.clone()), 1000);
        let future = Utc::now() + chrono::Duration::hours(1);
        let seeded = vec![AuditEntry {
            at: future,
            action: "clock:skew".into(),
            details: String::new(),
        }];
        store.put(seeded.as_slice());
        store.append_audit("monitor:ping", "ECHO-7");
        let audit: Vec<AuditEntry> = store.get();
        assert_eq!(audit[0].at, future);
    }

    #[test]
    fn corrupt_documents_fall_back_to_defaults() {
        let backend = SharedBackend::default();
        let store = RecordStore::open(Box::new(backend.clone()), 1000);
        for key in [AGENTS_KEY, TASKS_KEY, AUDIT_KEY, ADMIN_KEY] {
            backend
                .entries
                .borrow_mut()
                .insert(key.to_string(), "{not json".to_string());
        }
        assert_eq!(store.get::<Agent>().len(), 3);
        assert!(store.get::<Task>().is_empty());
        assert!(store.get::<AuditEntry>().is_empty());
        assert_eq!(store.admin(), AdminCredential::demo());
    }

    #[test]
    fn wrong_shape_is_treated_as_corrupt() {
        let backend = SharedBackend::default();
        let store = RecordStore::open(Box::new(backend.clone()), 1000);
        backend
            .entries
            .borrow_mut()
            .insert(ADMIN_KEY.to_string(), "[1,2,3]".to_string());
        assert_eq!(store.admin().username, "director_admin");
    }

    #[test]
    fn write_failures_are_swallowed() {
        let backend = SharedBackend {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = RecordStore::open(Box::new(backend), 1000);
        assert!(!store.put(&[task("T1")]));
        assert!(!store.append_audit("task:delete", "T1"));
        // Reads still answer with defaults.
        assert_eq!(store.get::<Agent>().len(), 3);
    }

    #[test]
    fn unavailable_reads_yield_defaults() {
        let backend = SharedBackend {
            fail_reads: true,
            ..Default::default()
        };
        let store = RecordStore::open(Box::new(backend), 1000);
        assert_eq!(store.get::<Agent>().len(), 3);
        assert_eq!(store.admin().username, "director_admin");
        assert_eq!(store.read_raw("june_selected"), None);
    }

    #[test]
    fn zero_cap_is_raised_to_one() {
        let mut store = memory_store(0);
        store.append_audit("a", "1");
        store.append_audit("b", "2");
        assert_eq!(store.audit_cap(), 1);
        assert_eq!(store.get::<AuditEntry>().len(), 1);
    }
}
