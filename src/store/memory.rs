use std::collections::HashMap;

use crate::error::Result;
use crate::store::KvBackend;

/// Process-local backend. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_remove() {
        let mut kv = MemoryBackend::new();
        assert!(kv.entries.is_empty());
        kv.write("k", "v1").unwrap();
        kv.write("k", "v2").unwrap();
        assert_eq!(kv.read("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(kv.entries.len(), 1);
        kv.remove("k").unwrap();
        assert_eq!(kv.read("k").unwrap(), None);
        // Removing an absent key is fine.
        kv.remove("k").unwrap();
    }
}
