//! Named-document persistence over a flat key-value substrate.
//!
//! Content lives under `doc:<name>` keys; the ordered set of known names is
//! one JSON array under a distinguished index key. Every mutating operation
//! updates both, so no observer ever sees an index entry without content or
//! content without an index entry.

use std::collections::HashMap;

use thiserror::Error;

/// Key prefix for document content.
pub const DOC_PREFIX: &str = "doc:";
/// Distinguished key holding the JSON array of known document names.
pub const INDEX_KEY: &str = "doc-index";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document index record is corrupt: {0}")]
    CorruptIndex(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Flat string-keyed persistence substrate (localStorage in the browser).
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory substrate for native tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// CRUD over named text documents plus the ordered name index.
pub struct DocumentStore<K: KvStore> {
    kv: K,
}

impl<K: KvStore> DocumentStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Upsert a document. A new name is appended to the index once; saving
    /// an existing name updates content only.
    pub fn save(&mut self, name: &str, content: &str) -> Result<()> {
        let mut index = self.read_index()?;
        self.kv.set(&doc_key(name), content)?;
        if !index.iter().any(|n| n == name) {
            index.push(name.to_owned());
            self.write_index(&index)?;
        }
        log::debug!("saved document {name:?} ({} bytes)", content.len());
        Ok(())
    }

    /// `None` means the document does not exist, a normal outcome rather
    /// than an error.
    pub fn load(&self, name: &str) -> Result<Option<String>> {
        self.kv.get(&doc_key(name))
    }

    /// Remove a document and its index entry. Deleting a name that was never
    /// saved is a no-op.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let mut index = self.read_index()?;
        self.kv.remove(&doc_key(name))?;
        let before = index.len();
        index.retain(|n| n != name);
        if index.len() != before {
            self.write_index(&index)?;
            log::debug!("deleted document {name:?}");
        }
        Ok(())
    }

    /// Known document names in first-insertion order.
    pub fn list(&self) -> Result<Vec<String>> {
        self.read_index()
    }

    fn read_index(&self) -> Result<Vec<String>> {
        match self.kv.get(INDEX_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_index(&mut self, names: &[String]) -> Result<()> {
        let raw = serde_json::to_string(names)?;
        self.kv.set(INDEX_KEY, &raw)
    }
}

fn doc_key(name: &str) -> String {
    format!("{DOC_PREFIX}{name}")
}
