//! `KvStore` over the browser's localStorage.

use web_sys::Storage;

use crate::store::{KvStore, Result, StoreError};

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Fails when the browser denies storage access (sandboxed frame,
    /// private mode with storage disabled, no window).
    pub fn open() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| backend("no window object"))?;
        let storage = window
            .local_storage()
            .map_err(|err| backend(&format!("localStorage access denied: {err:?}")))?
            .ok_or_else(|| backend("localStorage unavailable"))?;
        Ok(Self { storage })
    }
}

fn backend(message: &str) -> StoreError {
    StoreError::Backend(message.to_owned())
}

impl KvStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|err| backend(&format!("get {key:?}: {err:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // fails on quota exhaustion
        self.storage
            .set_item(key, value)
            .map_err(|err| backend(&format!("set {key:?}: {err:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|err| backend(&format!("remove {key:?}: {err:?}")))
    }
}
