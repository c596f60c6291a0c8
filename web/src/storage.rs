//! `localStorage` as a [`KeyValueStore`].
//!
//! Outside the browser (server-side rendering) the store is empty and
//! writes are dropped; guarded pages do not render there anyway.

use hydrowatch_common::error::Result;
use hydrowatch_common::store::{KeyValueStore, SessionStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

pub type Store = SessionStore<BrowserStore>;

/// The session store every component reads and writes.
pub fn session_store() -> Store {
    SessionStore::new(BrowserStore)
}

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        use hydrowatch_common::error::Error;
        let storage =
            local_storage().ok_or_else(|| Error::Storage("localStorage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| Error::Storage(format!("cannot write {key}: {e:?}")))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

#[cfg(not(feature = "hydrate"))]
impl KeyValueStore for BrowserStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) {}
}
