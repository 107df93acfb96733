use web_sys::{Storage, Window};

use drawarea_core::{MemoryStore, Store, StoreError};

fn describe(err: wasm_bindgen::JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// `localStorage`, or an in-memory map when the page may not use it.
pub enum BrowserStore {
    Local(Storage),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn open(window: &Window) -> Self {
        match window.local_storage() {
            Ok(Some(storage)) => BrowserStore::Local(storage),
            Ok(None) => {
                tracing::warn!("localStorage missing, drawing will not persist");
                BrowserStore::Memory(MemoryStore::new())
            }
            Err(err) => {
                tracing::warn!(error = describe(err), "localStorage denied, drawing will not persist");
                BrowserStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl Store for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            BrowserStore::Local(storage) => storage
                .get_item(key)
                .map_err(|err| StoreError::Unavailable(describe(err))),
            BrowserStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            BrowserStore::Local(storage) => {
                storage
                    .set_item(key, value)
                    .map_err(|err| StoreError::Write {
                        key: key.to_string(),
                        reason: describe(err),
                    })
            }
            BrowserStore::Memory(store) => store.set(key, value),
        }
    }
}
