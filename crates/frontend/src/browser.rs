use futures::channel::mpsc::UnboundedSender;
use recaria_shared::storage::{GameStorage, KeyValueStore, StorageError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// `window.localStorage`, or nothing when the browser refuses it (private
/// mode, sandboxed iframes).
pub struct BrowserStore {
    storage: Option<web_sys::Storage>,
}

impl BrowserStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            tracing::warn!("localStorage unavailable; progress will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: format!("{e:?}"),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage.remove_item(key).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: format!("{e:?}"),
        })
    }
}

pub fn game_storage() -> GameStorage<BrowserStore> {
    GameStorage::new(BrowserStore::open())
}

pub fn window_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width, height))
}

/// Bounding rect of an element by id.
pub fn element_rect(id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(id)?;
    Some(element.get_bounding_client_rect())
}

/// Forward every window `resize` into `tx` for the lifetime of the page.
pub fn on_window_resize(tx: UnboundedSender<()>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
        let _ = tx.unbounded_send(());
    });
    if let Err(e) =
        window.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
    {
        tracing::warn!("could not listen for resize: {e:?}");
    }
    callback.forget();
}
