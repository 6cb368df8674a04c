#[cfg(target_arch = "wasm32")]
use base64::engine::general_purpose::STANDARD;
#[cfg(target_arch = "wasm32")]
use base64::Engine;

use machigai_core::PlacementSnapshot;

pub(crate) const PLACEMENT_SESSION_KEY: &str = "machigai.placement.snapshot";

#[cfg(target_arch = "wasm32")]
fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.session_storage().ok().flatten())
}

pub(crate) fn load_placement_snapshot() -> Option<PlacementSnapshot> {
    #[cfg(target_arch = "wasm32")]
    {
        gloo::console::log!("placement snapshot: load");
        let storage = session_storage()?;
        let raw = storage.get_item(PLACEMENT_SESSION_KEY).ok()??;
        if raw.is_empty() {
            gloo::console::log!("placement snapshot: empty value");
            return None;
        }
        let bytes = STANDARD.decode(raw.as_bytes()).ok()?;
        match PlacementSnapshot::from_bytes(&bytes) {
            Ok(snapshot) => {
                gloo::console::log!("placement snapshot: loaded", snapshot.sprites.len());
                Some(snapshot)
            }
            Err(err) => {
                gloo::console::log!("placement snapshot: discarded", err.to_string());
                let _ = storage.remove_item(PLACEMENT_SESSION_KEY);
                None
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

pub(crate) fn save_placement_snapshot(snapshot: &PlacementSnapshot) {
    #[cfg(target_arch = "wasm32")]
    {
        let bytes = match snapshot.to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                gloo::console::log!("placement snapshot: encode failed", err.to_string());
                return;
            }
        };
        let raw = STANDARD.encode(bytes);
        let Some(storage) = session_storage() else {
            gloo::console::log!("placement snapshot: storage unavailable");
            return;
        };
        if storage.set_item(PLACEMENT_SESSION_KEY, &raw).is_err() {
            gloo::console::log!("placement snapshot: storage set failed");
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = snapshot;
    }
}

pub(crate) fn clear_placement_snapshot() {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(storage) = session_storage() else {
            return;
        };
        let _ = storage.remove_item(PLACEMENT_SESSION_KEY);
    }
}
