use crate::models::Session;
use serde::{Deserialize, Serialize};

pub(crate) const SESSION_KEY: &str = "biolink_session";

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = storage.remove_item(key);
    }
}

pub(crate) fn save_session(session: &Session) {
    save_json_to_storage(SESSION_KEY, session);
}

pub(crate) fn load_session() -> Option<Session> {
    load_json_from_storage::<Session>(SESSION_KEY)
}

pub(crate) fn clear_session() {
    remove_from_storage(SESSION_KEY);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` +
// wasm-bindgen-test-runner).
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn session_storage_roundtrip() {
        clear_session();
        assert!(load_session().is_none());

        let s = Session {
            access_token: "t1".to_string(),
            owner_id: "u1".to_string(),
            email: "u@example.com".to_string(),
        };
        save_session(&s);
        assert_eq!(load_session(), Some(s));

        clear_session();
        assert!(load_session().is_none());
    }
}
