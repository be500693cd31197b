#[macro_use]
mod logging;

mod api;
mod app;
mod components;
mod form;
mod models;
mod pages;
mod popup;
mod repository;
mod state;

use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::api::EnvConfig;
    use crate::popup::PopupMessage;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_popup_message_js_roundtrip() {
        for msg in [
            PopupMessage::TeacherAdded,
            PopupMessage::TeacherUpdated,
            PopupMessage::RefreshMain,
        ] {
            assert_eq!(PopupMessage::from_js(&msg.to_js()), Some(msg));
        }
    }

    #[wasm_bindgen_test]
    fn test_popup_message_ignores_foreign_data() {
        assert_eq!(PopupMessage::from_js(&JsValue::from_str("teacher-added")), None);
        assert_eq!(PopupMessage::from_js(&JsValue::NULL), None);

        let obj = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&obj, &"type".into(), &"teacher-deleted".into());
        assert_eq!(PopupMessage::from_js(&obj.into()), None);

        let obj = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&obj, &"kind".into(), &"teacher-added".into());
        assert_eq!(PopupMessage::from_js(&obj.into()), None);
    }

    #[wasm_bindgen_test]
    fn test_env_config_defaults_to_origin_api() {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .expect("test page has an origin");
        let cfg = EnvConfig::new();
        assert_eq!(cfg.api_url, format!("{origin}/api"));
        assert!(cfg.page_size.is_none());
    }
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
