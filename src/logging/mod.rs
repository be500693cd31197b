//! Browser console logging.
//!
//! Off wasm (native unit tests) the macros only format their arguments, so pure
//! code can log without touching wasm-bindgen imports.

#[macro_export]
macro_rules! console_debug {
    ($($arg:tt)*) => {
        $crate::logging::debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::logging::warn(&format!($($arg)*))
    };
}

#[cfg(target_arch = "wasm32")]
pub fn debug(msg: &str) {
    web_sys::console::debug_1(&format!("[teacher-console] {msg}").into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn debug(_msg: &str) {}

#[cfg(target_arch = "wasm32")]
pub fn warn(msg: &str) {
    web_sys::console::warn_1(&format!("[teacher-console] {msg}").into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(_msg: &str) {}
