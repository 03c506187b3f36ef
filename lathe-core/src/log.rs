//! Logging for the simulation core.
//!
//! In the browser every line goes to the developer console. Native builds
//! stay silent unless the `tracing` feature is enabled.

#[cfg(target_arch = "wasm32")]
pub(crate) fn log(s: &str) {
    web_sys::console::log_1(&s.into());
}

#[cfg(all(not(target_arch = "wasm32"), feature = "tracing"))]
pub(crate) fn log(s: &str) {
    tracing::debug!("{s}");
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "tracing")))]
pub(crate) fn log(_s: &str) {}

macro_rules! console_log {
    ($($t:tt)*) => ($crate::log::log(&format!($($t)*)))
}
