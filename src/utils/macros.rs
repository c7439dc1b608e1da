/// MACROS
/// Cross-platform logging for messages printed before Bevy's logger is up
/// (config loading, startup banners). Browser console on wasm, stdout on native.
#[macro_export]
macro_rules! log {
    ($($t:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        ::web_sys::console::log_1(&format!($($t)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        println!($($t)*);
    }};
}
