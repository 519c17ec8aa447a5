// Conditional logging macros - only active in debug builds.
// The search engine calls these on hot paths, so release builds compile them out.

use log::LevelFilter;

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

/// Environment variable that switches the default level to `Debug`.
pub const DEBUG_ENV_VAR: &str = "ISOGRAM_DEBUG";

/// Initialize the process-wide logger.
///
/// `RUST_LOG` overrides the level chosen here when it is set.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled || std::env::var(DEBUG_ENV_VAR).is_ok() {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp_millis()
        .format_module_path(false)
        .format_target(false);

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_ok() {
        log::debug!("Logger initialized at {level:?} level");
    }
}
