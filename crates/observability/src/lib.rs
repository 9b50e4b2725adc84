//! Process-wide logging setup.

/// Tracing subscriber configuration.
pub mod tracing;

pub use self::tracing::{LOG_FORMAT_ENV, LogFormat};

/// Initialize logging for the process from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
