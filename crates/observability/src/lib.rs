//! Shared tracing/logging setup for the order service binaries.

/// Initialize process-wide logging from `RUST_LOG` and `LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

pub mod tracing;

pub use tracing::LogFormat;
