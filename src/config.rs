/// Application-level constants
pub const APP_NAME: &str = "pain-patterns";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "pain_patterns=info,pain_analyze=info"
}
