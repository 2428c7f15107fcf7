//! Utility helpers — path resolution, timestamps, string masking.

use std::path::PathBuf;

/// Get the asak data directory (e.g. `~/.asak/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".asak")
}

/// Get the default usage snapshot path (e.g. `~/.asak/usage.json`).
pub fn get_usage_path() -> PathBuf {
    get_data_path().join("usage.json")
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Mask a secret for display, keeping at most the first 4 characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
