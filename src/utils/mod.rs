//! Utility functions

pub mod hashing;
pub mod paths;

pub use hashing::sha256_file;
pub use paths::{path_exists, to_posix};

/// Current UTC time as a `Z`-suffixed ISO-8601 string (seconds precision).
pub fn now_utc_z() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
