use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::MAX_FILE_NAME_BYTES;

lazy_static! {
    /// Characters that would let a name escape the flat store namespace
    /// - Rejected: "a/b", "..\\x", "nul\0byte"
    pub static ref FORBIDDEN_NAME_CHARS: Regex = Regex::new(r"[/\\\x00]").unwrap();
}

/// Check that a client-supplied file name maps to an entry directly inside the store root.
///
/// Returns the reason for rejection so it can be surfaced to the client.
pub fn validate_file_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("File name must not be empty".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("'{}' is not a valid file name", name));
    }
    if FORBIDDEN_NAME_CHARS.is_match(name) {
        return Err("File name must not contain path separators or NUL bytes".to_string());
    }
    if name.len() > MAX_FILE_NAME_BYTES {
        return Err(format!(
            "File name must be at most {} bytes",
            MAX_FILE_NAME_BYTES
        ));
    }
    Ok(())
}
