//! Cache Key Module
//!
//! Builds composite keys from logical dimensions.

use crate::cache::{KEY_DELIMITER, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == Composite Key ==
/// Joins `parts` with [`KEY_DELIMITER`].
///
/// Every part must be non-empty and free of the delimiter, otherwise two
/// different queries could end up under the same key
/// (`"a:b" + "c"` vs `"a" + "b:c"`).
pub fn composite_key(parts: &[&str]) -> Result<String> {
    if parts.is_empty() {
        return Err(CacheError::InvalidKey("Key needs at least one part".to_string()));
    }

    for (index, part) in parts.iter().enumerate() {
        if part.trim().is_empty() {
            return Err(CacheError::InvalidKey(format!("Key part {} is empty", index)));
        }
        if part.contains(KEY_DELIMITER) {
            return Err(CacheError::InvalidKey(format!(
                "Key part '{}' contains the delimiter '{}'",
                part, KEY_DELIMITER
            )));
        }
    }

    let key = parts.join(KEY_DELIMITER);
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }

    Ok(key)
}
