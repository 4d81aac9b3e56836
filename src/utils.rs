//! Utility functions for vigil.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::OnceLock;

use tracing::warn;

/// Global set of warned messages (for warn_once).
static WARNED_MESSAGES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Log a warning message only once per process.
///
/// Subsequent calls with the same message are ignored. Returns whether the
/// message was logged by this call.
pub fn warn_once(message: &str) -> bool {
    let warned = WARNED_MESSAGES.get_or_init(|| Mutex::new(HashSet::new()));
    // Recover the set if another thread panicked while holding the lock
    let mut guard = warned.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.insert(message.to_string()) {
        warn!("{}", message);
        true
    } else {
        false
    }
}

/// Uppercase the first character of `value`.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once() {
        assert!(warn_once("utils test: unique message"));
        assert!(!warn_once("utils test: unique message"));
        assert!(warn_once("utils test: another message"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("person"), "Person");
        assert_eq!(capitalize("cell phone"), "Cell phone");
        assert_eq!(capitalize(""), "");
    }
}
