//! Orchestrator utility functions

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Compute a short hash for a trip request
///
/// Returns an 8-character hexadecimal hash suitable for logging and tracing
/// without writing the request text itself to the logs.
///
/// # Arguments
/// * `content` - The request text to hash
///
/// # Returns
/// * `String` - 8-character hexadecimal hash
pub fn hash_request(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())[..8].to_string()
}

/// Shorten text for log fields, respecting character boundaries
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
