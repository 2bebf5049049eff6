//! Conflict classification for failed submissions.
//!
//! The node reports version conflicts as error text, not structured codes.
//! The classifier turns that text into a closed tagged variant so the retry
//! rules are unit-testable independent of the live node's exact phrasing,
//! and the patterns stay pluggable for node upgrades.

use localnet_types::ObjectId;

/// Classification of one submission failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// The fee (or another input) resource was at a stale version; the
    /// message named the specific id.
    StaleResource(ObjectId),
    /// One or more input resources are locked by a pending operation. May
    /// name zero or more ids.
    LockedResources(Vec<ObjectId>),
    /// Anything else: a genuine application failure, never retried.
    Other,
}

/// Substring-pattern classifier for submission failures.
pub struct ConflictClassifier {
    stale_patterns: Vec<String>,
    locked_patterns: Vec<String>,
}

impl Default for ConflictClassifier {
    fn default() -> Self {
        Self {
            stale_patterns: vec![
                "object version mismatch".to_string(),
                "is not available for consumption".to_string(),
                "stale object reference".to_string(),
            ],
            locked_patterns: vec![
                "locked by a pending operation".to_string(),
                "contested objects".to_string(),
                "objects are locked".to_string(),
            ],
        }
    }
}

impl ConflictClassifier {
    /// Builds a classifier with explicit pattern sets.
    pub fn new(stale_patterns: Vec<String>, locked_patterns: Vec<String>) -> Self {
        Self { stale_patterns, locked_patterns }
    }

    /// Classifies an error message.
    ///
    /// Stale takes precedence: a stale match must also name an id to count,
    /// since the retry needs something concrete to exclude. A locked match
    /// counts even with zero extractable ids (the retry then just
    /// re-selects the fee resource).
    pub fn classify(&self, message: &str) -> ConflictKind {
        let lowered = message.to_ascii_lowercase();

        if self.stale_patterns.iter().any(|p| lowered.contains(p.as_str())) {
            if let Some(id) = extract_object_ids(message).into_iter().next() {
                return ConflictKind::StaleResource(id);
            }
        }

        if self.locked_patterns.iter().any(|p| lowered.contains(p.as_str())) {
            return ConflictKind::LockedResources(extract_object_ids(message));
        }

        ConflictKind::Other
    }
}

/// Extracts every `0x`-prefixed hex token from a message, normalized and
/// deduplicated in order of first appearance.
fn extract_object_ids(message: &str) -> Vec<ObjectId> {
    let mut ids = Vec::new();
    for token in message.split(|c: char| !(c.is_ascii_alphanumeric() || c == 'x')) {
        let candidate = token.trim_start_matches(|c: char| c != '0');
        if let Some(hex_part) = candidate.strip_prefix("0x") {
            if hex_part.len() >= 4 && hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
                let id = ObjectId::new(candidate);
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}
