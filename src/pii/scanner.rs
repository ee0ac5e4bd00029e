use tracing::trace;

use super::patterns::{PatternRegistry, STANDARD_REGISTRY};
use super::Span;

impl PatternRegistry {
    /// Applies every rule to `text` independently.
    ///
    /// Candidates are grouped by kind in registry order, then by match order
    /// within a kind. The same characters may be claimed by several kinds.
    pub fn scan(&self, text: &str) -> Vec<Span> {
        let mut candidates = Vec::new();
        for (kind, rule) in self.rules() {
            let before = candidates.len();
            for range in rule.find_ranges(text) {
                candidates.push(Span {
                    start: range.start,
                    end: range.end,
                    kind,
                    text: text[range].to_string(),
                });
            }
            trace!("Rule {} produced {} candidates", kind, candidates.len() - before);
        }
        candidates
    }
}

/// Scans `text` with the standard registry
pub fn scan(text: &str) -> Vec<Span> {
    STANDARD_REGISTRY.scan(text)
}
