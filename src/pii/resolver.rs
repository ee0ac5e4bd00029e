use tracing::debug;

use super::Span;

/// Spans that survived conflict resolution.
///
/// Sorted by `start` and pairwise non-overlapping. Only [`resolve`] builds
/// one, so every holder can rely on that ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeptSpans(Vec<Span>);

impl KeptSpans {
    pub fn as_slice(&self) -> &[Span] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a KeptSpans {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Greedy earliest-start selection over scanner candidates.
///
/// Candidates are stably sorted by start offset, so ties keep scan order
/// (registry order, then match order). A candidate is kept only if it starts
/// at or after the end of the last kept span. Length and kind play no part:
/// a longer candidate starting at the same offset as an earlier-registered
/// one is dropped.
pub fn resolve(mut candidates: Vec<Span>) -> KeptSpans {
    let total = candidates.len();
    candidates.sort_by_key(|c| c.start);

    let mut kept = Vec::with_capacity(total);
    let mut prev_end: Option<usize> = None;
    for candidate in candidates {
        if prev_end.map_or(true, |end| candidate.start >= end) {
            prev_end = Some(candidate.end);
            kept.push(candidate);
        }
    }

    debug!("Kept {} of {} candidate spans", kept.len(), total);
    KeptSpans(kept)
}
