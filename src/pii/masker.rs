use tracing::{debug, warn};

use super::patterns::{PatternRegistry, STANDARD_REGISTRY};
use super::resolver::{resolve, KeptSpans};
use super::{MaskedEntity, Span};

/// Output of a masking pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedText {
    /// Input text with every kept span replaced by its tag
    pub masked_text: String,
    /// One record per replaced span, ascending by position
    pub entities: Vec<MaskedEntity>,
}

/// Replaces each kept span of `text` with its kind tag.
///
/// Spans are rewritten rightmost first so the byte offsets of the spans still
/// to be processed stay valid. A span whose recorded text is not what `text`
/// holds at its offsets was produced from some other text and is skipped.
/// The pass is single: tags are never re-scanned.
pub fn mask_spans(text: &str, kept: &KeptSpans) -> MaskedText {
    let mut masked_text = text.to_string();
    let mut applied: Vec<&Span> = Vec::with_capacity(kept.len());

    for span in kept.iter().rev() {
        if text.get(span.start..span.end) != Some(span.text.as_str()) {
            warn!(
                "Skipping {} span at {}..{}: it does not belong to this text",
                span.kind, span.start, span.end
            );
            continue;
        }
        masked_text.replace_range(span.start..span.end, &span.kind.tag());
        applied.push(span);
    }
    applied.reverse();

    MaskedText {
        masked_text,
        entities: to_records(text, &applied),
    }
}

// Converts ascending byte-offset spans into records with character positions.
fn to_records(text: &str, spans: &[&Span]) -> Vec<MaskedEntity> {
    let mut records = Vec::with_capacity(spans.len());
    let mut byte_cursor = 0;
    let mut char_cursor = 0;
    for span in spans {
        char_cursor += text[byte_cursor..span.start].chars().count();
        let start = char_cursor;
        char_cursor += span.text.chars().count();
        byte_cursor = span.end;
        records.push(MaskedEntity {
            position: [start, char_cursor],
            classification: span.kind,
            entity: span.text.clone(),
        });
    }
    records
}

impl PatternRegistry {
    /// Scan, resolve and mask `text` in one pass
    pub fn mask(&self, text: &str) -> MaskedText {
        let kept = resolve(self.scan(text));
        let masked = mask_spans(text, &kept);
        debug!("Masked {} entities", masked.entities.len());
        masked
    }
}

/// Masks `text` with the standard registry
pub fn mask(text: &str) -> MaskedText {
    STANDARD_REGISTRY.mask(text)
}
