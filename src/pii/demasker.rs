use thiserror::Error;
use tracing::debug;

use super::MaskedEntity;

/// Result of a demasking pass that reports what it could not restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemaskOutcome {
    pub text: String,
    /// Records whose tag was not found, in stored order
    pub unresolved: Vec<MaskedEntity>,
}

impl DemaskOutcome {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemaskError {
    #[error("{} masked entities could not be restored", .unresolved.len())]
    UnresolvedTags {
        /// Text with every restorable entity put back
        partial: String,
        unresolved: Vec<MaskedEntity>,
    },
}

/// Restores masked entities, reporting the records whose tag was missing.
///
/// Records are applied last to first. Each one replaces the FIRST occurrence
/// of its tag in the working text, wherever that is; positions are not used.
/// With two records of the same kind the values therefore land in each
/// other's slots. That is the established behavior and callers depending on
/// exact reversal must avoid duplicate kinds or check the result.
pub fn demask_detailed(masked_text: &str, entities: &[MaskedEntity]) -> DemaskOutcome {
    let mut text = masked_text.to_string();
    let mut unresolved = Vec::new();

    for record in entities.iter().rev() {
        let tag = record.classification.tag();
        match text.find(&tag) {
            Some(pos) => text.replace_range(pos..pos + tag.len(), &record.entity),
            None => {
                debug!(
                    "Tag {} for entity at {:?} not found, leaving text unchanged",
                    tag, record.position
                );
                unresolved.push(record.clone());
            }
        }
    }
    unresolved.reverse();

    DemaskOutcome { text, unresolved }
}

/// Restores masked entities; records whose tag is missing are skipped silently
pub fn demask(masked_text: &str, entities: &[MaskedEntity]) -> String {
    demask_detailed(masked_text, entities).text
}

/// Like [`demask`], but fails if any record could not be restored
pub fn demask_strict(masked_text: &str, entities: &[MaskedEntity]) -> Result<String, DemaskError> {
    let outcome = demask_detailed(masked_text, entities);
    if outcome.is_complete() {
        Ok(outcome.text)
    } else {
        Err(DemaskError::UnresolvedTags {
            partial: outcome.text,
            unresolved: outcome.unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii::{mask, EntityKind};

    fn record(start: usize, end: usize, kind: EntityKind, entity: &str) -> MaskedEntity {
        MaskedEntity {
            position: [start, end],
            classification: kind,
            entity: entity.to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let text = "Dear Anita Desai, your card 4111 1111 1111 1111 expires 09/27.";
        let masked = mask(text);
        assert_ne!(masked.masked_text, text);
        assert_eq!(demask(&masked.masked_text, &masked.entities), text);
    }

    #[test]
    fn test_nothing_to_restore() {
        assert_eq!(demask("plain text", &[]), "plain text");
        assert_eq!(demask("", &[]), "");
    }

    #[test]
    fn test_missing_tag_is_skipped() {
        let entities = vec![
            record(0, 5, EntityKind::CvvNo, "123"),
            record(9, 20, EntityKind::Email, "a@b.io"),
        ];
        let outcome = demask_detailed("[email] and more", &entities);
        assert_eq!(outcome.text, "a@b.io and more");
        assert_eq!(outcome.unresolved, vec![entities[0].clone()]);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_out_of_order_records() {
        let entities = vec![
            record(10, 20, EntityKind::Email, "x@y.org"),
            record(0, 4, EntityKind::CvvNo, "999"),
        ];
        let text = demask("[cvv_no] then [email]", &entities);
        assert_eq!(text, "999 then x@y.org");
    }

    #[test]
    fn test_duplicate_kinds_swap_slots() {
        let masked = mask("Call 9876543210 or 9123456789");
        assert_eq!(masked.masked_text, "Call [phone_number] or [phone_number]");
        let restored = demask(&masked.masked_text, &masked.entities);
        assert_eq!(restored, "Call 9123456789 or 9876543210");
    }

    #[test]
    fn test_strict_reports_unresolved() {
        let entities = vec![record(0, 7, EntityKind::Dob, "01/01/1999")];
        match demask_strict("no tags", &entities) {
            Err(DemaskError::UnresolvedTags { partial, unresolved }) => {
                assert_eq!(partial, "no tags");
                assert_eq!(unresolved, entities);
            }
            other => panic!("expected unresolved tags, got {:?}", other),
        }
        assert_eq!(demask_strict("[dob]", &entities).unwrap(), "01/01/1999");
    }

    #[test]
    fn test_error_message() {
        let err = DemaskError::UnresolvedTags {
            partial: String::new(),
            unresolved: vec![record(0, 1, EntityKind::CvvNo, "1")],
        };
        assert_eq!(err.to_string(), "1 masked entities could not be restored");
    }
}
