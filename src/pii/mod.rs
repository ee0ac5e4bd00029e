pub mod patterns;
pub mod scanner;
pub mod resolver;
pub mod masker;
pub mod demasker;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use demasker::{demask, demask_detailed, demask_strict, DemaskError, DemaskOutcome};
pub use masker::{mask, mask_spans, MaskedText};
pub use patterns::{MatchRule, PatternRegistry, STANDARD_REGISTRY};
pub use resolver::{resolve, KeptSpans};
pub use scanner::scan;

/// Category of sensitive data recognised by the pattern registry.
///
/// The snake_case name doubles as the body of the placeholder tag and as the
/// serialized `classification` of a [`MaskedEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    FullName,
    Email,
    PhoneNumber,
    Dob,
    AadharNum,
    CreditDebitNo,
    CvvNo,
    ExpiryNo,
}

impl EntityKind {
    /// Every kind, in registry order
    pub const ALL: [EntityKind; 8] = [
        EntityKind::FullName,
        EntityKind::Email,
        EntityKind::PhoneNumber,
        EntityKind::Dob,
        EntityKind::AadharNum,
        EntityKind::CreditDebitNo,
        EntityKind::CvvNo,
        EntityKind::ExpiryNo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::FullName => "full_name",
            EntityKind::Email => "email",
            EntityKind::PhoneNumber => "phone_number",
            EntityKind::Dob => "dob",
            EntityKind::AadharNum => "aadhar_num",
            EntityKind::CreditDebitNo => "credit_debit_no",
            EntityKind::CvvNo => "cvv_no",
            EntityKind::ExpiryNo => "expiry_no",
        }
    }

    /// Placeholder written over a masked span, e.g. `[email]`
    pub fn tag(&self) -> String {
        format!("[{}]", self.as_str())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A match of one entity kind over the scanned text.
///
/// `start..end` is a half-open byte range into the text the span was found
/// in, and `text` is exactly the substring over that range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: EntityKind,
    pub text: String,
}

/// Record of one masked span, sufficient to reverse the mask.
///
/// `position` holds character offsets into the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedEntity {
    pub position: [usize; 2],
    pub classification: EntityKind,
    pub entity: String,
}
