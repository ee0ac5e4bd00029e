//! PII masking for email triage.
//!
//! [`pii`] finds sensitive spans, masks them with typed tags and reverses the
//! mask. [`triage`] runs masked text through a [`classifier::Classifier`].

pub mod classifier;
pub mod pii;
pub mod triage;
pub mod utils;
