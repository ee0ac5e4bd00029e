pub mod keyword;

pub use keyword::{CategoryKeywords, ClassifierError, KeywordClassifier, KeywordModel};

/// Assigns a category to an email body.
///
/// Implementations only ever see masked text; the triage pipeline never hands
/// them the raw body.
pub trait Classifier: Send + Sync {
    fn classify(&self, masked_text: &str) -> String;
}
