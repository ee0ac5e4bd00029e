use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::classifier::{Classifier, KeywordClassifier};
use crate::pii::{demask, demask_strict, DemaskError, PatternRegistry, STANDARD_REGISTRY};
use crate::triage::config::TriageConfig;
use crate::triage::models::{EmailRequest, EmailResponse, MaskResponse};
use crate::triage::TriageError;

/// Masks emails and classifies the masked text.
///
/// Holds no mutable state, so one instance serves any number of concurrent
/// callers.
#[derive(Clone)]
pub struct EmailTriage {
    registry: PatternRegistry,
    classifier: Option<Arc<dyn Classifier>>,
    strict_demask: bool,
}

impl EmailTriage {
    pub fn new(registry: PatternRegistry, classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            registry,
            classifier,
            strict_demask: false,
        }
    }

    /// Builds the pipeline from configuration.
    ///
    /// A model that fails to load is logged and leaves the classifier
    /// unavailable; masking still works.
    pub fn from_config(config: &TriageConfig) -> Self {
        let registry = STANDARD_REGISTRY.restricted_to(&config.enabled_kinds);
        debug!("Masking {} entity kinds", registry.len());

        let classifier: Option<Arc<dyn Classifier>> = match &config.model_path {
            Some(path) => match KeywordClassifier::from_path(path) {
                Ok(classifier) => Some(Arc::new(classifier)),
                Err(e) => {
                    error!("Error loading model: {}", e);
                    None
                }
            },
            None => {
                warn!("No model_path configured, classification disabled");
                None
            }
        };

        Self {
            registry,
            classifier,
            strict_demask: config.strict_demask,
        }
    }

    pub fn with_strict_demask(mut self, strict: bool) -> Self {
        self.strict_demask = strict;
        self
    }

    /// Whether a classifier is loaded
    pub fn is_ready(&self) -> bool {
        self.classifier.is_some()
    }

    /// Masks an email body without classifying it
    pub fn mask(&self, email_body: &str) -> MaskResponse {
        self.registry.mask(email_body).into()
    }

    /// Puts the recorded entities back into a masked body.
    ///
    /// Missing tags are skipped unless the pipeline is strict, in which case
    /// they fail the call.
    pub fn demask(&self, masked: &MaskResponse) -> Result<String, DemaskError> {
        let (text, entities) = (&masked.masked_email, &masked.list_of_masked_entities);
        if self.strict_demask {
            demask_strict(text, entities).map_err(|e| {
                warn!("Strict demask failed: {}", e);
                e
            })
        } else {
            Ok(demask(text, entities))
        }
    }

    /// Masks the body, then classifies the masked text.
    ///
    /// The classifier never receives the raw body.
    #[instrument(skip_all, fields(body_len = request.email_body.len()))]
    pub fn process(&self, request: &EmailRequest) -> Result<EmailResponse, TriageError> {
        let classifier = self.classifier.as_ref().ok_or_else(|| {
            warn!("Rejecting request: classifier not loaded");
            TriageError::ClassifierUnavailable
        })?;

        let masked = self.registry.mask(&request.email_body);
        let category = classifier.classify(&masked.masked_text);
        info!(
            "Triaged email: {} masked entities, category={}",
            masked.entities.len(),
            category
        );

        Ok(EmailResponse {
            input_email_body: request.email_body.clone(),
            list_of_masked_entities: masked.entities,
            masked_email: masked.masked_text,
            category_of_the_email: category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii::EntityKind;
    use std::sync::Mutex;

    /// Returns a fixed category and remembers what it was shown
    struct RecordingClassifier {
        seen: Mutex<Vec<String>>,
    }

    impl Classifier for RecordingClassifier {
        fn classify(&self, masked_text: &str) -> String {
            self.seen.lock().unwrap().push(masked_text.to_string());
            "Incident".to_string()
        }
    }

    #[test]
    fn test_classifier_sees_masked_text_only() {
        let classifier = Arc::new(RecordingClassifier { seen: Mutex::new(Vec::new()) });
        let triage = EmailTriage::new(PatternRegistry::standard(), Some(classifier.clone()));

        let request = EmailRequest {
            email_body: "Server down, reach me at ops.lead@corp.example".to_string(),
        };
        let response = triage.process(&request).unwrap();

        assert_eq!(response.category_of_the_email, "Incident");
        assert_eq!(response.input_email_body, request.email_body);
        assert_eq!(response.masked_email, "Server down, reach me at [email]");
        assert_eq!(
            classifier.seen.lock().unwrap().as_slice(),
            &["Server down, reach me at [email]".to_string()]
        );
    }

    #[test]
    fn test_unavailable_without_classifier() {
        let triage = EmailTriage::new(PatternRegistry::standard(), None);
        assert!(!triage.is_ready());
        let request = EmailRequest { email_body: "hello".to_string() };
        assert_eq!(triage.process(&request), Err(TriageError::ClassifierUnavailable));
        // masking does not depend on the classifier
        assert_eq!(triage.mask("cvv 123").masked_email, "cvv [cvv_no]");
    }

    #[test]
    fn test_from_config_restricts_kinds() {
        let config = TriageConfig {
            enabled_kinds: vec![EntityKind::Email],
            ..TriageConfig::default()
        };
        let triage = EmailTriage::from_config(&config);
        assert!(!triage.is_ready());
        let masked = triage.mask("John Smith, john@smith.org, cvv 123");
        assert_eq!(masked.masked_email, "John Smith, [email], cvv 123");
    }

    #[test]
    fn test_from_config_with_unreadable_model() {
        let config = TriageConfig {
            model_path: Some("does/not/exist.json".into()),
            ..TriageConfig::default()
        };
        assert!(!EmailTriage::from_config(&config).is_ready());
    }

    #[test]
    fn test_demask_lenient_and_strict() {
        let triage = EmailTriage::new(PatternRegistry::standard(), None);
        let mut masked = triage.mask("mail a@b.io, cvv 321");
        masked.masked_email = masked.masked_email.replace("[cvv_no]", "");

        assert_eq!(triage.demask(&masked).unwrap(), "mail a@b.io, cvv ");
        let strict = triage.clone().with_strict_demask(true);
        match strict.demask(&masked) {
            Err(DemaskError::UnresolvedTags { partial, unresolved }) => {
                assert_eq!(partial, "mail a@b.io, cvv ");
                assert_eq!(unresolved.len(), 1);
                assert_eq!(unresolved[0].classification, EntityKind::CvvNo);
            }
            other => panic!("expected unresolved tags, got {:?}", other),
        }

        masked.masked_email = "mail [email], cvv [cvv_no]".to_string();
        assert_eq!(strict.demask(&masked).unwrap(), "mail a@b.io, cvv 321");
    }
}
