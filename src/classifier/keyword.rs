use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::Classifier;

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z0-9]+").expect("token pattern must compile")
});

/// On-disk form of a keyword model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordModel {
    /// Category returned when no keyword matches
    pub default_category: String,
    pub categories: Vec<CategoryKeywords>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model defines no categories")]
    Empty,
}

/// Scores text by counting keyword tokens per category.
///
/// The highest score wins, ties go to the category listed first, and text
/// matching no keyword gets the default category.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    default_category: String,
    categories: Vec<(String, HashSet<String>)>,
}

impl KeywordClassifier {
    pub fn from_model(model: KeywordModel) -> Result<Self, ClassifierError> {
        if model.categories.is_empty() {
            return Err(ClassifierError::Empty);
        }
        let categories = model
            .categories
            .into_iter()
            .map(|c| {
                let keywords = c.keywords.iter().map(|k| k.to_lowercase()).collect();
                (c.name, keywords)
            })
            .collect();
        Ok(Self {
            default_category: model.default_category,
            categories,
        })
    }

    /// Loads a JSON keyword model from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ClassifierError::NotFound { path: path.to_path_buf() },
            _ => ClassifierError::Io { path: path.to_path_buf(), source },
        })?;
        let model: KeywordModel = serde_json::from_str(&raw)?;
        let classifier = Self::from_model(model)?;
        info!(
            "Loaded keyword model from {} with {} categories",
            path.display(),
            classifier.categories.len()
        );
        Ok(classifier)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, masked_text: &str) -> String {
        let lowered = masked_text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_REGEX.find_iter(&lowered).map(|m| m.as_str()).collect();

        let mut best: Option<(&str, usize)> = None;
        for (name, keywords) in &self.categories {
            let score = tokens.iter().filter(|t| keywords.contains(**t)).count();
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((name.as_str(), score));
            }
        }

        match best {
            Some((name, score)) => {
                debug!("Classified as {} with score {}", name, score);
                name.to_string()
            }
            None => {
                debug!("No keyword matched, using default category");
                self.default_category.clone()
            }
        }
    }
}
