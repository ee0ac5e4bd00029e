use once_cell::sync::Lazy;
use regex::{Match, Regex};
use std::ops::Range;

use super::EntityKind;

// Rules match liberally; overlaps between the numeric kinds are settled by
// the resolver, not here.

pub static FULL_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][a-z]+(?:\s[A-Z][a-z]+)+")
        .expect("full_name pattern must compile")
});

pub static CAPITALIZED_WORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][a-z]+").expect("capitalized word pattern must compile")
});

pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+")
        .expect("email pattern must compile")
});

pub static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\b\d{1,3}[-.\s]??\d{1,4}[-.\s]??\d{3,4}[-.\s]??\d{3,4}\b")
        .expect("phone_number pattern must compile")
});

pub static DOB_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:0?[1-9]|[12][0-9]|3[01])[-/](?:0?[1-9]|1[012])[-/](?:19|20)\d{2}\b")
        .expect("dob pattern must compile")
});

pub static AADHAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}\s?\d{4}\s?\d{4}\b").expect("aadhar_num pattern must compile")
});

pub static CARD_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d[ -]*?){13,16}\b").expect("credit_debit_no pattern must compile")
});

pub static CVV_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{3,4}\b").expect("cvv_no pattern must compile")
});

pub static EXPIRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(0[1-9]|1[0-2])/?([0-9]{2}|[0-9]{4})\b")
        .expect("expiry_no pattern must compile")
});

/// Capitalized words that open a sentence or greeting rather than a name.
/// "Dear John Smith" should mask "John Smith", not the whole run.
pub const NAME_LEADING_STOPWORDS: &[&str] = &[
    "Dear", "Hi", "Hello", "Hey", "Greetings", "Contact", "Attn", "Attention",
    "Please", "Thanks", "Thank", "Regards", "Best", "Kind", "Warm", "Sincerely",
    "Cheers", "Mr", "Mrs", "Ms", "Miss", "Dr", "Prof", "Sir", "Madam", "From",
    "To", "Cc", "Call", "Email", "Mail", "Name", "My", "Our", "Your", "The",
    "This", "Customer", "Account", "Card",
];

/// How a registry entry finds its matches in a text.
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Every non-overlapping match of the expression
    Pattern(Regex),
    /// Runs of capitalized words with leading stopwords trimmed off; a run
    /// left with fewer than `min_words` words is dropped
    CapitalizedRun {
        run: Regex,
        word: Regex,
        skip_leading: &'static [&'static str],
        min_words: usize,
    },
}

impl MatchRule {
    /// Byte ranges of all matches in `text`, in ascending order
    pub fn find_ranges(&self, text: &str) -> Vec<Range<usize>> {
        match self {
            MatchRule::Pattern(re) => re.find_iter(text).map(|m| m.range()).collect(),
            MatchRule::CapitalizedRun { run, word, skip_leading, min_words } => run
                .find_iter(text)
                .filter_map(|m| trim_leading_words(m, word, skip_leading, *min_words))
                .collect(),
        }
    }
}

fn trim_leading_words(
    run: Match<'_>,
    word: &Regex,
    skip_leading: &[&str],
    min_words: usize,
) -> Option<Range<usize>> {
    let words: Vec<Match<'_>> = word.find_iter(run.as_str()).collect();
    let first = words
        .iter()
        .position(|w| !skip_leading.iter().any(|s| *s == w.as_str()))?;
    if words.len() - first < min_words {
        return None;
    }
    Some(run.start() + words[first].start()..run.end())
}

/// Ordered mapping from entity kind to its matching rule.
///
/// Order matters: when two candidates start at the same offset the one whose
/// kind comes first here survives conflict resolution.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    rules: Vec<(EntityKind, MatchRule)>,
}

/// Process-wide registry with every kind enabled
pub static STANDARD_REGISTRY: Lazy<PatternRegistry> = Lazy::new(PatternRegistry::standard);

impl PatternRegistry {
    /// Builds the full registry. Panics if a pattern fails to compile.
    pub fn standard() -> Self {
        let rules = EntityKind::ALL
            .iter()
            .map(|&kind| (kind, Self::standard_rule(kind)))
            .collect();
        Self { rules }
    }

    fn standard_rule(kind: EntityKind) -> MatchRule {
        match kind {
            EntityKind::FullName => MatchRule::CapitalizedRun {
                run: FULL_NAME_REGEX.clone(),
                word: CAPITALIZED_WORD_REGEX.clone(),
                skip_leading: NAME_LEADING_STOPWORDS,
                min_words: 2,
            },
            EntityKind::Email => MatchRule::Pattern(EMAIL_REGEX.clone()),
            EntityKind::PhoneNumber => MatchRule::Pattern(PHONE_REGEX.clone()),
            EntityKind::Dob => MatchRule::Pattern(DOB_REGEX.clone()),
            EntityKind::AadharNum => MatchRule::Pattern(AADHAR_REGEX.clone()),
            EntityKind::CreditDebitNo => MatchRule::Pattern(CARD_NUMBER_REGEX.clone()),
            EntityKind::CvvNo => MatchRule::Pattern(CVV_REGEX.clone()),
            EntityKind::ExpiryNo => MatchRule::Pattern(EXPIRY_REGEX.clone()),
        }
    }

    /// Copy of this registry keeping only `kinds`, in this registry's order
    pub fn restricted_to(&self, kinds: &[EntityKind]) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|(kind, _)| kinds.contains(kind))
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, kind: EntityKind) -> Option<&MatchRule> {
        self.rules.iter().find(|(k, _)| *k == kind).map(|(_, rule)| rule)
    }

    pub fn rules(&self) -> impl Iterator<Item = (EntityKind, &MatchRule)> + '_ {
        self.rules.iter().map(|(kind, rule)| (*kind, rule))
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.rules.iter().map(|(kind, _)| *kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        STANDARD_REGISTRY.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(kind: EntityKind, text: &str) -> Vec<String> {
        STANDARD_REGISTRY
            .get(kind)
            .unwrap()
            .find_ranges(text)
            .into_iter()
            .map(|r| text[r].to_string())
            .collect()
    }

    #[test]
    fn test_standard_registry_order() {
        let kinds: Vec<EntityKind> = STANDARD_REGISTRY.kinds().collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
    }

    #[test]
    fn test_full_name_trims_greeting() {
        assert_eq!(matches(EntityKind::FullName, "Dear John Smith,"), vec!["John Smith"]);
        assert_eq!(
            matches(EntityKind::FullName, "Kind Regards Priya Raman Iyer"),
            vec!["Priya Raman Iyer"]
        );
    }

    #[test]
    fn test_full_name_needs_two_words() {
        assert!(matches(EntityKind::FullName, "Hello Team, see you").is_empty());
        assert!(matches(EntityKind::FullName, "John called").is_empty());
    }

    #[test]
    fn test_email_pattern() {
        assert_eq!(
            matches(EntityKind::Email, "write to a.b+c@mail-host.co.in now"),
            vec!["a.b+c@mail-host.co.in"]
        );
    }

    #[test]
    fn test_phone_pattern() {
        assert_eq!(matches(EntityKind::PhoneNumber, "call 9876543210."), vec!["9876543210"]);
        assert_eq!(
            matches(EntityKind::PhoneNumber, "call +1 555 123 4567 today"),
            vec!["+1 555 123 4567"]
        );
        // sixteen bare digits are too long for any phone layout
        assert!(matches(EntityKind::PhoneNumber, "1234567812345678").is_empty());
    }

    #[test]
    fn test_dob_pattern() {
        assert_eq!(matches(EntityKind::Dob, "born 15/08/1990"), vec!["15/08/1990"]);
        assert_eq!(matches(EntityKind::Dob, "born 1-1-2001"), vec!["1-1-2001"]);
        assert!(matches(EntityKind::Dob, "born 15/08/1890").is_empty());
    }

    #[test]
    fn test_aadhar_pattern() {
        assert_eq!(matches(EntityKind::AadharNum, "id 1234 5678 9012"), vec!["1234 5678 9012"]);
        assert_eq!(matches(EntityKind::AadharNum, "id 123456789012"), vec!["123456789012"]);
    }

    #[test]
    fn test_card_pattern() {
        assert_eq!(
            matches(EntityKind::CreditDebitNo, "card 4111-1111-1111-1111 ok"),
            vec!["4111-1111-1111-1111"]
        );
        assert!(matches(EntityKind::CreditDebitNo, "only 123456789012").is_empty());
    }

    #[test]
    fn test_cvv_and_expiry_patterns() {
        assert_eq!(matches(EntityKind::CvvNo, "cvv 123 or 4567"), vec!["123", "4567"]);
        assert_eq!(matches(EntityKind::ExpiryNo, "exp 12/25"), vec!["12/25"]);
        assert_eq!(matches(EntityKind::ExpiryNo, "exp 07/2031"), vec!["07/2031"]);
        assert!(matches(EntityKind::ExpiryNo, "exp 13/25").is_empty());
    }

    #[test]
    fn test_restricted_keeps_standard_order() {
        let registry = STANDARD_REGISTRY.restricted_to(&[EntityKind::CvvNo, EntityKind::Email]);
        let kinds: Vec<EntityKind> = registry.kinds().collect();
        assert_eq!(kinds, vec![EntityKind::Email, EntityKind::CvvNo]);
        assert!(registry.get(EntityKind::FullName).is_none());
    }
}
