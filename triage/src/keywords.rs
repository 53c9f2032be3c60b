//! Keyword dictionary for symptom triage.
//!
//! Two disjoint tiers of lower-case symptom phrases. The dictionary is plain
//! immutable data handed to the classifier and scorer at construction, so
//! alternate dictionaries can be swapped in for tests or per-clinic tuning.

use crate::error::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Built-in emergency-tier phrases, in match order.
pub const EMERGENCY_PHRASES: &[&str] = &[
    "bleeding",
    "seizure",
    "seizures",
    "unconscious",
    "not breathing",
    "poisoned",
    "poison",
    "hit by car",
    "broken bone",
    "choking",
    "collapse",
    "collapsed",
    "convulsing",
    "bloat",
    "swollen belly",
    "difficulty breathing",
    "can't breathe",
    "eaten chocolate",
    "eaten rat poison",
];

/// Built-in urgent-tier phrases, in match order.
pub const URGENT_PHRASES: &[&str] = &[
    "vomiting",
    "diarrhea",
    "limping",
    "won't eat",
    "lethargic",
    "swelling",
    "eye injury",
    "pain",
    "crying",
    "whimpering",
    "blood in stool",
    "blood in urine",
    "coughing",
    "difficulty walking",
];

/// Severity bucket a phrase belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordTier {
    Emergency,
    Urgent,
}

impl std::fmt::Display for KeywordTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emergency => write!(f, "emergency"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// On-disk dictionary layout.
///
/// ```toml
/// emergency = ["seizure", "hit by car"]
/// urgent = ["vomiting", "limping"]
/// ```
#[derive(Debug, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    emergency: Vec<String>,
    #[serde(default)]
    urgent: Vec<String>,
}

/// Immutable two-tier phrase set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordDictionary {
    emergency: Vec<String>,
    urgent: Vec<String>,
}

impl KeywordDictionary {
    /// The clinic's default phrase lists
    pub fn builtin() -> Self {
        Self {
            emergency: EMERGENCY_PHRASES.iter().map(|p| p.to_string()).collect(),
            urgent: URGENT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Build a dictionary from arbitrary phrase lists.
    ///
    /// Phrases are trimmed and lower-cased; duplicates within a tier collapse
    /// to their first occurrence. Blank phrases and phrases present in both
    /// tiers are rejected.
    pub fn new<E, U, S>(emergency: E, urgent: U) -> TriageResult<Self>
    where
        E: IntoIterator<Item = S>,
        U: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emergency = normalize_tier(emergency, KeywordTier::Emergency)?;
        let urgent = normalize_tier(urgent, KeywordTier::Urgent)?;

        let emergency_set: HashSet<&str> = emergency.iter().map(String::as_str).collect();
        if let Some(shared) = urgent.iter().find(|p| emergency_set.contains(p.as_str())) {
            return Err(TriageError::OverlappingTiers {
                phrase: shared.clone(),
            });
        }

        Ok(Self { emergency, urgent })
    }

    /// Parse a dictionary from TOML text
    pub fn from_toml_str(content: &str) -> TriageResult<Self> {
        let file: DictionaryFile = toml::from_str(content)?;
        Self::new(file.emergency, file.urgent)
    }

    /// Load a dictionary from a TOML file
    pub fn load(path: impl AsRef<Path>) -> TriageResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| TriageError::dictionary_io(path, e))?;
        let dictionary = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            emergency = dictionary.emergency.len(),
            urgent = dictionary.urgent.len(),
            "Loaded keyword dictionary"
        );
        Ok(dictionary)
    }

    pub fn emergency(&self) -> &[String] {
        &self.emergency
    }

    pub fn urgent(&self) -> &[String] {
        &self.urgent
    }

    /// Phrases of one tier
    pub fn phrases(&self, tier: KeywordTier) -> &[String] {
        match tier {
            KeywordTier::Emergency => &self.emergency,
            KeywordTier::Urgent => &self.urgent,
        }
    }

    /// Which tier an exact phrase belongs to, if any
    pub fn tier_of(&self, phrase: &str) -> Option<KeywordTier> {
        let phrase = phrase.trim().to_lowercase();
        if self.emergency.contains(&phrase) {
            Some(KeywordTier::Emergency)
        } else if self.urgent.contains(&phrase) {
            Some(KeywordTier::Urgent)
        } else {
            None
        }
    }

    /// All entries, emergency tier first
    pub fn entries(&self) -> impl Iterator<Item = (KeywordTier, &str)> {
        self.emergency
            .iter()
            .map(|p| (KeywordTier::Emergency, p.as_str()))
            .chain(self.urgent.iter().map(|p| (KeywordTier::Urgent, p.as_str())))
    }

    pub fn len(&self) -> usize {
        self.emergency.len() + self.urgent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emergency.is_empty() && self.urgent.is_empty()
    }
}

impl Default for KeywordDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_tier<I, S>(phrases: I, tier: KeywordTier) -> TriageResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for phrase in phrases {
        let phrase = phrase.as_ref().trim().to_lowercase();
        if phrase.is_empty() {
            return Err(TriageError::empty_phrase(tier.to_string()));
        }
        if seen.insert(phrase.clone()) {
            out.push(phrase);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tiers_are_disjoint() {
        let dict = KeywordDictionary::builtin();
        for phrase in dict.urgent() {
            assert!(
                !dict.emergency().contains(phrase),
                "{phrase} is in both tiers"
            );
        }
        assert_eq!(dict.emergency().len(), EMERGENCY_PHRASES.len());
        assert_eq!(dict.urgent().len(), URGENT_PHRASES.len());
    }

    #[test]
    fn test_builtin_matches_validated_constructor() {
        let rebuilt = KeywordDictionary::new(EMERGENCY_PHRASES, URGENT_PHRASES).unwrap();
        assert_eq!(rebuilt, KeywordDictionary::builtin());
    }

    #[test]
    fn test_new_normalizes_and_dedups() {
        let dict = KeywordDictionary::new(["  Seizure ", "seizure", "BLOAT"], ["Limping"]).unwrap();
        assert_eq!(dict.emergency(), &["seizure".to_string(), "bloat".to_string()]);
        assert_eq!(dict.urgent(), &["limping".to_string()]);
    }

    #[test]
    fn test_new_rejects_overlap() {
        let err = KeywordDictionary::new(["pain"], ["Pain"]).unwrap_err();
        assert!(matches!(err, TriageError::OverlappingTiers { phrase } if phrase == "pain"));
    }

    #[test]
    fn test_new_rejects_blank_phrase() {
        let err = KeywordDictionary::new(["seizure"], ["   "]).unwrap_err();
        assert!(matches!(err, TriageError::EmptyPhrase { tier } if tier == "urgent"));
    }

    #[test]
    fn test_tier_of() {
        let dict = KeywordDictionary::builtin();
        assert_eq!(dict.tier_of("Hit By Car"), Some(KeywordTier::Emergency));
        assert_eq!(dict.tier_of("coughing"), Some(KeywordTier::Urgent));
        assert_eq!(dict.tier_of("sneezing"), None);
    }

    #[test]
    fn test_from_toml_str() {
        let dict = KeywordDictionary::from_toml_str(
            r#"
emergency = ["heatstroke"]
urgent = ["sneezing", "itching"]
"#,
        )
        .unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.tier_of("itching"), Some(KeywordTier::Urgent));
    }

    #[test]
    fn test_from_toml_str_missing_tier_defaults_empty() {
        let dict = KeywordDictionary::from_toml_str(r#"urgent = ["sneezing"]"#).unwrap();
        assert!(dict.emergency().is_empty());
        assert!(!dict.is_empty());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = KeywordDictionary::from_toml_str("emergency = [").unwrap_err();
        assert!(matches!(err, TriageError::DictionaryParse(_)));
    }

    #[test]
    fn test_entries_emergency_first() {
        let dict = KeywordDictionary::new(["a"], ["b"]).unwrap();
        let entries: Vec<_> = dict.entries().collect();
        assert_eq!(
            entries,
            vec![(KeywordTier::Emergency, "a"), (KeywordTier::Urgent, "b")]
        );
    }
}
