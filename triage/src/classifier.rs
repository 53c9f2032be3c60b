//! Text classifier: finds dictionary phrases in transcript text.

use crate::error::TriageError;
use crate::keywords::{KeywordDictionary, KeywordTier};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How phrases are located in the input text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain substring containment ("pain" matches inside "painting")
    #[default]
    Substring,
    /// Phrase must start and end on word boundaries
    WordBoundary,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Substring => write!(f, "substring"),
            Self::WordBoundary => write!(f, "word_boundary"),
        }
    }
}

impl std::str::FromStr for MatchMode {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "substring" => Ok(Self::Substring),
            "word_boundary" | "word" => Ok(Self::WordBoundary),
            other => Err(TriageError::UnknownMatchMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Result of one classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub is_emergency: bool,
    pub is_urgent: bool,
    /// Emergency-tier hits then urgent-tier hits, each in dictionary order
    pub detected_symptoms: Vec<String>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.detected_symptoms.is_empty()
    }
}

/// A dictionary phrase prepared for matching
#[derive(Debug, Clone)]
struct Matcher {
    tier: KeywordTier,
    phrase: String,
    pattern: Option<Regex>,
}

impl Matcher {
    fn is_match(&self, lower: &str) -> bool {
        match &self.pattern {
            Some(re) => re.is_match(lower),
            None => lower.contains(self.phrase.as_str()),
        }
    }
}

/// Stateless keyword classifier over an injected dictionary
#[derive(Debug, Clone)]
pub struct TextClassifier {
    dictionary: Arc<KeywordDictionary>,
    mode: MatchMode,
    matchers: Vec<Matcher>,
}

impl TextClassifier {
    /// Substring classifier over `dictionary`
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        Self::with_mode(dictionary, MatchMode::Substring)
    }

    pub fn with_mode(dictionary: Arc<KeywordDictionary>, mode: MatchMode) -> Self {
        let matchers = dictionary
            .entries()
            .map(|(tier, phrase)| Matcher {
                tier,
                phrase: phrase.to_string(),
                pattern: match mode {
                    MatchMode::Substring => None,
                    MatchMode::WordBoundary => word_pattern(phrase),
                },
            })
            .collect();
        Self {
            dictionary,
            mode,
            matchers,
        }
    }

    pub fn dictionary(&self) -> &Arc<KeywordDictionary> {
        &self.dictionary
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Scan `text` for every dictionary phrase. Case-insensitive; never fails.
    pub fn classify(&self, text: &str) -> Detection {
        let lower = text.to_lowercase();
        let mut detection = Detection::default();

        for matcher in self.matchers.iter().filter(|m| m.is_match(&lower)) {
            match matcher.tier {
                KeywordTier::Emergency => detection.is_emergency = true,
                KeywordTier::Urgent => detection.is_urgent = true,
            }
            detection.detected_symptoms.push(matcher.phrase.clone());
        }

        detection
    }
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::new(Arc::new(KeywordDictionary::builtin()))
    }
}

/// `\b` only anchors next to word characters, so edges that start or end
/// with punctuation are left unanchored on that side.
fn word_pattern(phrase: &str) -> Option<Regex> {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let start = if is_word(phrase.chars().next()) { r"\b" } else { "" };
    let end = if is_word(phrase.chars().last()) { r"\b" } else { "" };
    let source = format!("{start}{}{end}", regex::escape(phrase));
    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            // Escaped literals always compile; fall back to substring if not.
            tracing::warn!(phrase, error = %e, "Word-boundary pattern rejected");
            None
        }
    }
}
