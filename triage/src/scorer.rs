//! Severity scorer: turns detected symptoms into a triage level and score.

use crate::keywords::KeywordDictionary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Score assigned when any emergency phrase was heard
pub const EMERGENCY_SCORE: u8 = 9;
/// Score for two or more urgent-tier symptoms
pub const MULTI_URGENT_SCORE: u8 = 7;
/// Score for a single urgent-tier symptom
pub const URGENT_SCORE: u8 = 5;
/// Score for symptoms outside the urgent tier
pub const ROUTINE_SCORE: u8 = 3;
/// Score for a transcript with no symptoms at all
pub const INFO_SCORE: u8 = 1;
/// Upper bound of the urgency dial
pub const MAX_SCORE: u8 = 10;

/// Triage level, ordered by severity (`Info` lowest)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TriageLevel {
    #[default]
    Info,
    Routine,
    Urgent,
    Emergency,
}

impl TriageLevel {
    /// Upper-case label shown on the urgency badge
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Routine => "ROUTINE",
            Self::Urgent => "URGENT",
            Self::Emergency => "EMERGENCY",
        }
    }
}

impl std::fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Routine => write!(f, "routine"),
            Self::Urgent => write!(f, "urgent"),
            Self::Emergency => write!(f, "emergency"),
        }
    }
}

/// Candidate level and score for one classification pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageScore {
    pub level: TriageLevel,
    pub score: u8,
}

impl TriageScore {
    pub fn new(level: TriageLevel, score: u8) -> Self {
        Self {
            level,
            score: score.min(MAX_SCORE),
        }
    }
}

/// Maps symptom lists to a [`TriageScore`]
#[derive(Debug, Clone)]
pub struct SeverityScorer {
    dictionary: Arc<KeywordDictionary>,
}

impl SeverityScorer {
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        Self { dictionary }
    }

    /// Number of symptoms that contain an urgent-tier phrase
    pub fn urgent_count(&self, symptoms: &[String]) -> usize {
        symptoms
            .iter()
            .filter(|s| {
                let lower = s.to_lowercase();
                self.dictionary
                    .urgent()
                    .iter()
                    .any(|kw| lower.contains(kw.as_str()))
            })
            .count()
    }

    /// Score a symptom list. First matching rule wins:
    ///
    /// 1. emergency flag set → emergency / 9
    /// 2. two or more urgent symptoms → urgent / 7
    /// 3. one urgent symptom → urgent / 5
    /// 4. any other symptom → routine / 3
    /// 5. nothing → info / 1
    pub fn score(&self, symptoms: &[String], is_emergency: bool) -> TriageScore {
        if is_emergency {
            return TriageScore::new(TriageLevel::Emergency, EMERGENCY_SCORE);
        }
        match self.urgent_count(symptoms) {
            n if n >= 2 => TriageScore::new(TriageLevel::Urgent, MULTI_URGENT_SCORE),
            1 => TriageScore::new(TriageLevel::Urgent, URGENT_SCORE),
            _ if !symptoms.is_empty() => TriageScore::new(TriageLevel::Routine, ROUTINE_SCORE),
            _ => TriageScore::new(TriageLevel::Info, INFO_SCORE),
        }
    }
}

impl Default for SeverityScorer {
    fn default() -> Self {
        Self::new(Arc::new(KeywordDictionary::builtin()))
    }
}
