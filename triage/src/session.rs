//! Session accumulator: running triage state for one live call.
//!
//! Every update re-scans the whole cumulative transcript and merges the
//! result into the previous state. The merge only ever escalates:
//!
//! - symptoms are a set union (first-seen order kept for display)
//! - the urgency score is the running maximum
//! - the level is replaced only when the new score is strictly higher
//! - the emergency flag is sticky
//!
//! Re-scanning keeps the classifier stateless and makes replays of the same
//! transcript idempotent.

use crate::classifier::{Detection, MatchMode, TextClassifier};
use crate::extract::FieldExtractor;
use crate::keywords::KeywordDictionary;
use crate::scorer::{SeverityScorer, TriageLevel, TriageScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Who spoke a transcript fragment. Any role other than `agent` is the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    #[serde(other)]
    User,
}

/// One utterance from the call transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    /// Retell sends this as `content`
    #[serde(alias = "content")]
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }
}

/// Join the text of every entry (optionally filtered by role) with spaces
pub fn joined_text(entries: &[TranscriptEntry], role: Option<Role>) -> String {
    entries
        .iter()
        .filter(|e| role.map_or(true, |r| e.role == r))
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Triage state owned by one call session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTriageState {
    /// Union of every symptom detected so far, in first-seen order
    pub symptoms: Vec<String>,
    /// 0..=10, never decreases
    pub urgency_score: u8,
    pub triage_level: TriageLevel,
    /// Sticky once set
    pub is_emergency: bool,
    pub pet_name: Option<String>,
    pub species: Option<String>,
}

impl SessionTriageState {
    /// Idle baseline: no symptoms, score 0, info level
    pub fn idle() -> Self {
        Self::default()
    }

    /// Merge one classification pass into this state
    pub fn merge(&self, detection: &Detection, candidate: TriageScore) -> Self {
        let mut symptoms = self.symptoms.clone();
        for symptom in &detection.detected_symptoms {
            if !symptoms.contains(symptom) {
                symptoms.push(symptom.clone());
            }
        }

        let triage_level = if candidate.score > self.urgency_score {
            candidate.level
        } else {
            self.triage_level
        };

        Self {
            symptoms,
            urgency_score: self.urgency_score.max(candidate.score),
            triage_level,
            is_emergency: self.is_emergency || detection.is_emergency,
            pet_name: self.pet_name.clone(),
            species: self.species.clone(),
        }
    }

    /// Apply extracted details; empty or missing values keep the prior ones
    pub fn with_details(mut self, pet_name: Option<String>, species: Option<String>) -> Self {
        if let Some(name) = pet_name.filter(|n| !n.trim().is_empty()) {
            self.pet_name = Some(name);
        }
        if let Some(species) = species.filter(|s| !s.trim().is_empty()) {
            self.species = Some(species);
        }
        self
    }
}

/// Classification plus score for a single text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub detection: Detection,
    #[serde(flatten)]
    pub score: TriageScore,
}

/// Classifier, scorer and extractor wired to one dictionary
#[derive(Debug, Clone)]
pub struct TriageEngine {
    classifier: TextClassifier,
    scorer: SeverityScorer,
    extractor: FieldExtractor,
}

impl TriageEngine {
    pub fn new(dictionary: Arc<KeywordDictionary>, mode: MatchMode) -> Self {
        Self {
            classifier: TextClassifier::with_mode(Arc::clone(&dictionary), mode),
            scorer: SeverityScorer::new(dictionary),
            extractor: FieldExtractor::new(),
        }
    }

    pub fn classifier(&self) -> &TextClassifier {
        &self.classifier
    }

    pub fn scorer(&self) -> &SeverityScorer {
        &self.scorer
    }

    /// Classify and score a text without any session state
    pub fn assess(&self, text: &str) -> Assessment {
        let detection = self.classifier.classify(text);
        let score = self
            .scorer
            .score(&detection.detected_symptoms, detection.is_emergency);
        Assessment { detection, score }
    }

    /// Merge the assessment of `cumulative_text` into `previous`
    pub fn ingest(&self, previous: &SessionTriageState, cumulative_text: &str) -> SessionTriageState {
        let Assessment { detection, score } = self.assess(cumulative_text);
        debug!(
            symptoms = detection.detected_symptoms.len(),
            candidate = score.score,
            level = %score.level,
            "Triage pass"
        );
        previous.merge(&detection, score)
    }

    /// Ingest a role-tagged transcript, including pet name and species
    /// extraction from agent and caller speech respectively.
    pub fn ingest_transcript(
        &self,
        previous: &SessionTriageState,
        entries: &[TranscriptEntry],
    ) -> SessionTriageState {
        let merged = self.ingest(previous, &joined_text(entries, None));
        let pet_name = self
            .extractor
            .pet_name(&joined_text(entries, Some(Role::Agent)));
        let species = self.extractor.species(&joined_text(entries, Some(Role::User)));
        merged.with_details(pet_name, species)
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new(Arc::new(KeywordDictionary::builtin()), MatchMode::default())
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub call_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub entries: Vec<TranscriptEntry>,
    pub state: SessionTriageState,
}

/// One live call: its transcript so far and its accumulated triage state
#[derive(Debug, Clone)]
pub struct TriageSession {
    id: String,
    call_id: Option<String>,
    started_at: DateTime<Utc>,
    entries: Vec<TranscriptEntry>,
    state: SessionTriageState,
}

impl TriageSession {
    pub fn new(call_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            call_id,
            started_at: Utc::now(),
            entries: Vec::new(),
            state: SessionTriageState::idle(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Short id for logs (first 8 chars)
    pub fn short_id(&self) -> &str {
        &self.id[..8.min(self.id.len())]
    }

    pub fn call_id(&self) -> Option<&str> {
        self.call_id.as_deref()
    }

    pub fn bind_call(&mut self, call_id: impl Into<String>) {
        self.call_id = Some(call_id.into());
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn state(&self) -> &SessionTriageState {
        &self.state
    }

    /// The transport re-sends the whole transcript on every update
    pub fn replace_transcript(
        &mut self,
        engine: &TriageEngine,
        entries: Vec<TranscriptEntry>,
    ) -> &SessionTriageState {
        self.entries = entries;
        self.reingest(engine)
    }

    /// Append one fragment
    pub fn push(&mut self, engine: &TriageEngine, entry: TranscriptEntry) -> &SessionTriageState {
        self.entries.push(entry);
        self.reingest(engine)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            call_id: self.call_id.clone(),
            started_at: self.started_at,
            entries: self.entries.clone(),
            state: self.state.clone(),
        }
    }

    fn reingest(&mut self, engine: &TriageEngine) -> &SessionTriageState {
        let next = engine.ingest_transcript(&self.state, &self.entries);
        if next.triage_level != self.state.triage_level {
            info!(
                session = %self.short_id(),
                from = %self.state.triage_level,
                to = %next.triage_level,
                score = next.urgency_score,
                "Triage escalated"
            );
        }
        self.state = next;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_baseline() {
        let s = SessionTriageState::idle();
        assert_eq!(s.urgency_score, 0);
        assert_eq!(s.triage_level, TriageLevel::Info);
        assert!(s.symptoms.is_empty());
        assert!(!s.is_emergency);
    }

    #[test]
    fn test_merge_tie_keeps_previous_level() {
        let prev = SessionTriageState {
            urgency_score: 5,
            triage_level: TriageLevel::Routine,
            ..Default::default()
        };
        let next = prev.merge(
            &Detection::default(),
            TriageScore::new(TriageLevel::Urgent, 5),
        );
        assert_eq!(next.triage_level, TriageLevel::Routine);
        assert_eq!(next.urgency_score, 5);
    }

    #[test]
    fn test_merge_never_lowers() {
        let prev = SessionTriageState {
            urgency_score: 9,
            triage_level: TriageLevel::Emergency,
            is_emergency: true,
            symptoms: vec!["bleeding".into()],
            ..Default::default()
        };
        let next = prev.merge(&Detection::default(), TriageScore::new(TriageLevel::Info, 1));
        assert_eq!(next, prev);
    }

    #[test]
    fn test_merge_symptom_union_keeps_order() {
        let prev = SessionTriageState {
            symptoms: vec!["pain".into()],
            ..Default::default()
        };
        let detection = Detection {
            is_emergency: false,
            is_urgent: true,
            detected_symptoms: vec!["coughing".into(), "pain".into()],
        };
        let next = prev.merge(&detection, TriageScore::new(TriageLevel::Urgent, 7));
        assert_eq!(next.symptoms, vec!["pain", "coughing"]);
    }

    #[test]
    fn test_details_last_non_empty_wins() {
        let s = SessionTriageState::idle().with_details(Some("Bella".into()), Some("dog".into()));
        let s = s.with_details(None, Some(String::new()));
        assert_eq!(s.pet_name.as_deref(), Some("Bella"));
        assert_eq!(s.species.as_deref(), Some("dog"));
        let s = s.with_details(Some("Max".into()), None);
        assert_eq!(s.pet_name.as_deref(), Some("Max"));
    }

    #[test]
    fn test_transcript_entry_accepts_content_alias() {
        let e: TranscriptEntry =
            serde_json::from_str(r#"{"role":"agent","content":"Hello"}"#).unwrap();
        assert_eq!(e, TranscriptEntry::agent("Hello"));
    }

    #[test]
    fn test_unknown_role_is_caller() {
        let e: TranscriptEntry =
            serde_json::from_str(r#"{"role":"transfer_target","content":"it's bleeding"}"#)
                .unwrap();
        assert_eq!(e.role, Role::User);
        let e: TranscriptEntry = serde_json::from_str(r#"{"role":"user","text":"hi"}"#).unwrap();
        assert_eq!(e, TranscriptEntry::user("hi"));
    }

    #[test]
    fn test_session_push_accumulates() {
        let engine = TriageEngine::default();
        let mut session = TriageSession::new(Some("call_1".into()));
        session.push(&engine, TranscriptEntry::agent("Nice to meet Bella"));
        session.push(&engine, TranscriptEntry::user("my dog is limping"));

        let state = session.state();
        assert_eq!(state.pet_name.as_deref(), Some("Bella"));
        assert_eq!(state.species.as_deref(), Some("dog"));
        assert_eq!(state.urgency_score, 5);
        assert_eq!(session.entries().len(), 2);
        assert_eq!(session.call_id(), Some("call_1"));

        session.push(&engine, TranscriptEntry::agent("Let's get Bella seen today"));
        assert_eq!(session.state().urgency_score, 5);
        assert_eq!(session.state().triage_level, TriageLevel::Urgent);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let session = TriageSession::new(None);
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert!(json.get("startedAt").is_some());
        assert_eq!(json["state"]["urgencyScore"], 0);
        assert_eq!(json["state"]["triageLevel"], "info");
    }
}
