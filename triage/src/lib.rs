//! Live call triage for the VetAssist front desk.
//!
//! This library provides:
//! - A two-tier symptom keyword dictionary (emergency / urgent)
//! - A stateless text classifier over that dictionary
//! - A severity scorer mapping detections to a level and a 0-10 score
//! - A session accumulator that only ever escalates while a call is live
//!
//! # Usage
//!
//! ```
//! use triage::{TranscriptEntry, TriageEngine, TriageLevel, TriageSession};
//!
//! let engine = TriageEngine::default();
//! let mut session = TriageSession::new(None);
//! session.push(&engine, TranscriptEntry::user("My dog is having a seizure"));
//! assert_eq!(session.state().triage_level, TriageLevel::Emergency);
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod scorer;
pub mod session;

pub use classifier::{Detection, MatchMode, TextClassifier};
pub use config::TriageConfig;
pub use error::{TriageError, TriageResult};
pub use extract::FieldExtractor;
pub use keywords::{KeywordDictionary, KeywordTier};
pub use scorer::{SeverityScorer, TriageLevel, TriageScore};
pub use session::{
    joined_text, Assessment, Role, SessionSnapshot, SessionTriageState, TranscriptEntry,
    TriageEngine, TriageSession,
};
