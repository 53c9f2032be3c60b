//! Triage error types
//!
//! Classification, scoring and accumulation are total and never fail. Errors
//! only arise while building an engine from external configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for triage configuration operations
pub type TriageResult<T> = Result<T, TriageError>;

/// Errors that can occur while loading a keyword dictionary or engine config
#[derive(Error, Debug)]
pub enum TriageError {
    /// Dictionary file could not be read
    #[error("Failed to read keyword dictionary at {path}: {source}")]
    DictionaryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dictionary file is not valid TOML
    #[error("Invalid keyword dictionary TOML: {0}")]
    DictionaryParse(#[from] toml::de::Error),

    /// A phrase was blank after trimming
    #[error("Empty phrase in {tier} tier")]
    EmptyPhrase { tier: String },

    /// The same phrase was listed in both tiers
    #[error("Phrase '{phrase}' appears in both emergency and urgent tiers")]
    OverlappingTiers { phrase: String },

    /// Unrecognized match mode name
    #[error("Unknown match mode '{value}' (expected 'substring' or 'word_boundary')")]
    UnknownMatchMode { value: String },
}

impl TriageError {
    /// Create a dictionary IO error
    pub fn dictionary_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DictionaryIo {
            path: path.into(),
            source,
        }
    }

    /// Create an empty phrase error
    pub fn empty_phrase(tier: impl Into<String>) -> Self {
        Self::EmptyPhrase { tier: tier.into() }
    }
}
