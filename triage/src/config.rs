//! Engine configuration
//!
//! Environment variables:
//! - `TRIAGE_MATCH_MODE`: `substring` (default) or `word_boundary`
//! - `TRIAGE_DICTIONARY_PATH`: optional TOML dictionary replacing the built-in lists

use crate::classifier::MatchMode;
use crate::error::TriageResult;
use crate::keywords::KeywordDictionary;
use crate::session::TriageEngine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// How to build a [`TriageEngine`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,
}

impl TriageConfig {
    /// Read configuration from the environment.
    ///
    /// An unparseable match mode is an error rather than a silent fallback.
    pub fn from_env() -> TriageResult<Self> {
        let match_mode = match std::env::var("TRIAGE_MATCH_MODE") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => MatchMode::default(),
        };
        let dictionary_path = std::env::var("TRIAGE_DICTIONARY_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            match_mode,
            dictionary_path,
        })
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_dictionary(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary_path = Some(path.into());
        self
    }

    /// Load the dictionary (file or built-in)
    pub fn dictionary(&self) -> TriageResult<KeywordDictionary> {
        match &self.dictionary_path {
            Some(path) => KeywordDictionary::load(path),
            None => Ok(KeywordDictionary::builtin()),
        }
    }

    pub fn build_engine(&self) -> TriageResult<TriageEngine> {
        let dictionary = Arc::new(self.dictionary()?);
        tracing::info!(
            mode = %self.match_mode,
            phrases = dictionary.len(),
            custom = self.dictionary_path.is_some(),
            "Triage engine ready"
        );
        Ok(TriageEngine::new(dictionary, self.match_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;
    use crate::scorer::TriageLevel;
    use std::io::Write;

    #[test]
    fn test_default_uses_builtin() {
        let config = TriageConfig::default();
        assert_eq!(config.match_mode, MatchMode::Substring);
        assert_eq!(config.dictionary().unwrap(), KeywordDictionary::builtin());
    }

    #[test]
    fn test_build_engine_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "emergency = [\"heatstroke\"]\nurgent = [\"sneezing\"]").unwrap();

        let engine = TriageConfig::default()
            .with_dictionary(file.path())
            .build_engine()
            .unwrap();
        let a = engine.assess("Heatstroke on the walk");
        assert_eq!(a.score.level, TriageLevel::Emergency);
        assert!(engine.assess("bleeding badly").detection.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TriageConfig::default()
            .with_dictionary(dir.path().join("absent.toml"))
            .build_engine()
            .unwrap_err();
        assert!(matches!(err, TriageError::DictionaryIo { .. }));
    }

    #[test]
    fn test_word_boundary_engine() {
        let engine = TriageConfig::default()
            .with_match_mode(MatchMode::WordBoundary)
            .build_engine()
            .unwrap();
        assert_eq!(engine.classifier().mode(), MatchMode::WordBoundary);
        assert!(engine.assess("painting").detection.is_empty());
    }
}
