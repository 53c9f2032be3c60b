//! Best-effort patient details pulled from transcript text.

use regex::Regex;
use std::sync::LazyLock;

/// Species keywords checked against caller speech, first hit wins.
pub const SPECIES_KEYWORDS: &[(&str, &str)] = &[
    ("dog", "dog"),
    ("puppy", "dog"),
    ("cat", "cat"),
    ("kitten", "cat"),
    ("bird", "bird"),
    ("rabbit", "rabbit"),
    ("bunny", "rabbit"),
    ("hamster", "hamster"),
    ("reptile", "reptile"),
    ("snake", "reptile"),
];

/// Agent phrasing that usually precedes the patient's name
static PET_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:meet|for|about|how is|patient)\s+([A-Z][a-z]+)")
        .expect("PET_NAME_PATTERN regex should compile")
});

/// Heuristic pet name and species extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    /// First capitalized word after a connective in agent speech
    /// ("Nice to meet Bella" → `Bella`). Case-sensitive on purpose.
    pub fn pet_name(&self, agent_text: &str) -> Option<String> {
        PET_NAME_PATTERN
            .captures(agent_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Species from caller speech, matched as lower-case substrings
    pub fn species(&self, user_text: &str) -> Option<String> {
        let lower = user_text.to_lowercase();
        SPECIES_KEYWORDS
            .iter()
            .find(|(key, _)| lower.contains(*key))
            .map(|(_, species)| species.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_name_after_connective() {
        let x = FieldExtractor::new();
        assert_eq!(x.pet_name("Nice to meet Bella!"), Some("Bella".into()));
        assert_eq!(
            x.pet_name("I'm sorry to hear about Max. How long?"),
            Some("Max".into())
        );
        assert_eq!(x.pet_name("How is Luna doing?"), None); // "How" is capitalized
        assert_eq!(x.pet_name("and how is Luna doing?"), Some("Luna".into()));
    }

    #[test]
    fn test_pet_name_requires_capital() {
        let x = FieldExtractor::new();
        assert_eq!(x.pet_name("thanks for calling"), None);
    }

    #[test]
    fn test_species_first_key_wins() {
        let x = FieldExtractor::new();
        assert_eq!(x.species("My Puppy is sick"), Some("dog".into()));
        assert_eq!(x.species("our kitten"), Some("cat".into()));
        assert_eq!(x.species("a snake and a dog"), Some("dog".into()));
        assert_eq!(x.species("my cockatiel"), None);
    }
}
