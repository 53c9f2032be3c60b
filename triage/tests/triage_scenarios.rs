//! End-to-end triage behaviour over the built-in dictionary.

use triage::{
    KeywordDictionary, SessionTriageState, TranscriptEntry, TriageEngine, TriageLevel,
    TriageSession,
};

fn engine() -> TriageEngine {
    TriageEngine::default()
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[test]
fn test_every_emergency_phrase_flags_emergency() {
    let engine = engine();
    for phrase in KeywordDictionary::builtin().emergency() {
        let text = format!("Caller says: {} !!", phrase.to_uppercase());
        let d = engine.classifier().classify(&text);
        assert!(d.is_emergency, "{phrase} should flag emergency");
        assert!(d.detected_symptoms.contains(phrase), "{phrase} missing");
    }
}

#[test]
fn test_every_urgent_phrase_flags_urgent() {
    let engine = engine();
    for phrase in KeywordDictionary::builtin().urgent() {
        let d = engine.classifier().classify(&format!("well, {phrase} mostly"));
        assert!(d.is_urgent, "{phrase} should flag urgent");
        assert!(d.detected_symptoms.contains(phrase));
    }
}

#[test]
fn test_no_phrases_means_empty_detection() {
    let d = engine()
        .classifier()
        .classify("Hi, I'd like to book a wellness exam next Tuesday.");
    assert!(!d.is_emergency);
    assert!(!d.is_urgent);
    assert!(d.detected_symptoms.is_empty());
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_seizure_is_emergency() {
    let a = engine().assess("My dog is having a seizure right now");
    assert!(a.detection.detected_symptoms.contains(&"seizure".to_string()));
    assert!(a.detection.is_emergency);
    assert_eq!(a.score.score, 9);
    assert_eq!(a.score.level, TriageLevel::Emergency);
}

#[test]
fn test_two_urgent_symptoms_score_seven() {
    let a = engine().assess("She's been vomiting and seems lethargic");
    assert_eq!(a.detection.detected_symptoms, vec!["vomiting", "lethargic"]);
    assert_eq!(a.score.score, 7);
    assert_eq!(a.score.level, TriageLevel::Urgent);
}

#[test]
fn test_no_symptoms_scores_one_info() {
    let a = engine().assess("Just calling about nutrition advice for my cockatiel");
    assert!(a.detection.detected_symptoms.is_empty());
    assert_eq!(a.score.score, 1);
    assert_eq!(a.score.level, TriageLevel::Info);
}

#[test]
fn test_sequential_ingest_escalates_without_reverting() {
    let engine = engine();
    let fragments = ["no symptoms mentioned", "he is vomiting a lot"];

    let mut state = SessionTriageState::idle();
    let mut cumulative = String::new();
    for fragment in fragments {
        if !cumulative.is_empty() {
            cumulative.push(' ');
        }
        cumulative.push_str(fragment);
        state = engine.ingest(&state, &cumulative);
        if cumulative == fragments[0] {
            assert_eq!(state.urgency_score, 1);
            assert_eq!(state.triage_level, TriageLevel::Info);
        }
    }

    assert_eq!(state.urgency_score, 5);
    assert_eq!(state.triage_level, TriageLevel::Urgent);
    assert_eq!(state.symptoms, vec!["vomiting"]);
}

// ---------------------------------------------------------------------------
// Accumulator properties
// ---------------------------------------------------------------------------

#[test]
fn test_ingest_is_idempotent() {
    let engine = engine();
    let text = "Bella collapsed and is vomiting";
    let once = engine.ingest(&SessionTriageState::idle(), text);
    let twice = engine.ingest(&once, text);
    assert_eq!(once, twice);
}

#[test]
fn test_score_monotonic_and_emergency_sticky() {
    let engine = engine();
    let mut session = TriageSession::new(None);
    let mut last_score = session.state().urgency_score;
    let mut seen_emergency = false;

    // Replacing the transcript with shorter, calmer text must not de-escalate.
    let updates = vec![
        vec![TranscriptEntry::user("hello")],
        vec![TranscriptEntry::user("he's limping")],
        vec![TranscriptEntry::user("he's limping and now bleeding")],
        vec![TranscriptEntry::user("actually he seems fine")],
        vec![TranscriptEntry::user("just coughing a little")],
    ];

    for entries in updates {
        let state = session.replace_transcript(&engine, entries);
        assert!(state.urgency_score >= last_score);
        if seen_emergency {
            assert!(state.is_emergency);
        }
        seen_emergency |= state.is_emergency;
        last_score = state.urgency_score;
    }

    let state = session.state();
    assert!(state.is_emergency);
    assert_eq!(state.urgency_score, 9);
    assert_eq!(state.triage_level, TriageLevel::Emergency);
    assert_eq!(state.symptoms, vec!["limping", "bleeding", "coughing"]);
}

#[test]
fn test_transcript_extracts_patient_details() {
    let engine = engine();
    let entries = vec![
        TranscriptEntry::agent("Thanks for calling Paw & Care. Who am I speaking with?"),
        TranscriptEntry::user("Hi, this is Sarah, my kitten has diarrhea"),
        TranscriptEntry::agent("I'm sorry to hear about Mochi. How long has this been going on?"),
        TranscriptEntry::user("Since yesterday, and she won't eat"),
    ];
    let state = engine.ingest_transcript(&SessionTriageState::idle(), &entries);

    assert_eq!(state.pet_name.as_deref(), Some("Mochi"));
    assert_eq!(state.species.as_deref(), Some("cat"));
    assert_eq!(state.symptoms, vec!["diarrhea", "won't eat"]);
    assert_eq!(state.urgency_score, 7);
    assert!(!state.is_emergency);
}
