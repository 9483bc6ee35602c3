use anyhow::Result;

use data_alchemist::bot::callback_handler::choice_matches_state;
use data_alchemist::bot::ui_builder::parse_keyboard_choice;
use data_alchemist::dialogue::{
    advance, validate_job_title, CareerDialogueState, CareerProfile, DialogueStep, Rejection,
    ALLOWED_JOB_TITLES,
};

/// Every allow-listed title is accepted in any letter case
#[test]
fn test_allow_list_case_insensitive() {
    for title in ALLOWED_JOB_TITLES {
        assert_eq!(validate_job_title(&title.to_lowercase()), Some(*title));
        assert_eq!(validate_job_title(&title.to_uppercase()), Some(*title));
    }
}

/// Walk the whole conversation with typed answers
#[test]
fn test_typed_conversation_reaches_profile() {
    let mut state = CareerDialogueState::ReceiveJobTitle;
    let mut profile = None;

    for answer in ["Pastry Chef", "machine learning engineer", "", "Lead", "Automotive"] {
        match advance(&state, answer) {
            DialogueStep::Advance(next) => state = next,
            DialogueStep::Complete(done) => profile = Some(done),
            DialogueStep::Reject(_) => {}
            DialogueStep::Idle => panic!("dialogue should be active"),
        }
    }

    assert_eq!(
        profile,
        Some(CareerProfile {
            job_title: "Machine Learning Engineer".to_string(),
            level: "Lead".to_string(),
            industry: "Automotive".to_string(),
        })
    );
}

/// Keyboard choices drive the same transitions as typed answers
#[test]
fn test_keyboard_choices_follow_state() {
    let state = CareerDialogueState::ReceiveJobTitle;
    let title = parse_keyboard_choice("title_2").unwrap();
    assert!(choice_matches_state(title, &state));

    let DialogueStep::Advance(state) = advance(&state, title.text()) else {
        panic!("keyboard title should be accepted");
    };

    // A stale title button no longer applies
    assert!(!choice_matches_state(title, &state));

    let level = parse_keyboard_choice("level_1").unwrap();
    assert!(choice_matches_state(level, &state));
    assert!(matches!(
        advance(&state, level.text()),
        DialogueStep::Advance(CareerDialogueState::ReceiveIndustry { .. })
    ));
}

#[test]
fn test_unknown_title_rejected() {
    assert_eq!(
        advance(&CareerDialogueState::ReceiveJobTitle, "Data Wizard"),
        DialogueStep::Reject(Rejection::UnknownJobTitle)
    );
}

/// Dialogue states survive a serde round trip, as storage backends require
#[tokio::test]
async fn test_dialogue_state_serialization() -> Result<()> {
    let state = CareerDialogueState::ReceiveIndustry {
        job_title: "Data Scientist".to_string(),
        level: "Junior".to_string(),
    };

    let json = serde_json::to_string(&state)?;
    let restored: CareerDialogueState = serde_json::from_str(&json)?;
    assert_eq!(restored, state);

    Ok(())
}

#[test]
fn test_default_state_is_start() {
    assert_eq!(CareerDialogueState::default(), CareerDialogueState::Start);
}
