//! Loading behaviour across arbitrary definitions.

use hypatia_workflow::{WorkflowDefinitionInput, WorkflowEngine, WorkflowError};
use proptest::prelude::*;

const STATES: [&str; 3] = ["Draft", "Review", "Done"];
const EVENTS: [&str; 2] = ["Submit", "Finish"];

fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Draft".to_string()),
        Just("Review".to_string()),
        Just("Done".to_string()),
        Just("Submit".to_string()),
        Just("Finish".to_string()),
        "[A-Z][a-z]{2,6}",
    ]
}

proptest! {
    #[test]
    fn prop_undeclared_reference_fails_load(
        transitions in proptest::collection::vec((name(), name(), name()), 1..6),
    ) {
        let references_unknown = transitions.iter().any(|(from, to, on)| {
            !STATES.contains(&from.as_str())
                || !STATES.contains(&to.as_str())
                || !EVENTS.contains(&on.as_str())
        });

        let mut input = WorkflowDefinitionInput::new(STATES).events(EVENTS);
        for (from, to, on) in transitions {
            input = input.transition(from, to, on);
        }

        let mut engine = WorkflowEngine::new();
        let loaded = engine.load(input).is_ok();

        prop_assert_eq!(loaded, !references_unknown);
        if references_unknown {
            prop_assert!(matches!(engine.create_instance(), Err(WorkflowError::NotLoaded)));
        } else {
            prop_assert!(engine.create_instance().is_ok());
        }
    }
}

#[test]
fn test_every_problem_is_reported() {
    let mut engine = WorkflowEngine::new();
    let err = engine
        .load_json(
            r#"{
                "states": ["Draft", "Draft"],
                "events": ["Submit"],
                "transitions": [
                    {"from": "Draft", "to": "Review", "on": "Submit"},
                    {"from": "Draft", "to": "Draft", "on": "Poke"}
                ],
                "initial": "Nowhere"
            }"#,
        )
        .unwrap_err();

    let WorkflowError::InvalidDefinition { errors } = err else {
        panic!("expected InvalidDefinition");
    };
    assert_eq!(errors.len(), 4, "{errors:?}");
}

#[test]
fn test_missing_states_field_is_a_parse_error() {
    let mut engine = WorkflowEngine::new();
    let err = engine.load_json(r#"{"events": []}"#).unwrap_err();
    assert!(matches!(err, WorkflowError::Parse(_)));
}
