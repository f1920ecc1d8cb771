//! The workflow engine.
//!
//! The engine holds one checked [`WorkflowDefinition`]. It is configured at
//! startup with [`load`](WorkflowEngine::load) and then only read: every
//! operation that touches a request takes a [`WorkflowInstance`] the request
//! owns.

use std::sync::Arc;

use crate::definition::{Task, WorkflowDefinition, WorkflowDefinitionInput};
use crate::error::{WorkflowError, WorkflowResult};
use crate::instance::{HistoryEntry, WorkflowInstance};

/// Drives workflow instances through a loaded definition.
///
/// # Example
///
/// ```
/// use hypatia_workflow::{WorkflowDefinitionInput, WorkflowEngine};
///
/// let mut engine = WorkflowEngine::new();
/// engine
///     .load(
///         WorkflowDefinitionInput::new(["Draft", "Review"])
///             .events(["Submit"])
///             .transition("Draft", "Review", "Submit"),
///     )
///     .unwrap();
///
/// let instance = engine.create_instance().unwrap();
/// assert!(engine.can_transition(&instance, "Submit"));
///
/// let instance = engine.apply_transition(instance, "Submit");
/// assert_eq!(instance.current_state(), "Review");
/// assert_eq!(instance.history().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    definition: Option<Arc<WorkflowDefinition>>,
}

impl WorkflowEngine {
    /// Creates an engine with no definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine from an already checked definition.
    #[must_use]
    pub fn with_definition(definition: WorkflowDefinition) -> Self {
        Self {
            definition: Some(Arc::new(definition)),
        }
    }

    /// Checks and stores a definition, replacing any previous one.
    ///
    /// On failure the engine keeps its previous definition, if any.
    pub fn load(&mut self, input: WorkflowDefinitionInput) -> WorkflowResult<&WorkflowDefinition> {
        let definition = match WorkflowDefinition::try_from(input) {
            Ok(definition) => definition,
            Err(error) => {
                tracing::error!(error = %error, "Rejected workflow definition");
                return Err(error);
            }
        };

        tracing::info!(
            states = definition.states().count(),
            events = definition.events().count(),
            transitions = definition.transitions().len(),
            initial = definition.initial(),
            "Loaded workflow definition"
        );

        let stored = self.definition.insert(Arc::new(definition));
        Ok(&**stored)
    }

    /// Parses a JSON definition and loads it.
    pub fn load_json(&mut self, json: &str) -> WorkflowResult<&WorkflowDefinition> {
        let input: WorkflowDefinitionInput = serde_json::from_str(json)?;
        self.load(input)
    }

    /// Returns the loaded definition.
    #[must_use]
    pub fn definition(&self) -> Option<&WorkflowDefinition> {
        self.definition.as_deref()
    }

    /// Returns true once a definition is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.definition.is_some()
    }

    /// Creates a fresh instance in the initial state.
    pub fn create_instance(&self) -> WorkflowResult<WorkflowInstance> {
        let definition = self.definition.clone().ok_or(WorkflowError::NotLoaded)?;
        let instance = WorkflowInstance::new(definition);
        tracing::debug!(
            workflow.instance_id = %instance.id(),
            workflow.state = instance.current_state(),
            "Created workflow instance"
        );
        Ok(instance)
    }

    /// Returns true if some transition leaves the current state on `event`.
    #[must_use]
    pub fn can_transition(&self, instance: &WorkflowInstance, event: &str) -> bool {
        instance.transition_for(event).is_some()
    }

    /// Fires the first transition matching the current state and `event`.
    ///
    /// When nothing matches the instance is returned unchanged. Callers that
    /// need to know should check [`can_transition`](Self::can_transition)
    /// first or use [`try_apply_transition`](Self::try_apply_transition).
    #[must_use]
    pub fn apply_transition(&self, mut instance: WorkflowInstance, event: &str) -> WorkflowInstance {
        if self.fire(&mut instance, event).is_none() {
            tracing::debug!(
                workflow.instance_id = %instance.id(),
                workflow.state = instance.current_state(),
                workflow.event = event,
                "No transition for event, instance unchanged"
            );
        }
        instance
    }

    /// Fires the first matching transition or fails.
    ///
    /// The instance is left untouched on failure.
    pub fn try_apply_transition(
        &self,
        instance: &mut WorkflowInstance,
        event: &str,
    ) -> WorkflowResult<HistoryEntry> {
        if let Some(entry) = self.fire(instance, event) {
            return Ok(entry);
        }

        tracing::warn!(
            workflow.instance_id = %instance.id(),
            workflow.state = instance.current_state(),
            workflow.event = event,
            "Transition not allowed"
        );
        Err(WorkflowError::TransitionNotAllowed {
            state: instance.current_state().to_string(),
            event: event.to_string(),
        })
    }

    /// Returns a copy of the tasks assigned so far.
    #[must_use]
    pub fn pending_tasks(&self, instance: &WorkflowInstance) -> Vec<Task> {
        instance.tasks().to_vec()
    }

    /// Returns the events that would fire a transition from the current
    /// state, in event declaration order.
    #[must_use]
    pub fn available_events<'a>(&self, instance: &'a WorkflowInstance) -> Vec<&'a str> {
        let definition = instance.definition();
        definition
            .events()
            .filter(|event| {
                definition
                    .outgoing(instance.current_state())
                    .any(|t| t.on == *event)
            })
            .collect()
    }

    /// Returns true if no transition leaves the current state.
    #[must_use]
    pub fn is_terminal(&self, instance: &WorkflowInstance) -> bool {
        instance
            .definition()
            .outgoing(instance.current_state())
            .next()
            .is_none()
    }

    fn fire(&self, instance: &mut WorkflowInstance, event: &str) -> Option<HistoryEntry> {
        let entry = instance.fire(event)?.clone();
        tracing::debug!(
            workflow.instance_id = %instance.id(),
            workflow.event = event,
            workflow.from = %entry.from,
            workflow.to = %entry.to,
            "Applied workflow transition"
        );
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REVIEW_FLOW: &str = r#"{
        "states": ["Draft", "Review", "Published", "Archived"],
        "events": ["Submit", "Approve", "Reject", "Archive"],
        "transitions": [
            {"from": "Draft", "to": "Review", "on": "Submit",
             "task": {"assign": "editor", "message": "Review the draft"}},
            {"from": "Review", "to": "Published", "on": "Approve",
             "task": {"assign": "author", "message": "Announce it"}},
            {"from": "Review", "to": "Draft", "on": "Reject"},
            {"from": "Published", "to": "Archived", "on": "Archive"}
        ],
        "initial": "Draft"
    }"#;

    fn engine() -> WorkflowEngine {
        let mut engine = WorkflowEngine::new();
        engine.load_json(REVIEW_FLOW).unwrap();
        engine
    }

    #[test]
    fn test_draft_to_review() {
        let mut engine = WorkflowEngine::new();
        engine
            .load(
                WorkflowDefinitionInput::new(["Draft", "Review"])
                    .events(["Submit"])
                    .transition("Draft", "Review", "Submit"),
            )
            .unwrap();

        let instance = engine.create_instance().unwrap();
        assert_eq!(instance.current_state(), "Draft");
        assert!(engine.can_transition(&instance, "Submit"));

        let instance = engine.apply_transition(instance, "Submit");
        assert_eq!(instance.current_state(), "Review");
        assert_eq!(instance.history().len(), 1);
    }

    #[test]
    fn test_create_instance_requires_definition() {
        let engine = WorkflowEngine::new();
        assert!(!engine.is_loaded());
        assert!(matches!(engine.create_instance(), Err(WorkflowError::NotLoaded)));
    }

    #[test]
    fn test_invalid_load_keeps_previous_definition() {
        let mut engine = engine();
        let err = engine
            .load(WorkflowDefinitionInput::new(["X"]).initial("Y"))
            .unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidDefinition { .. }));
        assert_eq!(engine.definition().unwrap().initial(), "Draft");
    }

    #[test]
    fn test_load_json_parse_error() {
        let mut engine = WorkflowEngine::new();
        let err = engine.load_json("{not json").unwrap_err();
        assert!(matches!(err, WorkflowError::Parse(_)));
        assert!(engine.create_instance().is_err());
    }

    #[test]
    fn test_full_walk_accumulates_tasks() {
        let engine = engine();
        let mut instance = engine.create_instance().unwrap();

        for event in ["Submit", "Reject", "Submit", "Approve"] {
            instance = engine.apply_transition(instance, event);
        }

        assert_eq!(instance.current_state(), "Published");
        assert_eq!(instance.history().len(), 4);
        let tasks = engine.pending_tasks(&instance);
        assert_eq!(
            tasks,
            vec![
                Task::new("editor", "Review the draft"),
                Task::new("editor", "Review the draft"),
                Task::new("author", "Announce it"),
            ]
        );
        let events: Vec<_> = instance.history().iter().map(|h| h.event.as_str()).collect();
        assert_eq!(events, ["Submit", "Reject", "Submit", "Approve"]);
    }

    #[test]
    fn test_pending_tasks_is_a_copy() {
        let engine = engine();
        let instance = engine.apply_transition(engine.create_instance().unwrap(), "Submit");

        let mut first = engine.pending_tasks(&instance);
        first.clear();
        assert_eq!(engine.pending_tasks(&instance).len(), 1);
        assert_eq!(engine.pending_tasks(&instance), engine.pending_tasks(&instance));
    }

    #[test]
    fn test_try_apply_transition() {
        let engine = engine();
        let mut instance = engine.create_instance().unwrap();

        let err = engine.try_apply_transition(&mut instance, "Approve").unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::TransitionNotAllowed { ref state, ref event }
                if state == "Draft" && event == "Approve"
        ));
        assert_eq!(instance.current_state(), "Draft");

        let entry = engine.try_apply_transition(&mut instance, "Submit").unwrap();
        assert_eq!((entry.from.as_str(), entry.to.as_str()), ("Draft", "Review"));
    }

    #[test]
    fn test_available_events_and_terminal() {
        let engine = engine();
        let mut instance = engine.create_instance().unwrap();
        assert_eq!(engine.available_events(&instance), ["Submit"]);

        instance = engine.apply_transition(instance, "Submit");
        assert_eq!(engine.available_events(&instance), ["Approve", "Reject"]);
        assert!(!engine.is_terminal(&instance));

        instance = engine.apply_transition(instance, "Approve");
        instance = engine.apply_transition(instance, "Archive");
        assert!(engine.is_terminal(&instance));
        assert!(engine.available_events(&instance).is_empty());
    }

    #[test]
    fn test_instances_are_independent() {
        let engine = engine();
        let first = engine.create_instance().unwrap();
        let second = engine.create_instance().unwrap();

        let first = engine.apply_transition(first, "Submit");
        assert_eq!(first.current_state(), "Review");
        assert_eq!(second.current_state(), "Draft");
        assert_ne!(first.id(), second.id());
    }

    proptest! {
        #[test]
        fn prop_apply_without_match_is_noop(
            events in proptest::collection::vec(
                prop_oneof![
                    Just("Submit"), Just("Approve"), Just("Reject"),
                    Just("Archive"), Just("Unknown"),
                ],
                0..12,
            ),
            last_event in prop_oneof![
                Just("Submit"), Just("Approve"), Just("Reject"),
                Just("Archive"), Just("Unknown"),
            ],
        ) {
            let engine = engine();
            let mut instance = engine.create_instance().unwrap();
            for event in events {
                instance = engine.apply_transition(instance, event);
            }

            if !engine.can_transition(&instance, last_event) {
                let before = instance.clone();
                let after = engine.apply_transition(instance, last_event);
                prop_assert_eq!(after.current_state(), before.current_state());
                prop_assert_eq!(after.history().len(), before.history().len());
                prop_assert_eq!(after, before);
            }
        }

        #[test]
        fn prop_history_matches_fired_transitions(
            events in proptest::collection::vec(
                prop_oneof![Just("Submit"), Just("Approve"), Just("Reject"), Just("Archive")],
                0..12,
            ),
        ) {
            let engine = engine();
            let mut instance = engine.create_instance().unwrap();
            let mut fired = 0;
            for event in events {
                if engine.can_transition(&instance, event) {
                    fired += 1;
                }
                instance = engine.apply_transition(instance, event);
            }
            prop_assert_eq!(instance.history().len(), fired);
            if let Some(last) = instance.history().last() {
                prop_assert_eq!(last.to.as_str(), instance.current_state());
            }
        }
    }
}
