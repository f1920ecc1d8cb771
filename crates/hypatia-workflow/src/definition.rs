//! Workflow definitions.
//!
//! A definition arrives as a [`WorkflowDefinitionInput`], typically parsed
//! from JSON:
//!
//! ```json
//! {
//!   "states": ["Draft", "Review", "Published"],
//!   "events": ["Submit", "Approve"],
//!   "transitions": [
//!     { "from": "Draft", "to": "Review", "on": "Submit",
//!       "task": { "assign": "editor", "message": "Review the draft" } }
//!   ],
//!   "initial": "Draft"
//! }
//! ```
//!
//! and is checked into a [`WorkflowDefinition`], which is immutable.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{WorkflowError, WorkflowResult};

/// Work assigned when a transition fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Who the task is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign: Option<String>,
    /// What needs doing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Task {
    /// Creates a task.
    pub fn new(assign: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            assign: Some(assign.into()),
            message: Some(message.into()),
        }
    }
}

/// A transition as declared in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionInput {
    /// Source state.
    pub from: String,
    /// Target state.
    pub to: String,
    /// Triggering event.
    pub on: String,
    /// Task assigned when the transition fires.
    #[serde(default)]
    pub task: Option<Task>,
}

/// Raw, unchecked workflow definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinitionInput {
    /// Declared states.
    pub states: Vec<String>,
    /// Declared events.
    #[serde(default)]
    pub events: Vec<String>,
    /// Transitions, in priority order.
    #[serde(default)]
    pub transitions: Vec<TransitionInput>,
    /// Initial state; the first declared state when absent.
    #[serde(default)]
    pub initial: Option<String>,
}

impl WorkflowDefinitionInput {
    /// Starts an input with the given states.
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Declares events.
    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events.extend(events.into_iter().map(Into::into));
        self
    }

    /// Declares a transition without a task.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        on: impl Into<String>,
    ) -> Self {
        self.transitions.push(TransitionInput {
            from: from.into(),
            to: to.into(),
            on: on.into(),
            task: None,
        });
        self
    }

    /// Declares a transition that assigns `task`.
    pub fn transition_with_task(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        on: impl Into<String>,
        task: Task,
    ) -> Self {
        self.transitions.push(TransitionInput {
            from: from.into(),
            to: to.into(),
            on: on.into(),
            task: Some(task),
        });
        self
    }

    /// Sets the initial state.
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }
}

/// A checked transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Source state.
    pub from: String,
    /// Target state.
    pub to: String,
    /// Triggering event.
    pub on: String,
    /// Task assigned when the transition fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

/// A checked, immutable workflow definition.
///
/// Every transition endpoint is a declared state, every trigger a declared
/// event, and the initial state is declared. Deserializing goes through the
/// same checks as [`TryFrom<WorkflowDefinitionInput>`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkflowDefinitionInput")]
pub struct WorkflowDefinition {
    states: IndexSet<String>,
    events: IndexSet<String>,
    transitions: Vec<Transition>,
    initial: String,
}

impl WorkflowDefinition {
    /// Returns the declared states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }

    /// Returns the declared events in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(String::as_str)
    }

    /// Returns the transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the initial state.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// Returns true if `state` is declared.
    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    /// Returns true if `event` is declared.
    pub fn has_event(&self, event: &str) -> bool {
        self.events.contains(event)
    }

    /// Returns the first transition leaving `state` on `event`.
    pub fn find_transition(&self, state: &str, event: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == state && t.on == event)
    }

    /// Returns the transitions leaving `state`.
    pub fn outgoing<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions.iter().filter(move |t| t.from == state)
    }
}

impl TryFrom<WorkflowDefinitionInput> for WorkflowDefinition {
    type Error = WorkflowError;

    fn try_from(input: WorkflowDefinitionInput) -> WorkflowResult<Self> {
        let mut errors = Vec::new();

        if input.states.is_empty() {
            errors.push("at least one state must be declared".to_string());
        }

        let mut states = IndexSet::with_capacity(input.states.len());
        for state in input.states {
            if state.trim().is_empty() {
                errors.push("state names must not be empty".to_string());
            } else if states.contains(&state) {
                errors.push(format!("state '{state}' is declared more than once"));
            } else {
                states.insert(state);
            }
        }

        let mut events = IndexSet::with_capacity(input.events.len());
        for event in input.events {
            if event.trim().is_empty() {
                errors.push("event names must not be empty".to_string());
            } else if events.contains(&event) {
                errors.push(format!("event '{event}' is declared more than once"));
            } else {
                events.insert(event);
            }
        }

        let mut transitions = Vec::with_capacity(input.transitions.len());
        for (index, t) in input.transitions.into_iter().enumerate() {
            if !states.contains(&t.from) {
                errors.push(format!("transition {index}: unknown source state '{}'", t.from));
            }
            if !states.contains(&t.to) {
                errors.push(format!("transition {index}: unknown target state '{}'", t.to));
            }
            if !events.contains(&t.on) {
                errors.push(format!("transition {index}: unknown event '{}'", t.on));
            }
            transitions.push(Transition {
                from: t.from,
                to: t.to,
                on: t.on,
                task: t.task,
            });
        }

        let initial = match input.initial {
            Some(initial) => {
                if !states.contains(&initial) {
                    errors.push(format!("initial state '{initial}' is not declared"));
                }
                initial
            }
            None => states.first().cloned().unwrap_or_default(),
        };

        if errors.is_empty() {
            Ok(Self {
                states,
                events,
                transitions,
                initial,
            })
        } else {
            Err(WorkflowError::InvalidDefinition { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_flow() -> WorkflowDefinitionInput {
        WorkflowDefinitionInput::new(["Draft", "Review", "Published"])
            .events(["Submit", "Approve", "Reject"])
            .transition_with_task("Draft", "Review", "Submit", Task::new("editor", "Review it"))
            .transition("Review", "Published", "Approve")
            .transition("Review", "Draft", "Reject")
    }

    fn errors_of(input: WorkflowDefinitionInput) -> Vec<String> {
        match WorkflowDefinition::try_from(input) {
            Err(WorkflowError::InvalidDefinition { errors }) => errors,
            other => panic!("expected invalid definition, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_definition() {
        let def = WorkflowDefinition::try_from(document_flow()).unwrap();

        assert_eq!(def.initial(), "Draft");
        assert_eq!(def.states().collect::<Vec<_>>(), ["Draft", "Review", "Published"]);
        assert_eq!(def.transitions().len(), 3);
        assert!(def.has_event("Approve"));
        assert!(!def.has_state("Archived"));
    }

    #[test]
    fn test_explicit_initial() {
        let def = WorkflowDefinition::try_from(document_flow().initial("Review")).unwrap();
        assert_eq!(def.initial(), "Review");
    }

    #[test]
    fn test_find_transition_uses_declaration_order() {
        let input = WorkflowDefinitionInput::new(["A", "B", "C"])
            .events(["go"])
            .transition("A", "B", "go")
            .transition("A", "C", "go");
        let def = WorkflowDefinition::try_from(input).unwrap();

        assert_eq!(def.find_transition("A", "go").unwrap().to, "B");
        assert!(def.find_transition("B", "go").is_none());
        assert_eq!(def.outgoing("A").count(), 2);
    }

    #[test]
    fn test_undeclared_references_rejected() {
        let input = WorkflowDefinitionInput::new(["Draft"])
            .events(["Submit"])
            .transition("Draft", "Review", "Submit")
            .transition("Limbo", "Draft", "Teleport");

        let errors = errors_of(input);
        assert_eq!(
            errors,
            vec![
                "transition 0: unknown target state 'Review'",
                "transition 1: unknown source state 'Limbo'",
                "transition 1: unknown event 'Teleport'",
            ]
        );
    }

    #[test]
    fn test_empty_and_duplicate_declarations_rejected() {
        assert_eq!(
            errors_of(WorkflowDefinitionInput::default()),
            vec!["at least one state must be declared"]
        );

        let errors = errors_of(
            WorkflowDefinitionInput::new(["A", "A", ""]).events(["e", "e"]),
        );
        assert_eq!(
            errors,
            vec![
                "state 'A' is declared more than once",
                "state names must not be empty",
                "event 'e' is declared more than once",
            ]
        );
    }

    #[test]
    fn test_undeclared_initial_rejected() {
        let errors = errors_of(WorkflowDefinitionInput::new(["A"]).initial("Z"));
        assert_eq!(errors, vec!["initial state 'Z' is not declared"]);
    }

    #[test]
    fn test_input_deserializes_without_optional_fields() {
        let input: WorkflowDefinitionInput = serde_json::from_str(
            r#"{"states":["Draft","Review"],"events":["Submit"],
                "transitions":[{"from":"Draft","to":"Review","on":"Submit"}]}"#,
        )
        .unwrap();

        assert!(input.initial.is_none());
        assert!(input.transitions[0].task.is_none());
        assert!(WorkflowDefinition::try_from(input).is_ok());
    }

    #[test]
    fn test_definition_serde_round_trip() {
        let def = WorkflowDefinition::try_from(document_flow()).unwrap();
        let json = serde_json::to_string(&def).unwrap();
        let back: WorkflowDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(def, back);
    }

    #[test]
    fn test_deserializing_definition_validates() {
        let result: Result<WorkflowDefinition, _> = serde_json::from_str(
            r#"{"states":["A"],"events":[],"transitions":[{"from":"A","to":"B","on":"x"}]}"#,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("unknown target state 'B'"), "{message}");
    }
}
