//! Workflow instances.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::definition::{Task, Transition, WorkflowDefinition};
use crate::error::{WorkflowError, WorkflowResult};

/// One fired transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// State before the transition.
    pub from: String,
    /// State after the transition.
    pub to: String,
    /// The event that fired it.
    pub event: String,
    /// When it fired.
    pub at: DateTime<Utc>,
}

/// A live execution of a [`WorkflowDefinition`].
///
/// An instance is an owned value: each request that enters a workflow
/// creates or loads its own, and nothing is shared between requests. The
/// definition is immutable and shared behind an `Arc`.
///
/// Deserializing checks the current state and history against the embedded
/// definition, so a persisted instance cannot point at an undeclared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InstanceRecord")]
pub struct WorkflowInstance {
    id: Uuid,
    definition: Arc<WorkflowDefinition>,
    current_state: String,
    history: Vec<HistoryEntry>,
    tasks: Vec<Task>,
}

impl WorkflowInstance {
    /// Creates an instance in the definition's initial state.
    pub fn new(definition: Arc<WorkflowDefinition>) -> Self {
        let current_state = definition.initial().to_string();
        Self {
            id: Uuid::now_v7(),
            definition,
            current_state,
            history: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Returns the instance identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the definition this instance runs.
    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Returns the current state.
    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    /// Returns the fired transitions, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Returns the assigned tasks, oldest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the transition `event` would fire from the current state.
    pub fn transition_for(&self, event: &str) -> Option<&Transition> {
        self.definition.find_transition(&self.current_state, event)
    }

    /// Fires `event` if a transition allows it, returning the new history
    /// entry. Leaves the instance untouched otherwise.
    pub(crate) fn fire(&mut self, event: &str) -> Option<&HistoryEntry> {
        let transition = self.transition_for(event)?.clone();

        self.history.push(HistoryEntry {
            from: transition.from,
            to: transition.to.clone(),
            event: transition.on,
            at: Utc::now(),
        });
        if let Some(task) = transition.task {
            self.tasks.push(task);
        }
        self.current_state = transition.to;
        self.history.last()
    }
}

/// Unchecked wire shape of a [`WorkflowInstance`].
#[derive(Deserialize)]
struct InstanceRecord {
    id: Uuid,
    definition: Arc<WorkflowDefinition>,
    current_state: String,
    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl TryFrom<InstanceRecord> for WorkflowInstance {
    type Error = WorkflowError;

    fn try_from(record: InstanceRecord) -> WorkflowResult<Self> {
        let definition = &record.definition;
        let mut errors = Vec::new();

        if !definition.has_state(&record.current_state) {
            errors.push(format!(
                "current state '{}' is not declared",
                record.current_state
            ));
        }
        for (index, entry) in record.history.iter().enumerate() {
            for state in [&entry.from, &entry.to] {
                if !definition.has_state(state) {
                    errors.push(format!("history[{index}]: state '{state}' is not declared"));
                }
            }
            if !definition.has_event(&entry.event) {
                errors.push(format!(
                    "history[{index}]: event '{}' is not declared",
                    entry.event
                ));
            }
        }

        if !errors.is_empty() {
            return Err(WorkflowError::InvalidInstance { errors });
        }
        Ok(Self {
            id: record.id,
            definition: record.definition,
            current_state: record.current_state,
            history: record.history,
            tasks: record.tasks,
        })
    }
}
