//! # Hypatia Workflow
//!
//! A small finite-state workflow engine.
//!
//! A [`WorkflowDefinition`] declares states, events and transitions, and is
//! checked for referential integrity when loaded. A [`WorkflowInstance`] is
//! one run of a definition, owned by whoever created it. The
//! [`WorkflowEngine`] loads the definition once and then moves instances
//! along:
//!
//! - [`can_transition`](WorkflowEngine::can_transition) asks whether an
//!   event would fire from the current state
//! - [`apply_transition`](WorkflowEngine::apply_transition) fires the first
//!   matching transition, or returns the instance unchanged
//! - [`try_apply_transition`](WorkflowEngine::try_apply_transition) is the
//!   strict form, failing with [`WorkflowError::TransitionNotAllowed`]
//!
//! Each fired transition appends a [`HistoryEntry`] and, if the transition
//! carries one, a [`Task`].

mod definition;
mod engine;
mod error;
mod instance;

pub use definition::{Task, Transition, TransitionInput, WorkflowDefinition, WorkflowDefinitionInput};
pub use engine::WorkflowEngine;
pub use error::{WorkflowError, WorkflowResult};
pub use instance::{HistoryEntry, WorkflowInstance};
