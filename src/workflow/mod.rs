//! Workflow State Module
//!
//! Models the content-production pipeline as a trackable, controllable unit
//! of work and owns all of its state.
//!
//! # Structure
//!
//! - [`catalog`]: The fixed nine-stage pipeline template
//! - [`model`]: Core data structures (WorkflowStep, WorkflowProgress)
//! - [`store`]: In-memory registry and state machine
//! - [`error`]: Error taxonomy for store and engine operations

pub mod catalog;
pub mod error;
pub mod model;
pub mod store;

pub use catalog::{catalog_steps, StepTemplate, STEP_CATALOG, STEP_COUNT};
pub use error::WorkflowError;
pub use model::{ControlAction, StepStatus, WorkflowProgress, WorkflowStep, WorkflowStatus};
pub use store::WorkflowStore;
