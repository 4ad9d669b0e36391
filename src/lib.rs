//! ContentFlow - Workflow Progress Engine
//!
//! Coordinates a multi-step content-production pipeline (market analysis
//! through publishing and analytics setup) as a trackable, controllable
//! unit of work. Workflow state lives in an in-memory store; background
//! runners advance steps by invoking external generation collaborators,
//! and callers control a workflow (pause/resume/goto/restart/stop)
//! independently of its runner.
//!
//! # Architecture
//!
//! The library is organized into three main modules:
//!
//! - [`workflow`]: Step catalog, data model, and the in-memory store
//! - [`execution`]: Engine and the interactive/automated runners
//! - [`generation`]: Collaborator contracts and simulated implementations
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use contentflow::execution::{Engine, PipelineConfig};
//! use contentflow::generation::simulated::simulated_collaborators;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::new(simulated_collaborators(Duration::from_millis(300)));
//!     let config = PipelineConfig::new(vec!["youtube".to_string()]);
//!
//!     let progress = engine.start_interactive(None, config)?;
//!     let id = progress.workflow_id.clone();
//!
//!     // Progress is observed by polling; the runner works in the background
//!     while let Some(snapshot) = engine.store().get_workflow_progress(&id) {
//!         println!("{}: {:.1}%", id, snapshot.overall_progress);
//!         if snapshot.status.is_terminal() {
//!             break;
//!         }
//!         tokio::time::sleep(Duration::from_millis(500)).await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod execution;
pub mod generation;
pub mod workflow;

// Re-export commonly used types
pub use execution::{Engine, NicheStrategy, PipelineConfig};
pub use generation::{CollaboratorError, Collaborators};
pub use workflow::{
    ControlAction, StepStatus, WorkflowError, WorkflowProgress, WorkflowStatus, WorkflowStep,
    WorkflowStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "ContentFlow";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "ContentFlow");
    }

    #[test]
    fn test_module_exports_store() {
        let store = WorkflowStore::new();
        assert!(store.is_empty());
    }

    #[test]
    fn test_module_exports_catalog() {
        assert_eq!(workflow::STEP_COUNT, 9);
        assert_eq!(workflow::catalog_steps().len(), 9);
    }
}
