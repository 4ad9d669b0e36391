//! Execution Engine
//!
//! The engine owns the workflow store, the collaborator set, and a registry
//! of live runner tasks. Starting a workflow returns as soon as the record
//! exists and the runner is spawned; progress is observed by polling the
//! store. Every runner carries a cancellation token checked at each step
//! boundary and before each collaborator call, and the `stop` control
//! action cancels it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::generation::Collaborators;
use crate::workflow::{ControlAction, WorkflowError, WorkflowProgress, WorkflowStore};

use super::automated::AutomatedRunner;
use super::config::PipelineConfig;
use super::interactive::InteractiveRunner;

/// A live background runner: its cancellation token and task handle.
struct RunnerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Orchestrates workflow execution.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use contentflow::execution::{Engine, PipelineConfig};
/// use contentflow::generation::simulated::simulated_collaborators;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let engine = Engine::new(simulated_collaborators(Duration::from_millis(200)));
///     let config = PipelineConfig::new(vec!["youtube".to_string()]);
///
///     let progress = engine.start_interactive(None, config)?;
///     println!("started {}", progress.workflow_id);
///     engine.join(&progress.workflow_id).await;
///     Ok(())
/// }
/// ```
pub struct Engine {
    store: Arc<WorkflowStore>,
    collaborators: Collaborators,
    runners: Mutex<HashMap<String, RunnerHandle>>,
}

impl Engine {
    /// Creates an engine with a fresh, empty store.
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_store(Arc::new(WorkflowStore::new()), collaborators)
    }

    /// Creates an engine over an existing store.
    pub fn with_store(store: Arc<WorkflowStore>, collaborators: Collaborators) -> Self {
        Self {
            store,
            collaborators,
            runners: Mutex::new(HashMap::new()),
        }
    }

    /// The store backing this engine, for polling reads.
    pub fn store(&self) -> &Arc<WorkflowStore> {
        &self.store
    }

    /// Validates the configuration, creates and starts a workflow, and
    /// spawns the interactive runner as a detached task. Returns the
    /// initial snapshot immediately; the caller does not wait for the run.
    pub fn start_interactive(
        &self,
        workflow_id: Option<String>,
        config: PipelineConfig,
    ) -> Result<WorkflowProgress, WorkflowError> {
        config.validate()?;

        let id = workflow_id.unwrap_or_else(generate_workflow_id);
        self.store.initialize_workflow(&id);
        let snapshot = self.store.start_workflow(&id)?;

        let cancel = CancellationToken::new();
        let runner =
            InteractiveRunner::new(Arc::clone(&self.store), self.collaborators.clone(), config);
        let task = tokio::spawn(runner.run(id.clone(), cancel.clone()));

        self.register(&id, RunnerHandle { cancel, task });
        info!("Interactive runner spawned for workflow '{}'", id);
        Ok(snapshot)
    }

    /// Validates the configuration and spawns the automated scheduling
    /// loop under a generated id. The automated variant never touches the
    /// step state machine, so only the returned id identifies it.
    pub fn start_automated(&self, config: PipelineConfig) -> Result<String, WorkflowError> {
        config.validate()?;

        let id = generate_workflow_id();
        let cancel = CancellationToken::new();
        let runner = AutomatedRunner::new(self.collaborators.clone(), config);
        let task = tokio::spawn(runner.run(cancel.clone()));

        self.register(&id, RunnerHandle { cancel, task });
        info!("Automated runner spawned under id '{}'", id);
        Ok(id)
    }

    /// Applies a control action. `stop` cancels the runner task; the four
    /// state-machine actions are forwarded to the store and take effect
    /// atomically relative to runner mutations.
    pub fn control(
        &self,
        workflow_id: &str,
        action: ControlAction,
    ) -> Result<WorkflowProgress, WorkflowError> {
        if action == ControlAction::Stop {
            self.stop(workflow_id);
            return self
                .store
                .get_workflow_progress(workflow_id)
                .ok_or_else(|| WorkflowError::NotFound(workflow_id.to_string()));
        }
        self.store.control_workflow(workflow_id, action)
    }

    /// Cancels the runner for a workflow, if one is live. The workflow
    /// record is left as last published; deleting it is a separate call.
    pub fn stop(&self, workflow_id: &str) -> bool {
        let handle = self.lock_runners().remove(workflow_id);
        match handle {
            Some(handle) => {
                handle.cancel.cancel();
                info!("Runner for workflow '{}' cancelled", workflow_id);
                true
            }
            None => false,
        }
    }

    /// Stops any live runner and removes the workflow from the registry.
    pub fn delete_workflow(&self, workflow_id: &str) -> bool {
        self.stop(workflow_id);
        self.store.delete_workflow(workflow_id)
    }

    /// Waits for a workflow's runner task to finish, consuming its handle.
    pub async fn join(&self, workflow_id: &str) {
        let handle = self.lock_runners().remove(workflow_id);
        if let Some(handle) = handle {
            let _ = handle.task.await;
        }
    }

    fn register(&self, workflow_id: &str, handle: RunnerHandle) {
        // A restarted id replaces its old handle; cancel the orphan
        if let Some(old) = self
            .lock_runners()
            .insert(workflow_id.to_string(), handle)
        {
            old.cancel.cancel();
        }
    }

    fn lock_runners(&self) -> MutexGuard<'_, HashMap<String, RunnerHandle>> {
        self.runners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Generates a unique workflow id for callers that do not supply one.
fn generate_workflow_id() -> String {
    format!("workflow-{}", Uuid::new_v4())
}
