//! Workflow Store
//!
//! In-memory registry mapping workflow id to its current
//! [`WorkflowProgress`] snapshot. The store owns every record exclusively
//! and is the only component allowed to mutate one: runners and control
//! callers go through the methods here and receive cloned post-mutation
//! snapshots back.
//!
//! Concurrency: two classes of actor touch the same record — the background
//! runner advancing steps and control calls (pause/resume/goto/restart)
//! arriving from request handlers at arbitrary times. Every mutator holds
//! the registry write lock for the whole mutation, so updates to a record
//! are serialized and `overall_progress` is never computed from a stale
//! read. Readers clone under the read lock and never observe a
//! partially-updated record.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use log::{debug, error, info};
use serde_json::Value;

use super::catalog::catalog_steps;
use super::error::WorkflowError;
use super::model::{ControlAction, StepStatus, WorkflowProgress, WorkflowStatus};

/// In-memory workflow registry and state machine.
///
/// Records live until explicitly deleted; there is no TTL or eviction.
#[derive(Debug, Default)]
pub struct WorkflowStore {
    workflows: RwLock<HashMap<String, WorkflowProgress>>,
}

impl WorkflowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            workflows: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a fresh workflow record from the step catalog.
    ///
    /// Always succeeds and overwrites any prior record with the same id.
    /// The new record is `initializing` with all steps `pending`.
    pub fn initialize_workflow(&self, workflow_id: &str) -> WorkflowProgress {
        let workflow = WorkflowProgress {
            workflow_id: workflow_id.to_string(),
            current_step_index: 0,
            steps: catalog_steps(),
            overall_progress: 0.0,
            status: WorkflowStatus::Initializing,
            start_time: Utc::now(),
            end_time: None,
            can_pause: true,
            can_resume: false,
            allow_step_navigation: true,
        };

        self.write_lock()
            .insert(workflow_id.to_string(), workflow.clone());

        info!(
            "Workflow '{}' initialized with {} steps",
            workflow_id,
            workflow.steps.len()
        );
        workflow
    }

    /// Moves a workflow to `running` and activates step 0.
    pub fn start_workflow(&self, workflow_id: &str) -> Result<WorkflowProgress, WorkflowError> {
        let snapshot = self.mutate(workflow_id, |workflow| {
            ensure_active(workflow)?;

            workflow.status = WorkflowStatus::Running;
            if let Some(first) = workflow.steps.first_mut() {
                first.status = StepStatus::Running;
                first.start_time = Some(Utc::now());
            }
            Ok(())
        })?;

        info!("Workflow '{}' started", workflow_id);
        Ok(snapshot)
    }

    /// Updates the named step's progress (clamped to 0-100) and optional
    /// payload, then recomputes overall progress.
    ///
    /// Does not change step status. An unknown `step_id` is tolerated: the
    /// record is returned unchanged. This is intentional lookup tolerance
    /// for runners reporting against steps that were navigated away from.
    pub fn update_step_progress(
        &self,
        workflow_id: &str,
        step_id: &str,
        progress: i64,
        data: Option<Value>,
    ) -> Result<WorkflowProgress, WorkflowError> {
        self.mutate(workflow_id, |workflow| {
            ensure_active(workflow)?;

            let clamped = progress.clamp(0, 100) as u8;
            match workflow.step_mut(step_id) {
                Some(step) => {
                    step.progress = clamped;
                    if let Some(data) = data {
                        step.data = Some(data);
                    }
                }
                None => {
                    debug!(
                        "Ignoring progress update for unknown step '{}' in workflow '{}'",
                        step_id, workflow_id
                    );
                }
            }
            Ok(())
        })
    }

    /// Marks the named step completed and activates the next step in
    /// sequence, or completes the whole workflow if it was the last one.
    pub fn complete_step(
        &self,
        workflow_id: &str,
        step_id: &str,
        data: Option<Value>,
    ) -> Result<WorkflowProgress, WorkflowError> {
        let snapshot = self.mutate(workflow_id, |workflow| {
            ensure_active(workflow)?;

            let step_index =
                workflow
                    .step_index(step_id)
                    .ok_or_else(|| WorkflowError::StepNotFound {
                        workflow_id: workflow_id.to_string(),
                        step_id: step_id.to_string(),
                    })?;

            let step = &mut workflow.steps[step_index];
            step.status = StepStatus::Completed;
            step.progress = 100;
            step.end_time = Some(Utc::now());
            if let Some(data) = data {
                step.data = Some(data);
            }

            if step_index + 1 < workflow.steps.len() {
                workflow.current_step_index = step_index + 1;
                let next = &mut workflow.steps[step_index + 1];
                next.status = StepStatus::Running;
                next.start_time = Some(Utc::now());
            } else {
                workflow.status = WorkflowStatus::Completed;
                workflow.end_time = Some(Utc::now());
                workflow.can_pause = false;
            }
            Ok(())
        })?;

        info!(
            "Step '{}' completed for workflow '{}'",
            step_id, workflow_id
        );
        Ok(snapshot)
    }

    /// Marks the named step failed with the given message and moves the
    /// workflow to the terminal `failed` state. No step is auto-activated.
    pub fn fail_step(
        &self,
        workflow_id: &str,
        step_id: &str,
        message: &str,
    ) -> Result<WorkflowProgress, WorkflowError> {
        let snapshot = self.mutate(workflow_id, |workflow| {
            ensure_active(workflow)?;

            let step = workflow
                .step_mut(step_id)
                .ok_or_else(|| WorkflowError::StepNotFound {
                    workflow_id: workflow_id.to_string(),
                    step_id: step_id.to_string(),
                })?;

            step.status = StepStatus::Failed;
            step.error = Some(message.to_string());
            step.end_time = Some(Utc::now());

            workflow.status = WorkflowStatus::Failed;
            Ok(())
        })?;

        error!(
            "Step '{}' failed for workflow '{}': {}",
            step_id, workflow_id, message
        );
        Ok(snapshot)
    }

    /// Executes a control action against the workflow's state machine.
    ///
    /// An action whose precondition is not satisfied returns
    /// [`WorkflowError::InvalidTransition`] so callers can distinguish
    /// "nothing happened" from success. `restart` has no precondition and
    /// is the one action allowed on a terminal workflow.
    pub fn control_workflow(
        &self,
        workflow_id: &str,
        action: ControlAction,
    ) -> Result<WorkflowProgress, WorkflowError> {
        let snapshot = self.mutate(workflow_id, |workflow| match action {
            ControlAction::Pause => {
                if !(workflow.can_pause && workflow.status == WorkflowStatus::Running) {
                    return Err(WorkflowError::invalid_transition(
                        workflow_id,
                        "pause requires a running, pausable workflow",
                    ));
                }
                workflow.status = WorkflowStatus::Paused;
                workflow.can_pause = false;
                workflow.can_resume = true;
                if let Some(current) = workflow.steps.get_mut(workflow.current_step_index) {
                    if current.status == StepStatus::Running {
                        current.status = StepStatus::Paused;
                    }
                }
                Ok(())
            }
            ControlAction::Resume => {
                if !(workflow.can_resume && workflow.status == WorkflowStatus::Paused) {
                    return Err(WorkflowError::invalid_transition(
                        workflow_id,
                        "resume requires a paused workflow",
                    ));
                }
                workflow.status = WorkflowStatus::Running;
                workflow.can_pause = true;
                workflow.can_resume = false;
                if let Some(current) = workflow.steps.get_mut(workflow.current_step_index) {
                    if current.status == StepStatus::Paused {
                        current.status = StepStatus::Running;
                    }
                }
                Ok(())
            }
            ControlAction::Goto { step_index } => {
                ensure_active(workflow)?;
                if !workflow.allow_step_navigation {
                    return Err(WorkflowError::invalid_transition(
                        workflow_id,
                        "step navigation is disabled for this workflow",
                    ));
                }
                if step_index >= workflow.steps.len() {
                    return Err(WorkflowError::invalid_transition(
                        workflow_id,
                        format!(
                            "step index {} out of range (0..{})",
                            step_index,
                            workflow.steps.len()
                        ),
                    ));
                }

                // Navigated-away steps keep their recorded progress and data.
                if let Some(current) = workflow.steps.get_mut(workflow.current_step_index) {
                    if current.status == StepStatus::Running {
                        current.status = StepStatus::Paused;
                    }
                }

                workflow.current_step_index = step_index;
                let target = &mut workflow.steps[step_index];
                target.status = StepStatus::Running;
                target.start_time = Some(Utc::now());
                workflow.status = WorkflowStatus::Running;
                Ok(())
            }
            ControlAction::Restart => {
                workflow.steps = catalog_steps();
                workflow.current_step_index = 0;
                workflow.overall_progress = 0.0;
                workflow.status = WorkflowStatus::Running;
                workflow.start_time = Utc::now();
                workflow.end_time = None;
                workflow.can_pause = true;
                workflow.can_resume = false;

                let first = &mut workflow.steps[0];
                first.status = StepStatus::Running;
                first.start_time = Some(Utc::now());
                Ok(())
            }
            // Stop cancels the runner task; the engine intercepts it
            // before the store ever sees it.
            ControlAction::Stop => Err(WorkflowError::invalid_transition(
                workflow_id,
                "stop is handled by the execution engine",
            )),
        })?;

        info!(
            "Workflow '{}' control action: {}",
            workflow_id,
            action.name()
        );
        Ok(snapshot)
    }

    /// Returns a consistent snapshot of one workflow, if present.
    pub fn get_workflow_progress(&self, workflow_id: &str) -> Option<WorkflowProgress> {
        self.read_lock().get(workflow_id).cloned()
    }

    /// Returns snapshots of every registered workflow.
    pub fn all_workflows(&self) -> Vec<WorkflowProgress> {
        self.read_lock().values().cloned().collect()
    }

    /// Removes a workflow from the registry. Returns true if it existed.
    pub fn delete_workflow(&self, workflow_id: &str) -> bool {
        let removed = self.write_lock().remove(workflow_id).is_some();
        if removed {
            info!("Workflow '{}' deleted", workflow_id);
        }
        removed
    }

    /// Number of registered workflows.
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    /// Returns true if no workflows are registered.
    pub fn is_empty(&self) -> bool {
        self.read_lock().is_empty()
    }

    /// Applies a mutation under the write lock and publishes the
    /// post-mutation snapshot. Overall progress is recomputed after every
    /// successful mutation.
    fn mutate<F>(&self, workflow_id: &str, f: F) -> Result<WorkflowProgress, WorkflowError>
    where
        F: FnOnce(&mut WorkflowProgress) -> Result<(), WorkflowError>,
    {
        let mut workflows = self.write_lock();
        let workflow = workflows
            .get_mut(workflow_id)
            .ok_or_else(|| WorkflowError::NotFound(workflow_id.to_string()))?;

        f(workflow)?;
        workflow.recompute_overall_progress();
        Ok(workflow.clone())
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, WorkflowProgress>> {
        self.workflows
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, WorkflowProgress>> {
        self.workflows
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Rejects mutation of a workflow that has reached a terminal state.
fn ensure_active(workflow: &WorkflowProgress) -> Result<(), WorkflowError> {
    if workflow.status.is_terminal() {
        return Err(WorkflowError::invalid_transition(
            &workflow.workflow_id,
            format!(
                "workflow is {} and accepts no further mutation",
                match workflow.status {
                    WorkflowStatus::Completed => "completed",
                    _ => "failed",
                }
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn started_store() -> WorkflowStore {
        let store = WorkflowStore::new();
        store.initialize_workflow("w1");
        store.start_workflow("w1").unwrap();
        store
    }

    fn complete_all_steps(store: &WorkflowStore, workflow_id: &str) -> WorkflowProgress {
        let step_ids: Vec<String> = store
            .get_workflow_progress(workflow_id)
            .unwrap()
            .steps
            .iter()
            .map(|s| s.id.clone())
            .collect();

        let mut last = None;
        for step_id in step_ids {
            last = Some(store.complete_step(workflow_id, &step_id, None).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn test_initialize_workflow() {
        let store = WorkflowStore::new();
        let workflow = store.initialize_workflow("w1");

        assert_eq!(workflow.workflow_id, "w1");
        assert_eq!(workflow.steps.len(), 9);
        assert_eq!(workflow.status, WorkflowStatus::Initializing);
        assert_eq!(workflow.overall_progress, 0.0);
        assert_eq!(workflow.current_step_index, 0);
        assert!(workflow.can_pause);
        assert!(!workflow.can_resume);
        assert!(workflow.allow_step_navigation);
    }

    #[test]
    fn test_initialize_overwrites_existing() {
        let store = WorkflowStore::new();
        store.initialize_workflow("w1");
        store.start_workflow("w1").unwrap();
        store.update_step_progress("w1", "market-analysis", 50, None).unwrap();

        let fresh = store.initialize_workflow("w1");
        assert_eq!(fresh.status, WorkflowStatus::Initializing);
        assert_eq!(fresh.overall_progress, 0.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_start_workflow() {
        let store = WorkflowStore::new();
        store.initialize_workflow("w1");
        let workflow = store.start_workflow("w1").unwrap();

        assert_eq!(workflow.status, WorkflowStatus::Running);
        assert_eq!(workflow.steps[0].status, StepStatus::Running);
        assert!(workflow.steps[0].start_time.is_some());
    }

    #[test]
    fn test_start_unknown_workflow() {
        let store = WorkflowStore::new();
        assert_eq!(
            store.start_workflow("missing"),
            Err(WorkflowError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_update_step_progress_recomputes_mean() {
        let store = started_store();
        let workflow = store
            .update_step_progress("w1", "market-analysis", 50, None)
            .unwrap();

        assert_eq!(workflow.steps[0].progress, 50);
        assert!((workflow.overall_progress - 50.0 / 9.0).abs() < EPSILON);
        // Progress updates never change step status
        assert_eq!(workflow.steps[0].status, StepStatus::Running);
    }

    #[test]
    fn test_update_step_progress_clamps() {
        let store = started_store();

        let workflow = store
            .update_step_progress("w1", "market-analysis", 250, None)
            .unwrap();
        assert_eq!(workflow.steps[0].progress, 100);

        let workflow = store
            .update_step_progress("w1", "market-analysis", -10, None)
            .unwrap();
        assert_eq!(workflow.steps[0].progress, 0);
    }

    #[test]
    fn test_update_step_progress_attaches_data() {
        let store = started_store();
        let workflow = store
            .update_step_progress(
                "w1",
                "market-analysis",
                40,
                Some(serde_json::json!({"trendsFound": 12})),
            )
            .unwrap();

        assert_eq!(
            workflow.steps[0].data,
            Some(serde_json::json!({"trendsFound": 12}))
        );
    }

    #[test]
    fn test_update_unknown_step_is_tolerated() {
        let store = started_store();
        let before = store.get_workflow_progress("w1").unwrap();
        let after = store
            .update_step_progress("w1", "no-such-step", 80, None)
            .unwrap();

        assert_eq!(after.overall_progress, before.overall_progress);
        assert_eq!(after.steps, before.steps);
    }

    #[test]
    fn test_complete_step_advances_sequence() {
        let store = started_store();
        let workflow = store.complete_step("w1", "market-analysis", None).unwrap();

        assert_eq!(workflow.steps[0].status, StepStatus::Completed);
        assert_eq!(workflow.steps[0].progress, 100);
        assert!(workflow.steps[0].end_time.is_some());
        assert_eq!(workflow.steps[1].status, StepStatus::Running);
        assert!(workflow.steps[1].start_time.is_some());
        assert_eq!(workflow.current_step_index, 1);
        assert!((workflow.overall_progress - 100.0 / 9.0).abs() < EPSILON);
    }

    #[test]
    fn test_complete_step_with_payload() {
        let store = started_store();
        let payload = serde_json::json!({"trendsFound": 7, "nichesAnalyzed": 3});
        let workflow = store
            .complete_step("w1", "market-analysis", Some(payload.clone()))
            .unwrap();

        assert_eq!(workflow.steps[0].data, Some(payload));
    }

    #[test]
    fn test_complete_unknown_step() {
        let store = started_store();
        let result = store.complete_step("w1", "bogus", None);
        assert_eq!(
            result,
            Err(WorkflowError::StepNotFound {
                workflow_id: "w1".to_string(),
                step_id: "bogus".to_string(),
            })
        );
    }

    #[test]
    fn test_complete_last_step_completes_workflow() {
        let store = started_store();
        let workflow = complete_all_steps(&store, "w1");

        assert_eq!(workflow.status, WorkflowStatus::Completed);
        assert!(workflow.end_time.is_some());
        assert!(!workflow.can_pause);
        assert!((workflow.overall_progress - 100.0).abs() < EPSILON);
        assert!(workflow
            .steps
            .iter()
            .all(|s| s.status == StepStatus::Completed));
    }

    #[test]
    fn test_completed_workflow_rejects_mutation() {
        let store = started_store();
        complete_all_steps(&store, "w1");

        assert!(matches!(
            store.complete_step("w1", "market-analysis", None),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            store.update_step_progress("w1", "market-analysis", 10, None),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            store.start_workflow("w1"),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_fail_step() {
        let store = started_store();
        // Walk forward to video-assembly (index 6)
        for step_id in [
            "market-analysis",
            "niche-selection",
            "content-planning",
            "lyric-generation",
            "music-generation",
            "avatar-creation",
        ] {
            store.complete_step("w1", step_id, None).unwrap();
        }

        let workflow = store.fail_step("w1", "video-assembly", "timeout").unwrap();

        assert_eq!(workflow.steps[6].status, StepStatus::Failed);
        assert_eq!(workflow.steps[6].error, Some("timeout".to_string()));
        assert!(workflow.steps[6].end_time.is_some());
        assert_eq!(workflow.status, WorkflowStatus::Failed);
    }

    #[test]
    fn test_failed_workflow_is_terminal() {
        let store = started_store();
        store.fail_step("w1", "market-analysis", "boom").unwrap();

        assert!(matches!(
            store.complete_step("w1", "market-analysis", None),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            store.control_workflow("w1", ControlAction::Pause),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_pause_and_resume() {
        let store = started_store();

        let workflow = store.control_workflow("w1", ControlAction::Pause).unwrap();
        assert_eq!(workflow.status, WorkflowStatus::Paused);
        assert_eq!(workflow.steps[0].status, StepStatus::Paused);
        assert!(!workflow.can_pause);
        assert!(workflow.can_resume);

        // Pausing twice violates the precondition
        assert!(matches!(
            store.control_workflow("w1", ControlAction::Pause),
            Err(WorkflowError::InvalidTransition { .. })
        ));

        let workflow = store.control_workflow("w1", ControlAction::Resume).unwrap();
        assert_eq!(workflow.status, WorkflowStatus::Running);
        assert_eq!(workflow.steps[0].status, StepStatus::Running);
        assert!(workflow.can_pause);
        assert!(!workflow.can_resume);
    }

    #[test]
    fn test_resume_requires_paused() {
        let store = started_store();
        assert!(matches!(
            store.control_workflow("w1", ControlAction::Resume),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_goto_navigates_and_activates() {
        let store = started_store();
        let workflow = store
            .control_workflow("w1", ControlAction::Goto { step_index: 5 })
            .unwrap();

        assert_eq!(workflow.current_step_index, 5);
        assert_eq!(workflow.steps[5].status, StepStatus::Running);
        assert!(workflow.steps[5].start_time.is_some());
        assert_eq!(workflow.status, WorkflowStatus::Running);
        // The previously running step is parked, not reset
        assert_eq!(workflow.steps[0].status, StepStatus::Paused);
    }

    #[test]
    fn test_goto_preserves_completed_step_data() {
        let store = started_store();
        store
            .complete_step(
                "w1",
                "market-analysis",
                Some(serde_json::json!({"trendsFound": 4})),
            )
            .unwrap();

        let workflow = store
            .control_workflow("w1", ControlAction::Goto { step_index: 0 })
            .unwrap();

        // Navigating back re-activates the step but leaves its record intact
        assert_eq!(workflow.steps[0].status, StepStatus::Running);
        assert_eq!(workflow.steps[0].progress, 100);
        assert_eq!(
            workflow.steps[0].data,
            Some(serde_json::json!({"trendsFound": 4}))
        );
    }

    #[test]
    fn test_goto_out_of_range() {
        let store = started_store();
        assert!(matches!(
            store.control_workflow("w1", ControlAction::Goto { step_index: 9 }),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_restart_resets_everything() {
        let store = started_store();
        store.complete_step("w1", "market-analysis", None).unwrap();
        store.complete_step("w1", "niche-selection", None).unwrap();
        store.control_workflow("w1", ControlAction::Pause).unwrap();

        let workflow = store.control_workflow("w1", ControlAction::Restart).unwrap();

        assert_eq!(workflow.status, WorkflowStatus::Running);
        assert_eq!(workflow.current_step_index, 0);
        assert_eq!(workflow.overall_progress, 0.0);
        assert!(workflow.end_time.is_none());
        assert!(workflow.can_pause);
        assert!(!workflow.can_resume);
        assert_eq!(workflow.steps[0].status, StepStatus::Running);
        assert!(workflow
            .steps
            .iter()
            .skip(1)
            .all(|s| s.status == StepStatus::Pending && s.progress == 0));
    }

    #[test]
    fn test_restart_allowed_from_terminal() {
        let store = started_store();
        store.fail_step("w1", "market-analysis", "boom").unwrap();

        let workflow = store.control_workflow("w1", ControlAction::Restart).unwrap();
        assert_eq!(workflow.status, WorkflowStatus::Running);
        assert!(workflow.steps.iter().all(|s| s.error.is_none()));
    }

    #[test]
    fn test_stop_is_not_a_store_action() {
        let store = started_store();
        assert!(matches!(
            store.control_workflow("w1", ControlAction::Stop),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_control_unknown_workflow() {
        let store = WorkflowStore::new();
        assert_eq!(
            store.control_workflow("missing", ControlAction::Pause),
            Err(WorkflowError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_at_most_one_running_step() {
        let store = started_store();
        store.complete_step("w1", "market-analysis", None).unwrap();
        store
            .control_workflow("w1", ControlAction::Goto { step_index: 4 })
            .unwrap();
        let workflow = store.complete_step("w1", "music-generation", None).unwrap();

        let running = workflow
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Running)
            .count();
        assert_eq!(running, 1);
    }

    #[test]
    fn test_read_accessors() {
        let store = WorkflowStore::new();
        assert!(store.is_empty());
        assert!(store.get_workflow_progress("w1").is_none());

        store.initialize_workflow("w1");
        store.initialize_workflow("w2");

        assert_eq!(store.len(), 2);
        assert_eq!(store.all_workflows().len(), 2);
        assert!(store.get_workflow_progress("w1").is_some());
    }

    #[test]
    fn test_delete_workflow() {
        let store = WorkflowStore::new();
        store.initialize_workflow("w1");

        assert!(store.delete_workflow("w1"));
        assert!(!store.delete_workflow("w1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshots_are_isolated() {
        let store = started_store();
        let mut snapshot = store.get_workflow_progress("w1").unwrap();
        snapshot.steps[0].progress = 99;

        // Mutating a snapshot never leaks back into the store
        let fresh = store.get_workflow_progress("w1").unwrap();
        assert_eq!(fresh.steps[0].progress, 0);
    }

    #[test]
    fn test_concurrent_mutations_keep_invariant() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(WorkflowStore::new());
        store.initialize_workflow("w1");
        store.start_workflow("w1").unwrap();

        let mut handles = Vec::new();
        for value in [10i64, 30, 50, 70, 90] {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .update_step_progress("w1", "market-analysis", value, None)
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let workflow = store.get_workflow_progress("w1").unwrap();
        let expected = f64::from(workflow.steps[0].progress) / 9.0;
        assert!((workflow.overall_progress - expected).abs() < EPSILON);
    }
}
