//! Workflow Data Model
//!
//! Core data structures tracking the progress of a content-production
//! workflow: per-step state, the aggregate record, and the control actions
//! callers may apply to it.
//!
//! The serde representation matches the JSON wire format served to pollers:
//! camelCase field names, lowercase status strings, and control requests
//! discriminated by an `action` tag:
//!
//! ```json
//! { "action": "goto", "stepIndex": 5 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Execution state of a single step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Paused,
}

/// Execution state of the workflow as a whole.
///
/// `Completed` and `Failed` are terminal: the store rejects further
/// mutation once either is reached.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Initializing,
    Running,
    Paused,
    Completed,
    Failed,
}

impl WorkflowStatus {
    /// Returns true for states that accept no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

/// One stage of the content pipeline.
///
/// Display metadata (`name`, `description`) is copied from the catalog at
/// workflow creation. `progress` is meaningful while `running` and frozen
/// at 100 on completion. `data` is an opaque payload attached on completion
/// for observability only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Stable key drawn from the step catalog
    pub id: String,

    /// Display name
    pub name: String,

    /// Display description
    pub description: String,

    /// Current execution state
    pub status: StepStatus,

    /// Completion percentage, 0-100
    pub progress: u8,

    /// Set when the step enters `running`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Set when the step leaves to a terminal per-step state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Failure message, present only when `status == failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Opaque result payload attached on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The aggregate progress record for one workflow.
///
/// Owned exclusively by the [`WorkflowStore`](super::store::WorkflowStore);
/// callers only ever see cloned snapshots.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowProgress {
    /// Unique identifier, caller-supplied or generated at creation
    pub workflow_id: String,

    /// Index of the step most recently activated or navigated to
    pub current_step_index: usize,

    /// The nine pipeline steps, order fixed by the catalog
    pub steps: Vec<WorkflowStep>,

    /// Mean of all step progress values, recomputed after every mutation
    pub overall_progress: f64,

    /// Workflow-level execution state
    pub status: WorkflowStatus,

    /// When the workflow record was created (or last restarted)
    pub start_time: DateTime<Utc>,

    /// Set when the workflow completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Gates the `pause` control action
    pub can_pause: bool,

    /// Gates the `resume` control action
    pub can_resume: bool,

    /// Gates the `goto` control action; fixed true in this design
    pub allow_step_navigation: bool,
}

impl WorkflowProgress {
    /// Looks up a step by catalog id.
    pub fn step(&self, step_id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Mutable step lookup by catalog id.
    pub fn step_mut(&mut self, step_id: &str) -> Option<&mut WorkflowStep> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    /// Position of a step within the sequence.
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    /// The step `current_step_index` points at.
    pub fn current_step(&self) -> Option<&WorkflowStep> {
        self.steps.get(self.current_step_index)
    }

    /// Recomputes `overall_progress` as the mean of step progress values.
    ///
    /// Invariant: called after every mutation that touches step progress.
    pub fn recompute_overall_progress(&mut self) {
        if self.steps.is_empty() {
            self.overall_progress = 0.0;
            return;
        }
        let total: u32 = self.steps.iter().map(|s| u32::from(s.progress)).sum();
        self.overall_progress = f64::from(total) / self.steps.len() as f64;
    }
}

/// A control action applied to a workflow independent of runner execution.
///
/// `Stop` cancels the background runner task; the other four drive the
/// store's state machine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ControlAction {
    Pause,
    Resume,
    Goto {
        #[serde(rename = "stepIndex")]
        step_index: usize,
    },
    Restart,
    Stop,
}

impl ControlAction {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ControlAction::Pause => "pause",
            ControlAction::Resume => "resume",
            ControlAction::Goto { .. } => "goto",
            ControlAction::Restart => "restart",
            ControlAction::Stop => "stop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::catalog::catalog_steps;

    fn sample_progress() -> WorkflowProgress {
        WorkflowProgress {
            workflow_id: "w1".to_string(),
            current_step_index: 0,
            steps: catalog_steps(),
            overall_progress: 0.0,
            status: WorkflowStatus::Initializing,
            start_time: Utc::now(),
            end_time: None,
            can_pause: true,
            can_resume: false,
            allow_step_navigation: true,
        }
    }

    #[test]
    fn test_status_terminal_states() {
        assert!(WorkflowStatus::Completed.is_terminal());
        assert!(WorkflowStatus::Failed.is_terminal());
        assert!(!WorkflowStatus::Running.is_terminal());
        assert!(!WorkflowStatus::Paused.is_terminal());
        assert!(!WorkflowStatus::Initializing.is_terminal());
    }

    #[test]
    fn test_overall_progress_mean() {
        let mut progress = sample_progress();
        progress.steps[0].progress = 50;
        progress.recompute_overall_progress();
        assert!((progress.overall_progress - 50.0 / 9.0).abs() < 1e-9);

        progress.steps[0].progress = 100;
        progress.steps[1].progress = 100;
        progress.recompute_overall_progress();
        assert!((progress.overall_progress - 200.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_overall_progress_empty_steps() {
        let mut progress = sample_progress();
        progress.steps.clear();
        progress.recompute_overall_progress();
        assert_eq!(progress.overall_progress, 0.0);
    }

    #[test]
    fn test_step_lookup() {
        let progress = sample_progress();
        assert!(progress.step("market-analysis").is_some());
        assert_eq!(progress.step_index("niche-selection"), Some(1));
        assert!(progress.step("unknown-step").is_none());
        assert!(progress.step_index("unknown-step").is_none());
    }

    #[test]
    fn test_current_step() {
        let mut progress = sample_progress();
        progress.current_step_index = 4;
        assert_eq!(progress.current_step().unwrap().id, "music-generation");

        progress.current_step_index = 99;
        assert!(progress.current_step().is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&WorkflowStatus::Initializing).unwrap();
        assert_eq!(json, "\"initializing\"");
        let json = serde_json::to_string(&StepStatus::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
    }

    #[test]
    fn test_progress_serializes_camel_case() {
        let progress = sample_progress();
        let value = serde_json::to_value(&progress).unwrap();
        assert!(value.get("workflowId").is_some());
        assert!(value.get("currentStepIndex").is_some());
        assert!(value.get("overallProgress").is_some());
        assert!(value.get("canPause").is_some());
        assert!(value.get("allowStepNavigation").is_some());
        // Unset optional timestamps are omitted from the payload
        assert!(value.get("endTime").is_none());
    }

    #[test]
    fn test_control_action_wire_format() {
        let action: ControlAction = serde_json::from_str(r#"{"action":"pause"}"#).unwrap();
        assert_eq!(action, ControlAction::Pause);

        let action: ControlAction =
            serde_json::from_str(r#"{"action":"goto","stepIndex":5}"#).unwrap();
        assert_eq!(action, ControlAction::Goto { step_index: 5 });

        let json = serde_json::to_string(&ControlAction::Restart).unwrap();
        assert_eq!(json, r#"{"action":"restart"}"#);
    }

    #[test]
    fn test_control_action_names() {
        assert_eq!(ControlAction::Pause.name(), "pause");
        assert_eq!(ControlAction::Goto { step_index: 2 }.name(), "goto");
        assert_eq!(ControlAction::Stop.name(), "stop");
    }

    #[test]
    fn test_progress_roundtrip() {
        let mut progress = sample_progress();
        progress.steps[2].data = Some(serde_json::json!({"plansCreated": 2}));
        progress.steps[2].status = StepStatus::Completed;

        let json = serde_json::to_string(&progress).unwrap();
        let back: WorkflowProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }
}
