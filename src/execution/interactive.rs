//! Interactive Runner
//!
//! Drives one complete guided pass through all nine pipeline steps for a
//! single workflow, invoking the generation collaborators and reporting
//! partial progress through the store at each stage.
//!
//! The runner executes as a detached background task; the caller that
//! kicked it off returns immediately and observes progress only by polling
//! the store. At every step boundary and before every collaborator call the
//! runner passes a checkpoint that honors cancellation, waits out a paused
//! workflow, and stops when the workflow was deleted or failed externally.
//!
//! On any collaborator failure the runner looks up the workflow's active
//! step, records the failure through `fail_step`, and stops. No retry is
//! attempted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use serde_json::json;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::generation::{CollaboratorError, Collaborators};
use crate::workflow::{WorkflowError, WorkflowStatus, WorkflowStore};

use super::config::PipelineConfig;

/// How often a blocked runner re-reads workflow status while paused.
pub(crate) const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Why the runner stopped before finishing the pass.
#[derive(Debug)]
enum RunnerExit {
    /// The cancellation token fired.
    Cancelled,

    /// The workflow was deleted or reached a terminal state externally.
    Halted,

    /// A collaborator call failed; carries the display message.
    Collaborator(String),

    /// A store mutation was rejected.
    Store(WorkflowError),
}

impl From<CollaboratorError> for RunnerExit {
    fn from(err: CollaboratorError) -> Self {
        RunnerExit::Collaborator(err.message)
    }
}

impl From<WorkflowError> for RunnerExit {
    fn from(err: WorkflowError) -> Self {
        RunnerExit::Store(err)
    }
}

/// One content item moving through the generation stages.
struct ContentItem {
    theme: String,
    style: String,
    lyrics: Option<String>,
    music_url: Option<String>,
    avatar_url: Option<String>,
    video_url: Option<String>,
}

impl ContentItem {
    fn plan(niche: &str) -> Self {
        Self {
            theme: niche.to_string(),
            style: format!("{} visual", niche),
            lyrics: None,
            music_url: None,
            avatar_url: None,
            video_url: None,
        }
    }
}

/// Background task walking one workflow through the full step sequence.
pub struct InteractiveRunner {
    store: Arc<WorkflowStore>,
    collaborators: Collaborators,
    config: PipelineConfig,
}

impl InteractiveRunner {
    pub fn new(
        store: Arc<WorkflowStore>,
        collaborators: Collaborators,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            collaborators,
            config,
        }
    }

    /// Runs the guided pass to completion, converting any collaborator
    /// failure into a `fail_step` mutation on the active step.
    pub async fn run(self, workflow_id: String, cancel: CancellationToken) {
        match self.drive(&workflow_id, &cancel).await {
            Ok(()) => info!("Workflow '{}' completed its guided pass", workflow_id),
            Err(RunnerExit::Cancelled) => {
                info!("Workflow '{}' runner cancelled", workflow_id);
            }
            Err(RunnerExit::Halted) => {
                info!("Workflow '{}' runner halted by external state change", workflow_id);
            }
            Err(RunnerExit::Collaborator(message)) => {
                self.record_failure(&workflow_id, &message);
            }
            Err(RunnerExit::Store(err)) => {
                warn!("Workflow '{}' runner stopped: {}", workflow_id, err);
            }
        }
    }

    async fn drive(&self, id: &str, cancel: &CancellationToken) -> Result<(), RunnerExit> {
        // Market analysis: trend scan, then niche refresh
        self.checkpoint(id, cancel).await?;
        self.store.update_step_progress(id, "market-analysis", 10, None)?;
        let scan = call(cancel, self.collaborators.trends.scan()).await?;
        self.store.update_step_progress(id, "market-analysis", 50, None)?;

        self.checkpoint(id, cancel).await?;
        let niches_refreshed = call(cancel, self.collaborators.niches.refresh()).await?;
        self.store.update_step_progress(id, "market-analysis", 80, None)?;
        self.store.complete_step(
            id,
            "market-analysis",
            Some(json!({
                "trendsFound": scan.trends_found,
                "nichesAnalyzed": niches_refreshed,
            })),
        )?;

        // Niche selection is synchronous: pick up to contentPerDay niches
        self.checkpoint(id, cancel).await?;
        self.store.update_step_progress(id, "niche-selection", 30, None)?;
        let niches = self.config.select_niches();
        self.store.update_step_progress(id, "niche-selection", 70, None)?;
        self.store.complete_step(
            id,
            "niche-selection",
            Some(json!({ "nichesSelected": niches.len() })),
        )?;

        // Content planning: one plan per selected niche
        self.checkpoint(id, cancel).await?;
        let mut items: Vec<ContentItem> = Vec::with_capacity(niches.len());
        for (index, niche) in niches.iter().enumerate() {
            items.push(ContentItem::plan(niche));
            let progress = item_progress(index, niches.len());
            self.store.update_step_progress(id, "content-planning", progress, None)?;
        }
        self.store.complete_step(
            id,
            "content-planning",
            Some(json!({ "plansCreated": items.len() })),
        )?;

        items.truncate(self.config.content_per_day);
        let total = items.len();

        // Lyric generation
        for (index, item) in items.iter_mut().enumerate() {
            self.checkpoint(id, cancel).await?;
            let lyrics = call(cancel, self.collaborators.lyrics.generate(&item.theme)).await?;
            item.lyrics = Some(lyrics);
            self.store.update_step_progress(
                id,
                "lyric-generation",
                item_progress(index, total),
                None,
            )?;
        }
        self.store.complete_step(
            id,
            "lyric-generation",
            Some(json!({ "itemsGenerated": total })),
        )?;

        // Music generation
        for (index, item) in items.iter_mut().enumerate() {
            self.checkpoint(id, cancel).await?;
            let lyrics = item.lyrics.as_deref().unwrap_or_default();
            let url = call(cancel, self.collaborators.music.generate(lyrics, &item.theme)).await?;
            item.music_url = Some(url);
            self.store.update_step_progress(
                id,
                "music-generation",
                item_progress(index, total),
                None,
            )?;
        }
        self.store.complete_step(
            id,
            "music-generation",
            Some(json!({ "itemsGenerated": total })),
        )?;

        // Avatar creation
        for (index, item) in items.iter_mut().enumerate() {
            self.checkpoint(id, cancel).await?;
            let url = call(cancel, self.collaborators.avatar.generate(&item.style)).await?;
            item.avatar_url = Some(url);
            self.store.update_step_progress(
                id,
                "avatar-creation",
                item_progress(index, total),
                None,
            )?;
        }
        self.store.complete_step(
            id,
            "avatar-creation",
            Some(json!({ "itemsGenerated": total })),
        )?;

        // Video assembly
        for (index, item) in items.iter_mut().enumerate() {
            self.checkpoint(id, cancel).await?;
            let music = item.music_url.as_deref().unwrap_or_default();
            let avatar = item.avatar_url.as_deref().unwrap_or_default();
            let url = call(cancel, self.collaborators.video.assemble(music, avatar)).await?;
            item.video_url = Some(url);
            self.store.update_step_progress(
                id,
                "video-assembly",
                item_progress(index, total),
                None,
            )?;
        }
        self.store.complete_step(
            id,
            "video-assembly",
            Some(json!({ "itemsAssembled": total })),
        )?;

        // Publishing
        for (index, item) in items.iter().enumerate() {
            self.checkpoint(id, cancel).await?;
            let video = item.video_url.as_deref().unwrap_or_default();
            call(
                cancel,
                self.collaborators.publisher.publish(video, &self.config.platforms),
            )
            .await?;
            self.store.update_step_progress(
                id,
                "publishing",
                item_progress(index, total),
                None,
            )?;
        }
        self.store.complete_step(
            id,
            "publishing",
            Some(json!({
                "itemsPublished": total,
                "platforms": self.config.platforms.len(),
            })),
        )?;

        // Analytics setup; completing this last step completes the workflow
        for (index, _item) in items.iter().enumerate() {
            self.checkpoint(id, cancel).await?;
            let content_id = format!("{}-{}", id, index);
            call(cancel, self.collaborators.analytics.setup(&content_id)).await?;
            self.store.update_step_progress(
                id,
                "analytics-tracking",
                item_progress(index, total),
                None,
            )?;
        }
        self.store.complete_step(
            id,
            "analytics-tracking",
            Some(json!({ "itemsTracked": total })),
        )?;

        Ok(())
    }

    /// Gate passed at every step boundary and before every collaborator
    /// call. Blocks while the workflow is paused, exits on cancellation,
    /// and stops the runner if the workflow disappeared or reached a
    /// terminal state behind its back.
    async fn checkpoint(&self, id: &str, cancel: &CancellationToken) -> Result<(), RunnerExit> {
        loop {
            if cancel.is_cancelled() {
                return Err(RunnerExit::Cancelled);
            }

            let Some(workflow) = self.store.get_workflow_progress(id) else {
                return Err(RunnerExit::Halted);
            };

            match workflow.status {
                WorkflowStatus::Paused => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(RunnerExit::Cancelled),
                        _ = sleep(PAUSE_POLL_INTERVAL) => {}
                    }
                }
                status if status.is_terminal() => return Err(RunnerExit::Halted),
                _ => return Ok(()),
            }
        }
    }

    /// Converts a collaborator failure into a `fail_step` on the step the
    /// workflow currently points at.
    fn record_failure(&self, workflow_id: &str, message: &str) {
        let Some(workflow) = self.store.get_workflow_progress(workflow_id) else {
            warn!(
                "Workflow '{}' vanished before its failure could be recorded: {}",
                workflow_id, message
            );
            return;
        };

        let Some(step_id) = workflow.current_step().map(|s| s.id.clone()) else {
            warn!(
                "Workflow '{}' has no active step to fail: {}",
                workflow_id, message
            );
            return;
        };

        if let Err(err) = self.store.fail_step(workflow_id, &step_id, message) {
            error!(
                "Failed to record failure for workflow '{}': {}",
                workflow_id, err
            );
        }
    }
}

/// Races a collaborator call against the cancellation token so a stop
/// request interrupts an in-flight network call.
async fn call<T, F>(cancel: &CancellationToken, future: F) -> Result<T, RunnerExit>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(RunnerExit::Cancelled),
        result = future => result.map_err(RunnerExit::from),
    }
}

/// Proportional progress after finishing item `index` of `total`.
fn item_progress(index: usize, total: usize) -> i64 {
    if total == 0 {
        return 100;
    }
    ((index + 1) * 100 / total) as i64
}
