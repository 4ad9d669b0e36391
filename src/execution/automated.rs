//! Automated Runner
//!
//! Lightweight scheduling loop for unattended operation. Selects a
//! candidate niche per content item and schedules one fire-and-forget
//! content cycle per item on a fixed stagger, so the generation services
//! are not hit simultaneously. Cycle failures are logged, never surfaced:
//! this variant does not use the step state machine at all.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::generation::{CollaboratorError, Collaborators};

use super::config::PipelineConfig;

/// Delay between consecutive scheduled cycles.
pub const CYCLE_STAGGER: Duration = Duration::from_secs(30);

/// Background scheduler producing content without progress tracking.
pub struct AutomatedRunner {
    collaborators: Collaborators,
    config: PipelineConfig,
}

impl AutomatedRunner {
    pub fn new(collaborators: Collaborators, config: PipelineConfig) -> Self {
        Self {
            collaborators,
            config,
        }
    }

    /// Schedules one content cycle per item, staggered by
    /// [`CYCLE_STAGGER`] times the item index. Returns once every
    /// scheduled cycle has finished or the token was cancelled.
    pub async fn run(self, cancel: CancellationToken) {
        let niches = self.config.select_niches();
        info!(
            "Automated schedule: {} cycle(s), {}s stagger, platforms: {:?}",
            niches.len(),
            CYCLE_STAGGER.as_secs(),
            self.config.platforms
        );

        let mut cycles = Vec::with_capacity(niches.len());
        for (index, niche) in niches.into_iter().enumerate() {
            let collaborators = self.collaborators.clone();
            let platforms = self.config.platforms.clone();
            let cancel = cancel.clone();
            let delay = CYCLE_STAGGER * index as u32;

            cycles.push(tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Cycle for '{}' cancelled before start", niche);
                        return;
                    }
                    _ = sleep(delay) => {}
                }

                match content_cycle(&collaborators, &niche, &platforms).await {
                    Ok(video_url) => {
                        info!("Automated cycle for '{}' published {}", niche, video_url);
                    }
                    Err(err) => {
                        // Logged only; automated cycles are unmonitored
                        warn!("Automated cycle for '{}' failed: {}", niche, err);
                    }
                }
            }));
        }

        for cycle in cycles {
            let _ = cycle.await;
        }
    }
}

/// One full generation pass for a single niche: lyrics, music, avatar,
/// video, publish, analytics. Stops at the first failing collaborator.
pub(crate) async fn content_cycle(
    collaborators: &Collaborators,
    niche: &str,
    platforms: &[String],
) -> Result<String, CollaboratorError> {
    let lyrics = collaborators.lyrics.generate(niche).await?;
    let music_url = collaborators.music.generate(&lyrics, niche).await?;
    let avatar_url = collaborators.avatar.generate(niche).await?;
    let video_url = collaborators.video.assemble(&music_url, &avatar_url).await?;
    collaborators.publisher.publish(&video_url, platforms).await?;
    collaborators.analytics.setup(&video_url).await?;
    Ok(video_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::simulated::{simulated_collaborators, FailingStage};
    use std::sync::Arc;

    fn config() -> PipelineConfig {
        PipelineConfig::new(vec!["youtube".to_string()])
    }

    #[tokio::test]
    async fn test_content_cycle_succeeds() {
        let collaborators = simulated_collaborators(Duration::ZERO);
        let video_url = content_cycle(&collaborators, "lofi study beats", &config().platforms)
            .await
            .unwrap();
        assert!(video_url.starts_with("https://"));
    }

    #[tokio::test]
    async fn test_content_cycle_stops_at_first_failure() {
        let mut collaborators = simulated_collaborators(Duration::ZERO);
        collaborators.music = Arc::new(FailingStage::new("music service down"));

        let result = content_cycle(&collaborators, "lofi study beats", &config().platforms).await;
        assert_eq!(result.unwrap_err().to_string(), "music service down");
    }

    #[tokio::test]
    async fn test_cancelled_schedule_returns_promptly() {
        let runner = AutomatedRunner::new(
            simulated_collaborators(Duration::ZERO),
            config().with_content_per_day(3),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();

        // All cycles observe the cancelled token before their stagger delay
        runner.run(cancel).await;
    }

    #[tokio::test]
    async fn test_first_cycle_runs_without_stagger() {
        // Index zero gets a zero delay, so a single-item schedule finishes
        // without waiting on the stagger interval at all.
        let runner = AutomatedRunner::new(simulated_collaborators(Duration::ZERO), config());
        runner.run(CancellationToken::new()).await;
    }
}
