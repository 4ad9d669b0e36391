//! Simulated Collaborators
//!
//! Deterministic in-process stand-ins for the external generation services.
//! Each one sleeps for a configurable latency and returns a canned result,
//! which is enough to exercise the full runner path without network access.
//! [`FailingStage`] injects a failure into any slot for error-path testing.

use std::time::Duration;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::sleep;

use super::{
    AnalyticsTracker, AvatarGenerator, CollaboratorError, Collaborators, LyricGenerator,
    MusicGenerator, NicheAnalyzer, Publisher, TrendScan, TrendScanner, VideoAssembler,
};

/// Builds a complete simulated collaborator set with uniform latency.
pub fn simulated_collaborators(latency: Duration) -> Collaborators {
    Collaborators {
        trends: Arc::new(SimulatedTrendScanner {
            latency,
            result: TrendScan {
                trends_found: 12,
                niches_analyzed: 5,
            },
        }),
        niches: Arc::new(SimulatedNicheAnalyzer {
            latency,
            refreshed: 5,
        }),
        lyrics: Arc::new(SimulatedStage { latency }),
        music: Arc::new(SimulatedStage { latency }),
        avatar: Arc::new(SimulatedStage { latency }),
        video: Arc::new(SimulatedStage { latency }),
        publisher: Arc::new(SimulatedStage { latency }),
        analytics: Arc::new(SimulatedStage { latency }),
    }
}

/// Trend scanner returning a fixed scan result.
pub struct SimulatedTrendScanner {
    pub latency: Duration,
    pub result: TrendScan,
}

#[async_trait]
impl TrendScanner for SimulatedTrendScanner {
    async fn scan(&self) -> Result<TrendScan, CollaboratorError> {
        sleep(self.latency).await;
        Ok(self.result)
    }
}

/// Niche analyzer reporting a fixed refresh count.
pub struct SimulatedNicheAnalyzer {
    pub latency: Duration,
    pub refreshed: usize,
}

#[async_trait]
impl NicheAnalyzer for SimulatedNicheAnalyzer {
    async fn refresh(&self) -> Result<usize, CollaboratorError> {
        sleep(self.latency).await;
        Ok(self.refreshed)
    }
}

/// One simulated generation stage, usable in any generator slot.
pub struct SimulatedStage {
    pub latency: Duration,
}

#[async_trait]
impl LyricGenerator for SimulatedStage {
    async fn generate(&self, theme: &str) -> Result<String, CollaboratorError> {
        sleep(self.latency).await;
        Ok(format!("[verse about {}]", theme))
    }
}

#[async_trait]
impl MusicGenerator for SimulatedStage {
    async fn generate(&self, _lyrics: &str, style: &str) -> Result<String, CollaboratorError> {
        sleep(self.latency).await;
        Ok(format!("https://cdn.example.com/music/{}.mp3", slug(style)))
    }
}

#[async_trait]
impl AvatarGenerator for SimulatedStage {
    async fn generate(&self, style: &str) -> Result<String, CollaboratorError> {
        sleep(self.latency).await;
        Ok(format!("https://cdn.example.com/avatar/{}.mp4", slug(style)))
    }
}

#[async_trait]
impl VideoAssembler for SimulatedStage {
    async fn assemble(
        &self,
        _music_url: &str,
        _avatar_url: &str,
    ) -> Result<String, CollaboratorError> {
        sleep(self.latency).await;
        Ok("https://cdn.example.com/video/final.mp4".to_string())
    }
}

#[async_trait]
impl Publisher for SimulatedStage {
    async fn publish(
        &self,
        _video_url: &str,
        platforms: &[String],
    ) -> Result<(), CollaboratorError> {
        sleep(self.latency).await;
        if platforms.is_empty() {
            return Err(CollaboratorError::new("no platforms to publish to"));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsTracker for SimulatedStage {
    async fn setup(&self, _content_id: &str) -> Result<(), CollaboratorError> {
        sleep(self.latency).await;
        Ok(())
    }
}

/// A collaborator that always fails with a fixed message, for any slot.
pub struct FailingStage {
    pub message: String,
}

impl FailingStage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn err(&self) -> CollaboratorError {
        CollaboratorError::new(self.message.clone())
    }
}

#[async_trait]
impl TrendScanner for FailingStage {
    async fn scan(&self) -> Result<TrendScan, CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl NicheAnalyzer for FailingStage {
    async fn refresh(&self) -> Result<usize, CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl LyricGenerator for FailingStage {
    async fn generate(&self, _theme: &str) -> Result<String, CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl MusicGenerator for FailingStage {
    async fn generate(&self, _lyrics: &str, _style: &str) -> Result<String, CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl AvatarGenerator for FailingStage {
    async fn generate(&self, _style: &str) -> Result<String, CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl VideoAssembler for FailingStage {
    async fn assemble(
        &self,
        _music_url: &str,
        _avatar_url: &str,
    ) -> Result<String, CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl Publisher for FailingStage {
    async fn publish(
        &self,
        _video_url: &str,
        _platforms: &[String],
    ) -> Result<(), CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl AnalyticsTracker for FailingStage {
    async fn setup(&self, _content_id: &str) -> Result<(), CollaboratorError> {
        Err(self.err())
    }
}

fn slug(text: &str) -> String {
    text.to_lowercase().replace(char::is_whitespace, "-")
}
