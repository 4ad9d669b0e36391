//! Generation Collaborators
//!
//! Boundary contracts for the external services the runners invoke: trend
//! scanning, AI content generation, publishing, and analytics setup. Each
//! collaborator is an opaque asynchronous call that returns a result or
//! fails with a human-readable message; this crate consumes the contracts
//! but does not implement the services behind them.
//!
//! [`simulated`] provides deterministic in-process implementations used by
//! the demo binary and the test suite.

pub mod simulated;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by any collaborator call.
///
/// Carries only a display message; the runner converts it into a
/// `fail_step` mutation rather than propagating it further.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CollaboratorError {
    pub message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of a market trend scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendScan {
    /// Number of trends discovered in the scan
    pub trends_found: usize,

    /// Number of niches analyzed against those trends
    pub niches_analyzed: usize,
}

/// Scans market trends.
#[async_trait]
pub trait TrendScanner: Send + Sync {
    async fn scan(&self) -> Result<TrendScan, CollaboratorError>;
}

/// Refreshes niche analysis data, returning the number of niches refreshed.
#[async_trait]
pub trait NicheAnalyzer: Send + Sync {
    async fn refresh(&self) -> Result<usize, CollaboratorError>;
}

/// Generates lyrics for a theme.
#[async_trait]
pub trait LyricGenerator: Send + Sync {
    async fn generate(&self, theme: &str) -> Result<String, CollaboratorError>;
}

/// Generates a backing track for lyrics in a given style.
#[async_trait]
pub trait MusicGenerator: Send + Sync {
    async fn generate(&self, lyrics: &str, style: &str) -> Result<String, CollaboratorError>;
}

/// Generates an avatar presenter.
#[async_trait]
pub trait AvatarGenerator: Send + Sync {
    async fn generate(&self, style: &str) -> Result<String, CollaboratorError>;
}

/// Assembles music and avatar into a final video.
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    async fn assemble(
        &self,
        music_url: &str,
        avatar_url: &str,
    ) -> Result<String, CollaboratorError>;
}

/// Publishes a finished video to the selected platforms.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, video_url: &str, platforms: &[String])
        -> Result<(), CollaboratorError>;
}

/// Sets up performance tracking for a published piece of content.
#[async_trait]
pub trait AnalyticsTracker: Send + Sync {
    async fn setup(&self, content_id: &str) -> Result<(), CollaboratorError>;
}

/// The full set of collaborators a runner needs, bundled for injection.
#[derive(Clone)]
pub struct Collaborators {
    pub trends: Arc<dyn TrendScanner>,
    pub niches: Arc<dyn NicheAnalyzer>,
    pub lyrics: Arc<dyn LyricGenerator>,
    pub music: Arc<dyn MusicGenerator>,
    pub avatar: Arc<dyn AvatarGenerator>,
    pub video: Arc<dyn VideoAssembler>,
    pub publisher: Arc<dyn Publisher>,
    pub analytics: Arc<dyn AnalyticsTracker>,
}
