//! Pipeline Configuration
//!
//! Caller-supplied configuration for interactive and automated runs:
//! target platforms, daily content volume, and the niche-selection
//! strategy. Validation happens synchronously before a workflow is
//! created, so a bad configuration never enters the registry.

use serde::{Deserialize, Serialize};

use crate::workflow::WorkflowError;

/// Content items produced per day when the caller does not specify.
pub const DEFAULT_CONTENT_PER_DAY: usize = 1;

/// Built-in niche pool for the `trending` strategy.
const TRENDING_NICHES: &[&str] = &["lofi study beats", "ai music reaction", "sleep soundscapes"];

/// Built-in niche pool for the `emerging` strategy.
const EMERGING_NICHES: &[&str] = &["vr concert recaps", "ai duet covers", "microgenre mashups"];

/// Built-in niche pool for the `stable` strategy.
const STABLE_NICHES: &[&str] = &["workout motivation", "focus piano", "rain ambience"];

/// How candidate niches are chosen for a run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NicheStrategy {
    #[default]
    Trending,
    Emerging,
    Stable,
    /// Use the caller-supplied `customNiches` list verbatim.
    Custom,
}

/// Configuration for one pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Platforms to publish finished content to; must not be empty
    pub platforms: Vec<String>,

    /// Number of content items to produce per run
    #[serde(default = "default_content_per_day")]
    pub content_per_day: usize,

    /// Niche selection strategy
    #[serde(default)]
    pub niche_selection: NicheStrategy,

    /// Niche list used by the `custom` strategy
    #[serde(default)]
    pub custom_niches: Vec<String>,
}

fn default_content_per_day() -> usize {
    DEFAULT_CONTENT_PER_DAY
}

impl PipelineConfig {
    /// Creates a configuration targeting the given platforms with defaults
    /// for everything else.
    pub fn new(platforms: Vec<String>) -> Self {
        Self {
            platforms,
            content_per_day: DEFAULT_CONTENT_PER_DAY,
            niche_selection: NicheStrategy::default(),
            custom_niches: Vec::new(),
        }
    }

    /// Sets the number of content items per run.
    pub fn with_content_per_day(mut self, count: usize) -> Self {
        self.content_per_day = count;
        self
    }

    /// Sets the niche selection strategy.
    pub fn with_strategy(mut self, strategy: NicheStrategy) -> Self {
        self.niche_selection = strategy;
        self
    }

    /// Sets the custom niche list and switches to the `custom` strategy.
    pub fn with_custom_niches(mut self, niches: Vec<String>) -> Self {
        self.custom_niches = niches;
        self.niche_selection = NicheStrategy::Custom;
        self
    }

    /// Validates the configuration.
    ///
    /// Raised synchronously to the caller before any workflow record is
    /// created.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.platforms.is_empty() {
            return Err(WorkflowError::Validation(
                "at least one target platform is required".to_string(),
            ));
        }
        if self.content_per_day == 0 {
            return Err(WorkflowError::Validation(
                "contentPerDay must be at least 1".to_string(),
            ));
        }
        if self.niche_selection == NicheStrategy::Custom && self.custom_niches.is_empty() {
            return Err(WorkflowError::Validation(
                "custom niche selection requires a customNiches list".to_string(),
            ));
        }
        Ok(())
    }

    /// Selects the candidate niches for this run: one per content item,
    /// cycling through the strategy's pool when the volume exceeds it.
    pub fn select_niches(&self) -> Vec<String> {
        let pool: Vec<String> = match self.niche_selection {
            NicheStrategy::Trending => to_owned(TRENDING_NICHES),
            NicheStrategy::Emerging => to_owned(EMERGING_NICHES),
            NicheStrategy::Stable => to_owned(STABLE_NICHES),
            NicheStrategy::Custom => self.custom_niches.clone(),
        };

        if pool.is_empty() {
            return Vec::new();
        }
        pool.iter().cycle().take(self.content_per_day).cloned().collect()
    }
}

fn to_owned(pool: &[&str]) -> Vec<String> {
    pool.iter().map(|s| s.to_string()).collect()
}
