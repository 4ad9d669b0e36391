//! Step Catalog
//!
//! The fixed, ordered template of pipeline stages every workflow is created
//! from. The catalog is immutable; workflows copy it at creation time and
//! again on `restart`.

use super::model::{StepStatus, WorkflowStep};

/// A single entry in the step catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTemplate {
    /// Stable string key, unique within the catalog
    pub id: &'static str,

    /// Human-readable display name
    pub name: &'static str,

    /// One-line description shown alongside the step
    pub description: &'static str,
}

/// Number of stages in the content pipeline.
pub const STEP_COUNT: usize = 9;

/// The ordered pipeline template. Order is load-bearing: step activation
/// walks this sequence front to back.
pub const STEP_CATALOG: [StepTemplate; STEP_COUNT] = [
    StepTemplate {
        id: "market-analysis",
        name: "Market Analysis",
        description: "Scanning trends and analyzing market opportunities",
    },
    StepTemplate {
        id: "niche-selection",
        name: "Niche Selection",
        description: "Selecting optimal niches based on analysis",
    },
    StepTemplate {
        id: "content-planning",
        name: "Content Planning",
        description: "Planning content themes and structure",
    },
    StepTemplate {
        id: "lyric-generation",
        name: "Lyric Generation",
        description: "Generating AI-powered lyrics",
    },
    StepTemplate {
        id: "music-generation",
        name: "Music Generation",
        description: "Creating background music with AI",
    },
    StepTemplate {
        id: "avatar-creation",
        name: "Avatar Creation",
        description: "Generating AI avatar presenter",
    },
    StepTemplate {
        id: "video-assembly",
        name: "Video Assembly",
        description: "Combining all elements into final video",
    },
    StepTemplate {
        id: "publishing",
        name: "Publishing",
        description: "Publishing to selected platforms",
    },
    StepTemplate {
        id: "analytics-tracking",
        name: "Analytics Setup",
        description: "Setting up performance tracking",
    },
];

/// Builds a fresh step list from the catalog: every step `pending`,
/// progress zero, no timestamps or payloads.
pub fn catalog_steps() -> Vec<WorkflowStep> {
    STEP_CATALOG
        .iter()
        .map(|template| WorkflowStep {
            id: template.id.to_string(),
            name: template.name.to_string(),
            description: template.description.to_string(),
            status: StepStatus::Pending,
            progress: 0,
            start_time: None,
            end_time: None,
            error: None,
            data: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_nine_steps() {
        assert_eq!(STEP_CATALOG.len(), 9);
        assert_eq!(catalog_steps().len(), STEP_COUNT);
    }

    #[test]
    fn test_catalog_step_order() {
        let ids: Vec<&str> = STEP_CATALOG.iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                "market-analysis",
                "niche-selection",
                "content-planning",
                "lyric-generation",
                "music-generation",
                "avatar-creation",
                "video-assembly",
                "publishing",
                "analytics-tracking",
            ]
        );
    }

    #[test]
    fn test_catalog_ids_unique() {
        for (i, a) in STEP_CATALOG.iter().enumerate() {
            for b in STEP_CATALOG.iter().skip(i + 1) {
                assert_ne!(a.id, b.id, "duplicate step id in catalog");
            }
        }
    }

    #[test]
    fn test_catalog_steps_start_pending() {
        for step in catalog_steps() {
            assert_eq!(step.status, StepStatus::Pending);
            assert_eq!(step.progress, 0);
            assert!(step.start_time.is_none());
            assert!(step.end_time.is_none());
            assert!(step.error.is_none());
            assert!(step.data.is_none());
        }
    }

    #[test]
    fn test_catalog_steps_carry_display_metadata() {
        let steps = catalog_steps();
        assert_eq!(steps[0].name, "Market Analysis");
        assert_eq!(steps[8].name, "Analytics Setup");
        assert!(!steps[3].description.is_empty());
    }
}
