//! Workflow Execution Module
//!
//! Background runners that advance workflows by invoking the generation
//! collaborators, and the engine that spawns, tracks, and cancels them.
//!
//! # Architecture
//!
//! - [`engine`]: Engine facade owning the store and live runner handles
//! - [`interactive`]: Guided single pass through all nine steps
//! - [`automated`]: Staggered fire-and-forget scheduling loop
//! - [`config`]: Run configuration and validation

pub mod automated;
pub mod config;
pub mod engine;
pub mod interactive;

pub use automated::{AutomatedRunner, CYCLE_STAGGER};
pub use config::{NicheStrategy, PipelineConfig, DEFAULT_CONTENT_PER_DAY};
pub use engine::Engine;
pub use interactive::InteractiveRunner;
