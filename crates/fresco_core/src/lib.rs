//! Core data types for the Fresco display pipeline.
//!
//! This crate provides the run-scoped data model (state snapshot, config
//! tokens, resolved context, pipeline run report) and the typed configuration
//! struct populated once at startup from the environment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod run;
mod snapshot;
mod token;

pub use config::{Config, EntityConfig, RESOLUTION_PRESETS, parse_resolution};
pub use context::{PromptContext, ResolvedContext, ResolvedEntry};
pub use run::{Artifacts, PipelineRun, StepName, StepResult};
pub use snapshot::{EntityState, StateSnapshot};
pub use token::ConfigToken;
