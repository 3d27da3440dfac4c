//! Pipeline run report types.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Names of the pipeline stages, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    /// Fetch the entity state snapshot
    #[display("snapshot")]
    Snapshot,
    /// Discover timezone and display name from the home zone
    #[display("resolve_location")]
    ResolveLocation,
    /// Parse and resolve the entity configuration
    #[display("resolve_context")]
    ResolveContext,
    /// Compose the prompt and call the text-generation service
    #[display("generate_prompt")]
    GeneratePrompt,
    /// Call the image-generation service and persist the image
    #[display("generate_image")]
    GenerateImage,
    /// Archive the image and embed run metadata
    #[display("archive")]
    Archive,
    /// Resize the image to the display resolution
    #[display("resize")]
    Resize,
    /// Encode the looping display video
    #[display("encode_video")]
    EncodeVideo,
}

/// Outcome of a single pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Whether the stage succeeded
    pub success: bool,
    /// Wall-clock time the stage took, in seconds
    pub elapsed_seconds: f64,
    /// Stage-specific payload (paths, counts, resolution, ...)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
    /// Captured error message for failed or degraded stages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    /// A successful step with a payload.
    pub fn ok(elapsed_seconds: f64, payload: serde_json::Value) -> Self {
        Self {
            success: true,
            elapsed_seconds,
            payload,
            error: None,
        }
    }

    /// A failed step carrying its error message.
    pub fn failed(elapsed_seconds: f64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed_seconds,
            payload: serde_json::Value::Null,
            error: Some(error.into()),
        }
    }
}

/// File artifacts produced over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifacts {
    /// The generated image prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Working image path (possibly resized)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    /// Timestamped archive path of the original image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<PathBuf>,
    /// Encoded video path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,
}

/// Mutable record of one pipeline run, owned by the orchestrator for the
/// run's lifetime and discarded (or fired as the completion event) at the
/// end. Never shared across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Unique run id
    pub id: Uuid,
    /// When the run started
    pub timestamp: DateTime<Utc>,
    /// True iff image generation succeeded
    pub success: bool,
    /// Per-stage outcomes in execution order
    pub steps: IndexMap<String, StepResult>,
    /// File artifacts produced so far
    pub artifacts: Artifacts,
    /// Fatal error message, if the run aborted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Total wall-clock time, filled at run end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_seconds: Option<f64>,
}

impl PipelineRun {
    /// Start a new run record.
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            success: false,
            steps: IndexMap::new(),
            artifacts: Artifacts::default(),
            error: None,
            total_seconds: None,
        }
    }

    /// Record the outcome of a stage.
    pub fn record(&mut self, step: StepName, result: StepResult) {
        self.steps.insert(step.to_string(), result);
    }

    /// Mark the run as fatally failed.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.success = false;
        self.error = Some(error.into());
    }

    /// Look up a recorded step by name.
    pub fn step(&self, step: StepName) -> Option<&StepResult> {
        self.steps.get(&step.to_string())
    }

    /// Serialize the run report for the completion event.
    pub fn to_report(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "success": false }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_steps_in_order() {
        let mut run = PipelineRun::start();
        run.record(StepName::Snapshot, StepResult::ok(0.1, serde_json::json!({"count": 3})));
        run.record(StepName::ResolveContext, StepResult::ok(0.0, serde_json::Value::Null));
        let names: Vec<_> = run.steps.keys().map(String::as_str).collect();
        assert_eq!(names, ["snapshot", "resolve_context"]);
    }

    #[test]
    fn run_report_round_trips_with_id() {
        let mut run = PipelineRun::start();
        run.record(StepName::GenerateImage, StepResult::ok(1.5, serde_json::json!({"bytes": 42})));
        run.success = true;

        let report = run.to_report();
        assert_eq!(report["id"], serde_json::json!(run.id.to_string()));
        assert_eq!(report["success"], serde_json::json!(true));

        let parsed: PipelineRun = serde_json::from_value(report).unwrap();
        assert_eq!(parsed.id, run.id);
        assert!(parsed.step(StepName::GenerateImage).unwrap().success);
    }

    #[test]
    fn fatal_failure_captures_message() {
        let mut run = PipelineRun::start();
        run.fail("Image generation failed: 500");
        assert!(!run.success);
        assert_eq!(run.error.as_deref(), Some("Image generation failed: 500"));
    }
}
