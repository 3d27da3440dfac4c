//! The fixed-order pipeline orchestrator.
//!
//! Stage severity is asymmetric on purpose: text and image generation are
//! fatal (nothing to display without them), while every stage after a
//! successful image render is best-effort, so the display always gets some
//! artifact once the expensive generation step has paid off.

use crate::{compose, resolve_location};
use fresco_client::{
    EventSink, ImageGenerator, ImageRequest, PromptGenerator, PromptRequest, PromptResponse,
    StateSource,
};
use fresco_core::{Config, PipelineRun, StateSnapshot, StepName, StepResult};
use fresco_error::{PipelineError, PipelineErrorKind};
use fresco_media::{embed_metadata, encode_video, relocate, resize_image, EncodeSettings, ImageMetadata};
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

const EVENT_IMAGE_COMPLETE: &str = "fresco_image_complete";
const EVENT_VIDEO_COMPLETE: &str = "fresco_video_complete";
const EVENT_COMPLETE: &str = "fresco_complete";

/// A direct image request from the input channel, bypassing the snapshot
/// and text-generation stages.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct DirectImageRequest {
    /// The image prompt, verbatim
    #[serde(default)]
    pub prompt: Option<String>,
    /// Path of a file to read the prompt from when `prompt` is absent
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
    /// Working filename override
    #[serde(default)]
    pub filename: Option<String>,
    /// Image model override
    #[serde(default)]
    pub model: Option<String>,
    /// Quality tier override
    #[serde(default)]
    pub quality: Option<String>,
    /// Size override as `WIDTHxHEIGHT`
    #[serde(default)]
    pub size: Option<String>,
}

/// Per-run file layout under the output directory.
#[derive(Debug, Clone)]
struct RunPaths {
    /// Temporary path the raw generated image lands on
    temp: PathBuf,
    /// Fixed working-image path used for display and video encoding
    working: PathBuf,
    /// Dated archive path of the original image
    archive: PathBuf,
    /// Encoded video path
    video: PathBuf,
}

/// The single-flight display pipeline.
///
/// Owns the stage sequence and the fatal/best-effort severity policy; all
/// remote collaborators sit behind trait seams so runs can be exercised
/// with mock services.
pub struct Pipeline<S, E, P, I> {
    states: S,
    events: E,
    text: P,
    image: I,
    config: Config,
}

impl<S, E, P, I> Pipeline<S, E, P, I>
where
    S: StateSource,
    E: EventSink,
    P: PromptGenerator,
    I: ImageGenerator,
{
    /// Assemble a pipeline from its collaborators and configuration.
    pub fn new(states: S, events: E, text: P, image: I, config: Config) -> Self {
        Self {
            states,
            events,
            text,
            image,
            config,
        }
    }

    /// The worker configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline: snapshot, context resolution, prompt and image
    /// generation, post-processing, notification.
    #[instrument(skip(self))]
    pub async fn run_generate(&self) -> PipelineRun {
        let mut run = PipelineRun::start();
        let run_started = Instant::now();
        info!(run_id = %run.id, "starting display pipeline");

        // Stage 1: snapshot. Degraded on failure, never fatal.
        let snapshot = self.fetch_snapshot(&mut run).await;

        // Stage 2: home zone location. Never fatal.
        let start = Instant::now();
        let location = resolve_location(&snapshot, &self.config.default_timezone);
        run.record(
            StepName::ResolveLocation,
            StepResult::ok(
                start.elapsed().as_secs_f64(),
                json!({"timezone": location.timezone, "name": location.name}),
            ),
        );

        // Stage 3: resolve the entity configuration. Never fatal.
        let start = Instant::now();
        let parsed = fresco_template::parse_entity_config(&self.config.entity_config);
        let resolved = fresco_template::resolve(&snapshot, &parsed.tokens);
        let context = fresco_template::flatten(&resolved);
        run.record(
            StepName::ResolveContext,
            StepResult::ok(
                start.elapsed().as_secs_f64(),
                json!({
                    "token_count": parsed.tokens.len(),
                    "entry_count": context.len(),
                    "diagnostics": parsed.diagnostics,
                }),
            ),
        );

        // Stage 4: compose + text generation. Fatal when both modes fail.
        let composed = compose(&self.config, &context, &location);
        let request = PromptRequest {
            system_prompt: composed.system,
            user_prompt: composed.user,
            location: Some(location.to_hint()),
        };
        let response = match self.generate_prompt(&mut run, &request).await {
            Some(response) => response,
            None => {
                run.total_seconds = Some(run_started.elapsed().as_secs_f64());
                error!(run_id = %run.id, "pipeline aborted: prompt generation failed");
                return run;
            }
        };
        let prompt = response.text;
        run.artifacts.prompt = Some(prompt.clone());

        // Stage 5: image generation. Fatal on failure.
        let timestamp = run.timestamp.format("%Y%m%d%H%M").to_string();
        let paths = self.run_paths(&timestamp, None);
        let image_request = ImageRequest {
            prompt: prompt.clone(),
            model: self.config.image_model.clone(),
            size: self.config.image_size.clone(),
            quality: self.config.image_quality.clone(),
        };
        if !self.generate_image(&mut run, &image_request, &paths).await {
            run.total_seconds = Some(run_started.elapsed().as_secs_f64());
            error!(run_id = %run.id, "pipeline aborted: image generation failed");
            return run;
        }
        run.success = true;

        // Stages 6-10: best-effort post-processing and notification.
        self.post_process(&mut run, &paths, &prompt).await;

        run.total_seconds = Some(run_started.elapsed().as_secs_f64());
        self.events.fire_event(EVENT_COMPLETE, &run.to_report()).await;
        info!(run_id = %run.id, total_seconds = run.total_seconds, "pipeline complete");
        run
    }

    /// Run image generation only, from a prompt supplied on the input line.
    #[instrument(skip(self, request))]
    pub async fn run_direct(&self, request: &DirectImageRequest) -> PipelineRun {
        let mut run = PipelineRun::start();
        let run_started = Instant::now();
        info!(run_id = %run.id, "starting direct image generation");

        let prompt = match self.direct_prompt(request).await {
            Ok(prompt) => prompt,
            Err(error) => {
                let message = error.to_string();
                run.record(StepName::GeneratePrompt, StepResult::failed(0.0, &message));
                run.fail(message);
                return run;
            }
        };
        run.record(
            StepName::GeneratePrompt,
            StepResult::ok(
                0.0,
                json!({
                    "mode": "direct",
                    "prompt_length": prompt.len(),
                    "prompt_preview": preview(&prompt),
                }),
            ),
        );
        run.artifacts.prompt = Some(prompt.clone());

        let timestamp = run.timestamp.format("%Y%m%d%H%M").to_string();
        let paths = self.run_paths(&timestamp, request.filename.as_deref());
        let image_request = ImageRequest {
            prompt: prompt.clone(),
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.image_model.clone()),
            size: request
                .size
                .clone()
                .unwrap_or_else(|| self.config.image_size.clone()),
            quality: request
                .quality
                .clone()
                .unwrap_or_else(|| self.config.image_quality.clone()),
        };
        if !self.generate_image(&mut run, &image_request, &paths).await {
            run.total_seconds = Some(run_started.elapsed().as_secs_f64());
            return run;
        }
        run.success = true;

        self.post_process(&mut run, &paths, &prompt).await;

        run.total_seconds = Some(run_started.elapsed().as_secs_f64());
        self.events.fire_event(EVENT_COMPLETE, &run.to_report()).await;
        run
    }

    async fn direct_prompt(
        &self,
        request: &DirectImageRequest,
    ) -> Result<String, PipelineError> {
        if let Some(prompt) = &request.prompt {
            return Ok(prompt.clone());
        }
        let path = request.prompt_file.as_ref().ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::PromptGeneration(
                "no prompt or prompt_file provided".into(),
            ))
        })?;
        let prompt = tokio::fs::read_to_string(path).await.map_err(|e| {
            PipelineError::new(PipelineErrorKind::PromptFile {
                path: path.to_string_lossy().into_owned(),
                message: e.to_string(),
            })
        })?;
        let prompt = prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::PromptGeneration(
                format!("prompt file is empty: {}", path.display()),
            )));
        }
        Ok(prompt)
    }

    async fn fetch_snapshot(&self, run: &mut PipelineRun) -> StateSnapshot {
        let start = Instant::now();
        match self.states.fetch_states().await {
            Ok(states) => {
                let snapshot = StateSnapshot::from_states(states);
                run.record(
                    StepName::Snapshot,
                    StepResult::ok(
                        start.elapsed().as_secs_f64(),
                        json!({"entity_count": snapshot.len()}),
                    ),
                );
                snapshot
            }
            Err(error) => {
                warn!(error = %error, "state fetch failed, proceeding with empty snapshot");
                run.record(
                    StepName::Snapshot,
                    StepResult::failed(start.elapsed().as_secs_f64(), error.to_string()),
                );
                StateSnapshot::empty()
            }
        }
    }

    /// Rich web-search mode first, transparent fallback to the basic mode.
    async fn generate_prompt(
        &self,
        run: &mut PipelineRun,
        request: &PromptRequest,
    ) -> Option<PromptResponse> {
        let start = Instant::now();
        let (response, mode) = match self.text.generate_with_search(request).await {
            Ok(response) => (Ok(response), "web_search"),
            Err(error) => {
                warn!(error = %error, "web-search request mode failed, falling back to basic mode");
                (self.text.generate_basic(request).await, "basic")
            }
        };
        match response {
            Ok(response) => {
                info!(
                    mode,
                    prompt_length = response.text.len(),
                    "generated image prompt"
                );
                run.record(
                    StepName::GeneratePrompt,
                    StepResult::ok(
                        start.elapsed().as_secs_f64(),
                        json!({
                            "mode": mode,
                            "model": self.text.model_name(),
                            "prompt_length": response.text.len(),
                            "prompt_preview": preview(&response.text),
                            "usage": response.usage,
                        }),
                    ),
                );
                Some(response)
            }
            Err(error) => {
                let message = format!("Prompt generation failed: {error}");
                run.record(
                    StepName::GeneratePrompt,
                    StepResult::failed(start.elapsed().as_secs_f64(), &message),
                );
                run.fail(message);
                None
            }
        }
    }

    /// Render and persist the image; true on success.
    async fn generate_image(
        &self,
        run: &mut PipelineRun,
        request: &ImageRequest,
        paths: &RunPaths,
    ) -> bool {
        let start = Instant::now();
        if let Err(error) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            let message = format!("Image generation failed: {error}");
            run.record(
                StepName::GenerateImage,
                StepResult::failed(start.elapsed().as_secs_f64(), &message),
            );
            run.fail(message);
            return false;
        }

        let written = match self.image.generate_image(request).await {
            Ok(bytes) => tokio::fs::write(&paths.temp, &bytes)
                .await
                .map(|_| bytes.len())
                .map_err(|e| format!("failed to write image: {e}")),
            Err(error) => Err(error.to_string()),
        };

        match written {
            Ok(byte_count) => {
                info!(path = %paths.temp.display(), byte_count, "image rendered");
                run.artifacts.image_path = Some(paths.temp.clone());
                run.record(
                    StepName::GenerateImage,
                    StepResult::ok(
                        start.elapsed().as_secs_f64(),
                        json!({
                            "path": paths.temp,
                            "byte_count": byte_count,
                            "model": request.model,
                            "size": request.size,
                            "quality": request.quality,
                        }),
                    ),
                );
                true
            }
            Err(message) => {
                let message = format!("Image generation failed: {message}");
                run.record(
                    StepName::GenerateImage,
                    StepResult::failed(start.elapsed().as_secs_f64(), &message),
                );
                run.fail(message);
                false
            }
        }
    }

    /// Stages 6-10: archive, resize, image event, video, cleanup.
    /// Everything here is best-effort; the run already counts as a success.
    async fn post_process(&self, run: &mut PipelineRun, paths: &RunPaths, prompt: &str) {
        if self.config.save_original {
            self.archive(run, paths, prompt).await;
        }
        self.resize(run, paths).await;

        self.events
            .fire_event(
                EVENT_IMAGE_COMPLETE,
                &json!({
                    "success": true,
                    "image_path": run.artifacts.image_path,
                    "archive_path": run.artifacts.archive_path,
                    "resolution": run
                        .step(StepName::Resize)
                        .filter(|step| step.success)
                        .and_then(|step| step.payload.get("resolution").cloned()),
                    "timestamp": run.timestamp,
                    "prompt_preview": preview(prompt),
                }),
            )
            .await;

        if self.config.enable_video {
            self.encode_video(run, paths).await;
        }

        // Cleanup any leftover temporary file.
        if run.artifacts.image_path.as_deref() != Some(paths.temp.as_path())
            && paths.temp.exists()
        {
            let _ = tokio::fs::remove_file(&paths.temp).await;
        }
    }

    /// Move the original into the dated archive, embed run metadata, and
    /// copy the file back to the working temp path either way.
    async fn archive(&self, run: &mut PipelineRun, paths: &RunPaths, prompt: &str) {
        let start = Instant::now();
        match relocate(&paths.temp, &paths.archive).await {
            Ok(()) => {
                let metadata = ImageMetadata {
                    prompt: prompt.to_string(),
                    prompt_model: self.config.prompt_model.clone(),
                    image_model: self.config.image_model.clone(),
                    timestamp: run.timestamp,
                    size: self.config.image_size.clone(),
                    quality: self.config.image_quality.clone(),
                };
                let embed_error = match embed_metadata(&paths.archive, &metadata).await {
                    Ok(()) => None,
                    Err(error) => {
                        warn!(error = %error, "metadata embedding failed, archiving un-annotated");
                        Some(error.to_string())
                    }
                };
                if let Err(error) = tokio::fs::copy(&paths.archive, &paths.temp).await {
                    warn!(error = %error, "failed to restore working copy from archive");
                }
                run.artifacts.archive_path = Some(paths.archive.clone());
                run.record(
                    StepName::Archive,
                    StepResult::ok(
                        start.elapsed().as_secs_f64(),
                        json!({"archive_path": paths.archive, "embed_error": embed_error}),
                    ),
                );
            }
            Err(error) => {
                warn!(error = %error, "archiving failed, keeping working image in place");
                run.record(
                    StepName::Archive,
                    StepResult::failed(start.elapsed().as_secs_f64(), error.to_string()),
                );
            }
        }
    }

    /// Scale to the display resolution, or fall back to relocating the
    /// un-resized image to the working path.
    async fn resize(&self, run: &mut PipelineRun, paths: &RunPaths) {
        if !self.config.resize_output {
            if relocate(&paths.temp, &paths.working).await.is_ok() {
                run.artifacts.image_path = Some(paths.working.clone());
            }
            return;
        }

        let start = Instant::now();
        match resize_image(&paths.temp, &paths.working, &self.config.target_resolution).await {
            Ok((width, height)) => {
                run.artifacts.image_path = Some(paths.working.clone());
                run.record(
                    StepName::Resize,
                    StepResult::ok(
                        start.elapsed().as_secs_f64(),
                        json!({"resolution": format!("{width}x{height}"), "path": paths.working}),
                    ),
                );
            }
            Err(error) => {
                warn!(error = %error, "resize failed, relocating un-resized image");
                match relocate(&paths.temp, &paths.working).await {
                    Ok(()) => run.artifacts.image_path = Some(paths.working.clone()),
                    Err(relocate_error) => {
                        warn!(error = %relocate_error, "relocation failed, keeping temp image");
                    }
                }
                run.record(
                    StepName::Resize,
                    StepResult::failed(start.elapsed().as_secs_f64(), error.to_string()),
                );
            }
        }
    }

    async fn encode_video(&self, run: &mut PipelineRun, paths: &RunPaths) {
        let start = Instant::now();
        let source = run
            .artifacts
            .image_path
            .clone()
            .unwrap_or_else(|| paths.temp.clone());
        let settings = EncodeSettings {
            duration: self.config.video_duration,
            framerate: self.config.video_framerate.clone(),
            use_default_args: self.config.use_default_encode_args,
            custom_args: self.config.custom_encode_args.clone(),
        };
        match encode_video(&source, &paths.video, &settings).await {
            Ok(()) => {
                run.artifacts.video_path = Some(paths.video.clone());
                run.record(
                    StepName::EncodeVideo,
                    StepResult::ok(
                        start.elapsed().as_secs_f64(),
                        json!({
                            "video_path": paths.video,
                            "duration": settings.duration,
                            "framerate": settings.framerate,
                        }),
                    ),
                );
                self.events
                    .fire_event(
                        EVENT_VIDEO_COMPLETE,
                        &json!({
                            "success": true,
                            "video_path": paths.video,
                            "duration": settings.duration,
                            "timestamp": run.timestamp,
                        }),
                    )
                    .await;
            }
            Err(error) => {
                warn!(error = %error, "video encoding failed, image run still succeeds");
                run.record(
                    StepName::EncodeVideo,
                    StepResult::failed(start.elapsed().as_secs_f64(), error.to_string()),
                );
            }
        }
    }

    fn run_paths(&self, timestamp: &str, filename: Option<&str>) -> RunPaths {
        let dir = &self.config.output_dir;
        let prefix = &self.config.filename_prefix;
        match filename {
            Some(filename) => RunPaths {
                temp: dir.join(format!("{prefix}_tmp.png")),
                working: dir.join(filename),
                archive: dir.join(format!("{timestamp}-{filename}")),
                video: dir.join(format!("{prefix}_{timestamp}.mp4")),
            },
            None => RunPaths {
                temp: dir.join(format!("{prefix}_tmp.png")),
                working: dir.join(format!("{prefix}.png")),
                archive: dir.join(format!("{prefix}_{timestamp}_original.png")),
                video: dir.join(format!("{prefix}_{timestamp}.mp4")),
            },
        }
    }
}

/// First 100 characters of the prompt, for logs and event payloads.
fn preview(prompt: &str) -> String {
    prompt.chars().take(100).collect()
}
