//! Typed configuration, populated once at startup from the environment.

use fresco_error::{ConfigError, FrescoResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Named 16:9 resolution presets accepted by `TARGET_RESOLUTION`.
pub const RESOLUTION_PRESETS: &[(&str, (u32, u32))] = &[
    ("4k", (3840, 2160)),
    ("1080p", (1920, 1080)),
    ("720p", (1280, 720)),
    ("480p", (854, 480)),
];

/// Interpret a target resolution: a preset name or a literal `WIDTHxHEIGHT`.
///
/// # Examples
///
/// ```
/// use fresco_core::parse_resolution;
///
/// assert_eq!(parse_resolution("1080p").unwrap(), (1920, 1080));
/// assert_eq!(parse_resolution("800x600").unwrap(), (800, 600));
/// assert!(parse_resolution("tall").is_err());
/// ```
pub fn parse_resolution(resolution: &str) -> FrescoResult<(u32, u32)> {
    if let Some((_, dims)) = RESOLUTION_PRESETS
        .iter()
        .find(|(name, _)| *name == resolution)
    {
        return Ok(*dims);
    }
    let (width, height) = resolution
        .split_once('x')
        .ok_or_else(|| ConfigError::new(format!("Invalid resolution: {resolution}")))?;
    let width = width
        .trim()
        .parse()
        .map_err(|_| ConfigError::new(format!("Invalid resolution width: {resolution}")))?;
    let height = height
        .trim()
        .parse()
        .map_err(|_| ConfigError::new(format!("Invalid resolution height: {resolution}")))?;
    Ok((width, height))
}

/// Raw entity-id configuration: either an already-structured list or a
/// free-form string mixing identifiers with embedded template expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityConfig {
    /// A structured ordered list of fragments
    List(Vec<String>),
    /// A single free-form string
    Raw(String),
}

impl EntityConfig {
    /// Decode an environment value: a JSON array of strings, or anything
    /// else taken verbatim as free-form text.
    pub fn decode(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
                return Self::List(list);
            }
        }
        Self::Raw(raw.to_string())
    }

    /// Whether no entity configuration was provided.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(list) => list.iter().all(|s| s.trim().is_empty()),
            Self::Raw(raw) => raw.trim().is_empty(),
        }
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self::Raw(String::new())
    }
}

/// Complete worker configuration with documented defaults.
///
/// Loaded once at startup and passed by reference into the components that
/// need it; no component reads ambient environment state mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key for the generation services (`OPENAI_API_KEY`); absent key
    /// logs a startup warning and fails generation calls at run time
    pub api_key: Option<String>,
    /// Text-generation model (`PROMPT_MODEL`, default `gpt-4o`)
    pub prompt_model: String,
    /// Image-generation model (`IMAGE_MODEL`, default `gpt-image-1.5`)
    pub image_model: String,
    /// Monitored entity ids and templates (`ENTITY_IDS`)
    pub entity_config: EntityConfig,
    /// Use the built-in prompts instead of the custom ones
    /// (`USE_DEFAULT_PROMPTS`, default true)
    pub use_default_prompts: bool,
    /// Operator-supplied system prompt (`CUSTOM_SYSTEM_PROMPT`)
    pub custom_system_prompt: String,
    /// Operator-supplied user prompt template (`CUSTOM_USER_PROMPT`)
    pub custom_user_prompt: String,
    /// Auxiliary web-search topics (`SEARCH_TOPICS`, JSON array or
    /// comma-delimited)
    pub search_topics: Vec<String>,
    /// Image quality tier (`IMAGE_QUALITY`, default `high`)
    pub image_quality: String,
    /// Generated image size as `WIDTHxHEIGHT` (`IMAGE_SIZE`, default
    /// `1536x1024`)
    pub image_size: String,
    /// Resize the generated image for the display (`RESIZE_OUTPUT`, default
    /// true)
    pub resize_output: bool,
    /// Resize target: preset name or `WIDTHxHEIGHT` (`TARGET_RESOLUTION`,
    /// default `1080p`)
    pub target_resolution: String,
    /// Archive the original image with embedded metadata (`SAVE_ORIGINAL`,
    /// default true)
    pub save_original: bool,
    /// Encode a looping display video (`ENABLE_VIDEO`, default true)
    pub enable_video: bool,
    /// Video duration in seconds (`VIDEO_DURATION`, default 1800)
    pub video_duration: u64,
    /// Input frame rate for the still-image loop (`VIDEO_FRAMERATE`, default
    /// `0.25`)
    pub video_framerate: String,
    /// Use the built-in encoder argument list (`USE_DEFAULT_FFMPEG`, default
    /// true)
    pub use_default_encode_args: bool,
    /// Raw operator-supplied encoder arguments (`CUSTOM_FFMPEG_ARGS`)
    pub custom_encode_args: String,
    /// Output directory for images and videos (`OUTPUT_DIR`, default
    /// `/media/generated`)
    pub output_dir: PathBuf,
    /// Output filename prefix (`FILENAME_PREFIX`, default `hud_display`)
    pub filename_prefix: String,
    /// Supervisor API bearer token (`SUPERVISOR_TOKEN`); absent token logs
    /// a startup warning and disables state fetches and events
    pub supervisor_token: Option<String>,
    /// Supervisor API base URL (`SUPERVISOR_API`, default
    /// `http://supervisor/core/api`)
    pub supervisor_api: String,
    /// Timezone used for localized search when no home zone is found
    /// (`DEFAULT_TIMEZONE`, default `America/Phoenix`)
    pub default_timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            prompt_model: "gpt-4o".to_string(),
            image_model: "gpt-image-1.5".to_string(),
            entity_config: EntityConfig::default(),
            use_default_prompts: true,
            custom_system_prompt: String::new(),
            custom_user_prompt: String::new(),
            search_topics: Vec::new(),
            image_quality: "high".to_string(),
            image_size: "1536x1024".to_string(),
            resize_output: true,
            target_resolution: "1080p".to_string(),
            save_original: true,
            enable_video: true,
            video_duration: 1800,
            video_framerate: "0.25".to_string(),
            use_default_encode_args: true,
            custom_encode_args: String::new(),
            output_dir: PathBuf::from("/media/generated"),
            filename_prefix: "hud_display".to_string(),
            supervisor_token: None,
            supervisor_api: "http://supervisor/core/api".to_string(),
            default_timezone: "America/Phoenix".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error only for values that cannot be interpreted (e.g. a
    /// non-numeric `VIDEO_DURATION`); missing values fall back to defaults.
    pub fn from_env() -> FrescoResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_key: env_opt("OPENAI_API_KEY"),
            prompt_model: env_or("PROMPT_MODEL", &defaults.prompt_model),
            image_model: env_or("IMAGE_MODEL", &defaults.image_model),
            entity_config: env_opt("ENTITY_IDS")
                .map(|raw| EntityConfig::decode(&raw))
                .unwrap_or_default(),
            use_default_prompts: env_bool("USE_DEFAULT_PROMPTS", true)?,
            custom_system_prompt: env_or("CUSTOM_SYSTEM_PROMPT", ""),
            custom_user_prompt: env_or("CUSTOM_USER_PROMPT", ""),
            search_topics: env_opt("SEARCH_TOPICS")
                .map(|raw| decode_string_list(&raw))
                .unwrap_or_default(),
            image_quality: env_or("IMAGE_QUALITY", &defaults.image_quality),
            image_size: env_or("IMAGE_SIZE", &defaults.image_size),
            resize_output: env_bool("RESIZE_OUTPUT", true)?,
            target_resolution: env_or("TARGET_RESOLUTION", &defaults.target_resolution),
            save_original: env_bool("SAVE_ORIGINAL", true)?,
            enable_video: env_bool("ENABLE_VIDEO", true)?,
            video_duration: env_u64("VIDEO_DURATION", defaults.video_duration)?,
            video_framerate: env_or("VIDEO_FRAMERATE", &defaults.video_framerate),
            use_default_encode_args: env_bool("USE_DEFAULT_FFMPEG", true)?,
            custom_encode_args: env_or("CUSTOM_FFMPEG_ARGS", ""),
            output_dir: PathBuf::from(env_or(
                "OUTPUT_DIR",
                &defaults.output_dir.to_string_lossy(),
            )),
            filename_prefix: env_or("FILENAME_PREFIX", &defaults.filename_prefix),
            supervisor_token: env_opt("SUPERVISOR_TOKEN"),
            supervisor_api: env_or("SUPERVISOR_API", &defaults.supervisor_api),
            default_timezone: env_or("DEFAULT_TIMEZONE", &defaults.default_timezone),
        })
    }
}

/// A JSON array of strings, or a comma-delimited fallback.
fn decode_string_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list;
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_bool(name: &str, default: bool) -> FrescoResult<bool> {
    match env_opt(name) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::new(format!("{name} is not a boolean: {other}")).into()),
        },
    }
}

fn env_u64(name: &str, default: u64) -> FrescoResult<u64> {
    match env_opt(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::new(format!("{name} is not a number: {value}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_config_decodes_json_array() {
        let config = EntityConfig::decode(r#"["sensor.temp", "sensor.humidity"]"#);
        assert_eq!(
            config,
            EntityConfig::List(vec!["sensor.temp".into(), "sensor.humidity".into()])
        );
    }

    #[test]
    fn entity_config_keeps_free_text() {
        let config = EntityConfig::decode("sensor.temp, {{ states('sensor.hum') }}");
        assert!(matches!(config, EntityConfig::Raw(_)));
    }

    #[test]
    fn malformed_json_array_falls_back_to_raw() {
        let config = EntityConfig::decode("[not json");
        assert_eq!(config, EntityConfig::Raw("[not json".into()));
    }

    #[test]
    fn string_list_accepts_both_encodings() {
        assert_eq!(decode_string_list(r#"["a", "b"]"#), vec!["a", "b"]);
        assert_eq!(decode_string_list("a, b ,c"), vec!["a", "b", "c"]);
        assert!(decode_string_list("").is_empty());
    }

    #[test]
    fn resolution_presets_cover_known_names() {
        for (name, dims) in RESOLUTION_PRESETS {
            assert_eq!(parse_resolution(name).unwrap(), *dims);
        }
    }
}
