//! Prompt composition.
//!
//! Pure string assembly: the chosen user template is filled with the
//! resolved context and the localized search instructions. No I/O.

use crate::ResolvedLocation;
use fresco_core::{Config, PromptContext};

/// Built-in system prompt for the HUD display generator.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
ROLE:
You synthesize data from a smart home to create informative and creative prompts for a futuristic \"HUD\" type display comprised of (a) a background image composed from the \"vibe\" of the home data, and (b) HUD information derived from the data.

CORE PARADIGM:
- The scene should be inspired by the data as a whole.
- Use judgment to decide what data matters today.
- HUD data should be woven into the scene.
- Key information should be legible at a distance.
- Secondary or decorative information may be small, stylized, or subtle.

IMPORTANT: Your output must be a single, detailed image prompt only. Do not include any explanations, justifications, or commentary. The prompt should stand alone as instructions for generating the image.

VISUAL STYLE FREEDOM:
Draw inspiration from any visual universe, and blend, remix, or invent new aesthetics rather than picking a named style directly. Embrace bold, creative styles that use the full spectrum and dynamic range of a QLED display for maximum visual impact.

OUTPUT:
- Produce exactly one highly detailed unconstrained image prompt with no limits.
- Do not explain or justify choices.
";

/// Built-in user prompt template. `{context}` is replaced with the resolved
/// context as pretty-printed JSON; the NEWS section is appended from the
/// search topics and resolved location.
pub const DEFAULT_USER_PROMPT_TEMPLATE: &str = "\
Smart home data:
{context}

NOTE:
This is a static image. Do not display the actual time. Reflect it only in the art.

TASK:
Create exactly one highly detailed unconstrained image prompt with no limit - do not explain your reasoning.
";

/// A composed system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// Developer/system instruction
    pub system: String,
    /// User instruction with the context substituted
    pub user: String,
}

/// Fill the chosen prompt template with the resolved context, the search
/// topics, and localized search instructions.
pub fn compose(
    config: &Config,
    context: &PromptContext,
    location: &ResolvedLocation,
) -> ComposedPrompt {
    let (system, template) = if config.use_default_prompts {
        (
            DEFAULT_SYSTEM_PROMPT.to_string(),
            DEFAULT_USER_PROMPT_TEMPLATE.to_string(),
        )
    } else {
        (
            config.custom_system_prompt.clone(),
            config.custom_user_prompt.clone(),
        )
    };

    let mut user = template.replace("{context}", &context.to_pretty_json());

    if !config.search_topics.is_empty() {
        user.push_str("\nNEWS:\n");
        for topic in &config.search_topics {
            user.push_str(&format!("Search the internet for {topic}.\n"));
        }
        if let Some(name) = &location.name {
            user.push_str(&format!("Search the internet for local {name} news.\n"));
        }
        user.push_str(
            "Should the results include important or noteworthy items, consider them for inclusion.\n",
        );
    }

    ComposedPrompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> ResolvedLocation {
        ResolvedLocation {
            timezone: "America/Phoenix".into(),
            name: Some("Phoenix".into()),
        }
    }

    #[test]
    fn default_template_substitutes_context() {
        let mut context = PromptContext::new();
        context.insert("sensor.temp", serde_json::json!({"state": "72"}));
        let composed = compose(&Config::default(), &context, &location());

        assert!(composed.user.contains("\"sensor.temp\""));
        assert!(!composed.user.contains("{context}"));
        assert_eq!(composed.system, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn custom_prompts_win_when_enabled() {
        let config = Config {
            use_default_prompts: false,
            custom_system_prompt: "be brief".into(),
            custom_user_prompt: "data: {context}".into(),
            ..Config::default()
        };
        let composed = compose(&config, &PromptContext::new(), &location());
        assert_eq!(composed.system, "be brief");
        assert!(composed.user.starts_with("data: {"));
    }

    #[test]
    fn search_topics_add_localized_news_section() {
        let config = Config {
            search_topics: vec!["major headlines".into()],
            ..Config::default()
        };
        let composed = compose(&config, &PromptContext::new(), &location());
        assert!(composed.user.contains("NEWS:"));
        assert!(composed.user.contains("major headlines"));
        assert!(composed.user.contains("local Phoenix news"));
    }

    #[test]
    fn no_topics_means_no_news_section() {
        let composed = compose(&Config::default(), &PromptContext::new(), &location());
        assert!(!composed.user.contains("NEWS:"));
    }
}
