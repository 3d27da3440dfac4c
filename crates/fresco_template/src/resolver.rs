//! Context resolution: config tokens against a snapshot.

use crate::Evaluator;
use fresco_core::{ConfigToken, PromptContext, ResolvedContext, ResolvedEntry, StateSnapshot};
use tracing::debug;

/// Resolve each token into the ordered context mapping.
///
/// Literal identifiers found in the snapshot become `Value` entries; absent
/// literals are omitted entirely. Template tokens always produce exactly one
/// entry, `Rendered` or `Failed` — a failing expression never aborts its
/// siblings. Duplicate keys overwrite (last wins).
pub fn resolve(snapshot: &StateSnapshot, tokens: &[ConfigToken]) -> ResolvedContext {
    let evaluator = Evaluator::new(snapshot);
    let mut context = ResolvedContext::new();

    for token in tokens {
        match token {
            ConfigToken::Literal(entity_id) => match snapshot.get(entity_id) {
                Some(entity) => {
                    context.insert(entity_id.clone(), ResolvedEntry::from(entity));
                }
                None => {
                    debug!(entity_id = %entity_id, "entity not in snapshot, omitting");
                }
            },
            ConfigToken::Template(source) => {
                let entry = match evaluator.evaluate(source) {
                    Ok(text) => ResolvedEntry::Rendered { text },
                    Err(error) => {
                        debug!(source = %source, error = %error, "template evaluation failed");
                        ResolvedEntry::Failed {
                            message: error.to_string(),
                        }
                    }
                };
                context.insert(source.clone(), entry);
            }
        }
    }
    context
}

/// Flatten the resolved context into the prompt-substitutable projection.
///
/// `Rendered` entries land under `rendered_template`, `rendered_template_2`,
/// ... to avoid collisions when several templates render to similar content;
/// `Failed` entries become `template_N_error` values so failures stay visible
/// to prompt composition; `Value` entries keep their entity id.
pub fn flatten(context: &ResolvedContext) -> PromptContext {
    let mut prompt_context = PromptContext::new();
    let mut rendered_count = 0usize;
    let mut failed_count = 0usize;

    for (key, entry) in context {
        match entry {
            ResolvedEntry::Value {
                state,
                attributes,
                updated_at,
            } => {
                prompt_context.insert(
                    key.clone(),
                    serde_json::json!({
                        "state": state,
                        "attributes": attributes,
                        "last_changed": updated_at,
                    }),
                );
            }
            ResolvedEntry::Rendered { text } => {
                rendered_count += 1;
                let key = if rendered_count == 1 {
                    "rendered_template".to_string()
                } else {
                    format!("rendered_template_{rendered_count}")
                };
                prompt_context.insert(key, serde_json::json!(text));
            }
            ResolvedEntry::Failed { message } => {
                failed_count += 1;
                prompt_context.insert(
                    format!("template_{failed_count}_error"),
                    serde_json::json!(message),
                );
            }
        }
    }
    prompt_context
}
