//! Brace-depth scanner for the raw entity configuration.
//!
//! The raw value mixes plain `domain.entity` identifiers with embedded
//! template expressions delimited by `{{ ... }}` and `{% ... %}` markers.
//! A single left-to-right scan tracks marker nesting depth; a post-pass
//! merges template fragments separated by free text into one expression.

use fresco_core::{ConfigToken, EntityConfig};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Shape of a plain entity identifier: `domain.entity`.
fn identifier_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^[a-z_]+\.[a-z0-9_]+$").expect("valid identifier regex"))
}

/// Parsed entity configuration: ordered tokens plus any diagnostics
/// recorded for tolerated malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    /// Tokens in first-appearance order
    pub tokens: Vec<ConfigToken>,
    /// Diagnostics for tolerated malformed input (unbalanced markers)
    pub diagnostics: Vec<String>,
}

/// Split a raw entity configuration into an ordered token sequence.
///
/// Unbalanced template markers never fail: the trailing buffer is emitted
/// as a template token and a diagnostic is recorded.
///
/// # Examples
///
/// ```
/// use fresco_core::{ConfigToken, EntityConfig};
/// use fresco_template::parse_entity_config;
///
/// let parsed = parse_entity_config(&EntityConfig::Raw(
///     "sensor.temp, {{ states('sensor.humidity') }}".to_string(),
/// ));
/// assert_eq!(parsed.tokens.len(), 2);
/// assert_eq!(parsed.tokens[0], ConfigToken::Literal("sensor.temp".to_string()));
/// assert!(parsed.tokens[1].is_template());
/// ```
pub fn parse_entity_config(config: &EntityConfig) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();
    match config {
        // Structured list items have explicit boundaries; the adjacency
        // merge never crosses them.
        EntityConfig::List(items) => {
            for item in items {
                let mut fragment = ParsedConfig::default();
                scan_fragment(item, &mut fragment);
                parsed.tokens.extend(merge_adjacent(fragment.tokens));
                parsed.diagnostics.append(&mut fragment.diagnostics);
            }
        }
        EntityConfig::Raw(raw) => {
            scan_fragment(raw, &mut parsed);
            parsed.tokens = merge_adjacent(std::mem::take(&mut parsed.tokens));
        }
    }
    parsed
}

/// One pass of the depth-counting scanner over a single fragment.
fn scan_fragment(input: &str, parsed: &mut ParsedConfig) {
    let chars: Vec<char> = input.chars().collect();
    let mut buffer = String::new();
    let mut depth = 0usize;
    let mut in_template = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c == '{' && matches!(next, Some('{') | Some('%')) {
            if !in_template {
                flush_literals(&mut buffer, &mut parsed.tokens);
                in_template = true;
            }
            depth += 1;
            buffer.push(c);
            buffer.push(next.expect("peeked"));
            i += 2;
            continue;
        }

        if in_template && (c == '}' || c == '%') && next == Some('}') {
            depth = depth.saturating_sub(1);
            buffer.push(c);
            buffer.push('}');
            i += 2;
            if depth == 0 {
                parsed.tokens.push(ConfigToken::Template(std::mem::take(&mut buffer)));
                in_template = false;
            }
            continue;
        }

        buffer.push(c);
        i += 1;
    }

    if in_template {
        // Tolerated malformed input: markers never closed. A quoted marker
        // sequence inside an expression desynchronizes the depth counter and
        // lands here too; the buffer is salvaged as a template token.
        let diagnostic = format!("Unbalanced template markers in: {}", buffer.trim());
        warn!(fragment = %buffer.trim(), "unbalanced template markers, emitting trailing buffer");
        parsed.diagnostics.push(diagnostic);
        parsed
            .tokens
            .push(ConfigToken::Template(std::mem::take(&mut buffer)));
    } else {
        flush_literals(&mut buffer, &mut parsed.tokens);
    }
}

/// Flush accumulated plain text as zero or more literal tokens, splitting
/// on runs of commas and whitespace.
fn flush_literals(buffer: &mut String, tokens: &mut Vec<ConfigToken>) {
    for piece in buffer.split(|c: char| c.is_whitespace() || c == ',') {
        if !piece.is_empty() {
            tokens.push(ConfigToken::Literal(piece.to_string()));
        }
    }
    buffer.clear();
}

/// Adjacency merge: free-text labels or stray symbols between template
/// fragments belong to the surrounding expression, not the entity list.
///
/// A template token absorbs immediately adjacent tokens (templates, or
/// literals that do not look like `domain.entity` identifiers) in both
/// directions; an identifier-shaped literal always stops the merge. This is
/// deliberately permissive for inputs mixing several unrelated fragments
/// with free text; the behavior is pinned by tests.
fn merge_adjacent(tokens: Vec<ConfigToken>) -> Vec<ConfigToken> {
    let mut merged: Vec<ConfigToken> = Vec::with_capacity(tokens.len());
    let mut open = false;

    for token in tokens {
        match token {
            ConfigToken::Template(text) => {
                // Pull the whole run of preceding non-identifier literals
                // into this template; an identifier stops the walk.
                if !open {
                    let mut lead: Vec<String> = Vec::new();
                    loop {
                        match merged.last() {
                            Some(ConfigToken::Literal(prev))
                                if !identifier_shape().is_match(prev) =>
                            {
                                lead.push(prev.clone());
                            }
                            _ => break,
                        }
                        merged.pop();
                    }
                    if !lead.is_empty() {
                        lead.reverse();
                        merged.push(ConfigToken::Template(lead.join(" ")));
                        open = true;
                    }
                }
                if open {
                    if let Some(ConfigToken::Template(current)) = merged.last_mut() {
                        current.push(' ');
                        current.push_str(&text);
                        continue;
                    }
                }
                merged.push(ConfigToken::Template(text));
                open = true;
            }
            ConfigToken::Literal(text) => {
                if identifier_shape().is_match(&text) {
                    merged.push(ConfigToken::Literal(text));
                    open = false;
                } else if open {
                    if let Some(ConfigToken::Template(current)) = merged.last_mut() {
                        current.push(' ');
                        current.push_str(&text);
                    }
                } else {
                    merged.push(ConfigToken::Literal(text));
                }
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(input: &str) -> ParsedConfig {
        parse_entity_config(&EntityConfig::Raw(input.to_string()))
    }

    #[test]
    fn identifiers_only_yield_one_literal_per_run() {
        let parsed = raw("sensor.temp, sensor.humidity\n binary_sensor.door");
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(
            parsed.tokens,
            vec![
                ConfigToken::Literal("sensor.temp".into()),
                ConfigToken::Literal("sensor.humidity".into()),
                ConfigToken::Literal("binary_sensor.door".into()),
            ]
        );
    }

    #[test]
    fn single_balanced_template_is_verbatim() {
        let parsed = raw("{{ states('sensor.temp') }}");
        assert_eq!(
            parsed.tokens,
            vec![ConfigToken::Template("{{ states('sensor.temp') }}".into())]
        );
    }

    #[test]
    fn statement_markers_are_templates() {
        let parsed = raw("{% if is_state('sun.sun', 'above_horizon') %}day{% endif %}");
        assert_eq!(parsed.tokens.len(), 1);
        assert!(parsed.tokens[0].is_template());
    }

    #[test]
    fn nested_markers_balance_before_emit() {
        let parsed = raw("{{ {{ inner }} }}");
        assert_eq!(parsed.tokens.len(), 1);
        assert_eq!(parsed.tokens[0].text(), "{{ {{ inner }} }}");
    }

    #[test]
    fn unbalanced_markers_emit_trailing_template_with_diagnostic() {
        let parsed = raw("{{ states('sensor.temp')");
        assert_eq!(parsed.tokens.len(), 1);
        assert!(parsed.tokens[0].is_template());
        assert_eq!(parsed.diagnostics.len(), 1);
        assert!(parsed.diagnostics[0].contains("Unbalanced"));
    }

    #[test]
    fn literal_before_template_flushes_first() {
        let parsed = raw("sensor.temp {{ states('sensor.hum') }}");
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.tokens[0], ConfigToken::Literal("sensor.temp".into()));
        assert!(parsed.tokens[1].is_template());
    }

    #[test]
    fn merges_templates_separated_by_free_text() {
        // Known ambiguity: anything not identifier-shaped between two
        // templates is treated as part of one combined expression.
        let parsed = raw("{{ states('a.b') }} degrees {{ states('c.d') }}");
        assert_eq!(parsed.tokens.len(), 1);
        assert_eq!(
            parsed.tokens[0].text(),
            "{{ states('a.b') }} degrees {{ states('c.d') }}"
        );
    }

    #[test]
    fn identifier_stops_the_merge() {
        let parsed = raw("{{ states('a.b') }} sensor.temp {{ states('c.d') }}");
        assert_eq!(
            parsed.tokens,
            vec![
                ConfigToken::Template("{{ states('a.b') }}".into()),
                ConfigToken::Literal("sensor.temp".into()),
                ConfigToken::Template("{{ states('c.d') }}".into()),
            ]
        );
    }

    #[test]
    fn leading_free_text_joins_following_template() {
        let parsed = raw("label: {{ states('a.b') }}");
        assert_eq!(parsed.tokens.len(), 1);
        assert_eq!(parsed.tokens[0].text(), "label: {{ states('a.b') }}");
    }

    #[test]
    fn multi_word_leading_text_joins_following_template() {
        let parsed = raw("a nice label {{ states('a.b') }}");
        assert_eq!(parsed.tokens.len(), 1);
        assert_eq!(parsed.tokens[0].text(), "a nice label {{ states('a.b') }}");
    }

    #[test]
    fn leading_walk_stops_at_identifier() {
        let parsed = raw("sensor.temp label {{ states('a.b') }}");
        assert_eq!(
            parsed.tokens,
            vec![
                ConfigToken::Literal("sensor.temp".into()),
                ConfigToken::Template("label {{ states('a.b') }}".into()),
            ]
        );
    }

    #[test]
    fn structured_list_parses_each_item() {
        let parsed = parse_entity_config(&EntityConfig::List(vec![
            "sensor.temp".into(),
            "{{ states('sensor.hum') }}".into(),
        ]));
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.tokens[0], ConfigToken::Literal("sensor.temp".into()));
        assert!(parsed.tokens[1].is_template());
    }

    #[test]
    fn structured_list_items_never_merge_across_boundaries() {
        let parsed = parse_entity_config(&EntityConfig::List(vec![
            "{{ states('a.b') }}".into(),
            "note".into(),
        ]));
        assert_eq!(
            parsed.tokens,
            vec![
                ConfigToken::Template("{{ states('a.b') }}".into()),
                ConfigToken::Literal("note".into()),
            ]
        );
    }

    #[test]
    fn quoted_marker_desync_is_tolerated() {
        // Documented limitation: a literal "}}" inside a quoted sub-string
        // closes the template early and desynchronizes the counter.
        let parsed = raw("{{ '}}' }}");
        assert!(!parsed.tokens.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let parsed = raw("");
        assert!(parsed.tokens.is_empty());
        assert!(parsed.diagnostics.is_empty());
    }
}
