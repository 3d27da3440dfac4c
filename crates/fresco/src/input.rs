//! Input-line protocol for the worker.
//!
//! One JSON value per line on stdin. A bare string names an action; an
//! object carries an `action` field (default `generate`) or, when it holds
//! a `prompt` or `prompt_file`, a direct image request. Malformed lines are
//! reported to the caller and never terminate the worker.

use fresco_pipeline::DirectImageRequest;

/// A decoded input line.
#[derive(Debug, Clone)]
pub enum InputAction {
    /// Run the full telemetry-driven pipeline
    Generate,
    /// Generate one image from a supplied prompt
    Direct(DirectImageRequest),
}

/// Decode one input line. Empty lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<InputAction>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| format!("invalid JSON: {e}"))?;

    match value {
        serde_json::Value::String(action) => action_by_name(&action).map(Some),
        serde_json::Value::Object(fields) => {
            if fields.contains_key("prompt") || fields.contains_key("prompt_file") {
                let request: DirectImageRequest =
                    serde_json::from_value(serde_json::Value::Object(fields))
                        .map_err(|e| format!("invalid direct request: {e}"))?;
                return Ok(Some(InputAction::Direct(request)));
            }
            let action = fields
                .get("action")
                .and_then(|v| v.as_str())
                .unwrap_or("generate");
            action_by_name(action).map(Some)
        }
        other => Err(format!("expected a string or object, got: {other}")),
    }
}

fn action_by_name(action: &str) -> Result<InputAction, String> {
    match action {
        "generate" => Ok(InputAction::Generate),
        other => Err(format!("unknown action: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_names_the_action() {
        assert!(matches!(
            parse_line(r#""generate""#),
            Ok(Some(InputAction::Generate))
        ));
    }

    #[test]
    fn object_defaults_to_generate() {
        assert!(matches!(
            parse_line(r#"{}"#),
            Ok(Some(InputAction::Generate))
        ));
        assert!(matches!(
            parse_line(r#"{"action": "generate"}"#),
            Ok(Some(InputAction::Generate))
        ));
    }

    #[test]
    fn prompt_field_makes_a_direct_request() {
        let action = parse_line(r#"{"prompt": "a red barn", "filename": "barn.png"}"#)
            .unwrap()
            .unwrap();
        match action {
            InputAction::Direct(request) => {
                assert_eq!(request.prompt.as_deref(), Some("a red barn"));
                assert_eq!(request.filename.as_deref(), Some("barn.png"));
            }
            other => panic!("expected direct request, got {other:?}"),
        }
    }

    #[test]
    fn prompt_file_field_makes_a_direct_request() {
        let action = parse_line(r#"{"prompt_file": "/tmp/prompt.txt"}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(action, InputAction::Direct(_)));
    }

    #[test]
    fn empty_lines_are_skipped() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   \t").unwrap().is_none());
    }

    #[test]
    fn bad_input_reports_without_panicking() {
        assert!(parse_line("not json").is_err());
        assert!(parse_line(r#""reboot""#).is_err());
        assert!(parse_line(r#"{"action": "reboot"}"#).is_err());
        assert!(parse_line("42").is_err());
    }
}
