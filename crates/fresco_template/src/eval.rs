//! Restricted expression evaluation against a state snapshot.
//!
//! Templates are rendered in a minijinja environment exposing exactly three
//! read-only accessors plus attribute-style lookup on the `states` global:
//!
//! - `states('domain.entity')` — state value, or `"unknown"` when absent
//! - `state_attr('domain.entity', 'key')` — attribute value or none
//! - `is_state('domain.entity', 'expected')` — equality test
//! - `states.domain.entity` — record with `state`, `attributes`,
//!   `last_changed`
//!
//! The numeric coercion filters `float` and `int` are overridden to accept a
//! fallback default and never raise on non-numeric input.

use fresco_core::StateSnapshot;
use fresco_error::{TemplateError, TemplateErrorKind};
use minijinja::value::{from_args, Object, Value};
use minijinja::{context, Environment, State};
use std::sync::Arc;

/// Per-run template evaluator over an immutable snapshot.
pub struct Evaluator {
    env: Environment<'static>,
}

impl Evaluator {
    /// Build the restricted environment for one snapshot.
    pub fn new(snapshot: &StateSnapshot) -> Self {
        let snapshot = Arc::new(snapshot.clone());
        let mut env = Environment::new();

        env.add_global(
            "states",
            Value::from_object(StatesProxy {
                snapshot: Arc::clone(&snapshot),
            }),
        );

        let snap = Arc::clone(&snapshot);
        env.add_function("state_attr", move |entity_id: String, key: String| {
            match snap.get_attribute(&entity_id, &key) {
                Some(value) => Value::from_serialize(value),
                None => Value::from(()),
            }
        });

        let snap = Arc::clone(&snapshot);
        env.add_function("is_state", move |entity_id: String, expected: String| {
            snap.get(&entity_id)
                .map(|entity| entity.state == expected)
                .unwrap_or(false)
        });

        env.add_filter("float", float_filter);
        env.add_filter("int", int_filter);

        Self { env }
    }

    /// Render one template token.
    ///
    /// # Errors
    ///
    /// Returns an error for syntax errors, unknown filters, or runtime
    /// failures inside the expression; callers isolate this per token.
    pub fn evaluate(&self, source: &str) -> Result<String, TemplateError> {
        self.env
            .render_str(source, context! {})
            .map_err(|e| TemplateError::new(TemplateErrorKind::Evaluation(e.to_string())))
    }
}

/// Coerce to a float, falling back to a default instead of raising.
fn float_filter(value: Value, default: Option<f64>) -> f64 {
    if let Ok(f) = f64::try_from(value.clone()) {
        return f;
    }
    if let Some(s) = value.as_str() {
        if let Ok(f) = s.trim().parse() {
            return f;
        }
    }
    default.unwrap_or(0.0)
}

/// Coerce to an integer, falling back to a default instead of raising.
fn int_filter(value: Value, default: Option<i64>) -> i64 {
    if let Ok(i) = i64::try_from(value.clone()) {
        return i;
    }
    if let Some(s) = value.as_str() {
        let s = s.trim();
        if let Ok(i) = s.parse() {
            return i;
        }
        if let Ok(f) = s.parse::<f64>() {
            return f as i64;
        }
    }
    if let Ok(f) = f64::try_from(value) {
        return f as i64;
    }
    default.unwrap_or(0)
}

/// The `states` global: callable as `states('domain.entity')` and
/// navigable as `states.domain.entity`.
#[derive(Debug)]
struct StatesProxy {
    snapshot: Arc<StateSnapshot>,
}

impl Object for StatesProxy {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let domain = key.as_str()?;
        Some(Value::from_object(DomainProxy {
            snapshot: Arc::clone(&self.snapshot),
            domain: domain.to_string(),
        }))
    }

    fn call(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        args: &[Value],
    ) -> Result<Value, minijinja::Error> {
        let (entity_id,): (String,) = from_args(args)?;
        let state = self
            .snapshot
            .get(&entity_id)
            .map(|entity| entity.state.clone())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Value::from(state))
    }
}

/// Second level of `states.domain.entity` lookup.
#[derive(Debug)]
struct DomainProxy {
    snapshot: Arc<StateSnapshot>,
    domain: String,
}

impl Object for DomainProxy {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let entity = key.as_str()?;
        let record = self.snapshot.get_entity(&self.domain, entity)?;
        Some(Value::from_serialize(serde_json::json!({
            "entity_id": record.entity_id,
            "state": record.state,
            "attributes": record.attributes,
            "last_changed": record.last_changed,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresco_core::EntityState;

    fn snapshot() -> StateSnapshot {
        let mut attributes = serde_json::Map::new();
        attributes.insert("unit_of_measurement".into(), serde_json::json!("°F"));
        StateSnapshot::from_states([
            EntityState {
                entity_id: "sensor.temp".into(),
                state: "72".into(),
                attributes,
                last_changed: None,
            },
            EntityState {
                entity_id: "sun.sun".into(),
                state: "above_horizon".into(),
                attributes: serde_json::Map::new(),
                last_changed: None,
            },
        ])
    }

    #[test]
    fn states_returns_value() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator.evaluate("{{ states('sensor.temp') }}").unwrap();
        assert_eq!(out, "72");
    }

    #[test]
    fn states_returns_unknown_for_missing_entity() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator.evaluate("{{ states('sensor.missing') }}").unwrap();
        assert_eq!(out, "unknown");
    }

    #[test]
    fn state_attr_reads_attributes() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator
            .evaluate("{{ state_attr('sensor.temp', 'unit_of_measurement') }}")
            .unwrap();
        assert_eq!(out, "°F");
    }

    #[test]
    fn is_state_compares() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator
            .evaluate("{% if is_state('sun.sun', 'above_horizon') %}day{% else %}night{% endif %}")
            .unwrap();
        assert_eq!(out, "day");
    }

    #[test]
    fn boolean_expressions_render_capitalized() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator
            .evaluate("{{ is_state('sensor.temp', '72') }}")
            .unwrap();
        assert_eq!(out, "True");
    }

    #[test]
    fn dotted_access_exposes_state_record() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator.evaluate("{{ states.sensor.temp.state }}").unwrap();
        assert_eq!(out, "72");
    }

    #[test]
    fn float_filter_accepts_default_and_never_raises() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator
            .evaluate("{{ states('sensor.missing') | float(5.5) }}")
            .unwrap();
        assert_eq!(out, "5.5");
        let out = evaluator
            .evaluate("{{ states('sensor.temp') | float(0) }}")
            .unwrap();
        assert_eq!(out, "72.0");
    }

    #[test]
    fn int_filter_accepts_default() {
        let evaluator = Evaluator::new(&snapshot());
        let out = evaluator
            .evaluate("{{ states('sun.sun') | int(7) }}")
            .unwrap();
        assert_eq!(out, "7");
    }

    #[test]
    fn evaluation_errors_are_returned_not_panicked() {
        let evaluator = Evaluator::new(&snapshot());
        let err = evaluator
            .evaluate("{{ states('sensor.temp') | no_such_filter }}")
            .unwrap_err();
        assert!(format!("{err}").contains("Template Error"));
    }
}
