use fresco_core::{ConfigToken, EntityConfig, EntityState, ResolvedEntry, StateSnapshot};
use fresco_template::{flatten, parse_entity_config, resolve};

fn entity(id: &str, state: &str) -> EntityState {
    EntityState {
        entity_id: id.to_string(),
        state: state.to_string(),
        attributes: serde_json::Map::new(),
        last_changed: None,
    }
}

fn tokens(raw: &str) -> Vec<ConfigToken> {
    parse_entity_config(&EntityConfig::Raw(raw.to_string())).tokens
}

#[test]
fn scenario_a_literals_resolve_in_order() {
    let snapshot = StateSnapshot::from_states([
        entity("sensor.temp", "72"),
        entity("sensor.humidity", "40"),
    ]);
    let context = resolve(&snapshot, &tokens("sensor.temp, sensor.humidity"));

    assert_eq!(context.len(), 2);
    let keys: Vec<_> = context.keys().map(String::as_str).collect();
    assert_eq!(keys, ["sensor.temp", "sensor.humidity"]);
    assert!(context
        .values()
        .all(|entry| matches!(entry, ResolvedEntry::Value { .. })));
}

#[test]
fn scenario_b_template_renders_state() {
    let snapshot = StateSnapshot::from_states([entity("sensor.temp", "72")]);
    let context = resolve(&snapshot, &tokens("{{ states('sensor.temp') }}"));

    assert_eq!(context.len(), 1);
    assert_eq!(
        context.get("{{ states('sensor.temp') }}"),
        Some(&ResolvedEntry::Rendered { text: "72".into() })
    );
}

#[test]
fn scenario_c_missing_entity_renders_unknown_not_failed() {
    let snapshot = StateSnapshot::empty();
    let context = resolve(&snapshot, &tokens("{{ states('sensor.missing') }}"));

    assert_eq!(context.len(), 1);
    assert_eq!(
        context.values().next(),
        Some(&ResolvedEntry::Rendered {
            text: "unknown".into()
        })
    );
}

#[test]
fn absent_literal_omitted_but_failed_template_kept() {
    let snapshot = StateSnapshot::from_states([entity("sensor.temp", "72")]);
    let config = tokens("sensor.gone {{ states('sensor.temp') | bogus_filter }}");
    let context = resolve(&snapshot, &config);

    // The asymmetry: the absent literal contributes nothing, the failing
    // template contributes exactly one Failed entry.
    assert_eq!(context.len(), 1);
    assert!(matches!(
        context.values().next(),
        Some(ResolvedEntry::Failed { .. })
    ));
}

#[test]
fn every_template_token_yields_exactly_one_entry() {
    let snapshot = StateSnapshot::from_states([entity("sensor.temp", "72")]);
    let config = vec![
        ConfigToken::Template("{{ states('sensor.temp') }}".to_string()),
        ConfigToken::Template("{{ broken | nope }}".to_string()),
        ConfigToken::Template("{{ states('sensor.other') }}".to_string()),
    ];
    let context = resolve(&snapshot, &config);

    let template_count = config.iter().filter(|t| t.is_template()).count();
    assert_eq!(context.len(), template_count);
}

#[test]
fn resolution_is_idempotent() {
    let snapshot = StateSnapshot::from_states([
        entity("sensor.temp", "72"),
        entity("sun.sun", "above_horizon"),
    ]);
    let config = tokens("sensor.temp {{ states('sun.sun') }} sensor.gone");

    let first = resolve(&snapshot, &config);
    let second = resolve(&snapshot, &config);
    assert_eq!(first, second);
    let first_keys: Vec<_> = first.keys().collect();
    let second_keys: Vec<_> = second.keys().collect();
    assert_eq!(first_keys, second_keys);
}

#[test]
fn duplicate_tokens_overwrite_last_wins() {
    let snapshot = StateSnapshot::from_states([entity("sensor.temp", "72")]);
    let config = vec![
        ConfigToken::Literal("sensor.temp".to_string()),
        ConfigToken::Literal("sensor.temp".to_string()),
    ];
    let context = resolve(&snapshot, &config);
    assert_eq!(context.len(), 1);
}

#[test]
fn flatten_numbers_rendered_templates_and_exposes_failures() {
    let snapshot = StateSnapshot::from_states([entity("sensor.temp", "72")]);
    let config = vec![
        ConfigToken::Literal("sensor.temp".to_string()),
        ConfigToken::Template("{{ states('sensor.temp') }}".to_string()),
        ConfigToken::Template("{{ broken | nope }}".to_string()),
        ConfigToken::Template("{{ is_state('sensor.temp', '72') }}".to_string()),
    ];
    let context = resolve(&snapshot, &config);
    let prompt_context = flatten(&context);

    assert_eq!(prompt_context.len(), 4);
    assert_eq!(
        prompt_context.get("rendered_template"),
        Some(&serde_json::json!("72"))
    );
    // The template dialect renders booleans capitalized.
    assert_eq!(
        prompt_context.get("rendered_template_2"),
        Some(&serde_json::json!("True"))
    );
    assert!(prompt_context.get("template_1_error").is_some());
    assert_eq!(
        prompt_context
            .get("sensor.temp")
            .and_then(|v| v.get("state")),
        Some(&serde_json::json!("72"))
    );
}
