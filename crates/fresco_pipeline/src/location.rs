//! Home-zone location resolution.

use fresco_client::LocationHint;
use fresco_core::StateSnapshot;
use tracing::debug;

/// The well-known home zone entity.
const HOME_ZONE: &str = "zone.home";

/// Location used for localized search instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// IANA timezone
    pub timezone: String,
    /// Display name of the home zone, when configured
    pub name: Option<String>,
}

impl ResolvedLocation {
    /// Convert into the client-facing hint.
    pub fn to_hint(&self) -> LocationHint {
        LocationHint {
            timezone: self.timezone.clone(),
            city: self.name.clone(),
        }
    }
}

/// Scan the snapshot for the home zone to discover a timezone and display
/// name; absence falls back to the configured default timezone. Never fails.
pub fn resolve_location(snapshot: &StateSnapshot, default_timezone: &str) -> ResolvedLocation {
    let zone = match snapshot.get(HOME_ZONE) {
        Some(zone) => zone,
        None => {
            debug!(default_timezone, "no home zone in snapshot, using default");
            return ResolvedLocation {
                timezone: default_timezone.to_string(),
                name: None,
            };
        }
    };

    let timezone = zone
        .attributes
        .get("time_zone")
        .and_then(|v| v.as_str())
        .unwrap_or(default_timezone)
        .to_string();
    let name = zone
        .attributes
        .get("friendly_name")
        .and_then(|v| v.as_str())
        .map(String::from);

    debug!(timezone = %timezone, name = ?name, "resolved home zone");
    ResolvedLocation { timezone, name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresco_core::EntityState;

    #[test]
    fn missing_zone_falls_back_to_default() {
        let location = resolve_location(&StateSnapshot::empty(), "America/Phoenix");
        assert_eq!(location.timezone, "America/Phoenix");
        assert!(location.name.is_none());
    }

    #[test]
    fn zone_attributes_supply_timezone_and_name() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("time_zone".into(), serde_json::json!("Europe/Berlin"));
        attributes.insert("friendly_name".into(), serde_json::json!("Home"));
        let snapshot = StateSnapshot::from_states([EntityState {
            entity_id: "zone.home".into(),
            state: "0".into(),
            attributes,
            last_changed: None,
        }]);

        let location = resolve_location(&snapshot, "America/Phoenix");
        assert_eq!(location.timezone, "Europe/Berlin");
        assert_eq!(location.name.as_deref(), Some("Home"));
    }
}
