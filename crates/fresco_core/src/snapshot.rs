//! Run-scoped snapshot of entity state.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// State of a single entity as reported by the supervisor API.
///
/// # Examples
///
/// ```
/// use fresco_core::EntityState;
///
/// let entity: EntityState = serde_json::from_str(
///     r#"{"entity_id": "sensor.temp", "state": "72", "attributes": {"unit_of_measurement": "°F"}}"#,
/// ).unwrap();
/// assert_eq!(entity.state, "72");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Dotted `domain.entity` identifier
    pub entity_id: String,
    /// Current state value
    pub state: String,
    /// Auxiliary attribute fields
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// When the state last changed, if reported
    #[serde(default)]
    pub last_changed: Option<DateTime<Utc>>,
}

/// Immutable per-run snapshot of entity states, keyed by entity id.
///
/// Built once from the supervisor `/states` response and owned exclusively
/// by a single pipeline run. Iteration preserves insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    entries: IndexMap<String, EntityState>,
}

impl StateSnapshot {
    /// An empty snapshot, used when the state fetch fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from entity states. Duplicate ids overwrite.
    pub fn from_states(states: impl IntoIterator<Item = EntityState>) -> Self {
        let mut entries = IndexMap::new();
        for state in states {
            entries.insert(state.entity_id.clone(), state);
        }
        Self { entries }
    }

    /// Look up an entity by id.
    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entries.get(entity_id)
    }

    /// Look up a named attribute of an entity.
    pub fn get_attribute(&self, entity_id: &str, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(entity_id)?.attributes.get(key)
    }

    /// Explicit two-level lookup: `(domain, entity)` to a plain state record.
    pub fn get_entity(&self, domain: &str, entity: &str) -> Option<&EntityState> {
        self.entries.get(&format!("{domain}.{entity}"))
    }

    /// Number of entities in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityState)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, state: &str) -> EntityState {
        EntityState {
            entity_id: id.to_string(),
            state: state.to_string(),
            attributes: serde_json::Map::new(),
            last_changed: None,
        }
    }

    #[test]
    fn keyed_lookup_and_order() {
        let snapshot =
            StateSnapshot::from_states([entity("sensor.temp", "72"), entity("sensor.hum", "40")]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("sensor.temp").unwrap().state, "72");
        let ids: Vec<_> = snapshot.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["sensor.temp", "sensor.hum"]);
    }

    #[test]
    fn two_level_lookup() {
        let snapshot = StateSnapshot::from_states([entity("zone.home", "0")]);
        assert!(snapshot.get_entity("zone", "home").is_some());
        assert!(snapshot.get_entity("zone", "work").is_none());
    }

    #[test]
    fn duplicate_ids_overwrite() {
        let snapshot =
            StateSnapshot::from_states([entity("sensor.temp", "70"), entity("sensor.temp", "72")]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("sensor.temp").unwrap().state, "72");
    }
}
