//! Resolved context types feeding prompt composition.

use crate::EntityState;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Outcome of resolving one config token against the snapshot.
///
/// A `Template` token always yields exactly one entry (`Rendered` or
/// `Failed`); a `Literal` token absent from the snapshot yields none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedEntry {
    /// A literal identifier found in the snapshot
    Value {
        /// Current state value
        state: String,
        /// Auxiliary attribute fields
        attributes: serde_json::Map<String, serde_json::Value>,
        /// When the state last changed
        updated_at: Option<DateTime<Utc>>,
    },
    /// A template expression that evaluated successfully
    Rendered {
        /// The rendered text
        text: String,
    },
    /// A template expression that failed to evaluate
    Failed {
        /// The captured error message
        message: String,
    },
}

impl From<&EntityState> for ResolvedEntry {
    fn from(entity: &EntityState) -> Self {
        Self::Value {
            state: entity.state.clone(),
            attributes: entity.attributes.clone(),
            updated_at: entity.last_changed,
        }
    }
}

/// Ordered mapping from token text to its resolution outcome.
///
/// Insertion order is token discovery order; duplicate keys overwrite.
pub type ResolvedContext = IndexMap<String, ResolvedEntry>;

/// Flattened, JSON-serializable projection of a [`ResolvedContext`],
/// substitutable into the user prompt template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptContext(IndexMap<String, serde_json::Value>);

impl PromptContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a key, overwriting any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// Pretty-printed JSON rendering used for `{context}` substitution.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}
