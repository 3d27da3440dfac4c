//! Config tokens produced by the entity configuration parser.

use serde::{Deserialize, Serialize};

/// One fragment of the raw entity configuration.
///
/// Ordering matches first appearance in the raw config; downstream
/// resolution does not depend on order, but tests do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigToken {
    /// A plain `domain.entity` identifier to look up in the snapshot
    Literal(String),
    /// An embedded template expression to evaluate against the snapshot
    Template(String),
}

impl ConfigToken {
    /// The token text, regardless of variant.
    pub fn text(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Template(text) => text,
        }
    }

    /// Whether this token is a template expression.
    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template(_))
    }
}
