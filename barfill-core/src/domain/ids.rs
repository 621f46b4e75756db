use serde::{Deserialize, Serialize};
use std::fmt;

/// Order ID
///
/// Spawned children derive their id from the parent (`"7"` → `"7.1"`), so
/// re-evaluating the same order on the same bar always yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the `ordinal`-th child spawned by this order.
    pub fn child(&self, ordinal: usize) -> Self {
        Self(format!("{}.{}", self.0, ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_ids_are_deterministic() {
        let parent = OrderId::new("7");
        assert_eq!(parent.child(1), OrderId::new("7.1"));
        assert_eq!(parent.child(1), parent.child(1));
        assert_eq!(parent.child(1).child(1), OrderId::new("7.1.1"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&OrderId::new("42")).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
