use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use crate::ids::CorrelationId;

/// Session storage capability. The dispatcher passes it through to
/// controllers untouched.
pub trait SessionStore: Send + Sync {
    fn id(&self) -> String;
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str) -> Option<Value>;
}

/// Process-local session backed by a map.
#[derive(Debug)]
pub struct MemorySession {
    id: String,
    values: RwLock<HashMap<String, Value>>,
}

impl MemorySession {
    /// A fresh session with a random ULID identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: CorrelationId::generate().to_string(),
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySession {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_roundtrip() {
        let session = MemorySession::new();
        assert!(session.get("visits").is_none());
        session.set("visits", json!(1));
        assert_eq!(session.get("visits"), Some(json!(1)));
        assert_eq!(session.remove("visits"), Some(json!(1)));
        assert!(session.get("visits").is_none());
        assert_eq!(session.id().len(), 26);
    }
}
