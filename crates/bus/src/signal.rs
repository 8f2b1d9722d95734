use std::collections::BTreeMap;

use yurei_core::Value;

/// An immutable, typed world event.
///
/// `kind` is dot-namespaced (`world.input.click`); the payload carries the
/// event's fields. Well-known kinds the host produces: `world.boot`,
/// `world.power`, `world.network`, `world.clock`, `world.uptime`,
/// `world.input.click`, `world.presence.changed`, `world.shutdown`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: String,
    pub payload: BTreeMap<String, Value>,
}

impl Signal {
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        let mut payload = BTreeMap::new();
        // Producers mirror the kind into the payload so consumers that only
        // see the payload can still tell events apart.
        payload.insert("type".to_string(), Value::Text(kind.clone()));
        Signal { kind, payload }
    }

    /// Adds one payload field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}
