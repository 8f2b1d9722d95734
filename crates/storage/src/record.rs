use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The on-disk save record for one ghost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRecord {
    /// ISO 8601 / RFC 3339 timestamp with local offset, stamped at first
    /// initialization and carried over unchanged by every later save.
    pub created_at: String,
    pub vars: BTreeMap<String, serde_json::Value>,
}
