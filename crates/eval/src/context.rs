//! The per-signal evaluation environment.

use std::collections::BTreeMap;

use yurei_core::Value;

/// Ephemeral read environment for one signal delivery.
///
/// Dot-path lookup resolves the first segment against, in order: the signal
/// payload, then `type` (the signal kind), then `vars` (the ghost's current
/// variable map), then `strings` (the static strings table). Later segments
/// traverse nested `Map` values. A miss at any depth yields `None`;
/// interpolation renders that as the empty string.
pub struct Context<'a> {
    pub kind: &'a str,
    pub payload: &'a BTreeMap<String, Value>,
    pub vars: &'a BTreeMap<String, Value>,
    pub strings: &'a BTreeMap<String, Value>,
}

impl Context<'_> {
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        if let Some(value) = self.payload.get(head) {
            return descend(value, segments).cloned();
        }
        match head {
            "type" => match segments.next() {
                None => Some(Value::Text(self.kind.to_string())),
                Some(_) => None,
            },
            "vars" => lookup_table(self.vars, segments),
            "strings" => lookup_table(self.strings, segments),
            _ => None,
        }
    }
}

fn lookup_table<'a>(
    table: &BTreeMap<String, Value>,
    mut segments: impl Iterator<Item = &'a str>,
) -> Option<Value> {
    match segments.next() {
        None => Some(Value::Map(table.clone())),
        Some(key) => descend(table.get(key)?, segments).cloned(),
    }
}

fn descend<'v, 'a>(
    mut current: &'v Value,
    segments: impl Iterator<Item = &'a str>,
) -> Option<&'v Value> {
    for segment in segments {
        match current {
            Value::Map(entries) => current = entries.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}
