//! The rule engine: loads a ghost's script documents and interprets them
//! against incoming signals.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use yurei_bus::Signal;
use yurei_core::{parse, Rule, Value};
use yurei_storage::{StoreError, VariableStore};

use crate::action::{execute_actions, ActionResult};
use crate::condition::conditions_met;
use crate::context::Context;

/// Errors from engine activation and signal handling. Persistence failures
/// propagate unmasked; script parse failures never appear here because the
/// loader's policy is to skip broken documents (see [`RuleEngine::load`]).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("ghost script i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One ghost's behavior runtime: the loaded rule set plus its variable
/// store. Built at activation, immutable apart from the variable state,
/// dropped at deactivation.
pub struct RuleEngine {
    ghost_id: String,
    rules: Vec<Rule>,
    strings: BTreeMap<String, Value>,
    store: VariableStore,
    /// Guards the whole of `handle_signal`: concurrent deliveries to one
    /// ghost instance serialize here instead of interleaving store I/O.
    vars: Mutex<BTreeMap<String, Value>>,
}

impl RuleEngine {
    /// Activates a ghost from its package directory.
    ///
    /// Rule documents are read from `<ghost_dir>/ghost/events/*.yaml` in
    /// lexicographic filename order. A document that fails to parse is
    /// skipped with a warning rather than aborting activation -- one broken
    /// document should not take down a ghost whose other rules are fine.
    /// An optional `ghost/state.yaml` seeds variables without overwriting
    /// existing saved keys; the merged state persists immediately. An
    /// optional `ghost/strings.yaml` becomes the static strings table.
    pub fn load(
        ghost_id: &str,
        ghost_dir: &Path,
        store: VariableStore,
    ) -> Result<RuleEngine, EngineError> {
        let script_dir = ghost_dir.join("ghost");
        let rules = load_rules(&script_dir.join("events"))?;

        let mut vars = store.load()?;
        if let Some(Value::Map(defaults)) = read_optional_document(&script_dir.join("state.yaml"))?
        {
            for (key, value) in defaults {
                vars.entry(key).or_insert(value);
            }
        }
        store.save(&vars)?;

        let strings = match read_optional_document(&script_dir.join("strings.yaml"))? {
            Some(Value::Map(table)) => table,
            _ => BTreeMap::new(),
        };

        tracing::info!(ghost = ghost_id, rules = rules.len(), "ghost activated");
        Ok(RuleEngine {
            ghost_id: ghost_id.to_string(),
            rules,
            strings,
            store,
            vars: Mutex::new(vars),
        })
    }

    pub fn ghost_id(&self) -> &str {
        &self.ghost_id
    }

    /// Snapshot of the current variable map.
    pub fn vars(&self) -> BTreeMap<String, Value> {
        self.vars.lock().expect("engine state poisoned").clone()
    }

    /// Matches, evaluates, and executes every rule against one signal.
    ///
    /// All matching rules fire -- there is no short-circuit after the first
    /// match. Results are ordered rule-then-action: everything from the
    /// first matching rule, then everything from the next.
    pub fn handle_signal(&self, signal: &Signal) -> Result<Vec<ActionResult>, EngineError> {
        let mut vars = self.vars.lock().expect("engine state poisoned");
        let mut results = Vec::new();
        for rule in &self.rules {
            if !trigger_matches(&rule.trigger, &signal.kind) {
                continue;
            }
            let conditions_hold = {
                let ctx = Context {
                    kind: &signal.kind,
                    payload: &signal.payload,
                    vars: &*vars,
                    strings: &self.strings,
                };
                conditions_met(&rule.when, &ctx)
            };
            if !conditions_hold {
                continue;
            }
            results.extend(execute_actions(
                &rule.actions,
                &signal.kind,
                &signal.payload,
                &self.strings,
                &mut *vars,
                &self.store,
            )?);
        }
        Ok(results)
    }
}

/// A trigger matches a signal kind that equals it or extends it by a
/// dot-separated suffix: `world.input.click` matches `world.input.click`
/// and `world.input.click.left`, not `world.input` or `world.input.clicked`.
fn trigger_matches(trigger: &str, kind: &str) -> bool {
    match kind.strip_prefix(trigger) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

fn load_rules(events_dir: &Path) -> Result<Vec<Rule>, EngineError> {
    if !events_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(events_dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
        .collect();
    paths.sort();

    let mut rules = Vec::new();
    for path in paths {
        let text = fs::read_to_string(&path)?;
        match parse(&text) {
            Ok(doc) => {
                if is_empty_document(&doc) {
                    continue;
                }
                rules.push(Rule::from_document(&doc));
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unparsable rule document");
            }
        }
    }
    Ok(rules)
}

fn is_empty_document(doc: &Value) -> bool {
    match doc {
        Value::Map(entries) => entries.is_empty(),
        Value::List(items) => items.is_empty(),
        _ => false,
    }
}

/// Reads and parses an optional document. Missing files are `None`, not
/// errors; an unparsable document is warned about and treated as absent.
fn read_optional_document(path: &Path) -> Result<Option<Value>, EngineError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    match parse(&text) {
        Ok(doc) => Ok(Some(doc)),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping unparsable document");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_prefix_matching() {
        assert!(trigger_matches("world.input.click", "world.input.click"));
        assert!(trigger_matches("world.input.click", "world.input.click.left"));
        assert!(!trigger_matches("world.input.click", "world.input"));
        assert!(!trigger_matches("world.input.click", "world.input.clicked"));
        assert!(!trigger_matches("", "world.boot"));
        assert!(trigger_matches("world", "world.boot"));
    }
}
