//! Action execution: results for the renderer, mutations for the store.

use std::collections::BTreeMap;

use yurei_core::{Action, Value};
use yurei_storage::VariableStore;

use crate::condition::resolve_operand;
use crate::context::Context;
use crate::engine::EngineError;
use crate::interpolate::interpolate;

/// What a fired rule asks the rendering collaborator to do. Variable
/// mutations are applied and persisted inline and yield no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Say { text: String },
    SetSurface { id: String },
    /// No-effect marker, surfaced for observability only.
    Noop,
}

/// Runs one rule's actions in document order.
///
/// `set_var`/`add_var` mutate `vars` and persist through `store` before the
/// next action runs -- one durable save per mutation, not a batch. Later
/// actions in the same rule observe the updated variables.
pub(crate) fn execute_actions(
    actions: &[Action],
    kind: &str,
    payload: &BTreeMap<String, Value>,
    strings: &BTreeMap<String, Value>,
    vars: &mut BTreeMap<String, Value>,
    store: &VariableStore,
) -> Result<Vec<ActionResult>, EngineError> {
    let mut results = Vec::new();
    for action in actions {
        match action {
            Action::Say(template) => {
                let ctx = Context {
                    kind,
                    payload,
                    vars,
                    strings,
                };
                results.push(ActionResult::Say {
                    text: interpolate(template, &ctx),
                });
            }
            Action::SetSurface(id) => {
                results.push(ActionResult::SetSurface { id: id.clone() });
            }
            Action::SetVar { key, value } => {
                let resolved = {
                    let ctx = Context {
                        kind,
                        payload,
                        vars,
                        strings,
                    };
                    resolve_operand(value, &ctx)
                };
                vars.insert(key.clone(), resolved);
                store.save(vars)?;
            }
            Action::AddVar { key, value } => {
                let delta = {
                    let ctx = Context {
                        kind,
                        payload,
                        vars,
                        strings,
                    };
                    resolve_operand(value, &ctx)
                };
                let current = vars.get(key).cloned().unwrap_or(Value::Int(0));
                match (&current, &delta) {
                    (Value::Int(base), Value::Int(step)) => {
                        vars.insert(key.clone(), Value::Int(base.saturating_add(*step)));
                        store.save(vars)?;
                    }
                    _ => {
                        tracing::warn!(
                            key = %key,
                            current = current.type_name(),
                            delta = delta.type_name(),
                            "add_var on non-integer operands; variable left unchanged"
                        );
                    }
                }
            }
            Action::Noop => results.push(ActionResult::Noop),
            Action::Unknown => {}
        }
    }
    Ok(results)
}
