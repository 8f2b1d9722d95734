//! Condition evaluation over the per-signal context.

use std::cmp::Ordering;

use yurei_core::{Condition, Value};

use crate::context::Context;
use crate::interpolate::interpolate;

/// A `when` list is an implicit conjunction; empty is vacuously true.
pub fn conditions_met(conditions: &[Condition], ctx: &Context) -> bool {
    conditions.iter().all(|condition| eval_condition(condition, ctx))
}

/// Evaluates one condition node. Unknown shapes are false, never an error.
pub fn eval_condition(condition: &Condition, ctx: &Context) -> bool {
    match condition {
        Condition::Eq(left, right) => resolve_operand(left, ctx) == resolve_operand(right, ctx),
        Condition::Lt(left, right) => ordered(left, right, ctx) == Some(Ordering::Less),
        Condition::Gt(left, right) => ordered(left, right, ctx) == Some(Ordering::Greater),
        Condition::And(inner) => inner.iter().all(|c| eval_condition(c, ctx)),
        Condition::Or(inner) => inner.iter().any(|c| eval_condition(c, ctx)),
        Condition::Unknown => false,
    }
}

fn ordered(left: &Value, right: &Value, ctx: &Context) -> Option<Ordering> {
    resolve_operand(left, ctx).compare(&resolve_operand(right, ctx))
}

/// Resolves a condition or variable-expression operand.
///
/// A text operand that is exactly one `${path}` placeholder is a context
/// reference and resolves to the underlying value, preserving its type (a
/// missing path resolves to empty text). Any other text interpolates to
/// text; non-text operands are literals and pass through.
pub(crate) fn resolve_operand(operand: &Value, ctx: &Context) -> Value {
    match operand {
        Value::Text(text) => match reference_path(text) {
            Some(path) => ctx
                .lookup(path)
                .unwrap_or_else(|| Value::Text(String::new())),
            None => Value::Text(interpolate(text, ctx)),
        },
        literal => literal.clone(),
    }
}

/// `${path}` with nothing around it is a direct reference; anything else is
/// a template.
fn reference_path(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("${")?.strip_suffix('}')?;
    if inner.contains('}') {
        return None;
    }
    Some(inner)
}
