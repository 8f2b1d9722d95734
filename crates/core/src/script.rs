//! The declarative script model: rules, conditions, and actions.
//!
//! Rule documents are decoded once at ghost activation into these closed
//! tagged unions and are immutable afterwards. Decoding is deliberately
//! permissive: a condition or action shape this version does not recognize
//! decodes to `Unknown` instead of failing, so documents written for a newer
//! host still load (unknown conditions evaluate false, unknown actions do
//! nothing).

use crate::value::Value;

/// One trigger-pattern + conditions + actions unit of declarative behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Dot-namespaced trigger pattern, e.g. `world.input.click`. Matches a
    /// signal kind that equals it or extends it by a `.`-separated suffix.
    pub trigger: String,
    /// Implicit conjunction; empty means the rule always fires on a match.
    pub when: Vec<Condition>,
    pub actions: Vec<Action>,
}

/// A structural condition over context values.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value, Value),
    Lt(Value, Value),
    Gt(Value, Value),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    /// Unrecognized or malformed shape; evaluates false, never errors.
    Unknown,
}

/// A reactive action produced by a fired rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Speak interpolated text through the balloon.
    Say(String),
    /// Switch the character to a named surface.
    SetSurface(String),
    /// Set a persistent variable to the resolved value.
    SetVar { key: String, value: Value },
    /// Add the resolved delta to a persistent variable (missing keys count
    /// as zero).
    AddVar { key: String, value: Value },
    /// Observable no-effect marker.
    Noop,
    /// Unrecognized or malformed shape; executes as nothing.
    Unknown,
}

impl Rule {
    /// Decodes a parsed rule document. Absent `event`/`when`/`actions`
    /// fields default to an empty trigger / no conditions / no actions.
    pub fn from_document(doc: &Value) -> Rule {
        let Value::Map(fields) = doc else {
            return Rule {
                trigger: String::new(),
                when: Vec::new(),
                actions: Vec::new(),
            };
        };
        let trigger = fields.get("event").map(Value::render).unwrap_or_default();
        let when = match fields.get("when") {
            Some(Value::List(items)) => items.iter().map(Condition::from_value).collect(),
            _ => Vec::new(),
        };
        let actions = match fields.get("actions") {
            Some(Value::List(items)) => items.iter().map(Action::from_value).collect(),
            _ => Vec::new(),
        };
        Rule {
            trigger,
            when,
            actions,
        }
    }
}

impl Condition {
    /// Decodes one condition mapping: `{eq: [a, b]}`, `{lt: [a, b]}`,
    /// `{gt: [a, b]}`, `{and: [...]}`, `{or: [...]}`.
    pub fn from_value(value: &Value) -> Condition {
        let Value::Map(fields) = value else {
            return Condition::Unknown;
        };
        if let Some(operands) = fields.get("eq") {
            return match pair(operands) {
                Some((left, right)) => Condition::Eq(left, right),
                None => Condition::Unknown,
            };
        }
        if let Some(operands) = fields.get("lt") {
            return match pair(operands) {
                Some((left, right)) => Condition::Lt(left, right),
                None => Condition::Unknown,
            };
        }
        if let Some(operands) = fields.get("gt") {
            return match pair(operands) {
                Some((left, right)) => Condition::Gt(left, right),
                None => Condition::Unknown,
            };
        }
        if let Some(Value::List(inner)) = fields.get("and") {
            return Condition::And(inner.iter().map(Condition::from_value).collect());
        }
        if let Some(Value::List(inner)) = fields.get("or") {
            return Condition::Or(inner.iter().map(Condition::from_value).collect());
        }
        Condition::Unknown
    }
}

fn pair(operands: &Value) -> Option<(Value, Value)> {
    match operands {
        Value::List(items) if items.len() == 2 => {
            Some((items[0].clone(), items[1].clone()))
        }
        _ => None,
    }
}

impl Action {
    /// Decodes one action mapping: `{say: ...}`, `{set_surface: ...}`,
    /// `{set_var: {key, value}}`, `{add_var: {key, value}}`, `{noop: true}`.
    pub fn from_value(value: &Value) -> Action {
        let Value::Map(fields) = value else {
            return Action::Unknown;
        };
        if let Some(text) = fields.get("say") {
            return Action::Say(text.render());
        }
        if let Some(id) = fields.get("set_surface") {
            return Action::SetSurface(id.render());
        }
        if let Some(payload) = fields.get("set_var") {
            return match keyed_value(payload) {
                Some((key, value)) => Action::SetVar { key, value },
                None => Action::Unknown,
            };
        }
        if let Some(payload) = fields.get("add_var") {
            return match keyed_value(payload) {
                Some((key, value)) => Action::AddVar { key, value },
                None => Action::Unknown,
            };
        }
        if fields.contains_key("noop") {
            return Action::Noop;
        }
        Action::Unknown
    }
}

fn keyed_value(payload: &Value) -> Option<(String, Value)> {
    let Value::Map(fields) = payload else {
        return None;
    };
    let key = fields.get("key")?.render();
    let value = fields.get("value")?.clone();
    Some((key, value))
}
