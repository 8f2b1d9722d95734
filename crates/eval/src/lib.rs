//! The Yurei rule engine -- receives world signals and interprets a ghost's
//! declarative rules against its persistent variable state.
//!
//! The engine composes a loaded rule set with a [`yurei_storage::VariableStore`].
//! For each incoming signal it matches every rule's trigger pattern,
//! evaluates the rule's conditions against a per-signal [`Context`], and
//! executes the actions of every rule that fires, returning the results for
//! the rendering collaborator to apply. Variable mutations persist
//! synchronously, one save per mutating action.

pub mod action;
pub mod condition;
pub mod context;
pub mod engine;
pub mod interpolate;

pub use action::ActionResult;
pub use condition::{conditions_met, eval_condition};
pub use context::Context;
pub use engine::{EngineError, RuleEngine};
pub use interpolate::interpolate;
