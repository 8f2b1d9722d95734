//! Yurei ghost runtime core -- markup documents, runtime values, and the
//! declarative script model.
//!
//! A ghost package describes its behavior in small rule documents written in
//! a restricted indentation-based markup. This crate parses those documents
//! into a generic [`Value`] tree and decodes the tree into the closed
//! [`Rule`]/[`Condition`]/[`Action`] model the engine interprets. No I/O or
//! evaluation happens here -- that is the eval crate's job.

pub mod error;
pub mod markup;
pub mod script;
pub mod value;

pub use error::ParseError;
pub use markup::parse;
pub use script::{Action, Condition, Rule};
pub use value::Value;
