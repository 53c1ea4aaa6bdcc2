//! Status rule table.
//!
//! # Design
//! - Keep form inputs as strings for lossless editing; parse only on save.
//! - Rows are identified by [`RuleId`], never by position.
//! - The persisted list is replaced wholesale on every save.

mod convert;
mod evaluate;
mod model;
mod validate;

pub use convert::{from_persisted, to_persisted};
pub use evaluate::{StatusAssignment, evaluate, for_entity};
pub use model::{Rule, RuleEdit, RuleForm, RuleId, RuleRow, RuleTable};
pub use validate::{AmountBound, RuleCheck, RuleViolation, ViolationKind};
