//! Object and field comparators
//!
//! Comparators return tagged results and never touch the change-set
//! themselves; callers match exhaustively on the outcome.

mod field;
mod object;

pub use field::{FieldComparator, FieldComparatorResult};
pub use object::{ObjectComparator, ObjectComparatorResult};
