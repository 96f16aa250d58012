//! Per-query statement builders.
//!
//! - [`DeleteSynthesizer`]: pure text transformation, no database access
//! - [`InsertSynthesizer`]: introspects the table, runs the SELECT and renders
//!   one INSERT per returned row

mod delete;
mod insert;

pub use delete::DeleteSynthesizer;
pub use insert::InsertSynthesizer;

#[cfg(test)]
pub(crate) mod fakes;
