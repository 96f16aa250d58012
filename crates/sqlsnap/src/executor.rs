//! Running the source SELECT.

use async_trait::async_trait;

use crate::error::SnapResult;
use crate::value::Record;

/// Runs a SELECT and returns its rows in result order.
///
/// Each call acquires its own connection and releases it before returning,
/// on success and on failure alike.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> SnapResult<Vec<Record>>;
}
