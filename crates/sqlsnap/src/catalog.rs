//! Schema lookup used by INSERT synthesis.

use async_trait::async_trait;
use sqlsnap_check::{TableInfo, TableName};

use crate::error::SnapResult;

/// Describes tables on demand.
///
/// Implementations must not cache: every call reflects the live schema.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Columns of `table` in definition order.
    ///
    /// Returns [`SnapError::UnknownTable`](crate::SnapError::UnknownTable) when no
    /// such table is visible.
    async fn describe(&self, table: &TableName) -> SnapResult<TableInfo>;
}
