//! The analytical engine seam.
//!
//! Consumers (the map session, the CLI) talk to an [`AnalyticsEngine`]
//! rather than to SQLite directly. The engine is single-threaded, so the
//! futures are not required to be `Send`.

use crate::models::{AggregateRow, SchoolRecord};
use crate::sql::CompiledQuery;
use crate::Database;
use async_trait::async_trait;

/// Executes compiled queries.
#[async_trait(?Send)]
pub trait AnalyticsEngine {
    /// Runs a map query, one row per region.
    async fn aggregate(&self, query: &CompiledQuery) -> anyhow::Result<Vec<AggregateRow>>;

    /// Runs a roster query, one row per school.
    async fn roster(&self, query: &CompiledQuery) -> anyhow::Result<Vec<SchoolRecord>>;
}

#[async_trait(?Send)]
impl AnalyticsEngine for Database {
    async fn aggregate(&self, query: &CompiledQuery) -> anyhow::Result<Vec<AggregateRow>> {
        self.query_aggregate(query)
    }

    async fn roster(&self, query: &CompiledQuery) -> anyhow::Result<Vec<SchoolRecord>> {
        self.query_roster(query)
    }
}
