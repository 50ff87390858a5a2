use async_trait::async_trait;

use crate::expression::FilterExpression;
use crate::query::QueryDescriptor;

use super::{ContextOptions, Document, ItemResponse, ItemsResponse, Result, ScanPage};

/// Executes one filtered scan against the backing table.
#[async_trait]
pub trait ScanExecutor: Send + Sync {
    /// Runs a single scan and returns its page of results.
    async fn scan(&self, filter: FilterExpression) -> Result<ScanPage>;
}

/// Document access over a table keyed by a hash key and an item id.
#[async_trait]
pub trait DocumentRepository<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Gets an item by id.
    async fn get_item(&self, id: &str, ctx: &ContextOptions) -> Result<ItemResponse<Option<T>>>;

    /// Creates an item from `params`, assigning a fresh id and creation stamps.
    async fn create_item(&self, params: Document, ctx: &ContextOptions) -> Result<ItemResponse<T>>;

    /// Applies a partial update. `partial` must carry the item's `id`.
    async fn update_item(&self, partial: Document, ctx: &ContextOptions) -> Result<ItemResponse<T>>;

    /// Gets every item under the hash key.
    async fn get_all(&self, ctx: &ContextOptions) -> Result<ItemsResponse<T>>;

    /// Scans for items matching the query, chunking an oversized IN list.
    async fn query(&self, query: &QueryDescriptor) -> Result<ItemsResponse<T>>;

    /// Deletes an item by id.
    async fn delete_item(&self, id: &str, ctx: &ContextOptions) -> Result<ItemResponse<()>>;
}
