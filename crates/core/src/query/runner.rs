use futures_util::future::try_join_all;

use crate::expression::build_filter_expression;
use crate::storage::{Result, ScanExecutor, ScanPage};

use super::descriptor::QueryDescriptor;
use super::plan::{plan_query_with_chunk_size, CHUNK_SIZE};

/// Runs `query` through `executor`, chunking an oversized IN list.
pub async fn run_query<E>(executor: &E, query: &QueryDescriptor) -> Result<ScanPage>
where
    E: ScanExecutor + ?Sized,
{
    run_query_with_chunk_size(executor, query, CHUNK_SIZE).await
}

/// Runs `query` through `executor` with an explicit chunk size.
///
/// The plan is validated before any scan is issued. Chunk scans run
/// concurrently; the first failure fails the whole query, and results are
/// concatenated in chunk order.
pub async fn run_query_with_chunk_size<E>(
    executor: &E,
    query: &QueryDescriptor,
    chunk_size: usize,
) -> Result<ScanPage>
where
    E: ScanExecutor + ?Sized,
{
    let filters: Vec<_> = plan_query_with_chunk_size(query, chunk_size)?
        .into_descriptors()
        .iter()
        .map(|descriptor| build_filter_expression(descriptor, ""))
        .collect();

    let mut pages = try_join_all(filters.into_iter().map(|filter| executor.scan(filter))).await?;

    // A single scan keeps the store's own count and capacity.
    if pages.len() == 1 {
        return Ok(pages.remove(0));
    }
    Ok(ScanPage::merge(pages))
}
