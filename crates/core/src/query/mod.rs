mod descriptor;
mod error;
mod plan;
mod runner;

pub use descriptor::{QueryDescriptor, ASCENDING_FIELD, LIMIT_FIELD, START_FROM_FIELD};
pub use error::{QueryError, Result};
pub use plan::{plan_query, plan_query_with_chunk_size, QueryPlan, CHUNK_SIZE};
pub use runner::{run_query, run_query_with_chunk_size};
