mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::{DocumentRepository, ScanExecutor};
pub use types::{ContextOptions, Document, ItemResponse, ItemsResponse, ScanPage};
