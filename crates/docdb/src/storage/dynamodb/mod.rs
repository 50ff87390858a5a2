//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the repository traits
//! using `aws-sdk-dynamodb`.

mod client;
pub mod conversions;
mod error;
pub mod keys;
mod repository;

pub use client::create_client;
pub use repository::{DocDatabase, IdGenerator};
