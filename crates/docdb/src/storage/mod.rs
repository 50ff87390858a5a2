//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `docdb_core::storage`. DynamoDB is the only backend.

pub mod dynamodb;

pub use dynamodb::DocDatabase;
