//! Functional core for docdb.
//!
//! Everything in this crate is pure: the expression builders turn field maps
//! into DynamoDB placeholder expressions, and the query planner decides how a
//! query descriptor is split across scans. The only I/O seam is the
//! [`storage::ScanExecutor`] trait, implemented by the storage backend.

pub mod expression;
pub mod query;
pub mod storage;
