//! DynamoDB document repository.
//!
//! The imperative shell around `docdb_core`: configuration, the AWS client,
//! the [`storage::DocDatabase`] repository and the command line front end.

pub mod cli;
pub mod config;
pub mod output;
pub mod storage;
