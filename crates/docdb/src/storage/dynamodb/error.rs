//! DynamoDB error mapping.
//!
//! Classifies AWS SDK errors into `RepositoryError` from `docdb_core::storage`.
//! The SDK's message is carried through unchanged.

use std::error::Error;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use docdb_core::storage::RepositoryError;

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    const OPERATION: &str = "GetItem";
    if let Some(error) = connection_error(&err) {
        return error;
    }
    match err.into_service_error() {
        GetItemError::ProvisionedThroughputExceededException(e) => throttled(OPERATION, &e),
        GetItemError::RequestLimitExceeded(e) => throttled(OPERATION, &e),
        err => store(OPERATION, &err),
    }
}

/// Map a PutItem SDK error to RepositoryError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> RepositoryError {
    const OPERATION: &str = "PutItem";
    if let Some(error) = connection_error(&err) {
        return error;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(e) => condition_failed(OPERATION, &e),
        PutItemError::ProvisionedThroughputExceededException(e) => throttled(OPERATION, &e),
        PutItemError::RequestLimitExceeded(e) => throttled(OPERATION, &e),
        err => store(OPERATION, &err),
    }
}

/// Map an UpdateItem SDK error to RepositoryError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
) -> RepositoryError {
    const OPERATION: &str = "UpdateItem";
    if let Some(error) = connection_error(&err) {
        return error;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(e) => condition_failed(OPERATION, &e),
        UpdateItemError::ProvisionedThroughputExceededException(e) => throttled(OPERATION, &e),
        UpdateItemError::RequestLimitExceeded(e) => throttled(OPERATION, &e),
        err => store(OPERATION, &err),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> RepositoryError {
    const OPERATION: &str = "DeleteItem";
    if let Some(error) = connection_error(&err) {
        return error;
    }
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(e) => condition_failed(OPERATION, &e),
        DeleteItemError::ProvisionedThroughputExceededException(e) => throttled(OPERATION, &e),
        DeleteItemError::RequestLimitExceeded(e) => throttled(OPERATION, &e),
        err => store(OPERATION, &err),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    const OPERATION: &str = "Query";
    if let Some(error) = connection_error(&err) {
        return error;
    }
    match err.into_service_error() {
        QueryError::ProvisionedThroughputExceededException(e) => throttled(OPERATION, &e),
        QueryError::RequestLimitExceeded(e) => throttled(OPERATION, &e),
        err => store(OPERATION, &err),
    }
}

/// Map a Scan SDK error to RepositoryError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
) -> RepositoryError {
    const OPERATION: &str = "Scan";
    if let Some(error) = connection_error(&err) {
        return error;
    }
    match err.into_service_error() {
        ScanError::ProvisionedThroughputExceededException(e) => throttled(OPERATION, &e),
        ScanError::RequestLimitExceeded(e) => throttled(OPERATION, &e),
        err => store(OPERATION, &err),
    }
}

/// Map a generic connection/config error to RepositoryError.
pub fn map_connection_error(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::ConnectionFailed(err.to_string())
}

/// Requests that never reached the service.
fn connection_error<E, R>(err: &SdkError<E, R>) -> Option<RepositoryError>
where
    E: Error + 'static,
    R: Debug,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            Some(map_connection_error(DisplayErrorContext(err)))
        }
        _ => None,
    }
}

fn condition_failed(operation: &'static str, err: &(dyn Error + 'static)) -> RepositoryError {
    RepositoryError::ConditionalCheckFailed {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

fn throttled(operation: &'static str, err: &(dyn Error + 'static)) -> RepositoryError {
    RepositoryError::Throttled {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

fn store(operation: &'static str, err: &(dyn Error + 'static)) -> RepositoryError {
    RepositoryError::Store {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}
