//! DynamoDB repository implementation.
//!
//! Implements `DocumentRepository` and `ScanExecutor` from `docdb_core::storage`
//! over a single table keyed by `hashKey` and `id`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{ReturnConsumedCapacity, ReturnValue, Select};
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use docdb_core::expression::{
    build_key_condition, build_update_expression, timestamp, FilterExpression, MODIFIED_AT_FIELD,
};
use docdb_core::query::{run_query, QueryDescriptor};
use docdb_core::storage::{
    ContextOptions, Document, DocumentRepository, ItemResponse, ItemsResponse, RepositoryError,
    Result, ScanExecutor, ScanPage,
};

use super::client::create_client;
use super::conversions::{
    capacity_units, document_to_item, document_to_typed, item_to_typed, page_to_response,
    placeholder_names, placeholder_values, scan_page, start_key_to_item,
};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_scan_error, map_update_item_error,
};
use super::keys::{self, CREATED_AT_ATTRIBUTE, HASH_KEY_ATTRIBUTE, ID_ATTRIBUTE};
use crate::config::Config;

/// Generates ids for new documents.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// DynamoDB-based document repository.
///
/// `T` is the document type items are deserialized into.
pub struct DocDatabase<T> {
    client: Client,
    table_name: String,
    id_generator: IdGenerator,
    _document: PhantomData<fn() -> T>,
}

impl<T> DocDatabase<T> {
    /// Creates a new repository with the given DynamoDB client and table name.
    ///
    /// New documents get UUID v4 ids.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            id_generator: Arc::new(|| Uuid::new_v4().to_string()),
            _document: PhantomData,
        }
    }

    /// Creates a new repository from explicit configuration.
    pub async fn from_config(config: &Config) -> Self {
        Self::new(create_client(config).await, config.table_name.clone())
    }

    /// Creates a new repository from environment configuration.
    ///
    /// Uses the AWS SDK default credential chain; see [`Config::from_env`].
    pub async fn from_env() -> Self {
        Self::from_config(&Config::from_env()).await
    }

    /// Replaces the id generator used by `create_item`.
    pub fn with_id_generator(mut self, generator: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

// ============================================================================
// ScanExecutor implementation
// ============================================================================

#[async_trait]
impl<T> ScanExecutor for DocDatabase<T>
where
    T: Send + Sync + 'static,
{
    async fn scan(&self, filter: FilterExpression) -> Result<ScanPage> {
        // Scan has no ordering parameter; direction only applies to Query.
        let FilterExpression {
            filter_expression,
            attributes,
            limit,
            scan_index_forward: _,
            exclusive_start_key,
        } = filter;

        let exclusive_start_key = exclusive_start_key
            .as_ref()
            .map(start_key_to_item)
            .transpose()?;

        tracing::debug!(
            table = %self.table_name,
            filter = %filter_expression,
            limit = ?limit,
            "Scan"
        );

        let mut request = self
            .client
            .scan()
            .table_name(&self.table_name)
            .select(Select::AllAttributes)
            .set_limit(limit.map(|limit| i32::try_from(limit).unwrap_or(i32::MAX)))
            .set_exclusive_start_key(exclusive_start_key)
            .return_consumed_capacity(ReturnConsumedCapacity::Total);

        // DynamoDB rejects empty filter expressions and empty placeholder maps.
        if !filter_expression.is_empty() {
            let values = placeholder_values(&attributes);
            request = request
                .filter_expression(filter_expression)
                .set_expression_attribute_names(Some(placeholder_names(&attributes)))
                .set_expression_attribute_values((!values.is_empty()).then_some(values));
        }

        let result = request.send().await.map_err(map_scan_error)?;

        scan_page(
            result.items,
            result.count,
            result.consumed_capacity.as_ref(),
            result.last_evaluated_key.as_ref(),
        )
    }
}

// ============================================================================
// DocumentRepository implementation
// ============================================================================

#[async_trait]
impl<T> DocumentRepository<T> for DocDatabase<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn get_item(&self, id: &str, ctx: &ContextOptions) -> Result<ItemResponse<Option<T>>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(keys::primary_key(&ctx.hash_key, id)))
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(map_get_item_error)?;

        let item = result.item.as_ref().map(item_to_typed).transpose()?;

        Ok(ItemResponse {
            item,
            consumed_capacity: capacity_units(result.consumed_capacity.as_ref()),
        })
    }

    async fn create_item(&self, params: Document, ctx: &ContextOptions) -> Result<ItemResponse<T>> {
        let document = new_document(params, (self.id_generator)(), &ctx.hash_key, Utc::now());
        let condition = ctx
            .condition_expression
            .clone()
            .unwrap_or_else(|| keys::DEFAULT_CREATE_CONDITION.to_string());

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(document_to_item(&document)))
            .condition_expression(condition)
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(map_put_item_error)?;

        let consumed_capacity = capacity_units(result.consumed_capacity.as_ref());
        tracing::info!(
            table = %self.table_name,
            id = ?document.get(ID_ATTRIBUTE),
            consumed_capacity = ?consumed_capacity,
            "Created item"
        );

        Ok(ItemResponse {
            item: document_to_typed(document)?,
            consumed_capacity,
        })
    }

    async fn update_item(&self, partial: Document, ctx: &ContextOptions) -> Result<ItemResponse<T>> {
        let (id, fields) = split_id(partial)?;
        let update = build_update_expression(&fields);

        tracing::debug!(
            table = %self.table_name,
            id = %id,
            update = %update.update_expression,
            "UpdateItem"
        );

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(keys::primary_key(&ctx.hash_key, &id)))
            .set_expression_attribute_names(Some(placeholder_names(&update.attributes)))
            .set_expression_attribute_values(Some(placeholder_values(&update.attributes)))
            .update_expression(update.update_expression)
            .set_condition_expression(ctx.condition_expression.clone())
            .return_values(ReturnValue::AllNew)
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(map_update_item_error)?;

        let attributes = result.attributes.as_ref().ok_or_else(|| {
            RepositoryError::InvalidData(format!("UpdateItem returned no attributes for {id}"))
        })?;

        Ok(ItemResponse {
            item: item_to_typed(attributes)?,
            consumed_capacity: capacity_units(result.consumed_capacity.as_ref()),
        })
    }

    async fn get_all(&self, ctx: &ContextOptions) -> Result<ItemsResponse<T>> {
        let condition = build_key_condition(&keys::partition_key_fields(&ctx.hash_key));

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression(condition.key_condition_expression)
            .set_expression_attribute_names(Some(placeholder_names(&condition.attributes)))
            .set_expression_attribute_values(Some(placeholder_values(&condition.attributes)))
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(map_query_error)?;

        let page = scan_page(
            result.items,
            result.count,
            result.consumed_capacity.as_ref(),
            result.last_evaluated_key.as_ref(),
        )?;

        page_to_response(page)
    }

    async fn query(&self, query: &QueryDescriptor) -> Result<ItemsResponse<T>> {
        let page = match run_query(self, query).await {
            Ok(page) => page,
            Err(err @ RepositoryError::UnsupportedQuery(_)) => {
                tracing::warn!(table = %self.table_name, error = %err, "Rejected query");
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            table = %self.table_name,
            count = page.count,
            consumed_capacity = ?page.consumed_capacity,
            "Query complete"
        );

        page_to_response(page)
    }

    async fn delete_item(&self, id: &str, ctx: &ContextOptions) -> Result<ItemResponse<()>> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(keys::primary_key(&ctx.hash_key, id)))
            .set_condition_expression(ctx.condition_expression.clone())
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(ItemResponse {
            item: (),
            consumed_capacity: capacity_units(result.consumed_capacity.as_ref()),
        })
    }
}

// ============================================================================
// Document shaping
// ============================================================================

/// Assemble a new document: generated id, caller fields, key and creation stamps.
///
/// Caller fields may replace the generated id; the hash key and stamps always win.
fn new_document(params: Document, id: String, hash_key: &str, now: DateTime<Utc>) -> Document {
    let stamp = Value::String(timestamp(now));

    let mut document = Document::new();
    document.insert(ID_ATTRIBUTE.to_string(), Value::String(id));
    document.extend(params);
    document.insert(
        HASH_KEY_ATTRIBUTE.to_string(),
        Value::String(hash_key.to_string()),
    );
    document.insert(CREATED_AT_ATTRIBUTE.to_string(), stamp.clone());
    document.insert(MODIFIED_AT_FIELD.to_string(), stamp);
    document
}

/// Split the item id off a partial update.
fn split_id(mut partial: Document) -> Result<(String, Document)> {
    match partial.shift_remove(ID_ATTRIBUTE) {
        Some(Value::String(id)) => Ok((id, partial)),
        Some(other) => Err(RepositoryError::InvalidData(format!(
            "Update id must be a string, got {other}"
        ))),
        None => Err(RepositoryError::InvalidData(
            "Update requires an `id` field".to_string(),
        )),
    }
}
