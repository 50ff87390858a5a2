//! Command line interface.
//!
//! `update` and `filter` only print the expressions the builders produce and
//! never touch the table. Every other command runs a repository operation.

use anyhow::Result;
use docdb_core::expression::{build_filter_expression, build_update_expression};
use docdb_core::query::{QueryDescriptor, QueryError};
use docdb_core::storage::{ContextOptions, Document, DocumentRepository};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::output::{render, OutputFormat};
use crate::storage::DocDatabase;

/// docdb - DynamoDB documents driven by placeholder expressions
#[derive(Debug, clap::Parser)]
#[command(name = "docdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: Global,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// DynamoDB table name
    #[arg(long, global = true, default_value = "docdb", env = "DOCDB_TABLE_NAME")]
    pub table_name: String,

    /// AWS region
    #[arg(long, global = true, default_value = "us-east-1", env = "AWS_REGION")]
    pub region: String,

    /// Custom endpoint, e.g. http://localhost:8000 for DynamoDB Local
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl Global {
    /// Repository configuration from the global flags.
    pub fn config(&self) -> Config {
        Config {
            table_name: self.table_name.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Print the update expression for a partial document
    Update {
        /// Partial document as a JSON object
        document: String,
    },

    /// Print the filter expression for a query descriptor
    Filter {
        /// Query descriptor as a JSON object
        query: String,

        /// Expression the generated clauses are appended to
        #[arg(long, default_value = "")]
        prefix: String,
    },

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that run against the configured table.
#[derive(Debug, clap::Subcommand)]
pub enum StoreCommand {
    /// Get an item by id
    Get {
        id: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Get every item under a hash key
    GetAll {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Create an item with a generated id
    Put {
        /// Document fields as a JSON object
        document: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Update the fields of an existing item; the document must carry its `id`
    Patch {
        /// Partial document as a JSON object
        document: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Delete an item by id
    Delete {
        id: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Scan for items matching a query descriptor
    Query {
        /// Query descriptor as a JSON object
        query: String,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct ContextArgs {
    /// Partition key of the item
    #[arg(long)]
    pub hash_key: String,

    /// Condition expression for writes, replacing the default
    #[arg(long)]
    pub condition: Option<String>,
}

impl ContextArgs {
    pub fn options(&self) -> ContextOptions {
        ContextOptions {
            hash_key: self.hash_key.clone(),
            condition_expression: self.condition.clone(),
        }
    }
}

/// Errors in command line input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
}

/// Parse a JSON object argument.
pub fn parse_document(raw: &str) -> Result<Document, InputError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(document) => Ok(document),
        other => Err(InputError::NotAnObject(other.to_string())),
    }
}

/// Parse a query descriptor argument.
pub fn parse_query(raw: &str) -> Result<QueryDescriptor, InputError> {
    Ok(QueryDescriptor::try_from(parse_document(raw)?)?)
}

/// Run a command and return its rendered output.
pub async fn execute(command: Commands, global: &Global) -> Result<String> {
    match command {
        Commands::Update { document } => {
            let fields = parse_document(&document)?;
            Ok(render(&build_update_expression(&fields), global.format)?)
        }
        Commands::Filter { query, prefix } => {
            let query = parse_query(&query)?;
            Ok(render(&build_filter_expression(&query, &prefix), global.format)?)
        }
        Commands::Store(command) => {
            let config = global.config();
            tracing::debug!(
                target_store = %config.target_display(),
                table = %config.table_name,
                "Connecting"
            );
            let repository: DocDatabase<Value> = DocDatabase::from_config(&config).await;
            run_store_command(&repository, command, global.format).await
        }
    }
}

/// Run a repository command against any document repository.
pub async fn run_store_command<R>(
    repository: &R,
    command: StoreCommand,
    format: OutputFormat,
) -> Result<String>
where
    R: DocumentRepository<Value> + ?Sized,
{
    let rendered = match command {
        StoreCommand::Get { id, context } => {
            render(&repository.get_item(&id, &context.options()).await?, format)?
        }
        StoreCommand::GetAll { context } => {
            render(&repository.get_all(&context.options()).await?, format)?
        }
        StoreCommand::Put { document, context } => {
            let document = parse_document(&document)?;
            render(&repository.create_item(document, &context.options()).await?, format)?
        }
        StoreCommand::Patch { document, context } => {
            let document = parse_document(&document)?;
            render(&repository.update_item(document, &context.options()).await?, format)?
        }
        StoreCommand::Delete { id, context } => {
            render(&repository.delete_item(&id, &context.options()).await?, format)?
        }
        StoreCommand::Query { query } => {
            let query = parse_query(&query)?;
            render(&repository.query(&query).await?, format)?
        }
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::Parser;
    use docdb_core::storage::{ItemResponse, ItemsResponse, RepositoryError};
    use serde_json::json;

    /// In-memory repository over a fixed set of documents.
    struct FakeRepository {
        items: Vec<Value>,
    }

    impl FakeRepository {
        fn new() -> Self {
            Self {
                items: vec![
                    json!({ "id": "1", "hashKey": "t", "name": "thyme" }),
                    json!({ "id": "2", "hashKey": "t", "name": "sage" }),
                    json!({ "id": "3", "hashKey": "u", "name": "dill" }),
                ],
            }
        }
    }

    #[async_trait]
    impl DocumentRepository<Value> for FakeRepository {
        async fn get_item(
            &self,
            id: &str,
            ctx: &ContextOptions,
        ) -> docdb_core::storage::Result<ItemResponse<Option<Value>>> {
            let item = self
                .items
                .iter()
                .find(|item| item["id"] == id && item["hashKey"] == ctx.hash_key.as_str())
                .cloned();
            Ok(ItemResponse {
                item,
                consumed_capacity: 0.5,
            })
        }

        async fn create_item(
            &self,
            params: Document,
            _ctx: &ContextOptions,
        ) -> docdb_core::storage::Result<ItemResponse<Value>> {
            Ok(ItemResponse {
                item: Value::Object(params),
                consumed_capacity: 0.0,
            })
        }

        async fn update_item(
            &self,
            partial: Document,
            ctx: &ContextOptions,
        ) -> docdb_core::storage::Result<ItemResponse<Value>> {
            if ctx.condition_expression.is_some() {
                return Err(RepositoryError::ConditionalCheckFailed {
                    operation: "UpdateItem",
                    message: "The conditional request failed".to_string(),
                });
            }
            Ok(ItemResponse {
                item: Value::Object(partial),
                consumed_capacity: 0.0,
            })
        }

        async fn get_all(
            &self,
            ctx: &ContextOptions,
        ) -> docdb_core::storage::Result<ItemsResponse<Value>> {
            let items: Vec<Value> = self
                .items
                .iter()
                .filter(|item| item["hashKey"] == ctx.hash_key.as_str())
                .cloned()
                .collect();
            Ok(ItemsResponse {
                count: items.len(),
                items,
                consumed_capacity: 0.0,
                last_scanned_id: None,
            })
        }

        async fn query(
            &self,
            query: &QueryDescriptor,
        ) -> docdb_core::storage::Result<ItemsResponse<Value>> {
            let limit = query.limit.map_or(self.items.len(), |limit| limit as usize);
            let items: Vec<Value> = self.items.iter().take(limit).cloned().collect();
            Ok(ItemsResponse {
                count: items.len(),
                items,
                consumed_capacity: 0.0,
                last_scanned_id: None,
            })
        }

        async fn delete_item(
            &self,
            _id: &str,
            _ctx: &ContextOptions,
        ) -> docdb_core::storage::Result<ItemResponse<()>> {
            Ok(ItemResponse {
                item: (),
                consumed_capacity: 1.0,
            })
        }
    }

    fn context(hash_key: &str) -> ContextArgs {
        ContextArgs {
            hash_key: hash_key.to_string(),
            condition: None,
        }
    }

    fn offline_global() -> Global {
        Global {
            table_name: "docdb".to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn test_parse_store_command_with_trailing_global_flag() {
        let cli = Cli::try_parse_from([
            "docdb", "get", "abc", "--hash-key", "t", "--format", "pretty",
        ])
        .unwrap();

        assert_eq!(cli.global.format, OutputFormat::Pretty);
        let Commands::Store(StoreCommand::Get { id, context }) = cli.command else {
            panic!("expected get command");
        };
        assert_eq!(id, "abc");
        assert_eq!(context.hash_key, "t");
        assert_eq!(context.condition, None);
    }

    #[test]
    fn test_parse_store_command_requires_hash_key() {
        assert!(Cli::try_parse_from(["docdb", "delete", "abc"]).is_err());
    }

    #[test]
    fn test_parse_filter_prefix_defaults_to_empty() {
        let cli = Cli::try_parse_from(["docdb", "filter", "{}"]).unwrap();

        let Commands::Filter { prefix, .. } = cli.command else {
            panic!("expected filter command");
        };
        assert_eq!(prefix, "");
    }

    #[test]
    fn test_global_config_ignores_empty_endpoint() {
        let mut global = offline_global();
        global.endpoint_url = Some(String::new());

        assert_eq!(global.config().endpoint_url, None);
    }

    #[test]
    fn test_parse_document_rejects_non_objects() {
        assert!(matches!(
            parse_document("[1, 2]"),
            Err(InputError::NotAnObject(_))
        ));
        assert!(matches!(
            parse_document("{not json"),
            Err(InputError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_query_rejects_unknown_control_fields() {
        assert!(matches!(
            parse_query(r#"{"$unknown": 1}"#),
            Err(InputError::InvalidQuery(QueryError::InvalidControlField { .. }))
        ));
    }

    #[tokio::test]
    async fn test_execute_filter_prints_expression() {
        let output = execute(
            Commands::Filter {
                query: r#"{"userId": "x", "$limit": 4}"#.to_string(),
                prefix: String::new(),
            },
            &offline_global(),
        )
        .await
        .unwrap();

        let rendered: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(rendered["FilterExpression"], json!("#userId = :userId"));
        assert_eq!(rendered["Limit"], json!(4));
        assert_eq!(rendered["ExpressionAttributeValues"][":userId"], json!("x"));
    }

    #[tokio::test]
    async fn test_execute_update_stamps_modified_at() {
        let output = execute(
            Commands::Update {
                document: r#"{"name": "thyme"}"#.to_string(),
            },
            &offline_global(),
        )
        .await
        .unwrap();

        let rendered: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            rendered["UpdateExpression"],
            json!("SET #name = :name, #modifiedAt = :modifiedAt")
        );
        assert!(rendered["ExpressionAttributeValues"][":modifiedAt"].is_string());
    }

    #[tokio::test]
    async fn test_get_renders_item_and_capacity() {
        let output = run_store_command(
            &FakeRepository::new(),
            StoreCommand::Get {
                id: "2".to_string(),
                context: context("t"),
            },
            OutputFormat::Json,
        )
        .await
        .unwrap();

        assert_eq!(
            output,
            r#"{"item":{"id":"2","hashKey":"t","name":"sage"},"consumedCapacity":0.5}"#
        );
    }

    #[tokio::test]
    async fn test_get_missing_item_renders_null() {
        let output = run_store_command(
            &FakeRepository::new(),
            StoreCommand::Get {
                id: "3".to_string(),
                context: context("t"),
            },
            OutputFormat::Json,
        )
        .await
        .unwrap();

        assert_eq!(output, r#"{"item":null,"consumedCapacity":0.5}"#);
    }

    #[tokio::test]
    async fn test_get_all_renders_partition() {
        let output = run_store_command(
            &FakeRepository::new(),
            StoreCommand::GetAll { context: context("t") },
            OutputFormat::Json,
        )
        .await
        .unwrap();

        let rendered: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(rendered["count"], json!(2));
        assert!(rendered.get("lastScannedId").is_none());
    }

    #[tokio::test]
    async fn test_query_applies_descriptor() {
        let output = run_store_command(
            &FakeRepository::new(),
            StoreCommand::Query {
                query: r#"{"$limit": 1}"#.to_string(),
            },
            OutputFormat::Json,
        )
        .await
        .unwrap();

        let rendered: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(rendered["items"], json!([{ "id": "1", "hashKey": "t", "name": "thyme" }]));
    }

    #[tokio::test]
    async fn test_put_rejects_invalid_document_before_writing() {
        let result = run_store_command(
            &FakeRepository::new(),
            StoreCommand::Put {
                document: "\"thyme\"".to_string(),
                context: context("t"),
            },
            OutputFormat::Json,
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::NotAnObject(_))
        ));
    }

    #[tokio::test]
    async fn test_patch_surfaces_repository_errors() {
        let result = run_store_command(
            &FakeRepository::new(),
            StoreCommand::Patch {
                document: r#"{"id": "1", "name": "basil"}"#.to_string(),
                context: ContextArgs {
                    hash_key: "t".to_string(),
                    condition: Some("attribute_exists(id)".to_string()),
                },
            },
            OutputFormat::Json,
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::ConditionalCheckFailed { .. })
        ));
    }
}
