//! MongoDB client bootstrap for the flatmatch API.
//!
//! Connects once at startup with a bounded, fixed-delay retry loop and
//! creates the unique indexes the user collection relies on. Request
//! handling never retries store operations.

use std::time::Duration;

use anyhow::{Context, Result};
use mongodb::{
    Client, Database, IndexModel,
    bson::{Document, doc},
    options::{ClientOptions, IndexOptions},
};
use tokio::time::sleep;

use crate::config::AppConfig;

/// Errors that can occur while bootstrapping the store connection.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to MongoDB: {source}")]
    ConnectionFailed {
        #[from]
        source: mongodb::error::Error,
    },
    #[error("invalid store configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Connects to MongoDB, verifies the deployment with a ping and prepares
/// indexes. Retries `store_connect_attempts` times with a fixed delay; the
/// caller terminates the process when this fails.
pub async fn init_store(cfg: &AppConfig) -> Result<Database> {
    if cfg.mongo_uri.is_empty() {
        return Err(StoreError::InvalidConfiguration {
            message: "MongoDB connection string cannot be empty".to_string(),
        }
        .into());
    }

    let mut options = ClientOptions::parse(&cfg.mongo_uri)
        .await
        .map_err(|source| StoreError::ConnectionFailed { source })?;
    options.server_selection_timeout = Some(Duration::from_millis(cfg.store_selection_timeout_ms));
    options.app_name = Some("flatmatch".to_string());

    let client = Client::with_options(options)
        .map_err(|source| StoreError::ConnectionFailed { source })?;
    let db = client.database(&cfg.db_name);

    let retry_delay = Duration::from_millis(cfg.store_connect_delay_ms);
    let max_attempts = cfg.store_connect_attempts;

    for attempt in 1..=max_attempts {
        match db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                log::info!("connected to MongoDB (attempt {})", attempt);
                ensure_indexes(&db)
                    .await
                    .context("failed to create user indexes")?;
                return Ok(db);
            }
            Err(e) => {
                if attempt == max_attempts {
                    log::error!(
                        "failed to reach MongoDB after {} attempts: {}",
                        max_attempts,
                        e
                    );
                    return Err(StoreError::ConnectionFailed { source: e }.into());
                }

                log::warn!(
                    "MongoDB ping attempt {} failed: {}, retrying in {:?}",
                    attempt,
                    e,
                    retry_delay
                );
                sleep(retry_delay).await;
            }
        }
    }

    Err(StoreError::InvalidConfiguration {
        message: "store connect attempts must be at least 1".to_string(),
    }
    .into())
}

/// Unique sparse indexes backing the `userId`/`username` uniqueness
/// invariants; the application pre-check on create is only a courtesy.
async fn ensure_indexes(db: &Database) -> Result<()> {
    let users = db.collection::<Document>("users");

    for field in ["userId", "username"] {
        let options = IndexOptions::builder().unique(true).sparse(true).build();
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(options)
            .build();
        users.create_index(index).await?;
    }

    Ok(())
}
