//! Test utilities for document store testing.
//!
//! Integration tests run against a live MongoDB instance when one is
//! reachable. Each test gets its own throwaway database and drops it on
//! the way out; tests skip cleanly when no store is available.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::Result;
use mongodb::{Client, Database, bson::doc, options::ClientOptions};

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Connects to the test store and returns a uniquely-named database.
///
/// Returns `Ok(None)` when no store is reachable so callers can skip.
pub async fn setup_test_db() -> Result<Option<Database>> {
    let uri = std::env::var("FLATMATCH_TEST_MONGO_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mut options = ClientOptions::parse(&uri).await?;
    options.server_selection_timeout = Some(Duration::from_millis(500));
    options.app_name = Some("flatmatch-tests".to_string());
    let client = Client::with_options(options)?;

    let name = format!(
        "flatmatch-test-{}-{}",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let db = client.database(&name);

    if db.run_command(doc! { "ping": 1 }).await.is_err() {
        eprintln!("document store unavailable at {uri}; skipping test");
        return Ok(None);
    }

    Ok(Some(db))
}

/// Drops the test database. Cleanup failures are not fatal to the test.
pub async fn teardown_test_db(db: Database) {
    if let Err(e) = db.drop().await {
        eprintln!("failed to drop test database: {e}");
    }
}
