//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the flatmatch API.

pub mod flats;
pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confirmation body returned by delete endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Confirmation {
    /// Human-readable confirmation of the action taken
    #[schema(example = "Flat deleted successfully")]
    pub message: String,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is alive", body = String, example = json!("OK"))
    ),
    tag = "health"
)]
pub async fn health() -> &'static str {
    "OK"
}
