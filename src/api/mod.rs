//! API module for the PolyRisk service.
//!
//! This module contains all HTTP-facing functionality.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::configure;

use std::sync::Arc;

use actix_web::{error::InternalError, web, HttpResponse};

use crate::ai::GeminiClient;
use crate::catalog::DrugCatalog;
use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::interactions::InteractionTable;
use crate::store::FileStore;

/// Shared state handed to every handler. Built once at startup; the
/// catalog and interaction table are immutable after construction.
pub struct AppState {
    pub catalog: Arc<DrugCatalog>,
    pub interactions: Arc<InteractionTable>,
    pub store: FileStore,
    pub ai: GeminiClient,
    pub auth: AuthConfig,
}

/// JSON extractor config that turns deserialization failures into the
/// service's own error body instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        let body = HttpResponse::BadRequest().json(serde_json::json!({
            "error": "invalid_request",
            "message": &message,
        }));
        InternalError::from_response(ApiError::Invalid(message), body).into()
    })
}
