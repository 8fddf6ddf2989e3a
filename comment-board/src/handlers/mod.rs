use crate::database::Database;
use crate::error::{AppError, AppResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;

// Question handlers module
pub mod question_handlers;

// Answer handlers module
pub mod answer_handlers;

/// Shared by every handler through `web::Data`.
pub struct AppState {
    pub database: Arc<Database>,
}

/// Handlers addressing an existing record take the raw body and parse it only
/// after the lookup, so an unknown id reports not-found whatever the body holds.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid request body: {e}")))
}

/// Like [`parse_body`], but an empty body means "no fields".
pub(crate) fn parse_optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_body(body)
}
