use axum::response::{IntoResponse, Json, Response};
use serde_json::{Value, json};

use crate::error::ApiError;

/// Turns a named view and its data into a response.
///
/// Handlers only pick the view and build the context; how it is presented
/// (JSON, an HTML template engine, ...) is up to the implementation held in
/// the application state.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, context: Value) -> Result<Response, ApiError>;
}

/// Answers every view as `{"view": ..., "context": ...}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, view: &str, context: Value) -> Result<Response, ApiError> {
        Ok(Json(json!({
            "view": view,
            "context": context,
        }))
        .into_response())
    }
}

/// Serializes a view context, mapping failures to an internal error.
pub fn context<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::InternalError(e.to_string()))
}
