//! API error type and [`axum::response::IntoResponse`] implementation.

use adhok_core::{ErrorKind, store::StoreError};
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error: domain failures keep their kind, anything else
  /// is an internal error.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    let message = e.to_string();
    match e.domain().map(adhok_core::Error::kind) {
      Some(ErrorKind::Unauthorized) => ApiError::Unauthorized(message),
      Some(ErrorKind::Forbidden) => ApiError::Forbidden(message),
      Some(ErrorKind::NotFound) => ApiError::NotFound(message),
      Some(ErrorKind::Conflict) => ApiError::Conflict(message),
      Some(ErrorKind::Invalid) => ApiError::BadRequest(message),
      None => {
        tracing::error!(error = %e, "store failure");
        ApiError::Store(Box::new(e))
      }
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match self {
      ApiError::Unauthorized(m)
      | ApiError::Forbidden(m)
      | ApiError::NotFound(m)
      | ApiError::Conflict(m)
      | ApiError::BadRequest(m) => m,
      ApiError::Store(e) => e.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
