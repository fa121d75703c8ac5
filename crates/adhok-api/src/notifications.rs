//! Handlers for `/notifications` endpoints. Both act on the caller's own
//! notifications only.

use adhok_core::{notification::Notification, store::MarketplaceStore};
use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::Actor};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub unread_only: bool,
}

/// `GET /notifications[?unread_only=true]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: MarketplaceStore,
{
  let identity = actor.require()?;
  let notifications = state
    .store
    .list_notifications(identity.user_id, params.unread_only)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(notifications))
}

/// `POST /notifications/:id/read`
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError>
where
  S: MarketplaceStore,
{
  let identity = actor.require()?;
  let notification = state
    .store
    .mark_notification_read(id, identity.user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(notification))
}
