//! Handlers for bid endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/projects/:id/bids` | Owner only |
//! | `POST` | `/projects/:id/bids` | Talent submits `{"hourly_rate_cents": 7500}`; returns 201 |
//! | `POST` | `/bids/:id/accept` | Bid-acceptance workflow; returns `{"success": true}` |

use adhok_core::{
  accept::accept_bid,
  bid::{Bid, NewBid},
  store::MarketplaceStore,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::Actor};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /projects/:id/bids`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Bid>>, ApiError>
where
  S: MarketplaceStore,
{
  let identity = actor.require()?;
  let project = state
    .store
    .get_project(project_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("project {project_id} not found")))?;
  if !project.is_owned_by(identity.user_id) {
    return Err(ApiError::Forbidden(format!(
      "user {} does not own project {project_id}",
      identity.user_id
    )));
  }

  let bids = state
    .store
    .list_bids(project_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(bids))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub hourly_rate_cents: i64,
}

/// `POST /projects/:id/bids`: the acting user bids as talent.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  Path(project_id): Path<Uuid>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketplaceStore,
{
  let identity = actor.require()?;
  let bid = state
    .store
    .submit_bid(NewBid {
      project_id,
      talent_id: identity.user_id,
      hourly_rate_cents: body.hourly_rate_cents,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(bid)))
}

// ─── Accept ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
  pub success: bool,
}

/// `POST /bids/:id/accept`
///
/// The identity is handed to the workflow as-is; a missing one becomes 401
/// there, before any store access.
pub async fn accept<S>(
  State(state): State<AppState<S>>,
  Actor(identity): Actor,
  Path(bid_id): Path<Uuid>,
) -> Result<Json<AcceptResponse>, ApiError>
where
  S: MarketplaceStore,
{
  accept_bid(state.store.as_ref(), identity, bid_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(AcceptResponse { success: true }))
}
