//! Handlers for `/projects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/projects` | Optional `?client_id`, `?status`, `?limit`, `?offset` |
//! | `POST` | `/projects` | Acting client creates; returns 201 |
//! | `GET`  | `/projects/:id` | 404 if not found |
//! | `POST` | `/projects/:id/publish` | Owner moves a draft to `open` |

use std::collections::BTreeMap;

use adhok_core::{
  project::{NewProject, Project, ProjectQuery, ProjectStatus},
  store::MarketplaceStore,
  user::Badge,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::Actor};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub client_id: Option<Uuid>,
  pub status:    Option<ProjectStatus>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

/// `GET /projects[?client_id=...][&status=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Project>>, ApiError>
where
  S: MarketplaceStore,
{
  let query = ProjectQuery {
    client_id: params.client_id,
    status:    params.status,
    limit:     params.limit,
    offset:    params.offset,
  };
  let projects = state
    .store
    .list_projects(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(projects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /projects`. The owner is the acting user.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:     String,
  #[serde(default)]
  pub min_badge: Badge,
  pub status:    Option<ProjectStatus>,
  #[serde(default)]
  pub extra:     BTreeMap<String, serde_json::Value>,
}

/// `POST /projects`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketplaceStore,
{
  let identity = actor.require()?;
  let project = state
    .store
    .create_project(NewProject {
      client_id: identity.user_id,
      title:     body.title,
      min_badge: body.min_badge,
      status:    body.status,
      extra:     body.extra,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(project)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /projects/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError>
where
  S: MarketplaceStore,
{
  let project = state
    .store
    .get_project(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("project {id} not found")))?;
  Ok(Json(project))
}

// ─── Publish ──────────────────────────────────────────────────────────────────

/// `POST /projects/:id/publish`
pub async fn publish<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError>
where
  S: MarketplaceStore,
{
  let identity = actor.require()?;
  let project = state
    .store
    .publish_project(id, identity.user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(project))
}
