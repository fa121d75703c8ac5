//! JSON REST API for Adhok.
//!
//! Exposes an axum [`Router`] backed by any
//! [`adhok_core::store::MarketplaceStore`]. The acting user is read from a
//! header set by the upstream identity provider; TLS and session handling
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", adhok_api::api_router(state))
//! ```

pub mod bids;
pub mod error;
pub mod identity;
pub mod notifications;
pub mod projects;

use std::sync::Arc;

use adhok_core::store::MarketplaceStore;
use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;
pub use identity::IdentityConfig;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: MarketplaceStore> {
  pub store:    Arc<S>,
  pub identity: Arc<IdentityConfig>,
}

impl<S: MarketplaceStore> AppState<S> {
  pub fn new(store: S, identity: IdentityConfig) -> Self {
    Self {
      store:    Arc::new(store),
      identity: Arc::new(identity),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: MarketplaceStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Projects
    .route("/projects", get(projects::list::<S>).post(projects::create::<S>))
    .route("/projects/{id}", get(projects::get_one::<S>))
    .route("/projects/{id}/publish", post(projects::publish::<S>))
    // Bids
    .route("/projects/{id}/bids", get(bids::list::<S>).post(bids::submit::<S>))
    .route("/bids/{id}/accept", post(bids::accept::<S>))
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .route("/notifications/{id}/read", post(notifications::mark_read::<S>))
    .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use adhok_core::{
    bid::NewBid,
    project::NewProject,
    tier::{ClientTier, Feature},
    user::{Badge, NewUser, Role},
  };
  use adhok_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
  };
  use chrono::{Duration, Utc};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(store, IdentityConfig::default())
  }

  async fn add_user(state: &AppState<SqliteStore>, role: Role) -> Uuid {
    state
      .store
      .add_user(NewUser {
        role,
        display_name: role.to_string(),
        badge: Badge::Gold,
      })
      .await
      .unwrap()
      .user_id
  }

  async fn entitled_client(state: &AppState<SqliteStore>) -> Uuid {
    let client = add_user(state, Role::Client).await;
    state
      .store
      .set_client_tier(ClientTier {
        client_id:       client,
        tier:            "pro".into(),
        features:        vec![Feature::AcceptBid],
        tier_expires_at: Some(Utc::now() + Duration::days(30)),
      })
      .await
      .unwrap();
    client
  }

  /// An entitled client's open project with one bid on it.
  async fn seeded(state: &AppState<SqliteStore>) -> (Uuid, Uuid, Uuid) {
    let client = entitled_client(state).await;
    let talent = add_user(state, Role::Talent).await;
    let project = state
      .store
      .create_project(NewProject::new(client, "P100"))
      .await
      .unwrap()
      .project_id;
    let bid = state
      .store
      .submit_bid(NewBid {
        project_id: project,
        talent_id: talent,
        hourly_rate_cents: 7500,
      })
      .await
      .unwrap()
      .bid_id;
    (client, project, bid)
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    actor: Option<Uuid>,
    body: Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = actor {
      builder = builder.header("x-adhok-user", id.to_string());
    }
    let req = match body {
      Some(json) => builder
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Accept ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn accept_without_identity_is_401() {
    let state = make_state().await;
    let (_, _, bid) = seeded(&state).await;

    let resp = send(state, "POST", &format!("/bids/{bid}/accept"), None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn accept_with_malformed_identity_is_401() {
    let state = make_state().await;
    let (_, _, bid) = seeded(&state).await;

    let req = Request::builder()
      .method("POST")
      .uri(format!("/bids/{bid}/accept"))
      .header("x-adhok-user", "someone")
      .body(Body::empty())
      .unwrap();
    let resp = api_router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn accept_by_owner_succeeds_then_conflicts() {
    let state = make_state().await;
    let (client, project, bid) = seeded(&state).await;
    let uri = format!("/bids/{bid}/accept");

    let resp = send(state.clone(), "POST", &uri, Some(client), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "success": true }));

    let resp = send(state.clone(), "GET", &format!("/projects/{project}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "awarded");

    let resp = send(state, "POST", &uri, Some(client), None).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn accept_by_non_owner_is_403() {
    let state = make_state().await;
    let (_, project, bid) = seeded(&state).await;
    let stranger = entitled_client(&state).await;

    let resp = send(state.clone(), "POST", &format!("/bids/{bid}/accept"), Some(stranger), None)
      .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let project = state.store.get_project(project).await.unwrap().unwrap();
    assert_eq!(project.talent_id, None);
  }

  #[tokio::test]
  async fn accept_without_entitlement_is_403() {
    let state = make_state().await;
    let client = add_user(&state, Role::Client).await;
    let talent = add_user(&state, Role::Talent).await;
    let project = state
      .store
      .create_project(NewProject::new(client, "Logo"))
      .await
      .unwrap()
      .project_id;
    let bid = state
      .store
      .submit_bid(NewBid {
        project_id: project,
        talent_id: talent,
        hourly_rate_cents: 5000,
      })
      .await
      .unwrap()
      .bid_id;

    let resp = send(state, "POST", &format!("/bids/{bid}/accept"), Some(client), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn accept_unknown_bid_is_404() {
    let state = make_state().await;
    let client = entitled_client(&state).await;

    let resp = send(
      state,
      "POST",
      &format!("/bids/{}/accept", Uuid::new_v4()),
      Some(client),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Projects and bids ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_publish_and_bid_flow() {
    let state = make_state().await;
    let client = add_user(&state, Role::Client).await;
    let talent = add_user(&state, Role::Talent).await;

    let resp = send(
      state.clone(),
      "POST",
      "/projects",
      Some(client),
      Some(json!({ "title": "Landing page", "status": "draft" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["status"], "draft");
    assert_eq!(created["client_id"], client.to_string());
    let project = created["project_id"].as_str().unwrap().to_owned();

    // Drafts do not take bids.
    let bids_uri = format!("/projects/{project}/bids");
    let resp = send(
      state.clone(),
      "POST",
      &bids_uri,
      Some(talent),
      Some(json!({ "hourly_rate_cents": 6000 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = send(
      state.clone(),
      "POST",
      &format!("/projects/{project}/publish"),
      Some(client),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "open");

    let resp = send(
      state.clone(),
      "POST",
      &bids_uri,
      Some(talent),
      Some(json!({ "hourly_rate_cents": 6000 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["status"], "pending");

    // Only the owner sees the bids.
    let resp = send(state.clone(), "GET", &bids_uri, Some(talent), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(state, "GET", &bids_uri, Some(client), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn invalid_bid_rate_is_400() {
    let state = make_state().await;
    let client = add_user(&state, Role::Client).await;
    let talent = add_user(&state, Role::Talent).await;
    let project = state
      .store
      .create_project(NewProject::new(client, "Rates"))
      .await
      .unwrap()
      .project_id;

    let resp = send(
      state,
      "POST",
      &format!("/projects/{project}/bids"),
      Some(talent),
      Some(json!({ "hourly_rate_cents": 0 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn list_projects_filters_by_status() {
    let state = make_state().await;
    let (client, _, bid) = seeded(&state).await;
    state
      .store
      .create_project(NewProject::new(client, "Second"))
      .await
      .unwrap();
    send(state.clone(), "POST", &format!("/bids/{bid}/accept"), Some(client), None).await;

    let resp = send(state.clone(), "GET", "/projects?status=open", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let open = body_json(resp).await;
    assert_eq!(open.as_array().unwrap().len(), 1);
    assert_eq!(open[0]["title"], "Second");

    let resp = send(state, "GET", "/projects?status=awarded", None, None).await;
    assert_eq!(body_json(resp).await[0]["title"], "P100");
  }

  #[tokio::test]
  async fn get_unknown_project_is_404() {
    let state = make_state().await;
    let resp = send(state, "GET", &format!("/projects/{}", Uuid::new_v4()), None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Notifications ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn award_notifies_client_who_can_mark_read() {
    let state = make_state().await;
    let (client, _, bid) = seeded(&state).await;
    send(state.clone(), "POST", &format!("/bids/{bid}/accept"), Some(client), None).await;

    let resp = send(state.clone(), "GET", "/notifications?unread_only=true", Some(client), None)
      .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list = body_json(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["kind"], "bid_accept_confirmed");
    let id = list[0]["notification_id"].as_str().unwrap().to_owned();

    let stranger = add_user(&state, Role::Client).await;
    let uri = format!("/notifications/{id}/read");
    let resp = send(state.clone(), "POST", &uri, Some(stranger), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(state.clone(), "POST", &uri, Some(client), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["read"], true);

    let resp = send(state, "GET", "/notifications?unread_only=true", Some(client), None).await;
    assert!(body_json(resp).await.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn notifications_require_identity() {
    let state = make_state().await;
    let resp = send(state, "GET", "/notifications", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
