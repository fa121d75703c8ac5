//! The `MarketplaceStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `adhok-store-sqlite`).
//! The workflow in this crate and the HTTP layer in `adhok-api` depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  award::Award,
  bid::{Bid, NewBid},
  notification::Notification,
  project::{NewProject, Project, ProjectQuery},
  tier::{ClientTier, Feature},
  user::{NewUser, User},
};

// ─── Error contract ──────────────────────────────────────────────────────────

/// Error type returned by a store backend.
///
/// Backends wrap [`crate::Error`] for domain failures and add their own
/// variants for infrastructure failures. [`StoreError::domain`] lets callers
/// tell the two apart without knowing the concrete backend.
pub trait StoreError:
  std::error::Error + From<crate::Error> + Send + Sync + 'static
{
  /// The domain error, or `None` for an infrastructure failure.
  fn domain(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Adhok marketplace store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MarketplaceStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Tiers ─────────────────────────────────────────────────────────────

  /// Record (or replace) the tier of a client.
  fn set_client_tier(
    &self,
    tier: ClientTier,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The recorded tier, expired or not. Callers decide what expiry means.
  fn get_client_tier(
    &self,
    client_id: Uuid,
  ) -> impl Future<Output = Result<Option<ClientTier>, Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  fn list_projects<'a>(
    &'a self,
    query: &'a ProjectQuery,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + 'a;

  /// Move a draft project to `open`. Only the owner may publish.
  fn publish_project(
    &self,
    project_id: Uuid,
    client_id: Uuid,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  /// Enable the per-project override for `feature`.
  fn unlock_feature(
    &self,
    project_id: Uuid,
    feature: Feature,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  // ── Bids ──────────────────────────────────────────────────────────────

  fn submit_bid(
    &self,
    input: NewBid,
  ) -> impl Future<Output = Result<Bid, Self::Error>> + Send + '_;

  fn get_bid(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Bid>, Self::Error>> + Send + '_;

  fn list_bids(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Bid>, Self::Error>> + Send + '_;

  /// Award the bid's project to the bid's talent in one atomic unit.
  ///
  /// Implementations must re-read the bid and project and re-check
  /// ownership under the same isolation scope as the writes, and must
  /// serialize concurrent awards on one project so exactly one succeeds.
  /// The loser fails with [`crate::Error::AlreadyAwarded`].
  fn award_bid(
    &self,
    bid_id: Uuid,
    client_id: Uuid,
  ) -> impl Future<Output = Result<Award, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn list_notifications(
    &self,
    user_id: Uuid,
    unread_only: bool,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Flip `read` to true. Fails with `NotificationNotFound` if the
  /// notification is missing or addressed to another user.
  fn mark_notification_read(
    &self,
    notification_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;
}
