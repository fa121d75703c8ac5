//! The bid-acceptance workflow.
//!
//! 1. An identity must be present.
//! 2. The ownership/state guard must allow the acceptance.
//! 3. The client must be entitled to [`Feature::AcceptBid`], by tier or by a
//!    per-project unlock.
//! 4. The store's award transaction performs the state change and re-checks
//!    ownership and status under its own isolation.
//!
//! Steps 1–3 short-circuit before any write. No step is retried: a lost race
//! surfaces as [`Error::AlreadyAwarded`].

use uuid::Uuid;

use crate::{
  Error,
  award::Award,
  gate::check_feature,
  guard::check_acceptance,
  identity::Identity,
  store::MarketplaceStore,
  tier::Feature,
};

/// Accept `bid_id` on behalf of `actor`.
pub async fn accept_bid<S>(
  store: &S,
  actor: Option<Identity>,
  bid_id: Uuid,
) -> Result<Award, S::Error>
where
  S: MarketplaceStore,
{
  let Some(actor) = actor else {
    tracing::warn!(%bid_id, "bid acceptance without identity");
    return Err(Error::Unauthenticated.into());
  };
  let client_id = actor.user_id;

  let verdict = check_acceptance(store, bid_id, client_id).await?;
  let (_bid, project) = verdict.into_result(bid_id, client_id).map_err(|e| {
    tracing::warn!(%bid_id, %client_id, error = %e, "bid acceptance denied");
    e
  })?;

  if !check_feature(store, client_id, Feature::AcceptBid, Some(project.project_id)).await? {
    tracing::warn!(%bid_id, %client_id, "bid acceptance denied: feature not entitled");
    return Err(
      Error::FeatureNotEntitled {
        client:  client_id,
        feature: Feature::AcceptBid,
      }
      .into(),
    );
  }

  let award = store.award_bid(bid_id, client_id).await?;
  tracing::info!(
    project_id = %award.event.project_id,
    %bid_id,
    talent_id = %award.event.talent_id,
    rejected = award.rejected_bids.len(),
    "project awarded"
  );
  Ok(award)
}
