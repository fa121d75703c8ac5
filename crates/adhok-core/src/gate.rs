//! Feature-gate check: may this client use a gated feature right now?

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  project::Project,
  store::MarketplaceStore,
  tier::{ClientTier, Feature},
};

/// Pure decision: the tier grants `feature` and has not expired, or the
/// project carries an explicit unlock for it.
pub fn grants(
  tier: Option<&ClientTier>,
  project: Option<&Project>,
  feature: Feature,
  now: DateTime<Utc>,
) -> bool {
  tier.is_some_and(|t| t.grants(feature, now))
    || project.is_some_and(|p| p.overrides(feature))
}

/// Resolve the client's tier (and the project, if given) and decide.
///
/// Unknown users, non-client users and missing projects contribute nothing,
/// so they yield `false` rather than an error. Store failures propagate.
pub async fn check_feature<S>(
  store: &S,
  client_id: Uuid,
  feature: Feature,
  project_id: Option<Uuid>,
) -> Result<bool, S::Error>
where
  S: MarketplaceStore,
{
  let is_client = store
    .get_user(client_id)
    .await?
    .is_some_and(|u| u.is_client());
  if !is_client {
    tracing::debug!(%client_id, %feature, "feature gate: not a client");
    return Ok(false);
  }

  let tier = store.get_client_tier(client_id).await?;
  let project = match project_id {
    Some(id) => store
      .get_project(id)
      .await?
      .filter(|p| p.is_owned_by(client_id)),
    None => None,
  };

  let allowed = grants(tier.as_ref(), project.as_ref(), feature, Utc::now());
  tracing::debug!(%client_id, %feature, allowed, "feature gate");
  Ok(allowed)
}
