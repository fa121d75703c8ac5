//! Ownership/state guard run before the acceptance transaction.
//!
//! The guard is advisory: it reports early, precise errors to the caller,
//! but the transaction re-checks everything under its own isolation scope.

use uuid::Uuid;

use crate::{
  Error,
  bid::{Bid, BidStatus},
  project::{Project, ProjectStatus},
  store::MarketplaceStore,
};

/// Outcome of [`check_acceptance`]. Only [`AcceptVerdict::Allowed`] permits
/// acceptance; every lookup miss lands in a denying variant.
#[derive(Debug, Clone)]
pub enum AcceptVerdict {
  Allowed { bid: Bid, project: Project },
  BidMissing,
  ProjectMissing { project_id: Uuid },
  NotOwner { project_id: Uuid },
  NotAwardable { project_id: Uuid, status: ProjectStatus },
  BidSettled { status: BidStatus },
}

impl AcceptVerdict {
  pub fn may_accept(&self) -> bool { matches!(self, Self::Allowed { .. }) }

  /// Turn a denial into the matching domain error.
  pub fn into_result(self, bid_id: Uuid, client_id: Uuid) -> Result<(Bid, Project), Error> {
    match self {
      Self::Allowed { bid, project } => Ok((bid, project)),
      Self::BidMissing => Err(Error::BidNotFound(bid_id)),
      Self::ProjectMissing { project_id } => Err(Error::ProjectNotFound(project_id)),
      Self::NotOwner { project_id } => Err(Error::NotProjectOwner {
        user:    client_id,
        project: project_id,
      }),
      Self::NotAwardable { project_id, .. } => Err(Error::AlreadyAwarded(project_id)),
      Self::BidSettled { status } => Err(Error::BidSettled { bid: bid_id, status }),
    }
  }
}

/// Resolve the bid's project and check that `client_id` owns it and that it
/// can still be awarded. Never mutates.
pub async fn check_acceptance<S>(
  store: &S,
  bid_id: Uuid,
  client_id: Uuid,
) -> Result<AcceptVerdict, S::Error>
where
  S: MarketplaceStore,
{
  let Some(bid) = store.get_bid(bid_id).await? else {
    return Ok(AcceptVerdict::BidMissing);
  };
  let project_id = bid.project_id;
  let Some(project) = store.get_project(project_id).await? else {
    return Ok(AcceptVerdict::ProjectMissing { project_id });
  };

  if !project.is_owned_by(client_id) {
    return Ok(AcceptVerdict::NotOwner { project_id });
  }
  if !project.status.is_awardable() {
    return Ok(AcceptVerdict::NotAwardable { project_id, status: project.status });
  }
  if bid.status.is_final() {
    return Ok(AcceptVerdict::BidSettled { status: bid.status });
  }

  Ok(AcceptVerdict::Allowed { bid, project })
}
