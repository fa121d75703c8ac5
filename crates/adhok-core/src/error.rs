//! Error types for `adhok-core`.
//!
//! Every variant belongs to exactly one [`ErrorKind`], which the API layer
//! maps onto an HTTP status.

use thiserror::Error;
use uuid::Uuid;

use crate::{bid::BidStatus, project::ProjectStatus, tier::Feature};

/// Coarse classification of a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// No acting user could be resolved.
  Unauthorized,
  /// The user is known but not entitled to the operation.
  Forbidden,
  NotFound,
  /// The operation clashes with the current state (e.g. already awarded).
  Conflict,
  /// The input itself is malformed.
  Invalid,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("no acting user")]
  Unauthenticated,

  #[error("project not found: {0}")]
  ProjectNotFound(Uuid),

  #[error("bid not found: {0}")]
  BidNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  #[error("user {user} is not the owner of project {project}")]
  NotProjectOwner { user: Uuid, project: Uuid },

  #[error("user {0} is not a client")]
  NotAClient(Uuid),

  #[error("user {0} is not a talent")]
  NotATalent(Uuid),

  #[error("client {client} is not entitled to {feature}")]
  FeatureNotEntitled { client: Uuid, feature: Feature },

  #[error("talent {talent} does not hold the badge required by project {project}")]
  BadgeTooLow { talent: Uuid, project: Uuid },

  #[error("project {0} is already awarded")]
  AlreadyAwarded(Uuid),

  #[error("bid {bid} is already {status}")]
  BidSettled { bid: Uuid, status: BidStatus },

  #[error("project {project} is {status}, not open for bids")]
  NotOpenForBids { project: Uuid, status: ProjectStatus },

  #[error("project {project} cannot be published from status {status}")]
  NotPublishable { project: Uuid, status: ProjectStatus },

  #[error("talent {talent} already bid on project {project}")]
  DuplicateBid { talent: Uuid, project: Uuid },

  #[error("invalid input: {0}")]
  Invalid(String),

}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Unauthenticated => ErrorKind::Unauthorized,
      Error::NotProjectOwner { .. }
      | Error::NotAClient(_)
      | Error::NotATalent(_)
      | Error::FeatureNotEntitled { .. }
      | Error::BadgeTooLow { .. } => ErrorKind::Forbidden,
      Error::ProjectNotFound(_)
      | Error::BidNotFound(_)
      | Error::NotificationNotFound(_) => ErrorKind::NotFound,
      Error::AlreadyAwarded(_)
      | Error::BidSettled { .. }
      | Error::NotOpenForBids { .. }
      | Error::NotPublishable { .. }
      | Error::DuplicateBid { .. } => ErrorKind::Conflict,
      Error::Invalid(_) => ErrorKind::Invalid,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
