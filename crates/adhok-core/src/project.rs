//! Projects: the unit of work a client posts and talent bid on.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, tier::Feature, user::Badge};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a project sits in its lifecycle. Statuses only move forward.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectStatus {
  Draft,
  Open,
  #[serde(alias = "picked_up")]
  #[strum(to_string = "in_progress", serialize = "picked_up")]
  InProgress,
  Awarded,
  Submitted,
  Revisions,
  Approved,
  Completed,
}

impl ProjectStatus {
  /// Statuses in which `talent_id` must be set.
  pub fn has_talent(self) -> bool {
    !matches!(self, Self::Draft | Self::Open)
  }

  /// A bid may be accepted only while no talent has been assigned.
  pub fn is_awardable(self) -> bool { !self.has_talent() }

  pub fn accepts_bids(self) -> bool { self == Self::Open }
}

// ─── Metadata ────────────────────────────────────────────────────────────────

/// A known, structured entry in a project's metadata history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectEvent {
  Awarded {
    bid_id:            Uuid,
    talent_id:         Uuid,
    hourly_rate_cents: i64,
    at:                DateTime<Utc>,
  },
  FeatureUnlocked {
    feature: Feature,
    at:      DateTime<Utc>,
  },
}

/// Project metadata: typed events first, an opaque map for everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
  #[serde(default)]
  pub events: Vec<ProjectEvent>,
  /// Genuinely open-ended client-supplied fields (skills, links, ...).
  #[serde(default)]
  pub extra:  BTreeMap<String, serde_json::Value>,
}

impl ProjectMetadata {
  pub fn push(&mut self, event: ProjectEvent) { self.events.push(event); }

  /// The award event, if the project has been awarded.
  pub fn award(&self) -> Option<&ProjectEvent> {
    self
      .events
      .iter()
      .find(|e| matches!(e, ProjectEvent::Awarded { .. }))
  }
}

// ─── Project ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub project_id:         Uuid,
  pub title:              String,
  pub status:             ProjectStatus,
  pub client_id:          Uuid,
  /// Set exactly when `status.has_talent()`.
  pub talent_id:          Option<Uuid>,
  pub min_badge:          Badge,
  /// Per-project override for [`Feature::AcceptBid`].
  pub accept_bid_enabled: bool,
  pub metadata:           ProjectMetadata,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl Project {
  pub fn is_owned_by(&self, client_id: Uuid) -> bool { self.client_id == client_id }

  /// Whether this project carries a per-project unlock for `feature`.
  pub fn overrides(&self, feature: Feature) -> bool {
    match feature {
      Feature::AcceptBid => self.accept_bid_enabled,
    }
  }
}

/// Input for [`MarketplaceStore::create_project`](crate::store::MarketplaceStore::create_project).
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
  pub client_id: Uuid,
  pub title:     String,
  #[serde(default)]
  pub min_badge: Badge,
  /// `draft` or `open`; defaults to `open`.
  pub status:    Option<ProjectStatus>,
  #[serde(default)]
  pub extra:     BTreeMap<String, serde_json::Value>,
}

impl NewProject {
  pub fn new(client_id: Uuid, title: impl Into<String>) -> Self {
    Self {
      client_id,
      title: title.into(),
      min_badge: Badge::None,
      status: None,
      extra: BTreeMap::new(),
    }
  }

  /// Check the input and resolve the initial status.
  pub fn validate(&self) -> Result<ProjectStatus> {
    if self.title.trim().is_empty() {
      return Err(Error::Invalid("project title must not be empty".into()));
    }
    match self.status.unwrap_or(ProjectStatus::Open) {
      s @ (ProjectStatus::Draft | ProjectStatus::Open) => Ok(s),
      other => Err(Error::Invalid(format!(
        "projects cannot be created as {other}"
      ))),
    }
  }
}

/// Parameters for [`MarketplaceStore::list_projects`](crate::store::MarketplaceStore::list_projects).
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
  pub client_id: Option<Uuid>,
  pub status:    Option<ProjectStatus>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}
