//! In-memory fixture store for exercising the workflow without a database.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  award::{Award, AwardEvent},
  bid::{Bid, BidStatus, NewBid},
  notification::Notification,
  project::{NewProject, Project, ProjectMetadata, ProjectQuery, ProjectStatus},
  store::{MarketplaceStore, StoreError},
  tier::{ClientTier, Feature},
  user::{Badge, NewUser, Role, User},
};

#[derive(Debug, Error)]
pub enum FixtureError {
  #[error(transparent)]
  Domain(#[from] crate::Error),
}

impl StoreError for FixtureError {
  fn domain(&self) -> Option<&crate::Error> {
    match self {
      FixtureError::Domain(e) => Some(e),
    }
  }
}

#[derive(Default)]
pub struct FixtureStore {
  users:       Mutex<HashMap<Uuid, User>>,
  tiers:       Mutex<HashMap<Uuid, ClientTier>>,
  projects:    Mutex<HashMap<Uuid, Project>>,
  bids:        Mutex<HashMap<Uuid, Bid>>,
  award_calls: AtomicUsize,
}

impl FixtureStore {
  fn user(&self, role: Role) -> Uuid {
    let user = User {
      user_id:      Uuid::new_v4(),
      role,
      display_name: format!("{role} fixture"),
      badge:        Badge::None,
      created_at:   Utc::now(),
    };
    let id = user.user_id;
    self.users.lock().unwrap().insert(id, user);
    id
  }

  pub fn client(&self) -> Uuid { self.user(Role::Client) }

  pub fn talent(&self) -> Uuid { self.user(Role::Talent) }

  pub fn tier(&self, tier: ClientTier) {
    self.tiers.lock().unwrap().insert(tier.client_id, tier);
  }

  pub fn project(&self, client_id: Uuid, edit: impl FnOnce(&mut Project)) -> Uuid {
    let now = Utc::now();
    let mut project = Project {
      project_id: Uuid::new_v4(),
      title: "Fixture project".into(),
      status: ProjectStatus::Open,
      client_id,
      talent_id: None,
      min_badge: Badge::None,
      accept_bid_enabled: false,
      metadata: ProjectMetadata::default(),
      created_at: now,
      updated_at: now,
    };
    edit(&mut project);
    let id = project.project_id;
    self.projects.lock().unwrap().insert(id, project);
    id
  }

  pub fn remove_project(&self, project_id: Uuid) {
    self.projects.lock().unwrap().remove(&project_id);
  }

  pub fn bid(&self, project_id: Uuid, talent_id: Uuid) -> Uuid {
    let now = Utc::now();
    let bid = Bid {
      bid_id: Uuid::new_v4(),
      project_id,
      talent_id,
      hourly_rate_cents: 5_000,
      status: BidStatus::Pending,
      created_at: now,
      updated_at: now,
    };
    let id = bid.bid_id;
    self.bids.lock().unwrap().insert(id, bid);
    id
  }

  pub fn set_bid_status(&self, bid_id: Uuid, status: BidStatus) {
    if let Some(bid) = self.bids.lock().unwrap().get_mut(&bid_id) {
      bid.status = status;
    }
  }

  pub fn award_calls(&self) -> usize { self.award_calls.load(Ordering::SeqCst) }
}

impl MarketplaceStore for FixtureStore {
  type Error = FixtureError;

  async fn add_user(&self, _: NewUser) -> Result<User, FixtureError> { unimplemented!() }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>, FixtureError> {
    Ok(self.users.lock().unwrap().get(&id).cloned())
  }

  async fn set_client_tier(&self, tier: ClientTier) -> Result<(), FixtureError> {
    self.tier(tier);
    Ok(())
  }

  async fn get_client_tier(&self, client_id: Uuid) -> Result<Option<ClientTier>, FixtureError> {
    Ok(self.tiers.lock().unwrap().get(&client_id).cloned())
  }

  async fn create_project(&self, _: NewProject) -> Result<Project, FixtureError> { unimplemented!() }

  async fn get_project(&self, id: Uuid) -> Result<Option<Project>, FixtureError> {
    Ok(self.projects.lock().unwrap().get(&id).cloned())
  }

  async fn list_projects(&self, _: &ProjectQuery) -> Result<Vec<Project>, FixtureError> { unimplemented!() }

  async fn publish_project(&self, _: Uuid, _: Uuid) -> Result<Project, FixtureError> { unimplemented!() }

  async fn unlock_feature(&self, _: Uuid, _: Feature) -> Result<Project, FixtureError> { unimplemented!() }

  async fn submit_bid(&self, _: NewBid) -> Result<Bid, FixtureError> { unimplemented!() }

  async fn get_bid(&self, id: Uuid) -> Result<Option<Bid>, FixtureError> {
    Ok(self.bids.lock().unwrap().get(&id).cloned())
  }

  async fn list_bids(&self, _: Uuid) -> Result<Vec<Bid>, FixtureError> { unimplemented!() }

  async fn award_bid(&self, bid_id: Uuid, client_id: Uuid) -> Result<Award, FixtureError> {
    self.award_calls.fetch_add(1, Ordering::SeqCst);

    let mut bids = self.bids.lock().unwrap();
    let mut projects = self.projects.lock().unwrap();

    let bid = bids.get(&bid_id).cloned().ok_or(crate::Error::BidNotFound(bid_id))?;
    let project = projects
      .get_mut(&bid.project_id)
      .ok_or(crate::Error::ProjectNotFound(bid.project_id))?;
    // Same re-checks as a real backend's transaction.
    if !project.is_owned_by(client_id) {
      return Err(
        crate::Error::NotProjectOwner {
          user:    client_id,
          project: project.project_id,
        }
        .into(),
      );
    }
    if !project.status.is_awardable() {
      return Err(crate::Error::AlreadyAwarded(project.project_id).into());
    }
    if bid.status.is_final() {
      return Err(crate::Error::BidSettled { bid: bid_id, status: bid.status }.into());
    }

    let event = AwardEvent {
      project_id: project.project_id,
      bid_id,
      talent_id: bid.talent_id,
      client_id,
      hourly_rate_cents: bid.hourly_rate_cents,
      at: Utc::now(),
    };
    project.status = ProjectStatus::Awarded;
    project.talent_id = Some(bid.talent_id);

    let mut rejected_bids = vec![];
    for b in bids.values_mut().filter(|b| b.project_id == event.project_id) {
      if b.bid_id == bid_id {
        b.status = BidStatus::Accepted;
      } else {
        b.status = BidStatus::Rejected;
        rejected_bids.push(b.bid_id);
      }
    }

    Ok(Award {
      event,
      project: project.clone(),
      bid: bids[&bid_id].clone(),
      rejected_bids,
      notifications: vec![],
    })
  }

  async fn list_notifications(&self, _: Uuid, _: bool) -> Result<Vec<Notification>, FixtureError> {
    unimplemented!()
  }

  async fn mark_notification_read(&self, _: Uuid, _: Uuid) -> Result<Notification, FixtureError> {
    unimplemented!()
  }
}
