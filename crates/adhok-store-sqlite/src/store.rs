//! [`SqliteStore`], the SQLite implementation of [`MarketplaceStore`].

use std::{path::Path, time::Duration};

use adhok_core::{
  Error as Domain,
  award::Award,
  bid::{Bid, BidStatus, NewBid},
  notification::Notification,
  project::{NewProject, Project, ProjectEvent, ProjectMetadata, ProjectQuery, ProjectStatus},
  store::MarketplaceStore,
  tier::{ClientTier, Feature},
  user::{Badge, NewUser, User},
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Result,
  award::{self, AwardOutcome},
  encode::{
    BID_COLUMNS, NOTIFICATION_COLUMNS, PROJECT_COLUMNS, RawBid, RawNotification, RawProject,
    RawTier, RawUser, encode_dt, encode_features, encode_uuid, enum_from_sql, json_to_sql,
    metadata_from_sql,
  },
  schema::SCHEMA,
};

/// How long a connection waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Adhok marketplace store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Several
/// stores may also be opened on the same file; writes that must not
/// interleave run in `IMMEDIATE` transactions.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a user and require a role, mapping a miss onto `missing`.
  async fn require_user(
    &self,
    user_id: Uuid,
    accept: fn(&User) -> bool,
    missing: Domain,
  ) -> Result<User> {
    match self.get_user(user_id).await? {
      Some(u) if accept(&u) => Ok(u),
      _ => Err(missing.into()),
    }
  }
}

// ─── MarketplaceStore impl ───────────────────────────────────────────────────

impl MarketplaceStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    if input.display_name.trim().is_empty() {
      return Err(Domain::Invalid("display name must not be empty".into()).into());
    }

    let user = User {
      user_id:      Uuid::new_v4(),
      role:         input.role,
      display_name: input.display_name,
      badge:        input.badge,
      created_at:   Utc::now(),
    };

    let id_str    = encode_uuid(user.user_id);
    let role_str  = user.role.as_ref().to_owned();
    let name      = user.display_name.clone();
    let badge_str = user.badge.as_ref().to_owned();
    let at_str    = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, role, display_name, badge, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, role_str, name, badge_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| Ok(RawUser::select(conn, &id_str)?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Tiers ─────────────────────────────────────────────────────────────────

  async fn set_client_tier(&self, tier: ClientTier) -> Result<()> {
    self
      .require_user(tier.client_id, User::is_client, Domain::NotAClient(tier.client_id))
      .await?;

    let client_str   = encode_uuid(tier.client_id);
    let features_str = encode_features(&tier.features)?;
    let expires_str  = tier.tier_expires_at.map(encode_dt);
    let tier_name    = tier.tier;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO client_tiers (client_id, tier, features, tier_expires_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (client_id) DO UPDATE SET
             tier            = excluded.tier,
             features        = excluded.features,
             tier_expires_at = excluded.tier_expires_at",
          rusqlite::params![client_str, tier_name, features_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_client_tier(&self, client_id: Uuid) -> Result<Option<ClientTier>> {
    let client_str = encode_uuid(client_id);

    let raw: Option<RawTier> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT client_id, tier, features, tier_expires_at
               FROM client_tiers WHERE client_id = ?1",
              rusqlite::params![client_str],
              |row| {
                Ok(RawTier {
                  client_id:       row.get(0)?,
                  tier:            row.get(1)?,
                  features:        row.get(2)?,
                  tier_expires_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTier::into_tier).transpose()
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let status = input.validate()?;
    self
      .require_user(input.client_id, User::is_client, Domain::NotAClient(input.client_id))
      .await?;

    let now = Utc::now();
    let project = Project {
      project_id:         Uuid::new_v4(),
      title:              input.title.trim().to_owned(),
      status,
      client_id:          input.client_id,
      talent_id:          None,
      min_badge:          input.min_badge,
      accept_bid_enabled: false,
      metadata:           ProjectMetadata {
        events: vec![],
        extra:  input.extra,
      },
      created_at:         now,
      updated_at:         now,
    };

    let id_str       = encode_uuid(project.project_id);
    let title        = project.title.clone();
    let status_str   = project.status.as_ref().to_owned();
    let client_str   = encode_uuid(project.client_id);
    let badge_str    = project.min_badge.as_ref().to_owned();
    let metadata_str = serde_json::to_string(&project.metadata)?;
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO projects (
             project_id, title, status, client_id, talent_id, min_badge,
             accept_bid_enabled, metadata, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, 0, ?6, ?7, ?7)",
          rusqlite::params![id_str, title, status_str, client_str, badge_str, metadata_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(project)
  }

  async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| Ok(RawProject::select(conn, &id_str)?))
      .await?;

    raw.map(RawProject::into_project).transpose()
  }

  async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>> {
    let client_str = query.client_id.map(encode_uuid);
    let status_str = query.status.map(|s| s.as_ref().to_owned());
    // SQLite takes signed bounds; anything past i64::MAX is clamped.
    let limit_val  = i64::try_from(query.limit.unwrap_or(100)).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let raws: Vec<RawProject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROJECT_COLUMNS} FROM projects
           WHERE (?1 IS NULL OR client_id = ?1)
             AND (?2 IS NULL OR status = ?2)
           ORDER BY created_at DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![client_str, status_str, limit_val, offset_val],
            RawProject::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn publish_project(&self, project_id: Uuid, client_id: Uuid) -> Result<Project> {
    let id_str     = encode_uuid(project_id);
    let client_str = encode_uuid(client_id);
    let now_str    = encode_dt(Utc::now());

    let outcome: std::result::Result<RawProject, Domain> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(project) = RawProject::select(&tx, &id_str)? else {
          return Ok(Err(Domain::ProjectNotFound(project_id)));
        };
        if project.client_id != client_str {
          return Ok(Err(Domain::NotProjectOwner {
            user:    client_id,
            project: project_id,
          }));
        }
        let status: ProjectStatus = enum_from_sql(2, &project.status)?;
        if status != ProjectStatus::Draft {
          return Ok(Err(Domain::NotPublishable {
            project: project_id,
            status,
          }));
        }

        tx.execute(
          "UPDATE projects SET status = 'open', updated_at = ?2 WHERE project_id = ?1",
          rusqlite::params![id_str, now_str],
        )?;
        let updated = RawProject::select(&tx, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(updated))
      })
      .await?;

    outcome?.into_project()
  }

  async fn unlock_feature(&self, project_id: Uuid, feature: Feature) -> Result<Project> {
    let id_str = encode_uuid(project_id);
    let now    = Utc::now();

    let outcome: std::result::Result<RawProject, Domain> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(project) = RawProject::select(&tx, &id_str)? else {
          return Ok(Err(Domain::ProjectNotFound(project_id)));
        };
        let mut metadata = metadata_from_sql(&project.metadata)?;
        metadata.push(ProjectEvent::FeatureUnlocked { feature, at: now });
        let metadata_str = json_to_sql(&metadata)?;

        match feature {
          Feature::AcceptBid => tx.execute(
            "UPDATE projects SET accept_bid_enabled = 1, metadata = ?2, updated_at = ?3
             WHERE project_id = ?1",
            rusqlite::params![id_str, metadata_str, encode_dt(now)],
          )?,
        };
        let updated = RawProject::select(&tx, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(updated))
      })
      .await?;

    outcome?.into_project()
  }

  // ── Bids ──────────────────────────────────────────────────────────────────

  async fn submit_bid(&self, input: NewBid) -> Result<Bid> {
    input.validate()?;
    let talent = self
      .require_user(input.talent_id, User::is_talent, Domain::NotATalent(input.talent_id))
      .await?;

    let now = Utc::now();
    let bid = Bid {
      bid_id:            Uuid::new_v4(),
      project_id:        input.project_id,
      talent_id:         input.talent_id,
      hourly_rate_cents: input.hourly_rate_cents,
      status:            BidStatus::Pending,
      created_at:        now,
      updated_at:        now,
    };

    let bid_str     = encode_uuid(bid.bid_id);
    let project_str = encode_uuid(bid.project_id);
    let talent_str  = encode_uuid(bid.talent_id);
    let rate        = bid.hourly_rate_cents;
    let at_str      = encode_dt(now);
    let project_id  = bid.project_id;
    let talent_id   = bid.talent_id;

    let outcome: std::result::Result<(), Domain> = self
      .conn
      .call(move |conn| {
        // Taking the write lock first keeps a submission from slipping in
        // while an award on the same project is committing.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(project) = RawProject::select(&tx, &project_str)? else {
          return Ok(Err(Domain::ProjectNotFound(project_id)));
        };
        let status: ProjectStatus = enum_from_sql(2, &project.status)?;
        if !status.accepts_bids() {
          return Ok(Err(Domain::NotOpenForBids {
            project: project_id,
            status,
          }));
        }
        let min_badge: Badge = enum_from_sql(5, &project.min_badge)?;
        if !talent.badge.satisfies(min_badge) {
          return Ok(Err(Domain::BadgeTooLow {
            talent:  talent_id,
            project: project_id,
          }));
        }

        let duplicate = tx
          .query_row(
            "SELECT 1 FROM project_bids WHERE project_id = ?1 AND talent_id = ?2",
            rusqlite::params![project_str, talent_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if duplicate {
          return Ok(Err(Domain::DuplicateBid {
            talent:  talent_id,
            project: project_id,
          }));
        }

        tx.execute(
          "INSERT INTO project_bids (
             bid_id, project_id, talent_id, hourly_rate_cents, status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)",
          rusqlite::params![bid_str, project_str, talent_str, rate, at_str],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    Ok(bid)
  }

  async fn get_bid(&self, id: Uuid) -> Result<Option<Bid>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBid> = self
      .conn
      .call(move |conn| Ok(RawBid::select(conn, &id_str)?))
      .await?;

    raw.map(RawBid::into_bid).transpose()
  }

  async fn list_bids(&self, project_id: Uuid) -> Result<Vec<Bid>> {
    let project_str = encode_uuid(project_id);

    let raws: Vec<RawBid> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BID_COLUMNS} FROM project_bids
           WHERE project_id = ?1
           ORDER BY created_at, bid_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![project_str], RawBid::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBid::into_bid).collect()
  }

  async fn award_bid(&self, bid_id: Uuid, client_id: Uuid) -> Result<Award> {
    let outcome = self
      .conn
      .call(move |conn| Ok(award::award_bid(conn, bid_id, client_id, Utc::now())?))
      .await?;

    let rows = match outcome {
      AwardOutcome::Awarded(rows) => rows,
      AwardOutcome::Refused(e) => {
        tracing::debug!(%bid_id, %client_id, error = %e, "award transaction rolled back");
        return Err(e.into());
      }
    };

    Ok(Award {
      event:         rows.event,
      project:       rows.project.into_project()?,
      bid:           rows.bid.into_bid()?,
      rejected_bids: rows
        .rejected
        .iter()
        .map(|s| crate::encode::decode_uuid(s))
        .collect::<Result<_>>()?,
      notifications: rows.notifications,
    })
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn list_notifications(
    &self,
    user_id:     Uuid,
    unread_only: bool,
  ) -> Result<Vec<Notification>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
           WHERE user_id = ?1 AND (?2 = 0 OR read = 0)
           ORDER BY created_at DESC, notification_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, unread_only], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn mark_notification_read(
    &self,
    notification_id: Uuid,
    user_id:         Uuid,
  ) -> Result<Notification> {
    let id_str   = encode_uuid(notification_id);
    let user_str = encode_uuid(user_id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE notifications SET read = 1 WHERE notification_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(RawNotification::select(conn, &id_str)?)
      })
      .await?;

    raw
      .ok_or(Domain::NotificationNotFound(notification_id))?
      .into_notification()
  }
}
