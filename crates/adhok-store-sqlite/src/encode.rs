//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enums are stored as their
//! snake_case names. Structured fields (metadata, payloads, feature sets) are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use adhok_core::{
  bid::Bid,
  notification::Notification,
  project::{Project, ProjectMetadata},
  tier::{ClientTier, Feature},
  user::User,
};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Type};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Parse a strum-backed enum column.
pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::Decode {
    column,
    value: s.to_owned(),
  })
}

// ─── Feature sets ────────────────────────────────────────────────────────────

pub fn encode_features(features: &[Feature]) -> Result<String> {
  Ok(serde_json::to_string(features)?)
}

pub fn decode_features(s: &str) -> Result<Vec<Feature>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Inside a connection closure ─────────────────────────────────────────────
//
// These run on the connection thread, where only `rusqlite::Error` can be
// returned. Decoding failures are reported as conversion failures.

/// Parse an enum column while still on the connection thread.
pub fn enum_from_sql<T>(idx: usize, s: &str) -> rusqlite::Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  s.parse()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn uuid_from_sql(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
  Uuid::parse_str(s)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn metadata_from_sql(s: &str) -> rusqlite::Result<ProjectMetadata> {
  serde_json::from_str(s)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))
}

pub fn json_to_sql<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
  serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str = "user_id, role, display_name, badge, created_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub role:         String,
  pub display_name: String,
  pub badge:        String,
  pub created_at:   String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      role:         row.get(1)?,
      display_name: row.get(2)?,
      badge:        row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn select(conn: &rusqlite::Connection, user_id: &str) -> rusqlite::Result<Option<Self>> {
    conn
      .query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        rusqlite::params![user_id],
        Self::from_row,
      )
      .optional()
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      role:         decode_enum("users.role", &self.role)?,
      display_name: self.display_name,
      badge:        decode_enum("users.badge", &self.badge)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `client_tiers` row.
pub struct RawTier {
  pub client_id:       String,
  pub tier:            String,
  pub features:        String,
  pub tier_expires_at: Option<String>,
}

impl RawTier {
  pub fn into_tier(self) -> Result<ClientTier> {
    Ok(ClientTier {
      client_id:       decode_uuid(&self.client_id)?,
      tier:            self.tier,
      features:        decode_features(&self.features)?,
      tier_expires_at: self.tier_expires_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column list matching [`RawProject::from_row`].
pub const PROJECT_COLUMNS: &str = "project_id, title, status, client_id, talent_id, \
   min_badge, accept_bid_enabled, metadata, created_at, updated_at";

/// Raw strings read directly from a `projects` row.
pub struct RawProject {
  pub project_id:         String,
  pub title:              String,
  pub status:             String,
  pub client_id:          String,
  pub talent_id:          Option<String>,
  pub min_badge:          String,
  pub accept_bid_enabled: bool,
  pub metadata:           String,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawProject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      project_id:         row.get(0)?,
      title:              row.get(1)?,
      status:             row.get(2)?,
      client_id:          row.get(3)?,
      talent_id:          row.get(4)?,
      min_badge:          row.get(5)?,
      accept_bid_enabled: row.get(6)?,
      metadata:           row.get(7)?,
      created_at:         row.get(8)?,
      updated_at:         row.get(9)?,
    })
  }

  pub fn select(conn: &rusqlite::Connection, project_id: &str) -> rusqlite::Result<Option<Self>> {
    conn
      .query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = ?1"),
        rusqlite::params![project_id],
        Self::from_row,
      )
      .optional()
  }

  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      project_id:         decode_uuid(&self.project_id)?,
      title:              self.title,
      status:             decode_enum("projects.status", &self.status)?,
      client_id:          decode_uuid(&self.client_id)?,
      talent_id:          self.talent_id.as_deref().map(decode_uuid).transpose()?,
      min_badge:          decode_enum("projects.min_badge", &self.min_badge)?,
      accept_bid_enabled: self.accept_bid_enabled,
      metadata:           serde_json::from_str(&self.metadata)?,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawBid::from_row`].
pub const BID_COLUMNS: &str =
  "bid_id, project_id, talent_id, hourly_rate_cents, status, created_at, updated_at";

/// Raw strings read directly from a `project_bids` row.
pub struct RawBid {
  pub bid_id:            String,
  pub project_id:        String,
  pub talent_id:         String,
  pub hourly_rate_cents: i64,
  pub status:            String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawBid {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      bid_id:            row.get(0)?,
      project_id:        row.get(1)?,
      talent_id:         row.get(2)?,
      hourly_rate_cents: row.get(3)?,
      status:            row.get(4)?,
      created_at:        row.get(5)?,
      updated_at:        row.get(6)?,
    })
  }

  pub fn select(conn: &rusqlite::Connection, bid_id: &str) -> rusqlite::Result<Option<Self>> {
    conn
      .query_row(
        &format!("SELECT {BID_COLUMNS} FROM project_bids WHERE bid_id = ?1"),
        rusqlite::params![bid_id],
        Self::from_row,
      )
      .optional()
  }

  pub fn into_bid(self) -> Result<Bid> {
    Ok(Bid {
      bid_id:            decode_uuid(&self.bid_id)?,
      project_id:        decode_uuid(&self.project_id)?,
      talent_id:         decode_uuid(&self.talent_id)?,
      hourly_rate_cents: self.hourly_rate_cents,
      status:            decode_enum("project_bids.status", &self.status)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawNotification::from_row`].
pub const NOTIFICATION_COLUMNS: &str =
  "notification_id, user_id, kind, message, payload, read, created_at";

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub user_id:         String,
  pub kind:            String,
  pub message:         String,
  pub payload:         String,
  pub read:            bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      user_id:         row.get(1)?,
      kind:            row.get(2)?,
      message:         row.get(3)?,
      payload:         row.get(4)?,
      read:            row.get(5)?,
      created_at:      row.get(6)?,
    })
  }

  pub fn select(conn: &rusqlite::Connection, notification_id: &str) -> rusqlite::Result<Option<Self>> {
    conn
      .query_row(
        &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE notification_id = ?1"),
        rusqlite::params![notification_id],
        Self::from_row,
      )
      .optional()
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      kind:            decode_enum("notifications.kind", &self.kind)?,
      message:         self.message,
      payload:         serde_json::from_str(&self.payload)?,
      read:            self.read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
