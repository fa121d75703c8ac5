//! The bid-acceptance transaction.
//!
//! Runs synchronously on the connection thread. The transaction is opened
//! with `BEGIN IMMEDIATE`, which takes the database write lock before the
//! first read, so two awards racing on the same project are serialized: the
//! second one reads the project only after the first has committed, sees it
//! awarded, and refuses.

use adhok_core::{
  award::AwardEvent,
  bid::BidStatus,
  notification::{Notification, notifications_for},
  project::{ProjectEvent, ProjectMetadata, ProjectStatus},
};
use chrono::{DateTime, Utc};
use rusqlite::{Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::encode::{
  RawBid, RawProject, encode_dt, encode_uuid, enum_from_sql, json_to_sql, metadata_from_sql,
  uuid_from_sql,
};

/// Rows produced by a committed award, still in their raw column form.
pub struct AwardRows {
  pub event:         AwardEvent,
  pub project:       RawProject,
  pub bid:           RawBid,
  pub rejected:      Vec<String>,
  pub notifications: Vec<Notification>,
}

pub enum AwardOutcome {
  Awarded(AwardRows),
  /// The transaction was rolled back for a domain reason.
  Refused(adhok_core::Error),
}

/// Run the whole award in one `IMMEDIATE` transaction. Commits only on
/// [`AwardOutcome::Awarded`]; any other exit drops the transaction, which
/// rolls it back.
pub fn award_bid(
  conn: &mut rusqlite::Connection,
  bid_id: Uuid,
  client_id: Uuid,
  now: DateTime<Utc>,
) -> rusqlite::Result<AwardOutcome> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let outcome = award_in(&tx, bid_id, client_id, now)?;
  if matches!(outcome, AwardOutcome::Awarded(_)) {
    tx.commit()?;
  }
  Ok(outcome)
}

fn award_in(
  tx: &Transaction<'_>,
  bid_id: Uuid,
  client_id: Uuid,
  now: DateTime<Utc>,
) -> rusqlite::Result<AwardOutcome> {
  use adhok_core::Error as Domain;

  let bid_id_str = encode_uuid(bid_id);
  let client_id_str = encode_uuid(client_id);
  let now_str = encode_dt(now);

  // ── Re-read under the write lock ─────────────────────────────────────────

  let Some(bid) = RawBid::select(tx, &bid_id_str)? else {
    return Ok(AwardOutcome::Refused(Domain::BidNotFound(bid_id)));
  };
  let Some(project) = RawProject::select(tx, &bid.project_id)? else {
    let project_id = uuid_from_sql(1, &bid.project_id)?;
    return Ok(AwardOutcome::Refused(Domain::ProjectNotFound(project_id)));
  };
  let project_id = uuid_from_sql(0, &project.project_id)?;
  let talent_id = uuid_from_sql(2, &bid.talent_id)?;

  if project.client_id != client_id_str {
    return Ok(AwardOutcome::Refused(Domain::NotProjectOwner {
      user:    client_id,
      project: project_id,
    }));
  }

  let status: ProjectStatus = enum_from_sql(2, &project.status)?;
  if !status.is_awardable() {
    return Ok(AwardOutcome::Refused(Domain::AlreadyAwarded(project_id)));
  }

  let bid_status: BidStatus = enum_from_sql(4, &bid.status)?;
  if bid_status.is_final() {
    return Ok(AwardOutcome::Refused(Domain::BidSettled {
      bid:    bid_id,
      status: bid_status,
    }));
  }

  // ── Bids ─────────────────────────────────────────────────────────────────

  let mut stmt = tx.prepare(
    "SELECT bid_id FROM project_bids
     WHERE project_id = ?1 AND bid_id != ?2 AND status != 'rejected'",
  )?;
  let rejected = stmt
    .query_map(rusqlite::params![project.project_id, bid_id_str], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  drop(stmt);

  tx.execute(
    "UPDATE project_bids SET status = 'rejected', updated_at = ?3
     WHERE project_id = ?1 AND bid_id != ?2",
    rusqlite::params![project.project_id, bid_id_str, now_str],
  )?;

  tx.execute(
    "UPDATE project_bids SET status = 'accepted', updated_at = ?2 WHERE bid_id = ?1",
    rusqlite::params![bid_id_str, now_str],
  )?;

  // ── Project ──────────────────────────────────────────────────────────────

  let event = AwardEvent {
    project_id,
    bid_id,
    talent_id,
    client_id,
    hourly_rate_cents: bid.hourly_rate_cents,
    at: now,
  };

  let mut metadata: ProjectMetadata = metadata_from_sql(&project.metadata)?;
  metadata.push(ProjectEvent::Awarded {
    bid_id,
    talent_id,
    hourly_rate_cents: bid.hourly_rate_cents,
    at: now,
  });
  let metadata_str = json_to_sql(&metadata)?;

  // Conditional on the status so a stale writer can never overwrite an award.
  let changed = tx.execute(
    "UPDATE projects
     SET status = 'awarded', talent_id = ?2, metadata = ?3, updated_at = ?4
     WHERE project_id = ?1 AND status IN ('draft', 'open')",
    rusqlite::params![project.project_id, bid.talent_id, metadata_str, now_str],
  )?;
  if changed != 1 {
    return Ok(AwardOutcome::Refused(Domain::AlreadyAwarded(project_id)));
  }

  // ── Notifications ────────────────────────────────────────────────────────

  let mut notifications = Vec::with_capacity(2);
  for n in notifications_for(&event, &project.title) {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      user_id:         n.user_id,
      kind:            n.kind,
      message:         n.message,
      payload:         n.payload,
      read:            false,
      created_at:      now,
    };
    let payload_str = json_to_sql(&notification.payload)?;
    tx.execute(
      "INSERT INTO notifications
         (notification_id, user_id, kind, message, payload, read, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
      rusqlite::params![
        encode_uuid(notification.notification_id),
        encode_uuid(notification.user_id),
        notification.kind.as_ref(),
        &notification.message,
        payload_str,
        now_str,
      ],
    )?;
    notifications.push(notification);
  }

  // ── Read back ────────────────────────────────────────────────────────────

  let project =
    RawProject::select(tx, &project.project_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
  let bid = RawBid::select(tx, &bid_id_str)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;

  Ok(AwardOutcome::Awarded(AwardRows {
    event,
    project,
    bid,
    rejected,
    notifications,
  }))
}
