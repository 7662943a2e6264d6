// src/services/recording.rs
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::db::businesses::{get_business, update_business};
use crate::db::rooms::{get_room, write_room_fields, RoomFields};
use crate::db::undo::{get_change, insert_change, mark_undone};
use crate::db::visits::{delete_visit, insert_visit, VisitTarget};
use crate::domain::campaign::{Business, BusinessUpdate, Room, StatusUpdate};
use crate::domain::claims::FloorClaim;
use crate::domain::status::VisitStatus;
use crate::errors::ServerError;
use crate::events::{ChangeHub, ChangeKind};
use crate::services::campaign_for_member;
use crate::services::claims::ClaimService;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedStatus {
    pub room: Room,
    /// Pass this back to undo the write.
    pub change_id: i64,
    pub undo_until: i64,
    pub claim: Option<FloorClaim>,
}

pub struct RecordingService {
    undo_window_secs: i64,
    hub: ChangeHub,
}

fn clean_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}

impl RecordingService {
    pub fn new(undo_window_secs: i64, hub: ChangeHub) -> Self {
        Self { undo_window_secs, hub }
    }

    /// Writes a visit outcome for one room.
    ///
    /// The room update, the visit-log row, the undo journal entry and the
    /// refresh of the caller's own claim on that floor commit together.
    pub fn record_room_status(
        &self,
        conn: &mut Connection,
        room_id: i64,
        user_id: i64,
        update: &StatusUpdate,
        now: i64,
    ) -> Result<RecordedStatus, ServerError> {
        update.validate()?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let room = get_room(&tx, room_id)?.ok_or(ServerError::NotFound)?;
        campaign_for_member(&tx, room.campaign_id, user_id)?;

        let previous = RoomFields::of(&room);
        let written = RoomFields {
            status: update.status,
            note: clean_note(update.note.as_deref()),
            donation_cents: match update.status {
                VisitStatus::Donated => update.donation_cents,
                _ => 0,
            },
            callback_at: update.effective_callback_at(),
            updated_at: Some(now),
            updated_by: Some(user_id),
        };
        write_room_fields(&tx, room_id, &written)?;

        let visit_id = insert_visit(
            &tx,
            room.campaign_id,
            VisitTarget::Room { id: room_id, floor: room.floor },
            user_id,
            written.status,
            written.donation_cents,
            now,
        )?;
        let change_id = insert_change(&tx, room_id, user_id, Some(visit_id), &previous, &written, now)?;
        let claim = ClaimService::refresh_own(&tx, room.campaign_id, room.floor, user_id, now)?;
        let room = get_room(&tx, room_id)?.ok_or(ServerError::NotFound)?;
        tx.commit()?;

        self.hub.publish(room.campaign_id, ChangeKind::RoomUpdated { room: room.clone() });
        if let Some(c) = &claim {
            self.hub.publish(room.campaign_id, ChangeKind::ClaimUpdated { claim: c.clone() });
        }
        tracing::info!(
            campaign_id = room.campaign_id,
            room = %room.label,
            status = %room.status,
            user_id,
            change_id,
            "room status recorded"
        );

        Ok(RecordedStatus { room, change_id, undo_until: now + self.undo_window_secs, claim })
    }

    /// Reverts one recorded change to the exact prior field values.
    ///
    /// Only its author may undo it, once, within the undo window, and only
    /// while the room still holds what that change wrote.
    pub fn undo(
        &self,
        conn: &mut Connection,
        change_id: i64,
        user_id: i64,
        now: i64,
    ) -> Result<Room, ServerError> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let change = get_change(&tx, change_id)?.ok_or(ServerError::NotFound)?;

        if change.user_id != user_id {
            return Err(ServerError::Forbidden("only the volunteer who recorded this can undo it".into()));
        }
        if change.undone_at.is_some() {
            return Err(ServerError::Conflict("change was already undone".into()));
        }
        if now - change.changed_at > self.undo_window_secs {
            return Err(ServerError::Conflict("undo window has passed".into()));
        }

        let room = get_room(&tx, change.room_id)?.ok_or(ServerError::NotFound)?;
        if RoomFields::of(&room) != change.written {
            return Err(ServerError::Conflict("room was updated again since this change".into()));
        }

        write_room_fields(&tx, change.room_id, &change.previous)?;
        if let Some(visit_id) = change.visit_id {
            delete_visit(&tx, visit_id)?;
        }
        if !mark_undone(&tx, change_id, now)? {
            return Err(ServerError::Conflict("change was already undone".into()));
        }
        let room = get_room(&tx, change.room_id)?.ok_or(ServerError::NotFound)?;
        tx.commit()?;

        self.hub.publish(room.campaign_id, ChangeKind::RoomUpdated { room: room.clone() });
        tracing::info!(campaign_id = room.campaign_id, room = %room.label, change_id, "status change undone");
        Ok(room)
    }

    pub fn record_business(
        &self,
        conn: &mut Connection,
        business_id: i64,
        user_id: i64,
        update: &BusinessUpdate,
        now: i64,
    ) -> Result<Business, ServerError> {
        if update.status == VisitStatus::Callback && update.callback_at.is_none() {
            return Err(ServerError::BadRequest("callback requires callback_at".into()));
        }

        let tx = conn.transaction()?;
        let existing = get_business(&tx, business_id)?.ok_or(ServerError::NotFound)?;
        campaign_for_member(&tx, existing.campaign_id, user_id)?;

        let cleaned = BusinessUpdate { note: clean_note(update.note.as_deref()), ..update.clone() };
        let business = update_business(&tx, business_id, &cleaned, user_id, now)?;
        insert_visit(
            &tx,
            business.campaign_id,
            VisitTarget::Business { id: business_id },
            user_id,
            business.status,
            0,
            now,
        )?;
        tx.commit()?;

        self.hub.publish(
            business.campaign_id,
            ChangeKind::BusinessUpdated { business: business.clone() },
        );
        tracing::info!(campaign_id = business.campaign_id, business_id, status = %business.status, "business status recorded");
        Ok(business)
    }
}
