// src/events.rs

//! Per-campaign change notifications.
//!
//! Every write that viewers of a building care about (claims, room and
//! business updates, help requests) is published here. Each campaign has its
//! own channel with a sequence counter, a bounded backlog for pollers that
//! reconnect, and a set of live subscribers.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::campaign::{Business, Room};
use crate::domain::claims::FloorClaim;

pub const BACKLOG_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    ClaimInserted { claim: FloorClaim },
    ClaimUpdated { claim: FloorClaim },
    ClaimDeleted { claim_id: i64, floor: i64 },
    RoomUpdated { room: Room },
    BusinessUpdated { business: Business },
    HelpRequested { help_request_id: i64, floor: Option<i64> },
    HelpResolved { help_request_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub seq: u64,
    pub campaign_id: i64,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

#[derive(Default)]
struct Channel {
    seq: u64,
    backlog: VecDeque<ChangeEvent>,
    subscribers: Vec<(u64, Sender<ChangeEvent>)>,
}

#[derive(Clone, Default)]
pub struct ChangeHub {
    channels: Arc<Mutex<HashMap<i64, Channel>>>,
    // Hub-wide so an id is never reused after a channel is removed.
    next_subscriber: Arc<AtomicU64>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next sequence number and fans the event out.
    pub fn publish(&self, campaign_id: i64, kind: ChangeKind) -> u64 {
        let mut channels = self.channels.lock();
        let ch = channels.entry(campaign_id).or_default();
        ch.seq += 1;
        let event = ChangeEvent { seq: ch.seq, campaign_id, kind };

        if ch.backlog.len() == BACKLOG_LEN {
            ch.backlog.pop_front();
        }
        ch.backlog.push_back(event.clone());
        // Dropped receivers fail to send and are pruned here.
        ch.subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());

        tracing::debug!(campaign_id, seq = event.seq, "published change");
        event.seq
    }

    /// Backlog after `since`, plus a subscription for everything published
    /// later. Both come from one critical section so nothing slips between them.
    pub fn subscribe_since(&self, campaign_id: i64, since: u64) -> (Vec<ChangeEvent>, Subscription) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut channels = self.channels.lock();
        let ch = channels.entry(campaign_id).or_default();
        let missed = ch.backlog.iter().filter(|e| e.seq > since).cloned().collect();
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        ch.subscribers.push((id, tx));
        (missed, Subscription { hub: self.clone(), campaign_id, id, rx })
    }

    #[cfg(test)]
    pub fn subscribe(&self, campaign_id: i64) -> Subscription {
        let current = self.current_seq(campaign_id);
        self.subscribe_since(campaign_id, current).1
    }

    /// Forgets a campaign's channel. Open subscriptions see a disconnect.
    pub fn remove(&self, campaign_id: i64) {
        if self.channels.lock().remove(&campaign_id).is_some() {
            tracing::debug!(campaign_id, "dropped change channel");
        }
    }

    fn unsubscribe(&self, campaign_id: i64, id: u64) {
        let mut channels = self.channels.lock();
        if let Some(ch) = channels.get_mut(&campaign_id) {
            ch.subscribers.retain(|(sub, _)| *sub != id);
        }
    }

    pub fn current_seq(&self, campaign_id: i64) -> u64 {
        self.channels.lock().get(&campaign_id).map(|c| c.seq).unwrap_or(0)
    }

    #[cfg(test)]
    pub fn has_channel(&self, campaign_id: i64) -> bool {
        self.channels.lock().contains_key(&campaign_id)
    }

    #[cfg(test)]
    pub fn subscriber_count(&self, campaign_id: i64) -> usize {
        self.channels
            .lock()
            .get(&campaign_id)
            .map(|c| c.subscribers.len())
            .unwrap_or(0)
    }
}

/// A live feed of one campaign's changes. Dropping it unregisters the sender.
pub struct Subscription {
    hub: ChangeHub,
    campaign_id: i64,
    id: u64,
    rx: Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ChangeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_iter(&self) -> impl Iterator<Item = ChangeEvent> + '_ {
        self.rx.try_iter()
    }

    #[cfg(test)]
    pub fn try_recv(&self) -> Result<ChangeEvent, crossbeam_channel::TryRecvError> {
        self.rx.try_recv()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.campaign_id, self.id);
    }
}
