//! One (tenant, namespace) queue
//!
//! Not synchronized; the engine wraps each namespace in a mutex.

use crate::message::{Message, MessageId, Visibility};
use kvq_common::EpochMillis;
use std::collections::{BTreeMap, HashMap};

/// Messages of one namespace in enqueue order
#[derive(Debug, Default)]
pub struct Namespace {
    /// seq → message
    messages: BTreeMap<u64, Message>,
    /// id → seq
    index: HashMap<MessageId, u64>,
}

impl Namespace {
    /// Empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.index.insert(message.id.clone(), message.seq);
        self.messages.insert(message.seq, message);
    }

    /// Lease the oldest eligible message until `until`
    pub fn lease_next(&mut self, now: EpochMillis, until: EpochMillis) -> Option<&Message> {
        let message = self
            .messages
            .values_mut()
            .find(|message| message.visibility.is_eligible(now))?;
        message.visibility = Visibility::Leased { until };
        message.receive_count = message.receive_count.saturating_add(1);
        Some(&*message)
    }

    /// Drop a message; false if it was not here
    pub fn remove(&mut self, id: &MessageId) -> bool {
        match self.index.remove(id) {
            Some(seq) => self.messages.remove(&seq).is_some(),
            None => false,
        }
    }

    /// Turn lapsed leases back into `Visible`
    pub fn release_expired(&mut self, now: EpochMillis) -> usize {
        let mut released = 0;
        for message in self.messages.values_mut() {
            if let Visibility::Leased { until } = message.visibility {
                if now >= until {
                    message.visibility = Visibility::Visible;
                    released += 1;
                }
            }
        }
        released
    }

    /// (eligible, leased) counts at `now`
    pub fn counts(&self, now: EpochMillis) -> (usize, usize) {
        let leased = self
            .messages
            .values()
            .filter(|message| message.visibility.is_leased_at(now))
            .count();
        (self.messages.len() - leased, leased)
    }

    /// Messages in enqueue order
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// Stored messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Nothing stored
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
