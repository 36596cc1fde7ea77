//! Timer registry: owns one [`TimerSlot`] per (entity, channel) pair.
//!
//! Slots are created once at construction and live as long as the registry.
//! They are addressed from outside by entity name and channel index, and
//! internally by a dense [`SlotId`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::duration::format_remaining;
use super::slot::{SlotState, TimerSlot};
use crate::error::{CoreError, Result};

/// Dense index of a slot inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(usize);

/// Read-only view of a slot for rendering and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub entity: String,
    /// Zero-based channel index.
    pub channel: usize,
    pub remaining_secs: u32,
    pub state: SlotState,
    pub alerted: bool,
}

impl SlotView {
    /// Counting and inside the alert window.
    pub fn is_alerting(&self) -> bool {
        self.state == SlotState::Counting && self.alerted
    }

    /// Short text for a timer cell: the countdown, "live" once expired.
    pub fn label(&self) -> String {
        match self.state {
            SlotState::Idle => "--:--".to_string(),
            SlotState::Counting => format_remaining(self.remaining_secs),
            SlotState::Expired => "live".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimerRegistry {
    entities: Vec<String>,
    entity_index: HashMap<String, usize>,
    channel_count: usize,
    slots: Vec<TimerSlot>,
}

impl TimerRegistry {
    /// Create idle slots for every configured entity and channel.
    pub fn new(entities: &[String], channel_count: usize) -> Self {
        let entity_index = entities
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            entities: entities.to_vec(),
            entity_index,
            channel_count,
            slots: vec![TimerSlot::new(); entities.len() * channel_count],
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up the slot for `(entity, channel)`.
    ///
    /// # Errors
    /// `UnknownEntity` or `ChannelOutOfRange` when the pair is outside the
    /// configured sets.
    pub fn resolve(&self, entity: &str, channel: usize) -> Result<SlotId> {
        let entity_idx = *self
            .entity_index
            .get(entity)
            .ok_or_else(|| CoreError::UnknownEntity(entity.to_string()))?;
        if channel >= self.channel_count {
            return Err(CoreError::ChannelOutOfRange {
                channel,
                channel_count: self.channel_count,
            });
        }
        Ok(SlotId(entity_idx * self.channel_count + channel))
    }

    /// Entity name and channel of a slot id.
    pub fn key(&self, id: SlotId) -> (&str, usize) {
        let entity = &self.entities[id.0 / self.channel_count];
        (entity.as_str(), id.0 % self.channel_count)
    }

    pub fn slot(&self, id: SlotId) -> &TimerSlot {
        &self.slots[id.0]
    }

    pub fn get_remaining(&self, entity: &str, channel: usize) -> Result<u32> {
        let id = self.resolve(entity, channel)?;
        Ok(self.slot(id).remaining_secs())
    }

    pub fn view(&self, id: SlotId) -> SlotView {
        let (entity, channel) = self.key(id);
        let slot = self.slot(id);
        SlotView {
            entity: entity.to_string(),
            channel,
            remaining_secs: slot.remaining_secs(),
            state: slot.state(),
            alerted: slot.alerted(),
        }
    }

    /// Every slot, entity-major then channel order.
    pub fn all_slots(&self) -> Vec<SlotView> {
        self.ids().map(|id| self.view(id)).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len()).map(SlotId)
    }

    /// Remaining seconds grouped by entity, indexed by channel.
    pub fn remaining_by_entity(&self) -> BTreeMap<String, Vec<u32>> {
        self.entities
            .iter()
            .enumerate()
            .map(|(e, name)| {
                let start = e * self.channel_count;
                let remaining = self.slots[start..start + self.channel_count]
                    .iter()
                    .map(TimerSlot::remaining_secs)
                    .collect();
                (name.clone(), remaining)
            })
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn slot_mut(&mut self, id: SlotId) -> &mut TimerSlot {
        &mut self.slots[id.0]
    }
}
