//! # Runtime Registry
//!
//! Per-layer bookkeeping for rendered elements, kept out of the elements
//! themselves. Records live in a `SlotMap` arena; event indexes refer to them
//! by [`RuntimeKey`] and treat keys that no longer resolve as destroyed.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use slotmap::{SlotMap, new_key_type};

use crate::element::{ElementId, ElementRef};

new_key_type! {
    /// Handle on a run-time record.
    pub struct RuntimeKey;
}

/// What a layer knows about an element after rendering it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RuntimeState {
    /// Render order within the last pass; higher is drawn later.
    pub idx: u32,
    /// Origin the element's position is relative to, in layer coordinates.
    pub offset: Vec2,
    /// The element was drawn here on behalf of a lower layer.
    pub lifted: bool,
    /// The element was missing from the last pass.
    pub destroyed: bool,
}

pub struct RuntimeRecord {
    pub id: ElementId,
    pub element: ElementRef,
    pub state: RuntimeState,
}

#[derive(Default)]
pub struct Registry {
    records: SlotMap<RuntimeKey, RuntimeRecord>,
    by_id: HashMap<ElementId, RuntimeKey>,
}

impl Registry {
    /// Records a visit of `element` during a render pass.
    ///
    /// A live record is updated in place and keeps its key. An element coming
    /// back after being destroyed gets a new record, so stale index entries
    /// keep failing to resolve.
    pub fn refresh(&mut self, id: ElementId, element: &ElementRef, idx: u32, offset: Vec2) -> RuntimeKey {
        let live = self
            .by_id
            .get(&id)
            .copied()
            .filter(|&k| self.records.get(k).is_some_and(|r| !r.state.destroyed));
        if let Some(key) = live {
            let state = &mut self.records[key].state;
            state.idx = idx;
            state.offset = offset;
            return key;
        }

        let key = self.records.insert(RuntimeRecord {
            id,
            element: element.clone(),
            state: RuntimeState {
                idx,
                offset,
                ..Default::default()
            },
        });
        self.by_id.insert(id, key);
        key
    }

    pub fn get(&self, key: RuntimeKey) -> Option<&RuntimeRecord> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: RuntimeKey) -> Option<&mut RuntimeRecord> {
        self.records.get_mut(key)
    }

    /// Resolves a key to a record that was present in the last pass.
    pub fn live(&self, key: RuntimeKey) -> Option<&RuntimeRecord> {
        self.records.get(key).filter(|r| !r.state.destroyed)
    }

    pub fn key_of(&self, id: ElementId) -> Option<RuntimeKey> {
        self.by_id.get(&id).copied()
    }

    pub fn state_of(&self, id: ElementId) -> Option<RuntimeState> {
        self.key_of(id)
            .and_then(|key| self.records.get(key))
            .map(|r| r.state)
    }

    /// Ends a pass: evicts records destroyed by the previous pass, then flags
    /// the elements that were not seen in this one.
    pub fn retire(&mut self, gone: impl IntoIterator<Item = ElementId>) {
        let by_id = &mut self.by_id;
        self.records.retain(|key, record| {
            if !record.state.destroyed {
                return true;
            }
            if by_id.get(&record.id) == Some(&key) {
                by_id.remove(&record.id);
            }
            false
        });

        for id in gone {
            if let Some(record) = self.by_id.get(&id).and_then(|&k| self.records.get_mut(k)) {
                record.state.destroyed = true;
            }
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Elements seen by the previous and the current render pass.
#[derive(Debug, Default)]
pub struct Membership {
    prev: HashSet<ElementId>,
    next: HashSet<ElementId>,
}

impl Membership {
    /// Marks `id` as seen in the current pass.
    ///
    /// Returns true when the element needs its event registrations built: it
    /// was not part of the previous pass and was not already seen in this one.
    pub fn visit(&mut self, id: ElementId) -> bool {
        if !self.next.insert(id) {
            return false;
        }
        !self.prev.remove(&id)
    }

    /// Makes the current pass the previous one and returns the elements of the
    /// old previous pass that were not seen again.
    pub fn swap(&mut self) -> HashSet<ElementId> {
        std::mem::replace(&mut self.prev, std::mem::take(&mut self.next))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.prev.contains(&id) || self.next.contains(&id)
    }

    pub fn clear(&mut self) {
        self.prev.clear();
        self.next.clear();
    }
}
