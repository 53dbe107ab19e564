//! # Pointer Events
//!
//! Gesture kinds, the per-layer spatial index used for hit testing, and the
//! context handed to gesture handlers.
//!
//! An [`EventIndex`] keeps its entries sorted by render order. Queries scan
//! from the last drawn element down, so the element on top wins. Layers call
//! [`EventIndex::resync`] after each pass so orders follow the queue.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::DepictError;
use crate::registry::{Registry, RuntimeKey, RuntimeRecord};

/// Pointer gesture kinds, with their wire discriminants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum CanvasEvent {
    Click = -1,
    MouseMove = -2,
    MouseUp = -3,
    MouseDown = -4,
}

impl From<CanvasEvent> for i32 {
    fn from(event: CanvasEvent) -> Self {
        event as i32
    }
}

impl TryFrom<i32> for CanvasEvent {
    type Error = DepictError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Click),
            -2 => Ok(Self::MouseMove),
            -3 => Ok(Self::MouseUp),
            -4 => Ok(Self::MouseDown),
            other => Err(DepictError::UnknownCanvasEvent(other)),
        }
    }
}

/// Render requests collected while handlers run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderRequests {
    /// Re-render the layer that dispatched the event.
    pub current: bool,
    /// Re-render these layers (by index).
    pub layers: Vec<usize>,
}

impl RenderRequests {
    pub fn is_empty(&self) -> bool {
        !self.current && self.layers.is_empty()
    }
}

/// What a gesture handler gets to see.
pub struct EventContext<'a> {
    /// Origin the element was positioned from during the last render.
    pub offset: Vec2,
    /// Pointer position in layer coordinates.
    pub pointer: Vec2,
    requests: &'a mut RenderRequests,
}

impl<'a> EventContext<'a> {
    pub fn new(offset: Vec2, pointer: Vec2, requests: &'a mut RenderRequests) -> Self {
        Self {
            offset,
            pointer,
            requests,
        }
    }

    /// Asks for the dispatching layer to be rendered again.
    pub fn render(&mut self) {
        self.requests.current = true;
    }

    /// Asks for another layer to be rendered again.
    pub fn render_layer(&mut self, layer: usize) {
        self.requests.layers.push(layer);
    }
}

/// Point containment over the elements registered for one gesture kind.
#[derive(Debug, Default)]
pub struct EventIndex {
    entries: Vec<(u32, RuntimeKey)>,
}

impl EventIndex {
    /// Inserts `key` after every entry with a render order `<= order`.
    pub fn add(&mut self, order: u32, key: RuntimeKey) {
        let at = self.entries.partition_point(|&(o, _)| o <= order);
        self.entries.insert(at, (order, key));
    }

    /// Topmost element containing `point`.
    pub fn trigger(&mut self, registry: &Registry, point: Vec2) -> Option<RuntimeKey> {
        self.scan(registry, point, true).into_iter().next()
    }

    /// Every element containing `point`, topmost first.
    pub fn trigger_all(&mut self, registry: &Registry, point: Vec2) -> Vec<RuntimeKey> {
        self.scan(registry, point, false)
    }

    fn scan(&mut self, registry: &Registry, point: Vec2, first_only: bool) -> Vec<RuntimeKey> {
        let mut hits = Vec::new();
        let mut i = self.entries.len();
        while i > 0 {
            i -= 1;
            let key = self.entries[i].1;
            let Some(record) = registry.live(key) else {
                self.entries.remove(i);
                continue;
            };
            if hit(record, point) {
                hits.push(key);
                if first_only {
                    break;
                }
            }
        }
        hits
    }

    /// Drops dead entries and re-sorts the rest by the render order the
    /// registry recorded in the last pass. Kept elements move when the queue
    /// is reordered; equal orders keep their relative position.
    pub fn resync(&mut self, registry: &Registry) {
        self.entries.retain_mut(|(order, key)| match registry.live(*key) {
            Some(record) => {
                *order = record.state.idx;
                true
            }
            None => false,
        });
        self.entries.sort_by_key(|&(order, _)| order);
    }

    /// Live, visible entries in render order. Dead entries are dropped.
    pub fn live_keys(&mut self, registry: &Registry) -> Vec<RuntimeKey> {
        self.entries.retain(|&(_, key)| registry.live(key).is_some());
        self.entries
            .iter()
            .map(|&(_, key)| key)
            .filter(|&key| registry.live(key).is_some_and(|r| !is_hidden(r)))
            .collect()
    }

    /// Render orders of the entries, bottom to top.
    pub fn orders(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|&(o, _)| o)
    }

    pub fn keys(&self) -> impl Iterator<Item = RuntimeKey> + '_ {
        self.entries.iter().map(|&(_, k)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn is_hidden(record: &RuntimeRecord) -> bool {
    record.element.try_borrow().map_or(true, |el| el.hidden)
}

fn hit(record: &RuntimeRecord, point: Vec2) -> bool {
    let Ok(el) = record.element.try_borrow() else {
        return false;
    };
    if el.hidden {
        return false;
    }
    let Some(contain) = el.contain.clone() else {
        return false;
    };
    let local = point - record.state.offset - el.position;
    drop(el);
    contain(local.x, local.y)
}
