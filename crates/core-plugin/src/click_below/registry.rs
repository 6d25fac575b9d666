//! Per-surface registration records.
//!
//! Keyed by the scroller element's id, not the view's: the same view can be
//! reported active many times while its rendered surface stays the same.
//! Each entry owns the listener handle attached to that surface, the pending
//! gesture and any active caret suppression for it.

use super::caret::CaretSuppression;
use super::gesture::GestureMachine;
use ahash::AHashMap;
use core_events::{ElementId, ViewId};
use core_model::ListenerHandle;
use std::time::Duration;

#[derive(Debug)]
pub struct SurfaceEntry {
    pub view: ViewId,
    pub listener: ListenerHandle,
    pub gesture: GestureMachine,
    pub caret: CaretSuppression,
}

impl SurfaceEntry {
    pub fn new(view: ViewId, listener: ListenerHandle, long_press: Duration) -> Self {
        Self {
            view,
            listener,
            gesture: GestureMachine::new(long_press),
            caret: CaretSuppression::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    entries: AHashMap<ElementId, SurfaceEntry>,
}

impl SurfaceRegistry {
    pub fn contains(&self, scroller: ElementId) -> bool {
        self.entries.contains_key(&scroller)
    }

    pub fn insert(&mut self, scroller: ElementId, entry: SurfaceEntry) {
        self.entries.insert(scroller, entry);
    }

    pub fn get_mut(&mut self, scroller: ElementId) -> Option<&mut SurfaceEntry> {
        self.entries.get_mut(&scroller)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ElementId, &mut SurfaceEntry)> {
        self.entries.iter_mut()
    }

    /// Remove entries whose scroller no longer satisfies `alive`.
    pub fn prune(&mut self, mut alive: impl FnMut(ElementId) -> bool) -> Vec<(ElementId, SurfaceEntry)> {
        let dead: Vec<ElementId> = self
            .entries
            .keys()
            .copied()
            .filter(|id| !alive(*id))
            .collect();
        dead.into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|e| (id, e)))
            .collect()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (ElementId, SurfaceEntry)> + '_ {
        self.entries.drain()
    }
}
