//! One-time reporting of integration faults.

use super::geometry::IntegrationFault;
use ahash::AHashSet;
use core_events::{ElementId, ViewId};

/// What a fault is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultScope {
    /// Registration-time faults, before any surface is known.
    View(ViewId),
    Surface(ElementId),
}

#[derive(Debug, Default)]
pub struct DiagnosticLatch {
    reported: AHashSet<(FaultScope, IntegrationFault)>,
}

impl DiagnosticLatch {
    /// Returns true the first time a (scope, fault) pair is seen.
    pub fn first_report(&mut self, scope: FaultScope, fault: IntegrationFault) -> bool {
        self.reported.insert((scope, fault))
    }

    /// Forget everything reported for `scope` (its view or surface went away).
    pub fn forget(&mut self, scope: FaultScope) {
        self.reported.retain(|(s, _)| *s != scope);
    }

    pub fn len(&self) -> usize {
        self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }
}
