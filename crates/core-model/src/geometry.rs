//! Geometry provider capability.
//!
//! Hosts expose only per-element box data: the top offset relative to the
//! element's offset parent, its own height, and the offset parent link. Any
//! coordinate in an element's local frame can be lifted into an ancestor's
//! frame by walking the offset-parent chain and accumulating top offsets until
//! the ancestor is reached. Two chains started from different elements may
//! have different depths; both stop at the same ancestor so their results are
//! directly comparable.

use crate::element::ElementTree;
use core_events::ElementId;

/// Upper bound on offset-parent hops. A chain longer than this is treated as
/// never reaching the requested ancestor (malformed host tree).
pub const MAX_OFFSET_CHAIN: usize = 4096;

pub trait GeometryProvider {
    fn offset_parent(&self, id: ElementId) -> Option<ElementId>;
    fn offset_top(&self, id: ElementId) -> Option<f64>;
    fn offset_height(&self, id: ElementId) -> Option<f64>;
    fn last_child(&self, id: ElementId) -> Option<ElementId>;
    /// Computed vertical line spacing string (`"24px"`, `"normal"`, ...).
    fn line_height(&self, id: ElementId) -> Option<String>;

    /// Lift the local vertical coordinate `y` of `from` into `ancestor`'s frame.
    /// Returns `None` when the chain ends (or exceeds [`MAX_OFFSET_CHAIN`])
    /// before reaching `ancestor`.
    fn offset_relative_to(&self, from: ElementId, y: f64, ancestor: ElementId) -> Option<f64> {
        let mut acc = y;
        let mut cur = from;
        let mut hops = 0usize;
        while cur != ancestor {
            if hops == MAX_OFFSET_CHAIN {
                return None;
            }
            acc += self.offset_top(cur)?;
            cur = self.offset_parent(cur)?;
            hops += 1;
        }
        Some(acc)
    }

    /// Bottom edge of `element` expressed in `ancestor`'s frame.
    fn bounding_bottom(&self, element: ElementId, ancestor: ElementId) -> Option<f64> {
        let height = self.offset_height(element)?;
        self.offset_relative_to(element, height, ancestor)
    }
}

impl GeometryProvider for ElementTree {
    fn offset_parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.offset_parent
    }
    fn offset_top(&self, id: ElementId) -> Option<f64> {
        self.get(id).map(|e| e.offset_top)
    }
    fn offset_height(&self, id: ElementId) -> Option<f64> {
        self.get(id).map(|e| e.offset_height)
    }
    fn last_child(&self, id: ElementId) -> Option<ElementId> {
        ElementTree::last_child(self, id)
    }
    fn line_height(&self, id: ElementId) -> Option<String> {
        self.get(id)?.style.line_height.clone()
    }
}
