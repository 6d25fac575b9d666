//! Arena-backed rendered element tree.
//!
//! Each element carries two parent links: `parent` (structural containment,
//! used for subtree queries and removal) and `offset_parent` (the nearest
//! positioned ancestor that `offset_top` is measured against). The two chains
//! may differ in depth; geometry code only ever follows `offset_parent`.
//!
//! Slots are never reused. Removing a subtree leaves `None` behind so a stale
//! [`ElementId`] resolves to nothing instead of aliasing a newer element.

use core_events::ElementId;

/// What an element renders. Host queries locate the scroller and content
/// root of a view by role rather than by position in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// Top-level container of a view.
    ViewContainer,
    /// Viewport that clips and scrolls the rendered document.
    Scroller,
    /// Wrapper sized to the scrollable extent.
    Sizer,
    /// Holds the ordered sequence of rendered lines.
    Content,
    /// A single rendered line / paragraph.
    Line,
    Other,
}

/// Computed style subset the host exposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    /// Vertical line spacing as the platform reports it, e.g. `"24px"` or `"normal"`.
    pub line_height: Option<String>,
    /// Caret color override; `None` renders the theme default.
    pub caret_color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub role: ElementRole,
    pub parent: Option<ElementId>,
    pub offset_parent: Option<ElementId>,
    pub offset_top: f64,
    pub offset_height: f64,
    pub style: ComputedStyle,
    children: Vec<ElementId>,
}

impl Element {
    pub fn new(role: ElementRole) -> Self {
        Self {
            role,
            parent: None,
            offset_parent: None,
            offset_top: 0.0,
            offset_height: 0.0,
            style: ComputedStyle::default(),
            children: Vec::new(),
        }
    }

    pub fn with_box(mut self, offset_top: f64, offset_height: f64) -> Self {
        self.offset_top = offset_top;
        self.offset_height = offset_height;
        self
    }

    pub fn with_line_height(mut self, value: impl Into<String>) -> Self {
        self.style.line_height = Some(value.into());
        self
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

#[derive(Debug, Default)]
pub struct ElementTree {
    slots: Vec<Option<Element>>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached root element.
    pub fn insert_root(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.slots.len());
        self.slots.push(Some(Element {
            parent: None,
            ..element
        }));
        id
    }

    /// Append `element` as the last child of `parent`. `offset_parent` is
    /// taken from the element when set, otherwise it defaults to `parent`.
    /// Returns `None` when `parent` does not exist.
    pub fn append_child(&mut self, parent: ElementId, element: Element) -> Option<ElementId> {
        self.get(parent)?;
        let id = ElementId(self.slots.len());
        let offset_parent = element.offset_parent.or(Some(parent));
        self.slots.push(Some(Element {
            parent: Some(parent),
            offset_parent,
            ..element
        }));
        if let Some(Some(p)) = self.slots.get_mut(parent.0) {
            p.children.push(id);
        }
        Some(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn last_child(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.children.last().copied()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove `id` and all of its descendants. Returns the removed ids.
    pub fn remove_subtree(&mut self, id: ElementId) -> Vec<ElementId> {
        let Some(parent) = self.get(id).map(|e| e.parent) else {
            return Vec::new();
        };
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(el) = self.slots.get_mut(next.0).and_then(Option::take) {
                stack.extend(el.children);
                removed.push(next);
            }
        }
        removed
    }

    /// Remove every child of `id`, keeping `id` itself.
    pub fn clear_children(&mut self, id: ElementId) {
        let children = match self.get(id) {
            Some(el) => el.children.clone(),
            None => return,
        };
        for child in children {
            self.remove_subtree(child);
        }
    }

    /// Depth-first search of `root`'s subtree (including `root`) for the first element with `role`.
    pub fn find_descendant(&self, root: ElementId, role: ElementRole) -> Option<ElementId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(el) = self.get(id) else {
                continue;
            };
            if el.role == role {
                return Some(id);
            }
            stack.extend(el.children.iter().rev().copied());
        }
        None
    }

    /// Replace the caret color of `id`, returning the previous value.
    /// Returns `None` (and changes nothing) when the element does not exist.
    pub fn set_caret_color(
        &mut self,
        id: ElementId,
        color: Option<String>,
    ) -> Option<Option<String>> {
        let el = self.get_mut(id)?;
        Some(std::mem::replace(&mut el.style.caret_color, color))
    }
}
