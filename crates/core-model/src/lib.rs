//! Host-side editor model.
//!
//! The workspace owns everything a plugin treats as an external collaborator:
//! views (text and non-text), their rendered element trees, the text buffers
//! behind text views, pointer listeners attached to rendered elements, and a
//! user-visible notice channel. Plugins reach all of it through narrow
//! capabilities ([`GeometryProvider`], [`TextEditor`]) plus the workspace's own
//! query/mutation methods.
//!
//! Invariants (must hold after every public call):
//! * `active`, when set, names an open view.
//! * Every open text view's rendered surface has exactly one line element per
//!   buffer line (re-laid out after each [`Workspace::edit`]).
//! * Listener handles name live elements; closing a view drops the listeners
//!   attached anywhere in its subtree.

use core_events::{ElementId, Event, PointerEventKind, PointerInterest, ViewEvent, ViewId};
use core_text::Buffer;
use std::collections::BTreeMap;
use tracing::debug;

mod editor;
mod element;
mod geometry;
mod layout;

pub use editor::{EditorCommand, TextEditor, TextView};
pub use element::{ComputedStyle, Element, ElementRole, ElementTree};
pub use geometry::{GeometryProvider, MAX_OFFSET_CHAIN};
pub use layout::{RenderedSurface, TextLayout, build_text_surface, relayout_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Text-editing view backed by a buffer.
    Text,
    /// Anything else (graph, image, settings, ...).
    Other,
}

struct TextViewState {
    text: TextView,
    layout: TextLayout,
    surface: RenderedSurface,
}

struct ViewEntry {
    name: String,
    kind: ViewKind,
    root: ElementId,
    text: Option<TextViewState>,
}

/// Handle returned when a pointer listener is attached to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    pub id: u64,
    pub element: ElementId,
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    handle: ListenerHandle,
    interest: PointerInterest,
}

#[derive(Default)]
pub struct Workspace {
    tree: ElementTree,
    views: BTreeMap<ViewId, ViewEntry>,
    active: Option<ViewId>,
    next_view: usize,
    listeners: Vec<Listener>,
    next_listener: u64,
    notices: Vec<String>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Direct tree access for hosts that restructure rendered output.
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    fn alloc_view(&mut self) -> ViewId {
        let id = ViewId(self.next_view);
        self.next_view += 1;
        id
    }

    /// Open a text view over `buffer`, rendering it with `layout`.
    pub fn open_text_view(&mut self, buffer: Buffer, layout: TextLayout) -> Option<ViewId> {
        let surface = build_text_surface(&mut self.tree, &layout, buffer.line_count())?;
        let id = self.alloc_view();
        let name = buffer.name.clone();
        self.views.insert(
            id,
            ViewEntry {
                name,
                kind: ViewKind::Text,
                root: surface.root,
                text: Some(TextViewState {
                    text: TextView::new(buffer),
                    layout,
                    surface,
                }),
            },
        );
        debug!(target: "model.views", view = id.0, "open_text_view");
        Some(id)
    }

    /// Open a non-text view (renders a bare container).
    pub fn open_other_view(&mut self, name: impl Into<String>) -> ViewId {
        let root = self.tree.insert_root(Element::new(ElementRole::ViewContainer));
        let id = self.alloc_view();
        self.views.insert(
            id,
            ViewEntry {
                name: name.into(),
                kind: ViewKind::Other,
                root,
                text: None,
            },
        );
        id
    }

    /// Make `view` active, returning the notification the host broadcasts.
    /// The notification fires even when `view` already was active.
    pub fn activate(&mut self, view: ViewId) -> Option<Event> {
        if !self.views.contains_key(&view) {
            return None;
        }
        self.active = Some(view);
        Some(Event::View(ViewEvent::ActiveChanged(view)))
    }

    /// Close `view`, destroying its rendered subtree and any listeners in it.
    pub fn close_view(&mut self, view: ViewId) -> Option<Event> {
        let entry = self.views.remove(&view)?;
        let removed = self.tree.remove_subtree(entry.root);
        self.listeners
            .retain(|l| !removed.contains(&l.handle.element));
        if self.active == Some(view) {
            self.active = None;
        }
        debug!(
            target: "model.views",
            view = view.0,
            elements = removed.len(),
            "close_view"
        );
        Some(Event::View(ViewEvent::Closed(view)))
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.active
    }

    pub fn view_kind(&self, view: ViewId) -> Option<ViewKind> {
        self.views.get(&view).map(|v| v.kind)
    }

    pub fn view_name(&self, view: ViewId) -> Option<&str> {
        self.views.get(&view).map(|v| v.name.as_str())
    }

    pub fn view_root(&self, view: ViewId) -> Option<ElementId> {
        self.views.get(&view).map(|v| v.root)
    }

    /// Rendered surface ids of a text view as originally built.
    pub fn surface(&self, view: ViewId) -> Option<RenderedSurface> {
        self.views.get(&view)?.text.as_ref().map(|t| t.surface)
    }

    /// Locate the first element with `role` inside `view`'s rendered subtree.
    pub fn find_in_view(&self, view: ViewId, role: ElementRole) -> Option<ElementId> {
        let root = self.view_root(view)?;
        self.tree.find_descendant(root, role)
    }

    pub fn text_view(&self, view: ViewId) -> Option<&TextView> {
        self.views.get(&view)?.text.as_ref().map(|t| &t.text)
    }

    /// Run `f` against the view's editor, then re-lay out its lines.
    pub fn edit<R>(&mut self, view: ViewId, f: impl FnOnce(&mut dyn TextEditor) -> R) -> Option<R> {
        let state = self.views.get_mut(&view)?.text.as_mut()?;
        let out = f(&mut state.text);
        if self.tree.contains(state.surface.content) {
            relayout_lines(
                &mut self.tree,
                &state.surface,
                &state.layout,
                state.text.buffer.line_count(),
            );
        }
        Some(out)
    }

    /// Attach a pointer listener to `element`.
    pub fn add_pointer_listener(
        &mut self,
        element: ElementId,
        interest: PointerInterest,
    ) -> Option<ListenerHandle> {
        if !self.tree.contains(element) {
            return None;
        }
        let handle = ListenerHandle {
            id: self.next_listener,
            element,
        };
        self.next_listener += 1;
        self.listeners.push(Listener { handle, interest });
        Some(handle)
    }

    /// Detach a listener. Returns false when the handle was already gone.
    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.handle != handle);
        before != self.listeners.len()
    }

    pub fn listener_count(&self, element: ElementId) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.handle.element == element)
            .count()
    }

    /// Find the element whose listener should receive a pointer event of `kind`
    /// dispatched at `target`: the nearest structural ancestor (or `target`
    /// itself) carrying a listener interested in `kind`.
    pub fn route_pointer(&self, target: ElementId, kind: PointerEventKind) -> Option<ElementId> {
        let mut cur = Some(target);
        while let Some(id) = cur {
            if self
                .listeners
                .iter()
                .any(|l| l.handle.element == id && l.interest.wants(kind))
            {
                return Some(id);
            }
            cur = self.tree.get(id).and_then(|e| e.parent);
        }
        None
    }

    /// Surface a user-visible notice.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::PointerButton;

    fn ws_with_text(lines: &[&str]) -> (Workspace, ViewId) {
        let mut ws = Workspace::new();
        let buffer = Buffer::from_lines("note.md", lines).unwrap();
        let view = ws.open_text_view(buffer, TextLayout::default()).unwrap();
        (ws, view)
    }

    #[test]
    fn text_view_renders_one_line_element_per_buffer_line() {
        let (ws, view) = ws_with_text(&["a", "b", "c"]);
        let s = ws.surface(view).unwrap();
        assert_eq!(ws.tree().get(s.content).unwrap().children().len(), 3);
        assert_eq!(ws.view_kind(view), Some(ViewKind::Text));
        assert_eq!(ws.find_in_view(view, ElementRole::Scroller), Some(s.scroller));
        assert_eq!(ws.view_name(view), Some("note.md"));
    }

    #[test]
    fn edit_relayouts_lines() {
        let (mut ws, view) = ws_with_text(&["a"]);
        ws.edit(view, |ed| {
            ed.set_line(0, "a\nb\nc");
        })
        .unwrap();
        let s = ws.surface(view).unwrap();
        assert_eq!(ws.tree().get(s.content).unwrap().children().len(), 3);
    }

    #[test]
    fn activation_fires_every_time() {
        let (mut ws, view) = ws_with_text(&["a"]);
        assert!(matches!(
            ws.activate(view),
            Some(Event::View(ViewEvent::ActiveChanged(v))) if v == view
        ));
        assert!(ws.activate(view).is_some());
        assert_eq!(ws.active_view(), Some(view));
        assert!(ws.activate(ViewId(77)).is_none());
    }

    #[test]
    fn close_view_drops_subtree_and_listeners() {
        let (mut ws, view) = ws_with_text(&["a"]);
        let s = ws.surface(view).unwrap();
        ws.activate(view);
        ws.add_pointer_listener(s.scroller, PointerInterest::CLICK)
            .unwrap();
        assert_eq!(ws.listener_count(s.scroller), 1);
        assert!(ws.close_view(view).is_some());
        assert!(!ws.tree().contains(s.scroller));
        assert_eq!(ws.listener_count(s.scroller), 0);
        assert_eq!(ws.active_view(), None);
        assert!(ws.close_view(view).is_none());
    }

    #[test]
    fn route_pointer_finds_nearest_interested_ancestor() {
        let (mut ws, view) = ws_with_text(&["a"]);
        let s = ws.surface(view).unwrap();
        ws.add_pointer_listener(s.scroller, PointerInterest::DOWN | PointerInterest::UP)
            .unwrap();
        let down = PointerEventKind::Down(PointerButton::Primary);
        let click = PointerEventKind::Click(PointerButton::Primary);
        assert_eq!(ws.route_pointer(s.content, down), Some(s.scroller));
        assert_eq!(ws.route_pointer(s.content, click), None);
        assert_eq!(ws.route_pointer(s.root, down), None);
    }

    #[test]
    fn remove_listener_is_idempotent() {
        let (mut ws, view) = ws_with_text(&["a"]);
        let s = ws.surface(view).unwrap();
        let h = ws
            .add_pointer_listener(s.scroller, PointerInterest::CLICK)
            .unwrap();
        assert!(ws.remove_listener(h));
        assert!(!ws.remove_listener(h));
        assert!(ws.add_pointer_listener(ElementId(9999), PointerInterest::CLICK).is_none());
    }

    #[test]
    fn other_views_have_no_text() {
        let mut ws = Workspace::new();
        let v = ws.open_other_view("graph");
        assert_eq!(ws.view_kind(v), Some(ViewKind::Other));
        assert!(ws.text_view(v).is_none());
        assert!(ws.edit(v, |_| ()).is_none());
        assert_eq!(ws.find_in_view(v, ElementRole::Scroller), None);
    }
}
