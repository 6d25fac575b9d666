//! Host capabilities a plugin may use.
//!
//! `EditorHost` is the whole boundary between a plugin and the application
//! it runs in: view queries, element geometry, text editing, caret styling,
//! pointer listener management and the notice channel. The trait is
//! dyn-compatible so plugins can be stored and driven as trait objects.

use core_events::{ElementId, PointerInterest, ViewId};
use core_model::{
    ElementRole, GeometryProvider, ListenerHandle, TextEditor, ViewKind, Workspace,
};

pub trait EditorHost {
    fn active_view(&self) -> Option<ViewId>;
    fn view_kind(&self, view: ViewId) -> Option<ViewKind>;
    /// Locate the first element with `role` inside the view's rendered subtree.
    fn find_in_view(&self, view: ViewId, role: ElementRole) -> Option<ElementId>;
    fn element_exists(&self, element: ElementId) -> bool;
    fn geometry(&self) -> &dyn GeometryProvider;
    /// Read-only editor access for a text view.
    fn editor(&self, view: ViewId) -> Option<&dyn TextEditor>;
    /// Run `f` against a text view's editor. Returns false when the view is
    /// not an open text view (and `f` was not called).
    fn edit_view(&mut self, view: ViewId, f: &mut dyn FnMut(&mut dyn TextEditor)) -> bool;
    /// Replace an element's caret color, returning the previous value, or
    /// `None` when the element does not exist.
    fn set_caret_color(
        &mut self,
        element: ElementId,
        color: Option<String>,
    ) -> Option<Option<String>>;
    fn attach_pointer_listener(
        &mut self,
        element: ElementId,
        interest: PointerInterest,
    ) -> Option<ListenerHandle>;
    fn detach_listener(&mut self, handle: ListenerHandle) -> bool;
    fn notice(&mut self, message: &str);
}

impl EditorHost for Workspace {
    fn active_view(&self) -> Option<ViewId> {
        Workspace::active_view(self)
    }

    fn view_kind(&self, view: ViewId) -> Option<ViewKind> {
        Workspace::view_kind(self, view)
    }

    fn find_in_view(&self, view: ViewId, role: ElementRole) -> Option<ElementId> {
        Workspace::find_in_view(self, view, role)
    }

    fn element_exists(&self, element: ElementId) -> bool {
        self.tree().contains(element)
    }

    fn geometry(&self) -> &dyn GeometryProvider {
        self.tree()
    }

    fn editor(&self, view: ViewId) -> Option<&dyn TextEditor> {
        self.text_view(view).map(|t| t as &dyn TextEditor)
    }

    fn edit_view(&mut self, view: ViewId, f: &mut dyn FnMut(&mut dyn TextEditor)) -> bool {
        self.edit(view, |ed| f(ed)).is_some()
    }

    fn set_caret_color(
        &mut self,
        element: ElementId,
        color: Option<String>,
    ) -> Option<Option<String>> {
        self.tree_mut().set_caret_color(element, color)
    }

    fn attach_pointer_listener(
        &mut self,
        element: ElementId,
        interest: PointerInterest,
    ) -> Option<ListenerHandle> {
        self.add_pointer_listener(element, interest)
    }

    fn detach_listener(&mut self, handle: ListenerHandle) -> bool {
        self.remove_listener(handle)
    }

    fn notice(&mut self, message: &str) {
        Workspace::notice(self, message);
    }
}
