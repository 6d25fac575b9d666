#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_config::{AppendStrategy, GestureMode};
use core_events::{ElementId, PointerButton, PointerEvent, PointerEventKind, ViewId};
use core_model::{RenderedSurface, TextLayout, Workspace};
use core_plugin::{ClickBelow, PluginHost, Settings, StaticPluginHost};
use core_text::Buffer;
use std::time::{Duration, Instant};

pub const LINE_HEIGHT: f64 = 24.0;

/// A workspace with one active text view and the click-below plugin loaded.
pub struct Harness {
    pub ws: Workspace,
    pub plugins: StaticPluginHost,
    pub view: ViewId,
    pub t0: Instant,
}

pub fn settings(mode: GestureMode, strategy: AppendStrategy) -> Settings {
    Settings {
        mode,
        strategy,
        ..Settings::default()
    }
}

impl Harness {
    pub fn new(lines: &[&str]) -> Self {
        Self::with_settings(lines, Settings::default())
    }

    pub fn with_settings(lines: &[&str], settings: Settings) -> Self {
        let mut ws = Workspace::new();
        let view = ws
            .open_text_view(Buffer::from_lines("doc", lines).unwrap(), TextLayout::default())
            .unwrap();
        ws.activate(view);
        let mut plugins = StaticPluginHost::new().with_plugin(ClickBelow::new(settings));
        plugins.load_all(&mut ws).unwrap();
        Self {
            ws,
            plugins,
            view,
            t0: Instant::now(),
        }
    }

    pub fn surface(&self) -> RenderedSurface {
        self.ws.surface(self.view).unwrap()
    }

    pub fn text(&self) -> String {
        self.ws.text_view(self.view).unwrap().buffer.text()
    }

    pub fn cursor_line(&self) -> usize {
        use core_model::TextEditor;
        self.ws.text_view(self.view).unwrap().cursor().line
    }

    pub fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    /// Offset on the content root that lands `distance` px below the last line.
    pub fn below(&self, distance: f64) -> f64 {
        let lines = self.ws.text_view(self.view).unwrap().buffer.line_count();
        lines as f64 * LINE_HEIGHT + distance
    }

    /// Dispatch a pointer event the way the host does: route to the nearest
    /// listening ancestor of `target`, then hand it to the plugin host.
    pub fn pointer(&mut self, kind: PointerEventKind, target: ElementId, offset_y: f64, ms: u64) {
        let ev = PointerEvent::at(kind, target, 0.0, offset_y, self.at(ms));
        if let Some(surface) = self.ws.route_pointer(target, kind) {
            self.plugins.dispatch_pointer(surface, &ev, &mut self.ws);
        }
    }

    pub fn press(&mut self, distance: f64, ms: u64) {
        let content = self.surface().content;
        let y = self.below(distance);
        self.pointer(PointerEventKind::Down(PointerButton::Primary), content, y, ms);
    }

    pub fn release(&mut self, distance: f64, ms: u64) {
        let content = self.surface().content;
        let y = self.below(distance);
        self.pointer(PointerEventKind::Up(PointerButton::Primary), content, y, ms);
    }

    /// Press and release at the same spot `held_ms` apart.
    pub fn click_below(&mut self, distance: f64, held_ms: u64) {
        self.press(distance, 0);
        self.release(distance, held_ms);
    }

    pub fn tick(&mut self, ms: u64) {
        let ev = core_events::Event::Tick(self.at(ms));
        self.plugins.dispatch(&ev, &mut self.ws);
    }

    pub fn activate(&mut self, view: ViewId) {
        if let Some(ev) = self.ws.activate(view) {
            self.plugins.dispatch(&ev, &mut self.ws);
        }
    }

    pub fn close(&mut self, view: ViewId) {
        if let Some(ev) = self.ws.close_view(view) {
            self.plugins.dispatch(&ev, &mut self.ws);
        }
    }
}
