//! Click below the last line to append blank lines.
//!
//! Clicking in the empty area under a document's last rendered line appends
//! trailing blank lines and puts the cursor on the last of them, the way a
//! word processor lets you click into the space below the text.
//!
//! Flow per surface (press-release mode):
//! 1. Press: resolve the click's distance below the content bottom, ask the
//!    policy for a line count. Non-zero arms the gesture and hides the caret
//!    on the last line for a short moment.
//! 2. Release: recompute against the release position. Within the long-press
//!    window and still qualifying, append the lines.
//!
//! In click mode the click event alone is resolved and committed.
//!
//! Listeners are attached once per scroller element, however often its view
//! is re-activated, and removed again on unload.

pub mod caret;
pub mod diagnostics;
pub mod executor;
pub mod geometry;
pub mod gesture;
pub mod policy;
pub mod registry;

use crate::Plugin;
use crate::host::EditorHost;
use anyhow::Result;
use core_config::{AppendStrategy, Config, GestureMode};
use core_events::{
    ElementId, Event, PointerButton, PointerEvent, PointerEventKind, PointerInterest, ViewEvent,
    ViewId,
};
use core_model::{ElementRole, TextEditor, ViewKind};
use diagnostics::{DiagnosticLatch, FaultScope};
use geometry::{IntegrationFault, distance_below_content};
use gesture::{PressOutcome, ReleaseOutcome};
use policy::{TrailingLineState, lines_to_append, parse_line_height};
use registry::{SurfaceEntry, SurfaceRegistry};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

pub const PLUGIN_ID: &str = "click-below";

/// Tunables resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mode: GestureMode,
    pub strategy: AppendStrategy,
    pub long_press: Duration,
    pub caret_restore: Duration,
    pub fallback_line_height: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            mode: cfg.gesture_mode(),
            strategy: cfg.append_strategy(),
            long_press: cfg.long_press(),
            caret_restore: cfg.caret_restore(),
            fallback_line_height: cfg.effective_fallback_line_height(),
        }
    }

    fn interest(&self) -> PointerInterest {
        match self.mode {
            GestureMode::PressRelease => PointerInterest::DOWN | PointerInterest::UP,
            GestureMode::Click => PointerInterest::CLICK,
        }
    }
}

pub struct ClickBelow {
    settings: Settings,
    registry: SurfaceRegistry,
    diagnostics: DiagnosticLatch,
}

impl ClickBelow {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            registry: SurfaceRegistry::default(),
            diagnostics: DiagnosticLatch::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of surfaces with listeners attached.
    pub fn registered_surfaces(&self) -> usize {
        self.registry.len()
    }

    /// Distinct (scope, fault) pairs currently latched as reported.
    pub fn reported_faults(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_registered(&self, scroller: ElementId) -> bool {
        self.registry.contains(scroller)
    }

    /// Whether the surface has a gesture waiting for its release.
    pub fn is_armed(&mut self, scroller: ElementId) -> bool {
        self.registry
            .get_mut(scroller)
            .is_some_and(|e| e.gesture.is_armed())
    }

    /// Attach listeners to `view`'s scroller unless already attached.
    pub fn register_view(&mut self, view: ViewId, host: &mut dyn EditorHost) {
        if host.view_kind(view) != Some(ViewKind::Text) {
            trace!(target: "plugin.registry", view = view.0, "skip_non_text_view");
            return;
        }
        let Some(scroller) = host.find_in_view(view, ElementRole::Scroller) else {
            self.report(host, FaultScope::View(view), IntegrationFault::MissingScroller);
            return;
        };
        if self.registry.contains(scroller) {
            debug!(target: "plugin.registry", view = view.0, %scroller, "already_registered");
            return;
        }
        let Some(listener) = host.attach_pointer_listener(scroller, self.settings.interest())
        else {
            return;
        };
        self.registry.insert(
            scroller,
            SurfaceEntry::new(view, listener, self.settings.long_press),
        );
        info!(
            target: "plugin.registry",
            view = view.0,
            %scroller,
            listener = listener.id,
            "surface_registered"
        );
    }

    fn report(&mut self, host: &mut dyn EditorHost, scope: FaultScope, fault: IntegrationFault) {
        if self.diagnostics.first_report(scope, fault) {
            host.notice(&format!("{PLUGIN_ID}: {fault}"));
            info!(target: "plugin.click_below", ?scope, %fault, "integration_fault_reported");
        } else {
            debug!(target: "plugin.click_below", ?scope, %fault, "integration_fault_repeat");
        }
    }

    /// Lines a pointer event at `event`'s position would append on `view`.
    fn decide(
        &self,
        view: ViewId,
        scroller: ElementId,
        event: &PointerEvent,
        host: &dyn EditorHost,
    ) -> Result<u8, IntegrationFault> {
        let content = host
            .find_in_view(view, ElementRole::Content)
            .ok_or(IntegrationFault::MissingContentRoot)?;
        let geometry = host.geometry();
        let distance =
            distance_below_content(geometry, scroller, content, event.target, event.offset_y)?;
        if distance < 0.0 {
            trace!(target: "plugin.click_below", distance, "click_within_content");
            return Ok(0);
        }
        let Some(editor) = host.editor(view) else {
            return Ok(0);
        };
        let trailing = TrailingLineState::read(editor);
        let line_height = parse_line_height(
            geometry.line_height(scroller).as_deref(),
            self.settings.fallback_line_height,
        );
        let lines = lines_to_append(distance, trailing, line_height);
        debug!(
            target: "plugin.click_below",
            view = view.0,
            distance,
            line_height,
            last_blank = trailing.last_blank,
            second_to_last_blank = trailing.second_to_last_blank,
            lines,
            "append_decision"
        );
        Ok(lines)
    }

    fn decide_or_report(
        &mut self,
        view: ViewId,
        scroller: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) -> Option<u8> {
        match self.decide(view, scroller, event, host) {
            Ok(lines) => Some(lines),
            Err(fault) => {
                self.report(host, FaultScope::Surface(scroller), fault);
                None
            }
        }
    }

    fn commit(&self, view: ViewId, lines: u8, host: &mut dyn EditorHost) {
        let strategy = self.settings.strategy;
        let mut cursor = None;
        let applied = host.edit_view(view, &mut |editor: &mut dyn TextEditor| {
            cursor = Some(executor::append_lines(editor, lines, strategy));
        });
        match cursor {
            Some(cursor) if applied => info!(
                target: "plugin.click_below",
                view = view.0,
                lines,
                cursor_line = cursor.line,
                ?strategy,
                "lines_appended"
            ),
            _ => debug!(target: "plugin.click_below", view = view.0, "commit_view_gone"),
        }
    }

    /// Handle a pointer event delivered to the listener on `scroller`.
    pub fn handle_pointer(
        &mut self,
        scroller: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) {
        let Some(view) = self.registry.get_mut(scroller).map(|e| e.view) else {
            return;
        };
        if event.button() != PointerButton::Primary {
            trace!(target: "plugin.click_below", button = ?event.button(), "ignore_button");
            return;
        }
        match (self.settings.mode, event.kind) {
            (GestureMode::PressRelease, PointerEventKind::Down(_)) => {
                self.on_press(view, scroller, event, host)
            }
            (GestureMode::PressRelease, PointerEventKind::Up(_)) => {
                self.on_release(view, scroller, event, host)
            }
            (GestureMode::Click, PointerEventKind::Click(_)) => {
                self.on_click(view, scroller, event, host)
            }
            _ => {}
        }
    }

    fn on_press(
        &mut self,
        view: ViewId,
        scroller: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) {
        let lines = self.decide_or_report(view, scroller, event, host);
        let content = host.find_in_view(view, ElementRole::Content);
        let last_line = content.and_then(|c| host.geometry().last_child(c));
        let restore_at = event.timestamp + self.settings.caret_restore;
        let Some(entry) = self.registry.get_mut(scroller) else {
            return;
        };
        let Some(lines) = lines else {
            entry.gesture.reset();
            return;
        };
        if let PressOutcome::Armed(pending) = entry.gesture.press(event.timestamp, lines) {
            debug!(
                target: "plugin.click_below",
                view = view.0,
                lines = pending.decided_lines,
                "gesture_armed"
            );
            if let Some(line) = last_line {
                entry.caret.suppress(host, line, restore_at);
            }
        }
    }

    fn on_release(
        &mut self,
        view: ViewId,
        scroller: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) {
        if !self.is_armed(scroller) {
            return;
        }
        let lines = self.decide_or_report(view, scroller, event, host);
        let Some(entry) = self.registry.get_mut(scroller) else {
            return;
        };
        let Some(lines) = lines else {
            entry.gesture.reset();
            return;
        };
        match entry.gesture.release(event.timestamp, lines) {
            ReleaseOutcome::Commit(lines) => self.commit(view, lines, host),
            ReleaseOutcome::LongPress { elapsed } => debug!(
                target: "plugin.click_below",
                view = view.0,
                elapsed_ms = elapsed.as_millis() as u64,
                "gesture_rejected_long_press"
            ),
            ReleaseOutcome::Declined => {
                debug!(target: "plugin.click_below", view = view.0, "gesture_declined")
            }
            ReleaseOutcome::NotArmed => {}
        }
    }

    fn on_click(
        &mut self,
        view: ViewId,
        scroller: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) {
        if let Some(lines) = self.decide_or_report(view, scroller, event, host)
            && lines > 0
        {
            self.commit(view, lines, host);
        }
    }

    /// Expire caret suppressions and stale gestures.
    pub fn tick(&mut self, now: Instant, host: &mut dyn EditorHost) {
        for (scroller, entry) in self.registry.iter_mut() {
            entry.caret.poll(host, now);
            if entry.gesture.expire(now) {
                trace!(target: "plugin.click_below", %scroller, "gesture_expired");
            }
        }
    }

    /// Drop entries whose surface was destroyed.
    pub fn prune(&mut self, host: &dyn EditorHost) {
        for (scroller, _entry) in self.registry.prune(|id| host.element_exists(id)) {
            self.diagnostics.forget(FaultScope::Surface(scroller));
            debug!(target: "plugin.registry", %scroller, "surface_pruned");
        }
    }

    /// Forget `view`'s registration faults and drop its destroyed surfaces.
    pub fn view_closed(&mut self, view: ViewId, host: &dyn EditorHost) {
        self.diagnostics.forget(FaultScope::View(view));
        self.prune(host);
    }

    /// Detach every listener still attached and restore any hidden caret.
    pub fn teardown(&mut self, host: &mut dyn EditorHost) {
        for (scroller, mut entry) in self.registry.drain() {
            entry.caret.restore(host);
            if host.element_exists(scroller) {
                host.detach_listener(entry.listener);
                debug!(target: "plugin.registry", %scroller, "surface_detached");
            }
        }
    }
}

impl Plugin for ClickBelow {
    fn id(&self) -> &'static str {
        PLUGIN_ID
    }

    fn on_load(&mut self, host: &mut dyn EditorHost) -> Result<()> {
        if let Some(view) = host.active_view() {
            self.register_view(view, host);
        }
        Ok(())
    }

    fn on_event(&mut self, event: &Event, host: &mut dyn EditorHost) -> Result<()> {
        match event {
            Event::View(ViewEvent::ActiveChanged(view)) => self.register_view(*view, host),
            Event::View(ViewEvent::Closed(view)) => self.view_closed(*view, host),
            Event::Tick(now) => self.tick(*now, host),
            Event::Input(_) | Event::Shutdown => {}
        }
        Ok(())
    }

    fn on_pointer(
        &mut self,
        surface: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) -> Result<()> {
        self.handle_pointer(surface, event, host);
        Ok(())
    }

    fn on_unload(&mut self, host: &mut dyn EditorHost) {
        self.teardown(host);
    }
}
