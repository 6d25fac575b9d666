//! Transient caret suppression.
//!
//! While a gesture is pending the caret on the last rendered line is made
//! transparent so its blink does not flicker, then restored at a deadline
//! whether or not the gesture commits. Re-suppressing the same element only
//! moves the deadline: the color saved the first time is the one restored.

use crate::host::EditorHost;
use core_events::ElementId;
use std::time::Instant;
use tracing::trace;

pub const TRANSPARENT: &str = "transparent";

#[derive(Debug, Clone, PartialEq)]
struct Suppressed {
    element: ElementId,
    saved: Option<String>,
    restore_at: Instant,
}

#[derive(Debug, Default)]
pub struct CaretSuppression {
    active: Option<Suppressed>,
}

impl CaretSuppression {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn restore_at(&self) -> Option<Instant> {
        self.active.as_ref().map(|s| s.restore_at)
    }

    /// Hide the caret on `element` until `restore_at`. Returns false when the
    /// element does not exist.
    pub fn suppress(
        &mut self,
        host: &mut dyn EditorHost,
        element: ElementId,
        restore_at: Instant,
    ) -> bool {
        if let Some(active) = self.active.as_mut()
            && active.element == element
        {
            active.restore_at = restore_at;
            host.set_caret_color(element, Some(TRANSPARENT.to_string()));
            trace!(target: "plugin.caret", %element, "suppress_extended");
            return true;
        }
        self.restore(host);
        match host.set_caret_color(element, Some(TRANSPARENT.to_string())) {
            Some(saved) => {
                self.active = Some(Suppressed {
                    element,
                    saved,
                    restore_at,
                });
                trace!(target: "plugin.caret", %element, "suppress");
                true
            }
            None => false,
        }
    }

    /// Restore the caret if its deadline has passed. Returns true when restored.
    pub fn poll(&mut self, host: &mut dyn EditorHost, now: Instant) -> bool {
        match &self.active {
            Some(s) if now >= s.restore_at => self.restore(host),
            _ => false,
        }
    }

    /// Restore immediately. Returns true when a suppression was active.
    pub fn restore(&mut self, host: &mut dyn EditorHost) -> bool {
        let Some(s) = self.active.take() else {
            return false;
        };
        // the element may have been re-rendered away in the meantime
        let existed = host.set_caret_color(s.element, s.saved).is_some();
        trace!(target: "plugin.caret", element = %s.element, existed, "restore");
        true
    }
}
