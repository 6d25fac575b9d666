//! Plugin host and the click-below plugin.
//!
//! A `Plugin` reacts to workspace events (view activation, view close, ticks)
//! and to pointer events routed to listeners it attached. Everything it may
//! touch in the application goes through `EditorHost`, so plugins are
//! testable against any host implementation, the in-memory `Workspace`
//! included.
//!
//! `PluginHost` is the collection side: it owns a set of plugins, loads them
//! once, fans events out and unloads them in reverse order. `StaticPluginHost`
//! holds compiled-in plugins; there is no dynamic discovery.

pub mod click_below;
pub mod host;

pub use click_below::{ClickBelow, PLUGIN_ID, Settings};
pub use host::EditorHost;

use core_events::{ElementId, Event, PointerEvent};
use tracing::{debug, info, warn};

/// A single plugin driven by a `PluginHost`.
pub trait Plugin {
    /// Stable identifier (for logs / diagnostics).
    fn id(&self) -> &'static str;
    /// Called once before any event is delivered.
    fn on_load(&mut self, host: &mut dyn EditorHost) -> anyhow::Result<()>;
    fn on_event(&mut self, event: &Event, host: &mut dyn EditorHost) -> anyhow::Result<()>;
    /// Pointer event delivered to a listener this plugin attached on `surface`.
    fn on_pointer(
        &mut self,
        surface: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) -> anyhow::Result<()>;
    /// Release everything attached to the host. Must not fail.
    fn on_unload(&mut self, host: &mut dyn EditorHost);
}

/// Trait representing a collection-oriented plugin host.
pub trait PluginHost {
    /// Stable human-readable host identifier (for logs / diagnostics).
    fn name(&self) -> &'static str;
    /// Load all plugins. Idempotent: repeated calls do not load twice.
    fn load_all(&mut self, host: &mut dyn EditorHost) -> anyhow::Result<()>;
    /// Deliver a workspace event to every loaded plugin.
    fn dispatch(&mut self, event: &Event, host: &mut dyn EditorHost);
    /// Deliver a pointer event routed to `surface`.
    fn dispatch_pointer(
        &mut self,
        surface: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    );
    /// Unload every plugin, newest first.
    fn unload_all(&mut self, host: &mut dyn EditorHost);
}

impl<T: PluginHost + ?Sized> PluginHost for &mut T {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn load_all(&mut self, host: &mut dyn EditorHost) -> anyhow::Result<()> {
        (**self).load_all(host)
    }
    fn dispatch(&mut self, event: &Event, host: &mut dyn EditorHost) {
        (**self).dispatch(event, host)
    }
    fn dispatch_pointer(
        &mut self,
        surface: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) {
        (**self).dispatch_pointer(surface, event, host)
    }
    fn unload_all(&mut self, host: &mut dyn EditorHost) {
        (**self).unload_all(host)
    }
}

/// Host over a fixed list of compiled-in plugins.
#[derive(Default)]
pub struct StaticPluginHost {
    plugins: Vec<Box<dyn Plugin>>,
    loaded: bool,
}

impl StaticPluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn plugin_ids(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.id()).collect()
    }
}

impl PluginHost for StaticPluginHost {
    fn name(&self) -> &'static str {
        "static-plugin-host"
    }

    fn load_all(&mut self, host: &mut dyn EditorHost) -> anyhow::Result<()> {
        if self.loaded {
            debug!(target: "plugin.host", "load_all_repeat");
            return Ok(());
        }
        for plugin in self.plugins.iter_mut() {
            plugin.on_load(host)?;
            info!(target: "plugin.host", plugin = plugin.id(), "plugin_loaded");
        }
        self.loaded = true;
        Ok(())
    }

    fn dispatch(&mut self, event: &Event, host: &mut dyn EditorHost) {
        if !self.loaded {
            return;
        }
        for plugin in self.plugins.iter_mut() {
            if let Err(e) = plugin.on_event(event, host) {
                warn!(target: "plugin.host", plugin = plugin.id(), error = %e, "plugin_event_failed");
            }
        }
    }

    fn dispatch_pointer(
        &mut self,
        surface: ElementId,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) {
        if !self.loaded {
            return;
        }
        for plugin in self.plugins.iter_mut() {
            if let Err(e) = plugin.on_pointer(surface, event, host) {
                warn!(target: "plugin.host", plugin = plugin.id(), error = %e, "plugin_pointer_failed");
            }
        }
    }

    fn unload_all(&mut self, host: &mut dyn EditorHost) {
        if !self.loaded {
            return;
        }
        for plugin in self.plugins.iter_mut().rev() {
            plugin.on_unload(host);
            info!(target: "plugin.host", plugin = plugin.id(), "plugin_unloaded");
        }
        self.loaded = false;
    }
}
