//! Core event types and channel helpers for click-below.
//!
//! Everything the host can tell a plugin arrives as an [`Event`]: pointer
//! input on a rendered surface, view lifecycle notifications, periodic ticks
//! (which drive short one-shot deadlines such as caret restoration) and
//! shutdown. Identity types shared by the model and the plugin layer
//! ([`ViewId`], [`ElementId`]) live here so neither depends on the other.

use std::fmt;
use std::time::Instant;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// The event loop uses a bounded mpsc channel sized by `EVENT_CHANNEL_CAP`. Producers await
// capacity rather than dropping events: pointer press/release pairs must never lose their second
// half, otherwise a gesture stays armed until the next press supersedes it.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

/// Stable identifier for a view (tab / leaf) hosted by the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub usize);

/// Stable identifier for a rendered element. Ids are never reused after the
/// element is removed, so a stale id simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    View(ViewEvent),
    /// Periodic monotonic tick carrying the instant it was produced. Used to
    /// expire short deadlines without busy polling.
    Tick(Instant),
    Shutdown,
}

/// Normalized input events.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Pointer(PointerEvent),
}

/// View lifecycle notifications surfaced by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// A view became the active one. Switching tabs re-fires this for a view
    /// whose rendered surface already exists.
    ActiveChanged(ViewId),
    /// A view was closed and its rendered subtree destroyed.
    Closed(ViewId),
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------
// Providers (tick timer, scripted input) register uniformly. Each source is responsible for its own
// task lifecycle; on channel send failure (consumer dropped) it must terminate promptly.

/// Trait implemented by any async event producer. Implementors usually hold configuration and
/// spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Human-readable stable identifier (used for logging / diagnostics).
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task, returning a JoinHandle. Implementors should
    /// stop when `tx.send(..).await` returns Err (channel closed) or on their own internal stop
    /// condition.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources, spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in monotonic tick source. Emits `Event::Tick` every configured interval.
pub struct TickEventSource {
    interval: std::time::Duration,
}

impl TickEventSource {
    pub fn new(interval: std::time::Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick(Instant::now())).await.is_err() {
                    break;
                }
            }
        })
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }
    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }
    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// clone of `tx`; the registry is drained so a second call spawns nothing.
    ///
    /// During shutdown the caller should drop its final `Sender` clone before awaiting the
    /// returned handles so the sources observe the closed channel and exit cooperatively.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

// -------------------------------------------------------------------------------------------------
// Pointer Types
// -------------------------------------------------------------------------------------------------

/// A pointer event as delivered to a listener on a rendered surface.
///
/// `offset_x` / `offset_y` are relative to `target`'s own box, not to the
/// surface the listener is attached to. Converting them into the surface's
/// coordinate space is the job of the geometry layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub target: ElementId,
    pub offset_x: f64,
    pub offset_y: f64,
    pub timestamp: Instant,
}

impl PointerEvent {
    /// Create a pointer event stamped with the current instant.
    pub fn new(kind: PointerEventKind, target: ElementId, offset_x: f64, offset_y: f64) -> Self {
        Self::at(kind, target, offset_x, offset_y, Instant::now())
    }

    /// Create a pointer event with caller supplied timestamp (primarily for tests).
    pub fn at(
        kind: PointerEventKind,
        target: ElementId,
        offset_x: f64,
        offset_y: f64,
        timestamp: Instant,
    ) -> Self {
        Self {
            kind,
            target,
            offset_x,
            offset_y,
            timestamp,
        }
    }

    pub fn button(&self) -> PointerButton {
        match self.kind {
            PointerEventKind::Down(b) | PointerEventKind::Up(b) | PointerEventKind::Click(b) => b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down(PointerButton),
    Up(PointerButton),
    /// Synthesized by the host after a down/up pair on the same element.
    Click(PointerButton),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
}

bitflags::bitflags! {
    /// Pointer event kinds a surface listener subscribes to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PointerInterest: u8 {
        const DOWN  = 0b0000_0001;
        const UP    = 0b0000_0010;
        const CLICK = 0b0000_0100;
    }
}

impl PointerInterest {
    /// Whether a listener with this interest wants to see `kind`.
    pub fn wants(self, kind: PointerEventKind) -> bool {
        match kind {
            PointerEventKind::Down(_) => self.contains(Self::DOWN),
            PointerEventKind::Up(_) => self.contains(Self::UP),
            PointerEventKind::Click(_) => self.contains(Self::CLICK),
        }
    }
}
