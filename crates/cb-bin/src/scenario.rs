//! Scripted sessions.
//!
//! A scenario file describes the views to open and a timeline of steps:
//!
//! ```toml
//! [[view]]
//! name = "notes"
//! text = "hello"
//! line_height = 24.0
//!
//! [[step]]
//! at_ms = 0
//! action = "down"
//! view = "notes"
//! offset_y = 64.0
//!
//! [[step]]
//! at_ms = 80
//! action = "up"
//! view = "notes"
//! offset_y = 64.0
//! ```
//!
//! Pointer offsets are relative to the step's target element (`content` by
//! default, or `scroller`). Steps are resolved against the rendered workspace
//! up front and replayed by [`ScriptEventSource`] at their scheduled offsets.

use anyhow::{Context, Result, bail};
use core_events::{
    AsyncEventSource, ElementId, Event, InputEvent, PointerButton, PointerEvent, PointerEventKind,
    ViewEvent, ViewId,
};
use core_model::{ElementRole, TextLayout, Workspace};
use core_text::Buffer;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioFile {
    #[serde(default, rename = "view")]
    pub views: Vec<ViewDef>,
    #[serde(default, rename = "step")]
    pub steps: Vec<StepDef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKindDef {
    #[default]
    Text,
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewDef {
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: ViewKindDef,
    pub line_height: Option<f64>,
    /// Computed line-height string to report instead of `"{line_height}px"`.
    pub line_height_style: Option<String>,
    pub padding_top: Option<f64>,
    pub viewport_height: Option<f64>,
}

impl ViewDef {
    pub fn layout(&self) -> TextLayout {
        let d = TextLayout::default();
        TextLayout {
            line_height: self.line_height.unwrap_or(d.line_height),
            line_height_style: self.line_height_style.clone(),
            padding_top: self.padding_top.unwrap_or(d.padding_top),
            header_height: d.header_height,
            viewport_height: self.viewport_height.unwrap_or(d.viewport_height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepAction {
    Down,
    Up,
    Click,
    Activate,
    Close,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetDef {
    #[default]
    Content,
    Scroller,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonDef {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

impl From<ButtonDef> for PointerButton {
    fn from(b: ButtonDef) -> Self {
        match b {
            ButtonDef::Primary => PointerButton::Primary,
            ButtonDef::Auxiliary => PointerButton::Auxiliary,
            ButtonDef::Secondary => PointerButton::Secondary,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepDef {
    #[serde(default)]
    pub at_ms: u64,
    pub action: StepAction,
    pub view: String,
    #[serde(default)]
    pub target: TargetDef,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub button: ButtonDef,
}

pub fn load(path: &Path) -> Result<ScenarioFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    parse(&content).with_context(|| format!("parsing scenario {}", path.display()))
}

pub fn parse(content: &str) -> Result<ScenarioFile> {
    Ok(toml::from_str(content)?)
}

/// An event scheduled `at` after the session start.
#[derive(Debug, Clone)]
pub struct ScriptedEvent {
    pub at: Duration,
    pub event: Event,
}

/// A workspace rendered from a scenario plus its resolved timeline.
pub struct Session {
    pub ws: Workspace,
    pub views: Vec<(String, ViewId)>,
    pub script: Vec<ScriptedEvent>,
}

impl Session {
    /// Open every view, activate the first one and resolve the steps.
    /// Pointer events are stamped `base + at_ms`.
    pub fn build(file: &ScenarioFile, base: Instant) -> Result<Self> {
        let mut ws = Workspace::new();
        let mut views: Vec<(String, ViewId)> = Vec::with_capacity(file.views.len());
        for def in &file.views {
            if views.iter().any(|(n, _)| *n == def.name) {
                bail!("duplicate view name {:?}", def.name);
            }
            let id = match def.kind {
                ViewKindDef::Text => {
                    let buffer = Buffer::from_str(def.name.as_str(), &def.text)?;
                    ws.open_text_view(buffer, def.layout())
                        .with_context(|| format!("rendering view {:?}", def.name))?
                }
                ViewKindDef::Other => ws.open_other_view(def.name.as_str()),
            };
            views.push((def.name.clone(), id));
        }
        if let Some((_, first)) = views.first() {
            ws.activate(*first);
        }

        let mut steps: Vec<&StepDef> = file.steps.iter().collect();
        steps.sort_by_key(|s| s.at_ms);
        let mut script = Vec::with_capacity(steps.len());
        for step in steps {
            let Some(view) = views.iter().find(|(n, _)| *n == step.view).map(|(_, id)| *id) else {
                bail!("step at {}ms names unknown view {:?}", step.at_ms, step.view);
            };
            let at = Duration::from_millis(step.at_ms);
            let event = match step.action {
                StepAction::Activate => Event::View(ViewEvent::ActiveChanged(view)),
                StepAction::Close => Event::View(ViewEvent::Closed(view)),
                StepAction::Down | StepAction::Up | StepAction::Click => {
                    let target = resolve_target(&ws, view, step.target).with_context(|| {
                        format!("step at {}ms: view {:?} has no {:?}", step.at_ms, step.view, step.target)
                    })?;
                    let button = step.button.into();
                    let kind = match step.action {
                        StepAction::Down => PointerEventKind::Down(button),
                        StepAction::Up => PointerEventKind::Up(button),
                        _ => PointerEventKind::Click(button),
                    };
                    Event::Input(InputEvent::Pointer(PointerEvent::at(
                        kind,
                        target,
                        0.0,
                        step.offset_y,
                        base + at,
                    )))
                }
            };
            script.push(ScriptedEvent { at, event });
        }
        Ok(Self { ws, views, script })
    }
}

fn resolve_target(ws: &Workspace, view: ViewId, target: TargetDef) -> Option<ElementId> {
    let role = match target {
        TargetDef::Content => ElementRole::Content,
        TargetDef::Scroller => ElementRole::Scroller,
    };
    ws.find_in_view(view, role)
}

/// Replays a resolved timeline, then requests shutdown.
pub struct ScriptEventSource {
    script: Vec<ScriptedEvent>,
    start: tokio::time::Instant,
}

impl ScriptEventSource {
    pub fn new(script: Vec<ScriptedEvent>, start: Instant) -> Self {
        Self {
            script,
            start: tokio::time::Instant::from_std(start),
        }
    }
}

impl AsyncEventSource for ScriptEventSource {
    fn name(&self) -> &'static str {
        "script"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let Self { script, start } = *self;
        tokio::spawn(async move {
            for step in script {
                tokio::time::sleep_until(start + step.at).await;
                if tx.send(step.event).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(Event::Shutdown).await;
        })
    }
}
