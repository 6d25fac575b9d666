//! Click-below scenario runner.
//!
//! Replays a scripted session against an in-memory workspace with the
//! click-below plugin loaded, then prints every view's resulting text and any
//! notices the plugin raised.
use anyhow::Result;
use clap::Parser;
use core_config::load_from;
use core_events::{
    EVENT_CHANNEL_CAP, Event, EventSourceRegistry, InputEvent, PointerEvent, TickEventSource,
    ViewEvent, ViewId,
};
use core_model::Workspace;
use core_plugin::{ClickBelow, PluginHost, Settings, StaticPluginHost};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod scenario;

use scenario::{ScenarioFile, ScriptEventSource, Session};

/// Deadline resolution for caret restoration and gesture expiry.
const TICK_INTERVAL: Duration = Duration::from_millis(20);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "click-below", version, about = "Replay a click-below scenario")]
struct Args {
    /// Scenario file (TOML) describing views and timed steps.
    pub scenario: PathBuf,
    /// Optional configuration file path (overrides discovery of `click-below.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("click-below.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "click-below.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Serial consumer of the event channel. Owns the workspace and the plugins.
struct ScenarioRuntime {
    ws: Workspace,
    plugins: StaticPluginHost,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ScenarioRuntime {
    async fn run(&mut self) -> Result<()> {
        self.plugins.load_all(&mut self.ws)?;

        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        let mut handled = 0usize;
        while let Some(event) = self.rx.recv().await {
            match &event {
                Event::Input(InputEvent::Pointer(ev)) => self.handle_pointer(ev),
                Event::View(ViewEvent::ActiveChanged(view)) => {
                    let notification = self.ws.activate(*view);
                    self.forward(notification, *view);
                }
                Event::View(ViewEvent::Closed(view)) => {
                    let notification = self.ws.close_view(*view);
                    self.forward(notification, *view);
                }
                Event::Tick(_) => self.plugins.dispatch(&event, &mut self.ws),
                Event::Shutdown => {
                    info!(target: "runtime", handled, "shutdown_requested");
                    break;
                }
            }
            handled += 1;
        }

        self.plugins.unload_all(&mut self.ws);
        self.rx.close();
        self.finalize_shutdown().await;
        Ok(())
    }

    fn handle_pointer(&mut self, ev: &PointerEvent) {
        match self.ws.route_pointer(ev.target, ev.kind) {
            Some(surface) => self.plugins.dispatch_pointer(surface, ev, &mut self.ws),
            None => trace!(target: "runtime", target_el = %ev.target, "pointer_unrouted"),
        }
    }

    fn forward(&mut self, notification: Option<Event>, view: ViewId) {
        match notification {
            Some(ev) => self.plugins.dispatch(&ev, &mut self.ws),
            None => warn!(target: "runtime", view = view.0, "view_request_ignored"),
        }
    }

    async fn finalize_shutdown(&mut self) {
        drop(self.tx.take());
        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(target: "runtime.shutdown", "event_source_task_stopped"),
                Ok(Err(err)) if err.is_cancelled() => {
                    trace!(target: "runtime.shutdown", "event_source_task_cancelled")
                }
                Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "event_source_task_error"),
                Err(_) => warn!(target: "runtime.shutdown", "event_source_task_timeout"),
            }
        }
    }
}

/// Replay `file` with `settings`, returning the final workspace and the
/// scenario's view names.
async fn run_scenario(
    file: &ScenarioFile,
    settings: Settings,
) -> Result<(Workspace, Vec<(String, ViewId)>)> {
    let start = Instant::now();
    let Session { ws, views, script } = Session::build(file, start)?;
    debug!(target: "runtime", views = views.len(), steps = script.len(), "scenario_built");

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut registry = EventSourceRegistry::new();
    registry.register(TickEventSource::new(TICK_INTERVAL));
    registry.register(ScriptEventSource::new(script, start));
    let source_handles = registry.spawn_all(&tx);

    let mut runtime = ScenarioRuntime {
        ws,
        plugins: StaticPluginHost::new().with_plugin(ClickBelow::new(settings)),
        rx,
        tx: Some(tx),
        source_handles,
    };
    runtime.run().await?;
    Ok((runtime.ws, views))
}

fn write_report(
    out: &mut impl Write,
    ws: &Workspace,
    views: &[(String, ViewId)],
) -> std::io::Result<()> {
    for (name, id) in views {
        writeln!(out, "== {name} ==")?;
        match ws.text_view(*id) {
            Some(view) => writeln!(out, "{}", view.buffer.text())?,
            None if ws.view_kind(*id).is_some() => writeln!(out, "(not a text view)")?,
            None => writeln!(out, "(closed)")?,
        }
    }
    if !ws.notices().is_empty() {
        writeln!(out, "-- notices --")?;
        for notice in ws.notices() {
            writeln!(out, "{notice}")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let settings = Settings::from_config(&config);
    info!(
        target: "runtime.startup",
        config_override = args.config.is_some(),
        mode = ?settings.mode,
        strategy = ?settings.strategy,
        long_press_ms = settings.long_press.as_millis() as u64,
        "bootstrap_complete"
    );

    let file = scenario::load(&args.scenario)?;
    let (ws, views) = run_scenario(&file, settings).await?;
    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), &ws, &views)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::{AppendStrategy, GestureMode};

    async fn replay(src: &str, settings: Settings) -> String {
        let file = scenario::parse(src).unwrap();
        let (ws, views) = run_scenario(&file, settings).await.unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &ws, &views).unwrap();
        String::from_utf8(out).unwrap()
    }

    const QUICK_CLICK: &str = r#"
        [[view]]
        name = "notes"
        text = "hello"

        [[step]]
        at_ms = 0
        action = "down"
        view = "notes"
        offset_y = 64.0

        [[step]]
        at_ms = 40
        action = "up"
        view = "notes"
        offset_y = 64.0
    "#;

    #[tokio::test]
    async fn quick_click_below_appends_two_lines() {
        let out = replay(QUICK_CLICK, Settings::default()).await;
        assert_eq!(out, "== notes ==\nhello\n\n\n");
    }

    #[tokio::test]
    async fn long_press_leaves_document_unchanged() {
        let src = QUICK_CLICK.replace("at_ms = 40", "at_ms = 560");
        let out = replay(&src, Settings::default()).await;
        assert_eq!(out, "== notes ==\nhello\n");
    }

    #[tokio::test]
    async fn click_mode_uses_click_events() {
        let src = r#"
            [[view]]
            name = "notes"
            text = "hello\n"

            [[step]]
            action = "click"
            view = "notes"
            offset_y = 58.0
        "#;
        let settings = Settings {
            mode: GestureMode::Click,
            strategy: AppendStrategy::Commands,
            ..Settings::default()
        };
        let out = replay(src, settings).await;
        assert_eq!(out, "== notes ==\nhello\n\n\n");
    }

    #[tokio::test]
    async fn closed_and_non_text_views_are_listed() {
        let src = r#"
            [[view]]
            name = "notes"
            text = "hello"

            [[view]]
            name = "graph"
            kind = "other"

            [[step]]
            at_ms = 0
            action = "activate"
            view = "graph"

            [[step]]
            at_ms = 10
            action = "close"
            view = "notes"
        "#;
        let out = replay(src, Settings::default()).await;
        assert_eq!(
            out,
            "== notes ==\n(closed)\n== graph ==\n(not a text view)\n"
        );
    }

    #[test]
    fn report_lists_notices() {
        let mut ws = Workspace::new();
        ws.notice("click-below: cannot locate the content root");
        let mut out = Vec::new();
        write_report(&mut out, &ws, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-- notices --\nclick-below: cannot locate the content root\n"
        );
    }
}
