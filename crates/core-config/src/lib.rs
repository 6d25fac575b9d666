//! Configuration loading and parsing.
//!
//! Parses `click-below.toml` (or an override path provided by the binary).
//! Every field has a default, so a missing file, a missing section or a file
//! that fails to parse all yield a usable configuration. Unknown fields are
//! ignored (TOML deserialization tolerance) to allow forward evolution.
//!
//! Raw values are kept as parsed; the `effective_*` accessors and
//! [`Config::normalize`] clamp them into their valid ranges.

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_LONG_PRESS_MS: u64 = 500;
pub const DEFAULT_CARET_RESTORE_MS: u64 = 100;
pub const DEFAULT_LINE_HEIGHT_PX: f64 = 24.0;

/// How pointer input is turned into an append decision.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GestureMode {
    /// Decide on press, confirm on the matching release within the long-press window.
    #[default]
    PressRelease,
    /// Decide and commit on the click event alone.
    Click,
}

/// How appended lines are written into the buffer.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AppendStrategy {
    /// Write the line breaks as trailing content and place the cursor explicitly.
    #[default]
    Direct,
    /// Issue go-to-end + newline-and-indent editor commands.
    Commands,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GestureConfig {
    #[serde(default)]
    pub mode: GestureMode,
    #[serde(default = "GestureConfig::default_long_press_ms")]
    pub long_press_ms: u64,
    #[serde(default = "GestureConfig::default_caret_restore_ms")]
    pub caret_restore_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            mode: GestureMode::default(),
            long_press_ms: Self::default_long_press_ms(),
            caret_restore_ms: Self::default_caret_restore_ms(),
        }
    }
}

impl GestureConfig {
    const fn default_long_press_ms() -> u64 {
        DEFAULT_LONG_PRESS_MS
    }
    const fn default_caret_restore_ms() -> u64 {
        DEFAULT_CARET_RESTORE_MS
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    #[serde(default = "PolicyConfig::default_fallback_line_height")]
    pub fallback_line_height: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            fallback_line_height: Self::default_fallback_line_height(),
        }
    }
}

impl PolicyConfig {
    const fn default_fallback_line_height() -> f64 {
        DEFAULT_LINE_HEIGHT_PX
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppendConfig {
    #[serde(default)]
    pub strategy: AppendStrategy,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub append: AppendConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("click-below.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("click-below").join("click-below.toml");
    }
    PathBuf::from("click-below.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                file,
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.effective_long_press_ms())
    }

    pub fn caret_restore(&self) -> Duration {
        Duration::from_millis(self.effective_caret_restore_ms())
    }

    pub fn effective_long_press_ms(&self) -> u64 {
        self.file.gesture.long_press_ms.max(1)
    }

    pub fn effective_caret_restore_ms(&self) -> u64 {
        self.file.gesture.caret_restore_ms.max(1)
    }

    /// Fallback line height in pixels; non-finite or non-positive values use the default.
    pub fn effective_fallback_line_height(&self) -> f64 {
        let v = self.file.policy.fallback_line_height;
        if v.is_finite() && v > 0.0 {
            v
        } else {
            DEFAULT_LINE_HEIGHT_PX
        }
    }

    pub fn gesture_mode(&self) -> GestureMode {
        self.file.gesture.mode
    }

    pub fn append_strategy(&self) -> AppendStrategy {
        self.file.append.strategy
    }

    /// Clamp raw values in place, logging each adjustment. Returns the number
    /// of fields changed.
    pub fn normalize(&mut self) -> usize {
        let mut changed = 0;
        let long_press = self.effective_long_press_ms();
        if long_press != self.file.gesture.long_press_ms {
            info!(
                target: "config",
                raw = self.file.gesture.long_press_ms,
                clamped = long_press,
                "gesture_long_press_clamped"
            );
            self.file.gesture.long_press_ms = long_press;
            changed += 1;
        }
        let restore = self.effective_caret_restore_ms();
        if restore != self.file.gesture.caret_restore_ms {
            info!(
                target: "config",
                raw = self.file.gesture.caret_restore_ms,
                clamped = restore,
                "gesture_caret_restore_clamped"
            );
            self.file.gesture.caret_restore_ms = restore;
            changed += 1;
        }
        let line_height = self.effective_fallback_line_height();
        if line_height != self.file.policy.fallback_line_height {
            info!(
                target: "config",
                raw = self.file.policy.fallback_line_height,
                clamped = line_height,
                "policy_fallback_line_height_clamped"
            );
            self.file.policy.fallback_line_height = line_height;
            changed += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.gesture_mode(), GestureMode::PressRelease);
        assert_eq!(cfg.append_strategy(), AppendStrategy::Direct);
        assert_eq!(cfg.long_press(), Duration::from_millis(500));
        assert_eq!(cfg.caret_restore(), Duration::from_millis(100));
        assert_eq!(cfg.effective_fallback_line_height(), 24.0);
    }

    #[test]
    fn parses_all_sections() {
        let tmp = write_config(
            "[gesture]\nmode = \"click\"\nlong_press_ms = 750\ncaret_restore_ms = 40\n\
             [policy]\nfallback_line_height = 18.5\n\
             [append]\nstrategy = \"commands\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.gesture_mode(), GestureMode::Click);
        assert_eq!(cfg.effective_long_press_ms(), 750);
        assert_eq!(cfg.effective_caret_restore_ms(), 40);
        assert_eq!(cfg.effective_fallback_line_height(), 18.5);
        assert_eq!(cfg.append_strategy(), AppendStrategy::Commands);
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let tmp = write_config("[gesture]\nmode = \"press-release\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.effective_long_press_ms(), DEFAULT_LONG_PRESS_MS);
        assert_eq!(cfg.effective_caret_restore_ms(), DEFAULT_CARET_RESTORE_MS);
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let tmp = write_config("[gesture]\nmode = \"hover\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.gesture_mode(), GestureMode::PressRelease);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tmp = write_config("[gesture]\nlong_press_ms = 300\nflavor = \"x\"\n[extra]\ny = 1\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.effective_long_press_ms(), 300);
    }

    #[test]
    fn zero_durations_and_bad_line_height_are_clamped() {
        let tmp = write_config(
            "[gesture]\nlong_press_ms = 0\ncaret_restore_ms = 0\n[policy]\nfallback_line_height = -3.0\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.gesture.long_press_ms, 1);
        assert_eq!(cfg.file.gesture.caret_restore_ms, 1);
        assert_eq!(cfg.file.policy.fallback_line_height, DEFAULT_LINE_HEIGHT_PX);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let mut cfg = Config::default();
        cfg.file.gesture.long_press_ms = 0;
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let changed = with_default(subscriber, || cfg.normalize());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert_eq!(changed, 1);
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("gesture_long_press_clamped"));
        assert_eq!(cfg.file.gesture.long_press_ms, 1);
    }
}
