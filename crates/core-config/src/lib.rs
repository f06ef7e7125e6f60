//! Configuration loading and parsing.
//!
//! Reads `revlens.toml` (or an override path provided by the binary). Every
//! section and field is optional; missing files and parse errors fall back to
//! defaults so a broken config never prevents startup. Unknown fields are
//! ignored to allow forward evolution.
//!
//! Values that feed loop sizing (batch size, tick-driven intervals) are clamped
//! in `Config::effective_*` accessors; the raw parsed values are retained.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const FILE_NAME: &str = "revlens.toml";

const MAX_BATCH_SIZE: usize = 1000;
const MIN_FLASH_TTL_MS: u64 = 250;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RevisionsConfig {
    /// Stream the graph in batches instead of one blocking load.
    pub log_batching: bool,
    pub batch_size: usize,
    /// Row limit for single-shot loads; 0 means unlimited.
    pub limit: usize,
    /// Empty means the backend's own default revset.
    pub default_revset: String,
}

impl Default for RevisionsConfig {
    fn default() -> Self {
        Self {
            log_batching: true,
            batch_size: 50,
            limit: 0,
            default_revset: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub flash_ttl_ms: u64,
    /// 0 disables operation-log polling.
    pub auto_refresh_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            flash_ttl_ms: 4000,
            auto_refresh_secs: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct JjConfig {
    pub binary: PathBuf,
}

impl Default for JjConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("jj"),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    pub revisions: RevisionsConfig,
    pub ui: UiConfig,
    pub jj: JjConfig,
    /// Action name to bindings; replaces the defaults for that action.
    pub keys: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Best-effort config path: working directory first, then the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("revlens").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_not_found_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                path: Some(path),
                file,
            })
        }
        Err(err) => {
            warn!(target: "config", path = %path.display(), error = %err, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Batch size clamped to `1..=MAX_BATCH_SIZE`.
    pub fn effective_batch_size(&self) -> usize {
        let raw = self.file.revisions.batch_size;
        let clamped = raw.clamp(1, MAX_BATCH_SIZE);
        if clamped != raw {
            info!(target: "config", raw, clamped, "batch_size_clamped");
        }
        clamped
    }

    pub fn flash_ttl(&self) -> Duration {
        Duration::from_millis(self.file.ui.flash_ttl_ms.max(MIN_FLASH_TTL_MS))
    }

    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        match self.file.ui.auto_refresh_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
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
        assert!(cfg.file.revisions.log_batching);
        assert_eq!(cfg.file.revisions.batch_size, 50);
        assert_eq!(cfg.file.jj.binary, PathBuf::from("jj"));
        assert!(cfg.auto_refresh_interval().is_none());
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let tmp = write_config(
            "[revisions]\nlog_batching = false\nlimit = 200\ndefault_revset = \"::@\"\n\
             [ui]\nauto_refresh_secs = 5\n\
             [jj]\nbinary = \"/opt/jj\"\n\
             [keys]\ndown = [\"ctrl+n\"]\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.file.revisions.log_batching);
        assert_eq!(cfg.file.revisions.limit, 200);
        assert_eq!(cfg.file.revisions.batch_size, 50);
        assert_eq!(cfg.file.revisions.default_revset, "::@");
        assert_eq!(cfg.auto_refresh_interval(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.file.ui.flash_ttl_ms, 4000);
        assert_eq!(cfg.file.jj.binary, PathBuf::from("/opt/jj"));
        assert_eq!(cfg.file.keys["down"], vec!["ctrl+n".to_string()]);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = write_config("[revisions\nbatch_size = ");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn batch_size_and_flash_ttl_are_clamped() {
        let tmp = write_config("[revisions]\nbatch_size = 0\n[ui]\nflash_ttl_ms = 10\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.effective_batch_size(), 1);
        assert_eq!(cfg.flash_ttl(), Duration::from_millis(MIN_FLASH_TTL_MS));
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let tmp = write_config("[revisions]\nbatch_size = 5000\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let effective = with_default(subscriber, || cfg.effective_batch_size());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("batch_size_clamped"));
        assert_eq!(effective, MAX_BATCH_SIZE);
    }
}
