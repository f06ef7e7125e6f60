use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use clap::Parser;
use core_config::{Config, load_from};
use core_events::{EVENT_CHANNEL_CAP, Event, EventSourceRegistry, TickEventSource};
use core_graph::JjGraphSource;
use core_jj::{ProcessRunner, RepoRoot, repo_root};
use core_keymap::KeyMap;
use core_revisions::{Backend, RevisionsModel, Settings};
use core_terminal::{CrosstermBackend, TerminalBackend};
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod app;
mod chrome;
mod clipboard;
mod executor;
mod runtime;

use app::{App, AppSettings};
use executor::Executor;
use runtime::{Channels, InputHandles, Runtime};

const LOG_FILE: &str = "revlens.log";
const TICK_INTERVAL_MS: u64 = 250;
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "revlens", version, about = "Browse and rewrite jj revisions")]
struct Args {
    /// Directory inside the repository; defaults to the working directory.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `revlens.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Initial revset; empty uses the backend default.
    #[arg(short = 'r', long = "revset")]
    pub revset: Option<String>,
}

/// Everything resolved before the terminal is taken over, so failures still
/// print to a normal screen.
struct Bootstrap {
    config: Config,
    repo: RepoRoot,
    revset: String,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::default(),
            log_guard: None,
        }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
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

    fn bootstrap(args: &Args) -> Result<Bootstrap> {
        let config = load_from(args.config.clone())?;
        let dir = match &args.path {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("cannot read working directory")?,
        };
        let repo = repo_root(&config.file.jj.binary, &dir)
            .with_context(|| format!("cannot open repository at {}", dir.display()))?;
        let revset = args
            .revset
            .clone()
            .unwrap_or_else(|| config.file.revisions.default_revset.clone());
        info!(
            target: "runtime.startup",
            root = %repo.path.display(),
            stripped_env = repo.stripped_env,
            revset = revset.as_str(),
            config_override = args.config.is_some(),
            "bootstrap_complete"
        );
        Ok(Bootstrap { config, repo, revset })
    }
}

fn build_model(
    boot: &Bootstrap,
    runner: Arc<ProcessRunner>,
    clipboard: Arc<dyn core_revisions::Clipboard>,
) -> RevisionsModel {
    let source = JjGraphSource::new(boot.repo.runner.clone())
        .with_batch_size(boot.config.effective_batch_size());
    let backend = Backend {
        runner,
        source: Arc::new(source),
        clipboard,
    };
    let settings = Settings {
        log_batching: boot.config.file.revisions.log_batching,
        limit: boot.config.file.revisions.limit,
    };
    let keymap = KeyMap::default().with_overrides(&boot.config.file.keys);
    RevisionsModel::new(backend, settings, keymap, boot.revset.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let boot = AppStartup::bootstrap(&args)?;
    let runner = Arc::new(boot.repo.runner.clone());
    let model = build_model(&boot, Arc::clone(&runner), clipboard::open_clipboard());
    let settings = AppSettings {
        flash_ttl: boot.config.flash_ttl(),
        auto_refresh: boot.config.auto_refresh_interval(),
    };

    startup.backend.set_title("revlens")?;
    let size = startup.backend.size().unwrap_or(FALLBACK_SIZE);
    let guard = startup.backend.enter_guard()?;

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());
    let mut registry = EventSourceRegistry::new();
    registry.register(TickEventSource::new(std::time::Duration::from_millis(
        TICK_INTERVAL_MS,
    )));
    let source_handles = registry.spawn_all(&tx);

    let app = App::new(model, Executor::new(runner, msg_tx), settings, size);
    let mut runtime = Runtime::new(
        app,
        Channels { tx, rx, msg_rx },
        InputHandles {
            input_task,
            input_shutdown,
            source_handles,
        },
        guard,
    );
    runtime.run().await
}
