//! Flick launcher - headless home screen runner
//!
//! Loads the launcher config and stored state, refreshes the app list in the
//! background and replays a recorded touch trace against the home screen
//! core, logging everything the collaborators are asked to do.

use std::path::PathBuf;
use std::rc::Rc;
use std::cell::Cell;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use calloop::channel::{channel, Event, Sender};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flick_launcher::demo::{
    launcher_icon, load_trace, HeadlessGrid, LoggingChrome, LoggingPlatform, LoggingPopups, LoggingShade,
    TraceReplay, OWN_PACKAGE,
};
use flick_launcher::refresh::{spawn_refresh, RefreshJob, RefreshOutcome};
use flick_launcher::shell::app_grid::AppGridLayout;
use flick_launcher::shell::apps::{AppSource, DesktopAppSource};
use flick_launcher::shell::defaults::{DefaultApps, MimeAppsDefaults};
use flick_launcher::storage::{JsonStore, LauncherStore};
use flick_launcher::{Collaborators, HomeScreen, LauncherConfig};

/// Frame tick
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "flick-launcher")]
#[command(about = "Flick home screen core, run headless against a touch trace", long_about = None)]
struct Args {
    /// Launcher config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON touch trace to replay
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long)]
    debug: bool,
}

/// State owned by the event loop
struct Launcher {
    home: HomeScreen,
    replay: Option<TraceReplay>,
    store: Arc<Mutex<dyn LauncherStore>>,
    refresh_sender: Sender<flick_launcher::Result<RefreshOutcome>>,
    refresh_in_flight: bool,
    uninstalls_done: Rc<Cell<u32>>,
    signal: LoopSignal,
}

impl Launcher {
    fn start_refresh(&mut self) {
        if self.refresh_in_flight {
            return;
        }

        let job = RefreshJob {
            cached: self.home.launchers().to_vec(),
            settings_label: "Launcher Settings".into(),
            store: self.store.clone(),
        };
        match spawn_refresh(job, connect_platform, self.refresh_sender.clone()) {
            Ok(_) => self.refresh_in_flight = true,
            Err(e) => warn!("Failed to start refresh thread: {}", e),
        }
    }

    fn frame(&mut self, now: Instant) {
        if let Some(replay) = self.replay.as_mut() {
            for event in replay.due(now) {
                self.home.on_touch(&event);
            }
        }

        if self.uninstalls_done.replace(0) > 0 {
            self.home.on_uninstall_result();
        }
        if self.home.take_refresh_request() {
            self.start_refresh();
        }

        let animating = self.home.on_frame(now);
        let replay_done = self.replay.as_ref().map_or(true, |r| r.is_finished());
        let idle = !animating && self.home.long_press_deadline().is_none();
        if replay_done && idle && !self.refresh_in_flight {
            info!("Nothing left to do, exiting");
            self.signal.stop();
        }
    }
}

/// Built on the refresh worker: scanning desktop files can be slow
fn connect_platform() -> (Box<dyn AppSource>, Box<dyn DefaultApps>) {
    let source = DesktopAppSource::scan_system(OWN_PACKAGE).with_own_icon(launcher_icon());
    let installed = source.launcher_activities().into_iter().map(|a| a.package).collect();
    let defaults = match MimeAppsDefaults::user_file() {
        Some(path) => MimeAppsDefaults::load(&path, installed),
        None => MimeAppsDefaults::default(),
    };
    (Box::new(source), Box::new(defaults))
}

fn default_config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|_| PathBuf::from("/etc"))
        .join("flick/launcher.toml")
}

fn main() -> Result<()> {
    // Set up panic hook to log panics before crashing
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Ok(home) = std::env::var("HOME") {
            let crash_log = format!("{}/.local/state/flick/launcher-crash.log", home);
            if let Ok(mut f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                use std::io::Write;
                let _ = writeln!(f, "[{}] PANIC: {}", chrono::Local::now(), panic_info);
            }
        }
    }));

    // Set up log directory (~/.local/state/flick or /tmp/flick)
    let log_dir = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local/state")))
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join("flick");

    std::fs::create_dir_all(&log_dir).ok();

    let args = Args::parse();

    // File appender - rotates daily
    let file_appender = rolling::daily(&log_dir, "launcher.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - quiet by default, verbose with --debug
    let default_filter = if args.debug {
        "debug,flick_launcher=debug"
    } else {
        "warn,flick_launcher=info"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!(log_path = %log_dir.display(), "Flick launcher starting");

    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = LauncherConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {:?}", config_path))?;

    let store = JsonStore::open(config.data_dir()).context("Failed to open launcher data directory")?;
    let cached = store.load_cached_launchers().unwrap_or_else(|e| {
        warn!("Ignoring unreadable launcher cache: {}", e);
        Vec::new()
    });
    let store: Arc<Mutex<dyn LauncherStore>> = Arc::new(Mutex::new(store));

    let replay = match &args.trace {
        Some(path) => {
            let events = load_trace(path).with_context(|| format!("Failed to load trace {:?}", path))?;
            Some(TraceReplay::new(events, Instant::now()))
        }
        None => None,
    };

    let platform = LoggingPlatform::default();
    let uninstalls_done = platform.uninstall_counter();
    let layout = AppGridLayout::new(config.screen_width, config.screen_height);
    let collaborators = Collaborators {
        grid: Box::new(HeadlessGrid::new(layout, store.clone())),
        popups: Box::new(LoggingPopups),
        platform: Box::new(platform),
        chrome: Box::new(LoggingChrome),
        shade: Some(Box::new(LoggingShade)),
    };
    let mut home = HomeScreen::new(config, collaborators);
    home.set_cached_launchers(cached);

    let mut event_loop: EventLoop<Launcher> = EventLoop::try_new()?;
    let loop_handle = event_loop.handle();

    // Background refresh results come back here
    let (refresh_sender, refresh_channel) = channel();
    loop_handle
        .insert_source(refresh_channel, |event, _, launcher: &mut Launcher| {
            if let Event::Msg(result) = event {
                launcher.refresh_in_flight = false;
                match result {
                    Ok(outcome) => launcher.home.apply_refresh(outcome),
                    // Keep showing the cached list
                    Err(e) => warn!("App list refresh failed: {}", e),
                }
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert refresh channel: {:?}", e))?;

    // Frame timer (60fps target)
    loop_handle
        .insert_source(Timer::immediate(), |_, _, launcher: &mut Launcher| {
            launcher.frame(Instant::now());
            TimeoutAction::ToDuration(FRAME)
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert frame timer: {:?}", e))?;

    let mut launcher = Launcher {
        home,
        replay,
        store,
        refresh_sender,
        refresh_in_flight: false,
        uninstalls_done,
        signal: event_loop.get_signal(),
    };
    launcher.start_refresh();

    info!("Entering event loop");
    event_loop
        .run(Some(FRAME), &mut launcher, |_| {})
        .map_err(|e| anyhow::anyhow!("Event loop error: {:?}", e))?;

    info!(apps = launcher.home.launchers().len(), "Flick launcher stopped");
    Ok(())
}
