//! App list refresh
//!
//! Re-enumerates launchable apps, drops records of uninstalled packages and,
//! on the very first run, seeds the default bottom-row icons. Runs on a worker
//! thread; the result is handed back to the event loop over a calloop channel
//! and applied with [`HomeScreen::apply_refresh`](crate::HomeScreen::apply_refresh).

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use calloop::channel::Sender;
use tracing::{info, warn};

use crate::error::Result;
use crate::shell::apps::{list_launchable_apps, AppLauncher, AppSource};
use crate::shell::defaults::{seed_default_grid_items, DefaultApps};
use crate::storage::LauncherStore;

/// What a refresh found
#[derive(Debug, Clone, Default)]
pub struct RefreshOutcome {
    /// The new app list
    pub launchers: Vec<AppLauncher>,
    /// Packages that were cached but are gone now
    pub removed_packages: Vec<String>,
    /// Default icons were placed on this run
    pub seeded_defaults: bool,
}

impl RefreshOutcome {
    /// Stored grid placements changed, the grid must re-read them
    pub fn grid_changed(&self) -> bool {
        !self.removed_packages.is_empty() || self.seeded_defaults
    }
}

/// Run one refresh against the store
pub fn refresh_launchers(
    source: &dyn AppSource,
    defaults: &dyn DefaultApps,
    store: &mut dyn LauncherStore,
    cached: &[AppLauncher],
    settings_label: &str,
) -> Result<RefreshOutcome> {
    let launchers = list_launchable_apps(source, settings_label)?;
    store.persist_launchers(&launchers)?;

    let mut removed_packages = Vec::new();
    for old in cached {
        if launchers.iter().any(|l| l.package == old.package) {
            continue;
        }
        info!(package = %old.package, "App no longer installed");
        store.delete_launcher(&old.package)?;
        store.delete_grid_items_by_package(&old.package)?;
        removed_packages.push(old.package.clone());
    }

    let mut seeded_defaults = false;
    if !store.home_screen_initialized()? {
        let items = seed_default_grid_items(defaults, &launchers);
        info!("First run, seeding {} default icons", items.len());
        store.persist_grid_items(&items)?;
        store.set_home_screen_initialized(true)?;
        seeded_defaults = true;
    }

    Ok(RefreshOutcome {
        launchers,
        removed_packages,
        seeded_defaults,
    })
}

/// Inputs for a background refresh
pub struct RefreshJob {
    pub cached: Vec<AppLauncher>,
    pub settings_label: String,
    pub store: Arc<Mutex<dyn LauncherStore>>,
}

/// Run a refresh on a worker thread
///
/// `connect` builds the app source and default-app registry on the worker,
/// so a slow directory scan never blocks the loop. The result, success or
/// not, is sent back to the loop.
pub fn spawn_refresh<F>(job: RefreshJob, connect: F, sender: Sender<Result<RefreshOutcome>>) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() -> (Box<dyn AppSource>, Box<dyn DefaultApps>) + Send + 'static,
{
    std::thread::Builder::new()
        .name("launcher-refresh".into())
        .spawn(move || {
            let (source, defaults) = connect();
            let mut store = job.store.lock().unwrap_or_else(|poisoned| {
                warn!("Launcher store lock was poisoned, continuing");
                poisoned.into_inner()
            });

            let outcome = refresh_launchers(
                source.as_ref(),
                defaults.as_ref(),
                &mut *store,
                &job.cached,
                &job.settings_label,
            );
            drop(store);

            if sender.send(outcome).is_err() {
                warn!("Event loop gone, dropping refresh result");
            }
        })
}
