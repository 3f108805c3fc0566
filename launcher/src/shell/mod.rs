//! Home screen core - the state the touch handler and menus act on
//!
//! Components:
//! - Panels (all apps / widgets) and their motion
//! - Long press menus (main menu, item menu)
//! - Grid item model and the grid host seam
//! - App list enumeration, default slot seeding

pub mod app_grid;
pub mod apps;
pub mod defaults;
pub mod menu;
pub mod panels;
pub mod primitives;

#[cfg(test)]
pub(crate) mod testing;

use tracing::{debug, info};

use crate::config::LauncherConfig;
use crate::input::{FlingGuard, GestureConfig, GestureRecognizer, TouchSession};
use crate::refresh::RefreshOutcome;
use crate::system::{NotificationShade, Platform, SystemChrome};
use app_grid::GridHost;
use apps::AppLauncher;
use menu::{OpenMenu, PopupHost};
use panels::{PanelKind, Panels};

/// Everything outside the core that the home screen talks to
pub struct Collaborators {
    pub grid: Box<dyn GridHost>,
    pub popups: Box<dyn PopupHost>,
    pub platform: Box<dyn Platform>,
    pub chrome: Box<dyn SystemChrome>,
    /// Only present where the platform can pull down a notification shade
    pub shade: Option<Box<dyn NotificationShade>>,
}

/// Home screen state - one per launcher surface
pub struct HomeScreen {
    pub config: LauncherConfig,
    pub panels: Panels,
    pub(crate) session: TouchSession,
    pub(crate) recognizer: GestureRecognizer,
    pub(crate) fling_guard: FlingGuard,
    pub(crate) open_menu: Option<OpenMenu>,
    pub(crate) grid: Box<dyn GridHost>,
    pub(crate) popups: Box<dyn PopupHost>,
    pub(crate) platform: Box<dyn Platform>,
    pub(crate) shade: Option<Box<dyn NotificationShade>>,
    /// Last known app list, replaced by background refreshes
    launchers: Vec<AppLauncher>,
    /// Set when something (an uninstall) invalidated the app list
    refresh_requested: bool,
}

impl HomeScreen {
    pub fn new(config: LauncherConfig, collaborators: Collaborators) -> Self {
        let fling_guard = FlingGuard::new(config.gesture.fling_suppression());
        let recognizer = GestureRecognizer::new(GestureConfig::from(&config.gesture), fling_guard.clone());
        let panels = Panels::new(config.screen_height, config.panel_animation(), collaborators.chrome);

        info!(
            screen_height = config.screen_height,
            shade = collaborators.shade.is_some(),
            "Home screen ready"
        );

        Self {
            config,
            panels,
            session: TouchSession::default(),
            recognizer,
            fling_guard,
            open_menu: None,
            grid: collaborators.grid,
            popups: collaborators.popups,
            platform: collaborators.platform,
            shade: collaborators.shade,
            launchers: Vec::new(),
            refresh_requested: false,
        }
    }

    pub fn session(&self) -> &TouchSession {
        &self.session
    }

    pub fn fling_guard(&self) -> &FlingGuard {
        &self.fling_guard
    }

    pub fn launchers(&self) -> &[AppLauncher] {
        &self.launchers
    }

    /// Seed the list from storage before the first refresh lands
    pub fn set_cached_launchers(&mut self, launchers: Vec<AppLauncher>) {
        if self.launchers.is_empty() {
            self.launchers = launchers;
        }
    }

    /// Hide whichever panel is up. Returns false if there was nothing to hide.
    pub fn on_back_pressed(&mut self) -> bool {
        if self.panels.is_expanded(PanelKind::AllApps) {
            self.panels.hide(PanelKind::AllApps);
            true
        } else if self.panels.is_expanded(PanelKind::Widgets) {
            self.panels.hide(PanelKind::Widgets);
            true
        } else {
            false
        }
    }

    /// The platform reported the uninstall flow finished
    pub fn on_uninstall_result(&mut self) {
        info!("Uninstall finished, app list needs a refresh");
        self.refresh_requested = true;
    }

    /// Consume a pending refresh request
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// Apply a background refresh, on the loop thread
    pub fn apply_refresh(&mut self, outcome: RefreshOutcome) {
        info!(
            apps = outcome.launchers.len(),
            removed = outcome.removed_packages.len(),
            seeded = outcome.seeded_defaults,
            "App list refreshed"
        );

        if outcome.grid_changed() {
            debug!("Grid placements changed, reloading grid");
            self.grid.reload_grid();
        }
        self.launchers = outcome.launchers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::primitives::rgb;
    use crate::shell::testing::{harness, Call};

    fn app(package: &str) -> AppLauncher {
        AppLauncher {
            title: package.to_uppercase(),
            package: package.to_string(),
            placeholder_color: rgb(10, 20, 30),
            icon: None,
        }
    }

    fn packages(home: &HomeScreen) -> Vec<&str> {
        home.launchers().iter().map(|l| l.package.as_str()).collect()
    }

    #[test]
    fn test_refresh_with_removed_packages_reloads_grid() {
        let (mut home, calls) = harness();
        home.set_cached_launchers(vec![app("notes"), app("maps")]);

        home.apply_refresh(RefreshOutcome {
            launchers: vec![app("maps")],
            removed_packages: vec!["notes".into()],
            seeded_defaults: false,
        });
        assert!(calls.contains(&Call::ReloadGrid));
        assert_eq!(packages(&home), vec!["maps"]);
    }

    #[test]
    fn test_unchanged_refresh_keeps_grid() {
        let (mut home, calls) = harness();
        home.set_cached_launchers(vec![app("maps")]);

        home.apply_refresh(RefreshOutcome {
            launchers: vec![app("maps"), app("camera")],
            ..RefreshOutcome::default()
        });
        assert!(!calls.contains(&Call::ReloadGrid));
        assert_eq!(packages(&home), vec!["maps", "camera"]);
    }
}
