//! First-run home screen seeding
//!
//! On the very first refresh the bottom grid row gets the user's default
//! dialer, SMS app, browser, an app store and camera, in that column order.
//! A slot is left empty when the default is unknown or not in the app list.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::app_grid::{GridItem, ROW_COUNT};
use super::apps::AppLauncher;

/// App stores in order of preference
pub const STORE_PACKAGES: [&str; 3] = ["com.android.vending", "org.fdroid.fdroid", "com.aurora.store"];

/// Where the platform keeps its default app choices
pub trait DefaultApps {
    fn default_dialer(&self) -> Option<String>;
    fn default_sms(&self) -> Option<String>;
    fn default_browser(&self) -> Option<String>;
    fn default_camera(&self) -> Option<String>;
    fn is_installed(&self, package: &str) -> bool;
}

/// Grid items for the bottom row, with no ids assigned yet
pub fn seed_default_grid_items(registry: &dyn DefaultApps, launchers: &[AppLauncher]) -> Vec<GridItem> {
    let listed = |package: &str| launchers.iter().find(|l| l.package == package);

    let store = STORE_PACKAGES
        .iter()
        .copied()
        .find(|&p| registry.is_installed(p) && listed(p).is_some())
        .map(String::from);

    let slots = [
        registry.default_dialer(),
        registry.default_sms(),
        registry.default_browser(),
        store,
        registry.default_camera(),
    ];

    let row = ROW_COUNT - 1;
    slots
        .into_iter()
        .zip(0u32..)
        .filter_map(|(package, column)| {
            let launcher = listed(package.as_deref()?)?;
            debug!(package = %launcher.package, column, "Seeding default slot");
            Some(GridItem::icon(column, row, &launcher.package, &launcher.title))
        })
        .collect()
}

/// [`DefaultApps`] read from the freedesktop `mimeapps.list`
///
/// Defaults map to desktop file ids, which double as package ids on Linux.
#[derive(Debug, Clone, Default)]
pub struct MimeAppsDefaults {
    defaults: Vec<(String, String)>,
    installed: Vec<String>,
}

impl MimeAppsDefaults {
    /// Read `~/.config/mimeapps.list`, missing file means no defaults
    pub fn load(path: &Path, installed: Vec<String>) -> Self {
        let content = fs::read_to_string(path).unwrap_or_default();
        Self::parse(&content, installed)
    }

    pub fn user_file() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok()
            .map(|dir| dir.join("mimeapps.list"))
    }

    fn parse(content: &str, installed: Vec<String>) -> Self {
        let mut defaults = Vec::new();
        let mut in_defaults = false;

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                in_defaults = line == "[Default Applications]";
                continue;
            }
            if !in_defaults {
                continue;
            }
            if let Some((mime, apps)) = line.split_once('=') {
                if let Some(first) = apps.split(';').find(|a| !a.is_empty()) {
                    let id = first.trim().trim_end_matches(".desktop");
                    defaults.push((mime.trim().to_string(), id.to_string()));
                }
            }
        }

        Self { defaults, installed }
    }

    fn handler_for(&self, mime: &str) -> Option<String> {
        self.defaults
            .iter()
            .find(|(m, _)| m == mime)
            .map(|(_, id)| id.clone())
    }
}

impl DefaultApps for MimeAppsDefaults {
    fn default_dialer(&self) -> Option<String> {
        self.handler_for("x-scheme-handler/tel")
    }

    fn default_sms(&self) -> Option<String> {
        self.handler_for("x-scheme-handler/sms")
    }

    fn default_browser(&self) -> Option<String> {
        self.handler_for("x-scheme-handler/http")
            .or_else(|| self.handler_for("text/html"))
    }

    fn default_camera(&self) -> Option<String> {
        self.handler_for("x-scheme-handler/camera")
    }

    fn is_installed(&self, package: &str) -> bool {
        self.installed.iter().any(|p| p == package)
    }
}
