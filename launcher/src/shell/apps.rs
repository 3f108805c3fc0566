//! Launchable app enumeration and desktop file parsing
//!
//! The platform reports launcher activities through an [`AppSource`]. The
//! list shown in the all-apps panel is built by [`list_launchable_apps`]. On
//! Linux the source is the set of installed `.desktop` files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::primitives::{rgb, Color};
use crate::error::{LauncherError, Result};

/// microG registers a launcher activity but is not an app users open
pub const MICROG_PACKAGE: &str = "com.google.android.gms";

/// One entry of the all-apps list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppLauncher {
    pub title: String,
    pub package: String,
    /// Average icon color, drawn while the icon loads
    pub placeholder_color: Color,
    #[serde(skip)]
    pub icon: Option<Arc<RgbaImage>>,
}

/// A launcher activity as reported by the platform
#[derive(Debug, Clone)]
pub struct LauncherActivity {
    pub label: String,
    pub package: String,
}

/// Platform app enumeration
pub trait AppSource {
    /// Package id of the launcher itself
    fn own_package(&self) -> String;

    fn launcher_activities(&self) -> Vec<LauncherActivity>;

    /// Resolved icon, None if the package has none
    fn icon_for(&self, package: &str) -> Option<RgbaImage>;
}

/// Build the all-apps list
///
/// Skips the launcher's own package, microG and anything without an icon,
/// then appends a settings entry for the launcher itself. The result has one
/// entry per package.
pub fn list_launchable_apps(source: &dyn AppSource, settings_label: &str) -> Result<Vec<AppLauncher>> {
    let own_package = source.own_package();
    let mut apps = Vec::new();

    for activity in source.launcher_activities() {
        if activity.package == own_package || activity.package == MICROG_PACKAGE {
            continue;
        }

        let Some(icon) = source.icon_for(&activity.package) else {
            tracing::debug!("Skipping {}: no icon", activity.package);
            continue;
        };

        apps.push(AppLauncher {
            title: activity.label,
            package: activity.package,
            placeholder_color: average_color(&icon),
            icon: Some(Arc::new(icon)),
        });
    }

    let own_icon = source
        .icon_for(&own_package)
        .ok_or_else(|| LauncherError::MissingOwnIcon(own_package.clone()))?;
    apps.push(AppLauncher {
        title: settings_label.to_string(),
        package: own_package,
        placeholder_color: average_color(&own_icon),
        icon: Some(Arc::new(own_icon)),
    });

    let mut seen = HashSet::new();
    apps.retain(|app| seen.insert(app.package.clone()));
    Ok(apps)
}

/// Mean of the RGB channels over all pixels, fully opaque
pub fn average_color(image: &RgbaImage) -> Color {
    let n = image.width() as u64 * image.height() as u64;
    if n == 0 {
        return rgb(0, 0, 0);
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for pixel in image.pixels() {
        r += pixel[0] as u64;
        g += pixel[1] as u64;
        b += pixel[2] as u64;
    }
    rgb((r / n) as u8, (g / n) as u8, (b / n) as u8)
}

/// Decode an icon file
pub fn load_icon(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| LauncherError::Icon {
            path: path.display().to_string(),
            source,
        })
}

/// Get the real user's home directory
/// When running as root via sudo, this returns the original user's home
fn real_user_home() -> PathBuf {
    if let Ok(user) = std::env::var("SUDO_USER") {
        if !user.is_empty() && user != "root" {
            let home = PathBuf::from(format!("/home/{}", user));
            if home.exists() {
                return home;
            }
        }
    }

    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
}

/// A parsed desktop entry (.desktop file)
#[derive(Debug, Clone)]
pub struct DesktopEntry {
    /// Application name
    pub name: String,
    /// Exec command, field codes stripped
    pub exec: String,
    /// Icon name or absolute path
    pub icon: Option<String>,
    /// Path to the .desktop file
    pub path: PathBuf,
    pub no_display: bool,
}

impl DesktopEntry {
    /// Parse a .desktop file
    pub fn parse(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Self::parse_str(&content, path)
    }

    fn parse_str(content: &str, path: &Path) -> Option<Self> {
        let mut name = None;
        let mut exec = None;
        let mut icon = None;
        let mut no_display = false;
        let mut in_desktop_entry = false;

        for line in content.lines() {
            let line = line.trim();

            if line.starts_with('[') {
                in_desktop_entry = line == "[Desktop Entry]";
                continue;
            }

            if !in_desktop_entry {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "Name" => name = Some(value.trim().to_string()),
                    "Exec" => {
                        // Remove field codes like %u, %f, %U, %F
                        let clean_exec = value
                            .replace("%u", "")
                            .replace("%U", "")
                            .replace("%f", "")
                            .replace("%F", "")
                            .replace("%%", "%")
                            .trim()
                            .to_string();
                        exec = Some(clean_exec);
                    }
                    "Icon" => icon = Some(value.trim().to_string()),
                    "NoDisplay" => no_display = value.trim().eq_ignore_ascii_case("true"),
                    _ => {}
                }
            }
        }

        Some(Self {
            name: name?,
            exec: exec?,
            icon,
            path: path.to_path_buf(),
            no_display,
        })
    }

    /// Package id: the desktop file id without its extension
    pub fn package(&self) -> Option<String> {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    }
}

/// [`AppSource`] backed by installed `.desktop` files
pub struct DesktopAppSource {
    own_package: String,
    own_icon: Option<RgbaImage>,
    entries: Vec<DesktopEntry>,
    icon_dirs: Vec<PathBuf>,
}

impl DesktopAppSource {
    /// Scan the standard application directories
    pub fn scan_system(own_package: &str) -> Self {
        let home = real_user_home();
        let app_dirs = [
            PathBuf::from("/usr/share/applications"),
            PathBuf::from("/usr/local/share/applications"),
            home.join(".local/share/applications"),
        ];
        let icon_dirs = vec![
            PathBuf::from("/usr/share/pixmaps"),
            PathBuf::from("/usr/share/icons/hicolor/128x128/apps"),
            PathBuf::from("/usr/share/icons/hicolor/64x64/apps"),
            PathBuf::from("/usr/share/icons/hicolor/48x48/apps"),
            home.join(".local/share/icons/hicolor/128x128/apps"),
        ];
        Self::scan(own_package, &app_dirs, icon_dirs)
    }

    /// Scan the given directories, first entry per package wins
    pub fn scan(own_package: &str, app_dirs: &[PathBuf], icon_dirs: Vec<PathBuf>) -> Self {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for dir in app_dirs {
            let Ok(dir_entries) = fs::read_dir(dir) else {
                continue;
            };

            let mut paths: Vec<PathBuf> = dir_entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|e| e == "desktop").unwrap_or(false))
                .collect();
            paths.sort();

            for path in paths {
                let Some(desktop) = DesktopEntry::parse(&path) else {
                    continue;
                };
                if desktop.exec.is_empty() || desktop.no_display {
                    continue;
                }
                if let Some(package) = desktop.package() {
                    if seen.insert(package) {
                        entries.push(desktop);
                    }
                }
            }
        }

        tracing::info!("Scanned {} desktop entries", entries.len());
        Self {
            own_package: own_package.to_string(),
            own_icon: None,
            entries,
            icon_dirs,
        }
    }

    /// Icon used for the launcher's own settings entry
    pub fn with_own_icon(mut self, icon: RgbaImage) -> Self {
        self.own_icon = Some(icon);
        self
    }

    fn entry(&self, package: &str) -> Option<&DesktopEntry> {
        self.entries
            .iter()
            .find(|e| e.package().as_deref() == Some(package))
    }

    fn resolve_icon_path(&self, icon: &str) -> Option<PathBuf> {
        let path = Path::new(icon);
        if path.is_absolute() {
            return path.exists().then(|| path.to_path_buf());
        }

        self.icon_dirs
            .iter()
            .map(|dir| dir.join(format!("{}.png", icon)))
            .find(|candidate| candidate.exists())
    }
}

impl AppSource for DesktopAppSource {
    fn own_package(&self) -> String {
        self.own_package.clone()
    }

    fn launcher_activities(&self) -> Vec<LauncherActivity> {
        self.entries
            .iter()
            .filter_map(|e| {
                Some(LauncherActivity {
                    label: e.name.clone(),
                    package: e.package()?,
                })
            })
            .collect()
    }

    fn icon_for(&self, package: &str) -> Option<RgbaImage> {
        if package == self.own_package {
            if let Some(icon) = &self.own_icon {
                return Some(icon.clone());
            }
        }

        let icon_name = self.entry(package)?.icon.as_deref()?;
        let path = self.resolve_icon_path(icon_name)?;
        match load_icon(&path) {
            Ok(icon) => Some(icon),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::collections::HashMap;

    struct FakeSource {
        own: &'static str,
        activities: Vec<(&'static str, &'static str)>,
        icons: HashMap<&'static str, RgbaImage>,
    }

    impl AppSource for FakeSource {
        fn own_package(&self) -> String {
            self.own.to_string()
        }

        fn launcher_activities(&self) -> Vec<LauncherActivity> {
            self.activities
                .iter()
                .map(|(label, package)| LauncherActivity {
                    label: label.to_string(),
                    package: package.to_string(),
                })
                .collect()
        }

        fn icon_for(&self, package: &str) -> Option<RgbaImage> {
            self.icons.get(package).cloned()
        }
    }

    fn solid(r: u8, g: u8, b: u8) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba([r, g, b, 255]))
    }

    fn source() -> FakeSource {
        let mut icons = HashMap::new();
        for package in ["org.example.maps", "org.example.mail", "org.flick.launcher", MICROG_PACKAGE] {
            icons.insert(package, solid(10, 20, 30));
        }
        FakeSource {
            own: "org.flick.launcher",
            activities: vec![
                ("Maps", "org.example.maps"),
                ("microG", MICROG_PACKAGE),
                ("Launcher", "org.flick.launcher"),
                ("No Icon", "org.example.blank"),
                ("Mail", "org.example.mail"),
                ("Mail (compose)", "org.example.mail"),
            ],
            icons,
        }
    }

    #[test]
    fn test_list_filters_and_appends_settings() {
        let apps = list_launchable_apps(&source(), "Launcher Settings").unwrap();
        let packages: Vec<_> = apps.iter().map(|a| a.package.as_str()).collect();
        assert_eq!(packages, vec!["org.example.maps", "org.example.mail", "org.flick.launcher"]);
        assert_eq!(apps[1].title, "Mail");
        assert_eq!(apps[2].title, "Launcher Settings");
        assert!(apps.iter().all(|a| a.icon.is_some()));
    }

    #[test]
    fn test_missing_own_icon_is_an_error() {
        let mut source = source();
        source.icons.remove("org.flick.launcher");
        match list_launchable_apps(&source, "Launcher Settings") {
            Err(LauncherError::MissingOwnIcon(package)) => assert_eq!(package, "org.flick.launcher"),
            other => panic!("expected MissingOwnIcon, got {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn test_average_color() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([200, 0, 100, 255]));
        img.put_pixel(1, 0, Rgba([0, 100, 0, 0]));
        assert_eq!(average_color(&img), rgb(100, 50, 50));
        assert_eq!(average_color(&RgbaImage::new(0, 0)), rgb(0, 0, 0));
    }

    #[test]
    fn test_parse_desktop_entry() {
        let content = "[Desktop Entry]\nName=Files\nExec=nautilus %U\nIcon=org.gnome.Nautilus\n\n[Desktop Action new]\nName=New Window\nExec=nautilus --new-window\n";
        let entry = DesktopEntry::parse_str(content, Path::new("/usr/share/applications/org.gnome.Nautilus.desktop")).unwrap();
        assert_eq!(entry.name, "Files");
        assert_eq!(entry.exec, "nautilus");
        assert_eq!(entry.icon.as_deref(), Some("org.gnome.Nautilus"));
        assert_eq!(entry.package().as_deref(), Some("org.gnome.Nautilus"));
        assert!(!entry.no_display);

        assert!(DesktopEntry::parse_str("[Desktop Entry]\nName=Broken\n", Path::new("x.desktop")).is_none());
    }

    #[test]
    fn test_desktop_source_scans_directory() {
        let dir = std::env::temp_dir().join(format!("flick-launcher-apps-{}", std::process::id()));
        let apps = dir.join("applications");
        let icons = dir.join("icons");
        fs::create_dir_all(&apps).unwrap();
        fs::create_dir_all(&icons).unwrap();

        fs::write(apps.join("org.example.term.desktop"), "[Desktop Entry]\nName=Terminal\nExec=term\nIcon=term\n").unwrap();
        fs::write(apps.join("hidden.desktop"), "[Desktop Entry]\nName=Hidden\nExec=hidden\nNoDisplay=true\n").unwrap();
        solid(0, 0, 255).save(icons.join("term.png")).unwrap();

        let source = DesktopAppSource::scan("flick-launcher", &[apps], vec![icons])
            .with_own_icon(solid(255, 0, 0));
        assert_eq!(source.entries.len(), 1);
        assert_eq!(source.entry("org.example.term").map(|e| e.exec.as_str()), Some("term"));

        let list = list_launchable_apps(&source, "Launcher Settings").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].placeholder_color, rgb(0, 0, 255));
        assert_eq!(list[1].package, "flick-launcher");

        let _ = fs::remove_dir_all(&dir);
    }
}
