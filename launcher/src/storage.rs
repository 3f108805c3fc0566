//! Persistent launcher state
//!
//! Cached app list, grid placements and the "home screen initialized" flag.
//! [`JsonStore`] keeps each in its own JSON file under the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::shell::app_grid::GridItem;
use crate::shell::apps::AppLauncher;

/// Storage collaborator
pub trait LauncherStore: Send {
    fn load_cached_launchers(&self) -> Result<Vec<AppLauncher>>;

    /// Insert or replace by package
    fn persist_launchers(&mut self, launchers: &[AppLauncher]) -> Result<()>;

    fn delete_launcher(&mut self, package: &str) -> Result<()>;

    fn load_grid_items(&self) -> Result<Vec<GridItem>>;

    /// Insert or replace by id. Items without an id get a fresh one.
    fn persist_grid_items(&mut self, items: &[GridItem]) -> Result<()>;

    fn delete_grid_items_by_package(&mut self, package: &str) -> Result<()>;

    fn home_screen_initialized(&self) -> Result<bool>;

    fn set_home_screen_initialized(&mut self, initialized: bool) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    home_screen_initialized: bool,
}

/// [`LauncherStore`] backed by pretty-printed JSON files
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("Launcher data in {:?}", dir);
        Ok(Self { dir })
    }

    fn launchers_path(&self) -> PathBuf {
        self.dir.join("launchers.json")
    }

    fn grid_items_path(&self) -> PathBuf {
        self.dir.join("grid_items.json")
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join("state.json")
    }
}

/// Missing file reads as the default value
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    debug!("Wrote {:?}", path);
    Ok(())
}

impl LauncherStore for JsonStore {
    fn load_cached_launchers(&self) -> Result<Vec<AppLauncher>> {
        read_json(&self.launchers_path())
    }

    fn persist_launchers(&mut self, launchers: &[AppLauncher]) -> Result<()> {
        let mut stored: Vec<AppLauncher> = read_json(&self.launchers_path())?;
        for launcher in launchers {
            match stored.iter_mut().find(|l| l.package == launcher.package) {
                Some(existing) => *existing = launcher.clone(),
                None => stored.push(launcher.clone()),
            }
        }
        write_json(&self.launchers_path(), &stored)
    }

    fn delete_launcher(&mut self, package: &str) -> Result<()> {
        let mut stored: Vec<AppLauncher> = read_json(&self.launchers_path())?;
        stored.retain(|l| l.package != package);
        write_json(&self.launchers_path(), &stored)
    }

    fn load_grid_items(&self) -> Result<Vec<GridItem>> {
        read_json(&self.grid_items_path())
    }

    fn persist_grid_items(&mut self, items: &[GridItem]) -> Result<()> {
        let mut stored: Vec<GridItem> = read_json(&self.grid_items_path())?;
        let mut next_id = stored.iter().filter_map(|i| i.id).max().map_or(1, |max| max + 1);

        for item in items {
            let mut item = item.clone();
            match item.id.and_then(|id| stored.iter_mut().find(|s| s.id == Some(id))) {
                Some(existing) => *existing = item,
                None => {
                    if item.id.is_none() {
                        item.id = Some(next_id);
                        next_id += 1;
                    }
                    stored.push(item);
                }
            }
        }
        write_json(&self.grid_items_path(), &stored)
    }

    fn delete_grid_items_by_package(&mut self, package: &str) -> Result<()> {
        let mut stored: Vec<GridItem> = read_json(&self.grid_items_path())?;
        stored.retain(|i| i.package != package);
        write_json(&self.grid_items_path(), &stored)
    }

    fn home_screen_initialized(&self) -> Result<bool> {
        let state: StoreState = read_json(&self.state_path())?;
        Ok(state.home_screen_initialized)
    }

    fn set_home_screen_initialized(&mut self, initialized: bool) -> Result<()> {
        write_json(
            &self.state_path(),
            &StoreState {
                home_screen_initialized: initialized,
            },
        )
    }
}
