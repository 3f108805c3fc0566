//! Headless mode - logging collaborators and touch trace replay
//!
//! Lets the home screen core run without a display: the grid is laid out from
//! stored placements, popups, app launches and chrome changes are logged, and
//! touches come from a recorded JSON trace.

use std::cell::Cell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::input::{TouchEvent, TouchPhase};
use crate::shell::app_grid::{AppGridLayout, GridHost, GridItem};
use crate::shell::menu::{MenuAction, MenuRequest, PopupHost};
use crate::shell::primitives::{Color, Point};
use crate::storage::LauncherStore;
use crate::system::{NotificationShade, Platform, SystemChrome};

/// Package id the launcher reports for itself
pub const OWN_PACKAGE: &str = "flick-launcher";

/// Flat icon for the launcher's own settings entry
pub fn launcher_icon() -> RgbaImage {
    RgbaImage::from_pixel(48, 48, Rgba([0x4a, 0x90, 0xd9, 0xff]))
}

/// One recorded touch sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub phase: TouchPhase,
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the start of the trace
    pub t_ms: u64,
}

impl TraceEvent {
    pub fn to_touch(&self, start: Instant) -> TouchEvent {
        TouchEvent::new(self.phase, self.x, self.y, start + Duration::from_millis(self.t_ms))
    }
}

/// Load a JSON array of trace events, sorted by time
pub fn load_trace(path: &Path) -> Result<Vec<TraceEvent>> {
    let contents = fs::read_to_string(path)?;
    let mut events: Vec<TraceEvent> = serde_json::from_str(&contents)?;
    events.sort_by_key(|e| e.t_ms);
    info!("Loaded {} trace events from {:?}", events.len(), path);
    Ok(events)
}

/// Feeds trace events to the loop as their time comes
pub struct TraceReplay {
    events: VecDeque<TraceEvent>,
    start: Instant,
}

impl TraceReplay {
    pub fn new(events: Vec<TraceEvent>, start: Instant) -> Self {
        Self {
            events: events.into(),
            start,
        }
    }

    /// Events due at `now`, stamped with their recorded time
    pub fn due(&mut self, now: Instant) -> Vec<TouchEvent> {
        let mut due = Vec::new();
        while let Some(event) = self.events.front() {
            let touch = event.to_touch(self.start);
            if touch.time > now {
                break;
            }
            due.push(touch);
            self.events.pop_front();
        }
        due
    }

    pub fn is_finished(&self) -> bool {
        self.events.is_empty()
    }
}

/// Grid host laid out from stored placements
pub struct HeadlessGrid {
    layout: AppGridLayout,
    store: Arc<Mutex<dyn LauncherStore>>,
    items: Vec<GridItem>,
    dragging: Option<(GridItem, Point)>,
}

impl HeadlessGrid {
    pub fn new(layout: AppGridLayout, store: Arc<Mutex<dyn LauncherStore>>) -> Self {
        let mut grid = Self {
            layout,
            store,
            items: Vec::new(),
            dragging: None,
        };
        grid.reload_grid();
        grid
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }
}

impl GridHost for HeadlessGrid {
    fn hit_test(&self, x: f64, y: f64) -> Option<GridItem> {
        self.layout.item_at(&self.items, x, y).cloned()
    }

    fn item_dragging_started(&mut self, item: &GridItem) {
        info!(package = %item.package, "Grid drag started");
        self.dragging = Some((item.clone(), Point::default()));
    }

    fn dragged_item_moved(&mut self, x: f64, y: f64) {
        if let Some((_, position)) = self.dragging.as_mut() {
            *position = Point::new(x, y);
        }
    }

    fn item_dragging_stopped(&mut self) {
        if let Some((item, position)) = self.dragging.take() {
            info!(package = %item.package, x = position.x, y = position.y, "Grid drag dropped");
        }
    }

    fn remove_item(&mut self, id: u64) {
        info!(id, "Removing grid item");
        self.items.retain(|i| i.id != Some(id));
    }

    fn reload_grid(&mut self) {
        let loaded = match self.store.lock() {
            Ok(store) => store.load_grid_items(),
            Err(poisoned) => poisoned.into_inner().load_grid_items(),
        };
        match loaded {
            Ok(items) => {
                debug!("Grid has {} items", items.len());
                self.items = items;
            }
            Err(e) => warn!("Failed to load grid items: {}", e),
        }
    }
}

/// Popup host that only logs
#[derive(Default)]
pub struct LoggingPopups;

impl PopupHost for LoggingPopups {
    fn show(&mut self, anchor: Point, request: &MenuRequest, actions: &[MenuAction]) {
        let labels: Vec<_> = actions.iter().map(|a| a.label()).collect();
        let owner = request.item().map(|i| i.package.as_str()).unwrap_or("home");
        info!(x = anchor.x, y = anchor.y, owner, "Menu: {}", labels.join(" | "));
    }

    fn dismiss(&mut self) {
        info!("Menu dismissed");
    }
}

/// Platform that logs and completes uninstalls immediately
#[derive(Default)]
pub struct LoggingPlatform {
    uninstalls_done: Rc<Cell<u32>>,
}

impl LoggingPlatform {
    /// Counter the loop drains to report uninstall completion
    pub fn uninstall_counter(&self) -> Rc<Cell<u32>> {
        self.uninstalls_done.clone()
    }
}

impl Platform for LoggingPlatform {
    fn launch_app(&mut self, package: &str) {
        info!(package, "Launch");
    }

    fn open_app_info(&mut self, package: &str) {
        info!(package, "App info");
    }

    fn uninstall_app(&mut self, package: &str) {
        info!(package, "Uninstall");
        self.uninstalls_done.set(self.uninstalls_done.get() + 1);
    }

    fn perform_haptic_feedback(&mut self) {
        debug!("Haptic tick");
    }
}

#[derive(Default)]
pub struct LoggingChrome;

impl SystemChrome for LoggingChrome {
    fn set_navigation_tint(&mut self, color: Color) {
        debug!(?color, "Navigation tint");
    }
}

#[derive(Default)]
pub struct LoggingShade;

impl NotificationShade for LoggingShade {
    fn expand(&mut self) -> Result<()> {
        info!("Notification shade expanded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::app_grid::ROW_COUNT;
    use crate::storage::JsonStore;

    #[test]
    fn test_trace_parses_and_replays_in_order() {
        let json = r#"[
            {"phase": "up", "x": 10.0, "y": 400.0, "t_ms": 120},
            {"phase": "down", "x": 10.0, "y": 900.0, "t_ms": 0},
            {"phase": "move", "x": 10.0, "y": 600.0, "t_ms": 60}
        ]"#;
        let path = std::env::temp_dir().join(format!("flick-launcher-trace-{}.json", std::process::id()));
        fs::write(&path, json).unwrap();
        let events = load_trace(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(events.iter().map(|e| e.phase).collect::<Vec<_>>(), vec![TouchPhase::Down, TouchPhase::Move, TouchPhase::Up]);

        let start = Instant::now();
        let mut replay = TraceReplay::new(events, start);
        assert_eq!(replay.due(start).len(), 1);
        assert!(replay.due(start + Duration::from_millis(59)).is_empty());
        let rest = replay.due(start + Duration::from_millis(500));
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[1].time, start + Duration::from_millis(120));
        assert!(replay.is_finished());
    }

    #[test]
    fn test_headless_grid_hit_tests_stored_items() {
        let dir = std::env::temp_dir().join(format!("flick-launcher-demo-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let mut store = JsonStore::open(&dir).unwrap();
        store
            .persist_grid_items(&[GridItem::icon(0, ROW_COUNT - 1, "org.example.dialer", "Phone")])
            .unwrap();

        let store: Arc<Mutex<dyn LauncherStore>> = Arc::new(Mutex::new(store));
        let mut grid = HeadlessGrid::new(AppGridLayout::new(1032.0, 1920.0), store);
        assert_eq!(grid.items().len(), 1);
        // Bottom row, first column
        let hit = grid.hit_test(100.0, 1700.0).map(|i| i.package);
        assert_eq!(hit.as_deref(), Some("org.example.dialer"));

        grid.remove_item(1);
        assert!(grid.hit_test(100.0, 1700.0).is_none());
        grid.reload_grid();
        assert_eq!(grid.items().len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }
}
