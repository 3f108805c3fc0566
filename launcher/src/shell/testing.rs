//! Recording collaborators for unit tests

use std::cell::RefCell;
use std::rc::Rc;

use super::app_grid::{GridHost, GridItem};
use super::menu::{MenuAction, MenuRequest, PopupHost};
use super::primitives::{Color, Point, Rect};
use super::{Collaborators, HomeScreen};
use crate::config::LauncherConfig;
use crate::error::{LauncherError, Result};
use crate::system::{NotificationShade, Platform, SystemChrome};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DragStarted(String),
    DragMoved(f64, f64),
    DragStopped,
    RemoveItem(u64),
    ReloadGrid,
    ShowMenu(Point, Vec<MenuAction>),
    DismissMenu,
    Launch(String),
    AppInfo(String),
    Uninstall(String),
    Haptic,
    Tint(Color),
    ExpandShade,
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn contains(&self, call: &Call) -> bool {
        self.0.borrow().contains(call)
    }

    pub fn iter(&self) -> std::vec::IntoIter<Call> {
        self.0.borrow().clone().into_iter()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

struct MockGrid {
    log: CallLog,
    items: Vec<(Rect, GridItem)>,
}

impl GridHost for MockGrid {
    fn hit_test(&self, x: f64, y: f64) -> Option<GridItem> {
        self.items
            .iter()
            .find(|(rect, _)| rect.contains(x, y))
            .map(|(_, item)| item.clone())
    }

    fn item_dragging_started(&mut self, item: &GridItem) {
        self.log.push(Call::DragStarted(item.package.clone()));
    }

    fn dragged_item_moved(&mut self, x: f64, y: f64) {
        self.log.push(Call::DragMoved(x, y));
    }

    fn item_dragging_stopped(&mut self) {
        self.log.push(Call::DragStopped);
    }

    fn remove_item(&mut self, id: u64) {
        self.log.push(Call::RemoveItem(id));
    }

    fn reload_grid(&mut self) {
        self.log.push(Call::ReloadGrid);
    }
}

struct MockPopups(CallLog);

impl PopupHost for MockPopups {
    fn show(&mut self, anchor: Point, _request: &MenuRequest, actions: &[MenuAction]) {
        self.0.push(Call::ShowMenu(anchor, actions.to_vec()));
    }

    fn dismiss(&mut self) {
        self.0.push(Call::DismissMenu);
    }
}

struct MockPlatform(CallLog);

impl Platform for MockPlatform {
    fn launch_app(&mut self, package: &str) {
        self.0.push(Call::Launch(package.to_string()));
    }

    fn open_app_info(&mut self, package: &str) {
        self.0.push(Call::AppInfo(package.to_string()));
    }

    fn uninstall_app(&mut self, package: &str) {
        self.0.push(Call::Uninstall(package.to_string()));
    }

    fn perform_haptic_feedback(&mut self) {
        self.0.push(Call::Haptic);
    }
}

struct MockChrome(CallLog);

impl SystemChrome for MockChrome {
    fn set_navigation_tint(&mut self, color: Color) {
        self.0.push(Call::Tint(color));
    }
}

/// How the injected notification shade behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Works,
    Fails,
    Unsupported,
}

struct MockShade {
    log: CallLog,
    mode: Shade,
}

impl NotificationShade for MockShade {
    fn is_supported(&self) -> bool {
        self.mode != Shade::Unsupported
    }

    fn expand(&mut self) -> Result<()> {
        self.log.push(Call::ExpandShade);
        match self.mode {
            Shade::Works => Ok(()),
            _ => Err(LauncherError::Unsupported("expandNotificationsPanel".into())),
        }
    }
}

pub fn harness() -> (HomeScreen, CallLog) {
    harness_with(Vec::new(), Some(Shade::Works))
}

/// Home screen on a 2000px tall screen with the given hit-test targets
pub fn harness_with(items: Vec<(Rect, GridItem)>, shade: Option<Shade>) -> (HomeScreen, CallLog) {
    let log = CallLog::default();
    let collaborators = Collaborators {
        grid: Box::new(MockGrid { log: log.clone(), items }),
        popups: Box::new(MockPopups(log.clone())),
        platform: Box::new(MockPlatform(log.clone())),
        chrome: Box::new(MockChrome(log.clone())),
        shade: shade.map(|mode| Box::new(MockShade { log: log.clone(), mode }) as Box<dyn NotificationShade>),
    };
    let config = LauncherConfig {
        screen_height: 2000.0,
        ..LauncherConfig::default()
    };
    (HomeScreen::new(config, collaborators), log)
}
