//! Long press menus
//!
//! Two variants: the main menu for a press on empty space, and the item menu
//! for a press on an icon or widget (on the home grid or in the all-apps list).
//! The popup collaborator only presents them. It reports a picked action via
//! [`HomeScreen::on_menu_action`] and a tap-away via
//! [`HomeScreen::on_menu_dismissed`].

use tracing::{info, warn};

use super::app_grid::{GridItem, GridItemKind};
use super::panels::PanelKind;
use super::primitives::Point;
use super::HomeScreen;

/// Where the long-pressed item lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOrigin {
    /// Placed on the home grid
    HomeScreen,
    /// A row of the all-apps list, which is not a placement surface
    AllAppsList,
}

/// What the menu was opened for
#[derive(Debug, Clone, PartialEq)]
pub enum MenuRequest {
    Main,
    Item { item: GridItem, origin: MenuOrigin },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenWidgets,
    AppInfo,
    Remove,
    Uninstall,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::OpenWidgets => "Widgets",
            MenuAction::AppInfo => "App info",
            MenuAction::Remove => "Remove",
            MenuAction::Uninstall => "Uninstall",
        }
    }
}

impl MenuRequest {
    /// Actions offered, in display order
    pub fn actions(&self) -> Vec<MenuAction> {
        match self {
            MenuRequest::Main => vec![MenuAction::OpenWidgets],
            MenuRequest::Item { item, origin } => {
                let mut actions = vec![MenuAction::AppInfo];
                if *origin == MenuOrigin::HomeScreen {
                    actions.push(MenuAction::Remove);
                }
                if item.kind == GridItemKind::Icon {
                    actions.push(MenuAction::Uninstall);
                }
                actions
            }
        }
    }

    pub fn item(&self) -> Option<&GridItem> {
        match self {
            MenuRequest::Main => None,
            MenuRequest::Item { item, .. } => Some(item),
        }
    }
}

/// The popup-menu collaborator
pub trait PopupHost {
    fn show(&mut self, anchor: Point, request: &MenuRequest, actions: &[MenuAction]);

    fn dismiss(&mut self);
}

/// Menu currently on screen
#[derive(Debug, Clone)]
pub(crate) struct OpenMenu {
    pub request: MenuRequest,
    pub anchor: Point,
}

impl HomeScreen {
    /// Menu currently on screen, if any
    pub fn open_menu(&self) -> Option<&MenuRequest> {
        self.open_menu.as_ref().map(|m| &m.request)
    }

    pub fn open_menu_anchor(&self) -> Option<Point> {
        self.open_menu.as_ref().map(|m| m.anchor)
    }

    /// Show the icon/widget menu and remember the item as long-pressed, so
    /// moving the finger turns the press into a drag
    pub fn open_item_menu(&mut self, anchor: Point, item: GridItem, origin: MenuOrigin) {
        // Widgets are tall, anchor at the finger instead of above it
        let anchor = if item.kind == GridItemKind::Widget {
            anchor.offset_y(self.config.home_anchor_offset)
        } else {
            anchor
        };

        info!(package = %item.package, ?origin, "Opening item menu");
        self.session.long_pressed_item = Some(item.clone());
        self.show_menu(anchor, MenuRequest::Item { item, origin });
    }

    /// Show the empty-area menu
    pub fn open_main_menu(&mut self, anchor: Point) {
        info!("Opening main menu");
        self.show_menu(anchor, MenuRequest::Main);
    }

    fn show_menu(&mut self, anchor: Point, request: MenuRequest) {
        if self.open_menu.is_some() {
            self.dismiss_menu();
        }

        let actions = request.actions();
        self.popups.show(anchor, &request, &actions);
        self.open_menu = Some(OpenMenu { request, anchor });
    }

    /// A long press on a row of the all-apps list
    pub fn all_apps_item_long_pressed(&mut self, x: f64, y: f64, item: GridItem) {
        let anchor = Point::new(x, y - self.config.icon_anchor_offset);
        // Set after opening: replacing a menu clears the flag
        self.open_item_menu(anchor, item, MenuOrigin::AllAppsList);
        self.panels.all_apps.ignore_touches = true;
    }

    /// The user picked an action from the open menu
    pub fn on_menu_action(&mut self, action: MenuAction) {
        let Some(open) = self.open_menu.take() else {
            warn!(?action, "Menu action with no menu open");
            return;
        };

        let handled = match (&open.request, action) {
            (MenuRequest::Main, MenuAction::OpenWidgets) => {
                self.panels.show(PanelKind::Widgets);
                true
            }
            (MenuRequest::Item { item, .. }, MenuAction::AppInfo) => {
                self.platform.open_app_info(&item.package);
                true
            }
            (MenuRequest::Item { item, origin: MenuOrigin::HomeScreen }, MenuAction::Remove) => {
                match item.id {
                    Some(id) => self.grid.remove_item(id),
                    None => warn!(package = %item.package, "Cannot remove an unsaved grid item"),
                }
                true
            }
            (MenuRequest::Item { item, .. }, MenuAction::Uninstall) if item.kind == GridItemKind::Icon => {
                info!(package = %item.package, "Starting uninstall");
                self.platform.uninstall_app(&item.package);
                true
            }
            _ => false,
        };

        if !handled {
            warn!(?action, request = ?open.request, "Action not offered by this menu");
            self.open_menu = Some(open);
            return;
        }

        self.panels.all_apps.ignore_touches = false;
    }

    /// The menu went away, by selection or tap-away
    pub fn on_menu_dismissed(&mut self) {
        self.open_menu = None;
        self.panels.all_apps.ignore_touches = false;
    }

    /// Take the open menu down from our side
    pub(crate) fn dismiss_menu(&mut self) {
        if self.open_menu.is_some() {
            self.popups.dismiss();
        }
        self.on_menu_dismissed();
    }
}
