//! Home screen touch state machine
//!
//! Every raw touch event lands in [`HomeScreen::on_touch`]. The event goes to
//! the gesture recognizer first (tap, long press, fling), then the raw vertical
//! displacement drives panel offsets, or the grid drag once a long-pressed item
//! starts moving.
//!
//! States:
//! - Idle: no finger down
//! - TrackingPanelDrag: finger down, vertical motion moves one panel 1:1
//! - TrackingItemDrag: a long-pressed item is being dragged over the grid

use std::time::Instant;

use tracing::{debug, info};

use super::gestures::{FlingDirection, GestureEvent};
use super::touch::{TouchEvent, TouchPhase};
use crate::shell::app_grid::GridItem;
use crate::shell::menu::{MenuOrigin, MenuRequest};
use crate::shell::panels::PanelKind;
use crate::shell::primitives::Point;
use crate::shell::HomeScreen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchState {
    #[default]
    Idle,
    TrackingPanelDrag,
    TrackingItemDrag,
}

/// Per-touch state, reset at DOWN and cleared at UP/CANCEL
#[derive(Debug, Clone, Default)]
pub struct TouchSession {
    pub state: TouchState,
    pub down_y: f64,
    /// Panel offsets when the finger went down
    pub all_apps_baseline: f64,
    pub widgets_baseline: f64,
    /// Skip the settle decision at release (a fling already acted)
    pub ignore_up_event: bool,
    /// Stop panels following the finger (a long press took over)
    pub ignore_move_events: bool,
    pub long_pressed_item: Option<GridItem>,
    /// Last observed pointer position
    pub last_position: Point,
    /// Panel picked by the first drag move of this touch
    pub drag_target: Option<PanelKind>,
}

impl HomeScreen {
    /// Feed one raw touch event
    pub fn on_touch(&mut self, event: &TouchEvent) {
        // Dropping a dragged item (or losing the touch) opens the window in
        // which flings are ignored. Recorded before the recognizer sees the
        // release so the fling it may produce is already covered.
        let drag_release = event.phase == TouchPhase::Up && self.session.long_pressed_item.is_some();
        if drag_release || event.phase == TouchPhase::Cancel {
            self.fling_guard.record_release(event.time);
        }

        if let Some(gesture) = self.recognizer.process(event) {
            self.on_gesture(gesture);
        }

        match event.phase {
            TouchPhase::Down => self.touch_down(event.position),
            TouchPhase::Move => self.touch_motion(event.position),
            TouchPhase::Up | TouchPhase::Cancel => self.touch_up(),
        }
    }

    /// Frame tick: fires a due long press and steps panel tweens.
    /// Returns true while a tween is still running.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if let Some(gesture) = self.recognizer.poll(now) {
            self.on_gesture(gesture);
        }
        self.panels.advance(now)
    }

    /// When the next frame tick must run for a pending long press
    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.recognizer.long_press_deadline()
    }

    fn touch_down(&mut self, position: Point) {
        // The previous touch never released: close its item drag
        if self.session.state == TouchState::TrackingItemDrag {
            self.grid.item_dragging_stopped();
        }

        self.session = TouchSession {
            state: TouchState::TrackingPanelDrag,
            down_y: position.y,
            all_apps_baseline: self.panels.all_apps.offset(),
            widgets_baseline: self.panels.widgets.offset(),
            last_position: position,
            ..TouchSession::default()
        };
        debug!(y = position.y, "Touch down");
    }

    fn touch_motion(&mut self, position: Point) {
        if self.session.state == TouchState::Idle {
            return;
        }

        let moved = position != self.session.last_position;
        let item_menu_open = matches!(self.open_menu(), Some(MenuRequest::Item { .. }));
        if self.session.state == TouchState::TrackingPanelDrag && moved && item_menu_open {
            if let Some(item) = self.session.long_pressed_item.clone() {
                self.start_item_drag(&item);
            }
        }

        match self.session.state {
            TouchState::TrackingItemDrag => {
                self.grid.dragged_item_moved(position.x, position.y);
            }
            TouchState::TrackingPanelDrag if !self.session.ignore_move_events => {
                self.drag_panel(position.y);
            }
            _ => {}
        }

        self.session.last_position = position;
    }

    /// Move the target panel exactly with the finger
    fn drag_panel(&mut self, y: f64) {
        let target = *self.session.drag_target.get_or_insert_with(|| {
            if self.panels.is_expanded(PanelKind::Widgets) {
                PanelKind::Widgets
            } else {
                PanelKind::AllApps
            }
        });

        let diff = self.session.down_y - y;
        let baseline = match target {
            PanelKind::AllApps => self.session.all_apps_baseline,
            PanelKind::Widgets => self.session.widgets_baseline,
        };
        self.panels.get_mut(target).drag_to(baseline - diff);
    }

    fn start_item_drag(&mut self, item: &GridItem) {
        info!(package = %item.package, "Long press became a drag");
        self.dismiss_menu();
        self.grid.item_dragging_started(item);
        self.panels.hide(PanelKind::AllApps);
        self.session.state = TouchState::TrackingItemDrag;
    }

    fn touch_up(&mut self) {
        let ignore_up = self.session.ignore_up_event;

        self.session = TouchSession {
            last_position: self.session.last_position,
            ..TouchSession::default()
        };
        self.panels.end_drags();
        self.panels.all_apps.ignore_touches = false;
        self.panels.widgets.ignore_touches = false;
        self.grid.item_dragging_stopped();

        if !ignore_up {
            for kind in PanelKind::all() {
                self.panels.settle(kind);
            }
        }
    }

    fn on_gesture(&mut self, gesture: GestureEvent) {
        debug!(?gesture, "Gesture");
        match gesture {
            GestureEvent::Tap { position } => self.handle_tap(position),
            GestureEvent::LongPress { position } => self.handle_long_press(position),
            GestureEvent::Fling { direction: FlingDirection::Up, .. } => self.on_fling_up(),
            GestureEvent::Fling { direction: FlingDirection::Down, .. } => self.on_fling_down(),
        }
    }

    fn handle_tap(&mut self, position: Point) {
        if let Some(item) = self.grid.hit_test(position.x, position.y) {
            info!(package = %item.package, "Launching app");
            self.platform.launch_app(&item.package);
        }
    }

    fn handle_long_press(&mut self, position: Point) {
        if self.panels.is_expanded(PanelKind::AllApps) {
            return;
        }

        self.session.ignore_move_events = true;
        self.platform.perform_haptic_feedback();

        match self.grid.hit_test(position.x, position.y) {
            Some(item) => {
                let anchor = position.offset_y(-self.config.icon_anchor_offset);
                self.open_item_menu(anchor, item, MenuOrigin::HomeScreen);
            }
            None => {
                let anchor = position.offset_y(-self.config.home_anchor_offset);
                self.open_main_menu(anchor);
            }
        }
    }

    fn on_fling_up(&mut self) {
        if !self.panels.is_expanded(PanelKind::Widgets) {
            self.session.ignore_up_event = true;
            self.panels.show(PanelKind::AllApps);
        }
    }

    fn on_fling_down(&mut self) {
        self.session.ignore_up_event = true;
        if self.panels.is_expanded(PanelKind::AllApps) {
            self.panels.hide(PanelKind::AllApps);
        } else if self.panels.is_expanded(PanelKind::Widgets) {
            self.panels.hide(PanelKind::Widgets);
        } else if let Some(shade) = self.shade.as_mut().filter(|s| s.is_supported()) {
            if let Err(e) = shade.expand() {
                debug!("Notification shade unavailable: {}", e);
            }
        }
    }

    /// A panel's list scrolled back to its top and hands the touch back
    pub fn resume_panel_tracking(&mut self, down_y: f64) {
        self.session.long_pressed_item = None;
        self.session.state = TouchState::TrackingPanelDrag;
        self.session.down_y = down_y;
        self.session.all_apps_baseline = self.panels.all_apps.offset();
        self.session.widgets_baseline = self.panels.widgets.offset();
        self.session.ignore_up_event = false;
        self.session.drag_target = None;
    }

    /// A widget in the widgets list was long-pressed: drag it straight out
    pub fn widget_long_pressed_on_list(&mut self, item: GridItem) {
        info!(package = %item.package, "Dragging widget from list");
        self.panels.hide(PanelKind::Widgets);
        self.grid.item_dragging_started(&item);
        self.session.long_pressed_item = Some(item);
        self.session.state = TouchState::TrackingItemDrag;
    }
}
