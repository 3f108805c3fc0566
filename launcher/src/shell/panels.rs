//! All-apps and widgets panels
//!
//! Both panels are full-width overlays sliding vertically. Offset 0 is fully
//! shown, `screen_height` is fully hidden below the screen. Offsets are always
//! clamped to that range.
//!
//! Show/hide is a fixed-duration tween with decelerate easing. Each panel
//! tweens on its own, a new request restarts from wherever the panel is, and
//! a live drag write drops the tween.

use std::time::{Duration, Instant};

use tracing::debug;

use super::primitives::{colors, easing, lerp};
use crate::system::SystemChrome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    AllApps,
    Widgets,
}

impl PanelKind {
    pub fn all() -> [PanelKind; 2] {
        [PanelKind::AllApps, PanelKind::Widgets]
    }
}

/// Tween toward a target offset
#[derive(Debug, Clone)]
struct PanelAnimation {
    from: f64,
    to: f64,
    /// Anchored on the first frame after the request
    started: Option<Instant>,
    duration: Duration,
}

/// One overlay panel
#[derive(Debug, Clone)]
pub struct PanelState {
    offset: f64,
    screen_height: f64,
    /// The panel's own list is consuming touches (e.g. a menu opened from it)
    pub ignore_touches: bool,
    dragging: bool,
    animation: Option<PanelAnimation>,
}

impl PanelState {
    /// A panel starting hidden
    pub fn new(screen_height: f64) -> Self {
        Self {
            offset: screen_height,
            screen_height,
            ignore_touches: false,
            dragging: false,
            animation: None,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Anything other than fully hidden
    pub fn is_expanded(&self) -> bool {
        self.offset != self.screen_height
    }

    /// A drag or a tween currently owns the offset
    pub fn is_in_flight(&self) -> bool {
        self.dragging || self.animation.is_some()
    }

    /// Target of the running tween
    pub fn animation_target(&self) -> Option<f64> {
        self.animation.as_ref().map(|a| a.to)
    }

    /// Follow the finger. Clamped, and supersedes any tween.
    pub fn drag_to(&mut self, offset: f64) {
        self.animation = None;
        self.dragging = true;
        self.offset = offset.clamp(0.0, self.screen_height);
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    fn animate_to(&mut self, target: f64, duration: Duration) {
        self.animation = Some(PanelAnimation {
            from: self.offset,
            to: target.clamp(0.0, self.screen_height),
            started: None,
            duration,
        });
    }

    /// Step the tween, returns true while still animating
    fn advance(&mut self, now: Instant) -> bool {
        let Some(anim) = self.animation.as_mut() else {
            return false;
        };

        let started = *anim.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);
        if anim.duration.is_zero() || elapsed >= anim.duration {
            self.offset = anim.to;
            self.animation = None;
            return false;
        }

        let t = elapsed.as_secs_f64() / anim.duration.as_secs_f64();
        self.offset = lerp(anim.from, anim.to, easing::decelerate(t)).clamp(0.0, self.screen_height);
        true
    }
}

/// Panel motion controller, owns both panels and the navigation tint
pub struct Panels {
    pub all_apps: PanelState,
    pub widgets: PanelState,
    screen_height: f64,
    duration: Duration,
    chrome: Box<dyn SystemChrome>,
}

impl Panels {
    pub fn new(screen_height: f64, duration: Duration, chrome: Box<dyn SystemChrome>) -> Self {
        Self {
            all_apps: PanelState::new(screen_height),
            widgets: PanelState::new(screen_height),
            screen_height,
            duration,
            chrome,
        }
    }

    pub fn get(&self, kind: PanelKind) -> &PanelState {
        match kind {
            PanelKind::AllApps => &self.all_apps,
            PanelKind::Widgets => &self.widgets,
        }
    }

    pub fn get_mut(&mut self, kind: PanelKind) -> &mut PanelState {
        match kind {
            PanelKind::AllApps => &mut self.all_apps,
            PanelKind::Widgets => &mut self.widgets,
        }
    }

    pub fn is_expanded(&self, kind: PanelKind) -> bool {
        self.get(kind).is_expanded()
    }

    /// Slide a panel fully up
    pub fn show(&mut self, kind: PanelKind) {
        debug!(?kind, "Showing panel");
        let duration = self.duration;
        self.get_mut(kind).animate_to(0.0, duration);
        self.chrome.set_navigation_tint(colors::SEMITRANSPARENT_NAVIGATION);
    }

    /// Slide a panel fully down
    pub fn hide(&mut self, kind: PanelKind) {
        debug!(?kind, "Hiding panel");
        let (duration, height) = (self.duration, self.screen_height);
        self.get_mut(kind).animate_to(height, duration);
        self.chrome.set_navigation_tint(colors::TRANSPARENT);
    }

    /// Release rule: past the midpoint snaps open, otherwise an expanded
    /// panel snaps closed. A panel already fully hidden is left alone.
    pub fn settle(&mut self, kind: PanelKind) {
        let panel = self.get(kind);
        if panel.offset() < self.screen_height * 0.5 {
            self.show(kind);
        } else if panel.is_expanded() {
            self.hide(kind);
        }
    }

    /// Advance running tweens, returns true if any is still going
    pub fn advance(&mut self, now: Instant) -> bool {
        let all_apps = self.all_apps.advance(now);
        let widgets = self.widgets.advance(now);
        all_apps || widgets
    }

    pub fn end_drags(&mut self) {
        self.all_apps.end_drag();
        self.widgets.end_drag();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::primitives::Color;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct TintLog(Rc<RefCell<Vec<Color>>>);

    impl SystemChrome for TintLog {
        fn set_navigation_tint(&mut self, color: Color) {
            self.0.borrow_mut().push(color);
        }
    }

    fn panels() -> (Panels, TintLog) {
        let tints = TintLog::default();
        (Panels::new(2000.0, Duration::from_millis(150), Box::new(tints.clone())), tints)
    }

    #[test]
    fn test_drag_is_clamped() {
        let (mut p, _) = panels();
        p.all_apps.drag_to(-300.0);
        assert_eq!(p.all_apps.offset(), 0.0);
        p.all_apps.drag_to(2500.0);
        assert_eq!(p.all_apps.offset(), 2000.0);
        assert!(!p.all_apps.is_expanded());
    }

    #[test]
    fn test_show_tweens_with_deceleration() {
        let (mut p, tints) = panels();
        let t = Instant::now();
        p.show(PanelKind::AllApps);
        assert!(p.all_apps.is_in_flight());
        assert_eq!(*tints.0.borrow(), vec![colors::SEMITRANSPARENT_NAVIGATION]);

        // First frame anchors the tween
        assert!(p.advance(t));
        assert_eq!(p.all_apps.offset(), 2000.0);

        p.advance(t + Duration::from_millis(75));
        // Decelerate covers 75% of the distance at half time
        assert!((p.all_apps.offset() - 500.0).abs() < 1e-6);

        assert!(!p.advance(t + Duration::from_millis(150)));
        assert_eq!(p.all_apps.offset(), 0.0);
        assert!(!p.all_apps.is_in_flight());
    }

    #[test]
    fn test_panels_animate_independently() {
        let (mut p, tints) = panels();
        let t = Instant::now();
        p.widgets.drag_to(0.0);
        p.show(PanelKind::AllApps);
        p.hide(PanelKind::Widgets);
        p.advance(t);
        p.advance(t + Duration::from_millis(200));
        assert_eq!(p.all_apps.offset(), 0.0);
        assert_eq!(p.widgets.offset(), 2000.0);
        assert_eq!(tints.0.borrow().last(), Some(&colors::TRANSPARENT));
    }

    #[test]
    fn test_new_request_restarts_from_current_offset() {
        let (mut p, _) = panels();
        let t = Instant::now();
        p.show(PanelKind::AllApps);
        p.advance(t);
        p.advance(t + Duration::from_millis(75));
        p.hide(PanelKind::AllApps);
        p.advance(t + Duration::from_millis(80));
        // Restarted at 500 heading back down
        assert!((p.all_apps.offset() - 500.0).abs() < 1e-6);
        p.advance(t + Duration::from_millis(230));
        assert_eq!(p.all_apps.offset(), 2000.0);
    }

    #[test]
    fn test_drag_supersedes_tween() {
        let (mut p, _) = panels();
        let t = Instant::now();
        p.show(PanelKind::AllApps);
        p.advance(t);
        p.all_apps.drag_to(1200.0);
        p.advance(t + Duration::from_millis(150));
        assert_eq!(p.all_apps.offset(), 1200.0);
    }

    #[test]
    fn test_settle_boundaries() {
        let (mut p, _) = panels();

        // Exactly half: strict less-than fails, panel was expanded, so it hides
        p.all_apps.drag_to(1000.0);
        p.settle(PanelKind::AllApps);
        assert_eq!(p.all_apps.animation_target(), Some(2000.0));

        p.all_apps.drag_to(999.0);
        p.settle(PanelKind::AllApps);
        assert_eq!(p.all_apps.animation_target(), Some(0.0));

        // Fully hidden: nothing to do
        p.widgets.drag_to(2000.0);
        p.settle(PanelKind::Widgets);
        assert_eq!(p.widgets.animation_target(), None);
    }
}
