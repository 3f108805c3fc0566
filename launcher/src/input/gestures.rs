//! Gesture recognition for the home screen pointer
//!
//! Classifies one pointer's stream into at most one gesture per touch:
//! - Tap (released inside the slop region before the long press threshold)
//! - Long press (held inside the slop region past the threshold)
//! - Fling (released outside the slop region fast enough, up or down)
//!
//! Flings that land right after an item drag is released are swallowed, see
//! [`FlingGuard`].

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::touch::{TouchEvent, TouchPhase};
use crate::config::GestureSettings;
use crate::shell::primitives::Point;

/// Only samples this recent contribute to the release velocity
const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

/// Direction of a fling, by the sign of vertical velocity only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlingDirection {
    Up,
    Down,
}

/// Recognized gesture
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// Quick press and release without leaving the slop region
    Tap {
        position: Point,
    },

    /// Finger held still past the long press threshold
    LongPress {
        position: Point,
    },

    /// Fast directional release
    Fling {
        direction: FlingDirection,
        velocity: Point, // px/s
    },
}

/// Configuration for gesture recognition
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Time threshold for long press
    pub long_press_duration: Duration,

    /// Distance the finger may travel and still count as a tap
    pub touch_slop: f64,

    /// Minimum release speed (either axis) for a fling
    pub min_fling_velocity: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from(&GestureSettings::default())
    }
}

impl From<&GestureSettings> for GestureConfig {
    fn from(settings: &GestureSettings) -> Self {
        Self {
            long_press_duration: settings.long_press_duration(),
            touch_slop: settings.touch_slop,
            min_fling_velocity: settings.min_fling_velocity,
        }
    }
}

/// Shared record of the last drag release
///
/// The recognizer and the home screen each hold a clone. The home screen
/// records releases, the recognizer drops flings that fall inside the window,
/// so a dropped icon's momentum is never read as an intentional fling.
#[derive(Debug, Clone)]
pub struct FlingGuard {
    last_release: Rc<Cell<Option<Instant>>>,
    window: Duration,
}

impl FlingGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            last_release: Rc::new(Cell::new(None)),
            window,
        }
    }

    pub fn record_release(&self, at: Instant) {
        self.last_release.set(Some(at));
    }

    pub fn last_release(&self) -> Option<Instant> {
        self.last_release.get()
    }

    /// Whether a fling at `at` falls inside the suppression window
    pub fn suppresses(&self, at: Instant) -> bool {
        match self.last_release.get() {
            Some(released) => at.saturating_duration_since(released) < self.window,
            None => false,
        }
    }
}

/// Touch point tracking
#[derive(Debug, Clone)]
pub struct TouchPoint {
    pub start_pos: Point,
    pub current_pos: Point,
    pub start_time: Instant,
    samples: VecDeque<(Point, Instant)>,
}

impl TouchPoint {
    pub fn new(pos: Point, time: Instant) -> Self {
        let mut samples = VecDeque::new();
        samples.push_back((pos, time));
        Self {
            start_pos: pos,
            current_pos: pos,
            start_time: time,
            samples,
        }
    }

    pub fn update(&mut self, pos: Point, time: Instant) {
        self.current_pos = pos;
        self.samples.push_back((pos, time));

        // Keep only what the velocity window needs
        while let Some(&(_, oldest)) = self.samples.front() {
            if time.saturating_duration_since(oldest) > VELOCITY_WINDOW && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn distance(&self) -> f64 {
        let dx = self.current_pos.x - self.start_pos.x;
        let dy = self.current_pos.y - self.start_pos.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Velocity over the recent sample window in px/s
    pub fn velocity(&self) -> Point {
        let Some(&(last_pos, last_time)) = self.samples.back() else {
            return Point::default();
        };

        let (first_pos, first_time) = self
            .samples
            .iter()
            .find(|(_, t)| last_time.saturating_duration_since(*t) <= VELOCITY_WINDOW)
            .copied()
            .unwrap_or((last_pos, last_time));

        let dt = last_time.saturating_duration_since(first_time).as_secs_f64();
        if dt < 0.001 {
            return Point::default();
        }

        Point::new((last_pos.x - first_pos.x) / dt, (last_pos.y - first_pos.y) / dt)
    }
}

/// Single-pointer gesture recognizer
pub struct GestureRecognizer {
    pub config: GestureConfig,
    guard: FlingGuard,
    point: Option<TouchPoint>,
    in_tap_region: bool,
    long_press_fired: bool,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig, guard: FlingGuard) -> Self {
        Self {
            config,
            guard,
            point: None,
            in_tap_region: false,
            long_press_fired: false,
        }
    }

    /// Feed one touch event
    pub fn process(&mut self, event: &TouchEvent) -> Option<GestureEvent> {
        match event.phase {
            TouchPhase::Down => self.touch_down(event.position, event.time),
            TouchPhase::Move => self.touch_motion(event.position, event.time),
            TouchPhase::Up => self.touch_up(event.position, event.time),
            TouchPhase::Cancel => {
                self.touch_cancel();
                None
            }
        }
    }

    pub fn touch_down(&mut self, pos: Point, time: Instant) -> Option<GestureEvent> {
        self.point = Some(TouchPoint::new(pos, time));
        self.in_tap_region = true;
        self.long_press_fired = false;
        None
    }

    pub fn touch_motion(&mut self, pos: Point, time: Instant) -> Option<GestureEvent> {
        // The long press timer would have fired before this sample arrived
        let long_press = self.poll(time);

        let slop = self.config.touch_slop;
        let point = self.point.as_mut()?;
        point.update(pos, time);
        if point.distance() > slop {
            self.in_tap_region = false;
        }

        long_press
    }

    pub fn touch_up(&mut self, pos: Point, time: Instant) -> Option<GestureEvent> {
        if let Some(long_press) = self.poll(time) {
            self.point = None;
            return Some(long_press);
        }

        let mut point = self.point.take()?;
        point.update(pos, time);
        if point.distance() > self.config.touch_slop {
            self.in_tap_region = false;
        }

        if self.long_press_fired {
            return None;
        }

        if self.in_tap_region {
            return Some(GestureEvent::Tap { position: pos });
        }

        let velocity = point.velocity();
        let min = self.config.min_fling_velocity;
        if velocity.x.abs() < min && velocity.y.abs() < min {
            return None;
        }

        if self.guard.suppresses(time) {
            debug!("Fling swallowed, too close to a drag release");
            return None;
        }

        let direction = if velocity.y > 0.0 {
            FlingDirection::Down
        } else {
            FlingDirection::Up
        };
        Some(GestureEvent::Fling { direction, velocity })
    }

    /// Handle touch cancel - clear all state
    pub fn touch_cancel(&mut self) {
        self.point = None;
        self.in_tap_region = false;
        self.long_press_fired = false;
    }

    /// Fire the long press if its deadline has passed
    ///
    /// Called for every event and from frame ticks, standing in for the
    /// platform's long press timer.
    pub fn poll(&mut self, now: Instant) -> Option<GestureEvent> {
        let deadline = self.long_press_deadline()?;
        if now < deadline {
            return None;
        }

        self.long_press_fired = true;
        self.point.as_ref().map(|p| GestureEvent::LongPress { position: p.start_pos })
    }

    /// When the pending long press would fire, if one is pending
    pub fn long_press_deadline(&self) -> Option<Instant> {
        if !self.in_tap_region || self.long_press_fired {
            return None;
        }
        self.point
            .as_ref()
            .map(|p| p.start_time + self.config.long_press_duration)
    }

    /// Check if a touch is currently active
    #[cfg(test)]
    pub(crate) fn has_active_touch(&self) -> bool {
        self.point.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recognizer() -> (GestureRecognizer, FlingGuard) {
        let guard = FlingGuard::new(ms(500));
        (GestureRecognizer::new(GestureConfig::default(), guard.clone()), guard)
    }

    #[test]
    fn test_quick_tap() {
        let (mut r, _) = recognizer();
        let t = Instant::now();
        assert_eq!(r.process(&TouchEvent::down(100.0, 100.0, t)), None);
        assert_eq!(r.process(&TouchEvent::motion(103.0, 101.0, t + ms(30))), None);
        assert_eq!(
            r.process(&TouchEvent::up(103.0, 101.0, t + ms(60))),
            Some(GestureEvent::Tap { position: Point::new(103.0, 101.0) })
        );
    }

    #[test]
    fn test_long_press_via_poll_then_no_tap() {
        let (mut r, _) = recognizer();
        let t = Instant::now();
        r.process(&TouchEvent::down(50.0, 60.0, t));
        assert_eq!(r.poll(t + ms(499)), None);
        assert_eq!(
            r.poll(t + ms(500)),
            Some(GestureEvent::LongPress { position: Point::new(50.0, 60.0) })
        );
        // Fires once
        assert_eq!(r.poll(t + ms(800)), None);
        assert_eq!(r.process(&TouchEvent::up(50.0, 60.0, t + ms(900))), None);
    }

    #[test]
    fn test_long_press_detected_on_late_release() {
        let (mut r, _) = recognizer();
        let t = Instant::now();
        r.process(&TouchEvent::down(50.0, 60.0, t));
        assert_eq!(
            r.process(&TouchEvent::up(50.0, 60.0, t + ms(700))),
            Some(GestureEvent::LongPress { position: Point::new(50.0, 60.0) })
        );
    }

    #[test]
    fn test_movement_cancels_long_press() {
        let (mut r, _) = recognizer();
        let t = Instant::now();
        r.process(&TouchEvent::down(50.0, 500.0, t));
        r.process(&TouchEvent::motion(50.0, 450.0, t + ms(50)));
        assert_eq!(r.long_press_deadline(), None);
        assert_eq!(r.poll(t + ms(1000)), None);
    }

    #[test]
    fn test_fling_direction_uses_vertical_sign_only() {
        let (mut r, _) = recognizer();
        let t = Instant::now();
        r.process(&TouchEvent::down(100.0, 1500.0, t));
        r.process(&TouchEvent::motion(300.0, 1400.0, t + ms(20)));
        r.process(&TouchEvent::motion(500.0, 1300.0, t + ms(40)));
        match r.process(&TouchEvent::up(700.0, 1200.0, t + ms(60))) {
            Some(GestureEvent::Fling { direction, velocity }) => {
                assert_eq!(direction, FlingDirection::Up);
                assert!(velocity.x > 0.0);
            }
            other => panic!("expected fling, got {:?}", other),
        }

        r.process(&TouchEvent::down(100.0, 300.0, t + ms(1000)));
        r.process(&TouchEvent::motion(100.0, 400.0, t + ms(1020)));
        match r.process(&TouchEvent::up(100.0, 500.0, t + ms(1040))) {
            Some(GestureEvent::Fling { direction, .. }) => assert_eq!(direction, FlingDirection::Down),
            other => panic!("expected fling, got {:?}", other),
        }
    }

    #[test]
    fn test_slow_release_is_not_a_fling() {
        let (mut r, _) = recognizer();
        let t = Instant::now();
        r.process(&TouchEvent::down(100.0, 1000.0, t));
        r.process(&TouchEvent::motion(100.0, 900.0, t + ms(100)));
        // Finger rests before lifting
        r.process(&TouchEvent::motion(100.0, 900.0, t + ms(400)));
        assert_eq!(r.process(&TouchEvent::up(100.0, 900.0, t + ms(500))), None);
    }

    #[test]
    fn test_fling_suppressed_inside_window() {
        let (mut r, guard) = recognizer();
        let t = Instant::now();
        guard.record_release(t);

        r.process(&TouchEvent::down(100.0, 300.0, t + ms(100)));
        r.process(&TouchEvent::motion(100.0, 400.0, t + ms(120)));
        assert_eq!(r.process(&TouchEvent::up(100.0, 500.0, t + ms(140))), None);

        // Same gesture after the window closes goes through
        r.process(&TouchEvent::down(100.0, 300.0, t + ms(600)));
        r.process(&TouchEvent::motion(100.0, 400.0, t + ms(620)));
        assert!(matches!(
            r.process(&TouchEvent::up(100.0, 500.0, t + ms(640))),
            Some(GestureEvent::Fling { direction: FlingDirection::Down, .. })
        ));
    }

    #[test]
    fn test_guard_window_boundary() {
        let guard = FlingGuard::new(ms(500));
        let t = Instant::now();
        assert!(!guard.suppresses(t));
        guard.record_release(t);
        assert!(guard.suppresses(t + ms(499)));
        assert!(!guard.suppresses(t + ms(500)));
    }

    #[test]
    fn test_cancel_clears_touch() {
        let (mut r, _) = recognizer();
        let t = Instant::now();
        r.process(&TouchEvent::down(100.0, 100.0, t));
        assert!(r.has_active_touch());
        r.process(&TouchEvent::cancel(100.0, 100.0, t + ms(10)));
        assert!(!r.has_active_touch());
        assert_eq!(r.poll(t + ms(1000)), None);
    }
}
