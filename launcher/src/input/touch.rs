//! Touch input events for the single active pointer

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::shell::primitives::Point;

/// Phase of a pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Raw touch event delivered to the home screen
#[derive(Debug, Clone, Copy)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub position: Point,
    pub time: Instant,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, x: f64, y: f64, time: Instant) -> Self {
        Self {
            phase,
            position: Point::new(x, y),
            time,
        }
    }

    pub fn down(x: f64, y: f64, time: Instant) -> Self {
        Self::new(TouchPhase::Down, x, y, time)
    }

    pub fn motion(x: f64, y: f64, time: Instant) -> Self {
        Self::new(TouchPhase::Move, x, y, time)
    }

    pub fn up(x: f64, y: f64, time: Instant) -> Self {
        Self::new(TouchPhase::Up, x, y, time)
    }

    pub fn cancel(x: f64, y: f64, time: Instant) -> Self {
        Self::new(TouchPhase::Cancel, x, y, time)
    }
}
