//! Input handling - touch events, gesture classification, the touch state machine
//!
//! This module provides:
//! - Gesture recognition (tap, long press, fling)
//! - The home screen touch state machine arbitrating grid drags and panel swipes

mod gestures;
mod handler;
mod touch;

pub use gestures::*;
pub use handler::*;
pub use touch::*;
