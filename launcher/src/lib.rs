//! Flick launcher core
//!
//! Touch arbitration for a phone home screen: the home grid, the all-apps
//! panel and the widgets panel share one finger. Rendering, storage and
//! platform services are injected collaborators, so the core runs the same
//! on a device and headless.

pub mod config;
pub mod demo;
pub mod error;
pub mod input;
pub mod refresh;
pub mod shell;
pub mod storage;
pub mod system;

pub use config::LauncherConfig;
pub use error::{LauncherError, Result};
pub use shell::{Collaborators, HomeScreen};
