//! System integration - platform services the home screen calls into
//!
//! Provides the seams for:
//! - Launching apps, app info and uninstall flows
//! - Haptic feedback
//! - Navigation bar tint
//! - Notification shade reveal (optional, not every platform has one)

use crate::error::Result;
use crate::shell::primitives::Color;

/// App-level platform actions
pub trait Platform {
    fn launch_app(&mut self, package: &str);

    /// Open the system's info screen for a package
    fn open_app_info(&mut self, package: &str);

    /// Start the uninstall flow. Completion is reported later through
    /// [`crate::shell::HomeScreen::on_uninstall_result`].
    fn uninstall_app(&mut self, package: &str);

    fn perform_haptic_feedback(&mut self);
}

/// System chrome the launcher tints while a panel is up
pub trait SystemChrome {
    fn set_navigation_tint(&mut self, color: Color);
}

/// Pull-down notification shade
///
/// Injected only where the platform has one. `is_supported` is the feature
/// flag, `expand` may still fail and callers treat that as best-effort.
pub trait NotificationShade {
    fn is_supported(&self) -> bool {
        true
    }

    fn expand(&mut self) -> Result<()>;
}
