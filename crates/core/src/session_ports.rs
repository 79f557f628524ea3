//! Port interfaces for the UI collaborators
//!
//! The client never renders anything itself. Terminal failures and session
//! transitions are reported through these sinks, which the embedding
//! application implements (toast layer, router).
//!
//! # Example
//!
//! ```no_run
//! use financeflow_core::Notifier;
//!
//! struct Toasts;
//!
//! impl Notifier for Toasts {
//!     fn show_error(&self, title: &str, message: &str) {
//!         eprintln!("{title}: {message}");
//!     }
//!
//!     fn show_success(&self, title: &str, message: &str) {
//!         println!("{title}: {message}");
//!     }
//! }
//! ```

use tracing::{error, info};

/// User-visible notification sink.
///
/// Calls are fire-and-forget; implementations must not block.
pub trait Notifier: Send + Sync {
    fn show_error(&self, title: &str, message: &str);

    fn show_success(&self, title: &str, message: &str);
}

/// Navigation sink used when the session can no longer be recovered.
pub trait Navigator: Send + Sync {
    /// Send the user to the unauthenticated entry point.
    fn redirect_to_login(&self);
}

/// Notifier that only writes to the log. Used when no UI layer is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show_error(&self, title: &str, message: &str) {
        error!(title, message, "User-visible error");
    }

    fn show_success(&self, title: &str, message: &str) {
        info!(title, message, "User-visible success");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {
        info!("Login redirect requested with no navigator attached");
    }
}
