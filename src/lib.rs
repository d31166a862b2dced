//! PrepMate client orchestration core.
//!
//! Coordinates the interview-practice pipeline against the remote backend:
//! the setup wizard, the timed live recording session, asynchronous
//! evaluation with synthetic progress, best-effort dashboard aggregation,
//! and subscription/checkout handling. Hosts drive it through
//! [`InterviewFlow`], [`dashboard::load_dashboard`] and
//! [`billing::SubscriptionCoordinator`]; everything remote goes through the
//! [`api::Backend`] gateway.

use log::info;

pub mod api;
pub mod billing;
pub mod config;
pub mod dashboard;
pub mod evaluation;
pub mod interview;
pub mod session;

pub use api::{ApiClient, ApiError, Backend};
pub use config::AppConfig;
pub use session::{InterviewFlow, SessionPhase, SetupWizard};

/// Opt-in env_logger initialization for host binaries and tests. Safe to
/// call more than once.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        info!("PrepMate core v{} logging initialized", env!("CARGO_PKG_VERSION"));
    }
}
