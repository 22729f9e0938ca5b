//! Session core and analysis pipeline for diabetic retinopathy screening
//!
//! The flow is four steps: patient information, a fixed questionnaire, image
//! upload with remote analysis, and results with a PDF report. A UI shell
//! drives it through [`commands`]; the modules below are usable directly.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod error;
pub mod intake;
pub mod notify;
pub mod questionnaire;
pub mod report;
pub mod session;

#[cfg(test)]
mod test_support;

pub use commands::ScreeningState;
pub use config::ScreeningConfig;
pub use error::{Result, ScreeningError, ValidationError};
pub use session::{SessionStore, Step};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Filtering follows `RUST_LOG`. Default: warn for dependencies, info for this
/// crate. Use `RUST_LOG=retina_screen_lib=debug` for per-request logs.
/// Calling this more than once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,retina_screen_lib=info")),
        )
        .try_init();
}
