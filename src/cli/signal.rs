//! Exit codes and Ctrl+C handling
//!
//! Batch runs stop scheduling new files after the first Ctrl+C and let
//! conversions already in flight finish. A second Ctrl+C exits at once.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Non-standard exit codes (anyhow errors from `main` exit 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Transcript held no user or model turns
    NoConversation,
    /// User interrupted with Ctrl+C
    Interrupted,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::NoConversation => 2,
            ExitCode::Interrupted => 130,
        }
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

/// Ctrl+C presses seen so far
static SIGNALS: AtomicUsize = AtomicUsize::new(0);

/// Install the Ctrl+C handler used by batch mode
pub fn setup_signal_handler() {
    let installed = ctrlc::set_handler(|| {
        if SIGNALS.fetch_add(1, Ordering::AcqRel) > 0 {
            ExitCode::Interrupted.exit();
        }
        eprintln!("\nInterrupted. Finishing files in progress (Ctrl+C again to abort)...");
    });
    if let Err(e) = installed {
        tracing::warn!(error = %e, "Failed to set Ctrl+C handler");
    }
}

/// Whether Ctrl+C has been pressed
pub fn check_interrupted() -> bool {
    SIGNALS.load(Ordering::Acquire) > 0
}
