use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Process-wide switch for reporting reactive state changes.
///
/// Changes made through [`reactive_with_debug`](crate::reactive_with_debug) values
/// are always emitted as `trace` events; while the switch is on they are promoted to
/// `info` so they show up under the default filter.
#[derive(Debug, Clone, Copy)]
pub struct ReactiveDebug;

impl ReactiveDebug {
    /// Turns change reporting on.
    pub fn enable() {
        ENABLED.store(true, Ordering::Relaxed);
    }

    /// Turns change reporting off.
    pub fn disable() {
        ENABLED.store(false, Ordering::Relaxed);
    }

    /// Whether change reporting is on.
    #[must_use]
    pub fn is_enabled() -> bool {
        ENABLED.load(Ordering::Relaxed)
    }

    /// Reports a state change.
    pub fn log(message: &str) {
        if Self::is_enabled() {
            tracing::info!(target: "wsx::reactive", "{message}");
        } else {
            tracing::trace!(target: "wsx::reactive", "{message}");
        }
    }
}
