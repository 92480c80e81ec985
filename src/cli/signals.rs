//! Ctrl+C handling for a recording session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

/// Run `on_interrupt` on every Ctrl+C.
///
/// The first press asks the recorder to stop; the file is still finalized
/// and validated.
pub fn stop_on_interrupt<F>(on_interrupt: F)
where
    F: Fn() + Send + 'static,
{
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping recording");
            on_interrupt();
        }
    });
}

/// Stop request that clears a recorder's flag
pub fn stop_recording_on(flag: Arc<AtomicBool>) -> impl Fn() + Send + 'static {
    move || flag.store(false, Ordering::SeqCst)
}
