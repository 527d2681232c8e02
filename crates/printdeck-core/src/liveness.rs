use std::io;
use std::sync::Arc;
use tracing::error;

pub const READY: &str = "READY=1";
pub const WATCHDOG: &str = "WATCHDOG=1";

/// Fire-and-forget health notifications to the process supervisor.
pub trait LivenessSink: Send + Sync {
    fn notify(&self, message: &str) -> io::Result<()>;
}

/// Sink used when no supervisor is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLiveness;

impl LivenessSink for NullLiveness {
    fn notify(&self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Send `message` and log a failure; errors never reach the caller.
pub fn signal(sink: &Arc<dyn LivenessSink>, message: &str) {
    if let Err(err) = sink.notify(message) {
        error!("liveness_notify_error: message={message} err={err}");
    }
}
