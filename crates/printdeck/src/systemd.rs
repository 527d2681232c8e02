use printdeck_core::{LivenessSink, READY, WATCHDOG};
use sd_notify::NotifyState;
use std::io;

/// Service-manager notifications over `$NOTIFY_SOCKET`.
///
/// Without a socket (not started by systemd) every notification is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemdNotifier;

impl LivenessSink for SystemdNotifier {
    fn notify(&self, message: &str) -> io::Result<()> {
        sd_notify::notify(false, &[notify_state(message)])
    }
}

fn notify_state(message: &str) -> NotifyState<'_> {
    match message {
        READY => NotifyState::Ready,
        WATCHDOG => NotifyState::Watchdog,
        other => NotifyState::Custom(other),
    }
}
