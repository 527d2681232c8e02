use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Runs one action on a fixed cadence, starting immediately.
///
/// The action has no error channel; it must deal with its own failures.
pub struct BackgroundTask<F> {
    interval: Duration,
    action: Option<F>,
    handle: Option<JoinHandle<()>>,
}

impl<F> BackgroundTask<F>
where
    F: FnMut() + Send + 'static,
{
    pub fn new(interval: Duration, action: F) -> Self {
        Self {
            interval,
            action: Some(action),
            handle: None,
        }
    }

    /// Spawn the ticking task on the current tokio runtime. Only the first call
    /// has an effect.
    pub fn start(&mut self) {
        let Some(mut action) = self.action.take() else {
            warn!("background_task_already_started");
            return;
        };
        let period = self.interval;
        debug!("background_task_start: interval={period:?}");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                action();
            }
        }));
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<F> Drop for BackgroundTask<F> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
