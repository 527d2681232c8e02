use crate::liveness::{LivenessSink, NullLiveness};
use crate::source::PrinterStatusSource;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Startup window during which failed status queries do not touch the splash text.
pub const DEFAULT_MERCY_PERIOD: Duration = Duration::from_secs(30);

/// Collaborators and timing shared by the poller and the reconciler.
#[derive(Clone)]
pub struct AppContext {
    pub source: Arc<dyn PrinterStatusSource>,
    pub liveness: Arc<dyn LivenessSink>,
    pub poll_interval: Duration,
    pub mercy_period: Duration,
}

impl AppContext {
    pub fn new(source: Arc<dyn PrinterStatusSource>) -> Self {
        Self {
            source,
            liveness: Arc::new(NullLiveness),
            poll_interval: DEFAULT_POLL_INTERVAL,
            mercy_period: DEFAULT_MERCY_PERIOD,
        }
    }

    pub fn with_liveness(mut self, liveness: Arc<dyn LivenessSink>) -> Self {
        self.liveness = liveness;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_mercy_period(mut self, period: Duration) -> Self {
        self.mercy_period = period;
        self
    }
}
