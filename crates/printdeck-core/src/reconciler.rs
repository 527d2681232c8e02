use crate::context::AppContext;
use crate::liveness::{self, LivenessSink, WATCHDOG};
use crate::message::describe_error;
use crate::navigator::Navigator;
use crate::panel::{DisplaySurface, PanelRef};
use crate::source::PrinterStatusSource;
use crate::state::{classify, Classification, ConnectionState, UiMode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Panels the reconciler installs for each mode.
pub trait ModePanels<N> {
    /// The long-lived splash panel; the same instance on every call.
    fn splash(&self) -> PanelRef<N>;

    fn set_splash_message(&self, text: &str);

    fn idle(&self, state: &ConnectionState) -> PanelRef<N>;

    fn printing(&self, state: &ConnectionState) -> PanelRef<N>;
}

/// Maps polled printer state onto the visible panel.
pub struct Reconciler<N> {
    source: Arc<dyn PrinterStatusSource>,
    liveness: Arc<dyn LivenessSink>,
    panels: Box<dyn ModePanels<N>>,
    mode: Option<UiMode>,
    state: Option<ConnectionState>,
    started_at: Instant,
    mercy_period: Duration,
}

impl<N> Reconciler<N> {
    pub fn new(context: &AppContext, panels: Box<dyn ModePanels<N>>) -> Self {
        Self::with_start(context, panels, Instant::now())
    }

    pub fn with_start(
        context: &AppContext,
        panels: Box<dyn ModePanels<N>>,
        started_at: Instant,
    ) -> Self {
        Self {
            source: context.source.clone(),
            liveness: context.liveness.clone(),
            panels,
            mode: None,
            state: None,
            started_at,
            mercy_period: context.mercy_period,
        }
    }

    /// Mode of the installed panel; splash until the first tick installs one.
    pub fn mode(&self) -> UiMode {
        self.mode.unwrap_or_default()
    }

    pub fn has_installed_panel(&self) -> bool {
        self.mode.is_some()
    }

    /// Latest successfully queried connection state.
    pub fn state(&self) -> Option<&ConnectionState> {
        self.state.as_ref()
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub async fn verify_connection<D>(&mut self, navigator: &mut Navigator<D>) -> UiMode
    where
        D: DisplaySurface<Node = N>,
    {
        self.verify_connection_at(navigator, Instant::now()).await
    }

    /// Run one poll cycle as if the current time were `now`.
    pub async fn verify_connection_at<D>(
        &mut self,
        navigator: &mut Navigator<D>,
        now: Instant,
    ) -> UiMode
    where
        D: DisplaySurface<Node = N>,
    {
        liveness::signal(&self.liveness, WATCHDOG);

        let target = match self.source.connection_state().await {
            Ok(state) => {
                let target = self.react_to(&state).await;
                self.state = Some(state);
                target
            }
            Err(err) => {
                if now.saturating_duration_since(self.started_at) >= self.mercy_period {
                    let text = describe_error(&err.to_string(), self.source.target());
                    self.panels.set_splash_message(&text);
                }
                debug!("status_query_error: {err}");
                UiMode::Splash
            }
        };

        if self.mode == Some(target) {
            return target;
        }

        let unknown = ConnectionState::default();
        let state = self.state.as_ref().unwrap_or(&unknown);
        let (panel, headline) = match target {
            UiMode::Idle => (self.panels.idle(state), "printer is ready"),
            UiMode::Printing => (self.panels.printing(state), "printing a job"),
            UiMode::Splash => (self.panels.splash(), "waiting for printer"),
        };
        navigator.show_panel(panel);
        info!(
            "ui_mode_transition: from={} to={target} state={state} headline={headline:?}",
            self.mode.map(UiMode::as_str).unwrap_or("none")
        );
        self.mode = Some(target);
        target
    }

    async fn react_to(&self, state: &ConnectionState) -> UiMode {
        let classification = classify(state);
        match classification {
            Classification::NeedsConnect => {
                if let Err(err) = self.source.connect().await {
                    warn!("connect_attempt_error: state={state} err={err}");
                    let text = describe_error(&err.to_string(), self.source.target());
                    self.panels.set_splash_message(&text);
                } else {
                    debug!("connect_attempt_sent: state={state}");
                }
            }
            Classification::Connecting => {
                self.panels.set_splash_message(state.label());
            }
            Classification::Idle | Classification::Printing | Classification::Unrecognized => {}
        }
        classification.mode()
    }
}
