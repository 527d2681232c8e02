pub mod context;
pub mod liveness;
pub mod message;
pub mod navigator;
pub mod panel;
pub mod poller;
pub mod reconciler;
pub mod source;
pub mod state;

pub use context::{AppContext, DEFAULT_MERCY_PERIOD, DEFAULT_POLL_INTERVAL};
pub use liveness::{LivenessSink, NullLiveness, READY, WATCHDOG};
pub use message::describe_error;
pub use navigator::{NavigationError, Navigator};
pub use panel::{DisplaySurface, Panel, PanelRef};
pub use poller::BackgroundTask;
pub use reconciler::{ModePanels, Reconciler};
pub use source::{PrinterStatusSource, PrinterTarget, SourceError};
pub use state::{classify, Classification, ConnectionState, StateFlags, UiMode};
