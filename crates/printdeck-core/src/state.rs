use std::fmt;

/// Coarse application state deciding which full-screen panel is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UiMode {
    #[default]
    Splash,
    Idle,
    Printing,
}

impl UiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            UiMode::Splash => "splash",
            UiMode::Idle => "idle",
            UiMode::Printing => "printing",
        }
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const OPERATIONAL_PREFIXES: &[&str] = &["Operational"];
const PRINTING_PREFIXES: &[&str] = &[
    "Printing",
    "Starting",
    "Sending",
    "Paused",
    "Pausing",
    "Transfer",
    "Cancelling",
    "Resuming",
    "Finishing",
];
const ERROR_PREFIXES: &[&str] = &["Error", "Unknown"];
const OFFLINE_PREFIXES: &[&str] = &["Offline", "Closed"];
const CONNECTING_PREFIXES: &[&str] = &["Opening", "Detecting", "Connecting"];

/// Printer connection state as reported by the control server.
///
/// The label is kept verbatim; the predicates match on its prefix so that
/// variants such as "Offline after error" or "Printing from SD" classify the
/// same way as their base state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionState(String);

impl ConnectionState {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn is_operational(&self) -> bool {
        self.has_prefix(OPERATIONAL_PREFIXES)
    }

    pub fn is_printing(&self) -> bool {
        self.has_prefix(PRINTING_PREFIXES)
    }

    pub fn is_error(&self) -> bool {
        self.has_prefix(ERROR_PREFIXES)
    }

    pub fn is_offline(&self) -> bool {
        self.has_prefix(OFFLINE_PREFIXES)
    }

    pub fn is_connecting(&self) -> bool {
        self.has_prefix(CONNECTING_PREFIXES)
    }

    fn has_prefix(&self, prefixes: &[&str]) -> bool {
        let label = self.0.trim_start();
        prefixes.iter().any(|prefix| label.starts_with(prefix))
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionState {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ConnectionState {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// The yes/no questions the reconciler asks of a connection sample.
pub trait StateFlags {
    fn is_operational(&self) -> bool;
    fn is_printing(&self) -> bool;
    fn is_error(&self) -> bool;
    fn is_offline(&self) -> bool;
    fn is_connecting(&self) -> bool;
}

impl StateFlags for ConnectionState {
    fn is_operational(&self) -> bool {
        ConnectionState::is_operational(self)
    }

    fn is_printing(&self) -> bool {
        ConnectionState::is_printing(self)
    }

    fn is_error(&self) -> bool {
        ConnectionState::is_error(self)
    }

    fn is_offline(&self) -> bool {
        ConnectionState::is_offline(self)
    }

    fn is_connecting(&self) -> bool {
        ConnectionState::is_connecting(self)
    }
}

/// Outcome of classifying one connection sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Idle,
    Printing,
    /// Error or offline: the printer needs a connect command.
    NeedsConnect,
    Connecting,
    Unrecognized,
}

impl Classification {
    /// Mode targeted on the tick that produced this classification.
    ///
    /// `NeedsConnect` stays on the splash screen even when the connect command
    /// succeeds; the following tick observes the new state.
    pub fn mode(self) -> UiMode {
        match self {
            Classification::Idle => UiMode::Idle,
            Classification::Printing => UiMode::Printing,
            Classification::NeedsConnect
            | Classification::Connecting
            | Classification::Unrecognized => UiMode::Splash,
        }
    }
}

/// First match wins: operational, printing, error/offline, connecting.
pub fn classify<S: StateFlags + ?Sized>(state: &S) -> Classification {
    if state.is_operational() {
        Classification::Idle
    } else if state.is_printing() {
        Classification::Printing
    } else if state.is_error() || state.is_offline() {
        Classification::NeedsConnect
    } else if state.is_connecting() {
        Classification::Connecting
    } else {
        Classification::Unrecognized
    }
}
