use crate::surface::{View, ViewAction, ViewNode};
use crate::theme;
use crossterm::event::{KeyCode, KeyEvent};
use printdeck_core::{ConnectionState, ModePanels, Panel, PanelRef, PrinterTarget, UiMode};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

pub const SPLASH_INITIAL_MESSAGE: &str = "Initializing printer...";

/// A panel is a named view plus an optional link back to where it was opened from.
pub struct ScreenPanel {
    name: &'static str,
    view: ViewNode,
    parent: Option<PanelRef<ViewNode>>,
    visible: Cell<bool>,
}

impl ScreenPanel {
    pub fn new(name: &'static str, view: ViewNode, parent: Option<PanelRef<ViewNode>>) -> Self {
        Self {
            name,
            view,
            parent,
            visible: Cell::new(false),
        }
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

impl Panel<ViewNode> for ScreenPanel {
    fn name(&self) -> &str {
        self.name
    }

    fn show(&self) {
        self.visible.set(true);
    }

    fn hide(&self) {
        debug!("panel_hide: {}", self.name);
        self.visible.set(false);
    }

    fn root(&self) -> ViewNode {
        self.view.clone()
    }

    fn parent(&self) -> Option<PanelRef<ViewNode>> {
        self.parent.clone()
    }
}

pub struct SplashView {
    message: RefCell<String>,
}

impl SplashView {
    pub fn new() -> Self {
        Self {
            message: RefCell::new(SPLASH_INITIAL_MESSAGE.to_string()),
        }
    }

    #[cfg(test)]
    pub fn message(&self) -> String {
        self.message.borrow().clone()
    }

    pub fn set_message(&self, text: &str) {
        *self.message.borrow_mut() = text.to_string();
    }
}

impl View for SplashView {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled("PrintDeck", theme::TITLE_STYLE)),
            Line::from(""),
        ];
        for text in self.message.borrow().lines() {
            lines.push(Line::from(Span::styled(text.to_string(), theme::MESSAGE_STYLE)));
        }
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(bordered(" connecting "));
        frame.render_widget(paragraph, area);
    }
}

/// Idle and printing screens: headline plus the state label they were built for.
pub struct StatusView {
    mode: UiMode,
    state: ConnectionState,
}

impl StatusView {
    pub fn new(mode: UiMode, state: ConnectionState) -> Self {
        Self { mode, state }
    }

    fn headline(&self) -> &'static str {
        match self.mode {
            UiMode::Idle => "Printer is ready",
            UiMode::Printing => "Printing a job",
            UiMode::Splash => "Waiting for printer",
        }
    }
}

impl View for StatusView {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.headline(), theme::mode_style(self.mode))),
            Line::from(""),
            Line::from(vec![
                Span::styled("state ", theme::LABEL_STYLE),
                Span::styled(self.state.to_string(), theme::MESSAGE_STYLE),
            ]),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(bordered(self.mode.as_str()));
        frame.render_widget(paragraph, area);
    }

    fn handle_key(&self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Char('d') | KeyCode::Enter => ViewAction::OpenDetails,
            _ => ViewAction::None,
        }
    }
}

/// Connection details sub-screen.
pub struct DetailsView {
    rows: Vec<(&'static str, String)>,
}

impl DetailsView {
    pub fn new(target: &PrinterTarget, state: Option<&ConnectionState>, mode: UiMode) -> Self {
        let state = state
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            rows: vec![
                ("endpoint", target.endpoint.clone()),
                ("api key", key_state(target).to_string()),
                ("state", state),
                ("mode", mode.to_string()),
            ],
        }
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[(&'static str, String)] {
        &self.rows
    }
}

impl View for DetailsView {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .rows
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:>10}  "), theme::LABEL_STYLE),
                    Span::styled(value.clone(), theme::MESSAGE_STYLE),
                ])
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(bordered(" details "));
        frame.render_widget(paragraph, area);
    }
}

fn key_state(target: &PrinterTarget) -> &'static str {
    if target.has_api_key() {
        "set"
    } else {
        "not set"
    }
}

fn bordered(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::BORDER_STYLE)
        .title(Span::styled(title.to_string(), theme::HEADER_STYLE))
}

/// Panels installed by the reconciler. The splash panel lives for the whole
/// process; idle and printing panels are built fresh on each transition.
pub struct Screens {
    splash: Rc<ScreenPanel>,
    splash_view: Rc<SplashView>,
}

impl Screens {
    pub fn new() -> Self {
        let splash_view = Rc::new(SplashView::new());
        let splash = Rc::new(ScreenPanel::new("splash", splash_view.clone(), None));
        Self {
            splash,
            splash_view,
        }
    }

    #[cfg(test)]
    pub fn splash_view(&self) -> Rc<SplashView> {
        self.splash_view.clone()
    }
}

impl Default for Screens {
    fn default() -> Self {
        Self::new()
    }
}

impl ModePanels<ViewNode> for Screens {
    fn splash(&self) -> PanelRef<ViewNode> {
        self.splash.clone()
    }

    fn set_splash_message(&self, text: &str) {
        self.splash_view.set_message(text);
    }

    fn idle(&self, state: &ConnectionState) -> PanelRef<ViewNode> {
        status_panel("idle", UiMode::Idle, state)
    }

    fn printing(&self, state: &ConnectionState) -> PanelRef<ViewNode> {
        status_panel("printing", UiMode::Printing, state)
    }
}

fn status_panel(name: &'static str, mode: UiMode, state: &ConnectionState) -> PanelRef<ViewNode> {
    let view = Rc::new(StatusView::new(mode, state.clone()));
    Rc::new(ScreenPanel::new(name, view, None))
}

pub fn details_panel(
    parent: PanelRef<ViewNode>,
    target: &PrinterTarget,
    state: Option<&ConnectionState>,
    mode: UiMode,
) -> PanelRef<ViewNode> {
    let view = Rc::new(DetailsView::new(target, state, mode));
    Rc::new(ScreenPanel::new("details", view, Some(parent)))
}
