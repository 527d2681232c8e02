mod config;
mod panels;
mod surface;
mod systemd;
mod theme;

use anyhow::Result;
use clap::Parser;
use config::{Args, Config};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use panels::Screens;
use printdeck_core::{liveness, AppContext, BackgroundTask, Navigator, Reconciler, READY};
use printdeck_octoprint::OctoPrintClient;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    fs::{File, OpenOptions},
    io,
    path::Path,
    sync::{Arc, Mutex},
};
use surface::{Slot, ViewAction, ViewNode};
use systemd::SystemdNotifier;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

const APP_TITLE: &str = "PrintDeck";

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_logging(&config);
    info!(
        "printdeck_start: endpoint={} api_key_set={} resolution={} poll_interval={:?}",
        config.target.endpoint,
        config.target.has_api_key(),
        config.resolution,
        config.poll_interval
    );

    let client = OctoPrintClient::new(config.target.clone())
        .with_timeout(config.request_timeout)
        .with_connect_options(config.connect.clone());
    let context = AppContext::new(Arc::new(client))
        .with_liveness(Arc::new(SystemdNotifier))
        .with_poll_interval(config.poll_interval);

    let mut navigator = Navigator::new(Slot::default());
    let mut reconciler = Reconciler::new(&context, Box::new(Screens::new()));

    let (tick_tx, mut tick_rx) = mpsc::channel(1);
    let mut poller = BackgroundTask::new(context.poll_interval, move || {
        // A full queue means a tick is already pending; dropping this one is fine.
        let _ = tick_tx.try_send(());
    });

    let mut terminal = setup_terminal()?;
    liveness::signal(&context.liveness, READY);
    poller.start();

    let result = run_app(
        &mut terminal,
        &config,
        &mut navigator,
        &mut reconciler,
        &mut tick_rx,
    )
    .await;
    restore_terminal(&mut terminal)?;

    if let Err(err) = &result {
        eprintln!("printdeck: {err}");
    }
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    config: &Config,
    navigator: &mut Navigator<Slot>,
    reconciler: &mut Reconciler<ViewNode>,
    tick_rx: &mut mpsc::Receiver<()>,
) -> Result<()> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| render_ui(frame, config, navigator, reconciler))?;

        tokio::select! {
            Some(()) = tick_rx.recv() => {
                reconciler.verify_connection(navigator).await;
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if handle_key(key, config, navigator, reconciler) {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => warn!("terminal_event_error: {err}"),
                    None => break,
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the app should quit.
fn handle_key(
    key: KeyEvent,
    config: &Config,
    navigator: &mut Navigator<Slot>,
    reconciler: &Reconciler<ViewNode>,
) -> bool {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return false;
    }
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Esc | KeyCode::Backspace => {
            if navigator.can_go_back() {
                if let Err(err) = navigator.go_back() {
                    warn!("navigation_error: {err}");
                }
            }
            return false;
        }
        _ => {}
    }

    let action = navigator
        .surface()
        .node()
        .map(|node| node.handle_key(key))
        .unwrap_or(ViewAction::None);
    if action == ViewAction::OpenDetails {
        if let Some(parent) = navigator.current().cloned() {
            let details = panels::details_panel(
                parent,
                &config.target,
                reconciler.state(),
                reconciler.mode(),
            );
            navigator.show_panel(details);
        }
    }
    false
}

fn render_ui(
    frame: &mut Frame,
    config: &Config,
    navigator: &Navigator<Slot>,
    reconciler: &Reconciler<ViewNode>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    frame.render_widget(render_header(reconciler), chunks[0]);
    let body = Layout::default()
        .margin(config.resolution.scale_factor())
        .constraints([Constraint::Min(0)])
        .split(chunks[1])[0];
    navigator.surface().render(frame, body);
    frame.render_widget(render_footer(navigator), chunks[2]);
}

fn render_header(reconciler: &Reconciler<ViewNode>) -> Paragraph<'static> {
    let mode = reconciler.mode();
    let state = reconciler
        .state()
        .map(ToString::to_string)
        .unwrap_or_else(|| "no data".to_string());
    let line = Line::from(vec![
        Span::styled(format!(" {APP_TITLE} "), theme::TITLE_STYLE),
        Span::styled(" | ", theme::HINT_STYLE),
        Span::styled(mode.to_string(), theme::mode_style(mode)),
        Span::styled(" | ", theme::HINT_STYLE),
        Span::styled(state, theme::MESSAGE_STYLE),
    ]);
    Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE),
    )
}

fn render_footer(navigator: &Navigator<Slot>) -> Paragraph<'static> {
    let mut hints = vec!["q quit"];
    if navigator.can_go_back() {
        hints.push("esc back");
    } else if navigator.current().is_some_and(|panel| panel.name() != "splash") {
        hints.push("d details");
    }
    Paragraph::new(Line::from(Span::styled(
        format!(" {}", hints.join("  ")),
        theme::HINT_STYLE,
    )))
}

fn init_logging(config: &Config) {
    let level = if config.debug {
        "debug".to_string()
    } else if let Ok(level) = std::env::var("PRINTDECK_LOG_LEVEL") {
        level
    } else {
        "info".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // The terminal belongs to the UI, so logs only go to a file when one is configured.
    let writer = match config.log_file.as_deref().map(open_log_file) {
        Some(Ok(file)) => BoxMakeWriter::new(Mutex::new(file)),
        Some(Err(err)) => {
            eprintln!("log_file_error: {err}");
            BoxMakeWriter::new(io::sink)
        }
        None => BoxMakeWriter::new(io::sink),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
