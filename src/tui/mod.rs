mod help;
mod state;

use crate::cli::Cli;
use crate::dispatch::{GoalDispatcher, ProcessTransport};
use crate::orchestrator::{self, DispatchEvent, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use state::{Field, SpinField, UiState};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, OnceLock};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli, dispatcher: GoalDispatcher<ProcessTransport>) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<DispatchEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let request = args.goal_request();
    let state = UiState {
        map_input: request.target_map,
        x: SpinField::new(request.target_x),
        y: SpinField::new(request.target_y),
        topic: dispatcher.topic().to_string(),
        message_type: dispatcher.message_type().to_string(),
        info: if args.dry_run {
            "Dry run: goals are built but not published".into()
        } else {
            String::new()
        },
        ..Default::default()
    };

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(state, event_rx, cmd_tx));

    let res =
        orchestrator::run_controller(Arc::new(dispatcher), args.dry_run, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut state: UiState,
    mut event_rx: UnboundedReceiver<DispatchEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            restore_terminal();
            return Err(e).context("create terminal");
        }
    };
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
            dirty = true;
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                dirty = true;
                match (k.modifiers, k.code) {
                    (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::F(1)) => {
                        state.show_help = !state.show_help;
                    }
                    (_, KeyCode::Enter) => {
                        if state.dispatching {
                            state.info = "Still sending the previous goal…".into();
                        } else {
                            let request = state.take_request();
                            // Mark busy now so a second Enter before the controller
                            // replies cannot queue another dispatch.
                            state.dispatching = true;
                            if cmd_tx.send(UiCommand::Send(request)).is_err() {
                                state.dispatching = false;
                                state.info = "Dispatcher stopped".into();
                            }
                        }
                    }
                    (KeyModifiers::CONTROL, KeyCode::Char('y')) => {
                        state.info = match state.preview_payload() {
                            Some(payload) => match copy_to_clipboard(&payload) {
                                Ok(()) => "Payload copied to clipboard".into(),
                                Err(e) => format!("Clipboard failed: {e:#}"),
                            },
                            None => "Nothing to copy: form is incomplete".into(),
                        };
                    }
                    (KeyModifiers::CONTROL, KeyCode::Char('u')) => state.clear_field(),
                    (_, KeyCode::Tab) => state.focus_next(),
                    (_, KeyCode::BackTab) => state.focus_prev(),
                    (_, KeyCode::Up) => {
                        if !state.step(1.0) {
                            state.focus_prev();
                        }
                    }
                    (_, KeyCode::Down) => {
                        if !state.step(-1.0) {
                            state.focus_next();
                        }
                    }
                    (_, KeyCode::PageUp) => {
                        state.step(10.0);
                    }
                    (_, KeyCode::PageDown) => {
                        state.step(-10.0);
                    }
                    (_, KeyCode::Backspace) => state.backspace(),
                    (m, KeyCode::Char(c))
                        if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                    {
                        state.input_char(c);
                    }
                    _ => {}
                }
            }
        }
    };

    restore_terminal();
    res
}

/// Leave raw mode and the alternate screen; safe to call on any exit path.
fn restore_terminal() {
    disable_raw_mode().ok();
    execute!(io::stdout(), LeaveAlternateScreen).ok();
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Title + destination
                Constraint::Length(5), // Goal parameters
                Constraint::Min(0),    // Payload preview or help
                Constraint::Length(4), // Status
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "🚀 Navigate To Goal",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} ({})", state.topic, state.message_type),
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title("nav-goal"));
    f.render_widget(title, chunks[0]);

    draw_form(chunks[1], f, state);

    if state.show_help {
        help::draw_help(chunks[2], f);
    } else {
        draw_preview(chunks[2], f, state);
    }

    draw_status(chunks[3], f, state);
}

fn field_line<'a>(label: &'a str, value: &str, placeholder: &str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![Span::styled(format!("{label:>12} "), label_style)];
    if value.is_empty() && !placeholder.is_empty() {
        spans.push(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(value.to_string()));
    }
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn draw_form(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let lines = vec![
        field_line(
            "Target Map:",
            &state.map_input,
            "e.g. map2",
            state.focus == Field::Map,
        ),
        field_line("Target X:", state.x.text(), "", state.focus == Field::X),
        field_line("Target Y:", state.y.text(), "", state.focus == Field::Y),
    ];
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Goal Parameters"),
    );
    f.render_widget(p, area);
}

fn draw_preview(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let lines: Vec<Line> = match state.preview_payload() {
        Some(payload) => payload.lines().map(|l| Line::from(l.to_string())).collect(),
        None => vec![Line::from(Span::styled(
            "Enter a target map to preview the goal.",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Payload preview"),
    );
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let info_style = if state.dispatching {
        Style::default().fg(Color::Cyan)
    } else if state.last_failed() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let counters = Line::from(vec![
        Span::styled("Sent: ", Style::default().fg(Color::Gray)),
        Span::raw(state.sent_count.to_string()),
        Span::raw("  "),
        Span::styled("Failed: ", Style::default().fg(Color::Gray)),
        Span::raw(state.failed_count.to_string()),
        Span::raw("  "),
        Span::styled(
            "Enter send · Tab next · F1 help · Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let p = Paragraph::new(vec![Line::from(Span::styled(state.info.clone(), info_style)), counters])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Initialize the clipboard manager thread if not already initialized.
/// This creates a background thread that processes clipboard operations sequentially,
/// keeping each clipboard instance alive for a sufficient duration.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        // Linux clipboards are served by the owner; stay alive long
                        // enough for a clipboard manager to take over.
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the clipboard thread without blocking the UI.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
