use std::io;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;

use psdeck_core::actions::{RuntimeAction, SessionAction, UserAction};
use psdeck_core::catalog::{CatalogStatus, ParameterKind};
use psdeck_core::params::validate;
use psdeck_core::state::{Screen, SessionState};

use crate::runtime::Runtime;

const TITLE: &str = "PowerShell Script Executor v2.0";
const BLINK_INTERVAL: Duration = Duration::from_millis(530);
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            crossterm::cursor::Show
        );
    }
}

pub fn run(mut runtime: Runtime) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        crossterm::cursor::Hide
    )?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    runtime.apply(SessionAction::Runtime(RuntimeAction::SessionStarted));
    run_app(&mut terminal, &mut runtime)
}

/// Presentation-only state that never reaches the reducer.
struct Chrome {
    cursor_visible: bool,
    last_blink: Instant,
    notice: Option<String>,
    results_scroll: u16,
    /// Wrapped rows scrolled back from the newest terminal output.
    terminal_scroll: u16,
    executing_since: Option<Instant>,
}

impl Chrome {
    fn new() -> Self {
        Self {
            cursor_visible: true,
            last_blink: Instant::now(),
            notice: None,
            results_scroll: 0,
            terminal_scroll: 0,
            executing_since: None,
        }
    }

    fn cursor(&self) -> &'static str {
        if self.cursor_visible {
            "█"
        } else {
            " "
        }
    }

    fn spinner(&self) -> &'static str {
        let elapsed = self
            .executing_since
            .map(|since| since.elapsed().as_millis())
            .unwrap_or_default();
        SPINNER[(elapsed / 100) as usize % SPINNER.len()]
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, runtime: &mut Runtime) -> io::Result<()> {
    let mut chrome = Chrome::new();
    let mut redraw = true;

    loop {
        redraw |= runtime.drain();

        if chrome.last_blink.elapsed() >= BLINK_INTERVAL {
            chrome.cursor_visible = !chrome.cursor_visible;
            chrome.last_blink = Instant::now();
            redraw = true;
        }
        match (runtime.state.screen, chrome.executing_since) {
            (Screen::Executing, None) => chrome.executing_since = Some(Instant::now()),
            (Screen::Executing, Some(_)) => redraw = true,
            (_, Some(_)) => chrome.executing_since = None,
            _ => {}
        }

        if redraw {
            terminal.draw(|f| ui(f, &runtime.state, &chrome))?;
            redraw = false;
        }

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match handle_key_event(key, &runtime.state, &mut chrome) {
                        KeyHandlerResult::Continue(actions) => {
                            for action in actions {
                                redraw |= runtime.apply(SessionAction::User(action));
                            }
                        }
                        KeyHandlerResult::Redraw => redraw = true,
                        KeyHandlerResult::Exit => return Ok(()),
                    }
                }
                Event::Paste(text) => {
                    for action in paste_actions(&runtime.state, text) {
                        redraw |= runtime.apply(SessionAction::User(action));
                    }
                }
                Event::Resize(_, _) => redraw = true,
                _ => {}
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum KeyHandlerResult {
    Continue(Vec<UserAction>),
    Redraw,
    Exit,
}

fn handle_key_event(key: KeyEvent, state: &SessionState, chrome: &mut Chrome) -> KeyHandlerResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }
    match state.screen {
        Screen::Catalog => handle_catalog_keys(key),
        Screen::ScriptDetail => handle_detail_keys(key, state, chrome),
        Screen::Executing => handle_executing_keys(key),
        Screen::Results => handle_results_keys(key, chrome),
        Screen::Terminal => handle_terminal_keys(key, state, chrome),
    }
}

fn handle_catalog_keys(key: KeyEvent) -> KeyHandlerResult {
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyHandlerResult::Exit,
        KeyCode::Up | KeyCode::Char('k') => UserAction::CatalogMoveUp,
        KeyCode::Down | KeyCode::Char('j') => UserAction::CatalogMoveDown,
        KeyCode::Enter => UserAction::SelectHighlighted,
        KeyCode::Char('t') | KeyCode::Char('T') => UserAction::OpenTerminal,
        KeyCode::Char('r') | KeyCode::Char('R') => UserAction::RefreshCatalog,
        KeyCode::Char(digit @ '1'..='9') => {
            UserAction::SelectScript(digit as usize - '1' as usize)
        }
        _ => return KeyHandlerResult::Continue(Vec::new()),
    };
    KeyHandlerResult::Continue(vec![action])
}

fn handle_detail_keys(key: KeyEvent, state: &SessionState, chrome: &mut Chrome) -> KeyHandlerResult {
    let focused_kind = state
        .selection
        .as_ref()
        .and_then(|selection| selection.focused_parameter())
        .map(|param| param.kind);

    let action = match key.code {
        KeyCode::Esc => {
            chrome.notice = None;
            UserAction::Back
        }
        KeyCode::Tab | KeyCode::Down => UserAction::FocusNextParameter,
        KeyCode::BackTab | KeyCode::Up => UserAction::FocusPrevParameter,
        KeyCode::Backspace => UserAction::ParameterBackspace,
        KeyCode::Enter => {
            let Some(script) = state.selected_script() else {
                return KeyHandlerResult::Continue(Vec::new());
            };
            let issues = validate(script, &state.params.snapshot());
            if !issues.is_empty() {
                let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
                chrome.notice = Some(messages.join("; "));
                return KeyHandlerResult::Redraw;
            }
            chrome.notice = None;
            chrome.results_scroll = 0;
            UserAction::Execute
        }
        KeyCode::Char(' ') if focused_kind == Some(ParameterKind::Flag) => UserAction::ToggleSwitch,
        KeyCode::Char(_) if focused_kind == Some(ParameterKind::Flag) => {
            return KeyHandlerResult::Continue(Vec::new());
        }
        KeyCode::Char(ch) => UserAction::ParameterInput(ch),
        _ => return KeyHandlerResult::Continue(Vec::new()),
    };
    KeyHandlerResult::Continue(vec![action])
}

fn handle_executing_keys(key: KeyEvent) -> KeyHandlerResult {
    match key.code {
        KeyCode::Esc => KeyHandlerResult::Continue(vec![UserAction::Back]),
        _ => KeyHandlerResult::Continue(Vec::new()),
    }
}

fn handle_results_keys(key: KeyEvent, chrome: &mut Chrome) -> KeyHandlerResult {
    match key.code {
        KeyCode::Char('q') => KeyHandlerResult::Exit,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('b') => {
            chrome.results_scroll = 0;
            KeyHandlerResult::Continue(vec![UserAction::Back])
        }
        KeyCode::Up => {
            chrome.results_scroll = chrome.results_scroll.saturating_sub(1);
            KeyHandlerResult::Redraw
        }
        KeyCode::Down => {
            chrome.results_scroll = chrome.results_scroll.saturating_add(1);
            KeyHandlerResult::Redraw
        }
        KeyCode::PageUp => {
            chrome.results_scroll = chrome.results_scroll.saturating_sub(10);
            KeyHandlerResult::Redraw
        }
        KeyCode::PageDown => {
            chrome.results_scroll = chrome.results_scroll.saturating_add(10);
            KeyHandlerResult::Redraw
        }
        _ => KeyHandlerResult::Continue(Vec::new()),
    }
}

fn handle_terminal_keys(key: KeyEvent, state: &SessionState, chrome: &mut Chrome) -> KeyHandlerResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::PageUp => {
            chrome.terminal_scroll = chrome.terminal_scroll.saturating_add(10);
            return KeyHandlerResult::Redraw;
        }
        KeyCode::PageDown => {
            chrome.terminal_scroll = chrome.terminal_scroll.saturating_sub(10);
            return KeyHandlerResult::Redraw;
        }
        _ => {}
    }
    let action = match key.code {
        KeyCode::Char('l') if ctrl => UserAction::ClearHistory,
        KeyCode::Esc if state.terminal.input.is_empty() => UserAction::Back,
        KeyCode::Esc => UserAction::ClearCommandInput,
        KeyCode::Enter => UserAction::SubmitCommand,
        KeyCode::Up => UserAction::RecallPrevious,
        KeyCode::Down => UserAction::RecallNext,
        KeyCode::Backspace => UserAction::CommandBackspace,
        KeyCode::Char(ch) if !ctrl => UserAction::CommandInput(ch),
        _ => return KeyHandlerResult::Continue(Vec::new()),
    };
    if matches!(
        action,
        UserAction::SubmitCommand | UserAction::ClearHistory | UserAction::Back
    ) {
        chrome.terminal_scroll = 0;
    }
    KeyHandlerResult::Continue(vec![action])
}

fn paste_actions(state: &SessionState, text: String) -> Vec<UserAction> {
    match state.screen {
        Screen::Terminal => vec![UserAction::CommandPaste(text)],
        Screen::ScriptDetail => text
            .chars()
            .filter(|ch| !ch.is_control())
            .map(UserAction::ParameterInput)
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    accent_alt: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    selected_bg: Color,
}

const PALETTE: UiPalette = UiPalette {
    accent: Color::LightGreen,
    accent_alt: Color::Green,
    success: Color::LightGreen,
    warning: Color::Yellow,
    danger: Color::LightRed,
    muted: Color::DarkGray,
    border: Color::Green,
    selected_bg: Color::Rgb(8, 32, 10),
};

fn panel(title: impl Into<String>, palette: UiPalette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(
            format!(" {} ", title.into()),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
}

fn ui(f: &mut ratatui::Frame, state: &SessionState, chrome: &Chrome) {
    let palette = PALETTE;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0], state, palette);
    match state.screen {
        Screen::Catalog => render_catalog(f, chunks[1], state, palette),
        Screen::ScriptDetail => render_detail(f, chunks[1], state, chrome, palette),
        Screen::Executing => render_executing(f, chunks[1], state, chrome, palette),
        Screen::Results => render_results(f, chunks[1], state, chrome, palette),
        Screen::Terminal => render_terminal(f, chunks[1], state, chrome, palette),
    }
    render_key_hints(f, chunks[2], state, palette);
}

fn render_header(f: &mut ratatui::Frame, area: Rect, state: &SessionState, palette: UiPalette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let left = Line::from(vec![
        Span::styled(
            TITLE,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{}]", state.screen.label()),
            Style::default().fg(palette.accent_alt),
        ),
    ]);
    f.render_widget(Paragraph::new(left), inner);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(now, Style::default().fg(palette.muted))))
            .alignment(Alignment::Right),
        inner,
    );
}

fn render_catalog(f: &mut ratatui::Frame, area: Rect, state: &SessionState, palette: UiPalette) {
    let block = panel("AVAILABLE SCRIPTS", palette);
    match &state.catalog.status {
        CatalogStatus::Loading => {
            let text = Paragraph::new(Line::from(Span::styled(
                "Loading scripts...",
                Style::default().fg(palette.warning),
            )))
            .block(block);
            f.render_widget(text, area);
        }
        CatalogStatus::Unavailable(err) => {
            let lines = vec![
                Line::from(Span::styled(
                    "CONNECTION ERROR",
                    Style::default()
                        .fg(palette.danger)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(err.cause.to_string()),
                Line::from(""),
                Line::from(Span::styled(
                    "Press R to retry.",
                    Style::default().fg(palette.warning),
                )),
            ];
            f.render_widget(
                Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
                area,
            );
        }
        CatalogStatus::Ready if state.catalog.scripts.is_empty() => {
            let text = Paragraph::new(Line::from(Span::styled(
                "No PowerShell scripts found",
                Style::default().fg(palette.muted),
            )))
            .block(block);
            f.render_widget(text, area);
        }
        CatalogStatus::Ready => {
            let items: Vec<ListItem> = state
                .catalog
                .scripts
                .iter()
                .enumerate()
                .map(|(idx, script)| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(
                                format!("{}. ", idx + 1),
                                Style::default().fg(palette.muted),
                            ),
                            Span::styled(
                                script.name.clone(),
                                Style::default().fg(palette.accent),
                            ),
                            Span::styled(
                                format!("  ({} params)", script.parameters.len()),
                                Style::default().fg(palette.muted),
                            ),
                        ]),
                        Line::from(Span::raw(format!("   {}", script.description))),
                    ])
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .bg(palette.selected_bg)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");
            let mut list_state = ListState::default();
            list_state.select(Some(state.catalog.highlighted));
            f.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn render_detail(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &SessionState,
    chrome: &Chrome,
    palette: UiPalette,
) {
    let Some(selection) = state.selection.as_ref() else {
        return;
    };
    let script = &selection.script;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let summary = Paragraph::new(vec![
        Line::from(Span::styled(
            script.name.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(script.description.clone()),
    ])
    .block(panel("SCRIPT", palette))
    .wrap(Wrap { trim: true });
    f.render_widget(summary, chunks[0]);

    let mut lines = Vec::new();
    if script.parameters.is_empty() {
        lines.push(Line::from(Span::styled(
            "This script takes no parameters.",
            Style::default().fg(palette.muted),
        )));
    }
    for (idx, param) in script.parameters.iter().enumerate() {
        let focused = idx == selection.focused;
        let marker = if focused { "> " } else { "  " };
        let mut header = vec![
            Span::styled(marker, Style::default().fg(palette.accent)),
            Span::styled(
                param.name.clone(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" <{}>", param.kind.wire_tag()),
                Style::default().fg(palette.muted),
            ),
        ];
        if param.mandatory {
            header.push(Span::styled(" *", Style::default().fg(palette.danger)));
        }
        if !param.description.is_empty() {
            header.push(Span::styled(
                format!("  {}", param.description),
                Style::default().fg(palette.muted),
            ));
        }
        lines.push(Line::from(header));

        let value = state.params.get(&param.name);
        let value_line = match param.kind {
            ParameterKind::Flag => {
                let checked = value.is_some_and(|value| value.is_enabled());
                let mark = if checked { "[x]" } else { "[ ]" };
                Line::from(Span::raw(format!("    {mark} space to toggle")))
            }
            ParameterKind::Text | ParameterKind::Integer => {
                let text = value.map(|value| value.as_input_text()).unwrap_or_default();
                let mut spans = vec![Span::raw(format!("    {text}"))];
                if focused {
                    spans.push(Span::styled(chrome.cursor(), Style::default().fg(palette.accent)));
                }
                if text.is_empty() {
                    if let Some(default) = &param.default_value {
                        spans.push(Span::styled(
                            format!(" (default: {default})"),
                            Style::default().fg(palette.muted),
                        ));
                    }
                }
                Line::from(spans)
            }
        };
        let value_line = if focused {
            value_line.style(Style::default().bg(palette.selected_bg))
        } else {
            value_line
        };
        lines.push(value_line);
    }
    f.render_widget(
        Paragraph::new(lines).block(panel("PARAMETERS", palette)),
        chunks[1],
    );

    let notice = match &chrome.notice {
        Some(message) => Line::from(Span::styled(
            format!("[ERROR] {message}"),
            Style::default().fg(palette.danger),
        )),
        None => Line::from(Span::styled(
            "Press Enter to execute.",
            Style::default().fg(palette.muted),
        )),
    };
    f.render_widget(
        Paragraph::new(notice)
            .block(panel("STATUS", palette))
            .wrap(Wrap { trim: true }),
        chunks[2],
    );
}

fn render_executing(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &SessionState,
    chrome: &Chrome,
    palette: UiPalette,
) {
    let name = state
        .selected_script()
        .map(|script| script.name.as_str())
        .unwrap_or_default();
    let elapsed = chrome
        .executing_since
        .map(|since| since.elapsed().as_secs_f32())
        .unwrap_or_default();
    let popup = centered_rect(60, 40, area);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} EXECUTING {name}", chrome.spinner()),
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Elapsed: {elapsed:.1}s"),
            Style::default().fg(palette.muted),
        )),
    ];
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(panel("PLEASE WAIT", palette)),
        popup,
    );
}

fn render_results(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &SessionState,
    chrome: &Chrome,
    palette: UiPalette,
) {
    let Some(results) = state.results.as_ref() else {
        return;
    };
    let outcome = &results.outcome;
    let (status, color) = if outcome.success {
        ("SUCCESS", palette.success)
    } else {
        ("FAILED", palette.danger)
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Status: "),
            Span::styled(
                status,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];
    let body_style = if outcome.success {
        Style::default()
    } else {
        Style::default().fg(palette.danger)
    };
    for line in outcome.render_script().lines() {
        lines.push(Line::from(Span::styled(line.to_string(), body_style)));
    }
    if let Some(duration) = outcome.duration_label() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            duration,
            Style::default().fg(palette.muted),
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .block(panel(format!("RESULTS: {}", results.script_name), palette))
            .wrap(Wrap { trim: false })
            .scroll((chrome.results_scroll, 0)),
        area,
    );
}

fn render_terminal(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &SessionState,
    chrome: &Chrome,
    palette: UiPalette,
) {
    let prompt = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    if state.terminal.ledger.is_empty() {
        lines.push(Line::from(Span::styled(
            "Type a PowerShell command and press Enter.",
            Style::default().fg(palette.muted),
        )));
        lines.push(Line::from(""));
    }
    for entry in state.terminal.ledger.entries() {
        lines.push(Line::from(vec![
            Span::styled("PS> ", prompt),
            Span::raw(entry.command.clone()),
        ]));
        match &entry.outcome {
            None => lines.push(Line::from(Span::styled(
                format!("{} running...", chrome.spinner()),
                Style::default().fg(palette.warning),
            ))),
            Some(outcome) => {
                let style = if outcome.success {
                    Style::default()
                } else {
                    Style::default().fg(palette.danger)
                };
                for line in outcome.render_command().lines() {
                    lines.push(Line::from(Span::styled(line.to_string(), style)));
                }
                if let Some(duration) = outcome.duration_label() {
                    lines.push(Line::from(Span::styled(
                        duration,
                        Style::default().fg(palette.muted),
                    )));
                }
            }
        }
        lines.push(Line::from(""));
    }

    let input_line = if state.terminal_busy() {
        Line::from(vec![
            Span::styled("PS> ", prompt),
            Span::styled("(waiting for command)", Style::default().fg(palette.muted)),
        ])
    } else {
        Line::from(vec![
            Span::styled("PS> ", prompt),
            Span::raw(state.terminal.input.clone()),
            Span::styled(chrome.cursor(), Style::default().fg(palette.accent)),
        ])
    };
    lines.push(input_line);

    let block = panel("POWERSHELL TERMINAL", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let newest = paragraph
        .line_count(inner.width)
        .saturating_sub(inner.height as usize);
    let offset = newest.saturating_sub(chrome.terminal_scroll as usize);
    f.render_widget(
        paragraph.scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0)),
        inner,
    );
}

fn render_key_hints(f: &mut ratatui::Frame, area: Rect, state: &SessionState, palette: UiPalette) {
    let hints = match state.screen {
        Screen::Catalog => match state.catalog.status {
            CatalogStatus::Ready => "↑/↓ move  Enter select  1-9 pick  T terminal  R refresh  Q quit",
            _ => "R retry  T terminal  Q quit",
        },
        Screen::ScriptDetail => "Tab/↑/↓ field  Space toggle  Enter execute  Esc back",
        Screen::Executing => "Esc abandon and go back",
        Screen::Results => "↑/↓ scroll  Enter/Esc back  Q quit",
        Screen::Terminal => "Enter run  ↑/↓ history  PgUp/PgDn scroll  Esc clear/back  Ctrl+L clear",
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hints,
            Style::default().fg(palette.muted),
        ))),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    use super::*;
    use psdeck_core::catalog::CatalogUnavailable;
    use psdeck_core::outcome::RunOutcome;
    use psdeck_core::reducer::reduce;
    use psdeck_core::state::SessionSettings;
    use psdeck_exec::simulated_catalog;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded() -> SessionState {
        let mut state = SessionState::new(SessionSettings::default());
        let request_id = state.catalog.begin_fetch();
        reduce(
            &mut state,
            SessionAction::Runtime(RuntimeAction::CatalogLoaded {
                request_id,
                result: Ok(simulated_catalog()),
            }),
        );
        state
    }

    fn screen_text(state: &SessionState) -> String {
        screen_text_with(state, &Chrome::new())
    }

    fn screen_text_with(state: &SessionState, chrome: &Chrome) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|f| ui(f, state, chrome)).expect("draw");
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn detail_enter_is_blocked_by_missing_mandatory_value() {
        let mut state = loaded();
        reduce(&mut state, SessionAction::User(UserAction::SelectScript(1)));
        let mut chrome = Chrome::new();

        let result = handle_key_event(key(KeyCode::Enter), &state, &mut chrome);
        assert_eq!(result, KeyHandlerResult::Redraw);
        assert_eq!(
            chrome.notice.as_deref(),
            Some("parameter `Path` is mandatory")
        );
    }

    #[test]
    fn space_toggles_only_switch_parameters() {
        let mut state = loaded();
        reduce(&mut state, SessionAction::User(UserAction::SelectScript(0)));
        let mut chrome = Chrome::new();

        assert_eq!(
            handle_key_event(key(KeyCode::Char(' ')), &state, &mut chrome),
            KeyHandlerResult::Continue(vec![UserAction::ParameterInput(' ')])
        );
        reduce(&mut state, SessionAction::User(UserAction::FocusNextParameter));
        assert_eq!(
            handle_key_event(key(KeyCode::Char(' ')), &state, &mut chrome),
            KeyHandlerResult::Continue(vec![UserAction::ToggleSwitch])
        );
    }

    #[test]
    fn terminal_escape_clears_input_before_leaving() {
        let mut state = loaded();
        reduce(&mut state, SessionAction::User(UserAction::OpenTerminal));
        let mut chrome = Chrome::new();

        assert_eq!(
            handle_key_event(key(KeyCode::Esc), &state, &mut chrome),
            KeyHandlerResult::Continue(vec![UserAction::Back])
        );
        reduce(&mut state, SessionAction::User(UserAction::CommandInput('x')));
        assert_eq!(
            handle_key_event(key(KeyCode::Esc), &state, &mut chrome),
            KeyHandlerResult::Continue(vec![UserAction::ClearCommandInput])
        );
        assert_eq!(
            handle_key_event(
                KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL),
                &state,
                &mut chrome
            ),
            KeyHandlerResult::Continue(vec![UserAction::ClearHistory])
        );
    }

    fn terminal_with_history(outputs: &[String]) -> SessionState {
        let mut state = loaded();
        reduce(&mut state, SessionAction::User(UserAction::OpenTerminal));
        for (index, output) in outputs.iter().enumerate() {
            let entry = state.terminal.ledger.append(format!("Invoke-Step{index}"));
            state
                .terminal
                .ledger
                .resolve(entry, RunOutcome::succeeded(output.clone(), None));
        }
        state
    }

    #[test]
    fn long_terminal_output_wraps_instead_of_being_cut() {
        let output = format!("{}END_OF_LINE", "x".repeat(150));
        let state = terminal_with_history(&[output]);

        let text = screen_text(&state);
        assert!(text.contains("END_OF_LINE"));
    }

    #[test]
    fn page_up_reaches_older_terminal_entries() {
        let outputs: Vec<String> = (0..40).map(|index| format!("output {index}")).collect();
        let state = terminal_with_history(&outputs);
        let mut chrome = Chrome::new();

        let text = screen_text_with(&state, &chrome);
        assert!(text.contains("Invoke-Step39"));
        assert!(!text.contains("Invoke-Step0 "));

        for _ in 0..20 {
            assert_eq!(
                handle_key_event(key(KeyCode::PageUp), &state, &mut chrome),
                KeyHandlerResult::Redraw
            );
        }
        let text = screen_text_with(&state, &chrome);
        assert!(text.contains("Invoke-Step0 "));
        assert!(!text.contains("Invoke-Step39"));

        handle_key_event(key(KeyCode::Enter), &state, &mut chrome);
        assert_eq!(chrome.terminal_scroll, 0);
    }

    #[test]
    fn catalog_digits_select_by_position() {
        let state = loaded();
        let mut chrome = Chrome::new();
        assert_eq!(
            handle_key_event(key(KeyCode::Char('3')), &state, &mut chrome),
            KeyHandlerResult::Continue(vec![UserAction::SelectScript(2)])
        );
    }

    #[test]
    fn catalog_lists_scripts_under_the_title() {
        let text = screen_text(&loaded());
        assert!(text.contains(TITLE));
        assert!(text.contains("Get-SystemInfo.ps1"));
        assert!(text.contains("Clear-TempFiles.ps1"));
    }

    #[test]
    fn unavailable_catalog_shows_connection_error() {
        let mut state = SessionState::new(SessionSettings::default());
        let request_id = state.catalog.begin_fetch();
        state
            .catalog
            .finish_fetch(request_id, Err(CatalogUnavailable::new("connection refused")));

        let text = screen_text(&state);
        assert!(text.contains("CONNECTION ERROR"));
        assert!(text.contains("connection refused"));
        assert!(text.contains("Press R to retry."));
    }

    #[test]
    fn empty_catalog_has_its_own_message() {
        let mut state = SessionState::new(SessionSettings::default());
        let request_id = state.catalog.begin_fetch();
        state.catalog.finish_fetch(request_id, Ok(Vec::new()));
        assert!(screen_text(&state).contains("No PowerShell scripts found"));
    }
}
