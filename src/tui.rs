//! TUI (Terminal User Interface) for the isogram search
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Architecture
//! - `TuiInterface`: owns the terminal, renders a [`SearchView`] and maps keys to commands
//! - The search itself runs on a [`SearchWorker`]; events are drained between frames
//!
//! # State Machine
//! `Ready` → `Searching` → `Ready` (after done, error or cancel). `Esc`/`q` quits from any state.

use crate::events::{Command, SearchEvent};
use crate::search::{ProgressState, Solution};
use crate::settings::SearchSettings;
use crate::view::SearchView;
use crate::worker::SearchWorker;
use crate::{debug_log, info_log};
use chrono::Local;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiState {
    Ready,
    Searching,
}

#[derive(Debug, PartialEq, Eq)]
enum UserAction {
    Start,
    Cancel,
    ToggleRanking,
    Exit,
}

/// Everything the renderer needs, borrowed for one frame.
struct RenderContext<'a> {
    state: TuiState,
    settings: &'a SearchSettings,
    word_count: usize,
    progress: &'a ProgressState,
    view: &'a SearchView,
    status: &'a str,
}

pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    state: TuiState,
    view: SearchView,
    status: String,
}

impl TuiInterface {
    pub fn new(view: SearchView) -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal backend created");

        Ok(Self {
            terminal,
            state: TuiState::Ready,
            view,
            status: "Ready - press ENTER to search".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    /// Main loop: draw, drain worker events, react to keys.
    pub fn run(
        &mut self,
        worker: &SearchWorker,
        events: &Receiver<SearchEvent>,
        word_list: &str,
        settings: &SearchSettings,
    ) -> Result<(), io::Error> {
        let word_count = word_list.lines().filter(|l| !l.trim().is_empty()).count();
        loop {
            self.drain_events(events);
            self.draw(settings, word_count)?;

            match self.handle_input()? {
                Some(UserAction::Exit) => {
                    if self.state == TuiState::Searching {
                        worker.send(Command::CancelSearch);
                    }
                    return Ok(());
                }
                Some(UserAction::Start) if self.state == TuiState::Ready => {
                    let accepted = worker.send(Command::StartSearch {
                        word_list: word_list.to_string(),
                        settings: settings.clone(),
                    });
                    if accepted {
                        self.view.begin(settings.top_n);
                        self.state = TuiState::Searching;
                        self.status =
                            format!("Searching since {}", Local::now().format("%H:%M:%S"));
                    } else {
                        self.status = "Previous search is still stopping - try again".to_string();
                    }
                }
                Some(UserAction::Cancel) if self.state == TuiState::Searching => {
                    worker.send(Command::CancelSearch);
                    self.view.cancelled();
                    self.state = TuiState::Ready;
                    self.status = "Cancelled - press ENTER to search again".to_string();
                }
                Some(UserAction::ToggleRanking) => self.view.toggle_ranking(),
                Some(action) => {
                    debug_log!("Ignoring {:?} in state {:?}", action, self.state);
                }
                None => {}
            }
        }
    }

    fn drain_events(&mut self, events: &Receiver<SearchEvent>) {
        for event in events.try_iter() {
            self.view.apply(event);
        }
        if self.state == TuiState::Searching && !self.view.is_searching {
            self.state = TuiState::Ready;
            self.status = format!(
                "Finished at {} - press ENTER to search again",
                Local::now().format("%H:%M:%S")
            );
        }
    }

    fn draw(&mut self, settings: &SearchSettings, word_count: usize) -> Result<(), io::Error> {
        let ctx = RenderContext {
            state: self.state,
            settings,
            word_count,
            progress: &self.view.progress,
            view: &self.view,
            status: &self.status,
        };
        self.terminal.draw(|f| Self::render_static(f, &ctx))?;
        Ok(())
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(7), // Progress
                Constraint::Min(8),    // Results
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0]);
        Self::render_progress(f, chunks[1], ctx);
        Self::render_results(f, chunks[2], ctx.view);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_instructions(f, chunks[4], ctx.state);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("ISOGRAM FINDER")
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_progress(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let settings = ctx.settings;
        let max_len = if settings.max_len == 0 {
            "∞".to_string()
        } else {
            settings.max_len.to_string()
        };
        let lines = vec![
            Line::from(format!(
                "{} words | mode {:?} | length {}..{} | top {}",
                ctx.word_count, settings.search_mode, settings.min_len, max_len, settings.top_n
            )),
            Line::from(vec![Span::styled(
                format!(
                    "Solutions found: {}   Words scanned: {}",
                    ctx.progress.solutions_found, ctx.progress.words_scanned
                ),
                INFO_STYLE,
            )]),
            Line::from(format!("Longest: {}", describe(ctx.progress.longest.as_ref()))),
            Line::from(format!(
                "Best score: {}",
                describe(ctx.progress.best_score.as_ref())
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Progress").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_results(f: &mut Frame, area: Rect, view: &SearchView) {
        let mut lines = Vec::new();
        let results = view.displayed();
        for (i, solution) in results.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{:>3}. {}", i + 1, solution.text()), SUCCESS_STYLE),
                Span::raw(format!("  {solution}")),
            ]));
        }
        if results.is_empty() && !view.is_searching {
            lines.push(Line::from("No solutions yet."));
        }
        if let Some(message) = &view.message {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![Span::styled(message.as_str(), MESSAGE_STYLE)]));
        }
        if let Some(error) = &view.error {
            lines.push(Line::from(vec![Span::styled(
                format!("Error: {error}"),
                ERROR_STYLE,
            )]));
        }

        let title = format!("Results by {} (TAB to switch)", view.ranking.label());
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let paragraph = Paragraph::new(status)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: TuiState) {
        let text = match state {
            TuiState::Ready => "ENTER: Start search | TAB: Switch ranking | ESC/Q: Quit",
            TuiState::Searching => "C: Cancel search | TAB: Switch ranking | ESC/Q: Quit",
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn handle_input(&mut self) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(key_action(key)),
            other => {
                debug_log!("handle_input() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }
}

fn key_action(key: KeyEvent) -> Option<UserAction> {
    match key.code {
        KeyCode::Enter => Some(UserAction::Start),
        KeyCode::Char('c' | 'C') => Some(UserAction::Cancel),
        KeyCode::Tab => Some(UserAction::ToggleRanking),
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
        _ => None,
    }
}

fn describe(solution: Option<&Solution>) -> String {
    solution.map_or_else(|| "-".to_string(), ToString::to_string)
}
