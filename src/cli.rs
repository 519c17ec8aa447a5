use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::events::{Command, SearchEvent};
use crate::search::ProgressState;
use crate::settings::{SearchMode, SearchSettings};
use crate::tracker::Ranking;
use crate::view::SearchView;
use crate::worker::SearchWorker;
use crate::wordlist::Language;

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Isogram Finder: combine character-disjoint words into long isograms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a newline-delimited word list (defaults to the language's list, then stdin)
    #[arg(short = 'i', long = "input")]
    pub wordlist_path: Option<PathBuf>,

    /// Alphabet used to clean words
    #[arg(short = 'l', long, value_enum, default_value_t = Language::German)]
    pub language: Language,

    /// Minimum combined length of a solution
    #[arg(long, default_value_t = 10)]
    pub min_len: usize,

    /// Maximum combined length (0 = unbounded)
    #[arg(long, default_value_t = 0)]
    pub max_len: usize,

    /// Number of best solutions to keep per ranking (0 = keep all)
    #[arg(short = 'n', long, default_value_t = 10)]
    pub top_n: usize,

    /// Search strategy
    #[arg(short = 'm', long, value_enum, default_value_t = SearchMode::Classic)]
    pub mode: SearchMode,

    /// Number of longest words used as anchors in split mode
    #[arg(long, default_value_t = 40)]
    pub start_size: usize,

    /// Percentage of longest words searched in high-low mode
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub top_percent: u8,

    /// Percentage of shortest words (4+ letters) searched in high-low mode
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub bottom_percent: u8,

    /// Order of the printed results
    #[arg(short = 's', long, value_enum, default_value_t = Ranking::ByScore)]
    pub sort: Ranking,

    /// Cancel the search after this many seconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Print the cleaned, deduplicated word list and exit
    #[arg(long)]
    pub prepare: bool,

    /// Use the interactive terminal interface
    #[arg(long)]
    pub tui: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,
}

impl Cli {
    #[must_use]
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            min_len: self.min_len,
            max_len: self.max_len,
            top_n: self.top_n,
            search_mode: self.mode,
            start_size: self.start_size,
            high_low_top_percent: self.top_percent,
            high_low_bottom_percent: self.bottom_percent,
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Outcome of a plain-terminal search.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Finished,
    TimedOut,
    Failed(String),
}

/// One plain-terminal search invocation.
#[derive(Debug)]
pub struct SearchRequest {
    pub word_list: String,
    pub settings: SearchSettings,
    pub ranking: Ranking,
    pub timeout: Option<Duration>,
}

/// Run one search on `worker` and print progress to `progress_out`, results to `out`.
pub fn run_search<W: Write, E: Write>(
    worker: &SearchWorker,
    events: &Receiver<SearchEvent>,
    request: SearchRequest,
    out: &mut W,
    progress_out: &mut E,
) -> io::Result<RunOutcome> {
    let top_n = request.settings.top_n;
    let mut view = SearchView::new(request.ranking, top_n);
    view.begin(top_n);
    let deadline = request.timeout.map(|t| Instant::now() + t);
    if !worker.send(Command::StartSearch {
        word_list: request.word_list,
        settings: request.settings,
    }) {
        return Ok(RunOutcome::Failed(
            "a search is already running".to_string(),
        ));
    }

    let outcome = loop {
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            worker.send(Command::CancelSearch);
            view.cancelled();
            break RunOutcome::TimedOut;
        }
        match events.recv_timeout(EVENT_POLL_INTERVAL) {
            Ok(event) => {
                if let SearchEvent::Progress(progress) = &event {
                    display_progress(progress_out, progress)?;
                }
                view.apply(event);
                if !view.is_searching {
                    break match view.error.take() {
                        Some(message) => RunOutcome::Failed(message),
                        None => RunOutcome::Finished,
                    };
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                break RunOutcome::Failed("search worker stopped unexpectedly".to_string());
            }
        }
    };

    if outcome != RunOutcome::TimedOut || !view.results.is_empty() {
        display_results(out, &view)?;
    }
    Ok(outcome)
}

pub fn display_progress<W: Write>(out: &mut W, progress: &ProgressState) -> io::Result<()> {
    let longest = progress
        .longest
        .as_ref()
        .map_or_else(|| "-".to_string(), |s| s.text());
    let best = progress
        .best_score
        .as_ref()
        .map_or_else(|| "-".to_string(), |s| format!("{} ({:.2})", s.text(), s.score));
    writeln!(
        out,
        "[{} found, {} scanned] longest: {longest} | best: {best}",
        progress.solutions_found, progress.words_scanned
    )
}

pub fn display_results<W: Write>(out: &mut W, view: &SearchView) -> io::Result<()> {
    let results = view.displayed();
    if results.is_empty() {
        writeln!(out, "No solutions found.")?;
        return Ok(());
    }
    writeln!(out, "Top solutions by {}:", view.ranking.label())?;
    for (i, solution) in results.iter().enumerate() {
        writeln!(out, "{:>3}. {} {}", i + 1, solution.text(), solution)?;
    }
    Ok(())
}

pub fn display_prepared<W: Write>(out: &mut W, words: &[String]) -> io::Result<()> {
    for word in words {
        writeln!(out, "{word}")?;
    }
    Ok(())
}
