//! Session controller: at most one search at a time, reset per invocation.
//!
//! # State Machine
//! `Idle` → `Searching` → one of `Done`, `Cancelled`, `Errored` → `Idle`. The terminal
//! state of the last run stays readable through [`Session::last_outcome`].
//!
//! The search slot is claimed with a [`SearchTicket`] before the run starts, so a cancel
//! issued between accepting a search and running it still applies.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::SearchError;
use crate::events::{EventSink, SearchEvent};
use crate::modes::run_mode;
use crate::search::{CancelToken, ProgressState, SearchRun, SearchState, Solution};
use crate::settings::SearchSettings;
use crate::throttle::{Clock, SystemClock};
use crate::wordlist::{Language, parse_entries};
use crate::{debug_log, info_log};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Searching,
    Done,
    Cancelled,
    Errored,
}

#[derive(Debug, Default)]
struct Control {
    searching: bool,
    cancel: CancelToken,
}

#[derive(Debug, Default)]
struct Shared {
    control: Mutex<Control>,
}

impl Shared {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable control handle for a [`Session`], usable from an event sink or another thread.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    /// True from a successful [`SessionHandle::try_claim`] until that search has ended.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.shared.control().searching
    }

    /// Reserve the session's search slot.
    ///
    /// Returns `None` when a search is already pending or running. Each ticket carries a
    /// fresh cancel token.
    #[must_use]
    pub fn try_claim(&self) -> Option<SearchTicket> {
        let mut control = self.shared.control();
        if control.searching {
            return None;
        }
        control.searching = true;
        control.cancel = CancelToken::new();
        Some(SearchTicket {
            shared: Arc::clone(&self.shared),
            cancel: control.cancel.clone(),
            released: false,
        })
    }

    /// Request cancellation of the pending or running search. No-op when there is none.
    pub fn cancel_search(&self) {
        let control = self.shared.control();
        if control.searching {
            info_log!("Cancellation requested");
            control.cancel.cancel();
        }
    }
}

/// Claim on a session's single search slot. Dropping an unused ticket frees the slot.
#[derive(Debug)]
pub struct SearchTicket {
    shared: Arc<Shared>,
    cancel: CancelToken,
    released: bool,
}

impl SearchTicket {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Free the slot and report whether the claimed search was cancelled before that.
    fn release(&mut self) -> bool {
        let mut control = self.shared.control();
        control.searching = false;
        self.released = true;
        self.cancel.is_cancelled()
    }
}

impl Drop for SearchTicket {
    fn drop(&mut self) {
        if !self.released {
            self.release();
        }
    }
}

pub struct Session {
    shared: Arc<Shared>,
    clock: Arc<dyn Clock>,
    language: Language,
    state: SessionState,
    last_outcome: Option<SessionState>,
    search: Option<SearchState>,
    results: Vec<Solution>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            clock,
            language: Language::default(),
            state: SessionState::Idle,
            last_outcome: None,
            search: None,
            results: Vec::new(),
        }
    }

    /// Alphabet used to clean the word list of subsequent searches.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Terminal state of the most recent run: `Done`, `Cancelled` or `Errored`.
    #[must_use]
    pub fn last_outcome(&self) -> Option<SessionState> {
        self.last_outcome
    }

    /// Progress of the current or most recent search.
    #[must_use]
    pub fn progress(&self) -> Option<&ProgressState> {
        self.search.as_ref().map(|s| &s.progress)
    }

    /// Final results of the most recent completed search.
    #[must_use]
    pub fn results(&self) -> &[Solution] {
        &self.results
    }

    pub fn cancel_search(&self) {
        self.handle().cancel_search();
    }

    /// Run one search to completion, cancellation or error.
    ///
    /// Returns `None` without doing anything when a search is already pending or running,
    /// otherwise the terminal state reached.
    pub fn start_search(
        &mut self,
        word_list: &str,
        settings: &SearchSettings,
        sink: &mut dyn EventSink,
    ) -> Option<SessionState> {
        let Some(ticket) = self.handle().try_claim() else {
            debug_log!("start_search ignored: a search is already running");
            return None;
        };
        Some(self.run_claimed(ticket, word_list, settings, sink))
    }

    /// Run a search whose slot was reserved with [`SessionHandle::try_claim`].
    ///
    /// A ticket cancelled before this call produces `Cancelled` without searching.
    pub fn run_claimed(
        &mut self,
        mut ticket: SearchTicket,
        word_list: &str,
        settings: &SearchSettings,
        sink: &mut dyn EventSink,
    ) -> SessionState {
        debug_assert!(Arc::ptr_eq(&ticket.shared, &self.shared));
        self.state = SessionState::Searching;
        self.last_outcome = None;
        self.results.clear();
        self.search = Some(SearchState::new(settings.top_n, self.clock.as_ref()));

        let outcome = if ticket.is_cancelled() {
            debug_log!("Skipping search cancelled before it started");
            Ok(())
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| {
                self.perform_search(word_list, settings, &ticket.cancel, &mut *sink)
            }))
            .unwrap_or_else(|payload| {
                Err(SearchError::Panicked {
                    message: panic_message(payload.as_ref()),
                })
            })
        };

        // Released before the terminal event so a receiver may start the next search at once.
        let cancelled = ticket.release();
        let (terminal, event) = if cancelled {
            info_log!("Search cancelled");
            if let Err(e) = outcome {
                log::debug!("Error after cancellation ignored: {e}");
            }
            self.results.clear();
            (SessionState::Cancelled, None)
        } else {
            match outcome {
                Ok(()) => {
                    info_log!("Search finished with {} results", self.results.len());
                    (
                        SessionState::Done,
                        Some(SearchEvent::Done(self.results.clone())),
                    )
                }
                Err(e) => {
                    log::error!("Search failed: {e}");
                    (
                        SessionState::Errored,
                        Some(SearchEvent::Error {
                            message: e.to_string(),
                        }),
                    )
                }
            }
        };

        self.last_outcome = Some(terminal);
        self.state = SessionState::Idle;
        if let Some(event) = event {
            sink.emit(event);
        }
        terminal
    }

    fn perform_search(
        &mut self,
        word_list: &str,
        settings: &SearchSettings,
        cancel: &CancelToken,
        sink: &mut dyn EventSink,
    ) -> Result<(), SearchError> {
        settings.validate()?;

        let entries = parse_entries(word_list, self.language);
        info_log!(
            "Searching {} unique isograms in {:?} mode",
            entries.len(),
            settings.search_mode
        );

        let Some(state) = self.search.as_mut() else {
            return Ok(());
        };
        let mut run = SearchRun::new(settings, state, self.clock.as_ref(), cancel, sink);
        run_mode(&entries, &mut run);

        if !cancel.is_cancelled() {
            if settings.top_n == 0 {
                state.by_score.finish();
            }
            self.results = state.merged();
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SearchMode;
    use crate::throttle::ManualClock;
    use std::time::Duration;

    fn settings(min_len: usize) -> SearchSettings {
        SearchSettings {
            min_len,
            max_len: 0,
            top_n: 10,
            search_mode: SearchMode::Classic,
            ..SearchSettings::default()
        }
    }

    /// Cancels the search at the first progress event it sees.
    struct CancelOnProgress {
        handle: SessionHandle,
        events: Vec<SearchEvent>,
    }

    impl EventSink for CancelOnProgress {
        fn emit(&mut self, event: SearchEvent) {
            if matches!(event, SearchEvent::Progress(_)) {
                self.handle.cancel_search();
            }
            self.events.push(event);
        }
    }

    /// Tries to start a nested search from inside a running one.
    struct Reentrant {
        handle: SessionHandle,
        saw_running: bool,
    }

    impl EventSink for Reentrant {
        fn emit(&mut self, _event: SearchEvent) {
            self.saw_running |= self.handle.is_searching();
        }
    }

    #[test]
    fn test_done_event_and_state() {
        let mut session = Session::with_clock(Arc::new(ManualClock::new()));
        let mut events: Vec<SearchEvent> = Vec::new();
        let state = session.start_search("wuchs\nbild\nform", &settings(9), &mut events);
        assert_eq!(state, Some(SessionState::Done));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.last_outcome(), Some(SessionState::Done));
        assert_eq!(session.results().len(), 3);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], SearchEvent::Done(r) if r.len() == 3));
        assert!(!session.handle().is_searching());
    }

    #[test]
    fn test_invalid_settings_emit_single_error() {
        let mut session = Session::with_clock(Arc::new(ManualClock::new()));
        let mut events: Vec<SearchEvent> = Vec::new();
        let bad = SearchSettings {
            high_low_top_percent: 150,
            ..settings(0)
        };
        let state = session.start_search("wuchs", &bad, &mut events);
        assert_eq!(state, Some(SessionState::Errored));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.last_outcome(), Some(SessionState::Errored));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], SearchEvent::Error { message } if message.contains("150")));

        // The session accepts a new search after an error.
        let state = session.start_search("wuchs", &settings(0), &mut events);
        assert_eq!(state, Some(SessionState::Done));
    }

    #[test]
    fn test_cancel_stops_all_further_events() {
        let clock = Arc::new(ManualClock::stepping(Duration::from_millis(150)));
        let mut session = Session::with_clock(clock);
        let mut sink = CancelOnProgress {
            handle: session.handle(),
            events: Vec::new(),
        };
        let words = "abcdef\nghijk\nlmno\npqrs\ntuv\nwxy\nz";
        let state = session.start_search(words, &settings(0), &mut sink);
        assert_eq!(state, Some(SessionState::Cancelled));
        assert_eq!(session.last_outcome(), Some(SessionState::Cancelled));
        assert_eq!(sink.events.len(), 1);
        assert!(matches!(sink.events[0], SearchEvent::Progress(_)));
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let mut session = Session::with_clock(Arc::new(ManualClock::new()));
        session.cancel_search();
        let mut events: Vec<SearchEvent> = Vec::new();
        let state = session.start_search("welt", &settings(4), &mut events);
        assert_eq!(state, Some(SessionState::Done));
    }

    #[test]
    fn test_searching_flag_visible_during_run() {
        let clock = Arc::new(ManualClock::stepping(Duration::from_millis(150)));
        let mut session = Session::with_clock(clock);
        let mut sink = Reentrant {
            handle: session.handle(),
            saw_running: false,
        };
        session.start_search("wuchs\nbild\nform", &settings(0), &mut sink);
        assert!(sink.saw_running);
        assert!(!session.handle().is_searching());
    }

    #[test]
    fn test_unbounded_results_sorted_by_score_first() {
        let mut session = Session::with_clock(Arc::new(ManualClock::new()));
        let mut events: Vec<SearchEvent> = Vec::new();
        let unbounded = SearchSettings {
            top_n: 0,
            ..settings(0)
        };
        session.start_search("wuchs\nbild\nform", &unbounded, &mut events);
        let results = session.results();
        assert_eq!(results.len(), 7);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_cancel_between_claim_and_run_applies() {
        let mut session = Session::with_clock(Arc::new(ManualClock::new()));
        let handle = session.handle();
        let ticket = handle.try_claim().unwrap();
        assert!(handle.is_searching());
        assert!(handle.try_claim().is_none());

        handle.cancel_search();
        let mut events: Vec<SearchEvent> = Vec::new();
        let state = session.run_claimed(ticket, "wuchs\nbild\nform", &settings(0), &mut events);
        assert_eq!(state, SessionState::Cancelled);
        assert!(events.is_empty());
        assert!(session.results().is_empty());
        assert!(!handle.is_searching());
    }

    #[test]
    fn test_cancel_does_not_leak_into_next_search() {
        let mut session = Session::with_clock(Arc::new(ManualClock::new()));
        let handle = session.handle();
        let ticket = handle.try_claim().unwrap();
        handle.cancel_search();
        let mut events: Vec<SearchEvent> = Vec::new();
        session.run_claimed(ticket, "welt", &settings(4), &mut events);

        let state = session.start_search("welt", &settings(4), &mut events);
        assert_eq!(state, Some(SessionState::Done));
        assert!(matches!(events.last(), Some(SearchEvent::Done(r)) if r.len() == 1));
    }

    #[test]
    fn test_dropped_ticket_frees_slot() {
        let session = Session::with_clock(Arc::new(ManualClock::new()));
        let handle = session.handle();
        let ticket = handle.try_claim();
        assert!(ticket.is_some());
        drop(ticket);
        assert!(!handle.is_searching());
        assert!(handle.try_claim().is_some());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("bad state");
        assert_eq!(panic_message(payload.as_ref()), "bad state");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
    }
}
