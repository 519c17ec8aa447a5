//! Backtracking search over character-disjoint word combinations.
//!
//! The engine is synchronous. It polls a [`CancelToken`] on every recursive call and
//! emits throttled progress and solution events through an [`EventSink`], which is where
//! a caller regains control during a long search.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::debug_log;
use crate::events::{EventSink, SearchEvent};
use crate::scoring::compute_score;
use crate::settings::SearchSettings;
use crate::throttle::{Clock, Throttle};
use crate::tracker::{Ranking, TopK, merge_unique};
use crate::wordlist::Entry;

/// A qualifying combination. Never mutated once built.
#[derive(Clone, Debug)]
pub struct Solution {
    pub words: Vec<Arc<Entry>>,
    pub len: usize,
    pub score: f64,
}

impl Solution {
    /// Concatenated word text, used as the identity of a combination.
    #[must_use]
    pub fn text(&self) -> String {
        self.words.iter().map(|w| w.word()).collect()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = self.words.iter().map(|w| w.word()).collect();
        write!(
            f,
            "{} ({} letters, score {:.2})",
            words.join(" + "),
            self.len,
            self.score
        )
    }
}

/// Live counters and best-so-far solutions; snapshots are sent as progress events.
#[derive(Clone, Debug, Default)]
pub struct ProgressState {
    pub longest: Option<Solution>,
    pub best_score: Option<Solution>,
    pub solutions_found: u64,
    pub words_scanned: u64,
}

/// Cooperative stop signal shared between a running search and whoever may cancel it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Mutable state of one search invocation.
#[derive(Clone, Debug)]
pub struct SearchState {
    pub by_score: TopK,
    pub by_length: TopK,
    pub progress: ProgressState,
    pub throttle: Throttle,
}

impl SearchState {
    #[must_use]
    pub fn new(top_n: usize, clock: &dyn Clock) -> Self {
        Self {
            by_score: TopK::new(Ranking::ByScore, top_n),
            by_length: TopK::new(Ranking::ByLength, top_n),
            progress: ProgressState::default(),
            throttle: Throttle::new(clock.now()),
        }
    }

    /// Deduplicated union of both trackers.
    #[must_use]
    pub fn merged(&self) -> Vec<Solution> {
        merge_unique(&[&self.by_score, &self.by_length])
    }

    fn record(&mut self, candidate: Solution) {
        let progress = &mut self.progress;
        progress.solutions_found += 1;
        if progress
            .longest
            .as_ref()
            .is_none_or(|longest| candidate.len > longest.len)
        {
            progress.longest = Some(candidate.clone());
        }
        if progress
            .best_score
            .as_ref()
            .is_none_or(|best| candidate.score > best.score)
        {
            progress.best_score = Some(candidate.clone());
        }
        self.by_score.offer(candidate.clone());
        self.by_length.offer(candidate);
    }
}

/// One running search: borrowed settings, state, time source, stop signal and event sink.
pub struct SearchRun<'a> {
    pub(crate) settings: &'a SearchSettings,
    pub(crate) state: &'a mut SearchState,
    clock: &'a dyn Clock,
    cancel: &'a CancelToken,
    sink: &'a mut dyn EventSink,
}

impl<'a> SearchRun<'a> {
    pub fn new(
        settings: &'a SearchSettings,
        state: &'a mut SearchState,
        clock: &'a dyn Clock,
        cancel: &'a CancelToken,
        sink: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            settings,
            state,
            clock,
            cancel,
            sink,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Explore every character-disjoint extension of `combo` using entries from `start` on.
    ///
    /// `used` must be the union of the characters of `combo` and `len` its total length;
    /// both are restored before returning.
    pub fn backtrack(
        &mut self,
        list: &[Arc<Entry>],
        start: usize,
        combo: &mut Vec<Arc<Entry>>,
        used: &mut HashSet<char>,
        len: usize,
    ) {
        if self.is_cancelled() {
            return;
        }

        self.checkpoint();

        if !combo.is_empty() && self.settings.accepts_len(len) {
            let candidate = Solution {
                score: compute_score(combo),
                words: combo.clone(),
                len,
            };
            self.state.record(candidate);
        }

        if !self.settings.can_extend(len) {
            return;
        }

        for (i, next) in list.iter().enumerate().skip(start) {
            if self.is_cancelled() {
                return;
            }
            self.state.progress.words_scanned += 1;
            if !next.is_disjoint(used) {
                continue;
            }

            combo.push(Arc::clone(next));
            used.extend(next.chars().iter().copied());

            self.backtrack(list, i + 1, combo, used, len + next.char_len());

            for c in next.chars() {
                used.remove(c);
            }
            combo.pop();
        }
    }

    /// Emit whatever the throttle allows at this point in the search.
    fn checkpoint(&mut self) {
        let now = self.clock.now();

        if self.state.throttle.progress_due(now) {
            let snapshot = self.state.progress.clone();
            self.emit(SearchEvent::Progress(snapshot));
        }

        if self.state.throttle.batch_due(now) {
            let batch = self.state.merged();
            let sent = !batch.is_empty();
            if sent {
                debug_log!("Emitting batch of {} solutions", batch.len());
                self.emit(SearchEvent::Solution(batch));
            }
            self.state.throttle.record_batch(now, sent);
        }
    }

    fn emit(&mut self, event: SearchEvent) {
        if !self.is_cancelled() {
            self.sink.emit(event);
        }
    }
}
