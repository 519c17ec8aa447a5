use crate::events::SearchEvent;
use crate::search::{ProgressState, Solution};
use crate::tracker::{Ranking, rank_results};

pub const CANCELLED_MESSAGE: &str = "Search cancelled by user.";
pub const FINISHED_MESSAGE: &str = "Search finished!";

/// Front-end state folded from search events.
#[derive(Debug, Default)]
pub struct SearchView {
    pub results: Vec<Solution>,
    pub progress: ProgressState,
    pub is_searching: bool,
    pub ranking: Ranking,
    pub top_n: usize,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl SearchView {
    #[must_use]
    pub fn new(ranking: Ranking, top_n: usize) -> Self {
        Self {
            ranking,
            top_n,
            ..Self::default()
        }
    }

    /// Reset for a new search.
    pub fn begin(&mut self, top_n: usize) {
        self.is_searching = true;
        self.top_n = top_n;
        self.results.clear();
        self.progress = ProgressState::default();
        self.message = None;
        self.error = None;
    }

    /// Local bookkeeping after a cancel was sent; no event confirms it.
    pub fn cancelled(&mut self) {
        self.is_searching = false;
        self.message = Some(CANCELLED_MESSAGE.to_string());
    }

    pub fn apply(&mut self, event: SearchEvent) {
        if !self.is_searching {
            // Stragglers from a search that was cancelled locally.
            return;
        }
        match event {
            SearchEvent::Progress(progress) => self.progress = progress,
            SearchEvent::Solution(results) => self.results = results,
            SearchEvent::Done(results) => {
                self.results = results;
                self.is_searching = false;
                self.message = Some(FINISHED_MESSAGE.to_string());
            }
            SearchEvent::Error { message } => {
                self.is_searching = false;
                self.error = Some(message);
            }
        }
    }

    pub fn toggle_ranking(&mut self) {
        self.ranking = self.ranking.toggled();
    }

    /// Results ordered by the active ranking, limited to `top_n`.
    #[must_use]
    pub fn displayed(&self) -> Vec<Solution> {
        rank_results(self.results.clone(), self.ranking, self.top_n)
    }
}
