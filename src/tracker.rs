use std::cmp::Ordering;
use std::collections::HashSet;

use crate::search::Solution;

/// Ordering used by a tracker or a results view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Ranking {
    #[default]
    #[value(name = "score")]
    ByScore,
    #[value(name = "length")]
    ByLength,
}

impl Ranking {
    /// `Less` means `a` ranks ahead of `b`.
    #[must_use]
    pub fn compare(self, a: &Solution, b: &Solution) -> Ordering {
        match self {
            Self::ByScore => b.score.total_cmp(&a.score),
            Self::ByLength => b.len.cmp(&a.len).then_with(|| b.score.total_cmp(&a.score)),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ByScore => "score",
            Self::ByLength => "length",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::ByScore => Self::ByLength,
            Self::ByLength => Self::ByScore,
        }
    }
}

/// Bounded collection holding the best `limit` solutions seen so far.
///
/// With `limit == 0` every offered solution is kept unsorted until [`TopK::finish`].
#[derive(Clone, Debug)]
pub struct TopK {
    ranking: Ranking,
    limit: usize,
    items: Vec<Solution>,
}

impl TopK {
    #[must_use]
    pub fn new(ranking: Ranking, limit: usize) -> Self {
        Self {
            ranking,
            limit,
            items: Vec::new(),
        }
    }

    /// Offer a candidate. Returns whether it was retained.
    pub fn offer(&mut self, candidate: Solution) -> bool {
        if self.limit == 0 {
            self.items.push(candidate);
            return true;
        }

        let qualifies = self.items.len() < self.limit
            || self
                .items
                .last()
                .is_some_and(|worst| self.ranking.compare(&candidate, worst) == Ordering::Less);
        if !qualifies {
            return false;
        }

        self.items.push(candidate);
        let ranking = self.ranking;
        self.items.sort_by(|a, b| ranking.compare(a, b));
        self.items.truncate(self.limit);
        true
    }

    /// Sort the whole collection; needed once before use when unbounded.
    pub fn finish(&mut self) {
        let ranking = self.ranking;
        self.items.sort_by(|a, b| ranking.compare(a, b));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Solution] {
        &self.items
    }
}

/// Union of several trackers, deduplicated by the concatenated word text.
#[must_use]
pub fn merge_unique(trackers: &[&TopK]) -> Vec<Solution> {
    let mut seen = HashSet::new();
    trackers
        .iter()
        .flat_map(|tracker| tracker.as_slice())
        .filter(|solution| seen.insert(solution.text()))
        .cloned()
        .collect()
}

/// Sort `results` for display and keep the first `top_n` (all when zero).
#[must_use]
pub fn rank_results(mut results: Vec<Solution>, ranking: Ranking, top_n: usize) -> Vec<Solution> {
    results.sort_by(|a, b| ranking.compare(a, b));
    if top_n > 0 {
        results.truncate(top_n);
    }
    results
}
