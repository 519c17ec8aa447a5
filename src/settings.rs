use clap::ValueEnum;

use crate::error::SearchError;

/// Strategy used to pick which entries the backtracking engine sees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SearchMode {
    /// One exhaustive run over the whole list.
    #[default]
    Classic,
    /// One run per anchor among the longest `start_size` words.
    Split,
    /// One run over the longest and shortest percentiles of the list.
    HighLow,
}

/// Parameters for a single search invocation. Zero means "unbounded" for `max_len` and `top_n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSettings {
    pub min_len: usize,
    pub max_len: usize,
    pub top_n: usize,
    pub search_mode: SearchMode,
    pub start_size: usize,
    pub high_low_top_percent: u8,
    pub high_low_bottom_percent: u8,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_len: 10,
            max_len: 0,
            top_n: 10,
            search_mode: SearchMode::Classic,
            start_size: 40,
            high_low_top_percent: 20,
            high_low_bottom_percent: 30,
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.high_low_top_percent > 100 {
            return Err(SearchError::invalid(format!(
                "top percent {} exceeds 100",
                self.high_low_top_percent
            )));
        }
        if self.high_low_bottom_percent > 100 {
            return Err(SearchError::invalid(format!(
                "bottom percent {} exceeds 100",
                self.high_low_bottom_percent
            )));
        }
        Ok(())
    }

    /// Whether a combination of total length `len` qualifies as a solution.
    #[must_use]
    pub fn accepts_len(&self, len: usize) -> bool {
        len >= self.min_len && (self.max_len == 0 || len <= self.max_len)
    }

    /// Whether a combination of total length `len` may still be extended.
    #[must_use]
    pub fn can_extend(&self, len: usize) -> bool {
        self.max_len == 0 || len < self.max_len
    }
}
