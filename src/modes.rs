use std::collections::HashSet;
use std::sync::Arc;

use crate::debug_log;
use crate::search::SearchRun;
use crate::settings::SearchMode;
use crate::wordlist::Entry;

/// Words shorter than this never make it into the bottom slice of a high-low search.
pub const MIN_WORD_LEN_FOR_HIGH_LOW: usize = 4;

/// Run the engine over `entries` (sorted longest first) according to the run's mode.
pub fn run_mode(entries: &[Arc<Entry>], run: &mut SearchRun<'_>) {
    match run.settings.search_mode {
        SearchMode::Classic => run_classic(entries, run),
        SearchMode::Split => run_split(entries, run),
        SearchMode::HighLow => {
            let reduced = high_low_entries(
                entries,
                run.settings.high_low_top_percent,
                run.settings.high_low_bottom_percent,
            );
            debug_log!(
                "High-low search over {} of {} entries",
                reduced.len(),
                entries.len()
            );
            run_classic(&reduced, run);
        }
    }
}

fn run_classic(entries: &[Arc<Entry>], run: &mut SearchRun<'_>) {
    run.backtrack(entries, 0, &mut Vec::new(), &mut HashSet::new(), 0);
}

/// Each of the longest `start_size` words anchors its own search over the words after it.
fn run_split(entries: &[Arc<Entry>], run: &mut SearchRun<'_>) {
    let anchors = run.settings.start_size.min(entries.len());
    for (i, anchor) in entries.iter().take(anchors).enumerate() {
        if run.is_cancelled() {
            break;
        }
        debug_log!("Split search anchor {}/{}: {}", i + 1, anchors, anchor.word());
        let mut combo = vec![Arc::clone(anchor)];
        let mut used = anchor.chars().clone();
        run.backtrack(entries, i + 1, &mut combo, &mut used, anchor.char_len());
    }
}

/// The longest `top_percent` and the shortest `bottom_percent` of `entries`, merged and
/// re-sorted longest first.
///
/// The bottom slice only considers words of at least [`MIN_WORD_LEN_FOR_HIGH_LOW`] letters.
#[must_use]
pub fn high_low_entries(
    entries: &[Arc<Entry>],
    top_percent: u8,
    bottom_percent: u8,
) -> Vec<Arc<Entry>> {
    let top_count = entries.len() * usize::from(top_percent) / 100;
    let bottom_count = entries.len() * usize::from(bottom_percent) / 100;

    let top = entries.iter().take(top_count);
    let bottom = entries
        .iter()
        .rev()
        .filter(|e| e.char_len() >= MIN_WORD_LEN_FOR_HIGH_LOW)
        .take(bottom_count);

    let mut seen = HashSet::new();
    let mut reduced: Vec<Arc<Entry>> = top
        .chain(bottom)
        .filter(|e| seen.insert(e.word().to_string()))
        .cloned()
        .collect();
    reduced.sort_by(|a, b| b.char_len().cmp(&a.char_len()));
    reduced
}
