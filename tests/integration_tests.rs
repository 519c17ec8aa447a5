// Integration tests for isogram-finder
// These tests drive whole searches through the session controller and the worker

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use isogram_finder::*;

fn settings(min_len: usize) -> SearchSettings {
    SearchSettings {
        min_len,
        max_len: 0,
        top_n: 10,
        search_mode: SearchMode::Classic,
        start_size: 40,
        high_low_top_percent: 20,
        high_low_bottom_percent: 30,
    }
}

fn run(word_list: &str, settings: &SearchSettings) -> (Option<SessionState>, Vec<SearchEvent>) {
    let mut session = Session::with_clock(Arc::new(ManualClock::new()));
    let mut events: Vec<SearchEvent> = Vec::new();
    let state = session.start_search(word_list, settings, &mut events);
    (state, events)
}

fn done_texts(events: &[SearchEvent]) -> Vec<String> {
    let done: Vec<&Vec<Solution>> = events
        .iter()
        .filter_map(|e| match e {
            SearchEvent::Done(results) => Some(results),
            _ => None,
        })
        .collect();
    assert_eq!(done.len(), 1, "exactly one done event expected");
    done[0].iter().map(Solution::text).collect()
}

#[test]
fn test_finds_two_word_combinations() {
    let (state, events) = run("wuchs\nbild\nform", &settings(9));
    assert_eq!(state, Some(SessionState::Done));
    let texts = done_texts(&events);
    assert_eq!(texts.len(), 3);
    assert!(texts.contains(&"wuchsbild".to_string()));
    assert!(texts.contains(&"wuchsform".to_string()));
    assert!(texts.contains(&"wuchsbildform".to_string()));
}

#[test]
fn test_single_word_solution_and_non_isograms_dropped() {
    let (_, events) = run("hallo\nwelt\nfoo", &settings(4));
    assert_eq!(done_texts(&events), vec!["welt"]);
}

#[test]
fn test_min_len_above_reach_yields_nothing() {
    let (state, events) = run("wuchs\nbild", &settings(10));
    assert_eq!(state, Some(SessionState::Done));
    assert!(done_texts(&events).is_empty());
}

#[test]
fn test_identical_runs_are_identical() {
    let words = "wuchs\nbild\nform\njet\nkap\nzyklop\nmuff\nvier";
    let settings = SearchSettings {
        top_n: 5,
        ..settings(6)
    };
    let (_, first) = run(words, &settings);
    let (_, second) = run(words, &settings);
    assert_eq!(done_texts(&first), done_texts(&second));
}

#[test]
fn test_every_solution_is_an_isogram_within_bounds() {
    let words = "wuchs\nbild\nform\njet\nkap\nzyklop\nvier\nquark\ndung";
    let bounded = SearchSettings {
        min_len: 7,
        max_len: 12,
        top_n: 0,
        ..settings(7)
    };
    let (_, events) = run(words, &bounded);
    let texts = done_texts(&events);
    assert!(!texts.is_empty());
    for text in texts {
        let len = text.chars().count();
        assert!((7..=12).contains(&len), "{text} out of bounds");
        assert!(is_isogram(&text), "{text} repeats a character");
    }
}

#[test]
fn test_results_bounded_by_top_n_per_tracker() {
    let words = "wuchs\nbild\nform\njet\nkap\nzyklop\nvier\nquark\ndung";
    let small = SearchSettings {
        top_n: 2,
        ..settings(1)
    };
    let (_, events) = run(words, &small);
    // Union of two trackers of at most 2 each.
    assert!(done_texts(&events).len() <= 4);
}

#[test]
fn test_modes_agree_when_lists_are_complete() {
    let words = "wuchs\nbild\nform\njet\nkap";
    let classic = SearchSettings {
        top_n: 0,
        ..settings(1)
    };
    let split = SearchSettings {
        search_mode: SearchMode::Split,
        start_size: 100,
        ..classic.clone()
    };
    let high_low = SearchSettings {
        search_mode: SearchMode::HighLow,
        high_low_top_percent: 100,
        high_low_bottom_percent: 0,
        ..classic.clone()
    };
    let as_set = |s: &SearchSettings| -> HashSet<String> {
        done_texts(&run(words, s).1).into_iter().collect()
    };
    let expected = as_set(&classic);
    assert_eq!(as_set(&split), expected);
    assert_eq!(as_set(&high_low), expected);
}

#[test]
fn test_progress_and_batches_with_simulated_time() {
    let clock = Arc::new(ManualClock::stepping(Duration::from_millis(200)));
    let mut session = Session::with_clock(clock);
    let mut events: Vec<SearchEvent> = Vec::new();
    session.start_search("wuchs\nbild\nform\njet\nkap", &settings(1), &mut events);

    let kinds: Vec<&str> = events.iter().map(SearchEvent::kind).collect();
    assert!(kinds.contains(&"progress"));
    assert!(kinds.contains(&"solution"));
    assert_eq!(kinds.last(), Some(&"done"));
    assert_eq!(kinds.iter().filter(|k| **k == "done").count(), 1);

    let Some(SearchEvent::Progress(last)) = events
        .iter()
        .rev()
        .find(|e| matches!(e, SearchEvent::Progress(_)))
    else {
        panic!("no progress event");
    };
    assert!(last.solutions_found <= session.progress().unwrap().solutions_found);
}

#[test]
fn test_cancel_from_event_sink_stops_search() {
    struct CancelAfter {
        handle: SessionHandle,
        remaining: usize,
        events: Vec<SearchEvent>,
        cancelled: bool,
        after_cancel: usize,
    }

    impl EventSink for CancelAfter {
        fn emit(&mut self, event: SearchEvent) {
            if self.cancelled {
                self.after_cancel += 1;
            }
            self.events.push(event);
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 && !self.cancelled {
                self.handle.cancel_search();
                self.cancelled = true;
            }
        }
    }

    let words = "abcdef\nghijkl\nmnopq\nrstu\nvwx\nyz\näö\nü\nß";
    let clock = Arc::new(ManualClock::stepping(Duration::from_millis(120)));
    let mut session = Session::with_clock(clock);
    let mut sink = CancelAfter {
        handle: session.handle(),
        remaining: 3,
        events: Vec::new(),
        cancelled: false,
        after_cancel: 0,
    };
    let state = session.start_search(words, &settings(1), &mut sink);
    assert_eq!(state, Some(SessionState::Cancelled));
    assert!(sink.cancelled);
    assert_eq!(sink.after_cancel, 0);
    assert!(!sink.events.iter().any(|e| matches!(e, SearchEvent::Done(_))));
}

#[test]
fn test_worker_end_to_end() {
    let session = Session::new().with_language(Language::English);
    let (worker, events) = SearchWorker::spawn(session).unwrap();
    worker.send(Command::StartSearch {
        word_list: "Größe\nblitz\nmunch".to_string(),
        settings: settings(5),
    });
    let results = loop {
        match events.recv_timeout(Duration::from_secs(10)).unwrap() {
            SearchEvent::Done(results) => break results,
            SearchEvent::Error { message } => panic!("unexpected error: {message}"),
            _ => {}
        }
    };
    let texts: HashSet<String> = results.iter().map(Solution::text).collect();
    // English strips the umlaut and ß: "größe" becomes "gre".
    assert!(texts.contains("blitz"));
    assert!(texts.contains("blitzmunch"));
    assert!(texts.contains("blitzgre"));
    worker.shutdown();
}

#[test]
fn test_scorer_properties() {
    let entry = |w: &str| Arc::new(Entry::new(w).unwrap());
    assert!(compute_score(&[entry("schwindelkur")]) > compute_score(&[entry("kurz")]));
    let pair = compute_score(&[entry("hinter"), entry("ernst")]);
    assert!(pair > 6f64.powf(1.3) + 5f64.powf(1.3) + 3.0);
}

#[test]
fn test_cleaning_properties() {
    assert_eq!(
        clean_and_check_isogram("  HaUs! ", Language::German),
        Some("haus".to_string())
    );
    assert_eq!(clean_and_check_isogram("Hallo Welt", Language::German), None);
    assert_eq!(clean_and_check_isogram("   ", Language::German), None);
    assert!(is_isogram(""));
}
