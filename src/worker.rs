use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::events::{Command, SearchEvent};
use crate::session::{SearchTicket, Session, SessionHandle};
use crate::settings::SearchSettings;
use crate::{debug_log, info_log};

/// Runs a [`Session`] on its own thread so a front end stays responsive.
///
/// A start claims the session's search slot before it is queued, so a cancel sent right
/// after it applies even if the worker thread has not picked it up yet. Cancellation
/// bypasses the command queue and takes effect at the next engine checkpoint.
pub struct SearchWorker {
    commands: Option<Sender<QueuedSearch>>,
    handle: SessionHandle,
    thread: Option<JoinHandle<()>>,
}

impl SearchWorker {
    /// Spawn the worker thread. Events of every search arrive on the returned receiver.
    pub fn spawn(session: Session) -> std::io::Result<(Self, Receiver<SearchEvent>)> {
        let handle = session.handle();
        let (command_tx, command_rx) = mpsc::channel::<QueuedSearch>();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("isogram-search".to_string())
            .spawn(move || worker_loop(session, &command_rx, event_tx))?;

        Ok((
            Self {
                commands: Some(command_tx),
                handle,
                thread: Some(thread),
            },
            event_rx,
        ))
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.handle.is_searching()
    }

    /// Deliver a command. Returns false when a start was refused because a search is
    /// still pending or running, or the worker has stopped.
    pub fn send(&self, command: Command) -> bool {
        match command {
            Command::CancelSearch => {
                self.handle.cancel_search();
                true
            }
            Command::StartSearch {
                word_list,
                settings,
            } => {
                let Some(ticket) = self.handle.try_claim() else {
                    debug_log!("StartSearch ignored: a search is already running");
                    return false;
                };
                // A ticket that cannot be queued is dropped here, which frees the slot.
                let queued = self
                    .commands
                    .as_ref()
                    .is_some_and(|tx| tx.send((word_list, settings, ticket)).is_ok());
                if !queued {
                    log::warn!("Search worker has stopped; StartSearch dropped");
                }
                queued
            }
        }
    }

    /// Cancel any pending or running search, stop the thread and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.handle.cancel_search();
        self.commands = None;
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log::error!("Search worker thread panicked");
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

type QueuedSearch = (String, SearchSettings, SearchTicket);

fn worker_loop(
    mut session: Session,
    commands: &Receiver<QueuedSearch>,
    mut events: Sender<SearchEvent>,
) {
    info_log!("Search worker started");
    while let Ok((word_list, settings, ticket)) = commands.recv() {
        let outcome = session.run_claimed(ticket, &word_list, &settings, &mut events);
        debug_log!("Search worker finished a run: {:?}", outcome);
    }
    info_log!("Search worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(min_len: usize) -> SearchSettings {
        SearchSettings {
            min_len,
            ..SearchSettings::default()
        }
    }

    fn wait_for_terminal(events: &Receiver<SearchEvent>) -> SearchEvent {
        loop {
            let event = events.recv_timeout(Duration::from_secs(10)).unwrap();
            if matches!(event, SearchEvent::Done(_) | SearchEvent::Error { .. }) {
                return event;
            }
        }
    }

    #[test]
    fn test_worker_reports_done() {
        let (worker, events) = SearchWorker::spawn(Session::new()).unwrap();
        worker.send(Command::StartSearch {
            word_list: "wuchs\nbild\nform".to_string(),
            settings: settings(9),
        });
        let done = wait_for_terminal(&events);
        assert!(matches!(done, SearchEvent::Done(ref r) if r.len() == 3));
        worker.shutdown();
    }

    #[test]
    fn test_worker_runs_searches_in_sequence() {
        let (worker, events) = SearchWorker::spawn(Session::new()).unwrap();
        for _ in 0..2 {
            worker.send(Command::StartSearch {
                word_list: "hallo\nwelt\nfoo".to_string(),
                settings: settings(4),
            });
            let done = wait_for_terminal(&events);
            assert!(matches!(done, SearchEvent::Done(ref r) if r.len() == 1));
        }
        worker.shutdown();
    }

    fn one_letter_words() -> String {
        "abcdefghijklmnopqr"
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_cancel_right_after_start_suppresses_done() {
        let (worker, events) = SearchWorker::spawn(Session::new()).unwrap();
        assert!(worker.send(Command::StartSearch {
            word_list: one_letter_words(),
            settings: settings(1),
        }));
        assert!(worker.is_searching());
        assert!(!worker.send(Command::StartSearch {
            word_list: "welt".to_string(),
            settings: settings(4),
        }));
        worker.send(Command::CancelSearch);
        worker.shutdown();

        let received: Vec<SearchEvent> = events.try_iter().collect();
        assert!(
            !received
                .iter()
                .any(|e| matches!(e, SearchEvent::Done(_) | SearchEvent::Error { .. }))
        );
    }

    #[test]
    fn test_new_search_after_cancel() {
        let (worker, events) = SearchWorker::spawn(Session::new()).unwrap();
        worker.send(Command::StartSearch {
            word_list: one_letter_words(),
            settings: settings(1),
        });
        worker.send(Command::CancelSearch);
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while worker.is_searching() {
            assert!(std::time::Instant::now() < deadline, "cancelled search never ended");
            std::thread::sleep(Duration::from_millis(5));
        }

        worker.send(Command::StartSearch {
            word_list: "wuchs\nbild\nform".to_string(),
            settings: settings(9),
        });
        let done = wait_for_terminal(&events);
        assert!(matches!(done, SearchEvent::Done(ref r) if r.len() == 3));
    }

    #[test]
    fn test_cancel_without_search_is_ignored() {
        let (worker, events) = SearchWorker::spawn(Session::new()).unwrap();
        worker.send(Command::CancelSearch);
        worker.send(Command::StartSearch {
            word_list: "welt".to_string(),
            settings: settings(4),
        });
        assert!(matches!(wait_for_terminal(&events), SearchEvent::Done(_)));
    }
}
