use std::sync::mpsc::Sender;

use crate::search::{ProgressState, Solution};
use crate::settings::SearchSettings;

/// Inbound requests from the front end.
#[derive(Clone, Debug)]
pub enum Command {
    StartSearch {
        word_list: String,
        settings: SearchSettings,
    },
    CancelSearch,
}

/// Outbound notifications. `Done` and `Error` are terminal for an invocation.
#[derive(Clone, Debug)]
pub enum SearchEvent {
    Progress(ProgressState),
    /// Best solutions known so far; superseded by later batches or by `Done`.
    Solution(Vec<Solution>),
    Done(Vec<Solution>),
    Error { message: String },
}

impl SearchEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress(_) => "progress",
            Self::Solution(_) => "solution",
            Self::Done(_) => "done",
            Self::Error { .. } => "error",
        }
    }
}

/// Receiver of search events, called synchronously at the engine's checkpoints.
pub trait EventSink {
    fn emit(&mut self, event: SearchEvent);
}

impl EventSink for Vec<SearchEvent> {
    fn emit(&mut self, event: SearchEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<SearchEvent> {
    fn emit(&mut self, event: SearchEvent) {
        let kind = event.kind();
        if self.send(event).is_err() {
            log::warn!("Dropping {kind} event: receiver disconnected");
        }
    }
}
