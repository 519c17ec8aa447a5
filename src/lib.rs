// Library interface for isogram-finder
// This allows integration tests to access internal modules

pub mod cli;
pub mod error;
pub mod events;
pub mod logging;
pub mod modes;
pub mod scoring;
pub mod search;
pub mod session;
pub mod settings;
pub mod throttle;
pub mod tracker;
pub mod tui;
pub mod view;
pub mod wordlist;
pub mod worker;

// Re-export commonly used items for easier testing
pub use error::SearchError;
pub use events::{Command, EventSink, SearchEvent};
pub use scoring::compute_score;
pub use search::{CancelToken, ProgressState, Solution};
pub use session::{SearchTicket, Session, SessionHandle, SessionState};
pub use settings::{SearchMode, SearchSettings};
pub use throttle::{Clock, ManualClock, SystemClock};
pub use tracker::{Ranking, TopK};
pub use wordlist::{Entry, Language, clean_and_check_isogram, is_isogram, parse_entries};
pub use worker::SearchWorker;
