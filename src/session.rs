//! Publishing extraction results when loads can overlap.
//!
//! Each load request takes a [`LoadTicket`]. Only the newest ticket may
//! publish; results for older tickets are dropped when they arrive. A pass
//! is never interrupted, its result is simply ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::book::BookSource;
use crate::error::Result;
use crate::extract::{Extraction, extract_chapters};
use crate::options::ExtractOptions;

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// What happened to a result handed to [`ExtractionSession::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Published {
    /// The result is now current.
    Installed { chapters: usize },
    /// The pass failed; the previous chapters were cleared.
    Failed(String),
    /// A newer load was requested; the result was discarded.
    Superseded,
}

#[derive(Debug, Default)]
struct SessionState {
    request_id: u64,
    current: Option<Arc<Extraction>>,
    last_error: Option<String>,
}

/// Holds the published extraction for a reader.
///
/// Cloning gives another handle to the same session.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSession {
    state: Arc<Mutex<SessionState>>,
}

impl ExtractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // State is replaced wholesale under the lock, so it is consistent
        // even if a holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new load, superseding every earlier one.
    pub fn begin(&self) -> LoadTicket {
        let mut state = self.lock();
        state.request_id = state.request_id.wrapping_add(1);
        LoadTicket(state.request_id)
    }

    /// Whether `ticket` is still the newest load.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.lock().request_id == ticket.0
    }

    /// Install the result of the load identified by `ticket`.
    ///
    /// Chapters and entries are swapped in together. A fatal error clears the
    /// previous extraction so stale chapters are never shown next to it.
    pub fn publish(&self, ticket: LoadTicket, result: Result<Extraction>) -> Published {
        let mut state = self.lock();
        if ticket.0 != state.request_id {
            debug!(
                request_id = ticket.0,
                current = state.request_id,
                "Ignoring stale extraction result"
            );
            return Published::Superseded;
        }

        match result {
            Ok(extraction) => {
                let chapters = extraction.chapters.len();
                state.current = Some(Arc::new(extraction));
                state.last_error = None;
                Published::Installed { chapters }
            }
            Err(err) => {
                let message = err.to_string();
                state.current = None;
                state.last_error = Some(message.clone());
                Published::Failed(message)
            }
        }
    }

    /// The published extraction, if any.
    pub fn current(&self) -> Option<Arc<Extraction>> {
        self.lock().current.clone()
    }

    /// Message of the last fatal error, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Run a pass for `book` on a worker thread and publish its result.
    ///
    /// The ticket is taken before the thread starts, so a later `spawn` or
    /// `begin` always wins.
    pub fn spawn<B>(&self, book: B, options: ExtractOptions) -> JoinHandle<Published>
    where
        B: BookSource + Send + 'static,
    {
        let ticket = self.begin();
        let session = self.clone();
        thread::spawn(move || {
            let result = extract_chapters(&book, &options);
            session.publish(ticket, result)
        })
    }
}
