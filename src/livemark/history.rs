//! # Undo/Redo History
//!
//! A linear list of content snapshots with a cursor. The engine knows nothing
//! about notes: callers hand it content strings and get content strings back.
//!
//! ## Capture Policy
//!
//! - The first capture on an empty history, and any forced capture, commits
//!   immediately.
//! - Every other capture is debounced: it replaces the pending capture and
//!   commits once `debounce` has elapsed without another capture. A burst of
//!   typing therefore collapses into one entry.
//!
//! There are no timers. The pending capture carries a deadline and the owner
//! polls [`HistoryEngine::tick`] with the current [`Instant`]. Dropping the
//! engine, or calling [`HistoryEngine::reset`], discards the pending capture.
//!
//! ## Navigation
//!
//! [`HistoryEngine::undo`] and [`HistoryEngine::redo`] return the snapshot to
//! apply. Applying it must not be fed back through `capture`. A pending
//! capture is committed before navigating so the latest burst of edits is
//! undoable as a unit.
//!
//! Committing after an undo truncates the redo branch.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PendingCapture {
    content: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct HistoryEngine {
    entries: Vec<HistoryEntry>,
    /// `None` while the history is empty.
    index: Option<usize>,
    pending: Option<PendingCapture>,
    debounce: Duration,
}

impl Default for HistoryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl HistoryEngine {
    pub fn new(debounce: Duration) -> Self {
        Self {
            entries: Vec::new(),
            index: None,
            pending: None,
            debounce,
        }
    }

    /// Record `content` as a candidate snapshot.
    ///
    /// Commits right away when the history is empty or `force` is set;
    /// otherwise schedules a commit at `now + debounce`, superseding any
    /// capture already pending.
    pub fn capture(&mut self, content: impl Into<String>, force: bool, now: Instant) {
        let content = content.into();

        if self.entries.is_empty() || force {
            self.pending = None;
            self.commit(content);
            return;
        }

        self.pending = Some(PendingCapture {
            content,
            deadline: now + self.debounce,
        });
    }

    /// Commit the pending capture if its deadline has passed.
    /// Returns true when an entry was committed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if now >= pending.deadline => {
                self.flush();
                true
            }
            _ => false,
        }
    }

    /// Commit the pending capture regardless of its deadline.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.commit(pending.content);
        }
    }

    /// Step back one snapshot and return its content.
    pub fn undo(&mut self) -> Option<&str> {
        self.flush();
        match self.index {
            Some(i) if i > 0 => {
                self.index = Some(i - 1);
                Some(self.entries[i - 1].content.as_str())
            }
            _ => None,
        }
    }

    /// Step forward one snapshot and return its content.
    pub fn redo(&mut self) -> Option<&str> {
        self.flush();
        match self.index {
            Some(i) if i + 1 < self.entries.len() => {
                self.index = Some(i + 1);
                Some(self.entries[i + 1].content.as_str())
            }
            _ => None,
        }
    }

    /// Forget every entry and the pending capture.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index = None;
        self.pending = None;
    }

    pub fn can_undo(&self) -> bool {
        match self.index {
            Some(i) => i > 0 || self.pending.is_some(),
            None => false,
        }
    }

    pub fn can_redo(&self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        matches!(self.index, Some(i) if i + 1 < self.entries.len())
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.index.map(|i| &self.entries[i])
    }

    fn commit(&mut self, content: String) {
        let keep = self.index.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push(HistoryEntry {
            content,
            timestamp: Utc::now(),
        });
        self.index = Some(self.entries.len() - 1);
        log::debug!(
            "history commit: {} entries, cursor at {}",
            self.entries.len(),
            self.entries.len() - 1
        );
    }
}
