//! # Livemark Architecture
//!
//! Livemark keeps a collection of Markdown notes with autosave and per-note
//! undo/redo. The core is a library with no terminal assumptions; the
//! `livemark` binary is one client of it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - Resolves positions and id prefixes into note ids         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the note store and the undo/redo history            │
//! │  - Resets history whenever the active note changes          │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │  Commands (commands/*.rs)    │ │  History (history.rs)      │
//! │  - import, export, stats     │ │  - debounced snapshots     │
//! └──────────────────────────────┘ └────────────────────────────┘
//!                │
//!                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - NoteStore: collection, active note, selection, theme     │
//! │  - KeyValueStore trait: FsBackend, MemBackend (testing)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never reads
//! the clock on its own for debouncing: callers pass an `Instant` and poll
//! `tick`. Diagnostics go through the `log` facade; the binary decides
//! where they end up.
//!
//! ## Testing Strategy
//!
//! - Store, history and commands carry unit tests against `MemBackend`.
//! - `api.rs` tests cover the interplay between edits, history and note
//!   switching.
//! - `tests/` exercises the filesystem backend and the binary end to end.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod index;
pub mod model;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
