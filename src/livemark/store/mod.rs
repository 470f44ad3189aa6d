//! # Storage Layer
//!
//! Persistence is split in two:
//!
//! - [`backend::KeyValueStore`]: raw durable key-value I/O, the equivalent
//!   of a browser's local storage. It knows nothing about notes.
//! - [`NoteStore`]: the note collection, the active note, selection and the
//!   theme preference. It is the only code that writes to the backend, and
//!   it writes the full collection after every mutation.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production storage, one file per key
//!   - Writes go to a temp file which is renamed into place
//! - [`mem_backend::MemBackend`]: in-memory storage for testing
//!   - Can simulate write failures
//!
//! ## Storage Format
//!
//! ```text
//! <data dir>/
//! ├── livemark-notes-v1   # JSON array of notes (id, title, content, createdAt, updatedAt)
//! ├── livemark-theme      # "light" or "dark"
//! ├── livemark-notes-v1.bak  # copy of a notes record that could not be read
//! └── config.json         # LivemarkConfig
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod note_store;

pub use backend::KeyValueStore;
pub use note_store::{NoteStore, SaveStatus, NOTES_BACKUP_KEY, NOTES_KEY, THEME_KEY};
