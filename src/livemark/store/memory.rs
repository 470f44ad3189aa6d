use super::mem_backend::MemBackend;
use super::note_store::NoteStore;

pub type InMemoryStore = NoteStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Open a store over an empty in-memory backend.
    ///
    /// Writing to a fresh `MemBackend` cannot fail, so this never panics.
    pub fn new() -> Self {
        match NoteStore::open(MemBackend::new()) {
            Ok(store) => store,
            Err(e) => unreachable!("in-memory store failed to open: {}", e),
        }
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::NoteId;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        /// An empty store: the welcome note is removed.
        pub fn new() -> Self {
            let mut store = InMemoryStore::new();
            let welcome = store.notes()[0].id.clone();
            store.delete_note(&welcome).unwrap();
            Self { store }
        }

        /// Add `count` notes. They end up in creation order, "Test Note 1"
        /// first.
        pub fn with_notes(mut self, count: usize) -> Self {
            for i in (0..count).rev() {
                let title = format!("Test Note {}", i + 1);
                let content = format!("Content for note {}", i + 1);
                self.store.import_note(title, content).unwrap();
            }
            self
        }

        pub fn with_note(mut self, title: &str, content: &str) -> Self {
            self.store.import_note(title, content).unwrap();
            self
        }

        pub fn ids(&self) -> Vec<NoteId> {
            self.store.notes().iter().map(|n| n.id.clone()).collect()
        }
    }
}
