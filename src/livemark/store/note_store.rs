use super::backend::KeyValueStore;
use crate::error::Result;
use crate::model::{Note, NoteId, Theme};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::{Duration, Instant};

pub const NOTES_KEY: &str = "livemark-notes-v1";
pub const THEME_KEY: &str = "livemark-theme";
/// Where a notes record that could not be fully read is set aside.
pub const NOTES_BACKUP_KEY: &str = "livemark-notes-v1.bak";
pub const DEFAULT_SAVED_INDICATOR: Duration = Duration::from_millis(300);

/// Cosmetic save indicator. The write itself has already happened by the
/// time the status reads `Saving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved(DateTime<Utc>),
}

/// Owns the note collection, the active note, the selection and the theme
/// preference, and is the only writer to the backend.
pub struct NoteStore<B: KeyValueStore> {
    backend: B,
    notes: Vec<Note>,
    current_id: Option<NoteId>,
    selection_mode: bool,
    selected: Vec<NoteId>,
    theme: Theme,
    save_status: SaveStatus,
    saving_since: Option<Instant>,
    saved_indicator: Duration,
}

impl<B: KeyValueStore> NoteStore<B> {
    /// Load the collection and theme from `backend`.
    ///
    /// A missing record or an empty array falls back to a single welcome
    /// note. Any other array is restored note by note (see
    /// [`Note`] for the accepted shapes).
    ///
    /// A fully read collection is written back immediately. A record that
    /// was not JSON, not an array, or had elements that could not be read
    /// is copied to [`NOTES_BACKUP_KEY`] and left in place until the next
    /// mutation.
    pub fn open(backend: B) -> Result<Self> {
        let LoadedNotes { notes, unreadable } = load_notes(&backend)?;
        let theme = load_theme(&backend)?;
        let current_id = notes.first().map(|n| n.id.clone());

        let mut store = Self {
            backend,
            notes,
            current_id,
            selection_mode: false,
            selected: Vec::new(),
            theme,
            save_status: SaveStatus::Idle,
            saving_since: None,
            saved_indicator: DEFAULT_SAVED_INDICATOR,
        };
        match unreadable {
            Some(raw) => {
                log::warn!("note record set aside under {}", NOTES_BACKUP_KEY);
                store.backend.set(NOTES_BACKUP_KEY, &raw)?;
            }
            None => store.persist()?,
        }
        Ok(store)
    }

    pub fn with_saved_indicator(mut self, delay: Duration) -> Self {
        self.saved_indicator = delay;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- Reads ---

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|n| &n.id == id)
    }

    pub fn current_id(&self) -> Option<&NoteId> {
        self.current_id.as_ref()
    }

    pub fn current(&self) -> Option<&Note> {
        self.current_id.as_ref().and_then(|id| self.get(id))
    }

    /// Notes whose title or content contains `query`, ignoring case.
    /// A blank query matches every note. Collection order is preserved.
    pub fn filter(&self, query: &str) -> Vec<&Note> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.notes.iter().collect();
        }
        self.notes.iter().filter(|n| n.matches(&query)).collect()
    }

    // --- Mutations ---

    /// Insert an empty note with the default title at the front and make it
    /// the active note.
    pub fn create_note(&mut self) -> Result<&Note> {
        self.insert_front(Note::untitled())
    }

    /// Insert a note built from external text at the front and make it the
    /// active note.
    pub fn import_note(&mut self, title: impl Into<String>, content: impl Into<String>) -> Result<&Note> {
        self.insert_front(Note::new(title.into(), content.into()))
    }

    /// Remove a note. Returns false when no note has this id.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<bool> {
        let Some(pos) = self.position(id) else {
            return Ok(false);
        };
        let removed = self.notes.remove(pos);
        if self.current_id.as_ref() == Some(&removed.id) {
            self.fall_back_current();
        }
        self.selected.retain(|s| s != id);
        log::info!("deleted note {}", removed.id);
        self.persist()?;
        Ok(true)
    }

    /// Set a note's title. Titles are trimmed; blank titles are ignored.
    pub fn rename_note(&mut self, id: &NoteId, title: &str) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }
        let Some(note) = self.notes.iter_mut().find(|n| &n.id == id) else {
            return Ok(false);
        };
        note.title = title.to_string();
        self.persist()?;
        Ok(true)
    }

    pub fn update_note_content(&mut self, id: &NoteId, content: impl Into<String>) -> Result<bool> {
        let Some(note) = self.notes.iter_mut().find(|n| &n.id == id) else {
            return Ok(false);
        };
        note.content = content.into();
        note.updated_at = Utc::now();
        self.persist()?;
        Ok(true)
    }

    /// Move `from_id` to the position currently held by `to_id`.
    pub fn reorder_notes(&mut self, from_id: &NoteId, to_id: &NoteId) -> Result<bool> {
        let (Some(from), Some(to)) = (self.position(from_id), self.position(to_id)) else {
            return Ok(false);
        };
        if from == to {
            return Ok(false);
        }
        let moved = self.notes.remove(from);
        self.notes.insert(to, moved);
        self.persist()?;
        Ok(true)
    }

    /// Make `id` the active note. Returns false for unknown ids.
    pub fn set_current(&mut self, id: &NoteId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.current_id = Some(id.clone());
        true
    }

    // --- Selection ---

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    pub fn selected(&self) -> &[NoteId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &NoteId) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_selection_mode(&mut self) {
        self.selection_mode = !self.selection_mode;
        self.selected.clear();
    }

    pub fn toggle_note_selection(&mut self, id: &NoteId) {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.clone());
        }
    }

    /// Select every note matching `query` (see [`NoteStore::filter`]).
    pub fn select_all(&mut self, query: &str) {
        let ids: Vec<NoteId> = self.filter(query).into_iter().map(|n| n.id.clone()).collect();
        self.selected = ids;
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Remove every note in `ids`, then clear the selection and leave
    /// selection mode. Returns the number of notes removed.
    pub fn delete_selected_notes(&mut self, ids: &[NoteId]) -> Result<usize> {
        let before = self.notes.len();
        self.notes.retain(|n| !ids.contains(&n.id));
        let removed = before - self.notes.len();

        if self.current_id.as_ref().is_some_and(|c| ids.contains(c)) {
            self.fall_back_current();
        }
        self.selected.clear();
        self.selection_mode = false;

        if removed > 0 {
            log::info!("deleted {} selected notes", removed);
            self.persist()?;
        }
        Ok(removed)
    }

    // --- Theme ---

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        self.backend.set(THEME_KEY, theme.as_str())
    }

    // --- Save indicator ---

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    /// Turn `Saving` into `Saved` once the indicator delay has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(since) = self.saving_since {
            if now >= since + self.saved_indicator {
                self.saving_since = None;
                self.save_status = SaveStatus::Saved(Utc::now());
            }
        }
    }

    fn insert_front(&mut self, note: Note) -> Result<&Note> {
        log::info!("created note {} ({})", note.id, note.title);
        self.current_id = Some(note.id.clone());
        self.notes.insert(0, note);
        self.persist()?;
        Ok(&self.notes[0])
    }

    fn fall_back_current(&mut self) {
        self.current_id = self.notes.first().map(|n| n.id.clone());
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.notes)?;
        self.backend.set(NOTES_KEY, &raw)?;
        self.save_status = SaveStatus::Saving;
        self.saving_since = Some(Instant::now());
        log::debug!("persisted {} notes", self.notes.len());
        Ok(())
    }
}

struct LoadedNotes {
    notes: Vec<Note>,
    /// The raw record, when some of it could not be read.
    unreadable: Option<String>,
}

impl LoadedNotes {
    fn welcome(unreadable: Option<String>) -> Self {
        Self {
            notes: vec![Note::welcome()],
            unreadable,
        }
    }
}

fn load_notes<B: KeyValueStore>(backend: &B) -> Result<LoadedNotes> {
    let Some(raw) = backend.get(NOTES_KEY)? else {
        log::info!("no stored notes, seeding welcome note");
        return Ok(LoadedNotes::welcome(None));
    };

    let items = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            log::warn!("note record is not an array, seeding welcome note");
            return Ok(LoadedNotes::welcome(Some(raw)));
        }
        Err(e) => {
            log::warn!("note record is not valid JSON ({}), seeding welcome note", e);
            return Ok(LoadedNotes::welcome(Some(raw)));
        }
    };

    if items.is_empty() {
        log::info!("stored note list is empty, seeding welcome note");
        return Ok(LoadedNotes::welcome(None));
    }

    let total = items.len();
    let notes: Vec<Note> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<Note>(item) {
            Ok(note) => Some(note),
            Err(e) => {
                log::warn!("skipping unreadable note #{}: {}", i, e);
                None
            }
        })
        .collect();

    if notes.len() == total {
        log::info!("loaded {} notes", total);
        return Ok(LoadedNotes {
            notes,
            unreadable: None,
        });
    }
    if notes.is_empty() {
        return Ok(LoadedNotes::welcome(Some(raw)));
    }
    log::info!("loaded {} of {} notes", notes.len(), total);
    Ok(LoadedNotes {
        notes,
        unreadable: Some(raw),
    })
}

fn load_theme<B: KeyValueStore>(backend: &B) -> Result<Theme> {
    let theme = match backend.get(THEME_KEY)? {
        Some(raw) => raw.parse::<Theme>().unwrap_or_else(|e: String| {
            log::warn!("{}, using light theme", e);
            Theme::default()
        }),
        None => Theme::default(),
    };
    Ok(theme)
}
