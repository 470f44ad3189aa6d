//! # API Facade
//!
//! [`LivemarkApi`] is the single entry point for UI clients. It owns one
//! [`NoteStore`] and one [`HistoryEngine`] and keeps them in step:
//!
//! - Whenever the active note changes (selection, creation, import, or the
//!   active note being deleted) the history is reset and seeded with the
//!   new note's content, before any other capture can happen.
//! - [`LivemarkApi::edit`] writes the active note and captures history.
//! - [`LivemarkApi::undo`] and [`LivemarkApi::redo`] write the snapshot back
//!   into the active note without capturing it again.
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: collection rules live in the store, file handling
//!   in `commands/*.rs`.
//! - **I/O to the user**: no printing; results come back as data.
//!
//! ## Time
//!
//! Debounced history capture and the save indicator are deadline based.
//! Callers pass the current [`Instant`] to [`LivemarkApi::edit`] and poll
//! [`LivemarkApi::tick`] from their event loop.

use crate::commands::{self, export::ExportFormat, stats::NoteStats, CmdResult};
use crate::config::LivemarkConfig;
use crate::error::Result;
use crate::history::HistoryEngine;
use crate::model::{Note, NoteId, Theme};
use crate::store::{KeyValueStore, NoteStore, SaveStatus};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct LivemarkApi<B: KeyValueStore> {
    store: NoteStore<B>,
    history: HistoryEngine,
    config: LivemarkConfig,
}

impl<B: KeyValueStore> LivemarkApi<B> {
    pub fn open(backend: B, config: LivemarkConfig) -> Result<Self> {
        let store = NoteStore::open(backend)?.with_saved_indicator(config.saved_indicator());
        let history = HistoryEngine::new(config.history_debounce());
        let mut api = Self {
            store,
            history,
            config,
        };
        api.reseed_history();
        Ok(api)
    }

    pub fn store(&self) -> &NoteStore<B> {
        &self.store
    }

    pub fn history(&self) -> &HistoryEngine {
        &self.history
    }

    pub fn config(&self) -> &LivemarkConfig {
        &self.config
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn current(&self) -> Option<&Note> {
        self.store.current()
    }

    pub fn filter(&self, query: &str) -> Vec<&Note> {
        self.store.filter(query)
    }

    pub fn save_status(&self) -> SaveStatus {
        self.store.save_status()
    }

    // --- Active note & editing ---

    /// Switch the active note. Unknown ids leave everything untouched.
    pub fn select_note(&mut self, id: &NoteId) -> Result<bool> {
        self.track_active(|store| Ok(store.set_current(id)))
    }

    /// Replace the active note's content and record it in history.
    /// Returns false when there is no active note.
    pub fn edit(&mut self, content: impl Into<String>, now: Instant) -> Result<bool> {
        let Some(id) = self.store.current_id().cloned() else {
            return Ok(false);
        };
        let content = content.into();
        self.store.update_note_content(&id, content.as_str())?;
        self.history.capture(content, false, now);
        Ok(true)
    }

    pub fn undo(&mut self) -> Result<bool> {
        let Some(content) = self.history.undo().map(str::to_owned) else {
            return Ok(false);
        };
        self.apply_snapshot(content)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let Some(content) = self.history.redo().map(str::to_owned) else {
            return Ok(false);
        };
        self.apply_snapshot(content)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Advance deadline-driven state: pending history captures and the save
    /// indicator.
    pub fn tick(&mut self, now: Instant) {
        self.history.tick(now);
        self.store.tick(now);
    }

    // --- Collection ---

    pub fn create_note(&mut self) -> Result<NoteId> {
        self.track_active(|store| Ok(store.create_note()?.id.clone()))
    }

    pub fn import_note(&mut self, title: impl Into<String>, content: impl Into<String>) -> Result<NoteId> {
        self.track_active(|store| Ok(store.import_note(title, content)?.id.clone()))
    }

    pub fn import_files(&mut self, paths: &[PathBuf]) -> Result<CmdResult> {
        let config = self.config.clone();
        self.track_active(|store| commands::import::run(store, paths, &config))
    }

    pub fn delete_note(&mut self, id: &NoteId) -> Result<bool> {
        self.track_active(|store| store.delete_note(id))
    }

    pub fn delete_selected_notes(&mut self, ids: &[NoteId]) -> Result<usize> {
        self.track_active(|store| store.delete_selected_notes(ids))
    }

    pub fn rename_note(&mut self, id: &NoteId, title: &str) -> Result<bool> {
        self.store.rename_note(id, title)
    }

    pub fn reorder_notes(&mut self, from_id: &NoteId, to_id: &NoteId) -> Result<bool> {
        self.store.reorder_notes(from_id, to_id)
    }

    /// Write `content` into a note that may not be the active one. The
    /// active note's history is only touched when `id` is the active note.
    pub fn update_note_content(&mut self, id: &NoteId, content: impl Into<String>, now: Instant) -> Result<bool> {
        if self.store.current_id() == Some(id) {
            return self.edit(content, now);
        }
        self.store.update_note_content(id, content)
    }

    // --- Selection ---

    pub fn toggle_selection_mode(&mut self) {
        self.store.toggle_selection_mode();
    }

    pub fn toggle_note_selection(&mut self, id: &NoteId) {
        self.store.toggle_note_selection(id);
    }

    pub fn select_all(&mut self, query: &str) {
        self.store.select_all(query);
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    // --- Theme ---

    pub fn theme(&self) -> Theme {
        self.store.theme()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.store.set_theme(theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let next = self.store.theme().toggled();
        self.store.set_theme(next)?;
        Ok(next)
    }

    // --- Read-side commands ---

    pub fn note_stats(&self, id: &NoteId) -> Option<NoteStats> {
        self.store.get(id).map(commands::stats::run)
    }

    pub fn export_notes(
        &self,
        ids: &[NoteId],
        format: Option<ExportFormat>,
        dir: &Path,
    ) -> Result<CmdResult> {
        let format = format.unwrap_or(self.config.default_export_format);
        commands::export::run(&self.store, ids, format, dir)
    }

    // --- Internals ---

    /// Run a store operation and re-seed history if it changed which note
    /// is active. The store may switch notes and then fail to persist, so
    /// the check runs on the error path too.
    fn track_active<T>(&mut self, op: impl FnOnce(&mut NoteStore<B>) -> Result<T>) -> Result<T> {
        let before = self.store.current_id().cloned();
        let out = op(&mut self.store);
        if self.store.current_id() != before.as_ref() {
            self.reseed_history();
        }
        out
    }

    fn reseed_history(&mut self) {
        self.history.reset();
        if let Some(note) = self.store.current() {
            self.history.capture(note.content.clone(), true, Instant::now());
        }
    }

    fn apply_snapshot(&mut self, content: String) -> Result<bool> {
        let Some(id) = self.store.current_id().cloned() else {
            return Ok(false);
        };
        self.store.update_note_content(&id, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NEW_NOTE_TITLE, WELCOME_CONTENT, WELCOME_TITLE};
    use crate::store::mem_backend::MemBackend;
    use std::time::Duration;

    fn api() -> LivemarkApi<MemBackend> {
        LivemarkApi::open(MemBackend::new(), LivemarkConfig::default()).unwrap()
    }

    fn current_content(api: &LivemarkApi<MemBackend>) -> String {
        api.current().unwrap().content.clone()
    }

    #[test]
    fn fresh_start_has_welcome_note_and_seeded_history() {
        let api = api();
        assert_eq!(api.notes().len(), 1);
        assert_eq!(api.current().unwrap().title, WELCOME_TITLE);
        assert_eq!(api.history().len(), 1);
        assert!(!api.can_undo());
    }

    #[test]
    fn create_note_becomes_active_with_fresh_history() {
        let mut api = api();
        api.edit("changed welcome", Instant::now()).unwrap();

        let id = api.create_note().unwrap();
        assert_eq!(api.notes().len(), 2);
        assert_eq!(api.store().current_id(), Some(&id));
        assert_eq!(api.current().unwrap().title, NEW_NOTE_TITLE);
        assert_eq!(current_content(&api), "");
        assert_eq!(api.history().len(), 1);
        assert!(!api.can_undo());
    }

    #[test]
    fn edits_coalesce_and_undo_redo_round_trip() {
        let mut api = api();
        let start = Instant::now();

        api.edit("# Hola", start).unwrap();
        api.edit("# Hola mundo", start + Duration::from_millis(200)).unwrap();
        api.tick(start + Duration::from_millis(1300));
        assert_eq!(api.history().len(), 2);

        assert!(api.undo().unwrap());
        assert_eq!(current_content(&api), WELCOME_CONTENT);
        assert_eq!(api.history().len(), 2);

        assert!(api.redo().unwrap());
        assert_eq!(current_content(&api), "# Hola mundo");
        assert!(!api.redo().unwrap());
    }

    #[test]
    fn undo_does_not_record_history() {
        let mut api = api();
        let start = Instant::now();
        api.edit("one", start).unwrap();
        api.tick(start + Duration::from_secs(2));

        api.undo().unwrap();
        api.tick(start + Duration::from_secs(10));
        assert_eq!(api.history().len(), 2);
        assert!(api.can_redo());
    }

    #[test]
    fn switching_notes_resets_history() {
        let mut api = api();
        let first = api.store().current_id().cloned().unwrap();
        let second = api.import_note("other", "other body").unwrap();
        let start = Instant::now();

        api.edit("other body, edited", start).unwrap();
        assert!(api.select_note(&first).unwrap());

        // The pending capture from the other note must not land here.
        api.tick(start + Duration::from_secs(5));
        assert_eq!(api.history().len(), 1);
        assert_eq!(api.history().current().unwrap().content, WELCOME_CONTENT);
        assert!(!api.can_undo());

        assert!(api.select_note(&second).unwrap());
        assert_eq!(api.history().current().unwrap().content, "other body, edited");
    }

    #[test]
    fn selecting_unknown_note_changes_nothing() {
        let mut api = api();
        api.edit("draft", Instant::now()).unwrap();
        assert!(!api.select_note(&NoteId::from("nope")).unwrap());
        assert!(api.can_undo());
    }

    #[test]
    fn deleting_active_note_reseeds_from_fallback() {
        let mut api = api();
        let welcome = api.store().current_id().cloned().unwrap();
        let doomed = api.create_note().unwrap();
        api.edit("scratch", Instant::now()).unwrap();

        assert!(api.delete_note(&doomed).unwrap());
        assert_eq!(api.store().current_id(), Some(&welcome));
        assert_eq!(api.history().len(), 1);
        assert_eq!(api.history().current().unwrap().content, WELCOME_CONTENT);
    }

    #[test]
    fn deleting_everything_empties_history() {
        let mut api = api();
        let ids: Vec<_> = api.notes().iter().map(|n| n.id.clone()).collect();
        api.delete_selected_notes(&ids).unwrap();

        assert!(api.current().is_none());
        assert!(api.history().is_empty());
        assert!(!api.edit("nowhere", Instant::now()).unwrap());
    }

    #[test]
    fn failed_write_still_switches_history_to_new_note() {
        let mut api = api();
        let welcome = api.store().current_id().cloned().unwrap();
        api.edit("welcome, edited", Instant::now()).unwrap();

        api.store().backend().set_simulate_write_error(true);
        assert!(api.create_note().is_err());
        api.store().backend().set_simulate_write_error(false);

        // The new note is active in memory, so history must belong to it.
        assert_eq!(api.current().unwrap().title, NEW_NOTE_TITLE);
        assert_eq!(api.history().len(), 1);
        assert_eq!(api.history().current().unwrap().content, "");
        assert!(!api.undo().unwrap());
        assert_eq!(current_content(&api), "");
        assert_eq!(api.store().get(&welcome).unwrap().content, "welcome, edited");
    }

    #[test]
    fn failed_delete_of_active_note_reseeds_history() {
        let mut api = api();
        let doomed = api.import_note("doomed", "doomed body").unwrap();
        api.edit("doomed body, edited", Instant::now()).unwrap();

        api.store().backend().set_simulate_write_error(true);
        assert!(api.delete_note(&doomed).is_err());
        api.store().backend().set_simulate_write_error(false);

        assert_eq!(api.current().unwrap().title, WELCOME_TITLE);
        assert_eq!(api.history().current().unwrap().content, WELCOME_CONTENT);
        assert!(!api.undo().unwrap());
        assert_eq!(current_content(&api), WELCOME_CONTENT);
    }

    #[test]
    fn bulk_delete_of_selection() {
        let mut api = api();
        let a = api.import_note("A", "").unwrap();
        let b = api.import_note("B", "").unwrap();

        api.toggle_selection_mode();
        api.toggle_note_selection(&a);
        api.toggle_note_selection(&b);
        let chosen = api.store().selected().to_vec();
        assert_eq!(api.delete_selected_notes(&chosen).unwrap(), 2);

        assert_eq!(api.notes().len(), 1);
        assert!(!api.store().selection_mode());
        assert!(api.store().selected().is_empty());
    }

    #[test]
    fn editing_inactive_note_leaves_history_alone() {
        let mut api = api();
        let background = api.notes()[0].id.clone();
        api.create_note().unwrap();

        api.update_note_content(&background, "updated elsewhere", Instant::now())
            .unwrap();
        assert_eq!(api.store().get(&background).unwrap().content, "updated elsewhere");
        assert_eq!(api.history().len(), 1);
        assert!(!api.history().has_pending());
    }

    #[test]
    fn theme_toggle_persists() {
        let mut api = api();
        assert_eq!(api.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(api.theme(), Theme::Dark);
        assert_eq!(api.toggle_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn stats_for_known_note_only() {
        let mut api = api();
        let id = api.import_note("s", "two words").unwrap();
        assert_eq!(api.note_stats(&id).unwrap().words, 2);
        assert!(api.note_stats(&NoteId::from("nope")).is_none());
    }
}
