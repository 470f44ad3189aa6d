use livemark::api::LivemarkApi;
use livemark::config::LivemarkConfig;
use livemark::model::{Note, Theme, WELCOME_TITLE};
use livemark::store::fs_backend::FsBackend;
use livemark::store::{KeyValueStore, NoteStore, NOTES_BACKUP_KEY, NOTES_KEY, THEME_KEY};
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().to_path_buf());
    (dir, backend)
}

#[test]
fn test_fs_backend_basic_io() {
    let (_dir, backend) = setup();

    backend.set("greeting", "Hello World").unwrap();
    assert_eq!(backend.get("greeting").unwrap(), Some("Hello World".to_string()));

    backend.remove("greeting").unwrap();
    assert_eq!(backend.get("greeting").unwrap(), None);

    // Removing twice is fine
    backend.remove("greeting").unwrap();
}

#[test]
fn test_fs_backend_atomic_write_artifacts() {
    let (dir, backend) = setup();

    backend.set(NOTES_KEY, "[]").unwrap();
    backend.set(NOTES_KEY, "[ ]").unwrap();

    let on_disk = fs::read_to_string(dir.path().join(NOTES_KEY)).unwrap();
    assert_eq!(on_disk, "[ ]");

    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_fs_backend_creates_missing_root() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let backend = FsBackend::new(nested.clone());

    assert_eq!(backend.get(THEME_KEY).unwrap(), None);
    backend.set(THEME_KEY, "dark").unwrap();
    assert!(nested.join(THEME_KEY).exists());
}

#[test]
fn test_fs_backend_rejects_path_like_keys() {
    let (_dir, backend) = setup();

    assert!(backend.set("../escape", "x").is_err());
    assert!(backend.set(".hidden", "x").is_err());
    assert!(backend.set("", "x").is_err());
    assert!(backend.get("a/b").is_err());
}

#[test]
fn test_store_round_trip_on_disk() {
    let (dir, backend) = setup();
    let mut store = NoteStore::open(backend).unwrap();
    store.import_note("Plans", "# Plans").unwrap();
    store.set_theme(Theme::Dark).unwrap();
    let saved = store.notes().to_vec();

    let reopened = NoteStore::open(FsBackend::new(dir.path().to_path_buf())).unwrap();
    assert_eq!(reopened.notes(), saved.as_slice());
    assert_eq!(reopened.theme(), Theme::Dark);
}

#[test]
fn test_record_uses_camel_case_fields() {
    let (dir, backend) = setup();
    NoteStore::open(backend).unwrap();

    let raw = fs::read_to_string(dir.path().join(NOTES_KEY)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value[0];
    assert_eq!(first["title"], WELCOME_TITLE);
    assert!(first["createdAt"].is_string());
    assert!(first["updatedAt"].is_string());
}

#[test]
fn test_foreign_records_are_accepted() {
    let (dir, backend) = setup();
    let raw = r#"[{"id":"V1StGXR8_Z5jdHi6B-myT","title":"Old","content":"kept","createdAt":"2024-01-01T10:00:00.000Z","updatedAt":"2024-01-02T10:00:00.000Z"}]"#;
    fs::write(dir.path().join(NOTES_KEY), raw).unwrap();

    let store = NoteStore::open(backend).unwrap();
    let notes: &[Note] = store.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id.as_str(), "V1StGXR8_Z5jdHi6B-myT");
    assert_eq!(notes[0].content, "kept");
}

#[test]
fn test_corrupt_record_is_kept_until_first_change() {
    let (dir, backend) = setup();
    fs::write(dir.path().join(NOTES_KEY), "not json at all").unwrap();

    let mut store = NoteStore::open(backend).unwrap();
    assert_eq!(store.notes()[0].title, WELCOME_TITLE);

    // Opening leaves the record alone and keeps a copy beside it
    let raw = fs::read_to_string(dir.path().join(NOTES_KEY)).unwrap();
    assert_eq!(raw, "not json at all");
    let backup = fs::read_to_string(dir.path().join(NOTES_BACKUP_KEY)).unwrap();
    assert_eq!(backup, "not json at all");

    store.create_note().unwrap();
    let raw = fs::read_to_string(dir.path().join(NOTES_KEY)).unwrap();
    let stored: Vec<Note> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, store.notes());
}

#[test]
fn test_note_missing_timestamp_survives_reopen() {
    let (dir, backend) = setup();
    let raw = r#"[{"id":"a","title":"One","content":"1","createdAt":"2024-01-01T00:00:00.000Z","updatedAt":"2024-01-01T00:00:00.000Z"},{"id":"b","title":"Two","content":"only copy"}]"#;
    fs::write(dir.path().join(NOTES_KEY), raw).unwrap();

    let store = NoteStore::open(backend).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.notes()[1].content, "only copy");

    let reopened = NoteStore::open(FsBackend::new(dir.path().to_path_buf())).unwrap();
    assert_eq!(reopened.notes(), store.notes());
}

#[test]
fn test_api_reads_config_from_data_dir() {
    let (dir, backend) = setup();
    let mut config = LivemarkConfig::default();
    config.set("history-debounce-ms", "250").unwrap();
    config.save(dir.path()).unwrap();

    let loaded = LivemarkConfig::load(dir.path()).unwrap();
    let mut api = LivemarkApi::open(backend, loaded).unwrap();

    // The edit lands in history once the configured 250 ms window passes
    let start = Instant::now();
    api.edit("edited", start).unwrap();
    api.tick(start + Duration::from_millis(300));
    assert_eq!(api.history().len(), 2);
    assert_eq!(api.history().current().unwrap().content, "edited");
}
