use crate::commands::{CmdMessage, CmdResult};
use crate::config::LivemarkConfig;
use crate::error::{LivemarkError, Result};
use crate::store::{KeyValueStore, NoteStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Import files as notes. Directories are scanned (non-recursively) for
/// files with one of the configured import extensions; files named
/// explicitly are imported whatever their extension.
///
/// Unreadable files produce a warning and never reach the store.
pub fn run<B: KeyValueStore>(
    store: &mut NoteStore<B>,
    paths: &[PathBuf],
    config: &LivemarkConfig,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for path in paths {
        if path.is_dir() {
            let mut files = Vec::new();
            for entry in fs::read_dir(path).map_err(LivemarkError::Io)? {
                let sub_path = entry.map_err(LivemarkError::Io)?.path();
                let accepted = sub_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| config.accepts_import(n));
                if sub_path.is_file() && accepted {
                    files.push(sub_path);
                }
            }
            files.sort();
            for file in files {
                import_file(store, &file, &mut result)?;
            }
        } else if path.is_file() {
            import_file(store, path, &mut result)?;
        } else {
            result.add_message(CmdMessage::warning(format!(
                "Path not found: {}",
                path.display()
            )));
        }
    }

    result.add_message(CmdMessage::success(format!(
        "Total imported: {}",
        result.affected_notes.len()
    )));
    Ok(result)
}

fn import_file<B: KeyValueStore>(
    store: &mut NoteStore<B>,
    path: &Path,
    result: &mut CmdResult,
) -> Result<()> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("could not read {}: {}", path.display(), e);
            result.add_message(CmdMessage::warning(format!(
                "Failed to import {}: {}",
                path.display(),
                e
            )));
            return Ok(());
        }
    };

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title = title_from_filename(&filename);

    let note = store.import_note(title, content)?.clone();
    result.add_message(CmdMessage::info(format!("Imported: {}", path.display())));
    result.affected_notes.push(note);
    Ok(())
}

/// Drop the last extension from a file name: `report.md` becomes `report`.
/// Names that would become empty (`.md`) are kept whole.
pub fn title_from_filename(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(dot) if dot + 1 < filename.len() => &filename[..dot],
        _ => filename,
    };
    if stem.is_empty() {
        filename.to_string()
    } else {
        stem.to_string()
    }
}
