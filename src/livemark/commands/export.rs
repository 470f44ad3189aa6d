use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LivemarkError, Result};
use crate::model::{Note, NoteId};
use crate::store::{KeyValueStore, NoteStore};
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FALLBACK_NAME: &str = "nota";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    #[default]
    Md,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Md),
            other => Err(format!("Unsupported export format: {}", other)),
        }
    }
}

/// Export notes into `dir`.
///
/// One note is written as a plain file named after its title. Several notes
/// are bundled into a single `.tar.gz` archive.
pub fn run<B: KeyValueStore>(
    store: &NoteStore<B>,
    ids: &[NoteId],
    format: ExportFormat,
    dir: &Path,
) -> Result<CmdResult> {
    let notes = ids
        .iter()
        .map(|id| {
            store
                .get(id)
                .ok_or_else(|| LivemarkError::NoteNotFound(id.to_string()))
        })
        .collect::<Result<Vec<&Note>>>()?;

    let mut result = CmdResult::default();
    let path = match notes.as_slice() {
        [] => {
            result.add_message(CmdMessage::info("No notes to export."));
            return Ok(result);
        }
        [note] => write_single(note, format, dir)?,
        many => {
            let filename = format!("livemark-{}.tar.gz", Utc::now().format("%Y-%m-%d_%H-%M-%S"));
            let path = unique_path(dir, &filename);
            let file = File::create(&path).map_err(LivemarkError::Io)?;
            write_archive(file, many, format)?;
            path
        }
    };

    log::info!("exported {} notes to {}", notes.len(), path.display());
    result.add_message(CmdMessage::success(format!("Exported to {}", path.display())));
    Ok(result.with_paths(vec![path]))
}

fn write_single(note: &Note, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let filename = format!("{}.{}", export_stem(&note.title), format.extension());
    let path = unique_path(dir, &filename);
    std::fs::write(&path, &note.content).map_err(LivemarkError::Io)?;
    Ok(path)
}

fn write_archive<W: Write>(writer: W, notes: &[&Note], format: ExportFormat) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for note in notes {
        let entry_name = format!(
            "livemark/{}-{}.{}",
            export_stem(&note.title),
            note.id.short(),
            format.extension()
        );

        let mut header = tar::Header::new_gnu();
        header.set_size(note.content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(note.updated_at.timestamp().max(0) as u64);
        header.set_cksum();

        tar.append_data(&mut header, entry_name, note.content.as_bytes())
            .map_err(LivemarkError::Io)?;
    }

    tar.into_inner()
        .map_err(LivemarkError::Io)?
        .finish()
        .map_err(LivemarkError::Io)?;
    Ok(())
}

/// File-safe version of a title, falling back to "nota" when nothing usable
/// is left.
fn export_stem(title: &str) -> String {
    let safe = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string();
    if safe.chars().all(|c| c == '_') {
        FALLBACK_NAME.to_string()
    } else {
        safe
    }
}

/// `dir/name`, or `dir/name (n).ext` when that file already exists.
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match filename.split_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (filename, String::new()),
    };
    (1..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
