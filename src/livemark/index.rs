//! # Note Selectors
//!
//! Ids are long and random, so user-facing clients address notes in one of
//! two ways:
//!
//! - **Position**: the 1-based place in the list (`1` is the top note).
//!   Positions shift as notes are created, deleted or reordered.
//! - **Id prefix**: any unambiguous prefix of a note id (`3f9a`). Stable for
//!   the note's lifetime.
//!
//! A string made only of digits is always read as a position.

use crate::error::{LivemarkError, Result};
use crate::model::{Note, NoteId};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSelector {
    Position(usize),
    IdPrefix(String),
}

impl fmt::Display for NoteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteSelector::Position(n) => write!(f, "{}", n),
            NoteSelector::IdPrefix(p) => write!(f, "{}", p),
        }
    }
}

impl FromStr for NoteSelector {
    type Err = LivemarkError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LivemarkError::Api("Empty note selector".to_string()));
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            return match s.parse::<usize>() {
                Ok(0) | Err(_) => Err(LivemarkError::Api(format!("Invalid position: {}", s))),
                Ok(n) => Ok(NoteSelector::Position(n)),
            };
        }
        Ok(NoteSelector::IdPrefix(s.to_string()))
    }
}

impl NoteSelector {
    /// Find the note this selector points at.
    pub fn resolve<'a>(&self, notes: &'a [Note]) -> Result<&'a Note> {
        match self {
            NoteSelector::Position(n) => notes
                .get(n - 1)
                .ok_or_else(|| LivemarkError::NoteNotFound(format!("no note at position {}", n))),
            NoteSelector::IdPrefix(prefix) => {
                let mut hits = notes.iter().filter(|n| n.id.as_str().starts_with(prefix.as_str()));
                match (hits.next(), hits.next()) {
                    (Some(note), None) => Ok(note),
                    (None, _) => Err(LivemarkError::NoteNotFound(prefix.clone())),
                    (Some(_), Some(_)) => Err(LivemarkError::Api(format!(
                        "Id prefix {} matches more than one note",
                        prefix
                    ))),
                }
            }
        }
    }
}

/// Parse and resolve several selectors, keeping their order and dropping
/// duplicates.
pub fn resolve_all<S: AsRef<str>>(notes: &[Note], inputs: &[S]) -> Result<Vec<NoteId>> {
    let mut ids: Vec<NoteId> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let selector: NoteSelector = input.as_ref().parse()?;
        let id = selector.resolve(notes)?.id.clone();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_with_id(id: &str, title: &str) -> Note {
        let mut note = Note::new(title.into(), String::new());
        note.id = NoteId::from(id);
        note
    }

    fn sample() -> Vec<Note> {
        vec![
            note_with_id("abc123", "first"),
            note_with_id("abd456", "second"),
            note_with_id("xyz789", "third"),
        ]
    }

    #[test]
    fn parses_positions_and_prefixes() {
        assert_eq!("2".parse::<NoteSelector>().unwrap(), NoteSelector::Position(2));
        assert_eq!(
            "ab".parse::<NoteSelector>().unwrap(),
            NoteSelector::IdPrefix("ab".into())
        );
        assert!("0".parse::<NoteSelector>().is_err());
        assert!("  ".parse::<NoteSelector>().is_err());
    }

    #[test]
    fn resolves_positions() {
        let notes = sample();
        let sel = NoteSelector::Position(3);
        assert_eq!(sel.resolve(&notes).unwrap().title, "third");
        assert!(NoteSelector::Position(4).resolve(&notes).is_err());
    }

    #[test]
    fn resolves_unique_prefixes_only() {
        let notes = sample();
        let unique = NoteSelector::IdPrefix("abd".into());
        assert_eq!(unique.resolve(&notes).unwrap().title, "second");

        let ambiguous = NoteSelector::IdPrefix("ab".into());
        assert!(matches!(ambiguous.resolve(&notes), Err(LivemarkError::Api(_))));

        let missing = NoteSelector::IdPrefix("q".into());
        assert!(matches!(missing.resolve(&notes), Err(LivemarkError::NoteNotFound(_))));
    }

    #[test]
    fn resolve_all_dedupes() {
        let notes = sample();
        let ids = resolve_all(&notes, &["1", "abc", "xyz"]).unwrap();
        assert_eq!(ids, vec![NoteId::from("abc123"), NoteId::from("xyz789")]);
    }
}
