use crate::model::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStats {
    pub words: usize,
    pub characters: usize,
}

pub fn run(note: &Note) -> NoteStats {
    NoteStats {
        words: note.content.split_whitespace().count(),
        characters: note.content.chars().count(),
    }
}
