use chrono::{DateTime, Utc};
use colored::Colorize;
use livemark::commands::stats::NoteStats;
use livemark::commands::{CmdMessage, MessageLevel};
use livemark::model::{Note, NoteId};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 9;
const ACTIVE_MARKER: &str = "●";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// One line per note: position, title with a content preview, short id and
/// last edit time. `notes` pairs each note with its 1-based position in the
/// full collection so filtered lists keep addressable positions.
pub(super) fn print_notes(notes: &[(usize, &Note)], active: Option<&NoteId>) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    for (position, note) in notes {
        let is_active = active == Some(&note.id);
        let left_prefix = if is_active {
            format!("  {} ", ACTIVE_MARKER)
        } else {
            "    ".to_string()
        };

        let idx_str = format!("{}. ", position);
        let time_ago = format_time_ago(note.updated_at);

        let preview: String = note
            .content
            .chars()
            .take(50)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let title_content = if preview.trim().is_empty() {
            note.title.clone()
        } else {
            format!("{} {}", note.title, preview)
        };

        let fixed_width = left_prefix.width() + idx_str.width() + ID_WIDTH + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&title_content, available);
        let padding = available.saturating_sub(title_display.width());

        let idx_colored = if is_active {
            idx_str.yellow()
        } else {
            idx_str.normal()
        };

        let id_str = format!("{:>width$}", note.id.short(), width = ID_WIDTH);

        println!(
            "{}{}{}{}{}{}",
            left_prefix,
            idx_colored,
            title_display,
            " ".repeat(padding),
            id_str.dimmed(),
            time_ago.dimmed()
        );
    }
}

pub(super) fn print_full_note(position: usize, note: &Note) {
    println!("{} {}", format!("{}.", position).yellow(), note.title.bold());
    println!(
        "{}",
        format!("{}  updated {}", note.id, format_time_ago(note.updated_at).trim()).dimmed()
    );
    println!("--------------------------------");
    println!("{}", note.content);
}

pub(super) fn print_stats(note: &Note, stats: &NoteStats) {
    println!("{}", note.title.bold());
    println!("Words: {}", stats.words);
    println!("Characters: {}", stats.characters);
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
