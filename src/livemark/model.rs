use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const WELCOME_TITLE: &str = "Bienvenido 👋";
pub const WELCOME_CONTENT: &str = "# Hola LiveMark\n\nEmpieza escribiendo Markdown aquí.";
pub const NEW_NOTE_TITLE: &str = "Nueva nota";

/// Opaque note identifier.
///
/// New ids are random UUIDs, but any string read back from storage is
/// accepted as-is so records written by other clients stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used for display and archive entry names.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A note as stored and exchanged.
///
/// Serialization always writes the canonical shape (camelCase fields,
/// RFC 3339 timestamps). Deserialization goes through [`StoredNote`] and
/// accepts records that are merely close to it, so one odd field never
/// costs the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredNote")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::generate(),
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn welcome() -> Self {
        Self::new(WELCOME_TITLE.to_string(), WELCOME_CONTENT.to_string())
    }

    pub fn untitled() -> Self {
        Self::new(NEW_NOTE_TITLE.to_string(), String::new())
    }

    pub fn matches(&self, query_lower: &str) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.content.to_lowercase().contains(query_lower)
    }
}

/// Lenient on-disk shape of a [`Note`].
///
/// - `id`: a string or a number; generated when missing.
/// - `title`, `content`: strings; other scalars are stringified, missing
///   means empty.
/// - `createdAt`, `updatedAt`: RFC 3339, a naive ISO date-time (read as
///   UTC), a plain date, or epoch milliseconds. A missing or unreadable
///   `updatedAt` falls back to `createdAt`, which falls back to now.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredNote {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<NoteId>,
    #[serde(default, deserialize_with = "lenient_text")]
    title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    content: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredNote> for Note {
    fn from(raw: StoredNote) -> Self {
        let created_at = raw.created_at.or(raw.updated_at).unwrap_or_else(Utc::now);
        Self {
            id: raw.id.unwrap_or_else(NoteId::generate),
            title: raw.title,
            content: raw.content,
            created_at,
            updated_at: raw.updated_at.unwrap_or(created_at),
        }
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NoteId>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => Some(NoteId(s)),
        Value::Number(n) => Some(NoteId(n.to_string())),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        // Keep anything else readable rather than dropping it
        other => other.to_string(),
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => parse_timestamp(&s),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

/// Parse the timestamp spellings found in note records.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    raw.parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_iso_timestamps() {
        let note = Note::new("Title".into(), "Body".into());
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["id"], note.id.as_str());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());

        let created = json["createdAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn accepts_foreign_ids() {
        let raw = r#"{"id":"V1StGXR8_Z5jdHi6B-myT","title":"t","content":"c",
            "createdAt":"2024-01-01T10:00:00.000Z","updatedAt":"2024-01-01T10:00:00.000Z"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.id.as_str(), "V1StGXR8_Z5jdHi6B-myT");
        assert_eq!(note.id.short(), "V1StGXR8");
    }

    #[test]
    fn partial_records_are_completed() {
        let raw = r#"{"id":42,"title":"Old","createdAt":"2024-03-05T08:30:00"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();

        assert_eq!(note.id.as_str(), "42");
        assert_eq!(note.title, "Old");
        assert_eq!(note.content, "");
        assert_eq!(note.created_at.to_rfc3339(), "2024-03-05T08:30:00+00:00");
        assert_eq!(note.updated_at, note.created_at);
    }

    #[test]
    fn missing_id_and_dates_are_generated() {
        let note: Note = serde_json::from_str(r#"{"content":"bare","updatedAt":"soon"}"#).unwrap();
        assert_eq!(note.id.as_str().len(), 32);
        assert_eq!(note.content, "bare");
        assert_eq!(note.updated_at, note.created_at);
    }

    #[test]
    fn non_string_text_is_kept_readable() {
        let note: Note = serde_json::from_str(r#"{"id":"a","title":7,"content":null}"#).unwrap();
        assert_eq!(note.title, "7");
        assert_eq!(note.content, "");
    }

    #[test]
    fn timestamp_spellings() {
        let expected = "2024-01-02T03:04:05Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(parse_timestamp("2024-01-02T03:04:05.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("1704164645000"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-02").map(|d| d.to_rfc3339()),
            Some("2024-01-02T00:00:00+00:00".to_string())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn canonical_shape_round_trips() {
        let note = Note::new("Title".into(), "Body".into());
        let back: Note = serde_json::from_str(&serde_json::to_string(&note).unwrap()).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = NoteId::generate();
        let b = NoteId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn theme_parses_and_toggles() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light\n".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
