use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;

/// One persisted memory. Field names match the JSON export format, so files
/// exported by older versions of the app re-import unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

impl MemoryEntry {
    pub fn new(
        title: String,
        date: String,
        description: String,
        image: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        MemoryEntry {
            id: Uuid::new_v4().to_string(),
            title,
            date,
            description,
            image,
            tags,
            favorite: false,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Long-form date for display ("January 5, 2026"); the raw string if it
    /// doesn't parse.
    pub fn display_date(&self) -> String {
        match NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            Ok(d) => d.format("%B %-d, %Y").to_string(),
            Err(_) => self.date.clone(),
        }
    }
}

/// Per-field validation messages for the entry form. All fields are checked
/// on every validation pass so the form can surface every problem at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.image.is_none()
    }
}

pub fn validate(title: &str, date: &str, description: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();

    let title = title.trim();
    if title.is_empty() {
        errors.title = Some("Please enter a title".into());
    } else if title.chars().count() > TITLE_MAX {
        errors.title = Some("Title must be less than 100 characters".into());
    }

    let date = date.trim();
    if date.is_empty() {
        errors.date = Some("Please select a date".into());
    } else if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        errors.date = Some("Please enter a valid date (YYYY-MM-DD)".into());
    }

    let description = description.trim();
    if description.is_empty() {
        errors.description = Some("Please enter a description".into());
    } else if description.chars().count() > DESCRIPTION_MAX {
        errors.description = Some("Description must be less than 1000 characters".into());
    }

    errors
}

/// Comma-separated tag input: split, trim, drop empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_gets_unique_id_and_defaults() {
        let a = MemoryEntry::new("A".into(), "2026-01-05".into(), "d".into(), None, vec![]);
        let b = MemoryEntry::new("B".into(), "2026-01-05".into(), "d".into(), None, vec![]);
        assert_ne!(a.id, b.id);
        assert!(!a.favorite);
        assert!(!a.created_at.is_empty());
    }

    #[test]
    fn title_boundary_is_exactly_100_chars() {
        let ok = "x".repeat(100);
        let too_long = "x".repeat(101);
        assert!(validate(&ok, "2026-01-05", "desc").is_empty());
        let errors = validate(&too_long, "2026-01-05", "desc");
        assert_eq!(
            errors.title.as_deref(),
            Some("Title must be less than 100 characters")
        );
    }

    #[test]
    fn description_boundary_is_exactly_1000_chars() {
        let ok = "y".repeat(1000);
        let too_long = "y".repeat(1001);
        assert!(validate("t", "2026-01-05", &ok).is_empty());
        assert!(validate("t", "2026-01-05", &too_long).description.is_some());
    }

    #[test]
    fn all_field_errors_surface_at_once() {
        let errors = validate("", "", "");
        assert_eq!(errors.title.as_deref(), Some("Please enter a title"));
        assert_eq!(errors.date.as_deref(), Some("Please select a date"));
        assert_eq!(
            errors.description.as_deref(),
            Some("Please enter a description")
        );
    }

    #[test]
    fn date_must_parse() {
        assert!(validate("t", "not-a-date", "d").date.is_some());
        assert!(validate("t", "2026-02-30", "d").date.is_some());
        assert!(validate("t", "2026-02-28", "d").is_empty());
    }

    #[test]
    fn tags_are_trimmed_and_empties_dropped() {
        assert_eq!(
            parse_tags(" beach , summer,, paris "),
            vec!["beach", "summer", "paris"]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn display_date_formats_or_falls_back() {
        let mut entry =
            MemoryEntry::new("t".into(), "2026-01-05".into(), "d".into(), None, vec![]);
        assert_eq!(entry.display_date(), "January 5, 2026");
        entry.date = "someday".into();
        assert_eq!(entry.display_date(), "someday");
    }

    #[test]
    fn optional_fields_tolerated_on_read() {
        let json = r#"{"id":"1","title":"t","date":"2026-01-05","description":"d"}"#;
        let entry: MemoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.image, None);
        assert!(entry.tags.is_empty());
        assert!(!entry.favorite);
        assert!(entry.created_at.is_empty());
    }
}
