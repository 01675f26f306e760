//! JSON snapshots and export file names.

use crate::error::{Error, Result};
use crate::normalize::normalize_presentation;
use crate::types::Presentation;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Characters that may not appear in an export file name.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]").unwrap());

/// Stem used when the presentation has no title.
const UNTITLED_STEM: &str = "untitled";

/// Parse and normalize an imported JSON document.
///
/// Only a syntax error fails; any parsed value becomes a presentation.
pub fn import_json(text: &str) -> Result<Presentation> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))?;
    Ok(normalize_presentation(&value))
}

/// Serialize a presentation as indented JSON.
pub fn to_json(presentation: &Presentation) -> Result<String> {
    serde_json::to_string_pretty(presentation).map_err(|e| Error::Serialization(e.to_string()))
}

/// File name stem for a title: lower-cased, with everything outside `[a-z0-9]` turned into `_`.
pub fn file_stem(title: &str) -> String {
    let title = if title.is_empty() { UNTITLED_STEM } else { title };
    UNSAFE_FILENAME_CHARS
        .replace_all(&title.to_ascii_lowercase(), "_")
        .into_owned()
}

/// `<stem>.json`
pub fn json_filename(title: &str) -> String {
    format!("{}.json", file_stem(title))
}

/// `<stem>_<date>.pptx`, or `<stem>.pptx` without a date.
pub fn deck_filename(title: &str, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!("{}_{}.pptx", file_stem(title), date.format("%Y-%m-%d")),
        None => format!("{}.pptx", file_stem(title)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use crate::types::{SlideImage, SlideTemplate, SlideUpdates};

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("My Deck"), "my_deck");
        assert_eq!(file_stem("Q3 Results: 2024!"), "q3_results__2024_");
        assert_eq!(file_stem(""), "untitled");
        assert_eq!(file_stem("Café"), "caf_");
    }

    #[test]
    fn test_filenames() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17);
        assert_eq!(json_filename("My Deck"), "my_deck.json");
        assert_eq!(deck_filename("My Deck", date), "my_deck_2024-05-17.pptx");
        assert_eq!(deck_filename("My Deck", None), "my_deck.pptx");
    }

    #[test]
    fn test_import_rejects_bad_syntax() {
        let err = import_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::InvalidJson(_)));
        assert!(err.to_string().starts_with("Invalid JSON format"));
    }

    #[test]
    fn test_import_accepts_any_value() {
        let presentation = import_json("[1, 2, 3]").unwrap();
        assert!(presentation.slides.is_empty());
    }

    #[test]
    fn test_snapshot_is_indented_camel_case() {
        let json = to_json(&Presentation::sample()).unwrap();
        assert!(json.contains("\n  \"slides\": ["));
        assert!(json.contains("\"bodyContent\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("\"imageUrl\""));
    }

    #[test]
    fn test_round_trip_of_sample_deck() {
        let sample = Presentation::sample();
        let restored = import_json(&to_json(&sample).unwrap()).unwrap();
        assert_eq!(restored, sample);
    }

    #[test]
    fn test_round_trip_of_edited_deck() {
        let mut store = DocumentStore::with_presentation(Presentation::sample());
        store.update_slide("1", serde_json::from_str(r#"{"imageUrl": "a.png"}"#).unwrap());
        store.update_slide_template("2", SlideTemplate::ImageLeft);
        store.update_slide(
            "2",
            SlideUpdates::image(SlideImage::new("data:image/png;base64,AAAA")),
        );
        store.update_slide_template("1", SlideTemplate::SplitImage);
        store.add_slide();
        store.move_slide(2, 0);

        let edited = store.snapshot().unwrap();
        let restored = import_json(&to_json(&edited).unwrap()).unwrap();
        assert_eq!(&restored, edited.as_ref());
    }
}
