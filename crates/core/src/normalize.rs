//! Import normalization.
//!
//! Turns an untrusted, already-parsed JSON object graph into a well-formed
//! [`Presentation`]. Nothing here fails: every missing or malformed field is
//! replaced by a default. Two older document shapes are accepted, the outline
//! shape (an `imageSearch` string per slide, `presentationTitle` at the top)
//! and the editor's own shape (`image` object or legacy `imageUrl`).

use crate::types::{
    new_presentation_id, new_slide_id, now, ImagePosition, ImageSize, Presentation, Slide,
    SlideImage, SlideTemplate, SlideTheme,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Title given to slides imported without one.
pub const UNTITLED_SLIDE: &str = "Untitled Slide";

/// Body given to slides imported without one.
pub const PLACEHOLDER_BODY: &str = "Add content here";

/// Title given to presentations imported without one.
pub const UNTITLED_PRESENTATION: &str = "Untitled Presentation";

/// Where an imported slide's picture comes from, decided once per slide.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageIntent {
    /// A structured `image` object with a URL.
    Structured(SlideImage),
    /// An outline-shape `imageSearch` string.
    Search(String),
    /// A legacy `imageUrl` string.
    LegacyUrl(String),
    /// No picture.
    Absent,
}

impl ImageIntent {
    /// Whether the slide asked for a picture at all.
    pub fn has_image(&self) -> bool {
        !matches!(self, ImageIntent::Absent)
    }

    /// The picture the slide ends up with.
    pub fn into_image(self) -> Option<SlideImage> {
        match self {
            ImageIntent::Structured(image) => Some(image),
            ImageIntent::Search(url) | ImageIntent::LegacyUrl(url) => Some(SlideImage::new(url)),
            ImageIntent::Absent => None,
        }
    }
}

/// Decide which of the supported shapes supplies the slide's picture.
///
/// Priority: a structured `image` object, then `imageSearch`, then `imageUrl`.
pub fn classify_image(raw: &Map<String, Value>) -> ImageIntent {
    if let Some(image) = raw.get("image").and_then(Value::as_object) {
        if let Some(url) = non_empty_str(image.get("url")) {
            return ImageIntent::Structured(SlideImage {
                url: url.to_string(),
                alt: non_empty_str(image.get("alt")).map(str::to_string),
                position: image
                    .get("position")
                    .and_then(Value::as_str)
                    .and_then(ImagePosition::from_id)
                    .unwrap_or_default(),
                size: image
                    .get("size")
                    .and_then(Value::as_str)
                    .and_then(ImageSize::from_id)
                    .unwrap_or_default(),
                background_overlay: image.get("backgroundOverlay").and_then(Value::as_bool),
            });
        }
    }

    if let Some(search) = non_empty_str(raw.get("imageSearch")) {
        return ImageIntent::Search(search.to_string());
    }

    if let Some(url) = non_empty_str(raw.get("imageUrl")) {
        return ImageIntent::LegacyUrl(url.to_string());
    }

    ImageIntent::Absent
}

/// Normalize one imported slide.
pub fn normalize_slide(raw: &Value) -> Slide {
    let empty = Map::new();
    let fields = match raw.as_object() {
        Some(fields) => fields,
        None => {
            log::warn!("Imported slide is not an object; using defaults");
            &empty
        }
    };

    let image = classify_image(fields);

    let template = fields
        .get("template")
        .and_then(Value::as_str)
        .and_then(SlideTemplate::from_id)
        .unwrap_or(if image.has_image() {
            SlideTemplate::ImageRight
        } else {
            SlideTemplate::Default
        });

    let body_content = match fields.get("bodyContent") {
        Some(Value::Array(items)) => items.iter().map(body_line).collect(),
        _ => vec![PLACEHOLDER_BODY.to_string()],
    };

    let theme = match fields.get("theme") {
        Some(Value::Object(theme)) => parse_theme(theme),
        _ => SlideTheme::standard(),
    };

    Slide {
        id: identifier(fields.get("id")).unwrap_or_else(new_slide_id),
        template,
        title: non_empty_str(fields.get("title"))
            .unwrap_or(UNTITLED_SLIDE)
            .to_string(),
        subtitle: non_empty_str(fields.get("subtitle")).map(str::to_string),
        body_content,
        image: image.into_image(),
        image_url: None,
        theme: Some(theme),
    }
}

/// Normalize an imported presentation.
///
/// The result may have no slides; keeping at least one slide loaded is the
/// store's job.
pub fn normalize_presentation(raw: &Value) -> Presentation {
    let empty = Map::new();
    let fields = match raw.as_object() {
        Some(fields) => fields,
        None => {
            log::warn!("Imported presentation is not an object; using defaults");
            &empty
        }
    };

    let title = non_empty_str(fields.get("presentationTitle"))
        .or_else(|| non_empty_str(fields.get("title")))
        .unwrap_or(UNTITLED_PRESENTATION)
        .to_string();

    let slides = match fields.get("slides") {
        Some(Value::Array(slides)) => slides.iter().map(|s| Arc::new(normalize_slide(s))).collect(),
        Some(other) => {
            log::warn!("Imported slides field is not an array ({}); ignoring it", type_name(other));
            Vec::new()
        }
        None => Vec::new(),
    };

    Presentation {
        id: identifier(fields.get("id")).unwrap_or_else(new_presentation_id),
        title,
        slides,
        created_at: parse_timestamp(fields.get("createdAt")).unwrap_or_else(now),
        updated_at: parse_timestamp(fields.get("updatedAt")).unwrap_or_else(now),
    }
}

/// Parse a timestamp given as an RFC 3339 string, a date string, or epoch milliseconds.
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
}

fn parse_theme(theme: &Map<String, Value>) -> SlideTheme {
    let field = |name: &str| theme.get(name).and_then(Value::as_str).map(str::to_string);
    SlideTheme {
        background: field("background"),
        text_color: field("textColor"),
        accent_color: field("accentColor"),
        font_family: field("fontFamily"),
    }
}

/// One body entry; non-string entries keep their slot so indices stay aligned.
fn body_line(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A usable identifier: a non-empty string, or a number written as one.
fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
