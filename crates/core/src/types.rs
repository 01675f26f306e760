//! Domain types for the presentation document model.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

/// Background token given to slides that carry no theme of their own.
pub const STANDARD_BACKGROUND: &str = "bg-gradient-to-r from-gray-900 to-gray-800";

/// Text color token given to slides that carry no theme of their own.
pub const STANDARD_TEXT_COLOR: &str = "text-white";

/// Alphabet of the random suffix in generated slide ids.
const ID_SUFFIX_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix in generated slide ids.
const ID_SUFFIX_LEN: usize = 9;

/// Current time, truncated to the millisecond precision the JSON snapshot keeps.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Generate a fresh slide id: `slide_<millis>_<random base-36 suffix>`.
pub fn new_slide_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_SUFFIX_CHARS[rng.random_range(0..ID_SUFFIX_CHARS.len())] as char)
        .collect();
    format!("slide_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Generate a fresh presentation id: `pres_<millis>`.
pub fn new_presentation_id() -> String {
    format!("pres_{}", Utc::now().timestamp_millis())
}

/// A whole slide deck: ordered slides plus metadata.
///
/// Slides are held behind `Arc` so that a mutation can produce a new
/// presentation value while every untouched slide stays the same allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub id: String,

    pub title: String,

    /// Slides in display and export order.
    pub slides: Vec<Arc<Slide>>,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    /// Create an empty presentation with a generated id.
    pub fn new(title: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_presentation_id(),
            title: title.into(),
            slides: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The two-slide welcome deck the editor opens with.
    pub fn sample() -> Self {
        let mut welcome = Slide::new("1", SlideTemplate::Default, "Welcome to the Presentation");
        welcome.subtitle = Some("A Sample Slide Deck".to_string());
        welcome.body_content = vec![
            "This is a sample presentation".to_string(),
            "You can edit the content".to_string(),
            "Add new slides".to_string(),
            "And export to PowerPoint".to_string(),
        ];
        welcome.theme = Some(SlideTheme::standard());

        let mut second = Slide::new("2", SlideTemplate::Default, "Second Slide");
        second.body_content = vec![
            "Point 1".to_string(),
            "Point 2".to_string(),
            "Point 3".to_string(),
        ];
        second.theme = Some(SlideTheme::standard());

        let mut presentation = Self::new("Sample Presentation");
        presentation.id = "1".to_string();
        presentation.slides = vec![Arc::new(welcome), Arc::new(second)];
        presentation
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Index of the slide with the given id.
    pub fn position_of(&self, slide_id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == slide_id)
    }

    /// Look up a slide by id.
    pub fn slide(&self, slide_id: &str) -> Option<&Arc<Slide>> {
        self.slides.iter().find(|s| s.id == slide_id)
    }
}

/// One page of the presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,

    pub template: SlideTemplate,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// One entry per visual line or item; the index is meaningful.
    #[serde(default)]
    pub body_content: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<SlideImage>,

    /// Image reference used by older documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<SlideTheme>,
}

impl Slide {
    /// Create a slide with the given id, template, and title and nothing else.
    pub fn new(id: impl Into<String>, template: SlideTemplate, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template,
            title: title.into(),
            subtitle: None,
            body_content: Vec::new(),
            image: None,
            image_url: None,
            theme: None,
        }
    }

    /// The slide appended by "Add Slide".
    pub fn blank() -> Self {
        Self {
            body_content: vec!["Add your content here".to_string()],
            theme: Some(SlideTheme::standard()),
            ..Self::new(new_slide_id(), SlideTemplate::Default, "New Slide")
        }
    }

    /// The image URL to export: the structured image first, then the legacy field.
    pub fn resolved_image_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .map(|i| i.url.as_str())
            .filter(|u| !u.is_empty())
            .or_else(|| self.image_url.as_deref().filter(|u| !u.is_empty()))
    }

    /// Shallow-merge an update onto a copy of this slide.
    ///
    /// A legacy `imageUrl` update is stored as a structured image, the same
    /// way an import would read it. An explicit `image` in the same update wins.
    pub fn merged(&self, updates: SlideUpdates) -> Self {
        let mut slide = self.clone();
        if let Some(title) = updates.title {
            slide.title = title;
        }
        if let Some(subtitle) = updates.subtitle {
            slide.subtitle = subtitle;
        }
        if let Some(body) = updates.body_content {
            slide.body_content = body;
        }
        if let Some(image_url) = updates.image_url {
            slide.image_url = None;
            if let Some(url) = image_url {
                slide.image = Some(SlideImage::new(url));
            }
        }
        if let Some(image) = updates.image {
            slide.image = image;
        }
        if let Some(theme) = updates.theme {
            slide.theme = theme;
        }
        slide
    }
}

/// Partial update of a slide's editable fields.
///
/// The outer `Option` says whether the field is being set at all; for
/// optional slide fields the inner `Option` lets an update clear the value
/// (`"subtitle": null` in JSON).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideUpdates {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub subtitle: Option<Option<String>>,

    #[serde(default)]
    pub body_content: Option<Vec<String>>,

    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<SlideImage>>,

    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub theme: Option<Option<SlideTheme>>,
}

impl SlideUpdates {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn subtitle(subtitle: impl Into<String>) -> Self {
        Self {
            subtitle: Some(Some(subtitle.into())),
            ..Self::default()
        }
    }

    pub fn body_content(lines: Vec<String>) -> Self {
        Self {
            body_content: Some(lines),
            ..Self::default()
        }
    }

    pub fn image(image: SlideImage) -> Self {
        Self {
            image: Some(Some(image)),
            ..Self::default()
        }
    }

    pub fn theme(theme: SlideTheme) -> Self {
        Self {
            theme: Some(Some(theme)),
            ..Self::default()
        }
    }
}

/// Marks a field as present even when its JSON value is `null`.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Identifier of a slide layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideTemplate {
    Default,
    Hero,
    TableOfContents,
    GridContent,
    ImageRight,
    ImageLeft,
    FullImage,
    SplitImage,
    Gallery,
}

impl SlideTemplate {
    /// Every template identifier.
    pub const ALL: [SlideTemplate; 9] = [
        SlideTemplate::Default,
        SlideTemplate::Hero,
        SlideTemplate::TableOfContents,
        SlideTemplate::GridContent,
        SlideTemplate::ImageRight,
        SlideTemplate::ImageLeft,
        SlideTemplate::FullImage,
        SlideTemplate::SplitImage,
        SlideTemplate::Gallery,
    ];

    /// The identifier as it appears in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Hero => "hero",
            Self::TableOfContents => "table-of-contents",
            Self::GridContent => "grid-content",
            Self::ImageRight => "image-right",
            Self::ImageLeft => "image-left",
            Self::FullImage => "full-image",
            Self::SplitImage => "split-image",
            Self::Gallery => "gallery",
        }
    }

    /// Parse a template identifier. Unknown identifiers yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == id)
    }

    /// Whether the identifier names an image layout.
    pub fn is_image_layout(&self) -> bool {
        self.as_str().contains("image")
    }
}

impl fmt::Display for SlideTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an image sits on its slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    Left,
    #[default]
    Right,
    Center,
    Background,
}

impl ImagePosition {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            "background" => Some(Self::Background),
            _ => None,
        }
    }
}

/// How large an image is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

impl ImageSize {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

/// A slide's visual asset, referenced by URL or data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideImage {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default)]
    pub position: ImagePosition,

    #[serde(default)]
    pub size: ImageSize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_overlay: Option<bool>,
}

impl SlideImage {
    /// An image at the default position and size.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
            position: ImagePosition::default(),
            size: ImageSize::default(),
            background_overlay: None,
        }
    }
}

/// A slide's styling tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideTheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl SlideTheme {
    /// A theme with just a background and a text color.
    pub fn new(background: &str, text_color: &str) -> Self {
        Self {
            background: Some(background.to_string()),
            text_color: Some(text_color.to_string()),
            accent_color: None,
            font_family: None,
        }
    }

    /// Dark gradient with white text.
    pub fn standard() -> Self {
        Self::new(STANDARD_BACKGROUND, STANDARD_TEXT_COLOR)
    }
}

/// RFC 3339 timestamps with millisecond precision, as browsers write them.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
