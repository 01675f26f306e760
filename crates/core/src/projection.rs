//! Export projection.
//!
//! Maps each slide to a background fill and an ordered list of positioned
//! elements, and drives a [`DeckWriter`] with them. The projection is a pure
//! function of the presentation: no clock, no randomness, no I/O.
//!
//! Positions are in inches on a 10 × 5.625 inch (16:9) slide.

use crate::error::Result;
use crate::types::{Presentation, Slide, SlideTemplate};
use serde::Serialize;

/// Slide width in inches.
pub const SLIDE_WIDTH: f64 = 10.0;

/// Slide height in inches.
pub const SLIDE_HEIGHT: f64 = 5.625;

/// Fill for backgrounds without a recognized theme token.
pub const FALLBACK_FILL: &str = "1A1A1A";

/// Background tokens with a dedicated fill.
const BACKGROUND_FILLS: [(&str, &str); 2] = [
    ("bg-gradient-to-r from-gray-900 to-gray-800", "1F2937"),
    ("bg-gradient-to-r from-blue-900 to-blue-800", "1E3A8A"),
];

const TEXT_COLOR: &str = "FFFFFF";
const LEFT_MARGIN: f64 = 0.5;
const WIDE_WIDTH: f64 = 9.0;
const NARROW_WIDTH: f64 = 4.5;

const TITLE_Y: f64 = 0.5;
const TITLE_HEIGHT: f64 = 1.0;
const TITLE_FONT_SIZE: u32 = 36;

const SUBTITLE_Y: f64 = 1.7;
const SPLIT_SUBTITLE_Y: f64 = 1.4;
const SUBTITLE_HEIGHT: f64 = 0.5;
const SUBTITLE_FONT_SIZE: u32 = 24;

const BODY_Y: f64 = 2.0;
const BODY_Y_WITH_SUBTITLE: f64 = 2.5;
const SPLIT_BODY_Y: f64 = 1.8;
const SPLIT_BODY_Y_WITH_SUBTITLE: f64 = 2.2;
const IMAGE_LEFT_BODY_X: f64 = 5.0;
const BODY_HEIGHT: f64 = 3.0;
const BODY_FONT_SIZE: u32 = 18;

const IMAGE_RIGHT_FRAME: Frame = Frame::new(5.25, 1.0, 4.25, 3.75);
const IMAGE_LEFT_FRAME: Frame = Frame::new(0.5, 1.0, 4.25, 3.75);
const SPLIT_IMAGE_FRAME: Frame = Frame::new(5.0, 0.0, 5.0, SLIDE_HEIGHT);
const GENERIC_IMAGE_FRAME: Frame = Frame::new(6.0, 1.0, 3.0, 3.0);

/// Deck-level settings for an export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Author recorded in the deck's properties.
    author: String,
    /// Whether the deck filename carries the export date.
    include_date: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            author: "Slide Deck Editor".to_string(),
            include_date: true,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_date(mut self, include_date: bool) -> Self {
        self.include_date = include_date;
        self
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn include_date(&self) -> bool {
        self.include_date
    }
}

/// A rectangle on the slide, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

/// Which slide field a text block shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRole {
    Title,
    Subtitle,
}

/// A single-paragraph text box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub role: TextRole,
    pub text: String,
    pub frame: Frame,
    pub font_size: u32,
    pub bold: bool,
    pub color: String,
    pub align: Align,
}

/// A text box with one bulleted paragraph per item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletList {
    pub items: Vec<String>,
    pub frame: Frame,
    pub font_size: u32,
    pub color: String,
}

/// A picture placed on the slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePlacement {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    pub frame: Frame,
}

/// One positioned element of an exported slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlideElement {
    Text(TextBlock),
    Bullets(BulletList),
    Image(ImagePlacement),
}

/// Everything the deck writer needs for one slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideProjection {
    /// Background fill as an RGB hex string.
    pub background: String,
    /// Elements in drawing order: title, subtitle, body, image.
    pub elements: Vec<SlideElement>,
}

/// Receives a projected deck and encodes it into a file format.
pub trait DeckWriter {
    /// Record deck-level properties.
    fn set_properties(&mut self, title: &str, author: &str);

    /// Start a new slide with the given background fill.
    fn begin_slide(&mut self, background: &str) -> Result<()>;

    fn add_text(&mut self, block: &TextBlock) -> Result<()>;

    fn add_bullets(&mut self, list: &BulletList) -> Result<()>;

    /// Add a picture. Failures here are logged by the caller and skipped.
    fn add_image(&mut self, image: &ImagePlacement) -> Result<()>;

    /// Encode the deck and return the file bytes.
    fn finish(&mut self) -> Result<Vec<u8>>;
}

/// Fill color for a theme background token. Unknown or missing tokens get the fallback.
pub fn background_fill(token: Option<&str>) -> &'static str {
    token
        .and_then(|t| BACKGROUND_FILLS.iter().find(|(known, _)| *known == t))
        .map(|(_, fill)| *fill)
        .unwrap_or(FALLBACK_FILL)
}

/// Where a template puts its picture.
pub fn image_frame(template: SlideTemplate) -> Frame {
    match template {
        SlideTemplate::ImageRight => IMAGE_RIGHT_FRAME,
        SlideTemplate::ImageLeft => IMAGE_LEFT_FRAME,
        SlideTemplate::SplitImage => SPLIT_IMAGE_FRAME,
        _ => GENERIC_IMAGE_FRAME,
    }
}

fn text_width(template: SlideTemplate) -> f64 {
    if template.is_image_layout() {
        NARROW_WIDTH
    } else {
        WIDE_WIDTH
    }
}

fn body_y(split: bool, has_subtitle: bool) -> f64 {
    match (split, has_subtitle) {
        (true, true) => SPLIT_BODY_Y_WITH_SUBTITLE,
        (true, false) => SPLIT_BODY_Y,
        (false, true) => BODY_Y_WITH_SUBTITLE,
        (false, false) => BODY_Y,
    }
}

/// Project one slide.
pub fn project_slide(slide: &Slide) -> SlideProjection {
    let template = slide.template;
    let split = template == SlideTemplate::SplitImage;
    let width = text_width(template);
    let subtitle = slide.subtitle.as_deref().filter(|s| !s.is_empty());

    let mut elements = Vec::with_capacity(4);

    if !slide.title.is_empty() {
        elements.push(SlideElement::Text(TextBlock {
            role: TextRole::Title,
            text: slide.title.clone(),
            frame: Frame::new(LEFT_MARGIN, TITLE_Y, width, TITLE_HEIGHT),
            font_size: TITLE_FONT_SIZE,
            bold: true,
            color: TEXT_COLOR.to_string(),
            align: if split { Align::Center } else { Align::Left },
        }));
    }

    if let Some(subtitle) = subtitle {
        let y = if split { SPLIT_SUBTITLE_Y } else { SUBTITLE_Y };
        elements.push(SlideElement::Text(TextBlock {
            role: TextRole::Subtitle,
            text: subtitle.to_string(),
            frame: Frame::new(LEFT_MARGIN, y, width, SUBTITLE_HEIGHT),
            font_size: SUBTITLE_FONT_SIZE,
            bold: false,
            color: TEXT_COLOR.to_string(),
            align: Align::Left,
        }));
    }

    if !slide.body_content.is_empty() {
        let x = if template == SlideTemplate::ImageLeft {
            IMAGE_LEFT_BODY_X
        } else {
            LEFT_MARGIN
        };
        elements.push(SlideElement::Bullets(BulletList {
            items: slide.body_content.clone(),
            frame: Frame::new(x, body_y(split, subtitle.is_some()), width, BODY_HEIGHT),
            font_size: BODY_FONT_SIZE,
            color: TEXT_COLOR.to_string(),
        }));
    }

    if let Some(url) = slide.resolved_image_url() {
        elements.push(SlideElement::Image(ImagePlacement {
            url: url.to_string(),
            alt: slide.image.as_ref().and_then(|i| i.alt.clone()),
            frame: image_frame(template),
        }));
    }

    let background = slide.theme.as_ref().and_then(|t| t.background.as_deref());
    SlideProjection {
        background: background_fill(background).to_string(),
        elements,
    }
}

/// Project every slide, in order.
pub fn project_presentation(presentation: &Presentation) -> Vec<SlideProjection> {
    presentation
        .slides
        .iter()
        .map(|slide| project_slide(slide))
        .collect()
}

/// Feed a presentation through `writer` and return the encoded deck.
///
/// A picture the writer cannot add is logged and skipped; any other writer
/// failure aborts the export.
pub fn write_deck<W: DeckWriter + ?Sized>(
    presentation: &Presentation,
    writer: &mut W,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    let title = if presentation.title.is_empty() {
        crate::normalize::UNTITLED_PRESENTATION
    } else {
        presentation.title.as_str()
    };
    writer.set_properties(title, options.author());

    for (index, projection) in project_presentation(presentation).iter().enumerate() {
        writer.begin_slide(&projection.background)?;
        for element in &projection.elements {
            match element {
                SlideElement::Text(block) => writer.add_text(block)?,
                SlideElement::Bullets(list) => writer.add_bullets(list)?,
                SlideElement::Image(image) => {
                    if let Err(e) = writer.add_image(image) {
                        log::warn!("Skipping image on slide {}: {}", index + 1, e);
                    }
                }
            }
        }
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{SlideImage, SlideTheme};

    fn slide(template: SlideTemplate) -> Slide {
        let mut slide = Slide::new("s", template, "Title");
        slide.body_content = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        slide
    }

    fn frames(projection: &SlideProjection) -> Vec<Frame> {
        projection
            .elements
            .iter()
            .map(|e| match e {
                SlideElement::Text(t) => t.frame,
                SlideElement::Bullets(b) => b.frame,
                SlideElement::Image(i) => i.frame,
            })
            .collect()
    }

    #[test]
    fn test_background_mapping_is_total() {
        assert_eq!(background_fill(Some("bg-gradient-to-r from-gray-900 to-gray-800")), "1F2937");
        assert_eq!(background_fill(Some("bg-gradient-to-r from-blue-900 to-blue-800")), "1E3A8A");
        assert_eq!(background_fill(Some("bg-pink-500")), FALLBACK_FILL);
        assert_eq!(background_fill(Some("")), FALLBACK_FILL);
        assert_eq!(background_fill(None), FALLBACK_FILL);
    }

    #[test]
    fn test_slide_without_theme_gets_fallback() {
        assert_eq!(project_slide(&slide(SlideTemplate::Default)).background, FALLBACK_FILL);

        let mut themed = slide(SlideTemplate::Default);
        themed.theme = Some(SlideTheme::standard());
        assert_eq!(project_slide(&themed).background, "1F2937");
    }

    #[test]
    fn test_element_order_and_presence() {
        let mut s = slide(SlideTemplate::ImageRight);
        s.subtitle = Some("Sub".to_string());
        s.image = Some(SlideImage::new("a.png"));

        let projection = project_slide(&s);
        assert_eq!(projection.elements.len(), 4);
        assert!(matches!(&projection.elements[0], SlideElement::Text(t) if t.role == TextRole::Title));
        assert!(matches!(&projection.elements[1], SlideElement::Text(t) if t.role == TextRole::Subtitle));
        assert!(matches!(&projection.elements[2], SlideElement::Bullets(b) if b.items == vec!["one", "two", "three"]));
        assert!(matches!(&projection.elements[3], SlideElement::Image(i) if i.url == "a.png"));
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let mut s = Slide::new("s", SlideTemplate::Default, "");
        s.subtitle = Some(String::new());
        assert!(project_slide(&s).elements.is_empty());
    }

    #[test]
    fn test_widths_follow_template_name() {
        let wide = project_slide(&slide(SlideTemplate::Hero));
        assert_eq!(frames(&wide)[0].w, WIDE_WIDTH);

        for template in [
            SlideTemplate::ImageRight,
            SlideTemplate::ImageLeft,
            SlideTemplate::FullImage,
            SlideTemplate::SplitImage,
        ] {
            let narrow = project_slide(&slide(template));
            assert_eq!(frames(&narrow)[0].w, NARROW_WIDTH, "{}", template);
            assert_eq!(frames(&narrow)[1].w, NARROW_WIDTH, "{}", template);
        }
    }

    #[test]
    fn test_title_centered_only_for_split_image() {
        let split = project_slide(&slide(SlideTemplate::SplitImage));
        assert!(matches!(&split.elements[0], SlideElement::Text(t) if t.align == Align::Center && t.bold));

        let other = project_slide(&slide(SlideTemplate::ImageRight));
        assert!(matches!(&other.elements[0], SlideElement::Text(t) if t.align == Align::Left));
    }

    #[test]
    fn test_body_offsets() {
        let mut plain = slide(SlideTemplate::Default);
        assert_eq!(frames(&project_slide(&plain))[1].y, BODY_Y);
        plain.subtitle = Some("Sub".to_string());
        let with_sub = frames(&project_slide(&plain));
        assert_eq!(with_sub[1].y, SUBTITLE_Y);
        assert_eq!(with_sub[2].y, BODY_Y_WITH_SUBTITLE);

        let mut split = slide(SlideTemplate::SplitImage);
        assert_eq!(frames(&project_slide(&split))[1].y, SPLIT_BODY_Y);
        split.subtitle = Some("Sub".to_string());
        let split_sub = frames(&project_slide(&split));
        assert_eq!(split_sub[1].y, SPLIT_SUBTITLE_Y);
        assert_eq!(split_sub[2].y, SPLIT_BODY_Y_WITH_SUBTITLE);
    }

    #[test]
    fn test_body_shifts_right_for_image_left() {
        let left = frames(&project_slide(&slide(SlideTemplate::ImageLeft)));
        assert_eq!(left[1].x, IMAGE_LEFT_BODY_X);
        assert_eq!(left[0].x, LEFT_MARGIN);

        let right = frames(&project_slide(&slide(SlideTemplate::ImageRight)));
        assert_eq!(right[1].x, LEFT_MARGIN);
    }

    #[test]
    fn test_image_frames_by_template() {
        assert_eq!(image_frame(SlideTemplate::ImageRight), IMAGE_RIGHT_FRAME);
        assert_eq!(image_frame(SlideTemplate::ImageLeft), IMAGE_LEFT_FRAME);
        assert_eq!(image_frame(SlideTemplate::SplitImage), SPLIT_IMAGE_FRAME);
        assert_eq!(image_frame(SlideTemplate::Hero), GENERIC_IMAGE_FRAME);
        assert_eq!(image_frame(SlideTemplate::FullImage), GENERIC_IMAGE_FRAME);
    }

    #[test]
    fn test_legacy_image_url_is_exported() {
        let mut s = slide(SlideTemplate::Hero);
        s.image_url = Some("old.png".to_string());
        let projection = project_slide(&s);
        assert!(matches!(projection.elements.last(), Some(SlideElement::Image(i)) if i.url == "old.png"));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let presentation = Presentation::sample();
        assert_eq!(project_presentation(&presentation), project_presentation(&presentation));
    }

    /// Records calls and fails every image.
    #[derive(Default)]
    struct RecordingWriter {
        calls: Vec<String>,
        fail_text: bool,
    }

    impl DeckWriter for RecordingWriter {
        fn set_properties(&mut self, title: &str, author: &str) {
            self.calls.push(format!("props {} {}", title, author));
        }

        fn begin_slide(&mut self, background: &str) -> Result<()> {
            self.calls.push(format!("slide {}", background));
            Ok(())
        }

        fn add_text(&mut self, block: &TextBlock) -> Result<()> {
            if self.fail_text {
                return Err(Error::DeckWriter("text refused".to_string()));
            }
            self.calls.push(format!("text {}", block.text));
            Ok(())
        }

        fn add_bullets(&mut self, list: &BulletList) -> Result<()> {
            self.calls.push(format!("bullets {}", list.items.len()));
            Ok(())
        }

        fn add_image(&mut self, image: &ImagePlacement) -> Result<()> {
            Err(Error::Asset(format!("cannot load {}", image.url)))
        }

        fn finish(&mut self) -> Result<Vec<u8>> {
            self.calls.push("finish".to_string());
            Ok(vec![1, 2, 3])
        }
    }

    #[test]
    fn test_write_deck_skips_broken_images() {
        let mut presentation = Presentation::new("Pictures");
        let mut first = slide(SlideTemplate::ImageRight);
        first.image = Some(SlideImage::new("https://example.com/broken.png"));
        let mut second = Slide::new("t", SlideTemplate::Default, "After");
        second.body_content = vec!["x".to_string()];
        presentation.slides = vec![first.into(), second.into()];

        let mut writer = RecordingWriter::default();
        let bytes = write_deck(&presentation, &mut writer, &ExportOptions::new().with_author("Me")).unwrap();

        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(
            writer.calls,
            vec![
                "props Pictures Me",
                "slide 1A1A1A",
                "text Title",
                "bullets 3",
                "slide 1A1A1A",
                "text After",
                "bullets 1",
                "finish",
            ]
        );
    }

    #[test]
    fn test_write_deck_propagates_other_failures() {
        let presentation = Presentation::sample();
        let mut writer = RecordingWriter {
            fail_text: true,
            ..RecordingWriter::default()
        };
        let result = write_deck(&presentation, &mut writer, &ExportOptions::default());
        assert!(matches!(result, Err(Error::DeckWriter(_))));
    }

    #[test]
    fn test_untitled_deck_properties() {
        let mut presentation = Presentation::sample();
        presentation.title = String::new();
        let mut writer = RecordingWriter::default();
        write_deck(&presentation, &mut writer, &ExportOptions::default()).unwrap();
        assert_eq!(writer.calls[0], "props Untitled Presentation Slide Deck Editor");
    }
}
