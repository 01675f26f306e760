//! The document store: the one presentation being edited and the slide cursor.
//!
//! Every mutation builds a new [`Presentation`] value. Slides that a mutation
//! does not touch are carried over as the same `Arc`, so a caller holding an
//! older snapshot (an export in flight, a memoized view) never sees it change
//! and can detect untouched slides with `Arc::ptr_eq`.

use crate::edit::SlideEdit;
use crate::error::Result;
use crate::snapshot;
use crate::templates::template_config;
use crate::types::{now, Presentation, Slide, SlideTemplate, SlideUpdates};
use std::sync::Arc;

/// Body edits that would pad the body past this many lines are refused.
pub const MAX_BODY_LINES: usize = 1_000;

/// Holds the current presentation, if any, and the index of the selected slide.
///
/// An empty store answers every query with `None` and ignores every mutation
/// except [`DocumentStore::set_presentation`] and [`DocumentStore::import_json`].
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    presentation: Option<Arc<Presentation>>,
    current_slide: usize,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a presentation already loaded.
    pub fn with_presentation(presentation: Presentation) -> Self {
        let mut store = Self::new();
        store.set_presentation(presentation);
        store
    }

    pub fn is_loaded(&self) -> bool {
        self.presentation.is_some()
    }

    /// The current presentation.
    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_deref()
    }

    /// A shared handle to the current presentation value.
    ///
    /// Later mutations do not affect the returned value.
    pub fn snapshot(&self) -> Option<Arc<Presentation>> {
        self.presentation.clone()
    }

    pub fn current_slide_index(&self) -> usize {
        self.current_slide
    }

    /// The slide under the cursor, if the cursor is in range.
    pub fn current_slide(&self) -> Option<&Arc<Slide>> {
        self.presentation
            .as_ref()
            .and_then(|p| p.slides.get(self.current_slide))
    }

    pub fn slide_count(&self) -> Option<usize> {
        self.presentation.as_ref().map(|p| p.slides.len())
    }

    /// Replace the whole document.
    ///
    /// A presentation without slides gets one blank slide, and the cursor is
    /// clamped to the new slide list.
    pub fn set_presentation(&mut self, mut presentation: Presentation) {
        if presentation.slides.is_empty() {
            log::debug!("Loaded presentation {} has no slides; adding a blank one", presentation.id);
            presentation.slides.push(Arc::new(Slide::blank()));
        }

        let last = presentation.slides.len() - 1;
        if self.current_slide > last {
            log::debug!("Clamping slide cursor {} to {}", self.current_slide, last);
            self.current_slide = last;
        }

        self.presentation = Some(Arc::new(presentation));
    }

    /// Parse, normalize, and load a JSON document.
    ///
    /// On a parse failure the current document is left as it was.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let presentation = snapshot::import_json(text)?;
        log::debug!(
            "Imported presentation {} with {} slides",
            presentation.id,
            presentation.slides.len()
        );
        self.set_presentation(presentation);
        Ok(())
    }

    /// Move the cursor. The index is not checked against the slide list.
    pub fn set_current_slide(&mut self, index: usize) {
        self.current_slide = index;
    }

    /// Merge `updates` into the slide with id `slide_id`.
    ///
    /// Returns `false`, changing nothing, when no slide has that id.
    pub fn update_slide(&mut self, slide_id: &str, updates: SlideUpdates) -> bool {
        self.replace_slide(slide_id, |slide| slide.merged(updates))
    }

    /// Switch a slide to another template, dropping what the template cannot show.
    ///
    /// Without image support the slide loses its image; without theme support
    /// its theme becomes the template's default. Everything else is kept.
    pub fn update_slide_template(&mut self, slide_id: &str, template: SlideTemplate) -> bool {
        let config = template_config(template);
        self.replace_slide(slide_id, |slide| {
            let mut slide = slide.clone();
            slide.template = template;
            config.conform(&mut slide);
            slide
        })
    }

    /// Apply one edit coming from the canvas.
    pub fn apply_edit(&mut self, slide_id: &str, edit: SlideEdit) -> bool {
        match edit {
            SlideEdit::Template(template) => self.update_slide_template(slide_id, template),
            SlideEdit::BodyLine { index, text } => {
                let Some(slide) = self.presentation.as_ref().and_then(|p| p.slide(slide_id)) else {
                    return false;
                };
                if index >= slide.body_content.len().max(MAX_BODY_LINES) {
                    log::warn!("Ignoring edit of body line {} on slide {}", index, slide_id);
                    return false;
                }
                let mut body = slide.body_content.clone();
                if index >= body.len() {
                    body.resize(index + 1, String::new());
                }
                body[index] = text;
                self.update_slide(slide_id, SlideUpdates::body_content(body))
            }
            other => match other.into_updates() {
                Some(updates) => self.update_slide(slide_id, updates),
                None => false,
            },
        }
    }

    /// Append a blank slide and return its id.
    pub fn add_slide(&mut self) -> Option<String> {
        let presentation = self.presentation.as_ref()?;
        let slide = Slide::blank();
        let id = slide.id.clone();

        let mut next = Presentation::clone(presentation);
        next.slides.push(Arc::new(slide));
        next.updated_at = now();
        self.presentation = Some(Arc::new(next));
        Some(id)
    }

    /// Remove a slide.
    ///
    /// Refused when it is the last remaining slide. The cursor stays on the
    /// slide it pointed at, or on the slide that takes the removed one's place.
    pub fn delete_slide(&mut self, slide_id: &str) -> bool {
        let Some(presentation) = self.presentation.as_ref() else {
            return false;
        };
        let Some(index) = presentation.position_of(slide_id) else {
            return false;
        };
        if presentation.slides.len() <= 1 {
            log::debug!("Refusing to delete the only slide {}", slide_id);
            return false;
        }

        let mut next = Presentation::clone(presentation);
        next.slides.remove(index);
        next.updated_at = now();

        if index < self.current_slide {
            self.current_slide -= 1;
        }
        self.current_slide = self.current_slide.min(next.slides.len() - 1);

        self.presentation = Some(Arc::new(next));
        true
    }

    /// Move the slide at `from` so that it ends up at index `to`.
    ///
    /// The cursor keeps pointing at the same slide.
    pub fn move_slide(&mut self, from: usize, to: usize) -> bool {
        let Some(presentation) = self.presentation.as_ref() else {
            return false;
        };
        let len = presentation.slides.len();
        if from >= len || to >= len || from == to {
            return false;
        }

        let mut next = Presentation::clone(presentation);
        let slide = next.slides.remove(from);
        next.slides.insert(to, slide);
        next.updated_at = now();

        self.current_slide = remap_cursor(self.current_slide, from, to);
        self.presentation = Some(Arc::new(next));
        true
    }

    /// Rebuild the presentation with one slide replaced.
    fn replace_slide(&mut self, slide_id: &str, update: impl FnOnce(&Slide) -> Slide) -> bool {
        let Some(presentation) = self.presentation.as_ref() else {
            return false;
        };
        let Some(index) = presentation.position_of(slide_id) else {
            log::debug!("No slide with id {}; update ignored", slide_id);
            return false;
        };

        let mut next = Presentation::clone(presentation);
        next.slides[index] = Arc::new(update(&presentation.slides[index]));
        next.updated_at = now();
        self.presentation = Some(Arc::new(next));
        true
    }
}

/// Where the cursor ends up after the slide at `from` moves to `to`.
pub fn remap_cursor(cursor: usize, from: usize, to: usize) -> usize {
    if cursor == from {
        to
    } else if from < cursor && to >= cursor {
        cursor - 1
    } else if from > cursor && to <= cursor {
        cursor + 1
    } else {
        cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SlideImage, SlideTheme};
    use chrono::{TimeZone, Utc};

    fn deck(count: usize) -> Presentation {
        let mut presentation = Presentation::new("Deck");
        presentation.updated_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        presentation.slides = (0..count)
            .map(|i| {
                let mut slide = Slide::new(format!("s{}", i), SlideTemplate::ImageRight, format!("Slide {}", i));
                slide.body_content = vec![format!("line {}", i)];
                Arc::new(slide)
            })
            .collect();
        presentation
    }

    fn ids(store: &DocumentStore) -> Vec<String> {
        store
            .presentation()
            .unwrap()
            .slides
            .iter()
            .map(|s| s.id.clone())
            .collect()
    }

    #[test]
    fn test_empty_store() {
        let mut store = DocumentStore::new();
        assert!(!store.is_loaded());
        assert!(store.presentation().is_none());
        assert!(store.current_slide().is_none());
        assert_eq!(store.slide_count(), None);

        assert!(!store.update_slide("s0", SlideUpdates::title("x")));
        assert!(!store.update_slide_template("s0", SlideTemplate::Hero));
        assert!(store.add_slide().is_none());
        assert!(!store.delete_slide("s0"));
        assert!(!store.move_slide(0, 1));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_loading_empty_presentation_adds_slide() {
        let store = DocumentStore::with_presentation(Presentation::new("Empty"));
        assert_eq!(store.slide_count(), Some(1));
        assert_eq!(store.current_slide().unwrap().title, "New Slide");
    }

    #[test]
    fn test_set_presentation_clamps_cursor() {
        let mut store = DocumentStore::with_presentation(deck(5));
        store.set_current_slide(4);
        store.set_presentation(deck(2));
        assert_eq!(store.current_slide_index(), 1);
        assert_eq!(store.current_slide().unwrap().id, "s1");
    }

    #[test]
    fn test_set_current_slide_is_not_clamped() {
        let mut store = DocumentStore::with_presentation(deck(2));
        store.set_current_slide(9);
        assert_eq!(store.current_slide_index(), 9);
        assert!(store.current_slide().is_none());
    }

    #[test]
    fn test_update_slide_shares_untouched_slides() {
        let mut store = DocumentStore::with_presentation(deck(3));
        let before = store.snapshot().unwrap();

        assert!(store.update_slide(
            "s1",
            SlideUpdates {
                title: Some("Changed".to_string()),
                body_content: Some(vec!["a".to_string(), "b".to_string()]),
                ..SlideUpdates::default()
            }
        ));

        let after = store.snapshot().unwrap();
        assert!(Arc::ptr_eq(&before.slides[0], &after.slides[0]));
        assert!(Arc::ptr_eq(&before.slides[2], &after.slides[2]));
        assert!(!Arc::ptr_eq(&before.slides[1], &after.slides[1]));

        assert_eq!(after.slides[1].title, "Changed");
        assert_eq!(after.slides[1].body_content, vec!["a", "b"]);
        assert_eq!(after.slides[1].template, SlideTemplate::ImageRight);
        assert_eq!(before.slides[1].title, "Slide 1");
        assert_eq!(before.slides[1].body_content, vec!["line 1"]);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_slide_refreshes_timestamp_on_empty_merge() {
        let mut store = DocumentStore::with_presentation(deck(1));
        let before = store.snapshot().unwrap();
        assert!(store.update_slide("s0", SlideUpdates::default()));
        let after = store.snapshot().unwrap();
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.slides[0], before.slides[0]);
    }

    #[test]
    fn test_update_unknown_slide_is_noop() {
        let mut store = DocumentStore::with_presentation(deck(2));
        let before = store.snapshot().unwrap();
        assert!(!store.update_slide("missing", SlideUpdates::title("x")));
        assert!(Arc::ptr_eq(&before, &store.snapshot().unwrap()));
    }

    #[test]
    fn test_template_switch_drops_image_when_unsupported() {
        let mut store = DocumentStore::with_presentation(deck(1));
        store.update_slide("s0", SlideUpdates::image(SlideImage::new("a.png")));

        assert!(store.update_slide_template("s0", SlideTemplate::Default));
        let slide = store.current_slide().unwrap();
        assert_eq!(slide.template, SlideTemplate::Default);
        assert!(slide.image.is_none());
    }

    #[test]
    fn test_template_switch_keeps_image_when_supported() {
        let mut store = DocumentStore::with_presentation(deck(1));
        store.update_slide("s0", SlideUpdates::image(SlideImage::new("a.png")));

        assert!(store.update_slide_template("s0", SlideTemplate::SplitImage));
        let slide = store.current_slide().unwrap();
        assert_eq!(slide.template, SlideTemplate::SplitImage);
        assert_eq!(slide.image, Some(SlideImage::new("a.png")));
    }

    #[test]
    fn test_template_switch_keeps_theme_when_supported() {
        let mut store = DocumentStore::with_presentation(deck(1));
        let theme = SlideTheme::new("bg-red-900", "text-yellow-100");
        store.update_slide("s0", SlideUpdates::theme(theme.clone()));

        assert!(store.update_slide_template("s0", SlideTemplate::Hero));
        assert_eq!(store.current_slide().unwrap().theme, Some(theme));
    }

    #[test]
    fn test_template_switch_to_unconfigured_template_uses_default_rules() {
        let mut store = DocumentStore::with_presentation(deck(1));
        store.update_slide("s0", SlideUpdates::image(SlideImage::new("a.png")));

        assert!(store.update_slide_template("s0", SlideTemplate::Gallery));
        let slide = store.current_slide().unwrap();
        assert_eq!(slide.template, SlideTemplate::Gallery);
        assert!(slide.image.is_none());
    }

    #[test]
    fn test_add_slide_appends() {
        let mut store = DocumentStore::with_presentation(deck(2));
        let before = store.snapshot().unwrap();
        let id = store.add_slide().unwrap();

        let after = store.snapshot().unwrap();
        assert_eq!(after.slides.len(), 3);
        assert_eq!(after.slides[2].id, id);
        assert_eq!(after.slides[2].title, "New Slide");
        assert_eq!(after.slides[2].body_content, vec!["Add your content here"]);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(store.current_slide_index(), 0);
    }

    #[test]
    fn test_delete_only_slide_is_noop() {
        let mut store = DocumentStore::with_presentation(deck(1));
        let before = store.snapshot().unwrap();

        assert!(!store.delete_slide("s0"));
        let after = store.snapshot().unwrap();
        assert_eq!(after.slides.len(), 1);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn test_delete_adjusts_cursor() {
        let mut store = DocumentStore::with_presentation(deck(4));
        store.set_current_slide(2);

        assert!(store.delete_slide("s0"));
        assert_eq!(ids(&store), vec!["s1", "s2", "s3"]);
        assert_eq!(store.current_slide().unwrap().id, "s2");

        assert!(store.delete_slide("s3"));
        assert_eq!(store.current_slide().unwrap().id, "s2");

        assert!(store.delete_slide("s2"));
        assert_eq!(store.current_slide_index(), 0);
        assert_eq!(store.current_slide().unwrap().id, "s1");
    }

    #[test]
    fn test_delete_unknown_slide_is_noop() {
        let mut store = DocumentStore::with_presentation(deck(3));
        assert!(!store.delete_slide("missing"));
        assert_eq!(store.slide_count(), Some(3));
    }

    #[test]
    fn test_move_slide_forward_shifts_cursor_left() {
        let mut store = DocumentStore::with_presentation(deck(4));
        store.set_current_slide(1);

        assert!(store.move_slide(0, 2));
        assert_eq!(ids(&store), vec!["s1", "s2", "s0", "s3"]);
        assert_eq!(store.current_slide_index(), 0);
        assert_eq!(store.current_slide().unwrap().id, "s1");
    }

    #[test]
    fn test_move_current_slide_carries_cursor() {
        let mut store = DocumentStore::with_presentation(deck(4));
        store.set_current_slide(3);

        assert!(store.move_slide(3, 0));
        assert_eq!(ids(&store), vec!["s3", "s0", "s1", "s2"]);
        assert_eq!(store.current_slide_index(), 0);
    }

    #[test]
    fn test_move_slide_rejects_out_of_range() {
        let mut store = DocumentStore::with_presentation(deck(3));
        let before = store.snapshot().unwrap();
        assert!(!store.move_slide(0, 3));
        assert!(!store.move_slide(5, 0));
        assert!(!store.move_slide(1, 1));
        assert!(Arc::ptr_eq(&before, &store.snapshot().unwrap()));
    }

    #[test]
    fn test_cursor_follows_its_slide_for_every_move() {
        let len = 5;
        for cursor in 0..len {
            for from in 0..len {
                for to in 0..len {
                    if from == to {
                        continue;
                    }
                    let mut store = DocumentStore::with_presentation(deck(len));
                    store.set_current_slide(cursor);
                    let selected = store.current_slide().unwrap().id.clone();

                    assert!(store.move_slide(from, to));
                    assert_eq!(
                        store.current_slide().unwrap().id,
                        selected,
                        "cursor {} from {} to {}",
                        cursor,
                        from,
                        to
                    );
                }
            }
        }
    }

    #[test]
    fn test_remap_cursor_examples() {
        assert_eq!(remap_cursor(1, 0, 2), 0);
        assert_eq!(remap_cursor(1, 1, 3), 3);
        assert_eq!(remap_cursor(1, 3, 0), 2);
        assert_eq!(remap_cursor(1, 2, 3), 1);
    }

    #[test]
    fn test_snapshot_survives_mutation() {
        let mut store = DocumentStore::with_presentation(deck(2));
        let snapshot = store.snapshot().unwrap();
        store.update_slide("s0", SlideUpdates::title("Edited"));
        store.delete_slide("s1");

        assert_eq!(snapshot.slides.len(), 2);
        assert_eq!(snapshot.slides[0].title, "Slide 0");
    }

    #[test]
    fn test_body_edit_far_past_end_is_refused() {
        let mut store = DocumentStore::with_presentation(deck(1));
        let before = store.snapshot().unwrap();

        for index in [usize::MAX, 1_000_000_000, MAX_BODY_LINES] {
            let edit = SlideEdit::BodyLine {
                index,
                text: "x".to_string(),
            };
            assert!(!store.apply_edit("s0", edit));
        }
        assert!(Arc::ptr_eq(&before, &store.snapshot().unwrap()));

        let edit = SlideEdit::BodyLine {
            index: MAX_BODY_LINES - 1,
            text: "last".to_string(),
        };
        assert!(store.apply_edit("s0", edit));
        assert_eq!(store.current_slide().unwrap().body_content.len(), MAX_BODY_LINES);
    }
}
