//! WASM-compatible editor handle for the browser slide deck editor.
//!
//! This crate exposes the document store, JSON import, and both export paths
//! to the JavaScript shell that renders the canvas.

use deck_core::edit::check_image_upload as check_upload;
use deck_core::templates::template_configs as registry;
use deck_core::{
    snapshot, write_deck, DocumentStore, ExportOptions, SlideEdit, SlideTemplate, SlideUpdates,
};
use deck_pptx::PptxWriter;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// The editor state owned by the browser shell.
#[wasm_bindgen]
pub struct DeckEditor {
    store: DocumentStore,
    options: ExportOptions,
}

impl Default for DeckEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl DeckEditor {
    /// Create an editor with no presentation loaded.
    #[wasm_bindgen(constructor)]
    pub fn new() -> DeckEditor {
        DeckEditor {
            store: DocumentStore::new(),
            options: ExportOptions::new(),
        }
    }

    /// Load the built-in two-slide sample deck.
    #[wasm_bindgen(js_name = loadSample)]
    pub fn load_sample(&mut self) {
        self.store.set_presentation(deck_core::Presentation::sample());
    }

    /// Replace the document with an imported JSON file.
    ///
    /// Throws "Invalid JSON format..." when the text does not parse; the
    /// current document is kept in that case.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, text: &str) -> Result<(), JsValue> {
        self.store.import_json(text).map_err(to_js_error)
    }

    /// The whole presentation, or `null` before anything is loaded.
    pub fn presentation(&self) -> Result<JsValue, JsValue> {
        match self.store.presentation() {
            Some(presentation) => to_js(presentation),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(getter, js_name = currentSlideIndex)]
    pub fn current_slide_index(&self) -> usize {
        self.store.current_slide_index()
    }

    #[wasm_bindgen(js_name = setCurrentSlide)]
    pub fn set_current_slide(&mut self, index: usize) {
        self.store.set_current_slide(index);
    }

    /// Merge a partial slide object (`{ title, subtitle, bodyContent, ... }`).
    #[wasm_bindgen(js_name = updateSlide)]
    pub fn update_slide(&mut self, slide_id: &str, updates: JsValue) -> Result<bool, JsValue> {
        let updates = from_js(updates)?;
        update_slide_impl(&mut self.store, slide_id, updates).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = updateSlideTemplate)]
    pub fn update_slide_template(&mut self, slide_id: &str, template: &str) -> bool {
        update_slide_template_impl(&mut self.store, slide_id, template)
    }

    /// Apply an edit reported by the canvas as `(field, value, index)`.
    #[wasm_bindgen(js_name = onEdit)]
    pub fn on_edit(
        &mut self,
        slide_id: &str,
        field: &str,
        value: JsValue,
        index: Option<usize>,
    ) -> Result<bool, JsValue> {
        let value = from_js(value)?;
        Ok(on_edit_impl(&mut self.store, slide_id, field, &value, index))
    }

    /// Append a blank slide; returns its id.
    #[wasm_bindgen(js_name = addSlide)]
    pub fn add_slide(&mut self) -> Option<String> {
        self.store.add_slide()
    }

    #[wasm_bindgen(js_name = deleteSlide)]
    pub fn delete_slide(&mut self, slide_id: &str) -> bool {
        self.store.delete_slide(slide_id)
    }

    #[wasm_bindgen(js_name = moveSlide)]
    pub fn move_slide(&mut self, from: usize, to: usize) -> bool {
        self.store.move_slide(from, to)
    }

    /// Author recorded in exported decks.
    #[wasm_bindgen(js_name = setAuthor)]
    pub fn set_author(&mut self, author: &str) {
        self.options = self.options.clone().with_author(author);
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        export_json_impl(&self.store).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = jsonFilename)]
    pub fn json_filename(&self) -> String {
        snapshot::json_filename(self.title())
    }

    /// Encode the deck as .pptx bytes.
    #[wasm_bindgen(js_name = exportPptx)]
    pub fn export_pptx(&self) -> Result<js_sys::Uint8Array, JsValue> {
        let bytes =
            export_pptx_impl(&self.store, &self.options).map_err(|e| JsValue::from_str(&e))?;
        Ok(js_sys::Uint8Array::from(bytes.as_slice()))
    }

    #[wasm_bindgen(js_name = pptxFilename)]
    pub fn pptx_filename(&self) -> String {
        let date = self
            .options
            .include_date()
            .then(|| deck_core::types::now().date_naive());
        snapshot::deck_filename(self.title(), date)
    }
}

impl DeckEditor {
    fn title(&self) -> &str {
        self.store.presentation().map(|p| p.title.as_str()).unwrap_or_default()
    }
}

/// Every registered template configuration, in picker order.
#[wasm_bindgen(js_name = templateConfigs)]
pub fn template_configs() -> Result<JsValue, JsValue> {
    to_js(registry())
}

/// Validate an uploaded image before it is read into a data URI.
#[wasm_bindgen(js_name = checkImageUpload)]
pub fn check_image_upload(mime_type: &str, size: f64) -> Result<(), JsValue> {
    check_upload(mime_type, size.max(0.0) as u64).map_err(to_js_error)
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn from_js(value: JsValue) -> Result<Value, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid value: {}", e)))
}

fn to_js_error(e: deck_core::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn update_slide_impl(store: &mut DocumentStore, slide_id: &str, updates: Value) -> Result<bool, String> {
    let updates: SlideUpdates =
        serde_json::from_value(updates).map_err(|e| format!("Invalid slide update: {}", e))?;
    Ok(store.update_slide(slide_id, updates))
}

fn update_slide_template_impl(store: &mut DocumentStore, slide_id: &str, template: &str) -> bool {
    let template = SlideTemplate::from_id(template).unwrap_or_else(|| {
        log::warn!("Unknown template {}, using default", template);
        SlideTemplate::Default
    });
    store.update_slide_template(slide_id, template)
}

fn on_edit_impl(
    store: &mut DocumentStore,
    slide_id: &str,
    field: &str,
    value: &Value,
    index: Option<usize>,
) -> bool {
    match SlideEdit::from_field(field, value, index) {
        Some(edit) => store.apply_edit(slide_id, edit),
        None => false,
    }
}

fn export_json_impl(store: &DocumentStore) -> Result<String, String> {
    let presentation = store
        .presentation()
        .ok_or_else(|| "No presentation loaded".to_string())?;
    snapshot::to_json(presentation).map_err(|e| e.to_string())
}

fn export_pptx_impl(store: &DocumentStore, options: &ExportOptions) -> Result<Vec<u8>, String> {
    let presentation = store
        .presentation()
        .ok_or_else(|| "No presentation loaded".to_string())?;
    write_deck(presentation, &mut PptxWriter::new(), options)
        .map_err(|e| format!("Failed to export presentation: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_store() -> DocumentStore {
        DocumentStore::with_presentation(deck_core::Presentation::sample())
    }

    #[test]
    fn test_update_slide_from_partial_object() {
        let mut store = sample_store();
        let changed = update_slide_impl(
            &mut store,
            "1",
            json!({ "title": "Hello", "subtitle": null, "bodyContent": ["One"] }),
        )
        .unwrap();

        assert!(changed);
        let slide = store.presentation().unwrap().slide("1").unwrap().clone();
        assert_eq!(slide.title, "Hello");
        assert_eq!(slide.subtitle, None);
        assert_eq!(slide.body_content, vec!["One"]);
    }

    #[test]
    fn test_update_slide_rejects_wrong_types() {
        let mut store = sample_store();
        assert!(update_slide_impl(&mut store, "1", json!({ "title": 5 })).is_err());
        assert_eq!(store.presentation().unwrap().slide("1").unwrap().title, "Welcome to the Presentation");
    }

    #[test]
    fn test_template_switch_by_id() {
        let mut store = sample_store();
        assert!(update_slide_template_impl(&mut store, "2", "image-left"));
        assert_eq!(store.presentation().unwrap().slides[1].template, SlideTemplate::ImageLeft);

        assert!(update_slide_template_impl(&mut store, "2", "not-a-template"));
        assert_eq!(store.presentation().unwrap().slides[1].template, SlideTemplate::Default);
    }

    #[test]
    fn test_canvas_edits() {
        let mut store = sample_store();
        assert!(on_edit_impl(&mut store, "2", "bodyContent", &json!("Changed"), Some(0)));
        assert!(on_edit_impl(&mut store, "2", "title", &json!("Renamed"), None));
        assert!(!on_edit_impl(&mut store, "2", "unknown", &json!("x"), None));
        assert!(!on_edit_impl(&mut store, "missing", "title", &json!("x"), None));

        let slide = store.presentation().unwrap().slide("2").unwrap().clone();
        assert_eq!(slide.title, "Renamed");
        assert_eq!(slide.body_content[0], "Changed");
    }

    #[test]
    fn test_exports_need_a_presentation() {
        let store = DocumentStore::new();
        assert!(export_json_impl(&store).is_err());
        assert!(export_pptx_impl(&store, &ExportOptions::new()).is_err());
    }

    #[test]
    fn test_exports_of_sample_deck() {
        let store = sample_store();
        let json = export_json_impl(&store).unwrap();
        assert!(json.contains("\"title\": \"Sample Presentation\""));

        let bytes = export_pptx_impl(&store, &ExportOptions::new()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_editor_filenames() {
        let mut editor = DeckEditor::new();
        assert_eq!(editor.json_filename(), "untitled.json");

        editor.load_sample();
        editor.options = ExportOptions::new().with_date(false);
        assert_eq!(editor.json_filename(), "sample_presentation.json");
        assert_eq!(editor.pptx_filename(), "sample_presentation.pptx");
    }
}
