//! Core document model for the slide deck editor: domain types, the template
//! registry, import normalization, the document store, and export projection.

pub mod edit;
pub mod error;
pub mod normalize;
pub mod projection;
pub mod snapshot;
pub mod store;
pub mod templates;
pub mod types;

pub use edit::SlideEdit;
pub use error::{Error, Result};
pub use normalize::{normalize_presentation, normalize_slide};
pub use projection::{
    project_presentation, project_slide, write_deck, DeckWriter, ExportOptions, SlideElement,
    SlideProjection,
};
pub use store::DocumentStore;
pub use templates::{template_config, TemplateConfig};
pub use types::{
    ImagePosition, ImageSize, Presentation, Slide, SlideImage, SlideTemplate, SlideTheme,
    SlideUpdates,
};
