//! PPTX (Office Open XML) writer backend for deck export.
//!
//! Produces .pptx files, which are ZIP archives of XML parts plus embedded
//! media, from the slide projections computed by `deck-core`.

pub mod media;
mod parts;
pub mod writer;
mod xml;

pub use media::{load_image, ImageFormat};
pub use writer::PptxWriter;
