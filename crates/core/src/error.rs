//! Error types for the slide deck editor.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing, editing, or exporting a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The imported payload is not parseable as JSON at all.
    #[error("Invalid JSON format. Please check your file. ({0})")]
    InvalidJson(String),

    /// The presentation could not be serialized to a JSON snapshot.
    #[error("Failed to serialize presentation: {0}")]
    Serialization(String),

    /// An image could not be loaded or embedded.
    #[error("Image error: {0}")]
    Asset(String),

    /// The deck-writing backend failed for any other reason.
    #[error("Deck writing error: {0}")]
    DeckWriter(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),
}
