//! Core deck model, shape classification, image export, and Markdown
//! assembly for converting presentations into Markdown documents.

pub mod classify;
pub mod convert;
pub mod error;
pub mod markdown;
pub mod media;
pub mod sanitize;
pub mod types;

pub use classify::{ShapeCounts, ShapeKind, TextLine};
pub use convert::{Converter, ExtractionResult};
pub use error::{Error, Result};
pub use markdown::{Locale, MarkdownAssembler, PictureEntry, SlideContent};
pub use media::ImageExporter;
pub use sanitize::sanitize;
pub use types::{
    Deck, EmbeddedPart, Paragraph, Picture, Relationship, RelationshipTable, Shape, Slide, Table,
    TextFrame,
};
