//! Domain types for representing a parsed presentation deck.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// An entire presentation package with its slides and embedded parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deck {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,

    /// Embedded binary parts keyed by package part name
    /// (e.g. `ppt/media/image1.png`). Shared by every slide that references them.
    pub parts: BTreeMap<String, EmbeddedPart>,
}

impl Deck {
    /// Create an empty deck with the given filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
            parts: BTreeMap::new(),
        }
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Register an embedded part. A part that is already present is kept as is.
    pub fn add_part(&mut self, part: EmbeddedPart) {
        self.parts.entry(part.name.clone()).or_insert(part);
    }

    /// Look up an embedded part by its package part name.
    pub fn part(&self, name: &str) -> Option<&EmbeddedPart> {
        self.parts.get(name)
    }

    /// Filename without its final extension.
    pub fn stem(&self) -> &str {
        match self.filename.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.filename,
        }
    }
}

/// A single slide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Top-level shapes in document order.
    pub shapes: Vec<Shape>,

    /// Speaker notes, if the slide has a notes page with text.
    pub notes: Option<String>,

    /// Relationships declared by this slide's part.
    pub relationships: RelationshipTable,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Add a shape to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Notes text, treating whitespace-only notes as absent.
    pub fn notes_text(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
    }
}

/// Any visual element on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    TextFrame(TextFrame),
    Picture(Picture),
    Table(Table),
    Chart,
    Group(Vec<Shape>),
    Other,
}

/// A shape carrying a text body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    /// Paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,

    /// Placeholder type (`title`, `body`, ...) when the shape is a placeholder.
    pub placeholder: Option<String>,
}

impl TextFrame {
    /// Create a text frame from paragraphs.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            placeholder: None,
        }
    }

    /// All paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.literal_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A paragraph inside a text body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Outline nesting level.
    pub level: usize,

    /// Text of each run, in order.
    pub runs: Vec<String>,

    /// Full paragraph text, including fields and line breaks.
    pub text: String,
}

impl Paragraph {
    /// Create a single-run paragraph at the given level.
    pub fn new(level: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            level,
            runs: vec![text.clone()],
            text,
        }
    }

    /// Concatenated run text, or the paragraph's own text when there are no runs.
    pub fn literal_text(&self) -> Cow<'_, str> {
        let joined: String = self.runs.concat();
        if joined.is_empty() {
            Cow::Borrowed(&self.text)
        } else {
            Cow::Owned(joined)
        }
    }
}

/// A picture shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    /// Internal display name (`cNvPr/@name`).
    pub name: Option<String>,

    /// Alternative text (`cNvPr/@descr`).
    pub description: Option<String>,

    /// Relationship id of the embedded image, scoped to the owning slide.
    pub embed: Option<String>,
}

/// A table shape as a grid of cell strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

/// A relationship declared by a package part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship type URI.
    pub rel_type: String,

    /// Target part name, resolved against the package root. For external
    /// relationships this is the raw target.
    pub target: String,

    /// Whether the target lives outside the package.
    pub external: bool,
}

impl Relationship {
    /// Whether this relationship points at an image part.
    pub fn is_image(&self) -> bool {
        self.rel_type.ends_with("/image")
    }
}

/// Per-slide mapping from relationship id to target.
///
/// The same id on two slides may point at different parts, so lookups must
/// always go through the owning slide's table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipTable {
    entries: BTreeMap<String, Relationship>,
}

impl RelationshipTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relationship under the given id.
    pub fn insert(&mut self, id: impl Into<String>, relationship: Relationship) {
        self.entries.insert(id.into(), relationship);
    }

    /// Look up a relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.get(id)
    }

    /// Iterate over `(id, relationship)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.entries.iter().map(|(id, rel)| (id.as_str(), rel))
    }

    /// First relationship whose type ends with the given suffix.
    pub fn find_by_type(&self, suffix: &str) -> Option<&Relationship> {
        self.entries.values().find(|rel| rel.rel_type.ends_with(suffix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A binary resource stored inside the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedPart {
    /// Package part name, e.g. `ppt/media/image1.png`.
    pub name: String,

    /// Raw bytes.
    pub data: Vec<u8>,
}

impl EmbeddedPart {
    /// Create a new part.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Last path segment of the part name.
    pub fn filename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Declared extension (without the dot), if the file name has one.
    pub fn extension(&self) -> Option<&str> {
        match self.filename().rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}
