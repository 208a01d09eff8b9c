//! Shape classification and text extraction.
//!
//! Every shape yields a (possibly empty) sequence of [`TextLine`]s and falls
//! into exactly one [`ShapeKind`]. Groups recurse into their children.

use crate::types::{Picture, Shape, Slide, Table, TextFrame};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Highest nesting level used for indentation.
pub const MAX_DISPLAY_LEVEL: usize = 4;

/// One line of extracted text with its nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine<'a> {
    pub level: usize,
    pub text: Cow<'a, str>,
}

impl<'a> TextLine<'a> {
    pub fn new(level: usize, text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Level clamped to [`MAX_DISPLAY_LEVEL`].
    pub fn display_level(&self) -> usize {
        self.level.min(MAX_DISPLAY_LEVEL)
    }
}

/// Classification tag of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Text,
    Picture,
    Table,
    Chart,
    Group,
    Other,
}

impl Shape {
    /// Classification tag of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::TextFrame(_) => ShapeKind::Text,
            Shape::Picture(_) => ShapeKind::Picture,
            Shape::Table(_) => ShapeKind::Table,
            Shape::Chart => ShapeKind::Chart,
            Shape::Group(_) => ShapeKind::Group,
            Shape::Other => ShapeKind::Other,
        }
    }

    /// Lazily yield this shape's text lines, depth-first through groups.
    ///
    /// The iterator borrows the shape, so calling this again restarts it.
    pub fn text_lines(&self) -> Box<dyn Iterator<Item = TextLine<'_>> + '_> {
        match self {
            Shape::TextFrame(frame) => Box::new(frame_lines(frame)),
            Shape::Table(table) => Box::new(table_lines(table)),
            Shape::Group(children) => Box::new(children.iter().flat_map(Shape::text_lines)),
            Shape::Picture(_) | Shape::Chart | Shape::Other => Box::new(std::iter::empty()),
        }
    }
}

impl Slide {
    /// All text lines on the slide, in shape order.
    pub fn text_lines(&self) -> impl Iterator<Item = TextLine<'_>> + '_ {
        self.shapes.iter().flat_map(Shape::text_lines)
    }

    /// Pictures on the slide, depth-first through groups.
    pub fn pictures(&self) -> Vec<&Picture> {
        let mut pictures = Vec::new();
        collect_pictures(&self.shapes, &mut pictures);
        pictures
    }

    /// Counts of non-text shapes on the slide.
    pub fn shape_counts(&self) -> ShapeCounts {
        ShapeCounts::tally(&self.shapes)
    }
}

fn frame_lines(frame: &TextFrame) -> impl Iterator<Item = TextLine<'_>> + '_ {
    frame.paragraphs.iter().filter_map(|paragraph| {
        let text = trim_cow(paragraph.literal_text());
        (!text.is_empty()).then(|| TextLine::new(paragraph.level, text))
    })
}

fn table_lines(table: &Table) -> impl Iterator<Item = TextLine<'_>> + '_ {
    table.rows.iter().filter_map(|row| {
        let joined = row
            .iter()
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        (!joined.is_empty()).then(|| TextLine::new(0, joined))
    })
}

fn collect_pictures<'a>(shapes: &'a [Shape], out: &mut Vec<&'a Picture>) {
    for shape in shapes {
        match shape {
            Shape::Picture(picture) => out.push(picture),
            Shape::Group(children) => collect_pictures(children, out),
            _ => {}
        }
    }
}

fn trim_cow(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
        Cow::Owned(s) => {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                Cow::Owned(s)
            } else {
                Cow::Owned(trimmed.to_string())
            }
        }
    }
}

impl Picture {
    /// Alternative text, falling back to the display name, or empty.
    pub fn alt_text(&self) -> &str {
        [&self.description, &self.name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// Number of shapes per non-text category.
///
/// Text frames never count as `other`, even when they are empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeCounts {
    pub picture: usize,
    pub table: usize,
    pub chart: usize,
    pub group: usize,
    pub other: usize,
}

impl ShapeCounts {
    /// Count shapes, recursing into groups.
    pub fn tally(shapes: &[Shape]) -> Self {
        let mut counts = Self::default();
        counts.add_all(shapes);
        counts
    }

    fn add_all(&mut self, shapes: &[Shape]) {
        for shape in shapes {
            match shape {
                Shape::TextFrame(_) => {}
                Shape::Picture(_) => self.picture += 1,
                Shape::Table(_) => self.table += 1,
                Shape::Chart => self.chart += 1,
                Shape::Group(children) => {
                    self.group += 1;
                    self.add_all(children);
                }
                Shape::Other => self.other += 1,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Non-zero categories in fixed order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, usize)> {
        [
            ("picture", self.picture),
            ("table", self.table),
            ("chart", self.chart),
            ("group", self.group),
            ("other", self.other),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
    }
}

impl fmt::Display for ShapeCounts {
    /// Formats as `picture:1, table:2`, omitting zero categories.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, count)) in self.entries().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", label, count)?;
        }
        Ok(())
    }
}
