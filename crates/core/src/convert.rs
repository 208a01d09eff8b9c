//! Per-deck conversion: classify shapes, export images, assemble Markdown.

use crate::error::{Error, Result};
use crate::markdown::{Locale, MarkdownAssembler, PictureEntry, SlideContent};
use crate::media::{self, ImageExporter};
use crate::sanitize::sanitize;
use crate::types::{Deck, Slide};
use std::fs;
use std::path::PathBuf;

/// Markdown text plus the images exported for one deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Sanitized deck name, used for the document file name.
    pub name: String,

    /// The assembled Markdown document.
    pub markdown: String,

    /// Output-relative paths of exported images, in document order.
    pub images: Vec<String>,
}

/// Converts decks into Markdown documents under one output directory.
#[derive(Debug, Clone)]
pub struct Converter {
    output_dir: PathBuf,
    locale: Locale,
}

impl Converter {
    /// Create a converter writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            locale: Locale::default(),
        }
    }

    /// Use labels for the given locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Convert a deck, exporting every resolvable picture.
    pub fn convert(&self, deck: &Deck) -> Result<ExtractionResult> {
        let stem = sanitize(deck.stem());
        let exporter = ImageExporter::new(&self.output_dir);
        let mut assembler = MarkdownAssembler::new(&deck.filename, self.locale);
        let mut images = Vec::new();

        for slide in &deck.slides {
            let pictures = self.export_pictures(deck, slide, &stem, &exporter)?;
            images.extend(pictures.iter().filter_map(|p| p.image.clone()));

            let content = SlideContent {
                number: slide.number,
                lines: slide.text_lines().collect(),
                notes: slide.notes_text(),
                pictures,
                counts: slide.shape_counts(),
            };
            log::debug!(
                "Slide {}: {} lines, {} pictures",
                slide.number,
                content.lines.len(),
                content.pictures.len()
            );
            assembler.push_slide(&content);
        }

        Ok(ExtractionResult {
            name: stem,
            markdown: assembler.finish(),
            images,
        })
    }

    fn export_pictures(
        &self,
        deck: &Deck,
        slide: &Slide,
        stem: &str,
        exporter: &ImageExporter,
    ) -> Result<Vec<PictureEntry>> {
        let mut entries = Vec::new();

        for (idx, picture) in slide.pictures().into_iter().enumerate() {
            let ordinal = idx + 1;
            let image = match media::resolve(deck, slide, picture) {
                Some(part) => {
                    let file_name = ImageExporter::file_name(stem, slide.number, ordinal, part);
                    Some(exporter.export(part, &file_name)?)
                }
                None => {
                    log::warn!(
                        "{}: slide {} picture {} has no resolvable image",
                        deck.filename,
                        slide.number,
                        ordinal
                    );
                    None
                }
            };
            entries.push(PictureEntry {
                ordinal,
                alt: picture.alt_text().to_string(),
                image,
            });
        }

        Ok(entries)
    }

    /// Path the Markdown document for `result` is written to.
    pub fn document_path(&self, result: &ExtractionResult) -> PathBuf {
        self.output_dir.join(format!("{}.md", result.name))
    }

    /// Write the Markdown document and return its path.
    pub fn write(&self, result: &ExtractionResult) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::write(&self.output_dir, e))?;
        let path = self.document_path(result);
        fs::write(&path, &result.markdown).map_err(|e| Error::write(&path, e))?;
        Ok(path)
    }
}
