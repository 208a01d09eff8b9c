//! Markdown document assembly.
//!
//! Each slide becomes a section with a fixed layout:
//!
//! ```text
//! ## Slide 1
//! - Title text
//!   - Nested bullet
//!
//! **Notes:**
//! > Speaker notes
//!
//! ![Diagram A](media/deck_slide1_img1.png)
//!
//! **Non-text shapes:** picture:1
//!
//! **Alt text / picture names:**
//! - Picture 1: Diagram A
//! ```
//!
//! followed by recommendation lines when pictures lack context.

use crate::classify::{ShapeCounts, TextLine};
use serde::{Deserialize, Serialize};

/// Output language for the fixed labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    English,
    Indonesian,
}

impl Locale {
    /// Fixed labels for this locale.
    pub fn labels(self) -> &'static Labels {
        match self {
            Self::English => &ENGLISH,
            Self::Indonesian => &INDONESIAN,
        }
    }
}

/// Fixed phrases emitted around slide content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub slide: &'static str,
    pub no_text: &'static str,
    pub notes: &'static str,
    pub picture: &'static str,
    pub summary: &'static str,
    pub no_shapes: &'static str,
    pub alt_heading: &'static str,
    pub empty_alt: &'static str,
    pub missing_alt_advice: &'static str,
    pub context_advice: &'static str,
}

static ENGLISH: Labels = Labels {
    slide: "Slide",
    no_text: "_(no text detected on this slide)_",
    notes: "**Notes:**",
    picture: "Picture",
    summary: "**Non-text shapes:**",
    no_shapes: "_(no non-text shapes on this slide)_",
    alt_heading: "**Alt text / picture names:**",
    empty_alt: "(empty alt text)",
    missing_alt_advice: "_Recommendation: Add alt text to pictures that have neither alt text nor a name._",
    context_advice: "_Recommendation: Add alt text or Notes to clarify the content of the pictures._",
};

static INDONESIAN: Labels = Labels {
    slide: "Slide",
    no_text: "_(tidak ada teks terdeteksi di slide ini)_",
    notes: "**Catatan (Notes):**",
    picture: "Gambar",
    summary: "**Ringkasan shape non-teks:**",
    no_shapes: "_(tidak ada shape non-teks di slide ini)_",
    alt_heading: "**Alt text / nama gambar terdeteksi:**",
    empty_alt: "(alt text kosong)",
    missing_alt_advice: "_Rekomendasi: Tambahkan alt text pada gambar yang belum memiliki alt text maupun nama._",
    context_advice: "_Rekomendasi: Tambahkan alt text atau Notes untuk memperjelas isi gambar._",
};

/// One picture on a slide, as seen by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureEntry {
    /// 1-based ordinal among the slide's pictures.
    pub ordinal: usize,

    /// Alt text or name; empty when neither exists.
    pub alt: String,

    /// Output-relative path of the exported image, if it was resolved.
    pub image: Option<String>,
}

/// Classified content of one slide.
#[derive(Debug, Clone, Default)]
pub struct SlideContent<'a> {
    pub number: usize,
    pub lines: Vec<TextLine<'a>>,
    pub notes: Option<&'a str>,
    pub pictures: Vec<PictureEntry>,
    pub counts: ShapeCounts,
}

/// Builds one Markdown document from slide sections.
#[derive(Debug, Clone)]
pub struct MarkdownAssembler {
    labels: &'static Labels,
    lines: Vec<String>,
}

impl MarkdownAssembler {
    /// Start a document titled with the input file name.
    pub fn new(title: &str, locale: Locale) -> Self {
        Self {
            labels: locale.labels(),
            lines: vec![format!("# {}", title), String::new()],
        }
    }

    /// Append a slide section.
    pub fn push_slide(&mut self, slide: &SlideContent<'_>) {
        let labels = self.labels;
        self.lines.push(format!("## {} {}", labels.slide, slide.number));

        // Text
        if slide.lines.is_empty() {
            self.lines.push(labels.no_text.to_string());
        }
        for line in &slide.lines {
            let indent = "  ".repeat(line.display_level());
            self.lines.push(format!("{}- {}", indent, line.text));
        }

        // Notes
        if let Some(notes) = slide.notes.map(str::trim).filter(|n| !n.is_empty()) {
            self.lines.push(String::new());
            self.lines.push(labels.notes.to_string());
            self.lines.push(format!("> {}", notes));
        }

        // Images
        for picture in &slide.pictures {
            if let Some(path) = &picture.image {
                let label = self.picture_label(picture);
                self.lines.push(String::new());
                self.lines.push(format!("![{}]({})", label, path));
            }
        }

        // Non-text shape summary
        self.lines.push(String::new());
        if slide.counts.is_empty() {
            self.lines.push(labels.no_shapes.to_string());
        } else {
            self.lines.push(format!("{} {}", labels.summary, slide.counts));
        }
        if !slide.pictures.is_empty() {
            self.lines.push(String::new());
            self.lines.push(labels.alt_heading.to_string());
            for picture in &slide.pictures {
                let alt = if picture.alt.is_empty() {
                    labels.empty_alt
                } else {
                    picture.alt.as_str()
                };
                self.lines
                    .push(format!("- {} {}: {}", labels.picture, picture.ordinal, alt));
            }
        }

        // Recommendations
        if slide.pictures.iter().any(|p| p.alt.is_empty()) {
            self.lines.push(String::new());
            self.lines.push(labels.missing_alt_advice.to_string());
        }
        let has_notes = slide.notes.is_some_and(|n| !n.trim().is_empty());
        if !slide.pictures.is_empty() && slide.lines.is_empty() && !has_notes {
            self.lines.push(String::new());
            self.lines.push(labels.context_advice.to_string());
        }

        self.lines.push(String::new());
    }

    fn picture_label(&self, picture: &PictureEntry) -> String {
        if picture.alt.is_empty() {
            format!("{} {}", self.labels.picture, picture.ordinal)
        } else {
            picture.alt.clone()
        }
    }

    /// Finish the document.
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}
