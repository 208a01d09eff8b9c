//! Picture-to-image resolution and export.
//!
//! A picture's reference id is only meaningful within the slide that owns it,
//! so resolution always takes the `(slide, picture)` pair.

use crate::error::{Error, Result};
use crate::sanitize::sanitize;
use crate::types::{Deck, EmbeddedPart, Picture, Slide};
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of the output directory that receives exported images.
pub const MEDIA_DIR: &str = "media";

/// Extension used when a part declares none.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Resolve the embedded part a picture refers to through its slide's
/// relationship table.
///
/// Returns `None` when the picture has no reference id, the id is unknown to
/// the slide, the relationship is external, or the target is not in the
/// package.
pub fn resolve<'d>(deck: &'d Deck, slide: &Slide, picture: &Picture) -> Option<&'d EmbeddedPart> {
    let id = picture.embed.as_deref()?;
    let Some(rel) = slide.relationships.get(id) else {
        log::debug!("Slide {}: relationship {} not found", slide.number, id);
        return None;
    };
    if rel.external {
        log::debug!("Slide {}: {} points to external {}", slide.number, id, rel.target);
        return None;
    }
    let part = deck.part(&rel.target);
    if part.is_none() {
        log::debug!("Slide {}: part {} not in package", slide.number, rel.target);
    }
    part
}

/// Writes resolved images below `<output>/media`.
#[derive(Debug, Clone)]
pub struct ImageExporter {
    output_dir: PathBuf,
}

impl ImageExporter {
    /// Create an exporter rooted at the document output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory exported images are written to.
    pub fn media_dir(&self) -> PathBuf {
        self.output_dir.join(MEDIA_DIR)
    }

    /// Deterministic file name for a picture: `{stem}_slide{n}_img{k}.{ext}`.
    pub fn file_name(stem: &str, slide_number: usize, ordinal: usize, part: &EmbeddedPart) -> String {
        let base = sanitize(&format!("{}_slide{}_img{}", stem, slide_number, ordinal));
        let ext = part
            .extension()
            .unwrap_or(DEFAULT_IMAGE_EXTENSION)
            .to_lowercase();
        format!("{}.{}", base, ext)
    }

    /// Write the part's bytes and return the path relative to the output
    /// directory, using forward slashes.
    ///
    /// An existing file with identical content is left untouched.
    pub fn export(&self, part: &EmbeddedPart, file_name: &str) -> Result<String> {
        let media_dir = self.media_dir();
        fs::create_dir_all(&media_dir).map_err(|e| Error::write(&media_dir, e))?;

        let target = media_dir.join(file_name);
        if is_identical(&target, &part.data) {
            log::debug!("Unchanged: {}", target.display());
        } else {
            fs::write(&target, &part.data).map_err(|e| Error::write(&target, e))?;
            log::debug!("Exported {} ({} bytes)", target.display(), part.data.len());
        }

        Ok(format!("{}/{}", MEDIA_DIR, file_name))
    }
}

fn is_identical(path: &Path, data: &[u8]) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == data.len() as u64 => {
            fs::read(path).map(|existing| existing == data).unwrap_or(false)
        }
        _ => false,
    }
}
