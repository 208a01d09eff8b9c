//! PPTX package reader.

use crate::rels::{parse_relationships, rels_path_for};
use crate::shapes::{notes_text, parse_shape_tree};
use crate::xml::{local_name, xml_error};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidemd_core::{Deck, EmbeddedPart, Error, RelationshipTable, Result, Slide};
use std::io::{Read, Seek, SeekFrom};
use zip::result::ZipError;
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// ZIP local file header.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE/CFB header, used by legacy `.ppt` and by encrypted OOXML packages.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Reader for PPTX (Office Open XML) packages.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX package from a reader into a [`Deck`].
    pub fn parse<R: Read + Seek>(&self, mut reader: R, filename: &str) -> Result<Deck> {
        check_magic(&mut reader)?;

        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut deck = Deck::new(filename);
        let slide_paths = self.get_slide_order(&mut archive)?;
        log::debug!("{}: {} slides", filename, slide_paths.len());

        for (idx, slide_path) in slide_paths.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, &mut deck, slide_path, idx + 1)?;
            deck.add_slide(slide);
        }

        Ok(deck)
    }

    /// Ordered slide part names.
    ///
    /// Uses `p:sldIdLst` from `presentation.xml`; falls back to sorting the
    /// slide relationships by number when the list is absent.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_path = rels_path_for(PRESENTATION_PART);
        let rels_content = self.read_file_from_archive(archive, &rels_path)?;
        let rels = parse_relationships(&rels_content, PRESENTATION_PART)?;

        let presentation = self.read_file_from_archive(archive, PRESENTATION_PART)?;
        let slide_ids = slide_id_list(&presentation)?;

        if !slide_ids.is_empty() {
            return Ok(slide_ids
                .iter()
                .filter_map(|id| match rels.get(id) {
                    Some(rel) if !rel.external => Some(rel.target.clone()),
                    _ => {
                        log::warn!("Slide relationship {} not found", id);
                        None
                    }
                })
                .collect());
        }

        let mut slides: Vec<(String, Option<usize>)> = rels
            .iter()
            .filter(|(_, rel)| is_slide_relationship(&rel.rel_type) && !rel.external)
            .map(|(id, rel)| {
                let order_num = extract_slide_number(&rel.target).or_else(|| extract_slide_number(id));
                (rel.target.clone(), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide, registering its image parts on the deck.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        deck: &mut Deck,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<Slide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let mut slide = Slide::new(slide_number);
        slide.shapes = parse_shape_tree(&content)?;
        slide.relationships = self.read_relationships(archive, slide_path)?;

        for (id, rel) in slide.relationships.iter() {
            if !rel.is_image() || rel.external || deck.part(&rel.target).is_some() {
                continue;
            }
            match self.read_bytes_from_archive(archive, &rel.target)? {
                Some(data) => deck.add_part(EmbeddedPart::new(rel.target.clone(), data)),
                None => log::warn!(
                    "Slide {}: image {} ({}) missing from package",
                    slide_number,
                    rel.target,
                    id
                ),
            }
        }

        slide.notes = match slide.relationships.find_by_type("/notesSlide") {
            Some(rel) if !rel.external => self.read_notes(archive, &rel.target)?,
            _ => None,
        };

        Ok(slide)
    }

    /// Relationship table of a part; a part without one has an empty table.
    fn read_relationships<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        part: &str,
    ) -> Result<RelationshipTable> {
        let rels_path = rels_path_for(part);
        match self.read_bytes_from_archive(archive, &rels_path)? {
            Some(bytes) => parse_relationships(&decode_utf8(&rels_path, bytes)?, part),
            None => Ok(RelationshipTable::new()),
        }
    }

    /// Speaker notes from a notes slide part.
    fn read_notes<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        notes_path: &str,
    ) -> Result<Option<String>> {
        match self.read_bytes_from_archive(archive, notes_path)? {
            Some(bytes) => {
                let xml = decode_utf8(notes_path, bytes)?;
                Ok(notes_text(&parse_shape_tree(&xml)?))
            }
            None => {
                log::warn!("Notes slide {} missing from package", notes_path);
                Ok(None)
            }
        }
    }

    /// Read a required text part from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let bytes = self
            .read_bytes_from_archive(archive, path)?
            .ok_or_else(|| Error::PptxParseError(format!("Part not found in archive: {}", path)))?;
        decode_utf8(path, bytes)
    }

    /// Read a part's bytes; `None` if the archive has no such entry.
    fn read_bytes_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<Option<Vec<u8>>> {
        let mut file = match archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(Error::ZipError(format!("Failed to open '{}': {}", path, e)));
            }
        };

        // The declared size is untrusted; let the buffer grow with the data.
        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(Some(content))
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject inputs that are not ZIP packages before handing them to the ZIP reader.
fn check_magic<R: Read + Seek>(reader: &mut R) -> Result<()> {
    let mut magic = [0u8; 8];
    let mut filled = 0;
    while filled < magic.len() {
        match reader.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    reader.seek(SeekFrom::Start(0))?;

    if magic.starts_with(&ZIP_MAGIC) {
        Ok(())
    } else if filled == magic.len() && magic == CFB_MAGIC {
        Err(Error::UnsupportedFormat(
            "OLE compound file (legacy .ppt or password-protected package)".to_string(),
        ))
    } else {
        Err(Error::UnsupportedFormat("not a PPTX (ZIP) package".to_string()))
    }
}

fn decode_utf8(path: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| Error::PptxParseError(format!("'{}' is not valid UTF-8: {}", path, e)))
}

/// Relationship ids from `p:sldIdLst`, in presentation order.
fn slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();
    let mut in_list = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"sldIdLst" => in_list = true,
            Event::End(e) if local_name(e.name().as_ref()) == b"sldIdLst" => break,
            Event::Start(e) | Event::Empty(e)
                if in_list && local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = relationship_id(&e) {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

/// `p:sldId` carries both a numeric `id` and the relationship `r:id`; only
/// the prefixed one names a relationship.
fn relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && local_name(a.key.as_ref()) == b"id")
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn is_slide_relationship(rel_type: &str) -> bool {
    rel_type.ends_with("/slide")
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
