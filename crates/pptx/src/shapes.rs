//! Shape tree parsing for slide and notes-slide parts.

use crate::xml::{attr, local_name, skip, unexpected_eof, xml_error};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use slidemd_core::{Paragraph, Picture, Result, Shape, Table, TextFrame};

type XmlReader<'a> = Reader<&'a [u8]>;

/// Parse the `p:spTree` of a slide-like part into shapes in document order.
///
/// A part without a shape tree yields no shapes.
pub fn parse_shape_tree(xml: &str) -> Result<Vec<Shape>> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"spTree" => {
                return read_shapes(&mut reader, b"spTree");
            }
            Event::Eof => return Ok(Vec::new()),
            _ => {}
        }
    }
}

/// Text of the body placeholder in a notes slide, trimmed; `None` if empty.
pub fn notes_text(shapes: &[Shape]) -> Option<String> {
    shapes
        .iter()
        .find_map(|shape| match shape {
            Shape::TextFrame(frame) if frame.placeholder.as_deref() == Some("body") => {
                Some(frame.text())
            }
            _ => None,
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Read child shapes until the end of `container` (`spTree` or `grpSp`).
fn read_shapes(reader: &mut XmlReader<'_>, container: &[u8]) -> Result<Vec<Shape>> {
    let mut shapes = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"sp" => shapes.push(read_sp(reader)?),
                b"pic" => shapes.push(Shape::Picture(read_pic(reader)?)),
                b"graphicFrame" => shapes.push(read_graphic_frame(reader)?),
                b"grpSp" => shapes.push(Shape::Group(read_shapes(reader, b"grpSp")?)),
                b"cxnSp" | b"contentPart" => {
                    skip(reader, &e)?;
                    shapes.push(Shape::Other);
                }
                // Group properties, extension lists, alternate content
                _ => skip(reader, &e)?,
            },
            Event::Empty(e) if local_name(e.name().as_ref()) == b"contentPart" => {
                shapes.push(Shape::Other);
            }
            Event::End(e) if local_name(e.name().as_ref()) == container => return Ok(shapes),
            Event::Eof => return Err(unexpected_eof(container)),
            _ => {}
        }
    }
}

/// `p:sp`: a text frame when it has a text body, otherwise an autoshape.
fn read_sp(reader: &mut XmlReader<'_>) -> Result<Shape> {
    let mut paragraphs = None;
    let mut placeholder = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"txBody" => {
                paragraphs = Some(read_text_body(reader, b"txBody")?);
            }
            Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == b"ph" => {
                placeholder = Some(attr(&e, b"type").unwrap_or_else(|| "obj".to_string()));
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"sp" => break,
            Event::Eof => return Err(unexpected_eof(b"sp")),
            _ => {}
        }
    }

    Ok(match paragraphs {
        Some(paragraphs) => Shape::TextFrame(TextFrame {
            paragraphs,
            placeholder,
        }),
        None => Shape::Other,
    })
}

/// Paragraphs of a text body, until the end of `end`.
fn read_text_body(reader: &mut XmlReader<'_>, end: &[u8]) -> Result<Vec<Paragraph>> {
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"p" => {
                paragraphs.push(read_paragraph(reader)?);
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"p" => {
                paragraphs.push(Paragraph::default());
            }
            Event::End(e) if local_name(e.name().as_ref()) == end => return Ok(paragraphs),
            Event::Eof => return Err(unexpected_eof(end)),
            _ => {}
        }
    }
}

/// `a:p`: runs from `a:r/a:t`; the full text also takes fields and breaks.
///
/// Alternate-content choices (e.g. OMML equations) are skipped so only the
/// DrawingML fallback is read.
fn read_paragraph(reader: &mut XmlReader<'_>) -> Result<Paragraph> {
    let mut paragraph = Paragraph::default();
    let mut run: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"pPr" => paragraph.level = level_of(&e),
                b"Choice" | b"oMathPara" | b"oMath" => skip(reader, &e)?,
                b"r" if is_drawing(e.name()) => run = Some(String::new()),
                b"t" if is_drawing(e.name()) => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"pPr" => paragraph.level = level_of(&e),
                b"br" => paragraph.text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(xml_error)?;
                paragraph.text.push_str(&text);
                if let Some(run) = run.as_mut() {
                    run.push_str(&text);
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"r" if is_drawing(e.name()) => paragraph.runs.extend(run.take()),
                b"p" => return Ok(paragraph),
                _ => {}
            },
            Event::Eof => return Err(unexpected_eof(b"p")),
            _ => {}
        }
    }
}

/// `a:r` / `a:t` as opposed to OMML `m:r` / `m:t`.
fn is_drawing(name: QName<'_>) -> bool {
    match name.prefix() {
        Some(prefix) => prefix.as_ref() == b"a",
        None => true,
    }
}

fn level_of(e: &BytesStart<'_>) -> usize {
    attr(e, b"lvl")
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(0)
}

/// `p:pic`: display name, alt text and blip reference.
fn read_pic(reader: &mut XmlReader<'_>) -> Result<Picture> {
    let mut picture = Picture::default();
    let mut seen_cnvpr = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"cNvPr" if !seen_cnvpr => {
                    seen_cnvpr = true;
                    picture.name = attr(&e, b"name");
                    picture.description = attr(&e, b"descr");
                }
                b"blip" if picture.embed.is_none() => {
                    picture.embed = attr(&e, b"embed").filter(|id| !id.is_empty());
                }
                _ => {}
            },
            Event::End(e) if local_name(e.name().as_ref()) == b"pic" => return Ok(picture),
            Event::Eof => return Err(unexpected_eof(b"pic")),
            _ => {}
        }
    }
}

/// `p:graphicFrame`: table, chart, or some other graphic object.
fn read_graphic_frame(reader: &mut XmlReader<'_>) -> Result<Shape> {
    let mut uri = String::new();
    let mut table = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e)
                if local_name(e.name().as_ref()) == b"graphicData" =>
            {
                uri = attr(&e, b"uri").unwrap_or_default();
            }
            Event::Start(e) if local_name(e.name().as_ref()) == b"tbl" => {
                table = Some(read_table(reader)?);
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"graphicFrame" => break,
            Event::Eof => return Err(unexpected_eof(b"graphicFrame")),
            _ => {}
        }
    }

    Ok(match table {
        Some(table) => Shape::Table(table),
        None if uri.ends_with("/chart") || uri.ends_with("/chartex") => Shape::Chart,
        None => Shape::Other,
    })
}

/// `a:tbl`: rows of cell text; a cell's paragraphs are joined with spaces so
/// each row stays on one line.
fn read_table(reader: &mut XmlReader<'_>) -> Result<Table> {
    let mut table = Table::default();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"tr" => table.rows.push(Vec::new()),
                b"tc" => {
                    let cell = read_cell(reader)?;
                    if let Some(row) = table.rows.last_mut() {
                        row.push(cell);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"tr" => table.rows.push(Vec::new()),
                b"tc" => {
                    if let Some(row) = table.rows.last_mut() {
                        row.push(String::new());
                    }
                }
                _ => {}
            },
            Event::End(e) if local_name(e.name().as_ref()) == b"tbl" => return Ok(table),
            Event::Eof => return Err(unexpected_eof(b"tbl")),
            _ => {}
        }
    }
}

fn read_cell(reader: &mut XmlReader<'_>) -> Result<String> {
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if local_name(e.name().as_ref()) == b"txBody" => {
                text = read_text_body(reader, b"txBody")?
                    .iter()
                    .map(|p| p.literal_text().trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"tc" => return Ok(text),
            Event::Eof => return Err(unexpected_eof(b"tc")),
            _ => {}
        }
    }
}
