//! OPC relationship parts (`_rels/*.rels`).

use crate::xml::local_name;
use quick_xml::events::Event;
use quick_xml::Reader;
use slidemd_core::{Error, Relationship, RelationshipTable, Result};

/// Path of the relationship part belonging to `part`.
///
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// Absolute targets start at the package root; `.` and `..` segments are
/// collapsed.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            if let Some((dir, _)) = source_part.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty()));
            }
            target
        }
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Parse a relationship part into a table keyed by relationship id.
///
/// Internal targets are resolved to package part names relative to
/// `source_part`.
pub fn parse_relationships(xml: &str, source_part: &str) -> Result<RelationshipTable> {
    let mut table = RelationshipTable::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut external = false;

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                    match attr.key.as_ref() {
                        b"Id" => id = value,
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        b"TargetMode" => external = value.eq_ignore_ascii_case("External"),
                        _ => {}
                    }
                }

                if id.is_empty() {
                    log::warn!("Relationship without Id in rels of {}", source_part);
                    continue;
                }

                let target = if external {
                    target
                } else {
                    resolve_target(source_part, &target)
                };
                table.insert(
                    id,
                    Relationship {
                        rel_type,
                        target,
                        external,
                    },
                );
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships of {}: {}",
                    source_part, e
                )));
            }
            _ => {}
        }
    }

    Ok(table)
}
