//! Small helpers over `quick_xml` events.

use quick_xml::events::BytesStart;
use quick_xml::Reader;
use slidemd_core::{Error, Result};

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of the attribute whose local name is `key`, unescaped.
pub fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .map(|a| match a.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

/// Skip everything up to and including the end tag matching `start`.
pub fn skip(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<()> {
    reader.read_to_end(start.name()).map_err(xml_error)?;
    Ok(())
}

/// Convert a `quick_xml` error into our error type.
pub fn xml_error(e: quick_xml::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// Error for a document that ends inside an open element.
pub fn unexpected_eof(element: &[u8]) -> Error {
    Error::XmlError(format!(
        "Unexpected end of document inside <{}>",
        String::from_utf8_lossy(element)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_attr_matches_local_name() {
        let mut reader = Reader::from_str(r#"<a:blip r:embed="rId7" cstate="print"/>"#);
        match reader.read_event().unwrap() {
            Event::Empty(e) => {
                assert_eq!(attr(&e, b"embed").as_deref(), Some("rId7"));
                assert_eq!(attr(&e, b"cstate").as_deref(), Some("print"));
                assert_eq!(attr(&e, b"link"), None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_skip_nested_element() {
        let mut reader = Reader::from_str("<root><skip><a><b/></a></skip><keep/></root>");
        reader.read_event().unwrap();
        match reader.read_event().unwrap() {
            Event::Start(e) => skip(&mut reader, &e).unwrap(),
            other => panic!("unexpected event {:?}", other),
        }
        match reader.read_event().unwrap() {
            Event::Empty(e) => assert_eq!(e.name().as_ref(), b"keep"),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
