//! End-to-end conversion of in-memory PPTX packages.

use slidemd_core::{Converter, Locale, Shape};
use slidemd_pptx::PptxParser;
use std::fs;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_NOTES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4];
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 9, 8, 7];

fn build_package(parts: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

fn rels(entries: &[(&str, &str, &str)]) -> Vec<u8> {
    let body: String = entries
        .iter()
        .map(|(id, ty, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id, ty, target
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
    .into_bytes()
}

fn slide(tree: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        NS, tree
    )
    .into_bytes()
}

fn notes(text: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#,
        NS, text
    )
    .into_bytes()
}

fn text_box(paragraphs: &[(usize, &str)]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|(lvl, text)| {
            format!(
                r#"<a:p><a:pPr lvl="{}"/><a:r><a:t>{}</a:t></a:r></a:p>"#,
                lvl, text
            )
        })
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox 1"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
        body
    )
}

fn picture(name: &str, descr: Option<&str>, embed: &str) -> String {
    let descr = descr
        .map(|d| format!(r#" descr="{}""#, d))
        .unwrap_or_default();
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="{}"{}/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/></p:blipFill><p:spPr/></p:pic>"#,
        name, descr, embed
    )
}

const TABLE: &str = r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="5" name="Table 4"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tr h="1"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>A</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>B</a:t></a:r></a:p></a:txBody></a:tc></a:tr><a:tr h="1"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>C</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:bodyPr/><a:p/></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#;

/// Four slides, listed out of file-name order in `sldIdLst`.
///
/// - slide 1 (`slide4.xml`): two-level text and notes
/// - slide 2 (`slide2.xml`): captioned picture plus a picture with a dangling id
/// - slide 3 (`slide3.xml`): picture reusing `rId2` for a different image, and a table
/// - slide 4 (`slide1.xml`): picture without alt text or name, sharing image1
fn sample_deck() -> Vec<u8> {
    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldIdLst><p:sldId id="256" r:id="rId5"/><p:sldId id="257" r:id="rId3"/><p:sldId id="258" r:id="rId4"/><p:sldId id="259" r:id="rId2"/></p:sldIdLst></p:presentation>"#,
        NS
    );

    build_package(&[
        (
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_vec(),
        ),
        ("ppt/presentation.xml", presentation.into_bytes()),
        (
            "ppt/_rels/presentation.xml.rels",
            rels(&[
                ("rId2", REL_SLIDE, "slides/slide1.xml"),
                ("rId3", REL_SLIDE, "slides/slide2.xml"),
                ("rId4", REL_SLIDE, "slides/slide3.xml"),
                ("rId5", REL_SLIDE, "slides/slide4.xml"),
            ]),
        ),
        (
            "ppt/slides/slide4.xml",
            slide(&text_box(&[(0, "Intro"), (1, "Detail"), (0, "   ")])),
        ),
        (
            "ppt/slides/_rels/slide4.xml.rels",
            rels(&[("rId9", REL_NOTES, "../notesSlides/notesSlide1.xml")]),
        ),
        (
            "ppt/notesSlides/notesSlide1.xml",
            notes("  Welcome everyone  "),
        ),
        (
            "ppt/slides/slide2.xml",
            slide(&format!(
                "{}{}{}",
                text_box(&[(0, "Architecture")]),
                picture("Picture 3", Some("Diagram A"), "rId2"),
                picture("Picture 5", None, "rId7"),
            )),
        ),
        (
            "ppt/slides/_rels/slide2.xml.rels",
            rels(&[("rId2", REL_IMAGE, "../media/image1.png")]),
        ),
        (
            "ppt/slides/slide3.xml",
            slide(&format!("{}{}", picture("Photo", None, "rId2"), TABLE)),
        ),
        (
            "ppt/slides/_rels/slide3.xml.rels",
            rels(&[("rId2", REL_IMAGE, "../media/image2.jpeg")]),
        ),
        ("ppt/slides/slide1.xml", slide(&picture("", None, "rId2"))),
        (
            "ppt/slides/_rels/slide1.xml.rels",
            rels(&[("rId2", REL_IMAGE, "../media/image1.png")]),
        ),
        ("ppt/media/image1.png", PNG.to_vec()),
        ("ppt/media/image2.jpeg", JPEG.to_vec()),
    ])
}

#[test]
fn parses_slides_in_presentation_order() {
    let deck = PptxParser::new()
        .parse(Cursor::new(sample_deck()), "Team Update.pptx")
        .unwrap();

    assert_eq!(deck.slides.len(), 4);
    assert_eq!(
        deck.slides.iter().map(|s| s.number).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(deck.slides[0].notes.as_deref(), Some("Welcome everyone"));
    assert!(deck.slides[1].notes.is_none());
    assert!(matches!(deck.slides[2].shapes[1], Shape::Table(_)));

    // image1 is shared by two slides but stored once
    assert_eq!(deck.parts.len(), 2);
    assert_eq!(deck.part("ppt/media/image1.png").unwrap().data, PNG);
}

#[test]
fn converts_deck_to_markdown() {
    let deck = PptxParser::new()
        .parse(Cursor::new(sample_deck()), "Team Update.pptx")
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let converter = Converter::new(dir.path());
    let result = converter.convert(&deck).unwrap();
    let md = &result.markdown;

    assert_eq!(result.name, "Team_Update");
    assert!(md.starts_with("# Team Update.pptx\n\n## Slide 1\n- Intro\n  - Detail\n"));
    assert!(md.contains("**Notes:**\n> Welcome everyone\n"));

    // Slide 2: resolved picture with alt text, dangling reference skipped
    assert!(md.contains("![Diagram A](media/Team_Update_slide2_img1.png)"));
    assert!(!md.contains("Team_Update_slide2_img2"));
    assert!(md.contains("**Non-text shapes:** picture:2\n"));
    assert!(md.contains("- Picture 1: Diagram A\n- Picture 2: Picture 5\n"));

    // Slide 3: rId2 resolves through slide 3's own table
    assert!(md.contains("![Photo](media/Team_Update_slide3_img1.jpeg)"));
    assert!(md.contains("- A | B\n- C\n"));
    assert!(md.contains("**Non-text shapes:** picture:1, table:1\n"));

    // Slide 4: no text, no notes, no alt text
    let slide4 = &md[md.find("## Slide 4").unwrap()..];
    assert!(slide4.contains("_(no text detected on this slide)_"));
    assert!(slide4.contains("![Picture 1](media/Team_Update_slide4_img1.png)"));
    assert!(slide4.contains("- Picture 1: (empty alt text)"));
    assert!(slide4.contains("_Recommendation: Add alt text to pictures"));
    assert!(slide4.contains("_Recommendation: Add alt text or Notes"));

    assert_eq!(
        result.images,
        vec![
            "media/Team_Update_slide2_img1.png",
            "media/Team_Update_slide3_img1.jpeg",
            "media/Team_Update_slide4_img1.png",
        ]
    );
    let media = dir.path().join("media");
    assert_eq!(fs::read(media.join("Team_Update_slide2_img1.png")).unwrap(), PNG);
    assert_eq!(fs::read(media.join("Team_Update_slide3_img1.jpeg")).unwrap(), JPEG);
    assert_eq!(fs::read_dir(&media).unwrap().count(), 3);

    let path = converter.write(&result).unwrap();
    assert_eq!(path, dir.path().join("Team_Update.md"));
}

#[test]
fn repeated_conversion_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let converter = Converter::new(dir.path()).with_locale(Locale::Indonesian);

    let first = converter
        .convert(&PptxParser::new().parse(Cursor::new(sample_deck()), "x.pptx").unwrap())
        .unwrap();
    let second = converter
        .convert(&PptxParser::new().parse(Cursor::new(sample_deck()), "x.pptx").unwrap())
        .unwrap();

    assert_eq!(first.markdown, second.markdown);
    assert!(first.markdown.contains("- Gambar 1: (alt text kosong)"));
}

#[test]
fn falls_back_to_relationship_order_without_slide_list() {
    let package = build_package(&[
        (
            "ppt/presentation.xml",
            format!(r#"<p:presentation {}/>"#, NS).into_bytes(),
        ),
        (
            "ppt/_rels/presentation.xml.rels",
            rels(&[
                ("rId3", REL_SLIDE, "slides/slide10.xml"),
                ("rId2", REL_SLIDE, "slides/slide2.xml"),
            ]),
        ),
        ("ppt/slides/slide2.xml", slide(&text_box(&[(0, "Second")]))),
        ("ppt/slides/slide10.xml", slide(&text_box(&[(0, "Tenth")]))),
    ]);

    let deck = PptxParser::new()
        .parse(Cursor::new(package), "fallback.pptx")
        .unwrap();
    let first: Vec<String> = deck.slides[0]
        .text_lines()
        .map(|l| l.text.into_owned())
        .collect();
    assert_eq!(first, vec!["Second"]);
    assert!(deck.slides[1].relationships.is_empty());
}

#[test]
fn missing_slide_part_is_an_error() {
    let package = build_package(&[
        (
            "ppt/presentation.xml",
            format!(
                r#"<p:presentation {}><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#,
                NS
            )
            .into_bytes(),
        ),
        (
            "ppt/_rels/presentation.xml.rels",
            rels(&[("rId2", REL_SLIDE, "slides/slide1.xml")]),
        ),
    ]);

    assert!(PptxParser::new()
        .parse(Cursor::new(package), "broken.pptx")
        .is_err());
}

/// Overwrite the uncompressed size recorded for `name` in the central directory.
fn declare_size(package: &mut [u8], name: &str, size: u32) {
    let name = name.as_bytes();
    let start = (0..package.len() - 46)
        .find(|&i| {
            let len = u16::from_le_bytes([package[i + 28], package[i + 29]]) as usize;
            package[i..i + 4] == [b'P', b'K', 1, 2]
                && package.get(i + 46..i + 46 + len) == Some(name)
        })
        .unwrap();
    package[start + 24..start + 28].copy_from_slice(&size.to_le_bytes());
}

#[test]
fn oversized_declared_part_size_is_not_trusted() {
    let mut package = sample_deck();
    declare_size(&mut package, "ppt/media/image1.png", 0xFFFF_FFF0);

    let deck = PptxParser::new()
        .parse(Cursor::new(package), "Team Update.pptx")
        .unwrap();
    assert_eq!(deck.part("ppt/media/image1.png").unwrap().data, PNG);
}
