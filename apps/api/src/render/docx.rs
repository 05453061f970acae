//! Minimal WordprocessingML (.docx) package writer.
//!
//! Emits only the parts Word needs to open the file: content types, package and
//! document relationships, core properties, styles, numbering and the document body.
//! Page setup is US Letter with 1" top/bottom and 1.25" side margins.

use std::io::{Cursor, Seek, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::policy::PROVIDER_NAME;
use crate::render::document::{Alignment, Block, RenderedDocument, Run};
use crate::render::RenderError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Twentieths of a point.
const INCH: u32 = 1440;
const PAGE_WIDTH: u32 = 12240;
const PAGE_HEIGHT: u32 = 15840;
const MARGIN_VERTICAL: u32 = INCH;
const MARGIN_HORIZONTAL: u32 = INCH + INCH / 4;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="365F91"/><w:sz w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="0"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:color w:val="4F81BD"/><w:sz w:val="26"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:contextualSpacing/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="2"/></w:numPr><w:contextualSpacing/></w:pPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num><w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num></w:numbering>"#;

const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

type XmlWriter = Writer<Vec<u8>>;

/// Serializes the document into an in-memory `.docx`.
pub fn to_bytes(doc: &RenderedDocument) -> Result<Vec<u8>, RenderError> {
    let cursor = write_docx(doc, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Writes the `.docx` package into any seekable sink and hands the sink back.
pub fn write_docx<W: Write + Seek>(doc: &RenderedDocument, sink: W) -> Result<W, RenderError> {
    let core = core_properties_xml(&doc.title)?;
    let document = document_xml(doc)?;

    let mut zip = ZipWriter::new(sink);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("docProps/core.xml", &core),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
        ("word/styles.xml", STYLES_XML.as_bytes()),
        ("word/numbering.xml", NUMBERING_XML.as_bytes()),
        ("word/document.xml", &document),
    ];

    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content)?;
    }

    Ok(zip.finish()?)
}

fn new_part() -> Result<XmlWriter, quick_xml::Error> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn open(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), quick_xml::Error> {
    w.write_event(Event::Start(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))
}

fn close(w: &mut XmlWriter, name: &str) -> Result<(), quick_xml::Error> {
    w.write_event(Event::End(BytesEnd::new(name)))
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), quick_xml::Error> {
    w.write_event(Event::Empty(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))
}

fn text(w: &mut XmlWriter, value: &str) -> Result<(), quick_xml::Error> {
    w.write_event(Event::Text(BytesText::new(&strip_control_chars(value))))
}

fn text_element(w: &mut XmlWriter, name: &str, value: &str) -> Result<(), quick_xml::Error> {
    open(w, name, &[])?;
    text(w, value)?;
    close(w, name)
}

fn core_properties_xml(title: &str) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_part()?;
    open(
        &mut w,
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    text_element(&mut w, "dc:title", title)?;
    text_element(&mut w, "dc:creator", PROVIDER_NAME)?;
    close(&mut w, "cp:coreProperties")?;
    Ok(w.into_inner())
}

fn document_xml(doc: &RenderedDocument) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = new_part()?;
    open(
        &mut w,
        "w:document",
        &[("xmlns:w", WORDPROCESSING_NS), ("xmlns:r", RELATIONSHIPS_NS)],
    )?;
    open(&mut w, "w:body", &[])?;

    for block in doc.blocks() {
        write_block(&mut w, block)?;
    }

    let (width, height) = (PAGE_WIDTH.to_string(), PAGE_HEIGHT.to_string());
    let (vertical, horizontal) = (MARGIN_VERTICAL.to_string(), MARGIN_HORIZONTAL.to_string());
    open(&mut w, "w:sectPr", &[])?;
    empty(&mut w, "w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
    empty(
        &mut w,
        "w:pgMar",
        &[
            ("w:top", vertical.as_str()),
            ("w:right", horizontal.as_str()),
            ("w:bottom", vertical.as_str()),
            ("w:left", horizontal.as_str()),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    close(&mut w, "w:sectPr")?;

    close(&mut w, "w:body")?;
    close(&mut w, "w:document")?;
    Ok(w.into_inner())
}

fn write_block(w: &mut XmlWriter, block: &Block) -> Result<(), quick_xml::Error> {
    match block {
        Block::Heading { level, text } => {
            let style = if *level == 1 { "Heading1" } else { "Heading2" };
            write_paragraph(w, Some(style), None, &[Run::plain(text.as_str())])
        }
        Block::Bullet { text } => {
            write_paragraph(w, Some("ListBullet"), None, &[Run::plain(text.as_str())])
        }
        Block::Numbered { text } => {
            write_paragraph(w, Some("ListNumber"), None, &[Run::plain(text.as_str())])
        }
        Block::Paragraph { text } => write_paragraph(w, None, None, &[Run::plain(text.as_str())]),
        Block::Spacer => empty(w, "w:p", &[]),
        Block::Styled { alignment, runs } => write_paragraph(w, None, Some(*alignment), runs),
    }
}

fn write_paragraph(
    w: &mut XmlWriter,
    style: Option<&str>,
    alignment: Option<Alignment>,
    runs: &[Run],
) -> Result<(), quick_xml::Error> {
    open(w, "w:p", &[])?;

    let justification = alignment.map(|a| match a {
        Alignment::Center => "center",
        Alignment::Right => "right",
    });
    if style.is_some() || justification.is_some() {
        open(w, "w:pPr", &[])?;
        if let Some(style) = style {
            empty(w, "w:pStyle", &[("w:val", style)])?;
        }
        if let Some(jc) = justification {
            empty(w, "w:jc", &[("w:val", jc)])?;
        }
        close(w, "w:pPr")?;
    }

    for run in runs {
        open(w, "w:r", &[])?;
        if run.bold || run.italic {
            open(w, "w:rPr", &[])?;
            if run.bold {
                empty(w, "w:b", &[])?;
            }
            if run.italic {
                empty(w, "w:i", &[])?;
            }
            close(w, "w:rPr")?;
        }
        if run.line_break_before {
            empty(w, "w:br", &[])?;
        }
        open(w, "w:t", &[("xml:space", "preserve")])?;
        text(w, &run.text)?;
        close(w, "w:t")?;
        close(w, "w:r")?;
    }

    close(w, "w:p")
}

/// Drops control characters XML 1.0 cannot carry; tab and newline survive.
fn strip_control_chars(value: &str) -> String {
    value
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || (c as u32) >= 0x20)
        .collect()
}
