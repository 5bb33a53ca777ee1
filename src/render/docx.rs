//! WordprocessingML package writer.
//!
//! Serializes a direction-resolved [`DocumentTree`] into the parts of a
//! `.docx` zip container. Every paragraph, table and the section carry an
//! explicit direction; table cells stay in logical order and right-to-left
//! tables are flagged with `w:bidiVisual`.

use std::io::{Cursor, Seek, Write};

use chrono::SecondsFormat;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::xml::XmlWriter;
use super::RenderConfig;
use crate::error::Result;
use crate::model::{
    Alignment, Block, Direction, DocumentTree, Metadata, Paragraph, Run, Table, VerticalPosition,
};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const CT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Table border width in eighths of a point.
const TABLE_BORDER_SIZE: &str = "12";

/// Package part names in write order.
pub const PARTS: [&str; 6] = [
    "[Content_Types].xml",
    "_rels/.rels",
    "word/document.xml",
    "word/styles.xml",
    "word/_rels/document.xml.rels",
    "docProps/core.xml",
];

/// Write the package to any seekable sink.
///
/// The sink is flushed before returning, so buffered writers report
/// their errors here rather than on drop.
pub fn write_docx<W: Write + Seek>(
    tree: &DocumentTree,
    config: &RenderConfig,
    writer: W,
) -> Result<()> {
    let docx = DocxWriter::new(config);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    let parts = [
        content_types_xml(),
        package_rels_xml(),
        docx.document_xml(tree),
        docx.styles_xml(),
        document_rels_xml(),
        core_properties_xml(&tree.metadata),
    ];

    for (name, content) in PARTS.iter().zip(parts.iter()) {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    let mut writer = zip.finish()?;
    writer.flush()?;

    log::debug!(
        "wrote package: {} block(s), {} run(s)",
        tree.block_count(),
        tree.runs.len()
    );
    Ok(())
}

/// Serialize the package into memory.
pub fn to_docx_bytes(tree: &DocumentTree, config: &RenderConfig) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_docx(tree, config, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Builds the XML of the main document and style parts.
#[derive(Debug, Clone, Copy)]
pub struct DocxWriter<'a> {
    config: &'a RenderConfig,
}

impl<'a> DocxWriter<'a> {
    /// Create a writer for the given configuration.
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// The `word/document.xml` part.
    pub fn document_xml(&self, tree: &DocumentTree) -> String {
        let mut w = XmlWriter::new();
        w.open("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)]);
        w.open("w:body", &[]);

        let base = tree.section.direction.unwrap_or(self.config.base_direction);
        for block in &tree.blocks {
            match block {
                Block::Heading { level, paragraph } => {
                    let style = format!("Heading{}", level);
                    self.paragraph(&mut w, tree, paragraph, Some(style.as_str()), base);
                }
                Block::Paragraph(p) | Block::Spacer(p) => {
                    self.paragraph(&mut w, tree, p, None, base);
                }
                Block::Formula(p) => self.paragraph(&mut w, tree, p, Some("Formula"), base),
                Block::Caption(p) => self.paragraph(&mut w, tree, p, Some("Caption"), base),
                Block::Table(table) => {
                    let direction = table.direction.unwrap_or(base);
                    self.table(&mut w, tree, table, direction);
                    // keeps adjacent tables from merging
                    w.open("w:p", &[]);
                    self.paragraph_props(&mut w, None, direction, Alignment::Start);
                    w.close("w:p");
                }
            }
        }

        self.section(&mut w, tree, base);
        w.close("w:body");
        w.close("w:document");
        w.finish()
    }

    fn paragraph(
        &self,
        w: &mut XmlWriter,
        tree: &DocumentTree,
        paragraph: &Paragraph,
        style: Option<&str>,
        base: Direction,
    ) {
        let direction = paragraph.direction.unwrap_or(base);
        w.open("w:p", &[]);
        self.paragraph_props(w, style, direction, paragraph.alignment);
        for run in tree.runs(&paragraph.runs) {
            write_run(w, run);
        }
        w.close("w:p");
    }

    fn paragraph_props(
        &self,
        w: &mut XmlWriter,
        style: Option<&str>,
        direction: Direction,
        alignment: Alignment,
    ) {
        w.open("w:pPr", &[]);
        if let Some(style) = style {
            w.empty("w:pStyle", &[("w:val", style)]);
        }
        write_bidi(w, "w:bidi", direction);
        w.empty("w:jc", &[("w:val", justification(alignment))]);
        w.close("w:pPr");
    }

    fn table(&self, w: &mut XmlWriter, tree: &DocumentTree, table: &Table, direction: Direction) {
        let cols = table.column_count().max(1);
        let text_width = tree
            .section
            .page_width
            .saturating_sub(tree.section.margin.saturating_mul(2));
        let col_width = (text_width as usize / cols).to_string();

        w.open("w:tbl", &[]);
        w.open("w:tblPr", &[]);
        if direction.is_rtl() {
            w.empty("w:bidiVisual", &[]);
        }
        w.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")]);
        w.open("w:tblBorders", &[]);
        for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            w.empty(
                edge,
                &[
                    ("w:val", "single"),
                    ("w:sz", TABLE_BORDER_SIZE),
                    ("w:space", "0"),
                    ("w:color", "auto"),
                ],
            );
        }
        w.close("w:tblBorders");
        w.close("w:tblPr");

        w.open("w:tblGrid", &[]);
        for _ in 0..cols {
            w.empty("w:gridCol", &[("w:w", col_width.as_str())]);
        }
        w.close("w:tblGrid");

        for row in &table.rows {
            w.open("w:tr", &[]);
            if row.is_header {
                w.open("w:trPr", &[]);
                w.empty("w:tblHeader", &[]);
                w.close("w:trPr");
            }
            for cell in &row.cells {
                w.open("w:tc", &[]);
                w.open("w:tcPr", &[]);
                w.empty("w:tcW", &[("w:w", col_width.as_str()), ("w:type", "dxa")]);
                if let Some(fill) = &cell.shading {
                    w.empty(
                        "w:shd",
                        &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill.as_str())],
                    );
                }
                w.close("w:tcPr");

                w.open("w:p", &[]);
                let cell_direction = cell.direction.unwrap_or(direction);
                self.paragraph_props(w, None, cell_direction, cell.alignment);
                for run in tree.runs(&cell.runs) {
                    write_run(w, run);
                }
                w.close("w:p");
                w.close("w:tc");
            }
            w.close("w:tr");
        }
        w.close("w:tbl");
    }

    fn section(&self, w: &mut XmlWriter, tree: &DocumentTree, base: Direction) {
        let section = &tree.section;
        let width = section.page_width.to_string();
        let height = section.page_height.to_string();
        let margin = section.margin.to_string();

        w.open("w:sectPr", &[]);
        w.empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())]);
        w.empty(
            "w:pgMar",
            &[
                ("w:top", margin.as_str()),
                ("w:right", margin.as_str()),
                ("w:bottom", margin.as_str()),
                ("w:left", margin.as_str()),
                ("w:header", "708"),
                ("w:footer", "708"),
                ("w:gutter", "0"),
            ],
        );
        if section.direction.unwrap_or(base).is_rtl() {
            w.empty("w:bidi", &[]);
        }
        if section.rtl_gutter {
            w.empty("w:rtlGutter", &[]);
        }
        w.close("w:sectPr");
    }

    /// The `word/styles.xml` part.
    pub fn styles_xml(&self) -> String {
        let fonts = &self.config.fonts;
        let base = self.config.base_direction;
        let mut w = XmlWriter::new();
        w.open("w:styles", &[("xmlns:w", NS_W)]);

        w.open("w:docDefaults", &[]);
        w.open("w:rPrDefault", &[]);
        w.open("w:rPr", &[]);
        write_fonts(&mut w, &fonts.secondary.family, &fonts.primary.family);
        write_size(&mut w, fonts.primary.size);
        w.close("w:rPr");
        w.close("w:rPrDefault");
        w.open("w:pPrDefault", &[]);
        w.open("w:pPr", &[]);
        write_bidi(&mut w, "w:bidi", base);
        w.close("w:pPr");
        w.close("w:pPrDefault");
        w.close("w:docDefaults");

        w.open(
            "w:style",
            &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
        );
        w.empty("w:name", &[("w:val", "Normal")]);
        w.empty("w:qFormat", &[]);
        w.close("w:style");

        for level in 1..=self.config.max_heading_level {
            let id = format!("Heading{}", level);
            let name = format!("heading {}", level);
            let outline = (level - 1).to_string();
            w.open("w:style", &[("w:type", "paragraph"), ("w:styleId", id.as_str())]);
            w.empty("w:name", &[("w:val", name.as_str())]);
            w.empty("w:basedOn", &[("w:val", "Normal")]);
            w.empty("w:next", &[("w:val", "Normal")]);
            w.empty("w:qFormat", &[]);
            w.open("w:pPr", &[]);
            w.empty("w:keepNext", &[]);
            w.empty("w:spacing", &[("w:before", "240"), ("w:after", "120")]);
            w.empty("w:outlineLvl", &[("w:val", outline.as_str())]);
            w.close("w:pPr");
            w.open("w:rPr", &[]);
            write_fonts(&mut w, &fonts.secondary.family, &fonts.heading_family);
            w.empty("w:b", &[]);
            w.empty("w:bCs", &[]);
            write_size(&mut w, fonts.heading_size(level));
            w.close("w:rPr");
            w.close("w:style");
        }

        self.simple_style(&mut w, "Caption", "caption", &fonts.caption.family, fonts.caption.size);
        self.simple_style(&mut w, "Formula", "Formula", &fonts.formula.family, fonts.formula.size);

        w.close("w:styles");
        w.finish()
    }

    fn simple_style(&self, w: &mut XmlWriter, id: &str, name: &str, family: &str, size: f32) {
        w.open("w:style", &[("w:type", "paragraph"), ("w:styleId", id)]);
        w.empty("w:name", &[("w:val", name)]);
        w.empty("w:basedOn", &[("w:val", "Normal")]);
        w.empty("w:qFormat", &[]);
        w.open("w:rPr", &[]);
        write_fonts(w, family, family);
        write_size(w, size);
        w.close("w:rPr");
        w.close("w:style");
    }
}

fn write_run(w: &mut XmlWriter, run: &Run) {
    if run.is_empty() {
        return;
    }
    let style = &run.style;

    w.open("w:r", &[]);
    w.open("w:rPr", &[]);
    if !style.font_name.is_empty() {
        write_fonts(w, &style.font_name, &style.font_name);
    }
    if style.bold {
        w.empty("w:b", &[]);
        w.empty("w:bCs", &[]);
    }
    if style.italic {
        w.empty("w:i", &[]);
        w.empty("w:iCs", &[]);
    }
    if style.strike {
        w.empty("w:strike", &[]);
    }
    if style.font_size > 0.0 {
        write_size(w, style.font_size);
    }
    if let Some(position) = run.vertical_position() {
        let value = match position {
            VerticalPosition::Superscript => "superscript",
            VerticalPosition::Subscript => "subscript",
        };
        w.empty("w:vertAlign", &[("w:val", value)]);
    }
    if style.rtl {
        w.empty("w:rtl", &[]);
    }
    w.close("w:rPr");
    w.text_element("w:t", &[("xml:space", "preserve")], &run.text);
    w.close("w:r");
}

fn write_fonts(w: &mut XmlWriter, latin: &str, complex: &str) {
    w.empty(
        "w:rFonts",
        &[("w:ascii", latin), ("w:hAnsi", latin), ("w:cs", complex)],
    );
}

fn write_size(w: &mut XmlWriter, points: f32) {
    let half_points = half_points(points).to_string();
    w.empty("w:sz", &[("w:val", half_points.as_str())]);
    w.empty("w:szCs", &[("w:val", half_points.as_str())]);
}

fn write_bidi(w: &mut XmlWriter, name: &str, direction: Direction) {
    if direction.is_rtl() {
        w.empty(name, &[]);
    } else {
        w.empty(name, &[("w:val", "0")]);
    }
}

/// Font size in half-points, as stored in `w:sz`.
pub fn half_points(points: f32) -> u32 {
    (points * 2.0).round().max(1.0) as u32
}

fn justification(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Start => "left",
        Alignment::Center => "center",
        Alignment::End => "right",
        Alignment::Justify => "both",
    }
}

fn content_types_xml() -> String {
    let mut w = XmlWriter::new();
    w.open("Types", &[("xmlns", NS_CONTENT_TYPES)]);
    w.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELS)]);
    w.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")]);
    for (part, content_type) in [
        ("/word/document.xml", CT_MAIN),
        ("/word/styles.xml", CT_STYLES),
        ("/docProps/core.xml", CT_CORE),
    ] {
        w.empty("Override", &[("PartName", part), ("ContentType", content_type)]);
    }
    w.close("Types");
    w.finish()
}

fn relationships_xml(relationships: &[(&str, &str, &str)]) -> String {
    let mut w = XmlWriter::new();
    w.open("Relationships", &[("xmlns", NS_PKG_RELS)]);
    for (id, kind, target) in relationships {
        w.empty(
            "Relationship",
            &[("Id", *id), ("Type", *kind), ("Target", *target)],
        );
    }
    w.close("Relationships");
    w.finish()
}

fn package_rels_xml() -> String {
    relationships_xml(&[
        ("rId1", REL_OFFICE_DOCUMENT, "word/document.xml"),
        ("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
    ])
}

fn document_rels_xml() -> String {
    relationships_xml(&[("rId1", REL_STYLES, "styles.xml")])
}

fn core_properties_xml(metadata: &Metadata) -> String {
    let mut w = XmlWriter::new();
    w.open(
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
    );
    if let Some(title) = &metadata.title {
        w.text_element("dc:title", &[], title);
    }
    if let Some(author) = &metadata.author {
        w.text_element("dc:creator", &[], author);
    }
    if let Some(created) = &metadata.created {
        let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
        w.text_element("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &stamp);
        w.text_element("dcterms:modified", &[("xsi:type", "dcterms:W3CDTF")], &stamp);
    }
    w.close("cp:coreProperties");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunKind, RunStyle, Script, TableCell, TableRow};
    use chrono::{TimeZone, Utc};
    use std::io::Read;

    fn rtl_paragraph(tree: &mut DocumentTree, text: &str) -> Block {
        let style = RunStyle {
            font_name: "B Nazanin".into(),
            font_size: 13.0,
            rtl: true,
            ..Default::default()
        };
        let range = tree.push_runs(vec![Run::new(text, Script::Primary).with_style(style)]);
        let mut p = Paragraph::new(range);
        p.direction = Some(Direction::Rtl);
        Block::Paragraph(p)
    }

    #[test]
    fn test_paragraph_xml() {
        let config = RenderConfig::default();
        let mut tree = DocumentTree::new();
        let block = rtl_paragraph(&mut tree, "سلام");
        tree.push_block(block);
        tree.section.direction = Some(Direction::Rtl);
        tree.section.rtl_gutter = true;

        let xml = DocxWriter::new(&config).document_xml(&tree);
        assert!(xml.contains(r#"<w:pPr><w:bidi/><w:jc w:val="both"/></w:pPr>"#));
        assert!(xml.contains(r#"<w:rFonts w:ascii="B Nazanin" w:hAnsi="B Nazanin" w:cs="B Nazanin"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="26"/>"#));
        assert!(xml.contains("<w:rtl/>"));
        assert!(xml.contains(r#"<w:t xml:space="preserve">سلام</w:t>"#));
        assert!(xml.contains("<w:bidi/><w:rtlGutter/></w:sectPr>"));
    }

    #[test]
    fn test_ltr_paragraph_and_vertical_run() {
        let config = RenderConfig::default();
        let mut tree = DocumentTree::new();
        let range = tree.push_runs(vec![
            Run::new("x", Script::Secondary),
            Run::new("2", Script::Neutral).with_kind(RunKind::Vertical {
                position: VerticalPosition::Superscript,
            }),
        ]);
        let mut p = Paragraph::new(range);
        p.direction = Some(Direction::Ltr);
        tree.push_block(Block::Paragraph(p));

        let xml = DocxWriter::new(&config).document_xml(&tree);
        assert!(xml.contains(r#"<w:bidi w:val="0"/>"#));
        assert!(xml.contains(r#"<w:vertAlign w:val="superscript"/>"#));
    }

    #[test]
    fn test_rtl_table_xml() {
        let config = RenderConfig::default();
        let mut tree = DocumentTree::new();
        let a = tree.push_runs(vec![Run::new("الف", Script::Primary)]);
        let b = tree.push_runs(vec![Run::new("ب", Script::Primary)]);
        let mut table = Table::with_header(1);
        table.add_row(TableRow::header(vec![
            TableCell::new(a).shaded("D9E2F3"),
            TableCell::new(b).shaded("D9E2F3"),
        ]));
        table.direction = Some(Direction::Rtl);
        tree.push_block(Block::Table(table));

        let xml = DocxWriter::new(&config).document_xml(&tree);
        assert!(xml.contains("<w:tblPr><w:bidiVisual/>"));
        assert!(xml.contains(r#"<w:top w:val="single" w:sz="12""#));
        assert!(xml.contains("<w:trPr><w:tblHeader/></w:trPr>"));
        assert!(xml.contains(r#"w:fill="D9E2F3""#));
        // cells in logical order
        let first = xml.find("الف").unwrap();
        let second = xml.find(">ب<").unwrap();
        assert!(first < second);
        // one empty paragraph after the table
        assert!(xml.contains("</w:tbl><w:p><w:pPr><w:bidi/>"));
    }

    struct FlushFails(Cursor<Vec<u8>>);

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
    }

    impl Seek for FlushFails {
        fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
            self.0.seek(pos)
        }
    }

    #[test]
    fn test_flush_error_reported() {
        let config = RenderConfig::default();
        let mut tree = DocumentTree::new();
        let block = rtl_paragraph(&mut tree, "سلام");
        tree.push_block(block);

        let result = write_docx(&tree, &config, FlushFails(Cursor::new(Vec::new())));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_table_with_oversized_margin() {
        let config = RenderConfig::default();
        let mut tree = DocumentTree::new();
        tree.section.margin = u32::MAX;
        let a = tree.push_runs(vec![Run::new("a", Script::Secondary)]);
        let b = tree.push_runs(vec![Run::new("b", Script::Secondary)]);
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::new(a), TableCell::new(b)]));
        tree.push_block(Block::Table(table));

        let xml = DocxWriter::new(&config).document_xml(&tree);
        assert!(xml.contains(r#"<w:gridCol w:w="0"/>"#));
    }

    #[test]
    fn test_styles_xml() {
        let config = RenderConfig::default();
        let xml = DocxWriter::new(&config).styles_xml();
        assert!(xml.contains(r#"w:styleId="Heading1""#));
        assert!(xml.contains(r#"w:styleId="Heading3""#));
        assert!(!xml.contains(r#"w:styleId="Heading4""#));
        assert!(xml.contains(r#"w:cs="B Titr""#));
        assert!(xml.contains(r#"<w:sz w:val="36"/>"#));
        assert!(xml.contains(r#"w:styleId="Formula""#));
    }

    #[test]
    fn test_core_properties() {
        let metadata = Metadata {
            title: Some("گزارش & نتایج".into()),
            author: None,
            created: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        };
        let xml = core_properties_xml(&metadata);
        assert!(xml.contains("<dc:title>گزارش &amp; نتایج</dc:title>"));
        assert!(xml.contains("2024-03-01T12:00:00Z"));
        assert!(!xml.contains("dc:creator"));
    }

    #[test]
    fn test_package_parts() {
        let config = RenderConfig::default();
        let mut tree = DocumentTree::new();
        let block = rtl_paragraph(&mut tree, "متن");
        tree.push_block(block);

        let bytes = to_docx_bytes(&tree, &config).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in PARTS {
            assert!(archive.by_name(part).is_ok(), "missing {}", part);
        }

        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("متن"));
    }

    #[test]
    fn test_half_points() {
        assert_eq!(half_points(13.0), 26);
        assert_eq!(half_points(10.5), 21);
        assert_eq!(half_points(0.0), 1);
    }
}
