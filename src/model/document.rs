//! Document-level types.

use super::{Block, Direction, Paragraph, Run};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The document tree built for one conversion.
///
/// Blocks and runs live in flat arenas; blocks refer to their runs by
/// index range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Page-level section properties
    pub section: SectionProps,

    /// Blocks in document order
    pub blocks: Vec<Block>,

    /// Run arena
    pub runs: Vec<Run>,
}

impl DocumentTree {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with the given section properties.
    pub fn with_section(section: SectionProps) -> Self {
        Self {
            section,
            ..Self::default()
        }
    }

    /// Move runs into the arena and return their index range.
    pub fn push_runs(&mut self, runs: Vec<Run>) -> Range<usize> {
        let start = self.runs.len();
        self.runs.extend(runs);
        start..self.runs.len()
    }

    /// Append a block.
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Runs of a range.
    pub fn runs(&self, range: &Range<usize>) -> &[Run] {
        &self.runs[range.clone()]
    }

    /// Concatenated text of a run range.
    pub fn text_of(&self, range: &Range<usize>) -> String {
        self.runs(range).iter().map(|r| r.text.as_str()).collect()
    }

    /// Concatenated text of a paragraph.
    pub fn paragraph_text(&self, paragraph: &Paragraph) -> String {
        self.text_of(&paragraph.runs)
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get plain text content of the entire document in logical order.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Table(table) => table
                    .rows
                    .iter()
                    .map(|row| {
                        row.cells
                            .iter()
                            .map(|c| self.text_of(&c.runs))
                            .collect::<Vec<_>>()
                            .join("\t")
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                other => other
                    .paragraph()
                    .map(|p| self.paragraph_text(p))
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata written to the core properties part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Create metadata stamped with the current time.
    pub fn now() -> Self {
        Self {
            created: Some(Utc::now()),
            ..Default::default()
        }
    }
}

/// Page-level section properties. Lengths are in twips (1/1440 inch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProps {
    /// Page width
    pub page_width: u32,

    /// Page height
    pub page_height: u32,

    /// Uniform page margin
    pub margin: u32,

    /// Section direction; `None` until the directionality pass runs
    pub direction: Option<Direction>,

    /// Binding gutter on the right edge
    pub rtl_gutter: bool,
}

impl SectionProps {
    /// A4 with 1-inch margins.
    pub fn a4() -> Self {
        Self {
            page_width: 11906,
            page_height: 16838,
            margin: 1440,
            direction: None,
            rtl_gutter: false,
        }
    }

    /// US Letter with 1-inch margins.
    pub fn letter() -> Self {
        Self {
            page_width: 12240,
            page_height: 15840,
            ..Self::a4()
        }
    }
}

impl Default for SectionProps {
    fn default() -> Self {
        Self::a4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Script, Table, TableCell, TableRow};

    #[test]
    fn test_document_new() {
        let doc = DocumentTree::new();
        assert!(doc.is_empty());
        assert_eq!(doc.block_count(), 0);
        assert_eq!(doc.section, SectionProps::a4());
    }

    #[test]
    fn test_push_runs_ranges() {
        let mut doc = DocumentTree::new();
        let first = doc.push_runs(vec![
            Run::new("a ", Script::Secondary),
            Run::new("b", Script::Secondary),
        ]);
        let second = doc.push_runs(vec![Run::new("ج", Script::Primary)]);
        assert_eq!(first, 0..2);
        assert_eq!(second, 2..3);
        assert_eq!(doc.text_of(&first), "a b");
        assert_eq!(doc.runs(&second)[0].text, "ج");
    }

    #[test]
    fn test_plain_text_with_table() {
        let mut doc = DocumentTree::new();
        let p = doc.push_runs(vec![Run::new("Intro", Script::Secondary)]);
        doc.push_block(Block::Paragraph(Paragraph::new(p)));

        let a = doc.push_runs(vec![Run::new("A", Script::Secondary)]);
        let b = doc.push_runs(vec![Run::new("B", Script::Secondary)]);
        let mut table = Table::with_header(1);
        table.add_row(TableRow::header(vec![TableCell::new(a), TableCell::new(b)]));
        doc.push_block(Block::Table(table));

        assert_eq!(doc.plain_text(), "Intro\n\nA\tB");
    }

    #[test]
    fn test_section_sizes() {
        assert!(SectionProps::a4().page_height > SectionProps::a4().page_width);
        assert_eq!(SectionProps::letter().margin, 1440);
    }

    #[test]
    fn test_metadata_now() {
        assert!(Metadata::now().created.is_some());
        assert!(Metadata::default().created.is_none());
    }
}
