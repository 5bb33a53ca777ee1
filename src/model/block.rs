//! Document-level blocks.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// One structural unit of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading
    Heading {
        /// Heading level (1 = top)
        level: u8,
        /// Heading text
        paragraph: Paragraph,
    },

    /// A body paragraph
    Paragraph(Paragraph),

    /// A display formula
    Formula(Paragraph),

    /// A figure or table caption
    Caption(Paragraph),

    /// A table
    Table(Table),

    /// An empty paragraph kept for blank-line spacing
    Spacer(Paragraph),
}

impl Block {
    /// The paragraph of a paragraph-level block.
    pub fn paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Heading { paragraph, .. } => Some(paragraph),
            Block::Paragraph(p) | Block::Formula(p) | Block::Caption(p) | Block::Spacer(p) => {
                Some(p)
            }
            Block::Table(_) => None,
        }
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this block is a formula.
    pub fn is_formula(&self) -> bool {
        matches!(self, Block::Formula(_))
    }

    /// Heading level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Block::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_variants() {
        let heading = Block::Heading {
            level: 2,
            paragraph: Paragraph::new(0..1),
        };
        assert!(heading.is_heading());
        assert_eq!(heading.heading_level(), Some(2));
        assert!(heading.paragraph().is_some());

        let table = Block::Table(Table::new());
        assert!(table.is_table());
        assert!(table.paragraph().is_none());
        assert_eq!(table.heading_level(), None);
    }
}
