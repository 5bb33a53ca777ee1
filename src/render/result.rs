//! Conversion result with warnings and statistics.

use crate::error::RenderWarning;
use crate::model::{Block, DocumentTree};
use serde::{Deserialize, Serialize};

/// Result of converting one input: the fixed tree, the warnings collected
/// while building it, and statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// The direction-resolved document tree
    pub tree: DocumentTree,

    /// Blocks that were downgraded, in input order
    pub warnings: Vec<RenderWarning>,

    /// Content statistics
    pub stats: ConversionStats,
}

impl Conversion {
    /// Wrap a finished tree, computing its statistics.
    pub fn new(tree: DocumentTree, warnings: Vec<RenderWarning>) -> Self {
        let stats = ConversionStats::from_tree(&tree);
        Self {
            tree,
            warnings,
            stats,
        }
    }

    /// Check if any block was downgraded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Statistics collected from a document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of headings
    pub heading_count: u32,

    /// Number of body paragraphs
    pub paragraph_count: u32,

    /// Number of display formulas
    pub formula_count: u32,

    /// Number of captions
    pub caption_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of runs in the arena
    pub run_count: u32,

    /// Number of right-to-left blocks after direction resolution
    pub rtl_block_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count blocks and text of a tree.
    pub fn from_tree(tree: &DocumentTree) -> Self {
        let mut stats = Self::new();
        stats.run_count = tree.runs.len() as u32;

        for block in &tree.blocks {
            let direction = match block {
                Block::Heading { paragraph, .. } => {
                    stats.heading_count += 1;
                    paragraph.direction
                }
                Block::Paragraph(p) => {
                    stats.paragraph_count += 1;
                    p.direction
                }
                Block::Formula(p) => {
                    stats.formula_count += 1;
                    p.direction
                }
                Block::Caption(p) => {
                    stats.caption_count += 1;
                    p.direction
                }
                Block::Table(table) => {
                    stats.table_count += 1;
                    table.direction
                }
                Block::Spacer(_) => None,
            };
            if direction.is_some_and(|d| d.is_rtl()) {
                stats.rtl_block_count += 1;
            }
        }

        for run in &tree.runs {
            stats.count_text(&run.text);
        }
        stats
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        // half-spaces join words
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, Paragraph, Run, Script, Table};

    #[test]
    fn test_stats_count_text() {
        let mut stats = ConversionStats::new();
        stats.count_text("Hello, world! This is a test.");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_stats_from_tree() {
        let mut tree = DocumentTree::new();
        let h = tree.push_runs(vec![Run::new("عنوان", Script::Primary)]);
        let mut heading = Paragraph::new(h);
        heading.direction = Some(Direction::Rtl);
        tree.push_block(Block::Heading {
            level: 1,
            paragraph: heading,
        });
        let f = tree.push_runs(vec![Run::formula("α")]);
        tree.push_block(Block::Formula(Paragraph::new(f)));
        tree.push_block(Block::Table(Table::new()));

        let stats = ConversionStats::from_tree(&tree);
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.formula_count, 1);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.run_count, 2);
        assert_eq!(stats.rtl_block_count, 1);
        assert_eq!(stats.word_count, 2);
    }

    #[test]
    fn test_conversion_warnings() {
        let conversion = Conversion::new(DocumentTree::new(), Vec::new());
        assert!(!conversion.has_warnings());
        assert_eq!(conversion.stats, ConversionStats::default());
    }
}
