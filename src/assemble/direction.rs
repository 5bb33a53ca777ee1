//! Directionality resolution for paragraphs, tables and the section.

use crate::model::{Block, Direction, DocumentTree, Run};
use crate::render::RenderConfig;
use crate::text::script::run_direction;

/// Majority direction of the strong runs, or `None` on a tie or when no
/// run has a strong direction.
pub fn majority(runs: &[Run]) -> Option<Direction> {
    let (rtl, ltr) = runs
        .iter()
        .filter_map(run_direction)
        .fold((0usize, 0usize), |(rtl, ltr), d| match d {
            Direction::Rtl => (rtl + 1, ltr),
            Direction::Ltr => (rtl, ltr + 1),
        });
    decide(rtl, ltr)
}

fn decide(rtl: usize, ltr: usize) -> Option<Direction> {
    match rtl.cmp(&ltr) {
        std::cmp::Ordering::Greater => Some(Direction::Rtl),
        std::cmp::Ordering::Less => Some(Direction::Ltr),
        std::cmp::Ordering::Equal => None,
    }
}

/// Assigns one explicit direction to every paragraph, table and the
/// section of a document tree.
///
/// Directions are derived from runs only, so running the pass twice gives
/// the same tree.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalityFixer {
    base: Direction,
}

impl DirectionalityFixer {
    /// Create a fixer with the configured base direction.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            base: config.base_direction,
        }
    }

    /// Resolve all directions in place.
    pub fn apply(&self, tree: &mut DocumentTree) {
        let DocumentTree {
            blocks,
            runs,
            section,
            ..
        } = tree;

        let mut rtl_blocks = 0;
        let mut ltr_blocks = 0;
        let mut vote = |direction: Direction| match direction {
            Direction::Rtl => rtl_blocks += 1,
            Direction::Ltr => ltr_blocks += 1,
        };

        for block in blocks.iter_mut() {
            match block {
                Block::Formula(paragraph) => {
                    paragraph.direction = Some(Direction::Ltr);
                }
                Block::Spacer(_) => {}
                Block::Table(table) => {
                    let (mut rtl, mut ltr) = (0, 0);
                    for cell in table.cells() {
                        match majority(&runs[cell.runs.clone()]) {
                            Some(Direction::Rtl) => rtl += 1,
                            Some(Direction::Ltr) => ltr += 1,
                            None => {}
                        }
                    }
                    let direction = decide(rtl, ltr).unwrap_or(self.base);
                    table.direction = Some(direction);
                    for row in &mut table.rows {
                        for cell in &mut row.cells {
                            cell.direction = None;
                        }
                    }
                    vote(direction);
                }
                Block::Heading { paragraph, .. }
                | Block::Paragraph(paragraph)
                | Block::Caption(paragraph) => {
                    let direction = majority(&runs[paragraph.runs.clone()]).unwrap_or(self.base);
                    paragraph.direction = Some(direction);
                    vote(direction);
                }
            }
        }

        let direction = decide(rtl_blocks, ltr_blocks).unwrap_or(self.base);
        section.direction = Some(direction);
        section.rtl_gutter = direction.is_rtl();

        for block in blocks.iter_mut() {
            if let Block::Spacer(paragraph) = block {
                paragraph.direction = Some(direction);
            }
        }

        log::debug!(
            "directions resolved: {} rtl block(s), {} ltr block(s), section {:?}",
            rtl_blocks,
            ltr_blocks,
            direction
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Script, Table, TableCell, TableRow};

    fn paragraph(tree: &mut DocumentTree, runs: Vec<Run>) -> Block {
        Block::Paragraph(Paragraph::new(tree.push_runs(runs)))
    }

    fn fixer() -> DirectionalityFixer {
        DirectionalityFixer::new(&RenderConfig::default())
    }

    #[test]
    fn test_majority() {
        let runs = vec![
            Run::new("سلام", Script::Primary),
            Run::new("hello", Script::Secondary),
            Run::new("دنیا", Script::Primary),
        ];
        assert_eq!(majority(&runs), Some(Direction::Rtl));
        assert_eq!(majority(&runs[..2]), None);
        assert_eq!(majority(&[Run::new("12", Script::Neutral)]), None);
        assert_eq!(majority(&[Run::formula("x")]), None);
    }

    #[test]
    fn test_paragraph_directions() {
        let mut tree = DocumentTree::new();
        let rtl = paragraph(&mut tree, vec![Run::new("متن", Script::Primary)]);
        let ltr = paragraph(&mut tree, vec![Run::new("text", Script::Secondary)]);
        let neutral = paragraph(&mut tree, vec![Run::new("123", Script::Neutral)]);
        tree.push_block(rtl);
        tree.push_block(ltr);
        tree.push_block(neutral);

        fixer().apply(&mut tree);

        let dirs: Vec<_> = tree
            .blocks
            .iter()
            .map(|b| b.paragraph().and_then(|p| p.direction))
            .collect();
        assert_eq!(
            dirs,
            vec![Some(Direction::Rtl), Some(Direction::Ltr), Some(Direction::Rtl)]
        );
    }

    #[test]
    fn test_formula_always_ltr() {
        let mut tree = DocumentTree::new();
        let range = tree.push_runs(vec![Run::formula("α + β")]);
        tree.push_block(Block::Formula(Paragraph::new(range)));
        fixer().apply(&mut tree);
        assert_eq!(
            tree.blocks[0].paragraph().and_then(|p| p.direction),
            Some(Direction::Ltr)
        );
    }

    #[test]
    fn test_table_single_direction() {
        let mut tree = DocumentTree::new();
        let a = tree.push_runs(vec![Run::new("نام", Script::Primary)]);
        let b = tree.push_runs(vec![Run::new("Name", Script::Secondary)]);
        let c = tree.push_runs(vec![Run::new("علی", Script::Primary)]);
        let d = tree.push_runs(vec![Run::new("۲۰", Script::Neutral)]);

        let mut table = Table::with_header(1);
        table.add_row(TableRow::header(vec![
            TableCell::new(a).with_direction(Direction::Rtl),
            TableCell::new(b).with_direction(Direction::Ltr),
        ]));
        table.add_row(TableRow::new(vec![TableCell::new(c), TableCell::new(d)]));
        tree.push_block(Block::Table(table));

        fixer().apply(&mut tree);

        let Block::Table(table) = &tree.blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.direction, Some(Direction::Rtl));
        assert!(table.cells().all(|c| c.direction.is_none()));
        assert_eq!(tree.section.direction, Some(Direction::Rtl));
        assert!(tree.section.rtl_gutter);
    }

    #[test]
    fn test_section_follows_body() {
        let mut tree = DocumentTree::new();
        for _ in 0..2 {
            let block = paragraph(&mut tree, vec![Run::new("english", Script::Secondary)]);
            tree.push_block(block);
        }
        let block = paragraph(&mut tree, vec![Run::new("فارسی", Script::Primary)]);
        tree.push_block(block);
        tree.push_block(Block::Spacer(Paragraph::new(0..0)));

        fixer().apply(&mut tree);
        assert_eq!(tree.section.direction, Some(Direction::Ltr));
        assert!(!tree.section.rtl_gutter);
        assert_eq!(
            tree.blocks[3].paragraph().and_then(|p| p.direction),
            Some(Direction::Ltr)
        );
    }

    #[test]
    fn test_idempotent() {
        let mut tree = DocumentTree::new();
        let block = paragraph(
            &mut tree,
            vec![
                Run::new("hello", Script::Secondary),
                Run::new("سلام", Script::Primary),
            ],
        );
        tree.push_block(block);

        let f = fixer();
        f.apply(&mut tree);
        let once = tree.clone();
        f.apply(&mut tree);
        assert_eq!(tree, once);
    }
}
