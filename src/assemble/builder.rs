//! Block builders: segments in, document tree out.

use crate::assets::{decode_csv, Asset, AssetResolver};
use crate::error::RenderWarning;
use crate::model::{
    Alignment, Block, DocumentTree, Paragraph, Table, TableCell, TableRow,
};
use crate::render::RenderConfig;
use crate::text::{
    grid_from_rows, ContentKind, Line, MarkupSegmenter, RunBuilder, Segment, TableAssembler,
    TableGrid, TextRole,
};

use super::direction::majority;

/// Builds a [`DocumentTree`] from marked-up text.
///
/// Directions are left unresolved; run
/// [`DirectionalityFixer`](super::DirectionalityFixer) before serializing.
pub struct DocumentBuilder<'a> {
    config: &'a RenderConfig,
    segmenter: MarkupSegmenter,
    runs: RunBuilder,
    tables: TableAssembler,
    resolver: Option<&'a dyn AssetResolver>,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder for the given configuration.
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            segmenter: MarkupSegmenter::new(config),
            runs: RunBuilder::new(config),
            tables: TableAssembler::new(config),
            resolver: None,
        }
    }

    /// Resolve `{{id}}` placeholders through the given resolver.
    pub fn with_resolver(mut self, resolver: &'a dyn AssetResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the tree, collecting warnings for downgraded blocks.
    pub fn build(&self, input: &str) -> (DocumentTree, Vec<RenderWarning>) {
        let mut tree = DocumentTree::with_section(self.config.section());
        let mut warnings = Vec::new();
        let mut blank_pending = false;

        for segment in self.segmenter.segment(input) {
            if matches!(&segment, Segment::Line(line) if line.kind == ContentKind::Empty) {
                blank_pending = !tree.is_empty();
                continue;
            }

            let blocks = match self.build_segment(&mut tree, &segment) {
                Ok(blocks) => blocks,
                Err(warning) => {
                    log::warn!("{}", warning);
                    warnings.push(warning);
                    self.downgrade(&mut tree, &segment)
                }
            };
            if blocks.is_empty() {
                continue;
            }

            if blank_pending && self.config.preserve_blank_lines {
                tree.push_block(Block::Spacer(
                    Paragraph::new(tree.runs.len()..tree.runs.len()).align(Alignment::Start),
                ));
            }
            blank_pending = false;

            for block in blocks {
                tree.push_block(block);
            }
        }

        if tree.metadata.title.is_none() {
            tree.metadata.title = tree
                .blocks
                .iter()
                .find(|b| b.is_heading())
                .and_then(Block::paragraph)
                .map(|p| tree.paragraph_text(p));
        }

        log::debug!(
            "built {} block(s), {} run(s), {} warning(s)",
            tree.block_count(),
            tree.runs.len(),
            warnings.len()
        );
        (tree, warnings)
    }

    fn build_segment(
        &self,
        tree: &mut DocumentTree,
        segment: &Segment,
    ) -> Result<Vec<Block>, RenderWarning> {
        let block = match segment {
            Segment::Table(lines) => self.table_block(tree, lines)?,
            Segment::Line(line) => match &line.kind {
                ContentKind::Empty => None,
                ContentKind::Heading(level) => Some(self.heading_block(tree, *level, line)),
                ContentKind::Formula => self.formula_block(tree, line),
                ContentKind::Caption => Some(self.caption_block(tree, line)),
                // a lone row is grouped by the segmenter; handle it the same way
                ContentKind::TableRow => self.table_block(tree, std::slice::from_ref(line))?,
                ContentKind::Placeholder(id) => self.placeholder_block(tree, line, id)?,
                ContentKind::Text => Some(self.paragraph_block(tree, line)),
            },
        };

        Ok(block
            .into_iter()
            .filter(|b| b.is_table() || b.paragraph().is_some_and(|p| !p.is_empty()))
            .collect())
    }

    fn heading_block(&self, tree: &mut DocumentTree, level: u8, line: &Line) -> Block {
        let text = self.segmenter.heading_text(&line.text);
        let runs = self.runs.build_plain(text, TextRole::Heading(level));
        let paragraph = Paragraph::new(tree.push_runs(runs)).align(Alignment::Start);
        Block::Heading { level, paragraph }
    }

    fn paragraph_block(&self, tree: &mut DocumentTree, line: &Line) -> Block {
        let runs = self.runs.build_text(&line.text, TextRole::Body);
        Block::Paragraph(Paragraph::new(tree.push_runs(runs)))
    }

    fn caption_block(&self, tree: &mut DocumentTree, line: &Line) -> Block {
        let runs = self.runs.build_plain(&line.text, TextRole::Caption);
        Block::Caption(Paragraph::new(tree.push_runs(runs)).align(Alignment::Center))
    }

    fn formula_block(&self, tree: &mut DocumentTree, line: &Line) -> Option<Block> {
        let source = self.segmenter.formula_source(&line.text);
        let runs = self.runs.build_formula(source);
        if runs.is_empty() {
            return None;
        }
        Some(Block::Formula(
            Paragraph::new(tree.push_runs(runs)).align(Alignment::Center),
        ))
    }

    fn table_block(
        &self,
        tree: &mut DocumentTree,
        lines: &[Line],
    ) -> Result<Option<Block>, RenderWarning> {
        let first_line = lines.first().map(|l| l.number).unwrap_or(0);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        match self.tables.assemble(&texts) {
            Some(grid) => self.table_from_grid(tree, &grid, first_line).map(Some),
            None => {
                log::debug!("table at line {} has no rows, dropped", first_line);
                Ok(None)
            }
        }
    }

    fn placeholder_block(
        &self,
        tree: &mut DocumentTree,
        line: &Line,
        id: &str,
    ) -> Result<Option<Block>, RenderWarning> {
        let missing = || RenderWarning::MissingAsset {
            line: line.number,
            id: id.to_string(),
        };
        let asset = self.resolver.ok_or_else(missing)?.resolve(id).ok_or_else(missing)?;

        match asset {
            Asset::Csv { data } => {
                let rows = decode_csv(data).map_err(|reason| RenderWarning::AssetDecode {
                    line: line.number,
                    id: id.to_string(),
                    reason,
                })?;
                match grid_from_rows(rows, self.config.column_separator) {
                    Some(grid) => self.table_from_grid(tree, &grid, line.number).map(Some),
                    None => Ok(None),
                }
            }
            Asset::Image { .. } => Err(RenderWarning::UnsupportedAsset {
                line: line.number,
                id: id.to_string(),
            }),
        }
    }

    fn table_from_grid(
        &self,
        tree: &mut DocumentTree,
        grid: &TableGrid,
        line: usize,
    ) -> Result<Block, RenderWarning> {
        if grid.cols > self.config.max_table_columns {
            return Err(RenderWarning::TooManyColumns {
                line,
                columns: grid.cols,
                limit: self.config.max_table_columns,
            });
        }

        let mut table = Table::with_header(u8::from(grid.has_header));
        for (index, row) in grid.rows.iter().enumerate() {
            let is_header = grid.has_header && index == 0;
            let role = if is_header {
                TextRole::TableHeader
            } else {
                TextRole::TableBody
            };

            let cells = row
                .iter()
                .map(|text| {
                    let runs = self.runs.build_text(text, role);
                    let direction = majority(&runs);
                    let mut cell = TableCell::new(tree.push_runs(runs));
                    cell.alignment = Alignment::Start;
                    if let Some(direction) = direction {
                        cell = cell.with_direction(direction);
                    }
                    if is_header {
                        cell = cell.shaded(self.config.header_shading.clone());
                    }
                    cell
                })
                .collect();

            table.add_row(if is_header {
                TableRow::header(cells)
            } else {
                TableRow::new(cells)
            });
        }

        log::debug!(
            "table at line {}: {} row(s) x {} column(s)",
            line,
            grid.row_count(),
            grid.cols
        );
        Ok(Block::Table(table))
    }

    /// Plain-text paragraphs of a segment's raw lines.
    fn downgrade(&self, tree: &mut DocumentTree, segment: &Segment) -> Vec<Block> {
        let lines = match segment {
            Segment::Table(lines) => lines.as_slice(),
            Segment::Line(line) => std::slice::from_ref(line),
        };
        lines
            .iter()
            .filter_map(|line| {
                let runs = self.runs.build_literal(&line.text, TextRole::Body);
                if runs.is_empty() {
                    return None;
                }
                Some(Block::Paragraph(Paragraph::new(tree.push_runs(runs))))
            })
            .collect()
    }
}
