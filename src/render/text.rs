//! Plain text rendering, in logical or visual order.

use unicode_bidi::{BidiInfo, Level};

use crate::error::Result;
use crate::model::{Block, Direction, DocumentTree};

/// Options for plain text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    /// Reorder each line to visual order (UAX #9) for terminals without
    /// bidi support
    pub visual_order: bool,

    /// Prefix headings with `#` markers
    pub heading_markers: bool,

    /// Text placed between table cells
    pub cell_separator: String,
}

impl TextOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable visual reordering.
    pub fn visual(mut self) -> Self {
        self.visual_order = true;
        self
    }

    /// Enable or disable heading markers.
    pub fn with_heading_markers(mut self, enabled: bool) -> Self {
        self.heading_markers = enabled;
        self
    }

    /// Set the cell separator.
    pub fn with_cell_separator(mut self, separator: impl Into<String>) -> Self {
        self.cell_separator = separator.into();
        self
    }
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            visual_order: false,
            heading_markers: true,
            cell_separator: " | ".to_string(),
        }
    }
}

/// Convert a document tree to plain text.
pub fn to_text(tree: &DocumentTree, options: &TextOptions) -> Result<String> {
    let mut blocks = Vec::with_capacity(tree.block_count());

    for block in &tree.blocks {
        let (text, direction) = match block {
            Block::Table(table) => {
                let text = table
                    .rows
                    .iter()
                    .map(|row| {
                        row.cells
                            .iter()
                            .map(|cell| tree.text_of(&cell.runs))
                            .collect::<Vec<_>>()
                            .join(&options.cell_separator)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                (text, table.direction)
            }
            Block::Heading { level, paragraph } => {
                let mut text = tree.paragraph_text(paragraph);
                if options.heading_markers {
                    text = format!("{} {}", "#".repeat(*level as usize), text);
                }
                (text, paragraph.direction)
            }
            other => match other.paragraph() {
                Some(paragraph) => (tree.paragraph_text(paragraph), paragraph.direction),
                None => continue,
            },
        };

        if options.visual_order {
            blocks.push(reorder_lines(&text, direction));
        } else {
            blocks.push(text);
        }
    }

    Ok(blocks.join("\n\n").trim_end().to_string())
}

/// Reorder each line of `text` to visual order.
///
/// The paragraph level comes from the block direction when known,
/// otherwise from the first strong character.
pub fn reorder_lines(text: &str, direction: Option<Direction>) -> String {
    let level = direction.map(|d| if d.is_rtl() { Level::rtl() } else { Level::ltr() });

    text.split('\n')
        .map(|line| reorder_line(line, level))
        .collect::<Vec<_>>()
        .join("\n")
}

fn reorder_line(line: &str, level: Option<Level>) -> String {
    if line.is_empty() {
        return String::new();
    }

    let info = BidiInfo::new(line, level);
    if info.paragraphs.is_empty() {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    for para in &info.paragraphs {
        out.push_str(&info.reorder_line(para, para.range.clone()));
    }
    out
}
