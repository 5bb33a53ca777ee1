//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A paragraph-level text unit.
///
/// The paragraph does not own its runs: `runs` indexes into the run arena
/// of the owning [`DocumentTree`](super::DocumentTree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Index range into the document's run arena
    pub runs: Range<usize>,

    /// Text alignment
    pub alignment: Alignment,

    /// Paragraph direction; `None` until the directionality pass runs
    pub direction: Option<Direction>,
}

impl Paragraph {
    /// Create a paragraph over the given run range.
    pub fn new(runs: Range<usize>) -> Self {
        Self {
            runs,
            alignment: Alignment::Justify,
            direction: None,
        }
    }

    /// Set alignment and return self.
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Number of runs in the paragraph.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Check if the paragraph has no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Script class of a character or run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// Right-to-left primary script (Arabic block and presentation forms)
    Primary,
    /// Left-to-right secondary script (Latin, Latin-1 supplement)
    Secondary,
    /// Digits, punctuation, whitespace and everything else
    Neutral,
}

/// Layout direction of a paragraph, table or section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Right-to-left
    #[default]
    Rtl,
    /// Left-to-right
    Ltr,
}

impl Direction {
    /// Check if this is right-to-left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Direction::Rtl)
    }
}

/// Kind of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunKind {
    /// Ordinary text
    #[default]
    Normal,
    /// Inline or block math, exempt from script splitting and emphasis
    Formula,
    /// Raised or lowered text rendered with native vertical positioning
    Vertical {
        /// Position relative to the baseline
        position: VerticalPosition,
    },
}

/// Vertical position of a run relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPosition {
    /// Raised (`^x`)
    Superscript,
    /// Lowered (`_x`)
    Subscript,
}

/// A span of text with uniform script, emphasis and kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Script of the strong characters in the run
    pub script: Script,

    /// Run kind
    pub kind: RunKind,

    /// Resolved visual attributes
    pub style: RunStyle,
}

impl Run {
    /// Create a normal run with default style.
    pub fn new(text: impl Into<String>, script: Script) -> Self {
        Self {
            text: text.into(),
            script,
            kind: RunKind::Normal,
            style: RunStyle::default(),
        }
    }

    /// Create a formula run.
    pub fn formula(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            script: Script::Neutral,
            kind: RunKind::Formula,
            style: RunStyle::default(),
        }
    }

    /// Set the style and return self.
    pub fn with_style(mut self, style: RunStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the kind and return self.
    pub fn with_kind(mut self, kind: RunKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if this is a formula run.
    pub fn is_formula(&self) -> bool {
        matches!(self.kind, RunKind::Formula)
    }

    /// Vertical position, if any.
    pub fn vertical_position(&self) -> Option<VerticalPosition> {
        match self.kind {
            RunKind::Vertical { position } => Some(position),
            _ => None,
        }
    }
}

/// Emphasis flags inherited from markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emphasis {
    /// `**bold**`
    pub bold: bool,
    /// `*italic*`
    pub italic: bool,
    /// `~~strike~~`
    pub strike: bool,
}

impl Emphasis {
    /// Bold only.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Italic only.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Strikethrough only.
    pub fn strike() -> Self {
        Self {
            strike: true,
            ..Default::default()
        }
    }
}

/// Visual attributes of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Strikethrough text
    pub strike: bool,

    /// Font family
    pub font_name: String,

    /// Font size in points
    pub font_size: f32,

    /// Run is marked right-to-left
    pub rtl: bool,
}

impl RunStyle {
    /// Apply emphasis flags and return self.
    pub fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        self.bold |= emphasis.bold;
        self.italic |= emphasis.italic;
        self.strike |= emphasis.strike;
        self
    }
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Start edge of the paragraph direction
    #[default]
    Start,
    /// Center alignment
    Center,
    /// End edge of the paragraph direction
    End,
    /// Justified alignment
    Justify,
}
