//! Line classification and block segmentation.

use regex::Regex;

use super::formula::{has_math_tokens, split_inline, InlinePiece};
use super::normalize::fold_char;
use super::script::has_primary;
use crate::render::RenderConfig;

/// What a source line contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    /// Blank after trimming
    Empty,
    /// `#` heading with its clamped level
    Heading(u8),
    /// Display formula
    Formula,
    /// Figure or table caption
    Caption,
    /// One row of a pipe table
    TableRow,
    /// `{{id}}` asset placeholder
    Placeholder(String),
    /// Anything else
    Text,
}

/// A classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number in the input
    pub number: usize,
    /// Raw line text
    pub text: String,
    /// Classification
    pub kind: ContentKind,
}

/// A unit handed to the block builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A single classified line
    Line(Line),
    /// Consecutive table rows
    Table(Vec<Line>),
}

impl Segment {
    /// Line number where the segment starts.
    pub fn line_number(&self) -> usize {
        match self {
            Segment::Line(line) => line.number,
            Segment::Table(lines) => lines.first().map(|l| l.number).unwrap_or(0),
        }
    }
}

/// Classifies lines and groups table rows.
#[derive(Debug, Clone)]
pub struct MarkupSegmenter {
    max_heading_level: u8,
    separator: char,
    heading_regex: Regex,
    caption_regex: Option<Regex>,
    placeholder_regex: Regex,
    fold_hamza_carrier: bool,
}

impl MarkupSegmenter {
    /// Create a segmenter for the given configuration.
    pub fn new(config: &RenderConfig) -> Self {
        let caption_regex = if config.caption_keywords.is_empty() {
            None
        } else {
            let keywords = config
                .caption_keywords
                .iter()
                .map(|k| regex::escape(&fold_letters(k, config.fold_hamza_carrier)))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"^(?:{})\s*[0-9۰-۹٠-٩]+", keywords);
            Some(Regex::new(&pattern).expect("caption regex"))
        };

        Self {
            max_heading_level: config.max_heading_level.max(1),
            separator: config.column_separator,
            heading_regex: Regex::new(r"^(#+)\s+(.*)$").expect("heading regex"),
            caption_regex,
            placeholder_regex: Regex::new(r"^\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}$")
                .expect("placeholder regex"),
            fold_hamza_carrier: config.fold_hamza_carrier,
        }
    }

    /// Classify a single line without lookahead.
    pub fn classify(&self, line: &str) -> ContentKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ContentKind::Empty;
        }

        if let Some(caps) = self.placeholder_regex.captures(trimmed) {
            return ContentKind::Placeholder(caps[1].to_string());
        }

        if let Some(caps) = self.heading_regex.captures(trimmed) {
            let count = caps[1].len().min(u8::MAX as usize) as u8;
            return ContentKind::Heading(count.min(self.max_heading_level));
        }

        if self.separator_count(trimmed) >= 2 {
            return ContentKind::TableRow;
        }

        if self.is_caption(trimmed) {
            return ContentKind::Caption;
        }

        if self.is_formula(trimmed) {
            return ContentKind::Formula;
        }

        ContentKind::Text
    }

    /// Split input into segments.
    ///
    /// A table starts on a line with at least two separators and continues
    /// through every following non-blank line that contains a separator,
    /// unless that line is a heading, placeholder or caption.
    pub fn segment(&self, input: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut lines = input.lines().enumerate().peekable();

        while let Some((index, text)) = lines.next() {
            let kind = self.classify(text);
            let line = Line {
                number: index + 1,
                text: text.to_string(),
                kind,
            };

            if line.kind != ContentKind::TableRow {
                segments.push(Segment::Line(line));
                continue;
            }

            let mut rows = vec![line];
            while let Some((next_index, next)) =
                lines.next_if(|(_, next)| self.continues_table(next))
            {
                rows.push(Line {
                    number: next_index + 1,
                    text: next.to_string(),
                    kind: ContentKind::TableRow,
                });
            }
            log::debug!(
                "table block at line {} with {} row(s)",
                rows[0].number,
                rows.len()
            );
            segments.push(Segment::Table(rows));
        }

        segments
    }

    /// Heading text with its markers stripped.
    pub fn heading_text<'a>(&self, line: &'a str) -> &'a str {
        let trimmed = line.trim();
        self.heading_regex
            .captures(trimmed)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or(trimmed)
    }

    /// Formula source with its delimiters stripped.
    pub fn formula_source<'a>(&self, line: &'a str) -> &'a str {
        let trimmed = line.trim();
        match split_inline(trimmed).as_deref() {
            Some([InlinePiece::Math(source)]) => *source,
            _ => trimmed,
        }
    }

    fn continues_table(&self, line: &str) -> bool {
        let trimmed = line.trim();
        !trimmed.is_empty()
            && self.separator_count(trimmed) >= 1
            && !self.heading_regex.is_match(trimmed)
            && !self.placeholder_regex.is_match(trimmed)
            && !self.is_caption(trimmed)
    }

    /// Caption keywords match on folded letters, so Arabic kaf and yeh
    /// spellings are recognized.
    fn is_caption(&self, trimmed: &str) -> bool {
        self.caption_regex
            .as_ref()
            .is_some_and(|re| re.is_match(&fold_letters(trimmed, self.fold_hamza_carrier)))
    }

    fn separator_count(&self, line: &str) -> usize {
        line.chars().filter(|&c| c == self.separator).count()
    }

    fn is_formula(&self, trimmed: &str) -> bool {
        match split_inline(trimmed) {
            Some(pieces) => match pieces.as_slice() {
                [InlinePiece::Math(_)] => true,
                _ if pieces.iter().all(|p| matches!(p, InlinePiece::Text(_))) => {
                    has_math_tokens(trimmed) && !has_primary(trimmed)
                }
                _ => false,
            },
            None => false,
        }
    }
}

fn fold_letters(text: &str, fold_hamza_carrier: bool) -> String {
    text.chars().map(|c| fold_char(c, fold_hamza_carrier)).collect()
}
