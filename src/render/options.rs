//! Rendering configuration.
//!
//! A [`RenderConfig`] is built once and shared read-only by every component
//! of a conversion; nothing in the pipeline mutates it.

use crate::error::{Error, Result};
use crate::model::{Direction, SectionProps};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for assembling and rendering a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font families and sizes per role
    pub fonts: FontTable,

    /// Maximum heading level; deeper `#` markers are clamped
    pub max_heading_level: u8,

    /// Prefix words joined to the next word with a half-space
    pub prefix_words: Vec<String>,

    /// Keywords that open a caption line when followed by a numeral
    pub caption_keywords: Vec<String>,

    /// Fold hamza-on-alef to bare alef
    pub fold_hamza_carrier: bool,

    /// Treat single `*` pairs as italic markers
    pub italic_markers: bool,

    /// Emit `^x`/`_x` as positioned runs instead of Unicode super/subscripts
    pub native_vertical_position: bool,

    /// Keep one empty paragraph for blank lines between text blocks
    pub preserve_blank_lines: bool,

    /// Direction used when a block has no strong-script majority
    pub base_direction: Direction,

    /// Page size
    pub page_size: PageSize,

    /// Uniform page margin in twips
    pub margin_twips: u32,

    /// Table column separator
    pub column_separator: char,

    /// Header row fill color (hex RGB)
    pub header_shading: String,

    /// Maximum columns a table may have before it is downgraded to text
    pub max_table_columns: usize,
}

impl RenderConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 9);
        self
    }

    /// Set the font table.
    pub fn with_fonts(mut self, fonts: FontTable) -> Self {
        self.fonts = fonts;
        self
    }

    /// Set the half-space prefix words.
    pub fn with_prefix_words<S: Into<String>>(mut self, words: impl IntoIterator<Item = S>) -> Self {
        self.prefix_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Set the caption keywords.
    pub fn with_caption_keywords<S: Into<String>>(
        mut self,
        keywords: impl IntoIterator<Item = S>,
    ) -> Self {
        self.caption_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable hamza-carrier folding.
    pub fn with_hamza_folding(mut self, fold: bool) -> Self {
        self.fold_hamza_carrier = fold;
        self
    }

    /// Enable or disable single-`*` italic markers.
    pub fn with_italic_markers(mut self, enabled: bool) -> Self {
        self.italic_markers = enabled;
        self
    }

    /// Choose native vertical positioning or Unicode substitution.
    pub fn with_native_vertical_position(mut self, native: bool) -> Self {
        self.native_vertical_position = native;
        self
    }

    /// Enable or disable blank-line preservation.
    pub fn with_blank_lines(mut self, preserve: bool) -> Self {
        self.preserve_blank_lines = preserve;
        self
    }

    /// Set the base direction.
    pub fn with_base_direction(mut self, direction: Direction) -> Self {
        self.base_direction = direction;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the column limit for tables.
    pub fn with_max_table_columns(mut self, limit: usize) -> Self {
        self.max_table_columns = limit;
        self
    }

    /// Section properties derived from page settings.
    pub fn section(&self) -> SectionProps {
        let base = match self.page_size {
            PageSize::A4 => SectionProps::a4(),
            PageSize::Letter => SectionProps::letter(),
        };
        SectionProps {
            margin: self.margin_twips,
            ..base
        }
    }

    /// Check the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_heading_level == 0 {
            return Err(Error::Config("max_heading_level must be at least 1".into()));
        }
        if self.column_separator.is_whitespace() || self.column_separator == '#' {
            return Err(Error::Config(format!(
                "invalid column separator {:?}",
                self.column_separator
            )));
        }
        if self.max_table_columns < 2 {
            return Err(Error::Config("max_table_columns must be at least 2".into()));
        }
        if self.fonts.heading_sizes.is_empty() {
            return Err(Error::Config("at least one heading size is required".into()));
        }
        let page_width = self.section().page_width;
        if u64::from(self.margin_twips) * 2 >= u64::from(page_width) {
            return Err(Error::Config(format!(
                "margin_twips {} leaves no text width on a {} twip page",
                self.margin_twips, page_width
            )));
        }
        Ok(())
    }

    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fonts: FontTable::default(),
            max_heading_level: 3,
            prefix_words: vec!["می".into(), "نمی".into(), "بی".into()],
            caption_keywords: vec!["شکل".into(), "جدول".into()],
            fold_hamza_carrier: false,
            italic_markers: true,
            native_vertical_position: true,
            preserve_blank_lines: false,
            base_direction: Direction::Rtl,
            page_size: PageSize::A4,
            margin_twips: 1440,
            column_separator: '|',
            header_shading: "D9E2F3".into(),
            max_table_columns: 63,
        }
    }
}

/// Page size presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// ISO A4
    #[default]
    A4,
    /// US Letter
    Letter,
}

/// A font family with a point size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Font family name
    pub family: String,
    /// Size in points
    pub size: f32,
}

impl FontSpec {
    /// Create a font spec.
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Fonts and sizes for each text role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontTable {
    /// Body text in the primary (right-to-left) script
    pub primary: FontSpec,
    /// Body text in the secondary (left-to-right) script
    pub secondary: FontSpec,
    /// Heading family
    pub heading_family: String,
    /// Heading size per level, level 1 first; the last entry covers deeper levels
    pub heading_sizes: Vec<f32>,
    /// Display and inline formulas
    pub formula: FontSpec,
    /// Captions
    pub caption: FontSpec,
    /// Table header cells
    pub table_header: FontSpec,
    /// Table body cells
    pub table_body: FontSpec,
}

impl FontTable {
    /// Heading size for a level (1-indexed).
    pub fn heading_size(&self, level: u8) -> f32 {
        let index = (level.max(1) as usize - 1).min(self.heading_sizes.len().saturating_sub(1));
        self.heading_sizes
            .get(index)
            .copied()
            .unwrap_or(self.primary.size)
    }
}

impl Default for FontTable {
    fn default() -> Self {
        Self {
            primary: FontSpec::new("B Nazanin", 13.0),
            secondary: FontSpec::new("Times New Roman", 12.0),
            heading_family: "B Titr".into(),
            heading_sizes: vec![18.0, 16.0, 14.0],
            formula: FontSpec::new("Cambria Math", 12.0),
            caption: FontSpec::new("B Nazanin", 11.0),
            table_header: FontSpec::new("B Nazanin", 12.0),
            table_body: FontSpec::new("B Nazanin", 11.0),
        }
    }
}
