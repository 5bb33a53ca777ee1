//! # bidocx
//!
//! Bidirectional rich-text assembly for Rust.
//!
//! This library turns loosely structured, markup-annotated text that mixes
//! right-to-left Persian/Arabic with left-to-right Latin into a styled
//! WordprocessingML (`.docx`) package whose paragraphs, tables and section
//! are consistently right-to-left where they should be.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bidocx::{convert_to_file, RenderConfig};
//!
//! fn main() -> bidocx::Result<()> {
//!     let text = "# گزارش\nاین یک **نمونه** با English است.\n| نام | مقدار |\n|---|---|\n| x | ۲ |";
//!     let conversion = convert_to_file(text, &RenderConfig::default(), "report.docx")?;
//!     for warning in &conversion.warnings {
//!         eprintln!("{}", warning);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Markup**: `#` headings, pipe tables, `**bold**`, `*italic*`, `~~strike~~`
//! - **Math**: `$…$` / `$$…$$` spans with glyph substitution for common commands
//! - **Bidi**: per-run script fonts, explicit paragraph/table/section direction
//! - **Assets**: `{{id}}` placeholders expanded from base64 CSV payloads
//! - **Parallel processing**: Uses Rayon for batches of independent inputs

pub mod assemble;
pub mod assets;
pub mod error;
pub mod model;
pub mod render;
pub mod text;

// Re-export commonly used types
pub use assemble::{DirectionalityFixer, DocumentBuilder};
pub use assets::{Asset, AssetMap, AssetResolver};
pub use error::{Error, RenderWarning, Result};
pub use model::{
    Alignment, Block, Direction, DocumentTree, Metadata, Paragraph, Run, RunKind, RunStyle,
    Script, SectionProps, Table, TableCell, TableRow,
};
pub use render::{
    Conversion, ConversionStats, FontSpec, FontTable, JsonFormat, PageSize, RenderConfig,
    TextOptions,
};

use rayon::prelude::*;
use std::io::{Seek, Write};
use std::path::Path;

/// Convert marked-up text into a direction-resolved document tree.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] when the text is empty or whitespace only.
/// Malformed blocks do not fail the conversion; they are reported in
/// [`Conversion::warnings`].
///
/// # Example
///
/// ```
/// use bidocx::{convert, RenderConfig};
///
/// let conversion = convert("سلام **دنیا**", &RenderConfig::default()).unwrap();
/// assert_eq!(conversion.tree.block_count(), 1);
/// ```
pub fn convert(text: &str, config: &RenderConfig) -> Result<Conversion> {
    convert_inner(text, config, None)
}

/// Convert with `{{id}}` placeholders resolved through `resolver`.
pub fn convert_with_assets(
    text: &str,
    config: &RenderConfig,
    resolver: &dyn AssetResolver,
) -> Result<Conversion> {
    convert_inner(text, config, Some(resolver))
}

fn convert_inner(
    text: &str,
    config: &RenderConfig,
    resolver: Option<&dyn AssetResolver>,
) -> Result<Conversion> {
    if text.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut builder = DocumentBuilder::new(config);
    if let Some(resolver) = resolver {
        builder = builder.with_resolver(resolver);
    }
    let (mut tree, warnings) = builder.build(text);

    DirectionalityFixer::new(config).apply(&mut tree);
    if tree.metadata.created.is_none() {
        tree.metadata.created = Metadata::now().created;
    }

    Ok(Conversion::new(tree, warnings))
}

/// Convert text and serialize the package into memory.
pub fn convert_to_bytes(text: &str, config: &RenderConfig) -> Result<Vec<u8>> {
    let conversion = convert(text, config)?;
    render::to_docx_bytes(&conversion.tree, config)
}

/// Convert text and write the package to a seekable sink.
pub fn convert_to_writer<W: Write + Seek>(
    text: &str,
    config: &RenderConfig,
    writer: W,
) -> Result<Conversion> {
    let conversion = convert(text, config)?;
    render::write_docx(&conversion.tree, config, writer)?;
    Ok(conversion)
}

/// Convert text and write the package to a file.
pub fn convert_to_file<P: AsRef<Path>>(
    text: &str,
    config: &RenderConfig,
    path: P,
) -> Result<Conversion> {
    let file = std::fs::File::create(path)?;
    convert_to_writer(text, config, std::io::BufWriter::new(file))
}

/// Read a text file and convert it to a `.docx` file.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &RenderConfig,
) -> Result<Conversion> {
    let text = std::fs::read_to_string(input)?;
    convert_to_file(&text, config, output)
}

/// Convert independent inputs in parallel, sharing one configuration.
///
/// Results are returned in input order.
pub fn convert_many<S: AsRef<str> + Sync>(
    inputs: &[S],
    config: &RenderConfig,
) -> Vec<Result<Conversion>> {
    inputs
        .par_iter()
        .map(|input| convert(input.as_ref(), config))
        .collect()
}

/// Read a text file and convert it to a `.docx` file without blocking the
/// async runtime.
#[cfg(feature = "async")]
pub async fn convert_file_async<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: RenderConfig,
) -> Result<Conversion> {
    let text = tokio::fs::read_to_string(input).await?;
    let (conversion, bytes) = tokio::task::spawn_blocking(move || {
        let conversion = convert(&text, &config)?;
        let bytes = render::to_docx_bytes(&conversion.tree, &config)?;
        Ok::<_, Error>((conversion, bytes))
    })
    .await
    .map_err(|e| Error::Render(format!("conversion task failed: {}", e)))??;
    tokio::fs::write(output, bytes).await?;
    Ok(conversion)
}

/// Builder for converting marked-up text.
///
/// # Example
///
/// ```no_run
/// use bidocx::Bidocx;
///
/// Bidocx::new()
///     .with_max_heading(4)
///     .with_blank_lines()
///     .convert("# عنوان\nمتن")?
///     .save("output.docx")?;
/// # Ok::<(), bidocx::Error>(())
/// ```
pub struct Bidocx {
    config: RenderConfig,
    assets: Option<AssetMap>,
}

impl Bidocx {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
            assets: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.config = self.config.with_max_heading(level);
        self
    }

    /// Keep blank lines as empty paragraphs.
    pub fn with_blank_lines(mut self) -> Self {
        self.config = self.config.with_blank_lines(true);
        self
    }

    /// Set the base direction.
    pub fn with_base_direction(mut self, direction: Direction) -> Self {
        self.config = self.config.with_base_direction(direction);
        self
    }

    /// Set the font table.
    pub fn with_fonts(mut self, fonts: FontTable) -> Self {
        self.config = self.config.with_fonts(fonts);
        self
    }

    /// Resolve placeholders from the given assets.
    pub fn with_assets(mut self, assets: AssetMap) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Convert text and return a result wrapper.
    pub fn convert(self, text: &str) -> Result<BidocxResult> {
        self.config.validate()?;
        let conversion = match &self.assets {
            Some(assets) => convert_with_assets(text, &self.config, assets)?,
            None => convert(text, &self.config)?,
        };
        Ok(BidocxResult {
            conversion,
            config: self.config,
        })
    }
}

impl Default for Bidocx {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a conversion made with [`Bidocx`].
pub struct BidocxResult {
    /// The conversion
    pub conversion: Conversion,
    /// Configuration used for serialization
    config: RenderConfig,
}

impl BidocxResult {
    /// Serialize the package into memory.
    pub fn to_docx_bytes(&self) -> Result<Vec<u8>> {
        render::to_docx_bytes(&self.conversion.tree, &self.config)
    }

    /// Write the package to a seekable sink.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        render::write_docx(&self.conversion.tree, &self.config, writer)
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.conversion.tree, format)
    }

    /// Convert to plain text.
    pub fn to_text(&self, options: &TextOptions) -> Result<String> {
        render::to_text(&self.conversion.tree, options)
    }

    /// Warnings collected during assembly.
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.conversion.warnings
    }

    /// Get the document tree.
    pub fn tree(&self) -> &DocumentTree {
        &self.conversion.tree
    }
}
