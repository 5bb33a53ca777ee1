//! Text processing: normalization, script classification, segmentation,
//! formula formatting, run building and table assembly.
//!
//! Every component here is constructed once from a
//! [`RenderConfig`](crate::render::RenderConfig) and is then used read-only.

pub mod formula;
pub mod normalize;
pub mod runs;
pub mod script;
pub mod segment;
pub mod table;

pub use formula::{FormulaFormatter, InlinePiece};
pub use normalize::{TextNormalizer, HALF_SPACE};
pub use runs::{RunBuilder, TextRole};
pub use script::{classify, direction_of, split_by_script};
pub use segment::{ContentKind, Line, MarkupSegmenter, Segment};
pub use table::{grid_from_rows, TableAssembler, TableGrid};
