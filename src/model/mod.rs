//! Document model types.
//!
//! This module defines the document tree that bridges text assembly and
//! package serialization. The tree is an arena: blocks own index ranges
//! into a flat run list rather than the runs themselves.

mod block;
mod document;
mod paragraph;
mod table;

pub use block::Block;
pub use document::{DocumentTree, Metadata, SectionProps};
pub use paragraph::{
    Alignment, Direction, Emphasis, Paragraph, Run, RunKind, RunStyle, Script, VerticalPosition,
};
pub use table::{Table, TableCell, TableRow};
