//! Rendering: configuration, the package writer and auxiliary output
//! formats.

mod docx;
mod json;
mod options;
mod result;
mod text;
pub mod xml;

pub use docx::{half_points, to_docx_bytes, write_docx, DocxWriter, PARTS};
pub use json::{to_json, JsonFormat};
pub use options::{FontSpec, FontTable, PageSize, RenderConfig};
pub use result::{Conversion, ConversionStats};
pub use text::{reorder_lines, to_text, TextOptions};
