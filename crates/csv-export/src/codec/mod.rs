//! CSV encoding and decoding.

mod reader;
mod writer;

pub use reader::{CsvRows, Row, read_rows};
pub use writer::render_csv;
