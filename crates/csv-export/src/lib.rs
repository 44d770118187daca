//! Tabular data export to CSV.
//!
//! This crate turns in-memory rows into CSV text and delivers it, and reads
//! existing CSV files back one row at a time.
//!
//! # Features
//!
//! - **Rendering**: keyed or positional records, explicit or derived header row,
//!   quoting only where needed
//! - **Delivery**: save to a path (creating directories) or send as a file
//!   download through a [`DownloadSink`]
//! - **Reading**: lazy, single-pass row iteration that releases the file
//!   handle on every exit path
//! - **Configuration**: delimiter, enclosure and escape characters, loadable
//!   from TOML
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use csv_export::{BufferedResponse, Record, TabularExporter};
//!
//! let data = vec![
//!     Record::keyed([("name", "Ann"), ("age", "30")]),
//!     Record::keyed([("name", "Bo, Jr."), ("age", "25")]),
//! ];
//!
//! let mut exporter = TabularExporter::new(data, ["name", "age"]);
//! let mut response = BufferedResponse::new();
//! exporter
//!     .process()?
//!     .save(Path::new("out/people.csv"))?
//!     .download_as(&mut response, "people")?;
//!
//! for row in exporter.read_from(Path::new("out/people.csv"))? {
//!     println!("{:?}", row?);
//! }
//! ```

mod codec;
mod config;
mod download;
mod error;
mod exporter;
mod format;
pub mod logging;
mod record;

// === Error Types ===
pub use error::{ErrorKind, ExportError, RenderStage, Result};

// === Data Model ===
pub use record::{Field, HeaderSet, Record};

// === Configuration ===
pub use config::ExportConfig;
pub use format::{CsvFormat, DEFAULT_DELIMITER, DEFAULT_ENCLOSURE, DEFAULT_ESCAPE};

// === CSV Encoding/Decoding ===
pub use codec::{CsvRows, Row, read_rows, render_csv};

// === Download Delivery ===
pub use download::{
    BufferedResponse, CACHE_CONTROL, CONTENT_TYPE, DEFAULT_DOWNLOAD_NAME, DownloadSink,
    HttpResponseWriter, download_headers, sanitize_file_name,
};

// === Exporter ===
pub use exporter::{RenderedCsv, TabularExporter};
