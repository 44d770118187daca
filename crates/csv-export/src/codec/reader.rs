//! Lazy, row-by-row CSV file reading.

use std::fs::File;
use std::io::ErrorKind as IoErrorKind;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};
use crate::format::CsvFormat;

/// A decoded row: every field as text.
pub type Row = Vec<String>;

/// Opens `path` for row-by-row reading with the given dialect.
///
/// All path checks happen here, before any row is produced:
/// - missing path: [`ExportError::FileNotFound`]
/// - directory or other non-file: [`ExportError::NotAFile`]
/// - permission denied on open: [`ExportError::FileNotReadable`]
/// - any other open failure: [`ExportError::FileOpen`]
pub fn read_rows(path: &Path, format: &CsvFormat) -> Result<CsvRows> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == IoErrorKind::NotFound {
            ExportError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ExportError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !metadata.is_file() {
        return Err(ExportError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| {
        if e.kind() == IoErrorKind::PermissionDenied {
            ExportError::FileNotReadable {
                path: path.to_path_buf(),
            }
        } else {
            ExportError::FileOpen {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    tracing::debug!(path = %path.display(), bytes = metadata.len(), "Opened CSV for reading");

    Ok(CsvRows {
        path: path.to_path_buf(),
        reader: Some(format.reader_builder().from_reader(file)),
        record: csv::StringRecord::new(),
        rows_read: 0,
    })
}

/// Single-pass iterator over the rows of a CSV file.
///
/// The file handle is released when the input is exhausted, when a row
/// fails to decode (before the error is yielded), or when the iterator is
/// dropped. After an error the iterator yields nothing more.
pub struct CsvRows {
    path: PathBuf,
    reader: Option<csv::Reader<File>>,
    record: csv::StringRecord,
    rows_read: u64,
}

impl CsvRows {
    /// Path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows yielded so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Returns true while the underlying file handle is held.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            tracing::debug!(
                path = %self.path.display(),
                rows = self.rows_read,
                "Closed CSV reader"
            );
        }
    }
}

impl Iterator for CsvRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        match reader.read_record(&mut self.record) {
            Ok(true) => {
                self.rows_read += 1;
                Some(Ok(self.record.iter().map(str::to_string).collect()))
            }
            Ok(false) => {
                self.close();
                None
            }
            Err(source) => {
                let line = source.position().map(csv::Position::line);
                self.close();
                tracing::warn!(
                    path = %self.path.display(),
                    line,
                    error = %source,
                    "Failed to decode CSV row"
                );
                Some(Err(ExportError::Decode {
                    path: self.path.clone(),
                    line,
                    source,
                }))
            }
        }
    }
}

impl FusedIterator for CsvRows {}

impl std::fmt::Debug for CsvRows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRows")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("rows_read", &self.rows_read)
            .finish()
    }
}
