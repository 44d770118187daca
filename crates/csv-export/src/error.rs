//! Error types for CSV export and reading.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stage of rendering at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Writing the header row.
    Header,
    /// Writing the data record at this index of the dataset.
    Row(usize),
    /// Flushing the buffer into the final string.
    Finish,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header row"),
            Self::Row(index) => write!(f, "row {index}"),
            Self::Finish => f.write_str("output buffer"),
        }
    }
}

/// Broad classification of an [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A path could not be found, opened, created, read, or written.
    FileAccess,
    /// The rendered CSV could not be materialized.
    Render,
    /// A CSV file being read contained undecodable data.
    Decode,
    /// The download sink rejected headers or body.
    Delivery,
    /// An export configuration could not be parsed or serialized.
    Config,
}

/// Errors that can occur while exporting or reading CSV data.
#[derive(Debug, Error)]
pub enum ExportError {
    // === File System Errors ===
    /// File does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file.
    #[error("not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// File exists but cannot be read.
    #[error("file not readable: {path}")]
    FileNotReadable { path: PathBuf },

    /// Opening the file failed after the existence checks passed.
    #[error("failed to open file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination exists but cannot be written.
    #[error("file not writable: {path}")]
    FileNotWritable { path: PathBuf },

    /// Failed to create the destination directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the destination file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Failed to render the dataset.
    #[error("failed to render CSV {stage}: {message}")]
    Render { stage: RenderStage, message: String },

    /// Failed to decode a row while reading.
    #[error("failed to decode CSV {path}: {source}")]
    Decode {
        path: PathBuf,
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    // === Delivery Errors ===
    /// The download sink failed.
    #[error("failed to write download response: {source}")]
    ResponseWrite {
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Export configuration is invalid.
    #[error("invalid export configuration: {message}")]
    Config { message: String },
}

impl ExportError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::NotAFile { .. }
            | Self::FileNotReadable { .. }
            | Self::FileOpen { .. }
            | Self::FileNotWritable { .. }
            | Self::DirectoryCreate { .. }
            | Self::FileWrite { .. }
            | Self::FileRead { .. } => ErrorKind::FileAccess,
            Self::Render { .. } => ErrorKind::Render,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::ResponseWrite { .. } => ErrorKind::Delivery,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Returns true for file-system failures.
    pub fn is_file_access(&self) -> bool {
        self.kind() == ErrorKind::FileAccess
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ExportError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
