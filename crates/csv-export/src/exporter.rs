//! The tabular exporter: render once, deliver to disk or to a download sink.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::codec::{CsvRows, read_rows, render_csv};
use crate::config::ExportConfig;
use crate::download::{DownloadSink, download_headers, sanitize_file_name};
use crate::error::{ExportError, Result};
use crate::format::CsvFormat;
use crate::record::{HeaderSet, Record};

/// Cached output of [`TabularExporter::process`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenderedCsv {
    /// Nothing rendered yet, or reset since.
    #[default]
    Unset,
    /// Rendered from an empty dataset.
    Empty,
    /// Rendered CSV text.
    Ready(String),
}

impl RenderedCsv {
    /// The rendered text; `None` while unset.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Empty => Some(""),
            Self::Ready(text) => Some(text),
        }
    }

    /// Returns true if a render has happened (or a result was injected).
    pub fn is_computed(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Returns true if unset or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.as_str().is_none_or(|text| text.trim().is_empty())
    }

    fn from_text(text: String) -> Self {
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Ready(text)
        }
    }
}

/// Converts a dataset into CSV and delivers it.
///
/// ```ignore
/// use csv_export::{Record, TabularExporter};
///
/// let data = vec![Record::keyed([("name", "Ann"), ("age", "30")])];
/// let mut exporter = TabularExporter::new(data, ["name", "age"]);
/// exporter.process()?.save("out/people.csv".as_ref())?;
/// ```
///
/// Not synchronized; use one instance per thread.
#[derive(Debug, Clone, Default)]
pub struct TabularExporter {
    data: Vec<Record>,
    headers: HeaderSet,
    config: ExportConfig,
    rendered: RenderedCsv,
}

impl TabularExporter {
    /// Create an exporter for `data` with the default configuration.
    pub fn new(data: Vec<Record>, headers: impl Into<HeaderSet>) -> Self {
        Self {
            data,
            headers: headers.into(),
            config: ExportConfig::default(),
            rendered: RenderedCsv::Unset,
        }
    }

    /// Use this dialect for rendering and reading.
    #[must_use]
    pub fn with_format(mut self, format: CsvFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn format(&self) -> &CsvFormat {
        &self.config.format
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Current rendered text; `None` until rendered or injected.
    pub fn csv_result(&self) -> Option<&str> {
        self.rendered.as_str()
    }

    pub fn rendered(&self) -> &RenderedCsv {
        &self.rendered
    }

    /// Inject a precomputed result, bypassing [`process`](Self::process).
    pub fn set_csv_result(&mut self, csv: impl Into<String>) -> &mut Self {
        self.rendered = RenderedCsv::from_text(csv.into());
        self
    }

    /// Forget the rendered result so the next delivery renders again.
    pub fn reset(&mut self) -> &mut Self {
        self.rendered = RenderedCsv::Unset;
        self
    }

    /// Lazily read the rows of an existing CSV file using this exporter's
    /// dialect. Each call starts a fresh pass.
    pub fn read_from(&self, path: &Path) -> Result<CsvRows> {
        read_rows(path, &self.config.format)
    }

    /// Render the dataset, replacing any cached result.
    ///
    /// An empty dataset renders as the empty string with no header. On
    /// failure the previous result is kept.
    pub fn process(&mut self) -> Result<&mut Self> {
        if self.data.is_empty() {
            self.rendered = RenderedCsv::Empty;
            return Ok(self);
        }

        let header = self.headers.resolve(&self.data);
        let text = render_csv(&header, &self.data, &self.config.format)?;
        self.rendered = RenderedCsv::from_text(text);
        Ok(self)
    }

    /// Write the rendered CSV to `path`, rendering first if needed.
    ///
    /// Missing parent directories are created. An existing destination that
    /// cannot be opened for writing is rejected before anything is written. Directory
    /// creation and truncation are not rolled back if the write fails.
    pub fn save(&mut self, path: &Path) -> Result<&mut Self> {
        self.ensure_rendered()?;

        ensure_parent_dir(path)?;
        check_writable(path)?;

        let content = self.rendered.as_str().unwrap_or_default();
        fs::write(path, content).map_err(|e| ExportError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(path = %path.display(), bytes = content.len(), "Saved CSV");
        Ok(self)
    }

    /// Send the rendered CSV as a download named after the configured
    /// default name.
    pub fn download<S: DownloadSink + ?Sized>(&mut self, sink: &mut S) -> Result<&mut Self> {
        let name = self.config.download_name.clone();
        self.download_as(sink, &name)
    }

    /// Send the rendered CSV as a download named `file_name`.
    ///
    /// The name is sanitized before use, see
    /// [`sanitize_file_name`](crate::sanitize_file_name).
    pub fn download_as<S: DownloadSink + ?Sized>(
        &mut self,
        sink: &mut S,
        file_name: &str,
    ) -> Result<&mut Self> {
        self.ensure_rendered()?;

        let name = sanitize_file_name(file_name);
        let delivery = |e| ExportError::ResponseWrite { source: e };
        for (key, value) in download_headers(&name) {
            sink.send_header(key, &value).map_err(delivery)?;
        }

        let body = self.rendered.as_str().unwrap_or_default();
        sink.send_body(body.as_bytes()).map_err(delivery)?;

        tracing::info!(file_name = %name, bytes = body.len(), "Sent CSV download");
        Ok(self)
    }

    fn ensure_rendered(&mut self) -> Result<()> {
        if !self.rendered.is_computed() {
            self.process()?;
        }
        Ok(())
    }
}

/// Create the parent directory of `path` if it does not exist.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        fs::create_dir_all(parent).map_err(|e| ExportError::DirectoryCreate {
            path: parent.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %parent.display(), "Created output directory");
    }
    Ok(())
}

/// Reject an existing destination that cannot be overwritten.
///
/// Besides the read-only flag, the file is opened for writing without
/// truncation, so ownership and ACL denials surface here rather than as a
/// failed write.
fn check_writable(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(ExportError::FileRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if metadata.is_dir() || metadata.permissions().readonly() {
        return Err(ExportError::FileNotWritable {
            path: path.to_path_buf(),
        });
    }

    match OpenOptions::new().write(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ExportError::FileNotWritable {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(ExportError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
