//! File-download delivery: filename sanitization, response headers, sinks.

use std::io::{self, Write};

/// Name used when a requested download name sanitizes to nothing.
pub const DEFAULT_DOWNLOAD_NAME: &str = "output";

/// `Cache-Control` value sent with every download.
pub const CACHE_CONTROL: &str = "must-revalidate, post-check=0, pre-check=0";

/// `Content-type` value sent with every download.
pub const CONTENT_TYPE: &str = "text/csv";

/// Destination of a download response, supplied by the host environment.
///
/// Headers are always sent before the body.
pub trait DownloadSink {
    /// Emit one response header.
    fn send_header(&mut self, name: &str, value: &str) -> io::Result<()>;

    /// Emit body bytes.
    fn send_body(&mut self, body: &[u8]) -> io::Result<()>;
}

impl<S: DownloadSink + ?Sized> DownloadSink for &mut S {
    fn send_header(&mut self, name: &str, value: &str) -> io::Result<()> {
        (**self).send_header(name, value)
    }

    fn send_body(&mut self, body: &[u8]) -> io::Result<()> {
        (**self).send_body(body)
    }
}

/// Reduces a requested download name to `[A-Za-z0-9_-]`.
///
/// Path separators, NUL bytes and `..` sequences are removed, then every
/// remaining character outside the allowed set becomes `-`. An empty result
/// falls back to [`DEFAULT_DOWNLOAD_NAME`].
pub fn sanitize_file_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .collect();
    let stripped = stripped.replace("..", "");

    let sanitized: String = stripped
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if sanitized.is_empty() {
        DEFAULT_DOWNLOAD_NAME.to_string()
    } else {
        sanitized
    }
}

/// The ordered header fields of a CSV download for an already sanitized name.
pub fn download_headers(sanitized_name: &str) -> [(&'static str, String); 5] {
    [
        ("Cache-Control", CACHE_CONTROL.to_string()),
        ("Content-type", CONTENT_TYPE.to_string()),
        (
            "Content-Disposition",
            format!("attachment; filename={sanitized_name}.csv"),
        ),
        ("Expires", "0".to_string()),
        ("Pragma", "public".to_string()),
    ]
}

/// In-memory response, useful for handing the result to a web framework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedResponse {
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

impl DownloadSink for BufferedResponse {
    fn send_header(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn send_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }
}

/// Writes `Name: value` header lines, a blank line, then the body.
#[derive(Debug)]
pub struct HttpResponseWriter<W: Write> {
    inner: W,
    body_started: bool,
}

impl<W: Write> HttpResponseWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            body_started: false,
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> DownloadSink for HttpResponseWriter<W> {
    fn send_header(&mut self, name: &str, value: &str) -> io::Result<()> {
        if self.body_started {
            return Err(io::Error::other("headers already sent"));
        }
        if [name, value].iter().any(|s| s.contains(['\r', '\n'])) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "header contains a line break",
            ));
        }
        write!(self.inner, "{name}: {value}\r\n")
    }

    fn send_body(&mut self, body: &[u8]) -> io::Result<()> {
        if !self.body_started {
            self.inner.write_all(b"\r\n")?;
            self.body_started = true;
        }
        self.inner.write_all(body)?;
        self.inner.flush()
    }
}
