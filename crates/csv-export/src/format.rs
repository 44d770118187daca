//! CSV dialect configuration shared by the writer and the reader.

use serde::{Deserialize, Serialize};

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Default enclosure (quote) character.
pub const DEFAULT_ENCLOSURE: u8 = b'"';

/// Default escape character.
pub const DEFAULT_ESCAPE: u8 = b'\\';

/// Delimiter, enclosure and escape characters of a CSV dialect.
///
/// The characters are not validated against each other; colliding
/// configurations produce whatever the underlying `csv` reader and writer
/// make of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvFormat {
    /// Field separator.
    #[serde(with = "ascii_char")]
    pub delimiter: u8,
    /// Quote character used around fields that need it.
    #[serde(with = "ascii_char")]
    pub enclosure: u8,
    /// Escape character. Enclosures are always escaped by doubling, so
    /// this byte is written and read back as an ordinary character.
    #[serde(with = "ascii_char")]
    pub escape: u8,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            enclosure: DEFAULT_ENCLOSURE,
            escape: DEFAULT_ESCAPE,
        }
    }
}

impl CsvFormat {
    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the enclosure character.
    #[must_use]
    pub fn with_enclosure(mut self, enclosure: u8) -> Self {
        self.enclosure = enclosure;
        self
    }

    /// Set the escape character.
    #[must_use]
    pub fn with_escape(mut self, escape: u8) -> Self {
        self.escape = escape;
        self
    }

    /// Writer configured for this dialect.
    ///
    /// Enclosures inside quoted fields are always doubled, whatever the
    /// escape character is. Rows may differ in width.
    pub(crate) fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.enclosure)
            .escape(self.escape)
            .double_quote(true)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .has_headers(false);
        builder
    }

    /// Reader configured for this dialect.
    ///
    /// Decodes what [`writer_builder`](Self::writer_builder) encodes: doubled
    /// enclosures are unescaped and the escape byte is kept verbatim. The
    /// first line is returned as an ordinary row.
    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.enclosure)
            .escape(None)
            .double_quote(true)
            .has_headers(false)
            .flexible(true);
        builder
    }
}

/// Serializes a dialect byte as a one-character string.
mod ascii_char {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(char::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let ch = char::deserialize(deserializer)?;
        u8::try_from(ch)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| D::Error::custom(format!("expected an ASCII character, got '{ch}'")))
    }
}
