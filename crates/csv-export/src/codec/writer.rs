//! Rendering records into CSV text.

use crate::error::{ExportError, RenderStage, Result};
use crate::format::CsvFormat;
use crate::logging::redact_value;
use crate::record::Record;

/// Renders `header` followed by every row of `data`.
///
/// An empty `header` writes no header row. Records that are not rows are
/// skipped. Rows without fields are skipped too instead of becoming blank
/// lines, since the reader drops blank lines and they would not come back.
pub fn render_csv(header: &[String], data: &[Record], format: &CsvFormat) -> Result<String> {
    let mut writer = format
        .writer_builder()
        .from_writer(Vec::with_capacity(estimate_capacity(header, data)));

    if !header.is_empty() {
        writer
            .write_record(header)
            .map_err(|e| render_error(RenderStage::Header, &e))?;
    }

    let mut skipped = 0usize;
    for (index, record) in data.iter().enumerate() {
        let Some(values) = record.values().filter(|values| !values.is_empty()) else {
            skipped += 1;
            if let Record::Scalar(value) = record {
                let text = value.as_text();
                tracing::debug!(
                    index,
                    value = redact_value(&text),
                    "Skipping record that is not a row"
                );
            } else {
                tracing::debug!(index, "Skipping row without fields");
            }
            continue;
        };

        let cells: Vec<_> = values.iter().map(|value| value.as_text()).collect();
        writer
            .write_record(cells.iter().map(|cell| cell.as_bytes()))
            .map_err(|e| render_error(RenderStage::Row(index), &e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| render_error(RenderStage::Finish, e.error()))?;
    let rendered = String::from_utf8(bytes).map_err(|e| render_error(RenderStage::Finish, &e))?;

    tracing::debug!(
        rows = data.len() - skipped,
        skipped,
        header_fields = header.len(),
        bytes = rendered.len(),
        "Rendered CSV"
    );

    Ok(rendered)
}

fn render_error(stage: RenderStage, err: &dyn std::fmt::Display) -> ExportError {
    ExportError::Render {
        stage,
        message: err.to_string(),
    }
}

/// Rough output size: header plus the first row's width for every row.
fn estimate_capacity(header: &[String], data: &[Record]) -> usize {
    let header_len: usize = header.iter().map(|name| name.len() + 1).sum();
    let row_len = data
        .first()
        .and_then(Record::values)
        .map_or(0, |values| values.iter().map(|v| v.as_text().len() + 1).sum());
    header_len + row_len.saturating_mul(data.len())
}
