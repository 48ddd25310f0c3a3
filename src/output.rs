//! CSV persistence for assembled records.

use crate::assemble::Record;
use crate::error::ApiError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `records` as CSV with header `id,text,<axis names>`.
///
/// With `bom`, the output starts with a UTF-8 byte order mark so spreadsheet tools
/// detect the encoding.
pub fn write_csv<W: Write>(
    mut writer: W,
    axis_names: &[&str],
    records: &[Record],
    bom: bool,
) -> Result<(), ApiError> {
    if bom {
        writer.write_all(UTF8_BOM)?;
    }
    let mut csv = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec!["id", "text"];
    header.extend_from_slice(axis_names);
    csv.write_record(&header)?;

    for record in records {
        if record.labels.len() != axis_names.len() {
            return Err(ApiError::OutputError(format!(
                "Record {} has {} labels for {} columns",
                record.id,
                record.labels.len(),
                axis_names.len()
            )));
        }
        let mut row = Vec::with_capacity(2 + axis_names.len());
        row.push(record.id.to_string());
        row.push(record.text.clone());
        row.extend(record.labels.iter().map(|(_, value)| value.clone()));
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the CSV to `path`, creating parent directories as needed.
pub fn write_csv_file(
    path: &Path,
    axis_names: &[&str],
    records: &[Record],
    bom: bool,
) -> Result<(), ApiError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(|e| {
        ApiError::OutputError(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_csv(BufWriter::new(file), axis_names, records, bom)?;
    tracing::info!(path = %path.display(), records = records.len(), "Wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, text: &str) -> Record {
        Record {
            id,
            text: text.to_string(),
            padded: false,
            labels: vec![
                ("urgency".to_string(), "High".to_string()),
                ("channel".to_string(), "Email".to_string()),
            ],
        }
    }

    #[test]
    fn writes_header_and_quotes_fields() {
        let mut buf = Vec::new();
        write_csv(
            &mut buf,
            &["urgency", "channel"],
            &[record(1, "plain"), record(2, "has, comma\nand newline")],
            false,
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("id,text,urgency,channel"));
        assert_eq!(lines.next(), Some("1,plain,High,Email"));
        assert!(text.contains("2,\"has, comma\nand newline\",High,Email"));
    }

    #[test]
    fn bom_prefixes_output() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &["urgency", "channel"], &[record(1, "x")], true).unwrap();
        assert!(buf.starts_with(UTF8_BOM));
    }

    #[test]
    fn label_count_mismatch_is_rejected() {
        let mut buf = Vec::new();
        let err = write_csv(&mut buf, &["urgency"], &[record(1, "x")], false).unwrap_err();
        assert!(matches!(err, ApiError::OutputError(_)));
    }

    #[test]
    fn file_writer_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out/nested/data.csv");
        write_csv_file(&path, &["urgency", "channel"], &[record(1, "x")], false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,text,urgency,channel"));
    }
}
