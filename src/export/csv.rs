use csv::Writer;
use serde::Serialize;
use std::path::Path;

use crate::error::ExportError;

/// Write rows as CSV with a header taken from the row's field names
pub fn export_rows<T, P>(rows: &[T], output_path: P) -> Result<(), ExportError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = output_path.as_ref();
    let write_failed = |reason: String| ExportError::WriteFailed {
        path: path.to_path_buf(),
        reason,
    };

    let mut writer = Writer::from_path(path).map_err(|e| write_failed(e.to_string()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_failed(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[derive(Serialize)]
    struct Row {
        date: &'static str,
        steps: u32,
    }

    #[test]
    fn test_export_rows_writes_header_once() {
        let temp_file = NamedTempFile::new().unwrap();
        let rows = [
            Row {
                date: "2024-09-02",
                steps: 5420,
            },
            Row {
                date: "2024-09-01",
                steps: 9000,
            },
        ];
        export_rows(&rows, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "date,steps\n2024-09-02,5420\n2024-09-01,9000\n");
    }
}
