//! Writing tables back to disk as CSV or `.xlsx`.

use crate::error::{EdaError, Result, ResultExt};
use crate::utils::StorageKind;
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Worksheet limits, header row included.
const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLUMNS: usize = 16_384;

/// Output formats for a cleaned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(EdaError::UnsupportedFormat(extension)),
        }
    }
}

/// Write a table as CSV with a header row.
pub fn write_csv<W: Write>(df: &DataFrame, writer: W) -> Result<()> {
    let mut df = df.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut df)
        .context("Writing CSV")?;
    Ok(())
}

/// Write a table as a single-sheet workbook with a bold header row.
///
/// Numbers and booleans keep their cell types; every other column is written
/// as text. Missing values are left as empty cells.
pub fn write_xlsx<W: Write>(df: &DataFrame, mut writer: W) -> Result<()> {
    if df.height() >= XLSX_MAX_ROWS || df.width() > XLSX_MAX_COLUMNS {
        return Err(EdaError::Spreadsheet(format!(
            "{} rows x {} columns does not fit in one worksheet",
            df.height(),
            df.width()
        )));
    }

    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("cleaned").map_err(xlsx_error)?;
        let header_format = Format::new().set_bold();

        for (index, column) in df.get_columns().iter().enumerate() {
            let col = index as u16;
            worksheet
                .write_with_format(0, col, column.name().as_str(), &header_format)
                .map_err(xlsx_error)?;
            write_column(worksheet, col, column.as_materialized_series())?;
        }
    }

    let buffer = workbook.save_to_buffer().map_err(xlsx_error)?;
    writer.write_all(&buffer)?;
    Ok(())
}

fn write_column(worksheet: &mut Worksheet, col: u16, series: &Series) -> Result<()> {
    match StorageKind::of_series(series) {
        StorageKind::Integer | StorageKind::Float => {
            let values = series.cast(&DataType::Float64)?;
            for (row, value) in values.f64()?.into_iter().enumerate() {
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    worksheet
                        .write_number(row as u32 + 1, col, v)
                        .map_err(xlsx_error)?;
                }
            }
        }
        StorageKind::Boolean => {
            for (row, value) in series.bool()?.into_iter().enumerate() {
                if let Some(v) = value {
                    worksheet
                        .write_boolean(row as u32 + 1, col, v)
                        .map_err(xlsx_error)?;
                }
            }
        }
        _ => {
            let values = series.cast(&DataType::String)?;
            for (row, value) in values.str()?.into_iter().enumerate() {
                if let Some(v) = value {
                    worksheet
                        .write_string(row as u32 + 1, col, v)
                        .map_err(xlsx_error)?;
                }
            }
        }
    }
    Ok(())
}

fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> EdaError {
    EdaError::Spreadsheet(e.to_string())
}

/// Write a table to `path`, picking CSV or `.xlsx` from the extension.
pub fn write_table(df: &DataFrame, path: &Path) -> Result<()> {
    let format = ExportFormat::from_path(path)?;
    let file = File::create(path)
        .map_err(EdaError::from)
        .context(format!("Creating {}", path.display()))?;

    match format {
        ExportFormat::Csv => write_csv(df, file)?,
        ExportFormat::Xlsx => write_xlsx(df, file)?,
    }

    info!("Table written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "units" => [Some(1i64), None, Some(3)],
            "open" => [true, false, true],
            "region" => ["North", "South", "North"],
        ]
        .unwrap()
    }

    #[test]
    fn test_export_format_detection() {
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")).unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out.XLSX")).unwrap(), ExportFormat::Xlsx);
        let err = ExportFormat::from_path(Path::new("out.parquet")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_write_csv_has_header() {
        let mut buffer = Vec::new();
        write_csv(&sample(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("units,open,region"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn test_write_xlsx_produces_zip_container() {
        let mut buffer = Vec::new();
        write_xlsx(&sample(), &mut buffer).unwrap();
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_write_table_round_trips_through_loader() {
        let path = std::env::temp_dir().join(format!("{}_export_table.xlsx", std::process::id()));
        write_table(&sample(), &path).unwrap();

        let loaded = crate::loader::load_table(&path).unwrap();
        assert_eq!(loaded.shape(), (3, 3));
        assert_eq!(loaded.column("open").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(loaded.column("units").unwrap().null_count(), 1);
        std::fs::remove_file(path).ok();
    }
}
