//! Table loading from disk.
//!
//! Accepts `.csv`, `.parquet`, `.xlsx` and `.xls` files up to
//! [`MAX_FILE_SIZE`]. CSV loading falls back through a few parse strategies
//! before giving up; workbooks are read from their first sheet.

use crate::error::{EdaError, Result, ResultExt};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, TimeDelta};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Upload ceiling: 50 MB.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Cell values read as missing, in CSV fields and in workbook text cells.
pub const MISSING_VALUE_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Input formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Parquet,
    /// `.xlsx` or legacy `.xls` workbook
    Excel,
}

impl InputFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "xlsx" | "xls" => Ok(Self::Excel),
            _ => Err(EdaError::UnsupportedFormat(extension)),
        }
    }
}

/// Reject sizes above [`MAX_FILE_SIZE`].
pub fn check_file_size(size: u64) -> Result<()> {
    if size > MAX_FILE_SIZE {
        return Err(EdaError::FileTooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Validate and load a table from `path`.
pub fn load_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;
    let size = std::fs::metadata(path)
        .map_err(EdaError::from)
        .context(format!("Reading metadata of {}", path.display()))?
        .len();
    check_file_size(size)?;

    let df = match format {
        InputFormat::Csv => load_csv_with_fallbacks(path)?,
        InputFormat::Parquet => {
            let file = File::open(path)?;
            ParquetReader::new(file)
                .finish()
                .context(format!("Reading parquet file {}", path.display()))?
        }
        InputFormat::Excel => load_first_sheet(path)?,
    };

    info!(
        "Loaded {} ({} rows x {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

fn missing_value_tokens() -> NullValues {
    NullValues::AllColumns(
        MISSING_VALUE_TOKENS
            .iter()
            .map(|token| PlSmallStr::from(*token))
            .collect(),
    )
}

fn read_csv(path: &Path, parse_options: CsvParseOptions) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(parse_options.with_null_values(Some(missing_value_tokens())))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
}

/// Strict UTF-8 first, then lossy UTF-8, then a semicolon separator when
/// the comma parse collapsed everything into one column.
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    let df = match read_csv(path, CsvParseOptions::default().with_quote_char(Some(b'"'))) {
        Ok(df) => df,
        Err(e) => {
            debug!("Standard CSV loading failed: {}", e);
            warn!("Retrying {} with lossy UTF-8 decoding", path.display());
            read_csv(
                path,
                CsvParseOptions::default().with_encoding(CsvEncoding::LossyUtf8),
            )
            .context(format!("Reading CSV file {}", path.display()))?
        }
    };

    let single_column_with_semicolons = df.width() == 1
        && df
            .get_column_names()
            .first()
            .is_some_and(|name| name.contains(';'));
    if !single_column_with_semicolons {
        return Ok(df);
    }

    debug!("Header looks semicolon separated, retrying");
    match read_csv(
        path,
        CsvParseOptions::default()
            .with_separator(b';')
            .with_encoding(CsvEncoding::LossyUtf8),
    ) {
        Ok(reparsed) => Ok(reparsed),
        Err(e) => {
            debug!("Semicolon loading failed: {}", e);
            Ok(df)
        }
    }
}

// =============================================================================
// Workbooks
// =============================================================================

fn load_first_sheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        EdaError::Spreadsheet(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(EdaError::Spreadsheet(format!(
            "{} contains no worksheets",
            path.display()
        )));
    };
    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        EdaError::Spreadsheet(format!("Failed to read sheet '{}': {}", sheet_name, e))
    })?;

    debug!("Reading sheet '{}' of {}", sheet_name, path.display());
    let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
    frame_from_rows(&rows)
}

/// Build a table from worksheet rows, the first row being the header.
///
/// A column made only of numbers becomes Int64 when every value is whole,
/// Float64 otherwise. A column made only of booleans becomes Boolean.
/// Anything else is read as text.
pub fn frame_from_rows(rows: &[Vec<Data>]) -> Result<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let names = header_names(header);
    let columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let cells: Vec<Option<&Data>> = body
                .iter()
                .map(|row| row.get(index).filter(|cell| !is_missing_cell(cell)))
                .collect();
            Column::from(column_from_cells(name, &cells))
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Blank headers get positional names; repeated headers get a `.N` suffix.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let base = match cell_text(cell).trim() {
                "" => format!("column_{}", index + 1),
                text => text.to_string(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn column_from_cells(name: &str, cells: &[Option<&Data>]) -> Series {
    let present: Vec<&Data> = cells.iter().flatten().copied().collect();

    if !present.is_empty()
        && present
            .iter()
            .all(|cell| matches!(cell, Data::Int(_) | Data::Float(_)))
    {
        let values: Vec<Option<f64>> = cells.iter().map(|cell| cell.and_then(cell_number)).collect();
        let whole = values
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() <= i64::MAX as f64 / 2.0);
        if whole {
            let ints: Vec<Option<i64>> = values.iter().map(|v| v.map(|x| x as i64)).collect();
            return Series::new(name.into(), ints);
        }
        return Series::new(name.into(), values);
    }

    if !present.is_empty() && present.iter().all(|cell| matches!(cell, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|cell| match cell {
                Some(Data::Bool(b)) => Some(*b),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), values);
    }

    let values: Vec<Option<String>> = cells.iter().map(|cell| cell.map(cell_text)).collect();
    Series::new(name.into(), values)
}

fn is_missing_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => MISSING_VALUE_TOKENS.contains(&s.trim()),
        _ => false,
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Render an Excel serial date (days since 1899-12-30) as an ISO date or
/// datetime string.
fn excel_serial_to_string(serial: f64) -> String {
    let millis = (serial * 86_400_000.0).round() as i64;
    let converted = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .zip(TimeDelta::try_milliseconds(millis))
        .map(|(epoch, offset)| epoch + offset);

    match converted {
        Some(datetime) if millis % 86_400_000 == 0 => datetime.format("%Y-%m-%d").to_string(),
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}
