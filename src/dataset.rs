use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::LoadError;

pub const DEFAULT_DATASET_PATH: &str = "2024-WTA-Women-Points-Dataset.xlsx";

pub const COL_MATCH_DATE: &str = "MATCH DATE";
pub const COL_TOURNAMENT_ID: &str = "TOURNAMENT ID";
pub const COL_TOURNAMENT_NAME: &str = "TOURNAMENT NAME";
pub const COL_MATCH_ID: &str = "MATCH ID";
pub const COL_SURFACE: &str = "SURFACE";
pub const COL_WON_SERVE: &str = "WON SERVE";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_MATCH_DATE,
    COL_TOURNAMENT_ID,
    COL_TOURNAMENT_NAME,
    COL_MATCH_ID,
    COL_SURFACE,
    COL_WON_SERVE,
];

// Zero-based physical row holding the column names; row 0 is a banner.
const HEADER_ROW: u32 = 1;

/// Raw value of the MATCH DATE column before any date coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum DateCell {
    /// Spreadsheet day number (date cells and plain numeric cells).
    Serial(f64),
    Text(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawGame {
    pub match_date: DateCell,
    pub tournament_id: String,
    pub tournament_name: String,
    pub match_id: String,
    pub surface: String,
    pub won_serve: String,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub sheet: String,
    /// Header names in sheet order, including columns the analysis ignores.
    pub columns: Vec<String>,
    pub rows: Vec<RawGame>,
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    match_date: usize,
    tournament_id: usize,
    tournament_name: usize,
    match_id: usize,
    surface: usize,
    won_serve: usize,
}

impl ColumnIndex {
    fn resolve(sheet: &str, columns: &[String]) -> Result<Self, LoadError> {
        let mut missing = Vec::new();
        let mut find = |name: &str| match columns.iter().position(|c| c == name) {
            Some(idx) => idx,
            None => {
                missing.push(name.to_string());
                0
            }
        };

        let index = Self {
            match_date: find(COL_MATCH_DATE),
            tournament_id: find(COL_TOURNAMENT_ID),
            tournament_name: find(COL_TOURNAMENT_NAME),
            match_id: find(COL_MATCH_ID),
            surface: find(COL_SURFACE),
            won_serve: find(COL_WON_SERVE),
        };

        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                sheet: sheet.to_string(),
                missing,
            });
        }
        Ok(index)
    }
}

/// Loads the first worksheet of a workbook, using its second row as the header.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let open_err = |source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(open_err)?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(LoadError::NoSheets(path.to_path_buf()));
    };
    let range = workbook.worksheet_range(&sheet).map_err(open_err)?;

    let (columns, rows) = parse_sheet(&sheet, &range)?;
    debug!(sheet = %sheet, rows = rows.len(), columns = columns.len(), "parsed worksheet");

    Ok(Dataset {
        source: path.to_path_buf(),
        sheet,
        columns,
        rows,
    })
}

/// Parses an in-memory sheet range into header names and game rows.
pub fn parse_sheet(
    sheet: &str,
    range: &Range<Data>,
) -> Result<(Vec<String>, Vec<RawGame>), LoadError> {
    let missing_header = || LoadError::MissingHeader {
        sheet: sheet.to_string(),
    };

    // calamine ranges begin at the first used cell, so a blank banner row
    // shifts every index down by one.
    let (start_row, _) = range.start().ok_or_else(missing_header)?;
    let header_offset = HEADER_ROW
        .checked_sub(start_row)
        .ok_or_else(missing_header)? as usize;

    let mut rows_iter = range.rows().skip(header_offset);
    let header = rows_iter.next().ok_or_else(missing_header)?;
    let columns = header.iter().map(cell_text).collect::<Vec<_>>();
    let index = ColumnIndex::resolve(sheet, &columns)?;

    let rows = rows_iter
        .filter(|row| !row.iter().all(|cell| matches!(cell, Data::Empty)))
        .map(|row| raw_game(row, index))
        .collect();

    Ok((columns, rows))
}

fn raw_game(row: &[Data], index: ColumnIndex) -> RawGame {
    let text = |idx: usize| row.get(idx).map(cell_text).unwrap_or_default();
    RawGame {
        match_date: row
            .get(index.match_date)
            .map(date_cell)
            .unwrap_or(DateCell::Empty),
        tournament_id: text(index.tournament_id),
        tournament_name: text(index.tournament_name),
        match_id: text(index.match_id),
        surface: text(index.surface),
        won_serve: text(index.won_serve),
    }
}

/// Renders a cell as trimmed text. Integral numbers drop the fractional part
/// so that numeric ids compare equal to their text form.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) => float_text(*v),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(dt) => float_text(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn date_cell(cell: &Data) -> DateCell {
    match cell {
        Data::DateTime(dt) => DateCell::Serial(dt.as_f64()),
        Data::Float(v) => DateCell::Serial(*v),
        Data::Int(v) => DateCell::Serial(*v as f64),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                DateCell::Empty
            } else {
                DateCell::Text(trimmed.to_string())
            }
        }
        Data::Bool(_) | Data::Error(_) | Data::Empty => DateCell::Empty,
    }
}
