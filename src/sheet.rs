// Spreadsheet reader: first sheet only, headers mapped onto the fixed record schema
use crate::constants;
use crate::error::{Error, Result};
use crate::record::{BranchRecord, Field, collapse_ws, is_well_formed_ifsc, normalize_ifsc};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Cursor;

/// OLE2 compound document signature (legacy .xls)
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
/// ZIP local file header signature (.xlsx)
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Ole,
    Zip,
}

/// Identify the workbook container from its leading bytes.
pub fn detect_container(bytes: &[u8]) -> Result<Container> {
    if bytes.starts_with(&OLE_MAGIC) {
        Ok(Container::Ole)
    } else if bytes.starts_with(&ZIP_MAGIC) {
        Ok(Container::Zip)
    } else {
        Err(Error::UnsupportedFormat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum SkipReason {
    EmptyIfsc,
    MalformedIfsc(String),
    DuplicateIfsc(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based row number within the sheet
    pub row: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of reading one sheet: the usable records and the rows left out.
#[derive(Debug, Clone, Default)]
pub struct SheetReport {
    pub records: Vec<BranchRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Read the first sheet (by position) of an xls/xlsx workbook.
pub fn read_first_sheet(bytes: &[u8]) -> Result<SheetReport> {
    let container = detect_container(bytes)?;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::Read(format!("cannot open {:?} workbook: {}", container, e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Read("workbook has no sheets".to_string()))?
        .map_err(|e| Error::Read(format!("cannot read first sheet: {}", e)))?;

    // Row numbers in reports are absolute, so account for leading blank rows.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());

    normalize_rows(rows, first_row + 1)
}

/// [`read_first_sheet`] on the blocking pool; workbook decoding is CPU-bound.
pub async fn read_first_sheet_blocking(bytes: Vec<u8>) -> Result<SheetReport> {
    tokio::task::spawn_blocking(move || read_first_sheet(&bytes))
        .await
        .map_err(|e| Error::Read(format!("sheet reader task failed: {}", e)))?
}

/// Map a grid of cell strings onto branch records.
///
/// `first_row_number` is the 1-based sheet row of the first grid row.
pub fn normalize_rows<I>(rows: I, first_row_number: usize) -> Result<SheetReport>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut rows = rows.into_iter().enumerate().peekable();
    if rows.peek().is_none() {
        return Ok(SheetReport::default());
    }

    let mut columns = None;
    for (idx, row) in rows.by_ref() {
        let mapping = map_header(&row);
        if is_header(&row, &mapping) {
            columns = Some(mapping);
            break;
        }
        if idx + 1 >= constants::HEADER_SCAN_ROWS {
            break;
        }
    }
    let columns = columns.ok_or_else(|| Error::Read("no IFSC column in first sheet".to_string()))?;

    let mut report = SheetReport::default();
    let mut seen = HashSet::new();

    for (idx, row) in rows {
        let row_number = first_row_number + idx;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut record = BranchRecord::default();
        for (col, field) in &columns {
            if let Some(value) = row.get(*col) {
                record.set(*field, value.clone());
            }
        }

        record.ifsc = normalize_ifsc(&record.ifsc);
        if record.ifsc.is_empty() {
            report.skipped.push(SkippedRow { row: row_number, reason: SkipReason::EmptyIfsc });
            continue;
        }
        if !is_well_formed_ifsc(&record.ifsc) {
            report.skipped.push(SkippedRow {
                row: row_number,
                reason: SkipReason::MalformedIfsc(record.ifsc),
            });
            continue;
        }
        if !seen.insert(record.ifsc.clone()) {
            report.skipped.push(SkippedRow {
                row: row_number,
                reason: SkipReason::DuplicateIfsc(record.ifsc),
            });
            continue;
        }

        if record.city2.is_empty() && !record.city1.is_empty() {
            record.city2 = record.city1.clone();
        }

        report.records.push(record);
    }

    Ok(report)
}

/// Column index -> field, first column claiming a field wins.
fn map_header(row: &[String]) -> Vec<(usize, Field)> {
    let mut claimed = HashSet::new();
    let mut mapping = Vec::new();
    for (col, header) in row.iter().enumerate() {
        if let Some(field) = canonical_field(header)
            && claimed.insert(field)
        {
            mapping.push((col, field));
        }
    }
    mapping
}

/// A header row maps IFSC plus another field, or names IFSC exactly.
///
/// A lone fuzzy match such as a title cell "IFSC codes of X Bank" is not enough.
fn is_header(row: &[String], mapping: &[(usize, Field)]) -> bool {
    let Some(&(col, _)) = mapping.iter().find(|(_, field)| *field == Field::Ifsc) else {
        return false;
    };
    mapping.len() > 1 || exact_field(&header_key(&row[col])) == Some(Field::Ifsc)
}

fn header_key(header: &str) -> String {
    let cleaned: String = header
        .chars()
        .map(|c| if matches!(c, '.' | '_' | ':') { ' ' } else { c })
        .collect();
    collapse_ws(&cleaned).to_lowercase()
}

/// Resolve a raw header to a record field, tolerating case, spacing and common synonyms.
pub fn canonical_field(header: &str) -> Option<Field> {
    let key = header_key(header);
    if key.is_empty() {
        return None;
    }

    exact_field(&key).or_else(|| {
        if key.contains("ifsc") {
            Some(Field::Ifsc)
        } else if key.contains("bank") {
            Some(Field::Bank)
        } else {
            None
        }
    })
}

fn exact_field(key: &str) -> Option<Field> {
    let field = match key {
        "bank" | "bank name" => Field::Bank,
        "ifsc" | "ifsc code" => Field::Ifsc,
        "branch" | "branch name" => Field::Branch,
        "address" | "address1" | "address line" => Field::Address,
        "city" | "city1" | "city 1" | "centre" => Field::City1,
        "city2" | "city 2" | "district" => Field::City2,
        "state" => Field::State,
        "std code" | "std" | "stdcode" => Field::StdCode,
        "phone" | "phone no" | "phone number" | "telephone" | "telephone no" | "contact"
        | "contact no" | "mobile" => Field::Phone,
        _ => return None,
    };
    Some(field)
}

/// Render a cell as trimmed text; integral numbers lose their ".0".
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => number_text(*f),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn number_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
