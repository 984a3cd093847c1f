use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::Month;

use crate::error::{DashError, Result};
use crate::models::{month_from_number, SalesRecord};

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Year",
    "Month",
    "Automobile_Sales",
    "Vehicle_Type",
    "Total_Expenditure",
    "Unemployment_Rate",
    "Recession",
];

/// Alternate header names, matched after the canonical name.
const COLUMN_ALIASES: &[(&str, &str)] = &[("Total_Expenditure", "Advertising_Expenditure")];

// ---------------------------------------------------------------------------
// SalesData
// ---------------------------------------------------------------------------

/// The full record set. Built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone, Default)]
pub struct SalesData {
    records: Vec<SalesRecord>,
}

impl SalesData {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest year present, if any.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Vehicle types in first-appearance order.
    pub fn vehicle_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.vehicle_type.as_str())
            .filter(|v| seen.insert(*v))
            .collect()
    }

    pub fn recession_count(&self) -> usize {
        self.records.iter().filter(|r| r.recession).count()
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

pub fn parse_month(raw: &str) -> Option<Month> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u32>() {
        return month_from_number(n);
    }
    s.parse::<Month>().ok()
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim().replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    // Some exports write integer columns as floats ("1980.0").
    s.parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && v.abs() < i32::MAX as f64)
        .map(|v| v as i32)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_file(path: &Path) -> Result<SalesData> {
    let file = std::fs::File::open(path)
        .map_err(|e| DashError::Load(format!("cannot open {}: {e}", path.display())))?;
    let data = load_reader(std::io::BufReader::new(file))
        .map_err(|e| match e {
            DashError::Load(msg) => DashError::Load(format!("{}: {msg}", path.display())),
            other => other,
        })?;
    if data.is_empty() {
        tracing::warn!(path = %path.display(), "data file has no records");
    } else {
        tracing::info!(path = %path.display(), records = data.len(), "loaded sales data");
    }
    Ok(data)
}

/// Column positions of the required fields in the header row.
struct ColumnMap {
    indices: [usize; 7],
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();
        let find = |name: &str| normalized.iter().position(|h| h == &name.to_ascii_lowercase());

        let mut indices = [0usize; 7];
        let mut missing = Vec::new();
        for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
            let found = find(*column).or_else(|| {
                COLUMN_ALIASES
                    .iter()
                    .filter(|(canonical, _)| *canonical == *column)
                    .find_map(|(_, alias)| find(*alias))
            });
            match found {
                Some(i) => indices[slot] = i,
                None => missing.push(*column),
            }
        }
        if !missing.is_empty() {
            return Err(DashError::Load(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }
        Ok(Self { indices })
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, slot: usize) -> &'r str {
        record.get(self.indices[slot]).unwrap_or("")
    }
}

pub fn load_reader<R: Read>(reader: R) -> Result<SalesData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(read_error)?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(read_error)?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push(parse_record(&columns, &record, line)?);
    }
    Ok(SalesData::new(records))
}

/// Reader-level failures (bad UTF-8, broken quoting, I/O) are load errors too.
fn read_error(err: csv::Error) -> DashError {
    match err.position() {
        Some(pos) => DashError::Load(format!("line {}: {err}", pos.line())),
        None => DashError::Load(err.to_string()),
    }
}

fn invalid(line: u64, column: &str, raw: &str, expected: &str) -> DashError {
    DashError::Load(format!(
        "line {line}: column {column}: invalid value '{}' ({expected})",
        raw.trim()
    ))
}

fn parse_record(columns: &ColumnMap, record: &csv::StringRecord, line: u64) -> Result<SalesRecord> {
    let field = |slot: usize| columns.get(record, slot);
    let number = |slot: usize| -> Result<f64> {
        parse_number(field(slot))
            .ok_or_else(|| invalid(line, REQUIRED_COLUMNS[slot], field(slot), "expected a number"))
    };
    let non_negative = |slot: usize| -> Result<f64> {
        let v = number(slot)?;
        if v < 0.0 {
            return Err(invalid(line, REQUIRED_COLUMNS[slot], field(slot), "must not be negative"));
        }
        Ok(v)
    };

    let year = parse_year(field(0))
        .ok_or_else(|| invalid(line, REQUIRED_COLUMNS[0], field(0), "expected an integer year"))?;
    let month = parse_month(field(1)).ok_or_else(|| {
        invalid(line, REQUIRED_COLUMNS[1], field(1), "expected 1-12 or a month name")
    })?;
    let automobile_sales = non_negative(2)?;
    let vehicle_type = field(3).trim().to_string();
    if vehicle_type.is_empty() {
        return Err(invalid(line, REQUIRED_COLUMNS[3], field(3), "must not be empty"));
    }
    let total_expenditure = non_negative(4)?;
    let unemployment_rate = number(5)?;
    let recession = parse_flag(field(6))
        .ok_or_else(|| invalid(line, REQUIRED_COLUMNS[6], field(6), "expected 0 or 1"))?;

    Ok(SalesRecord {
        year,
        month,
        automobile_sales,
        vehicle_type,
        total_expenditure,
        unemployment_rate,
        recession,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Year,Month,Automobile_Sales,Vehicle_Type,Total_Expenditure,Unemployment_Rate,Recession\n";

    fn load_str(body: &str) -> Result<SalesData> {
        load_reader(body.as_bytes())
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("3"), Some(Month::March));
        assert_eq!(parse_month("Jan"), Some(Month::January));
        assert_eq!(parse_month("december"), Some(Month::December));
        assert_eq!(parse_month(" Sep "), Some(Month::September));
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("Smarch"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("0.0"), Some(false));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("2"), None);
    }

    #[test]
    fn test_parse_number_and_year() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" 5.4 "), Some(5.4));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_year("1980"), Some(1980));
        assert_eq!(parse_year("1980.0"), Some(1980));
        assert_eq!(parse_year("1980.5"), None);
    }

    #[test]
    fn test_load_valid_rows() {
        let body = format!(
            "{HEADER}1980,Jan,3684.0,Supperminicar,1558.0,5.4,1\n1981,2,2000,Sports,900,6.1,0\n"
        );
        let data = load_str(&body).unwrap();
        assert_eq!(data.len(), 2);
        let first = &data.records()[0];
        assert_eq!(first.year, 1980);
        assert_eq!(first.month, Month::January);
        assert_eq!(first.automobile_sales, 3684.0);
        assert_eq!(first.vehicle_type, "Supperminicar");
        assert!(first.recession);
        assert!(!data.records()[1].recession);
        assert_eq!(data.year_span(), Some((1980, 1981)));
        assert_eq!(data.vehicle_types(), vec!["Supperminicar", "Sports"]);
        assert_eq!(data.recession_count(), 1);
    }

    #[test]
    fn test_load_ignores_extra_columns_and_reorders() {
        let body = "Date,City,recession,year,month,vehicle_type,unemployment_rate,\
                    Advertising_Expenditure,Automobile_Sales\n\
                    1/31/1980,Georgia,1,1980,Jan,Sports,5.4,1558,3684\n";
        let data = load_str(body).unwrap();
        let r = &data.records()[0];
        assert_eq!(r.vehicle_type, "Sports");
        assert_eq!(r.total_expenditure, 1558.0);
        assert_eq!(r.automobile_sales, 3684.0);
        assert_eq!(r.unemployment_rate, 5.4);
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let err = load_str("Year,Month,Automobile_Sales\n1980,1,10\n").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, DashError::Load(_)));
        assert!(msg.contains("Vehicle_Type"));
        assert!(msg.contains("Recession"));
    }

    #[test]
    fn test_bad_value_names_line_and_column() {
        let body = format!("{HEADER}1980,1,10,Sports,5,5.0,1\n1980,1,abc,Sports,5,5.0,1\n");
        let msg = load_str(&body).unwrap_err().to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("Automobile_Sales"), "{msg}");
        assert!(msg.contains("abc"), "{msg}");
    }

    #[test]
    fn test_negative_expenditure_rejected() {
        let body = format!("{HEADER}1980,1,10,Sports,-5,5.0,1\n");
        let msg = load_str(&body).unwrap_err().to_string();
        assert!(msg.contains("Total_Expenditure"));
        assert!(msg.contains("negative"));
    }

    #[test]
    fn test_bad_recession_flag_rejected() {
        let body = format!("{HEADER}1980,1,10,Sports,5,5.0,maybe\n");
        assert!(load_str(&body).is_err());
    }

    #[test]
    fn test_empty_vehicle_type_rejected() {
        let body = format!("{HEADER}1980,1,10,  ,5,5.0,0\n");
        assert!(load_str(&body).unwrap_err().to_string().contains("Vehicle_Type"));
    }

    #[test]
    fn test_header_only_is_empty_not_error() {
        let data = load_str(HEADER).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.year_span(), None);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let body = format!("{HEADER}1980,1,10,Sports,5,5.0,0\n,,,,,,\n");
        assert_eq!(load_str(&body).unwrap().len(), 1);
    }

    #[test]
    fn test_load_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DashError::Load(_)));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn test_load_file_prefixes_path_on_bad_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, format!("{HEADER}1980,Foo,10,Sports,5,5.0,0\n")).unwrap();
        let msg = load_file(&path).unwrap_err().to_string();
        assert!(msg.contains("sales.csv"));
        assert!(msg.contains("Month"));
    }

    #[test]
    fn test_invalid_utf8_is_load_error_with_path_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        let mut body = HEADER.as_bytes().to_vec();
        body.extend_from_slice(b"1980,1,10,");
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(b",5,5.0,0\n");
        std::fs::write(&path, body).unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DashError::Load(_)), "{err:?}");
        let msg = err.to_string();
        assert!(msg.starts_with("Load error: "), "{msg}");
        assert!(msg.contains("broken.csv"), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
    }}
