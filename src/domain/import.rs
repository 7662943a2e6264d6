// src/domain/import.rs

//! Bulk campaign creation from CSV.
//!
//! Columns: `name, floors, units_per_floor, target_amount, latitude, longitude`.
//! The first three are required. Header names are matched case-insensitively
//! and may come in any order. Validation is all-or-nothing: every problem is
//! collected and a file with any problem yields no campaigns at all.

use std::collections::HashMap;

use crate::domain::campaign::{CampaignKind, NewCampaign, MAX_AMOUNT_CENTS, MAX_FLOORS, MAX_UNITS_PER_FLOOR};
use crate::domain::stats::parse_amount_cents;
use crate::errors::{ImportIssue, ServerError};

pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "floors", "units_per_floor"];

/// Row number of the header line.
const HEADER_ROW: usize = 1;

fn issue(row: usize, column: &str, message: impl Into<String>) -> ImportIssue {
    ImportIssue { row, column: column.to_string(), message: message.into() }
}

struct Columns(HashMap<String, usize>);

impl Columns {
    fn cell<'r>(&self, record: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        self.0
            .get(column)
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

pub fn parse_campaign_csv(data: &[u8]) -> Result<Vec<NewCampaign>, ServerError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| ServerError::Import(vec![issue(HEADER_ROW, "*", format!("unreadable header: {e}"))]))?
        .clone();

    let mut columns = HashMap::new();
    for (idx, h) in headers.iter().enumerate() {
        columns.entry(h.trim().to_ascii_lowercase()).or_insert(idx);
    }
    let columns = Columns(columns);

    let missing: Vec<ImportIssue> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.0.contains_key(**c))
        .map(|c| issue(HEADER_ROW, c, "missing required column"))
        .collect();
    if !missing.is_empty() {
        return Err(ServerError::Import(missing));
    }

    let mut issues = Vec::new();
    let mut parsed = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let row = i + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                issues.push(issue(row, "*", format!("unreadable row: {e}")));
                continue;
            }
        };
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        match parse_row(&columns, &record, row) {
            Ok(c) => parsed.push(c),
            Err(mut errs) => issues.append(&mut errs),
        }
    }

    if !issues.is_empty() {
        return Err(ServerError::Import(issues));
    }
    if parsed.is_empty() {
        return Err(ServerError::BadRequest("CSV file has no campaign rows".into()));
    }
    Ok(parsed)
}

fn parse_int(
    columns: &Columns,
    record: &csv::StringRecord,
    row: usize,
    column: &str,
    max: i64,
    issues: &mut Vec<ImportIssue>,
) -> i64 {
    match columns.cell(record, column) {
        None => {
            issues.push(issue(row, column, "value is required"));
            0
        }
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if (1..=max).contains(&n) => n,
            Ok(_) => {
                issues.push(issue(row, column, format!("must be between 1 and {max}")));
                0
            }
            Err(_) => {
                issues.push(issue(row, column, format!("'{raw}' is not a whole number")));
                0
            }
        },
    }
}

fn parse_coord(
    columns: &Columns,
    record: &csv::StringRecord,
    row: usize,
    column: &str,
    limit: f64,
    issues: &mut Vec<ImportIssue>,
) -> Option<f64> {
    let raw = columns.cell(record, column)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && (-limit..=limit).contains(&v) => Some(v),
        Ok(_) => {
            issues.push(issue(row, column, format!("must be between -{limit} and {limit}")));
            None
        }
        Err(_) => {
            issues.push(issue(row, column, format!("'{raw}' is not a number")));
            None
        }
    }
}

fn parse_row(
    columns: &Columns,
    record: &csv::StringRecord,
    row: usize,
) -> Result<NewCampaign, Vec<ImportIssue>> {
    let mut issues = Vec::new();

    let name = match columns.cell(record, "name") {
        Some(n) => n.to_string(),
        None => {
            issues.push(issue(row, "name", "value is required"));
            String::new()
        }
    };
    let floors = parse_int(columns, record, row, "floors", MAX_FLOORS, &mut issues);
    let units_per_floor =
        parse_int(columns, record, row, "units_per_floor", MAX_UNITS_PER_FLOOR, &mut issues);

    let target_cents = match columns.cell(record, "target_amount") {
        None => None,
        Some(raw) => match parse_amount_cents(raw) {
            Ok(c) if c > MAX_AMOUNT_CENTS => {
                issues.push(issue(row, "target_amount", "amount is too large"));
                None
            }
            Ok(c) => Some(c),
            Err(msg) => {
                issues.push(issue(row, "target_amount", msg));
                None
            }
        },
    };

    let had_lat = columns.cell(record, "latitude").is_some();
    let had_lon = columns.cell(record, "longitude").is_some();
    let latitude = parse_coord(columns, record, row, "latitude", 90.0, &mut issues);
    let longitude = parse_coord(columns, record, row, "longitude", 180.0, &mut issues);
    if had_lat != had_lon {
        let column = if had_lat { "longitude" } else { "latitude" };
        issues.push(issue(row, column, "latitude and longitude must be given together"));
    }

    if !issues.is_empty() {
        return Err(issues);
    }
    Ok(NewCampaign {
        name,
        kind: CampaignKind::Residential,
        floors,
        units_per_floor,
        target_cents,
        latitude,
        longitude,
    })
}
