//! Consignment sheet loader (CSV with a header row)
//!
//! Columns: `id,customer,destination,pallets,weight,eta,status,delivery_location`.
//! Only the first three are required; blank cells read as "unknown".

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use haulboard_domain::model::Consignment;
use haulboard_domain::service::resolve_consignment_keys;
use haulboard_types::{Error, Result};

#[derive(Debug, Deserialize)]
struct ConsignmentRow {
    id: String,
    customer: String,
    destination: String,
    #[serde(default)]
    pallets: Option<u32>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    eta: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    delivery_location: Option<String>,
}

pub fn load_consignments_from_csv(path: &Path) -> Result<Vec<Consignment>> {
    let file = std::fs::File::open(path)?;
    load_consignments_from_reader(file)
}

pub fn load_consignments_from_reader<R: Read>(reader: R) -> Result<Vec<Consignment>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let seen_at = Utc::now();
    let mut consignments = Vec::new();
    for (index, row) in csv_reader.deserialize::<ConsignmentRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = row.map_err(|e| row_error(e, line))?;
        consignments.push(row_to_consignment(row, line, seen_at)?);
    }
    Ok(consignments)
}

/// Bad cells are the sheet's fault; only I/O failures stay internal
fn row_error(err: csv::Error, line: usize) -> Error {
    if err.is_io_error() {
        return Error::Csv(err);
    }
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => {
            Error::InvalidInput(format!("line {}: {}", line, err))
        }
        _ => Error::InvalidInput(format!("line {}: {}", line, err)),
    }
}

fn row_to_consignment(row: ConsignmentRow, line: usize, seen_at: DateTime<Utc>) -> Result<Consignment> {
    if row.id.is_empty() {
        return Err(Error::InvalidInput(format!("line {}: consignment id is blank", line)));
    }
    if let Some(w) = row.weight {
        if !w.is_finite() || w < 0.0 {
            return Err(Error::InvalidInput(format!(
                "line {}: weight must be a non-negative number",
                line
            )));
        }
    }
    let eta = match row.eta.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(parse_eta(raw).ok_or_else(|| {
            Error::InvalidInput(format!("line {}: unrecognised ETA '{}'", line, raw))
        })?),
        None => None,
    };

    let mut consignment = Consignment::new(row.id, row.customer, row.destination);
    consignment.reported_pallets = row.pallets;
    consignment.weight = row.weight;
    consignment.eta = eta;
    consignment.status = row.status.unwrap_or_default();
    consignment.delivery_location_id = row.delivery_location.filter(|s| !s.is_empty());
    consignment.last_seen_at = seen_at;
    resolve_consignment_keys(&mut consignment);
    Ok(consignment)
}

fn parse_eta(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M", "%d/%m/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const SHEET: &str = "\
id,customer,destination,pallets,weight,eta,status
C1,Acme Limited,North-West Depot LS1 4AP,4,850.5,2026-03-10 07:30,booked
C2,Brown & Co,Trafford Park,,,,
C3,Acme Limited,Leeds,0,120,09/03/2026,booked
";

    #[test]
    fn test_load_sheet() {
        let list = load_consignments_from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(list.len(), 3);

        let c1 = &list[0];
        assert_eq!(c1.reported_pallets, Some(4));
        assert_eq!(c1.customer_key.as_deref(), Some("ACME LTD"));
        assert_eq!(c1.destination_key.as_deref(), Some("NORTH WEST DEPOT LS1 4AP"));
        assert_eq!(c1.postcode().as_deref(), Some("LS1 4AP"));
        assert_eq!(c1.status, "booked");

        let c2 = &list[1];
        assert_eq!(c2.reported_pallets, None);
        assert_eq!(c2.weight, None);
        assert!(c2.eta.is_none());

        let c3 = &list[2];
        assert_eq!(c3.reported_pallets, Some(0));
        assert_eq!(c3.eta.unwrap().day(), 9);
    }

    #[test]
    fn test_bad_eta_reports_line() {
        let sheet = "id,customer,destination,eta\nC1,Acme,Leeds,soon\n";
        let err = load_consignments_from_reader(sheet.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_negative_pallets_rejected() {
        let sheet = "id,customer,destination,pallets\nC1,Acme,Leeds,3\nC2,Acme,Leeds,-2\n";
        let err = load_consignments_from_reader(sheet.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(err.kind(), haulboard_types::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_non_numeric_weight_rejected() {
        let sheet = "id,customer,destination,weight\nC1,Acme,Leeds,heavy\n";
        let err = load_consignments_from_reader(sheet.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("line 2"));
    }
}
