/// Measurement table ingestion.
///
/// Parses the externally produced measurement CSV into a `DatasetTable`.
/// Column names vary at the source (ARGO-style exports abbreviate to
/// TEMP/PSAL/PRES, other producers spell the names out or pad them with
/// whitespace), so the header is normalized case/whitespace-insensitively
/// and mapped through an alias table before any rows are read.
///
/// Position columns (latitude, longitude, depth, timestamp) are required.
/// Measurement columns are optional; the set that is present is recorded
/// on the table so requests for a missing one can be rejected as a
/// data-unavailable condition rather than silently answered.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::model::{DatasetTable, IngestError, Parameter, Record};

// ---------------------------------------------------------------------------
// Column normalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Latitude,
    Longitude,
    Depth,
    Timestamp,
    Measurement(Parameter),
}

/// Lowercases a header cell and strips all whitespace and underscores, so
/// `" Time_Stamp "` and `"TIMESTAMP"` normalize identically.
fn normalize_column(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

fn classify_column(raw: &str) -> Option<Column> {
    match normalize_column(raw).as_str() {
        "latitude" | "lat" => Some(Column::Latitude),
        "longitude" | "long" | "lon" | "lng" => Some(Column::Longitude),
        "depth" | "depthm" => Some(Column::Depth),
        "timestamp" | "datetime" | "time" | "date" => Some(Column::Timestamp),
        "temperature" | "temp" => Some(Column::Measurement(Parameter::Temperature)),
        "salinity" | "psal" | "sal" => Some(Column::Measurement(Parameter::Salinity)),
        "pressure" | "pres" => Some(Column::Measurement(Parameter::Pressure)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

fn field<'a>(fields: &[&'a str], idx: usize, line: usize) -> Result<&'a str, IngestError> {
    fields.get(idx).map(|s| s.trim()).ok_or(IngestError::Row {
        line,
        message: "row has fewer fields than the header".to_string(),
    })
}

fn parse_float(raw: &str, column: &str, line: usize) -> Result<f64, IngestError> {
    raw.parse::<f64>().map_err(|_| IngestError::Row {
        line,
        message: format!("'{}' is not a number in column '{}'", raw, column),
    })
}

/// Parses a timestamp cell. Sources disagree on format, so several are
/// accepted: RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (taken as UTC), and a bare
/// `YYYY-MM-DD` date (taken as midnight UTC).
fn parse_timestamp(raw: &str, line: usize) -> Result<DateTime<Utc>, IngestError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    Err(IngestError::Row {
        line,
        message: format!("'{}' is not a recognized timestamp", raw),
    })
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parses a measurement CSV into a `DatasetTable`.
///
/// The first non-empty line is the header. Unknown columns are ignored;
/// the four position columns are required. The first malformed row fails
/// the whole parse; a table is never partially loaded.
pub fn parse_dataset_csv(csv: &str) -> Result<DatasetTable, IngestError> {
    let mut lines = csv.lines().enumerate();
    let (_, header) = lines
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or(IngestError::Empty)?;

    let columns: Vec<Option<Column>> = header.split(',').map(classify_column).collect();
    let position = |wanted: Column| columns.iter().position(|c| *c == Some(wanted));

    let lat_idx = position(Column::Latitude)
        .ok_or_else(|| IngestError::MissingColumn("latitude".to_string()))?;
    let lon_idx = position(Column::Longitude)
        .ok_or_else(|| IngestError::MissingColumn("longitude".to_string()))?;
    let depth_idx = position(Column::Depth)
        .ok_or_else(|| IngestError::MissingColumn("depth".to_string()))?;
    let time_idx = position(Column::Timestamp)
        .ok_or_else(|| IngestError::MissingColumn("timestamp".to_string()))?;

    let measurement_idx: Vec<(Parameter, usize)> = Parameter::ALL
        .iter()
        .filter_map(|&p| position(Column::Measurement(p)).map(|idx| (p, idx)))
        .collect();

    let mut records = Vec::new();
    for (i, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 1;
        let fields: Vec<&str> = line.split(',').collect();

        let latitude = parse_float(field(&fields, lat_idx, line_no)?, "latitude", line_no)?;
        let longitude = parse_float(field(&fields, lon_idx, line_no)?, "longitude", line_no)?;
        let depth = parse_float(field(&fields, depth_idx, line_no)?, "depth", line_no)?;
        let timestamp = parse_timestamp(field(&fields, time_idx, line_no)?, line_no)?;

        // Columns absent from the source stay NAN; DatasetTable::has_column
        // guards every read of them.
        let mut temperature = f64::NAN;
        let mut salinity = f64::NAN;
        let mut pressure = f64::NAN;
        for &(parameter, idx) in &measurement_idx {
            let value = parse_float(field(&fields, idx, line_no)?, parameter.as_str(), line_no)?;
            match parameter {
                Parameter::Temperature => temperature = value,
                Parameter::Salinity => salinity = value,
                Parameter::Pressure => pressure = value,
            }
        }

        records.push(Record {
            latitude,
            longitude,
            depth,
            timestamp,
            temperature,
            salinity,
            pressure,
        });
    }

    let columns_present = measurement_idx.iter().map(|&(p, _)| p).collect();
    Ok(DatasetTable::new(records, columns_present))
}

/// Reads and parses a measurement CSV from disk.
pub fn load_dataset(path: &str) -> Result<DatasetTable, IngestError> {
    let csv = std::fs::read_to_string(path)
        .map_err(|e| IngestError::Io(format!("{}: {}", path, e)))?;
    parse_dataset_csv(&csv)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
