/// Gazetteer ingestion.
///
/// Parses the name → coordinates list used by fuzzy location resolution.
/// Same parsing discipline as the measurement table: normalized header,
/// strict rows, all-or-nothing.

use crate::model::{Gazetteer, GazetteerEntry, IngestError};

fn normalize_column(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Latitude,
    Longitude,
}

fn classify_column(raw: &str) -> Option<Column> {
    match normalize_column(raw).as_str() {
        "name" | "place" | "location" => Some(Column::Name),
        "latitude" | "lat" => Some(Column::Latitude),
        "longitude" | "long" | "lon" | "lng" => Some(Column::Longitude),
        _ => None,
    }
}

/// Parses a gazetteer CSV.
///
/// Names must be unique (case-insensitively); a duplicate is a parse
/// error, not a silent overwrite, since fuzzy matching over a list with
/// duplicates would make the tie-break order meaningless.
pub fn parse_gazetteer_csv(csv: &str) -> Result<Gazetteer, IngestError> {
    let mut lines = csv.lines().enumerate();
    let (_, header) = lines
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or(IngestError::Empty)?;

    let columns: Vec<Option<Column>> = header.split(',').map(classify_column).collect();
    let position = |wanted: Column| columns.iter().position(|c| *c == Some(wanted));

    let name_idx =
        position(Column::Name).ok_or_else(|| IngestError::MissingColumn("name".to_string()))?;
    let lat_idx = position(Column::Latitude)
        .ok_or_else(|| IngestError::MissingColumn("latitude".to_string()))?;
    let lon_idx = position(Column::Longitude)
        .ok_or_else(|| IngestError::MissingColumn("longitude".to_string()))?;

    let mut entries: Vec<GazetteerEntry> = Vec::new();
    for (i, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 1;
        let fields: Vec<&str> = line.split(',').collect();
        let get = |idx: usize| -> Result<&str, IngestError> {
            fields.get(idx).map(|s| s.trim()).ok_or(IngestError::Row {
                line: line_no,
                message: "row has fewer fields than the header".to_string(),
            })
        };

        let name = get(name_idx)?.to_string();
        if name.is_empty() {
            return Err(IngestError::Row {
                line: line_no,
                message: "empty name".to_string(),
            });
        }
        let lowered = name.to_lowercase();
        if entries.iter().any(|e| e.name.to_lowercase() == lowered) {
            return Err(IngestError::Row {
                line: line_no,
                message: format!("duplicate name '{}'", name),
            });
        }

        let latitude = get(lat_idx)?.parse::<f64>().map_err(|_| IngestError::Row {
            line: line_no,
            message: format!("'{}' is not a number in column 'latitude'", get(lat_idx).unwrap_or("")),
        })?;
        let longitude = get(lon_idx)?.parse::<f64>().map_err(|_| IngestError::Row {
            line: line_no,
            message: format!("'{}' is not a number in column 'longitude'", get(lon_idx).unwrap_or("")),
        })?;

        entries.push(GazetteerEntry {
            name,
            latitude,
            longitude,
        });
    }

    Ok(Gazetteer::new(entries))
}

/// Reads and parses a gazetteer CSV from disk.
pub fn load_gazetteer(path: &str) -> Result<Gazetteer, IngestError> {
    let csv = std::fs::read_to_string(path)
        .map_err(|e| IngestError::Io(format!("{}: {}", path, e)))?;
    parse_gazetteer_csv(&csv)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
