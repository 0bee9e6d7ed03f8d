/// Core data types for the ocean measurement query service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no resolution logic, only types, trivial
/// accessors, and the error taxonomy.

use chrono::{DateTime, Utc};
use std::fmt;

// ---------------------------------------------------------------------------
// Measurement parameters
// ---------------------------------------------------------------------------

/// A measurement parameter the dataset can be queried for.
///
/// These are the only three columns the service answers questions about.
/// `Parameter::ALL` is the canonical listing used by validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Temperature,
    Salinity,
    Pressure,
}

impl Parameter {
    /// All known parameters, in canonical order.
    pub const ALL: [Parameter; 3] = [
        Parameter::Temperature,
        Parameter::Salinity,
        Parameter::Pressure,
    ];

    /// Canonical lowercase column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Salinity => "salinity",
            Parameter::Pressure => "pressure",
        }
    }

    /// Parses a parameter name, case-insensitively and ignoring surrounding
    /// whitespace. Returns `None` for anything outside the known set.
    pub fn parse(name: &str) -> Option<Parameter> {
        match name.trim().to_lowercase().as_str() {
            "temperature" => Some(Parameter::Temperature),
            "salinity" => Some(Parameter::Salinity),
            "pressure" => Some(Parameter::Pressure),
            _ => None,
        }
    }

    /// Comma-separated listing of all valid parameter names, for error
    /// messages.
    pub fn allowed_set() -> String {
        Parameter::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Measurement records
// ---------------------------------------------------------------------------

/// A single measurement row: position, depth, time, and the three
/// measured values.
///
/// Records are created once at load time and never mutated. A measurement
/// column absent from the source file is stored as `f64::NAN` and guarded
/// by `DatasetTable::has_column`; callers must check column presence
/// before reading such a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub salinity: f64,
    pub pressure: f64,
}

impl Record {
    /// Reads the value of one measurement parameter from this record.
    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Salinity => self.salinity,
            Parameter::Pressure => self.pressure,
        }
    }
}

/// The in-memory measurement table: all loaded records plus the set of
/// measurement columns that were actually present in the source.
///
/// Populated once at load time, read-only afterward. Loading is
/// all-or-nothing: a failed load yields `DatasetTable::empty()`, never a
/// partially filled table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetTable {
    records: Vec<Record>,
    columns: Vec<Parameter>,
}

impl DatasetTable {
    pub fn new(records: Vec<Record>, columns: Vec<Parameter>) -> Self {
        Self { records, columns }
    }

    /// An empty table reporting every measurement column as present.
    ///
    /// Used when a load fails outright: requests still resolve (to
    /// simulated fallback records) rather than being rejected for a
    /// missing column that was never inspected.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            columns: Parameter::ALL.to_vec(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source file carried a column for this parameter.
    pub fn has_column(&self, parameter: Parameter) -> bool {
        self.columns.contains(&parameter)
    }
}

// ---------------------------------------------------------------------------
// Gazetteer
// ---------------------------------------------------------------------------

/// One named place: a location name mapped to fixed coordinates.
///
/// Names are unique within a gazetteer, compared case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerEntry {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The static name → coordinates lookup table used by fuzzy location
/// resolution. Loaded once, read-only afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Resolution intermediates
// ---------------------------------------------------------------------------

/// A resolved position. Latitude and longitude travel together: a query
/// either has both or has no location at all, never half a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The canonical intermediate produced by either entry path (structured
/// or free text) before the table lookup runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    /// Requested parameters, deduplicated, in order of first occurrence.
    /// Never empty; extraction defaults to temperature.
    pub parameters: Vec<Parameter>,
    /// Requested depth in metres. Defaults to 0 (surface).
    pub depth: f64,
    /// Resolved position, or `None` when no location could be determined.
    pub position: Option<Coordinates>,
    /// Reference time, when one was given or extracted.
    pub reference_time: Option<DateTime<Utc>>,
}

/// Outcome of a table lookup.
///
/// `is_fallback = true` means no record satisfied the positional target
/// and a substitute was chosen (a random row, or a synthesized record for
/// an empty table). The flag always propagates to the response so callers
/// can distinguish authoritative from simulated data.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub record: Record,
    pub is_fallback: bool,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Request-level errors from the query pipeline.
///
/// An unresolvable free-text location is deliberately NOT here: it is an
/// expected end-user outcome, answered conversationally rather than as an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The caller asked for a parameter outside the known set.
    UnknownParameter(String),
    /// The requested parameter is valid but its column is missing from
    /// the loaded dataset. A server-side data condition, distinct from
    /// "no matching row".
    ColumnUnavailable(Parameter),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnknownParameter(name) => write!(
                f,
                "unknown parameter '{}'; valid parameters are: {}",
                name,
                Parameter::allowed_set()
            ),
            QueryError::ColumnUnavailable(parameter) => write!(
                f,
                "the '{}' column is not present in the loaded dataset",
                parameter
            ),
        }
    }
}

impl std::error::Error for QueryError {}

/// Errors raised while parsing the dataset or gazetteer source files.
///
/// A load is all-or-nothing: the first bad row fails the whole file and
/// the caller proceeds with an empty table.
#[derive(Debug, PartialEq)]
pub enum IngestError {
    /// The input contained no header line at all.
    Empty,
    /// A required column was not found in the header.
    MissingColumn(String),
    /// A data row could not be parsed.
    Row { line: usize, message: String },
    /// The file could not be read.
    Io(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Empty => write!(f, "input contains no data"),
            IngestError::MissingColumn(name) => {
                write!(f, "required column '{}' not found in header", name)
            }
            IngestError::Row { line, message } => {
                write!(f, "bad row at line {}: {}", line, message)
            }
            IngestError::Io(message) => write!(f, "read failed: {}", message),
        }
    }
}

impl std::error::Error for IngestError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
