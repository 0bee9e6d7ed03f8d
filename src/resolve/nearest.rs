/// Nearest-match selection over the measurement table.
///
/// Two deliberately distinct operations share this module:
///
/// - `nearest_record`: the closest row under a summed absolute-distance
///   metric. On a non-empty table this always succeeds; there is no
///   "not found" state, only a possibly large distance.
/// - `exact_or_sampled`: a row exactly equal to the target position, or
///   a uniformly-random substitute flagged as a fallback.
///
/// Conflating the two modes would silently change what `is_fallback`
/// means, so they are separate public functions rather than one routine
/// with a flag.
///
/// Both operations synthesize an explicitly-flagged simulated record when
/// the table is empty; an empty dataset degrades answers, it never fails
/// requests. The random source is injected so tests can seed it; callers
/// seed independently per request.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::model::{DatasetTable, MatchResult, Record};

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// The positional target a lookup runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    /// Used only to stamp synthesized records; the distance metric is
    /// purely spatial.
    pub reference_time: Option<DateTime<Utc>>,
}

/// Summed absolute difference across latitude, longitude, and depth.
pub fn distance(record: &Record, target: &Target) -> f64 {
    (record.latitude - target.latitude).abs()
        + (record.longitude - target.longitude).abs()
        + (record.depth - target.depth).abs()
}

// ---------------------------------------------------------------------------
// Lookup operations
// ---------------------------------------------------------------------------

/// Returns the record minimizing the summed absolute distance to the
/// target. Exact ties keep the earliest row in table order (the scan
/// only replaces the candidate on a strictly smaller distance), so the
/// result is stable for a fixed table.
pub fn nearest_record(
    table: &DatasetTable,
    target: &Target,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> MatchResult {
    let records = table.records();
    let Some(first) = records.first() else {
        return MatchResult {
            record: simulated_record(target, now, rng),
            is_fallback: true,
        };
    };

    let mut best = first;
    let mut best_distance = distance(first, target);
    for record in &records[1..] {
        let d = distance(record, target);
        if d < best_distance {
            best = record;
            best_distance = d;
        }
    }

    MatchResult {
        record: best.clone(),
        is_fallback: false,
    }
}

/// Returns the first row whose latitude, longitude, and depth all exactly
/// equal the target, or, when none exists, a uniformly-random row
/// flagged as a fallback.
pub fn exact_or_sampled(
    table: &DatasetTable,
    target: &Target,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> MatchResult {
    let records = table.records();
    if records.is_empty() {
        return MatchResult {
            record: simulated_record(target, now, rng),
            is_fallback: true,
        };
    }

    if let Some(record) = records.iter().find(|r| {
        r.latitude == target.latitude && r.longitude == target.longitude && r.depth == target.depth
    }) {
        return MatchResult {
            record: record.clone(),
            is_fallback: false,
        };
    }

    let idx = rng.gen_range(0..records.len());
    MatchResult {
        record: records[idx].clone(),
        is_fallback: true,
    }
}

// ---------------------------------------------------------------------------
// Simulated records
// ---------------------------------------------------------------------------

/// Builds a plausible stand-in record for an empty table: the target's
/// own position and depth, values sampled from open-ocean ranges, and the
/// pressure tied loosely to the depth (roughly 1.02 dbar per metre).
fn simulated_record(target: &Target, now: DateTime<Utc>, rng: &mut impl Rng) -> Record {
    Record {
        latitude: target.latitude,
        longitude: target.longitude,
        depth: target.depth,
        timestamp: target.reference_time.unwrap_or(now),
        temperature: rng.gen_range(2.0..30.0),
        salinity: rng.gen_range(33.0..37.5),
        pressure: target.depth * 1.02 + rng.gen_range(0.0..5.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
