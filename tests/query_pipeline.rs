//! Structured-path integration tests.
//!
//! Exercises the full pipeline from an explicit position request down to
//! the table lookup: parameter validation, the data-unavailable
//! condition, exact matching, the sampled fallback, and the empty-table
//! degradation. Everything runs against synthetic tables with a fixed
//! clock and seeded random sources, so every assertion is deterministic.

use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use oceanquery_service::ingest::dataset::parse_dataset_csv;
use oceanquery_service::model::{DatasetTable, Gazetteer, Parameter, QueryError, Record};
use oceanquery_service::query::{QueryEngine, ResolveConfig, StructuredRequest};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
}

fn record(latitude: f64, longitude: f64, depth: f64, temperature: f64) -> Record {
    Record {
        latitude,
        longitude,
        depth,
        timestamp: Utc.with_ymd_and_hms(2024, 3, 10, 6, 30, 0).unwrap(),
        temperature,
        salinity: 35.0,
        pressure: depth * 1.02,
    }
}

fn engine(records: Vec<Record>) -> QueryEngine {
    QueryEngine::new(
        DatasetTable::new(records, Parameter::ALL.to_vec()),
        Gazetteer::empty(),
        ResolveConfig::default(),
    )
}

fn request(latitude: f64, longitude: f64, depth: f64, parameter: &str) -> StructuredRequest {
    StructuredRequest {
        latitude,
        longitude,
        depth,
        parameter: parameter.to_string(),
    }
}

// --- Validation -------------------------------------------------------------

#[test]
fn test_humidity_request_fails_validation_listing_the_valid_set() {
    let engine = engine(vec![record(15.4, 73.8, 100.0, 24.6)]);
    let err = engine
        .resolve_structured_at(
            &request(15.4, 73.8, 100.0, "humidity"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect_err("humidity is not a valid parameter");

    assert_eq!(err, QueryError::UnknownParameter("humidity".to_string()));
    let message = err.to_string();
    for name in ["temperature", "salinity", "pressure"] {
        assert!(
            message.contains(name),
            "validation error must list '{}': {}",
            name,
            message
        );
    }
}

#[test]
fn test_parameter_names_validate_case_insensitively() {
    let engine = engine(vec![record(15.4, 73.8, 100.0, 24.6)]);
    let payload = engine
        .resolve_structured_at(
            &request(15.4, 73.8, 100.0, "Temperature"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect("capitalized name should validate");
    assert!(payload.values.contains_key("temperature"));
}

#[test]
fn test_missing_column_is_a_data_condition_not_a_validation_failure() {
    // "pressure" is a perfectly valid parameter name; the table just
    // never had that column. The two failures must stay distinct.
    let table = DatasetTable::new(
        vec![record(15.4, 73.8, 100.0, 24.6)],
        vec![Parameter::Temperature, Parameter::Salinity],
    );
    let engine = QueryEngine::new(table, Gazetteer::empty(), ResolveConfig::default());

    let err = engine
        .resolve_structured_at(
            &request(15.4, 73.8, 100.0, "pressure"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect_err("the pressure column is absent");
    assert_eq!(err, QueryError::ColumnUnavailable(Parameter::Pressure));
}

// --- Exact matching ---------------------------------------------------------

#[test]
fn test_exact_position_returns_that_record_without_a_note() {
    let engine = engine(vec![
        record(15.4, 73.8, 100.0, 24.6),
        record(13.05, 80.29, 50.0, 27.1),
    ]);
    let payload = engine
        .resolve_structured_at(
            &request(13.05, 80.29, 50.0, "temperature"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect("exact position should resolve");

    assert_eq!(payload.location.latitude, 13.05);
    assert_eq!(payload.location.longitude, 80.29);
    assert_eq!(payload.location.depth, 50.0);
    assert_eq!(payload.values["temperature"], serde_json::json!(27.1));
    assert!(
        payload.note.is_none(),
        "an authoritative match must not carry a note"
    );
}

#[test]
fn test_near_miss_samples_a_substitute_and_says_so() {
    let rows = vec![
        record(15.4, 73.8, 100.0, 24.6),
        record(13.05, 80.29, 50.0, 27.1),
    ];
    let engine = engine(rows.clone());

    // Depth off by one metre: positionally close, categorically not equal.
    let payload = engine
        .resolve_structured_at(
            &request(15.4, 73.8, 101.0, "temperature"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect("near miss still resolves");

    let note = payload.note.expect("a sampled substitute must carry a note");
    assert!(!note.is_empty());
    assert!(
        rows.iter()
            .any(|r| r.latitude == payload.location.latitude
                && r.longitude == payload.location.longitude),
        "the substitute must come from the table"
    );
}

#[test]
fn test_sampled_fallback_is_deterministic_under_a_seed() {
    let engine = engine(
        (0..20)
            .map(|i| record(i as f64, 60.0, 0.0, 20.0 + i as f64))
            .collect(),
    );
    let req = request(50.0, 50.0, 50.0, "temperature");

    let a = engine
        .resolve_structured_at(&req, fixed_now(), &mut StdRng::seed_from_u64(9))
        .expect("should resolve");
    let b = engine
        .resolve_structured_at(&req, fixed_now(), &mut StdRng::seed_from_u64(9))
        .expect("should resolve");
    assert_eq!(a, b, "the same seed must sample the same substitute row");
}

// --- Empty table ------------------------------------------------------------

#[test]
fn test_empty_table_yields_a_simulated_payload_not_a_crash() {
    let engine = engine(Vec::new());
    let payload = engine
        .resolve_structured_at(
            &request(15.4, 73.8, 100.0, "salinity"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect("an empty table must still answer");

    let note = payload.note.expect("a simulated answer must carry a note");
    assert!(
        note.contains("simulated"),
        "the note must say the values are simulated: {}",
        note
    );
    // The synthesized record echoes the requested position.
    assert_eq!(payload.location.latitude, 15.4);
    assert_eq!(payload.location.longitude, 73.8);
    assert_eq!(payload.location.depth, 100.0);
    assert!(payload.values["salinity"].is_number());
}

// --- Through the ingest layer -----------------------------------------------

#[test]
fn test_csv_loaded_table_answers_structured_requests() {
    // End to end: an ARGO-style CSV through column normalization into the
    // engine, queried at one of its own rows.
    let csv = "\
LATITUDE,LONGITUDE,DEPTH,TIME,TEMP,PSAL,PRES
15.4,73.8,100,2024-03-10 06:30:00,24.6,35.1,102.3
10.0,72.5,400,2024-03-13 08:40:00,11.2,35.1,409.8
";
    let table = parse_dataset_csv(csv).expect("fixture CSV should parse");
    let engine = QueryEngine::new(table, Gazetteer::empty(), ResolveConfig::default());

    let payload = engine
        .resolve_structured_at(
            &request(15.4, 73.8, 100.0, "pressure"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect("row from the CSV should match exactly");
    assert_eq!(payload.values["pressure"], serde_json::json!(102.3));
    assert!(payload.note.is_none());
}

#[test]
fn test_payload_serializes_with_the_uniform_shape() {
    let engine = engine(vec![record(15.4, 73.8, 100.0, 24.6)]);
    let payload = engine
        .resolve_structured_at(
            &request(15.4, 73.8, 100.0, "temperature"),
            fixed_now(),
            &mut StdRng::seed_from_u64(1),
        )
        .expect("should resolve");

    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&payload).expect("payload serializes"))
            .expect("round trip");
    assert!(json.get("location").is_some());
    assert!(json.get("values").is_some());
    assert!(json.get("timestamp").is_some());
    assert!(
        json.get("note").is_none(),
        "note must be absent, not null, for authoritative answers"
    );
}
