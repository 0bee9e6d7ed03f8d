/// Query orchestration: the two public entry points of the service.
///
/// `resolve_structured` takes an explicit position and parameter name;
/// `resolve_text` takes a free-text question. Both converge on the same
/// `ResolvedQuery` intermediate and the same uniform `Payload` shape, so
/// callers cannot tell which path produced an answer except through the
/// fields themselves.
///
/// The lookup mode differs by entry path on purpose: the structured path
/// wants the record AT the stated position and falls back to a sampled
/// substitute when there is none; the text path wants the record NEAREST
/// to a resolved, inherently approximate position. See
/// `resolve::nearest` for why the two modes stay separate operations.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::model::{
    Coordinates, DatasetTable, Gazetteer, MatchResult, Parameter, QueryError, ResolvedQuery,
};
use crate::resolve::nearest::{self, Target};
use crate::resolve::{extract, locate};

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

/// An explicit lookup request: position, depth, and one parameter name.
/// The parameter arrives as a string from the outer layer and is
/// validated here.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub parameter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
}

/// The uniform response payload. `location` reports the matched record's
/// position (which equals the requested one on an exact match), `values`
/// holds one entry per requested parameter read from that single record,
/// and `note` is present exactly when the match was a fallback; its
/// absence asserts an authoritative answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub location: PayloadLocation,
    pub values: serde_json::Map<String, serde_json::Value>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Outcome of a free-text query. An unresolvable location is an expected
/// end-user result, answered conversationally, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextOutcome {
    Answered(Payload),
    Unresolvable { answer: String },
}

/// Tunables for the resolution pipeline, injected from `ServiceConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveConfig {
    /// Minimum fuzzy score for gazetteer matches (0–100).
    pub fuzzy_threshold: f64,
    /// Fallback reference time when free text carries no parseable date:
    /// this many minutes before the request clock.
    pub default_reference_offset_minutes: i64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: locate::DEFAULT_FUZZY_THRESHOLD,
            default_reference_offset_minutes: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The composed query pipeline over one loaded dataset and gazetteer.
///
/// Both tables are injected at construction and never mutated, so a
/// single engine can serve concurrent callers without coordination; the
/// per-call random source is the only state, and each call brings its
/// own.
pub struct QueryEngine {
    dataset: DatasetTable,
    gazetteer: Gazetteer,
    config: ResolveConfig,
}

impl QueryEngine {
    pub fn new(dataset: DatasetTable, gazetteer: Gazetteer, config: ResolveConfig) -> Self {
        Self {
            dataset,
            gazetteer,
            config,
        }
    }

    pub fn dataset(&self) -> &DatasetTable {
        &self.dataset
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Structured entry point against a caller-supplied clock and RNG.
    pub fn resolve_structured_at(
        &self,
        request: &StructuredRequest,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Payload, QueryError> {
        let parameter = Parameter::parse(&request.parameter)
            .ok_or_else(|| QueryError::UnknownParameter(request.parameter.clone()))?;

        let position = Coordinates {
            latitude: request.latitude,
            longitude: request.longitude,
        };
        let resolved = ResolvedQuery {
            parameters: vec![parameter],
            depth: request.depth,
            position: Some(position),
            reference_time: None,
        };
        self.check_columns(&resolved)?;

        let matched =
            nearest::exact_or_sampled(&self.dataset, &target_of(position, &resolved), now, rng);
        Ok(self.payload(&resolved.parameters, &matched))
    }

    /// Wall-clock wrapper with a per-call entropy-seeded RNG. Use
    /// `resolve_structured_at` in tests.
    pub fn resolve_structured(&self, request: &StructuredRequest) -> Result<Payload, QueryError> {
        self.resolve_structured_at(request, Utc::now(), &mut StdRng::from_entropy())
    }

    /// Free-text entry point against a caller-supplied clock and RNG.
    ///
    /// When the location cannot be resolved, the answer short-circuits
    /// before any column check or table lookup.
    pub fn resolve_text_at(
        &self,
        text: &str,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<TextOutcome, QueryError> {
        let offset = Duration::minutes(self.config.default_reference_offset_minutes);
        let partial = extract::extract_at(text, now, offset);

        let Some(position) = locate::resolve(text, &self.gazetteer, self.config.fuzzy_threshold)
        else {
            return Ok(TextOutcome::Unresolvable {
                answer: unresolvable_answer(text),
            });
        };

        let resolved = ResolvedQuery {
            parameters: partial.parameters,
            depth: partial.depth,
            position: Some(position),
            reference_time: Some(partial.reference_time),
        };
        self.check_columns(&resolved)?;

        // One lookup, shared by every requested parameter: the values all
        // come from the same matched record, never from independent
        // per-parameter matches.
        let matched =
            nearest::nearest_record(&self.dataset, &target_of(position, &resolved), now, rng);
        Ok(TextOutcome::Answered(
            self.payload(&resolved.parameters, &matched),
        ))
    }

    /// Wall-clock wrapper with a per-call entropy-seeded RNG. Use
    /// `resolve_text_at` in tests.
    pub fn resolve_text(&self, text: &str) -> Result<TextOutcome, QueryError> {
        self.resolve_text_at(text, Utc::now(), &mut StdRng::from_entropy())
    }

    fn check_columns(&self, resolved: &ResolvedQuery) -> Result<(), QueryError> {
        for &parameter in &resolved.parameters {
            if !self.dataset.has_column(parameter) {
                return Err(QueryError::ColumnUnavailable(parameter));
            }
        }
        Ok(())
    }

    fn payload(&self, parameters: &[Parameter], matched: &MatchResult) -> Payload {
        let mut values = serde_json::Map::new();
        for &parameter in parameters {
            let value = serde_json::Number::from_f64(matched.record.value(parameter))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null);
            values.insert(parameter.as_str().to_string(), value);
        }

        Payload {
            location: PayloadLocation {
                latitude: matched.record.latitude,
                longitude: matched.record.longitude,
                depth: matched.record.depth,
            },
            values,
            timestamp: matched.record.timestamp.to_rfc3339(),
            note: matched
                .is_fallback
                .then(|| fallback_note(self.dataset.is_empty())),
        }
    }
}

fn target_of(position: Coordinates, resolved: &ResolvedQuery) -> Target {
    Target {
        latitude: position.latitude,
        longitude: position.longitude,
        depth: resolved.depth,
        reference_time: resolved.reference_time,
    }
}

fn fallback_note(table_is_empty: bool) -> String {
    if table_is_empty {
        "the dataset is empty; the returned values are simulated".to_string()
    } else {
        "no record matched the requested position exactly; the returned values come from a \
         randomly chosen substitute record"
            .to_string()
    }
}

fn unresolvable_answer(text: &str) -> String {
    format!(
        "Sorry, I could not find a place I recognise in \"{}\". Try naming a sea, a coast, or a \
         beach, for example \"arabian sea\" or \"goa beach\".",
        text.trim()
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
