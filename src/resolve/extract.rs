/// Term extraction from free-text questions.
///
/// Pulls three things out of an arbitrary text string: which measurement
/// parameters are being asked about, at what depth, and for what point in
/// time. Each concern is an ordered rule table evaluated by a single
/// dispatch loop, so precedence is explicit and additions are one-line
/// edits rather than new branches.
///
/// # Clock injection
/// Time extraction is relative to a caller-supplied `now` rather than an
/// internal `Utc::now()` call, which keeps every function deterministic in
/// tests. The `extract` / `reference_time` wrappers use the wall clock.

use chrono::{DateTime, Datelike, Duration, Utc};
use regex::Regex;

use crate::model::Parameter;

// ---------------------------------------------------------------------------
// Extraction result
// ---------------------------------------------------------------------------

/// Everything the extractor can pull from free text. Position is not
/// here; location resolution is a separate concern (`resolve::locate`).
#[derive(Debug, Clone, PartialEq)]
pub struct PartialQuery {
    /// Requested parameters in order of first occurrence in the text.
    /// Never empty: defaults to temperature.
    pub parameters: Vec<Parameter>,
    /// Requested depth in metres; 0 when no depth token was found.
    pub depth: f64,
    /// Extracted reference time, or the configured default when nothing
    /// in the text parses as a time.
    pub reference_time: DateTime<Utc>,
}

/// Runs all three extractions against a caller-supplied clock.
pub fn extract_at(text: &str, now: DateTime<Utc>, default_offset: Duration) -> PartialQuery {
    PartialQuery {
        parameters: extract_parameters(text),
        depth: extract_depth(text),
        reference_time: reference_time_at(text, now, default_offset),
    }
}

/// Wall-clock convenience wrapper. Use `extract_at` in tests.
pub fn extract(text: &str, default_offset: Duration) -> PartialQuery {
    extract_at(text, Utc::now(), default_offset)
}

// ---------------------------------------------------------------------------
// Parameter keywords
// ---------------------------------------------------------------------------

/// Keyword → parameter rules. Matching is case-insensitive substring
/// containment; the result order is the order of first occurrence in the
/// text, not the order of this table.
static PARAMETER_RULES: &[(&str, Parameter)] = &[
    ("temperature", Parameter::Temperature),
    ("salinity", Parameter::Salinity),
    ("pressure", Parameter::Pressure),
];

/// Collects every requested parameter, in scan order. A question naming
/// none of the known keywords defaults to temperature.
pub fn extract_parameters(text: &str) -> Vec<Parameter> {
    let lowered = text.to_lowercase();
    let mut hits: Vec<(usize, Parameter)> = PARAMETER_RULES
        .iter()
        .filter_map(|&(keyword, parameter)| lowered.find(keyword).map(|pos| (pos, parameter)))
        .collect();
    hits.sort_by_key(|&(pos, _)| pos);

    let parameters: Vec<Parameter> = hits.into_iter().map(|(_, p)| p).collect();
    if parameters.is_empty() {
        vec![Parameter::Temperature]
    } else {
        parameters
    }
}

// ---------------------------------------------------------------------------
// Depth token
// ---------------------------------------------------------------------------

/// Finds the first decimal number followed by optional whitespace and the
/// letter `m` as a word ("100m", "250 m"). Later depth tokens are
/// ignored; no token means the surface (0).
///
/// The trailing word boundary keeps unit lookalikes ("100ml", "100mg")
/// from reading as depths.
pub fn extract_depth(text: &str) -> f64 {
    let re = Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*m\b").unwrap();
    re.captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Reference time
// ---------------------------------------------------------------------------

enum TimeEffect {
    /// A fixed offset into the past.
    OffsetMinutes(i64),
    /// The current instant.
    Now,
    /// "<N> <unit> ago", computed from the captured quantity.
    QuantityAgo,
    /// An explicit date fragment handed to the date parser.
    AbsoluteDate,
}

struct TimeRule {
    /// Matched against the lowercased text.
    pattern: &'static str,
    effect: TimeEffect,
}

/// Time rules in precedence order. Specific phrases come before the
/// generic ones that they contain ("day before yesterday" above
/// "yesterday"), and relative phrases, which are inherently about the
/// past, come before absolute dates.
static TIME_RULES: &[TimeRule] = &[
    TimeRule {
        pattern: r"\bday before yesterday\b",
        effect: TimeEffect::OffsetMinutes(2 * 24 * 60),
    },
    TimeRule {
        pattern: r"\byesterday\b",
        effect: TimeEffect::OffsetMinutes(24 * 60),
    },
    TimeRule {
        pattern: r"\blast week\b",
        effect: TimeEffect::OffsetMinutes(7 * 24 * 60),
    },
    TimeRule {
        pattern: r"\blast month\b",
        effect: TimeEffect::OffsetMinutes(30 * 24 * 60),
    },
    TimeRule {
        pattern: r"\blast year\b",
        effect: TimeEffect::OffsetMinutes(365 * 24 * 60),
    },
    TimeRule {
        pattern: r"\b(\d+)\s*(minute|min|hour|hr|day|week)s?\s+ago\b",
        effect: TimeEffect::QuantityAgo,
    },
    TimeRule {
        pattern: r"\b(?:right now|just now|today|currently|now)\b",
        effect: TimeEffect::Now,
    },
    TimeRule {
        pattern: r"\b\d{4}-\d{1,2}-\d{1,2}\b",
        effect: TimeEffect::AbsoluteDate,
    },
    TimeRule {
        pattern: r"\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)\s+\d{1,2},?\s+\d{4}\b",
        effect: TimeEffect::AbsoluteDate,
    },
    TimeRule {
        pattern: r"\b\d{1,2}/\d{1,2}/\d{4}\b",
        effect: TimeEffect::AbsoluteDate,
    },
];

/// Best-effort reference time extraction.
///
/// Walks the rule table in order and returns the first candidate that is
/// plausible and not in the future; the dataset holds past measurements,
/// so a future reference time can never be meant literally. When nothing
/// matches, the default is `now - default_offset` (configurable, ten
/// minutes unless overridden).
pub fn reference_time_at(
    text: &str,
    now: DateTime<Utc>,
    default_offset: Duration,
) -> DateTime<Utc> {
    let lowered = text.to_lowercase();
    for rule in TIME_RULES {
        let re = Regex::new(rule.pattern).unwrap();
        let Some(caps) = re.captures(&lowered) else {
            continue;
        };
        let candidate = match rule.effect {
            TimeEffect::OffsetMinutes(minutes) => Some(now - Duration::minutes(minutes)),
            TimeEffect::Now => Some(now),
            TimeEffect::QuantityAgo => quantity_ago(&caps, now),
            TimeEffect::AbsoluteDate => caps.get(0).and_then(|m| parse_date_fragment(m.as_str())),
        };
        if let Some(ts) = candidate {
            if plausible_year(ts) && ts <= now {
                return ts;
            }
        }
    }
    now - default_offset
}

/// Wall-clock convenience wrapper. Use `reference_time_at` in tests.
pub fn reference_time(text: &str, default_offset: Duration) -> DateTime<Utc> {
    reference_time_at(text, Utc::now(), default_offset)
}

fn quantity_ago(caps: &regex::Captures<'_>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let amount: i64 = caps[1].parse().ok()?;
    let delta = match &caps[2] {
        "minute" | "min" => Duration::minutes(amount),
        "hour" | "hr" => Duration::hours(amount),
        "day" => Duration::days(amount),
        "week" => Duration::weeks(amount),
        _ => return None,
    };
    Some(now - delta)
}

fn parse_date_fragment(fragment: &str) -> Option<DateTime<Utc>> {
    dateparser::parse(fragment).ok()
}

fn plausible_year(ts: DateTime<Utc>) -> bool {
    (1900..=2100).contains(&ts.year())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// A fixed "now" used across all tests: 2024-05-01 13:00:00 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn ten_minutes() -> Duration {
        Duration::minutes(10)
    }

    // --- Parameters ---------------------------------------------------------

    #[test]
    fn test_single_parameter_keyword() {
        assert_eq!(
            extract_parameters("what is the salinity near kochi"),
            vec![Parameter::Salinity]
        );
    }

    #[test]
    fn test_parameters_collected_in_scan_order() {
        // "pressure" appears before "temperature" in the text, so it must
        // come first regardless of the rule table's order.
        assert_eq!(
            extract_parameters("pressure and temperature at 200m"),
            vec![Parameter::Pressure, Parameter::Temperature]
        );
    }

    #[test]
    fn test_all_three_parameters_at_once() {
        assert_eq!(
            extract_parameters("temperature, salinity and pressure please"),
            vec![Parameter::Temperature, Parameter::Salinity, Parameter::Pressure]
        );
    }

    #[test]
    fn test_parameter_matching_is_case_insensitive() {
        assert_eq!(
            extract_parameters("Sea PRESSURE at depth"),
            vec![Parameter::Pressure]
        );
    }

    #[test]
    fn test_no_keyword_defaults_to_temperature() {
        assert_eq!(
            extract_parameters("how warm is the water at goa beach"),
            vec![Parameter::Temperature]
        );
    }

    // --- Depth --------------------------------------------------------------

    #[test]
    fn test_depth_token_without_space() {
        assert_eq!(extract_depth("temperature at 250m"), 250.0);
    }

    #[test]
    fn test_depth_token_with_space() {
        assert_eq!(extract_depth("temperature at 250 m"), 250.0);
    }

    #[test]
    fn test_decimal_depth_token() {
        assert_eq!(extract_depth("salinity at 12.5m"), 12.5);
    }

    #[test]
    fn test_first_depth_token_wins() {
        assert_eq!(extract_depth("from 100m down to 500m"), 100.0);
    }

    #[test]
    fn test_no_depth_token_means_surface() {
        assert_eq!(extract_depth("temperature at goa beach"), 0.0);
    }

    #[test]
    fn test_unit_lookalikes_are_not_depths() {
        assert_eq!(extract_depth("add 100ml of sample"), 0.0);
        assert_eq!(extract_depth("100 miles offshore"), 0.0);
    }

    // --- Reference time -----------------------------------------------------

    #[test]
    fn test_yesterday_is_one_day_back() {
        let ts = reference_time_at("temperature yesterday", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now() - Duration::days(1));
    }

    #[test]
    fn test_day_before_yesterday_beats_yesterday() {
        // The longer phrase contains "yesterday"; rule order must keep it
        // from being read as one day back.
        let ts = reference_time_at("salinity day before yesterday", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now() - Duration::days(2));
    }

    #[test]
    fn test_last_week_is_seven_days_back() {
        let ts = reference_time_at("pressure last week", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now() - Duration::days(7));
    }

    #[test]
    fn test_quantity_ago_phrases() {
        let ts = reference_time_at("temperature 3 hours ago", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now() - Duration::hours(3));

        let ts = reference_time_at("salinity 45 minutes ago", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now() - Duration::minutes(45));
    }

    #[test]
    fn test_now_phrases_return_now() {
        let ts = reference_time_at("temperature right now", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now());
    }

    #[test]
    fn test_iso_date_is_parsed() {
        let ts = reference_time_at(
            "salinity near chennai on 2023-03-15",
            fixed_now(),
            ten_minutes(),
        );
        assert_eq!(ts.date_naive().to_string(), "2023-03-15");
    }

    #[test]
    fn test_month_name_date_is_parsed() {
        let ts = reference_time_at(
            "temperature on march 15, 2023 at 100m",
            fixed_now(),
            ten_minutes(),
        );
        assert_eq!(ts.date_naive().to_string(), "2023-03-15");
    }

    #[test]
    fn test_future_date_is_discarded() {
        // The dataset holds past measurements; a future date falls back to
        // the default offset.
        let ts = reference_time_at("temperature on 2099-01-01", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now() - ten_minutes());
    }

    #[test]
    fn test_no_time_phrase_uses_the_default_offset() {
        let ts = reference_time_at("temperature at goa beach", fixed_now(), ten_minutes());
        assert_eq!(ts, fixed_now() - Duration::minutes(10));

        let ts = reference_time_at("temperature at goa beach", fixed_now(), Duration::minutes(30));
        assert_eq!(ts, fixed_now() - Duration::minutes(30));
    }

    // --- Combined -----------------------------------------------------------

    #[test]
    fn test_extract_at_combines_all_three_concerns() {
        let partial = extract_at(
            "salinity and temperature at 100m yesterday",
            fixed_now(),
            ten_minutes(),
        );
        assert_eq!(
            partial.parameters,
            vec![Parameter::Salinity, Parameter::Temperature]
        );
        assert_eq!(partial.depth, 100.0);
        assert_eq!(partial.reference_time, fixed_now() - Duration::days(1));
    }

    #[test]
    fn test_extraction_is_deterministic_at_a_fixed_clock() {
        let a = extract_at("temperature at 50m last week", fixed_now(), ten_minutes());
        let b = extract_at("temperature at 50m last week", fixed_now(), ten_minutes());
        assert_eq!(a, b, "extraction must be a pure function of text and clock");
    }
}
