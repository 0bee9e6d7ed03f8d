/// Location resolution from free-text questions.
///
/// Two stages in fixed precedence order: the curated region registry is
/// checked first (substring containment, most-specific-first), then the
/// gazetteer is fuzzy-matched with a partial-ratio scorer. Returning
/// `None` is a valid outcome, not an error; the orchestrator answers an
/// unresolvable location conversationally.

use crate::model::{Coordinates, Gazetteer};
use crate::regions;

/// Minimum partial-ratio score (0–100) a gazetteer candidate needs to be
/// accepted. Overridable through `ServiceConfig`.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 75.0;

// ---------------------------------------------------------------------------
// Partial-ratio scorer
// ---------------------------------------------------------------------------

/// Partial-ratio similarity on a 0–100 scale, case-insensitive.
///
/// The shorter string is slid over every same-length character window of
/// the longer one; the score is the best normalized Levenshtein
/// similarity among the windows. This lets a short place name ("goa")
/// score 100 against a whole question that merely contains it.
///
/// An empty string never matches anything (score 0).
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let (needle, haystack) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let needle_len = needle.chars().count();
    if needle_len == 0 {
        return 0.0;
    }

    let haystack_chars: Vec<char> = haystack.chars().collect();
    let mut best = 0.0_f64;
    for start in 0..=(haystack_chars.len() - needle_len) {
        let window: String = haystack_chars[start..start + needle_len].iter().collect();
        let score = strsim::normalized_levenshtein(&needle, &window) * 100.0;
        if score > best {
            best = score;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolves free text to coordinates, or `None` when neither a region
/// keyword nor a sufficiently similar gazetteer name is found.
///
/// Gazetteer ties are broken by input order: only a strictly better score
/// displaces the current candidate, so the first entry wins and repeated
/// calls with an unchanged gazetteer return the same result.
pub fn resolve(text: &str, gazetteer: &Gazetteer, threshold: f64) -> Option<Coordinates> {
    if let Some(region) = regions::find_region(text) {
        return Some(region.coordinates());
    }

    let mut best: Option<(f64, Coordinates)> = None;
    for entry in gazetteer.entries() {
        let score = partial_ratio(text, &entry.name);
        let is_better = match &best {
            Some((best_score, _)) => score > *best_score,
            None => true,
        };
        if is_better {
            best = Some((
                score,
                Coordinates {
                    latitude: entry.latitude,
                    longitude: entry.longitude,
                },
            ));
        }
    }

    match best {
        Some((score, coordinates)) if score >= threshold => Some(coordinates),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
