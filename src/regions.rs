/// Region keyword registry for the ocean query service.
///
/// Defines the curated short phrases (named seas, coasts, beaches) that map
/// directly to fixed coordinates. The registry is the FIRST stage of
/// location resolution: it is checked by substring containment before any
/// fuzzy gazetteer matching runs, so a phrase listed here always wins over
/// a fuzzy candidate.
///
/// Ordering matters: entries are listed most-specific-first, so that a
/// generic basin name ("arabian sea") can never shadow a specific coastal
/// phrase ("goa beach") appearing in the same query. Keep beaches and
/// straits above seas, and seas above oceans, when adding entries.

use crate::model::Coordinates;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// One curated region: a match phrase and its fixed coordinates.
pub struct Region {
    /// Lowercase phrase matched against the lowercased query text.
    pub phrase: &'static str,
    /// Human-readable name used in answers and logs.
    pub name: &'static str,
    /// Representative WGS84 latitude.
    pub latitude: f64,
    /// Representative WGS84 longitude.
    pub longitude: f64,
}

impl Region {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// All curated regions, most-specific-first.
///
/// Coordinates are representative points, not centroids; for coastal
/// phrases they sit just offshore where measurements plausibly exist.
pub static REGION_REGISTRY: &[Region] = &[
    // Beaches and local coastal phrases
    Region {
        phrase: "goa beach",
        name: "Goa Beach",
        latitude: 15.4,
        longitude: 73.8,
    },
    Region {
        phrase: "marina beach",
        name: "Marina Beach, Chennai",
        latitude: 13.05,
        longitude: 80.29,
    },
    Region {
        phrase: "juhu beach",
        name: "Juhu Beach, Mumbai",
        latitude: 19.1,
        longitude: 72.8,
    },
    Region {
        phrase: "kovalam beach",
        name: "Kovalam Beach, Kerala",
        latitude: 8.4,
        longitude: 76.97,
    },
    Region {
        phrase: "radhanagar beach",
        name: "Radhanagar Beach, Havelock Island",
        latitude: 11.98,
        longitude: 92.95,
    },
    Region {
        phrase: "chennai coast",
        name: "Chennai Coast",
        latitude: 13.08,
        longitude: 80.35,
    },
    Region {
        phrase: "mumbai coast",
        name: "Mumbai Coast",
        latitude: 18.9,
        longitude: 72.7,
    },
    Region {
        phrase: "kochi coast",
        name: "Kochi Coast",
        latitude: 9.95,
        longitude: 76.2,
    },
    // Gulfs and straits
    Region {
        phrase: "gulf of mannar",
        name: "Gulf of Mannar",
        latitude: 8.8,
        longitude: 79.0,
    },
    Region {
        phrase: "gulf of kutch",
        name: "Gulf of Kutch",
        latitude: 22.6,
        longitude: 69.3,
    },
    Region {
        phrase: "palk strait",
        name: "Palk Strait",
        latitude: 10.0,
        longitude: 79.7,
    },
    // Seas
    Region {
        phrase: "lakshadweep sea",
        name: "Lakshadweep Sea",
        latitude: 10.0,
        longitude: 72.5,
    },
    Region {
        phrase: "andaman sea",
        name: "Andaman Sea",
        latitude: 10.5,
        longitude: 95.0,
    },
    Region {
        phrase: "bay of bengal",
        name: "Bay of Bengal",
        latitude: 15.0,
        longitude: 88.0,
    },
    Region {
        phrase: "arabian sea",
        name: "Arabian Sea",
        latitude: 15.0,
        longitude: 64.0,
    },
    // Oceans (most generic, always last)
    Region {
        phrase: "indian ocean",
        name: "Indian Ocean",
        latitude: -10.0,
        longitude: 75.0,
    },
];

/// Finds the first registry entry whose phrase occurs in the text.
///
/// Matching is case-insensitive substring containment; registry order is
/// the precedence order, so the most specific hit wins.
pub fn find_region(text: &str) -> Option<&'static Region> {
    let lowered = text.to_lowercase();
    REGION_REGISTRY.iter().find(|r| lowered.contains(r.phrase))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
