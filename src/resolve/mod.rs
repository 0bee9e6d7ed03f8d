/// Query resolution pipeline for the ocean measurement service.
///
/// Turns free text (or an explicit position) into a concrete record
/// lookup. Both entry paths converge on the same intermediate shape, so
/// the submodules compose in a fixed order:
///
/// - `extract`: parameters, depth, and reference time from free text.
/// - `locate`: region keywords, then fuzzy gazetteer matching.
/// - `nearest`: table lookup, nearest-by-distance or exact-with-fallback.

pub mod extract;
pub mod locate;
pub mod nearest;
