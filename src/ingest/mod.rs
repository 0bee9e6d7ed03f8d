/// Source file ingestion for the ocean query service.
///
/// The query pipeline consumes the dataset and gazetteer as already-loaded
/// in-memory tables; this module is the edge that produces them from CSV.
/// Parsing is strict and all-or-nothing: a file either loads completely
/// or yields an error, and the caller degrades to an empty table.
///
/// Submodules:
/// - `dataset`: the measurement table, with column-name normalization.
/// - `gazetteer`: the name to coordinates lookup list.

pub mod dataset;
pub mod gazetteer;
