//! Ocean measurement query service.
//!
//! Answers questions about an oceanographic measurement dataset
//! (temperature, salinity, and pressure at a given position, depth, and
//! time) through either structured parameters or freeform natural
//! language. Free text flows through term extraction and location
//! resolution to the same tuple shape as a structured request; both
//! paths converge on a nearest-match lookup over the in-memory table,
//! with an explicitly flagged fallback when no exact record exists.
//!
//! The dataset and gazetteer are loaded once at startup and injected
//! read-only into the pipeline; every query is a pure function of the
//! tables, the input, and a caller-supplied clock and random source.

pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod query;
pub mod regions;
pub mod resolve;
