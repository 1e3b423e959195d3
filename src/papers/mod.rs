// Paper records on disk and in memory.
//
// Collected papers are written as one columnar JSON table per
// (conference, year) and read back into a Corpus for analysis.

pub mod loader;
pub mod models;
pub mod store;
