// papermap: collect conference paper metadata and map it as a labeled
// 2-D landscape.
//
// This is the library root. Each module corresponds to one stage: fetch
// papers, store them, extract keywords, embed, and draw the map.

pub mod collect;
pub mod config;
pub mod embedding;
pub mod error;
pub mod output;
pub mod papers;
pub mod pipeline;
pub mod status;
pub mod topics;
pub mod visualize;
