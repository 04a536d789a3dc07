//! Core trait abstractions for the extraction library.
//!
//! Applications implement these to plug in search and reasoning providers.

pub mod extractor;
pub mod searcher;
