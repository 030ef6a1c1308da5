//! Source Module
//!
//! Resolves a path or stream into the complete byte buffer handed to the parser.

pub mod source;

pub use source::{read_all, DocumentSource};
