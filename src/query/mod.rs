//! Query objects over a shared document
//!
//! A [`DocumentReader`] holds one share of a [`crate::SharedDocument`] for as
//! long as it lives. Navigation is by element name only; there is no path
//! language.

pub mod parallel;
pub mod reader;

pub use parallel::{extract_map, extract_parallel};
pub use reader::{ArrayRequest, DocumentReader, ValueSource};
