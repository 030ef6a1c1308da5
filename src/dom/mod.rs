//! DOM Module - Arena-based XML Tree
//!
//! Implements an immutable DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names, values and character data
//!
//! Tokenizing is delegated to `quick-xml`; this module only assembles the
//! event stream into a tree and writes subtrees back out. General entities
//! declared in the internal DTD subset are expanded while building.

pub mod document;
mod entities;
pub mod node;
pub mod strings;
pub mod writer;

pub use document::{ChildIter, DescendantIter, XmlTree};
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
pub use writer::{to_xml_string, write_node};
