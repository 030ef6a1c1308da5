//! xmlshare - Shared parsed XML documents with typed result arrays
//!
//! Components:
//! - `resource`: reference-counted document handle (`SharedDocument`)
//! - `dom`: arena tree built from `quick-xml` events, plus a subtree writer
//! - `reader`: path and stream sources, read to completion before parsing
//! - `array`: value-semantic numeric container for query results
//! - `query`: share-holding readers and parallel value extraction
//!
//! ```
//! use std::sync::Arc;
//! use xmlshare::{ArrayRequest, DocumentReader, ParseOptions, SharedDocument, TypedArray};
//!
//! let doc = SharedDocument::from_bytes(b"<r><v>3</v><v>4</v></r>", ParseOptions::default())?;
//! let reader = DocumentReader::new(Arc::new(doc));
//! let values: TypedArray<f64> = reader.extract(&ArrayRequest::text("v", "v"))?;
//! assert_eq!(values.norm2()?, 25.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod array;
pub mod config;
pub mod dom;
pub mod error;
pub mod query;
pub mod reader;
pub mod resource;

pub use array::{concat, TypedArray};
pub use config::ParseOptions;
pub use dom::{NodeId, XmlTree};
pub use error::{ArrayError, DocumentError, ParseError, QueryError};
pub use query::{ArrayRequest, DocumentReader, ValueSource};
pub use reader::DocumentSource;
pub use resource::{ShareCount, SharedDocument, TreeHandle};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
