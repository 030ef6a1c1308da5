//! Shared Document Resource
//!
//! A parsed tree shared by independent query objects. The tree itself is
//! held through an `Arc`, so it stays alive until the last handle goes away
//! even if the document is dropped first. The share count tracks how many
//! query objects are currently working on the document.

use crate::config::ParseOptions;
use crate::dom::XmlTree;
use crate::error::{DocumentError, ParseError};
use crate::reader::{read_all, DocumentSource};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared, read-only handle to a parsed tree
pub type TreeHandle = Arc<XmlTree>;

/// Atomic share counter that refuses to go below zero
#[derive(Debug, Default)]
pub struct ShareCount(AtomicUsize);

impl ShareCount {
    pub fn new() -> Self {
        ShareCount(AtomicUsize::new(0))
    }

    /// Add one share, returning the new count
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Remove one share, returning the new count.
    ///
    /// The zero check and the decrement happen in one step, so concurrent
    /// callers can never drive the count negative.
    pub fn decrement(&self) -> Result<usize, DocumentError> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|previous| previous - 1)
            .map_err(|_| DocumentError::ShareUnderflow)
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// A parsed document plus the bookkeeping for the query objects using it
#[derive(Debug)]
pub struct SharedDocument {
    tree: TreeHandle,
    shares: ShareCount,
    options: ParseOptions,
}

impl SharedDocument {
    /// Read and parse a document from any source.
    ///
    /// Nothing is retained on failure.
    pub fn from_source(source: DocumentSource<'_>, options: ParseOptions) -> Result<Self, DocumentError> {
        let kind = source.kind();
        let bytes = source.read_all()?;
        Self::build(&bytes, options, kind)
    }

    pub fn from_path(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self, DocumentError> {
        Self::from_source(DocumentSource::path(path.as_ref()), options)
    }

    /// Parse an open stream, draining it to EOF first.
    ///
    /// The stream may be borrowed (`&mut File`, a stdin lock); it is not
    /// kept after this returns.
    pub fn from_reader<R: Read>(reader: R, options: ParseOptions) -> Result<Self, DocumentError> {
        let bytes = read_all(reader).map_err(ParseError::Stream)?;
        Self::build(&bytes, options, "stream")
    }

    pub fn from_bytes(bytes: &[u8], options: ParseOptions) -> Result<Self, DocumentError> {
        Self::build(bytes, options, "bytes")
    }

    fn build(bytes: &[u8], options: ParseOptions, kind: &'static str) -> Result<Self, DocumentError> {
        let tree = XmlTree::parse(bytes, &options)?;
        tracing::debug!(
            source = kind,
            bytes = bytes.len(),
            nodes = tree.node_count(),
            "document parsed"
        );
        Ok(SharedDocument {
            tree: Arc::new(tree),
            shares: ShareCount::new(),
            options,
        })
    }

    /// Register one more query object. Never fails.
    pub fn acquire(&self) -> usize {
        let count = self.shares.increment();
        tracing::debug!(count, "share count increased");
        count
    }

    /// Drop one query object's share.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ShareUnderflow`] when the count is already
    /// zero; the count is left untouched.
    pub fn release(&self) -> Result<usize, DocumentError> {
        let count = self.shares.decrement()?;
        tracing::debug!(count, "share count decreased");
        Ok(count)
    }

    pub fn share_count(&self) -> usize {
        self.shares.get()
    }

    /// Shared handle to the parsed tree. The tree is never mutated.
    pub fn handle(&self) -> TreeHandle {
        Arc::clone(&self.tree)
    }

    /// Borrow the tree without cloning the handle
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

impl Drop for SharedDocument {
    fn drop(&mut self) {
        let outstanding = self.shares.get();
        if outstanding > 0 {
            tracing::warn!(outstanding, "document dropped while query objects still hold shares");
        }
    }
}
