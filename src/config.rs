//! Per-document parse and output options
//!
//! Each document carries its own copy; nothing here is process-wide.

/// Options applied when a document is parsed and when its nodes are written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep whitespace-only text nodes in the tree.
    pub preserve_whitespace: bool,
    /// Indent nested elements when serializing node selections.
    pub indent_output: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        ParseOptions {
            preserve_whitespace: false,
            indent_output: true,
        }
    }

    pub fn with_preserve_whitespace(mut self, preserve: bool) -> Self {
        self.preserve_whitespace = preserve;
        self
    }

    pub fn with_indent_output(mut self, indent: bool) -> Self {
        self.indent_output = indent;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
