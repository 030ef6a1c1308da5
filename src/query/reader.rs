//! Share-holding reader and value extraction

use crate::array::TypedArray;
use crate::dom::{to_xml_string, NodeId, XmlTree};
use crate::error::QueryError;
use crate::resource::{SharedDocument, TreeHandle};
use std::io;
use std::str::FromStr;
use std::sync::Arc;

/// Where the value of a selected element is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Concatenated text of the element
    Text,
    /// Value of the named attribute
    Attribute(String),
}

/// A named run of same-named elements under the root, read as one array.
#[derive(Debug, Clone)]
pub struct ArrayRequest {
    pub key: String,
    pub element: String,
    pub source: ValueSource,
}

impl ArrayRequest {
    pub fn text(key: impl Into<String>, element: impl Into<String>) -> Self {
        ArrayRequest {
            key: key.into(),
            element: element.into(),
            source: ValueSource::Text,
        }
    }

    pub fn attribute(
        key: impl Into<String>,
        element: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        ArrayRequest {
            key: key.into(),
            element: element.into(),
            source: ValueSource::Attribute(attribute.into()),
        }
    }
}

/// Query object bound to a shared document.
///
/// Construction acquires a share and drop releases it, so the document's
/// count always equals the number of live readers. Cloning acquires a
/// fresh share.
pub struct DocumentReader {
    document: Arc<SharedDocument>,
    tree: TreeHandle,
}

impl DocumentReader {
    pub fn new(document: Arc<SharedDocument>) -> Self {
        document.acquire();
        let tree = document.handle();
        DocumentReader { document, tree }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// The document's root element
    pub fn root(&self) -> NodeId {
        self.tree.root_element_id()
    }

    /// Element children of `node` whose qualified name is `name`
    pub fn children_named<'a>(
        &'a self,
        node: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.tree
            .children(node)
            .filter(move |&child| self.tree.node_name(child) == Some(name) && self.is_element(child))
    }

    /// Element descendants of `node` named `name`, in document order
    pub fn descendants_named<'a>(
        &'a self,
        node: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.tree
            .descendants(node)
            .filter(move |&d| self.tree.node_name(d) == Some(name) && self.is_element(d))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(node, name)
    }

    pub fn text(&self, node: NodeId) -> String {
        self.tree.string_value(node)
    }

    /// Parse one value per node into a new array.
    ///
    /// Values are trimmed before conversion. The array has exactly
    /// `nodes.len()` elements, in the order given.
    pub fn values<T>(&self, nodes: &[NodeId], source: &ValueSource) -> Result<TypedArray<T>, QueryError>
    where
        T: FromStr + Default,
    {
        let mut out = TypedArray::with_len(nodes.len())?;
        for (slot, &node) in out.as_mut_slice().iter_mut().zip(nodes) {
            let raw = match source {
                ValueSource::Text => self.text(node),
                ValueSource::Attribute(name) => self
                    .attribute(node, name)
                    .ok_or_else(|| QueryError::MissingAttribute {
                        name: name.clone(),
                        node,
                    })?
                    .to_string(),
            };
            *slot = raw.trim().parse().map_err(|_| QueryError::Conversion {
                value: raw.clone(),
                node,
            })?;
        }
        Ok(out)
    }

    /// Select every descendant of the root named by `request` and read its values.
    pub fn extract<T>(&self, request: &ArrayRequest) -> Result<TypedArray<T>, QueryError>
    where
        T: FromStr + Default,
    {
        let nodes: Vec<NodeId> = self.descendants_named(self.root(), &request.element).collect();
        tracing::debug!(key = %request.key, matched = nodes.len(), "extracting array");
        self.values(&nodes, &request.source)
    }

    /// Serialize a subtree using the document's output options
    pub fn to_xml(&self, node: NodeId) -> io::Result<String> {
        to_xml_string(&self.tree, node, self.document.options())
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.tree.get_node(id).is_some_and(|n| n.is_element())
    }
}

impl Clone for DocumentReader {
    fn clone(&self) -> Self {
        DocumentReader::new(Arc::clone(&self.document))
    }
}

impl Drop for DocumentReader {
    fn drop(&mut self) {
        if let Err(err) = self.document.release() {
            tracing::error!(%err, "reader released a share it did not hold");
        }
    }
}
