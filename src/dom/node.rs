//! XML Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Parent node (None for document root)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Pool ID of the element name or PI target, 0 otherwise
    pub name_id: u32,
    /// Pool ID of text, CDATA, comment or PI data, 0 otherwise
    pub value_id: u32,
    /// Start of attributes in attribute arena (for elements)
    pub attr_start: u32,
    pub attr_count: u16,
    /// Depth in document tree
    pub depth: u16,
}

impl XmlNode {
    fn blank(kind: NodeKind, parent: Option<NodeId>, depth: u16) -> Self {
        XmlNode {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id: 0,
            value_id: 0,
            attr_start: 0,
            attr_count: 0,
            depth,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::blank(NodeKind::Document, None, 0)
    }

    pub fn element(name_id: u32, parent: NodeId, depth: u16) -> Self {
        let mut node = Self::blank(NodeKind::Element, Some(parent), depth);
        node.name_id = name_id;
        node
    }

    /// Create a character-data node (text, CDATA or comment)
    pub fn character_data(kind: NodeKind, value_id: u32, parent: NodeId, depth: u16) -> Self {
        debug_assert!(matches!(kind, NodeKind::Text | NodeKind::CData | NodeKind::Comment));
        let mut node = Self::blank(kind, Some(parent), depth);
        node.value_id = value_id;
        node
    }

    pub fn processing_instruction(target_id: u32, data_id: u32, parent: NodeId, depth: u16) -> Self {
        let mut node = Self::blank(NodeKind::ProcessingInstruction, Some(parent), depth);
        node.name_id = target_id;
        node.value_id = data_id;
        node
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Text or CDATA, the nodes that contribute to a string value
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::CData)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Stored attribute
#[derive(Debug, Clone, Copy)]
pub struct XmlAttribute {
    pub name_id: u32,
    pub value_id: u32,
}

impl XmlAttribute {
    pub fn new(name_id: u32, value_id: u32) -> Self {
        XmlAttribute { name_id, value_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let doc = XmlNode::document();
        assert_eq!(doc.kind, NodeKind::Document);
        assert!(doc.parent.is_none());
        assert_eq!(doc.depth, 0);
    }

    #[test]
    fn test_element_node() {
        let elem = XmlNode::element(1, 0, 1);
        assert!(elem.is_element());
        assert_eq!(elem.parent, Some(0));
        assert_eq!(elem.name_id, 1);
        assert!(!elem.has_children());
    }

    #[test]
    fn test_character_data() {
        let text = XmlNode::character_data(NodeKind::CData, 7, 2, 3);
        assert!(text.is_text());
        assert_eq!(text.value_id, 7);
        assert_eq!(text.name_id, 0);

        let comment = XmlNode::character_data(NodeKind::Comment, 8, 2, 3);
        assert!(!comment.is_text());
    }
}
