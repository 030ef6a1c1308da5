//! XML Tree - Arena-based DOM representation
//!
//! The tree is built once from the `quick-xml` event stream and never
//! mutated afterwards, so a single instance can be read from any number
//! of threads through a shared handle.

use super::entities::EntityTable;
use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use super::strings::StringPool;
use crate::config::ParseOptions;
use crate::error::ParseError;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A fully owned, immutable XML document tree
#[derive(Debug)]
pub struct XmlTree {
    nodes: Vec<XmlNode>,
    attributes: Vec<XmlAttribute>,
    strings: StringPool,
    root_element: NodeId,
}

impl XmlTree {
    /// Parse a complete document.
    ///
    /// Fails on anything the event reader rejects and on documents that are
    /// not well-formed as a whole: unclosed elements, no root element, more
    /// than one root element, or character data outside the root.
    pub fn parse(input: &[u8], options: &ParseOptions) -> Result<Self, ParseError> {
        let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
        let mut reader = Reader::from_reader(input);
        let mut builder = TreeBuilder::new(options.preserve_whitespace);

        loop {
            let position = reader.buffer_position() as u64;
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => return Err(ParseError::syntax(reader.buffer_position() as u64, err)),
            };

            match event {
                Event::Start(elem) => builder.open(&elem, position)?,
                Event::Empty(elem) => {
                    builder.open(&elem, position)?;
                    builder.close()?;
                }
                Event::End(_) => builder.close()?,
                Event::Text(text) => {
                    let raw = utf8(&text, position)?;
                    let value = unescape_with(raw, |name| builder.entities.lookup(name))
                        .map_err(|err| ParseError::syntax(position, err))?;
                    builder.pending_text.push_str(&value);
                }
                Event::GeneralRef(reference) => {
                    let name = utf8(&reference, position)?;
                    builder.entities.resolve(name, &mut builder.pending_text)?;
                }
                Event::CData(data) => {
                    let value = utf8(&data, position)?;
                    builder.character_data(NodeKind::CData, value)?;
                }
                Event::Comment(comment) => {
                    let value = utf8(&comment, position)?;
                    builder.character_data(NodeKind::Comment, value)?;
                }
                Event::PI(pi) => {
                    let target = utf8(pi.target(), position)?;
                    let data = utf8(pi.content(), position)?;
                    builder.processing_instruction(target, data.trim_start())?;
                }
                Event::DocType(doctype) => {
                    let body = utf8(&doctype, position)?;
                    builder.entities = EntityTable::from_doctype(body)?;
                    tracing::debug!(entities = builder.entities.len(), "internal subset read");
                }
                Event::Eof => break,
                // XML declaration carries nothing the tree keeps
                _ => {}
            }
        }

        builder.finish()
    }

    pub fn root_element_id(&self) -> NodeId {
        self.root_element
    }

    pub fn root_name(&self) -> Option<&str> {
        self.node_name(self.root_element)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Element name or PI target
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Element | NodeKind::ProcessingInstruction => self.strings.get(node.name_id),
            _ => None,
        }
    }

    /// Get node local name (without prefix)
    pub fn node_local_name(&self, id: NodeId) -> Option<&str> {
        let name = self.node_name(id)?;
        Some(name.split_once(':').map_or(name, |(_, local)| local))
    }

    /// Character data of a text, CDATA, comment or PI node
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Document | NodeKind::Element => None,
            _ => self.strings.get(node.value_id),
        }
    }

    /// Concatenated text and CDATA of a node and its descendants
    pub fn string_value(&self, id: NodeId) -> String {
        let Some(node) = self.get_node(id) else {
            return String::new();
        };
        match node.kind {
            NodeKind::Document | NodeKind::Element => self
                .descendants(id)
                .filter(|&d| self.get_node(d).is_some_and(XmlNode::is_text))
                .filter_map(|d| self.text_content(d))
                .collect(),
            _ => self.text_content(id).unwrap_or_default().to_string(),
        }
    }

    /// Get attributes for an element
    pub fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        let Some(node) = self.get_node(id) else {
            return &[];
        };
        let start = node.attr_start as usize;
        let end = start + node.attr_count as usize;
        self.attributes.get(start..end).unwrap_or(&[])
    }

    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.attributes(node_id)
            .iter()
            .find(|attr| self.strings.get(attr.name_id) == Some(name))
            .and_then(|attr| self.strings.get(attr.value_id))
    }

    /// Get all attribute names and values for a node, in document order
    pub fn get_attribute_values(&self, node_id: NodeId) -> Vec<(&str, &str)> {
        self.attributes(node_id)
            .iter()
            .filter_map(|attr| {
                let name = self.strings.get(attr.name_id)?;
                let value = self.strings.get(attr.value_id)?;
                Some((name, value))
            })
            .collect()
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { tree: self, next: first }
    }

    /// Iterate over all descendants of a node (depth-first, document order)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut iter = DescendantIter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_children(id);
        iter
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Iterator over child nodes
pub struct ChildIter<'a> {
    tree: &'a XmlTree,
    next: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl DescendantIter<'_> {
    // Children go on the stack in reverse so the first child pops first
    fn push_children(&mut self, id: NodeId) {
        let mut child = self.tree.get_node(id).and_then(|n| n.last_child);
        while let Some(cid) = child {
            self.stack.push(cid);
            child = self.tree.get_node(cid).and_then(|n| n.prev_sibling);
        }
    }
}

impl Iterator for DescendantIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.push_children(current);
        Some(current)
    }
}

// =============================================================================
// Tree construction
// =============================================================================

struct TreeBuilder {
    nodes: Vec<XmlNode>,
    attributes: Vec<XmlAttribute>,
    strings: StringPool,
    root_element: Option<NodeId>,
    /// Open elements, starting with the document node
    stack: Vec<NodeId>,
    /// Adjacent text and entity references are merged before becoming a node
    pending_text: String,
    entities: EntityTable,
    preserve_whitespace: bool,
}

impl TreeBuilder {
    fn new(preserve_whitespace: bool) -> Self {
        TreeBuilder {
            nodes: vec![XmlNode::document()],
            attributes: Vec::with_capacity(128),
            strings: StringPool::new(),
            root_element: None,
            stack: vec![0],
            pending_text: String::new(),
            entities: EntityTable::default(),
            preserve_whitespace,
        }
    }

    fn parent(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(0)
    }

    fn depth(&self) -> u16 {
        self.stack.len().min(u16::MAX as usize) as u16
    }

    fn at_top_level(&self) -> bool {
        self.stack.len() == 1
    }

    fn open(&mut self, elem: &BytesStart<'_>, position: u64) -> Result<(), ParseError> {
        self.flush_text()?;

        if self.at_top_level() && self.root_element.is_some() {
            return Err(ParseError::structure("document has multiple root elements"));
        }

        let qname = elem.name();
        let name = utf8(qname.as_ref(), position)?;
        let name_id = self.strings.intern(name);
        let parent = self.parent();
        let mut node = XmlNode::element(name_id, parent, self.depth());

        node.attr_start = self.attributes.len() as u32;
        let mut seen = HashSet::new();
        for attr in elem.attributes().with_checks(false) {
            let attr = attr.map_err(|err| ParseError::syntax(position, err))?;
            let key = utf8(attr.key.as_ref(), position)?;
            let raw = utf8(&attr.value, position)?;
            let value = unescape_with(raw, |entity| self.entities.lookup(entity))
                .map_err(|err| ParseError::syntax(position, err))?;
            let attr_name_id = self.strings.intern(key);
            if !seen.insert(attr_name_id) {
                return Err(ParseError::syntax(position, format!("duplicate attribute {key:?}")));
            }
            let attr_value_id = self.strings.intern(&value);
            self.attributes.push(XmlAttribute::new(attr_name_id, attr_value_id));
        }
        node.attr_count = u16::try_from(seen.len()).map_err(|_| {
            ParseError::structure(format!("<{name}> has more than {} attributes", u16::MAX))
        })?;

        let id = self.push_node(node, parent);
        if parent == 0 {
            self.root_element = Some(id);
        }
        self.stack.push(id);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ParseError> {
        self.flush_text()?;
        if self.at_top_level() {
            return Err(ParseError::structure("end tag without matching start tag"));
        }
        self.stack.pop();
        Ok(())
    }

    fn character_data(&mut self, kind: NodeKind, value: &str) -> Result<(), ParseError> {
        self.flush_text()?;
        if kind == NodeKind::CData && self.at_top_level() {
            return Err(ParseError::structure("CDATA section not allowed at document level"));
        }
        let value_id = self.strings.intern(value);
        let parent = self.parent();
        let node = XmlNode::character_data(kind, value_id, parent, self.depth());
        self.push_node(node, parent);
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ParseError> {
        self.flush_text()?;
        let target_id = self.strings.intern(target);
        let data_id = self.strings.intern(data);
        let parent = self.parent();
        let node = XmlNode::processing_instruction(target_id, data_id, parent, self.depth());
        self.push_node(node, parent);
        Ok(())
    }

    fn flush_text(&mut self) -> Result<(), ParseError> {
        if self.pending_text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.pending_text);
        let blank = text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));

        if self.at_top_level() {
            if blank {
                return Ok(());
            }
            return Err(ParseError::structure("text content not allowed at document level"));
        }
        if blank && !self.preserve_whitespace {
            return Ok(());
        }

        let value_id = self.strings.intern(&text);
        let parent = self.parent();
        let node = XmlNode::character_data(NodeKind::Text, value_id, parent, self.depth());
        self.push_node(node, parent);
        Ok(())
    }

    fn push_node(&mut self, node: XmlNode, parent: NodeId) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_child(parent, id);
        id
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let last_child = self.nodes[parent_id as usize].last_child;
        if let Some(last_id) = last_child {
            self.nodes[child_id as usize].prev_sibling = Some(last_id);
            self.nodes[last_id as usize].next_sibling = Some(child_id);
        } else {
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    fn finish(mut self) -> Result<XmlTree, ParseError> {
        self.flush_text()?;

        if let Some(&open) = self.stack.get(1) {
            let name = self.nodes[open as usize].name_id;
            let name = self.strings.get(name).unwrap_or_default();
            return Err(ParseError::structure(format!("unclosed tag: <{name}>")));
        }
        let root_element = self
            .root_element
            .ok_or_else(|| ParseError::structure("document has no root element"))?;

        Ok(XmlTree {
            nodes: self.nodes,
            attributes: self.attributes,
            strings: self.strings,
            root_element,
        })
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|err| ParseError::syntax(position, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> XmlTree {
        XmlTree::parse(input.as_bytes(), &ParseOptions::default()).unwrap()
    }

    fn parse_err(input: &str) -> ParseError {
        XmlTree::parse(input.as_bytes(), &ParseOptions::default()).unwrap_err()
    }

    #[test]
    fn test_parse_simple() {
        let tree = parse("<root>hello</root>");
        assert_eq!(tree.root_name(), Some("root"));
        assert_eq!(tree.string_value(tree.root_element_id()), "hello");
    }

    #[test]
    fn test_parse_nested() {
        let tree = parse("<a><b><c/></b></a>");
        let root = tree.root_element_id();
        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(tree.node_name(children[0]), Some("b"));
        assert_eq!(tree.get_node(children[0]).unwrap().depth, 2);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let tree = parse("<root><a/><b><c/></b></root>");
        let names: Vec<_> = tree
            .descendants(tree.root_element_id())
            .filter_map(|id| tree.node_name(id))
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_siblings() {
        let tree = parse("<root><a/><b/><c/></root>");
        let children: Vec<_> = tree.children(tree.root_element_id()).collect();
        assert_eq!(children.len(), 3);

        let first = tree.get_node(children[0]).unwrap();
        assert!(first.prev_sibling.is_none());
        assert_eq!(first.next_sibling, Some(children[1]));
    }

    #[test]
    fn test_attributes_and_entities() {
        let tree = parse(r#"<root a="1 &amp; 2" b='x&#65;'>t &lt;&#x42;&gt;</root>"#);
        let root = tree.root_element_id();
        assert_eq!(tree.get_attribute(root, "a"), Some("1 & 2"));
        assert_eq!(tree.get_attribute(root, "b"), Some("xA"));
        assert_eq!(tree.get_attribute(root, "c"), None);
        assert_eq!(tree.get_attribute_values(root), vec![("a", "1 & 2"), ("b", "xA")]);
        // entity references merge into a single text node
        assert_eq!(tree.children(root).count(), 1);
        assert_eq!(tree.string_value(root), "t <B>");
    }

    #[test]
    fn test_local_name() {
        let tree = parse(r#"<ns:root xmlns:ns="urn:x"/>"#);
        let root = tree.root_element_id();
        assert_eq!(tree.node_name(root), Some("ns:root"));
        assert_eq!(tree.node_local_name(root), Some("root"));
    }

    #[test]
    fn test_whitespace_dropped_by_default() {
        let tree = parse("<root>\n  <a>1</a>\n  <b>2</b>\n</root>");
        assert_eq!(tree.children(tree.root_element_id()).count(), 2);
    }

    #[test]
    fn test_whitespace_preserved() {
        let opts = ParseOptions::new().with_preserve_whitespace(true);
        let tree = XmlTree::parse(b"<root>\n  <a>1</a>\n</root>", &opts).unwrap();
        assert_eq!(tree.children(tree.root_element_id()).count(), 3);
    }

    #[test]
    fn test_other_node_kinds() {
        let tree = parse("<?xml version=\"1.0\"?><!-- head --><root><![CDATA[<x>]]><?app run?></root>");
        let top: Vec<_> = tree.children(0).collect();
        assert_eq!(tree.get_node(top[0]).unwrap().kind, NodeKind::Comment);
        assert_eq!(tree.text_content(top[0]), Some(" head "));

        let root = tree.root_element_id();
        let inner: Vec<_> = tree.children(root).collect();
        assert_eq!(tree.get_node(inner[0]).unwrap().kind, NodeKind::CData);
        assert_eq!(tree.string_value(root), "<x>");
        assert_eq!(tree.node_name(inner[1]), Some("app"));
        assert_eq!(tree.text_content(inner[1]), Some("run"));
    }

    #[test]
    fn test_bom_skipped() {
        let tree = XmlTree::parse(b"\xEF\xBB\xBF<root/>", &ParseOptions::default()).unwrap();
        assert_eq!(tree.root_name(), Some("root"));
    }

    #[test]
    fn test_unclosed_rejected() {
        assert!(matches!(parse_err("<root><a>"), ParseError::Structure(_) | ParseError::Syntax { .. }));
    }

    #[test]
    fn test_mismatch_rejected() {
        parse_err("<root><a></b></root>");
    }

    #[test]
    fn test_truncated_tag_rejected() {
        parse_err("<root");
    }

    #[test]
    fn test_no_root_rejected() {
        assert!(matches!(parse_err(""), ParseError::Structure(_)));
        assert!(matches!(parse_err("<!-- only -->"), ParseError::Structure(_)));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        assert!(matches!(parse_err("<a/><b/>"), ParseError::Structure(_)));
    }

    #[test]
    fn test_text_outside_root_rejected() {
        assert!(matches!(parse_err("<a/>junk"), ParseError::Structure(_)));
    }

    #[test]
    fn test_undefined_entity_rejected() {
        assert!(matches!(parse_err("<a>&nope;</a>"), ParseError::Structure(_)));
    }

    #[test]
    fn test_internal_subset_entities() {
        let tree = parse(
            r#"<?xml version="1.0"?>
<!DOCTYPE r [
  <!ENTITY e "x">
  <!ENTITY pair "&e;&e;">
]>
<r k="&pair;">&e;-&pair;</r>"#,
        );
        let root = tree.root_element_id();
        assert_eq!(tree.string_value(root), "x-xx");
        assert_eq!(tree.get_attribute(root, "k"), Some("xx"));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        assert!(matches!(parse_err(r#"<a x="1" x="2"/>"#), ParseError::Syntax { .. }));
    }

    #[test]
    fn test_attribute_limit() {
        let at_limit: String = (0..u16::MAX).map(|i| format!(" a{i}=\"\"")).collect();
        let tree = parse(&format!("<r{at_limit}/>"));
        assert_eq!(tree.attributes(tree.root_element_id()).len(), u16::MAX as usize);

        let over = format!("<r{at_limit} extra=\"\"/>");
        assert!(matches!(parse_err(&over), ParseError::Structure(_)));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = XmlTree::parse(b"<a>\xFF\xFE</a>", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
