//! Node serialization
//!
//! Writes a node and its subtree back out as markup, for dumping query
//! selections. Layout follows the owning document's `indent_output` option.

use super::document::XmlTree;
use super::node::{NodeId, NodeKind};
use crate::config::ParseOptions;
use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, Write};

const INDENT_WIDTH: usize = 2;

/// Serialize `id` and everything below it into `out`
pub fn write_node<W: Write>(
    tree: &XmlTree,
    id: NodeId,
    options: &ParseOptions,
    out: W,
) -> io::Result<()> {
    let mut writer = if options.indent_output {
        Writer::new_with_indent(out, b' ', INDENT_WIDTH)
    } else {
        Writer::new(out)
    };
    write_subtree(tree, id, &mut writer)
}

pub fn to_xml_string(tree: &XmlTree, id: NodeId, options: &ParseOptions) -> io::Result<String> {
    let mut buf = Vec::new();
    write_node(tree, id, options, &mut buf)?;
    String::from_utf8(buf).map_err(io::Error::other)
}

fn write_subtree<W: Write>(tree: &XmlTree, id: NodeId, writer: &mut Writer<W>) -> io::Result<()> {
    let Some(node) = tree.get_node(id) else {
        return Ok(());
    };
    let text = tree.text_content(id).unwrap_or_default();

    match node.kind {
        NodeKind::Document => {
            for child in tree.children(id) {
                write_subtree(tree, child, writer)?;
            }
        }
        NodeKind::Element => {
            let name = tree.node_name(id).unwrap_or_default();
            let mut start = BytesStart::new(name);
            for (key, value) in tree.get_attribute_values(id) {
                start.push_attribute((key, value));
            }
            if node.has_children() {
                emit(writer, Event::Start(start))?;
                for child in tree.children(id) {
                    write_subtree(tree, child, writer)?;
                }
                emit(writer, Event::End(BytesEnd::new(name)))?;
            } else {
                emit(writer, Event::Empty(start))?;
            }
        }
        NodeKind::Text => emit(writer, Event::Text(BytesText::new(text)))?,
        NodeKind::CData => emit(writer, Event::CData(BytesCData::new(text)))?,
        NodeKind::Comment => emit(writer, Event::Comment(BytesText::from_escaped(text)))?,
        NodeKind::ProcessingInstruction => {
            let target = tree.node_name(id).unwrap_or_default();
            let content = if text.is_empty() {
                target.to_string()
            } else {
                format!("{target} {text}")
            };
            emit(writer, Event::PI(BytesPI::new(content)))?;
        }
    }
    Ok(())
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> io::Result<()> {
    writer.write_event(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(input: &str) -> XmlTree {
        XmlTree::parse(input.as_bytes(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_flat_output() {
        let tree = tree(r#"<root id="r"><a>1 &amp; 2</a><b/></root>"#);
        let opts = ParseOptions::new().with_indent_output(false);
        let out = to_xml_string(&tree, tree.root_element_id(), &opts).unwrap();
        assert_eq!(out, r#"<root id="r"><a>1 &amp; 2</a><b/></root>"#);
    }

    #[test]
    fn test_indented_output() {
        let tree = tree("<root><a>1</a></root>");
        let out = to_xml_string(&tree, tree.root_element_id(), &ParseOptions::default()).unwrap();
        assert!(out.contains("\n  <a>1</a>"), "{out}");
        assert!(out.ends_with("\n</root>"), "{out}");
    }

    #[test]
    fn test_selection_only() {
        let tree = tree("<root><a><x/></a><b/></root>");
        let a = tree.children(tree.root_element_id()).next().unwrap();
        let opts = ParseOptions::new().with_indent_output(false);
        assert_eq!(to_xml_string(&tree, a, &opts).unwrap(), "<a><x/></a>");
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_kind_kept() {
        let tree = tree("<root><a/></root>");
        let err = write_node(&tree, tree.root_element_id(), &ParseOptions::default(), Closed)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_other_kinds() {
        let tree = tree("<root><!--c--><![CDATA[<raw>]]><?pi data?></root>");
        let opts = ParseOptions::new().with_indent_output(false);
        let out = to_xml_string(&tree, tree.root_element_id(), &opts).unwrap();
        assert_eq!(out, "<root><!--c--><![CDATA[<raw>]]><?pi data?></root>");
    }
}
