//! Tree serializer
//!
//! Writes a [`Node`] tree back to text. Text and comment content is emitted
//! verbatim (entities were never decoded); attribute values only escape the
//! quote character the serializer itself introduces.

use crate::node::{is_void_element, Node};

/// Serialize a node (usually a document root) to HTML text.
#[must_use]
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Document { doctype, children } => {
            if let Some(doctype) = doctype {
                out.push_str("<!");
                out.push_str(doctype);
                out.push('>');
            }
            for child in children {
                write_node(out, child);
            }
        }
        Node::Element {
            name,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                if let Some(value) = value {
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
            }
            out.push('>');
            if is_void_element(name) && children.is_empty() {
                return;
            }
            for child in children {
                write_node(out, child);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text(text) => out.push_str(text),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}
