//! Tree builder
//!
//! Turns the token stream into an owned [`Node`] tree. Recovery rules:
//! - end tags with no matching open element are dropped
//! - an end tag for an outer element closes everything inside it
//! - elements still open at end of input are closed implicitly
//! - void elements and self-closing tags never take children

use crate::node::{is_void_element, Node};
use crate::tokenizer::{tokenize, Token};

struct OpenElement {
    name: String,
    attributes: Vec<(String, Option<String>)>,
    children: Vec<Node>,
}

impl OpenElement {
    fn into_node(self) -> Node {
        Node::Element {
            name: self.name,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

/// Parse a complete document. Total: malformed input yields a best-effort
/// tree, never an error.
#[must_use]
pub fn parse_document(input: &str) -> Node {
    let (doctype, children) = build(tokenize(input));
    Node::Document { doctype, children }
}

/// Parse a fragment, returning its top-level nodes. A doctype inside a
/// fragment is ignored.
#[must_use]
pub fn parse_fragment(input: &str) -> Vec<Node> {
    build(tokenize(input)).1
}

fn build(tokens: Vec<Token>) -> (Option<String>, Vec<Node>) {
    let mut doctype = None;
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    for token in tokens {
        match token {
            Token::Doctype(text) => {
                if doctype.is_none() {
                    doctype = Some(text);
                }
            }
            Token::Comment(text) => append(&mut stack, &mut roots, Node::Comment(text)),
            Token::Text(text) => append(&mut stack, &mut roots, Node::Text(text)),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if self_closing || is_void_element(&name) {
                    append(
                        &mut stack,
                        &mut roots,
                        Node::Element {
                            name,
                            attributes,
                            children: Vec::new(),
                        },
                    );
                } else {
                    stack.push(OpenElement {
                        name,
                        attributes,
                        children: Vec::new(),
                    });
                }
            }
            Token::EndTag(name) => {
                if !stack.iter().any(|open| open.name == name) {
                    continue;
                }
                while let Some(open) = stack.pop() {
                    let done = open.name == name;
                    append(&mut stack, &mut roots, open.into_node());
                    if done {
                        break;
                    }
                }
            }
        }
    }

    while let Some(open) = stack.pop() {
        append(&mut stack, &mut roots, open.into_node());
    }

    (doctype, roots)
}

fn append(stack: &mut Vec<OpenElement>, roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => roots.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_structure() {
        let doc = parse_document("<html><body><p>hi</p></body></html>");
        let Node::Document { children, .. } = &doc else {
            panic!("not a document");
        };
        assert_eq!(children.len(), 1);
        let html = &children[0];
        assert!(html.is_element_named("html"));
        let body = &html.children()[0];
        assert!(body.is_element_named("body"));
        let p = &body.children()[0];
        assert_eq!(p.children(), &[Node::Text("hi".to_string())]);
    }

    #[test]
    fn doctype_captured() {
        let doc = parse_document("<!DOCTYPE html><html></html>");
        let Node::Document { doctype, .. } = &doc else {
            panic!("not a document");
        };
        assert_eq!(doctype.as_deref(), Some("DOCTYPE html"));
    }

    #[test]
    fn stray_end_tag_dropped() {
        let nodes = parse_fragment("</div><p>ok</p>");
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_element_named("p"));
    }

    #[test]
    fn only_stray_end_tag_yields_nothing() {
        assert!(parse_fragment("</div>").is_empty());
    }

    #[test]
    fn unclosed_elements_closed_at_end() {
        let nodes = parse_fragment("<div><p>dangling");
        assert_eq!(nodes.len(), 1);
        let div = &nodes[0];
        assert!(div.is_element_named("div"));
        assert!(div.children()[0].is_element_named("p"));
    }

    #[test]
    fn outer_end_tag_closes_inner() {
        let nodes = parse_fragment("<div><span>x</div>");
        assert_eq!(nodes.len(), 1);
        let div = &nodes[0];
        assert!(div.is_element_named("div"));
        assert!(div.children()[0].is_element_named("span"));
    }

    #[test]
    fn void_elements_take_no_children() {
        let nodes = parse_fragment("<br>text");
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_element_named("br"));
        assert_eq!(nodes[1], Node::Text("text".to_string()));
    }

    #[test]
    fn fragment_with_multiple_roots() {
        let nodes = parse_fragment("<h1>a</h1><p>b</p>");
        assert_eq!(nodes.len(), 2);
    }
}
