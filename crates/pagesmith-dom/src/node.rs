//! Tree node types
//!
//! Attribute order and duplicates are preserved; the tree never dedupes or
//! normalizes what the source document contained.

/// A node in the parsed HTML tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Document root. Holds the doctype text (without `<!` and `>`), if any.
    Document {
        doctype: Option<String>,
        children: Vec<Node>,
    },
    /// An element. Names are ASCII-lowercased at tokenization time.
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    /// Raw text, entities untouched.
    Text(String),
    /// Comment body, without the `<!--`/`-->` delimiters.
    Comment(String),
}

impl Node {
    /// Children of this node; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            Node::Text(_) | Node::Comment(_) => &[],
        }
    }

    /// Mutable children, when the node kind can have any.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => Some(children),
            Node::Text(_) | Node::Comment(_) => None,
        }
    }

    /// Whether this is an element with the given name (ASCII case-insensitive).
    #[must_use]
    pub fn is_element_named(&self, target: &str) -> bool {
        matches!(self, Node::Element { name, .. } if name.eq_ignore_ascii_case(target))
    }

    /// First value of the named attribute, if this is an element carrying it.
    ///
    /// Attribute names compare ASCII case-insensitively; a bare attribute
    /// (`<input disabled>`) reads as the empty string.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_deref().unwrap_or("")),
            _ => None,
        }
    }
}

/// Elements that never have children and take no end tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| name.eq_ignore_ascii_case(v))
}
