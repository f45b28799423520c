//! Element location
//!
//! Two ways to point at exactly one element:
//! - [`find_by_id`]: literal comparison against the `id` attribute. The
//!   value is never interpreted as selector syntax, so values fed in from
//!   untrusted proposals cannot smuggle in a broader query.
//! - [`find_by_selector`]: first match, in document order, of a compact
//!   structural selector (tag, `#id`, `.class`, `[attr]`, `[attr=value]`
//!   compounds joined by descendant or `>` child combinators).
//!
//! Both return the path of child indices from the root, so the caller can
//! navigate to the element mutably afterwards.

use crate::node::Node;

/// Path of child indices from the root to a node.
pub type NodePath = Vec<usize>;

/// Error from [`Selector::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector syntax: `{0}`")]
    Unsupported(String),
}

/// A parsed structural selector. The last compound is the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    compounds: Vec<Compound>,
    /// `combinators[i]` relates `compounds[i]` to `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCheck>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrCheck {
    name: String,
    value: Option<String>,
}

impl Selector {
    /// Parse a selector expression.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending = Combinator::Descendant;
        let mut buffer = String::new();

        let mut flush = |buffer: &mut String,
                         pending: &mut Combinator,
                         compounds: &mut Vec<Compound>,
                         combinators: &mut Vec<Combinator>|
         -> Result<(), SelectorError> {
            if buffer.is_empty() {
                return Ok(());
            }
            let compound = parse_compound(buffer)?;
            if !compounds.is_empty() {
                combinators.push(*pending);
            }
            compounds.push(compound);
            *pending = Combinator::Descendant;
            buffer.clear();
            Ok(())
        };

        for c in input.trim().chars() {
            if c.is_whitespace() {
                flush(&mut buffer, &mut pending, &mut compounds, &mut combinators)?;
            } else if c == '>' {
                flush(&mut buffer, &mut pending, &mut compounds, &mut combinators)?;
                if compounds.is_empty() {
                    return Err(SelectorError::Unsupported(input.to_string()));
                }
                pending = Combinator::Child;
            } else {
                buffer.push(c);
            }
        }
        flush(&mut buffer, &mut pending, &mut compounds, &mut combinators)?;

        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        if pending == Combinator::Child || combinators.len() + 1 != compounds.len() {
            // A trailing combinator (`div >`) has nothing to attach to.
            return Err(SelectorError::Unsupported(input.to_string()));
        }
        Ok(Self {
            compounds,
            combinators,
        })
    }

    /// Whether `element` matches, given its element ancestors from
    /// outermost to immediate parent.
    fn matches(&self, element: &Node, ancestors: &[&Node]) -> bool {
        let Some((subject, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !compound_matches(element, subject) {
            return false;
        }
        lineage_matches(rest, &self.combinators, ancestors)
    }
}

/// Match the remaining compounds against the ancestor chain, rightmost
/// compound first, backtracking over descendant choices.
fn lineage_matches(compounds: &[Compound], combinators: &[Combinator], ancestors: &[&Node]) -> bool {
    let Some((compound, shallower_compounds)) = compounds.split_last() else {
        return true;
    };
    let Some((combinator, shallower_combinators)) = combinators.split_last() else {
        return false;
    };
    match combinator {
        Combinator::Child => {
            let Some((parent, higher)) = ancestors.split_last() else {
                return false;
            };
            compound_matches(parent, compound)
                && lineage_matches(shallower_compounds, shallower_combinators, higher)
        }
        Combinator::Descendant => (0..ancestors.len()).rev().any(|i| {
            compound_matches(ancestors[i], compound)
                && lineage_matches(shallower_compounds, shallower_combinators, &ancestors[..i])
        }),
    }
}

fn parse_compound(input: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '*' => {
                chars.next();
            }
            '#' => {
                chars.next();
                let ident = take_ident(&mut chars);
                if ident.is_empty() {
                    return Err(SelectorError::Unsupported(input.to_string()));
                }
                compound.id = Some(ident);
            }
            '.' => {
                chars.next();
                let ident = take_ident(&mut chars);
                if ident.is_empty() {
                    return Err(SelectorError::Unsupported(input.to_string()));
                }
                compound.classes.push(ident);
            }
            '[' => {
                chars.next();
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(c) => inner.push(c),
                        None => return Err(SelectorError::Unsupported(input.to_string())),
                    }
                }
                compound.attrs.push(parse_attr_check(&inner, input)?);
            }
            c if is_ident_char(c) => {
                compound.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
            }
            _ => return Err(SelectorError::Unsupported(input.to_string())),
        }
    }

    Ok(compound)
}

fn parse_attr_check(inner: &str, whole: &str) -> Result<AttrCheck, SelectorError> {
    let (name, value) = match inner.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (name.trim(), Some(value.to_string()))
        }
        None => (inner.trim(), None),
    };
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::Unsupported(whole.to_string()));
    }
    Ok(AttrCheck {
        name: name.to_ascii_lowercase(),
        value,
    })
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if is_ident_char(c) {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn compound_matches(node: &Node, compound: &Compound) -> bool {
    let Node::Element { name, .. } = node else {
        return false;
    };
    if let Some(tag) = &compound.tag {
        if !name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if node.attribute("id") != Some(id.as_str()) {
            return false;
        }
    }
    for class in &compound.classes {
        let has = node
            .attribute("class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class));
        if !has {
            return false;
        }
    }
    for check in &compound.attrs {
        match node.attribute(&check.name) {
            None => return false,
            Some(actual) => {
                if let Some(expected) = &check.value {
                    if actual != expected {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// First element, in document order, whose `id` attribute equals `id`
/// exactly. Duplicate ids resolve to the first occurrence.
#[must_use]
pub fn find_by_id(root: &Node, id: &str) -> Option<NodePath> {
    fn walk(node: &Node, id: &str, path: &mut NodePath) -> Option<NodePath> {
        for (index, child) in node.children().iter().enumerate() {
            path.push(index);
            if child.attribute("id") == Some(id) {
                return Some(path.clone());
            }
            if let Some(found) = walk(child, id, path) {
                return Some(found);
            }
            path.pop();
        }
        None
    }
    walk(root, id, &mut Vec::new())
}

/// First element, in document order, matching `selector`.
#[must_use]
pub fn find_by_selector(root: &Node, selector: &Selector) -> Option<NodePath> {
    fn walk<'a>(
        node: &'a Node,
        selector: &Selector,
        ancestors: &mut Vec<&'a Node>,
        path: &mut NodePath,
    ) -> Option<NodePath> {
        for (index, child) in node.children().iter().enumerate() {
            path.push(index);
            if matches!(child, Node::Element { .. }) {
                if selector.matches(child, ancestors) {
                    return Some(path.clone());
                }
                ancestors.push(child);
                let found = walk(child, selector, ancestors, path);
                ancestors.pop();
                if let Some(found) = found {
                    return Some(found);
                }
            }
            path.pop();
        }
        None
    }
    walk(root, selector, &mut Vec::new(), &mut Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse_document;

    fn doc(html: &str) -> Node {
        parse_document(html)
    }

    fn select(html: &str, selector: &str) -> Option<NodePath> {
        let selector = Selector::parse(selector).expect("selector should parse");
        find_by_selector(&doc(html), &selector)
    }

    #[test]
    fn id_lookup_is_literal() {
        let document = doc(r#"<div id="a.b">x</div>"#);
        assert!(find_by_id(&document, "a.b").is_some());
        // Selector metacharacters in the value match nothing else.
        assert!(find_by_id(&document, ".b").is_none());
    }

    #[test]
    fn id_lookup_first_of_duplicates() {
        let document = doc(r#"<p id="dup">one</p><span id="dup">two</span>"#);
        let path = find_by_id(&document, "dup").expect("should find");
        assert_eq!(path, vec![0]);
    }

    #[test]
    fn id_lookup_case_sensitive_value() {
        let document = doc(r#"<div id="Hero"></div>"#);
        assert!(find_by_id(&document, "hero").is_none());
        assert!(find_by_id(&document, "Hero").is_some());
    }

    #[test]
    fn tag_selector_first_in_document_order() {
        let path = select("<div><p>a</p></div><p>b</p>", "p");
        assert_eq!(path, Some(vec![0, 0]));
    }

    #[test]
    fn class_selector() {
        let path = select(
            r#"<div class="card big">x</div><div class="card">y</div>"#,
            ".card",
        );
        assert_eq!(path, Some(vec![0]));
    }

    #[test]
    fn compound_selector() {
        let path = select(
            r#"<section class="hero"></section><section class="hero" id="main"></section>"#,
            "section.hero#main",
        );
        assert_eq!(path, Some(vec![1]));
    }

    #[test]
    fn descendant_combinator() {
        let path = select(
            "<header><p>in</p></header><main><div><p>deep</p></div></main>",
            "main p",
        );
        assert_eq!(path, Some(vec![1, 0, 0]));
    }

    #[test]
    fn child_combinator_requires_immediate_parent() {
        let html = "<main><div><p>deep</p></div><p>shallow</p></main>";
        assert_eq!(select(html, "main > p"), Some(vec![0, 1]));
        assert_eq!(select(html, "div > p"), Some(vec![0, 0, 0]));
    }

    #[test]
    fn attribute_selectors() {
        let html = r#"<a href="/x">a</a><a>b</a>"#;
        assert_eq!(select(html, "a[href]"), Some(vec![0]));
        assert_eq!(select(html, r#"a[href="/x"]"#), Some(vec![0]));
        assert_eq!(select(html, r#"a[href="/y"]"#), None);
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(select("<div></div>", "article"), None);
    }

    #[test]
    fn unsupported_syntax_rejected() {
        assert!(Selector::parse("p:first-child").is_err());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div >").is_err());
    }

    #[test]
    fn backtracking_descendant_match() {
        // The nearest `div` ancestor is not inside `section`, but a farther
        // one is; matching must backtrack instead of failing.
        let html = "<section><div><p>hit</p></div></section><div><p>miss</p></div>";
        assert_eq!(select(html, "section div p"), Some(vec![0, 0, 0]));
    }
}
