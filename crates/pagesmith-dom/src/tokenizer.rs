//! HTML tokenizer
//!
//! A single forward pass over the input bytes. Every branch point is an
//! ASCII byte, so slice boundaries always land on character boundaries.
//! Anything that does not look like markup falls back to a text token;
//! the tokenizer itself cannot fail.

/// One lexical unit of an HTML document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Content of a `<!...>` declaration (e.g. `DOCTYPE html`).
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

/// Elements whose content is consumed verbatim until the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Tokenize an HTML document or fragment.
pub fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            let end = find_byte(bytes, b'<', pos).unwrap_or(bytes.len());
            push_text(&mut tokens, &input[pos..end]);
            pos = end;
            continue;
        }

        if input[pos..].starts_with("<!--") {
            pos = lex_comment(input, pos, &mut tokens);
        } else if input[pos..].starts_with("<!") {
            pos = lex_declaration(input, pos, &mut tokens);
        } else if input[pos..].starts_with("</") {
            pos = lex_end_tag(input, pos, &mut tokens);
        } else if bytes
            .get(pos + 1)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            pos = lex_start_tag(input, pos, &mut tokens);
        } else {
            // A lone `<` is content.
            let end = find_byte(bytes, b'<', pos + 1).unwrap_or(bytes.len());
            push_text(&mut tokens, &input[pos..end]);
            pos = end;
        }
    }

    tokens
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    // Merge with a preceding text token so downstream sees one run.
    if let Some(Token::Text(prev)) = tokens.last_mut() {
        prev.push_str(text);
    } else {
        tokens.push(Token::Text(text.to_string()));
    }
}

fn lex_comment(input: &str, start: usize, tokens: &mut Vec<Token>) -> usize {
    let body_start = start + 4;
    match input[body_start..].find("-->") {
        Some(rel) => {
            tokens.push(Token::Comment(input[body_start..body_start + rel].to_string()));
            body_start + rel + 3
        }
        None => {
            // Unterminated comment swallows the rest of the input.
            tokens.push(Token::Comment(input[body_start..].to_string()));
            input.len()
        }
    }
}

fn lex_declaration(input: &str, start: usize, tokens: &mut Vec<Token>) -> usize {
    let body_start = start + 2;
    let end = find_byte(input.as_bytes(), b'>', body_start).unwrap_or(input.len());
    let body = &input[body_start..end];
    // Compare bytes: byte 7 of the body can fall inside a multi-byte
    // character, so the str cannot be sliced there.
    if body
        .as_bytes()
        .get(..7)
        .is_some_and(|b| b.eq_ignore_ascii_case(b"doctype"))
    {
        tokens.push(Token::Doctype(body.to_string()));
    }
    // Other markup declarations are dropped.
    (end + 1).min(input.len())
}

fn lex_end_tag(input: &str, start: usize, tokens: &mut Vec<Token>) -> usize {
    let bytes = input.as_bytes();
    let name_start = start + 2;
    let Some(end) = find_byte(bytes, b'>', name_start) else {
        // No closing `>`: the rest is content.
        push_text(tokens, &input[start..]);
        return input.len();
    };
    let name: String = input[name_start..end]
        .trim()
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if !name.is_empty() {
        tokens.push(Token::EndTag(name));
    }
    end + 1
}

fn lex_start_tag(input: &str, start: usize, tokens: &mut Vec<Token>) -> usize {
    let bytes = input.as_bytes();
    let name_start = start + 1;
    let mut pos = name_start;
    while pos < bytes.len() && is_tag_name_byte(bytes[pos]) {
        pos += 1;
    }
    let name = input[name_start..pos].to_ascii_lowercase();

    let (attributes, self_closing, after) = lex_attributes(input, pos);
    let Some(after) = after else {
        // Tag never closed: emit what we saw as content.
        push_text(tokens, &input[start..]);
        return input.len();
    };

    let raw = RAW_TEXT_ELEMENTS.iter().any(|e| *e == name);
    tokens.push(Token::StartTag {
        name: name.clone(),
        attributes,
        self_closing,
    });

    if raw && !self_closing {
        // Consume verbatim up to the matching end tag.
        let close = format!("</{name}");
        match find_ascii_ci(input, &close, after) {
            Some(at) => {
                push_text(tokens, &input[after..at]);
                at
            }
            None => {
                push_text(tokens, &input[after..]);
                input.len()
            }
        }
    } else {
        after
    }
}

/// Lex attributes from `pos` up to and including the closing `>`.
///
/// Returns the attribute list, the self-closing flag, and the position just
/// past `>` (`None` when the input ends before the tag closes).
fn lex_attributes(
    input: &str,
    mut pos: usize,
) -> (Vec<(String, Option<String>)>, bool, Option<usize>) {
    let bytes = input.as_bytes();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let Some(&b) = bytes.get(pos) else {
            return (attributes, self_closing, None);
        };
        match b {
            b'>' => return (attributes, self_closing, Some(pos + 1)),
            b'/' => {
                self_closing = true;
                pos += 1;
            }
            b'=' => {
                // Stray `=` without a preceding name.
                pos += 1;
            }
            _ => {
                self_closing = false;
                let name_start = pos;
                while pos < bytes.len() && !is_attr_delimiter(bytes[pos]) {
                    pos += 1;
                }
                let name = input[name_start..pos].to_ascii_lowercase();
                while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                        pos += 1;
                    }
                    let (value, next) = lex_attribute_value(input, pos);
                    attributes.push((name, Some(value)));
                    pos = next;
                } else {
                    attributes.push((name, None));
                }
            }
        }
    }
}

fn lex_attribute_value(input: &str, pos: usize) -> (String, usize) {
    let bytes = input.as_bytes();
    match bytes.get(pos) {
        Some(&quote @ (b'"' | b'\'')) => {
            let value_start = pos + 1;
            let end = find_byte(bytes, quote, value_start).unwrap_or(bytes.len());
            (
                input[value_start..end].to_string(),
                (end + 1).min(input.len()),
            )
        }
        _ => {
            let mut end = pos;
            while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'>' {
                end += 1;
            }
            (input[pos..end].to_string(), end)
        }
    }
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn is_attr_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'=' || b == b'>' || b == b'/'
}

fn find_byte(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == needle).map(|i| from + i)
}

/// Find an ASCII needle case-insensitively, starting at `from`.
fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || hay.len() < pat.len() {
        return None;
    }
    (from..=hay.len() - pat.len()).find(|&i| {
        hay[i..i + pat.len()]
            .iter()
            .zip(pat)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text() {
        assert_eq!(tokenize("hello"), vec![Token::Text("hello".to_string())]);
    }

    #[test]
    fn simple_element() {
        let tokens = tokenize("<p>hi</p>");
        assert_eq!(
            tokens,
            vec![
                Token::StartTag {
                    name: "p".to_string(),
                    attributes: vec![],
                    self_closing: false,
                },
                Token::Text("hi".to_string()),
                Token::EndTag("p".to_string()),
            ]
        );
    }

    #[test]
    fn attributes_quoted_and_bare() {
        let tokens = tokenize(r#"<section id="hero" data-x='1' hidden>"#);
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "section".to_string(),
                attributes: vec![
                    ("id".to_string(), Some("hero".to_string())),
                    ("data-x".to_string(), Some("1".to_string())),
                    ("hidden".to_string(), None),
                ],
                self_closing: false,
            }]
        );
    }

    #[test]
    fn unquoted_attribute_value() {
        let tokens = tokenize("<div class=card>");
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "div".to_string(),
                attributes: vec![("class".to_string(), Some("card".to_string()))],
                self_closing: false,
            }]
        );
    }

    #[test]
    fn tag_names_lowercased() {
        let tokens = tokenize("<DIV></DIV>");
        assert_eq!(
            tokens,
            vec![
                Token::StartTag {
                    name: "div".to_string(),
                    attributes: vec![],
                    self_closing: false,
                },
                Token::EndTag("div".to_string()),
            ]
        );
    }

    #[test]
    fn doctype_preserved() {
        let tokens = tokenize("<!DOCTYPE html><html></html>");
        assert_eq!(tokens[0], Token::Doctype("DOCTYPE html".to_string()));
    }

    #[test]
    fn comment_body() {
        let tokens = tokenize("<!-- note -->");
        assert_eq!(tokens, vec![Token::Comment(" note ".to_string())]);
    }

    #[test]
    fn script_content_is_raw() {
        let tokens = tokenize("<script>if (a < b) { run(); }</script>");
        assert_eq!(
            tokens,
            vec![
                Token::StartTag {
                    name: "script".to_string(),
                    attributes: vec![],
                    self_closing: false,
                },
                Token::Text("if (a < b) { run(); }".to_string()),
                Token::EndTag("script".to_string()),
            ]
        );
    }

    #[test]
    fn self_closing_tag() {
        let tokens = tokenize("<br/>");
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "br".to_string(),
                attributes: vec![],
                self_closing: true,
            }]
        );
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let tokens = tokenize("a < b");
        assert_eq!(tokens, vec![Token::Text("a < b".to_string())]);
    }

    #[test]
    fn entities_left_alone() {
        let tokens = tokenize("<p>a &amp; b</p>");
        assert_eq!(tokens[1], Token::Text("a &amp; b".to_string()));
    }

    #[test]
    fn unterminated_tag_degrades_to_text() {
        let tokens = tokenize("<div class=");
        assert_eq!(tokens, vec![Token::Text("<div class=".to_string())]);
    }

    #[test]
    fn declaration_with_multibyte_body_is_dropped_not_fatal() {
        // Byte 7 of the declaration body lands inside the two-byte `é`.
        let tokens = tokenize("<!abcdef\u{e9}>ok");
        assert_eq!(tokens, vec![Token::Text("ok".to_string())]);
    }

    #[test]
    fn doctype_case_insensitive_with_trailing_multibyte() {
        let tokens = tokenize("<!doctype héml>");
        assert_eq!(tokens, vec![Token::Doctype("doctype héml".to_string())]);
    }

    #[test]
    fn multibyte_text_survives() {
        let tokens = tokenize("<p>héllo — wörld</p>");
        assert_eq!(tokens[1], Token::Text("héllo — wörld".to_string()));
    }
}
