//! Markup tokenizer
//!
//! Single pass, forward-only, XHTML only: every element needs an explicit
//! close tag. There is no entity decoding and no error recovery beyond
//! tolerating input that ends while elements are still open.
//!
//! `matches` skips leading whitespace before comparing, `expect` is a
//! `matches` that fails the whole parse.

use crate::arena::DomArena;
use crate::attributes::Attributes;
use crate::error::{DomError, Result};
use crate::types::{NodeId, TEXTAREA};

const QUOTES: &str = "\"'";
const TEXTAREA_CLOSE: &str = "</textarea>";

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_value_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ' | ';' | ':' | '!')
}

/// Cursor over a markup string
pub struct Tokenizer<'a> {
    raw: &'a str,
    /// Byte offset of the current character
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw, pos: 0 }
    }

    /// Byte offset of the cursor
    pub fn position(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.raw[self.pos..]
    }

    fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> DomError {
        DomError::Parse {
            message: message.into(),
            position: self.pos,
        }
    }

    /// Consume the next non-whitespace character if it is one of `expected`
    fn match_any(&mut self, expected: &str) -> Option<char> {
        self.skip_ws();
        match self.current() {
            Some(c) if expected.contains(c) => {
                self.bump();
                Some(c)
            }
            _ => None,
        }
    }

    fn matches(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.current() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.matches(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    /// Tag or attribute name, possibly empty
    fn name(&mut self) -> String {
        self.skip_ws();
        let mut result = String::new();
        while let Some(c) = self.current().filter(|&c| is_name_char(c)) {
            result.push(c);
            self.bump();
        }
        result
    }

    /// `="value"` part of an attribute. A bare attribute yields an error.
    fn quoted_value(&mut self) -> Result<String> {
        self.expect('=')?;
        let quote = self
            .match_any(QUOTES)
            .ok_or_else(|| self.error("expected quote"))?;
        let mut result = String::new();
        while let Some(c) = self.current().filter(|&c| is_value_char(c)) {
            result.push(c);
            self.bump();
        }
        self.expect(quote)?;
        Ok(result)
    }

    /// Zero or more `name[="value"]` pairs
    ///
    /// Malformed values degrade to `""` instead of failing.
    fn attributes(&mut self) -> Attributes {
        let mut attrs = Attributes::new();
        let mut name = self.name();
        while !name.is_empty() {
            let value = self.quoted_value().unwrap_or_default();
            attrs.set(name, value);
            name = self.name();
        }
        attrs
    }

    /// Raw text up to (not including) `until`, or to the end of input
    fn text_until(&mut self, until: &str) -> &'a str {
        let rest = self.rest();
        let end = rest.find(until).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Parse the markup into children of `parent`
    ///
    /// Elements are attached to their container as soon as they open, so
    /// input that ends early keeps whatever structure was read.
    pub fn tokenize(&mut self, arena: &mut DomArena, parent: NodeId) -> Result<()> {
        if !arena.get(parent)?.is_container() {
            return Err(DomError::InvalidParent(format!(
                "node {} cannot hold parsed markup",
                parent
            )));
        }

        // Most recently opened element that is still open
        let mut pending: Option<NodeId> = None;
        // Element that `pending` was opened in
        let mut container = parent;

        while self.current().is_some() {
            if self.matches('<') {
                if self.matches('/') {
                    let name = self.name();
                    match pending {
                        Some(id) if arena.element(id)?.tag_name == name => {
                            pending = None;
                        }
                        _ if container != parent
                            && arena.element(container)?.tag_name == name =>
                        {
                            pending = None;
                            container = arena
                                .get(container)?
                                .parent_id
                                .ok_or_else(|| DomError::UnexpectedCloseTag(name.clone()))?;
                        }
                        _ => return Err(DomError::UnexpectedCloseTag(name)),
                    }
                    self.expect('>')?;
                } else if self.matches('?') {
                    // XML prolog: consume and ignore
                    self.attributes();
                    self.expect('?')?;
                    self.expect('>')?;
                } else if self.matches('!') {
                    self.expect('-')?;
                    self.expect('-')?;
                    let rest = self.rest();
                    let end = rest
                        .find("-->")
                        .ok_or_else(|| self.error("unterminated comment"))?;
                    self.pos += end + "-->".len();
                    let comment = arena.create_comment(&rest[..end]);
                    arena.attach_new(pending.unwrap_or(container), comment)?;
                } else {
                    let tag_name = self.name();
                    if tag_name.is_empty() {
                        return Err(self.error("missing tag name"));
                    }
                    let attributes = self.attributes();
                    if let Some(id) = pending.take() {
                        container = id;
                    }

                    if tag_name == TEXTAREA {
                        self.expect('>')?;
                        let value = self.text_until(TEXTAREA_CLOSE);
                        if !self.rest().starts_with(TEXTAREA_CLOSE) {
                            return Err(self.error("expected '</textarea>'"));
                        }
                        self.pos += TEXTAREA_CLOSE.len();
                        let textarea = arena.create_textarea(attributes, value);
                        arena.attach_new(container, textarea)?;
                    } else {
                        let element = arena.create_element(tag_name, attributes);
                        arena.attach_new(container, element)?;
                        pending = Some(element);
                        self.expect('>')?;
                    }
                }
            } else {
                let value = self.text_until("<");
                let text = arena.create_text(value);
                arena.attach_new(pending.unwrap_or(container), text)?;
            }
        }

        Ok(())
    }
}

/// Parse `markup` and append the result to `parent`
pub fn tokenize(markup: &str, arena: &mut DomArena, parent: NodeId) -> Result<()> {
    Tokenizer::new(markup).tokenize(arena, parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeRecord;

    fn parse(markup: &str) -> Result<Vec<NodeRecord>> {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        tokenize(markup, &mut arena, root)?;
        let mut record = arena.to_record(root)?;
        Ok(std::mem::take(&mut record.child_nodes))
    }

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_comment_and_nested_elements() {
        let children = parse("<!-- c --><div id='i'><p>H</p><p>w</p></div>").unwrap();
        assert_eq!(
            children,
            vec![
                NodeRecord::comment(" c "),
                NodeRecord::element(
                    "div",
                    attrs(&[("id", "i")]),
                    vec![
                        NodeRecord::element("p", Attributes::new(), vec![NodeRecord::text("H")]),
                        NodeRecord::element("p", Attributes::new(), vec![NodeRecord::text("w")]),
                    ],
                ),
            ]
        );
    }

    #[test]
    fn test_attributes() {
        let children =
            parse(r#"<input type="text" name='q' disabled value="a b;c:d!"></input>"#).unwrap();
        assert_eq!(
            children,
            vec![NodeRecord::element(
                "input",
                attrs(&[
                    ("type", "text"),
                    ("name", "q"),
                    ("disabled", ""),
                    ("value", "a b;c:d!"),
                ]),
                vec![],
            )]
        );
    }

    #[test]
    fn test_mismatched_quotes_degrade_to_empty_value() {
        // The value reader gives up, then the tag never sees its '>'
        assert!(parse(r#"<p class="x'>t</p>"#).is_err());

        // A value with an unsupported character is dropped, then parsing fails
        assert!(matches!(
            parse(r#"<a href="http://x">t</a>"#),
            Err(DomError::Parse { .. })
        ));
    }

    #[test]
    fn test_textarea_is_raw_text() {
        let children = parse("<textarea class='x'>Test <fake html></textarea>").unwrap();
        assert_eq!(
            children,
            vec![NodeRecord::textarea(attrs(&[("class", "x")]), "Test <fake html>")]
        );
    }

    #[test]
    fn test_textarea_inside_container() {
        let children = parse("<form><textarea>a</textarea><p>b</p></form>").unwrap();
        assert_eq!(
            children,
            vec![NodeRecord::element(
                "form",
                Attributes::new(),
                vec![
                    NodeRecord::textarea(Attributes::new(), "a"),
                    NodeRecord::element("p", Attributes::new(), vec![NodeRecord::text("b")]),
                ],
            )]
        );
    }

    #[test]
    fn test_unterminated_textarea_fails() {
        assert!(matches!(
            parse("<textarea>never closed"),
            Err(DomError::Parse { .. })
        ));
    }

    #[test]
    fn test_deep_nesting_closes_in_order() {
        let children = parse("<a><b><c>x</c></b>y</a>").unwrap();
        let c = NodeRecord::element("c", Attributes::new(), vec![NodeRecord::text("x")]);
        let b = NodeRecord::element("b", Attributes::new(), vec![c]);
        let a = NodeRecord::element("a", Attributes::new(), vec![b, NodeRecord::text("y")]);
        assert_eq!(children, vec![a]);
    }

    #[test]
    fn test_unexpected_close_tag() {
        assert!(matches!(
            parse("<p>x</span>"),
            Err(DomError::UnexpectedCloseTag(name)) if name == "span"
        ));
        // The parse context itself cannot be closed from inside
        assert!(matches!(
            parse("</div>"),
            Err(DomError::UnexpectedCloseTag(_))
        ));
    }

    #[test]
    fn test_missing_close_bracket_fails() {
        assert!(matches!(parse("<p"), Err(DomError::Parse { .. })));
        assert!(matches!(parse("<p>x</p"), Err(DomError::Parse { .. })));
    }

    #[test]
    fn test_unclosed_element_is_tolerated() {
        let children = parse("<div><p>hi").unwrap();
        assert_eq!(
            children,
            vec![NodeRecord::element(
                "div",
                Attributes::new(),
                vec![NodeRecord::element(
                    "p",
                    Attributes::new(),
                    vec![NodeRecord::text("hi")]
                )],
            )]
        );
    }

    #[test]
    fn test_xml_prolog_is_ignored() {
        let children = parse(r#"<?xml version="1.0"?><p>x</p>"#).unwrap();
        assert_eq!(
            children,
            vec![NodeRecord::element("p", Attributes::new(), vec![NodeRecord::text("x")])]
        );
    }

    #[test]
    fn test_unterminated_comment_fails() {
        assert!(parse("<!-- open").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parent_must_be_container() {
        let mut arena = DomArena::new();
        let text = arena.create_text("x");
        assert!(matches!(
            tokenize("<p></p>", &mut arena, text),
            Err(DomError::InvalidParent(_))
        ));

        let textarea = arena.create_textarea(Attributes::new(), "");
        assert!(tokenize("<p></p>", &mut arena, textarea).is_err());
    }
}
