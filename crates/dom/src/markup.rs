//! Markup rendering and inner-markup replacement
//!
//! Attribute values are written between double quotes exactly as stored.
//! Nothing is escaped, so a value holding `"` renders invalid markup.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::tokenizer::Tokenizer;
use crate::types::{NodeData, NodeId};

impl DomArena {
    /// `<tag attr="val">...</tag>` for elements, raw text for Text nodes
    pub fn outer_markup(&self, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.write_markup(node_id, &mut output)?;
        Ok(output)
    }

    /// Concatenated outer markup of the children
    ///
    /// For a textarea this is its raw value.
    pub fn inner_markup(&self, node_id: NodeId) -> Result<String> {
        let element = self.element(node_id)?;
        if let Some(value) = element.value() {
            return Ok(value.to_string());
        }
        let mut output = String::with_capacity(256);
        for &child_id in &self.get(node_id)?.children_ids {
            self.write_markup(child_id, &mut output)?;
        }
        Ok(output)
    }

    /// Replace every child of `node_id` with the parsed `markup`
    ///
    /// The old children are only unlinked and keep their arena slots, so an
    /// arena re-rendered on every event keeps growing. Call
    /// [`DomArena::compact`] to drop them.
    pub fn set_inner_markup(&mut self, node_id: NodeId, markup: &str) -> Result<()> {
        let element = self.element(node_id)?;
        if element.is_raw_text() {
            return Err(DomError::InvalidParent(format!(
                "<{}> holds raw text, set its value instead",
                element.tag_name
            )));
        }
        self.clear_children(node_id)?;
        tracing::trace!(node_id, len = markup.len(), "Parsing inner markup");
        Tokenizer::new(markup).tokenize(self, node_id)
    }

    fn write_markup(&self, node_id: NodeId, output: &mut String) -> Result<()> {
        enum Step {
            Open(NodeId),
            Close(NodeId),
        }

        let mut stack = vec![Step::Open(node_id)];
        while let Some(step) = stack.pop() {
            let node_id = match step {
                Step::Open(id) => id,
                Step::Close(id) => {
                    let element = self.element(id)?;
                    output.push_str("</");
                    output.push_str(&element.tag_name);
                    output.push('>');
                    continue;
                }
            };

            let node = self.get(node_id)?;
            match &node.data {
                NodeData::Element(element) => {
                    output.push('<');
                    output.push_str(&element.tag_name);
                    for (name, value) in element.attributes.iter() {
                        output.push(' ');
                        output.push_str(name);
                        output.push_str("=\"");
                        output.push_str(value);
                        output.push('"');
                    }
                    output.push('>');

                    stack.push(Step::Close(node_id));
                    match element.value() {
                        Some(value) => output.push_str(value),
                        None => {
                            stack.extend(node.children_ids.iter().rev().map(|&id| Step::Open(id)))
                        }
                    }
                }
                NodeData::Text(value) => output.push_str(value),
                NodeData::Comment(value) => {
                    output.push_str("<!--");
                    output.push_str(value);
                    output.push_str("-->");
                }
                NodeData::Fragment => {}
            }
        }
        Ok(())
    }
}
