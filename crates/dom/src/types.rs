//! Core type definitions
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Closed set of node kinds: match is exhaustive everywhere
//! 3. Use SmallVec for small arrays (avoid heap allocation)
//! 4. Parent links are indices, never ownership

use crate::attributes::Attributes;
use crate::error::{DomError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// The one element whose content is raw text instead of child nodes
pub const TEXTAREA: &str = "textarea";

/// Node type numbers as used by the browser DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    DocumentFragment = 11,
}

impl NodeType {
    /// Anything unrecognised is treated as a fragment marker
    pub fn from_wire(value: u32) -> Self {
        match value {
            1 => NodeType::Element,
            3 => NodeType::Text,
            8 => NodeType::Comment,
            _ => NodeType::DocumentFragment,
        }
    }

    pub fn as_wire(self) -> u32 {
        self as u32
    }
}

/// Element payload
///
/// An element is either a container (children, no value) or a raw-text
/// leaf (value, no children). Which one is decided by the tag name alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag_name: String,
    pub attributes: Attributes,
    value: Option<String>,
}

impl ElementData {
    pub fn new(tag_name: impl Into<String>, attributes: Attributes) -> Self {
        let tag_name = tag_name.into();
        let value = (tag_name == TEXTAREA).then(String::new);
        Self {
            tag_name,
            attributes,
            value,
        }
    }

    /// Raw-text leaf with the given value
    pub fn textarea(attributes: Attributes, value: impl Into<String>) -> Self {
        Self {
            tag_name: TEXTAREA.to_string(),
            attributes,
            value: Some(value.into()),
        }
    }

    pub fn is_raw_text(&self) -> bool {
        self.value.is_some()
    }

    /// Raw text value, `None` for container elements
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> Result<()> {
        match self.value.as_mut() {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(DomError::InvalidParent(format!(
                "<{}> holds child nodes, not a raw value",
                self.tag_name
            ))),
        }
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::Fragment => NodeType::DocumentFragment,
        }
    }
}

/// A node stored in the arena
#[derive(Debug, Clone)]
pub struct DomNode {
    pub node_id: NodeId,

    // Navigation indices. The parent link is a back-reference only.
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    pub data: NodeData,
}

impl DomNode {
    pub fn new(node_id: NodeId, data: NodeData) -> Self {
        Self {
            node_id,
            parent_id: None,
            children_ids: SmallVec::new(),
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag_name.as_str())
    }

    /// Get attribute value (lenient)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.as_element().and_then(|e| e.attributes.get_opt(name))
    }

    /// Can this node own children?
    pub fn is_container(&self) -> bool {
        self.as_element().is_some_and(|e| !e.is_raw_text())
    }
}

/// Wire record: the plain JSON shape of a node
///
/// ```json
/// {"nodeType": 1, "tagName": "p", "attributes": {"id": "x"}, "childNodes": [
///     {"nodeType": 3, "nodeName": "#text", "nodeValue": "Hi", "childNodes": []}
/// ]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(default)]
    pub node_type: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(default)]
    pub child_nodes: Vec<NodeRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_value: Option<String>,
}

impl NodeRecord {
    fn blank(node_type: NodeType) -> Self {
        Self {
            node_type: node_type.as_wire(),
            tag_name: None,
            node_name: None,
            attributes: Attributes::new(),
            child_nodes: Vec::new(),
            value: None,
            node_value: None,
        }
    }

    pub fn element(
        tag_name: impl Into<String>,
        attributes: Attributes,
        child_nodes: Vec<NodeRecord>,
    ) -> Self {
        let mut record = Self::blank(NodeType::Element);
        record.tag_name = Some(tag_name.into());
        record.attributes = attributes;
        record.child_nodes = child_nodes;
        record
    }

    pub fn textarea(attributes: Attributes, value: impl Into<String>) -> Self {
        let mut record = Self::blank(NodeType::Element);
        record.tag_name = Some(TEXTAREA.to_string());
        record.attributes = attributes;
        record.value = Some(value.into());
        record
    }

    pub fn text(value: impl Into<String>) -> Self {
        let mut record = Self::blank(NodeType::Text);
        record.node_name = Some("#text".to_string());
        record.node_value = Some(value.into());
        record
    }

    pub fn comment(value: impl Into<String>) -> Self {
        let mut record = Self::blank(NodeType::Comment);
        record.node_name = Some("#comment".to_string());
        record.node_value = Some(value.into());
        record
    }

    pub fn fragment() -> Self {
        Self::blank(NodeType::DocumentFragment)
    }

    pub fn kind(&self) -> NodeType {
        NodeType::from_wire(self.node_type)
    }
}

// Children are dropped iteratively; the derived drop recurses once per level.
impl Drop for NodeRecord {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.child_nodes);
        while let Some(mut record) = stack.pop() {
            stack.append(&mut record.child_nodes);
        }
    }
}
