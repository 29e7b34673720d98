//! Wire record conversion
//!
//! `to_record` and `from_record` are inverses for the four node kinds. The
//! parent back-reference never appears in a record; it is re-derived when a
//! record is imported into an arena.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{ElementData, NodeData, NodeId, NodeRecord, NodeType, TEXTAREA};

impl DomArena {
    /// Serialize the subtree rooted at `node_id`
    pub fn to_record(&self, node_id: NodeId) -> Result<NodeRecord> {
        // Pre-order walk that does not descend into leaves
        let mut order = Vec::new();
        let mut stack = vec![node_id];
        while let Some(id) = stack.pop() {
            let node = self.get(id)?;
            order.push(id);
            if node.is_container() {
                stack.extend(node.children_ids.iter().rev().copied());
            }
        }

        // Reverse pre-order sees every child before its parent; when a parent
        // comes up, its finished children sit on top of `done`, first child
        // uppermost.
        let mut done: Vec<NodeRecord> = Vec::with_capacity(order.len());
        for &id in order.iter().rev() {
            let node = self.get(id)?;
            let record = match &node.data {
                NodeData::Element(element) => match element.value() {
                    Some(value) => NodeRecord::textarea(element.attributes.clone(), value),
                    None => {
                        let count = node.children_ids.len();
                        let mut child_nodes = Vec::with_capacity(count);
                        for _ in 0..count {
                            let child = done.pop().ok_or(DomError::NodeNotFound(id))?;
                            child_nodes.push(child);
                        }
                        NodeRecord::element(
                            element.tag_name.clone(),
                            element.attributes.clone(),
                            child_nodes,
                        )
                    }
                },
                NodeData::Text(value) => NodeRecord::text(value.clone()),
                NodeData::Comment(value) => NodeRecord::comment(value.clone()),
                NodeData::Fragment => NodeRecord::fragment(),
            };
            done.push(record);
        }

        done.pop().ok_or(DomError::NodeNotFound(node_id))
    }

    /// Build a whole arena from a record; the record's node becomes the root
    pub fn from_record(record: &NodeRecord) -> Result<Self> {
        let mut arena = Self::new();
        let root_id = arena.import_record(record)?;
        arena.set_root(root_id)?;
        Ok(arena)
    }

    /// Build an arena from the JSON text of a record
    pub fn from_json(json: &str) -> Result<Self> {
        let record: NodeRecord = serde_json::from_str(json)?;
        Self::from_record(&record)
    }

    /// JSON text of the subtree rooted at `node_id`
    pub fn to_json(&self, node_id: NodeId) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record(node_id)?)?)
    }

    /// Import a record as a detached subtree, returning its root
    pub fn import_record(&mut self, record: &NodeRecord) -> Result<NodeId> {
        let root_id = self.import_node(record)?;
        let mut stack: Vec<(NodeId, &NodeRecord)> = Vec::new();
        if self.get(root_id)?.is_container() {
            stack.extend(record.child_nodes.iter().rev().map(|child| (root_id, child)));
        }

        while let Some((parent_id, child)) = stack.pop() {
            let child_id = self.import_node(child)?;
            self.attach_new(parent_id, child_id)?;
            if self.get(child_id)?.is_container() {
                stack.extend(child.child_nodes.iter().rev().map(|grand| (child_id, grand)));
            }
        }
        Ok(root_id)
    }

    /// Add one node from a record, ignoring its children
    fn import_node(&mut self, record: &NodeRecord) -> Result<NodeId> {
        let data = match record.kind() {
            NodeType::Element => {
                let tag_name = record
                    .tag_name
                    .as_deref()
                    .filter(|tag| !tag.is_empty())
                    .ok_or_else(|| {
                        DomError::InvalidRecord("element record without tagName".to_string())
                    })?;
                if tag_name == TEXTAREA {
                    NodeData::Element(ElementData::textarea(
                        record.attributes.clone(),
                        record.value.clone().unwrap_or_default(),
                    ))
                } else {
                    NodeData::Element(ElementData::new(tag_name, record.attributes.clone()))
                }
            }
            NodeType::Text => NodeData::Text(record.node_value.clone().unwrap_or_default()),
            NodeType::Comment => NodeData::Comment(record.node_value.clone().unwrap_or_default()),
            NodeType::DocumentFragment => NodeData::Fragment,
        };
        Ok(self.add_node(data))
    }

    /// Append an already-serialized node as the last child of `parent_id`
    pub fn add_child_record(&mut self, parent_id: NodeId, record: &NodeRecord) -> Result<NodeId> {
        // Fail before importing so a rejected child leaves no garbage behind
        if !self.get(parent_id)?.is_container() {
            return Err(DomError::InvalidParent(format!(
                "node {} cannot hold child nodes",
                parent_id
            )));
        }
        let child_id = self.import_record(record)?;
        self.append_child(parent_id, child_id)?;
        Ok(child_id)
    }
}
