//! Arena-based DOM tree storage
//!
//! Ownership is strictly top-down: the arena owns every node, a node lists
//! its children by index, and the parent link is a plain back-index. There
//! is no reference cycle to break.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Detached nodes (e.g. after replacing an element's inner markup) stay in
//! the arena, unreachable from the root, until [`DomArena::compact`] or
//! [`DomArena::clear`] drops them.

use crate::attributes::Attributes;
use crate::error::{DomError, Result};
use crate::types::{DomNode, ElementData, NodeData, NodeId};

/// Arena allocator for DOM nodes
#[derive(Debug, Clone)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Arena holding a single element that becomes the root
    pub fn with_root(tag_name: impl Into<String>) -> Self {
        let mut arena = Self::new();
        let root = arena.create_element(tag_name, Attributes::new());
        arena.root_id = Some(root);
        arena
    }

    /// Add a detached node to the arena, returns its ID
    pub fn add_node(&mut self, data: NodeData) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(DomNode::new(node_id, data));
        node_id
    }

    pub fn create_element(&mut self, tag_name: impl Into<String>, attributes: Attributes) -> NodeId {
        self.add_node(NodeData::Element(ElementData::new(tag_name, attributes)))
    }

    pub fn create_textarea(&mut self, attributes: Attributes, value: impl Into<String>) -> NodeId {
        self.add_node(NodeData::Element(ElementData::textarea(attributes, value)))
    }

    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.add_node(NodeData::Text(value.into()))
    }

    pub fn create_comment(&mut self, value: impl Into<String>) -> NodeId {
        self.add_node(NodeData::Comment(value.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.add_node(NodeData::Fragment)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get the element payload of a node, failing for other kinds
    pub fn element(&self, node_id: NodeId) -> Result<&ElementData> {
        let node = self.get(node_id)?;
        node.as_element().ok_or_else(|| {
            DomError::InvalidParent(format!("node {} is not an element", node_id))
        })
    }

    pub fn element_mut(&mut self, node_id: NodeId) -> Result<&mut ElementData> {
        let node = self.get_mut(node_id)?;
        node.as_element_mut().ok_or_else(|| {
            DomError::InvalidParent(format!("node {} is not an element", node_id))
        })
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&DomNode> {
        let root_id = self
            .root_id
            .ok_or_else(|| DomError::InvalidRecord("no root node set".to_string()))?;
        self.get(root_id)
    }

    /// Total number of nodes (including detached ones)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Append `child` as the last child of `parent`
    ///
    /// `parent` must be a container element. A child that already has a
    /// parent is moved. Appending a node under itself or one of its
    /// descendants is rejected.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        let parent = self.get(parent_id)?;
        if !parent.is_container() {
            return Err(DomError::InvalidParent(match parent.tag_name() {
                Some(tag) => format!("<{}> cannot hold child nodes", tag),
                None => format!("node {} is not an element", parent_id),
            }));
        }
        self.get(child_id)?;

        let mut cursor = Some(parent_id);
        while let Some(id) = cursor {
            if id == child_id {
                return Err(DomError::InvalidParent(format!(
                    "node {} cannot be appended under itself",
                    child_id
                )));
            }
            cursor = self.get(id)?.parent_id;
        }

        self.detach(child_id)?;
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        self.get_mut(parent_id)?.children_ids.push(child_id);
        Ok(())
    }

    /// Attach a node created moments ago and never attached
    ///
    /// Skips the container and ancestor checks of [`DomArena::append_child`];
    /// callers only pass container parents and parentless children.
    pub(crate) fn attach_new(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        self.get_mut(parent_id)?.children_ids.push(child_id);
        Ok(())
    }

    /// Unlink a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        if let Some(parent_id) = self.get(node_id)?.parent_id {
            self.get_mut(parent_id)?
                .children_ids
                .retain(|id| *id != node_id);
            self.get_mut(node_id)?.parent_id = None;
        }
        Ok(())
    }

    /// Unlink every child of a node
    pub fn clear_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child_id in children {
            self.get_mut(child_id)?.parent_id = None;
        }
        Ok(())
    }

    /// Traverse tree depth-first, pre-order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Concatenated text of every Text node under `node_id`
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let mut text = String::new();
        self.traverse_df(node_id, |node| {
            if let NodeData::Text(value) = &node.data {
                text.push_str(value);
            }
            Ok(())
        })?;
        Ok(text)
    }

    /// Drop every node that is not reachable from the root
    ///
    /// Surviving nodes are renumbered in document order, so the root becomes
    /// node 0. Returns the new ID of each old ID, indexed by old ID; `None`
    /// marks a dropped node. IDs held from before the call are stale.
    pub fn compact(&mut self) -> Result<Vec<Option<NodeId>>> {
        let root_id = self
            .root_id
            .ok_or_else(|| DomError::InvalidRecord("no root node set".to_string()))?;

        let mut order = Vec::new();
        self.traverse_df(root_id, |node| {
            order.push(node.node_id);
            Ok(())
        })?;

        let mut mapping = vec![None; self.nodes.len()];
        for (new_id, &old_id) in order.iter().enumerate() {
            mapping[old_id as usize] = Some(new_id as NodeId);
        }

        let mut old_nodes: Vec<Option<DomNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        self.nodes.reserve(order.len());
        for (new_id, &old_id) in order.iter().enumerate() {
            let mut node = old_nodes[old_id as usize]
                .take()
                .ok_or(DomError::NodeNotFound(old_id))?;
            node.node_id = new_id as NodeId;
            node.parent_id = node.parent_id.and_then(|id| mapping[id as usize]);
            node.children_ids = node
                .children_ids
                .iter()
                .filter_map(|&id| mapping[id as usize])
                .collect();
            self.nodes.push(node);
        }

        self.root_id = Some(0);
        tracing::debug!(
            kept = order.len(),
            dropped = mapping.len() - order.len(),
            "Compacted arena"
        );
        Ok(mapping)
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = arena.create_element("div", Attributes::new());
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.tag_name(), Some("div"));
        assert!(retrieved.parent_id.is_none());
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }

    #[test]
    fn test_append_sets_parent_link() {
        let mut arena = DomArena::with_root("ul");
        let root = arena.root_id().unwrap();
        let li = arena.create_element("li", Attributes::new());
        arena.append_child(root, li).unwrap();

        assert_eq!(arena.parent(li).unwrap().unwrap().node_id, root);
        assert_eq!(arena.children(root).unwrap().len(), 1);
    }

    #[test]
    fn test_append_moves_child() {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        let a = arena.create_element("p", Attributes::new());
        let b = arena.create_element("p", Attributes::new());
        let text = arena.create_text("x");
        arena.append_child(root, a).unwrap();
        arena.append_child(root, b).unwrap();
        arena.append_child(a, text).unwrap();
        arena.append_child(b, text).unwrap();

        assert!(arena.get(a).unwrap().children_ids.is_empty());
        assert_eq!(arena.get(b).unwrap().children_ids.as_slice(), &[text]);
    }

    #[test]
    fn test_append_rejects_leaves_and_cycles() {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        let text = arena.create_text("x");
        let other = arena.create_text("y");
        let textarea = arena.create_textarea(Attributes::new(), "raw");
        let inner = arena.create_element("span", Attributes::new());

        assert!(arena.append_child(text, other).is_err());
        assert!(arena.append_child(textarea, other).is_err());

        arena.append_child(root, inner).unwrap();
        assert!(arena.append_child(inner, root).is_err());
        assert!(arena.append_child(root, root).is_err());
    }

    #[test]
    fn test_traverse_df() {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        let span = arena.create_element("span", Attributes::new());
        let em = arena.create_element("em", Attributes::new());
        let b = arena.create_element("b", Attributes::new());
        arena.append_child(root, span).unwrap();
        arena.append_child(span, em).unwrap();
        arena.append_child(root, b).unwrap();

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.tag_name().unwrap().to_string());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["div", "span", "em", "b"]);
    }

    #[test]
    fn test_fragment_is_a_leaf() {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        let fragment = arena.create_fragment();
        let text = arena.create_text("x");
        arena.append_child(root, fragment).unwrap();

        assert!(arena.append_child(fragment, text).is_err());
        assert_eq!(arena.get(fragment).unwrap().parent_id, Some(root));
    }

    #[test]
    fn test_compact_drops_detached_nodes() {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        let stale = arena.create_text("old");
        arena.append_child(root, stale).unwrap();
        arena.clear_children(root).unwrap();
        let span = arena.create_element("span", Attributes::new());
        let text = arena.create_text("new");
        arena.append_child(root, span).unwrap();
        arena.append_child(span, text).unwrap();
        assert_eq!(arena.len(), 4);

        let mapping = arena.compact().unwrap();
        assert_eq!(mapping, vec![Some(0), None, Some(1), Some(2)]);
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.root_id(), Some(0));
        assert_eq!(arena.get(1).unwrap().tag_name(), Some("span"));
        assert_eq!(arena.get(1).unwrap().parent_id, Some(0));
        assert_eq!(arena.get(0).unwrap().children_ids.as_slice(), &[1]);
        assert_eq!(arena.text_content(0).unwrap(), "new");
    }

    #[test]
    fn test_clear_children_detaches() {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        let text = arena.create_text("hello");
        arena.append_child(root, text).unwrap();
        assert_eq!(arena.text_content(root).unwrap(), "hello");

        arena.clear_children(root).unwrap();
        assert!(arena.children(root).unwrap().is_empty());
        assert!(arena.get(text).unwrap().parent_id.is_none());
        assert_eq!(arena.text_content(root).unwrap(), "");
    }
}
