//! DOM events delivered to registered listeners

use dom::{DomArena, ElementData, NodeId, Result};

/// An event fired on the host, with its target rebuilt locally
///
/// Built fresh for every inbound message and never stored.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: String,
    document: DomArena,
}

impl DomEvent {
    /// `document` must have its root set to the target element
    pub fn new(event_type: impl Into<String>, document: DomArena) -> Self {
        Self {
            event_type: event_type.into(),
            document,
        }
    }

    /// The tree the target lives in. Its root is the target.
    pub fn document(&self) -> &DomArena {
        &self.document
    }

    /// Take the tree out of the event, e.g. to modify and send it back
    pub fn into_document(self) -> DomArena {
        self.document
    }

    pub fn target_id(&self) -> Option<NodeId> {
        self.document.root_id()
    }

    /// Element the event fired on
    pub fn target(&self) -> Result<&ElementData> {
        let root = self.document.root()?;
        self.document.element(root.node_id)
    }
}
