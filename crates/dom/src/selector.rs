//! Selector grammar and local evaluation
//!
//! Four mutually exclusive query kinds:
//!
//! * `#my-id`  - unique element id
//! * `.my-cls` - CSS class name
//! * `li`      - tag name (alphabetic characters only)
//! * anything else is an opaque CSS selector, evaluated only by the host

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire form of a query: `{"id": "x"}`, `{"tag": "p"}`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Id(String),
    Tag(String),
    Classname(String),
    Css(String),
}

impl QueryKind {
    pub fn name(&self) -> &'static str {
        match self {
            QueryKind::Id(_) => "id",
            QueryKind::Tag(_) => "tag",
            QueryKind::Classname(_) => "classname",
            QueryKind::Css(_) => "css",
        }
    }

    pub fn target(&self) -> &str {
        match self {
            QueryKind::Id(t) | QueryKind::Tag(t) | QueryKind::Classname(t) | QueryKind::Css(t) => t,
        }
    }
}

/// A parsed selector together with the string it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    raw: String,
    kind: QueryKind,
}

fn is_tag_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

impl Query {
    /// Classify a selector string
    pub fn parse(raw: &str) -> Result<Self> {
        let kind = if let Some(id) = raw.strip_prefix('#') {
            if id.is_empty() {
                return Err(DomError::Selector("Invalid id.".to_string()));
            }
            QueryKind::Id(id.to_string())
        } else if let Some(class) = raw.strip_prefix('.') {
            if class.is_empty() {
                return Err(DomError::Selector("Invalid class.".to_string()));
            }
            QueryKind::Classname(class.to_string())
        } else if is_tag_name(raw) {
            QueryKind::Tag(raw.to_string())
        } else if !raw.is_empty() {
            QueryKind::Css(raw.to_string())
        } else {
            return Err(DomError::Selector("Missing selector.".to_string()));
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    pub fn id(target: impl Into<String>) -> Result<Self> {
        Self::parse(&format!("#{}", target.into()))
    }

    pub fn classname(target: impl Into<String>) -> Result<Self> {
        Self::parse(&format!(".{}", target.into()))
    }

    pub fn tag(target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        if !is_tag_name(&target) {
            return Err(DomError::Selector(format!("Invalid tag name: {}", target)));
        }
        Self::parse(&target)
    }

    /// Opaque CSS selector, no grammar check beyond non-empty
    pub fn css(target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        if target.is_empty() {
            return Err(DomError::Selector("Missing selector.".to_string()));
        }
        Ok(Self {
            kind: QueryKind::Css(target.clone()),
            raw: target,
        })
    }

    /// The selector string this query was built from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    pub fn into_kind(self) -> QueryKind {
        self.kind
    }
}

impl FromStr for Query {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Result of a local search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matches {
    /// Id lookup: first match or nothing
    One(Option<NodeId>),
    /// Class or tag lookup: every match in document order
    Many(Vec<NodeId>),
}

impl Matches {
    pub fn first(&self) -> Option<NodeId> {
        match self {
            Matches::One(found) => *found,
            Matches::Many(found) => found.first().copied(),
        }
    }

    pub fn into_vec(self) -> Vec<NodeId> {
        match self {
            Matches::One(found) => found.into_iter().collect(),
            Matches::Many(found) => found,
        }
    }
}

impl DomArena {
    /// Search `root` and its element descendants
    pub fn find(&self, root: NodeId, selector: &str) -> Result<Matches> {
        self.find_query(root, &Query::parse(selector)?)
    }

    /// Tag queries match lowercase tag names; the query itself keeps the
    /// case it was written in.
    pub fn find_query(&self, root: NodeId, query: &Query) -> Result<Matches> {
        match query.kind() {
            QueryKind::Id(id) => Ok(Matches::One(self.find_by_id(root, id)?)),
            QueryKind::Classname(class) => Ok(Matches::Many(self.find_by_class(root, class)?)),
            QueryKind::Tag(tag) => {
                let tag = tag.to_lowercase();
                Ok(Matches::Many(self.find_by_tag(root, &tag)?))
            }
            QueryKind::Css(css) => Err(DomError::Selector(format!(
                "Invalid tag name: {} (CSS selectors are evaluated by the host)",
                css
            ))),
        }
    }

    /// First element in pre-order whose `id` attribute equals `id`
    pub fn find_by_id(&self, root: NodeId, id: &str) -> Result<Option<NodeId>> {
        let mut found = None;
        self.traverse_df(root, |node| {
            if found.is_none() && node.attr("id") == Some(id) {
                found = Some(node.node_id);
            }
            Ok(())
        })?;
        Ok(found)
    }

    /// Every element carrying `class` among its class tokens
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Result<Vec<NodeId>> {
        self.collect_elements(root, |node| {
            node.as_element()
                .is_some_and(|e| e.attributes.class_list().any(|c| c == class))
        })
    }

    /// Every element whose tag name equals `tag` exactly
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Result<Vec<NodeId>> {
        self.collect_elements(root, |node| node.tag_name() == Some(tag))
    }

    fn collect_elements<F>(&self, root: NodeId, predicate: F) -> Result<Vec<NodeId>>
    where
        F: Fn(&crate::types::DomNode) -> bool,
    {
        let mut result = Vec::new();
        self.traverse_df(root, |node| {
            if predicate(node) {
                result.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(result)
    }
}
