//! DOM tree model for a scripting process that mirrors a remote document
//!
//! Markup goes in through a hand-written XHTML tokenizer, comes out as
//! markup or as JSON wire records, and can be searched with a four-kind
//! selector grammar.
//!
//! ## Core Design
//!
//! ```text
//! markup ──Tokenizer──▶ DomArena (owned) ──to_record──▶ NodeRecord ──▶ JSON
//!                          ↓      ▲
//!                     NodeId (u32) └──from_record── NodeRecord ◀── JSON
//! ```
//!
//! - **Closed node set**: `NodeData` is an enum, every match is exhaustive
//! - **No cycles**: the arena owns nodes, parents are back-indices
//! - **Fail fast**: bad markup and bad selectors are errors for the caller

pub mod arena;
pub mod attributes;
pub mod error;
pub mod markup;
pub mod record;
pub mod selector;
pub mod tokenizer;
pub mod types;

pub use arena::DomArena;
pub use attributes::Attributes;
pub use error::{DomError, Result};
pub use selector::{Matches, Query, QueryKind};
pub use tokenizer::{tokenize, Tokenizer};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serialize_search() {
        let mut arena = DomArena::with_root("div");
        let root = arena.root_id().unwrap();
        arena
            .set_inner_markup(root, "<p class='greeting'>Hello</p><p>world</p>")
            .unwrap();

        let greeting = arena.find(root, ".greeting").unwrap().first().unwrap();
        let record = arena.to_record(greeting).unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "nodeType": 1,
                "tagName": "p",
                "attributes": {"class": "greeting"},
                "childNodes": [
                    {"nodeType": 3, "nodeName": "#text", "nodeValue": "Hello", "childNodes": []}
                ],
            })
        );
    }
}
