//! Owned, mutable HTML tree.
//!
//! Markup is parsed with an HTML5 parser and converted into plain nodes so
//! that attributes and children can be edited in place. Elements are
//! addressed by [`NodePath`]: the child indices leading from the document
//! root to the element.

mod dom_html;
mod dom_node;

pub use dom_html::parse_fragment;
pub use dom_node::{Document, Element, Node, NodePath};

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
