//! Element tree adapter.
//!
//! Parses part bytes into an arena-backed, namespace-aware [`XmlTree`] and
//! writes it back. Content model wrappers never touch bytes; they navigate
//! and edit the tree through [`NodeId`] handles.
pub mod ns;
pub mod parser;
pub mod tree;
pub mod writer;

pub use ns::{QName, qn};
pub use parser::parse;
pub use tree::{Attribute, Element, NodeData, NodeId, SharedTree, XmlTree};
pub use writer::{serialize, serialize_node};
