//! Call-tree structure shared by every profile loaded in a session.
//!
//! The tree itself lives in [`node`], the flattened callpath table in
//! [`table`]. Both are constructed once per dump by the reader and then
//! only read.

pub mod node;
pub mod table;

pub use node::{CallTreeNode, NodeId, Preorder};
pub use table::{CallTreeRow, CallTreeTable};
