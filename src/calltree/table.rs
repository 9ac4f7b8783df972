//! Flattened call-tree view with callpath strings.
//!
//! The table is the bridge between the structural tree and row-oriented
//! output: one row per node, in preorder, carrying both the short name
//! and the full root-to-node callpath. Full callpaths are the stable
//! identity used to line nodes up across independently numbered runs.

use std::collections::HashMap;

use log::warn;

use crate::calltree::node::{CallTreeNode, NodeId};
use crate::utils::config::CALLPATH_SEPARATOR;

/// One flattened call-tree node
#[derive(Debug, Clone, PartialEq)]
pub struct CallTreeRow {
    pub node_id: NodeId,
    pub parent_id: Option<NodeId>,
    /// Function name only, shared by every call site of the function
    pub short_callpath: String,
    /// Separator-joined path from the root, unique per call site
    pub full_callpath: String,
}

/// Preorder table of call-tree rows with callpath lookups in both
/// directions.
#[derive(Debug, Clone)]
pub struct CallTreeTable {
    rows: Vec<CallTreeRow>,
    by_full_callpath: HashMap<String, NodeId>,
    row_of_node: HashMap<NodeId, usize>,
}

impl CallTreeTable {
    /// Flatten a call tree into its row table
    ///
    /// **Public**
    ///
    /// # Arguments
    /// * `root` - Root of the tree to flatten
    ///
    /// # Returns
    /// Table with one row per node in preorder. If two nodes share a
    /// full callpath (same function called twice from the same parent)
    /// the first keeps the callpath mapping and a warning is logged.
    pub fn from_tree(root: &CallTreeNode) -> Self {
        let mut rows = Vec::with_capacity(root.node_count());
        let mut by_full_callpath = HashMap::new();
        let mut row_of_node = HashMap::new();

        collect_rows(root, None, &mut rows, &mut by_full_callpath);

        for (index, row) in rows.iter().enumerate() {
            row_of_node.insert(row.node_id, index);
        }

        Self {
            rows,
            by_full_callpath,
            row_of_node,
        }
    }

    /// All rows in preorder
    pub fn rows(&self) -> &[CallTreeRow] {
        &self.rows
    }

    /// Number of nodes in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for one node id, if the node exists
    pub fn row_for_node(&self, node_id: NodeId) -> Option<&CallTreeRow> {
        self.row_of_node.get(&node_id).map(|&index| &self.rows[index])
    }

    /// Node id carrying the given full callpath
    pub fn node_for_callpath(&self, full_callpath: &str) -> Option<NodeId> {
        self.by_full_callpath.get(full_callpath).copied()
    }

    /// Full callpath of one node id
    pub fn callpath_for_node(&self, node_id: NodeId) -> Option<&str> {
        self.row_for_node(node_id).map(|row| row.full_callpath.as_str())
    }
}

fn collect_rows(
    node: &CallTreeNode,
    prefix: Option<&str>,
    rows: &mut Vec<CallTreeRow>,
    by_full_callpath: &mut HashMap<String, NodeId>,
) {
    let full_callpath = match prefix {
        Some(prefix) => format!("{}{}{}", prefix, CALLPATH_SEPARATOR, node.function_name),
        None => node.function_name.clone(),
    };

    if let Some(existing) = by_full_callpath.get(&full_callpath) {
        warn!(
            "Duplicate callpath '{}' (nodes {} and {}), keeping the first for lookups",
            full_callpath, existing, node.node_id
        );
    } else {
        by_full_callpath.insert(full_callpath.clone(), node.node_id);
    }

    rows.push(CallTreeRow {
        node_id: node.node_id,
        parent_id: node.parent_id,
        short_callpath: node.function_name.clone(),
        full_callpath: full_callpath.clone(),
    });

    for child in &node.children {
        collect_rows(child, Some(&full_callpath), rows, by_full_callpath);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> CallTreeNode {
        let mut root = CallTreeNode::new(0, None, "main");
        let mut physics = CallTreeNode::new(1, None, "physics");
        physics.push_child(CallTreeNode::new(2, None, "integrate"));
        root.push_child(physics);
        root.push_child(CallTreeNode::new(3, None, "io"));
        root
    }

    #[test]
    fn test_full_callpaths_join_from_root() {
        let table = CallTreeTable::from_tree(&sample_tree());
        let paths: Vec<&str> = table.rows().iter().map(|r| r.full_callpath.as_str()).collect();
        assert_eq!(
            paths,
            vec!["main", "main/physics", "main/physics/integrate", "main/io"]
        );
    }

    #[test]
    fn test_short_callpath_is_function_name() {
        let table = CallTreeTable::from_tree(&sample_tree());
        assert_eq!(table.rows()[2].short_callpath, "integrate");
    }

    #[test]
    fn test_lookups_round_trip() {
        let table = CallTreeTable::from_tree(&sample_tree());
        assert_eq!(table.node_for_callpath("main/physics/integrate"), Some(2));
        assert_eq!(table.callpath_for_node(2), Some("main/physics/integrate"));
        assert_eq!(table.node_for_callpath("main/unknown"), None);
        assert_eq!(table.callpath_for_node(99), None);
    }

    #[test]
    fn test_duplicate_callpath_keeps_first() {
        // Two children with the same name under the same parent
        let mut root = CallTreeNode::new(0, None, "main");
        root.push_child(CallTreeNode::new(1, None, "work"));
        root.push_child(CallTreeNode::new(2, None, "work"));

        let table = CallTreeTable::from_tree(&root);
        assert_eq!(table.len(), 3);
        assert_eq!(table.node_for_callpath("main/work"), Some(1));
    }

    #[test]
    fn test_row_for_node() {
        let table = CallTreeTable::from_tree(&sample_tree());
        let row = table.row_for_node(3).unwrap();
        assert_eq!(row.full_callpath, "main/io");
        assert_eq!(row.parent_id, Some(0));
    }
}
