//! Call-tree data model and traversal.
//!
//! A call tree is built once by the dump reader and is read-only for the
//! rest of the processing session. Every table downstream is keyed by the
//! integer node ids stored here.

use std::collections::HashMap;

/// Canonical identifier of a call-tree node, unique within one tree
pub type NodeId = u32;

/// One call-site in the profiled program's dynamic call graph.
///
/// Nodes own their children exclusively: the tree is acyclic and
/// connected, and exactly one node (the root) has no parent.
#[derive(Debug, Clone, PartialEq)]
pub struct CallTreeNode {
    /// Unique id, the canonical key used by every measurement table
    pub node_id: NodeId,

    /// Parent node id, `None` only for the root
    pub parent_id: Option<NodeId>,

    /// Name of the profiled function at this call site
    pub function_name: String,

    /// Child call sites, in dump order
    pub children: Vec<CallTreeNode>,
}

impl CallTreeNode {
    /// Create a node with no children
    ///
    /// **Public** - used by the dump reader and by tests building
    /// synthetic trees
    pub fn new(
        node_id: NodeId,
        parent_id: Option<NodeId>,
        function_name: impl Into<String>,
    ) -> Self {
        Self {
            node_id,
            parent_id,
            function_name: function_name.into(),
            children: Vec::new(),
        }
    }

    /// Attach a child, keeping its parent link consistent
    pub fn push_child(&mut self, mut child: CallTreeNode) {
        child.parent_id = Some(self.node_id);
        self.children.push(child);
    }

    /// Number of nodes in the subtree rooted here, including this node
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(CallTreeNode::node_count)
            .sum::<usize>()
    }

    /// Preorder traversal: a node before its children, children in
    /// stored order.
    ///
    /// **Public** - this is the order every per-node output of the crate
    /// follows
    pub fn iter(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Depth of every node in the subtree, this node at depth 0
    ///
    /// # Returns
    /// Mapping from node id to depth
    pub fn depths(&self) -> HashMap<NodeId, u32> {
        let mut levels = HashMap::new();
        collect_depths(self, 0, &mut levels);
        levels
    }
}

fn collect_depths(node: &CallTreeNode, level: u32, out: &mut HashMap<NodeId, u32>) {
    out.insert(node.node_id, level);
    for child in &node.children {
        collect_depths(child, level + 1, out);
    }
}

/// Depth-first preorder iterator over a call tree
pub struct Preorder<'a> {
    stack: Vec<&'a CallTreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a CallTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Children pushed in reverse so the first child is popped next
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
