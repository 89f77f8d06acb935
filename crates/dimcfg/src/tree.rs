//! Generic property tree
//!
//! Built once from the document (bottom-up, children before parents) and read-only afterwards.
//! Nodes live in one arena and refer to their children by [NodeId].
use crate::dimension::Condition;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(NodeId),
    Scalar(Value),
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct MapEntry {
    /// `None` for anonymous entries (empty key or `-`)
    pub key: Option<String>,
    pub child: Child,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct ArrayEntry {
    pub child: Child,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Map(Vec<MapEntry>),
    Array(Vec<ArrayEntry>),
}

#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Arena builder, the last inserted node becomes the root
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn finish(self, root: NodeId) -> Tree {
        debug_assert!(root.0 < self.nodes.len(), "root must be inserted");
        Tree {
            nodes: self.nodes,
            root,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn children_before_parents() {
        let mut builder = TreeBuilder::default();
        let leaf = builder.insert(Node::Array(vec![ArrayEntry::new(
            Child::Scalar("a".into()),
            vec![],
        )]));
        let root = builder.insert(Node::Map(vec![MapEntry::new(
            Some("list".into()),
            Child::Node(leaf),
            vec![],
        )]));
        let tree = builder.finish(root);

        assert_eq!(tree.len(), 2);
        let Node::Map(entries) = tree.get(tree.root()) else {
            panic!("root must be a map");
        };
        assert_eq!(entries[0].child, Child::Node(leaf));
    }
}
