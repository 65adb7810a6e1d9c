use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// Trees are immutable and shared between the input documents and every
/// edit derived from them, so nodes are handed out behind an `Rc`.
pub type NodeRef = Rc<Node>;

/// The scalar payload of a leaf node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Leaf {
    Int(i64),
    Str(String),
}

impl Leaf {
    /// Canonical textual form used both for `total_size` and for the
    /// Levenshtein comparison between two leaves.
    pub fn render(&self) -> String {
        match self {
            Leaf::Int(value) => value.to_string(),
            Leaf::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A key-value pair owns one leaf key and one (possibly nested) value.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyValuePairData {
    pub key: NodeRef,
    pub value: NodeRef,
}

#[derive(Debug, PartialEq, Eq)]
enum NodeKind {
    Leaf(Leaf),
    KeyValuePair(KeyValuePairData),
    List(Vec<NodeRef>),
}

/// A node in a diffable tree: a leaf scalar, a key-value pair, or an
/// ordered list of children. A map is represented as a `List` whose
/// children are `KeyValuePair` nodes sorted by key at construction time
/// (see [`Node::map`]), it carries no separate tag because its edit
/// semantics are identical to a plain list's.
#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    total_size: OnceCell<usize>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}
impl Eq for Node {}

impl Node {
    fn new(kind: NodeKind) -> NodeRef {
        Rc::new(Node { kind, total_size: OnceCell::new() })
    }

    pub fn leaf_int(value: i64) -> NodeRef {
        Node::new(NodeKind::Leaf(Leaf::Int(value)))
    }

    pub fn leaf_str(value: impl Into<String>) -> NodeRef {
        Node::new(NodeKind::Leaf(Leaf::Str(value.into())))
    }

    /// Builds a key-value pair. `key` must be a leaf; this mirrors
    /// `build_tree`'s `force_leaf_node` constraint on map keys one level up.
    pub fn key_value(key: NodeRef, value: NodeRef) -> NodeRef {
        debug_assert!(key.as_leaf().is_some(), "map keys must be leaves");
        Node::new(NodeKind::KeyValuePair(KeyValuePairData { key, value }))
    }

    pub fn list(children: Vec<NodeRef>) -> NodeRef {
        Node::new(NodeKind::List(children))
    }

    /// Builds a map as a list of key-value pairs ordered by the key's
    /// natural order, the way `DictNode` sorts its entries at construction.
    pub fn map(mut entries: Vec<(String, NodeRef)>) -> NodeRef {
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        let children = entries
            .into_iter()
            .map(|(key, value)| Node::key_value(Node::leaf_str(key), value))
            .collect();
        Node::list(children)
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_key_value(&self) -> Option<&KeyValuePairData> {
        match &self.kind {
            NodeKind::KeyValuePair(kv) => Some(kv),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[NodeRef]> {
        match &self.kind {
            NodeKind::List(children) => Some(children),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.as_leaf().is_some()
    }

    pub fn is_list(&self) -> bool {
        self.as_list().is_some()
    }

    /// Total rendered size of the subtree, computed once and memoised.
    pub fn total_size(&self) -> usize {
        *self.total_size.get_or_init(|| match &self.kind {
            NodeKind::Leaf(leaf) => leaf.render().chars().count(),
            NodeKind::KeyValuePair(kv) => kv.key.total_size() + kv.value.total_size(),
            NodeKind::List(children) => children.iter().map(|c| c.total_size()).sum(),
        })
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Leaf(leaf) => write!(f, "{leaf}"),
            NodeKind::KeyValuePair(kv) => write!(f, "{}: {}", kv.key, kv.value),
            NodeKind::List(children) => {
                f.write_str("[")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_total_size_is_rendered_length() {
        assert_eq!(Node::leaf_str("foo").total_size(), 3);
        assert_eq!(Node::leaf_int(123).total_size(), 3);
        assert_eq!(Node::leaf_int(-5).total_size(), 2);
    }

    #[test]
    fn list_total_size_sums_children() {
        let list = Node::list(vec![Node::leaf_int(1), Node::leaf_str("ab")]);
        assert_eq!(list.total_size(), 3);
    }

    #[test]
    fn kv_total_size_is_key_plus_value() {
        let kv = Node::key_value(Node::leaf_str("k"), Node::leaf_str("value"));
        assert_eq!(kv.total_size(), 1 + 5);
    }

    #[test]
    fn map_entries_are_sorted_by_key() {
        let map = Node::map(vec![
            ("zeta".to_string(), Node::leaf_int(1)),
            ("alpha".to_string(), Node::leaf_int(2)),
        ]);
        let children = map.as_list().unwrap();
        let keys: Vec<_> = children
            .iter()
            .map(|c| c.as_key_value().unwrap().key.as_leaf().unwrap().render())
            .collect();
        assert_eq!(keys, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn total_size_is_memoised() {
        let node = Node::leaf_str("cached");
        assert_eq!(node.total_size(), node.total_size());
    }

    #[test]
    fn structural_equality_ignores_the_size_cache() {
        let a = Node::leaf_str("x");
        let b = Node::leaf_str("x");
        let _ = a.total_size();
        assert_eq!(a, b);
    }
}
