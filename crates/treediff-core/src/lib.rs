/*!
This crate provides the data model shared by the treediff edit search engine:
interval-valued cost bounds (`Range`), the classical Levenshtein string
distance primitive, and the `Node` tree representation (leaves, key-value
pairs, and ordered lists, with maps realised as sorted lists of pairs).

Trees built from this crate are immutable once constructed; `Node::total_size`
is computed lazily and memoised per node.
*/

mod levenshtein;
mod node;
mod range;

pub use levenshtein::levenshtein_distance;
pub use node::{KeyValuePairData, Leaf, Node, NodeRef};
pub use range::Range;
