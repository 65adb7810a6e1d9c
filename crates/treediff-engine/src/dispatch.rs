use log::debug;
use treediff_core::{levenshtein_distance, NodeRef};

use crate::align::align;
use crate::edit::{match_edit, new_handle, replace_edit, Edit, EditHandle};
use crate::possible::PossibleEdits;

/// Builds the edit between a `from`/`to` node pair, dispatching on their
/// shapes. This is the single place node-kind-specific diffing logic lives;
/// everything above it (`align`, `CompoundEdit`, `PossibleEdits`) is
/// agnostic to what kind of node it is holding.
pub(crate) fn edits(from: NodeRef, to: NodeRef) -> EditHandle {
    if let (Some(from_leaf), Some(to_leaf)) = (from.as_leaf(), to.as_leaf()) {
        let cost = levenshtein_distance(&from_leaf.render(), &to_leaf.render());
        debug!("leaf edit: {from_leaf} -> {to_leaf} costs {cost}");
        return match_edit(from, to, cost);
    }

    if let (Some(from_kv), Some(to_kv)) = (from.as_key_value(), to.as_key_value()) {
        let key_edit = edits(from_kv.key.clone(), to_kv.key.clone());
        let value_edit = edits(from_kv.value.clone(), to_kv.value.clone());
        let identity = match_edit(from.clone(), to.clone(), 0);
        return new_handle(Edit::Compound(crate::compound::CompoundEdit::new(
            from,
            Some(to),
            Box::new(vec![identity, key_edit, value_edit].into_iter()),
        )));
    }

    if from.is_list() && to.is_list() {
        // The alignment stream alone, no whole-list Replace alternative
        // mixed in: align's own Cartesian-product branch already covers the
        // pairwise-edit case with an element-level Replace, and
        // PossibleEdits pulls this stream one alternative at a time, never
        // eagerly, so dominance pruning can discard a candidate before the
        // rest of the (possibly exponential) tree is even built.
        let alternatives = align(from.clone(), to.clone());
        return new_handle(Edit::Possible(PossibleEdits::new(from, to, alternatives)));
    }

    // Mismatched shapes (e.g. a leaf against a list): nothing but a wholesale
    // replacement makes sense.
    replace_edit(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use treediff_core::Node;

    #[test]
    fn leaf_pair_dispatches_to_a_match_edit() {
        let edit = edits(Node::leaf_str("cat"), Node::leaf_str("bat"));
        assert!(matches!(&*edit.borrow(), Edit::Atomic(_)));
        assert_eq!(edit.borrow().cost().hi(), 1);
    }

    #[test]
    fn key_value_pair_dispatches_to_a_compound_of_key_and_value_edits() {
        let from = Node::key_value(Node::leaf_str("k"), Node::leaf_int(1));
        let to = Node::key_value(Node::leaf_str("k"), Node::leaf_int(2));
        let edit = edits(from, to);
        assert!(matches!(&*edit.borrow(), Edit::Compound(_)));
        let mut guard = edit.borrow_mut();
        while guard.tighten_bounds() {}
        assert_eq!(guard.cost().hi(), 1);
    }

    #[test]
    fn list_pair_dispatches_to_possible_edits() {
        let from = Node::list(vec![Node::leaf_int(1)]);
        let to = Node::list(vec![Node::leaf_int(1)]);
        let edit = edits(from, to);
        assert!(matches!(&*edit.borrow(), Edit::Possible(_)));
        let mut guard = edit.borrow_mut();
        while guard.tighten_bounds() {}
        assert_eq!(guard.cost().hi(), 0);
    }

    #[test]
    fn mismatched_shapes_fall_back_to_replace() {
        let edit = edits(Node::leaf_int(1), Node::list(vec![]));
        assert!(matches!(&*edit.borrow(), Edit::Atomic(_)));
    }
}
