use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::trace;
use treediff_core::{NodeRef, Range};

use crate::compound::CompoundEdit;
use crate::possible::PossibleEdits;

/// Edits are shared, mutable nodes: the same sub-edit can legitimately be
/// embedded under more than one parent at once (the list alignment
/// generator's Cartesian-product branch does exactly this, pairing one
/// `Replace`-or-deep-edit option against many different tail alignments).
/// `Rc<RefCell<_>>` is the natural Rust shape for that shared-mutable graph.
pub type EditHandle = Rc<RefCell<Edit>>;

pub(crate) fn new_handle(edit: Edit) -> EditHandle {
    Rc::new(RefCell::new(edit))
}

/// A lazily-produced, single-pass sequence of candidate edits. Streams are
/// not restartable and must not be cloned; [`CompoundEdit`] and
/// [`PossibleEdits`] each own exactly one.
pub type EditStream = Box<dyn Iterator<Item = EditHandle>>;

/// The four atomic, indivisible edits: relabel, replace, remove, insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicKind {
    Match,
    Replace,
    Remove,
    Insert,
}

impl fmt::Display for AtomicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtomicKind::Match => "Match",
            AtomicKind::Replace => "Replace",
            AtomicKind::Remove => "Remove",
            AtomicKind::Insert => "Insert",
        };
        f.write_str(name)
    }
}

/// A `Match`, `Replace`, `Remove`, or `Insert` edit. Atomic edits have a
/// constant cost fixed at construction; `tighten_bounds` is always a no-op.
#[derive(Debug, Clone)]
pub struct AtomicEdit {
    pub kind: AtomicKind,
    pub from: NodeRef,
    pub to: Option<NodeRef>,
    cost: Range,
}

impl AtomicEdit {
    pub fn cost(&self) -> Range {
        self.cost
    }
}

/// Relabels `from` as `to` at the given fixed cost (typically a Levenshtein
/// distance between rendered leaves, or `0` for a structural match).
pub fn match_edit(from: NodeRef, to: NodeRef, cost: usize) -> EditHandle {
    new_handle(Edit::Atomic(AtomicEdit {
        kind: AtomicKind::Match,
        from,
        to: Some(to),
        cost: Range::exact(cost),
    }))
}

/// Replaces `from` with `to` wholesale, at `max(sizes) + 1`.
pub fn replace_edit(from: NodeRef, to: NodeRef) -> EditHandle {
    let cost = from.total_size().max(to.total_size()) + 1;
    new_handle(Edit::Atomic(AtomicEdit {
        kind: AtomicKind::Replace,
        from,
        to: Some(to),
        cost: Range::exact(cost),
    }))
}

/// Removes `node` from `parent`, at `node.total_size() + 1`.
pub fn remove_edit(node: NodeRef, parent: NodeRef) -> EditHandle {
    let cost = node.total_size() + 1;
    new_handle(Edit::Atomic(AtomicEdit {
        kind: AtomicKind::Remove,
        from: node,
        to: Some(parent),
        cost: Range::exact(cost),
    }))
}

/// Inserts `node` into `parent`, at `node.total_size() + 1`.
pub fn insert_edit(node: NodeRef, parent: NodeRef) -> EditHandle {
    let cost = node.total_size() + 1;
    new_handle(Edit::Atomic(AtomicEdit {
        kind: AtomicKind::Insert,
        from: node,
        to: Some(parent),
        cost: Range::exact(cost),
    }))
}

/// The structural upper bound `from.total_size() + to.total_size() + 1` (or
/// `from.total_size() + 1` when `to` is absent), used as the initial cost
/// ceiling for an edit that has not yet examined any alternative.
pub(crate) fn structural_upper_bound(from: &NodeRef, to: Option<&NodeRef>) -> usize {
    from.total_size() + 1 + to.map_or(0, |t| t.total_size())
}

/// One node of the edit tree: an atomic edit, a sequential composition, or
/// a disjunction of alternatives.
#[derive(Debug)]
pub enum Edit {
    Atomic(AtomicEdit),
    Compound(CompoundEdit),
    Possible(PossibleEdits),
}

impl Edit {
    pub fn from_node(&self) -> &NodeRef {
        match self {
            Edit::Atomic(a) => &a.from,
            Edit::Compound(c) => c.from_node(),
            Edit::Possible(p) => p.from_node(),
        }
    }

    pub fn to_node(&self) -> Option<&NodeRef> {
        match self {
            Edit::Atomic(a) => a.to.as_ref(),
            Edit::Compound(c) => c.to_node(),
            Edit::Possible(p) => p.to_node(),
        }
    }

    /// Current `[lo, hi]` cost bound. Never widens across calls to
    /// `tighten_bounds`.
    pub fn cost(&self) -> Range {
        match self {
            Edit::Atomic(a) => a.cost(),
            Edit::Compound(c) => c.cost(),
            Edit::Possible(p) => p.cost(),
        }
    }

    /// The cost bound captured the moment this edit was created, before any
    /// tightening. Used by `CompoundEdit` to maintain its running bound
    /// incrementally.
    pub fn initial_cost(&self) -> Range {
        match self {
            Edit::Atomic(a) => a.cost(),
            Edit::Compound(c) => c.initial_cost(),
            Edit::Possible(p) => p.initial_cost(),
        }
    }

    /// Performs one unit of work: advances a lazy stream, or refines a
    /// child's bounds. Returns `false` once the edit is fully definitive.
    pub fn tighten_bounds(&mut self) -> bool {
        match self {
            Edit::Atomic(_) => false,
            Edit::Compound(c) => c.tighten_bounds(),
            Edit::Possible(p) => p.tighten_bounds(),
        }
    }

    pub fn is_definitive(&self) -> bool {
        self.cost().definitive()
    }
}

/// Result of comparing two edits via [`compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Greater,
    Equal,
    Incomparable,
}

/// Compares `a` and `b` by repeatedly tightening whichever side can still
/// tighten, until their bounds become disjoint (a definite `Less`/`Greater`),
/// both become definitive (an `Equal`/`Incomparable` verdict), or neither
/// side can make further progress. This is the engine's fundamental
/// refinement driver: asking for a comparison forces useful search work, and
/// the side effect is visible here rather than hidden behind an operator.
pub fn compare(a: &EditHandle, b: &EditHandle) -> Comparison {
    if Rc::ptr_eq(a, b) {
        return Comparison::Equal;
    }
    loop {
        let (ca, cb) = (a.borrow().cost(), b.borrow().cost());
        if ca.is_less(&cb) {
            return Comparison::Less;
        }
        if cb.is_less(&ca) {
            return Comparison::Greater;
        }
        if ca.definitive() && cb.definitive() {
            return if ca.lo() == cb.lo() { Comparison::Equal } else { Comparison::Incomparable };
        }
        let tightened_a = a.borrow_mut().tighten_bounds();
        let tightened_b = b.borrow_mut().tighten_bounds();
        if !tightened_a && !tightened_b {
            trace!("compare: neither side could tighten further, declaring incomparable");
            return Comparison::Incomparable;
        }
    }
}

/// Shorthand for `compare(a, b) == Comparison::Less`, the relation
/// `PossibleEdits` uses to decide whether a new alternative is dominated.
pub fn is_less(a: &EditHandle, b: &EditHandle) -> bool {
    compare(a, b) == Comparison::Less
}

#[cfg(test)]
mod tests {
    use super::*;
    use treediff_core::Node;

    #[test]
    fn match_cost_is_definitive_from_construction() {
        let edit = match_edit(Node::leaf_str("foo"), Node::leaf_str("bar"), 3);
        assert_eq!(edit.borrow().cost(), Range::exact(3));
        assert!(edit.borrow().is_definitive());
    }

    #[test]
    fn replace_cost_is_max_size_plus_one() {
        let edit = replace_edit(Node::leaf_str("ab"), Node::leaf_str("xyz"));
        assert_eq!(edit.borrow().cost(), Range::exact(4));
    }

    #[test]
    fn remove_and_insert_cost_is_size_plus_one() {
        let parent = Node::list(vec![]);
        let child = Node::leaf_str("abcd");
        let remove = remove_edit(child.clone(), parent.clone());
        let insert = insert_edit(child, parent);
        assert_eq!(remove.borrow().cost(), Range::exact(5));
        assert_eq!(insert.borrow().cost(), Range::exact(5));
    }

    #[test]
    fn atomic_tighten_bounds_is_a_no_op() {
        let edit = match_edit(Node::leaf_int(1), Node::leaf_int(2), 1);
        assert!(!edit.borrow_mut().tighten_bounds());
    }

    #[test]
    fn compare_resolves_definite_atomic_edits() {
        let cheap = match_edit(Node::leaf_int(1), Node::leaf_int(1), 0);
        let pricey = replace_edit(Node::leaf_str("hello"), Node::leaf_str("goodbye"));
        assert_eq!(compare(&cheap, &pricey), Comparison::Less);
        assert_eq!(compare(&pricey, &cheap), Comparison::Greater);
    }

    #[test]
    fn compare_reports_equal_for_same_definite_cost() {
        let a = match_edit(Node::leaf_int(1), Node::leaf_int(2), 4);
        let b = replace_edit(Node::leaf_str("abc"), Node::leaf_str("wxy"));
        assert_eq!(compare(&a, &b), Comparison::Equal);
    }

    #[test]
    fn compare_is_reflexive_for_a_shared_handle() {
        let a = match_edit(Node::leaf_int(1), Node::leaf_int(2), 4);
        assert_eq!(compare(&a, &a), Comparison::Equal);
    }
}
