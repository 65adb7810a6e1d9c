use log::info;
use treediff_core::NodeRef;

use crate::dispatch;
use crate::edit::{AtomicEdit, Edit, EditHandle};

/// The result of diffing two trees: the root nodes that were compared, and
/// the flattened sequence of atomic edits the search settled on.
#[derive(Debug)]
pub struct Diff {
    pub from_root: NodeRef,
    pub to_root: NodeRef,
    pub edits: Vec<AtomicEdit>,
}

impl Diff {
    /// Total cost of the edit script. Every atomic edit is definitive by
    /// the time `explode_edits` returns it, so `lo()` and `hi()` agree.
    pub fn cost(&self) -> usize {
        self.edits.iter().map(|e| e.cost().hi()).sum()
    }
}

/// Computes the minimum-cost edit script turning `from` into `to`.
pub fn diff(from: NodeRef, to: NodeRef) -> Diff {
    let root_edit = dispatch::edits(from.clone(), to.clone());
    let edits = explode_edits(root_edit);
    info!("diff: settled on a {}-edit script costing {}", edits.len(), edits.iter().map(AtomicEdit::cost).map(|c| c.hi()).sum::<usize>());
    Diff { from_root: from, to_root: to, edits }
}

/// Forces `edit` fully definitive and flattens it into an ordered sequence
/// of atomic edits: a `Compound` contributes its sub-edits in stream order,
/// a `Possible` contributes whichever alternative the search converged on.
pub fn explode_edits(edit: EditHandle) -> Vec<AtomicEdit> {
    let mut out = Vec::new();
    explode_into(&edit, &mut out);
    out
}

fn explode_into(handle: &EditHandle, out: &mut Vec<AtomicEdit>) {
    while handle.borrow_mut().tighten_bounds() {}

    if let Edit::Atomic(atomic) = &*handle.borrow() {
        out.push(atomic.clone());
        return;
    }

    let sub_edits = {
        let mut guard = handle.borrow_mut();
        match &mut *guard {
            Edit::Compound(compound) => Some(compound.sub_edits().to_vec()),
            _ => None,
        }
    };
    if let Some(sub_edits) = sub_edits {
        for sub_edit in &sub_edits {
            explode_into(sub_edit, out);
        }
        return;
    }

    let best = {
        let guard = handle.borrow();
        match &*guard {
            Edit::Possible(possible) => possible.best_possibility(),
            _ => unreachable!("atomic and compound cases are already handled"),
        }
    };
    if let Some(best) = best {
        explode_into(&best, out);
    }
}
