use std::fmt;

use treediff_core::{NodeRef, Range};

use crate::edit::{structural_upper_bound, Edit, EditHandle, EditStream};

/// A lazily materialised concatenation of sub-edits. While the backing
/// stream is still live, `cost()` returns an admissible bound built from the
/// structural maximum for the unexpanded tail plus the current cost of
/// every sub-edit already pulled; once exhausted, `cost()` is the exact sum.
pub struct CompoundEdit {
    from: NodeRef,
    to: Option<NodeRef>,
    stream: Option<EditStream>,
    sub_edits: Vec<EditHandle>,
    initial_cost: Range,
}

impl CompoundEdit {
    pub fn new(from: NodeRef, to: Option<NodeRef>, stream: EditStream) -> CompoundEdit {
        let initial_cost = Range::new(0, structural_upper_bound(&from, to.as_ref()));
        CompoundEdit { from, to, stream: Some(stream), sub_edits: Vec::new(), initial_cost }
    }

    pub fn from_node(&self) -> &NodeRef {
        &self.from
    }

    pub fn to_node(&self) -> Option<&NodeRef> {
        self.to.as_ref()
    }

    pub fn initial_cost(&self) -> Range {
        self.initial_cost
    }

    pub fn cost(&self) -> Range {
        if self.stream.is_some() {
            let mut bound = Range::new(0, structural_upper_bound(&self.from, self.to.as_ref()));
            for sub_edit in &self.sub_edits {
                let edit = sub_edit.borrow();
                bound = bound + edit.cost() - edit.initial_cost();
            }
            bound
        } else {
            self.sub_edits.iter().map(|e| e.borrow().cost()).sum()
        }
    }

    /// Pulls one sub-edit from the stream and absorbs it, flattening a
    /// nested `CompoundEdit` into this one's sub-edit list. Returns `false`
    /// once the stream is already exhausted (this call included).
    fn pull_one(&mut self) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };
        match stream.next() {
            Some(next_edit) => {
                self.stream = Some(stream);
                self.absorb(next_edit);
                true
            }
            None => false,
        }
    }

    /// A nested `CompoundEdit` is flattened by cloning its (now fully
    /// expanded) sub-edit handles into this one's list, not by moving them
    /// out: the same handle can legitimately still be reachable through the
    /// original nested edit elsewhere in the edit graph.
    fn absorb(&mut self, handle: EditHandle) {
        let is_compound = matches!(&*handle.borrow(), Edit::Compound(_));
        if is_compound {
            let mut guard = handle.borrow_mut();
            if let Edit::Compound(nested) = &mut *guard {
                self.sub_edits.extend(nested.sub_edits().iter().cloned());
            }
        } else {
            self.sub_edits.push(handle);
        }
    }

    fn force_full_expansion(&mut self) {
        while self.pull_one() {}
    }

    /// Advances the stream by one sub-edit, or, once exhausted, tightens the
    /// first sub-edit still able to. Returns `false` only once this edit is
    /// fully definitive.
    pub fn tighten_bounds(&mut self) -> bool {
        if self.pull_one() {
            return true;
        }
        for child in &self.sub_edits {
            if child.borrow_mut().tighten_bounds() {
                return true;
            }
        }
        false
    }

    /// The flattened, fully materialised sub-edit handles, in stream order.
    /// Forces complete expansion of the stream as a side effect.
    pub fn sub_edits(&mut self) -> &[EditHandle] {
        self.force_full_expansion();
        &self.sub_edits
    }
}

impl fmt::Debug for CompoundEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundEdit")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("sub_edits_len", &self.sub_edits.len())
            .field("stream_exhausted", &self.stream.is_none())
            .finish()
    }
}
