use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use log::trace;
use treediff_core::{NodeRef, Range};

use crate::edit::{is_less, EditHandle, EditStream};

/// A heap entry wrapping a candidate edit handle with its last-known cost
/// lower bound. `Ord` is reversed (smaller `priority` sorts greater) the same
/// way a Dijkstra-style open set turns `BinaryHeap`'s max-heap into a
/// min-heap; ties fall back to insertion sequence so the earliest-seen
/// candidate wins, matching `PossibleEdits`'s documented tie-break.
struct Candidate {
    edit: EditHandle,
    priority: usize,
    seq: u64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.cmp(&self.priority).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A lazy disjunction ("choose cheapest") over a stream of alternative
/// edits between the same `from`/`to` pair, pruned by dominance as new
/// alternatives arrive.
pub struct PossibleEdits {
    from: NodeRef,
    to: NodeRef,
    stream: Option<EditStream>,
    heap: BinaryHeap<Candidate>,
    tightened: Vec<Candidate>,
    next_seq: u64,
    initial_cost: Range,
}

impl PossibleEdits {
    pub fn new(from: NodeRef, to: NodeRef, stream: EditStream) -> PossibleEdits {
        let initial_cost = Range::new(0, from.total_size().max(to.total_size()) + 1);
        PossibleEdits {
            from,
            to,
            stream: Some(stream),
            heap: BinaryHeap::new(),
            tightened: Vec::new(),
            next_seq: 0,
            initial_cost,
        }
    }

    pub fn from_node(&self) -> &NodeRef {
        &self.from
    }

    pub fn to_node(&self) -> Option<&NodeRef> {
        Some(&self.to)
    }

    pub fn initial_cost(&self) -> Range {
        self.initial_cost
    }

    fn push_candidate(&mut self, edit: EditHandle) {
        let priority = edit.borrow().cost().lo();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Candidate { edit, priority, seq });
    }

    /// Pulls the next alternative from the stream. If the current
    /// cheapest-known candidate already strictly dominates it, the new
    /// alternative is discarded unexamined; otherwise it joins the heap.
    fn pull_one_alternative(&mut self) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };
        match stream.next() {
            Some(next_alt) => {
                self.stream = Some(stream);
                let dominated = match self.heap.pop() {
                    Some(mut top) => {
                        let dominated = is_less(&top.edit, &next_alt);
                        top.priority = top.edit.borrow().cost().lo();
                        self.heap.push(top);
                        dominated
                    }
                    None => false,
                };
                if dominated {
                    trace!("PossibleEdits: discarding a dominated alternative");
                } else {
                    self.push_candidate(next_alt);
                }
                true
            }
            None => false,
        }
    }

    /// Advances the alternatives stream by one, or, once it is exhausted,
    /// tightens the cheapest still-tightening candidate. Returns `false`
    /// only once every alternative is definitive.
    pub fn tighten_bounds(&mut self) -> bool {
        if self.pull_one_alternative() {
            return true;
        }
        if let Some(mut candidate) = self.heap.pop() {
            if candidate.edit.borrow_mut().tighten_bounds() {
                candidate.priority = candidate.edit.borrow().cost().lo();
                self.heap.push(candidate);
            } else {
                self.tightened.push(candidate);
            }
            return true;
        }
        false
    }

    pub fn cost(&self) -> Range {
        if self.stream.is_some() {
            return self.initial_cost;
        }
        let mut lo: Option<usize> = None;
        let mut hi = 0usize;
        for candidate in self.heap.iter().chain(self.tightened.iter()) {
            let c = candidate.edit.borrow().cost();
            lo = Some(lo.map_or(c.lo(), |l| l.min(c.lo())));
            hi = hi.max(c.hi());
        }
        match lo {
            Some(lo) => Range::new(lo, hi),
            // No alternative was ever produced (e.g. two empty lists): there is
            // nothing to transform, so the cost is trivially zero.
            None => Range::exact(0),
        }
    }

    /// The alternative with the smallest known upper bound, scanning
    /// heap-then-tightened and keeping the first-seen edit on ties.
    pub fn best_possibility(&self) -> Option<EditHandle> {
        let mut best: Option<&Candidate> = None;
        for candidate in self.heap.iter().chain(self.tightened.iter()) {
            let better = match best {
                None => true,
                Some(current) => {
                    candidate.edit.borrow().cost().hi() < current.edit.borrow().cost().hi()
                }
            };
            if better {
                best = Some(candidate);
            }
        }
        best.map(|c| c.edit.clone())
    }
}

impl fmt::Debug for PossibleEdits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PossibleEdits")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("heap_len", &self.heap.len())
            .field("tightened_len", &self.tightened.len())
            .field("stream_exhausted", &self.stream.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{match_edit, replace_edit};
    use treediff_core::Node;

    fn two_alternatives() -> PossibleEdits {
        let from = Node::leaf_str("aaaa");
        let to = Node::leaf_str("bbbb");
        let alts = vec![
            replace_edit(from.clone(), to.clone()),
            match_edit(from.clone(), to.clone(), 4),
        ];
        PossibleEdits::new(from, to, Box::new(alts.into_iter()))
    }

    #[test]
    fn cost_is_structural_bound_until_stream_closes() {
        let possible = two_alternatives();
        assert_eq!(possible.cost(), possible.initial_cost());
    }

    #[test]
    fn tightening_converges_on_the_cheaper_alternative() {
        let mut possible = two_alternatives();
        while possible.tighten_bounds() {}
        assert!(possible.cost().definitive());
        // Match costs 4 (definitive from construction), Replace costs 5; the
        // dominance check should have pruned Replace once Match's exact cost
        // was known, or at worst both survive and best_possibility finds it.
        assert_eq!(possible.cost().hi(), 4);
        let best = possible.best_possibility().expect("a best possibility exists");
        assert_eq!(best.borrow().cost(), Range::exact(4));
    }

    #[test]
    fn empty_stream_has_zero_cost() {
        let from = Node::list(vec![]);
        let to = Node::list(vec![]);
        let mut possible = PossibleEdits::new(from, to, Box::new(std::iter::empty()));
        while possible.tighten_bounds() {}
        assert_eq!(possible.cost(), Range::exact(0));
        assert!(possible.best_possibility().is_none());
    }
}
