use std::rc::Rc;

use treediff_core::NodeRef;

use crate::compound::CompoundEdit;
use crate::edit::{insert_edit, new_handle, remove_edit, replace_edit, Edit, EditHandle, EditStream};

/// Defers construction of `build`'s stream until the first call to `next`.
/// Recursive alignment calls itself lazily at every branch point, so without
/// this a call to `align` on two long lists would eagerly build the entire
/// exponential tree of alternatives before the search ever asked for one.
fn lazy<F>(build: F) -> EditStream
where
    F: FnOnce() -> EditStream + 'static,
{
    let mut build = Some(build);
    let mut inner: Option<EditStream> = None;
    Box::new(std::iter::from_fn(move || {
        if inner.is_none() {
            inner = Some(build.take().unwrap()());
        }
        inner.as_mut().unwrap().next()
    }))
}

type NodeList = Rc<Vec<NodeRef>>;

fn empty_compound(from: NodeRef, to: NodeRef) -> EditHandle {
    new_handle(Edit::Compound(CompoundEdit::new(from, Some(to), Box::new(std::iter::empty()))))
}

/// Chains `head` onto every alternative of `tail`, producing one
/// `CompoundEdit` per combination. `head` is cloned (an `Rc` bump) into each
/// combination rather than rebuilt, so a single deep edit computed for one
/// pairing is shared, not recomputed, across every tail alternative it is
/// combined with.
fn prefixed(from: NodeRef, to: NodeRef, head: EditHandle, tail: EditStream) -> EditStream {
    Box::new(tail.map(move |rest| {
        new_handle(Edit::Compound(CompoundEdit::new(
            from.clone(),
            Some(to.clone()),
            Box::new(vec![head.clone(), rest].into_iter()),
        )))
    }))
}

/// Enumerates every way to align the remaining suffixes `l1[i1..]` and
/// `l2[i2..]`, relative to the two top-level list nodes (every `Remove`
/// and `Insert` is always attributed to the outermost list, never to a
/// recursively-descended sublist). Each item of the returned stream is one
/// complete candidate alignment for the suffixes, expressed as a
/// `CompoundEdit`; the caller wraps the whole stream in a `PossibleEdits`
/// so the search can pick the cheapest.
fn align_rec(
    top_from: NodeRef,
    top_to: NodeRef,
    l1: NodeList,
    i1: usize,
    l2: NodeList,
    i2: usize,
) -> EditStream {
    lazy(move || -> EditStream {
        let (n1, n2) = (l1.len(), l2.len());
        if i1 == n1 && i2 == n2 {
            return Box::new(std::iter::once(empty_compound(top_from.clone(), top_to.clone())));
        }
        if i1 == n1 {
            let head = insert_edit(l2[i2].clone(), top_from.clone());
            let tail = align_rec(top_from.clone(), top_to.clone(), l1.clone(), i1, l2.clone(), i2 + 1);
            return prefixed(top_from.clone(), top_to.clone(), head, tail);
        }
        if i2 == n2 {
            let head = remove_edit(l1[i1].clone(), top_from.clone());
            let tail = align_rec(top_from.clone(), top_to.clone(), l1.clone(), i1 + 1, l2.clone(), i2);
            return prefixed(top_from.clone(), top_to.clone(), head, tail);
        }

        let remove_branch = {
            let head = remove_edit(l1[i1].clone(), top_from.clone());
            let tail = align_rec(top_from.clone(), top_to.clone(), l1.clone(), i1 + 1, l2.clone(), i2);
            prefixed(top_from.clone(), top_to.clone(), head, tail)
        };
        let insert_branch = {
            let head = insert_edit(l2[i2].clone(), top_from.clone());
            let tail = align_rec(top_from.clone(), top_to.clone(), l1.clone(), i1, l2.clone(), i2 + 1);
            prefixed(top_from.clone(), top_to.clone(), head, tail)
        };
        // The Cartesian product of {Replace, deep-edit} against every tail
        // alignment. Both this head set and the tail set are shared (by Rc,
        // not rebuilt) across every combination they appear in, so the tail
        // stream is collected once up front: a stream can only be consumed
        // a single time, but the same already-built alternative can be
        // cloned cheaply into as many combinations as it belongs to.
        let pair_branch: EditStream = {
            let tail_options: Vec<EditHandle> =
                align_rec(top_from.clone(), top_to.clone(), l1.clone(), i1 + 1, l2.clone(), i2 + 1)
                    .collect();
            let heads = [
                replace_edit(l1[i1].clone(), l2[i2].clone()),
                crate::dispatch::edits(l1[i1].clone(), l2[i2].clone()),
            ];
            let mut combinations = Vec::with_capacity(heads.len() * tail_options.len());
            for head in &heads {
                for tail in &tail_options {
                    combinations.push(new_handle(Edit::Compound(CompoundEdit::new(
                        top_from.clone(),
                        Some(top_to.clone()),
                        Box::new(vec![head.clone(), tail.clone()].into_iter()),
                    ))));
                }
            }
            Box::new(combinations.into_iter())
        };
        Box::new(remove_branch.chain(insert_branch).chain(pair_branch))
    })
}

/// The list alignment generator: every way of turning `from`'s children
/// into `to`'s children by removing, inserting, or pairwise-editing heads,
/// as a stream of whole-list `CompoundEdit` candidates ready to feed a
/// `PossibleEdits`.
pub(crate) fn align(from: NodeRef, to: NodeRef) -> EditStream {
    let l1 = Rc::new(from.as_list().expect("align is only called on list nodes").to_vec());
    let l2 = Rc::new(to.as_list().expect("align is only called on list nodes").to_vec());
    align_rec(from, to, l1, 0, l2, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::AtomicKind;
    use treediff_core::Node;

    fn costs(stream: EditStream) -> Vec<usize> {
        stream
            .map(|handle| {
                let mut edit = handle.borrow_mut();
                while edit.tighten_bounds() {}
                edit.cost().hi()
            })
            .collect()
    }

    #[test]
    fn aligning_two_empty_lists_yields_one_zero_cost_option() {
        let a = Node::list(vec![]);
        let b = Node::list(vec![]);
        let options = costs(align(a, b));
        assert_eq!(options, vec![0]);
    }

    #[test]
    fn aligning_empty_against_nonempty_forces_all_inserts() {
        let a = Node::list(vec![]);
        let b = Node::list(vec![Node::leaf_int(1), Node::leaf_int(2)]);
        let options = costs(align(a, b));
        // Only one alignment is possible: insert both elements.
        assert_eq!(options, vec![2 + 2]);
    }

    #[test]
    fn aligning_singletons_offers_match_and_remove_insert_alternatives() {
        let a = Node::list(vec![Node::leaf_int(1)]);
        let b = Node::list(vec![Node::leaf_int(1)]);
        let mut stream = align(a, b);
        let first = stream.next().expect("at least one alignment option");
        let edit = first.borrow();
        // The cheapest branch order places the paired-head option last in
        // program order but every alternative should still resolve.
        let _ = edit.cost();
        drop(edit);
        let remaining: Vec<_> = stream.collect();
        assert!(!remaining.is_empty());
    }

    #[test]
    fn remove_and_insert_always_target_the_top_level_list() {
        let a = Node::list(vec![Node::leaf_int(1), Node::leaf_int(2)]);
        let b = Node::list(vec![]);
        let mut stream = align(a.clone(), b);
        let only = stream.next().expect("pure-remove alignment exists");
        let mut compound = only.borrow_mut();
        let sub_edits_ptr = match &mut *compound {
            Edit::Compound(c) => c.sub_edits().to_vec(),
            _ => panic!("expected a compound edit"),
        };
        for sub in sub_edits_ptr {
            if let Edit::Atomic(atomic) = &*sub.borrow() {
                assert_eq!(atomic.kind, AtomicKind::Remove);
                assert_eq!(atomic.to.as_ref().unwrap(), &a);
            }
        }
    }
}
