/*!
The edit search engine: a lazy branch-and-bound enumeration over compound
and alternative edits, driven by interval-valued cost estimates
([`treediff_core::Range`]) that are incrementally tightened until
definitive.

The three load-bearing pieces are [`CompoundEdit`] (sequential composition
of a lazy sub-edit stream), [`PossibleEdits`] (a lazy disjunction over
alternatives, pruned by dominance), and [`align`] (the list alignment
generator that feeds candidate alignments to a `PossibleEdits` node). The
top-level entry points are [`diff`] and [`explode_edits`].
*/

mod align;
mod compound;
mod dispatch;
mod driver;
mod edit;
mod possible;

pub use compound::CompoundEdit;
pub use driver::{diff, explode_edits, Diff};
pub use edit::{AtomicEdit, AtomicKind, Comparison, Edit, EditHandle, EditStream};
pub use possible::PossibleEdits;
