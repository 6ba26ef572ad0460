//! Replaying source-relative edit operations against a progressively mutated sequence.
//!
//! Each op is applied at `op.position() + offset`, where `offset` is the net number of
//! inserts minus deletes applied so far. Positions are never recomputed by comparing strings.

use std::fmt::Debug;

use crate::edit::align::EditOp;
use crate::foundation::error::{EditMotionError, EditMotionResult};

/// One applied operation: where it landed and the sequence on either side of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayStep<'a, T> {
    pub op_index: usize,
    pub op: &'a EditOp<T>,
    pub live_position: usize,
    pub before: Vec<T>,
    pub after: Vec<T>,
}

/// Offset-tracking fold over an operation stream, yielded one step at a time.
///
/// Iteration stops after the first error.
pub struct Replay<'a, T> {
    ops: &'a [EditOp<T>],
    live: Vec<T>,
    offset: isize,
    next: usize,
}

impl<'a, T: PartialEq + Clone + Debug> Replay<'a, T> {
    pub fn new(source: &[T], ops: &'a [EditOp<T>]) -> Self {
        Self {
            ops,
            live: source.to_vec(),
            offset: 0,
            next: 0,
        }
    }

    /// The sequence as mutated by every op applied so far.
    pub fn live(&self) -> &[T] {
        &self.live
    }

    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Drive the fold to completion, returning the final sequence.
    pub fn finish(mut self) -> EditMotionResult<Vec<T>> {
        for step in self.by_ref() {
            step?;
        }
        Ok(self.live)
    }

    fn apply(&mut self, op_index: usize) -> EditMotionResult<ReplayStep<'a, T>> {
        let ops: &'a [EditOp<T>] = self.ops;
        let op = &ops[op_index];
        let live_position = op.position() as isize + self.offset;
        let len = self.live.len();
        if live_position < 0 {
            return Err(EditMotionError::invariant(format!(
                "op {op_index} ({op:?}) maps to negative live position {live_position}"
            )));
        }
        let live_position = live_position as usize;
        let before = self.live.clone();

        match op {
            EditOp::Insert { character, .. } => {
                if live_position > len {
                    return Err(EditMotionError::invariant(format!(
                        "op {op_index} ({op:?}) inserts at {live_position} past length {len}"
                    )));
                }
                self.live.insert(live_position, character.clone());
            }
            EditOp::Delete { character, .. } => {
                self.expect_at(op_index, op, live_position, character)?;
                self.live.remove(live_position);
            }
            EditOp::Replace {
                old_character,
                new_character,
                ..
            } => {
                self.expect_at(op_index, op, live_position, old_character)?;
                self.live[live_position] = new_character.clone();
            }
        }
        self.offset += op.offset_delta();

        Ok(ReplayStep {
            op_index,
            op,
            live_position,
            before,
            after: self.live.clone(),
        })
    }

    fn expect_at(
        &self,
        op_index: usize,
        op: &EditOp<T>,
        live_position: usize,
        expected: &T,
    ) -> EditMotionResult<()> {
        match self.live.get(live_position) {
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(EditMotionError::invariant(format!(
                "op {op_index} ({op:?}) expects {expected:?} at {live_position}, found {found:?}"
            ))),
            None => Err(EditMotionError::invariant(format!(
                "op {op_index} ({op:?}) addresses {live_position} past length {}",
                self.live.len()
            ))),
        }
    }
}

impl<'a, T: PartialEq + Clone + Debug> Iterator for Replay<'a, T> {
    type Item = EditMotionResult<ReplayStep<'a, T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.ops.len() {
            return None;
        }
        let idx = self.next;
        let step = self.apply(idx);
        self.next = if step.is_ok() { idx + 1 } else { self.ops.len() };
        Some(step)
    }
}

/// Apply `ops` to `source` with the offset rule and return the result.
pub fn apply_ops<T: PartialEq + Clone + Debug>(
    source: &[T],
    ops: &[EditOp<T>],
) -> EditMotionResult<Vec<T>> {
    Replay::new(source, ops).finish()
}

/// Require that `ops` replayed against `source` reconstructs `target` exactly.
pub fn verify_alignment<T: PartialEq + Clone + Debug>(
    source: &[T],
    target: &[T],
    ops: &[EditOp<T>],
) -> EditMotionResult<()> {
    let out = apply_ops(source, ops)?;
    if out != target {
        return Err(EditMotionError::invariant(format!(
            "replay produced {out:?}, expected {target:?}"
        )));
    }
    Ok(())
}
