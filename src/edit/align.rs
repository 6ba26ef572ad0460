//! Minimum edit-sequence alignment (Wagner–Fischer with a fixed backtracking order).
//!
//! Operation positions are *source-relative*: they index the original source as it is consumed
//! during backtracking. [`crate::edit::replay`] turns them into live positions by threading a
//! running offset through the sequence.

/// One character-level edit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditOp<T = char> {
    /// Insert `character` so that it becomes the element at `position`.
    Insert { position: usize, character: T },
    /// Remove the element at `position`, which must equal `character`.
    Delete { position: usize, character: T },
    /// Overwrite the element at `position`, which must equal `old_character`.
    Replace {
        position: usize,
        old_character: T,
        new_character: T,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    Insert,
    Delete,
    Replace,
}

impl<T> EditOp<T> {
    pub fn position(&self) -> usize {
        match self {
            Self::Insert { position, .. }
            | Self::Delete { position, .. }
            | Self::Replace { position, .. } => *position,
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Self::Insert { .. } => OpKind::Insert,
            Self::Delete { .. } => OpKind::Delete,
            Self::Replace { .. } => OpKind::Replace,
        }
    }

    /// Shift this op applies to the positions of every later op.
    pub fn offset_delta(&self) -> isize {
        match self {
            Self::Insert { .. } => 1,
            Self::Delete { .. } => -1,
            Self::Replace { .. } => 0,
        }
    }
}

/// Minimum edit distance together with one canonical operation sequence achieving it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Alignment<T = char> {
    pub distance: usize,
    pub ops: Vec<EditOp<T>>,
}

/// Cost grid: cell `(i, j)` holds the minimum number of edits turning `source[..i]` into
/// `target[..j]`. Stored row-major, `rows = |source|+1`, `cols = |target|+1`.
struct AlignmentTable {
    cols: usize,
    cells: Vec<usize>,
}

impl AlignmentTable {
    fn fill<T: PartialEq>(source: &[T], target: &[T]) -> Self {
        let rows = source.len() + 1;
        let cols = target.len() + 1;
        let mut cells = vec![0usize; rows * cols];

        for i in 0..rows {
            cells[i * cols] = i;
        }
        for (j, cell) in cells.iter_mut().take(cols).enumerate() {
            *cell = j;
        }

        for i in 1..rows {
            for j in 1..cols {
                let diag = cells[(i - 1) * cols + (j - 1)];
                cells[i * cols + j] = if source[i - 1] == target[j - 1] {
                    diag
                } else {
                    let up = cells[(i - 1) * cols + j];
                    let left = cells[i * cols + (j - 1)];
                    1 + diag.min(up).min(left)
                };
            }
        }

        Self { cols, cells }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }

    /// Walk back from the bottom-right corner. Check order (match, replace, delete, insert) is
    /// the tie-break between equal-cost paths and must stay fixed.
    fn backtrack<T: PartialEq + Clone>(&self, source: &[T], target: &[T]) -> Vec<EditOp<T>> {
        let (mut i, mut j) = (source.len(), target.len());
        let mut ops = Vec::with_capacity(self.get(i, j));

        while i > 0 || j > 0 {
            let here = self.get(i, j);
            if i > 0 && j > 0 && source[i - 1] == target[j - 1] {
                i -= 1;
                j -= 1;
            } else if i > 0 && j > 0 && here == self.get(i - 1, j - 1) + 1 {
                ops.push(EditOp::Replace {
                    position: i - 1,
                    old_character: source[i - 1].clone(),
                    new_character: target[j - 1].clone(),
                });
                i -= 1;
                j -= 1;
            } else if i > 0 && here == self.get(i - 1, j) + 1 {
                ops.push(EditOp::Delete {
                    position: i - 1,
                    character: source[i - 1].clone(),
                });
                i -= 1;
            } else {
                // j > 0 here: with j == 0 the delete branch always matches.
                ops.push(EditOp::Insert {
                    position: i,
                    character: target[j - 1].clone(),
                });
                j -= 1;
            }
        }

        ops.reverse();
        ops
    }
}

/// Compute the minimum edit distance from `source` to `target` and one canonical operation
/// sequence, ordered left to right.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(source_len = source.len(), target_len = target.len())
)]
pub fn align<T: PartialEq + Clone>(source: &[T], target: &[T]) -> Alignment<T> {
    let table = AlignmentTable::fill(source, target);
    let distance = table.get(source.len(), target.len());
    let ops = table.backtrack(source, target);
    debug_assert_eq!(ops.len(), distance);
    Alignment { distance, ops }
}

/// [`align`] over the Unicode scalar values of two strings.
pub fn align_str(source: &str, target: &str) -> Alignment<char> {
    let source: Vec<char> = source.chars().collect();
    let target: Vec<char> = target.chars().collect();
    align(&source, &target)
}
