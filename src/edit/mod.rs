//! Edit-sequence computation: alignment, classification and offset-tracking replay.

pub mod align;
pub mod classify;
pub mod replay;

pub use align::{Alignment, EditOp, OpKind, align, align_str};
pub use classify::{OpMix, classify};
pub use replay::{Replay, ReplayStep, apply_ops, verify_alignment};
