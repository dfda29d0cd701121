//! Merge evaluation: pop a top run once it reaches the threshold.

use crate::board::{Unit, run_length};

/// Top-run length at which the run pops.
pub const MERGE_THRESHOLD: usize = 10;

/// Points per popped unit.
pub const POINTS_PER_UNIT: u32 = 10;

/// A pop the target's stack qualifies for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pop {
    pub color: u8,
    /// Popped units, bottom to top.
    pub units: Vec<Unit>,
    pub score_delta: u32,
}

impl Pop {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Check the top run of `stack` against `threshold`. Does not mutate; the
/// caller removes the run once the pop has been shown.
pub fn evaluate(stack: &[Unit], threshold: usize) -> Option<Pop> {
    let color = stack.last()?.color;
    let run = run_length(stack, color);
    if run < threshold {
        return None;
    }
    Some(Pop {
        color,
        units: stack[stack.len() - run..].to_vec(),
        score_delta: run as u32 * POINTS_PER_UNIT,
    })
}

/// Remove exactly `pop`'s run from the top of `stack`.
pub fn apply(stack: &mut Vec<Unit>, pop: &Pop) {
    debug_assert!(stack.ends_with(&pop.units));
    let keep = stack.len().saturating_sub(pop.units.len());
    stack.truncate(keep);
}
