//! Transfer planning: measure each cluster member's top run and elect the
//! consolidation target.

use crate::board::{Board, Unit};
use crate::cluster::Cluster;
use crate::hex::Axial;

/// One source's contribution: the run it gives up, bottom to top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub source: Axial,
    pub units: Vec<Unit>,
}

/// Where a cluster consolidates and what moves there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub color: u8,
    pub target: Axial,
    /// Run length the target already holds before any transfer.
    pub target_run: usize,
    /// Every non-target member, in cluster discovery order.
    pub transfers: Vec<Transfer>,
}

impl TransferPlan {
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Units moving onto the target in this step.
    pub fn moved_units(&self) -> usize {
        self.transfers.iter().map(|t| t.units.len()).sum()
    }

    pub fn sources(&self) -> impl Iterator<Item = Axial> + '_ {
        self.transfers.iter().map(|t| t.source)
    }
}

/// Build the plan for `cluster`, triggered at `trigger`.
///
/// The target is the member with the strictly greatest run. When the trigger
/// shares the maximum it wins. Among other members sharing the maximum, the
/// first in discovery order wins.
pub fn plan(board: &Board, cluster: &Cluster, trigger: Axial) -> TransferPlan {
    let color = cluster.color;
    let runs: Vec<(Axial, &[Unit])> = cluster
        .members
        .iter()
        .filter_map(|&at| {
            let cell = board.get(at)?;
            let n = cell.run_of(color);
            Some((at, &cell.stack[cell.stack.len() - n..]))
        })
        .collect();

    let mut target = trigger;
    let mut best = 0usize;
    for &(at, run) in &runs {
        if run.len() > best {
            best = run.len();
            target = at;
        } else if run.len() == best && at == trigger {
            target = trigger;
        }
    }

    let transfers = runs
        .into_iter()
        .filter(|&(at, run)| at != target && !run.is_empty())
        .map(|(source, run)| Transfer {
            source,
            units: run.to_vec(),
        })
        .collect();

    TransferPlan {
        color,
        target,
        target_run: best,
        transfers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::units;
    use crate::cluster::resolve;

    fn setup(stacks: &[((i32, i32), &[u8])]) -> Board {
        let mut board = Board::new(2);
        for &((q, r), colors) in stacks {
            board.set_stack(Axial::new(q, r), units(colors));
        }
        board
    }

    #[test]
    fn longest_run_becomes_target() {
        let board = setup(&[((0, 0), &[1, 1]), ((1, 0), &[1, 1, 1])]);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        let plan = plan(&board, &cluster, Axial::ORIGIN);
        assert_eq!(plan.target, Axial::new(1, 0));
        assert_eq!(plan.target_run, 3);
        assert_eq!(plan.transfers.len(), 1);
        assert_eq!(plan.transfers[0].source, Axial::ORIGIN);
        assert_eq!(plan.transfers[0].units, units(&[1, 1]));
    }

    #[test]
    fn trigger_wins_ties_at_maximum() {
        let board = setup(&[((0, 0), &[4, 4]), ((1, 0), &[4, 4]), ((-1, 0), &[4, 4])]);
        let trigger = Axial::new(-1, 0);
        let cluster = resolve(&board, trigger).unwrap();
        let plan = plan(&board, &cluster, trigger);
        assert_eq!(plan.target, trigger);
        assert_eq!(plan.moved_units(), 4);
    }

    #[test]
    fn trigger_wins_tie_even_when_discovered_after_the_leader() {
        // Cluster built from (0,0) but plan elected with trigger (1,0), which
        // appears after (0,0) in discovery order and ties with it.
        let board = setup(&[((0, 0), &[2, 2, 2]), ((1, 0), &[2, 2, 2]), ((0, 1), &[2])]);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        let plan = plan(&board, &cluster, Axial::new(1, 0));
        assert_eq!(plan.target, Axial::new(1, 0));
    }

    /// Non-trigger ties resolve to the first discovered member. This follows
    /// traversal order rather than any deliberate rule, but it is stable for a
    /// given board.
    #[test]
    fn non_trigger_tie_goes_to_first_discovered() {
        let board = setup(&[
            ((0, 0), &[3]),
            ((1, 0), &[3, 3, 3]),
            ((-1, 0), &[3, 3, 3]),
        ]);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        assert_eq!(cluster.members[1], Axial::new(1, 0));
        let plan = plan(&board, &cluster, Axial::ORIGIN);
        assert_eq!(plan.target, Axial::new(1, 0));
        let sources: Vec<Axial> = plan.sources().collect();
        assert_eq!(sources, vec![Axial::ORIGIN, Axial::new(-1, 0)]);
    }

    #[test]
    fn only_top_run_is_planned() {
        let board = setup(&[((0, 0), &[0, 5, 5, 5]), ((1, 0), &[5, 0, 5])]);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        let plan = plan(&board, &cluster, Axial::ORIGIN);
        assert_eq!(plan.target, Axial::ORIGIN);
        assert_eq!(plan.transfers[0].units, units(&[5]));
    }
}
