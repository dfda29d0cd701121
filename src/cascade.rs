//! Cascade controller: cluster, lock, transfer, merge, unlock, repeat.
//!
//! A cascade keeps a LIFO work list of trigger cells instead of recursing.
//! The top frame is the active trigger. After a step, the frame is replaced by
//! the step's target and every source that still holds units is pushed above
//! it, first source on top, so drained sources are revisited before the
//! target continues.
//!
//! Each animated step suspends the cascade until all of its tickets are
//! acknowledged. Board mutation only happens on that acknowledgment path, and
//! only to cells the cascade has locked.

use crate::board::Board;
use crate::cluster::{self, Cluster};
use crate::error::EngineError;
use crate::hex::Axial;
use crate::merge::{self, Pop};
use crate::presenter::{Owner, Presenter, SoundKind, Ticket, Tickets, sound_per_unit};
use crate::progress::Progress;
use crate::transfer::{self, TransferPlan};
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CascadeId(pub u64);

impl fmt::Display for CascadeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cascade-{}", self.0)
    }
}

/// Observable state of one cascade.
///
/// `Locked`, `Unlocked` and the `Scanning` that follows them are passed
/// through without suspending; a live cascade is only ever observed in
/// `Transferring` or `Merging`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    Scanning,
    Locked,
    Transferring,
    Merging,
    Unlocked,
    Done,
}

/// The cluster a step locked and what it moves.
#[derive(Debug, Clone)]
struct Step {
    members: Vec<Axial>,
    plan: TransferPlan,
}

#[derive(Debug, Clone)]
enum Phase {
    Scanning,
    Transferring { step: Step, outstanding: Vec<Ticket> },
    Merging { step: Step, pop: Pop, ticket: Ticket },
}

/// Everything a cascade touches while it runs, borrowed from the session.
pub(crate) struct Driver<'a, P: Presenter + ?Sized> {
    pub board: &'a mut Board,
    pub progress: &'a mut Progress,
    pub tickets: &'a mut Tickets,
    pub presenter: &'a mut P,
    pub threshold: usize,
}

#[derive(Debug, Clone)]
pub struct Cascade {
    id: CascadeId,
    work: Vec<Axial>,
    phase: Phase,
    steps: u32,
}

impl Cascade {
    pub(crate) fn new(id: CascadeId, trigger: Axial) -> Self {
        Self {
            id,
            work: vec![trigger],
            phase: Phase::Scanning,
            steps: 0,
        }
    }

    pub fn id(&self) -> CascadeId {
        self.id
    }

    pub fn state(&self) -> CascadeState {
        match self.phase {
            Phase::Transferring { .. } => CascadeState::Transferring,
            Phase::Merging { .. } => CascadeState::Merging,
            Phase::Scanning if self.work.is_empty() => CascadeState::Done,
            Phase::Scanning => CascadeState::Scanning,
        }
    }

    /// Cells this cascade currently holds locked.
    pub fn locked_cells(&self) -> &[Axial] {
        match &self.phase {
            Phase::Transferring { step, .. } | Phase::Merging { step, .. } => &step.members,
            Phase::Scanning => &[],
        }
    }

    /// Completed transfer steps so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    fn transition(&self, to: CascadeState, at: Axial) {
        debug!(cascade = %self.id, %at, state = ?to, "cascade transition");
    }

    /// Scan from the top frame until a step suspends or the work list is
    /// exhausted.
    pub(crate) fn run<P: Presenter + ?Sized>(&mut self, d: &mut Driver<'_, P>) -> CascadeState {
        while matches!(self.phase, Phase::Scanning) {
            let Some(&trigger) = self.work.last() else {
                break;
            };
            self.transition(CascadeState::Scanning, trigger);

            // Empty, locked or singleton: nothing sorts from this frame.
            let Some(cluster) = cluster::resolve(d.board, trigger).filter(Cluster::can_sort) else {
                self.work.pop();
                continue;
            };

            for &at in &cluster.members {
                d.board.set_locked(at, true);
            }
            self.transition(CascadeState::Locked, trigger);

            let plan = transfer::plan(d.board, &cluster, trigger);
            if plan.is_empty() {
                unlock(d.board, &cluster.members);
                self.work.pop();
                continue;
            }
            debug!(
                cascade = %self.id,
                %trigger,
                members = cluster.len(),
                target = %plan.target,
                moved = plan.moved_units(),
                "cluster planned"
            );

            let mut outstanding = Vec::with_capacity(plan.transfers.len());
            for t in &plan.transfers {
                let ticket = d.tickets.issue(Owner::Cascade(self.id));
                d.presenter
                    .animate_transfer(ticket, t.source, plan.target, &t.units);
                sound_per_unit(&mut *d.presenter, SoundKind::Sort, t.units.len());
                outstanding.push(ticket);
            }
            self.phase = Phase::Transferring {
                step: Step {
                    members: cluster.members,
                    plan,
                },
                outstanding,
            };
            self.transition(CascadeState::Transferring, trigger);
        }
        self.state()
    }

    /// Resume after the presenter settles `ticket`. Unknown tickets leave the
    /// cascade untouched.
    pub(crate) fn acknowledge<P: Presenter + ?Sized>(
        &mut self,
        ticket: Ticket,
        d: &mut Driver<'_, P>,
    ) -> Result<CascadeState, EngineError> {
        match std::mem::replace(&mut self.phase, Phase::Scanning) {
            Phase::Transferring {
                step,
                mut outstanding,
            } => {
                let before = outstanding.len();
                outstanding.retain(|t| *t != ticket);
                if outstanding.len() == before {
                    self.phase = Phase::Transferring { step, outstanding };
                    return Err(EngineError::UnknownTicket(ticket));
                }
                if !outstanding.is_empty() {
                    self.phase = Phase::Transferring { step, outstanding };
                    return Ok(CascadeState::Transferring);
                }

                commit_transfers(d.board, &step.plan);
                self.steps += 1;
                self.transition(CascadeState::Merging, step.plan.target);

                let pop = d
                    .board
                    .get(step.plan.target)
                    .and_then(|cell| merge::evaluate(&cell.stack, d.threshold));
                if let Some(pop) = pop {
                    let ticket = d.tickets.issue(Owner::Cascade(self.id));
                    d.presenter.animate_pop(ticket, step.plan.target, &pop.units);
                    sound_per_unit(&mut *d.presenter, SoundKind::Merge, pop.len());
                    self.phase = Phase::Merging { step, pop, ticket };
                    return Ok(CascadeState::Merging);
                }
                self.finish_step(step, d);
            }
            Phase::Merging {
                step,
                pop,
                ticket: expected,
            } => {
                if ticket != expected {
                    self.phase = Phase::Merging {
                        step,
                        pop,
                        ticket: expected,
                    };
                    return Err(EngineError::UnknownTicket(ticket));
                }
                if let Some(cell) = d.board.get_mut(step.plan.target) {
                    merge::apply(&mut cell.stack, &pop);
                }
                let reached = d.progress.add(pop.score_delta);
                info!(
                    cascade = %self.id,
                    at = %step.plan.target,
                    popped = pop.len(),
                    score = d.progress.score,
                    "run popped"
                );
                d.presenter
                    .update_score_display(d.progress.score, d.progress.fraction());
                if reached {
                    info!(level = d.progress.level, "level complete");
                    d.presenter.notify_level_complete(d.progress.level);
                }
                self.finish_step(step, d);
            }
            Phase::Scanning => return Err(EngineError::UnknownTicket(ticket)),
        }
        Ok(self.run(d))
    }

    /// Unlock, then queue the target and any sources that kept units.
    fn finish_step<P: Presenter + ?Sized>(&mut self, step: Step, d: &mut Driver<'_, P>) {
        unlock(d.board, &step.members);
        let target = step.plan.target;
        self.transition(CascadeState::Unlocked, target);

        if let Some(frame) = self.work.last_mut() {
            *frame = target;
        }
        for source in step.plan.sources().collect::<Vec<_>>().into_iter().rev() {
            if d.board.get(source).is_some_and(|c| !c.is_empty()) {
                self.work.push(source);
            }
        }
    }
}

fn unlock(board: &mut Board, members: &[Axial]) {
    for &at in members {
        board.set_locked(at, false);
    }
}

/// Move each planned run from its source onto the target, in plan order.
fn commit_transfers(board: &mut Board, plan: &TransferPlan) {
    for t in &plan.transfers {
        if let Some(source) = board.get_mut(t.source) {
            debug_assert!(source.stack.ends_with(&t.units));
            let keep = source.stack.len().saturating_sub(t.units.len());
            source.stack.truncate(keep);
        }
        if let Some(target) = board.get_mut(plan.target) {
            target.stack.extend_from_slice(&t.units);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Unit, units};

    #[derive(Default)]
    struct Log {
        transfers: Vec<(Ticket, Axial, Axial, usize)>,
        pops: Vec<(Ticket, Axial, usize)>,
        completed_levels: Vec<u32>,
    }

    impl Presenter for Log {
        fn animate_placement(&mut self, _: Ticket, _: Axial, _: &[Unit]) {}

        fn animate_transfer(&mut self, ticket: Ticket, source: Axial, target: Axial, units: &[Unit]) {
            self.transfers.push((ticket, source, target, units.len()));
        }

        fn animate_pop(&mut self, ticket: Ticket, at: Axial, units: &[Unit]) {
            self.pops.push((ticket, at, units.len()));
        }

        fn notify_level_complete(&mut self, level: u32) {
            self.completed_levels.push(level);
        }
    }

    struct Rig {
        board: Board,
        progress: Progress,
        tickets: Tickets,
        log: Log,
    }

    impl Rig {
        fn new(stacks: &[((i32, i32), &[u8])]) -> Self {
            let mut board = Board::new(2);
            for &((q, r), colors) in stacks {
                board.set_stack(Axial::new(q, r), units(colors));
            }
            Self {
                board,
                progress: Progress::new(),
                tickets: Tickets::default(),
                log: Log::default(),
            }
        }

        fn driver(&mut self) -> Driver<'_, Log> {
            Driver {
                board: &mut self.board,
                progress: &mut self.progress,
                tickets: &mut self.tickets,
                presenter: &mut self.log,
                threshold: merge::MERGE_THRESHOLD,
            }
        }

        fn stack_len(&self, q: i32, r: i32) -> usize {
            self.board.get(Axial::new(q, r)).map_or(0, |c| c.stack.len())
        }
    }

    #[test]
    fn singleton_cluster_is_done_without_side_effects() {
        let mut rig = Rig::new(&[((0, 0), &[1, 1, 1, 1, 1])]);
        let before = rig.board.clone();
        let mut cascade = Cascade::new(CascadeId(1), Axial::ORIGIN);
        assert_eq!(cascade.run(&mut rig.driver()), CascadeState::Done);
        assert_eq!(rig.board.cells().collect::<Vec<_>>(), before.cells().collect::<Vec<_>>());
        assert!(rig.log.transfers.is_empty());
    }

    #[test]
    fn board_is_untouched_until_every_transfer_is_acknowledged() {
        let mut rig = Rig::new(&[((0, 0), &[2, 2, 2]), ((1, 0), &[2]), ((-1, 0), &[2])]);
        let mut cascade = Cascade::new(CascadeId(1), Axial::ORIGIN);
        assert_eq!(cascade.run(&mut rig.driver()), CascadeState::Transferring);
        assert_eq!(rig.log.transfers.len(), 2);
        assert!(rig.board.is_locked(Axial::ORIGIN));

        let (first, ..) = rig.log.transfers[0];
        let (second, ..) = rig.log.transfers[1];
        let state = cascade.acknowledge(first, &mut rig.driver()).unwrap();
        assert_eq!(state, CascadeState::Transferring);
        assert_eq!(rig.stack_len(0, 0), 3);
        assert_eq!(rig.stack_len(1, 0), 1);

        let state = cascade.acknowledge(second, &mut rig.driver()).unwrap();
        assert_eq!(state, CascadeState::Done);
        assert_eq!(rig.stack_len(0, 0), 5);
        assert_eq!(rig.stack_len(1, 0), 0);
        assert_eq!(rig.stack_len(-1, 0), 0);
        assert!(rig.board.cells().all(|c| !c.locked));
    }

    #[test]
    fn stray_ticket_is_rejected_and_state_kept() {
        let mut rig = Rig::new(&[((0, 0), &[2]), ((1, 0), &[2])]);
        let mut cascade = Cascade::new(CascadeId(1), Axial::ORIGIN);
        cascade.run(&mut rig.driver());
        let err = cascade.acknowledge(Ticket(999), &mut rig.driver());
        assert_eq!(err, Err(EngineError::UnknownTicket(Ticket(999))));
        assert_eq!(cascade.state(), CascadeState::Transferring);
        assert_eq!(cascade.locked_cells().len(), 2);
    }

    #[test]
    fn pop_waits_for_its_own_ticket_and_scores() {
        let mut rig = Rig::new(&[((0, 0), &[0; 6]), ((1, 0), &[0; 5])]);
        let mut cascade = Cascade::new(CascadeId(1), Axial::ORIGIN);
        cascade.run(&mut rig.driver());
        let (t, ..) = rig.log.transfers[0];
        assert_eq!(
            cascade.acknowledge(t, &mut rig.driver()),
            Ok(CascadeState::Merging)
        );
        // Transferred but not yet popped.
        assert_eq!(rig.stack_len(0, 0), 11);
        assert_eq!(rig.progress.score, 0);

        let (pop_ticket, at, n) = rig.log.pops[0];
        assert_eq!((at, n), (Axial::ORIGIN, 11));
        assert_eq!(
            cascade.acknowledge(pop_ticket, &mut rig.driver()),
            Ok(CascadeState::Done)
        );
        assert_eq!(rig.stack_len(0, 0), 0);
        assert_eq!(rig.progress.score, 110);
        assert_eq!(rig.log.completed_levels, vec![1]);
    }

    #[test]
    fn retained_source_is_scanned_before_target_continues() {
        // (1,0) gives up its red top and exposes blue, which clusters with (2,-1).
        let mut rig = Rig::new(&[
            ((0, 0), &[3, 3]),
            ((1, 0), &[1, 3]),
            ((2, -1), &[1]),
        ]);
        let mut cascade = Cascade::new(CascadeId(1), Axial::ORIGIN);
        cascade.run(&mut rig.driver());
        let (t, source, target, _) = rig.log.transfers[0];
        assert_eq!((source, target), (Axial::new(1, 0), Axial::ORIGIN));

        assert_eq!(
            cascade.acknowledge(t, &mut rig.driver()),
            Ok(CascadeState::Transferring)
        );
        let (t2, source2, target2, _) = rig.log.transfers[1];
        // (1,0) is the trigger of the new frame and wins the 1-1 tie.
        assert_eq!((source2, target2), (Axial::new(2, -1), Axial::new(1, 0)));
        assert_eq!(cascade.acknowledge(t2, &mut rig.driver()), Ok(CascadeState::Done));
        assert_eq!(rig.stack_len(1, 0), 2);
        assert_eq!(rig.stack_len(0, 0), 3);
        assert_eq!(cascade.steps(), 2);
    }
}
