//! Session: the engine façade. Owns the board, the options tray, running
//! cascades and outstanding tickets, and routes acknowledgments back to
//! whoever is waiting on them.

use crate::board::{Board, Unit};
use crate::cascade::{Cascade, CascadeId, CascadeState, Driver};
use crate::config::SessionConfig;
use crate::error::{ConfigError, EngineError, PlacementError};
use crate::hex::Axial;
use crate::placement::{self, PendingPlacement};
use crate::presenter::{Owner, Presenter, SoundKind, Ticket, Tickets, sound_per_unit};
use crate::progress::Progress;
use crate::spawn::Spawner;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// One entry of the options tray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Empty,
    Ready(Vec<Unit>),
    /// Dropped; waiting for the placement animation.
    Placing(Vec<Unit>),
}

impl Slot {
    pub fn units(&self) -> Option<&[Unit]> {
        match self {
            Self::Ready(u) | Self::Placing(u) => Some(u),
            Self::Empty => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    board: Board,
    progress: Progress,
    spawner: Spawner,
    slots: Vec<Slot>,
    tickets: Tickets,
    placements: HashMap<Ticket, PendingPlacement>,
    cascades: BTreeMap<CascadeId, Cascade>,
    next_cascade: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawner = Spawner::new(&config);
        let mut session = Self {
            board: Board::new(config.radius),
            progress: Progress::new(),
            spawner,
            slots: vec![Slot::Empty; config.option_slots],
            tickets: Tickets::default(),
            placements: HashMap::new(),
            cascades: BTreeMap::new(),
            next_cascade: 0,
            config,
        };
        session.refill_slots();
        info!(
            radius = session.config.radius,
            cells = session.board.len(),
            seed = ?session.config.seed,
            "session started"
        );
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for setting up positions. Do not use while
    /// anything is in flight.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Mutable spawner, for callers that need the session's seeded RNG.
    pub fn spawner_mut(&mut self) -> &mut Spawner {
        &mut self.spawner
    }

    /// No placement or cascade is waiting on the presenter.
    pub fn is_idle(&self) -> bool {
        self.placements.is_empty() && self.cascades.is_empty()
    }

    pub fn outstanding_tickets(&self) -> usize {
        self.tickets.outstanding()
    }

    pub fn cascades(&self) -> impl Iterator<Item = (CascadeId, CascadeState)> + '_ {
        self.cascades.values().map(|c| (c.id(), c.state()))
    }

    /// Drop the stack in option `slot` onto `at`.
    pub fn place<P: Presenter + ?Sized>(
        &mut self,
        slot: usize,
        at: Axial,
        presenter: &mut P,
    ) -> Result<Ticket, PlacementError> {
        let units = match self.slots.get(slot) {
            Some(Slot::Ready(units)) => units.clone(),
            _ => return Err(PlacementError::SlotUnavailable(slot)),
        };
        let ticket = self.drop_units(at, units, Some(slot), presenter)?;
        if let Some(s) = self.slots.get_mut(slot) {
            if let Slot::Ready(units) = std::mem::replace(s, Slot::Empty) {
                *s = Slot::Placing(units);
            }
        }
        Ok(ticket)
    }

    /// Drop an arbitrary stack onto `at`. Rejections change nothing.
    pub fn place_stack<P: Presenter + ?Sized>(
        &mut self,
        at: Axial,
        units: Vec<Unit>,
        presenter: &mut P,
    ) -> Result<Ticket, PlacementError> {
        self.drop_units(at, units, None, presenter)
    }

    fn drop_units<P: Presenter + ?Sized>(
        &mut self,
        at: Axial,
        units: Vec<Unit>,
        slot: Option<usize>,
        presenter: &mut P,
    ) -> Result<Ticket, PlacementError> {
        if self.progress.is_complete() {
            return Err(PlacementError::LevelComplete);
        }
        let pending = placement::begin(&mut self.board, at, units, slot)?;
        let ticket = self.tickets.issue(Owner::Placement);
        presenter.animate_placement(ticket, at, &pending.units);
        sound_per_unit(presenter, SoundKind::Place, pending.units.len());
        debug!(%at, units = pending.units.len(), %ticket, "placement accepted");
        self.placements.insert(ticket, pending);
        Ok(ticket)
    }

    /// Run a cascade from `at` right away. Returns `Done` when nothing sorts,
    /// in which case the board is unchanged.
    pub fn trigger<P: Presenter + ?Sized>(&mut self, at: Axial, presenter: &mut P) -> CascadeState {
        let id = CascadeId(self.next_cascade);
        self.next_cascade += 1;
        let mut cascade = Cascade::new(id, at);
        let state = cascade.run(&mut Driver {
            board: &mut self.board,
            progress: &mut self.progress,
            tickets: &mut self.tickets,
            presenter,
            threshold: self.config.merge_threshold,
        });
        if state != CascadeState::Done {
            self.cascades.insert(id, cascade);
        }
        state
    }

    /// Report that the animation behind `ticket` has settled, letting its
    /// owner mutate the board and carry on.
    pub fn acknowledge<P: Presenter + ?Sized>(
        &mut self,
        ticket: Ticket,
        presenter: &mut P,
    ) -> Result<(), EngineError> {
        match self.tickets.redeem(ticket) {
            Some(Owner::Placement) => {
                let pending = self
                    .placements
                    .remove(&ticket)
                    .ok_or(EngineError::UnknownTicket(ticket))?;
                let (at, slot) = (pending.at, pending.slot);
                placement::commit(&mut self.board, pending);
                if let Some(slot) = slot {
                    self.release_slot(slot);
                }
                self.trigger(at, presenter);
                Ok(())
            }
            Some(Owner::Cascade(id)) => {
                let cascade = self
                    .cascades
                    .get_mut(&id)
                    .ok_or(EngineError::UnknownTicket(ticket))?;
                let state = cascade.acknowledge(
                    ticket,
                    &mut Driver {
                        board: &mut self.board,
                        progress: &mut self.progress,
                        tickets: &mut self.tickets,
                        presenter,
                        threshold: self.config.merge_threshold,
                    },
                )?;
                if state == CascadeState::Done {
                    if let Some(done) = self.cascades.remove(&id) {
                        debug!(cascade = %id, steps = done.steps(), "cascade finished");
                    }
                }
                Ok(())
            }
            None => {
                warn!(%ticket, "acknowledgment for unknown ticket");
                Err(EngineError::UnknownTicket(ticket))
            }
        }
    }

    /// Start the next level: clear the board, raise the target.
    pub fn advance_level<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> Result<(), EngineError> {
        if !self.progress.is_complete() {
            return Err(EngineError::LevelNotComplete);
        }
        if !self.is_idle() {
            return Err(EngineError::Busy);
        }
        self.progress.advance();
        self.board.reset();
        presenter.update_score_display(self.progress.score, self.progress.fraction());
        info!(level = self.progress.level, target = self.progress.target, "level started");
        Ok(())
    }

    fn release_slot(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Slot::Empty;
        }
        if self.slots.iter().all(|s| matches!(s, Slot::Empty)) {
            self.refill_slots();
        }
    }

    fn refill_slots(&mut self) {
        for slot in &mut self.slots {
            if matches!(slot, Slot::Empty) {
                *slot = Slot::Ready(self.spawner.next_stack());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Queue {
        tickets: Vec<Ticket>,
        sounds: Vec<SoundKind>,
    }

    impl Presenter for Queue {
        fn animate_placement(&mut self, ticket: Ticket, _: Axial, _: &[Unit]) {
            self.tickets.push(ticket);
        }

        fn animate_transfer(&mut self, ticket: Ticket, _: Axial, _: Axial, _: &[Unit]) {
            self.tickets.push(ticket);
        }

        fn animate_pop(&mut self, ticket: Ticket, _: Axial, _: &[Unit]) {
            self.tickets.push(ticket);
        }

        fn notify_sound(&mut self, kind: SoundKind, _: f32, _: f32) {
            self.sounds.push(kind);
        }
    }

    fn session() -> Session {
        Session::new(SessionConfig::default().with_seed(11)).unwrap()
    }

    #[test]
    fn new_session_fills_every_slot() {
        let s = session();
        assert_eq!(s.slots().len(), 3);
        assert!(s.slots().iter().all(Slot::is_ready));
        assert!(s.is_idle());
    }

    #[test]
    fn slot_moves_through_placing_and_refills_when_all_used() {
        let mut s = session();
        let mut p = Queue::default();
        let targets = [Axial::new(-2, 0), Axial::new(0, 0), Axial::new(2, 0)];
        for (slot, at) in targets.into_iter().enumerate() {
            s.place(slot, at, &mut p).unwrap();
            assert!(matches!(s.slots()[slot], Slot::Placing(_)));
            assert_eq!(
                s.place(slot, Axial::new(0, -1), &mut p),
                Err(PlacementError::SlotUnavailable(slot))
            );
        }
        assert!(p.sounds.iter().all(|k| *k == SoundKind::Place));
        // Land the first two; tray stays partly empty.
        let drops: Vec<Ticket> = p.tickets.drain(..).collect();
        s.acknowledge(drops[0], &mut p).unwrap();
        s.acknowledge(drops[1], &mut p).unwrap();
        assert_eq!(s.slots()[0], Slot::Empty);
        assert!(matches!(s.slots()[2], Slot::Placing(_)));
        s.acknowledge(drops[2], &mut p).unwrap();
        assert!(s.slots().iter().all(Slot::is_ready));
    }

    #[test]
    fn drop_lands_only_on_acknowledgment() {
        let mut s = session();
        let mut p = Queue::default();
        let t = s.place_stack(Axial::ORIGIN, crate::board::units(&[1, 1]), &mut p).unwrap();
        assert!(s.board().get(Axial::ORIGIN).unwrap().is_empty());
        assert_eq!(
            s.place_stack(Axial::ORIGIN, crate::board::units(&[2]), &mut p),
            Err(PlacementError::Pending(Axial::ORIGIN))
        );
        s.acknowledge(t, &mut p).unwrap();
        assert_eq!(s.board().get(Axial::ORIGIN).unwrap().stack.len(), 2);
        assert!(s.is_idle());
        assert_eq!(s.acknowledge(t, &mut p), Err(EngineError::UnknownTicket(t)));
    }

    #[test]
    fn advance_requires_completion() {
        let mut s = session();
        let mut p = Queue::default();
        assert_eq!(s.advance_level(&mut p), Err(EngineError::LevelNotComplete));
    }
}
