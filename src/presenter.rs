//! Presentation contract. The engine asks for animations and waits for the
//! matching ticket to be acknowledged before it touches the board.

use crate::board::Unit;
use crate::cascade::CascadeId;
use crate::hex::Axial;
use std::collections::HashMap;
use std::fmt;

/// Handle for one outstanding animation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    Place,
    Sort,
    Merge,
}

impl SoundKind {
    /// Pitch hint for the `index`-th unit of a staggered animation, in Hz.
    pub fn pitch(self, index: usize) -> f32 {
        let (base, step) = match self {
            Self::Place => (300.0, 40.0),
            Self::Sort => (400.0, 50.0),
            Self::Merge => (600.0, 40.0),
        };
        (base + step * index as f32).clamp(20.0, 20_000.0)
    }

    pub fn volume(self) -> f32 {
        match self {
            Self::Sort => 0.08,
            Self::Place | Self::Merge => 0.1,
        }
    }
}

/// Rendering/animation/audio side of the game.
///
/// Animation calls must not call back into the engine; the driver reports
/// completion later through `Session::acknowledge`.
pub trait Presenter {
    fn animate_placement(&mut self, ticket: Ticket, at: Axial, units: &[Unit]);

    fn animate_transfer(&mut self, ticket: Ticket, source: Axial, target: Axial, units: &[Unit]);

    fn animate_pop(&mut self, ticket: Ticket, at: Axial, units: &[Unit]);

    fn notify_sound(&mut self, _kind: SoundKind, _pitch: f32, _volume: f32) {}

    fn update_score_display(&mut self, _score: u32, _progress: f32) {}

    fn notify_level_complete(&mut self, _level: u32) {}
}

/// What an outstanding ticket will resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Owner {
    Placement,
    Cascade(CascadeId),
}

/// Issues tickets and remembers who is waiting on each.
#[derive(Debug, Default)]
pub(crate) struct Tickets {
    next: u64,
    owners: HashMap<Ticket, Owner>,
}

impl Tickets {
    pub(crate) fn issue(&mut self, owner: Owner) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.owners.insert(ticket, owner);
        tracing::trace!(%ticket, ?owner, "ticket issued");
        ticket
    }

    /// Remove and return the owner; `None` for unknown or already redeemed tickets.
    pub(crate) fn redeem(&mut self, ticket: Ticket) -> Option<Owner> {
        let owner = self.owners.remove(&ticket);
        tracing::trace!(%ticket, ?owner, "ticket redeemed");
        owner
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.owners.len()
    }
}

/// Emit one sound cue per unit of a staggered animation.
pub(crate) fn sound_per_unit<P: Presenter + ?Sized>(presenter: &mut P, kind: SoundKind, count: usize) {
    for i in 0..count {
        presenter.notify_sound(kind, kind.pitch(i), kind.volume());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_redeem_once() {
        let mut tickets = Tickets::default();
        let a = tickets.issue(Owner::Placement);
        let b = tickets.issue(Owner::Cascade(CascadeId(4)));
        assert_ne!(a, b);
        assert_eq!(tickets.outstanding(), 2);
        assert_eq!(tickets.redeem(b), Some(Owner::Cascade(CascadeId(4))));
        assert_eq!(tickets.redeem(b), None);
        assert_eq!(tickets.outstanding(), 1);
    }

    #[test]
    fn pitch_steps_per_unit() {
        assert!((SoundKind::Place.pitch(0) - 300.0).abs() < f32::EPSILON);
        assert!((SoundKind::Sort.pitch(2) - 500.0).abs() < f32::EPSILON);
        assert!((SoundKind::Merge.pitch(1_000_000) - 20_000.0).abs() < f32::EPSILON);
    }
}
