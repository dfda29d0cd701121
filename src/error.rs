//! Error types. None of these leave the board in a changed state.

use crate::hex::Axial;
use crate::presenter::Ticket;
use thiserror::Error;

/// Why a drop was refused. The caller may retry elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("cell {0} is not on the board")]
    OutOfRange(Axial),
    #[error("cell {0} already holds a stack")]
    Occupied(Axial),
    #[error("cell {0} is part of a running cascade")]
    Locked(Axial),
    #[error("cell {0} is already receiving a drop")]
    Pending(Axial),
    #[error("cannot place an empty stack")]
    EmptyStack,
    #[error("level complete; advance before placing")]
    LevelComplete,
    #[error("option slot {0} is empty or already being placed")]
    SlotUnavailable(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown or already acknowledged ticket {0}")]
    UnknownTicket(Ticket),
    #[error("animations still in flight")]
    Busy,
    #[error("level target not reached yet")]
    LevelNotComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board radius must be between 1 and {max}, got {got}")]
    Radius { got: u32, max: u32 },
    #[error("palette size must be between 1 and {max}, got {got}")]
    PaletteSize { got: u8, max: u8 },
    #[error("{name} range {lo}..={hi} is empty or starts at zero")]
    Range {
        name: &'static str,
        lo: usize,
        hi: usize,
    },
    #[error("merge threshold must be at least 2")]
    Threshold,
    #[error("at least one option slot is required")]
    Slots,
}
