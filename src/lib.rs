//! hexstack engine: a hex board of colour stacks that sort into each other
//! and pop once a run grows long enough.
//!
//! The engine never animates anything itself. Every visible change is handed
//! to a [`Presenter`] with a [`Ticket`], and the board only changes when the
//! caller acknowledges that ticket through [`Session::acknowledge`].

pub mod board;
pub mod cascade;
pub mod cluster;
pub mod config;
pub mod error;
pub mod hex;
pub mod merge;
pub mod placement;
pub mod presenter;
pub mod progress;
pub mod session;
pub mod spawn;
pub mod transfer;

pub use board::{Board, Cell, Unit};
pub use cascade::{CascadeId, CascadeState};
pub use config::SessionConfig;
pub use error::{ConfigError, EngineError, PlacementError};
pub use hex::Axial;
pub use presenter::{Presenter, SoundKind, Ticket};
pub use progress::Progress;
pub use session::{Session, Slot};
