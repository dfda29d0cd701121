//! Placement handler: legality checks and the two halves of a drop.

use crate::board::{Board, Unit};
use crate::error::PlacementError;
use crate::hex::Axial;

/// A drop that has been accepted and is waiting for its animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPlacement {
    pub at: Axial,
    pub units: Vec<Unit>,
    /// Option slot the stack came from, if any.
    pub slot: Option<usize>,
}

/// Whether `at` can take a drop right now.
pub fn check(board: &Board, at: Axial) -> Result<(), PlacementError> {
    let cell = board.get(at).ok_or(PlacementError::OutOfRange(at))?;
    if !cell.is_empty() {
        return Err(PlacementError::Occupied(at));
    }
    if cell.locked {
        return Err(PlacementError::Locked(at));
    }
    if cell.pending_placement {
        return Err(PlacementError::Pending(at));
    }
    Ok(())
}

/// Validate and reserve `at`. On error nothing changes.
pub fn begin(
    board: &mut Board,
    at: Axial,
    units: Vec<Unit>,
    slot: Option<usize>,
) -> Result<PendingPlacement, PlacementError> {
    if units.is_empty() {
        return Err(PlacementError::EmptyStack);
    }
    check(board, at)?;
    if let Some(cell) = board.get_mut(at) {
        cell.pending_placement = true;
    }
    Ok(PendingPlacement { at, units, slot })
}

/// Land the units once the drop animation has settled.
pub fn commit(board: &mut Board, pending: PendingPlacement) {
    if let Some(cell) = board.get_mut(pending.at) {
        cell.stack = pending.units;
        cell.pending_placement = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::units;

    #[test]
    fn rejects_each_illegal_target_without_change() {
        let mut board = Board::new(1);
        board.set_stack(Axial::new(1, 0), units(&[0]));
        board.set_locked(Axial::new(-1, 0), true);
        board.get_mut(Axial::new(0, 1)).unwrap().pending_placement = true;
        let before = board.clone();

        let cases = [
            (Axial::new(4, 4), PlacementError::OutOfRange(Axial::new(4, 4))),
            (Axial::new(1, 0), PlacementError::Occupied(Axial::new(1, 0))),
            (Axial::new(-1, 0), PlacementError::Locked(Axial::new(-1, 0))),
            (Axial::new(0, 1), PlacementError::Pending(Axial::new(0, 1))),
        ];
        for (at, expected) in cases {
            assert_eq!(begin(&mut board, at, units(&[2]), None), Err(expected));
        }
        assert_eq!(
            begin(&mut board, Axial::ORIGIN, Vec::new(), None),
            Err(PlacementError::EmptyStack)
        );
        assert!(board.cells().eq(before.cells()));
    }

    #[test]
    fn begin_reserves_and_commit_lands() {
        let mut board = Board::new(1);
        let pending = begin(&mut board, Axial::ORIGIN, units(&[1, 2]), Some(0)).unwrap();
        assert!(board.get(Axial::ORIGIN).unwrap().pending_placement);
        assert_eq!(check(&board, Axial::ORIGIN), Err(PlacementError::Pending(Axial::ORIGIN)));

        commit(&mut board, pending);
        let cell = board.get(Axial::ORIGIN).unwrap();
        assert!(!cell.pending_placement);
        assert_eq!(cell.stack, units(&[1, 2]));
    }
}
