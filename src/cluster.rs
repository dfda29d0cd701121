//! Cluster resolution: breadth-first search over hex adjacency for cells that
//! share the trigger's top colour.

use crate::board::Board;
use crate::hex::Axial;
use std::collections::{HashSet, VecDeque};

/// Connected cells sharing a top colour at one instant. Never stored past the
/// cascade iteration that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub color: u8,
    /// Discovery order; `members[0]` is the trigger.
    pub members: Vec<Axial>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A single-member cluster means nothing can sort.
    pub fn can_sort(&self) -> bool {
        self.members.len() > 1
    }

    pub fn contains(&self, at: Axial) -> bool {
        self.members.contains(&at)
    }

    pub fn trigger(&self) -> Axial {
        self.members[0]
    }
}

/// Collect the maximal connected set of non-empty, unlocked cells whose top
/// colour equals the trigger's. Returns `None` when the trigger is off the
/// board, empty, or locked.
///
/// Neighbours are visited in `DIRECTIONS` order, so the member order depends
/// only on the board snapshot.
pub fn resolve(board: &Board, trigger: Axial) -> Option<Cluster> {
    let start = board.get(trigger)?;
    if start.locked {
        return None;
    }
    let color = start.top_color()?;

    let mut members = vec![trigger];
    let mut seen = HashSet::from([trigger]);
    let mut queue = VecDeque::from([trigger]);

    while let Some(at) = queue.pop_front() {
        for n in board.neighbors(at) {
            if n.locked || n.top_color() != Some(color) || !seen.insert(n.coord) {
                continue;
            }
            members.push(n.coord);
            queue.push_back(n.coord);
        }
    }

    Some(Cluster { color, members })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::units;

    fn board_with(stacks: &[((i32, i32), &[u8])]) -> Board {
        let mut board = Board::new(2);
        for &((q, r), colors) in stacks {
            board.set_stack(Axial::new(q, r), units(colors));
        }
        board
    }

    #[test]
    fn empty_or_locked_trigger_has_no_cluster() {
        let mut board = board_with(&[((0, 0), &[1])]);
        assert!(resolve(&board, Axial::new(1, 0)).is_none());
        assert!(resolve(&board, Axial::new(9, 9)).is_none());
        board.set_locked(Axial::ORIGIN, true);
        assert!(resolve(&board, Axial::ORIGIN).is_none());
    }

    #[test]
    fn isolated_cell_is_singleton() {
        let board = board_with(&[((0, 0), &[3, 3, 3]), ((1, 0), &[3, 1])]);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        assert_eq!(cluster.members, vec![Axial::ORIGIN]);
        assert!(!cluster.can_sort());
    }

    #[test]
    fn follows_chains_beyond_direct_neighbours() {
        // (0,0) - (1,0) - (2,0) in a line, all topped with colour 2.
        let board = board_with(&[
            ((0, 0), &[2]),
            ((1, 0), &[0, 2]),
            ((2, 0), &[2, 2]),
            ((-1, 0), &[2, 4]),
        ]);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        assert_eq!(cluster.color, 2);
        assert_eq!(
            cluster.members,
            vec![Axial::new(0, 0), Axial::new(1, 0), Axial::new(2, 0)]
        );
    }

    #[test]
    fn locked_cells_break_connectivity() {
        let mut board = board_with(&[((0, 0), &[2]), ((1, 0), &[2]), ((2, 0), &[2])]);
        board.set_locked(Axial::new(1, 0), true);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        assert_eq!(cluster.members, vec![Axial::ORIGIN]);
    }

    #[test]
    fn discovery_order_is_bfs_in_direction_order() {
        let board = board_with(&[
            ((0, 0), &[5]),
            ((0, 1), &[5]),
            ((1, 0), &[5]),
            ((-1, 0), &[5]),
            ((-2, 0), &[5]),
        ]);
        let cluster = resolve(&board, Axial::ORIGIN).unwrap();
        assert_eq!(
            cluster.members,
            vec![
                Axial::new(0, 0),
                Axial::new(1, 0),
                Axial::new(-1, 0),
                Axial::new(0, 1),
                Axial::new(-2, 0),
            ]
        );
    }
}
