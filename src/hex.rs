//! Axial hex coordinates (q, r) and the six fixed neighbour directions.

use std::fmt;
use std::ops::Add;

/// Axial coordinate of a hex cell. Ordering is (q, r) lexicographic, which
/// gives the board a stable iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

/// Neighbour offsets in the fixed order used for every traversal:
/// E, NE, NW, W, SW, SE.
pub const DIRECTIONS: [Axial; 6] = [
    Axial::new(1, 0),
    Axial::new(1, -1),
    Axial::new(0, -1),
    Axial::new(-1, 0),
    Axial::new(-1, 1),
    Axial::new(0, 1),
];

impl Axial {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate.
    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance between two coordinates.
    pub fn distance(self, other: Self) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        dq.max(dr).max(ds)
    }

    /// The six adjacent coordinates, in `DIRECTIONS` order. Not bounds-checked.
    pub fn adjacent(self) -> [Self; 6] {
        DIRECTIONS.map(|d| self + d)
    }

    /// All coordinates within `radius` of the origin, sorted by (q, r).
    pub fn within(radius: u32) -> Vec<Self> {
        let n = radius as i32;
        let mut out = Vec::with_capacity(hex_count(radius));
        for q in -n..=n {
            let r_lo = (-n).max(-q - n);
            let r_hi = n.min(-q + n);
            for r in r_lo..=r_hi {
                out.push(Self::new(q, r));
            }
        }
        out
    }
}

impl Add for Axial {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl fmt::Display for Axial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Number of cells in a hexagon of the given radius: 3n(n+1) + 1.
pub const fn hex_count(radius: u32) -> usize {
    let n = radius as usize;
    3 * n * (n + 1) + 1
}
