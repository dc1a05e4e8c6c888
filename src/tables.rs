use crate::geometry::Axis;

/// Corner offsets of a cell, indexed by octant bits (`0b001` = +X, `0b010` =
/// +Y, `0b100` = +Z).
pub const CORNER_OFFSETS: [[i32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

pub const MIN_CORNER: usize = 0b000;
pub const MAX_CORNER: usize = 0b111;

/// The 12 cell edges as (lower corner, upper corner) pairs with the axis they
/// run along. Z edges come first, then Y, then X.
pub const CELL_EDGES: [([usize; 2], Axis); 12] = [
    // Z edges over (dx, dy).
    ([0b000, 0b100], Axis::Z),
    ([0b010, 0b110], Axis::Z),
    ([0b001, 0b101], Axis::Z),
    ([0b011, 0b111], Axis::Z),
    // Y edges over (dx, dz).
    ([0b000, 0b010], Axis::Y),
    ([0b100, 0b110], Axis::Y),
    ([0b001, 0b011], Axis::Y),
    ([0b101, 0b111], Axis::Y),
    // X edges over (dy, dz).
    ([0b000, 0b001], Axis::X),
    ([0b100, 0b101], Axis::X),
    ([0b010, 0b011], Axis::X),
    ([0b110, 0b111], Axis::X),
];

/// A grid edge that a cell position "owns" and the 4 cells sharing it.
#[derive(Clone, Copy, Debug)]
pub struct EdgeProbe {
    /// Offset from the owning grid point to the other end of the edge.
    pub step: [i32; 3],
    /// Both coordinates must be positive for the owner to have all 4 cells.
    pub guard: [Axis; 2],
    /// Cell offsets in quad order. Triangles `[0, 1, 2]` and `[0, 2, 3]` face
    /// along `step`.
    pub cells: [[i32; 3]; 4],
}

pub const EDGE_PROBES: [EdgeProbe; 3] = [
    EdgeProbe {
        step: [0, 0, 1],
        guard: [Axis::X, Axis::Y],
        cells: [[-1, -1, 0], [0, -1, 0], [0, 0, 0], [-1, 0, 0]],
    },
    EdgeProbe {
        step: [0, 1, 0],
        guard: [Axis::X, Axis::Z],
        cells: [[-1, 0, -1], [-1, 0, 0], [0, 0, 0], [0, 0, -1]],
    },
    EdgeProbe {
        step: [1, 0, 0],
        guard: [Axis::Y, Axis::Z],
        cells: [[0, -1, -1], [0, 0, -1], [0, 0, 0], [0, -1, 0]],
    },
];

/// Which side of the cell box a constraint pins an axis to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Min,
    Max,
}

/// Face constraints tried first by the boundary search.
pub const BOUNDARY_FACES: [(Axis, Side); 6] = [
    (Axis::X, Side::Min),
    (Axis::X, Side::Max),
    (Axis::Y, Side::Min),
    (Axis::Y, Side::Max),
    (Axis::Z, Side::Min),
    (Axis::Z, Side::Max),
];

/// Edge constraints tried when no face solution lands inside the cell.
pub const BOUNDARY_EDGES: [[(Axis, Side); 2]; 12] = [
    [(Axis::Y, Side::Min), (Axis::X, Side::Min)],
    [(Axis::Y, Side::Max), (Axis::X, Side::Min)],
    [(Axis::Y, Side::Min), (Axis::X, Side::Max)],
    [(Axis::Y, Side::Max), (Axis::X, Side::Max)],
    [(Axis::Z, Side::Min), (Axis::X, Side::Min)],
    [(Axis::Z, Side::Max), (Axis::X, Side::Min)],
    [(Axis::Z, Side::Min), (Axis::X, Side::Max)],
    [(Axis::Z, Side::Max), (Axis::X, Side::Max)],
    [(Axis::Z, Side::Min), (Axis::Y, Side::Min)],
    [(Axis::Z, Side::Max), (Axis::Y, Side::Min)],
    [(Axis::Z, Side::Min), (Axis::Y, Side::Max)],
    [(Axis::Z, Side::Max), (Axis::Y, Side::Max)],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_edges_connect_corners_along_their_axis() {
        for ([a, b], axis) in CELL_EDGES {
            let (ca, cb) = (CORNER_OFFSETS[a], CORNER_OFFSETS[b]);
            for i in 0..3 {
                let expected = if i == axis.index() { 1 } else { 0 };
                assert_eq!(cb[i] - ca[i], expected);
            }
        }
    }

    #[test]
    fn probe_cells_all_touch_the_probed_edge() {
        for probe in EDGE_PROBES {
            let axis = probe.step.iter().position(|&s| s == 1).unwrap();
            for cell in probe.cells {
                // Along the edge axis the cell starts at the owner; across it
                // the cell is on either side of the edge.
                assert_eq!(cell[axis], 0);
                for guard in probe.guard {
                    assert!(matches!(cell[guard.index()], -1 | 0));
                }
            }
        }
    }
}
