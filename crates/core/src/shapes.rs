//! Shapes module - per-shape rotation tables and wall kicks
//!
//! Every shape is described by pivot-relative cell offsets, one table entry per
//! rotation state. `y` grows downward, so `(0, 1)` is the cell below the pivot.
//! The O piece and the single-cell shape have one state and never rotate.

use arrayvec::ArrayVec;

use crate::types::{Point, Shape, Spin};

/// Offset of a single cell relative to the pivot
pub type CellOffset = (i32, i32);

/// Cells of a shape at some rotation (4 cells, 1 for `Single`)
pub type ShapeCells = ArrayVec<Point, 4>;

const T_TABLE: [[CellOffset; 4]; 4] = [
    [(0, 0), (-1, 0), (1, 0), (0, 1)],
    [(0, 0), (0, -1), (0, 1), (1, 0)],
    [(0, 0), (-1, 0), (1, 0), (0, -1)],
    [(0, 0), (0, -1), (0, 1), (-1, 0)],
];

const I_TABLE: [[CellOffset; 4]; 2] = [
    [(-1, 0), (0, 0), (1, 0), (2, 0)],
    [(0, -1), (0, 0), (0, 1), (0, 2)],
];

const O_TABLE: [[CellOffset; 4]; 1] = [[(0, 1), (1, 1), (1, 0), (0, 0)]];

const J_TABLE: [[CellOffset; 4]; 4] = [
    [(0, 0), (-1, 0), (1, 0), (1, 1)],
    [(0, 0), (0, 1), (0, -1), (1, -1)],
    [(0, 0), (1, 0), (-1, 0), (-1, -1)],
    [(0, 0), (0, -1), (0, 1), (-1, 1)],
];

const L_TABLE: [[CellOffset; 4]; 4] = [
    [(0, 0), (-1, 0), (1, 0), (-1, 1)],
    [(0, 0), (0, 1), (0, -1), (1, 1)],
    [(0, 0), (1, 0), (-1, 0), (1, -1)],
    [(0, 0), (0, -1), (0, 1), (-1, -1)],
];

const S_TABLE: [[CellOffset; 4]; 2] = [
    [(0, 0), (1, 0), (0, 1), (-1, 1)],
    [(-1, -1), (-1, 0), (0, 0), (0, 1)],
];

const Z_TABLE: [[CellOffset; 4]; 2] = [
    [(0, 0), (-1, 0), (0, 1), (1, 1)],
    [(0, -1), (0, 0), (-1, 0), (-1, 1)],
];

const SINGLE_TABLE: [CellOffset; 1] = [(0, 0)];

/// Kick candidates `(dx, dy)`, tried in order after the unshifted rotation.
///
/// Listed for a rightward bias; [`KickBias::Left`] mirrors every `dx`.
/// Sideways shifts come first, then sideways shifts combined with a one-row
/// push down for pieces whose next rotation reaches above row 0, then the
/// plain push down, then wider and upward shifts.
pub const WALL_KICKS: [CellOffset; 14] = [
    (0, 0),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (0, 1),
    (0, -1),
    (2, 0),
    (-2, 0),
    (2, 1),
    (-2, 1),
    (1, -1),
    (-1, -1),
    (0, -2),
];

/// Which sideways kick is tried first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickBias {
    Left,
    Right,
}

impl KickBias {
    /// Kick away from the nearer side wall of a board `width` cells wide
    pub fn away_from_wall(left: i32, width: i32) -> Self {
        if left * 2 < width {
            KickBias::Right
        } else {
            KickBias::Left
        }
    }

    fn apply(self, (dx, dy): CellOffset) -> CellOffset {
        match self {
            KickBias::Right => (dx, dy),
            KickBias::Left => (-dx, dy),
        }
    }
}

/// Pivot-relative offsets for a shape at a rotation index.
///
/// The rotation index is reduced modulo the shape's state count.
pub fn offsets(shape: Shape, rotation: u8) -> &'static [CellOffset] {
    let r = (rotation % shape.rotation_states()) as usize;
    match shape {
        Shape::T => &T_TABLE[r],
        Shape::I => &I_TABLE[r],
        Shape::O => &O_TABLE[r],
        Shape::J => &J_TABLE[r],
        Shape::L => &L_TABLE[r],
        Shape::S => &S_TABLE[r],
        Shape::Z => &Z_TABLE[r],
        Shape::Single => &SINGLE_TABLE,
    }
}

/// Absolute cells of a shape placed at `pivot`
pub fn cells_at(shape: Shape, rotation: u8, pivot: Point) -> ShapeCells {
    offsets(shape, rotation)
        .iter()
        .map(|&(dx, dy)| pivot.offset(dx, dy))
        .collect()
}

/// Try to rotate with wall kicks.
///
/// Returns `Some((new_rotation, new_pivot))` for the first kick candidate whose
/// cells all satisfy `is_free`, or `None` if every candidate fails. Shapes with
/// a single rotation state never rotate.
pub fn try_rotate(
    shape: Shape,
    rotation: u8,
    pivot: Point,
    spin: Spin,
    bias: KickBias,
    is_free: impl Fn(Point) -> bool,
) -> Option<(u8, Point)> {
    let states = shape.rotation_states();
    if states <= 1 {
        return None;
    }
    let next = spin.apply(rotation, states);
    let table = offsets(shape, next);

    WALL_KICKS.iter().find_map(|&kick| {
        let (kx, ky) = bias.apply(kick);
        let candidate = pivot.offset(kx, ky);
        table
            .iter()
            .all(|&(dx, dy)| is_free(candidate.offset(dx, dy)))
            .then_some((next, candidate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(width: i32, height: i32) -> impl Fn(Point) -> bool {
        move |p: Point| p.x >= 0 && p.x < width && p.y >= 0 && p.y < height
    }

    #[test]
    fn test_t_spawn_cells() {
        let cells = cells_at(Shape::T, 0, Point::new(5, 0));
        assert_eq!(
            cells.as_slice(),
            &[
                Point::new(5, 0),
                Point::new(4, 0),
                Point::new(6, 0),
                Point::new(5, 1)
            ]
        );
    }

    #[test]
    fn test_rotation_index_wraps_per_shape() {
        assert_eq!(offsets(Shape::I, 2), offsets(Shape::I, 0));
        assert_eq!(offsets(Shape::T, 5), offsets(Shape::T, 1));
        assert_eq!(offsets(Shape::O, 3), offsets(Shape::O, 0));
    }

    #[test]
    fn test_single_has_one_cell() {
        assert_eq!(cells_at(Shape::Single, 0, Point::new(2, 3)).len(), 1);
    }

    #[test]
    fn test_o_never_rotates() {
        assert_eq!(
            try_rotate(Shape::O, 0, Point::new(4, 4), Spin::Clockwise, KickBias::Right, |_| true),
            None
        );
    }

    #[test]
    fn test_unobstructed_rotation_uses_no_kick() {
        let result = try_rotate(
            Shape::T,
            0,
            Point::new(5, 5),
            Spin::Clockwise,
            KickBias::Right,
            inside(10, 20),
        );
        assert_eq!(result, Some((1, Point::new(5, 5))));
    }

    #[test]
    fn test_rotation_at_top_row_kicks_down_and_aside() {
        // T east reaches row -1 from a pivot on row 0.
        let rotate = |bias| {
            try_rotate(
                Shape::T,
                0,
                Point::new(5, 0),
                Spin::Clockwise,
                bias,
                inside(10, 20),
            )
        };
        assert_eq!(rotate(KickBias::Right), Some((1, Point::new(6, 1))));
        assert_eq!(rotate(KickBias::Left), Some((1, Point::new(4, 1))));
    }

    #[test]
    fn test_rotation_boxed_below_falls_back_to_plain_push_down() {
        let free = |p: Point| p.y >= 0 && p.x == 5;
        let result = try_rotate(
            Shape::I,
            0,
            Point::new(5, 0),
            Spin::Clockwise,
            KickBias::Right,
            free,
        );
        assert_eq!(result, Some((1, Point::new(5, 1))));
    }

    #[test]
    fn test_rotation_against_right_wall_kicks_left() {
        // T west at the right wall, rotating back to north needs column 10.
        let result = try_rotate(
            Shape::T,
            3,
            Point::new(9, 5),
            Spin::Clockwise,
            KickBias::Left,
            inside(10, 20),
        );
        assert_eq!(result, Some((0, Point::new(8, 5))));
    }

    #[test]
    fn test_bias_follows_nearer_wall() {
        assert_eq!(KickBias::away_from_wall(1, 10), KickBias::Right);
        assert_eq!(KickBias::away_from_wall(4, 10), KickBias::Right);
        assert_eq!(KickBias::away_from_wall(5, 10), KickBias::Left);
        assert_eq!(KickBias::away_from_wall(8, 10), KickBias::Left);
    }

    #[test]
    fn test_counter_clockwise_from_zero() {
        let result = try_rotate(
            Shape::J,
            0,
            Point::new(4, 6),
            Spin::CounterClockwise,
            KickBias::Right,
            inside(10, 20),
        );
        assert_eq!(result, Some((3, Point::new(4, 6))));
    }

    #[test]
    fn test_fully_blocked_rotation_fails() {
        let result = try_rotate(
            Shape::I,
            0,
            Point::new(4, 6),
            Spin::Clockwise,
            KickBias::Right,
            |p| p.y == 6,
        );
        assert_eq!(result, None);
    }
}
