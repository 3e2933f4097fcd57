//! End-to-end board scenarios, driven through the public board API

use std::collections::HashSet;

use cascade_tetris::core::{Block, Board, BoardEvent, RestoredState};
use cascade_tetris::types::{Direction, Point, Shape, Spin, TetrominoId, SINGLE_SEED};

const O: u32 = 2;
const T: u32 = 0;
const I: u32 = 1;

fn board_with_seeds(seeds: &[u32]) -> Board {
    let mut board = Board::new(10, 20);
    board.enqueue_seeds(seeds.iter().copied());
    board
}

fn shift(board: &mut Board, direction: Direction, times: usize) {
    for _ in 0..times {
        assert!(board.move_active(direction), "move {:?} refused", direction);
    }
}

fn cells_of(board: &Board, id: TetrominoId) -> HashSet<(i32, i32)> {
    board.blocks_of(id).iter().map(|p| (p.x, p.y)).collect()
}

fn lines_completed(events: &[BoardEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::LinesCompleted { count } => Some(*count),
            _ => None,
        })
        .collect()
}

#[test]
fn test_o_piece_hard_drops_to_floor() {
    let mut board = board_with_seeds(&[O, O]);
    let id = board.spawn_tetromino().unwrap();
    shift(&mut board, Direction::Left, 1);
    assert_eq!(board.active_tetromino().unwrap().left(), 4);

    assert_eq!(board.hard_drop(), Some(18));

    let expected: HashSet<(i32, i32)> = [(4, 18), (5, 18), (4, 19), (5, 19)].into_iter().collect();
    assert_eq!(cells_of(&board, id), expected);
    assert!(board.occupied().iter().all(|b| b.y < 20));
}

#[test]
fn test_five_o_pieces_clear_the_bottom() {
    let mut board = board_with_seeds(&[O; 6]);
    // Spawn column is 5; offsets reach columns 0, 2, 4, 6, 8.
    let moves = [
        (Direction::Left, 5),
        (Direction::Left, 3),
        (Direction::Left, 1),
        (Direction::Right, 1),
        (Direction::Right, 3),
    ];

    board.spawn_tetromino().unwrap();
    for (i, (direction, times)) in moves.into_iter().enumerate() {
        board.drain_events();
        shift(&mut board, direction, times);
        board.hard_drop().unwrap();
        if i < moves.len() - 1 {
            assert!(!board.is_animating(), "drop {} cleared early", i);
        }
    }

    // An O is two rows tall, so the last drop completes rows 18 and 19 together.
    let events = board.drain_events();
    assert_eq!(lines_completed(&events), vec![2]);
    assert!(board.occupied().iter().all(|b| b.y != 19));
    assert!(board.occupied().is_empty());
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, BoardEvent::Removed { .. }))
            .count(),
        5
    );
}

#[test]
fn test_single_row_clear_reports_one_line() {
    let mut board = board_with_seeds(&[SINGLE_SEED; 11]);
    board.spawn_tetromino().unwrap();
    for x in 0..10 {
        board.drain_events();
        let left = board.active_tetromino().unwrap().left();
        let (direction, times) = if x < left {
            (Direction::Left, (left - x) as usize)
        } else {
            (Direction::Right, (x - left) as usize)
        };
        shift(&mut board, direction, times);
        board.hard_drop().unwrap();
    }

    let events = board.drain_events();
    assert_eq!(lines_completed(&events), vec![1]);
    assert!(board.occupied().is_empty());
    assert!(board.is_animating());
}

#[test]
fn test_t_piece_rotation_is_deterministic() {
    let mut board = board_with_seeds(&[T, T]);
    let id = board.spawn_tetromino().unwrap();

    let spawn: Vec<Point> = board.active_tetromino().unwrap().blocks().to_vec();
    assert_eq!(
        spawn,
        vec![
            Point::new(5, 0),
            Point::new(4, 0),
            Point::new(6, 0),
            Point::new(5, 1)
        ]
    );

    shift(&mut board, Direction::Down, 2);
    assert!(board.rotate_active(Spin::Clockwise));

    let piece = board.tetromino(id).unwrap();
    assert_eq!(piece.rotation(), 1);
    assert_eq!(piece.pivot(), Point::new(5, 2));
    assert_eq!(
        piece.blocks().to_vec(),
        vec![
            Point::new(5, 2),
            Point::new(5, 1),
            Point::new(5, 3),
            Point::new(6, 2)
        ]
    );
}

#[test]
fn test_hold_cycle_restores_first_piece() {
    // T is held, I is dropped, O arrives and is swapped for the held T.
    let mut board = board_with_seeds(&[T, I, O, 3]);
    let first = board.spawn_tetromino().unwrap();

    assert!(board.hold());
    assert!(!board.can_hold());
    let second = board.active_id().unwrap();
    assert_ne!(second, first);
    assert_eq!(board.active_tetromino().unwrap().shape(), Shape::I);
    assert!(!board.hold(), "second hold in the same cycle");

    board.hard_drop().unwrap();
    assert!(board.can_hold());
    let third = board.active_id().unwrap();
    assert_eq!(board.active_tetromino().unwrap().shape(), Shape::O);

    assert!(board.hold());
    assert_eq!(board.active_id(), Some(first));
    assert_eq!(board.held_tetromino().unwrap().id(), third);
    assert!(!board.can_hold());

    let active = board.active_tetromino().unwrap();
    assert_eq!(active.shape(), Shape::T);
    assert_eq!((active.left(), active.top(), active.rotation()), (5, 0, 0));
}

fn assert_vertical_i(board: &Board, id: TetrominoId) -> i32 {
    let cells = board.blocks_of(id);
    let columns: HashSet<i32> = cells.iter().map(|p| p.x).collect();
    assert_eq!(columns.len(), 1, "not vertical: {:?}", cells);
    let rows: Vec<i32> = cells.iter().map(|p| p.y).collect();
    assert_eq!(rows.iter().max().unwrap() - rows.iter().min().unwrap(), 3);
    assert!(cells.iter().all(|p| board.in_bounds(*p)));
    cells[0].x
}

#[test]
fn test_i_piece_at_left_wall_on_top_row_kicks_right() {
    let mut board = board_with_seeds(&[I, I]);
    let id = board.spawn_tetromino().unwrap();
    shift(&mut board, Direction::Left, 4);
    assert!(!board.move_active(Direction::Left));
    let piece = board.tetromino(id).unwrap();
    assert_eq!((piece.left(), piece.top()), (1, 0));

    assert!(board.rotate_active(Spin::Clockwise));

    let piece = board.tetromino(id).unwrap();
    assert_eq!(piece.rotation(), 1);
    assert!(piece.left() > 1, "stayed at column {}", piece.left());
    assert!(assert_vertical_i(&board, id) > 1);
}

#[test]
fn test_i_piece_at_right_wall_on_top_row_kicks_left() {
    let mut board = board_with_seeds(&[I, I]);
    let id = board.spawn_tetromino().unwrap();
    shift(&mut board, Direction::Right, 2);
    assert!(!board.move_active(Direction::Right));
    let piece = board.tetromino(id).unwrap();
    assert_eq!((piece.left(), piece.top()), (7, 0));

    assert!(board.rotate_active(Spin::Clockwise));

    let piece = board.tetromino(id).unwrap();
    assert_eq!(piece.rotation(), 1);
    assert!(piece.left() < 7, "stayed at column {}", piece.left());
    assert!(assert_vertical_i(&board, id) < 9);
}

#[test]
fn test_i_piece_kicks_right_off_left_wall() {
    let mut board = board_with_seeds(&[I, I]);
    let id = board.spawn_tetromino().unwrap();
    shift(&mut board, Direction::Down, 3);
    assert!(board.rotate_active(Spin::Clockwise));
    // Vertical now, so it can sit flush against the wall.
    while board.move_active(Direction::Left) {}
    assert_eq!(board.active_tetromino().unwrap().left(), 0);

    // Back to horizontal: the unshifted placement would leave the board.
    assert!(board.rotate_active(Spin::Clockwise));
    let piece = board.tetromino(id).unwrap();
    assert_eq!(piece.rotation(), 0);
    assert_eq!(piece.left(), 1);
    assert!(board.blocks_of(id).iter().all(|p| p.x >= 0 && p.y == piece.top()));
}

#[test]
fn test_rotation_against_right_wall_kicks_left() {
    let mut board = board_with_seeds(&[I, I]);
    let id = board.spawn_tetromino().unwrap();
    shift(&mut board, Direction::Down, 3);
    assert!(board.rotate_active(Spin::Clockwise));
    while board.move_active(Direction::Right) {}
    assert_eq!(board.active_tetromino().unwrap().left(), 9);

    assert!(board.rotate_active(Spin::Clockwise));
    assert!(board.blocks_of(id).iter().all(|p| p.x < 10));
}

#[test]
fn test_interlocked_pieces_settle_without_gaps() {
    // Row 19 is full except the right-most column. Piece 2 is a vertical I
    // resting on the right end of piece 3, a horizontal I. Settling in id
    // order would find piece 2 stuck on piece 3.
    let mut occupied: Vec<Block> = (0..9)
        .map(|x| Block::new(Point::new(x, 19), TetrominoId(1)))
        .collect();
    occupied.extend((14..18).map(|y| Block::new(Point::new(3, y), TetrominoId(2))));
    occupied.extend((0..4).map(|x| Block::new(Point::new(x, 18), TetrominoId(3))));
    let before: Vec<Block> = occupied.clone();

    let mut board = Board::new(10, 20);
    board.restore(RestoredState {
        occupied,
        ..RestoredState::default()
    });
    board.enqueue_seeds([SINGLE_SEED, SINGLE_SEED]);
    board.spawn_tetromino().unwrap();
    shift(&mut board, Direction::Right, 4);
    board.hard_drop().unwrap();

    assert_eq!(lines_completed(board.events()), vec![1]);

    let vertical = cells_of(&board, TetrominoId(2));
    let horizontal = cells_of(&board, TetrominoId(3));
    assert_eq!(vertical, (15..19).map(|y| (3, y)).collect());
    assert_eq!(horizontal, (0..4).map(|x| (x, 19)).collect());
    assert!(board.tetromino(TetrominoId(1)).is_none());

    for block in board.occupied() {
        let start = before
            .iter()
            .filter(|b| b.parent == block.parent && b.x == block.x)
            .map(|b| b.y)
            .min()
            .unwrap();
        assert!(block.y >= start, "block {:?} rose above its start", block);
    }
}

#[test]
fn test_cascade_runs_a_second_pass() {
    // Row 19 is full except column 9 and a floating bar of piece 3 sits on
    // row 15. A vertical I in column 9 completes row 19; once the bar falls
    // onto the floor, the I's remaining cell completes it again.
    let mut occupied: Vec<Block> = (0..9)
        .map(|x| Block::new(Point::new(x, 19), TetrominoId(1)))
        .collect();
    occupied.extend((0..9).map(|x| Block::new(Point::new(x, 15), TetrominoId(3))));

    let mut board = Board::new(10, 20);
    board.restore(RestoredState {
        occupied,
        ..RestoredState::default()
    });
    board.enqueue_seeds([I, SINGLE_SEED]);
    let id = board.spawn_tetromino().unwrap();
    shift(&mut board, Direction::Down, 3);
    assert!(board.rotate_active(Spin::Clockwise));
    shift(&mut board, Direction::Right, 4);
    assert_eq!(board.hard_drop(), Some(14));

    assert_eq!(lines_completed(board.events()), vec![1, 1]);
    assert_eq!(board.clearing_rows(), &[19, 19]);
    assert!(board.tetromino(TetrominoId(1)).is_none());
    assert!(board.tetromino(TetrominoId(3)).is_none());
    assert_eq!(cells_of(&board, id), [(9, 18), (9, 19)].into_iter().collect());
}

#[test]
fn test_board_invariants_hold_through_random_play() {
    let mut board = Board::new(10, 20);
    let mut steps = 0;
    board.spawn_tetromino().unwrap();

    while !board.is_game_over() && steps < 2_000 {
        steps += 1;
        match steps % 7 {
            0 => {
                board.rotate_active(Spin::Clockwise);
            }
            1 | 4 => {
                board.move_active(Direction::Left);
            }
            2 => {
                board.move_active(Direction::Right);
            }
            3 => {
                board.hold();
            }
            5 => {
                board.hard_drop();
            }
            _ => {
                board.tick();
            }
        }
        if board.is_animating() {
            board.advance(1_000);
        }

        let mut seen = HashSet::new();
        for block in board.occupied() {
            assert!(board.in_bounds(block.point()), "{:?} out of bounds", block);
            assert!(seen.insert((block.x, block.y)), "duplicate at {:?}", block);
            assert!(board.tetromino(block.parent).is_some());
        }
        if !board.is_animating() && !board.is_game_over() {
            assert_eq!(board.unlocked_count(), 1);
        }
        if let Some(active) = board.active_tetromino() {
            for p in active.blocks() {
                assert!(board.in_bounds(p));
                assert!(!seen.contains(&(p.x, p.y)));
            }
        }
        board.drain_events();
    }
    assert!(board.is_game_over() || steps == 2_000);
}
