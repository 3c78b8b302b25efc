//! Material and tapered-evaluation sanity checks.

use mailbox_chess::eval;
use mailbox_chess::position::Position;

#[test]
fn starting_position_evaluates_to_zero() {
    let pos = Position::startpos();
    assert_eq!(eval::evaluate(&pos), 0);
}

#[test]
fn missing_black_queen_favors_white() {
    let pos =
        Position::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    assert!(eval::evaluate(&pos) > 0);
}

#[test]
fn evaluate_stm_flips_sign_with_side_to_move() {
    let white_up = Position::from_fen(
        "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    )
    .unwrap();
    let mut black_to_move = white_up.clone();
    // Manufacture the mirrored side-to-move view via a FEN edit rather than a null move,
    // since the engine has no null-move primitive.
    let black_to_move_fen = black_to_move.fen().replacen(" w ", " b ", 1);
    black_to_move = Position::from_fen(&black_to_move_fen).unwrap();

    assert_eq!(eval::evaluate(&white_up), eval::evaluate(&black_to_move));
    assert!(eval::evaluate_stm(&white_up) > 0);
    assert!(eval::evaluate_stm(&black_to_move) < 0);
}

#[test]
fn phase_weight_is_maximal_at_full_material() {
    let pos = Position::startpos();
    assert_eq!(pos.ms_weight, 128);
}

#[test]
fn phase_weight_drops_as_pieces_come_off() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(pos.ms_weight, 0);
}
