//! Fifty-move, threefold repetition, and insufficient-material draw detection.

use mailbox_chess::movegen;
use mailbox_chess::position::Position;

#[test]
fn fifty_move_clock_resets_on_capture() {
    let mut pos =
        Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 40 30").expect("valid fen");
    let mut moves = movegen::MoveList::new();
    movegen::generate(&pos, &mut moves, false);
    let capture = moves
        .iter()
        .find(|m| m.is_capture())
        .copied()
        .expect("exd5 is available");
    assert!(pos.make(capture));
    assert_eq!(pos.hmcr, 0);
}

#[test]
fn threefold_repetition_is_detected() {
    let mut pos = Position::startpos();
    let mut moves = movegen::MoveList::new();

    // Knights out and back, twice: Nf3 Nf6 Ng1 Ng8 Nf3 Nf6 Ng1 Ng8 reaches the
    // starting position for the fourth time (third repetition).
    for _ in 0..2 {
        for (from, to) in [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")] {
            moves.clear();
            movegen::generate(&pos, &mut moves, false);
            let mv = moves
                .iter()
                .find(|m| m.from.to_string() == from && m.to.to_string() == to)
                .copied()
                .unwrap_or_else(|| panic!("expected a move {from}{to}"));
            assert!(pos.make(mv));
        }
    }

    assert!(pos.is_draw_repetition());
}

#[test]
fn bare_kings_are_insufficient_material() {
    let pos = Position::from_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1").unwrap();
    assert!(pos.is_draw_material());
    assert!(pos.is_draw());
}

#[test]
fn king_and_pawn_is_sufficient_material() {
    let pos = Position::from_fen("8/8/4k3/8/8/3KP3/8/8 w - - 0 1").unwrap();
    assert!(!pos.is_draw_material());
}

#[test]
fn king_and_two_knights_versus_bare_king_is_a_draw() {
    let pos = Position::from_fen("8/8/4k3/8/8/3K4/8/2N1N3 w - - 0 1").unwrap();
    assert!(pos.is_draw_material());
}

#[test]
fn king_and_bishop_and_knight_versus_bare_king_is_not_a_draw() {
    let pos = Position::from_fen("8/8/4k3/8/8/3K4/8/2N1B3 w - - 0 1").unwrap();
    assert!(!pos.is_draw_material());
}

#[test]
fn lone_minor_versus_lone_minor_is_a_draw() {
    let pos = Position::from_fen("8/8/3bk3/8/8/3KN3/8/8 w - - 0 1").unwrap();
    assert!(pos.is_draw_material());
}

#[test]
fn fifty_move_rule_fires_exactly_at_halfmove_hundred() {
    let mut pos = Position::from_fen("8/8/8/4k3/8/8/8/4K2R w - - 99 60").unwrap();
    assert!(!pos.is_draw_50());
    let mut moves = movegen::MoveList::new();
    movegen::generate(&pos, &mut moves, false);
    let quiet_king_move = moves
        .iter()
        .find(|m| m.to.to_string() == "f1")
        .copied()
        .expect("Kf1 is legal");
    assert!(pos.make(quiet_king_move));
    assert!(pos.is_draw_50());
}
