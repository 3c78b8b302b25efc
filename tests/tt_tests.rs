//! Transposition table packing: round trips, index collisions, and the always-replace
//! policy.

use mailbox_chess::movegen::Move;
use mailbox_chess::piece::{Color, PieceKind, make_code};
use mailbox_chess::square::Square;
use mailbox_chess::tt::{Bound, TranspositionTable};

fn mv(from: u8, to: u8) -> Move {
    Move {
        from: Square::new(from),
        to: Square::new(to),
        moving: make_code(Color::White, PieceKind::Knight),
        captured: 0,
        flags: 0,
        score: 0,
    }
}

#[test]
fn entries_round_trip_through_pack_and_unpack() {
    let mut tt = TranspositionTable::new();
    let best = mv(1, 18);
    tt.store(0xDEAD_BEEF_0000_1234, 12, Bound::Lower, -250, Some(&best));
    let probe = tt.probe(0xDEAD_BEEF_0000_1234).unwrap();
    assert_eq!(probe.depth, 12);
    assert_eq!(probe.bound, Bound::Lower);
    assert_eq!(probe.eval, -250);
    assert!(probe.mv.unwrap().matches(&best));
}

#[test]
fn a_miss_returns_none() {
    let tt = TranspositionTable::new();
    assert!(tt.probe(0x1).is_none());
}

#[test]
fn always_replace_overwrites_the_prior_entry_at_the_same_index() {
    let mut tt = TranspositionTable::new();
    let first = mv(1, 18);
    let second = mv(6, 21);
    tt.store(42, 4, Bound::Exact, 10, Some(&first));
    tt.store(42, 9, Bound::Upper, -30, Some(&second));
    let probe = tt.probe(42).unwrap();
    assert_eq!(probe.depth, 9);
    assert_eq!(probe.bound, Bound::Upper);
    assert_eq!(probe.eval, -30);
    assert!(probe.mv.unwrap().matches(&second));
}

#[test]
fn clear_empties_every_slot() {
    let mut tt = TranspositionTable::new();
    tt.store(7, 5, Bound::Exact, 1, None);
    tt.clear();
    assert!(tt.probe(7).is_none());
}

#[test]
fn promotion_hint_round_trips() {
    let mut tt = TranspositionTable::new();
    let promoting = Move {
        from: Square::new(52),
        to: Square::new(60),
        moving: make_code(Color::White, PieceKind::Pawn),
        captured: 0,
        flags: PieceKind::Queen as u8,
        score: 0,
    };
    tt.store(99, 1, Bound::Exact, 900, Some(&promoting));
    let probe = tt.probe(99).unwrap();
    assert_eq!(probe.mv.unwrap().promotion, Some(PieceKind::Queen));
}
