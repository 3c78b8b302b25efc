//! Module D: evaluation. A tapered blend of the position's early/end-game piece-square
//! accumulators, plus a cheap non-mutating delta used for move ordering.

use crate::movegen::Move;
use crate::piece::{PieceKind, code_color, code_kind, is_empty};
use crate::position::Position;
use crate::square::Square;
use crate::tables::{self, PIECE_BASE};

/// White-perspective centipawn score: positive favors White. Callers wanting a
/// side-to-move-relative score multiply by `pos.side_to_move_color().sign()`.
pub fn evaluate(pos: &Position) -> i32 {
    (pos.ms_weight * pos.eval_early + (128 - pos.ms_weight) * pos.eval_end) / 128
}

/// Side-to-move-relative score, the form negamax search wants.
pub fn evaluate_stm(pos: &Position) -> i32 {
    evaluate(pos) * pos.side_to_move_color().sign()
}

/// White-perspective (Δearly, Δend) this move would produce, computed directly from the
/// piece-square tables without mutating `pos`. Used for move ordering; the authoritative
/// post-move accumulators are always obtained via `Position::make`'s full recompute.
pub fn move_delta(pos: &Position, mv: &Move) -> (i32, i32) {
    let mover_sign = code_color(mv.moving).sign();
    let mut d_early = 0i32;
    let mut d_end = 0i32;

    d_early -= mover_sign * tables::psq_early(mv.moving, mv.from);
    d_end -= mover_sign * tables::psq_end(mv.moving, mv.from);

    let placed = match mv.promotion_kind() {
        Some(promo) => crate::piece::make_code(code_color(mv.moving), promo),
        None => mv.moving,
    };
    d_early += mover_sign * tables::psq_early(placed, mv.to);
    d_end += mover_sign * tables::psq_end(placed, mv.to);

    if mv.is_en_passant() {
        let captured_sq = Square::new(if mover_sign > 0 { mv.to.0 - 8 } else { mv.to.0 + 8 });
        let captured_sign = -mover_sign;
        d_early -= captured_sign * tables::psq_early(mv.captured, captured_sq);
        d_end -= captured_sign * tables::psq_end(mv.captured, captured_sq);
    } else if !is_empty(mv.captured) {
        let captured_sign = -mover_sign;
        d_early -= captured_sign * tables::psq_early(mv.captured, mv.to);
        d_end -= captured_sign * tables::psq_end(mv.captured, mv.to);
    }

    if mv.is_castle() {
        let (rook_from, rook_to) = crate::movegen::castle_rook_move(code_color(mv.moving), mv.to.file() == 6);
        let rook_code = crate::piece::make_code(code_color(mv.moving), PieceKind::Rook);
        d_early += mover_sign * (tables::psq_early(rook_code, rook_to) - tables::psq_early(rook_code, rook_from));
        d_end += mover_sign * (tables::psq_end(rook_code, rook_to) - tables::psq_end(rook_code, rook_from));
    }

    (d_early, d_end)
}

/// Move-ordering score from the mover's perspective: captures and promotions first
/// (heaviest material swing ordered first), then a small positional nudge from the
/// tapered positional delta.
pub fn heuristic_score(pos: &Position, mv: &Move) -> i32 {
    let mover_sign = code_color(mv.moving).sign();
    let (d_early, d_end) = move_delta(pos, mv);
    let tapered = (pos.ms_weight * d_early + (128 - pos.ms_weight) * d_end) / 128;
    let positional = tapered * mover_sign;

    let mut score = positional;
    if !is_empty(mv.captured) {
        let victim = PIECE_BASE[code_kind(mv.captured) as usize - 1];
        let attacker = PIECE_BASE[code_kind(mv.moving) as usize - 1];
        score += 10_000 + victim * 10 - attacker;
    }
    if let Some(promo) = mv.promotion_kind() {
        score += PIECE_BASE[promo as usize - 1] * 8;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        let pos = Position::startpos();
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn capture_outranks_quiet_move_in_ordering() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut moves = crate::movegen::MoveList::new();
        crate::movegen::generate(&pos, &mut moves, false);
        let best_capture = moves
            .iter()
            .filter(|m| m.is_capture())
            .map(|m| m.score)
            .max()
            .unwrap();
        let best_quiet = moves
            .iter()
            .filter(|m| !m.is_capture() && !m.is_promotion())
            .map(|m| m.score)
            .max()
            .unwrap();
        assert!(best_capture > best_quiet);
    }
}
