//! Module F: iterative-deepening negamax with alpha-beta pruning and a capture-only
//! quiescence search. No null-move pruning, futility pruning, late-move reductions, or
//! aspiration windows — depth-first exhaustive search within the time budget, guided by
//! transposition-table move ordering.

use std::time::{Duration, Instant};

use crate::eval;
use crate::movegen::{self, Move};
use crate::position::Position;
use crate::tt::{Bound, MoveHint, TranspositionTable};

pub const MATE_SCORE: i32 = 32_000;
pub const MATE_THRESHOLD: i32 = 30_000;
pub const MAX_DEPTH: u8 = 32;
/// Score assigned to a position that has repeated once already, discouraging the engine
/// from steering toward a draw it could otherwise avoid, without waiting for the third
/// repetition that `Position::is_draw_repetition` requires.
pub const CONTEMPT: i32 = -50;

pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
}

pub fn search_best_move(pos: &mut Position, tt: &mut TranspositionTable, think_ms: u64) -> SearchResult {
    let start = Instant::now();
    let budget = Duration::from_millis(think_ms);
    let mut result = SearchResult {
        best_move: None,
        score: 0,
        depth: 0,
        nodes: 0,
    };
    let mut last_iter = Duration::ZERO;
    let mut depth = 1u8;

    while depth <= MAX_DEPTH {
        let iter_start = Instant::now();
        let mut nodes = 0u64;
        let deadline = start + budget;
        match root_search(pos, tt, depth, deadline, &mut nodes) {
            Some((score, best_move)) => {
                result.score = score;
                result.depth = depth;
                result.nodes += nodes;
                if best_move.is_some() {
                    result.best_move = best_move;
                }
            }
            None => break,
        }
        last_iter = iter_start.elapsed();
        if result.score.abs() >= MATE_THRESHOLD {
            break;
        }
        depth += 1;
        let projected = start.elapsed() + last_iter.mul_f64(1.25);
        if projected > budget {
            break;
        }
    }

    result
}

fn order_moves(moves: &mut [Move], tt_hint: Option<MoveHint>) {
    moves.sort_by(|a, b| b.score.cmp(&a.score));
    if let Some(hint) = tt_hint {
        if let Some(idx) = moves.iter().position(|m| hint.matches(m)) {
            moves.swap(0, idx);
        }
    }
}

fn root_search(
    pos: &mut Position,
    tt: &mut TranspositionTable,
    depth: u8,
    deadline: Instant,
    nodes: &mut u64,
) -> Option<(i32, Option<Move>)> {
    let mut moves = movegen::MoveList::new();
    let in_check = movegen::generate(pos, &mut moves, false);
    let tt_hint = tt.probe(pos.zobrist).and_then(|p| p.mv);
    order_moves(&mut moves, tt_hint);

    let mut alpha = -MATE_SCORE - 1;
    let beta = MATE_SCORE + 1;
    let mut best_move = None;
    let mut any_legal = false;

    for mv in &moves {
        if !pos.make(*mv) {
            continue;
        }
        any_legal = true;
        let child = negamax(pos, tt, depth.saturating_sub(1), 1, -beta, -alpha, deadline, nodes);
        pos.unmake();
        let score = match child {
            Some(s) => -s,
            None => return None,
        };
        if score > alpha {
            alpha = score;
            best_move = Some(*mv);
        }
    }

    if !any_legal {
        return Some((if in_check { -MATE_SCORE } else { 0 }, None));
    }

    if alpha.abs() < MATE_THRESHOLD {
        tt.store(pos.zobrist, depth, Bound::Exact, alpha, best_move.as_ref());
    }
    Some((alpha, best_move))
}

fn negamax(
    pos: &mut Position,
    tt: &mut TranspositionTable,
    depth: u8,
    ply: u32,
    mut alpha: i32,
    beta: i32,
    deadline: Instant,
    nodes: &mut u64,
) -> Option<i32> {
    *nodes += 1;
    if *nodes % 2048 == 0 && Instant::now() >= deadline {
        return None;
    }

    if pos.is_draw_50() || pos.is_draw_material() {
        return Some(0);
    }
    if pos.repetition_occurred() {
        return Some(CONTEMPT);
    }

    if depth == 0 {
        return quiescence(pos, tt, alpha, beta, ply, deadline, nodes);
    }

    let probe = tt.probe(pos.zobrist);
    if let Some(p) = &probe {
        if p.depth as u32 >= depth as u32 && p.eval.abs() < MATE_THRESHOLD {
            match p.bound {
                Bound::Exact => return Some(p.eval),
                Bound::Lower if p.eval >= beta => return Some(p.eval),
                Bound::Upper if p.eval <= alpha => return Some(p.eval),
                _ => {}
            }
        }
    }
    let tt_hint = probe.and_then(|p| p.mv);

    let mut moves = movegen::MoveList::new();
    let in_check = movegen::generate(pos, &mut moves, false);
    order_moves(&mut moves, tt_hint);

    let alpha_orig = alpha;
    let mut best_score = -MATE_SCORE - 1;
    let mut best_move: Option<Move> = None;
    let mut any_legal = false;

    for mv in &moves {
        if !pos.make(*mv) {
            continue;
        }
        any_legal = true;
        let child = negamax(pos, tt, depth - 1, ply + 1, -beta, -alpha, deadline, nodes);
        pos.unmake();
        let score = match child {
            Some(s) => -s,
            None => return None,
        };
        if score > best_score {
            best_score = score;
            best_move = Some(*mv);
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break;
        }
    }

    if !any_legal {
        return Some(if in_check {
            -MATE_SCORE + ply as i32
        } else {
            0
        });
    }

    if best_score.abs() < MATE_THRESHOLD {
        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        tt.store(pos.zobrist, depth, bound, best_score, best_move.as_ref());
    }

    Some(best_score)
}

/// Captures-only (unless in check, in which case every evasion is searched — §4.F). A
/// side in check never stands pat: its horizon eval can look fine while it's actually
/// getting mated, so every reply must be tried before trusting a score.
fn quiescence(
    pos: &mut Position,
    tt: &mut TranspositionTable,
    mut alpha: i32,
    beta: i32,
    ply: u32,
    deadline: Instant,
    nodes: &mut u64,
) -> Option<i32> {
    *nodes += 1;
    if *nodes % 2048 == 0 && Instant::now() >= deadline {
        return None;
    }

    let mut moves = movegen::MoveList::new();
    let in_check = movegen::generate_captures(pos, &mut moves);

    if !in_check {
        let stand_pat = eval::evaluate_stm(pos);
        if stand_pat >= beta {
            return Some(beta);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
    }
    order_moves(&mut moves, None);

    let mut any_legal = false;
    for mv in &moves {
        if !pos.make(*mv) {
            continue;
        }
        any_legal = true;
        let child = if pos.is_draw_material() {
            Some(0)
        } else {
            quiescence(pos, tt, -beta, -alpha, ply + 1, deadline, nodes)
        };
        pos.unmake();
        let score = match child {
            Some(s) => -s,
            None => return None,
        };
        if score >= beta {
            return Some(beta);
        }
        if score > alpha {
            alpha = score;
        }
    }

    if in_check && !any_legal {
        return Some(-MATE_SCORE + ply as i32);
    }

    Some(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_mate_in_one() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let mut tt = TranspositionTable::new();
        let result = search_best_move(&mut pos, &mut tt, 500);
        let mv = result.best_move.expect("a move was found");
        assert_eq!(mv.from.to_string(), "a1");
        assert_eq!(mv.to.to_string(), "a8");
        assert!(result.score >= MATE_THRESHOLD);
    }

    #[test]
    fn stalemate_scores_as_draw() {
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut tt = TranspositionTable::new();
        let mut moves = movegen::MoveList::new();
        let in_check = movegen::generate(&pos, &mut moves, false);
        assert!(!in_check);
        let mut legal = 0;
        for mv in &moves {
            if pos.make(*mv) {
                legal += 1;
                pos.unmake();
            }
        }
        assert_eq!(legal, 0);
        let result = search_best_move(&mut pos, &mut tt, 100);
        assert_eq!(result.best_move, None);
    }
}
