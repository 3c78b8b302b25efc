//! Module C: the move generator. One entry point, [`generate`], staged pseudo-legal
//! generation with pin/check awareness and a capture-only mode for quiescence.

use std::fmt;

use arrayvec::ArrayVec;

use crate::eval;
use crate::piece::{Color, PieceCode, PieceKind, code_color, code_kind, is_empty, make_code};
use crate::position::Position;
use crate::square::Square;
use crate::tables::{BISHOP_DIRS, DIR_STEPS, KING_TARGETS, KNIGHT_TARGETS, RAY_LIMIT, ROOK_DIRS};

// ---------------------------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------------------------

pub const PROMO_MASK: u8 = 0b0000_0111;
pub const LEGAL: u8 = 0b0000_1000;
pub const EN_PASSANT: u8 = 0b0001_0000;
pub const CASTLE: u8 = 0b0010_0000;

/// A position has at most a few dozen legal moves; a fixed-capacity buffer avoids
/// heap churn in the search's innermost loop. 256 is a generous upper bound.
pub type MoveList = ArrayVec<Move, 256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub moving: PieceCode,
    pub captured: PieceCode,
    pub flags: u8,
    pub score: i32,
}

impl Move {
    #[inline]
    pub fn promotion_kind(&self) -> Option<PieceKind> {
        PieceKind::from_u8(self.flags & PROMO_MASK)
    }

    #[inline(always)]
    pub fn is_promotion(&self) -> bool {
        (self.flags & PROMO_MASK) != 0
    }

    #[inline(always)]
    pub fn is_legal_flag(&self) -> bool {
        (self.flags & LEGAL) != 0
    }

    #[inline(always)]
    pub fn is_en_passant(&self) -> bool {
        (self.flags & EN_PASSANT) != 0
    }

    #[inline(always)]
    pub fn is_castle(&self) -> bool {
        (self.flags & CASTLE) != 0
    }

    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        !is_empty(self.captured)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion_kind() {
            write!(f, "{}", kind.glyph(Color::Black))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------
// Ray walking (zero-allocation iterator over squares from `from` to the board edge)
// ---------------------------------------------------------------------------------------------

pub struct RayIter {
    cur: i16,
    limit: Option<u8>,
    step: i16,
    done: bool,
}

impl Iterator for RayIter {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.done {
            return None;
        }
        let limit = self.limit?;
        self.cur += self.step;
        let sq = Square::new(self.cur as u8);
        if sq.0 == limit {
            self.done = true;
        }
        Some(sq)
    }
}

#[inline]
pub fn ray_walk(from: Square, dir: usize) -> RayIter {
    RayIter {
        cur: from.0 as i16,
        limit: RAY_LIMIT[from.index()][dir].map(|s| s.0),
        step: DIR_STEPS[dir] as i16,
        done: false,
    }
}

const ALL_DIRS: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

// ---------------------------------------------------------------------------------------------
// Attack detection, shared by in_check, castling legality, and the pin scan.
// ---------------------------------------------------------------------------------------------

/// True iff `sq` is attacked by any piece of color `by`. Same ray/knight/pawn scan used
/// throughout the generator and by `Position::in_check`.
pub fn square_attacked_by(pos: &Position, sq: Square, by: Color) -> bool {
    // Pawns: a square is attacked by a pawn one rank "behind" it (from the attacker's
    // own forward direction) on an adjacent file.
    let behind: i8 = match by {
        Color::White => -1,
        Color::Black => 1,
    };
    for df in [-1, 1] {
        if let Some(p) = sq.try_offset(df, behind) {
            let code = pos.board[p.index()];
            if !is_empty(code) && code_color(code) == by && code_kind(code) == PieceKind::Pawn {
                return true;
            }
        }
    }

    for &t in &KNIGHT_TARGETS[sq.index()] {
        let code = pos.board[t.index()];
        if !is_empty(code) && code_color(code) == by && code_kind(code) == PieceKind::Knight {
            return true;
        }
    }

    for &t in &KING_TARGETS[sq.index()] {
        let code = pos.board[t.index()];
        if !is_empty(code) && code_color(code) == by && code_kind(code) == PieceKind::King {
            return true;
        }
    }

    for &dir in &ROOK_DIRS {
        for s in ray_walk(sq, dir) {
            let code = pos.board[s.index()];
            if is_empty(code) {
                continue;
            }
            if code_color(code) == by && matches!(code_kind(code), PieceKind::Rook | PieceKind::Queen)
            {
                return true;
            }
            break;
        }
    }

    for &dir in &BISHOP_DIRS {
        for s in ray_walk(sq, dir) {
            let code = pos.board[s.index()];
            if is_empty(code) {
                continue;
            }
            if code_color(code) == by
                && matches!(code_kind(code), PieceKind::Bishop | PieceKind::Queen)
            {
                return true;
            }
            break;
        }
    }

    false
}

/// Bitmask (by square index) of `mover`'s pieces absolutely pinned to their king.
fn pinned_mask(pos: &Position, mover: Color) -> u64 {
    let king_sq = pos.king_square[mover as usize];
    let enemy = mover.opposite();
    let mut mask = 0u64;

    for &dir in &ALL_DIRS {
        let mut first: Option<Square> = None;
        for sq in ray_walk(king_sq, dir) {
            let code = pos.board[sq.index()];
            if is_empty(code) {
                continue;
            }
            match first {
                None => {
                    if code_color(code) == mover {
                        first = Some(sq);
                        continue;
                    } else {
                        break;
                    }
                }
                Some(pinned_sq) => {
                    if code_color(code) == enemy {
                        let kind = code_kind(code);
                        let matches_ray = if ROOK_DIRS.contains(&dir) {
                            matches!(kind, PieceKind::Rook | PieceKind::Queen)
                        } else {
                            matches!(kind, PieceKind::Bishop | PieceKind::Queen)
                        };
                        if matches_ray {
                            mask |= 1u64 << pinned_sq.index();
                        }
                    }
                    break;
                }
            }
        }
    }
    mask
}

// ---------------------------------------------------------------------------------------------
// Castling
// ---------------------------------------------------------------------------------------------

struct CastleGeometry {
    king_home: Square,
    rook_home: Square,
    king_to: Square,
    empty_between: &'static [u8],
    king_path: &'static [u8],
}

fn castle_geometry(color: Color, kingside: bool) -> CastleGeometry {
    match (color, kingside) {
        (Color::White, true) => CastleGeometry {
            king_home: Square::new(4),
            rook_home: Square::new(7),
            king_to: Square::new(6),
            empty_between: &[5, 6],
            king_path: &[4, 5, 6],
        },
        (Color::White, false) => CastleGeometry {
            king_home: Square::new(4),
            rook_home: Square::new(0),
            king_to: Square::new(2),
            empty_between: &[1, 2, 3],
            king_path: &[4, 3, 2],
        },
        (Color::Black, true) => CastleGeometry {
            king_home: Square::new(60),
            rook_home: Square::new(63),
            king_to: Square::new(62),
            empty_between: &[61, 62],
            king_path: &[60, 61, 62],
        },
        (Color::Black, false) => CastleGeometry {
            king_home: Square::new(60),
            rook_home: Square::new(56),
            king_to: Square::new(58),
            empty_between: &[57, 58, 59],
            king_path: &[60, 59, 58],
        },
    }
}

fn castle_rook_to(color: Color, kingside: bool) -> Square {
    match (color, kingside) {
        (Color::White, true) => Square::new(5),
        (Color::White, false) => Square::new(3),
        (Color::Black, true) => Square::new(61),
        (Color::Black, false) => Square::new(59),
    }
}

pub(crate) fn castle_rook_move(color: Color, kingside: bool) -> (Square, Square) {
    let geo = castle_geometry(color, kingside);
    (geo.rook_home, castle_rook_to(color, kingside))
}

fn castling_allowed(pos: &Position, color: Color, kingside: bool) -> bool {
    let right_index = if kingside { 0 } else { 1 };
    if pos.castle_lost_at[color as usize][right_index].is_some() {
        return false;
    }
    let geo = castle_geometry(color, kingside);
    if pos.board[geo.king_home.index()] != make_code(color, PieceKind::King)
        || pos.board[geo.rook_home.index()] != make_code(color, PieceKind::Rook)
    {
        return false;
    }
    for &sq in geo.empty_between {
        if !is_empty(pos.board[sq as usize]) {
            return false;
        }
    }
    let enemy = color.opposite();
    for &sq in geo.king_path {
        if square_attacked_by(pos, Square::new(sq), enemy) {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------------------------

/// Generates moves into `out`. Returns whether the side to move is in check.
///
/// When `captures_only` is true and the side to move is not in check, only captures and
/// promotions are emitted. When in check, `captures_only` is ignored and every legal escape
/// is emitted regardless of capture status.
pub fn generate(pos: &Position, out: &mut MoveList, captures_only: bool) -> bool {
    let mover = pos.side_to_move_color();
    let king_sq = pos.king_square[mover as usize];
    let enemy = mover.opposite();
    let in_check = square_attacked_by(pos, king_sq, enemy);
    let effective_captures_only = captures_only && !in_check;
    let pinned = pinned_mask(pos, mover);

    generate_en_passant(pos, mover, out);
    if !in_check && !effective_captures_only {
        generate_castling(pos, mover, out);
    }

    for i in 0u8..64 {
        let from = Square::new(i);
        let code = pos.board[from.index()];
        if is_empty(code) || code_color(code) != mover {
            continue;
        }
        let kind = code_kind(code);
        let is_pinned = (pinned >> from.index()) & 1 != 0;
        match kind {
            PieceKind::Pawn => {
                generate_pawn_moves(pos, from, mover, code, effective_captures_only, in_check, is_pinned, out)
            }
            PieceKind::Knight => generate_leaper(
                pos,
                from,
                code,
                mover,
                &KNIGHT_TARGETS[from.index()],
                effective_captures_only,
                in_check,
                is_pinned,
                out,
            ),
            PieceKind::King => generate_king_steps(pos, from, code, mover, effective_captures_only, out),
            PieceKind::Bishop => {
                generate_slider(pos, from, code, mover, &BISHOP_DIRS, effective_captures_only, in_check, is_pinned, out)
            }
            PieceKind::Rook => {
                generate_slider(pos, from, code, mover, &ROOK_DIRS, effective_captures_only, in_check, is_pinned, out)
            }
            PieceKind::Queen => {
                generate_slider(pos, from, code, mover, &ROOK_DIRS, effective_captures_only, in_check, is_pinned, out);
                generate_slider(pos, from, code, mover, &BISHOP_DIRS, effective_captures_only, in_check, is_pinned, out);
            }
        }
    }

    in_check
}

/// Captures-and-promotions-only generator used by quiescence search (§4.F).
pub fn generate_captures(pos: &Position, out: &mut MoveList) -> bool {
    generate(pos, out, true)
}

#[inline]
fn push_move(
    pos: &Position,
    out: &mut MoveList,
    from: Square,
    to: Square,
    moving: PieceCode,
    captured: PieceCode,
    mut flags: u8,
    in_check: bool,
    is_pinned: bool,
) {
    let is_king = code_kind(moving) == PieceKind::King;
    if !in_check && !is_pinned && !is_king && (flags & EN_PASSANT) == 0 {
        flags |= LEGAL;
    }
    let mv = Move {
        from,
        to,
        moving,
        captured,
        flags,
        score: 0,
    };
    let score = eval::heuristic_score(pos, &mv);
    out.push(Move { score, ..mv });
}

fn generate_leaper(
    pos: &Position,
    from: Square,
    code: PieceCode,
    mover: Color,
    targets: &[Square],
    captures_only: bool,
    in_check: bool,
    is_pinned: bool,
    out: &mut MoveList,
) {
    for &to in targets {
        let occ = pos.board[to.index()];
        if is_empty(occ) {
            if !captures_only {
                push_move(pos, out, from, to, code, 0, 0, in_check, is_pinned);
            }
        } else if code_color(occ) != mover {
            push_move(pos, out, from, to, code, occ, 0, in_check, is_pinned);
        }
    }
}

fn generate_king_steps(
    pos: &Position,
    from: Square,
    code: PieceCode,
    mover: Color,
    captures_only: bool,
    out: &mut MoveList,
) {
    for &to in &KING_TARGETS[from.index()] {
        let occ = pos.board[to.index()];
        if is_empty(occ) {
            if !captures_only {
                push_move(pos, out, from, to, code, 0, 0, false, false);
            }
        } else if code_color(occ) != mover {
            push_move(pos, out, from, to, code, occ, 0, false, false);
        }
    }
}

fn generate_slider(
    pos: &Position,
    from: Square,
    code: PieceCode,
    mover: Color,
    dirs: &[usize],
    captures_only: bool,
    in_check: bool,
    is_pinned: bool,
    out: &mut MoveList,
) {
    for &dir in dirs {
        for to in ray_walk(from, dir) {
            let occ = pos.board[to.index()];
            if is_empty(occ) {
                if !captures_only {
                    push_move(pos, out, from, to, code, 0, 0, in_check, is_pinned);
                }
                continue;
            }
            if code_color(occ) != mover {
                push_move(pos, out, from, to, code, occ, 0, in_check, is_pinned);
            }
            break;
        }
    }
}

const PROMO_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

fn generate_pawn_moves(
    pos: &Position,
    from: Square,
    mover: Color,
    code: PieceCode,
    captures_only: bool,
    in_check: bool,
    is_pinned: bool,
    out: &mut MoveList,
) {
    let forward: i8 = match mover {
        Color::White => 1,
        Color::Black => -1,
    };
    let start_rank = match mover {
        Color::White => 1,
        Color::Black => 6,
    };
    let promo_rank = match mover {
        Color::White => 7,
        Color::Black => 0,
    };

    if let Some(one) = from.try_offset(0, forward) {
        if is_empty(pos.board[one.index()]) {
            if one.rank() == promo_rank {
                if !captures_only {
                    for kind in PROMO_KINDS {
                        push_move(pos, out, from, one, code, 0, kind as u8, in_check, is_pinned);
                    }
                }
            } else {
                if !captures_only {
                    push_move(pos, out, from, one, code, 0, 0, in_check, is_pinned);
                }
                if from.rank() == start_rank {
                    if let Some(two) = from.try_offset(0, forward * 2) {
                        if is_empty(pos.board[two.index()]) && !captures_only {
                            push_move(pos, out, from, two, code, 0, 0, in_check, is_pinned);
                        }
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = from.try_offset(df, forward) else {
            continue;
        };
        let occ = pos.board[to.index()];
        if is_empty(occ) || code_color(occ) == mover {
            continue;
        }
        if to.rank() == promo_rank {
            for kind in PROMO_KINDS {
                push_move(pos, out, from, to, code, occ, kind as u8, in_check, is_pinned);
            }
        } else {
            push_move(pos, out, from, to, code, occ, 0, in_check, is_pinned);
        }
    }
}

fn generate_en_passant(pos: &Position, mover: Color, out: &mut MoveList) {
    let Some(ep) = pos.ep_square else {
        return;
    };
    let forward: i8 = match mover {
        Color::White => 1,
        Color::Black => -1,
    };
    let code = make_code(mover, PieceKind::Pawn);
    for df in [-1, 1] {
        let Some(from) = ep.try_offset(df, -forward) else {
            continue;
        };
        if pos.board[from.index()] != code {
            continue;
        }
        let captured_sq = ep.try_offset(0, -forward).expect("ep square always has a rank behind it");
        let captured = pos.board[captured_sq.index()];
        let mv = Move {
            from,
            to: ep,
            moving: code,
            captured,
            flags: EN_PASSANT,
            score: 0,
        };
        let score = eval::heuristic_score(pos, &mv);
        out.push(Move { score, ..mv });
    }
}

fn generate_castling(pos: &Position, mover: Color, out: &mut MoveList) {
    for kingside in [true, false] {
        if castling_allowed(pos, mover, kingside) {
            let geo = castle_geometry(mover, kingside);
            let code = make_code(mover, PieceKind::King);
            let mv = Move {
                from: geo.king_home,
                to: geo.king_to,
                moving: code,
                captured: 0,
                flags: CASTLE,
                score: 0,
            };
            let score = eval::heuristic_score(pos, &mv);
            out.push(Move { score, ..mv });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let pos = Position::startpos();
        let mut moves = MoveList::new();
        let in_check = generate(&pos, &mut moves, false);
        assert!(!in_check);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn captures_only_is_subset_when_not_in_check() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut all = MoveList::new();
        let mut caps = MoveList::new();
        generate(&pos, &mut all, false);
        generate(&pos, &mut caps, true);
        for c in &caps {
            assert!(c.is_capture() || c.is_promotion());
        }
        assert!(caps.len() <= all.len());
    }
}
