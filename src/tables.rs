//! Module A: precomputed tables. Everything here is built once per process and read-only
//! thereafter — knight/king attack tables, ray bounds, Zobrist keys, tapered piece-square
//! tables, and per-piece phase weights.

use once_cell::sync::{Lazy, OnceCell};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::piece::{CODE_COUNT, Color, PieceKind, code_color, code_kind, is_empty, make_code};
use crate::square::Square;

// ---------------------------------------------------------------------------------------------
// Knight / king target lists
// ---------------------------------------------------------------------------------------------

pub static KNIGHT_TARGETS: Lazy<[Vec<Square>; 64]> = Lazy::new(|| {
    const DELTAS: [(i8, i8); 8] = [
        (1, 2),
        (2, 1),
        (2, -1),
        (1, -2),
        (-1, -2),
        (-2, -1),
        (-2, 1),
        (-1, 2),
    ];
    std::array::from_fn(|i| {
        let sq = Square::new(i as u8);
        DELTAS
            .iter()
            .filter_map(|&(df, dr)| sq.try_offset(df, dr))
            .collect()
    })
});

pub static KING_TARGETS: Lazy<[Vec<Square>; 64]> = Lazy::new(|| {
    const DELTAS: [(i8, i8); 8] = [
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
    ];
    std::array::from_fn(|i| {
        let sq = Square::new(i as u8);
        DELTAS
            .iter()
            .filter_map(|&(df, dr)| sq.try_offset(df, dr))
            .collect()
    })
});

// ---------------------------------------------------------------------------------------------
// Ray directions and bounds
// ---------------------------------------------------------------------------------------------

pub const DIR_B: usize = 0; // back:  -8
pub const DIR_F: usize = 1; // fwd:   +8
pub const DIR_L: usize = 2; // left:  -1
pub const DIR_R: usize = 3; // right: +1
pub const DIR_BL: usize = 4; // back-left:  -9
pub const DIR_FR: usize = 5; // fwd-right:  +9
pub const DIR_BR: usize = 6; // back-right: -7
pub const DIR_FL: usize = 7; // fwd-left:   +7

pub const DIR_STEPS: [i8; 8] = [-8, 8, -1, 1, -9, 9, -7, 7];
pub const ROOK_DIRS: [usize; 4] = [DIR_B, DIR_F, DIR_L, DIR_R];
pub const BISHOP_DIRS: [usize; 4] = [DIR_BL, DIR_FR, DIR_BR, DIR_FL];

/// For each square and direction, the furthest on-board square reachable (inclusive), or
/// `None` if the square is already on that edge. Callers step from `sq` toward this bound,
/// one `DIR_STEPS[dir]` at a time, stopping at the bound or at the first occupied square.
pub static RAY_LIMIT: Lazy<[[Option<Square>; 8]; 64]> = Lazy::new(|| {
    std::array::from_fn(|i| {
        let sq = Square::new(i as u8);
        let f = sq.file() as i32;
        let r = sq.rank() as i32;
        let mut limits = [None; 8];
        limits[DIR_B] = (r > 0).then(|| Square::from_file_rank(f as u8, 0));
        limits[DIR_F] = (r < 7).then(|| Square::from_file_rank(f as u8, 7));
        limits[DIR_L] = (f > 0).then(|| Square::from_file_rank(0, r as u8));
        limits[DIR_R] = (f < 7).then(|| Square::from_file_rank(7, r as u8));
        let bl = r.min(f);
        limits[DIR_BL] = (bl > 0).then(|| Square::from_file_rank((f - bl) as u8, (r - bl) as u8));
        let fr = (7 - r).min(7 - f);
        limits[DIR_FR] = (fr > 0).then(|| Square::from_file_rank((f + fr) as u8, (r + fr) as u8));
        let br = r.min(7 - f);
        limits[DIR_BR] = (br > 0).then(|| Square::from_file_rank((f + br) as u8, (r - br) as u8));
        let fl = (7 - r).min(f);
        limits[DIR_FL] = (fl > 0).then(|| Square::from_file_rank((f - fl) as u8, (r + fl) as u8));
        limits
    })
});

// ---------------------------------------------------------------------------------------------
// Zobrist keys
// ---------------------------------------------------------------------------------------------

pub struct ZobristKeys {
    pub piece: [[[u64; 64]; 6]; 2],
    pub side: u64,
    pub castle_k: [u64; 2],
    pub castle_q: [u64; 2],
    pub ep_file: [u64; 8],
}

static KEYS: OnceCell<ZobristKeys> = OnceCell::new();

pub fn zobrist_keys() -> &'static ZobristKeys {
    KEYS.get_or_init(|| generate_zobrist_keys(&mut make_zobrist_rng()))
}

fn make_zobrist_rng() -> StdRng {
    if cfg!(feature = "deterministic_zobrist") {
        StdRng::seed_from_u64(0x9E37_79B9_AAAC_5C87)
    } else {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

fn non_zero(rng: &mut StdRng) -> u64 {
    loop {
        let v = rng.next_u64();
        if v != 0 {
            return v;
        }
    }
}

fn generate_zobrist_keys(rng: &mut StdRng) -> ZobristKeys {
    let mut piece = [[[0u64; 64]; 6]; 2];
    for side in piece.iter_mut() {
        for kind in side.iter_mut() {
            for key in kind.iter_mut() {
                *key = non_zero(rng);
            }
        }
    }
    ZobristKeys {
        piece,
        side: non_zero(rng),
        castle_k: [non_zero(rng), non_zero(rng)],
        castle_q: [non_zero(rng), non_zero(rng)],
        ep_file: std::array::from_fn(|_| non_zero(rng)),
    }
}

#[inline]
pub fn piece_key(color: Color, kind: PieceKind, sq: Square) -> u64 {
    zobrist_keys().piece[color as usize][kind as usize - 1][sq.index()]
}

// ---------------------------------------------------------------------------------------------
// Tapered piece-square tables and stage weights
// ---------------------------------------------------------------------------------------------

pub static PSQ_EARLY: Lazy<[[i16; 64]; CODE_COUNT]> = Lazy::new(|| build_psq(Phase::Early));
pub static PSQ_END: Lazy<[[i16; 64]; CODE_COUNT]> = Lazy::new(|| build_psq(Phase::End));

enum Phase {
    Early,
    End,
}

/// White-perspective centrality bonus per file/rank (0 at the edge, 3 at the center files/ranks).
const CENTER: [i32; 8] = [0, 1, 2, 3, 3, 2, 1, 0];

/// Material value in centipawns per `PieceKind`, shared with the evaluator's capture
/// ordering. The king carries no material value.
pub const PIECE_BASE: [i32; 6] = [100, 320, 330, 500, 900, 0];

fn white_psq_value(kind: PieceKind, sq: Square, phase: &Phase) -> i32 {
    let file = sq.file() as usize;
    let rank = sq.rank() as usize;
    let center = CENTER[file] + CENTER[rank];
    match (kind, phase) {
        (PieceKind::Pawn, Phase::Early) => {
            let advance = rank as i32 * 4;
            advance + CENTER[file] * 2
        }
        (PieceKind::Pawn, Phase::End) => rank as i32 * 12,
        (PieceKind::Knight, _) | (PieceKind::Bishop, _) | (PieceKind::Queen, _) => center * 4,
        (PieceKind::Rook, Phase::Early) => CENTER[file] * 2 + if rank == 6 { 20 } else { 0 },
        (PieceKind::Rook, Phase::End) => CENTER[file] + if rank == 6 { 10 } else { 0 },
        (PieceKind::King, Phase::Early) => -(center * 6) + if rank == 0 { 20 } else { 0 },
        (PieceKind::King, Phase::End) => center * 8,
    }
}

fn build_psq(phase: Phase) -> [[i16; 64]; CODE_COUNT] {
    let mut table = [[0i16; 64]; CODE_COUNT];
    for &color in &[Color::White, Color::Black] {
        for kind in PieceKind::ALL {
            let code = make_code(color, kind) as usize;
            for i in 0..64u8 {
                let sq = Square::new(i);
                // Black looks up the rank-mirrored square on the white-perspective table.
                let lookup_sq = match color {
                    Color::White => sq,
                    Color::Black => Square::new(sq.0 ^ 56),
                };
                let base = PIECE_BASE[kind as usize - 1];
                let value = base + white_psq_value(kind, lookup_sq, &phase);
                table[code][i as usize] = value as i16;
            }
        }
    }
    table
}

pub static STAGE_W: Lazy<[i32; CODE_COUNT]> = Lazy::new(|| {
    let mut w = [0i32; CODE_COUNT];
    for &color in &[Color::White, Color::Black] {
        for (kind, weight) in [
            (PieceKind::Pawn, 0),
            (PieceKind::Knight, 6),
            (PieceKind::Bishop, 6),
            (PieceKind::Rook, 11),
            (PieceKind::Queen, 18),
            (PieceKind::King, 0),
        ] {
            w[make_code(color, kind) as usize] = weight;
        }
    }
    w
});

#[inline]
pub fn psq_early(code: u8, sq: Square) -> i32 {
    if is_empty(code) {
        0
    } else {
        PSQ_EARLY[code as usize][sq.index()] as i32
    }
}

#[inline]
pub fn psq_end(code: u8, sq: Square) -> i32 {
    if is_empty(code) {
        0
    } else {
        PSQ_END[code as usize][sq.index()] as i32
    }
}

#[inline]
pub fn stage_weight(code: u8) -> i32 {
    if is_empty(code) {
        0
    } else {
        STAGE_W[code as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_targets_count_matches_corners_and_center() {
        assert_eq!(KNIGHT_TARGETS[Square::new(0).index()].len(), 2); // a1
        assert_eq!(KNIGHT_TARGETS[Square::new(27).index()].len(), 8); // d4
    }

    #[test]
    fn ray_limit_edges_are_none() {
        let a1 = Square::new(0);
        assert!(RAY_LIMIT[a1.index()][DIR_B].is_none());
        assert!(RAY_LIMIT[a1.index()][DIR_L].is_none());
        assert!(RAY_LIMIT[a1.index()][DIR_F].is_some());
        assert!(RAY_LIMIT[a1.index()][DIR_BL].is_none());
    }

    #[test]
    fn ray_limit_diagonal_from_a1_reaches_h8() {
        let a1 = Square::new(0);
        assert_eq!(RAY_LIMIT[a1.index()][DIR_FR], Some(Square::new(63)));
    }

    #[test]
    fn zobrist_keys_are_pairwise_distinct_sample() {
        let k = zobrist_keys();
        assert_ne!(k.piece[0][0][0], k.piece[0][0][1]);
        assert_ne!(k.side, k.castle_k[0]);
    }

    #[test]
    fn stage_weights_sum_to_128_at_full_material() {
        let total: i32 = 16 * stage_weight(make_code(Color::White, PieceKind::Pawn))
            + 4 * stage_weight(make_code(Color::White, PieceKind::Knight))
            + 4 * stage_weight(make_code(Color::White, PieceKind::Bishop))
            + 4 * stage_weight(make_code(Color::White, PieceKind::Rook))
            + 2 * stage_weight(make_code(Color::White, PieceKind::Queen));
        assert_eq!(total, 128);
    }
}
