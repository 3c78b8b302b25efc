//! FEN parsing and formatting (§6 external interface).

use crate::error::EngineError;
use crate::piece::{char_to_code, glyph_for_code, is_empty};
use crate::square::Square;

use super::{CASTLE_KINGSIDE, CASTLE_QUEENSIDE, Position};

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn parse(fen: &str) -> Result<Position, EngineError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 || fields.len() > 6 {
        return Err(EngineError::invalid_fen(format!(
            "expected 4 to 6 space-separated fields, found {}",
            fields.len()
        )));
    }

    let mut board = [0u8; 64];
    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(EngineError::invalid_fen("board must have 8 ranks"));
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as u8;
        let mut file = 0u8;
        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip as u8;
            } else {
                let code = char_to_code(ch)
                    .ok_or_else(|| EngineError::invalid_fen(format!("bad piece char '{ch}'")))?;
                if file >= 8 {
                    return Err(EngineError::invalid_fen("rank overflows 8 files"));
                }
                board[Square::from_file_rank(file, rank).index()] = code;
                file += 1;
            }
        }
        if file != 8 {
            return Err(EngineError::invalid_fen("rank does not sum to 8 files"));
        }
    }

    let side_char = fields[1]
        .chars()
        .next()
        .ok_or_else(|| EngineError::invalid_fen("empty side-to-move field"))?;
    let side_to_move_is_black = match side_char {
        'w' => false,
        'b' => true,
        _ => return Err(EngineError::invalid_fen("side to move must be 'w' or 'b'")),
    };

    let mut castle_lost_at = [[Some(0u32); 2]; 2];
    if fields[2] != "-" {
        for ch in fields[2].chars() {
            match ch {
                'K' => castle_lost_at[0][CASTLE_KINGSIDE] = None,
                'Q' => castle_lost_at[0][CASTLE_QUEENSIDE] = None,
                'k' => castle_lost_at[1][CASTLE_KINGSIDE] = None,
                'q' => castle_lost_at[1][CASTLE_QUEENSIDE] = None,
                _ => {
                    return Err(EngineError::invalid_fen(format!(
                        "bad castling char '{ch}'"
                    )));
                }
            }
        }
    }

    // Rights that survived parsing but have no matching king/rook on their home squares
    // are geometrically impossible and silently dropped, per §4.B.
    let king_code = |color: crate::piece::Color| crate::piece::make_code(color, crate::piece::PieceKind::King);
    let rook_code = |color: crate::piece::Color| crate::piece::make_code(color, crate::piece::PieceKind::Rook);
    for (color_idx, color, king_home, rooks) in [
        (
            0usize,
            crate::piece::Color::White,
            4u8,
            [(CASTLE_KINGSIDE, 7u8), (CASTLE_QUEENSIDE, 0u8)],
        ),
        (
            1usize,
            crate::piece::Color::Black,
            60u8,
            [(CASTLE_KINGSIDE, 63u8), (CASTLE_QUEENSIDE, 56u8)],
        ),
    ] {
        let king_in_place = board[king_home as usize] == king_code(color);
        for (right, rook_home) in rooks {
            if castle_lost_at[color_idx][right].is_none()
                && !(king_in_place && board[rook_home as usize] == rook_code(color))
            {
                castle_lost_at[color_idx][right] = Some(0);
            }
        }
    }

    let ep_square = if fields[3] == "-" {
        None
    } else {
        Some(
            fields[3]
                .parse::<Square>()
                .map_err(|_| EngineError::invalid_fen("bad en passant square"))?,
        )
    };

    // Half-move clock and fullmove number default to 0 and 1 when the FEN omits them.
    let hmcr: u32 = match fields.get(4) {
        Some(s) => s
            .parse()
            .map_err(|_| EngineError::invalid_fen("bad half-move clock"))?,
        None => 0,
    };
    let fullmove: u32 = match fields.get(5) {
        Some(s) => s
            .parse()
            .map_err(|_| EngineError::invalid_fen("bad fullmove number"))?,
        None => 1,
    };
    if fullmove == 0 {
        return Err(EngineError::invalid_fen("fullmove number must be >= 1"));
    }
    let ply = (fullmove - 1) * 2 + if side_to_move_is_black { 1 } else { 0 };

    let mut pos = Position {
        board,
        king_square: [Square::new(4), Square::new(60)],
        piece_count: [0; crate::piece::CODE_COUNT],
        side_total: [0; 2],
        zobrist: 0,
        castle_lost_at,
        ply,
        ep_square,
        hmcr,
        hist: Vec::new(),
        ms_weight: 0,
        eval_early: 0,
        eval_end: 0,
        undo_stack: Vec::new(),
    };
    pos.refresh_derived();

    for color in [crate::piece::Color::White, crate::piece::Color::Black] {
        let king_code = crate::piece::make_code(color, crate::piece::PieceKind::King);
        if pos.piece_count[king_code as usize] != 1 {
            return Err(EngineError::invalid_fen(format!(
                "position must have exactly one king per side, found {} for {color:?}",
                pos.piece_count[king_code as usize]
            )));
        }
    }

    Ok(pos)
}

pub fn format(pos: &Position) -> String {
    let mut out = String::new();
    for rank_from_top in 0..8u8 {
        let rank = 7 - rank_from_top;
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let code = pos.board[Square::from_file_rank(file, rank).index()];
            if is_empty(code) {
                empty_run += 1;
            } else {
                if empty_run > 0 {
                    out.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                out.push(glyph_for_code(code));
            }
        }
        if empty_run > 0 {
            out.push_str(&empty_run.to_string());
        }
        if rank_from_top != 7 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(if pos.side_to_move_color() == crate::piece::Color::Black {
        'b'
    } else {
        'w'
    });

    out.push(' ');
    let mut rights = String::new();
    if pos.castle_lost_at[0][CASTLE_KINGSIDE].is_none() {
        rights.push('K');
    }
    if pos.castle_lost_at[0][CASTLE_QUEENSIDE].is_none() {
        rights.push('Q');
    }
    if pos.castle_lost_at[1][CASTLE_KINGSIDE].is_none() {
        rights.push('k');
    }
    if pos.castle_lost_at[1][CASTLE_QUEENSIDE].is_none() {
        rights.push('q');
    }
    out.push_str(if rights.is_empty() { "-" } else { &rights });

    out.push(' ');
    match pos.ep_square {
        Some(sq) => out.push_str(&sq.to_string()),
        None => out.push('-'),
    }

    out.push_str(&format!(" {} {}", pos.hmcr, pos.fullmove_number()));
    out
}
