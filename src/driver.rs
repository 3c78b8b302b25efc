//! Module G: the driver. `Engine` owns a position, a transposition table, and a thinking
//! budget, and is the only thing external callers touch (§6).

use crate::error::EngineError;
use crate::movegen::{self, Move};
use crate::piece::Color;
use crate::position::Position;
use crate::search;
use crate::tt::TranspositionTable;

const DEFAULT_THINK_MS: u64 = 1000;

pub struct Engine {
    pos: Position,
    tt: TranspositionTable,
    think_ms: u64,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            pos: Position::startpos(),
            tt: TranspositionTable::new(),
            think_ms: DEFAULT_THINK_MS,
        }
    }

    pub fn with_think_ms(think_ms: u64) -> Self {
        Engine {
            think_ms,
            ..Self::new()
        }
    }

    pub fn set_think_ms(&mut self, think_ms: u64) {
        self.think_ms = think_ms;
    }

    pub fn load_starting_position(&mut self) {
        self.pos = Position::startpos();
        self.tt.clear();
    }

    pub fn load_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        self.pos = Position::from_fen(fen)?;
        self.tt.clear();
        Ok(())
    }

    pub fn fen(&self) -> String {
        self.pos.fen()
    }

    pub fn side_to_move(&self) -> Color {
        self.pos.side_to_move_color()
    }

    pub fn in_check(&self) -> bool {
        self.pos.in_check()
    }

    /// The fully legal move set: pseudo-legal generation filtered by trial `make`/`unmake`
    /// on a scratch copy, per §8's generator laws.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut candidates = movegen::MoveList::new();
        movegen::generate(&self.pos, &mut candidates, false);
        let mut scratch = self.pos.clone();
        candidates
            .into_iter()
            .filter(|mv| {
                if scratch.make(*mv) {
                    scratch.unmake();
                    true
                } else {
                    false
                }
            })
            .collect()
    }

    /// `Some(0)` on a draw, `Some(+1)`/`Some(-1)` on checkmate (from White's perspective:
    /// `+1` means White won), `None` while the game is still in progress.
    pub fn game_over(&self) -> Option<i32> {
        if self.pos.is_draw() {
            return Some(0);
        }
        if self.legal_moves().is_empty() {
            if self.pos.in_check() {
                return Some(-self.pos.side_to_move_color().sign());
            }
            return Some(0);
        }
        None
    }

    pub fn input_move(&mut self, attempted: Move) -> Result<(), EngineError> {
        let legal = self.legal_moves();
        let matched = legal.into_iter().find(|m| {
            m.from == attempted.from
                && m.to == attempted.to
                && m.promotion_kind() == attempted.promotion_kind()
        });
        match matched {
            Some(mv) => {
                self.pos.make(mv);
                Ok(())
            }
            None => Err(EngineError::IllegalMove { attempted }),
        }
    }

    /// Runs the configured thinking budget and returns the principal variation's first
    /// move, or `None` if the game is already over.
    pub fn best_move(&mut self) -> Option<Move> {
        if self.game_over().is_some() {
            return None;
        }
        let result = search::search_best_move(&mut self.pos, &mut self.tt, self.think_ms);
        result.best_move
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let engine = Engine::new();
        assert_eq!(engine.legal_moves().len(), 20);
        assert!(engine.game_over().is_none());
    }

    #[test]
    fn rejects_a_move_outside_the_legal_set() {
        let mut engine = Engine::new();
        let illegal = Move {
            from: crate::square::Square::new(12),
            to: crate::square::Square::new(44),
            moving: crate::piece::make_code(Color::White, crate::piece::PieceKind::Pawn),
            captured: 0,
            flags: 0,
            score: 0,
        };
        assert!(engine.input_move(illegal).is_err());
    }

    #[test]
    fn fool_s_mate_ends_the_game() {
        let mut engine = Engine::new();
        engine
            .load_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert!(engine.in_check());
        assert_eq!(engine.game_over(), Some(-1));
        assert!(engine.best_move().is_none());
    }
}
