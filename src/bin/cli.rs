use std::io::{self, BufRead};
use std::str::FromStr;

use mailbox_chess::movegen::{self, Move};
use mailbox_chess::piece::PieceKind;
use mailbox_chess::position::Position;
use mailbox_chess::square::Square;
use mailbox_chess::Engine;

fn main() {
    let mut log_file = "logs/engine.log".to_string();
    let mut log_filter = "mailbox_chess=info".to_string();
    let mut think_ms = 1000u64;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log-file" => {
                if let Some(v) = args.next() {
                    log_file = v;
                }
            }
            "--log-filter" => {
                if let Some(v) = args.next() {
                    log_filter = v;
                }
            }
            "--think-ms" => {
                if let Some(v) = args.next() {
                    think_ms = v.parse().unwrap_or(think_ms);
                }
            }
            other => {
                eprintln!("info string ignoring unrecognized argument '{other}'");
            }
        }
    }

    mailbox_chess::logger::init_logging(&log_file, &log_filter);
    tracing::info!(think_ms, "engine starting");

    let mut engine = Engine::with_think_ms(think_ms);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "position" => handle_position(&parts, &mut engine),
            "go" => handle_go(&mut engine),
            "moves" => handle_moves(&engine),
            "fen" => println!("{}", engine.fen()),
            "perft" => handle_perft(&parts, &engine),
            "d" | "display" => println!("{}", engine.fen()),
            "quit" | "exit" => break,
            other => eprintln!("info string unknown command '{other}'"),
        }
    }
}

fn handle_position(parts: &[&str], engine: &mut Engine) {
    if parts.len() < 2 {
        return;
    }
    let moves_idx = parts.iter().position(|&p| p == "moves");
    match parts[1] {
        "startpos" => engine.load_starting_position(),
        "fen" => {
            let fen_end = moves_idx.unwrap_or(parts.len());
            let fen = parts[2..fen_end].join(" ");
            if let Err(err) = engine.load_fen(&fen) {
                eprintln!("info string {err}");
                return;
            }
        }
        _ => return,
    }
    if let Some(idx) = moves_idx {
        for uci in &parts[idx + 1..] {
            match parse_uci_move(engine, uci) {
                Some(mv) => {
                    if let Err(err) = engine.input_move(mv) {
                        eprintln!("info string {err}");
                        return;
                    }
                }
                None => {
                    eprintln!("info string could not parse move '{uci}'");
                    return;
                }
            }
        }
    }
}

fn parse_uci_move(engine: &Engine, uci: &str) -> Option<Move> {
    if uci.len() < 4 {
        return None;
    }
    let from = Square::from_str(&uci[0..2]).ok()?;
    let to = Square::from_str(&uci[2..4]).ok()?;
    let promotion = uci.chars().nth(4).and_then(|c| match c {
        'q' => Some(PieceKind::Queen),
        'r' => Some(PieceKind::Rook),
        'b' => Some(PieceKind::Bishop),
        'n' => Some(PieceKind::Knight),
        _ => None,
    });
    engine
        .legal_moves()
        .into_iter()
        .find(|m| m.from == from && m.to == to && m.promotion_kind() == promotion)
}

fn handle_go(engine: &mut Engine) {
    match engine.best_move() {
        Some(mv) => println!("bestmove {mv}"),
        None => println!("bestmove 0000"),
    }
}

fn handle_moves(engine: &Engine) {
    for mv in engine.legal_moves() {
        println!("{mv}");
    }
}

fn handle_perft(parts: &[&str], engine: &Engine) {
    let Some(depth) = parts.get(1).and_then(|s| s.parse::<u32>().ok()) else {
        eprintln!("info string usage: perft <depth>");
        return;
    };
    let mut pos = Position::from_fen(&engine.fen()).expect("engine always holds a valid position");
    let nodes = perft(&mut pos, depth);
    println!("perft {depth}: {nodes} nodes");
}

/// Node-count walk used to validate move generation against known perft tables. Not part
/// of the engine's external contract, kept here as a development aid.
fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = movegen::MoveList::new();
    movegen::generate(pos, &mut moves, false);
    let mut nodes = 0;
    for mv in moves {
        if pos.make(mv) {
            nodes += perft(pos, depth - 1);
            pos.unmake();
        }
    }
    nodes
}
