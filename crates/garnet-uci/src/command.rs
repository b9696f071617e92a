//! UCI command parsing.

use std::time::Duration;

use garnet_core::{Board, Move};

use crate::error::UciError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` searches without limits.
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves until the next time control.
    pub movestogo: Option<u32>,
    /// Search to this depth only.
    pub depth: Option<i32>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Search this many nodes only.
    pub nodes: Option<u64>,
    /// Search until `stop` (no time limit).
    pub infinite: bool,
}

/// A position established by the `position` command.
#[derive(Debug, Clone)]
pub struct PositionInput {
    /// The resulting board after all moves are applied.
    pub board: Board,
    /// Zobrist hashes of every position before `board`, oldest first.
    /// The search needs these for repetition detection across the
    /// game/search boundary.
    pub history: Vec<u64>,
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a board with optional moves applied.
    Position(PositionInput),
    /// `go` -- start searching with the given parameters.
    Go(GoParams),
    /// `setoption name <name> value <value>` -- engine configuration.
    SetOption {
        /// Option name (e.g. "Hash").
        name: String,
        /// Option value as written.
        value: String,
    },
    /// `perft <depth>` -- move-generation node count for the current position.
    Perft(usize),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (silently ignored per UCI convention).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        "perft" => {
            let depth = parse_int(tokens.get(1), "perft")?;
            Ok(Command::Perft(depth))
        }
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.is_empty() {
        return Err(UciError::MalformedPosition);
    }

    let (mut board, rest) = if tokens[0] == "startpos" {
        (Board::starting_position(), &tokens[1..])
    } else if tokens[0] == "fen" {
        // FEN is 6 space-separated fields.
        if tokens.len() < 7 {
            return Err(UciError::InvalidFen {
                fen: tokens[1..].join(" "),
            });
        }
        let fen = tokens[1..7].join(" ");
        let board: Board = fen.parse().map_err(|_| UciError::InvalidFen { fen: fen.clone() })?;
        (board, &tokens[7..])
    } else {
        return Err(UciError::MalformedPosition);
    };

    // Apply moves if present, recording each intermediate hash so the
    // search can detect repetitions reaching back into the game.
    let mut history = Vec::new();
    if !rest.is_empty() && rest[0] == "moves" {
        for uci_str in &rest[1..] {
            let mv = Move::from_uci(uci_str, &board).ok_or_else(|| UciError::InvalidMove {
                uci_move: uci_str.to_string(),
            })?;
            history.push(board.hash());
            board = board.make_move(mv);
        }
    }

    Ok(Command::Position(PositionInput { board, history }))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, depth, movetime,
/// nodes, infinite. Unknown tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.wtime = Some(parse_millis(tokens.get(i + 1), "wtime")?);
                i += 2;
            }
            "btime" => {
                params.btime = Some(parse_millis(tokens.get(i + 1), "btime")?);
                i += 2;
            }
            "winc" => {
                params.winc = Some(parse_millis(tokens.get(i + 1), "winc")?);
                i += 2;
            }
            "binc" => {
                params.binc = Some(parse_millis(tokens.get(i + 1), "binc")?);
                i += 2;
            }
            "movestogo" => {
                params.movestogo = Some(parse_int(tokens.get(i + 1), "movestogo")?);
                i += 2;
            }
            "depth" => {
                params.depth = Some(parse_int(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "movetime" => {
                params.movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            "nodes" => {
                params.nodes = Some(parse_int(tokens.get(i + 1), "nodes")?);
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            _ => {
                // Unknown token -- skip per UCI convention.
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

/// Parse `setoption name <name...> value <value...>`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.first() != Some(&"name") {
        return Err(UciError::MalformedSetOption);
    }

    let value_pos = tokens.iter().position(|&t| t == "value");
    let (name_tokens, value_tokens) = match value_pos {
        Some(pos) => (&tokens[1..pos], &tokens[pos + 1..]),
        None => (&tokens[1..], &[][..]),
    };

    if name_tokens.is_empty() {
        return Err(UciError::MalformedSetOption);
    }

    Ok(Command::SetOption {
        name: name_tokens.join(" "),
        value: value_tokens.join(" "),
    })
}

/// Parse a millisecond value from a token.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    let ms: u64 = value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })?;
    Ok(Duration::from_millis(ms))
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
