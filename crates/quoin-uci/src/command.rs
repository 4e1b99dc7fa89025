//! UCI command parsing.

use chess::{Board, ChessMove, MoveGen};

use quoin_engine::{GoParams, Position};

use crate::error::UciError;

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a position with optional moves applied.
    Position(Position),
    /// `go` -- start searching with given parameters.
    Go(GoParams),
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
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Match a UCI move string against the legal moves of a board.
///
/// Also the validation step: anything that does not correspond to a legal
/// move is rejected.
fn parse_move(board: &Board, uci: &str) -> Option<ChessMove> {
    MoveGen::new_legal(board).find(|mv| mv.to_string() == uci)
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.is_empty() {
        return Err(UciError::UnknownPositionKind);
    }

    let (mut position, rest) = if tokens[0] == "startpos" {
        (Position::startpos(), &tokens[1..])
    } else if tokens[0] == "fen" {
        // FEN is 6 space-separated fields
        if tokens.len() < 7 {
            return Err(UciError::BadFen {
                fen: tokens[1..].join(" "),
            });
        }
        let fen = tokens[1..7].join(" ");
        let position =
            Position::from_fen(&fen).map_err(|_| UciError::BadFen { fen: fen.clone() })?;
        (position, &tokens[7..])
    } else {
        return Err(UciError::UnknownPositionKind);
    };

    // Apply moves if present: "moves e2e4 d7d5 ..."
    if !rest.is_empty() && rest[0] == "moves" {
        for uci_str in &rest[1..] {
            let mv = parse_move(position.board(), uci_str).ok_or_else(|| {
                UciError::IllegalMove {
                    uci_move: uci_str.to_string(),
                }
            })?;
            position.play(mv);
        }
    }

    Ok(Command::Position(position))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, depth, movetime,
/// infinite. Unknown tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.time[0] = parse_int(tokens.get(i + 1), "wtime")?;
                i += 2;
            }
            "btime" => {
                params.time[1] = parse_int(tokens.get(i + 1), "btime")?;
                i += 2;
            }
            "winc" => {
                params.inc[0] = parse_int(tokens.get(i + 1), "winc")?;
                i += 2;
            }
            "binc" => {
                params.inc[1] = parse_int(tokens.get(i + 1), "binc")?;
                i += 2;
            }
            "movestogo" => {
                params.movestogo = parse_int(tokens.get(i + 1), "movestogo")?;
                i += 2;
            }
            "movetime" => {
                params.movetime = parse_int(tokens.get(i + 1), "movetime")?;
                i += 2;
            }
            "depth" => {
                params.depth = parse_int(tokens.get(i + 1), "depth")?;
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            _ => {
                // Unknown token -- skip per UCI convention
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

/// Parse a numeric `go` argument from the token following its keyword.
fn parse_int<T: std::str::FromStr>(
    token: Option<&&str>,
    param: &'static str,
) -> Result<T, UciError> {
    let value = token.ok_or(UciError::BadGoValue { param, value: None })?;
    value.parse().map_err(|_| UciError::BadGoValue {
        param,
        value: Some(value.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use chess::Color;

    use super::*;

    #[test]
    fn parse_uci() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
    }

    #[test]
    fn parse_isready() {
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
    }

    #[test]
    fn parse_quit() {
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn parse_stop() {
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
    }

    #[test]
    fn parse_ucinewgame() {
        assert!(matches!(
            parse_command("ucinewgame").unwrap(),
            Command::UciNewGame
        ));
    }

    #[test]
    fn parse_position_startpos() {
        let cmd = parse_command("position startpos").unwrap();
        match cmd {
            Command::Position(position) => {
                assert_eq!(position.game_ply(), 0);
                assert_eq!(position.side_to_move(), Color::White);
            }
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let cmd = parse_command("position startpos moves e2e4 e7e5").unwrap();
        match cmd {
            Command::Position(position) => {
                assert_eq!(position.game_ply(), 2);
                assert_eq!(position.side_to_move(), Color::White);
            }
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parse_position_fen() {
        let cmd = parse_command(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        match cmd {
            Command::Position(position) => {
                assert_eq!(position.side_to_move(), Color::Black);
            }
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let cmd = parse_command(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1 moves e7e5",
        )
        .unwrap();
        match cmd {
            Command::Position(position) => {
                assert_eq!(position.side_to_move(), Color::White);
            }
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parse_position_promotion_move() {
        let cmd =
            parse_command("position fen 7k/4P3/8/8/8/8/8/4K3 w - - 0 1 moves e7e8q").unwrap();
        assert!(matches!(cmd, Command::Position(_)));
    }

    #[test]
    fn parse_position_missing_keyword() {
        assert!(parse_command("position").is_err());
    }

    #[test]
    fn parse_position_invalid_fen() {
        assert!(parse_command("position fen invalid").is_err());
    }

    #[test]
    fn parse_position_illegal_move_rejected() {
        assert!(parse_command("position startpos moves e2e5").is_err());
    }

    #[test]
    fn parse_go_depth() {
        let cmd = parse_command("go depth 6").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.depth, 6),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_bare_defaults() {
        let cmd = parse_command("go").unwrap();
        match cmd {
            Command::Go(params) => {
                assert_eq!(params.time, [0, 0]);
                assert_eq!(params.movetime, 0);
                assert_eq!(params.movestogo, 0);
            }
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_clock_parameters() {
        let cmd = parse_command("go wtime 300000 btime 240000 winc 2000 binc 3000").unwrap();
        match cmd {
            Command::Go(params) => {
                assert_eq!(params.time, [300_000, 240_000]);
                assert_eq!(params.inc, [2_000, 3_000]);
            }
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_movetime() {
        let cmd = parse_command("go movetime 5000").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.movetime, 5000),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_movestogo() {
        let cmd = parse_command("go wtime 60000 btime 60000 movestogo 20").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.movestogo, 20),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_infinite_sets_the_flag() {
        let cmd = parse_command("go infinite").unwrap();
        match cmd {
            Command::Go(params) => assert!(params.infinite),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_infinite_keeps_clock_tokens() {
        // A GUI may send the clock along with infinite; the flag must win.
        let cmd = parse_command("go infinite wtime 300000 btime 300000").unwrap();
        match cmd {
            Command::Go(params) => {
                assert!(params.infinite);
                assert_eq!(params.time, [300_000, 300_000]);
            }
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_missing_wtime_value() {
        assert!(parse_command("go wtime").is_err());
    }

    #[test]
    fn parse_go_invalid_depth_value() {
        assert!(parse_command("go depth abc").is_err());
    }

    #[test]
    fn parse_go_skips_unknown_tokens() {
        let cmd = parse_command("go ponder depth 3").unwrap();
        match cmd {
            Command::Go(params) => assert_eq!(params.depth, 3),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_unknown_command() {
        assert!(matches!(
            parse_command("foobar").unwrap(),
            Command::Unknown(_)
        ));
    }

    #[test]
    fn parse_empty_line() {
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }
}
