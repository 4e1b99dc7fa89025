//! Errors surfaced by the UCI front-end.

/// Failures while handling UCI input.
///
/// Per UCI convention none of these are fatal: the loop logs the error and
/// keeps reading. Only [`Io`](UciError::Io) ends the session.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// `position` must start with `startpos` or `fen`.
    #[error("position command expects startpos or fen")]
    UnknownPositionKind,

    /// The FEN text was rejected by the board parser.
    #[error("unparseable FEN {fen:?}")]
    BadFen {
        /// The offending FEN string.
        fen: String,
    },

    /// A move token matched no legal move of the position it applies to.
    ///
    /// Covers both malformed tokens and well-formed but illegal moves; the
    /// matcher cannot tell them apart and the response is the same.
    #[error("{uci_move:?} is not a legal move here")]
    IllegalMove {
        /// The offending move token.
        uci_move: String,
    },

    /// A `go` parameter needs a numeric argument it did not get.
    #[error("go {param} expects a number, got {value:?}")]
    BadGoValue {
        /// The parameter name (e.g., "wtime", "depth").
        param: &'static str,
        /// The token that followed it, if any.
        value: Option<String>,
    },

    /// Reading stdin failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
