use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::token::TokenType;

/// Fatal scanner failure. The lexer yields no tokens after reporting one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {start}")]
    UnterminatedString { start: usize },
}

/// A parser diagnostic. `Display` renders the message reported to users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {got} instead")]
    UnexpectedToken { expected: TokenType, got: TokenType },

    #[error("no prefix parse function for {0}")]
    NoPrefixParseFn(TokenType),

    #[error("could not parse {0} as integer")]
    InvalidInteger(String),

    #[error("expression nested too deeply")]
    NestingTooDeep,

    #[error(transparent)]
    Lex(#[from] LexError),
}

/// Host-level failures of the front ends (file runner and REPL).
#[derive(Error, Debug)]
pub enum MonkeyError {
    #[error("failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages() {
        let tests = vec![
            (
                ParseError::UnexpectedToken { expected: TokenType::RParen, got: TokenType::Eof },
                "expected next token to be rightParenthesis, got eof instead",
            ),
            (ParseError::NoPrefixParseFn(TokenType::Plus), "no prefix parse function for plus"),
            (
                ParseError::InvalidInteger("99999999999999999999".to_string()),
                "could not parse 99999999999999999999 as integer",
            ),
            (ParseError::NestingTooDeep, "expression nested too deeply"),
            (
                ParseError::from(LexError::UnterminatedString { start: 4 }),
                "unterminated string literal starting at byte 4",
            ),
        ];

        for (err, expected) in tests {
            assert_eq!(err.to_string(), expected);
        }
    }
}
