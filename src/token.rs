use std::fmt;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Hash, Copy, Eq, Default)]
pub enum TokenType {
    #[default]
    Illegal,
    Eof,

    // Identifiers and literals carry their lexeme
    Ident,
    Int,
    String,

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq, // ==
    NotEq, // !=

    // Delimiters
    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

lazy_static! {
    static ref KEYWORDS: FxHashMap<&'static str, TokenType> = {
        let mut m = FxHashMap::default();
        m.insert("fn", TokenType::Function);
        m.insert("let", TokenType::Let);
        m.insert("true", TokenType::True);
        m.insert("false", TokenType::False);
        m.insert("if", TokenType::If);
        m.insert("else", TokenType::Else);
        m.insert("return", TokenType::Return);
        m
    };
}

impl TokenType {
    pub fn lookup_ident(ident: &str) -> Self {
        KEYWORDS.get(ident).copied().unwrap_or(TokenType::Ident)
    }

    /// Name used when a token kind shows up in a parser diagnostic.
    pub fn name(self) -> &'static str {
        match self {
            TokenType::Illegal => "illegal",
            TokenType::Eof => "eof",
            TokenType::Ident => "identifier",
            TokenType::Int => "integer",
            TokenType::String => "string",
            TokenType::Assign => "assign",
            TokenType::Plus => "plus",
            TokenType::Minus => "minus",
            TokenType::Bang => "bang",
            TokenType::Asterisk => "asterisk",
            TokenType::Slash => "slash",
            TokenType::Lt => "lessThan",
            TokenType::Gt => "greaterThan",
            TokenType::Eq => "equals",
            TokenType::NotEq => "notEquals",
            TokenType::Comma => "comma",
            TokenType::Semicolon => "semicolon",
            TokenType::Colon => "colon",
            TokenType::LParen => "leftParenthesis",
            TokenType::RParen => "rightParenthesis",
            TokenType::LBrace => "leftBrace",
            TokenType::RBrace => "rightBrace",
            TokenType::LBracket => "leftBracket",
            TokenType::RBracket => "rightBracket",
            TokenType::Function => "function",
            TokenType::Let => "let",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::Return => "return",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
}

impl Token {
    pub fn new(token_type: TokenType, literal: impl Into<String>) -> Self {
        Token {
            token_type,
            literal: literal.into(),
        }
    }

    /// Builds the token for a run of identifier characters: a keyword when the
    /// text is reserved, an identifier otherwise.
    pub fn classify(text: &str) -> Self {
        Token::new(TokenType::lookup_ident(text), text)
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        let tests = vec![
            ("fn", TokenType::Function),
            ("let", TokenType::Let),
            ("true", TokenType::True),
            ("false", TokenType::False),
            ("if", TokenType::If),
            ("else", TokenType::Else),
            ("return", TokenType::Return),
        ];

        for (text, expected) in tests {
            let tok = Token::classify(text);
            assert_eq!(tok.token_type, expected, "wrong kind for {:?}", text);
            assert_eq!(tok.literal, text);
        }
    }

    #[test]
    fn test_classify_identifiers() {
        for text in ["foobar", "x", "fnord", "lets", "True", "add_two"] {
            let tok = Token::classify(text);
            assert_eq!(tok.token_type, TokenType::Ident, "{:?} should be an identifier", text);
            assert_eq!(tok.literal, text);
        }
    }

    #[test]
    fn test_token_type_names() {
        assert_eq!(TokenType::RParen.to_string(), "rightParenthesis");
        assert_eq!(TokenType::Ident.to_string(), "identifier");
        assert_eq!(TokenType::NotEq.to_string(), "notEquals");
        assert_eq!(TokenType::default(), TokenType::Illegal);
    }
}
