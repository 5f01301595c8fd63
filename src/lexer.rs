use crate::error::LexError;
use crate::token::{Token, TokenType};

/// Single-pass scanner over a source string.
///
/// Iterating yields tokens up to and including one `Eof` token, after which the
/// sequence is exhausted. Re-scanning needs a fresh `Lexer`.
pub struct Lexer<'a> {
    input: &'a str,
    // byte offset of `ch`
    position: usize,
    // byte offset just past `ch`
    read_position: usize,
    // current char under examination, `None` at end of input
    ch: Option<char>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        let mut l = Lexer {
            input,
            position: 0,
            read_position: 0,
            ch: None,
            finished: false,
        };
        l.read_char();
        l
    }

    fn read_char(&mut self) {
        self.position = self.read_position;
        self.ch = self.input[self.read_position..].chars().next();
        if let Some(ch) = self.ch {
            self.read_position += ch.len_utf8();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.read_position..].chars().next()
    }

    fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        while self.ch.is_some_and(is_letter) {
            self.read_char();
        }
        &self.input[start..self.position]
    }

    fn read_number(&mut self) -> &'a str {
        let start = self.position;
        while self.ch.is_some_and(|c| c.is_ascii_digit()) {
            self.read_char();
        }
        &self.input[start..self.position]
    }

    /// Reads the body of a string literal. Leaves the cursor on the closing quote.
    fn read_string(&mut self) -> Result<&'a str, LexError> {
        let quote = self.position;
        loop {
            self.read_char();
            match self.ch {
                Some('"') => break,
                Some(_) => {}
                None => return Err(LexError::UnterminatedString { start: quote }),
            }
        }
        Ok(&self.input[quote + 1..self.position])
    }

    /// Scans the next token. Keeps returning `Eof` once the input is consumed.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.ch else {
            return Ok(Token::new(TokenType::Eof, ""));
        };

        let tok = match ch {
            '=' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenType::Eq, "==")
                } else {
                    Token::new(TokenType::Assign, "=")
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenType::NotEq, "!=")
                } else {
                    Token::new(TokenType::Bang, "!")
                }
            }
            ';' => Token::new(TokenType::Semicolon, ";"),
            ':' => Token::new(TokenType::Colon, ":"),
            ',' => Token::new(TokenType::Comma, ","),
            '(' => Token::new(TokenType::LParen, "("),
            ')' => Token::new(TokenType::RParen, ")"),
            '{' => Token::new(TokenType::LBrace, "{"),
            '}' => Token::new(TokenType::RBrace, "}"),
            '[' => Token::new(TokenType::LBracket, "["),
            ']' => Token::new(TokenType::RBracket, "]"),
            '+' => Token::new(TokenType::Plus, "+"),
            '-' => Token::new(TokenType::Minus, "-"),
            '/' => Token::new(TokenType::Slash, "/"),
            '*' => Token::new(TokenType::Asterisk, "*"),
            '<' => Token::new(TokenType::Lt, "<"),
            '>' => Token::new(TokenType::Gt, ">"),
            '"' => Token::new(TokenType::String, self.read_string()?),
            c if is_letter(c) => {
                // read_identifier already moved past the run
                return Ok(Token::classify(self.read_identifier()));
            }
            c if c.is_ascii_digit() => {
                return Ok(Token::new(TokenType::Int, self.read_number()));
            }
            c => Token::new(TokenType::Illegal, c.to_string()),
        };

        self.read_char();
        Ok(tok)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(' ' | '\t' | '\n' | '\r')) {
            self.read_char();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let tok = self.next_token();
        match &tok {
            Ok(t) if t.is(TokenType::Eof) => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(tok)
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_tokens(input: &str, expected: &[(TokenType, &str)]) {
        let mut lexer = Lexer::new(input);
        for (i, (expected_type, expected_literal)) in expected.iter().enumerate() {
            let tok = lexer.next_token().unwrap();

            assert_eq!(tok.token_type, *expected_type, "Test[{}] - TokenType wrong. Expected {:?}, got {:?}", i, expected_type, tok.token_type);
            assert_eq!(tok.literal, *expected_literal, "Test[{}] - Literal wrong. Expected {:?}, got {:?}", i, expected_literal, tok.literal);
        }
    }

    #[test]
    fn test_next_token() {
        let input = "=+(){},;";
        assert_tokens(input, &[
            (TokenType::Assign, "="),
            (TokenType::Plus, "+"),
            (TokenType::LParen, "("),
            (TokenType::RParen, ")"),
            (TokenType::LBrace, "{"),
            (TokenType::RBrace, "}"),
            (TokenType::Comma, ","),
            (TokenType::Semicolon, ";"),
            (TokenType::Eof, ""),
        ]);
    }

    #[test]
    fn test_next_token_full_program() {
        let input = r#"let five = 5;
        let ten = 10;
        let add = fn(x, y) {
            x + y;
        };
        let result = add(five, ten);
        !-/*5;
        5 < 10 > 5;
        if (5 < 10) {
    return true;
} else {
    return false;
}
        10 == 10;
        10 != 9;
        "foobar"
        "foo bar"
        [1, 2];
        {"foo": "bar"}
        "#;

        assert_tokens(input, &[
            (TokenType::Let, "let"),
            (TokenType::Ident, "five"),
            (TokenType::Assign, "="),
            (TokenType::Int, "5"),
            (TokenType::Semicolon, ";"),
            (TokenType::Let, "let"),
            (TokenType::Ident, "ten"),
            (TokenType::Assign, "="),
            (TokenType::Int, "10"),
            (TokenType::Semicolon, ";"),
            (TokenType::Let, "let"),
            (TokenType::Ident, "add"),
            (TokenType::Assign, "="),
            (TokenType::Function, "fn"),
            (TokenType::LParen, "("),
            (TokenType::Ident, "x"),
            (TokenType::Comma, ","),
            (TokenType::Ident, "y"),
            (TokenType::RParen, ")"),
            (TokenType::LBrace, "{"),
            (TokenType::Ident, "x"),
            (TokenType::Plus, "+"),
            (TokenType::Ident, "y"),
            (TokenType::Semicolon, ";"),
            (TokenType::RBrace, "}"),
            (TokenType::Semicolon, ";"),
            (TokenType::Let, "let"),
            (TokenType::Ident, "result"),
            (TokenType::Assign, "="),
            (TokenType::Ident, "add"),
            (TokenType::LParen, "("),
            (TokenType::Ident, "five"),
            (TokenType::Comma, ","),
            (TokenType::Ident, "ten"),
            (TokenType::RParen, ")"),
            (TokenType::Semicolon, ";"),
            (TokenType::Bang, "!"),
            (TokenType::Minus, "-"),
            (TokenType::Slash, "/"),
            (TokenType::Asterisk, "*"),
            (TokenType::Int, "5"),
            (TokenType::Semicolon, ";"),
            (TokenType::Int, "5"),
            (TokenType::Lt, "<"),
            (TokenType::Int, "10"),
            (TokenType::Gt, ">"),
            (TokenType::Int, "5"),
            (TokenType::Semicolon, ";"),
            (TokenType::If, "if"),
            (TokenType::LParen, "("),
            (TokenType::Int, "5"),
            (TokenType::Lt, "<"),
            (TokenType::Int, "10"),
            (TokenType::RParen, ")"),
            (TokenType::LBrace, "{"),
            (TokenType::Return, "return"),
            (TokenType::True, "true"),
            (TokenType::Semicolon, ";"),
            (TokenType::RBrace, "}"),
            (TokenType::Else, "else"),
            (TokenType::LBrace, "{"),
            (TokenType::Return, "return"),
            (TokenType::False, "false"),
            (TokenType::Semicolon, ";"),
            (TokenType::RBrace, "}"),
            (TokenType::Int, "10"),
            (TokenType::Eq, "=="),
            (TokenType::Int, "10"),
            (TokenType::Semicolon, ";"),
            (TokenType::Int, "10"),
            (TokenType::NotEq, "!="),
            (TokenType::Int, "9"),
            (TokenType::Semicolon, ";"),
            (TokenType::String, "foobar"),
            (TokenType::String, "foo bar"),
            (TokenType::LBracket, "["),
            (TokenType::Int, "1"),
            (TokenType::Comma, ","),
            (TokenType::Int, "2"),
            (TokenType::RBracket, "]"),
            (TokenType::Semicolon, ";"),
            (TokenType::LBrace, "{"),
            (TokenType::String, "foo"),
            (TokenType::Colon, ":"),
            (TokenType::String, "bar"),
            (TokenType::RBrace, "}"),
            (TokenType::Eof, ""),
        ]);
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let tokens: Vec<Token> = Lexer::new("let x").map(|t| t.unwrap()).collect();
        let kinds: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(kinds, vec![TokenType::Let, TokenType::Ident, TokenType::Eof]);

        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next(), Some(Ok(Token::new(TokenType::Eof, ""))));
        assert_eq!(lexer.next(), None);
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_illegal_characters_do_not_halt_scanning() {
        assert_tokens("a @ b é 5", &[
            (TokenType::Ident, "a"),
            (TokenType::Illegal, "@"),
            (TokenType::Ident, "b"),
            (TokenType::Illegal, "é"),
            (TokenType::Int, "5"),
            (TokenType::Eof, ""),
        ]);
    }

    #[test]
    fn test_string_is_taken_verbatim() {
        assert_tokens(r#""a\nb" "" "héllo wörld""#, &[
            (TokenType::String, r"a\nb"),
            (TokenType::String, ""),
            (TokenType::String, "héllo wörld"),
            (TokenType::Eof, ""),
        ]);
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        let results: Vec<_> = Lexer::new(r#"let s = "abc"#).collect();
        assert_eq!(results.len(), 4);
        assert_eq!(results[2], Ok(Token::new(TokenType::Assign, "=")));
        assert_eq!(results[3], Err(LexError::UnterminatedString { start: 8 }));
    }

    #[test]
    fn test_identifiers_and_numbers_are_maximal_runs() {
        assert_tokens("foo_bar123 123abc", &[
            (TokenType::Ident, "foo_bar"),
            (TokenType::Int, "123"),
            (TokenType::Int, "123"),
            (TokenType::Ident, "abc"),
            (TokenType::Eof, ""),
        ]);
    }
}
