use std::rc::Rc;

use tracing::debug;

use crate::ast::{BlockStatement, Expression, Identifier, Program, Statement};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::parser_tracing::trace;
use crate::token::{Token, TokenType};

#[derive(PartialOrd, PartialEq, Debug, Copy, Clone)]
enum Precedence {
    Lowest,
    // ==
    Equals,
    // > or <
    LessGreater,
    // +
    Sum,
    // *
    Product,
    // -X or !X
    Prefix,
    // myFunction(X)
    Call,
    // array[index]
    Index,
}

fn precedence_of(token_type: TokenType) -> Precedence {
    match token_type {
        TokenType::Eq | TokenType::NotEq => Precedence::Equals,
        TokenType::Lt | TokenType::Gt => Precedence::LessGreater,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Slash | TokenType::Asterisk => Precedence::Product,
        TokenType::LParen => Precedence::Call,
        TokenType::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn has_infix(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Plus
            | TokenType::Minus
            | TokenType::Slash
            | TokenType::Asterisk
            | TokenType::Eq
            | TokenType::NotEq
            | TokenType::Lt
            | TokenType::Gt
            | TokenType::LParen
            | TokenType::LBracket
    )
}

// Deeper input is rejected with a diagnostic instead of exhausting the stack.
const MAX_NESTING: usize = 200;

/// Parses a whole source string.
pub fn parse(input: &str) -> (Program, Vec<ParseError>) {
    Parser::new(Lexer::new(input)).parse_program()
}

/// Pratt parser pulling tokens from a [`Lexer`] with one token of lookahead.
///
/// Malformed input never aborts parsing: the offending construct is dropped,
/// a diagnostic is recorded, and parsing resumes with the next statement.
pub struct Parser<'a> {
    l: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
    depth: usize,
    abandoned: bool,
}

impl<'a> Parser<'a> {
    pub fn new(l: Lexer<'a>) -> Parser<'a> {
        let mut p = Parser {
            l,
            cur_token: Token::default(),
            peek_token: Token::default(),
            errors: Vec::new(),
            depth: 0,
            abandoned: false,
        };

        p.next_token();
        p.next_token();
        p
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::take(&mut self.peek_token);
        self.peek_token = match self.l.next() {
            Some(Ok(tok)) => tok,
            Some(Err(err)) => {
                self.errors.push(err.into());
                Token::new(TokenType::Eof, "")
            }
            None => Token::new(TokenType::Eof, ""),
        };
    }

    /// Consumes the parser, returning the program together with every
    /// diagnostic collected along the way.
    pub fn parse_program(mut self) -> (Program, Vec<ParseError>) {
        let mut program = Program::default();

        while !self.cur_token_is(TokenType::Eof) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }

        (program, self.errors)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.token_type {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let _t = trace("parse_let_statement", &self.cur_token);

        if !self.expect_peek(TokenType::Ident) {
            return None;
        }

        let name = Identifier::new(self.cur_token.literal.clone());

        if !self.expect_peek(TokenType::Assign) {
            return None;
        }

        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_to_semicolon();

        Some(Statement::Let { name, value: value? })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let _t = trace("parse_return_statement", &self.cur_token);

        if self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
            return Some(Statement::Return(None));
        }
        if self.peek_token_is(TokenType::RBrace) || self.peek_token_is(TokenType::Eof) {
            return Some(Statement::Return(None));
        }

        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_to_semicolon();

        Some(Statement::Return(Some(value?)))
    }

    /// Moves onto the `;` ending a `let` or `return`, discarding anything the
    /// value expression left unconsumed. Stops early in front of a closing
    /// brace or the end of input.
    fn skip_to_semicolon(&mut self) {
        while !self.cur_token_is(TokenType::Semicolon) {
            if self.peek_token_is(TokenType::Eof) || self.peek_token_is(TokenType::RBrace) {
                break;
            }
            self.next_token();
            if !self.cur_token_is(TokenType::Semicolon) {
                debug!(token = %self.cur_token.literal, kind = %self.cur_token.token_type, "skipping token");
            }
        }
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let _t = trace("parse_expression_statement", &self.cur_token);

        let expression = self.parse_expression(Precedence::Lowest)?;

        while self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
        }

        Some(Statement::Expression(expression))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let _t = trace("parse_expression", &self.cur_token);

        if self.depth >= MAX_NESTING {
            self.abandon(ParseError::NestingTooDeep);
            return None;
        }

        self.depth += 1;
        let expression = self.parse_expression_at(precedence);
        self.depth -= 1;
        expression
    }

    fn parse_expression_at(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left_exp = self.parse_prefix()?;

        while !self.peek_token_is(TokenType::Semicolon) && precedence < self.peek_precedence() {
            if !has_infix(self.peek_token.token_type) {
                return Some(left_exp);
            }
            self.next_token();
            left_exp = self.parse_infix(left_exp)?;
        }

        Some(left_exp)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur_token.token_type {
            TokenType::Ident => Some(self.parse_identifier()),
            TokenType::Int => self.parse_integer_literal(),
            TokenType::String => Some(Expression::StringLiteral(self.cur_token.literal.clone())),
            TokenType::True | TokenType::False => Some(self.parse_boolean()),
            TokenType::Bang | TokenType::Minus => self.parse_prefix_expression(),
            TokenType::LParen => self.parse_grouped_expression(),
            TokenType::If => self.parse_if_expression(),
            TokenType::Function => self.parse_function_literal(),
            TokenType::LBracket => self.parse_array_literal(),
            TokenType::LBrace => self.parse_hash_literal(),
            other => {
                self.errors.push(ParseError::NoPrefixParseFn(other));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.cur_token.token_type {
            TokenType::LParen => self.parse_call_expression(left),
            TokenType::LBracket => self.parse_index_expression(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_identifier(&mut self) -> Expression {
        Expression::Identifier(Identifier::new(self.cur_token.literal.clone()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                self.errors.push(ParseError::InvalidInteger(self.cur_token.literal.clone()));
                None
            }
        }
    }

    fn parse_boolean(&mut self) -> Expression {
        Expression::BooleanLiteral(self.cur_token_is(TokenType::True))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let _t = trace("parse_prefix_expression", &self.cur_token);

        let operator = self.cur_token.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix { operator, right: Box::new(right) })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let _t = trace("parse_infix_expression", &self.cur_token);

        let operator = self.cur_token.literal.clone();
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::RParen) {
            return None;
        }

        Some(exp)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let _t = trace("parse_if_expression", &self.cur_token);

        if !self.expect_peek(TokenType::LParen) {
            return None;
        }

        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::RParen) {
            return None;
        }

        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }

        let consequence = self.parse_block_statement();

        let mut alternative = None;
        if self.peek_token_is(TokenType::Else) {
            self.next_token();

            if !self.expect_peek(TokenType::LBrace) {
                return None;
            }

            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let _t = trace("parse_block_statement", &self.cur_token);

        let mut block = BlockStatement::default();

        self.next_token();

        while !self.cur_token_is(TokenType::RBrace) && !self.cur_token_is(TokenType::Eof) {
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }

        if self.cur_token_is(TokenType::Eof) && !self.abandoned {
            self.errors.push(ParseError::UnexpectedToken {
                expected: TokenType::RBrace,
                got: TokenType::Eof,
            });
        }

        block
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let _t = trace("parse_function_literal", &self.cur_token);

        if !self.expect_peek(TokenType::LParen) {
            return None;
        }

        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }

        let body = self.parse_block_statement();

        Some(Expression::FunctionLiteral {
            parameters: Rc::new(parameters),
            body: Rc::new(body),
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut identifiers = Vec::new();

        if self.peek_token_is(TokenType::RParen) {
            self.next_token();
            return Some(identifiers);
        }

        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        identifiers.push(Identifier::new(self.cur_token.literal.clone()));

        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            if !self.expect_peek(TokenType::Ident) {
                return None;
            }
            identifiers.push(Identifier::new(self.cur_token.literal.clone()));
        }

        if !self.expect_peek(TokenType::RParen) {
            return None;
        }

        Some(identifiers)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let _t = trace("parse_call_expression", &self.cur_token);

        let arguments = self.parse_expression_list(TokenType::RParen)?;

        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let _t = trace("parse_index_expression", &self.cur_token);

        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::RBracket) {
            return None;
        }

        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let _t = trace("parse_array_literal", &self.cur_token);

        let elements = self.parse_expression_list(TokenType::RBracket)?;
        Some(Expression::ArrayLiteral(elements))
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let _t = trace("parse_hash_literal", &self.cur_token);

        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenType::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenType::Colon) {
                return None;
            }

            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(TokenType::RBrace) && !self.expect_peek(TokenType::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenType::RBrace) {
            return None;
        }

        Some(Expression::HashLiteral(pairs))
    }

    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    /// Records `err` and discards the rest of the input.
    fn abandon(&mut self, err: ParseError) {
        debug!(error = %err, "abandoning parse");
        self.errors.push(err);
        self.abandoned = true;
        while !self.cur_token_is(TokenType::Eof) {
            self.next_token();
        }
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek_token.token_type)
    }

    fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur_token.token_type)
    }

    fn peek_error(&mut self, expected: TokenType) {
        self.errors.push(ParseError::UnexpectedToken {
            expected,
            got: self.peek_token.token_type,
        });
    }

    fn cur_token_is(&self, t: TokenType) -> bool {
        self.cur_token.token_type == t
    }

    fn peek_token_is(&self, t: TokenType) -> bool {
        self.peek_token.token_type == t
    }

    fn expect_peek(&mut self, t: TokenType) -> bool {
        if self.peek_token_is(t) {
            self.next_token();
            true
        } else {
            self.peek_error(t);
            false
        }
    }
}
