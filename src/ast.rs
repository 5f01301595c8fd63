//! Syntax tree produced by the parser.
//!
//! Nodes are plain owned values. Function literals keep their parameters and
//! body behind `Rc` so that runtime closures can share them with the tree.
//! `Display` re-serializes a node with every prefix and infix expression fully
//! parenthesized, which makes operator precedence visible in diagnostics and tests.

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: Identifier, value: Expression },
    Return(Option<Expression>),
    Expression(Expression),
    Block(BlockStatement),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {} = {};", name, value),
            Statement::Return(Some(value)) => write!(f, "return {};", value),
            Statement::Return(None) => f.write_str("return;"),
            Statement::Expression(expression) => write!(f, "{}", expression),
            Statement::Block(block) => write!(f, "{}", block),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn new(statements: Vec<Statement>) -> Self {
        BlockStatement { statements }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub value: String,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Identifier { value: value.into() }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    BooleanLiteral(bool),
    StringLiteral(String),
    ArrayLiteral(Vec<Expression>),
    /// Pairs in source order.
    HashLiteral(Vec<(Expression, Expression)>),
    FunctionLiteral {
        parameters: Rc<Vec<Identifier>>,
        body: Rc<BlockStatement>,
    },
    Prefix {
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntegerLiteral(value) => write!(f, "{}", value),
            Expression::BooleanLiteral(value) => write!(f, "{}", value),
            Expression::StringLiteral(value) => f.write_str(value),
            Expression::ArrayLiteral(elements) => write!(f, "[{}]", join(elements)),
            Expression::HashLiteral(pairs) => {
                let pairs: Vec<String> = pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expression::FunctionLiteral { parameters, body } => {
                write!(f, "fn({}) {{{}}}", join(parameters.iter()), body)
            }
            Expression::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expression::Infix { operator, left, right } => write!(f, "({} {} {})", left, operator, right),
            Expression::If { condition, consequence, alternative } => {
                write!(f, "if ({}) {{{}}}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {{{}}}", alternative)?;
                }
                Ok(())
            }
            Expression::Call { function, arguments } => write!(f, "{}({})", function, join(arguments)),
            Expression::Index { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}
