//! A tree-walking interpreter for the Monkey programming language.
//!
//! Source text goes through [`lexer::Lexer`], [`parser::Parser`] and
//! [`eval::eval`]. Front ends only need [`new_environment`] and [`run`]:
//!
//! ```
//! use monkey::{new_environment, run, Outcome};
//! use monkey::object::Object;
//!
//! let env = new_environment();
//! run("let adder = fn(x) { fn(y) { x + y } };", &env);
//! match run("adder(2)(3)", &env) {
//!     Outcome::Value(Object::Integer(n)) => assert_eq!(n, 5),
//!     other => panic!("unexpected outcome {:?}", other),
//! }
//! ```

pub mod ast;
pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod object;
pub mod parser;
mod parser_tracing;
pub mod repl;
pub mod token;

use std::sync::Once;

use crate::env::{Env, Environment};
use crate::object::Object;

/// Result of running one piece of source.
#[derive(Debug)]
pub enum Outcome {
    /// Parsing failed; nothing was evaluated.
    Diagnostics(Vec<String>),
    /// The value of the last statement, or of the `return` or error that ended
    /// the program early.
    Value(Object),
}

/// A fresh top-level scope.
pub fn new_environment() -> Env {
    Environment::new_global()
}

/// Parses and evaluates `source` in `env`. Bindings made by the program stay
/// in `env`, so successive calls behave like one session.
pub fn run(source: &str, env: &Env) -> Outcome {
    let (program, errors) = parser::parse(source);
    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "parse failed");
        return Outcome::Diagnostics(errors.iter().map(|e| e.to_string()).collect());
    }

    Outcome::Value(eval::eval(&program, env))
}

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`. Does nothing when the
/// variable is unset; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}
