mod config;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use clap::Parser;
use tracing::warn;

use monkey::error::MonkeyError;
use monkey::{new_environment, repl, run};

use crate::config::{Args, Config, Mode};

fn main() {
    monkey::init_tracing();

    let config = Config::load(Args::parse());

    let result = match &config.mode {
        Mode::File(path) => run_file(path),
        Mode::Repl => {
            println!("This is the Monkey programming language!");
            println!("Feel free to type in commands");
            repl::start(io::stdin().lock(), &mut io::stdout().lock(), &config.prompt)
        }
    };

    if let Err(e) = result {
        warn!(error = %e, "monkey exited with an error");
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run_file(path: &Path) -> Result<(), MonkeyError> {
    let source = fs::read_to_string(path).map_err(|source| MonkeyError::ReadSource {
        path: path.to_path_buf(),
        source,
    })?;

    let env = new_environment();
    let outcome = run(&source, &env);

    let mut stdout = io::stdout().lock();
    repl::print_outcome(&mut stdout, &outcome)?;
    stdout.flush()?;
    Ok(())
}
