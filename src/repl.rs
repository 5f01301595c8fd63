use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::MonkeyError;
use crate::{new_environment, run, Outcome};

pub const PROMPT: &str = ">> ";

/// Reads lines from `input` and evaluates each one in a single session-wide
/// environment until `exit`, `quit` or end of input.
pub fn start<R: BufRead, W: Write>(mut input: R, output: &mut W, prompt: &str) -> Result<(), MonkeyError> {
    let env = new_environment();

    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            debug!("end of input");
            writeln!(output)?;
            return Ok(());
        }

        let trimmed_line = line.trim();
        if trimmed_line == "exit" || trimmed_line == "quit" {
            writeln!(output, "Exiting...")?;
            return Ok(());
        }
        if trimmed_line.is_empty() {
            continue;
        }

        print_outcome(output, &run(&line, &env))?;
    }
}

/// Writes diagnostics one per line, tab-indented, or the printable value.
pub fn print_outcome<W: Write>(output: &mut W, outcome: &Outcome) -> Result<(), MonkeyError> {
    match outcome {
        Outcome::Diagnostics(errors) => print_parse_errors(output, errors)?,
        Outcome::Value(value) => writeln!(output, "{}", value)?,
    }
    Ok(())
}

fn print_parse_errors<W: Write>(output: &mut W, errors: &[String]) -> Result<(), MonkeyError> {
    for error in errors {
        writeln!(output, "\t{}", error)?;
    }
    Ok(())
}
