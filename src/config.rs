use std::path::PathBuf;

use clap::Parser;

use monkey::repl::PROMPT;

pub const PROMPT_VAR: &str = "MONKEY_PROMPT";

/// Interpreter for the Monkey programming language.
///
/// Runs FILE when one is given, otherwise starts an interactive session.
#[derive(Parser, Debug)]
#[command(name = "monkey", version, about, long_about = None)]
pub struct Args {
    /// Start the interactive prompt even when a file is given.
    #[arg(long)]
    pub repl: bool,

    /// Script to run.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Repl,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub prompt: String,
}

impl Config {
    /// Builds the configuration from parsed arguments and the process
    /// environment.
    pub fn load(args: Args) -> Self {
        Config::from_parts(args, std::env::var(PROMPT_VAR).ok())
    }

    fn from_parts(args: Args, prompt: Option<String>) -> Self {
        // Without FILE the session is interactive rather than an
        // "Error: No input files" exit.
        let mode = match args.file {
            Some(path) if !args.repl => Mode::File(path),
            _ => Mode::Repl,
        };

        Config {
            mode,
            prompt: prompt.unwrap_or_else(|| PROMPT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv.iter().copied()).unwrap()
    }

    #[test]
    fn test_file_mode() {
        let config = Config::from_parts(args(&["monkey", "script.mk"]), None);
        assert_eq!(config.mode, Mode::File(PathBuf::from("script.mk")));
        assert_eq!(config.prompt, ">> ");
    }

    #[test]
    fn test_repl_is_the_default() {
        assert_eq!(Config::from_parts(args(&["monkey"]), None).mode, Mode::Repl);
        assert_eq!(Config::from_parts(args(&["monkey", "--repl", "x.mk"]), None).mode, Mode::Repl);
    }

    #[test]
    fn test_prompt_override() {
        let config = Config::from_parts(args(&["monkey"]), Some("monkey> ".to_string()));
        assert_eq!(config.prompt, "monkey> ");
    }

    #[test]
    fn test_rejects_extra_files() {
        assert!(Args::try_parse_from(["monkey", "a.mk", "b.mk"]).is_err());
    }
}
