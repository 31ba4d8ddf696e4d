//! tarnc-drv - Compiler Driver
//!
//! Entry point and orchestrator for the compilation pipeline:
//!
//! ```text
//! source (.tn)
//!      |
//!   [lex + parse]      tarnc-lex, tarnc-par
//!      |                (stop here on syntax errors, or with --unparse)
//!   [name analysis]    tarnc-sem
//!   [type checking]    tarnc-sem
//!      |                (stop here on semantic errors;
//!      |                 code generation never sees a bad program)
//!   [code generation]  tarnc-gen
//!      |
//!   assembly (.s)
//! ```
//!
//! The driver owns the per-compilation state: the [`Config`] parsed from
//! the command line and the diagnostic [`Handler`] every phase reports
//! through. Diagnostics render to stderr as `line:col: error: message`
//! (positionless program-shape errors as `error: message`).
//!
//! Exit codes: 0 success, 1 compilation error, 2 command-line error.

use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use tarnc_util::Handler;
use thiserror::Error;

/// Compiler configuration for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Input source file
    pub input: PathBuf,

    /// Output file path (`None` means input with `.s` extension)
    pub output: Option<PathBuf>,

    /// Stop after parsing and print the unparsed program to stdout
    pub unparse: bool,

    /// Per-phase progress on stderr
    pub verbose: bool,
}

impl Config {
    /// Parse command-line arguments (without the program name).
    pub fn from_args<I, S>(args: I) -> Result<Config, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut input = None;
        let mut output = None;
        let mut unparse = false;
        let mut verbose = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "--unparse" => unparse = true,
                "--verbose" => verbose = true,
                "-o" => {
                    let path = args.next().ok_or_else(|| {
                        CompileError::InvalidArguments("`-o` requires a path".into())
                    })?;
                    output = Some(PathBuf::from(path.as_ref()));
                }
                _ if arg.starts_with('-') => {
                    return Err(CompileError::InvalidArguments(format!(
                        "unknown option `{}`",
                        arg
                    )));
                }
                _ => {
                    if input.is_some() {
                        return Err(CompileError::InvalidArguments(
                            "more than one input file".into(),
                        ));
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
        }

        let input = input
            .ok_or_else(|| CompileError::InvalidArguments("no input file given".into()))?;
        Ok(Config {
            input,
            output,
            unparse,
            verbose,
        })
    }

    /// Where the assembly goes: `-o` if given, else the input with its
    /// extension replaced by `.s`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("s"))
    }
}

/// Driver-level failure
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source had errors; diagnostics were already rendered
    #[error("compilation failed with {0} error(s)")]
    CompilationFailed(usize),

    /// Bad command line
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// State for one compiler invocation
pub struct Session {
    config: Config,
    handler: Handler,
}

impl Session {
    /// Create a session with a fresh diagnostic handler.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handler: Handler::new(),
        }
    }

    /// Run the pipeline to completion.
    pub fn compile(&mut self) -> anyhow::Result<()> {
        let source = fs::read_to_string(&self.config.input)
            .with_context(|| format!("failed to read {}", self.config.input.display()))?;

        self.phase("lexing and parsing");
        let mut program = tarnc_par::parse_source(&source, &self.handler);
        self.bail_if_errors()?;

        if self.config.unparse {
            print!("{}", tarnc_par::unparse(&program));
            self.render_diagnostics();
            return Ok(());
        }

        self.phase("name analysis");
        let defs = tarnc_sem::analyze(&mut program, &self.handler);

        self.phase("type checking");
        tarnc_sem::check(&mut program, &defs, &self.handler);
        self.bail_if_errors()?;

        self.phase("code generation");
        let asm = tarnc_gen::generate(&program, &defs);

        let output = self.config.output_path();
        fs::write(&output, asm)
            .with_context(|| format!("failed to write {}", output.display()))?;
        if self.config.verbose {
            eprintln!("wrote {}", output.display());
        }

        // surface any warnings even on success
        self.render_diagnostics();
        Ok(())
    }

    fn phase(&self, name: &str) {
        if self.config.verbose {
            eprintln!("{}...", name);
        }
    }

    /// Render everything collected so far and stop the pipeline if any
    /// of it is an error.
    fn bail_if_errors(&self) -> Result<(), CompileError> {
        if self.handler.has_errors() {
            self.render_diagnostics();
            return Err(CompileError::CompilationFailed(self.handler.error_count()));
        }
        Ok(())
    }

    fn render_diagnostics(&self) {
        for diag in self.handler.diagnostics() {
            if diag.span.is_dummy() {
                eprintln!("{}: {}", diag.level, diag.message);
            } else {
                eprintln!(
                    "{}:{}: {}: {}",
                    diag.span.line, diag.span.column, diag.level, diag.message
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_input() {
        let err = Config::from_args(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidArguments(_)));
    }

    #[test]
    fn test_config_parses_flags() {
        let config =
            Config::from_args(["--verbose", "--unparse", "-o", "out.s", "prog.tn"]).unwrap();
        assert!(config.verbose);
        assert!(config.unparse);
        assert_eq!(config.output_path(), PathBuf::from("out.s"));
        assert_eq!(config.input, PathBuf::from("prog.tn"));
    }

    #[test]
    fn test_config_default_output_is_dot_s() {
        let config = Config::from_args(["dir/prog.tn"]).unwrap();
        assert_eq!(config.output_path(), PathBuf::from("dir/prog.s"));
    }

    #[test]
    fn test_config_rejects_unknown_option() {
        let err = Config::from_args(["--frobnicate", "prog.tn"]).unwrap_err();
        assert!(matches!(err, CompileError::InvalidArguments(_)));
    }

    #[test]
    fn test_config_rejects_multiple_inputs() {
        let err = Config::from_args(["a.tn", "b.tn"]).unwrap_err();
        assert!(matches!(err, CompileError::InvalidArguments(_)));
    }

    #[test]
    fn test_config_dash_o_requires_value() {
        let err = Config::from_args(["prog.tn", "-o"]).unwrap_err();
        assert!(matches!(err, CompileError::InvalidArguments(_)));
    }
}
