use clap::Parser as CliParser;
use treelox::{
    interpreter::Interpreter,
    parser::Parser,
    printer,
    scanner::Scanner,
    Error,
};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Runs a script, or starts a prompt when no script is given.
#[derive(CliParser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script to run.
    script: Option<PathBuf>,

    /// Print the scanned tokens instead of running the source.
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the parsed statements instead of running the source.
    #[arg(long)]
    ast: bool,
}

#[derive(Clone, Copy)]
enum Mode {
    Tokens,
    Ast,
    Run,
}

/// What went wrong in one run, mapped onto the exit code file mode uses.
enum Failure {
    Static,
    Runtime,
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Static => 65,
            Failure::Runtime => 70,
        }
    }
}

fn main() -> io::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mode = if cli.tokens {
        Mode::Tokens
    } else if cli.ast {
        Mode::Ast
    } else {
        Mode::Run
    };

    match cli.script {
        Some(path) => run_file(&path, mode),
        None => run_prompt(mode),
    }
}

/// Logs go to stderr, and only when `RUST_LOG` is set.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &Path, mode: Mode) -> io::Result<()> {
    let contents = std::fs::read_to_string(path)?;
    let mut lox = Lox::new(io::stdout(), io::stderr());
    if let Some(failure) = lox.run(contents.as_str(), mode)? {
        process::exit(failure.exit_code());
    }
    Ok(())
}

fn run_prompt(mode: Mode) -> io::Result<()> {
    let mut buffer = String::new();
    let stdin = io::stdin();
    let mut out = io::stdout();

    let mut lox = Lox::new(io::stdout(), io::stderr());

    loop {
        write!(out, "> ")?;
        out.flush()?;

        buffer.clear();

        let num_bytes = stdin.read_line(&mut buffer)?;
        if num_bytes == 0 { break };

        // Errors were already reported; the session keeps its bindings.
        lox.run(buffer.as_str(), mode)?;
    }

    Ok(())
}

struct Lox<Out, ErrOut> {
    interpreter: Interpreter<Out>,
    err_out: ErrOut,
}

impl <Out: Write, ErrOut: Write> Lox<Out, ErrOut> {
    fn new(out: Out, err_out: ErrOut) -> Self {
        Self {
            interpreter: Interpreter::new(out),
            err_out,
        }
    }

    /// Runs one chunk of source. Returns the failure, if any, once it has
    /// been reported on `err_out`.
    fn run(&mut self, source: &str, mode: Mode) -> io::Result<Option<Failure>> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();

        if let Mode::Tokens = mode {
            let out = self.interpreter.writer_mut();
            for token in tokens.iter() {
                writeln!(out, "{}", token)?;
            }
            return self.report(&errors, Failure::Static);
        }

        if !errors.is_empty() {
            return self.report(&errors, Failure::Static);
        }

        let (statements, errors): (Vec<_>, Vec<_>) = Parser::new(tokens)
            .parse()
            .into_iter()
            .partition(Result::is_ok);

        let errors: Vec<_> = errors.into_iter().filter_map(Result::err).collect();
        if !errors.is_empty() {
            return self.report(&errors, Failure::Static);
        }

        let statements: Vec<_> = statements.into_iter().filter_map(Result::ok).collect();

        if let Mode::Ast = mode {
            let out = self.interpreter.writer_mut();
            for statement in statements.iter() {
                writeln!(out, "{}", printer::print_stmt(statement))?;
            }
            return Ok(None);
        }

        match self.interpreter.interpret(&statements) {
            Err(e) => self.report(&[e], Failure::Runtime),
            Ok(()) => Ok(None),
        }
    }

    fn report(&mut self, errors: &[Error], failure: Failure) -> io::Result<Option<Failure>> {
        if errors.is_empty() {
            return Ok(None);
        }
        for e in errors.iter() {
            writeln!(self.err_out, "{}", e)?;
        }
        Ok(Some(failure))
    }
}
