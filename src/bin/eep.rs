use std::{fs, path::PathBuf, process::ExitCode, rc::Rc};

use clap::{Parser, Subcommand};
use eep::{lexer, stdlib, EepError, Environment, Interpreter, Repl, Value};

#[derive(Parser)]
#[command(author, version, about = "Evaluate single expressions")]
struct Args {
    /// Bind a variable, e.g. `--var x=3`. Numbers, true/false and nil are
    /// decoded; anything else is bound as a string
    #[arg(long = "var", value_name = "NAME=VALUE", global = true, value_parser = parse_binding)]
    vars: Vec<(String, String)>,
    /// Do not install the built-in function prelude
    #[arg(long, global = true)]
    bare: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression and print its value
    Eval { expression: String },
    /// Evaluate the expression stored in a file
    Run { path: PathBuf },
    /// Print the tokens scanned from an expression
    Tokens { expression: String },
    /// Start an interactive session
    Repl,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), EepError> {
    let env = environment(args.vars, args.bare);
    match args.command.unwrap_or(Command::Repl) {
        Command::Eval { expression } => print_value(&env, &expression),
        Command::Run { path } => {
            let source = fs::read_to_string(&path)?;
            print_value(&env, source.trim())
        }
        Command::Tokens { expression } => {
            for token in lexer::scan(&expression)? {
                println!("{token}");
            }
            Ok(())
        }
        Command::Repl => Repl::new(env).run(),
    }
}

fn print_value(env: &Environment, source: &str) -> Result<(), EepError> {
    let value = Interpreter::new(env).eval_source(source)?;
    println!("{value}");
    Ok(())
}

fn environment(vars: Vec<(String, String)>, bare: bool) -> Environment {
    let mut env = if bare {
        Environment::new()
    } else {
        Environment::with_parent(Rc::new(stdlib::prelude()))
    };
    env.extend(vars.into_iter().map(|(name, text)| (name, decode_value(&text))));
    env
}

fn parse_binding(raw: &str) -> Result<(String, String), String> {
    let (name, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("binding name must not be empty".to_string());
    }
    Ok((name.to_string(), text.to_string()))
}

fn decode_value(text: &str) -> Value {
    match text {
        "true" => Value::bool(true),
        "false" => Value::bool(false),
        "nil" => Value::nil(),
        _ => text
            .parse::<f64>()
            .map(Value::number)
            .unwrap_or_else(|_| Value::string(text)),
    }
}

/// Installs a stderr subscriber when `EEP_LOG` (or `RUST_LOG`) is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_env("EEP_LOG").or_else(|_| EnvFilter::try_from_default_env());
    if let Ok(filter) = filter {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    }
}
