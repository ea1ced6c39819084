//! Embeddable evaluator for single expressions.
//!
//! Source text is scanned, parsed into a tree and walked against a
//! host-supplied [`Environment`]. Each stage fails fast; the first error is
//! returned and later stages never run.
//!
//! ```
//! use eep::{Environment, Value};
//!
//! let mut env = Environment::new();
//! env.define("x", 3.0).define("y", 4.0);
//! env.define_function("Add", |args| {
//!     let sum = args.iter().filter_map(Value::as_number).sum::<f64>();
//!     Ok(Value::number(sum))
//! });
//! let value = eep::evaluate_with_environment("Add(x, y)", &env).unwrap();
//! assert_eq!(value, Value::number(7.0));
//! ```

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, EepError, Result, SourceSpan};
pub use environment::Environment;
pub use repl::Repl;
pub use runtime::Interpreter;
pub use value::{Value, ValueKind};

/// Evaluates `source` with no bindings; every identifier resolves to nil.
pub fn evaluate(source: &str) -> Result<Value> {
    evaluate_with_environment(source, &Environment::new())
}

/// Evaluates `source` against `env`. Bindings may include host functions.
pub fn evaluate_with_environment(source: &str, env: &Environment) -> Result<Value> {
    Interpreter::new(env).eval_source(source)
}
