use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{
    diagnostics::{EepError, Result},
    environment::Environment,
    runtime::Interpreter,
};

/// Line-at-a-time evaluator. Every line is an independent expression; the
/// environment is fixed for the whole session.
pub struct Repl {
    env: Environment,
}

impl Repl {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()
            .map_err(|err| EepError::from(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
        let interpreter = Interpreter::new(&self.env);
        loop {
            match editor.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    if trimmed == ":env" {
                        println!("{}", self.env.names().join(" "));
                        continue;
                    }
                    match interpreter.eval_source(trimmed) {
                        Ok(value) => println!("{value}"),
                        Err(err) => eprintln!("{err}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(EepError::from(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        err,
                    )));
                }
            }
        }
        Ok(())
    }
}
