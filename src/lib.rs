pub mod ast;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod scanner;

// Re-export error types for convenience
pub use error::{CodeError, CompileError, RuntimeError};
pub use interpreter::Interpreter;

/// Scan and parse a whole program. Scan errors stop before parsing.
pub fn compile(source: &str) -> Result<ast::Program, Vec<CompileError>> {
    let tokens = scanner::scan(source)?;
    parser::Parser::new(tokens).parse()
}

/// Compile `source` and run it on `interpreter`. Nothing executes unless
/// the whole program compiles.
pub fn run_source(source: &str, interpreter: &mut Interpreter) -> Result<(), CodeError> {
    let program = compile(source)?;
    interpreter.interpret(&program)?;
    Ok(())
}
