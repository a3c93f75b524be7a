use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::CodeError;
use crate::interpreter::Interpreter;

/// Run the interactive REPL. Globals persist across lines.
pub fn run_repl() -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let mut interpreter = Interpreter::new();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        match crate::run_source(&wrap_line(trimmed), &mut interpreter) {
            Ok(()) => {}
            Err(CodeError::Compile(errors)) => {
                for e in &errors {
                    eprintln!("{e}");
                }
            }
            Err(CodeError::Runtime(e)) => eprintln!("{}", e.display_with_line()),
        }
    }
    Ok(())
}

/// Turn one REPL line into a whole program. Bare expressions are displayed.
fn wrap_line(line: &str) -> String {
    if line.starts_with("BEGIN CODE") {
        return line.to_string();
    }
    if is_bare_expression(line) {
        format!("BEGIN CODE DISPLAY: {line} END CODE")
    } else {
        format!("BEGIN CODE {line} END CODE")
    }
}

/// Heuristic: the line is a bare expression if it doesn't start with a
/// statement keyword and isn't an assignment.
fn is_bare_expression(line: &str) -> bool {
    let first_word = line.split_whitespace().next().unwrap_or("");
    if matches!(
        first_word,
        "INT"
            | "FLOAT"
            | "CHAR"
            | "BOOL"
            | "STRING"
            | "IF"
            | "ELSE"
            | "WHILE"
            | "FOR"
            | "DISPLAY"
            | "DISPLAY:"
            | "SCAN"
            | "SCAN:"
            | "BEGIN"
            | "END"
            | "FUN"
            | "RETURN"
    ) {
        return false;
    }
    let rest = line
        .trim_start_matches(|c: char| c.is_alphanumeric() || c == '_')
        .trim_start();
    !(rest.starts_with('=') && !rest.starts_with("=="))
}
