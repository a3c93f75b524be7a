use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;

use code_lang::ast::printer;
use code_lang::{CodeError, CompileError, Interpreter, scanner};

#[derive(Parser, Debug)]
#[command(name = "code-lang", about = "An interpreter for the CODE language")]
struct Cli {
    /// Program file to run (omit for REPL)
    file: Option<PathBuf>,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,

    /// Read SCAN input from FILE instead of stdin
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Maximum level of log events written to stderr
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("read source file '{}'", path.display()))
}

fn report_compile_errors(path: &Path, source: &str, errors: Vec<CompileError>) -> anyhow::Error {
    let count = errors.len();
    for e in errors {
        let report = miette::Report::new(e.with_source_code(path.display().to_string(), source));
        eprintln!("{report:?}");
    }
    anyhow::anyhow!("{count} compile error(s)")
}

fn build_interpreter(input: Option<&Path>) -> Result<Interpreter> {
    match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("open input file '{}'", path.display()))?;
            Ok(Interpreter::with_io(BufReader::new(file), std::io::stdout()))
        }
        None => Ok(Interpreter::new()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = cli.file.as_deref() else {
        if cli.dump_tokens || cli.dump_ast {
            bail!("source file required for this operation");
        }
        code_lang::repl::run_repl()?;
        return Ok(());
    };
    let source = read_source(path)?;

    if cli.dump_tokens {
        let tokens =
            scanner::scan(&source).map_err(|e| report_compile_errors(path, &source, e))?;
        for token in &tokens {
            println!("{token}");
        }
        return Ok(());
    }

    if cli.dump_ast {
        let program =
            code_lang::compile(&source).map_err(|e| report_compile_errors(path, &source, e))?;
        match cli.ast_format.as_str() {
            "json" => println!("{}", printer::to_json(&program)),
            _ => print!("{}", printer::to_sexp(&program)),
        }
        return Ok(());
    }

    let mut interpreter = build_interpreter(cli.input.as_deref())?;
    match code_lang::run_source(&source, &mut interpreter) {
        Ok(()) => Ok(()),
        Err(CodeError::Compile(errors)) => Err(report_compile_errors(path, &source, errors)),
        Err(CodeError::Runtime(e)) => {
            eprintln!("{}", e.display_with_line());
            bail!("runtime error");
        }
    }
}
