use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::DeclaredType;
use crate::scanner::token::Span;

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("[line {line}] scan error: {message}")]
    #[diagnostic(code(code::scan))]
    Scan {
        message: String,
        line: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("[line {line}] parse error: {message}")]
    #[diagnostic(code(code::parse))]
    Parse {
        message: String,
        line: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn scan(message: impl Into<String>, span: Span) -> Self {
        Self::Scan {
            message: message.into(),
            line: span.line,
            span: span.into(),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            message: message.into(),
            line: span.line,
            span: SourceSpan::new(span.offset.into(), span.len.max(1)),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Scan { line, .. } | Self::Parse { line, .. } => *line,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Scan { message, .. } | Self::Parse { message, .. } => message,
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let src = miette::NamedSource::new(name.into(), source.into());
        match self {
            Self::Scan {
                message,
                line,
                span,
                ..
            } => Self::Scan {
                message,
                line,
                span,
                src,
            },
            Self::Parse {
                message,
                line,
                span,
                ..
            } => Self::Parse {
                message,
                line,
                span,
                src,
            },
        }
    }
}

// ============= Runtime errors (simple, no miette) =============

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Span },

    #[error("variable '{name}' is already declared")]
    AlreadyDeclared { name: String, span: Span },

    #[error("{message}")]
    TypeMismatch { message: String, span: Span },

    #[error("operands of '{operator}' must both be INT or both be FLOAT, found {left} and {right}")]
    MixedNumeric {
        operator: String,
        left: &'static str,
        right: &'static str,
        span: Span,
    },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("SCAN expected {expected} value(s) but got {found}")]
    ScanFieldCount {
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("cannot read {input:?} as {declared} for '{name}'")]
    ScanDecode {
        name: String,
        input: String,
        declared: DeclaredType,
        span: Span,
    },

    #[error("no input left for SCAN")]
    InputExhausted { span: Span },

    #[error("cannot write output: {message}")]
    Output { message: String, span: Span },
}

impl RuntimeError {
    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn undefined(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::AlreadyDeclared { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::MixedNumeric { span, .. }
            | Self::DivisionByZero { span }
            | Self::ScanFieldCount { span, .. }
            | Self::ScanDecode { span, .. }
            | Self::InputExhausted { span }
            | Self::Output { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        self.span().line
    }

    /// Format error with the line of the offending token
    pub fn display_with_line(&self) -> String {
        format!("Error: line {}: {}", self.line(), self)
    }
}

/// Failure of a whole scan → parse → interpret run.
#[derive(Error, Debug)]
pub enum CodeError {
    #[error("{} compile error(s)", .0.len())]
    Compile(Vec<CompileError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<Vec<CompileError>> for CodeError {
    fn from(errors: Vec<CompileError>) -> Self {
        Self::Compile(errors)
    }
}

// ============= Tests =============
