use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_till, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Literal, Span, Token, TokenKind, delimiter_kind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

/// Characters that may appear inside a `[x]` escape.
const ESCAPABLE: &str = "]#'\"$&";

/// Outcome of scanning one lexeme. A `Fault` has consumed the bad text
/// and carries the diagnostic message.
enum Lexed {
    Token(TokenKind, Option<Literal>),
    Fault(String),
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

fn next_char(input: &mut Input<'_>) -> Option<char> {
    any::<_, ContextError>.parse_next(input).ok()
}

fn whitespace_and_comments(input: &mut Input<'_>) -> ModalResult<()> {
    loop {
        let before = input.current_token_start();
        take_while(0.., |c: char| {
            c == ' ' || c == '\t' || c == '\r' || c == '\n'
        })
        .void()
        .parse_next(input)?;

        if input.starts_with('#') {
            take_while(0.., |c: char| c != '\n')
                .void()
                .parse_next(input)?;
        } else if input.current_token_start() == before {
            break;
        }
    }
    Ok(())
}

/// Skip the rest of a broken literal: up to and including `close`, or up to
/// the end of the line.
fn skip_past(input: &mut Input<'_>, close: char) {
    let _ = take_till::<_, _, ContextError>(0.., |c: char| c == close || c == '\n')
        .parse_next(input);
    if input.starts_with(close) {
        let _ = next_char(input);
    }
}

/// Decode the body of a `[x]` escape; the opening `[` is already consumed.
/// A line break or end of input right after `[` is left unconsumed so the
/// caller resumes scanning on the next line.
fn escape(input: &mut Input<'_>) -> Result<char, String> {
    if input.is_empty() || input.starts_with('\n') {
        return Err("unterminated escape sequence".to_string());
    }
    let Some(c) = next_char(input) else {
        return Err("unterminated escape sequence".to_string());
    };
    if !input.starts_with(']') {
        return Err(format!(
            "escape sequence starting with '[{c}' must be one character followed by ']'"
        ));
    }
    let _ = next_char(input);
    if ESCAPABLE.contains(c) {
        Ok(c)
    } else {
        Err(format!("invalid escape sequence '[{c}]'"))
    }
}

fn string_literal(input: &mut Input<'_>) -> ModalResult<Lexed> {
    '"'.parse_next(input)?;
    let mut value = String::new();
    loop {
        if input.starts_with('\n') {
            return Ok(Lexed::Fault("unterminated string literal".to_string()));
        }
        let Some(c) = next_char(input) else {
            return Ok(Lexed::Fault("unterminated string literal".to_string()));
        };
        match c {
            '"' => break,
            '[' => match escape(input) {
                Ok(decoded) => value.push(decoded),
                Err(message) => {
                    skip_past(input, '"');
                    return Ok(Lexed::Fault(message));
                }
            },
            '#' => {
                skip_past(input, '"');
                return Ok(Lexed::Fault(
                    "'#' inside a string literal must be written as [#]".to_string(),
                ));
            }
            other => value.push(other),
        }
    }
    Ok(Lexed::Token(
        TokenKind::StringLiteral,
        Some(Literal::Str(value)),
    ))
}

fn char_literal(input: &mut Input<'_>) -> ModalResult<Lexed> {
    '\''.parse_next(input)?;
    let value = match next_char(input) {
        None | Some('\n') => {
            return Ok(Lexed::Fault("unterminated character literal".to_string()));
        }
        Some('\'') => return Ok(Lexed::Fault("empty character literal".to_string())),
        Some('#') => {
            skip_past(input, '\'');
            return Ok(Lexed::Fault(
                "'#' inside a character literal must be written as [#]".to_string(),
            ));
        }
        Some('[') => match escape(input) {
            Ok(decoded) => decoded,
            Err(message) => {
                skip_past(input, '\'');
                return Ok(Lexed::Fault(message));
            }
        },
        Some(c) => c,
    };
    if input.starts_with('\'') {
        let _ = next_char(input);
        Ok(Lexed::Token(TokenKind::CharLiteral, Some(Literal::Char(value))))
    } else {
        skip_past(input, '\'');
        Ok(Lexed::Fault(
            "character literal must contain exactly one character".to_string(),
        ))
    }
}

fn number_literal(input: &mut Input<'_>) -> ModalResult<Lexed> {
    let whole: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut lexeme = whole.to_string();

    let checkpoint = input.checkpoint();
    let dot_result: Result<char, winnow::error::ErrMode<ContextError>> = '.'.parse_next(input);
    if dot_result.is_ok() {
        match take_while::<_, _, ContextError>(1.., |c: char| c.is_ascii_digit()).parse_next(input)
        {
            Ok(frac) => {
                lexeme.push('.');
                lexeme.push_str(frac);
                return Ok(match lexeme.parse::<f64>() {
                    Ok(value) => Lexed::Token(TokenKind::FloatLiteral, Some(Literal::Float(value))),
                    Err(_) => Lexed::Fault(format!("invalid float literal '{lexeme}'")),
                });
            }
            Err(_) => {
                input.reset(&checkpoint);
            }
        }
    }

    Ok(match lexeme.parse::<i32>() {
        Ok(value) => Lexed::Token(TokenKind::IntLiteral, Some(Literal::Int(value))),
        Err(_) => Lexed::Fault(format!("integer literal '{lexeme}' is out of range")),
    })
}

fn word<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (
        any.verify(|c: &char| c.is_ascii_alphabetic() || *c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn identifier_or_keyword(input: &mut Input<'_>) -> ModalResult<Lexed> {
    let first = word.parse_next(input)?;

    if first == "BEGIN" || first == "END" {
        let checkpoint = input.checkpoint();
        let second: ModalResult<&str> = (take_while(1.., |c: char| c == ' ' || c == '\t'), word)
            .map(|(_, second)| second)
            .parse_next(input);
        match second.ok().and_then(|second| delimiter_kind(first, second)) {
            Some(kind) => return Ok(Lexed::Token(kind, None)),
            None => input.reset(&checkpoint),
        }
    }

    let kind = keyword_kind(first).unwrap_or(TokenKind::Identifier);
    Ok(Lexed::Token(kind, None))
}

fn two_char_token(input: &mut Input<'_>) -> ModalResult<Lexed> {
    alt((
        "==".value(TokenKind::EqualEqual),
        ">=".value(TokenKind::GreaterEqual),
        "<=".value(TokenKind::LessEqual),
        "<>".value(TokenKind::LessGreater),
    ))
    .map(|kind| Lexed::Token(kind, None))
    .parse_next(input)
}

fn single_char_token(input: &mut Input<'_>) -> ModalResult<Lexed> {
    let c = any
        .verify(|c: &char| "()[],;+-:*/%&=<>".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        ':' => TokenKind::Colon,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '&' => TokenKind::Ampersand,
        '=' => TokenKind::Equal,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Lexed::Token(kind, None))
}

fn scan_token(input: &mut Input<'_>) -> ModalResult<Lexed> {
    alt((
        string_literal,
        char_literal,
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

/// Scan all tokens from source, returning either a token list or every scan error.
pub fn scan_all(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let lines = LineIndex::new(source);
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        if whitespace_and_comments(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            break;
        }
        let start = input.current_token_start();
        let span_to = |end: usize| Span::new(start, end - start, lines.line_of(start));
        match scan_token(&mut input) {
            Ok(Lexed::Token(kind, literal)) => {
                let end = input.current_token_start();
                tokens.push(Token::new(kind, &source[start..end], span_to(end)).with_literal(literal));
            }
            Ok(Lexed::Fault(message)) => {
                let end = input.current_token_start();
                errors.push(CompileError::scan(message, span_to(end)));
            }
            Err(_) => {
                let ch = next_char(&mut input).unwrap_or('?');
                let end = input.current_token_start();
                errors.push(CompileError::scan(
                    format!("unexpected character '{ch}'"),
                    span_to(end),
                ));
            }
        }
    }

    let eof_offset = source.len();
    tokens.push(Token::new(
        TokenKind::Eof,
        "",
        Span::new(eof_offset, 0, lines.line_of(eof_offset)),
    ));

    tracing::debug!(tokens = tokens.len(), errors = errors.len(), "scanned source");

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
