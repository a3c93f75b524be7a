use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Minus,
    Plus,
    Colon,
    Slash,
    Star,
    Percent,
    Sharp,
    Ampersand,

    // One or two character tokens
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    LessGreater,

    // Literals
    Identifier,
    CharLiteral,
    StringLiteral,
    IntLiteral,
    FloatLiteral,

    // Block delimiters
    BeginCode,
    EndCode,
    BeginIf,
    EndIf,
    BeginWhile,
    EndWhile,
    BeginFor,
    EndFor,

    // Keywords
    Int,
    Char,
    String,
    Bool,
    Float,
    Nil,
    And,
    Or,
    Not,
    If,
    Else,
    While,
    For,
    True,
    False,
    Display,
    Scan,
    Fun,
    Return,

    Eof,
}

impl TokenKind {
    /// Type keywords that open a variable declaration.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Char | Self::String | Self::Bool | Self::Float
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::Semicolon => write!(f, ";"),
            Self::Minus => write!(f, "-"),
            Self::Plus => write!(f, "+"),
            Self::Colon => write!(f, ":"),
            Self::Slash => write!(f, "/"),
            Self::Star => write!(f, "*"),
            Self::Percent => write!(f, "%"),
            Self::Sharp => write!(f, "#"),
            Self::Ampersand => write!(f, "&"),
            Self::Equal => write!(f, "="),
            Self::EqualEqual => write!(f, "=="),
            Self::Greater => write!(f, ">"),
            Self::GreaterEqual => write!(f, ">="),
            Self::Less => write!(f, "<"),
            Self::LessEqual => write!(f, "<="),
            Self::LessGreater => write!(f, "<>"),
            Self::Identifier => write!(f, "IDENTIFIER"),
            Self::CharLiteral => write!(f, "CHAR_LITERAL"),
            Self::StringLiteral => write!(f, "STRING_LITERAL"),
            Self::IntLiteral => write!(f, "INT_LITERAL"),
            Self::FloatLiteral => write!(f, "FLOAT_LITERAL"),
            Self::BeginCode => write!(f, "BEGIN CODE"),
            Self::EndCode => write!(f, "END CODE"),
            Self::BeginIf => write!(f, "BEGIN IF"),
            Self::EndIf => write!(f, "END IF"),
            Self::BeginWhile => write!(f, "BEGIN WHILE"),
            Self::EndWhile => write!(f, "END WHILE"),
            Self::BeginFor => write!(f, "BEGIN FOR"),
            Self::EndFor => write!(f, "END FOR"),
            Self::Int => write!(f, "INT"),
            Self::Char => write!(f, "CHAR"),
            Self::String => write!(f, "STRING"),
            Self::Bool => write!(f, "BOOL"),
            Self::Float => write!(f, "FLOAT"),
            Self::Nil => write!(f, "NIL"),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Not => write!(f, "NOT"),
            Self::If => write!(f, "IF"),
            Self::Else => write!(f, "ELSE"),
            Self::While => write!(f, "WHILE"),
            Self::For => write!(f, "FOR"),
            Self::True => write!(f, "TRUE"),
            Self::False => write!(f, "FALSE"),
            Self::Display => write!(f, "DISPLAY"),
            Self::Scan => write!(f, "SCAN"),
            Self::Fun => write!(f, "FUN"),
            Self::Return => write!(f, "RETURN"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

/// Location of a token or node: byte range plus the 1-based line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
    pub line: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize, line: usize) -> Self {
        Self { offset, len, line }
    }

    /// Span covering `self` through the end of `end`, keeping the start line.
    pub fn to(self, end: Span) -> Self {
        let stop = (end.offset + end.len).max(self.offset + self.len);
        Self::new(self.offset, stop - self.offset, self.line)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

/// Decoded value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Float(f64),
    Char(char),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            span,
        }
    }

    pub fn with_literal(mut self, literal: Option<Literal>) -> Self {
        self.literal = literal;
        self
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}' line {}", self.kind, self.lexeme, self.span.line)?;
        if let Some(ref literal) = self.literal {
            write!(f, " {literal:?}")?;
        }
        Ok(())
    }
}

pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    match ident {
        "INT" => Some(TokenKind::Int),
        "CHAR" => Some(TokenKind::Char),
        "STRING" => Some(TokenKind::String),
        "BOOL" => Some(TokenKind::Bool),
        "FLOAT" => Some(TokenKind::Float),
        "NIL" => Some(TokenKind::Nil),
        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "NOT" => Some(TokenKind::Not),
        "IF" => Some(TokenKind::If),
        "ELSE" => Some(TokenKind::Else),
        "WHILE" => Some(TokenKind::While),
        "FOR" => Some(TokenKind::For),
        "TRUE" => Some(TokenKind::True),
        "FALSE" => Some(TokenKind::False),
        "DISPLAY" => Some(TokenKind::Display),
        "SCAN" => Some(TokenKind::Scan),
        "FUN" => Some(TokenKind::Fun),
        "RETURN" => Some(TokenKind::Return),
        _ => None,
    }
}

/// Two-word block delimiters: a leading `BEGIN`/`END` plus the word after it.
pub fn delimiter_kind(first: &str, second: &str) -> Option<TokenKind> {
    match (first, second) {
        ("BEGIN", "CODE") => Some(TokenKind::BeginCode),
        ("END", "CODE") => Some(TokenKind::EndCode),
        ("BEGIN", "IF") => Some(TokenKind::BeginIf),
        ("END", "IF") => Some(TokenKind::EndIf),
        ("BEGIN", "WHILE") => Some(TokenKind::BeginWhile),
        ("END", "WHILE") => Some(TokenKind::EndWhile),
        ("BEGIN", "FOR") => Some(TokenKind::BeginFor),
        ("END", "FOR") => Some(TokenKind::EndFor),
        _ => None,
    }
}
