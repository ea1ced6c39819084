use std::fmt;

use tracing::trace;

use crate::{
    ast::Literal,
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Or,
    True,
    False,
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Keyword(Keyword),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
    pub span: SourceSpan,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} `{}`", self.kind, self.lexeme)?;
        if let Some(literal) = &self.literal {
            write!(f, " = {literal}")?;
        }
        write!(f, " (line {})", self.line)
    }
}

/// Turns expression text into a token sequence terminated by [`TokenKind::Eof`].
///
/// Scanning stops at the first malformed character class; the returned
/// diagnostic carries the line it was found on.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = if let Some((idx, ch)) = self.peeked.take() {
            Some((idx, ch))
        } else {
            self.chars.next()
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
            }
            Some((idx, ch))
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    /// Character after the peeked one.
    fn peek_next(&mut self) -> Option<char> {
        self.peek()?;
        self.chars.clone().next().map(|(_, ch)| ch)
    }

    fn match_next(&mut self, expected: char) -> bool {
        match self.peek() {
            Some((_, ch)) if ch == expected => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn skip_digits(&mut self) {
        while let Some((_, ch)) = self.peek() {
            if ch.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn identifier_or_keyword(&mut self, start: usize, line: usize) -> Token {
        while let Some((_, ch)) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let kind =
            keyword_for(&self.source[start..self.current]).unwrap_or(TokenKind::Identifier);
        self.token(start, line, kind, None)
    }

    fn number_literal(&mut self, start: usize, line: usize) -> Result<Token, Diagnostic> {
        self.skip_digits();
        let has_fraction = matches!(self.peek(), Some((_, '.')))
            && self.peek_next().is_some_and(|ch| ch.is_ascii_digit());
        if has_fraction {
            self.bump();
            self.skip_digits();
        }
        let text = &self.source[start..self.current];
        let value = text.parse::<f64>().map_err(|err| {
            Diagnostic::new(
                DiagnosticKind::Lex,
                format!("invalid number literal `{text}`: {err}"),
            )
            .with_line(line)
            .with_span(SourceSpan::new(start, self.current))
        })?;
        Ok(self.token(start, line, TokenKind::Number, Some(Literal::Number(value))))
    }

    fn string_literal(&mut self, start: usize, line: usize) -> Result<Token, Diagnostic> {
        let body_start = self.current;
        while let Some((idx, ch)) = self.bump() {
            if ch == '"' {
                let value = self.source[body_start..idx].to_string();
                let literal = Some(Literal::String(value));
                return Ok(self.token(start, line, TokenKind::String, literal));
            }
        }
        Err(Diagnostic::new(DiagnosticKind::Lex, "unterminated string")
            .with_line(self.line)
            .with_span(SourceSpan::new(start, self.current)))
    }

    fn token(
        &self,
        start: usize,
        line: usize,
        kind: TokenKind,
        literal: Option<Literal>,
    ) -> Token {
        Token {
            kind,
            lexeme: self.source[start..self.current].to_string(),
            literal,
            line,
            span: SourceSpan::new(start, self.current),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            let line = self.line;
            let (start, ch) = match self.bump() {
                Some(pair) => pair,
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        lexeme: String::new(),
                        literal: None,
                        line: self.line,
                        span: SourceSpan::new(self.current, self.current),
                    });
                    break;
                }
            };

            let token = match ch {
                ' ' | '\t' | '\r' | '\n' => continue,
                'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(start, line),
                '0'..='9' => self.number_literal(start, line)?,
                '"' => self.string_literal(start, line)?,
                '(' => self.token(start, line, TokenKind::LParen, None),
                ')' => self.token(start, line, TokenKind::RParen, None),
                '[' => self.token(start, line, TokenKind::LBracket, None),
                ']' => self.token(start, line, TokenKind::RBracket, None),
                ',' => self.token(start, line, TokenKind::Comma, None),
                '.' => self.token(start, line, TokenKind::Dot, None),
                ';' => self.token(start, line, TokenKind::Semicolon, None),
                '+' => self.token(start, line, TokenKind::Plus, None),
                '-' => self.token(start, line, TokenKind::Minus, None),
                '*' => self.token(start, line, TokenKind::Star, None),
                '/' => self.token(start, line, TokenKind::Slash, None),
                '!' => {
                    let kind = if self.match_next('=') {
                        TokenKind::BangEqual
                    } else {
                        TokenKind::Bang
                    };
                    self.token(start, line, kind, None)
                }
                '=' => {
                    let kind = if self.match_next('=') {
                        TokenKind::EqualEqual
                    } else {
                        TokenKind::Equal
                    };
                    self.token(start, line, kind, None)
                }
                '<' => {
                    let kind = if self.match_next('=') {
                        TokenKind::LessEqual
                    } else {
                        TokenKind::Less
                    };
                    self.token(start, line, kind, None)
                }
                '>' => {
                    let kind = if self.match_next('=') {
                        TokenKind::GreaterEqual
                    } else {
                        TokenKind::Greater
                    };
                    self.token(start, line, kind, None)
                }
                other => {
                    return Err(Diagnostic::new(
                        DiagnosticKind::Lex,
                        format!("unexpected token `{other}`"),
                    )
                    .with_line(line)
                    .with_span(SourceSpan::new(start, self.current)));
                }
            };
            tokens.push(token);
        }
        trace!(count = tokens.len(), "scanned tokens");
        Ok(tokens)
    }
}

/// Reserved words. The table is a compile-time match, shared by every scan.
fn keyword_for(ident: &str) -> Option<TokenKind> {
    use self::Keyword as Kw;
    let keyword = match ident {
        "and" => Kw::And,
        "or" => Kw::Or,
        "true" => Kw::True,
        "false" => Kw::False,
        "nil" => Kw::Nil,
        _ => return None,
    };
    Some(TokenKind::Keyword(keyword))
}

/// Scans `source` into tokens.
pub fn scan(source: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source).tokenize()
}
