use tracing::trace;

use crate::{
    ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, UnaryOp},
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    lexer::{Keyword, Lexer, Token, TokenKind},
};

/// Upper bound on the number of arguments a single call may carry.
pub const MAX_CALL_ARGUMENTS: usize = 8;

pub fn parse_source(source: &str) -> Result<Expr, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    parse(tokens)
}

/// Builds one expression tree from a token sequence ending in `Eof`.
///
/// The whole sequence must be consumed; leftover tokens after a complete
/// expression are reported rather than silently dropped.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, Diagnostic> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;
    if !parser.is_at_end() {
        let token = parser.peek();
        return Err(parser.error(
            token,
            &format!("expected end of expression, found `{}`", token.lexeme),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, end) = tokens
                .last()
                .map(|t| (t.line, t.span.end))
                .unwrap_or((1, 0));
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                literal: None,
                line,
                span: SourceSpan::new(end, end),
            });
        }
        Self { tokens, current: 0 }
    }

    fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_and()?;
        while self.matches_keyword(Keyword::Or) {
            let right = self.parse_and()?;
            expr = logical(expr, LogicalOp::Or, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_equality()?;
        while self.matches_keyword(Keyword::And) {
            let right = self.parse_equality()?;
            expr = logical(expr, LogicalOp::And, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_comparison()?;
        while let Some(op) = if self.matches(TokenKind::BangEqual) {
            Some(BinaryOp::NotEqual)
        } else if self.matches(TokenKind::EqualEqual) {
            Some(BinaryOp::Equal)
        } else {
            None
        } {
            let right = self.parse_comparison()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_term()?;
        while let Some(op) = if self.matches(TokenKind::Greater) {
            Some(BinaryOp::Greater)
        } else if self.matches(TokenKind::GreaterEqual) {
            Some(BinaryOp::GreaterEqual)
        } else if self.matches(TokenKind::Less) {
            Some(BinaryOp::Less)
        } else if self.matches(TokenKind::LessEqual) {
            Some(BinaryOp::LessEqual)
        } else {
            None
        } {
            let right = self.parse_term()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_factor()?;
        while let Some(op) = if self.matches(TokenKind::Minus) {
            Some(BinaryOp::Sub)
        } else if self.matches(TokenKind::Plus) {
            Some(BinaryOp::Add)
        } else {
            None
        } {
            let right = self.parse_factor()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_unary()?;
        while let Some(op) = if self.matches(TokenKind::Slash) {
            Some(BinaryOp::Div)
        } else if self.matches(TokenKind::Star) {
            Some(BinaryOp::Mul)
        } else {
            None
        } {
            let right = self.parse_unary()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let op = if self.matches(TokenKind::Bang) {
            UnaryOp::Not
        } else if self.matches(TokenKind::Minus) {
            UnaryOp::Negate
        } else {
            return self.parse_call();
        };
        let operator = self.previous().clone();
        let right = self.parse_unary()?;
        Ok(Expr {
            span: SourceSpan::new(operator.span.start, right.span.end),
            line: operator.line,
            kind: ExprKind::Unary {
                op,
                expr: Box::new(right),
            },
        })
    }

    fn parse_call(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;
        while self.matches(TokenKind::LParen) {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, Diagnostic> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                if args.len() >= MAX_CALL_ARGUMENTS {
                    return Err(self.error(
                        self.peek(),
                        &format!(
                            "too many arguments: a call accepts at most {MAX_CALL_ARGUMENTS}"
                        ),
                    ));
                }
                args.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RParen, "expected `)` after arguments")?;
        trace!(args = args.len(), line = paren.line, "parsed call");
        Ok(Expr {
            span: SourceSpan::new(callee.span.start, paren.span.end),
            line: paren.line,
            kind: ExprKind::Call {
                callee: Box::new(callee),
                args,
                paren,
            },
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::Keyword(Keyword::False) => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Keyword(Keyword::True) => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::Keyword(Keyword::Nil) => ExprKind::Literal(Literal::Nil),
            TokenKind::Number | TokenKind::String => {
                ExprKind::Literal(token.literal.clone().unwrap_or(Literal::Nil))
            }
            TokenKind::Identifier => ExprKind::Variable(token.lexeme.clone()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let rparen = self.consume(TokenKind::RParen, "expected `)` after expression")?;
                return Ok(Expr {
                    span: SourceSpan::new(token.span.start, rparen.span.end),
                    line: token.line,
                    kind: ExprKind::Group(Box::new(inner)),
                });
            }
            TokenKind::Eof => {
                return Err(self.error(&token, "expected expression, found end of input"));
            }
            _ => {
                return Err(self.error(
                    &token,
                    &format!("expected expression, found `{}`", token.lexeme),
                ));
            }
        };
        self.advance();
        Ok(Expr {
            span: token.span,
            line: token.line,
            kind,
        })
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches_keyword(&mut self, keyword: Keyword) -> bool {
        self.matches(TokenKind::Keyword(keyword))
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            let message = if found.kind == TokenKind::Eof {
                format!("{message}, found end of input")
            } else {
                format!("{message}, found `{}`", found.lexeme)
            };
            Err(self.error(found, &message))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn error(&self, token: &Token, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Syntax, message.to_string())
            .with_line(token.line)
            .with_span(token.span)
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr {
        span: SourceSpan::new(left.span.start, right.span.end),
        line: left.line,
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
    Expr {
        span: SourceSpan::new(left.span.start, right.span.end),
        line: left.line,
        kind: ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}
