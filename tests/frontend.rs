use eep::{
    ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, UnaryOp},
    diagnostics::DiagnosticKind,
    lexer::{self, Keyword, TokenKind},
    parser::{self, MAX_CALL_ARGUMENTS},
};
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lexer::scan(source)
        .expect("scan should succeed")
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn parse(source: &str) -> Expr {
    parser::parse_source(source).expect("parse should succeed")
}

#[test]
fn scans_punctuation_and_operators() {
    use TokenKind::*;
    assert_eq!(
        kinds("( ) [ ] , . + - * / ;"),
        vec![
            LParen, RParen, LBracket, RBracket, Comma, Dot, Plus, Minus, Star, Slash, Semicolon,
            Eof
        ]
    );
    assert_eq!(
        kinds("! != = == > >= < <="),
        vec![Bang, BangEqual, Equal, EqualEqual, Greater, GreaterEqual, Less, LessEqual, Eof]
    );
    assert_eq!(kinds("!==="), vec![BangEqual, EqualEqual, Eof]);
}

#[test]
fn scans_keywords_and_identifiers() {
    assert_eq!(
        kinds("and or true false nil android _x1 Nil"),
        vec![
            TokenKind::Keyword(Keyword::And),
            TokenKind::Keyword(Keyword::Or),
            TokenKind::Keyword(Keyword::True),
            TokenKind::Keyword(Keyword::False),
            TokenKind::Keyword(Keyword::Nil),
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn scans_literals() {
    let tokens = lexer::scan(r#"12.5 "hi there" 3."#).expect("scan should succeed");
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].literal, Some(Literal::Number(12.5)));
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].lexeme, r#""hi there""#);
    assert_eq!(tokens[1].literal, Some(Literal::String("hi there".into())));
    assert_eq!(tokens[2].literal, Some(Literal::Number(3.0)));
    assert_eq!(tokens[3].kind, TokenKind::Dot);
    assert_eq!(tokens[4].kind, TokenKind::Eof);
    assert_eq!(tokens[4].lexeme, "");
    assert_eq!(tokens[0].literal.as_ref().map(ToString::to_string), Some("12.5".into()));
}

#[test]
fn tracks_lines_across_newlines_and_strings() {
    let tokens = lexer::scan("a\n\"x\ny\"\nb").expect("scan should succeed");
    let lines: Vec<usize> = tokens.iter().map(|token| token.line).collect();
    assert_eq!(lines, vec![1, 2, 4, 4]);
}

#[test]
fn reports_lexical_errors() {
    let diag = lexer::scan("1 + \"open").expect_err("unterminated string");
    assert_eq!(diag.kind, DiagnosticKind::Lex);
    assert_eq!(diag.message, "unterminated string");

    let diag = lexer::scan("a\n@").expect_err("unexpected character");
    assert_eq!(diag.line, Some(2));
    assert!(diag.message.contains("unexpected token `@`"));

    let diag = lexer::scan("1 +\u{a0}2").expect_err("non-breaking space");
    assert_eq!(diag.kind, DiagnosticKind::Lex);
}

#[test]
fn token_display_includes_literal_and_line() {
    let tokens = lexer::scan("42").expect("scan should succeed");
    assert_eq!(tokens[0].to_string(), "Number `42` = 42 (line 1)");
}

#[test]
fn parses_precedence_into_tree() {
    let expr = parse("1 + 2 * 3");
    let ExprKind::Binary { op, left, right } = expr.kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(left.kind, ExprKind::Literal(Literal::Number(1.0)));
    let ExprKind::Binary { op, .. } = right.kind else {
        panic!("expected binary right operand");
    };
    assert_eq!(op, BinaryOp::Mul);
}

#[test]
fn binary_operators_fold_left() {
    let expr = parse("a - b - c");
    let ExprKind::Binary { op, left, right } = expr.kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::Sub);
    assert_eq!(right.kind, ExprKind::Variable("c".into()));
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
}

#[test]
fn logical_operators_bind_looser_than_equality() {
    let expr = parse("a or b and c == d");
    let ExprKind::Logical { op, right, .. } = expr.kind else {
        panic!("expected logical root");
    };
    assert_eq!(op, LogicalOp::Or);
    let ExprKind::Logical { op, right, .. } = right.kind else {
        panic!("expected logical and");
    };
    assert_eq!(op, LogicalOp::And);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Equal, .. }));
}

#[test]
fn calls_bind_tighter_than_unary_operators() {
    let expr = parse("-f(1)");
    let ExprKind::Unary { op, expr: operand } = expr.kind else {
        panic!("expected unary root");
    };
    assert_eq!(op, UnaryOp::Negate);
    assert!(matches!(operand.kind, ExprKind::Call { .. }));
}

#[test]
fn parses_grouping_and_chained_calls() {
    let expr = parse("(f)(1)(2, 3)");
    let ExprKind::Call {
        callee,
        args,
        paren,
    } = expr.kind
    else {
        panic!("expected call root");
    };
    assert_eq!(args.len(), 2);
    assert_eq!(paren.kind, TokenKind::RParen);
    let ExprKind::Call { callee, args, .. } = callee.kind else {
        panic!("expected inner call");
    };
    assert_eq!(args.len(), 1);
    assert!(matches!(callee.kind, ExprKind::Group(_)));
}

#[test]
fn spans_cover_the_expression() {
    let expr = parse("  foo(1, 2)  ");
    assert_eq!((expr.span.start, expr.span.end), (2, 11));
    assert_eq!(expr.line, 1);
}

#[test]
fn rejects_too_many_arguments_before_parsing_the_ninth() {
    let args = (1..=MAX_CALL_ARGUMENTS)
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    assert!(parser::parse_source(&format!("f({args})")).is_ok());

    let diag = parser::parse_source(&format!("f({args}, )")).expect_err("ninth argument");
    assert_eq!(diag.kind, DiagnosticKind::Syntax);
    assert!(diag.message.contains("too many arguments"));
}

#[test]
fn syntax_errors_cite_the_offending_lexeme() {
    let diag = parser::parse_source("1 + ]").expect_err("bracket");
    assert_eq!(diag.kind, DiagnosticKind::Syntax);
    assert_eq!(diag.message, "expected expression, found `]`");

    let diag = parser::parse_source("(1\n2)").expect_err("missing paren");
    assert_eq!(diag.message, "expected `)` after expression, found `2`");
    assert_eq!(diag.line, Some(2));

    let diag = parser::parse_source("1 ;").expect_err("trailing semicolon");
    assert_eq!(diag.message, "expected end of expression, found `;`");
}

#[test]
fn parse_accepts_tokens_without_trailing_eof() {
    let mut tokens = lexer::scan("1 + 2").expect("scan should succeed");
    tokens.pop();
    let expr = parser::parse(tokens).expect("parse should succeed");
    assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
}
