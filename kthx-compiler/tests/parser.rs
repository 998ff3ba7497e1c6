use kthx_compiler::frontend::ast::{
    ArithOp, AssignTarget, BoolOp, CmpOp, Expr, NaryOp, Stmt, TypeKeyword,
};
use kthx_compiler::frontend::lexer::lex;
use kthx_compiler::frontend::parser::{parse, ParseOutcome};
use kthx_compiler::frontend::token::{IllegalReason, Token};

fn parse_src(source: &str) -> ParseOutcome {
    parse(lex(source))
}

fn parse_clean(source: &str) -> Vec<Stmt> {
    let outcome = parse_src(source);
    assert!(
        outcome.errors.is_empty(),
        "unexpected errors: {:?}",
        outcome.errors
    );
    outcome.program.statements
}

// ── well-formed programs ─────────────────────────────────────────────────

#[test]
fn minimal_program() {
    let stmts = parse_clean("HAI 1.2\nKTHXBYE\n");
    assert_eq!(stmts.len(), 1);
    assert!(matches!(stmts[0], Stmt::End { .. }));
}

#[test]
fn declaration_with_type() {
    let stmts = parse_clean("HAI 1.2\nI HAS A x ITZ NUMBER\nKTHXBYE");
    assert!(matches!(
        &stmts[0],
        Stmt::Declare { ident, ty: Some(annotation) }
            if ident.name == "x" && annotation.ty == TypeKeyword::Number
    ));
}

#[test]
fn declaration_without_type() {
    let stmts = parse_clean("HAI 1.2\nI HAS A x\nKTHXBYE");
    assert!(matches!(&stmts[0], Stmt::Declare { ident, ty: None } if ident.name == "x"));
}

#[test]
fn comma_is_a_statement_terminator() {
    let stmts = parse_clean("HAI 1.2, I HAS A x ITZ NUMBER, KTHXBYE");
    assert_eq!(stmts.len(), 2);
}

#[test]
fn assignment_to_variable() {
    let stmts = parse_clean("HAI 1.2\nI HAS A x ITZ NUMBER\nx R 5\nKTHXBYE");
    assert!(matches!(
        &stmts[1],
        Stmt::Assign { target: AssignTarget::Variable(ident), .. } if ident.name == "x"
    ));
}

#[test]
fn declaration_rewrites_into_assignment_target_same_line() {
    let stmts = parse_clean("HAI 1.2\nI HAS A x ITZ NUMBER R 5\nKTHXBYE");
    assert_eq!(stmts.len(), 2);
    assert!(matches!(
        &stmts[0],
        Stmt::Assign { target: AssignTarget::Declaration { ident, .. }, .. } if ident.name == "x"
    ));
}

#[test]
fn declaration_rewrites_into_assignment_target_next_line() {
    let stmts = parse_clean("HAI 1.2\nI HAS A x ITZ YARN\nR \"hello\"\nKTHXBYE");
    assert_eq!(stmts.len(), 2);
    assert!(matches!(
        &stmts[0],
        Stmt::Assign { target: AssignTarget::Declaration { ident, .. }, .. } if ident.name == "x"
    ));
}

#[test]
fn cast_statement() {
    let stmts = parse_clean("HAI 1.2\nI HAS A x ITZ NUMBER\nx IS NOW A YARN\nKTHXBYE");
    assert!(matches!(
        &stmts[1],
        Stmt::Cast { ident, ty } if ident.name == "x" && ty.ty == TypeKeyword::Yarn
    ));
}

#[test]
fn visible_with_multiple_args() {
    let stmts = parse_clean("HAI 1.2\nVISIBLE 1 2 \"three\"\nKTHXBYE");
    assert!(matches!(
        &stmts[0],
        Stmt::Visible { args, suppress_newline: false, .. } if args.len() == 3
    ));
}

#[test]
fn visible_with_exclamation_suppresses_newline() {
    let stmts = parse_clean("HAI 1.2\nVISIBLE \"hi\"!\nKTHXBYE");
    assert!(matches!(
        &stmts[0],
        Stmt::Visible { suppress_newline: true, .. }
    ));
}

#[test]
fn gimmeh_statement() {
    let stmts = parse_clean("HAI 1.2\nI HAS A line ITZ YARN\nGIMMEH line\nKTHXBYE");
    assert!(matches!(&stmts[1], Stmt::Gimmeh { ident, .. } if ident.name == "line"));
}

// ── expression grammar ───────────────────────────────────────────────────

fn first_expr(source: &str) -> Expr {
    let stmts = parse_clean(source);
    match &stmts[0] {
        Stmt::Expression { expr } => expr.clone(),
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn nested_arithmetic() {
    let expr = first_expr("HAI 1.2\nSUM OF PRODUKT OF 2 AN 3 AN 4\nKTHXBYE");
    match expr {
        Expr::Arith {
            op: ArithOp::Sum,
            left,
            ..
        } => {
            assert!(matches!(
                *left,
                Expr::Arith {
                    op: ArithOp::Produkt,
                    ..
                }
            ));
        }
        other => panic!("expected SUM, got {:?}", other),
    }
}

#[test]
fn both_of_vs_both_saem_lookahead() {
    let bool_expr = first_expr("HAI 1.2\nBOTH OF WIN AN FAIL\nKTHXBYE");
    assert!(matches!(
        bool_expr,
        Expr::Bool {
            op: BoolOp::Both,
            ..
        }
    ));

    let cmp_expr = first_expr("HAI 1.2\nBOTH SAEM 1 AN 2\nKTHXBYE");
    assert!(matches!(
        cmp_expr,
        Expr::Cmp {
            op: CmpOp::BothSaem,
            ..
        }
    ));
}

#[test]
fn diffrint_takes_of() {
    let expr = first_expr("HAI 1.2\nDIFFRINT OF 1 AN 2\nKTHXBYE");
    assert!(matches!(
        expr,
        Expr::Cmp {
            op: CmpOp::Diffrint,
            ..
        }
    ));
}

#[test]
fn variadic_all_of_mkay() {
    let expr = first_expr("HAI 1.2\nALL OF WIN AN FAIL AN WIN MKAY\nKTHXBYE");
    assert!(matches!(
        expr,
        Expr::Nary { op: NaryOp::All, ref operands, .. } if operands.len() == 3
    ));
}

#[test]
fn smoosh_mkay() {
    let expr = first_expr("HAI 1.2\nSMOOSH \"a\" AN \"b\" MKAY\nKTHXBYE");
    assert!(matches!(
        expr,
        Expr::Smoosh { ref operands, .. } if operands.len() == 2
    ));
}

#[test]
fn maek_cast_expression() {
    let expr = first_expr("HAI 1.2\nMAEK 1 A NUMBAR\nKTHXBYE");
    assert!(matches!(
        expr,
        Expr::Maek { ref ty, .. } if ty.ty == TypeKeyword::Numbar
    ));
}

#[test]
fn newlines_allowed_before_operands() {
    let stmts = parse_clean("HAI 1.2\nVISIBLE SUM OF 1 AN\n2\nKTHXBYE");
    assert!(matches!(&stmts[0], Stmt::Visible { args, .. } if args.len() == 1));
}

#[test]
fn not_expression() {
    let expr = first_expr("HAI 1.2\nNOT WIN\nKTHXBYE");
    assert!(matches!(expr, Expr::Not { .. }));
}

// ── error recovery and filtering ─────────────────────────────────────────

#[test]
fn illegal_token_reports_single_statement_error() {
    let outcome = parse_src("HAI 1.2\n\"unterminated\nKTHXBYE");
    assert_eq!(outcome.errors.len(), 1, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.errors[0].message, "Expected valid statement");
    assert!(matches!(
        outcome.errors[0].token.token,
        Token::Illegal(IllegalReason::UnterminatedString)
    ));
}

#[test]
fn missing_an_reports_the_innermost_error() {
    let outcome = parse_src("HAI 1.2\nSUM OF 1\nKTHXBYE");
    assert_eq!(outcome.errors.len(), 1, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.errors[0].message, "Expected AN keyword for SUM");
    assert!(matches!(outcome.errors[0].token.token, Token::Newline));
}

#[test]
fn missing_an_inside_visible_still_wins() {
    let outcome = parse_src("HAI 1.2\nVISIBLE SUM OF 1\nKTHXBYE");
    assert_eq!(outcome.errors.len(), 1, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.errors[0].message, "Expected AN keyword for SUM");
}

#[test]
fn missing_end_marker() {
    let outcome = parse_src("HAI 1.2\nVISIBLE 1\n");
    assert_eq!(outcome.errors.len(), 1, "errors: {:?}", outcome.errors);
    assert_eq!(
        outcome.errors[0].message,
        "Expected KTHXBYE statement to end program"
    );
}

#[test]
fn wrong_version_is_rejected() {
    let outcome = parse_src("HAI 1.3\nKTHXBYE");
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].message, "Expected version 1.2");
}

#[test]
fn missing_hai_is_rejected() {
    let outcome = parse_src("KTHXBYE");
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].message,
        "Expected HAI token to start program"
    );
}

#[test]
fn kthxbye_mid_program_keeps_parsing() {
    let outcome = parse_src("HAI 1.2\nKTHXBYE\nVISIBLE 1\n");
    assert_eq!(outcome.program.statements.len(), 2);
    assert!(matches!(outcome.program.statements[0], Stmt::End { .. }));
    assert!(matches!(
        outcome.program.statements[1],
        Stmt::Visible { .. }
    ));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].message,
        "Expected KTHXBYE statement to end program"
    );
}

#[test]
fn junk_after_statement_is_one_error() {
    let outcome = parse_src("HAI 1.2\nI HAS A x ITZ NUMBER 5\nKTHXBYE");
    assert_eq!(outcome.errors.len(), 1, "errors: {:?}", outcome.errors);
    assert_eq!(
        outcome.errors[0].message,
        "Expected comma or newline to end statement"
    );
}

#[test]
fn reported_error_levels_are_unique() {
    for source in [
        "HAI 1.2\nSUM OF 1\nKTHXBYE",
        "HAI 1.2\n\"unterminated\nKTHXBYE",
        "HAI 1.2\nVISIBLE SUM OF 1\nKTHXBYE",
    ] {
        let outcome = parse_src(source);
        let mut levels: Vec<usize> = outcome.errors.iter().map(|e| e.level).collect();
        levels.sort_unstable();
        levels.dedup();
        assert_eq!(
            levels.len(),
            outcome.errors.len(),
            "duplicate levels for {:?}",
            source
        );
    }
}
