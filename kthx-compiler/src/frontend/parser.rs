use crate::frontend::ast::{
    ArithOp, AssignTarget, BoolOp, CmpOp, Expr, Ident, NaryOp, Program, Stmt, TypeAnnotation,
    TypeKeyword,
};
use crate::frontend::token::{LexedToken, Token};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub token: LexedToken,
    /// Recursive-descent depth at which the error was recorded.
    pub level: usize,
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

/// Parses a token sequence produced by [`crate::frontend::lexer::lex`].
/// Always returns; every uncovered problem is described in `errors`.
pub fn parse(tokens: Vec<LexedToken>) -> ParseOutcome {
    Parser::new(tokens).run()
}

/// Backtracking recursive descent. Productions capture the cursor on
/// entry and `reset` to it on failure; `consumed` tracks which tokens a
/// successful consume touched so speculative errors can be filtered out
/// after the fact.
struct Parser {
    tokens: Vec<LexedToken>,
    current: usize,
    consumed: Vec<bool>,
    errors: Vec<ParseError>,
    level: usize,
    stmts: Vec<Stmt>,
}

impl Parser {
    fn new(tokens: Vec<LexedToken>) -> Self {
        let consumed = vec![false; tokens.len()];
        Parser {
            tokens,
            current: 0,
            consumed,
            errors: Vec::new(),
            level: 0,
            stmts: Vec::new(),
        }
    }

    fn run(mut self) -> ParseOutcome {
        self.parse_program();
        let errors = self.filter_errors();
        ParseOutcome {
            program: Program {
                statements: self.stmts,
            },
            errors,
        }
    }

    // ── cursor primitives ───────────────────────────────────────────────

    fn peek(&self) -> &LexedToken {
        &self.tokens[self.current]
    }

    fn peek_ahead(&self, amount: usize) -> &LexedToken {
        let at = (self.current + amount).min(self.tokens.len() - 1);
        &self.tokens[at]
    }

    fn previous(&self) -> LexedToken {
        self.tokens[self.current - 1].clone()
    }

    fn at_end(&self) -> bool {
        matches!(self.peek().token, Token::Eof)
    }

    fn check(&self, kind: &Token) -> bool {
        self.peek().token.same_kind(kind)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.consumed[self.current] = true;
            self.current += 1;
        }
    }

    fn consume(&mut self, kind: &Token) -> Option<LexedToken> {
        if self.check(kind) {
            self.advance();
            Some(self.previous())
        } else {
            None
        }
    }

    fn consume_identifier(&mut self) -> Option<Ident> {
        if let Token::Identifier(name) = &self.peek().token {
            let name = name.clone();
            self.advance();
            Some(Ident {
                name,
                token: self.previous(),
            })
        } else {
            None
        }
    }

    fn consume_type_keyword(&mut self) -> Option<TypeAnnotation> {
        let ty = match self.peek().token {
            Token::Number => TypeKeyword::Number,
            Token::Numbar => TypeKeyword::Numbar,
            Token::Troof => TypeKeyword::Troof,
            Token::Yarn => TypeKeyword::Yarn,
            Token::Noob => TypeKeyword::Noob,
            _ => return None,
        };
        self.advance();
        Some(TypeAnnotation {
            ty,
            token: self.previous(),
        })
    }

    /// The backtracking primitive: restores the cursor and clears the
    /// consumed flags of everything the failed attempt touched.
    fn reset(&mut self, start: usize) {
        for flag in &mut self.consumed[start..self.current] {
            *flag = false;
        }
        self.current = start;
    }

    /// Consumes a statement terminator: a run of newlines, or one comma.
    fn consume_ending(&mut self) -> bool {
        if self.check(&Token::Newline) {
            while self.check(&Token::Newline) {
                self.advance();
            }
            return true;
        }
        if self.check(&Token::Comma) {
            self.advance();
            return true;
        }
        false
    }

    /// Newlines are permitted (and skipped) before operands inside an
    /// operator expression.
    fn skip_operand_newlines(&mut self) {
        while self.check(&Token::Newline) {
            self.advance();
        }
    }

    // ── error recording and filtering ───────────────────────────────────

    fn record(&mut self, message: impl Into<String>) {
        let token = self.peek().clone();
        self.errors.push(ParseError {
            message: message.into(),
            token,
            level: self.level,
        });
    }

    fn filter_errors(&self) -> Vec<ParseError> {
        // a token that was eventually consumed means the failure that
        // pointed at it was speculative
        let mut kept: Vec<&ParseError> = self
            .errors
            .iter()
            .filter(|e| !self.consumed.get(e.token.index).copied().unwrap_or(false))
            .collect();

        // sibling alternatives record at the same depth; when several of
        // them failed, none of them is the story
        let mut per_level: HashMap<usize, usize> = HashMap::new();
        for error in &kept {
            *per_level.entry(error.level).or_insert(0) += 1;
        }
        kept.retain(|e| e.level <= 1 || per_level.get(&e.level) == Some(&1));

        // an error farther along the token stream means another attempt
        // made more progress; shallower failures behind it are covered
        if let Some(farthest) = kept.iter().map(|e| e.token.index).max() {
            kept.retain(|e| e.token.index == farthest);
        }

        kept.into_iter().cloned().collect()
    }

    // ── program and statements ──────────────────────────────────────────

    fn parse_program(&mut self) {
        self.level += 1;

        if self.consume(&Token::Hai).is_none() {
            self.record("Expected HAI token to start program");
            self.level -= 1;
            return;
        }

        let version = match &self.peek().token {
            Token::NumbarLiteral(text) => Some(text.clone()),
            _ => None,
        };
        match version {
            Some(text) if text.parse::<f32>() == Ok(1.2) => self.advance(),
            Some(_) => {
                self.record("Expected version 1.2");
                self.level -= 1;
                return;
            }
            None => {
                self.record("Expected valid version numbar");
                self.level -= 1;
                return;
            }
        }

        if !self.consume_ending() {
            self.record("Expected comma or newline to end statement");
            self.level -= 1;
            return;
        }

        while !self.at_end() {
            match self.parse_statement() {
                Some(stmt) => self.stmts.push(stmt),
                // the statement recorded its own diagnostic
                None => {
                    self.level -= 1;
                    return;
                }
            }
        }

        if !matches!(self.stmts.last(), Some(Stmt::End { .. })) {
            self.record("Expected KTHXBYE statement to end program");
        }
        self.level -= 1;
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        self.level += 1;
        let stmt = self.statement_alternatives();
        self.level -= 1;
        stmt
    }

    fn statement_alternatives(&mut self) -> Option<Stmt> {
        if let Some((ident, ty)) = self.parse_declaration() {
            // a following R turns this declaration into the target of the
            // next assignment statement
            if !self.check(&Token::R) && !self.consume_ending() && !self.at_end() {
                self.record("Expected comma or newline to end statement");
                return None;
            }
            return Some(Stmt::Declare { ident, ty });
        }

        if let Some(stmt) = self.parse_assignment() {
            if !self.consume_ending() && !self.at_end() {
                self.record("Expected comma or newline to end statement");
                return None;
            }
            return Some(stmt);
        }

        if let Some(stmt) = self.parse_cast() {
            if !self.consume_ending() && !self.at_end() {
                self.record("Expected comma or newline to end statement");
                return None;
            }
            return Some(stmt);
        }

        if let Some(keyword) = self.consume(&Token::Kthxbye) {
            if !self.consume_ending() && !self.at_end() {
                self.record("Expected comma or newline to end statement");
                return None;
            }
            return Some(Stmt::End { keyword });
        }

        if let Some(stmt) = self.parse_visible() {
            // visible consumes its own terminator
            return Some(stmt);
        }

        if let Some(stmt) = self.parse_gimmeh() {
            if !self.consume_ending() && !self.at_end() {
                self.record("Expected comma or newline to end statement");
                return None;
            }
            return Some(stmt);
        }

        if let Some(expr) = self.parse_expression() {
            if !self.consume_ending() && !self.at_end() {
                self.record("Expected comma or newline to end statement");
                return None;
            }
            return Some(Stmt::Expression { expr });
        }

        self.record("Expected valid statement");
        None
    }

    fn parse_declaration(&mut self) -> Option<(Ident, Option<TypeAnnotation>)> {
        self.level += 1;
        let start = self.current;

        if self.consume(&Token::I).is_none() {
            self.record("Expected I keyword to declare variable");
            self.level -= 1;
            return None;
        }
        if self.consume(&Token::Has).is_none() {
            self.record("Expected HAS keyword to declare variable");
            self.reset(start);
            self.level -= 1;
            return None;
        }
        if self.consume(&Token::A).is_none() {
            self.record("Expected A keyword to declare variable");
            self.reset(start);
            self.level -= 1;
            return None;
        }

        let ident = match self.consume_identifier() {
            Some(ident) => ident,
            None => {
                self.record("Expected identifier for variable declaration");
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        let ty = if self.consume(&Token::Itz).is_some() {
            match self.consume_type_keyword() {
                Some(annotation) => Some(annotation),
                None => {
                    self.record("Expected valid type for variable declaration");
                    self.reset(start);
                    self.level -= 1;
                    return None;
                }
            }
        } else {
            None
        };

        self.level -= 1;
        Some((ident, ty))
    }

    fn parse_assignment(&mut self) -> Option<Stmt> {
        self.level += 1;
        let start = self.current;

        enum Lhs {
            Ident(Ident),
            PendingDeclaration,
        }

        let lhs = match self.consume_identifier() {
            Some(ident) => Lhs::Ident(ident),
            None if matches!(self.stmts.last(), Some(Stmt::Declare { .. })) => {
                Lhs::PendingDeclaration
            }
            None => {
                self.record("Expected identifier or variable declaration for variable assignment");
                self.level -= 1;
                return None;
            }
        };

        if self.consume(&Token::R).is_none() {
            self.record("Expected R keyword to assign variable");
            self.reset(start);
            self.level -= 1;
            return None;
        }

        let value = match self.parse_expression() {
            Some(expr) => expr,
            None => {
                self.record("Expected valid expression for variable assignment");
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        let target = match lhs {
            Lhs::Ident(ident) => AssignTarget::Variable(ident),
            Lhs::PendingDeclaration => match self.stmts.pop() {
                Some(Stmt::Declare { ident, ty }) => AssignTarget::Declaration { ident, ty },
                other => {
                    // guarded above; restore whatever we popped and bail
                    if let Some(stmt) = other {
                        self.stmts.push(stmt);
                    }
                    self.reset(start);
                    self.level -= 1;
                    return None;
                }
            },
        };

        self.level -= 1;
        Some(Stmt::Assign { target, value })
    }

    fn parse_cast(&mut self) -> Option<Stmt> {
        self.level += 1;
        let start = self.current;

        let ident = match self.consume_identifier() {
            Some(ident) => ident,
            None => {
                self.record("Expected identifier for variable cast");
                self.level -= 1;
                return None;
            }
        };
        if self.consume(&Token::Is).is_none() {
            self.record("Expected IS keyword for variable cast");
            self.reset(start);
            self.level -= 1;
            return None;
        }
        if self.consume(&Token::Now).is_none() {
            self.record("Expected NOW keyword for variable cast");
            self.reset(start);
            self.level -= 1;
            return None;
        }
        if self.consume(&Token::A).is_none() {
            self.record("Expected A keyword for variable cast");
            self.reset(start);
            self.level -= 1;
            return None;
        }
        let ty = match self.consume_type_keyword() {
            Some(annotation) => annotation,
            None => {
                self.record("Expected valid type for variable cast");
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        self.level -= 1;
        Some(Stmt::Cast { ident, ty })
    }

    fn parse_visible(&mut self) -> Option<Stmt> {
        self.level += 1;
        let start = self.current;

        let keyword = match self.consume(&Token::Visible) {
            Some(keyword) => keyword,
            None => {
                self.record("Expected VISIBLE keyword to output to console");
                self.level -= 1;
                return None;
            }
        };

        let mut args = Vec::new();
        let mut ended = false;
        loop {
            if self.at_end() {
                break;
            }
            let expr = match self.parse_expression() {
                Some(expr) => expr,
                None => {
                    self.record("Expected valid expression for VISIBLE statement");
                    self.reset(start);
                    self.level -= 1;
                    return None;
                }
            };
            args.push(expr);
            if self.consume_ending() {
                ended = true;
                break;
            }
            if self.check(&Token::Exclamation) {
                break;
            }
        }

        let mut suppress_newline = false;
        if !ended && self.consume(&Token::Exclamation).is_some() {
            suppress_newline = true;
            if !self.consume_ending() && !self.at_end() {
                self.record("Expected comma or newline to end statement");
                self.reset(start);
                self.level -= 1;
                return None;
            }
        }

        self.level -= 1;
        Some(Stmt::Visible {
            keyword,
            args,
            suppress_newline,
        })
    }

    fn parse_gimmeh(&mut self) -> Option<Stmt> {
        self.level += 1;
        let start = self.current;

        let keyword = match self.consume(&Token::Gimmeh) {
            Some(keyword) => keyword,
            None => {
                self.record("Expected GIMMEH keyword to get input");
                self.level -= 1;
                return None;
            }
        };
        let ident = match self.consume_identifier() {
            Some(ident) => ident,
            None => {
                self.record("Expected identifier for GIMMEH statement");
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        self.level -= 1;
        Some(Stmt::Gimmeh { keyword, ident })
    }

    // ── expressions ─────────────────────────────────────────────────────

    fn parse_expression(&mut self) -> Option<Expr> {
        self.level += 1;
        let expr = self.expression_alternatives();
        self.level -= 1;
        expr
    }

    fn expression_alternatives(&mut self) -> Option<Expr> {
        match self.peek().token {
            Token::NumberLiteral(_) => {
                self.advance();
                Some(Expr::Number {
                    token: self.previous(),
                })
            }
            Token::NumbarLiteral(_) => {
                self.advance();
                Some(Expr::Numbar {
                    token: self.previous(),
                })
            }
            Token::StringLiteral(_) => {
                self.advance();
                Some(Expr::Yarn {
                    token: self.previous(),
                })
            }
            Token::Win | Token::Fail => {
                self.advance();
                Some(Expr::Troof {
                    token: self.previous(),
                })
            }
            Token::Identifier(_) => self.consume_identifier().map(|ident| Expr::Variable { ident }),
            Token::Sum => self.parse_arith(ArithOp::Sum),
            Token::Diff => self.parse_arith(ArithOp::Diff),
            Token::Produkt => self.parse_arith(ArithOp::Produkt),
            Token::Quoshunt => self.parse_arith(ArithOp::Quoshunt),
            Token::Mod => self.parse_arith(ArithOp::Mod),
            Token::Biggr => self.parse_arith(ArithOp::Biggr),
            Token::Smallr => self.parse_arith(ArithOp::Smallr),
            // BOTH OF vs BOTH SAEM disambiguates on the next word
            Token::Both => {
                if self.peek_ahead(1).token.same_kind(&Token::Saem) {
                    self.parse_cmp(CmpOp::BothSaem)
                } else {
                    self.parse_bool(BoolOp::Both, "BOTH")
                }
            }
            Token::Either => self.parse_bool(BoolOp::Either, "EITHER"),
            Token::Won => self.parse_bool(BoolOp::Won, "WON"),
            Token::Not => self.parse_not(),
            Token::All => self.parse_nary(NaryOp::All, "ALL OF"),
            Token::Any => self.parse_nary(NaryOp::Any, "ANY OF"),
            Token::Diffrint => self.parse_cmp(CmpOp::Diffrint),
            Token::Smoosh => self.parse_smoosh(),
            Token::Maek => self.parse_maek(),
            _ => {
                self.record("Expected valid expression");
                None
            }
        }
    }

    fn parse_operand(&mut self, construct: &str) -> Option<Expr> {
        self.skip_operand_newlines();
        match self.parse_expression() {
            Some(expr) => Some(expr),
            None => {
                self.record(format!("Expected valid expression for {construct}"));
                None
            }
        }
    }

    fn parse_arith(&mut self, op: ArithOp) -> Option<Expr> {
        self.level += 1;
        let start = self.current;
        let name = op.keyword_name();

        self.advance();
        let keyword = self.previous();

        if self.consume(&Token::Of).is_none() {
            self.record(format!("Expected OF keyword for {name}"));
            self.reset(start);
            self.level -= 1;
            return None;
        }
        let left = match self.parse_operand(name) {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };
        if self.consume(&Token::An).is_none() {
            self.record(format!("Expected AN keyword for {name}"));
            self.reset(start);
            self.level -= 1;
            return None;
        }
        let right = match self.parse_operand(name) {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        self.level -= 1;
        Some(Expr::Arith {
            op,
            keyword,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_bool(&mut self, op: BoolOp, name: &str) -> Option<Expr> {
        self.level += 1;
        let start = self.current;

        self.advance();
        let keyword = self.previous();

        if self.consume(&Token::Of).is_none() {
            self.record(format!("Expected OF keyword for {name}"));
            self.reset(start);
            self.level -= 1;
            return None;
        }
        let left = match self.parse_operand(name) {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };
        if self.consume(&Token::An).is_none() {
            self.record(format!("Expected AN keyword for {name}"));
            self.reset(start);
            self.level -= 1;
            return None;
        }
        let right = match self.parse_operand(name) {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        self.level -= 1;
        Some(Expr::Bool {
            op,
            keyword,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_cmp(&mut self, op: CmpOp) -> Option<Expr> {
        self.level += 1;
        let start = self.current;

        let name = match op {
            CmpOp::BothSaem => "BOTH SAEM",
            CmpOp::Diffrint => "DIFFRINT",
        };

        self.advance();
        let keyword = self.previous();

        match op {
            CmpOp::BothSaem => {
                if self.consume(&Token::Saem).is_none() {
                    self.record("Expected SAEM keyword for BOTH SAEM");
                    self.reset(start);
                    self.level -= 1;
                    return None;
                }
            }
            CmpOp::Diffrint => {
                if self.consume(&Token::Of).is_none() {
                    self.record("Expected OF keyword for DIFFRINT");
                    self.reset(start);
                    self.level -= 1;
                    return None;
                }
            }
        }

        let left = match self.parse_operand(name) {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };
        if self.consume(&Token::An).is_none() {
            self.record(format!("Expected AN keyword for {name}"));
            self.reset(start);
            self.level -= 1;
            return None;
        }
        let right = match self.parse_operand(name) {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        self.level -= 1;
        Some(Expr::Cmp {
            op,
            keyword,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_not(&mut self) -> Option<Expr> {
        self.level += 1;
        let start = self.current;

        self.advance();
        let keyword = self.previous();

        let operand = match self.parse_operand("NOT") {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        self.level -= 1;
        Some(Expr::Not {
            keyword,
            operand: Box::new(operand),
        })
    }

    fn parse_nary(&mut self, op: NaryOp, name: &str) -> Option<Expr> {
        self.level += 1;
        let start = self.current;

        self.advance();
        let keyword = self.previous();

        if self.consume(&Token::Of).is_none() {
            self.record(format!("Expected OF keyword for {name}"));
            self.reset(start);
            self.level -= 1;
            return None;
        }

        let mut operands = Vec::new();
        loop {
            let operand = match self.parse_operand(name) {
                Some(expr) => expr,
                None => {
                    self.reset(start);
                    self.level -= 1;
                    return None;
                }
            };
            operands.push(operand);

            if self.consume(&Token::Mkay).is_some() {
                break;
            }
            if self.consume(&Token::An).is_none() {
                self.record(format!("Expected AN or MKAY keyword for {name}"));
                self.reset(start);
                self.level -= 1;
                return None;
            }
        }

        self.level -= 1;
        Some(Expr::Nary {
            op,
            keyword,
            operands,
        })
    }

    fn parse_smoosh(&mut self) -> Option<Expr> {
        self.level += 1;
        let start = self.current;

        self.advance();
        let keyword = self.previous();

        let mut operands = Vec::new();
        loop {
            let operand = match self.parse_operand("SMOOSH") {
                Some(expr) => expr,
                None => {
                    self.reset(start);
                    self.level -= 1;
                    return None;
                }
            };
            operands.push(operand);

            if self.consume(&Token::Mkay).is_some() {
                break;
            }
            if self.consume(&Token::An).is_none() {
                self.record("Expected AN or MKAY keyword for SMOOSH");
                self.reset(start);
                self.level -= 1;
                return None;
            }
        }

        self.level -= 1;
        Some(Expr::Smoosh { keyword, operands })
    }

    fn parse_maek(&mut self) -> Option<Expr> {
        self.level += 1;
        let start = self.current;

        self.advance();
        let keyword = self.previous();

        let operand = match self.parse_operand("MAEK") {
            Some(expr) => expr,
            None => {
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };
        if self.consume(&Token::A).is_none() {
            self.record("Expected A keyword for MAEK");
            self.reset(start);
            self.level -= 1;
            return None;
        }
        let ty = match self.consume_type_keyword() {
            Some(annotation) => annotation,
            None => {
                self.record("Expected valid type for MAEK");
                self.reset(start);
                self.level -= 1;
                return None;
            }
        };

        self.level -= 1;
        Some(Expr::Maek {
            keyword,
            operand: Box::new(operand),
            ty,
        })
    }
}
