use crate::frontend::token::LexedToken;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// An identifier with its originating token.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub token: LexedToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKeyword {
    Number,
    Numbar,
    Troof,
    Yarn,
    Noob,
}

impl fmt::Display for TypeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKeyword::Number => "NUMBER",
            TypeKeyword::Numbar => "NUMBAR",
            TypeKeyword::Troof => "TROOF",
            TypeKeyword::Yarn => "YARN",
            TypeKeyword::Noob => "NOOB",
        };
        write!(f, "{}", name)
    }
}

/// A type keyword with its originating token.
#[derive(Debug, Clone)]
pub struct TypeAnnotation {
    pub ty: TypeKeyword,
    pub token: LexedToken,
}

#[derive(Debug, Clone)]
pub enum AssignTarget {
    Variable(Ident),
    /// `I HAS A x ITZ NUMBER` immediately followed by `R <expr>`: the
    /// trailing declaration is rewritten into the assignment's target.
    Declaration {
        ident: Ident,
        ty: Option<TypeAnnotation>,
    },
}

impl AssignTarget {
    pub fn ident(&self) -> &Ident {
        match self {
            AssignTarget::Variable(ident) => ident,
            AssignTarget::Declaration { ident, .. } => ident,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    Declare {
        ident: Ident,
        ty: Option<TypeAnnotation>,
    },
    Assign {
        target: AssignTarget,
        value: Expr,
    },
    /// `x IS NOW A <type>` in-place cast.
    Cast {
        ident: Ident,
        ty: TypeAnnotation,
    },
    Visible {
        keyword: LexedToken,
        args: Vec<Expr>,
        /// A trailing `!` suppresses the implicit newline.
        suppress_newline: bool,
    },
    Gimmeh {
        keyword: LexedToken,
        ident: Ident,
    },
    /// The KTHXBYE program-end marker.
    End {
        keyword: LexedToken,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Sum,
    Diff,
    Produkt,
    Quoshunt,
    Mod,
    Biggr,
    Smallr,
}

impl ArithOp {
    pub fn keyword_name(&self) -> &'static str {
        match self {
            ArithOp::Sum => "SUM",
            ArithOp::Diff => "DIFF",
            ArithOp::Produkt => "PRODUKT",
            ArithOp::Quoshunt => "QUOSHUNT",
            ArithOp::Mod => "MOD",
            ArithOp::Biggr => "BIGGR",
            ArithOp::Smallr => "SMALLR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Both,
    Either,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    BothSaem,
    Diffrint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaryOp {
    All,
    Any,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        token: LexedToken,
    },
    Numbar {
        token: LexedToken,
    },
    Yarn {
        token: LexedToken,
    },
    Troof {
        token: LexedToken,
    },
    Variable {
        ident: Ident,
    },
    Arith {
        op: ArithOp,
        keyword: LexedToken,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Bool {
        op: BoolOp,
        keyword: LexedToken,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not {
        keyword: LexedToken,
        operand: Box<Expr>,
    },
    /// Variadic ALL OF / ANY OF, MKAY-terminated.
    Nary {
        op: NaryOp,
        keyword: LexedToken,
        operands: Vec<Expr>,
    },
    Cmp {
        op: CmpOp,
        keyword: LexedToken,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// String concatenation, MKAY-terminated.
    Smoosh {
        keyword: LexedToken,
        operands: Vec<Expr>,
    },
    /// `MAEK <expr> A <type>` cast expression.
    Maek {
        keyword: LexedToken,
        operand: Box<Expr>,
        ty: TypeAnnotation,
    },
}

impl Expr {
    /// The token a diagnostic about this expression should point at.
    pub fn token(&self) -> &LexedToken {
        match self {
            Expr::Number { token } => token,
            Expr::Numbar { token } => token,
            Expr::Yarn { token } => token,
            Expr::Troof { token } => token,
            Expr::Variable { ident } => &ident.token,
            Expr::Arith { keyword, .. } => keyword,
            Expr::Bool { keyword, .. } => keyword,
            Expr::Not { keyword, .. } => keyword,
            Expr::Nary { keyword, .. } => keyword,
            Expr::Cmp { keyword, .. } => keyword,
            Expr::Smoosh { keyword, .. } => keyword,
            Expr::Maek { keyword, .. } => keyword,
        }
    }
}
