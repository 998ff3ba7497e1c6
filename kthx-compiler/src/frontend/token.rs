use std::fmt;

/// Why the lexer rejected a piece of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    UnrecognizedToken,
    UnexpectedToken,
    CompilerError,
    UnterminatedMultiLineComment,
    UnterminatedString,
    Unknown,
}

impl fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalReason::UnrecognizedToken => write!(f, "Unrecognized token"),
            IllegalReason::UnexpectedToken => write!(f, "Unexpected token"),
            IllegalReason::CompilerError => write!(f, "Compiler error"),
            IllegalReason::UnterminatedMultiLineComment => {
                write!(f, "Unterminated multi-line comment")
            }
            IllegalReason::UnterminatedString => write!(f, "Unterminated string"),
            IllegalReason::Unknown => write!(f, "Unknown error"),
        }
    }
}

/// One lexical token. Reserved words get a variant each; the payload
/// variants carry their lexeme (numbers) or decoded content (strings).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    Comma,
    Exclamation,
    Question,
    Newline,
    Illegal(IllegalReason),

    SingleLineComment,
    MultiLineComment(String),

    NumberLiteral(String),
    NumbarLiteral(String),
    StringLiteral(String),
    Win,
    Fail,

    // type keywords
    Number,
    Numbar,
    Troof,
    Yarn,
    Noob,

    // reserved words
    Hai,
    Kthxbye,
    I,
    Has,
    A,
    R,
    Itz,
    An,
    Sum,
    Of,
    Diff,
    Produkt,
    Quoshunt,
    Mod,
    Biggr,
    Smallr,
    Both,
    Either,
    Won,
    Not,
    All,
    Any,
    Mkay,
    Saem,
    Diffrint,
    Smoosh,
    Maek,
    Is,
    Now,
    Visible,
    Gimmeh,
    It,
    O,
    Rly,
    Ya,
    No,
    Wai,
    Oic,
    Mebbe,
    Wtf,
    Omg,
    Gtfo,
    Omgwtf,
    Im,
    Yr,
    In,
    Til,
    Wile,
    Outta,
    How,
    Iz,
    If,
    U,
    Say,
    So,

    Identifier(String),
}

impl Token {
    /// Looks a scanned word up in the reserved-word table.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "WIN" => Token::Win,
            "FAIL" => Token::Fail,
            "NUMBER" => Token::Number,
            "NUMBAR" => Token::Numbar,
            "TROOF" => Token::Troof,
            "YARN" => Token::Yarn,
            "NOOB" => Token::Noob,
            "HAI" => Token::Hai,
            "KTHXBYE" => Token::Kthxbye,
            "I" => Token::I,
            "HAS" => Token::Has,
            "A" => Token::A,
            "R" => Token::R,
            "ITZ" => Token::Itz,
            "AN" => Token::An,
            "SUM" => Token::Sum,
            "OF" => Token::Of,
            "DIFF" => Token::Diff,
            "PRODUKT" => Token::Produkt,
            "QUOSHUNT" => Token::Quoshunt,
            "MOD" => Token::Mod,
            "BIGGR" => Token::Biggr,
            "SMALLR" => Token::Smallr,
            "BOTH" => Token::Both,
            "EITHER" => Token::Either,
            "WON" => Token::Won,
            "NOT" => Token::Not,
            "ALL" => Token::All,
            "ANY" => Token::Any,
            "MKAY" => Token::Mkay,
            "SAEM" => Token::Saem,
            "DIFFRINT" => Token::Diffrint,
            "SMOOSH" => Token::Smoosh,
            "MAEK" => Token::Maek,
            "IS" => Token::Is,
            "NOW" => Token::Now,
            "VISIBLE" => Token::Visible,
            "GIMMEH" => Token::Gimmeh,
            "IT" => Token::It,
            "O" => Token::O,
            "RLY" => Token::Rly,
            "YA" => Token::Ya,
            "NO" => Token::No,
            "WAI" => Token::Wai,
            "OIC" => Token::Oic,
            "MEBBE" => Token::Mebbe,
            "WTF" => Token::Wtf,
            "OMG" => Token::Omg,
            "GTFO" => Token::Gtfo,
            "OMGWTF" => Token::Omgwtf,
            "IM" => Token::Im,
            "YR" => Token::Yr,
            "IN" => Token::In,
            "TIL" => Token::Til,
            "WILE" => Token::Wile,
            "OUTTA" => Token::Outta,
            "HOW" => Token::How,
            "IZ" => Token::Iz,
            "IF" => Token::If,
            "U" => Token::U,
            "SAY" => Token::Say,
            "SO" => Token::So,
            _ => return None,
        };
        Some(token)
    }

    /// Compares token kinds, ignoring payloads.
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            Token::Number | Token::Numbar | Token::Troof | Token::Yarn | Token::Noob
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Comma => write!(f, "','"),
            Token::Exclamation => write!(f, "'!'"),
            Token::Question => write!(f, "'?'"),
            Token::Newline => write!(f, "newline"),
            Token::Illegal(reason) => write!(f, "illegal token ({})", reason),
            Token::SingleLineComment => write!(f, "comment"),
            Token::MultiLineComment(_) => write!(f, "comment"),
            Token::NumberLiteral(text) => write!(f, "NUMBER {}", text),
            Token::NumbarLiteral(text) => write!(f, "NUMBAR {}", text),
            Token::StringLiteral(text) => write!(f, "YARN \"{}\"", text),
            Token::Win => write!(f, "WIN"),
            Token::Fail => write!(f, "FAIL"),
            Token::Number => write!(f, "NUMBER"),
            Token::Numbar => write!(f, "NUMBAR"),
            Token::Troof => write!(f, "TROOF"),
            Token::Yarn => write!(f, "YARN"),
            Token::Noob => write!(f, "NOOB"),
            Token::Hai => write!(f, "HAI"),
            Token::Kthxbye => write!(f, "KTHXBYE"),
            Token::I => write!(f, "I"),
            Token::Has => write!(f, "HAS"),
            Token::A => write!(f, "A"),
            Token::R => write!(f, "R"),
            Token::Itz => write!(f, "ITZ"),
            Token::An => write!(f, "AN"),
            Token::Sum => write!(f, "SUM"),
            Token::Of => write!(f, "OF"),
            Token::Diff => write!(f, "DIFF"),
            Token::Produkt => write!(f, "PRODUKT"),
            Token::Quoshunt => write!(f, "QUOSHUNT"),
            Token::Mod => write!(f, "MOD"),
            Token::Biggr => write!(f, "BIGGR"),
            Token::Smallr => write!(f, "SMALLR"),
            Token::Both => write!(f, "BOTH"),
            Token::Either => write!(f, "EITHER"),
            Token::Won => write!(f, "WON"),
            Token::Not => write!(f, "NOT"),
            Token::All => write!(f, "ALL"),
            Token::Any => write!(f, "ANY"),
            Token::Mkay => write!(f, "MKAY"),
            Token::Saem => write!(f, "SAEM"),
            Token::Diffrint => write!(f, "DIFFRINT"),
            Token::Smoosh => write!(f, "SMOOSH"),
            Token::Maek => write!(f, "MAEK"),
            Token::Is => write!(f, "IS"),
            Token::Now => write!(f, "NOW"),
            Token::Visible => write!(f, "VISIBLE"),
            Token::Gimmeh => write!(f, "GIMMEH"),
            Token::It => write!(f, "IT"),
            Token::O => write!(f, "O"),
            Token::Rly => write!(f, "RLY"),
            Token::Ya => write!(f, "YA"),
            Token::No => write!(f, "NO"),
            Token::Wai => write!(f, "WAI"),
            Token::Oic => write!(f, "OIC"),
            Token::Mebbe => write!(f, "MEBBE"),
            Token::Wtf => write!(f, "WTF"),
            Token::Omg => write!(f, "OMG"),
            Token::Gtfo => write!(f, "GTFO"),
            Token::Omgwtf => write!(f, "OMGWTF"),
            Token::Im => write!(f, "IM"),
            Token::Yr => write!(f, "YR"),
            Token::In => write!(f, "IN"),
            Token::Til => write!(f, "TIL"),
            Token::Wile => write!(f, "WILE"),
            Token::Outta => write!(f, "OUTTA"),
            Token::How => write!(f, "HOW"),
            Token::Iz => write!(f, "IZ"),
            Token::If => write!(f, "IF"),
            Token::U => write!(f, "U"),
            Token::Say => write!(f, "SAY"),
            Token::So => write!(f, "SO"),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
        }
    }
}

/// A token plus its `[start, end)` byte span and its position in the
/// emitted token sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct LexedToken {
    pub token: Token,
    pub start: usize,
    pub end: usize,
    pub index: usize,
}
