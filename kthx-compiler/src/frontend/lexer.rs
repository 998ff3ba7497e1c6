use crate::frontend::token::{IllegalReason, LexedToken, Token};

/// Byte-cursor scanner. `pos` is the current byte, `read_pos` the
/// look-ahead byte; malformed input becomes `Illegal` tokens in-sequence
/// and scanning continues.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    read_pos: usize,
    ch: u8,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Self {
            src: source.as_bytes(),
            pos: 0,
            read_pos: 0,
            ch: 0,
        };
        lexer.read_ch();
        lexer
    }

    fn read_ch(&mut self) {
        self.pos = self.read_pos;
        self.ch = self.src.get(self.read_pos).copied().unwrap_or(0);
        self.read_pos = self.read_pos.saturating_add(1);
    }

    fn peek_ch(&self) -> u8 {
        self.src.get(self.read_pos).copied().unwrap_or(0)
    }

    fn rest_starts_with(&self, needle: &[u8]) -> bool {
        let at = self.read_pos.min(self.src.len());
        self.src[at..].starts_with(needle)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let len = self.src.len();
        String::from_utf8_lossy(&self.src[start.min(len)..end.min(len)]).into_owned()
    }

    fn skip_whitespace(&mut self) {
        while self.ch == b' ' || self.ch == b'\t' {
            self.read_ch();
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        let mut is_float = false;
        loop {
            let next = self.peek_ch();
            if next.is_ascii_digit() {
                self.read_ch();
            } else if next == b'.' {
                if is_float {
                    // a second '.' ends the literal without being consumed
                    break;
                }
                is_float = true;
                self.read_ch();
            } else {
                break;
            }
        }
        let text = self.slice(start, self.read_pos);
        if is_float {
            Token::NumbarLiteral(text)
        } else {
            Token::NumberLiteral(text)
        }
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while self.peek_ch().is_ascii_alphanumeric() || self.peek_ch() == b'_' {
            self.read_ch();
        }
        let word = self.slice(start, self.read_pos);
        if word == "BTW" {
            return Token::SingleLineComment;
        }
        if word == "OBTW" {
            return self.read_multiline_comment();
        }
        Token::keyword(&word).unwrap_or(Token::Identifier(word))
    }

    fn read_multiline_comment(&mut self) -> Token {
        let mut payload = Vec::new();
        loop {
            self.read_ch();
            if self.ch == 0 {
                return Token::Illegal(IllegalReason::UnterminatedMultiLineComment);
            }
            if self.ch == b'T' && self.rest_starts_with(b"LDR") {
                self.read_ch();
                self.read_ch();
                self.read_ch();
                return Token::MultiLineComment(String::from_utf8_lossy(&payload).into_owned());
            }
            payload.push(self.ch);
        }
    }

    fn read_string(&mut self) -> Token {
        let mut value = Vec::new();
        loop {
            self.read_ch();
            match self.ch {
                b'"' => return Token::StringLiteral(String::from_utf8_lossy(&value).into_owned()),
                0 | b'\n' | b'\r' => return Token::Illegal(IllegalReason::UnterminatedString),
                b':' => {
                    self.read_ch();
                    match self.ch {
                        0 | b'\n' | b'\r' => {
                            return Token::Illegal(IllegalReason::UnterminatedString)
                        }
                        b')' => value.push(b'\n'),
                        b'>' => value.push(b'\t'),
                        b'o' => value.push(0x07),
                        // covers :" and :: and any byte without a special meaning
                        other => value.push(other),
                    }
                }
                other => value.push(other),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        loop {
            match self.peek_ch() {
                0 | b'\n' | b'\r' => break,
                _ => self.read_ch(),
            }
        }
    }

    pub fn next_token(&mut self) -> LexedToken {
        self.skip_whitespace();
        let start = self.pos.min(self.src.len());

        let token = match self.ch {
            b'0'..=b'9' => self.read_number(),
            b'-' if self.peek_ch().is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() || c == b'_' => self.read_word(),
            b'"' => self.read_string(),
            b',' => Token::Comma,
            b'!' => Token::Exclamation,
            b'?' => Token::Question,
            b'\n' | b'\r' => Token::Newline,
            0 => Token::Eof,
            b'-' => Token::Illegal(IllegalReason::UnexpectedToken),
            _ => Token::Illegal(IllegalReason::UnrecognizedToken),
        };

        if let Token::SingleLineComment = token {
            self.skip_line_comment();
        }

        let end = self.read_pos.min(self.src.len());
        self.read_ch();

        LexedToken {
            token,
            start,
            end,
            index: 0,
        }
    }
}

/// Tokenizes a whole source buffer. Comment tokens are dropped, `newline`
/// tokens are preserved, and the sequence ends with exactly one `eof`.
pub fn lex(source: &str) -> Vec<LexedToken> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let lexed = lexer.next_token();
        let at_eof = matches!(lexed.token, Token::Eof);
        match lexed.token {
            Token::SingleLineComment | Token::MultiLineComment(_) => {}
            _ => tokens.push(lexed),
        }
        if at_eof {
            break;
        }
    }

    // indices refer to positions in the emitted sequence, after comment
    // stripping
    for (index, token) in tokens.iter_mut().enumerate() {
        token.index = index;
    }

    tokens
}

pub fn has_errors(tokens: &[LexedToken]) -> bool {
    tokens
        .iter()
        .any(|t| matches!(t.token, Token::Illegal(_)))
}

pub fn first_error(tokens: &[LexedToken]) -> Option<&LexedToken> {
    tokens
        .iter()
        .find(|t| matches!(t.token, Token::Illegal(_)))
}
