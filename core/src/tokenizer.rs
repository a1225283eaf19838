// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical scanner for SGF byte streams
//!
//! The tokenizer reads from any `std::io::Read` through a fixed-size buffer
//! that is refilled on demand, so arbitrarily large match files never have
//! to be resident in memory. Bytes are decoded one-to-one into chars
//! (Latin-1 transparent); charset re-encoding happens later, when text
//! properties are cooked.

use std::io::Read;

use crate::errors::SgfError;
use crate::CancelToken;

const BUF_SIZE: usize = 8192;

/// Lexical token kinds produced by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `(` opening a game tree
    LParen,
    /// `)` closing a game tree
    RParen,
    /// `;` starting a node
    Semicolon,
    /// `[` opening a property value
    LBracket,
    /// `]` closing a property value
    RBracket,
    /// Maximal run of `A`-`Z`
    PropIdent(String),
    /// Bracketed value payload with its lexical classification
    Value {
        /// Unescaped, newline-normalized value text
        text: String,
        /// Number / Real / Text classification
        kind: ValueKind,
    },
    /// End of stream
    Eof,
}

/// Lexical classification of a bracketed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Anything that is not a plain decimal literal
    Text,
    /// Optional sign followed by digits
    Number,
    /// Optional sign, digits, `.`, digits
    Real,
}

/// A token together with its source position
///
/// Lines are 1-based, columns 0-based at the start of the token, matching
/// the `LINE:COL: message` diagnostic format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u64,
    pub col: u64,
}

impl Token {
    fn new(kind: TokenKind, line: u64, col: u64) -> Self {
        Self { kind, line, col }
    }

    /// Short description used in "expected X" diagnostics
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::PropIdent(id) => format!("property '{}'", id),
            TokenKind::Value { text, .. } => format!("value '{}'", text),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

/// Incremental scanner over an SGF byte stream
pub struct Tokenizer<R: Read> {
    reader: R,
    buf: [u8; BUF_SIZE],
    pos: usize,
    len: usize,
    eof: bool,
    line: u64,
    col: u64,
    in_value: bool,
    cancel: CancelToken,
}

impl<R: Read> Tokenizer<R> {
    /// Create a scanner over the given stream
    pub fn new(reader: R) -> Self {
        Self::with_cancel(reader, CancelToken::new())
    }

    /// Create a scanner that checks the token at every buffer refill
    pub fn with_cancel(reader: R, cancel: CancelToken) -> Self {
        Self {
            reader,
            buf: [0; BUF_SIZE],
            pos: 0,
            len: 0,
            eof: false,
            line: 1,
            col: 0,
            in_value: false,
            cancel,
        }
    }

    /// Current 1-based line
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Current 0-based column
    pub fn col(&self) -> u64 {
        self.col
    }

    fn refill(&mut self) -> Result<(), SgfError> {
        if self.cancel.is_cancelled() {
            return Err(SgfError::Cancelled);
        }
        let n = self.reader.read(&mut self.buf)?;
        self.pos = 0;
        self.len = n;
        if n == 0 {
            self.eof = true;
        }
        Ok(())
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, SgfError> {
        if self.pos >= self.len {
            if self.eof {
                return Ok(None);
            }
            self.refill()?;
            if self.len == 0 {
                return Ok(None);
            }
        }
        Ok(Some(self.buf[self.pos]))
    }

    /// Consume one byte without any position bookkeeping
    fn bump(&mut self) {
        self.pos += 1;
        self.col += 1;
    }

    /// Consume a newline of any flavor (LF, CR, CRLF, LFCR) as one line break
    fn bump_newline(&mut self, first: u8) -> Result<(), SgfError> {
        self.pos += 1;
        let pair = if first == b'\r' { b'\n' } else { b'\r' };
        if self.peek_byte()? == Some(pair) {
            self.pos += 1;
        }
        self.line += 1;
        self.col = 0;
        Ok(())
    }

    /// Produce the next token
    pub fn next_token(&mut self) -> Result<Token, SgfError> {
        if self.in_value {
            return self.lex_value();
        }

        loop {
            let b = match self.peek_byte()? {
                Some(b) => b,
                None => return Ok(Token::new(TokenKind::Eof, self.line, self.col)),
            };

            let (line, col) = (self.line, self.col);
            match b {
                b' ' | b'\t' | 0x0b | 0x0c => self.bump(),
                b'\n' | b'\r' => self.bump_newline(b)?,
                b'(' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::LParen, line, col));
                }
                b')' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::RParen, line, col));
                }
                b';' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::Semicolon, line, col));
                }
                b'[' => {
                    self.bump();
                    self.in_value = true;
                    return Ok(Token::new(TokenKind::LBracket, line, col));
                }
                b']' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::RBracket, line, col));
                }
                b'A'..=b'Z' => {
                    let mut id = String::new();
                    while let Some(c @ b'A'..=b'Z') = self.peek_byte()? {
                        id.push(c as char);
                        self.bump();
                    }
                    return Ok(Token::new(TokenKind::PropIdent(id), line, col));
                }
                0x00..=0x1f | 0x7f..=0xff => {
                    return Err(SgfError::syntax(
                        line,
                        col,
                        format!("illegal binary character 0x{:02x}", b),
                    ));
                }
                _ => {
                    return Err(SgfError::syntax(
                        line,
                        col,
                        format!("unexpected character '{}'", b as char),
                    ));
                }
            }
        }
    }

    /// Lex the payload between `[` and `]`
    ///
    /// Escapes are resolved here: a backslash makes the following character
    /// literal, an escaped newline is a soft line break and disappears.
    /// Unescaped tab, vertical tab and form feed normalize to one space;
    /// newlines of any flavor normalize to `\n`.
    fn lex_value(&mut self) -> Result<Token, SgfError> {
        let (line, col) = (self.line, self.col);

        // Immediate ']' is the empty value; hand the bracket straight back.
        if self.peek_byte()? == Some(b']') {
            self.bump();
            self.in_value = false;
            return Ok(Token::new(TokenKind::RBracket, line, col));
        }

        let mut text = String::new();
        loop {
            let b = match self.peek_byte()? {
                Some(b) => b,
                None => {
                    return Err(SgfError::syntax(
                        self.line,
                        self.col,
                        "unexpected end of file in property value",
                    ))
                }
            };
            match b {
                b']' => break, // closing bracket is its own token
                b'\\' => {
                    self.bump();
                    match self.peek_byte()? {
                        None => {
                            return Err(SgfError::syntax(
                                self.line,
                                self.col,
                                "unexpected end of file in property value",
                            ))
                        }
                        Some(nl @ (b'\n' | b'\r')) => self.bump_newline(nl)?,
                        Some(other) => {
                            text.push(other as char);
                            self.bump();
                        }
                    }
                }
                b'\n' | b'\r' => {
                    self.bump_newline(b)?;
                    text.push('\n');
                }
                b'\t' | 0x0b | 0x0c => {
                    self.bump();
                    text.push(' ');
                }
                _ => {
                    text.push(b as char);
                    self.bump();
                }
            }
        }

        self.in_value = false;
        let kind = classify(&text);
        Ok(Token::new(TokenKind::Value { text, kind }, line, col))
    }
}

/// Classify a value payload as Number, Real or Text
///
/// Equivalent to matching `^[+-]?[0-9]+(\.[0-9]+)?$`: a dot makes it Real,
/// no dot makes it Number, anything else is Text.
pub(crate) fn classify(text: &str) -> ValueKind {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return ValueKind::Text;
    }
    if i == bytes.len() {
        return ValueKind::Number;
    }
    if bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i > frac_start && i == bytes.len() {
            return ValueKind::Real;
        }
    }
    ValueKind::Text
}
