//! Single‑pass lexer turning Lox source bytes into [`Token`]s.
//!
//! [`Scanner`] is a `FusedIterator` yielding `Result<Token, LoxError>`: a bad
//! character produces an `Err` item and scanning carries on with the next
//! byte, so one pass reports every lexical problem.  Exactly one `EOF` token
//! closes the stream.  [`Scanner::scan_tokens`] drains the iterator into
//! either the full token list or the full error list.
//!
//! Positions are 1‑based.  Columns count bytes from the start of the line,
//! and string literals may span lines.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let source = b"print 123; // example";
//! let mut scanner = Scanner::new(source);
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("Lex error: {}", err),
//!     }
//! }
//! ```

use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::error::{LoxError, Position, Result, Span};
use crate::token::{Token, TokenType};

/// Reserved words, resolved with a compile‑time perfect hash.
static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

pub struct Scanner<'a> {
    src: &'a [u8],
    start: usize,        // first byte of the lexeme being scanned
    curr: usize,         // next byte to examine
    line: usize,         // current line, 1‑based
    line_start: usize,   // offset of the first byte on `line`
    start_pos: Position, // where the current lexeme begins
    done: bool,          // EOF token already emitted
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            line_start: 0,
            start_pos: Position::new(1, 1),
            done: false,
        }
    }

    /// Drain the scanner.  Returns every token (ending with `EOF`) or, if any
    /// character could not be scanned, every lexical error of the pass.
    pub fn scan_tokens(self) -> std::result::Result<Vec<Token>, Vec<LoxError>> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut errors: Vec<LoxError> = Vec::new();

        for result in self {
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
        }

        info!(
            "Scan finished: {} token(s), {} error(s)",
            tokens.len(),
            errors.len()
        );

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }

    // ───────────────────────────── byte cursor ─────────────────────────────

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Consume one byte.  Callers check [`Self::is_at_end`] first.
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past the end.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.src.get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.src.get(self.curr + 1).copied().unwrap_or(0)
    }

    /// Consume the next byte only if it is `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.curr += 1;
            true
        } else {
            false
        }
    }

    /// `long` when the next byte is `=`, otherwise `short`.
    #[inline(always)]
    fn with_equal(&mut self, long: TokenType, short: TokenType) -> TokenType {
        if self.match_byte(b'=') {
            long
        } else {
            short
        }
    }

    /// Call after consuming a `\n`.
    #[inline(always)]
    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.curr;
    }

    /// Span from the lexeme start to the last consumed byte.
    fn lexeme_span(&self) -> Span {
        let end = Position::new(self.line, self.curr.saturating_sub(self.line_start).max(1));
        Span::new(self.start_pos, end)
    }

    // ───────────────────────────── recognisers ─────────────────────────────

    /// Scan one lexeme starting at `self.start`.  `Ok(None)` means it was
    /// whitespace or a comment.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let tt = match self.advance() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.with_equal(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equal(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equal(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equal(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' => {
                if !self.match_byte(b'/') {
                    return Ok(Some(TokenType::SLASH));
                }

                // Jump to the newline; it is consumed on the next call so
                // line tracking stays in one place.
                self.curr = match memchr(b'\n', &self.src[self.curr..]) {
                    Some(offset) => self.curr + offset,
                    None => self.src.len(),
                };
                return Ok(None);
            }

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.newline();
                return Ok(None);
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => return Err(self.unexpected_character()),
        };

        Ok(Some(tt))
    }

    fn unexpected_character(&mut self) -> LoxError {
        // Swallow UTF‑8 continuation bytes so the whole character is named.
        while !self.is_at_end() && (self.peek() & 0b1100_0000) == 0b1000_0000 {
            self.curr += 1;
        }

        let ch = String::from_utf8_lossy(&self.src[self.start..self.curr]);

        LoxError::lex(
            self.lexeme_span(),
            format!("Unexpected character: '{}'", ch),
        )
    }

    /// Body of a `"…"` literal; the opening quote is already consumed.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.newline();
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.lexeme_span(), "Unterminated string."));
        }

        self.curr += 1; // closing quote

        let body: &[u8] = &self.src[self.start + 1..self.curr - 1];
        Ok(TokenType::STRING(String::from_utf8_lossy(body).into_owned()))
    }

    /// `123` or `123.45`; a trailing `.` is left for the next token.
    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.curr += 1;
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.curr += 1;
            while self.peek().is_ascii_digit() {
                self.curr += 1;
            }
        }

        // Only ASCII digits and one dot were consumed, so both steps succeed.
        let n: f64 = std::str::from_utf8(&self.src[self.start..self.curr])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0.0);

        TokenType::NUMBER(n)
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.peek(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.curr += 1;
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.curr;
            self.start_pos = Position::new(self.line, self.curr - self.line_start + 1);

            match self.scan_token() {
                Ok(Some(tt)) => {
                    let lexeme = String::from_utf8_lossy(&self.src[self.start..self.curr]);
                    debug!("Scanned token ({:?}) at {:?}", tt, self.start_pos);

                    return Some(Ok(Token::new(
                        tt,
                        lexeme,
                        self.start_pos.line,
                        self.start_pos.column,
                    )));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;
        let column = self.curr - self.line_start + 1;
        Some(Ok(Token::new(TokenType::EOF, "", self.line, column)))
    }
}

impl FusedIterator for Scanner<'_> {}
