//! Tokenizer for the Icinga 2 configuration DSL.
//!
//! Built on logos with callbacks for the three constructs a regex alone
//! can't finish: `"..."` string literals, `{{{ ... }}}` multiline blocks,
//! and `/* ... */` comments. Comments are consumed here and never reach the
//! downstream stages; everything else becomes a [`Token`] carrying its
//! 1-based source line and column.
//!
//! The lexer is deliberately forgiving. An unterminated string stops at the
//! end of its line and is emitted with `terminated: false` so the balancer
//! can report it while the rest of the file still gets scanned. The single
//! unrecoverable condition is a `{{{` block left open at end of file: that
//! consumes everything after the opener, so [`tokenize`] returns the tokens
//! produced up to that point plus a [`LexError`] naming the opening line.

use logos::{Lexer, Logos};
use thiserror::Error;

/// Unrecoverable lexer failure: a multiline block was still open at EOF.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unterminated multiline block starting at line {line}")]
pub struct LexError {
    /// 1-based line of the `{{{` opener.
    pub line: usize,
}

/// What a token is, after comment stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword (`object`, `Host`, `vars`, ...).
    Ident,
    /// Number, optionally with a unit suffix (`5`, `1.5`, `30s`).
    Number,
    /// `"..."` string literal. `terminated` is false when the closing
    /// quote was missing at end of line (or end of file).
    Str { terminated: bool },
    /// `{{{ ... }}}` multiline block, fully closed.
    Multiline,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    /// `=`
    Assign,
    /// `+=`, `-=`, `*=`, `/=`
    CompoundAssign,
    /// `=>`
    FatArrow,
    Dot,
    Comma,
    Semicolon,
    Newline,
    /// Any other operator run (`&&`, `!`, `*`, ...).
    Op,
    /// Bytes the lexer has no class for. Kept so later stages can name the
    /// offending text in a diagnostic instead of silently dropping it.
    Other,
    /// A `/*` that never closed; the rest of the file was consumed as
    /// comment. The balancer turns this into an `unclosed comment` report.
    UnclosedComment,
}

/// One lexical token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the token's first byte.
    pub line: usize,
    /// 1-based byte column of the token's first byte.
    pub column: usize,
}

impl Token {
    /// The contents of a string literal, without the surrounding quotes.
    ///
    /// Escapes are left as written; object names with escape sequences in
    /// them compare byte-for-byte, which is all duplicate detection needs.
    pub fn string_value(&self) -> &str {
        let inner = self.text.strip_prefix('"').unwrap_or(&self.text);
        inner.strip_suffix('"').unwrap_or(inner)
    }
}

/// Result of tokenizing one file: the tokens produced, plus the lex error
/// when the stream was truncated by an unterminated multiline block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub error: Option<LexError>,
}

impl Lexed {
    /// True when the lexer reached the real end of the file.
    pub fn reached_eof(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
#[logos(skip(r"#[^\n]*", allow_greedy = true))]
enum RawToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?[A-Za-z]*")]
    Number,

    // Field is true when the closing delimiter was found.
    #[token("\"", lex_string)]
    Str(bool),

    #[token("{{{", lex_multiline)]
    Multiline(bool),

    #[token("/*", lex_block_comment)]
    BlockComment(bool),

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[token("=")]
    Assign,
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    CompoundAssign,
    #[token("=>")]
    FatArrow,

    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("\n")]
    Newline,

    #[regex(r"[-+*/<>!&|%?:@$^~]+", priority = 1)]
    Op,
}

/// Consume a string literal after its opening quote.
///
/// Stops at the closing quote, or at end of line / end of file when the
/// literal is unterminated. `\"` does not close the literal; a backslash
/// at the end of the line does not continue it onto the next.
fn lex_string(lex: &mut Lexer<RawToken>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                    break;
                }
                i += 2;
            }
            b'"' => {
                lex.bump(i + 1);
                return true;
            }
            b'\n' => break,
            _ => i += 1,
        }
    }
    lex.bump(i.min(bytes.len()));
    false
}

/// Consume a `{{{ ... }}}` block after its opener.
fn lex_multiline(lex: &mut Lexer<RawToken>) -> bool {
    match lex.remainder().find("}}}") {
        Some(end) => {
            lex.bump(end + 3);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Consume a `/* ... */` comment after its opener. Runs to end of file when
/// the terminator is missing.
fn lex_block_comment(lex: &mut Lexer<RawToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Byte-offset to line/column mapping for one source text.
struct LineIndex {
    /// Byte offset of the start of each line, ascending; starts[0] == 0.
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// 1-based (line, column) of a byte offset.
    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset);
        let col = offset - self.starts[line - 1] + 1;
        (line, col)
    }
}

/// Tokenize one file's text.
///
/// Always returns the tokens produced so far; `error` is set only when an
/// unterminated multiline block truncated the stream.
pub fn tokenize(source: &str) -> Lexed {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.locate(span.start);
        let kind = match result {
            Ok(RawToken::Ident) => TokenKind::Ident,
            Ok(RawToken::Number) => TokenKind::Number,
            Ok(RawToken::Str(terminated)) => TokenKind::Str { terminated },
            Ok(RawToken::Multiline(true)) => TokenKind::Multiline,
            Ok(RawToken::Multiline(false)) => {
                return Lexed {
                    tokens,
                    error: Some(LexError { line }),
                };
            }
            Ok(RawToken::BlockComment(true)) => continue,
            Ok(RawToken::BlockComment(false)) => TokenKind::UnclosedComment,
            Ok(RawToken::LBrace) => TokenKind::LBrace,
            Ok(RawToken::RBrace) => TokenKind::RBrace,
            Ok(RawToken::LBracket) => TokenKind::LBracket,
            Ok(RawToken::RBracket) => TokenKind::RBracket,
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Ok(RawToken::Assign) => TokenKind::Assign,
            Ok(RawToken::CompoundAssign) => TokenKind::CompoundAssign,
            Ok(RawToken::FatArrow) => TokenKind::FatArrow,
            Ok(RawToken::Dot) => TokenKind::Dot,
            Ok(RawToken::Comma) => TokenKind::Comma,
            Ok(RawToken::Semicolon) => TokenKind::Semicolon,
            Ok(RawToken::Newline) => TokenKind::Newline,
            Ok(RawToken::Op) => TokenKind::Op,
            Err(()) => TokenKind::Other,
        };
        tokens.push(Token {
            kind,
            text: lexer.slice().to_string(),
            line,
            column,
        });
    }

    Lexed {
        tokens,
        error: None,
    }
}
