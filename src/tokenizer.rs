//! Silt tokenizer.
//!
//! Converts raw UTF-8 source bytes into the flat token stream consumed by
//! the parser. The tokenizer is a single-pass, byte-driven state machine
//! with no lookahead buffer and no allocation per token.
//!
//! ## Contract
//!
//! - Every call to [`Tokenizer::next_token`] yields exactly one token; the
//!   stream always ends with an [`Tag::Eof`] token whose `start` is the
//!   source length.
//! - Plain `//` comments (and `////` comments) are *skipped*: they produce
//!   no token at all. The renderer recovers them later by scanning the
//!   source bytes between two neighbouring tokens. Doc comments (`///`) and
//!   container doc comments (`//!`) are real tokens because declarations
//!   own them.
//! - A tokenizer re-seeded at any previously produced token's `start`
//!   offset reproduces that token. This is what allows the token stream to
//!   omit lengths entirely.
//!
//! Invalid bytes produce [`Tag::Invalid`] tokens instead of failing; the
//! parser turns those into diagnostics.

use crate::token::{keyword, ByteOffset, Tag, Token};

/// Tokenize an entire source buffer, including the trailing EOF token.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = token.tag == Tag::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

/// Byte-driven tokenizer state machine.
pub struct Tokenizer<'src> {
    buffer: &'src [u8],
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Identifier,
    Builtin,
    StringLiteral,
    StringLiteralBackslash,
    MultilineStringLiteralLine,
    CharLiteral,
    CharLiteralBackslash,
    Backslash,
    Equal,
    Bang,
    Pipe,
    Minus,
    MinusPercent,
    Asterisk,
    AsteriskPercent,
    Slash,
    LineCommentStart,
    LineComment,
    DocCommentStart,
    DocComment,
    ContainerDocComment,
    Plus,
    PlusPercent,
    Percent,
    Caret,
    Ampersand,
    Period,
    Period2,
    AngleBracketLeft,
    AngleBracketAngleBracketLeft,
    AngleBracketRight,
    AngleBracketAngleBracketRight,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        // Skip the UTF-8 BOM if present.
        let start = if source.as_bytes().starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Tokenizer {
            buffer: source.as_bytes(),
            index: start,
        }
    }

    /// Re-seed a tokenizer at a known token start, for lexeme recovery.
    pub fn at_offset(source: &'src str, offset: ByteOffset) -> Self {
        Tokenizer {
            buffer: source.as_bytes(),
            index: offset as usize,
        }
    }

    /// Current scan position, one past the end of the last token returned.
    pub fn index(&self) -> usize {
        self.index
    }

    fn byte(&self, index: usize) -> u8 {
        if index < self.buffer.len() {
            self.buffer[index]
        } else {
            0
        }
    }

    fn eof_token(&self) -> Token {
        Token {
            tag: Tag::Eof,
            start: self.buffer.len() as ByteOffset,
        }
    }

    pub fn next_token(&mut self) -> Token {
        let mut state = State::Start;
        let mut start = self.index;
        let mut tag = Tag::Eof;
        loop {
            let c = self.byte(self.index);
            match state {
                State::Start => match c {
                    0 => {
                        if self.index >= self.buffer.len() {
                            return self.eof_token();
                        }
                        // A stray NUL byte inside the buffer.
                        tag = Tag::Invalid;
                        self.index += 1;
                        break;
                    }
                    b' ' | b'\t' | b'\r' | b'\n' => {
                        self.index += 1;
                        start = self.index;
                    }
                    b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                        state = State::Identifier;
                        tag = Tag::Identifier;
                        self.index += 1;
                    }
                    b'0'..=b'9' => {
                        tag = self.scan_number();
                        break;
                    }
                    b'@' => {
                        if self.byte(self.index + 1) == b'"' {
                            // Quoted identifier: @"name".
                            tag = Tag::Identifier;
                            self.index += 2;
                            state = State::StringLiteral;
                        } else {
                            tag = Tag::Builtin;
                            self.index += 1;
                            state = State::Builtin;
                        }
                    }
                    b'"' => {
                        state = State::StringLiteral;
                        tag = Tag::StringLiteral;
                        self.index += 1;
                    }
                    b'\'' => {
                        state = State::CharLiteral;
                        tag = Tag::CharLiteral;
                        self.index += 1;
                    }
                    b'\\' => {
                        state = State::Backslash;
                        self.index += 1;
                    }
                    b'=' => {
                        state = State::Equal;
                        self.index += 1;
                    }
                    b'!' => {
                        state = State::Bang;
                        self.index += 1;
                    }
                    b'|' => {
                        state = State::Pipe;
                        self.index += 1;
                    }
                    b'-' => {
                        state = State::Minus;
                        self.index += 1;
                    }
                    b'*' => {
                        state = State::Asterisk;
                        self.index += 1;
                    }
                    b'/' => {
                        state = State::Slash;
                        self.index += 1;
                    }
                    b'+' => {
                        state = State::Plus;
                        self.index += 1;
                    }
                    b'%' => {
                        state = State::Percent;
                        self.index += 1;
                    }
                    b'^' => {
                        state = State::Caret;
                        self.index += 1;
                    }
                    b'&' => {
                        state = State::Ampersand;
                        self.index += 1;
                    }
                    b'.' => {
                        state = State::Period;
                        self.index += 1;
                    }
                    b'<' => {
                        state = State::AngleBracketLeft;
                        self.index += 1;
                    }
                    b'>' => {
                        state = State::AngleBracketRight;
                        self.index += 1;
                    }
                    b'(' => {
                        tag = Tag::LParen;
                        self.index += 1;
                        break;
                    }
                    b')' => {
                        tag = Tag::RParen;
                        self.index += 1;
                        break;
                    }
                    b'{' => {
                        tag = Tag::LBrace;
                        self.index += 1;
                        break;
                    }
                    b'}' => {
                        tag = Tag::RBrace;
                        self.index += 1;
                        break;
                    }
                    b'[' => {
                        tag = Tag::LBracket;
                        self.index += 1;
                        break;
                    }
                    b']' => {
                        tag = Tag::RBracket;
                        self.index += 1;
                        break;
                    }
                    b';' => {
                        tag = Tag::Semicolon;
                        self.index += 1;
                        break;
                    }
                    b',' => {
                        tag = Tag::Comma;
                        self.index += 1;
                        break;
                    }
                    b':' => {
                        tag = Tag::Colon;
                        self.index += 1;
                        break;
                    }
                    b'?' => {
                        tag = Tag::QuestionMark;
                        self.index += 1;
                        break;
                    }
                    b'~' => {
                        tag = Tag::Tilde;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Invalid;
                        self.index += 1;
                        break;
                    }
                },

                State::Identifier => match c {
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => self.index += 1,
                    _ => {
                        let text = std::str::from_utf8(&self.buffer[start..self.index]).unwrap();
                        if let Some(kw) = keyword(text) {
                            tag = kw;
                        }
                        break;
                    }
                },

                State::Builtin => match c {
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => self.index += 1,
                    _ => break,
                },

                State::StringLiteral => match c {
                    b'"' => {
                        self.index += 1;
                        break;
                    }
                    b'\\' => {
                        state = State::StringLiteralBackslash;
                        self.index += 1;
                    }
                    b'\n' | 0 => {
                        tag = Tag::Invalid;
                        break;
                    }
                    _ => self.index += 1,
                },

                State::StringLiteralBackslash => match c {
                    b'\n' | 0 => {
                        tag = Tag::Invalid;
                        break;
                    }
                    _ => {
                        state = State::StringLiteral;
                        self.index += 1;
                    }
                },

                State::CharLiteral => match c {
                    b'\'' => {
                        self.index += 1;
                        break;
                    }
                    b'\\' => {
                        state = State::CharLiteralBackslash;
                        self.index += 1;
                    }
                    b'\n' | 0 => {
                        tag = Tag::Invalid;
                        break;
                    }
                    _ => self.index += 1,
                },

                State::CharLiteralBackslash => match c {
                    b'\n' | 0 => {
                        tag = Tag::Invalid;
                        break;
                    }
                    _ => {
                        state = State::CharLiteral;
                        self.index += 1;
                    }
                },

                State::Backslash => match c {
                    b'\\' => {
                        state = State::MultilineStringLiteralLine;
                        tag = Tag::MultilineStringLiteralLine;
                        self.index += 1;
                    }
                    _ => {
                        tag = Tag::Invalid;
                        break;
                    }
                },

                State::MultilineStringLiteralLine => match c {
                    b'\n' | 0 => break,
                    _ => self.index += 1,
                },

                State::Equal => match c {
                    b'=' => {
                        tag = Tag::EqualEqual;
                        self.index += 1;
                        break;
                    }
                    b'>' => {
                        tag = Tag::EqualAngleBracketRight;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Equal;
                        break;
                    }
                },

                State::Bang => match c {
                    b'=' => {
                        tag = Tag::BangEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Bang;
                        break;
                    }
                },

                State::Pipe => match c {
                    b'|' => {
                        tag = Tag::PipePipe;
                        self.index += 1;
                        break;
                    }
                    b'=' => {
                        tag = Tag::PipeEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Pipe;
                        break;
                    }
                },

                State::Minus => match c {
                    b'=' => {
                        tag = Tag::MinusEqual;
                        self.index += 1;
                        break;
                    }
                    b'>' => {
                        tag = Tag::Arrow;
                        self.index += 1;
                        break;
                    }
                    b'%' => {
                        state = State::MinusPercent;
                        self.index += 1;
                    }
                    _ => {
                        tag = Tag::Minus;
                        break;
                    }
                },

                State::MinusPercent => match c {
                    b'=' => {
                        tag = Tag::MinusPercentEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::MinusPercent;
                        break;
                    }
                },

                State::Asterisk => match c {
                    b'=' => {
                        tag = Tag::AsteriskEqual;
                        self.index += 1;
                        break;
                    }
                    b'*' => {
                        tag = Tag::AsteriskAsterisk;
                        self.index += 1;
                        break;
                    }
                    b'%' => {
                        state = State::AsteriskPercent;
                        self.index += 1;
                    }
                    _ => {
                        tag = Tag::Asterisk;
                        break;
                    }
                },

                State::AsteriskPercent => match c {
                    b'=' => {
                        tag = Tag::AsteriskPercentEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::AsteriskPercent;
                        break;
                    }
                },

                State::Slash => match c {
                    b'/' => {
                        state = State::LineCommentStart;
                        self.index += 1;
                    }
                    b'=' => {
                        tag = Tag::SlashEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Slash;
                        break;
                    }
                },

                State::LineCommentStart => match c {
                    b'/' => {
                        state = State::DocCommentStart;
                        self.index += 1;
                    }
                    b'!' => {
                        state = State::ContainerDocComment;
                        tag = Tag::ContainerDocComment;
                        self.index += 1;
                    }
                    b'\n' => {
                        // Empty plain comment; skip it entirely.
                        state = State::Start;
                        self.index += 1;
                        start = self.index;
                        tag = Tag::Eof;
                    }
                    0 => return self.eof_token(),
                    _ => {
                        state = State::LineComment;
                        self.index += 1;
                    }
                },

                State::DocCommentStart => match c {
                    b'/' => {
                        // Four or more slashes is a plain comment.
                        state = State::LineComment;
                        self.index += 1;
                    }
                    b'\n' | 0 => {
                        // An empty doc comment: `///`.
                        tag = Tag::DocComment;
                        break;
                    }
                    _ => {
                        state = State::DocComment;
                        tag = Tag::DocComment;
                        self.index += 1;
                    }
                },

                State::DocComment | State::ContainerDocComment => match c {
                    b'\n' | 0 => break,
                    _ => self.index += 1,
                },

                State::LineComment => match c {
                    b'\n' => {
                        // The comment produces no token.
                        state = State::Start;
                        self.index += 1;
                        start = self.index;
                        tag = Tag::Eof;
                    }
                    0 => return self.eof_token(),
                    _ => self.index += 1,
                },

                State::Plus => match c {
                    b'=' => {
                        tag = Tag::PlusEqual;
                        self.index += 1;
                        break;
                    }
                    b'+' => {
                        tag = Tag::PlusPlus;
                        self.index += 1;
                        break;
                    }
                    b'%' => {
                        state = State::PlusPercent;
                        self.index += 1;
                    }
                    _ => {
                        tag = Tag::Plus;
                        break;
                    }
                },

                State::PlusPercent => match c {
                    b'=' => {
                        tag = Tag::PlusPercentEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::PlusPercent;
                        break;
                    }
                },

                State::Percent => match c {
                    b'=' => {
                        tag = Tag::PercentEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Percent;
                        break;
                    }
                },

                State::Caret => match c {
                    b'=' => {
                        tag = Tag::CaretEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Caret;
                        break;
                    }
                },

                State::Ampersand => match c {
                    b'=' => {
                        tag = Tag::AmpersandEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Ampersand;
                        break;
                    }
                },

                State::Period => match c {
                    b'.' => {
                        state = State::Period2;
                        self.index += 1;
                    }
                    b'*' => {
                        tag = Tag::PeriodAsterisk;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Period;
                        break;
                    }
                },

                State::Period2 => match c {
                    b'.' => {
                        tag = Tag::Ellipsis3;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::Ellipsis2;
                        break;
                    }
                },

                State::AngleBracketLeft => match c {
                    b'<' => {
                        state = State::AngleBracketAngleBracketLeft;
                        self.index += 1;
                    }
                    b'=' => {
                        tag = Tag::AngleBracketLeftEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::AngleBracketLeft;
                        break;
                    }
                },

                State::AngleBracketAngleBracketLeft => match c {
                    b'=' => {
                        tag = Tag::AngleBracketAngleBracketLeftEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::AngleBracketAngleBracketLeft;
                        break;
                    }
                },

                State::AngleBracketRight => match c {
                    b'>' => {
                        state = State::AngleBracketAngleBracketRight;
                        self.index += 1;
                    }
                    b'=' => {
                        tag = Tag::AngleBracketRightEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::AngleBracketRight;
                        break;
                    }
                },

                State::AngleBracketAngleBracketRight => match c {
                    b'=' => {
                        tag = Tag::AngleBracketAngleBracketRightEqual;
                        self.index += 1;
                        break;
                    }
                    _ => {
                        tag = Tag::AngleBracketAngleBracketRight;
                        break;
                    }
                },
            }
        }
        Token {
            tag,
            start: start as ByteOffset,
        }
    }

    /// Scan a number literal starting at the current index. The formatter
    /// never interprets the value, so digit validity is not checked here;
    /// the scan only has to agree with itself about where the lexeme ends.
    fn scan_number(&mut self) -> Tag {
        let mut tag = Tag::IntegerLiteral;
        let radix_prefix = self.byte(self.index) == b'0'
            && matches!(
                self.byte(self.index + 1),
                b'x' | b'X' | b'o' | b'O' | b'b' | b'B'
            );
        let hex = radix_prefix && matches!(self.byte(self.index + 1), b'x' | b'X');
        if radix_prefix {
            self.index += 2;
        } else {
            self.index += 1;
        }
        loop {
            match self.byte(self.index) {
                b'0'..=b'9' | b'_' => self.index += 1,
                b'e' | b'E' if !hex => {
                    // Decimal exponent, optionally signed.
                    tag = Tag::FloatLiteral;
                    self.index += 1;
                    if matches!(self.byte(self.index), b'+' | b'-') {
                        self.index += 1;
                    }
                }
                b'p' | b'P' if hex => {
                    // Hex float exponent, optionally signed.
                    tag = Tag::FloatLiteral;
                    self.index += 1;
                    if matches!(self.byte(self.index), b'+' | b'-') {
                        self.index += 1;
                    }
                }
                b'a'..=b'z' | b'A'..=b'Z' => self.index += 1,
                b'.' => {
                    // `1..2` is a range, not a float.
                    if self.byte(self.index + 1) == b'.' {
                        break;
                    }
                    if !self.byte(self.index + 1).is_ascii_digit()
                        && !(hex && self.byte(self.index + 1).is_ascii_hexdigit())
                    {
                        break;
                    }
                    tag = Tag::FloatLiteral;
                    self.index += 1;
                }
                _ => break,
            }
        }
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_tokens(source: &str, expected: &[Tag]) {
        let tokens = tokenize(source);
        let tags: Vec<Tag> = tokens.iter().map(|t| t.tag).collect();
        let mut want = expected.to_vec();
        want.push(Tag::Eof);
        assert_eq!(tags, want, "source: {:?}", source);
    }

    #[test]
    fn keywords_and_identifiers() {
        expect_tokens(
            "fn main() void {}",
            &[
                Tag::KeywordFn,
                Tag::Identifier,
                Tag::LParen,
                Tag::RParen,
                Tag::Identifier,
                Tag::LBrace,
                Tag::RBrace,
            ],
        );
    }

    #[test]
    fn compound_operators() {
        expect_tokens(
            "a +%= b >>= c <<= d",
            &[
                Tag::Identifier,
                Tag::PlusPercentEqual,
                Tag::Identifier,
                Tag::AngleBracketAngleBracketRightEqual,
                Tag::Identifier,
                Tag::AngleBracketAngleBracketLeftEqual,
                Tag::Identifier,
            ],
        );
    }

    #[test]
    fn double_asterisk_is_one_token() {
        expect_tokens(
            "var x: **u8;",
            &[
                Tag::KeywordVar,
                Tag::Identifier,
                Tag::Colon,
                Tag::AsteriskAsterisk,
                Tag::Identifier,
                Tag::Semicolon,
            ],
        );
    }

    #[test]
    fn range_is_not_a_float() {
        expect_tokens(
            "a[1..2]",
            &[
                Tag::Identifier,
                Tag::LBracket,
                Tag::IntegerLiteral,
                Tag::Ellipsis2,
                Tag::IntegerLiteral,
                Tag::RBracket,
            ],
        );
    }

    #[test]
    fn number_literals() {
        expect_tokens("0x10", &[Tag::IntegerLiteral]);
        expect_tokens("1_000", &[Tag::IntegerLiteral]);
        expect_tokens("1.5", &[Tag::FloatLiteral]);
        expect_tokens("1.5e-3", &[Tag::FloatLiteral]);
        expect_tokens("0x1p4", &[Tag::FloatLiteral]);
    }

    #[test]
    fn plain_comments_produce_no_tokens() {
        expect_tokens("// just a comment\n", &[]);
        expect_tokens("a // trailing\nb", &[Tag::Identifier, Tag::Identifier]);
        expect_tokens("//// four slashes\n", &[]);
    }

    #[test]
    fn doc_comments_are_tokens() {
        expect_tokens(
            "/// doc\nconst a = 1;",
            &[
                Tag::DocComment,
                Tag::KeywordConst,
                Tag::Identifier,
                Tag::Equal,
                Tag::IntegerLiteral,
                Tag::Semicolon,
            ],
        );
        expect_tokens("//! container doc\n", &[Tag::ContainerDocComment]);
    }

    #[test]
    fn string_and_char_literals() {
        expect_tokens("\"hi \\\" there\"", &[Tag::StringLiteral]);
        expect_tokens("'\\''", &[Tag::CharLiteral]);
        expect_tokens("'x'", &[Tag::CharLiteral]);
    }

    #[test]
    fn multiline_string_lines() {
        expect_tokens(
            "\\\\one\n\\\\two\n",
            &[
                Tag::MultilineStringLiteralLine,
                Tag::MultilineStringLiteralLine,
            ],
        );
    }

    #[test]
    fn quoted_identifier() {
        expect_tokens("@\"while\"", &[Tag::Identifier]);
        expect_tokens("@intCast", &[Tag::Builtin]);
    }

    #[test]
    fn eof_start_is_source_length() {
        let tokens = tokenize("ab");
        assert_eq!(tokens.last().unwrap().start, 2);
    }

    #[test]
    fn reseeding_reproduces_tokens() {
        let source = "const x = foo(1, 2);";
        let tokens = tokenize(source);
        for token in &tokens {
            if token.tag == Tag::Eof {
                continue;
            }
            let mut rescanner = Tokenizer::at_offset(source, token.start);
            let again = rescanner.next_token();
            assert_eq!(again.tag, token.tag);
            assert_eq!(again.start, token.start);
        }
    }
}
