//! Token definitions for the Silt lexer.
//!
//! A token is a `(tag, start)` pair: the lexical category plus the byte
//! offset of the first byte of the lexeme in the source buffer. Token
//! *lengths* are never stored; consumers that need the lexeme re-scan the
//! source at `start` (see [`crate::ast::Ast::token_slice`]). This keeps the
//! token stream at eight bytes per token, which matters because the stream
//! is the densest array in the whole pipeline.

use serde::{Deserialize, Serialize};

/// Index of a token in the token stream.
pub type TokenIndex = u32;

/// Byte offset into the source buffer.
pub type ByteOffset = u32;

/// A single token: lexical category plus start offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub tag: Tag,
    pub start: ByteOffset,
}

/// Closed set of lexical categories.
///
/// Operator and punctuation tags are named after their shape rather than
/// their meaning, because several of them are overloaded (`*` is both
/// multiplication and a pointer sigil; the parser decides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Invalid,
    Identifier,
    /// `@name`, the name of a builtin function.
    Builtin,
    StringLiteral,
    /// One `\\…` line of a multiline string literal, newline excluded.
    MultilineStringLiteralLine,
    CharLiteral,
    IntegerLiteral,
    FloatLiteral,
    /// `///` comment line. `////` is a plain comment, not a doc comment.
    DocComment,
    /// `//!` comment line attached to the enclosing container.
    ContainerDocComment,
    Bang,
    Pipe,
    PipePipe,
    PipeEqual,
    Equal,
    EqualEqual,
    EqualAngleBracketRight,
    BangEqual,
    LParen,
    RParen,
    Semicolon,
    Percent,
    PercentEqual,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Period,
    PeriodAsterisk,
    Ellipsis2,
    Ellipsis3,
    Caret,
    CaretEqual,
    Plus,
    PlusPlus,
    PlusEqual,
    PlusPercent,
    PlusPercentEqual,
    Minus,
    MinusEqual,
    MinusPercent,
    MinusPercentEqual,
    Asterisk,
    AsteriskEqual,
    AsteriskAsterisk,
    AsteriskPercent,
    AsteriskPercentEqual,
    Arrow,
    Colon,
    Slash,
    SlashEqual,
    Comma,
    Ampersand,
    AmpersandEqual,
    QuestionMark,
    AngleBracketLeft,
    AngleBracketLeftEqual,
    AngleBracketAngleBracketLeft,
    AngleBracketAngleBracketLeftEqual,
    AngleBracketRight,
    AngleBracketRightEqual,
    AngleBracketAngleBracketRight,
    AngleBracketAngleBracketRightEqual,
    Tilde,
    KeywordAlign,
    KeywordAllowzero,
    KeywordAnd,
    KeywordAnyframe,
    KeywordAnytype,
    KeywordAsm,
    KeywordAsync,
    KeywordAwait,
    KeywordBreak,
    KeywordCallconv,
    KeywordCatch,
    KeywordComptime,
    KeywordConst,
    KeywordContinue,
    KeywordDefer,
    KeywordElse,
    KeywordEnum,
    KeywordErrdefer,
    KeywordError,
    KeywordExport,
    KeywordExtern,
    KeywordFalse,
    KeywordFn,
    KeywordFor,
    KeywordIf,
    KeywordInline,
    KeywordLinksection,
    KeywordNoalias,
    KeywordNosuspend,
    KeywordNull,
    KeywordOpaque,
    KeywordOr,
    KeywordOrelse,
    KeywordPacked,
    KeywordPub,
    KeywordResume,
    KeywordReturn,
    KeywordStruct,
    KeywordSuspend,
    KeywordSwitch,
    KeywordTest,
    KeywordThreadlocal,
    KeywordTrue,
    KeywordTry,
    KeywordUndefined,
    KeywordUnion,
    KeywordUnreachable,
    KeywordUsingnamespace,
    KeywordVar,
    KeywordVolatile,
    KeywordWhile,
    Eof,
}

impl Tag {
    /// The fixed lexeme of this tag, or `None` when the lexeme depends on
    /// the source (identifiers, literals, comments).
    pub fn lexeme(self) -> Option<&'static str> {
        match self {
            Tag::Invalid
            | Tag::Identifier
            | Tag::Builtin
            | Tag::StringLiteral
            | Tag::MultilineStringLiteralLine
            | Tag::CharLiteral
            | Tag::IntegerLiteral
            | Tag::FloatLiteral
            | Tag::DocComment
            | Tag::ContainerDocComment
            | Tag::Eof => None,

            Tag::Bang => Some("!"),
            Tag::Pipe => Some("|"),
            Tag::PipePipe => Some("||"),
            Tag::PipeEqual => Some("|="),
            Tag::Equal => Some("="),
            Tag::EqualEqual => Some("=="),
            Tag::EqualAngleBracketRight => Some("=>"),
            Tag::BangEqual => Some("!="),
            Tag::LParen => Some("("),
            Tag::RParen => Some(")"),
            Tag::Semicolon => Some(";"),
            Tag::Percent => Some("%"),
            Tag::PercentEqual => Some("%="),
            Tag::LBrace => Some("{"),
            Tag::RBrace => Some("}"),
            Tag::LBracket => Some("["),
            Tag::RBracket => Some("]"),
            Tag::Period => Some("."),
            Tag::PeriodAsterisk => Some(".*"),
            Tag::Ellipsis2 => Some(".."),
            Tag::Ellipsis3 => Some("..."),
            Tag::Caret => Some("^"),
            Tag::CaretEqual => Some("^="),
            Tag::Plus => Some("+"),
            Tag::PlusPlus => Some("++"),
            Tag::PlusEqual => Some("+="),
            Tag::PlusPercent => Some("+%"),
            Tag::PlusPercentEqual => Some("+%="),
            Tag::Minus => Some("-"),
            Tag::MinusEqual => Some("-="),
            Tag::MinusPercent => Some("-%"),
            Tag::MinusPercentEqual => Some("-%="),
            Tag::Asterisk => Some("*"),
            Tag::AsteriskEqual => Some("*="),
            Tag::AsteriskAsterisk => Some("**"),
            Tag::AsteriskPercent => Some("*%"),
            Tag::AsteriskPercentEqual => Some("*%="),
            Tag::Arrow => Some("->"),
            Tag::Colon => Some(":"),
            Tag::Slash => Some("/"),
            Tag::SlashEqual => Some("/="),
            Tag::Comma => Some(","),
            Tag::Ampersand => Some("&"),
            Tag::AmpersandEqual => Some("&="),
            Tag::QuestionMark => Some("?"),
            Tag::AngleBracketLeft => Some("<"),
            Tag::AngleBracketLeftEqual => Some("<="),
            Tag::AngleBracketAngleBracketLeft => Some("<<"),
            Tag::AngleBracketAngleBracketLeftEqual => Some("<<="),
            Tag::AngleBracketRight => Some(">"),
            Tag::AngleBracketRightEqual => Some(">="),
            Tag::AngleBracketAngleBracketRight => Some(">>"),
            Tag::AngleBracketAngleBracketRightEqual => Some(">>="),
            Tag::Tilde => Some("~"),
            Tag::KeywordAlign => Some("align"),
            Tag::KeywordAllowzero => Some("allowzero"),
            Tag::KeywordAnd => Some("and"),
            Tag::KeywordAnyframe => Some("anyframe"),
            Tag::KeywordAnytype => Some("anytype"),
            Tag::KeywordAsm => Some("asm"),
            Tag::KeywordAsync => Some("async"),
            Tag::KeywordAwait => Some("await"),
            Tag::KeywordBreak => Some("break"),
            Tag::KeywordCallconv => Some("callconv"),
            Tag::KeywordCatch => Some("catch"),
            Tag::KeywordComptime => Some("comptime"),
            Tag::KeywordConst => Some("const"),
            Tag::KeywordContinue => Some("continue"),
            Tag::KeywordDefer => Some("defer"),
            Tag::KeywordElse => Some("else"),
            Tag::KeywordEnum => Some("enum"),
            Tag::KeywordErrdefer => Some("errdefer"),
            Tag::KeywordError => Some("error"),
            Tag::KeywordExport => Some("export"),
            Tag::KeywordExtern => Some("extern"),
            Tag::KeywordFalse => Some("false"),
            Tag::KeywordFn => Some("fn"),
            Tag::KeywordFor => Some("for"),
            Tag::KeywordIf => Some("if"),
            Tag::KeywordInline => Some("inline"),
            Tag::KeywordLinksection => Some("linksection"),
            Tag::KeywordNoalias => Some("noalias"),
            Tag::KeywordNosuspend => Some("nosuspend"),
            Tag::KeywordNull => Some("null"),
            Tag::KeywordOpaque => Some("opaque"),
            Tag::KeywordOr => Some("or"),
            Tag::KeywordOrelse => Some("orelse"),
            Tag::KeywordPacked => Some("packed"),
            Tag::KeywordPub => Some("pub"),
            Tag::KeywordResume => Some("resume"),
            Tag::KeywordReturn => Some("return"),
            Tag::KeywordStruct => Some("struct"),
            Tag::KeywordSuspend => Some("suspend"),
            Tag::KeywordSwitch => Some("switch"),
            Tag::KeywordTest => Some("test"),
            Tag::KeywordThreadlocal => Some("threadlocal"),
            Tag::KeywordTrue => Some("true"),
            Tag::KeywordTry => Some("try"),
            Tag::KeywordUndefined => Some("undefined"),
            Tag::KeywordUnion => Some("union"),
            Tag::KeywordUnreachable => Some("unreachable"),
            Tag::KeywordUsingnamespace => Some("usingnamespace"),
            Tag::KeywordVar => Some("var"),
            Tag::KeywordVolatile => Some("volatile"),
            Tag::KeywordWhile => Some("while"),
        }
    }

    /// Human-readable name used in diagnostics. Fixed-lexeme tags render
    /// as the lexeme itself, the rest get a descriptive phrase.
    pub fn symbol(self) -> &'static str {
        match self {
            Tag::Invalid => "invalid bytes",
            Tag::Identifier => "an identifier",
            Tag::Builtin => "a builtin function",
            Tag::StringLiteral | Tag::MultilineStringLiteralLine => "a string literal",
            Tag::CharLiteral => "a character literal",
            Tag::IntegerLiteral | Tag::FloatLiteral => "a number literal",
            Tag::DocComment | Tag::ContainerDocComment => "a document comment",
            Tag::Eof => "EOF",
            other => other.lexeme().unwrap(),
        }
    }

    /// Whether this tag is one of the keyword tags.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Tag::KeywordAlign
                | Tag::KeywordAllowzero
                | Tag::KeywordAnd
                | Tag::KeywordAnyframe
                | Tag::KeywordAnytype
                | Tag::KeywordAsm
                | Tag::KeywordAsync
                | Tag::KeywordAwait
                | Tag::KeywordBreak
                | Tag::KeywordCallconv
                | Tag::KeywordCatch
                | Tag::KeywordComptime
                | Tag::KeywordConst
                | Tag::KeywordContinue
                | Tag::KeywordDefer
                | Tag::KeywordElse
                | Tag::KeywordEnum
                | Tag::KeywordErrdefer
                | Tag::KeywordError
                | Tag::KeywordExport
                | Tag::KeywordExtern
                | Tag::KeywordFalse
                | Tag::KeywordFn
                | Tag::KeywordFor
                | Tag::KeywordIf
                | Tag::KeywordInline
                | Tag::KeywordLinksection
                | Tag::KeywordNoalias
                | Tag::KeywordNosuspend
                | Tag::KeywordNull
                | Tag::KeywordOpaque
                | Tag::KeywordOr
                | Tag::KeywordOrelse
                | Tag::KeywordPacked
                | Tag::KeywordPub
                | Tag::KeywordResume
                | Tag::KeywordReturn
                | Tag::KeywordStruct
                | Tag::KeywordSuspend
                | Tag::KeywordSwitch
                | Tag::KeywordTest
                | Tag::KeywordThreadlocal
                | Tag::KeywordTrue
                | Tag::KeywordTry
                | Tag::KeywordUndefined
                | Tag::KeywordUnion
                | Tag::KeywordUnreachable
                | Tag::KeywordUsingnamespace
                | Tag::KeywordVar
                | Tag::KeywordVolatile
                | Tag::KeywordWhile
        )
    }
}

/// Look up the keyword tag for an identifier-shaped lexeme.
pub fn keyword(ident: &str) -> Option<Tag> {
    let tag = match ident {
        "align" => Tag::KeywordAlign,
        "allowzero" => Tag::KeywordAllowzero,
        "and" => Tag::KeywordAnd,
        "anyframe" => Tag::KeywordAnyframe,
        "anytype" => Tag::KeywordAnytype,
        "asm" => Tag::KeywordAsm,
        "async" => Tag::KeywordAsync,
        "await" => Tag::KeywordAwait,
        "break" => Tag::KeywordBreak,
        "callconv" => Tag::KeywordCallconv,
        "catch" => Tag::KeywordCatch,
        "comptime" => Tag::KeywordComptime,
        "const" => Tag::KeywordConst,
        "continue" => Tag::KeywordContinue,
        "defer" => Tag::KeywordDefer,
        "else" => Tag::KeywordElse,
        "enum" => Tag::KeywordEnum,
        "errdefer" => Tag::KeywordErrdefer,
        "error" => Tag::KeywordError,
        "export" => Tag::KeywordExport,
        "extern" => Tag::KeywordExtern,
        "false" => Tag::KeywordFalse,
        "fn" => Tag::KeywordFn,
        "for" => Tag::KeywordFor,
        "if" => Tag::KeywordIf,
        "inline" => Tag::KeywordInline,
        "linksection" => Tag::KeywordLinksection,
        "noalias" => Tag::KeywordNoalias,
        "nosuspend" => Tag::KeywordNosuspend,
        "null" => Tag::KeywordNull,
        "opaque" => Tag::KeywordOpaque,
        "or" => Tag::KeywordOr,
        "orelse" => Tag::KeywordOrelse,
        "packed" => Tag::KeywordPacked,
        "pub" => Tag::KeywordPub,
        "resume" => Tag::KeywordResume,
        "return" => Tag::KeywordReturn,
        "struct" => Tag::KeywordStruct,
        "suspend" => Tag::KeywordSuspend,
        "switch" => Tag::KeywordSwitch,
        "test" => Tag::KeywordTest,
        "threadlocal" => Tag::KeywordThreadlocal,
        "true" => Tag::KeywordTrue,
        "try" => Tag::KeywordTry,
        "undefined" => Tag::KeywordUndefined,
        "union" => Tag::KeywordUnion,
        "unreachable" => Tag::KeywordUnreachable,
        "usingnamespace" => Tag::KeywordUsingnamespace,
        "var" => Tag::KeywordVar,
        "volatile" => Tag::KeywordVolatile,
        "while" => Tag::KeywordWhile,
        _ => return None,
    };
    Some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_round_trips_through_lexeme() {
        for word in ["fn", "while", "usingnamespace", "threadlocal", "orelse"] {
            let tag = keyword(word).unwrap();
            assert_eq!(tag.lexeme(), Some(word));
            assert!(tag.is_keyword());
        }
    }

    #[test]
    fn non_keywords_are_not_found() {
        assert_eq!(keyword("fnord"), None);
        assert_eq!(keyword(""), None);
        assert_eq!(keyword("Fn"), None);
    }

    #[test]
    fn symbols_for_variable_lexemes_are_descriptive() {
        assert_eq!(Tag::Identifier.symbol(), "an identifier");
        assert_eq!(Tag::EqualAngleBracketRight.symbol(), "=>");
    }
}
