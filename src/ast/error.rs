//! Parse error data.
//!
//! Parse errors are a data product, not an error channel: the parser
//! records them in [`crate::ast::Ast::errors`] and keeps going. Each error
//! carries the token it is anchored to; message text is produced by
//! [`crate::ast::Ast::render_error`], which matches every variant
//! explicitly so the wording stays fixed.

use std::fmt;

use serde::Serialize;

use crate::ast::Ast;
use crate::token::{Tag as TokenTag, TokenIndex};

/// A single diagnostic produced while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub tag: ParseErrorTag,
    /// The offending token.
    pub token: TokenIndex,
}

/// What the parser expected and did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorTag {
    AsteriskAfterPtrDeref,
    ChainedComparisonOperators,
    DeclBetweenFields,
    ExpectedBlock,
    ExpectedBlockOrAssignment,
    ExpectedBlockOrExpr,
    ExpectedBlockOrField,
    ExpectedContainer,
    ExpectedContainerMembers,
    ExpectedExpr,
    ExpectedExprOrAssignment,
    ExpectedLabelable,
    ExpectedLoopPayload,
    ExpectedParamList,
    ExpectedPrefixExpr,
    ExpectedPrimaryTypeExpr,
    ExpectedPubItem,
    ExpectedReturnType,
    ExpectedSemiOrElse,
    ExpectedSemiOrLBrace,
    ExpectedStatement,
    ExpectedSuffixOp,
    ExpectedTypeExpr,
    ExpectedVarDecl,
    ExpectedVarDeclOrFn,
    ExternFnBody,
    ExtraAlignQualifier,
    ExtraAllowzeroQualifier,
    ExtraConstQualifier,
    ExtraVolatileQualifier,
    InvalidAmpersandAmpersand,
    InvalidBitRange,
    SameLineDocComment,
    UnattachedDocComment,
    VarargsNonfinal,
    ExpectedToken(TokenTag),
}

impl Ast {
    /// Write the message for one parse error. The text for each variant is
    /// fixed; tooling is allowed to match on it.
    pub fn render_error(&self, parse_error: &ParseError, out: &mut dyn fmt::Write) -> fmt::Result {
        let found = self.token_tag(parse_error.token).symbol();
        match parse_error.tag {
            ParseErrorTag::AsteriskAfterPtrDeref => {
                write!(out, "`.*` cannot be followed by `*`; are you missing a space?")
            }
            ParseErrorTag::ChainedComparisonOperators => {
                write!(out, "comparison operators cannot be chained")
            }
            ParseErrorTag::DeclBetweenFields => {
                write!(out, "declarations are not allowed between container fields")
            }
            ParseErrorTag::ExpectedBlock => {
                write!(out, "expected block, found '{}'", found)
            }
            ParseErrorTag::ExpectedBlockOrAssignment => {
                write!(out, "expected block or assignment, found '{}'", found)
            }
            ParseErrorTag::ExpectedBlockOrExpr => {
                write!(out, "expected block or expression, found '{}'", found)
            }
            ParseErrorTag::ExpectedBlockOrField => {
                write!(out, "expected block or field, found '{}'", found)
            }
            ParseErrorTag::ExpectedContainer => {
                write!(out, "expected a struct, enum or union, found '{}'", found)
            }
            ParseErrorTag::ExpectedContainerMembers => {
                write!(
                    out,
                    "expected test, comptime, var decl, or container field, found '{}'",
                    found
                )
            }
            ParseErrorTag::ExpectedExpr => {
                write!(out, "expected expression, found '{}'", found)
            }
            ParseErrorTag::ExpectedExprOrAssignment => {
                write!(out, "expected expression or assignment, found '{}'", found)
            }
            ParseErrorTag::ExpectedLabelable => {
                write!(
                    out,
                    "expected 'while', 'for', 'inline', or '{{', found '{}'",
                    found
                )
            }
            ParseErrorTag::ExpectedLoopPayload => {
                write!(out, "expected loop payload, found '{}'", found)
            }
            ParseErrorTag::ExpectedParamList => {
                write!(out, "expected parameter list, found '{}'", found)
            }
            ParseErrorTag::ExpectedPrefixExpr => {
                write!(out, "expected prefix expression, found '{}'", found)
            }
            ParseErrorTag::ExpectedPrimaryTypeExpr => {
                write!(out, "expected primary type expression, found '{}'", found)
            }
            ParseErrorTag::ExpectedPubItem => {
                write!(out, "expected function or variable declaration after pub")
            }
            ParseErrorTag::ExpectedReturnType => {
                write!(out, "expected return type expression, found '{}'", found)
            }
            ParseErrorTag::ExpectedSemiOrElse => {
                write!(out, "expected ';' or 'else' after statement")
            }
            ParseErrorTag::ExpectedSemiOrLBrace => {
                write!(out, "expected ';' or block after function prototype")
            }
            ParseErrorTag::ExpectedStatement => {
                write!(out, "expected statement, found '{}'", found)
            }
            ParseErrorTag::ExpectedSuffixOp => {
                write!(
                    out,
                    "expected pointer dereference, optional unwrap, or field access, found '{}'",
                    found
                )
            }
            ParseErrorTag::ExpectedTypeExpr => {
                write!(out, "expected type expression, found '{}'", found)
            }
            ParseErrorTag::ExpectedVarDecl => {
                write!(out, "expected variable declaration, found '{}'", found)
            }
            ParseErrorTag::ExpectedVarDeclOrFn => {
                write!(
                    out,
                    "expected variable declaration or function, found '{}'",
                    found
                )
            }
            ParseErrorTag::ExternFnBody => {
                write!(out, "extern functions have no body")
            }
            ParseErrorTag::ExtraAlignQualifier => {
                write!(out, "extra align qualifier")
            }
            ParseErrorTag::ExtraAllowzeroQualifier => {
                write!(out, "extra allowzero qualifier")
            }
            ParseErrorTag::ExtraConstQualifier => {
                write!(out, "extra const qualifier")
            }
            ParseErrorTag::ExtraVolatileQualifier => {
                write!(out, "extra volatile qualifier")
            }
            ParseErrorTag::InvalidAmpersandAmpersand => {
                write!(out, "`&&` is invalid; note that `and` is boolean AND")
            }
            ParseErrorTag::InvalidBitRange => {
                write!(out, "bit range not allowed on slices and arrays")
            }
            ParseErrorTag::SameLineDocComment => {
                write!(out, "same line documentation comment")
            }
            ParseErrorTag::UnattachedDocComment => {
                write!(out, "unattached documentation comment")
            }
            ParseErrorTag::VarargsNonfinal => {
                write!(out, "function prototype has parameter after varargs")
            }
            ParseErrorTag::ExpectedToken(expected) => {
                write!(out, "expected '{}', found '{}'", expected.symbol(), found)
            }
        }
    }

    /// Convenience wrapper that renders one error to a `String`.
    pub fn error_message(&self, parse_error: &ParseError) -> String {
        let mut out = String::new();
        self.render_error(parse_error, &mut out)
            .expect("writing to a String cannot fail");
        out
    }
}
