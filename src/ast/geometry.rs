//! Token geometry: recovering the exact token bounds of any node.
//!
//! Nodes store no spans. [`Ast::first_token`] and [`Ast::last_token`]
//! recompute them by an iterative descent over the compact encoding,
//! accumulating fixed offsets for the punctuation that surrounds child
//! nodes (a call's `)`, an init list's `}` plus optional trailing comma,
//! and so on) and walking backward over modifier tokens that precede a
//! declaration's main token (`pub`, `extern "lib"`, `threadlocal`,
//! labels).
//!
//! Both functions are pure: they read tags, main tokens, `data`,
//! `extra_data`, and token tags/starts, and never allocate.
//!
//! ## Invariants
//!
//! For every reachable node `n`:
//!
//! - `first_token(n) <= main_token(n) <= last_token(n)`
//! - children's spans nest inside their parent's span
//! - textually consecutive siblings have disjoint, ordered spans
//!
//! The functions are total on well-formed trees. A tag/data mismatch is a
//! parser bug and panics; it is never silently recovered.

use super::{extra, node, Ast, NodeIndex};
use crate::token::{Tag as TokenTag, TokenIndex};

impl Ast {
    /// Index of the earliest token spanned by `node`.
    pub fn first_token(&self, node: NodeIndex) -> TokenIndex {
        let mut n = node;
        let mut end_offset: TokenIndex = 0;
        loop {
            let data = self.node_data(n);
            let main = self.main_token(n);
            match self.node_tag(n) {
                node::Tag::Root => return 0,

                // Anchored directly at the main token.
                node::Tag::TestDecl
                | node::Tag::Errdefer
                | node::Tag::Defer
                | node::Tag::BoolNot
                | node::Tag::Negation
                | node::Tag::BitNot
                | node::Tag::NegationWrap
                | node::Tag::AddressOf
                | node::Tag::Try
                | node::Tag::Await
                | node::Tag::OptionalType
                | node::Tag::Switch
                | node::Tag::SwitchComma
                | node::Tag::IfSimple
                | node::Tag::If
                | node::Tag::Suspend
                | node::Tag::Resume
                | node::Tag::Continue
                | node::Tag::Break
                | node::Tag::Return
                | node::Tag::AnyframeType
                | node::Tag::Identifier
                | node::Tag::AnyframeLiteral
                | node::Tag::CharLiteral
                | node::Tag::IntegerLiteral
                | node::Tag::FloatLiteral
                | node::Tag::TrueLiteral
                | node::Tag::FalseLiteral
                | node::Tag::NullLiteral
                | node::Tag::UndefinedLiteral
                | node::Tag::UnreachableLiteral
                | node::Tag::StringLiteral
                | node::Tag::MultilineStringLiteral
                | node::Tag::GroupedExpression
                | node::Tag::BuiltinCallTwo
                | node::Tag::BuiltinCallTwoComma
                | node::Tag::BuiltinCall
                | node::Tag::BuiltinCallComma
                | node::Tag::ErrorSetDecl
                | node::Tag::Comptime
                | node::Tag::Nosuspend
                | node::Tag::AsmSimple
                | node::Tag::Asm
                | node::Tag::ArrayType
                | node::Tag::ArrayTypeSentinel
                | node::Tag::ErrorValue
                | node::Tag::AsmOutput
                | node::Tag::AsmInput => return main - end_offset,

                // `.name`: include the dot.
                node::Tag::EnumLiteral => return main - 1 - end_offset,

                // Anonymous init lists: include the dot before the brace.
                node::Tag::ArrayInitDotTwo
                | node::Tag::ArrayInitDotTwoComma
                | node::Tag::ArrayInitDot
                | node::Tag::ArrayInitDotComma
                | node::Tag::StructInitDotTwo
                | node::Tag::StructInitDotTwoComma
                | node::Tag::StructInitDot
                | node::Tag::StructInitDotComma => return main - 1 - end_offset,

                // Infix and postfix: descend into the left operand.
                node::Tag::Catch
                | node::Tag::EqualEqual
                | node::Tag::BangEqual
                | node::Tag::LessThan
                | node::Tag::GreaterThan
                | node::Tag::LessOrEqual
                | node::Tag::GreaterOrEqual
                | node::Tag::AssignMul
                | node::Tag::AssignDiv
                | node::Tag::AssignMod
                | node::Tag::AssignAdd
                | node::Tag::AssignSub
                | node::Tag::AssignShl
                | node::Tag::AssignShr
                | node::Tag::AssignBitAnd
                | node::Tag::AssignBitXor
                | node::Tag::AssignBitOr
                | node::Tag::AssignMulWrap
                | node::Tag::AssignAddWrap
                | node::Tag::AssignSubWrap
                | node::Tag::Assign
                | node::Tag::MergeErrorSets
                | node::Tag::Mul
                | node::Tag::Div
                | node::Tag::Mod
                | node::Tag::ArrayMult
                | node::Tag::MulWrap
                | node::Tag::Add
                | node::Tag::Sub
                | node::Tag::ArrayCat
                | node::Tag::AddWrap
                | node::Tag::SubWrap
                | node::Tag::Shl
                | node::Tag::Shr
                | node::Tag::BitAnd
                | node::Tag::BitXor
                | node::Tag::BitOr
                | node::Tag::Orelse
                | node::Tag::BoolAnd
                | node::Tag::BoolOr
                | node::Tag::ErrorUnion
                | node::Tag::FieldAccess
                | node::Tag::UnwrapOptional
                | node::Tag::Deref
                | node::Tag::ArrayAccess
                | node::Tag::SliceOpen
                | node::Tag::Slice
                | node::Tag::SliceSentinel
                | node::Tag::ArrayInitOne
                | node::Tag::ArrayInitOneComma
                | node::Tag::ArrayInit
                | node::Tag::ArrayInitComma
                | node::Tag::StructInitOne
                | node::Tag::StructInitOneComma
                | node::Tag::StructInit
                | node::Tag::StructInitComma
                | node::Tag::CallOne
                | node::Tag::CallOneComma
                | node::Tag::Call
                | node::Tag::CallComma
                | node::Tag::SwitchRange => {
                    n = data.lhs;
                }

                // The `async` keyword precedes the callee.
                node::Tag::AsyncCallOne
                | node::Tag::AsyncCallOneComma
                | node::Tag::AsyncCall
                | node::Tag::AsyncCallComma => {
                    end_offset += 1;
                    n = data.lhs;
                }

                node::Tag::Usingnamespace => {
                    if main > 0 && self.token_tag(main - 1) == TokenTag::KeywordPub {
                        return main - 1 - end_offset;
                    }
                    return main - end_offset;
                }

                // Containers may carry a `packed`/`extern` layout token.
                node::Tag::ContainerDecl
                | node::Tag::ContainerDeclTrailing
                | node::Tag::ContainerDeclTwo
                | node::Tag::ContainerDeclTwoTrailing
                | node::Tag::ContainerDeclArg
                | node::Tag::ContainerDeclArgTrailing
                | node::Tag::TaggedUnion
                | node::Tag::TaggedUnionTrailing
                | node::Tag::TaggedUnionTwo
                | node::Tag::TaggedUnionTwoTrailing
                | node::Tag::TaggedUnionEnumTag
                | node::Tag::TaggedUnionEnumTagTrailing => {
                    if main > 0
                        && matches!(
                            self.token_tag(main - 1),
                            TokenTag::KeywordPacked | TokenTag::KeywordExtern
                        )
                    {
                        return main - 1 - end_offset;
                    }
                    return main - end_offset;
                }

                // A many-pointer's main token is the asterisk; the
                // bracket that precedes it belongs to the same node.
                node::Tag::PtrTypeAligned
                | node::Tag::PtrTypeSentinel
                | node::Tag::PtrType
                | node::Tag::PtrTypeBitRange => {
                    let anchor = match self.token_tag(main) {
                        TokenTag::Asterisk | TokenTag::AsteriskAsterisk => {
                            if main > 0 && self.token_tag(main - 1) == TokenTag::LBracket {
                                main - 1
                            } else {
                                main
                            }
                        }
                        TokenTag::LBracket => main,
                        _ => unreachable!("pointer type anchored on non-sigil token"),
                    };
                    return anchor - end_offset;
                }

                // Loops may be prefixed by `inline` and a `label:`.
                node::Tag::WhileSimple
                | node::Tag::WhileCont
                | node::Tag::While
                | node::Tag::ForSimple
                | node::Tag::For => {
                    let mut result = main;
                    if result > 0 && self.token_tag(result - 1) == TokenTag::KeywordInline {
                        result -= 1;
                    }
                    if result > 1
                        && self.token_tag(result - 1) == TokenTag::Colon
                        && self.token_tag(result - 2) == TokenTag::Identifier
                    {
                        result -= 2;
                    }
                    return result - end_offset;
                }

                // Blocks may be labeled.
                node::Tag::BlockTwo
                | node::Tag::BlockTwoSemicolon
                | node::Tag::Block
                | node::Tag::BlockSemicolon => {
                    if main > 1
                        && self.token_tag(main - 1) == TokenTag::Colon
                        && self.token_tag(main - 2) == TokenTag::Identifier
                    {
                        return main - 2 - end_offset;
                    }
                    return main - end_offset;
                }

                // Prototypes walk backward over their modifier tokens.
                node::Tag::FnProtoSimple
                | node::Tag::FnProtoMulti
                | node::Tag::FnProtoOne
                | node::Tag::FnProto
                | node::Tag::FnDecl => {
                    let mut i = main;
                    while i > 0 {
                        i -= 1;
                        if !matches!(
                            self.token_tag(i),
                            TokenTag::KeywordExtern
                                | TokenTag::KeywordExport
                                | TokenTag::KeywordPub
                                | TokenTag::KeywordInline
                                | TokenTag::StringLiteral
                        ) {
                            i += 1;
                            break;
                        }
                    }
                    return i - end_offset;
                }

                node::Tag::GlobalVarDecl
                | node::Tag::LocalVarDecl
                | node::Tag::SimpleVarDecl
                | node::Tag::AlignedVarDecl => {
                    let mut i = main;
                    while i > 0 {
                        i -= 1;
                        if !matches!(
                            self.token_tag(i),
                            TokenTag::KeywordExtern
                                | TokenTag::KeywordExport
                                | TokenTag::KeywordPub
                                | TokenTag::KeywordThreadlocal
                                | TokenTag::KeywordComptime
                                | TokenTag::StringLiteral
                        ) {
                            i += 1;
                            break;
                        }
                    }
                    return i - end_offset;
                }

                node::Tag::ContainerField
                | node::Tag::ContainerFieldInit
                | node::Tag::ContainerFieldAlign => {
                    if main > 0 && self.token_tag(main - 1) == TokenTag::KeywordComptime {
                        return main - 1 - end_offset;
                    }
                    return main - end_offset;
                }

                node::Tag::SwitchCaseOne => {
                    if data.lhs == 0 {
                        // `else` prong: the keyword sits before the arrow.
                        return main - 1 - end_offset;
                    }
                    n = data.lhs;
                }
                node::Tag::SwitchCase => {
                    let e: extra::SubRange = self.extra(data.lhs);
                    debug_assert!(e.end > e.start);
                    n = self.extra_data[e.start as usize];
                }
            }
        }
    }

    /// Index of the latest token spanned by `node`.
    pub fn last_token(&self, node: NodeIndex) -> TokenIndex {
        let mut n = node;
        let mut end_offset: TokenIndex = 0;
        loop {
            let data = self.node_data(n);
            let main = self.main_token(n);
            match self.node_tag(n) {
                node::Tag::Root => return (self.token_count() - 1) as TokenIndex,

                // Single-token nodes.
                node::Tag::Identifier
                | node::Tag::AnyframeLiteral
                | node::Tag::CharLiteral
                | node::Tag::IntegerLiteral
                | node::Tag::FloatLiteral
                | node::Tag::TrueLiteral
                | node::Tag::FalseLiteral
                | node::Tag::NullLiteral
                | node::Tag::UndefinedLiteral
                | node::Tag::UnreachableLiteral
                | node::Tag::StringLiteral
                | node::Tag::EnumLiteral
                | node::Tag::Deref => return main + end_offset,

                // Token index stored in rhs.
                node::Tag::FieldAccess
                | node::Tag::UnwrapOptional
                | node::Tag::GroupedExpression
                | node::Tag::MultilineStringLiteral
                | node::Tag::ErrorSetDecl
                | node::Tag::AsmSimple
                | node::Tag::AsmOutput
                | node::Tag::AsmInput => return data.rhs + end_offset,

                node::Tag::ErrorValue => return main + 2 + end_offset,

                node::Tag::Asm => {
                    let e: extra::Asm = self.extra(data.rhs);
                    return e.rparen + end_offset;
                }

                // Infix operators and other "last token is in rhs" shapes.
                node::Tag::Catch
                | node::Tag::EqualEqual
                | node::Tag::BangEqual
                | node::Tag::LessThan
                | node::Tag::GreaterThan
                | node::Tag::LessOrEqual
                | node::Tag::GreaterOrEqual
                | node::Tag::AssignMul
                | node::Tag::AssignDiv
                | node::Tag::AssignMod
                | node::Tag::AssignAdd
                | node::Tag::AssignSub
                | node::Tag::AssignShl
                | node::Tag::AssignShr
                | node::Tag::AssignBitAnd
                | node::Tag::AssignBitXor
                | node::Tag::AssignBitOr
                | node::Tag::AssignMulWrap
                | node::Tag::AssignAddWrap
                | node::Tag::AssignSubWrap
                | node::Tag::Assign
                | node::Tag::MergeErrorSets
                | node::Tag::Mul
                | node::Tag::Div
                | node::Tag::Mod
                | node::Tag::ArrayMult
                | node::Tag::MulWrap
                | node::Tag::Add
                | node::Tag::Sub
                | node::Tag::ArrayCat
                | node::Tag::AddWrap
                | node::Tag::SubWrap
                | node::Tag::Shl
                | node::Tag::Shr
                | node::Tag::BitAnd
                | node::Tag::BitXor
                | node::Tag::BitOr
                | node::Tag::Orelse
                | node::Tag::BoolAnd
                | node::Tag::BoolOr
                | node::Tag::ErrorUnion
                | node::Tag::SwitchRange
                | node::Tag::ArrayType
                | node::Tag::FnDecl
                | node::Tag::TestDecl
                | node::Tag::Errdefer
                | node::Tag::Defer
                | node::Tag::WhileSimple
                | node::Tag::ForSimple
                | node::Tag::IfSimple
                | node::Tag::SwitchCaseOne
                | node::Tag::SwitchCase => {
                    n = data.rhs;
                }

                // Prefix operators: last token is in the operand.
                node::Tag::BoolNot
                | node::Tag::Negation
                | node::Tag::BitNot
                | node::Tag::NegationWrap
                | node::Tag::AddressOf
                | node::Tag::Try
                | node::Tag::Await
                | node::Tag::OptionalType
                | node::Tag::Resume
                | node::Tag::Nosuspend
                | node::Tag::Comptime
                | node::Tag::Usingnamespace => {
                    n = data.lhs;
                }

                node::Tag::Suspend => {
                    if data.lhs == 0 {
                        return main + end_offset;
                    }
                    n = data.lhs;
                }

                node::Tag::AnyframeType => {
                    if data.rhs == 0 {
                        return main + end_offset;
                    }
                    n = data.rhs;
                }

                node::Tag::ArrayTypeSentinel => {
                    let e: extra::ArrayTypeSentinel = self.extra(data.rhs);
                    n = e.elem_type;
                }

                node::Tag::PtrTypeAligned
                | node::Tag::PtrTypeSentinel
                | node::Tag::PtrType
                | node::Tag::PtrTypeBitRange => {
                    n = data.rhs;
                }

                node::Tag::SliceOpen => {
                    // `..` and `]` follow the start expression.
                    end_offset += 2;
                    n = data.rhs;
                }
                node::Tag::Slice => {
                    let e: extra::Slice = self.extra(data.rhs);
                    end_offset += 1; // rbracket
                    n = e.end;
                }
                node::Tag::SliceSentinel => {
                    let e: extra::SliceSentinel = self.extra(data.rhs);
                    end_offset += 1; // rbracket
                    n = e.sentinel;
                }

                node::Tag::ArrayAccess => {
                    end_offset += 1; // rbracket
                    n = data.rhs;
                }

                node::Tag::ArrayInitOne | node::Tag::StructInitOne => {
                    end_offset += 1; // rbrace
                    if data.rhs == 0 {
                        return main + end_offset;
                    }
                    n = data.rhs;
                }
                node::Tag::ArrayInitOneComma | node::Tag::StructInitOneComma => {
                    end_offset += 2; // comma + rbrace
                    n = data.rhs;
                }
                node::Tag::ArrayInitDotTwo | node::Tag::StructInitDotTwo => {
                    if data.rhs != 0 {
                        end_offset += 1;
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        end_offset += 1;
                        n = data.lhs;
                    } else {
                        // `.{}`
                        return main + 1 + end_offset;
                    }
                }
                node::Tag::ArrayInitDotTwoComma | node::Tag::StructInitDotTwoComma => {
                    end_offset += 2;
                    n = if data.rhs != 0 { data.rhs } else { data.lhs };
                }
                node::Tag::ArrayInitDot | node::Tag::StructInitDot => {
                    end_offset += 1;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }
                node::Tag::ArrayInitDotComma | node::Tag::StructInitDotComma => {
                    end_offset += 2;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }
                node::Tag::ArrayInit | node::Tag::StructInit => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    end_offset += 1;
                    n = self.extra_data[(e.end - 1) as usize];
                }
                node::Tag::ArrayInitComma | node::Tag::StructInitComma => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    end_offset += 2;
                    n = self.extra_data[(e.end - 1) as usize];
                }

                node::Tag::BuiltinCallTwo => {
                    if data.rhs != 0 {
                        end_offset += 1; // rparen
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        end_offset += 1;
                        n = data.lhs;
                    } else {
                        // @name()
                        return main + 2 + end_offset;
                    }
                }
                node::Tag::BuiltinCallTwoComma => {
                    end_offset += 2; // comma + rparen
                    n = if data.rhs != 0 { data.rhs } else { data.lhs };
                }
                node::Tag::BuiltinCall => {
                    end_offset += 1;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }
                node::Tag::BuiltinCallComma => {
                    end_offset += 2;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }

                node::Tag::CallOne | node::Tag::AsyncCallOne => {
                    end_offset += 1; // rparen
                    if data.rhs == 0 {
                        return main + end_offset;
                    }
                    n = data.rhs;
                }
                node::Tag::CallOneComma | node::Tag::AsyncCallOneComma => {
                    end_offset += 2; // comma + rparen
                    n = data.rhs;
                }
                node::Tag::Call | node::Tag::AsyncCall => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    end_offset += 1;
                    if e.end == e.start {
                        return main + end_offset;
                    }
                    n = self.extra_data[(e.end - 1) as usize];
                }
                node::Tag::CallComma | node::Tag::AsyncCallComma => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    end_offset += 2;
                    n = self.extra_data[(e.end - 1) as usize];
                }

                node::Tag::Switch => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    if e.end == e.start {
                        // rparen, lbrace, rbrace
                        end_offset += 3;
                        n = data.lhs;
                    } else {
                        end_offset += 1; // rbrace
                        n = self.extra_data[(e.end - 1) as usize];
                    }
                }
                node::Tag::SwitchComma => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    debug_assert!(e.end > e.start);
                    end_offset += 2; // comma + rbrace
                    n = self.extra_data[(e.end - 1) as usize];
                }

                node::Tag::WhileCont => {
                    let e: extra::WhileCont = self.extra(data.rhs);
                    n = e.then_expr;
                }
                node::Tag::While => {
                    let e: extra::While = self.extra(data.rhs);
                    n = if e.else_expr != 0 {
                        e.else_expr
                    } else {
                        e.then_expr
                    };
                }
                node::Tag::For | node::Tag::If => {
                    let e: extra::If = self.extra(data.rhs);
                    n = if e.else_expr != 0 {
                        e.else_expr
                    } else {
                        e.then_expr
                    };
                }

                node::Tag::Continue => {
                    if data.lhs != 0 {
                        return data.lhs + end_offset;
                    }
                    return main + end_offset;
                }
                node::Tag::Break => {
                    if data.rhs != 0 {
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        return data.lhs + end_offset;
                    } else {
                        return main + end_offset;
                    }
                }
                node::Tag::Return => {
                    if data.lhs == 0 {
                        return main + end_offset;
                    }
                    n = data.lhs;
                }

                node::Tag::FnProtoSimple | node::Tag::FnProtoMulti => {
                    if data.rhs == 0 {
                        return main + end_offset;
                    }
                    n = data.rhs;
                }
                node::Tag::FnProtoOne | node::Tag::FnProto => {
                    // align/linksection/callconv clauses may appear in any
                    // order after the parameter list; the latest-starting
                    // clause (or the return type) holds the last token,
                    // plus 1 for a clause's closing paren.
                    let (align_expr, section_expr, callconv_expr) =
                        if self.node_tag(n) == node::Tag::FnProtoOne {
                            let e: extra::FnProtoOne = self.extra(data.lhs);
                            (e.align_expr, e.section_expr, e.callconv_expr)
                        } else {
                            let e: extra::FnProto = self.extra(data.lhs);
                            (e.align_expr, e.section_expr, e.callconv_expr)
                        };
                    debug_assert!(data.rhs != 0);
                    let mut max_node = data.rhs;
                    let mut max_start = self.token_start(self.main_token(max_node));
                    let mut max_offset: TokenIndex = 0;
                    for clause in [align_expr, section_expr, callconv_expr] {
                        if clause == 0 {
                            continue;
                        }
                        let start = self.token_start(self.main_token(clause));
                        if start > max_start {
                            max_node = clause;
                            max_start = start;
                            max_offset = 1; // rparen
                        }
                    }
                    end_offset += max_offset;
                    n = max_node;
                }

                node::Tag::ContainerDeclTwo | node::Tag::TaggedUnionTwo => {
                    if data.rhs != 0 {
                        end_offset += 1; // rbrace
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        end_offset += 1;
                        n = data.lhs;
                    } else if self.node_tag(n) == node::Tag::TaggedUnionTwo {
                        // union ( enum ) { }
                        return main + 5 + end_offset;
                    } else {
                        // kw { }
                        return main + 2 + end_offset;
                    }
                }
                node::Tag::ContainerDeclTwoTrailing | node::Tag::TaggedUnionTwoTrailing => {
                    end_offset += 2; // comma + rbrace
                    n = if data.rhs != 0 { data.rhs } else { data.lhs };
                }
                node::Tag::ContainerDecl | node::Tag::TaggedUnion => {
                    if data.rhs == data.lhs {
                        if self.node_tag(n) == node::Tag::TaggedUnion {
                            return main + 5 + end_offset;
                        }
                        return main + 2 + end_offset;
                    }
                    end_offset += 1;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }
                node::Tag::ContainerDeclTrailing | node::Tag::TaggedUnionTrailing => {
                    end_offset += 2;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }
                node::Tag::ContainerDeclArg => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    if e.end == e.start {
                        // rparen, lbrace, rbrace
                        end_offset += 3;
                        n = data.lhs;
                    } else {
                        end_offset += 1;
                        n = self.extra_data[(e.end - 1) as usize];
                    }
                }
                node::Tag::ContainerDeclArgTrailing => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    if e.end == e.start {
                        end_offset += 3;
                        n = data.lhs;
                    } else {
                        end_offset += 2;
                        n = self.extra_data[(e.end - 1) as usize];
                    }
                }
                node::Tag::TaggedUnionEnumTag => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    if e.end == e.start {
                        // rparen, rparen, lbrace, rbrace
                        end_offset += 4;
                        n = data.lhs;
                    } else {
                        end_offset += 1;
                        n = self.extra_data[(e.end - 1) as usize];
                    }
                }
                node::Tag::TaggedUnionEnumTagTrailing => {
                    let e: extra::SubRange = self.extra(data.rhs);
                    if e.end == e.start {
                        end_offset += 4;
                        n = data.lhs;
                    } else {
                        end_offset += 2;
                        n = self.extra_data[(e.end - 1) as usize];
                    }
                }

                node::Tag::ContainerField => {
                    let e: extra::ContainerField = self.extra(data.rhs);
                    if e.value_expr != 0 {
                        n = e.value_expr;
                    } else if e.align_expr != 0 {
                        end_offset += 1; // rparen
                        n = e.align_expr;
                    } else if data.lhs != 0 {
                        n = data.lhs;
                    } else {
                        return main + end_offset;
                    }
                }
                node::Tag::ContainerFieldInit => {
                    if data.rhs != 0 {
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        n = data.lhs;
                    } else {
                        return main + end_offset;
                    }
                }
                node::Tag::ContainerFieldAlign => {
                    if data.rhs != 0 {
                        end_offset += 1; // rparen
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        n = data.lhs;
                    } else {
                        return main + end_offset;
                    }
                }

                node::Tag::BlockTwo => {
                    if data.rhs != 0 {
                        end_offset += 1; // rbrace
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        end_offset += 1;
                        n = data.lhs;
                    } else {
                        // `{}`
                        return main + 1 + end_offset;
                    }
                }
                node::Tag::BlockTwoSemicolon => {
                    end_offset += 2; // semicolon + rbrace
                    n = if data.rhs != 0 { data.rhs } else { data.lhs };
                }
                node::Tag::Block => {
                    if data.rhs == data.lhs {
                        return main + 1 + end_offset;
                    }
                    end_offset += 1;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }
                node::Tag::BlockSemicolon => {
                    end_offset += 2;
                    n = self.extra_data[(data.rhs - 1) as usize];
                }

                node::Tag::GlobalVarDecl => {
                    if data.rhs != 0 {
                        n = data.rhs;
                    } else {
                        let e: extra::GlobalVarDecl = self.extra(data.lhs);
                        if e.section_node != 0 {
                            end_offset += 1; // rparen
                            n = e.section_node;
                        } else if e.align_node != 0 {
                            end_offset += 1;
                            n = e.align_node;
                        } else if e.type_node != 0 {
                            n = e.type_node;
                        } else {
                            end_offset += 1; // name
                            return main + end_offset;
                        }
                    }
                }
                node::Tag::LocalVarDecl => {
                    if data.rhs != 0 {
                        n = data.rhs;
                    } else {
                        let e: extra::LocalVarDecl = self.extra(data.lhs);
                        if e.align_node != 0 {
                            end_offset += 1;
                            n = e.align_node;
                        } else if e.type_node != 0 {
                            n = e.type_node;
                        } else {
                            end_offset += 1;
                            return main + end_offset;
                        }
                    }
                }
                node::Tag::SimpleVarDecl => {
                    if data.rhs != 0 {
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        n = data.lhs;
                    } else {
                        end_offset += 1; // name
                        return main + end_offset;
                    }
                }
                node::Tag::AlignedVarDecl => {
                    if data.rhs != 0 {
                        n = data.rhs;
                    } else if data.lhs != 0 {
                        end_offset += 1; // rparen
                        n = data.lhs;
                    } else {
                        end_offset += 1;
                        return main + end_offset;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    fn roundtrip_tokens(source: &str, node_text: &str) {
        let ast = parse(source);
        assert!(ast.errors.is_empty(), "parse errors in {:?}", source);
        // The first root declaration should span exactly `node_text`.
        let decl = ast.root_decls()[0];
        let first = ast.first_token(decl);
        let last = ast.last_token(decl);
        let start = ast.token_start(first) as usize;
        let end = ast.token_start(last) as usize + ast.token_slice(last).len();
        assert_eq!(&source[start..end], node_text);
    }

    #[test]
    fn var_decl_includes_modifiers() {
        roundtrip_tokens(
            "pub extern \"c\" threadlocal var x: u8 = 0;",
            "pub extern \"c\" threadlocal var x: u8 = 0",
        );
    }

    #[test]
    fn fn_decl_includes_visibility() {
        roundtrip_tokens("pub fn f() void {}", "pub fn f() void {}");
    }

    #[test]
    fn var_decl_span_excludes_semicolon() {
        roundtrip_tokens("const a = foo(1, 2);", "const a = foo(1, 2)");
    }

    #[test]
    fn container_span_includes_trailing_brace() {
        roundtrip_tokens(
            "const S = struct {\n    a: u8,\n};",
            "const S = struct {\n    a: u8,\n}",
        );
    }

    #[test]
    fn anchor_sits_inside_span() {
        let source = "fn f(a: u8) callconv(.C) u8 {\n    return a + 1;\n}";
        let ast = parse(source);
        assert!(ast.errors.is_empty());
        for n in 0..ast.node_count() as u32 {
            let first = ast.first_token(n);
            let last = ast.last_token(n);
            let main = ast.main_token(n);
            assert!(first <= main, "node {}", n);
            assert!(main <= last, "node {}", n);
        }
    }
}
