//! Recursive-descent parser for Silt.
//!
//! The parser consumes the flat token stream and fills the AST's parallel
//! arrays. It never builds intermediate tree objects: every construct is
//! appended to the node arrays child-first, and variable-width payloads
//! are flushed from a scratch stack into `extra_data` so each record is
//! contiguous.
//!
//! ## Error recovery
//!
//! Parse errors are collected into the error list and parsing continues at
//! the next synchronization point (`;`, `}`, or a token that can start a
//! declaration). A root node is always produced; callers inspect
//! `Ast::errors` before trusting the tree.
//!
//! ## Shape selection
//!
//! Every list-shaped construct selects its node tag from two facts the
//! renderer needs later: how many elements it has (inline `lhs`/`rhs`
//! encoding versus an `extra_data` window) and whether the source carried
//! a trailing separator before the closing bracket (`_comma`/`_trailing`/
//! `_semicolon` variants).

use crate::ast::extra::{self, ExtraData};
use crate::ast::{node, Ast, NodeIndex, ParseError, ParseErrorTag};
use crate::token::{ByteOffset, Tag as TokenTag, TokenIndex};
use crate::tokenizer;

/// Parse a source buffer into an [`Ast`]. Errors are collected in the
/// returned store, not reported through the return type.
pub fn parse(source: &str) -> Ast {
    let tokens = tokenizer::tokenize(source);
    let mut token_tags = Vec::with_capacity(tokens.len());
    let mut token_starts = Vec::with_capacity(tokens.len());
    for token in &tokens {
        token_tags.push(token.tag);
        token_starts.push(token.start);
    }
    let mut p = Parser {
        source,
        token_tags,
        token_starts,
        tok_i: 0,
        errors: Vec::new(),
        node_tags: Vec::new(),
        node_main_tokens: Vec::new(),
        node_datas: Vec::new(),
        extra_data: Vec::new(),
        scratch: Vec::new(),
    };
    // Node 0 is the root; its data window is patched in below.
    p.node_tags.push(node::Tag::Root);
    p.node_main_tokens.push(0);
    p.node_datas.push(node::Data::default());

    let members = p.parse_container_members();
    let root_span = p.members_to_span(&members);
    if p.current() != TokenTag::Eof {
        p.warn(ParseErrorTag::ExpectedToken(TokenTag::Eof));
    }
    p.node_datas[0] = node::Data {
        lhs: root_span.start,
        rhs: root_span.end,
    };

    Ast {
        source: source.to_string(),
        token_tags: p.token_tags,
        token_starts: p.token_starts,
        node_tags: p.node_tags,
        node_main_tokens: p.node_main_tokens,
        node_datas: p.node_datas,
        extra_data: p.extra_data,
        errors: p.errors,
    }
}

/// Marker for a parse failure whose diagnostic is already recorded.
struct Failed;

type ParseResult<T> = Result<T, Failed>;

const NULL_NODE: NodeIndex = 0;

struct Parser<'src> {
    source: &'src str,
    token_tags: Vec<TokenTag>,
    token_starts: Vec<ByteOffset>,
    tok_i: TokenIndex,
    errors: Vec<ParseError>,
    node_tags: Vec<node::Tag>,
    node_main_tokens: Vec<TokenIndex>,
    node_datas: Vec<node::Data>,
    extra_data: Vec<NodeIndex>,
    scratch: Vec<NodeIndex>,
}

/// Result of parsing a member list, before committing it to a node shape.
struct Members {
    len: usize,
    lhs: NodeIndex,
    rhs: NodeIndex,
}

#[derive(Clone, Copy)]
enum FieldState {
    /// No fields seen yet.
    None,
    /// Fields seen, no declaration since.
    Seen,
    /// A declaration was seen after fields; token recorded for the
    /// diagnostic if another field follows.
    End(TokenIndex),
    /// `DeclBetweenFields` already reported.
    Err,
}

impl<'src> Parser<'src> {
    fn token_tag(&self, index: TokenIndex) -> TokenTag {
        self.token_tags[index as usize]
    }

    fn current(&self) -> TokenTag {
        self.token_tag(self.tok_i)
    }

    fn next_token(&mut self) -> TokenIndex {
        let result = self.tok_i;
        self.tok_i += 1;
        result
    }

    fn eat_token(&mut self, tag: TokenTag) -> Option<TokenIndex> {
        if self.current() == tag {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn expect_token(&mut self, tag: TokenTag) -> ParseResult<TokenIndex> {
        if self.current() == tag {
            Ok(self.next_token())
        } else {
            Err(self.fail(ParseErrorTag::ExpectedToken(tag)))
        }
    }

    fn warn(&mut self, tag: ParseErrorTag) {
        self.warn_at(self.tok_i, tag);
    }

    fn warn_at(&mut self, token: TokenIndex, tag: ParseErrorTag) {
        self.errors.push(ParseError { tag, token });
    }

    fn fail(&mut self, tag: ParseErrorTag) -> Failed {
        self.warn(tag);
        Failed
    }

    fn add_node(
        &mut self,
        tag: node::Tag,
        main_token: TokenIndex,
        lhs: NodeIndex,
        rhs: NodeIndex,
    ) -> NodeIndex {
        let index = self.node_tags.len() as NodeIndex;
        self.node_tags.push(tag);
        self.node_main_tokens.push(main_token);
        self.node_datas.push(node::Data { lhs, rhs });
        index
    }

    fn add_extra<T: ExtraData>(&mut self, record: T) -> NodeIndex {
        let start = self.extra_data.len() as NodeIndex;
        record.write(&mut self.extra_data);
        start
    }

    /// Flush `scratch[save..]` into `extra_data`, returning the window.
    fn scratch_to_span(&mut self, save: usize) -> extra::SubRange {
        let start = self.extra_data.len() as NodeIndex;
        self.extra_data.extend_from_slice(&self.scratch[save..]);
        let end = self.extra_data.len() as NodeIndex;
        self.scratch.truncate(save);
        extra::SubRange { start, end }
    }

    fn members_to_span(&mut self, members: &Members) -> extra::SubRange {
        let start = self.extra_data.len() as NodeIndex;
        match members.len {
            0 => {}
            1 => self.extra_data.push(members.lhs),
            2 => {
                self.extra_data.push(members.lhs);
                self.extra_data.push(members.rhs);
            }
            _ => {
                // Already a window; lhs/rhs are its bounds.
                return extra::SubRange {
                    start: members.lhs,
                    end: members.rhs,
                };
            }
        }
        extra::SubRange {
            start,
            end: self.extra_data.len() as NodeIndex,
        }
    }

    // ------------------------------------------------------------------
    // Container level
    // ------------------------------------------------------------------

    /// Parse members until `}` or EOF. Never fails; junk is reported and
    /// skipped.
    fn parse_container_members(&mut self) -> Members {
        let save = self.scratch.len();
        let mut field_state = FieldState::None;
        loop {
            while self.eat_token(TokenTag::ContainerDocComment).is_some() {}
            let doc_comment = self.eat_doc_comments();
            match self.current() {
                TokenTag::KeywordTest => {
                    let decl_token = self.tok_i;
                    match self.expect_test_decl() {
                        Ok(decl) => {
                            self.note_decl(&mut field_state, decl_token);
                            self.scratch.push(decl);
                        }
                        Err(Failed) => self.find_next_container_member(),
                    }
                }
                TokenTag::KeywordComptime => {
                    if self.token_tag(self.tok_i + 1) == TokenTag::LBrace {
                        let decl_token = self.tok_i;
                        let comptime_token = self.next_token();
                        match self.parse_block() {
                            Ok(block) if block != NULL_NODE => {
                                let decl = self.add_node(
                                    node::Tag::Comptime,
                                    comptime_token,
                                    block,
                                    0,
                                );
                                self.note_decl(&mut field_state, decl_token);
                                self.scratch.push(decl);
                            }
                            _ => self.find_next_container_member(),
                        }
                    } else {
                        // `comptime name: T = v,`
                        self.next_token();
                        self.container_field_member(&mut field_state);
                    }
                }
                TokenTag::KeywordPub => {
                    let decl_token = self.tok_i;
                    self.next_token();
                    match self.expect_top_level_decl() {
                        Ok(decl) => {
                            self.note_decl(&mut field_state, decl_token);
                            self.scratch.push(decl);
                        }
                        Err(Failed) => self.find_next_container_member(),
                    }
                }
                TokenTag::KeywordUsingnamespace
                | TokenTag::KeywordConst
                | TokenTag::KeywordVar
                | TokenTag::KeywordThreadlocal
                | TokenTag::KeywordExtern
                | TokenTag::KeywordExport
                | TokenTag::KeywordInline
                | TokenTag::KeywordFn => {
                    let decl_token = self.tok_i;
                    match self.expect_top_level_decl() {
                        Ok(decl) => {
                            self.note_decl(&mut field_state, decl_token);
                            self.scratch.push(decl);
                        }
                        Err(Failed) => self.find_next_container_member(),
                    }
                }
                TokenTag::Identifier => {
                    self.container_field_member(&mut field_state);
                }
                TokenTag::Eof | TokenTag::RBrace => {
                    if let Some(token) = doc_comment {
                        self.warn_at(token, ParseErrorTag::UnattachedDocComment);
                    }
                    break;
                }
                _ => {
                    self.warn(ParseErrorTag::ExpectedContainerMembers);
                    self.find_next_container_member();
                }
            }
        }
        let items = &self.scratch[save..];
        let members = match items.len() {
            0 => Members {
                len: 0,
                lhs: 0,
                rhs: 0,
            },
            1 => Members {
                len: 1,
                lhs: items[0],
                rhs: 0,
            },
            2 => Members {
                len: 2,
                lhs: items[0],
                rhs: items[1],
            },
            len => {
                let span = self.scratch_to_span(save);
                return Members {
                    len,
                    lhs: span.start,
                    rhs: span.end,
                };
            }
        };
        self.scratch.truncate(save);
        members
    }

    fn note_decl(&mut self, field_state: &mut FieldState, _decl_token: TokenIndex) {
        if let FieldState::Seen = *field_state {
            *field_state = FieldState::End(_decl_token);
        }
    }

    fn container_field_member(&mut self, field_state: &mut FieldState) {
        match self.expect_container_field() {
            Ok(field) => {
                match *field_state {
                    FieldState::None => *field_state = FieldState::Seen,
                    FieldState::Seen | FieldState::Err => {}
                    FieldState::End(token) => {
                        self.warn_at(token, ParseErrorTag::DeclBetweenFields);
                        *field_state = FieldState::Err;
                    }
                }
                self.scratch.push(field);
                match self.current() {
                    TokenTag::Comma => {
                        self.next_token();
                    }
                    TokenTag::RBrace | TokenTag::Eof => {}
                    _ => {
                        self.warn(ParseErrorTag::ExpectedToken(TokenTag::Comma));
                        self.find_next_container_member();
                    }
                }
            }
            Err(Failed) => self.find_next_container_member(),
        }
    }

    /// Skip doc comments; returns the first one for unattached reporting.
    fn eat_doc_comments(&mut self) -> Option<TokenIndex> {
        let mut first = None;
        while self.current() == TokenTag::DocComment {
            let token = self.next_token();
            if first.is_none() {
                if token > 0 && self.same_line(token - 1, token) {
                    self.warn_at(token, ParseErrorTag::SameLineDocComment);
                }
                first = Some(token);
            }
        }
        first
    }

    fn same_line(&self, first: TokenIndex, second: TokenIndex) -> bool {
        let start = self.token_starts[first as usize] as usize;
        let end = self.token_starts[second as usize] as usize;
        !self.source[start..end].contains('\n')
    }

    /// Advance to a plausible next container member.
    fn find_next_container_member(&mut self) {
        let mut level: u32 = 0;
        loop {
            let tok = self.next_token();
            match self.token_tag(tok) {
                TokenTag::Eof => {
                    self.tok_i -= 1;
                    return;
                }
                TokenTag::LBrace | TokenTag::LParen | TokenTag::LBracket => level += 1,
                TokenTag::RBrace => {
                    if level == 0 {
                        self.tok_i -= 1;
                        return;
                    }
                    level -= 1;
                }
                TokenTag::RParen | TokenTag::RBracket => level = level.saturating_sub(1),
                TokenTag::Semicolon | TokenTag::Comma => {
                    if level == 0 {
                        return;
                    }
                }
                TokenTag::KeywordTest
                | TokenTag::KeywordComptime
                | TokenTag::KeywordPub
                | TokenTag::KeywordUsingnamespace
                | TokenTag::KeywordExtern
                | TokenTag::KeywordExport
                | TokenTag::KeywordInline
                | TokenTag::KeywordConst
                | TokenTag::KeywordVar
                | TokenTag::KeywordThreadlocal
                | TokenTag::KeywordFn => {
                    if level == 0 {
                        self.tok_i -= 1;
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Advance to a plausible next statement.
    fn find_next_statement(&mut self) {
        let mut level: u32 = 0;
        loop {
            let tok = self.next_token();
            match self.token_tag(tok) {
                TokenTag::Eof => {
                    self.tok_i -= 1;
                    return;
                }
                TokenTag::LBrace => level += 1,
                TokenTag::RBrace => {
                    if level == 0 {
                        self.tok_i -= 1;
                        return;
                    }
                    level -= 1;
                }
                TokenTag::Semicolon => {
                    if level == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn expect_test_decl(&mut self) -> ParseResult<NodeIndex> {
        let test_token = self.next_token();
        let name_token = self
            .eat_token(TokenTag::StringLiteral)
            .or_else(|| self.eat_token(TokenTag::Identifier));
        if self.current() != TokenTag::LBrace {
            return Err(self.fail(ParseErrorTag::ExpectedBlock));
        }
        let block = self.parse_block()?;
        Ok(self.add_node(
            node::Tag::TestDecl,
            test_token,
            name_token.unwrap_or(0),
            block,
        ))
    }

    fn expect_top_level_decl(&mut self) -> ParseResult<NodeIndex> {
        if self.current() == TokenTag::KeywordUsingnamespace {
            return self.expect_using_namespace();
        }
        let mut is_extern = false;
        match self.current() {
            TokenTag::KeywordExtern => {
                self.next_token();
                self.eat_token(TokenTag::StringLiteral);
                is_extern = true;
            }
            TokenTag::KeywordExport | TokenTag::KeywordInline => {
                self.next_token();
            }
            _ => {}
        }
        self.eat_token(TokenTag::KeywordThreadlocal);
        match self.current() {
            TokenTag::KeywordFn => {
                let fn_proto = self.parse_fn_proto()?;
                match self.current() {
                    TokenTag::Semicolon => {
                        self.next_token();
                        Ok(fn_proto)
                    }
                    TokenTag::LBrace => {
                        if is_extern {
                            self.warn(ParseErrorTag::ExternFnBody);
                        }
                        let body = self.parse_block()?;
                        let fn_token = self.node_main_tokens[fn_proto as usize];
                        Ok(self.add_node(node::Tag::FnDecl, fn_token, fn_proto, body))
                    }
                    _ => {
                        self.warn(ParseErrorTag::ExpectedSemiOrLBrace);
                        Ok(fn_proto)
                    }
                }
            }
            TokenTag::KeywordConst | TokenTag::KeywordVar => {
                let var_decl = self.parse_var_decl()?;
                self.expect_semicolon()?;
                Ok(var_decl)
            }
            _ => Err(self.fail(ParseErrorTag::ExpectedPubItem)),
        }
    }

    fn expect_using_namespace(&mut self) -> ParseResult<NodeIndex> {
        let usingnamespace_token = self.next_token();
        let expr = self.expect_expr()?;
        self.expect_semicolon()?;
        Ok(self.add_node(node::Tag::Usingnamespace, usingnamespace_token, expr, 0))
    }

    fn expect_semicolon(&mut self) -> ParseResult<TokenIndex> {
        self.expect_token(TokenTag::Semicolon)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// `(const|var) name (: type)? align(...)? linksection(...)? (= init)?`
    /// The caller handles the trailing semicolon.
    fn parse_var_decl(&mut self) -> ParseResult<NodeIndex> {
        let mut_token = match self.current() {
            TokenTag::KeywordConst | TokenTag::KeywordVar => self.next_token(),
            _ => return Err(self.fail(ParseErrorTag::ExpectedVarDecl)),
        };
        self.expect_token(TokenTag::Identifier)?;
        let type_node = if self.eat_token(TokenTag::Colon).is_some() {
            self.expect_type_expr()?
        } else {
            0
        };
        let align_node = self.parse_byte_align()?;
        let section_node = self.parse_link_section()?;
        let init_node = if self.eat_token(TokenTag::Equal).is_some() {
            self.expect_expr()?
        } else {
            0
        };
        let decl = if section_node == 0 {
            if align_node == 0 {
                self.add_node(node::Tag::SimpleVarDecl, mut_token, type_node, init_node)
            } else if type_node == 0 {
                self.add_node(node::Tag::AlignedVarDecl, mut_token, align_node, init_node)
            } else {
                let lhs = self.add_extra(extra::LocalVarDecl {
                    type_node,
                    align_node,
                });
                self.add_node(node::Tag::LocalVarDecl, mut_token, lhs, init_node)
            }
        } else {
            let lhs = self.add_extra(extra::GlobalVarDecl {
                type_node,
                align_node,
                section_node,
            });
            self.add_node(node::Tag::GlobalVarDecl, mut_token, lhs, init_node)
        };
        Ok(decl)
    }

    /// `align ( expr )`, or 0 when absent.
    fn parse_byte_align(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::KeywordAlign).is_none() {
            return Ok(0);
        }
        self.expect_token(TokenTag::LParen)?;
        let expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        Ok(expr)
    }

    /// `linksection ( expr )`, or 0 when absent.
    fn parse_link_section(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::KeywordLinksection).is_none() {
            return Ok(0);
        }
        self.expect_token(TokenTag::LParen)?;
        let expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        Ok(expr)
    }

    /// `callconv ( expr )`, or 0 when absent.
    fn parse_callconv(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::KeywordCallconv).is_none() {
            return Ok(0);
        }
        self.expect_token(TokenTag::LParen)?;
        let expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        Ok(expr)
    }

    /// `comptime? name (: type align(...)?)? (= value)?`
    fn expect_container_field(&mut self) -> ParseResult<NodeIndex> {
        self.eat_token(TokenTag::KeywordComptime);
        let name_token = self.expect_token(TokenTag::Identifier)?;
        let type_expr = if self.eat_token(TokenTag::Colon).is_some() {
            self.expect_type_expr()?
        } else {
            0
        };
        let align_expr = self.parse_byte_align()?;
        let value_expr = if self.eat_token(TokenTag::Equal).is_some() {
            self.expect_expr()?
        } else {
            0
        };
        let field = if align_expr == 0 {
            self.add_node(
                node::Tag::ContainerFieldInit,
                name_token,
                type_expr,
                value_expr,
            )
        } else if value_expr == 0 {
            self.add_node(
                node::Tag::ContainerFieldAlign,
                name_token,
                type_expr,
                align_expr,
            )
        } else {
            let rhs = self.add_extra(extra::ContainerField {
                value_expr,
                align_expr,
            });
            self.add_node(node::Tag::ContainerField, name_token, type_expr, rhs)
        };
        Ok(field)
    }

    /// `fn name? ( params ) align? linksection? callconv? !? ReturnType`
    fn parse_fn_proto(&mut self) -> ParseResult<NodeIndex> {
        let fn_token = self.expect_token(TokenTag::KeywordFn)?;
        self.eat_token(TokenTag::Identifier);
        let params = self.parse_param_decl_list()?;
        // The clauses may appear in any order.
        let mut align_expr = 0;
        let mut section_expr = 0;
        let mut callconv_expr = 0;
        loop {
            match self.current() {
                TokenTag::KeywordAlign => {
                    if align_expr != 0 {
                        self.warn(ParseErrorTag::ExtraAlignQualifier);
                    }
                    align_expr = self.parse_byte_align()?;
                }
                TokenTag::KeywordLinksection => {
                    section_expr = self.parse_link_section()?;
                }
                TokenTag::KeywordCallconv => {
                    callconv_expr = self.parse_callconv()?;
                }
                _ => break,
            }
        }
        self.eat_token(TokenTag::Bang);
        let return_type = self.parse_type_expr()?;
        if return_type == 0 {
            self.warn(ParseErrorTag::ExpectedReturnType);
        }
        let proto = if align_expr == 0 && section_expr == 0 && callconv_expr == 0 {
            match params {
                SmallSpan::ZeroOrOne(param) => {
                    self.add_node(node::Tag::FnProtoSimple, fn_token, param, return_type)
                }
                SmallSpan::Multi(span) => {
                    let lhs = self.add_extra(span);
                    self.add_node(node::Tag::FnProtoMulti, fn_token, lhs, return_type)
                }
            }
        } else {
            match params {
                SmallSpan::ZeroOrOne(param) => {
                    let lhs = self.add_extra(extra::FnProtoOne {
                        param,
                        align_expr,
                        section_expr,
                        callconv_expr,
                    });
                    self.add_node(node::Tag::FnProtoOne, fn_token, lhs, return_type)
                }
                SmallSpan::Multi(span) => {
                    let lhs = self.add_extra(extra::FnProto {
                        params_start: span.start,
                        params_end: span.end,
                        align_expr,
                        section_expr,
                        callconv_expr,
                    });
                    self.add_node(node::Tag::FnProto, fn_token, lhs, return_type)
                }
            }
        };
        Ok(proto)
    }

    fn parse_param_decl_list(&mut self) -> ParseResult<SmallSpan> {
        self.expect_token(TokenTag::LParen)?;
        let save = self.scratch.len();
        let mut varargs_token: Option<TokenIndex> = None;
        let mut varargs_warned = false;
        loop {
            if self.eat_token(TokenTag::RParen).is_some() {
                break;
            }
            if varargs_token.is_some() && !varargs_warned {
                self.warn_at(varargs_token.unwrap(), ParseErrorTag::VarargsNonfinal);
                varargs_warned = true;
            }
            let param = match self.expect_param_decl() {
                Ok(param) => param,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            if param != 0 {
                self.scratch.push(param);
            } else if self.token_tag(self.tok_i - 1) == TokenTag::Ellipsis3 {
                varargs_token = Some(self.tok_i - 1);
            }
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RParen => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let items = &self.scratch[save..];
        let result = match items.len() {
            0 => SmallSpan::ZeroOrOne(0),
            1 => SmallSpan::ZeroOrOne(items[0]),
            _ => {
                let span = self.scratch_to_span(save);
                return Ok(SmallSpan::Multi(span));
            }
        };
        self.scratch.truncate(save);
        Ok(result)
    }

    /// One parameter; returns 0 for `anytype` and `...` parameters, which
    /// exist only as tokens.
    fn expect_param_decl(&mut self) -> ParseResult<NodeIndex> {
        while self.eat_token(TokenTag::DocComment).is_some() {}
        match self.current() {
            TokenTag::KeywordNoalias | TokenTag::KeywordComptime => {
                self.next_token();
            }
            _ => {}
        }
        if self.current() == TokenTag::Identifier
            && self.token_tag(self.tok_i + 1) == TokenTag::Colon
        {
            self.tok_i += 2;
        }
        match self.current() {
            TokenTag::KeywordAnytype | TokenTag::Ellipsis3 => {
                self.next_token();
                Ok(0)
            }
            _ => self.expect_type_expr(),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_block(&mut self) -> ParseResult<NodeIndex> {
        let lbrace = match self.eat_token(TokenTag::LBrace) {
            Some(token) => token,
            None => return Err(self.fail(ParseErrorTag::ExpectedBlock)),
        };
        let save = self.scratch.len();
        loop {
            match self.current() {
                TokenTag::RBrace => break,
                TokenTag::Eof => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::RBrace)));
                }
                _ => {}
            }
            match self.expect_statement() {
                Ok(stmt) => self.scratch.push(stmt),
                Err(Failed) => self.find_next_statement(),
            }
        }
        let rbrace = self.next_token();
        let trailing_semicolon = rbrace > 0 && self.token_tag(rbrace - 1) == TokenTag::Semicolon;
        let items_len = self.scratch.len() - save;
        let block = match items_len {
            0 => self.add_node(node::Tag::BlockTwo, lbrace, 0, 0),
            1 => {
                let s0 = self.scratch[save];
                self.scratch.truncate(save);
                let tag = if trailing_semicolon {
                    node::Tag::BlockTwoSemicolon
                } else {
                    node::Tag::BlockTwo
                };
                self.add_node(tag, lbrace, s0, 0)
            }
            2 => {
                let s0 = self.scratch[save];
                let s1 = self.scratch[save + 1];
                self.scratch.truncate(save);
                let tag = if trailing_semicolon {
                    node::Tag::BlockTwoSemicolon
                } else {
                    node::Tag::BlockTwo
                };
                self.add_node(tag, lbrace, s0, s1)
            }
            _ => {
                let span = self.scratch_to_span(save);
                let tag = if trailing_semicolon {
                    node::Tag::BlockSemicolon
                } else {
                    node::Tag::Block
                };
                self.add_node(tag, lbrace, span.start, span.end)
            }
        };
        Ok(block)
    }

    fn expect_statement(&mut self) -> ParseResult<NodeIndex> {
        if let Some(comptime_token) = self.eat_token(TokenTag::KeywordComptime) {
            match self.current() {
                TokenTag::KeywordConst | TokenTag::KeywordVar => {
                    let var_decl = self.parse_var_decl()?;
                    self.expect_semicolon()?;
                    return Ok(var_decl);
                }
                TokenTag::LBrace => {
                    let block = self.parse_block()?;
                    return Ok(self.add_node(node::Tag::Comptime, comptime_token, block, 0));
                }
                _ => {
                    let expr = self.expect_assign_expr()?;
                    self.expect_semicolon()?;
                    return Ok(self.add_node(node::Tag::Comptime, comptime_token, expr, 0));
                }
            }
        }
        match self.current() {
            TokenTag::KeywordConst | TokenTag::KeywordVar => {
                let var_decl = self.parse_var_decl()?;
                self.expect_semicolon()?;
                Ok(var_decl)
            }
            TokenTag::KeywordNosuspend => {
                let token = self.next_token();
                let expr = self.expect_block_expr_statement()?;
                Ok(self.add_node(node::Tag::Nosuspend, token, expr, 0))
            }
            TokenTag::KeywordSuspend => {
                let token = self.next_token();
                if self.eat_token(TokenTag::Semicolon).is_some() {
                    return Ok(self.add_node(node::Tag::Suspend, token, 0, 0));
                }
                let expr = self.expect_block_expr_statement()?;
                Ok(self.add_node(node::Tag::Suspend, token, expr, 0))
            }
            TokenTag::KeywordDefer => {
                let token = self.next_token();
                let expr = self.expect_block_expr_statement()?;
                Ok(self.add_node(node::Tag::Defer, token, 0, expr))
            }
            TokenTag::KeywordErrdefer => {
                let token = self.next_token();
                let payload = self.parse_payload()?;
                let expr = self.expect_block_expr_statement()?;
                Ok(self.add_node(node::Tag::Errdefer, token, payload, expr))
            }
            TokenTag::KeywordSwitch => self.expect_switch_expr(),
            TokenTag::KeywordIf => self.expect_if_statement(),
            TokenTag::KeywordWhile | TokenTag::KeywordFor | TokenTag::KeywordInline => {
                self.parse_loop_statement(None)
            }
            TokenTag::Identifier if self.token_tag(self.tok_i + 1) == TokenTag::Colon => {
                self.parse_labeled_statement()
            }
            TokenTag::LBrace => self.parse_block(),
            _ => {
                let expr = self.parse_assign_expr()?;
                if expr == 0 {
                    return Err(self.fail(ParseErrorTag::ExpectedStatement));
                }
                self.expect_semicolon()?;
                Ok(expr)
            }
        }
    }

    /// Body of `defer`, `errdefer`, `suspend`, `nosuspend`, `comptime`:
    /// a block, or an assign expression with a semicolon.
    fn expect_block_expr_statement(&mut self) -> ParseResult<NodeIndex> {
        if self.current() == TokenTag::LBrace {
            return self.parse_block();
        }
        let expr = self.parse_assign_expr()?;
        if expr == 0 {
            return Err(self.fail(ParseErrorTag::ExpectedBlockOrExpr));
        }
        self.expect_semicolon()?;
        Ok(expr)
    }

    fn parse_labeled_statement(&mut self) -> ParseResult<NodeIndex> {
        // current is `identifier :`
        match self.token_tag(self.tok_i + 2) {
            TokenTag::LBrace => {
                self.tok_i += 2;
                self.parse_block()
            }
            TokenTag::KeywordWhile | TokenTag::KeywordFor | TokenTag::KeywordInline => {
                let label = self.tok_i;
                self.tok_i += 2;
                self.parse_loop_statement(Some(label))
            }
            _ => {
                self.tok_i += 2;
                Err(self.fail(ParseErrorTag::ExpectedLabelable))
            }
        }
    }

    fn parse_loop_statement(&mut self, _label: Option<TokenIndex>) -> ParseResult<NodeIndex> {
        self.eat_token(TokenTag::KeywordInline);
        match self.current() {
            TokenTag::KeywordWhile => self.expect_while_statement(),
            TokenTag::KeywordFor => self.expect_for_statement(),
            _ => Err(self.fail(ParseErrorTag::ExpectedLabelable)),
        }
    }

    fn expect_if_statement(&mut self) -> ParseResult<NodeIndex> {
        let if_token = self.expect_token(TokenTag::KeywordIf)?;
        self.expect_token(TokenTag::LParen)?;
        let cond_expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        self.parse_ptr_payload()?;

        let mut else_required = false;
        let then_expr = if self.current() == TokenTag::LBrace {
            self.parse_block()?
        } else {
            let assign = self.parse_assign_expr()?;
            if assign == 0 {
                return Err(self.fail(ParseErrorTag::ExpectedBlockOrAssignment));
            }
            if self.eat_token(TokenTag::Semicolon).is_some() {
                return Ok(self.add_node(node::Tag::IfSimple, if_token, cond_expr, assign));
            }
            else_required = true;
            assign
        };
        if self.eat_token(TokenTag::KeywordElse).is_none() {
            if else_required {
                self.warn(ParseErrorTag::ExpectedSemiOrElse);
            }
            return Ok(self.add_node(node::Tag::IfSimple, if_token, cond_expr, then_expr));
        }
        self.parse_payload()?;
        let else_expr = self.expect_statement()?;
        let rhs = self.add_extra(extra::If {
            then_expr,
            else_expr,
        });
        Ok(self.add_node(node::Tag::If, if_token, cond_expr, rhs))
    }

    fn expect_while_statement(&mut self) -> ParseResult<NodeIndex> {
        let while_token = self.expect_token(TokenTag::KeywordWhile)?;
        self.expect_token(TokenTag::LParen)?;
        let cond_expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        self.parse_ptr_payload()?;
        let cont_expr = self.parse_while_continue_expr()?;

        let mut else_required = false;
        let then_expr = if self.current() == TokenTag::LBrace {
            self.parse_block()?
        } else {
            let assign = self.parse_assign_expr()?;
            if assign == 0 {
                return Err(self.fail(ParseErrorTag::ExpectedBlockOrAssignment));
            }
            if self.eat_token(TokenTag::Semicolon).is_some() {
                return Ok(self.while_node(while_token, cond_expr, cont_expr, assign, 0));
            }
            else_required = true;
            assign
        };
        if self.eat_token(TokenTag::KeywordElse).is_none() {
            if else_required {
                self.warn(ParseErrorTag::ExpectedSemiOrElse);
            }
            return Ok(self.while_node(while_token, cond_expr, cont_expr, then_expr, 0));
        }
        self.parse_payload()?;
        let else_expr = self.expect_statement()?;
        Ok(self.while_node(while_token, cond_expr, cont_expr, then_expr, else_expr))
    }

    fn while_node(
        &mut self,
        while_token: TokenIndex,
        cond_expr: NodeIndex,
        cont_expr: NodeIndex,
        then_expr: NodeIndex,
        else_expr: NodeIndex,
    ) -> NodeIndex {
        if else_expr != 0 {
            let rhs = self.add_extra(extra::While {
                cont_expr,
                then_expr,
                else_expr,
            });
            self.add_node(node::Tag::While, while_token, cond_expr, rhs)
        } else if cont_expr != 0 {
            let rhs = self.add_extra(extra::WhileCont {
                cont_expr,
                then_expr,
            });
            self.add_node(node::Tag::WhileCont, while_token, cond_expr, rhs)
        } else {
            self.add_node(node::Tag::WhileSimple, while_token, cond_expr, then_expr)
        }
    }

    fn expect_for_statement(&mut self) -> ParseResult<NodeIndex> {
        let for_token = self.expect_token(TokenTag::KeywordFor)?;
        self.expect_token(TokenTag::LParen)?;
        let input = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        if !self.expect_ptr_index_payload()? {
            return Err(self.fail(ParseErrorTag::ExpectedLoopPayload));
        }

        let mut else_required = false;
        let then_expr = if self.current() == TokenTag::LBrace {
            self.parse_block()?
        } else {
            let assign = self.parse_assign_expr()?;
            if assign == 0 {
                return Err(self.fail(ParseErrorTag::ExpectedBlockOrAssignment));
            }
            if self.eat_token(TokenTag::Semicolon).is_some() {
                return Ok(self.add_node(node::Tag::ForSimple, for_token, input, assign));
            }
            else_required = true;
            assign
        };
        if self.eat_token(TokenTag::KeywordElse).is_none() {
            if else_required {
                self.warn(ParseErrorTag::ExpectedSemiOrElse);
            }
            return Ok(self.add_node(node::Tag::ForSimple, for_token, input, then_expr));
        }
        let else_expr = self.expect_statement()?;
        let rhs = self.add_extra(extra::If {
            then_expr,
            else_expr,
        });
        Ok(self.add_node(node::Tag::For, for_token, input, rhs))
    }

    /// `: ( AssignExpr )` after a while payload.
    fn parse_while_continue_expr(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::Colon).is_none() {
            return Ok(0);
        }
        self.expect_token(TokenTag::LParen)?;
        let expr = self.expect_assign_expr()?;
        self.expect_token(TokenTag::RParen)?;
        Ok(expr)
    }

    /// `|name|`; returns the capture token or 0.
    fn parse_payload(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::Pipe).is_none() {
            return Ok(0);
        }
        let identifier = self.expect_token(TokenTag::Identifier)?;
        self.expect_token(TokenTag::Pipe)?;
        Ok(identifier)
    }

    /// `|*name|`; returns the capture token or 0.
    fn parse_ptr_payload(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::Pipe).is_none() {
            return Ok(0);
        }
        self.eat_token(TokenTag::Asterisk);
        let identifier = self.expect_token(TokenTag::Identifier)?;
        self.expect_token(TokenTag::Pipe)?;
        Ok(identifier)
    }

    /// `|*name, index|`; returns whether a payload was present.
    fn expect_ptr_index_payload(&mut self) -> ParseResult<bool> {
        if self.eat_token(TokenTag::Pipe).is_none() {
            return Ok(false);
        }
        self.eat_token(TokenTag::Asterisk);
        self.expect_token(TokenTag::Identifier)?;
        if self.eat_token(TokenTag::Comma).is_some() {
            self.expect_token(TokenTag::Identifier)?;
        }
        self.expect_token(TokenTag::Pipe)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_assign_expr(&mut self) -> ParseResult<NodeIndex> {
        let lhs = self.parse_expr()?;
        if lhs == 0 {
            return Ok(0);
        }
        let tag = match self.current() {
            TokenTag::AsteriskEqual => node::Tag::AssignMul,
            TokenTag::SlashEqual => node::Tag::AssignDiv,
            TokenTag::PercentEqual => node::Tag::AssignMod,
            TokenTag::PlusEqual => node::Tag::AssignAdd,
            TokenTag::MinusEqual => node::Tag::AssignSub,
            TokenTag::AngleBracketAngleBracketLeftEqual => node::Tag::AssignShl,
            TokenTag::AngleBracketAngleBracketRightEqual => node::Tag::AssignShr,
            TokenTag::AmpersandEqual => node::Tag::AssignBitAnd,
            TokenTag::CaretEqual => node::Tag::AssignBitXor,
            TokenTag::PipeEqual => node::Tag::AssignBitOr,
            TokenTag::AsteriskPercentEqual => node::Tag::AssignMulWrap,
            TokenTag::PlusPercentEqual => node::Tag::AssignAddWrap,
            TokenTag::MinusPercentEqual => node::Tag::AssignSubWrap,
            TokenTag::Equal => node::Tag::Assign,
            _ => return Ok(lhs),
        };
        let oper_token = self.next_token();
        let rhs = self.expect_expr()?;
        Ok(self.add_node(tag, oper_token, lhs, rhs))
    }

    fn expect_assign_expr(&mut self) -> ParseResult<NodeIndex> {
        let expr = self.parse_assign_expr()?;
        if expr == 0 {
            return Err(self.fail(ParseErrorTag::ExpectedExprOrAssignment));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> ParseResult<NodeIndex> {
        self.parse_expr_precedence(0)
    }

    fn expect_expr(&mut self) -> ParseResult<NodeIndex> {
        let expr = self.parse_expr()?;
        if expr == 0 {
            return Err(self.fail(ParseErrorTag::ExpectedExpr));
        }
        Ok(expr)
    }

    fn parse_expr_precedence(&mut self, min_prec: i8) -> ParseResult<NodeIndex> {
        let mut lhs = self.parse_prefix_expr()?;
        if lhs == 0 {
            return Ok(0);
        }
        let mut banned_prec: i8 = -1;
        loop {
            let tok_tag = self.current();
            // `&&` is a single diagnostic, then parsed as boolean AND.
            if tok_tag == TokenTag::Ampersand
                && self.token_tag(self.tok_i + 1) == TokenTag::Ampersand
                && self.token_starts[(self.tok_i + 1) as usize]
                    == self.token_starts[self.tok_i as usize] + 1
            {
                self.warn(ParseErrorTag::InvalidAmpersandAmpersand);
                let oper_token = self.next_token();
                self.next_token();
                let rhs = self.parse_expr_precedence(21)?;
                if rhs == 0 {
                    self.warn(ParseErrorTag::ExpectedExpr);
                    return Ok(lhs);
                }
                lhs = self.add_node(node::Tag::BoolAnd, oper_token, lhs, rhs);
                continue;
            }
            let Some(info) = oper_info(tok_tag) else {
                break;
            };
            if info.prec < min_prec {
                break;
            }
            if info.prec == banned_prec {
                return Err(self.fail(ParseErrorTag::ChainedComparisonOperators));
            }
            let oper_token = self.next_token();
            if tok_tag == TokenTag::KeywordCatch {
                self.parse_payload()?;
            }
            let rhs = self.parse_expr_precedence(info.prec + 1)?;
            if rhs == 0 {
                self.warn(ParseErrorTag::ExpectedExpr);
                return Ok(lhs);
            }
            lhs = self.add_node(info.tag, oper_token, lhs, rhs);
            if !info.chainable {
                banned_prec = info.prec;
            }
        }
        Ok(lhs)
    }

    fn parse_prefix_expr(&mut self) -> ParseResult<NodeIndex> {
        let tag = match self.current() {
            TokenTag::Bang => node::Tag::BoolNot,
            TokenTag::Minus => node::Tag::Negation,
            TokenTag::Tilde => node::Tag::BitNot,
            TokenTag::MinusPercent => node::Tag::NegationWrap,
            TokenTag::Ampersand => node::Tag::AddressOf,
            TokenTag::KeywordTry => node::Tag::Try,
            TokenTag::KeywordAwait => node::Tag::Await,
            _ => return self.parse_primary_expr(),
        };
        let main_token = self.next_token();
        let operand = self.expect_prefix_expr()?;
        Ok(self.add_node(tag, main_token, operand, 0))
    }

    fn expect_prefix_expr(&mut self) -> ParseResult<NodeIndex> {
        let expr = self.parse_prefix_expr()?;
        if expr == 0 {
            return Err(self.fail(ParseErrorTag::ExpectedPrefixExpr));
        }
        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> ParseResult<NodeIndex> {
        match self.current() {
            TokenTag::KeywordAsm => self.expect_asm_expr(),
            TokenTag::KeywordIf => self.parse_if_expr(),
            TokenTag::KeywordSwitch => self.expect_switch_expr(),
            TokenTag::KeywordBreak => {
                let token = self.next_token();
                let label = self.parse_break_label()?;
                let rhs = self.parse_expr()?;
                Ok(self.add_node(node::Tag::Break, token, label, rhs))
            }
            TokenTag::KeywordContinue => {
                let token = self.next_token();
                let label = self.parse_break_label()?;
                Ok(self.add_node(node::Tag::Continue, token, label, 0))
            }
            TokenTag::KeywordComptime => {
                let token = self.next_token();
                let expr = self.expect_expr()?;
                Ok(self.add_node(node::Tag::Comptime, token, expr, 0))
            }
            TokenTag::KeywordNosuspend => {
                let token = self.next_token();
                let expr = self.expect_expr()?;
                Ok(self.add_node(node::Tag::Nosuspend, token, expr, 0))
            }
            TokenTag::KeywordResume => {
                let token = self.next_token();
                let expr = self.expect_expr()?;
                Ok(self.add_node(node::Tag::Resume, token, expr, 0))
            }
            TokenTag::KeywordReturn => {
                let token = self.next_token();
                let expr = self.parse_expr()?;
                Ok(self.add_node(node::Tag::Return, token, expr, 0))
            }
            TokenTag::Identifier if self.token_tag(self.tok_i + 1) == TokenTag::Colon => {
                match self.token_tag(self.tok_i + 2) {
                    TokenTag::KeywordInline
                    | TokenTag::KeywordWhile
                    | TokenTag::KeywordFor => {
                        self.tok_i += 2;
                        self.parse_loop_expr()
                    }
                    TokenTag::LBrace => {
                        self.tok_i += 2;
                        self.parse_block()
                    }
                    _ => self.parse_curly_suffix_expr(),
                }
            }
            TokenTag::KeywordInline | TokenTag::KeywordWhile | TokenTag::KeywordFor => {
                self.parse_loop_expr()
            }
            TokenTag::LBrace => self.parse_block(),
            _ => self.parse_curly_suffix_expr(),
        }
    }

    fn parse_break_label(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::Colon).is_none() {
            return Ok(0);
        }
        let label = self.expect_token(TokenTag::Identifier)?;
        Ok(label)
    }

    fn parse_loop_expr(&mut self) -> ParseResult<NodeIndex> {
        self.eat_token(TokenTag::KeywordInline);
        match self.current() {
            TokenTag::KeywordWhile => self.parse_while_expr(),
            TokenTag::KeywordFor => self.parse_for_expr(),
            _ => Err(self.fail(ParseErrorTag::ExpectedLabelable)),
        }
    }

    fn parse_if_expr(&mut self) -> ParseResult<NodeIndex> {
        let if_token = self.expect_token(TokenTag::KeywordIf)?;
        self.expect_token(TokenTag::LParen)?;
        let cond_expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        self.parse_ptr_payload()?;
        let then_expr = self.expect_expr()?;
        if self.eat_token(TokenTag::KeywordElse).is_none() {
            return Ok(self.add_node(node::Tag::IfSimple, if_token, cond_expr, then_expr));
        }
        self.parse_payload()?;
        let else_expr = self.expect_expr()?;
        let rhs = self.add_extra(extra::If {
            then_expr,
            else_expr,
        });
        Ok(self.add_node(node::Tag::If, if_token, cond_expr, rhs))
    }

    fn parse_while_expr(&mut self) -> ParseResult<NodeIndex> {
        let while_token = self.expect_token(TokenTag::KeywordWhile)?;
        self.expect_token(TokenTag::LParen)?;
        let cond_expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        self.parse_ptr_payload()?;
        let cont_expr = self.parse_while_continue_expr()?;
        let then_expr = self.expect_expr()?;
        if self.eat_token(TokenTag::KeywordElse).is_none() {
            return Ok(self.while_node(while_token, cond_expr, cont_expr, then_expr, 0));
        }
        self.parse_payload()?;
        let else_expr = self.expect_expr()?;
        Ok(self.while_node(while_token, cond_expr, cont_expr, then_expr, else_expr))
    }

    fn parse_for_expr(&mut self) -> ParseResult<NodeIndex> {
        let for_token = self.expect_token(TokenTag::KeywordFor)?;
        self.expect_token(TokenTag::LParen)?;
        let input = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        if !self.expect_ptr_index_payload()? {
            return Err(self.fail(ParseErrorTag::ExpectedLoopPayload));
        }
        let then_expr = self.expect_expr()?;
        if self.eat_token(TokenTag::KeywordElse).is_none() {
            return Ok(self.add_node(node::Tag::ForSimple, for_token, input, then_expr));
        }
        let else_expr = self.expect_expr()?;
        let rhs = self.add_extra(extra::If {
            then_expr,
            else_expr,
        });
        Ok(self.add_node(node::Tag::For, for_token, input, rhs))
    }

    /// TypeExpr followed by an optional init list: `T{…}`.
    fn parse_curly_suffix_expr(&mut self) -> ParseResult<NodeIndex> {
        let lhs = self.parse_type_expr()?;
        if lhs == 0 {
            return Ok(0);
        }
        let Some(lbrace) = self.eat_token(TokenTag::LBrace) else {
            return Ok(lhs);
        };
        if self.eat_token(TokenTag::RBrace).is_some() {
            // An empty init list is always a struct init.
            return Ok(self.add_node(node::Tag::StructInitOne, lbrace, lhs, 0));
        }
        if self.is_field_init() {
            let (fields, trailing) = self.parse_field_init_list()?;
            let init = match fields {
                SmallSpan::ZeroOrOne(field) => {
                    let tag = if trailing {
                        node::Tag::StructInitOneComma
                    } else {
                        node::Tag::StructInitOne
                    };
                    self.add_node(tag, lbrace, lhs, field)
                }
                SmallSpan::Multi(span) => {
                    let rhs = self.add_extra(span);
                    let tag = if trailing {
                        node::Tag::StructInitComma
                    } else {
                        node::Tag::StructInit
                    };
                    self.add_node(tag, lbrace, lhs, rhs)
                }
            };
            return Ok(init);
        }
        let (elements, trailing) = self.parse_element_init_list()?;
        let init = match elements {
            SmallSpan::ZeroOrOne(element) => {
                let tag = if trailing {
                    node::Tag::ArrayInitOneComma
                } else {
                    node::Tag::ArrayInitOne
                };
                self.add_node(tag, lbrace, lhs, element)
            }
            SmallSpan::Multi(span) => {
                let rhs = self.add_extra(span);
                let tag = if trailing {
                    node::Tag::ArrayInitComma
                } else {
                    node::Tag::ArrayInit
                };
                self.add_node(tag, lbrace, lhs, rhs)
            }
        };
        Ok(init)
    }

    fn is_field_init(&self) -> bool {
        self.current() == TokenTag::Period
            && self.token_tag(self.tok_i + 1) == TokenTag::Identifier
            && self.token_tag(self.tok_i + 2) == TokenTag::Equal
    }

    /// `.name = expr` list up to and including the closing brace.
    fn parse_field_init_list(&mut self) -> ParseResult<(SmallSpan, bool)> {
        let save = self.scratch.len();
        loop {
            if self.current() == TokenTag::RBrace {
                break;
            }
            if !self.is_field_init() {
                self.scratch.truncate(save);
                return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Period)));
            }
            self.tok_i += 3;
            let expr = match self.expect_expr() {
                Ok(expr) => expr,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            self.scratch.push(expr);
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RBrace => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let rbrace = self.next_token();
        let trailing = self.token_tag(rbrace - 1) == TokenTag::Comma;
        Ok((self.small_span(save), trailing))
    }

    /// Expression list up to and including the closing brace.
    fn parse_element_init_list(&mut self) -> ParseResult<(SmallSpan, bool)> {
        let save = self.scratch.len();
        loop {
            if self.current() == TokenTag::RBrace {
                break;
            }
            let expr = match self.expect_expr() {
                Ok(expr) => expr,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            self.scratch.push(expr);
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RBrace => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let rbrace = self.next_token();
        let trailing = self.token_tag(rbrace - 1) == TokenTag::Comma;
        Ok((self.small_span(save), trailing))
    }

    fn small_span(&mut self, save: usize) -> SmallSpan {
        let items = &self.scratch[save..];
        match items.len() {
            0 => {
                self.scratch.truncate(save);
                SmallSpan::ZeroOrOne(0)
            }
            1 => {
                let item = items[0];
                self.scratch.truncate(save);
                SmallSpan::ZeroOrOne(item)
            }
            _ => SmallSpan::Multi(self.scratch_to_span(save)),
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn expect_type_expr(&mut self) -> ParseResult<NodeIndex> {
        let expr = self.parse_type_expr()?;
        if expr == 0 {
            return Err(self.fail(ParseErrorTag::ExpectedTypeExpr));
        }
        Ok(expr)
    }

    fn parse_type_expr(&mut self) -> ParseResult<NodeIndex> {
        match self.current() {
            TokenTag::QuestionMark => {
                let token = self.next_token();
                let child = self.expect_type_expr()?;
                Ok(self.add_node(node::Tag::OptionalType, token, child, 0))
            }
            TokenTag::KeywordAnyframe => {
                if self.token_tag(self.tok_i + 1) == TokenTag::Arrow {
                    let token = self.next_token();
                    let arrow = self.next_token();
                    let child = self.expect_type_expr()?;
                    Ok(self.add_node(node::Tag::AnyframeType, token, arrow, child))
                } else {
                    self.parse_error_union_expr()
                }
            }
            TokenTag::Asterisk => {
                let asterisk = self.next_token();
                let mods = self.parse_ptr_modifiers()?;
                let child = self.expect_type_expr()?;
                Ok(self.ptr_type_node(asterisk, 0, mods, child))
            }
            TokenTag::AsteriskAsterisk => {
                // One `**` token shared by two nested pointer types.
                let asterisk = self.next_token();
                let mods = self.parse_ptr_modifiers()?;
                let child = self.expect_type_expr()?;
                let inner = self.ptr_type_node(asterisk, 0, mods, child);
                Ok(self.add_node(node::Tag::PtrTypeAligned, asterisk, 0, inner))
            }
            TokenTag::LBracket => match self.token_tag(self.tok_i + 1) {
                TokenTag::Asterisk => {
                    self.next_token(); // [
                    let asterisk = self.next_token();
                    let mut sentinel = 0;
                    if let Some(ident) = self.eat_token(TokenTag::Identifier) {
                        // Only the lone `c` qualifier is valid here.
                        let start = self.token_starts[ident as usize] as usize;
                        let bytes = self.source.as_bytes();
                        let lone_c = bytes[start] == b'c'
                            && !bytes
                                .get(start + 1)
                                .map_or(false, |b| b.is_ascii_alphanumeric() || *b == b'_');
                        if !lone_c {
                            self.tok_i -= 1;
                        }
                    } else if self.eat_token(TokenTag::Colon).is_some() {
                        sentinel = self.expect_expr()?;
                    }
                    self.expect_token(TokenTag::RBracket)?;
                    let mods = self.parse_ptr_modifiers()?;
                    let child = self.expect_type_expr()?;
                    Ok(self.ptr_type_node(asterisk, sentinel, mods, child))
                }
                _ => {
                    let lbracket = self.next_token();
                    match self.current() {
                        TokenTag::RBracket | TokenTag::Colon => {
                            // Slice type, with optional sentinel.
                            let mut sentinel = 0;
                            if self.eat_token(TokenTag::Colon).is_some() {
                                sentinel = self.expect_expr()?;
                            }
                            self.expect_token(TokenTag::RBracket)?;
                            let mut mods = self.parse_ptr_modifiers()?;
                            if mods.bit_range_start != 0 {
                                self.warn(ParseErrorTag::InvalidBitRange);
                                mods.bit_range_start = 0;
                                mods.bit_range_end = 0;
                            }
                            let child = self.expect_type_expr()?;
                            Ok(self.ptr_type_node(lbracket, sentinel, mods, child))
                        }
                        _ => {
                            // Array type.
                            let elem_count = self.expect_expr()?;
                            let sentinel = if self.eat_token(TokenTag::Colon).is_some() {
                                self.expect_expr()?
                            } else {
                                0
                            };
                            self.expect_token(TokenTag::RBracket)?;
                            let elem_type = self.expect_type_expr()?;
                            if sentinel == 0 {
                                Ok(self.add_node(
                                    node::Tag::ArrayType,
                                    lbracket,
                                    elem_count,
                                    elem_type,
                                ))
                            } else {
                                let rhs = self.add_extra(extra::ArrayTypeSentinel {
                                    sentinel,
                                    elem_type,
                                });
                                Ok(self.add_node(
                                    node::Tag::ArrayTypeSentinel,
                                    lbracket,
                                    elem_count,
                                    rhs,
                                ))
                            }
                        }
                    }
                }
            },
            _ => self.parse_error_union_expr(),
        }
    }

    fn ptr_type_node(
        &mut self,
        main_token: TokenIndex,
        sentinel: NodeIndex,
        mods: PtrModifiers,
        child: NodeIndex,
    ) -> NodeIndex {
        if mods.bit_range_start != 0 {
            let lhs = self.add_extra(extra::PtrTypeBitRange {
                sentinel,
                align_node: mods.align_node,
                bit_range_start: mods.bit_range_start,
                bit_range_end: mods.bit_range_end,
            });
            self.add_node(node::Tag::PtrTypeBitRange, main_token, lhs, child)
        } else if sentinel != 0 {
            if mods.align_node == 0 {
                self.add_node(node::Tag::PtrTypeSentinel, main_token, sentinel, child)
            } else {
                let lhs = self.add_extra(extra::PtrType {
                    sentinel,
                    align_node: mods.align_node,
                });
                self.add_node(node::Tag::PtrType, main_token, lhs, child)
            }
        } else {
            self.add_node(node::Tag::PtrTypeAligned, main_token, mods.align_node, child)
        }
    }

    fn parse_ptr_modifiers(&mut self) -> ParseResult<PtrModifiers> {
        let mut result = PtrModifiers {
            align_node: 0,
            bit_range_start: 0,
            bit_range_end: 0,
        };
        let mut saw_const = false;
        let mut saw_volatile = false;
        let mut saw_allowzero = false;
        loop {
            match self.current() {
                TokenTag::KeywordAlign => {
                    if result.align_node != 0 {
                        self.warn(ParseErrorTag::ExtraAlignQualifier);
                    }
                    self.next_token();
                    self.expect_token(TokenTag::LParen)?;
                    result.align_node = self.expect_expr()?;
                    if self.eat_token(TokenTag::Colon).is_some() {
                        result.bit_range_start = self.expect_expr()?;
                        self.expect_token(TokenTag::Colon)?;
                        result.bit_range_end = self.expect_expr()?;
                    }
                    self.expect_token(TokenTag::RParen)?;
                }
                TokenTag::KeywordConst => {
                    if saw_const {
                        self.warn(ParseErrorTag::ExtraConstQualifier);
                    }
                    saw_const = true;
                    self.next_token();
                }
                TokenTag::KeywordVolatile => {
                    if saw_volatile {
                        self.warn(ParseErrorTag::ExtraVolatileQualifier);
                    }
                    saw_volatile = true;
                    self.next_token();
                }
                TokenTag::KeywordAllowzero => {
                    if saw_allowzero {
                        self.warn(ParseErrorTag::ExtraAllowzeroQualifier);
                    }
                    saw_allowzero = true;
                    self.next_token();
                }
                _ => return Ok(result),
            }
        }
    }

    fn parse_error_union_expr(&mut self) -> ParseResult<NodeIndex> {
        let suffix = self.parse_suffix_expr()?;
        if suffix == 0 {
            return Ok(0);
        }
        let Some(bang) = self.eat_token(TokenTag::Bang) else {
            return Ok(suffix);
        };
        let rhs = self.expect_type_expr()?;
        Ok(self.add_node(node::Tag::ErrorUnion, bang, suffix, rhs))
    }

    // ------------------------------------------------------------------
    // Suffixes and calls
    // ------------------------------------------------------------------

    fn parse_suffix_expr(&mut self) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::KeywordAsync).is_some() {
            let mut res = self.expect_primary_type_expr()?;
            loop {
                let suffix = self.parse_suffix_op(res)?;
                if suffix != 0 {
                    res = suffix;
                    continue;
                }
                break;
            }
            let Some(lparen) = self.eat_token(TokenTag::LParen) else {
                self.warn(ParseErrorTag::ExpectedParamList);
                return Ok(res);
            };
            let (args, trailing) = self.parse_call_args()?;
            let call = match args {
                SmallSpan::ZeroOrOne(arg) => {
                    let tag = if trailing {
                        node::Tag::AsyncCallOneComma
                    } else {
                        node::Tag::AsyncCallOne
                    };
                    self.add_node(tag, lparen, res, arg)
                }
                SmallSpan::Multi(span) => {
                    let rhs = self.add_extra(span);
                    let tag = if trailing {
                        node::Tag::AsyncCallComma
                    } else {
                        node::Tag::AsyncCall
                    };
                    self.add_node(tag, lparen, res, rhs)
                }
            };
            return Ok(call);
        }
        let mut res = self.parse_primary_type_expr()?;
        if res == 0 {
            return Ok(0);
        }
        loop {
            let suffix = self.parse_suffix_op(res)?;
            if suffix != 0 {
                res = suffix;
                continue;
            }
            let Some(lparen) = self.eat_token(TokenTag::LParen) else {
                return Ok(res);
            };
            let (args, trailing) = self.parse_call_args()?;
            res = match args {
                SmallSpan::ZeroOrOne(arg) => {
                    let tag = if trailing {
                        node::Tag::CallOneComma
                    } else {
                        node::Tag::CallOne
                    };
                    self.add_node(tag, lparen, res, arg)
                }
                SmallSpan::Multi(span) => {
                    let rhs = self.add_extra(span);
                    let tag = if trailing {
                        node::Tag::CallComma
                    } else {
                        node::Tag::Call
                    };
                    self.add_node(tag, lparen, res, rhs)
                }
            };
        }
    }

    /// Argument list up to and including the closing paren.
    fn parse_call_args(&mut self) -> ParseResult<(SmallSpan, bool)> {
        let save = self.scratch.len();
        loop {
            if self.current() == TokenTag::RParen {
                break;
            }
            let arg = match self.expect_expr() {
                Ok(arg) => arg,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            self.scratch.push(arg);
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RParen => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let rparen = self.next_token();
        let trailing = self.token_tag(rparen - 1) == TokenTag::Comma;
        Ok((self.small_span(save), trailing))
    }

    /// One suffix operator applied to `lhs`, or 0 when the current token
    /// does not start one.
    fn parse_suffix_op(&mut self, lhs: NodeIndex) -> ParseResult<NodeIndex> {
        match self.current() {
            TokenTag::LBracket => {
                let lbracket = self.next_token();
                let index_expr = self.expect_expr()?;
                if self.eat_token(TokenTag::Ellipsis2).is_some() {
                    let end_expr = match self.current() {
                        TokenTag::RBracket | TokenTag::Colon => 0,
                        _ => self.expect_expr()?,
                    };
                    let sentinel = if self.eat_token(TokenTag::Colon).is_some() {
                        self.expect_expr()?
                    } else {
                        0
                    };
                    self.expect_token(TokenTag::RBracket)?;
                    if sentinel != 0 {
                        let rhs = self.add_extra(extra::SliceSentinel {
                            start: index_expr,
                            end: end_expr,
                            sentinel,
                        });
                        return Ok(self.add_node(node::Tag::SliceSentinel, lbracket, lhs, rhs));
                    }
                    if end_expr != 0 {
                        let rhs = self.add_extra(extra::Slice {
                            start: index_expr,
                            end: end_expr,
                        });
                        return Ok(self.add_node(node::Tag::Slice, lbracket, lhs, rhs));
                    }
                    return Ok(self.add_node(node::Tag::SliceOpen, lbracket, lhs, index_expr));
                }
                self.expect_token(TokenTag::RBracket)?;
                Ok(self.add_node(node::Tag::ArrayAccess, lbracket, lhs, index_expr))
            }
            TokenTag::PeriodAsterisk => {
                let deref_token = self.next_token();
                if self.current() == TokenTag::Asterisk
                    && self.token_starts[self.tok_i as usize]
                        == self.token_starts[deref_token as usize] + 2
                {
                    self.warn(ParseErrorTag::AsteriskAfterPtrDeref);
                }
                Ok(self.add_node(node::Tag::Deref, deref_token, lhs, 0))
            }
            TokenTag::Period => match self.token_tag(self.tok_i + 1) {
                TokenTag::Identifier => {
                    let dot = self.next_token();
                    let name = self.next_token();
                    Ok(self.add_node(node::Tag::FieldAccess, dot, lhs, name))
                }
                TokenTag::QuestionMark => {
                    let dot = self.next_token();
                    let question = self.next_token();
                    Ok(self.add_node(node::Tag::UnwrapOptional, dot, lhs, question))
                }
                TokenTag::LBrace => Ok(0),
                _ => {
                    self.warn(ParseErrorTag::ExpectedSuffixOp);
                    Ok(0)
                }
            },
            _ => Ok(0),
        }
    }

    // ------------------------------------------------------------------
    // Primary type expressions
    // ------------------------------------------------------------------

    fn expect_primary_type_expr(&mut self) -> ParseResult<NodeIndex> {
        let expr = self.parse_primary_type_expr()?;
        if expr == 0 {
            return Err(self.fail(ParseErrorTag::ExpectedPrimaryTypeExpr));
        }
        Ok(expr)
    }

    fn parse_primary_type_expr(&mut self) -> ParseResult<NodeIndex> {
        match self.current() {
            TokenTag::CharLiteral => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::CharLiteral, token, 0, 0))
            }
            TokenTag::IntegerLiteral => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::IntegerLiteral, token, 0, 0))
            }
            TokenTag::FloatLiteral => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::FloatLiteral, token, 0, 0))
            }
            TokenTag::KeywordTrue => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::TrueLiteral, token, 0, 0))
            }
            TokenTag::KeywordFalse => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::FalseLiteral, token, 0, 0))
            }
            TokenTag::KeywordNull => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::NullLiteral, token, 0, 0))
            }
            TokenTag::KeywordUndefined => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::UndefinedLiteral, token, 0, 0))
            }
            TokenTag::KeywordUnreachable => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::UnreachableLiteral, token, 0, 0))
            }
            TokenTag::StringLiteral => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::StringLiteral, token, 0, 0))
            }
            TokenTag::MultilineStringLiteralLine => {
                let first = self.next_token();
                let mut last = first;
                while self.current() == TokenTag::MultilineStringLiteralLine {
                    last = self.next_token();
                }
                Ok(self.add_node(node::Tag::MultilineStringLiteral, first, first, last))
            }
            TokenTag::Builtin => self.parse_builtin_call(),
            TokenTag::KeywordFn => self.parse_fn_proto(),
            TokenTag::KeywordIf => self.parse_if_expr(),
            TokenTag::KeywordSwitch => self.expect_switch_expr(),
            TokenTag::KeywordAsm => self.expect_asm_expr(),
            TokenTag::KeywordInline | TokenTag::KeywordWhile | TokenTag::KeywordFor => {
                self.parse_loop_expr()
            }
            TokenTag::KeywordExtern | TokenTag::KeywordPacked => {
                self.next_token();
                self.expect_container_decl_auto()
            }
            TokenTag::KeywordStruct
            | TokenTag::KeywordOpaque
            | TokenTag::KeywordEnum
            | TokenTag::KeywordUnion => self.expect_container_decl_auto(),
            TokenTag::KeywordComptime => {
                let token = self.next_token();
                let child = self.expect_type_expr()?;
                Ok(self.add_node(node::Tag::Comptime, token, child, 0))
            }
            TokenTag::KeywordError => {
                if self.token_tag(self.tok_i + 1) == TokenTag::LBrace {
                    self.parse_error_set_decl()
                } else {
                    let error_token = self.next_token();
                    self.expect_token(TokenTag::Period)?;
                    self.expect_token(TokenTag::Identifier)?;
                    Ok(self.add_node(node::Tag::ErrorValue, error_token, 0, 0))
                }
            }
            TokenTag::KeywordAnyframe => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::AnyframeLiteral, token, 0, 0))
            }
            TokenTag::Identifier => {
                let token = self.next_token();
                Ok(self.add_node(node::Tag::Identifier, token, 0, 0))
            }
            TokenTag::Period => match self.token_tag(self.tok_i + 1) {
                TokenTag::Identifier => {
                    self.next_token(); // .
                    let name = self.next_token();
                    Ok(self.add_node(node::Tag::EnumLiteral, name, 0, 0))
                }
                TokenTag::LBrace => self.parse_anon_init_list(),
                _ => Ok(0),
            },
            TokenTag::LParen => {
                let lparen = self.next_token();
                let expr = self.expect_expr()?;
                let rparen = self.expect_token(TokenTag::RParen)?;
                Ok(self.add_node(node::Tag::GroupedExpression, lparen, expr, rparen))
            }
            _ => Ok(0),
        }
    }

    /// `.{ … }` anonymous init list.
    fn parse_anon_init_list(&mut self) -> ParseResult<NodeIndex> {
        self.next_token(); // .
        let lbrace = self.next_token();
        if self.eat_token(TokenTag::RBrace).is_some() {
            return Ok(self.add_node(node::Tag::StructInitDotTwo, lbrace, 0, 0));
        }
        if self.is_field_init() {
            let (fields, trailing) = self.parse_anon_field_inits()?;
            return Ok(self.dot_init_node(lbrace, fields, trailing, true));
        }
        let (elements, trailing) = self.parse_anon_elements()?;
        Ok(self.dot_init_node(lbrace, elements, trailing, false))
    }

    fn parse_anon_field_inits(&mut self) -> ParseResult<(Vec<NodeIndex>, bool)> {
        let save = self.scratch.len();
        loop {
            if self.current() == TokenTag::RBrace {
                break;
            }
            if !self.is_field_init() {
                self.scratch.truncate(save);
                return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Period)));
            }
            self.tok_i += 3;
            let expr = match self.expect_expr() {
                Ok(expr) => expr,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            self.scratch.push(expr);
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RBrace => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let rbrace = self.next_token();
        let trailing = self.token_tag(rbrace - 1) == TokenTag::Comma;
        let items = self.scratch[save..].to_vec();
        self.scratch.truncate(save);
        Ok((items, trailing))
    }

    fn parse_anon_elements(&mut self) -> ParseResult<(Vec<NodeIndex>, bool)> {
        let save = self.scratch.len();
        loop {
            if self.current() == TokenTag::RBrace {
                break;
            }
            let expr = match self.expect_expr() {
                Ok(expr) => expr,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            self.scratch.push(expr);
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RBrace => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let rbrace = self.next_token();
        let trailing = self.token_tag(rbrace - 1) == TokenTag::Comma;
        let items = self.scratch[save..].to_vec();
        self.scratch.truncate(save);
        Ok((items, trailing))
    }

    fn dot_init_node(
        &mut self,
        lbrace: TokenIndex,
        items: Vec<NodeIndex>,
        trailing: bool,
        is_struct: bool,
    ) -> NodeIndex {
        match items.len() {
            0 | 1 | 2 => {
                let lhs = items.first().copied().unwrap_or(0);
                let rhs = items.get(1).copied().unwrap_or(0);
                let tag = match (is_struct, trailing) {
                    (true, false) => node::Tag::StructInitDotTwo,
                    (true, true) => node::Tag::StructInitDotTwoComma,
                    (false, false) => node::Tag::ArrayInitDotTwo,
                    (false, true) => node::Tag::ArrayInitDotTwoComma,
                };
                self.add_node(tag, lbrace, lhs, rhs)
            }
            _ => {
                let start = self.extra_data.len() as NodeIndex;
                self.extra_data.extend_from_slice(&items);
                let end = self.extra_data.len() as NodeIndex;
                let tag = match (is_struct, trailing) {
                    (true, false) => node::Tag::StructInitDot,
                    (true, true) => node::Tag::StructInitDotComma,
                    (false, false) => node::Tag::ArrayInitDot,
                    (false, true) => node::Tag::ArrayInitDotComma,
                };
                self.add_node(tag, lbrace, start, end)
            }
        }
    }

    fn parse_builtin_call(&mut self) -> ParseResult<NodeIndex> {
        let builtin_token = self.next_token();
        if self.eat_token(TokenTag::LParen).is_none() {
            return Err(self.fail(ParseErrorTag::ExpectedParamList));
        }
        let save = self.scratch.len();
        loop {
            if self.current() == TokenTag::RParen {
                break;
            }
            let arg = match self.expect_expr() {
                Ok(arg) => arg,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            self.scratch.push(arg);
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RParen => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let rparen = self.next_token();
        let trailing = self.token_tag(rparen - 1) == TokenTag::Comma;
        let items_len = self.scratch.len() - save;
        let call = if items_len <= 2 {
            let lhs = if items_len >= 1 { self.scratch[save] } else { 0 };
            let rhs = if items_len == 2 {
                self.scratch[save + 1]
            } else {
                0
            };
            self.scratch.truncate(save);
            let tag = if trailing {
                node::Tag::BuiltinCallTwoComma
            } else {
                node::Tag::BuiltinCallTwo
            };
            self.add_node(tag, builtin_token, lhs, rhs)
        } else {
            let span = self.scratch_to_span(save);
            let tag = if trailing {
                node::Tag::BuiltinCallComma
            } else {
                node::Tag::BuiltinCall
            };
            self.add_node(tag, builtin_token, span.start, span.end)
        };
        Ok(call)
    }

    fn parse_error_set_decl(&mut self) -> ParseResult<NodeIndex> {
        let error_token = self.next_token();
        self.next_token(); // {
        loop {
            match self.current() {
                TokenTag::RBrace => break,
                TokenTag::DocComment => {
                    self.next_token();
                }
                TokenTag::Identifier => {
                    self.next_token();
                    if self.eat_token(TokenTag::Comma).is_none()
                        && self.current() != TokenTag::RBrace
                    {
                        return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                    }
                }
                TokenTag::Eof => {
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::RBrace)));
                }
                _ => {
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Identifier)));
                }
            }
        }
        let rbrace = self.next_token();
        Ok(self.add_node(node::Tag::ErrorSetDecl, error_token, 0, rbrace))
    }

    // ------------------------------------------------------------------
    // Containers, switch, asm
    // ------------------------------------------------------------------

    /// Container declaration with the keyword at the current token; any
    /// layout token has already been consumed.
    fn expect_container_decl_auto(&mut self) -> ParseResult<NodeIndex> {
        let main_token = self.next_token();
        let container: ContainerKind = match self.token_tag(main_token) {
            TokenTag::KeywordStruct | TokenTag::KeywordOpaque => ContainerKind::Plain { arg: 0 },
            TokenTag::KeywordEnum => {
                if self.eat_token(TokenTag::LParen).is_some() {
                    let arg = self.expect_expr()?;
                    self.expect_token(TokenTag::RParen)?;
                    ContainerKind::Plain { arg }
                } else {
                    ContainerKind::Plain { arg: 0 }
                }
            }
            TokenTag::KeywordUnion => {
                if self.eat_token(TokenTag::LParen).is_some() {
                    if self.eat_token(TokenTag::KeywordEnum).is_some() {
                        if self.eat_token(TokenTag::LParen).is_some() {
                            let enum_tag = self.expect_expr()?;
                            self.expect_token(TokenTag::RParen)?;
                            self.expect_token(TokenTag::RParen)?;
                            ContainerKind::TaggedEnumTag { enum_tag }
                        } else {
                            self.expect_token(TokenTag::RParen)?;
                            ContainerKind::Tagged
                        }
                    } else {
                        let arg = self.expect_expr()?;
                        self.expect_token(TokenTag::RParen)?;
                        ContainerKind::Plain { arg }
                    }
                } else {
                    ContainerKind::Plain { arg: 0 }
                }
            }
            _ => return Err(self.fail(ParseErrorTag::ExpectedContainer)),
        };
        self.expect_token(TokenTag::LBrace)?;
        let members = self.parse_container_members();
        let rbrace = self.expect_token(TokenTag::RBrace)?;
        let trailing = self.token_tag(rbrace - 1) == TokenTag::Comma;

        let decl = match container {
            ContainerKind::Plain { arg: 0 } => {
                if members.len <= 2 {
                    let tag = if trailing {
                        node::Tag::ContainerDeclTwoTrailing
                    } else {
                        node::Tag::ContainerDeclTwo
                    };
                    self.add_node(tag, main_token, members.lhs, members.rhs)
                } else {
                    let tag = if trailing {
                        node::Tag::ContainerDeclTrailing
                    } else {
                        node::Tag::ContainerDecl
                    };
                    self.add_node(tag, main_token, members.lhs, members.rhs)
                }
            }
            ContainerKind::Plain { arg } => {
                let span = self.members_to_span(&members);
                let rhs = self.add_extra(span);
                let tag = if trailing {
                    node::Tag::ContainerDeclArgTrailing
                } else {
                    node::Tag::ContainerDeclArg
                };
                self.add_node(tag, main_token, arg, rhs)
            }
            ContainerKind::Tagged => {
                if members.len <= 2 {
                    let tag = if trailing {
                        node::Tag::TaggedUnionTwoTrailing
                    } else {
                        node::Tag::TaggedUnionTwo
                    };
                    self.add_node(tag, main_token, members.lhs, members.rhs)
                } else {
                    let tag = if trailing {
                        node::Tag::TaggedUnionTrailing
                    } else {
                        node::Tag::TaggedUnion
                    };
                    self.add_node(tag, main_token, members.lhs, members.rhs)
                }
            }
            ContainerKind::TaggedEnumTag { enum_tag } => {
                let span = self.members_to_span(&members);
                let rhs = self.add_extra(span);
                let tag = if trailing {
                    node::Tag::TaggedUnionEnumTagTrailing
                } else {
                    node::Tag::TaggedUnionEnumTag
                };
                self.add_node(tag, main_token, enum_tag, rhs)
            }
        };
        Ok(decl)
    }

    fn expect_switch_expr(&mut self) -> ParseResult<NodeIndex> {
        let switch_token = self.expect_token(TokenTag::KeywordSwitch)?;
        self.expect_token(TokenTag::LParen)?;
        let cond_expr = self.expect_expr()?;
        self.expect_token(TokenTag::RParen)?;
        self.expect_token(TokenTag::LBrace)?;
        let save = self.scratch.len();
        loop {
            if self.current() == TokenTag::RBrace {
                break;
            }
            let case = match self.expect_switch_prong() {
                Ok(case) => case,
                Err(Failed) => {
                    self.scratch.truncate(save);
                    return Err(Failed);
                }
            };
            self.scratch.push(case);
            match self.current() {
                TokenTag::Comma => {
                    self.next_token();
                }
                TokenTag::RBrace => {}
                _ => {
                    self.scratch.truncate(save);
                    return Err(self.fail(ParseErrorTag::ExpectedToken(TokenTag::Comma)));
                }
            }
        }
        let rbrace = self.next_token();
        let trailing = self.token_tag(rbrace - 1) == TokenTag::Comma;
        let span = self.scratch_to_span(save);
        let rhs = self.add_extra(span);
        let tag = if trailing {
            node::Tag::SwitchComma
        } else {
            node::Tag::Switch
        };
        Ok(self.add_node(tag, switch_token, cond_expr, rhs))
    }

    fn expect_switch_prong(&mut self) -> ParseResult<NodeIndex> {
        let save = self.scratch.len();
        let result = self.switch_prong_inner(save);
        if result.is_err() {
            self.scratch.truncate(save);
        }
        result
    }

    fn switch_prong_inner(&mut self, save: usize) -> ParseResult<NodeIndex> {
        if self.eat_token(TokenTag::KeywordElse).is_none() {
            loop {
                let item = self.parse_switch_item()?;
                if item == 0 {
                    break;
                }
                self.scratch.push(item);
                if self.eat_token(TokenTag::Comma).is_none() {
                    break;
                }
            }
        }
        let arrow = self.expect_token(TokenTag::EqualAngleBracketRight)?;
        self.parse_ptr_payload()?;
        let target = self.expect_assign_expr()?;
        let items_len = self.scratch.len() - save;
        let case = match items_len {
            0 => self.add_node(node::Tag::SwitchCaseOne, arrow, 0, target),
            1 => {
                let item = self.scratch[save];
                self.scratch.truncate(save);
                self.add_node(node::Tag::SwitchCaseOne, arrow, item, target)
            }
            _ => {
                let span = self.scratch_to_span(save);
                let lhs = self.add_extra(span);
                self.add_node(node::Tag::SwitchCase, arrow, lhs, target)
            }
        };
        Ok(case)
    }

    /// `expr` or `expr...expr`, or 0 when no item starts here.
    fn parse_switch_item(&mut self) -> ParseResult<NodeIndex> {
        let expr = self.parse_expr()?;
        if expr == 0 {
            return Ok(0);
        }
        if let Some(ellipsis) = self.eat_token(TokenTag::Ellipsis3) {
            let end = self.expect_expr()?;
            return Ok(self.add_node(node::Tag::SwitchRange, ellipsis, expr, end));
        }
        Ok(expr)
    }

    fn expect_asm_expr(&mut self) -> ParseResult<NodeIndex> {
        let asm_token = self.expect_token(TokenTag::KeywordAsm)?;
        self.eat_token(TokenTag::KeywordVolatile);
        self.expect_token(TokenTag::LParen)?;
        let template = self.expect_expr()?;
        if let Some(rparen) = self.eat_token(TokenTag::RParen) {
            return Ok(self.add_node(node::Tag::AsmSimple, asm_token, template, rparen));
        }
        let save = self.scratch.len();
        if self.eat_token(TokenTag::Colon).is_some() {
            // Outputs.
            while self.current() == TokenTag::LBracket {
                let output = match self.expect_asm_output_item() {
                    Ok(item) => item,
                    Err(Failed) => {
                        self.scratch.truncate(save);
                        return Err(Failed);
                    }
                };
                self.scratch.push(output);
                if self.eat_token(TokenTag::Comma).is_none() {
                    break;
                }
            }
            if self.eat_token(TokenTag::Colon).is_some() {
                // Inputs.
                while self.current() == TokenTag::LBracket {
                    let input = match self.expect_asm_input_item() {
                        Ok(item) => item,
                        Err(Failed) => {
                            self.scratch.truncate(save);
                            return Err(Failed);
                        }
                    };
                    self.scratch.push(input);
                    if self.eat_token(TokenTag::Comma).is_none() {
                        break;
                    }
                }
                if self.eat_token(TokenTag::Colon).is_some() {
                    // Clobbers.
                    while self.current() == TokenTag::StringLiteral {
                        self.next_token();
                        if self.eat_token(TokenTag::Comma).is_none() {
                            break;
                        }
                    }
                }
            }
        }
        let rparen = match self.expect_token(TokenTag::RParen) {
            Ok(token) => token,
            Err(Failed) => {
                self.scratch.truncate(save);
                return Err(Failed);
            }
        };
        let span = self.scratch_to_span(save);
        let rhs = self.add_extra(extra::Asm {
            items_start: span.start,
            items_end: span.end,
            rparen,
        });
        Ok(self.add_node(node::Tag::Asm, asm_token, template, rhs))
    }

    /// `[name] "constraint" (-> type)` or `[name] "constraint" (variable)`.
    fn expect_asm_output_item(&mut self) -> ParseResult<NodeIndex> {
        let lbracket = self.expect_token(TokenTag::LBracket)?;
        self.expect_token(TokenTag::Identifier)?;
        self.expect_token(TokenTag::RBracket)?;
        self.expect_token(TokenTag::StringLiteral)?;
        self.expect_token(TokenTag::LParen)?;
        let type_expr = if self.eat_token(TokenTag::Arrow).is_some() {
            self.expect_type_expr()?
        } else {
            self.expect_token(TokenTag::Identifier)?;
            0
        };
        let rparen = self.expect_token(TokenTag::RParen)?;
        Ok(self.add_node(node::Tag::AsmOutput, lbracket, type_expr, rparen))
    }

    /// `[name] "constraint" (expr)`.
    fn expect_asm_input_item(&mut self) -> ParseResult<NodeIndex> {
        let lbracket = self.expect_token(TokenTag::LBracket)?;
        self.expect_token(TokenTag::Identifier)?;
        self.expect_token(TokenTag::RBracket)?;
        self.expect_token(TokenTag::StringLiteral)?;
        self.expect_token(TokenTag::LParen)?;
        let expr = self.expect_expr()?;
        let rparen = self.expect_token(TokenTag::RParen)?;
        Ok(self.add_node(node::Tag::AsmInput, lbracket, expr, rparen))
    }
}

enum ContainerKind {
    Plain { arg: NodeIndex },
    Tagged,
    TaggedEnumTag { enum_tag: NodeIndex },
}

enum SmallSpan {
    ZeroOrOne(NodeIndex),
    Multi(extra::SubRange),
}

struct PtrModifiers {
    align_node: NodeIndex,
    bit_range_start: NodeIndex,
    bit_range_end: NodeIndex,
}

struct OperInfo {
    prec: i8,
    tag: node::Tag,
    chainable: bool,
}

fn oper_info(tag: TokenTag) -> Option<OperInfo> {
    let (prec, node_tag, chainable) = match tag {
        TokenTag::KeywordOr => (10, node::Tag::BoolOr, true),
        TokenTag::KeywordAnd => (20, node::Tag::BoolAnd, true),
        TokenTag::EqualEqual => (30, node::Tag::EqualEqual, false),
        TokenTag::BangEqual => (30, node::Tag::BangEqual, false),
        TokenTag::AngleBracketLeft => (30, node::Tag::LessThan, false),
        TokenTag::AngleBracketRight => (30, node::Tag::GreaterThan, false),
        TokenTag::AngleBracketLeftEqual => (30, node::Tag::LessOrEqual, false),
        TokenTag::AngleBracketRightEqual => (30, node::Tag::GreaterOrEqual, false),
        TokenTag::Ampersand => (40, node::Tag::BitAnd, true),
        TokenTag::Caret => (40, node::Tag::BitXor, true),
        TokenTag::Pipe => (40, node::Tag::BitOr, true),
        TokenTag::KeywordOrelse => (40, node::Tag::Orelse, true),
        TokenTag::KeywordCatch => (40, node::Tag::Catch, true),
        TokenTag::AngleBracketAngleBracketLeft => (50, node::Tag::Shl, true),
        TokenTag::AngleBracketAngleBracketRight => (50, node::Tag::Shr, true),
        TokenTag::Plus => (60, node::Tag::Add, true),
        TokenTag::Minus => (60, node::Tag::Sub, true),
        TokenTag::PlusPlus => (60, node::Tag::ArrayCat, true),
        TokenTag::PlusPercent => (60, node::Tag::AddWrap, true),
        TokenTag::MinusPercent => (60, node::Tag::SubWrap, true),
        TokenTag::Asterisk => (70, node::Tag::Mul, true),
        TokenTag::Slash => (70, node::Tag::Div, true),
        TokenTag::Percent => (70, node::Tag::Mod, true),
        TokenTag::AsteriskAsterisk => (70, node::Tag::ArrayMult, true),
        TokenTag::AsteriskPercent => (70, node::Tag::MulWrap, true),
        TokenTag::PipePipe => (70, node::Tag::MergeErrorSets, true),
        _ => return None,
    };
    Some(OperInfo {
        prec,
        tag: node_tag,
        chainable,
    })
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::ast::node;

    fn tags_of(source: &str) -> Vec<node::Tag> {
        let ast = parse(source);
        assert!(
            ast.errors.is_empty(),
            "unexpected errors for {:?}: {:?}",
            source,
            ast.errors
        );
        (0..ast.node_count() as u32).map(|n| ast.node_tag(n)).collect()
    }

    #[test]
    fn trailing_comma_selects_comma_variant() {
        let tags = tags_of("const x = foo(a, b,);\n");
        assert!(tags.contains(&node::Tag::CallComma));
        let tags = tags_of("const x = foo(a, b);\n");
        assert!(tags.contains(&node::Tag::Call));
    }

    #[test]
    fn single_argument_uses_one_variant() {
        let tags = tags_of("const x = foo(a);\n");
        assert!(tags.contains(&node::Tag::CallOne));
        assert!(!tags.contains(&node::Tag::Call));
    }

    #[test]
    fn double_asterisk_makes_two_pointer_nodes() {
        let ast = parse("var x: **u8 = undefined;\n");
        assert!(ast.errors.is_empty());
        let count = (0..ast.node_count() as u32)
            .filter(|&n| ast.node_tag(n) == node::Tag::PtrTypeAligned)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn var_decl_shapes() {
        assert!(tags_of("const a = 1;\n").contains(&node::Tag::SimpleVarDecl));
        assert!(tags_of("var a: u8 align(4) = 1;\n").contains(&node::Tag::LocalVarDecl));
        assert!(tags_of("var a align(4) = 1;\n").contains(&node::Tag::AlignedVarDecl));
        assert!(
            tags_of("extern var a: u8 align(4) linksection(\".data\") = 1;\n")
                .contains(&node::Tag::GlobalVarDecl)
        );
    }

    #[test]
    fn while_shapes() {
        assert!(tags_of("fn f() void { while (a) b(); }\n").contains(&node::Tag::WhileSimple));
        assert!(
            tags_of("fn f() void { while (a) : (i += 1) b(); }\n")
                .contains(&node::Tag::WhileCont)
        );
        assert!(
            tags_of("fn f() void { while (a) b() else c(); }\n").contains(&node::Tag::While)
        );
    }

    #[test]
    fn switch_case_shapes() {
        let tags = tags_of("const x = switch (y) { 1, 2 => a, else => b };\n");
        assert!(tags.contains(&node::Tag::SwitchCase));
        assert!(tags.contains(&node::Tag::SwitchCaseOne));
        assert!(tags.contains(&node::Tag::Switch));
    }

    #[test]
    fn clobber_only_asm_is_full_asm() {
        let tags = tags_of("fn f() void { asm volatile (\"nop\" ::: \"memory\"); }\n");
        assert!(tags.contains(&node::Tag::Asm));
        let tags = tags_of("fn f() void { asm (\"nop\"); }\n");
        assert!(tags.contains(&node::Tag::AsmSimple));
    }

    #[test]
    fn recovery_produces_errors_not_panics() {
        let ast = parse("const = ;\nconst ok = 1;\n");
        assert!(!ast.errors.is_empty());
        assert!(!ast.root_decls().is_empty());
    }

    #[test]
    fn chained_comparison_is_an_error() {
        let ast = parse("const x = a < b < c;\n");
        assert!(!ast.errors.is_empty());
    }
}
