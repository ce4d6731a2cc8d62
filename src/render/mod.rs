//! Canonical renderer: AST back to formatted source.
//!
//! The renderer walks the tree through the full views and the token
//! geometry, emitting every token exactly once through the indenting sink.
//! Three decisions drive the output:
//!
//! 1. **Layout per construct**: a trailing comma in the source selects the
//!    multiline form (one element per line); otherwise a single-line
//!    layout is attempted.
//! 2. **Spacing**: each token is emitted with a [`Space`] mode describing
//!    what separates it from the next token, including the modes that
//!    consume an optional trailing `,` or `;` token.
//! 3. **Comments**: plain `//` comments are not tokens; they are recovered
//!    by scanning the source bytes between neighbouring tokens and
//!    re-emitted in place. Doc comments are tokens and are attached to the
//!    declaration they precede.
//!
//! Rendering is total on error-free trees and refuses others: the tree
//! shape invariants it relies on only hold when parsing succeeded.

pub mod auto_indent;

use crate::ast::{extra, full, node, Ast, NodeIndex};
use crate::token::{Tag as TokenTag, TokenIndex};

use auto_indent::{AutoIndentingStream, ASM_INDENT_DELTA, INDENT_DELTA};

/// Render a parsed tree to canonical source text.
///
/// Panics if the tree has parse errors; callers check `ast.errors` first.
pub fn render_tree(ast: &Ast) -> String {
    assert!(
        ast.errors.is_empty(),
        "refusing to render a tree with parse errors"
    );
    let mut renderer = Renderer {
        ast,
        ais: AutoIndentingStream::new(INDENT_DELTA),
    };
    renderer.render_root();
    renderer.ais.into_inner()
}

/// What separates a token from its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    /// No separator.
    None,
    /// One ASCII space.
    Space,
    /// Newline at the current indent.
    Newline,
    /// Consume an optional trailing comma token, then newline.
    Comma,
    /// Like `Comma`, but with a space instead of a newline.
    CommaSpace,
    /// Consume a trailing `;` token if present, then newline.
    Semicolon,
    /// No separator, and no comment scan after this token.
    NoComment,
}

struct Renderer<'a> {
    ast: &'a Ast,
    ais: AutoIndentingStream,
}

impl<'a> Renderer<'a> {
    // ------------------------------------------------------------------
    // Token primitives
    // ------------------------------------------------------------------

    fn token_slice_for_render(&self, token: TokenIndex) -> &'a str {
        let ast = self.ast;
        let slice = ast.token_slice(token);
        match ast.token_tag(token) {
            TokenTag::MultilineStringLiteralLine => slice.trim_end_matches('\r'),
            TokenTag::DocComment | TokenTag::ContainerDocComment => slice.trim_end(),
            _ => slice,
        }
    }

    fn render_token(&mut self, token: TokenIndex, space: Space) {
        let lexeme = self.token_slice_for_render(token);
        self.ais.write_all(lexeme);
        self.render_space(token, lexeme.len(), space);
    }

    fn render_space(&mut self, token: TokenIndex, lexeme_len: usize, space: Space) {
        let ast = self.ast;
        let next_token_tag = ast.token_tag(token + 1);
        if space == Space::Comma && next_token_tag != TokenTag::Comma {
            self.ais.write_all(",");
        }
        if space == Space::NoComment {
            return;
        }
        let comment_start = ast.token_start(token) as usize + lexeme_len;
        let comment = self.render_comments(comment_start, ast.token_start(token + 1) as usize);
        match space {
            Space::None => {}
            Space::Space => {
                if !comment {
                    self.ais.write_all(" ");
                }
            }
            Space::Newline => {
                if !comment {
                    self.ais.insert_newline();
                }
            }
            Space::Comma => {
                if next_token_tag == TokenTag::Comma {
                    self.render_token(token + 1, Space::Newline);
                } else if !comment {
                    self.ais.insert_newline();
                }
            }
            Space::CommaSpace => {
                if next_token_tag == TokenTag::Comma {
                    self.render_token(token + 1, Space::Space);
                } else if !comment {
                    self.ais.write_all(" ");
                }
            }
            Space::Semicolon => {
                if next_token_tag == TokenTag::Semicolon {
                    self.render_token(token + 1, Space::Newline);
                } else if !comment {
                    self.ais.insert_newline();
                }
            }
            Space::NoComment => unreachable!(),
        }
    }

    // ------------------------------------------------------------------
    // Comments and blank lines
    // ------------------------------------------------------------------

    /// Emit any `//` comments between two source offsets. Returns whether
    /// a comment was written (the caller then skips its own separator).
    fn render_comments(&mut self, start: usize, end: usize) -> bool {
        let ast = self.ast;
        let mut index = start;
        while let Some(offset) = ast.source[index..end].find("//") {
            let comment_start = index + offset;
            let newline = ast.source[comment_start..end]
                .find('\n')
                .map(|i| comment_start + i);
            let untrimmed = &ast.source[comment_start..newline.unwrap_or(end)];
            let trimmed = untrimmed.trim_end();
            if index != 0 {
                let gap = &ast.source[index..comment_start];
                if index == start && has_newlines(gap, 2) {
                    // Leave up to one blank line before the first comment.
                    self.ais.insert_newline();
                    self.ais.insert_newline();
                } else if gap.contains('\n') {
                    self.ais.maybe_insert_newline();
                    if has_newlines(gap, 2) {
                        self.ais.insert_newline();
                    }
                } else if index == start {
                    // The comment shares the previous token's line.
                    self.ais.write_all(" ");
                }
            }
            index = match newline {
                Some(n) => n + 1,
                None => end,
            };
            self.ais.write_all(trimmed);
            self.ais.insert_newline();
        }
        if index != start && has_newlines(&ast.source[index - 1..end], 2) {
            // Preserve one blank line after the last comment, but never at
            // the end of the file.
            if end != ast.source.len() {
                self.ais.insert_newline();
            }
        }
        index != start
    }

    fn render_extra_newline(&mut self, node_index: NodeIndex) {
        self.render_extra_newline_token(self.ast.first_token(node_index));
    }

    /// Emit a blank line before `token` if the source had one.
    fn render_extra_newline_token(&mut self, token: TokenIndex) {
        let ast = self.ast;
        let token_start = ast.token_start(token) as usize;
        if token_start == 0 {
            return;
        }
        let prev_token_end = if token == 0 {
            0
        } else {
            ast.token_start(token - 1) as usize + self.token_slice_for_render(token - 1).len()
        };
        // A comment in between already rendered the blank line.
        if ast.source[prev_token_end..token_start].contains("//") {
            return;
        }
        // Doc comments belong to the declaration; look above them.
        if token > 0 && ast.token_tag(token - 1) == TokenTag::DocComment {
            self.render_extra_newline_token(token - 1);
            return;
        }
        let bytes = ast.source.as_bytes();
        let mut i = token_start - 1;
        let mut newlines = 0;
        while bytes[i].is_ascii_whitespace() {
            if bytes[i] == b'\n' {
                newlines += 1;
            }
            if newlines == 2 {
                self.ais.insert_newline();
                return;
            }
            if i == prev_token_end || i == 0 {
                break;
            }
            i -= 1;
        }
    }

    /// Emit the run of doc comments that precedes `end_token`.
    fn render_doc_comments(&mut self, end_token: TokenIndex) {
        let ast = self.ast;
        if end_token == 0 {
            return;
        }
        let mut tok = end_token;
        while tok > 0 && ast.token_tag(tok - 1) == TokenTag::DocComment {
            tok -= 1;
        }
        if tok == end_token {
            return;
        }
        if tok != 0 && ast.token_tag(tok - 1) != TokenTag::LBrace {
            self.render_extra_newline_token(tok);
        }
        while ast.token_tag(tok) == TokenTag::DocComment {
            self.render_token(tok, Space::Newline);
            tok += 1;
        }
    }

    fn render_container_doc_comments(&mut self, start_token: TokenIndex) {
        let mut tok = start_token;
        while self.ast.token_tag(tok) == TokenTag::ContainerDocComment {
            self.render_extra_newline_token(tok);
            self.render_token(tok, Space::Newline);
            tok += 1;
        }
    }

    /// Whether any `//` comment lies in the gaps between two tokens.
    fn has_comment(&self, start_token: TokenIndex, end_token: TokenIndex) -> bool {
        let ast = self.ast;
        let mut i = start_token;
        while i < end_token {
            let gap_start = ast.token_start(i) as usize + ast.token_slice(i).len();
            let gap_end = ast.token_start(i + 1) as usize;
            if ast.source[gap_start..gap_end].contains("//") {
                return true;
            }
            i += 1;
        }
        false
    }

    /// Whether a `//` comment follows `token` on the same line.
    fn has_same_line_comment(&self, token: TokenIndex) -> bool {
        let ast = self.ast;
        let start = ast.token_start(token) as usize + ast.token_slice(token).len();
        let end = ast.token_start(token + 1) as usize;
        let gap = &ast.source[start..end];
        match gap.find('\n') {
            Some(newline) => gap[..newline].contains("//"),
            None => gap.contains("//"),
        }
    }

    fn has_multiline_string(&self, start_token: TokenIndex, end_token: TokenIndex) -> bool {
        (start_token..=end_token)
            .any(|t| self.ast.token_tag(t) == TokenTag::MultilineStringLiteralLine)
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn render_root(&mut self) {
        // Comments before the first token are in no token's gap.
        self.render_comments(0, self.ast.token_start(0) as usize);
        self.render_container_doc_comments(0);
        let members = self.ast.root_decls();
        self.render_members(members);
    }

    fn render_members(&mut self, members: &[NodeIndex]) {
        let Some((&first, rest)) = members.split_first() else {
            return;
        };
        // The sink suppresses newlines at the very start of the output, so
        // this only takes effect after doc comments or in nested scopes.
        self.render_extra_newline(first);
        self.render_member(first, member_space(self.ast.node_tag(first)));
        for &member in rest {
            self.render_extra_newline(member);
            self.render_member(member, member_space(self.ast.node_tag(member)));
        }
    }

    fn render_member(&mut self, decl: NodeIndex, space: Space) {
        let ast = self.ast;
        self.render_doc_comments(ast.first_token(decl));
        let data = ast.node_data(decl);
        match ast.node_tag(decl) {
            node::Tag::FnDecl => {
                let fn_proto = data.lhs;
                let body = data.rhs;
                let fn_token = ast.main_token(fn_proto);
                let mut i = ast.first_token(decl);
                while i < fn_token {
                    self.render_token(i, Space::Space);
                    i += 1;
                }
                self.render_expression(fn_proto, Space::Space);
                self.render_expression(body, space);
            }
            node::Tag::FnProtoSimple
            | node::Tag::FnProtoMulti
            | node::Tag::FnProtoOne
            | node::Tag::FnProto => {
                let fn_token = ast.main_token(decl);
                let mut i = ast.first_token(decl);
                while i < fn_token {
                    self.render_token(i, Space::Space);
                    i += 1;
                }
                self.render_expression(decl, Space::None);
                self.render_token(ast.last_token(decl) + 1, space); // ;
            }
            node::Tag::Usingnamespace => {
                let main = ast.main_token(decl);
                if main > 0 && ast.token_tag(main - 1) == TokenTag::KeywordPub {
                    self.render_token(main - 1, Space::Space);
                }
                self.render_token(main, Space::Space);
                self.render_expression(data.lhs, Space::None);
                self.render_token(ast.last_token(data.lhs) + 1, space); // ;
            }
            node::Tag::GlobalVarDecl
            | node::Tag::LocalVarDecl
            | node::Tag::SimpleVarDecl
            | node::Tag::AlignedVarDecl => {
                let var_decl = ast.full_var_decl(decl).unwrap();
                self.render_var_decl(var_decl);
            }
            node::Tag::TestDecl => {
                self.render_token(ast.main_token(decl), Space::Space);
                if data.lhs != 0 {
                    self.render_token(data.lhs, Space::Space);
                }
                self.render_expression(data.rhs, space);
            }
            node::Tag::ContainerFieldInit
            | node::Tag::ContainerFieldAlign
            | node::Tag::ContainerField => {
                let field = ast.full_container_field(decl).unwrap();
                self.render_container_field(field, space);
            }
            node::Tag::Comptime => self.render_expression(decl, space),
            _ => unreachable!("non-member node in member position"),
        }
    }

    fn render_var_decl(&mut self, var_decl: full::VarDecl) {
        let ast = self.ast;
        if let Some(token) = var_decl.visib_token {
            self.render_token(token, Space::Space);
        }
        if let Some(token) = var_decl.extern_export_token {
            self.render_token(token, Space::Space);
            if let Some(lib_name) = var_decl.lib_name {
                self.render_token(lib_name, Space::Space);
            }
        }
        if let Some(token) = var_decl.threadlocal_token {
            self.render_token(token, Space::Space);
        }
        if let Some(token) = var_decl.comptime_token {
            self.render_token(token, Space::Space);
        }
        self.render_token(var_decl.mut_token, Space::Space); // var/const
        let name_token = var_decl.mut_token + 1;
        if var_decl.type_node == 0
            && var_decl.align_node == 0
            && var_decl.section_node == 0
            && var_decl.init_node == 0
        {
            return self.render_token(name_token, Space::Semicolon);
        }
        if var_decl.type_node != 0 {
            self.render_token(name_token, Space::None);
            self.render_token(name_token + 1, Space::Space); // :
            if var_decl.align_node == 0 && var_decl.section_node == 0 && var_decl.init_node == 0 {
                return self.render_expression(var_decl.type_node, Space::Semicolon);
            }
            self.render_expression(var_decl.type_node, Space::Space);
        } else {
            self.render_token(name_token, Space::Space);
        }
        if var_decl.align_node != 0 {
            let lparen = ast.first_token(var_decl.align_node) - 1;
            self.render_token(lparen - 1, Space::None); // align
            self.render_token(lparen, Space::None); // (
            self.render_expression(var_decl.align_node, Space::None);
            let rparen = ast.last_token(var_decl.align_node) + 1;
            if var_decl.section_node == 0 && var_decl.init_node == 0 {
                return self.render_token(rparen, Space::Semicolon);
            }
            self.render_token(rparen, Space::Space);
        }
        if var_decl.section_node != 0 {
            let lparen = ast.first_token(var_decl.section_node) - 1;
            self.render_token(lparen - 1, Space::None); // linksection
            self.render_token(lparen, Space::None); // (
            self.render_expression(var_decl.section_node, Space::None);
            let rparen = ast.last_token(var_decl.section_node) + 1;
            if var_decl.init_node == 0 {
                return self.render_token(rparen, Space::Semicolon);
            }
            self.render_token(rparen, Space::Space);
        }
        debug_assert!(var_decl.init_node != 0);
        let eq_token = ast.first_token(var_decl.init_node) - 1;
        let eq_space = if ast.tokens_on_same_line(eq_token, eq_token + 1) {
            Space::Space
        } else {
            Space::Newline
        };
        self.ais.push_indent();
        self.render_token(eq_token, eq_space);
        self.ais.pop_indent();
        self.ais.push_indent_one_shot();
        self.render_expression(var_decl.init_node, Space::Semicolon);
    }

    fn render_container_field(&mut self, field: full::ContainerField, space: Space) {
        let ast = self.ast;
        if let Some(token) = field.comptime_token {
            self.render_token(token, Space::Space);
        }
        if field.type_expr == 0 && field.value_expr == 0 {
            return self.render_token(field.name_token, space);
        }
        if field.type_expr != 0 && field.value_expr == 0 {
            self.render_token(field.name_token, Space::None);
            self.render_token(field.name_token + 1, Space::Space); // :
            if field.align_expr != 0 {
                self.render_expression(field.type_expr, Space::Space);
                let align_token = ast.first_token(field.align_expr) - 2;
                self.render_token(align_token, Space::None); // align
                self.render_token(align_token + 1, Space::None); // (
                self.render_expression(field.align_expr, Space::None);
                return self.render_token(ast.last_token(field.align_expr) + 1, space); // )
            }
            return self.render_expression(field.type_expr, space);
        }
        if field.type_expr == 0 {
            self.render_token(field.name_token, Space::Space);
            self.render_token(field.name_token + 1, Space::Space); // =
            return self.render_expression(field.value_expr, space);
        }
        self.render_token(field.name_token, Space::None);
        self.render_token(field.name_token + 1, Space::Space); // :
        if field.align_expr != 0 {
            self.render_expression(field.type_expr, Space::Space);
            let align_token = ast.first_token(field.align_expr) - 2;
            self.render_token(align_token, Space::None); // align
            self.render_token(align_token + 1, Space::None); // (
            self.render_expression(field.align_expr, Space::None);
            self.render_token(ast.last_token(field.align_expr) + 1, Space::Space); // )
        } else {
            self.render_expression(field.type_expr, Space::Space);
        }
        let eq_token = ast.first_token(field.value_expr) - 1;
        self.render_token(eq_token, Space::Space); // =
        self.render_expression(field.value_expr, space)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn render_expression(&mut self, node_index: NodeIndex, space: Space) {
        let ast = self.ast;
        let main = ast.main_token(node_index);
        let data = ast.node_data(node_index);
        match ast.node_tag(node_index) {
            node::Tag::Identifier
            | node::Tag::CharLiteral
            | node::Tag::IntegerLiteral
            | node::Tag::FloatLiteral
            | node::Tag::TrueLiteral
            | node::Tag::FalseLiteral
            | node::Tag::NullLiteral
            | node::Tag::UndefinedLiteral
            | node::Tag::UnreachableLiteral
            | node::Tag::AnyframeLiteral
            | node::Tag::StringLiteral => self.render_token(main, space),

            node::Tag::EnumLiteral => {
                self.render_token(main - 1, Space::NoComment); // .
                self.render_token(main, space);
            }

            node::Tag::ErrorValue => {
                self.render_token(main, Space::None); // error
                self.render_token(main + 1, Space::None); // .
                self.render_token(main + 2, space);
            }

            node::Tag::MultilineStringLiteral => {
                let locked = self.ais.lock_one_shot_indent();
                self.ais.maybe_insert_newline();
                let mut i = data.lhs;
                while i <= data.rhs {
                    self.render_token(i, Space::Newline);
                    i += 1;
                }
                for _ in 0..locked {
                    self.ais.pop_indent();
                }
                match space {
                    Space::None | Space::Space | Space::Newline | Space::NoComment => {}
                    Space::Semicolon => {
                        if ast.token_tag(i) == TokenTag::Semicolon {
                            self.render_token(i, Space::Newline);
                        }
                    }
                    Space::Comma => {
                        if ast.token_tag(i) == TokenTag::Comma {
                            self.render_token(i, Space::Newline);
                        } else {
                            self.ais.write_all(",");
                            self.ais.insert_newline();
                        }
                    }
                    Space::CommaSpace => {
                        if ast.token_tag(i) == TokenTag::Comma {
                            self.render_token(i, Space::Space);
                        }
                    }
                }
            }

            node::Tag::GroupedExpression => {
                self.render_token(main, Space::None); // (
                self.ais.push_indent_one_shot();
                self.render_expression(data.lhs, Space::None);
                self.render_token(data.rhs, space); // )
            }

            node::Tag::BoolNot
            | node::Tag::Negation
            | node::Tag::BitNot
            | node::Tag::NegationWrap
            | node::Tag::AddressOf
            | node::Tag::OptionalType => {
                self.render_token(main, Space::None);
                self.render_expression(data.lhs, space);
            }

            node::Tag::Try | node::Tag::Resume | node::Tag::Await => {
                self.render_token(main, Space::Space);
                self.render_expression(data.lhs, space);
            }

            node::Tag::Comptime | node::Tag::Nosuspend => {
                self.render_token(main, Space::Space);
                self.render_expression(data.lhs, space);
            }

            node::Tag::Suspend => {
                if data.lhs == 0 {
                    self.render_token(main, space);
                } else {
                    self.render_token(main, Space::Space);
                    self.render_expression(data.lhs, space);
                }
            }

            node::Tag::Defer => {
                self.render_token(main, Space::Space);
                self.render_expression(data.rhs, space);
            }

            node::Tag::Errdefer => {
                self.render_token(main, Space::Space);
                if data.lhs != 0 {
                    self.render_token(data.lhs - 1, Space::None); // |
                    self.render_token(data.lhs, Space::None); // identifier
                    self.render_token(data.lhs + 1, Space::Space); // |
                }
                self.render_expression(data.rhs, space);
            }

            node::Tag::Catch => {
                let fallback_first = ast.first_token(data.rhs);
                let same_line = ast.tokens_on_same_line(main, fallback_first);
                let after_op_space = if same_line { Space::Space } else { Space::Newline };
                self.render_expression(data.lhs, Space::Space);
                if ast.token_tag(fallback_first - 1) == TokenTag::Pipe {
                    self.render_token(main, Space::Space); // catch
                    self.render_token(fallback_first - 3, Space::None); // |
                    self.render_token(fallback_first - 2, Space::None); // identifier
                    self.render_token(fallback_first - 1, after_op_space); // |
                } else {
                    self.render_token(main, after_op_space); // catch
                }
                if after_op_space == Space::Newline {
                    self.ais.push_indent_one_shot();
                }
                self.render_expression(data.rhs, space);
            }

            node::Tag::FieldAccess => {
                self.render_expression(data.lhs, Space::None);
                let lhs_last = ast.last_token(data.lhs);
                // Allow a line break before the dot when the lhs wraps.
                let same_line = ast.tokens_on_same_line(lhs_last, main + 1);
                if !same_line {
                    if !self.has_comment(lhs_last, main) {
                        self.ais.insert_newline();
                    }
                    self.ais.push_indent_one_shot();
                }
                self.render_token(main, Space::None); // .
                self.render_token(data.rhs, space); // name
            }

            node::Tag::ErrorUnion => {
                self.render_expression(data.lhs, Space::None);
                self.render_token(main, Space::None); // !
                self.render_expression(data.rhs, space);
            }

            node::Tag::EqualEqual
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
            | node::Tag::BoolOr => {
                self.render_expression(data.lhs, Space::Space);
                if ast.tokens_on_same_line(main, main + 1) {
                    self.render_token(main, Space::Space);
                } else {
                    self.ais.push_indent();
                    self.render_token(main, Space::Newline);
                    self.ais.pop_indent();
                    self.ais.push_indent_one_shot();
                }
                self.render_expression(data.rhs, space);
            }

            node::Tag::Deref => {
                self.render_expression(data.lhs, Space::None);
                self.render_token(main, space); // .*
            }

            node::Tag::UnwrapOptional => {
                self.render_expression(data.lhs, Space::None);
                self.render_token(main, Space::None); // .
                self.render_token(data.rhs, space); // ?
            }

            node::Tag::ArrayAccess => {
                self.render_expression(data.lhs, Space::None);
                self.ais.push_indent_next_line();
                self.render_token(main, Space::None); // [
                self.render_expression(data.rhs, Space::None);
                self.ais.pop_indent();
                self.render_token(ast.last_token(data.rhs) + 1, space); // ]
            }

            node::Tag::SliceOpen | node::Tag::Slice | node::Tag::SliceSentinel => {
                let slice = ast.full_slice(node_index).unwrap();
                self.render_slice(node_index, slice, space);
            }

            node::Tag::ArrayType | node::Tag::ArrayTypeSentinel => {
                let array_type = ast.full_array_type(node_index).unwrap();
                self.render_array_type(array_type, space);
            }

            node::Tag::PtrTypeAligned
            | node::Tag::PtrTypeSentinel
            | node::Tag::PtrType
            | node::Tag::PtrTypeBitRange => {
                let ptr_type = ast.full_ptr_type(node_index).unwrap();
                self.render_ptr_type(ptr_type, space);
            }

            node::Tag::ArrayInitOne
            | node::Tag::ArrayInitOneComma
            | node::Tag::ArrayInitDotTwo
            | node::Tag::ArrayInitDotTwoComma
            | node::Tag::ArrayInitDot
            | node::Tag::ArrayInitDotComma
            | node::Tag::ArrayInit
            | node::Tag::ArrayInitComma => {
                let mut buffer = [0, 0];
                let array_init = ast.full_array_init(&mut buffer, node_index).unwrap();
                self.render_array_init(array_init, space);
            }

            node::Tag::StructInitOne
            | node::Tag::StructInitOneComma
            | node::Tag::StructInitDotTwo
            | node::Tag::StructInitDotTwoComma
            | node::Tag::StructInitDot
            | node::Tag::StructInitDotComma
            | node::Tag::StructInit
            | node::Tag::StructInitComma => {
                let mut buffer = [0, 0];
                let struct_init = ast.full_struct_init(&mut buffer, node_index).unwrap();
                self.render_struct_init(struct_init, space);
            }

            node::Tag::CallOne
            | node::Tag::CallOneComma
            | node::Tag::AsyncCallOne
            | node::Tag::AsyncCallOneComma
            | node::Tag::Call
            | node::Tag::CallComma
            | node::Tag::AsyncCall
            | node::Tag::AsyncCallComma => {
                let mut buffer = [0];
                let call = ast.full_call(&mut buffer, node_index).unwrap();
                self.render_call(call, space);
            }

            node::Tag::Switch | node::Tag::SwitchComma => {
                self.render_switch(node_index, space);
            }

            node::Tag::SwitchCaseOne | node::Tag::SwitchCase => {
                let mut buffer = [0];
                let switch_case = ast.full_switch_case(&mut buffer, node_index).unwrap();
                self.render_switch_case(switch_case, space);
            }

            node::Tag::SwitchRange => {
                self.render_expression(data.lhs, Space::None);
                self.render_token(main, Space::None); // ...
                self.render_expression(data.rhs, space);
            }

            node::Tag::WhileSimple | node::Tag::WhileCont | node::Tag::While => {
                let while_view = ast.full_while(node_index).unwrap();
                self.render_while(while_view, space);
            }

            node::Tag::ForSimple | node::Tag::For => {
                let for_view = ast.full_for(node_index).unwrap();
                // A for loop is a while loop without a continue expression.
                let while_view = full::While {
                    while_token: for_view.for_token,
                    cond_expr: for_view.input,
                    cont_expr: 0,
                    then_expr: for_view.then_expr,
                    else_expr: for_view.else_expr,
                    label_token: for_view.label_token,
                    inline_token: for_view.inline_token,
                    payload_token: Some(for_view.payload_token),
                    error_token: None,
                    else_token: for_view.else_token,
                };
                self.render_while(while_view, space);
            }

            node::Tag::IfSimple | node::Tag::If => {
                let if_view = ast.full_if(node_index).unwrap();
                // An if is a while without continue expression or label.
                let while_view = full::While {
                    while_token: if_view.if_token,
                    cond_expr: if_view.cond_expr,
                    cont_expr: 0,
                    then_expr: if_view.then_expr,
                    else_expr: if_view.else_expr,
                    label_token: None,
                    inline_token: None,
                    payload_token: if_view.payload_token,
                    error_token: if_view.error_token,
                    else_token: if_view.else_token,
                };
                self.render_while(while_view, space);
            }

            node::Tag::Continue => {
                if data.lhs != 0 {
                    self.render_token(main, Space::Space); // continue
                    self.render_token(data.lhs - 1, Space::None); // :
                    self.render_token(data.lhs, space); // label
                } else {
                    self.render_token(main, space);
                }
            }

            node::Tag::Break => {
                let label_token = data.lhs;
                let target = data.rhs;
                if label_token == 0 && target == 0 {
                    self.render_token(main, space);
                } else if label_token == 0 {
                    self.render_token(main, Space::Space);
                    self.render_expression(target, space);
                } else if target == 0 {
                    self.render_token(main, Space::Space);
                    self.render_token(label_token - 1, Space::None); // :
                    self.render_token(label_token, space);
                } else {
                    self.render_token(main, Space::Space);
                    self.render_token(label_token - 1, Space::None); // :
                    self.render_token(label_token, Space::Space);
                    self.render_expression(target, space);
                }
            }

            node::Tag::Return => {
                if data.lhs != 0 {
                    self.render_token(main, Space::Space);
                    self.render_expression(data.lhs, space);
                } else {
                    self.render_token(main, space);
                }
            }

            node::Tag::AnyframeType => {
                self.render_token(main, Space::None); // anyframe
                self.render_token(data.lhs, Space::None); // ->
                self.render_expression(data.rhs, space);
            }

            node::Tag::BlockTwo | node::Tag::BlockTwoSemicolon => {
                let statements = [data.lhs, data.rhs];
                let count = if data.lhs == 0 {
                    0
                } else if data.rhs == 0 {
                    1
                } else {
                    2
                };
                self.render_block(node_index, &statements[..count], space);
            }
            node::Tag::Block | node::Tag::BlockSemicolon => {
                let statements = ast.extra_slice(data.lhs, data.rhs);
                self.render_block(node_index, statements, space);
            }

            node::Tag::ErrorSetDecl => {
                self.render_error_set_decl(node_index, space);
            }

            node::Tag::BuiltinCallTwo | node::Tag::BuiltinCallTwoComma => {
                let params = [data.lhs, data.rhs];
                let count = if data.lhs == 0 {
                    0
                } else if data.rhs == 0 {
                    1
                } else {
                    2
                };
                self.render_builtin_call(main, &params[..count], space);
            }
            node::Tag::BuiltinCall | node::Tag::BuiltinCallComma => {
                let params = ast.extra_slice(data.lhs, data.rhs);
                self.render_builtin_call(main, params, space);
            }

            node::Tag::FnProtoSimple
            | node::Tag::FnProtoMulti
            | node::Tag::FnProtoOne
            | node::Tag::FnProto => {
                let mut buffer = [0];
                let fn_proto = ast.full_fn_proto(&mut buffer, node_index).unwrap();
                self.render_fn_proto(fn_proto, space);
            }

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
                let mut buffer = [0, 0];
                let container_decl = ast.full_container_decl(&mut buffer, node_index).unwrap();
                self.render_container_decl(node_index, container_decl, space);
            }

            node::Tag::AsmSimple | node::Tag::Asm => {
                let asm_view = ast.full_asm(node_index).unwrap();
                self.render_asm(asm_view, space);
            }

            node::Tag::GlobalVarDecl
            | node::Tag::LocalVarDecl
            | node::Tag::SimpleVarDecl
            | node::Tag::AlignedVarDecl => {
                // A var decl can appear as the else branch of a statement.
                let var_decl = ast.full_var_decl(node_index).unwrap();
                self.render_var_decl(var_decl);
            }

            node::Tag::Root
            | node::Tag::Usingnamespace
            | node::Tag::TestDecl
            | node::Tag::FnDecl
            | node::Tag::ContainerField
            | node::Tag::ContainerFieldInit
            | node::Tag::ContainerFieldAlign
            | node::Tag::AsmOutput
            | node::Tag::AsmInput => {
                unreachable!("member-level node in expression position")
            }
        }
    }

    // ------------------------------------------------------------------
    // Composite constructs
    // ------------------------------------------------------------------

    fn render_while(&mut self, while_node: full::While, space: Space) {
        let ast = self.ast;
        if let Some(label) = while_node.label_token {
            self.render_token(label, Space::None); // name
            self.render_token(label + 1, Space::Space); // :
        }
        if let Some(inline_token) = while_node.inline_token {
            self.render_token(inline_token, Space::Space);
        }
        self.render_token(while_node.while_token, Space::Space); // while/for/if
        self.render_token(while_node.while_token + 1, Space::None); // (
        self.render_expression(while_node.cond_expr, Space::None);
        let rparen = ast.last_token(while_node.cond_expr) + 1;

        let mut last_prefix_token = rparen;
        if let Some(payload_token) = while_node.payload_token {
            self.render_token(last_prefix_token, Space::Space); // )
            self.render_token(payload_token - 1, Space::None); // |
            let mut tok = payload_token;
            loop {
                match ast.token_tag(tok) {
                    TokenTag::Asterisk => {
                        self.render_token(tok, Space::None);
                        tok += 1;
                    }
                    TokenTag::Identifier => {
                        if ast.token_tag(tok + 1) == TokenTag::Comma {
                            self.render_token(tok, Space::None);
                            self.render_token(tok + 1, Space::Space);
                            tok += 2;
                        } else {
                            self.render_token(tok, Space::None);
                            tok += 1;
                        }
                    }
                    _ => break,
                }
            }
            debug_assert_eq!(ast.token_tag(tok), TokenTag::Pipe);
            last_prefix_token = tok;
        }
        if while_node.cont_expr != 0 {
            self.render_token(last_prefix_token, Space::Space);
            let colon = ast.first_token(while_node.cont_expr) - 2;
            self.render_token(colon, Space::Space); // :
            self.render_token(colon + 1, Space::None); // (
            self.render_expression(while_node.cont_expr, Space::None);
            last_prefix_token = ast.last_token(while_node.cont_expr) + 1; // )
        }
        self.render_then_else(
            last_prefix_token,
            while_node.then_expr,
            while_node.else_token,
            while_node.error_token,
            while_node.else_expr,
            space,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn render_then_else(
        &mut self,
        last_prefix_token: TokenIndex,
        then_expr: NodeIndex,
        else_token: Option<TokenIndex>,
        error_token: Option<TokenIndex>,
        else_expr: NodeIndex,
        space: Space,
    ) {
        let ast = self.ast;
        let then_is_block = node_is_block(ast.node_tag(then_expr));
        let indent_then =
            !then_is_block && !ast.tokens_on_same_line(last_prefix_token, ast.first_token(then_expr));
        if indent_then {
            self.ais.push_indent_one_shot();
            self.render_token(last_prefix_token, Space::Newline);
        } else {
            self.render_token(last_prefix_token, Space::Space);
        }
        if else_expr == 0 {
            return self.render_expression(then_expr, space);
        }
        let else_token = else_token.expect("else expression without else token");
        if then_is_block || ast.tokens_on_same_line(ast.last_token(then_expr), else_token) {
            self.render_expression(then_expr, Space::Space);
        } else {
            self.render_expression(then_expr, Space::Newline);
        }
        if let Some(error_token) = error_token {
            self.render_token(else_token, Space::Space); // else
            self.render_token(error_token - 1, Space::None); // |
            self.render_token(error_token, Space::None); // identifier
            self.render_token(error_token + 1, Space::Space); // |
            self.render_expression(else_expr, space);
        } else {
            let else_on_same_line = node_is_block(ast.node_tag(else_expr))
                || ast.tokens_on_same_line(else_token, ast.first_token(else_expr));
            if else_on_same_line {
                self.render_token(else_token, Space::Space);
            } else {
                self.ais.push_indent_one_shot();
                self.render_token(else_token, Space::Newline);
            }
            self.render_expression(else_expr, space);
        }
    }

    fn render_block(&mut self, block_node: NodeIndex, statements: &[NodeIndex], space: Space) {
        let ast = self.ast;
        let lbrace = ast.main_token(block_node);
        if lbrace >= 2
            && ast.token_tag(lbrace - 1) == TokenTag::Colon
            && ast.token_tag(lbrace - 2) == TokenTag::Identifier
        {
            self.render_token(lbrace - 2, Space::None); // label
            self.render_token(lbrace - 1, Space::Space); // :
        }
        self.ais.push_indent_next_line();
        if statements.is_empty() {
            self.render_token(lbrace, Space::None);
            self.ais.pop_indent();
            return self.render_token(ast.last_token(block_node), space); // }
        }
        self.render_token(lbrace, Space::Newline);
        for (i, &stmt) in statements.iter().enumerate() {
            if i != 0 {
                self.render_extra_newline(stmt);
            }
            match ast.node_tag(stmt) {
                node::Tag::GlobalVarDecl
                | node::Tag::LocalVarDecl
                | node::Tag::SimpleVarDecl
                | node::Tag::AlignedVarDecl => {
                    let var_decl = ast.full_var_decl(stmt).unwrap();
                    self.render_var_decl(var_decl);
                }
                _ => self.render_expression(stmt, Space::Semicolon),
            }
        }
        self.ais.pop_indent();
        self.render_token(ast.last_token(block_node), space)
    }

    fn render_call(&mut self, call: full::Call, space: Space) {
        if let Some(async_token) = call.async_token {
            self.render_token(async_token, Space::Space);
        }
        self.render_expression(call.fn_expr, Space::None);
        self.render_param_list(call.lparen, call.params, space);
    }

    fn render_param_list(&mut self, lparen: TokenIndex, params: &[NodeIndex], space: Space) {
        let ast = self.ast;
        if params.is_empty() {
            self.ais.push_indent_next_line();
            self.render_token(lparen, Space::None);
            self.ais.pop_indent();
            return self.render_token(lparen + 1, space); // )
        }
        let last_param = params[params.len() - 1];
        let after_last = ast.last_token(last_param) + 1;
        if ast.token_tag(after_last) == TokenTag::Comma {
            self.ais.push_indent_next_line();
            self.render_token(lparen, Space::Newline); // (
            for (i, &param) in params.iter().enumerate() {
                if i + 1 < params.len() {
                    self.render_expression(param, Space::None);
                    // Unindent the comma after a multiline string.
                    let is_multiline_string = ast.token_tag(ast.first_token(param))
                        == TokenTag::MultilineStringLiteralLine;
                    if is_multiline_string {
                        self.ais.pop_indent();
                    }
                    let comma = ast.last_token(param) + 1;
                    self.render_token(comma, Space::Newline);
                    if is_multiline_string {
                        self.ais.push_indent();
                    }
                    self.render_extra_newline(params[i + 1]);
                } else {
                    self.render_expression(param, Space::Comma);
                }
            }
            self.ais.pop_indent();
            return self.render_token(after_last + 1, space); // )
        }
        self.render_token(lparen, Space::None);
        for (i, &param) in params.iter().enumerate() {
            let first_param_token = ast.first_token(param);
            if ast.token_tag(first_param_token) == TokenTag::MultilineStringLiteralLine
                || (first_param_token > 0 && self.has_same_line_comment(first_param_token - 1))
            {
                self.ais.push_indent_one_shot();
            }
            self.render_expression(param, Space::None);
            if i + 1 < params.len() {
                let comma = ast.last_token(param) + 1;
                self.render_token(comma, Space::Space);
            }
        }
        self.render_token(after_last, space) // )
    }

    fn render_array_init(&mut self, array_init: full::ArrayInit, space: Space) {
        let ast = self.ast;
        if array_init.type_expr == 0 {
            self.render_token(array_init.lbrace - 1, Space::NoComment); // .
        } else {
            self.render_expression(array_init.type_expr, Space::None);
        }
        if array_init.elements.is_empty() {
            self.ais.push_indent_next_line();
            self.render_token(array_init.lbrace, Space::None);
            self.ais.pop_indent();
            return self.render_token(array_init.lbrace + 1, space); // }
        }
        let last_elem = *array_init.elements.last().unwrap();
        let after_last = ast.last_token(last_elem) + 1;
        let trailing_comma = ast.token_tag(after_last) == TokenTag::Comma;
        if array_init.elements.len() == 1
            && !trailing_comma
            && !self.has_comment(array_init.lbrace, after_last)
            && !self.has_multiline_string(array_init.lbrace, after_last)
        {
            // Render compact: `.{x}`.
            self.render_token(array_init.lbrace, Space::None);
            self.render_expression(array_init.elements[0], Space::None);
            return self.render_token(after_last, space); // }
        }
        if trailing_comma || self.has_comment(array_init.lbrace, after_last) {
            // One element per line.
            self.ais.push_indent_next_line();
            self.render_token(array_init.lbrace, Space::Newline);
            for (i, &elem) in array_init.elements.iter().enumerate() {
                if i != 0 {
                    self.render_extra_newline(elem);
                }
                if i + 1 < array_init.elements.len() {
                    self.render_expression(elem, Space::None);
                    let is_multiline_string =
                        ast.token_tag(ast.first_token(elem)) == TokenTag::MultilineStringLiteralLine;
                    if is_multiline_string {
                        self.ais.pop_indent();
                    }
                    let comma = ast.last_token(elem) + 1;
                    self.render_token(comma, Space::Newline);
                    if is_multiline_string {
                        self.ais.push_indent();
                    }
                } else {
                    self.render_expression(elem, Space::Comma);
                }
            }
            self.ais.pop_indent();
            let rbrace = if trailing_comma {
                after_last + 1
            } else {
                after_last
            };
            return self.render_token(rbrace, space); // }
        }
        // Single line: `.{ a, b }`.
        self.render_token(array_init.lbrace, Space::Space);
        for (i, &elem) in array_init.elements.iter().enumerate() {
            if i + 1 < array_init.elements.len() {
                self.render_expression(elem, Space::CommaSpace);
            } else {
                self.render_expression(elem, Space::Space);
            }
        }
        self.render_token(after_last, space) // }
    }

    fn render_struct_init(&mut self, struct_init: full::StructInit, space: Space) {
        let ast = self.ast;
        if struct_init.type_expr == 0 {
            self.render_token(struct_init.lbrace - 1, Space::NoComment); // .
        } else {
            self.render_expression(struct_init.type_expr, Space::None);
        }
        if struct_init.fields.is_empty() {
            self.ais.push_indent_next_line();
            self.render_token(struct_init.lbrace, Space::None);
            self.ais.pop_indent();
            return self.render_token(struct_init.lbrace + 1, space); // }
        }
        let last_field = *struct_init.fields.last().unwrap();
        let after_last = ast.last_token(last_field) + 1;
        let trailing_comma = ast.token_tag(after_last) == TokenTag::Comma;
        if trailing_comma || self.has_comment(struct_init.lbrace, after_last) {
            // One field per line.
            self.ais.push_indent_next_line();
            self.render_token(struct_init.lbrace, Space::Newline);
            for (i, &field) in struct_init.fields.iter().enumerate() {
                if i != 0 {
                    self.render_extra_newline(field);
                }
                let init_token = ast.first_token(field);
                self.render_token(init_token - 3, Space::None); // .
                self.render_token(init_token - 2, Space::Space); // name
                self.render_token(init_token - 1, Space::Space); // =
                self.render_expression(field, Space::Comma);
            }
            self.ais.pop_indent();
            let rbrace = if trailing_comma {
                after_last + 1
            } else {
                after_last
            };
            return self.render_token(rbrace, space); // }
        }
        // Single line.
        self.render_token(struct_init.lbrace, Space::Space);
        for (i, &field) in struct_init.fields.iter().enumerate() {
            let init_token = ast.first_token(field);
            self.render_token(init_token - 3, Space::None); // .
            self.render_token(init_token - 2, Space::Space); // name
            self.render_token(init_token - 1, Space::Space); // =
            if i + 1 < struct_init.fields.len() {
                self.render_expression(field, Space::CommaSpace);
            } else {
                self.render_expression(field, Space::Space);
            }
        }
        self.render_token(after_last, space) // }
    }

    fn render_slice(&mut self, slice_node: NodeIndex, slice: full::Slice, space: Space) {
        let ast = self.ast;
        let spaced_ops = node_causes_slice_op_space(ast.node_tag(slice.start))
            || (slice.end != 0 && node_causes_slice_op_space(ast.node_tag(slice.end)));
        let after_op_space = if spaced_ops { Space::Space } else { Space::None };
        self.render_expression(slice.sliced, Space::None);
        self.render_token(slice.lbracket, Space::None); // [
        self.render_expression(slice.start, after_op_space);
        let ellipsis = ast.last_token(slice.start) + 1;
        self.render_token(ellipsis, after_op_space); // ..
        if slice.end != 0 {
            let after_end_space = if slice.sentinel != 0 {
                Space::Space
            } else {
                Space::None
            };
            self.render_expression(slice.end, after_end_space);
        }
        if slice.sentinel != 0 {
            let colon = ast.first_token(slice.sentinel) - 1;
            self.render_token(colon, Space::None); // :
            self.render_expression(slice.sentinel, Space::None);
        }
        self.render_token(ast.last_token(slice_node), space) // ]
    }

    fn render_array_type(&mut self, array_type: full::ArrayType, space: Space) {
        let ast = self.ast;
        self.render_token(array_type.lbracket, Space::None); // [
        self.render_expression(array_type.elem_count, Space::None);
        if array_type.sentinel != 0 {
            let colon = ast.first_token(array_type.sentinel) - 1;
            self.render_token(colon, Space::None); // :
            self.render_expression(array_type.sentinel, Space::None);
            self.render_token(ast.last_token(array_type.sentinel) + 1, Space::None); // ]
        } else {
            self.render_token(ast.last_token(array_type.elem_count) + 1, Space::None); // ]
        }
        self.render_expression(array_type.elem_type, space)
    }

    fn render_ptr_type(&mut self, ptr_type: full::PtrType, space: Space) {
        let ast = self.ast;
        match ptr_type.size {
            full::PtrSize::One => {
                // A `**` token is shared with the child pointer type; let
                // the child render it for both of us.
                if ast.token_tag(ptr_type.main_token) == TokenTag::AsteriskAsterisk
                    && ptr_type.main_token == ast.main_token(ptr_type.child_type)
                {
                    return self.render_expression(ptr_type.child_type, space);
                }
                self.render_token(ptr_type.main_token, Space::None); // *
            }
            full::PtrSize::Many => {
                if ptr_type.sentinel == 0 {
                    self.render_token(ptr_type.main_token - 1, Space::None); // [
                    self.render_token(ptr_type.main_token, Space::None); // *
                    self.render_token(ptr_type.main_token + 1, Space::None); // ]
                } else {
                    self.render_token(ptr_type.main_token - 1, Space::None); // [
                    self.render_token(ptr_type.main_token, Space::None); // *
                    self.render_token(ptr_type.main_token + 1, Space::None); // :
                    self.render_expression(ptr_type.sentinel, Space::None);
                    self.render_token(ast.last_token(ptr_type.sentinel) + 1, Space::None);
                    // ]
                }
            }
            full::PtrSize::C => {
                self.render_token(ptr_type.main_token - 1, Space::None); // [
                self.render_token(ptr_type.main_token, Space::None); // *
                self.render_token(ptr_type.main_token + 1, Space::None); // c
                self.render_token(ptr_type.main_token + 2, Space::None); // ]
            }
            full::PtrSize::Slice => {
                if ptr_type.sentinel == 0 {
                    self.render_token(ptr_type.main_token, Space::None); // [
                    self.render_token(ptr_type.main_token + 1, Space::None); // ]
                } else {
                    self.render_token(ptr_type.main_token, Space::None); // [
                    self.render_token(ptr_type.main_token + 1, Space::None); // :
                    self.render_expression(ptr_type.sentinel, Space::None);
                    self.render_token(ast.last_token(ptr_type.sentinel) + 1, Space::None);
                    // ]
                }
            }
        }
        if let Some(allowzero_token) = ptr_type.allowzero_token {
            self.render_token(allowzero_token, Space::Space);
        }
        if ptr_type.align_node != 0 {
            let align_first = ast.first_token(ptr_type.align_node);
            self.render_token(align_first - 2, Space::None); // align
            self.render_token(align_first - 1, Space::None); // (
            self.render_expression(ptr_type.align_node, Space::None);
            if ptr_type.bit_range_start != 0 {
                self.render_token(ast.first_token(ptr_type.bit_range_start) - 1, Space::None); // :
                self.render_expression(ptr_type.bit_range_start, Space::None);
                self.render_token(ast.first_token(ptr_type.bit_range_end) - 1, Space::None); // :
                self.render_expression(ptr_type.bit_range_end, Space::None);
                self.render_token(ast.last_token(ptr_type.bit_range_end) + 1, Space::Space);
                // )
            } else {
                self.render_token(ast.last_token(ptr_type.align_node) + 1, Space::Space);
                // )
            }
        }
        if let Some(const_token) = ptr_type.const_token {
            self.render_token(const_token, Space::Space);
        }
        if let Some(volatile_token) = ptr_type.volatile_token {
            self.render_token(volatile_token, Space::Space);
        }
        self.render_expression(ptr_type.child_type, space)
    }

    fn render_switch(&mut self, switch_node: NodeIndex, space: Space) {
        let ast = self.ast;
        let data = ast.node_data(switch_node);
        let switch_token = ast.main_token(switch_node);
        let sub_range: extra::SubRange = ast.extra(data.rhs);
        let cases = ast.extra_slice(sub_range.start, sub_range.end);
        let rparen = ast.last_token(data.lhs) + 1;
        self.render_token(switch_token, Space::Space); // switch
        self.render_token(switch_token + 1, Space::None); // (
        self.render_expression(data.lhs, Space::None);
        if cases.is_empty() {
            self.render_token(rparen, Space::Space); // )
            self.ais.push_indent_next_line();
            self.render_token(rparen + 1, Space::None); // {
            self.ais.pop_indent();
            return self.render_token(rparen + 2, space); // }
        }
        let rbrace = ast.last_token(switch_node);
        let trailing = ast.node_tag(switch_node) == node::Tag::SwitchComma;
        if trailing || self.has_comment(rparen + 1, rbrace) {
            self.render_token(rparen, Space::Space); // )
            self.ais.push_indent_next_line();
            self.render_token(rparen + 1, Space::Newline); // {
            for (i, &case) in cases.iter().enumerate() {
                if i != 0 {
                    self.render_extra_newline(case);
                }
                self.render_expression(case, Space::Comma);
            }
            self.ais.pop_indent();
            return self.render_token(rbrace, space); // }
        }
        // Single line.
        self.render_token(rparen, Space::Space); // )
        self.render_token(rparen + 1, Space::Space); // {
        for (i, &case) in cases.iter().enumerate() {
            if i + 1 < cases.len() {
                self.render_expression(case, Space::CommaSpace);
            } else {
                self.render_expression(case, Space::Space);
            }
        }
        self.render_token(rbrace, space) // }
    }

    fn render_switch_case(&mut self, switch_case: full::SwitchCase, space: Space) {
        let ast = self.ast;
        let trailing_comma = ast.token_tag(switch_case.arrow_token - 1) == TokenTag::Comma;
        if switch_case.values.is_empty() {
            self.render_token(switch_case.arrow_token - 1, Space::Space); // else
        } else if switch_case.values.len() == 1 {
            // The trailing comma before the arrow, if any, is dropped.
            self.render_expression(switch_case.values[0], Space::Space);
        } else if trailing_comma
            || self.has_comment(
                ast.first_token(switch_case.values[0]),
                switch_case.arrow_token,
            )
        {
            // One value per line, arrow on its own line.
            for (i, &value) in switch_case.values.iter().enumerate() {
                if i != 0 {
                    self.render_extra_newline(value);
                }
                self.render_expression(value, Space::Comma);
            }
        } else {
            for (i, &value) in switch_case.values.iter().enumerate() {
                if i + 1 < switch_case.values.len() {
                    self.render_expression(value, Space::CommaSpace);
                } else {
                    self.render_expression(value, Space::Space);
                }
            }
        }
        if let Some(payload_token) = switch_case.payload_token {
            self.render_token(switch_case.arrow_token, Space::Space); // =>
            self.render_token(payload_token - 1, Space::None); // |
            if ast.token_tag(payload_token) == TokenTag::Asterisk {
                self.render_token(payload_token, Space::None); // *
                self.render_token(payload_token + 1, Space::None); // identifier
                self.render_token(payload_token + 2, Space::Space); // |
            } else {
                self.render_token(payload_token, Space::None); // identifier
                self.render_token(payload_token + 1, Space::Space); // |
            }
        } else {
            self.render_token(switch_case.arrow_token, Space::Space); // =>
        }
        self.render_expression(switch_case.target_expr, space)
    }

    fn render_error_set_decl(&mut self, node_index: NodeIndex, space: Space) {
        let ast = self.ast;
        let error_token = ast.main_token(node_index);
        let lbrace = error_token + 1;
        let rbrace = ast.node_data(node_index).rhs;
        self.render_token(error_token, Space::None); // error
        if lbrace + 1 == rbrace {
            // `error{}`
            self.render_token(lbrace, Space::None);
            return self.render_token(rbrace, space);
        }
        if lbrace + 2 == rbrace && ast.token_tag(lbrace + 1) == TokenTag::Identifier {
            // `error{Single}`
            self.render_token(lbrace, Space::None);
            self.render_token(lbrace + 1, Space::None);
            return self.render_token(rbrace, space);
        }
        if ast.token_tag(rbrace - 1) == TokenTag::Comma {
            // One value per line.
            self.ais.push_indent_next_line();
            self.render_token(lbrace, Space::Newline); // {
            let mut i = lbrace + 1;
            while i < rbrace {
                if i > lbrace + 1 {
                    self.render_extra_newline_token(i);
                }
                match ast.token_tag(i) {
                    TokenTag::DocComment => self.render_token(i, Space::Newline),
                    TokenTag::Identifier => self.render_token(i, Space::Comma),
                    TokenTag::Comma => {}
                    _ => unreachable!("unexpected token in error set"),
                }
                i += 1;
            }
            self.ais.pop_indent();
            return self.render_token(rbrace, space);
        }
        // Single line.
        self.render_token(lbrace, Space::Space); // {
        let mut i = lbrace + 1;
        while i < rbrace {
            match ast.token_tag(i) {
                TokenTag::DocComment => self.render_token(i, Space::Newline),
                TokenTag::Identifier => self.render_token(i, Space::CommaSpace),
                TokenTag::Comma => {}
                _ => unreachable!("unexpected token in error set"),
            }
            i += 1;
        }
        self.render_token(rbrace, space)
    }

    fn render_builtin_call(
        &mut self,
        builtin_token: TokenIndex,
        params: &[NodeIndex],
        space: Space,
    ) {
        let ast = self.ast;
        self.render_token(builtin_token, Space::None); // @name
        if params.is_empty() {
            self.render_token(builtin_token + 1, Space::None); // (
            return self.render_token(builtin_token + 2, space); // )
        }
        let last_param = params[params.len() - 1];
        let after_last = ast.last_token(last_param) + 1;
        if ast.token_tag(after_last) == TokenTag::Comma {
            // One argument per line.
            self.ais.push_indent_next_line();
            self.render_token(builtin_token + 1, Space::Newline); // (
            for (i, &param) in params.iter().enumerate() {
                if i != 0 {
                    self.render_extra_newline(param);
                }
                self.render_expression(param, Space::Comma);
            }
            self.ais.pop_indent();
            return self.render_token(after_last + 1, space); // )
        }
        self.render_token(builtin_token + 1, Space::None); // (
        for (i, &param) in params.iter().enumerate() {
            if i != 0 {
                let comma = ast.last_token(params[i - 1]) + 1;
                self.render_token(comma, Space::Space);
            }
            self.render_expression(param, Space::None);
        }
        self.render_token(after_last, space) // )
    }

    fn render_fn_proto(&mut self, fn_proto: full::FnProto, space: Space) {
        let ast = self.ast;
        self.render_token(fn_proto.fn_token, Space::Space); // fn
        if let Some(name) = fn_proto.name_token {
            self.render_token(name, Space::None);
        }
        let lparen = fn_proto.lparen;
        debug_assert_eq!(ast.token_tag(lparen), TokenTag::LParen);
        debug_assert!(fn_proto.return_type != 0);

        let maybe_bang = ast.first_token(fn_proto.return_type) - 1;
        let rparen = {
            // Clauses may appear in any order after the parameter list;
            // the params rparen is before the earliest of them.
            let mut rparen = if ast.token_tag(maybe_bang) == TokenTag::Bang {
                maybe_bang - 1
            } else {
                maybe_bang
            };
            for clause in [
                fn_proto.align_expr,
                fn_proto.section_expr,
                fn_proto.callconv_expr,
            ] {
                if clause != 0 {
                    let tok = ast.first_token(clause) - 3;
                    if tok < rparen {
                        rparen = tok;
                    }
                }
            }
            rparen
        };
        debug_assert_eq!(ast.token_tag(rparen), TokenTag::RParen);

        let trailing_comma = ast.token_tag(rparen - 1) == TokenTag::Comma;
        if !trailing_comma && !self.has_comment(lparen, rparen) {
            // Parameters on one line.
            self.render_token(lparen, Space::None); // (
            let mut param_i = 0usize;
            let mut last_param_token = lparen;
            loop {
                last_param_token += 1;
                match ast.token_tag(last_param_token) {
                    TokenTag::DocComment => {
                        self.render_token(last_param_token, Space::Newline);
                        continue;
                    }
                    TokenTag::Ellipsis3 => {
                        self.render_token(last_param_token, Space::None);
                        break;
                    }
                    TokenTag::KeywordNoalias | TokenTag::KeywordComptime => {
                        self.render_token(last_param_token, Space::Space);
                        last_param_token += 1;
                    }
                    TokenTag::Identifier => {}
                    TokenTag::KeywordAnytype => {
                        self.render_token(last_param_token, Space::None);
                        continue;
                    }
                    TokenTag::RParen => break,
                    TokenTag::Comma => {
                        self.render_token(last_param_token, Space::Space);
                        continue;
                    }
                    _ => {}
                }
                if ast.token_tag(last_param_token) == TokenTag::Identifier
                    && ast.token_tag(last_param_token + 1) == TokenTag::Colon
                {
                    self.render_token(last_param_token, Space::None); // name
                    last_param_token += 1;
                    self.render_token(last_param_token, Space::Space); // :
                    last_param_token += 1;
                }
                if ast.token_tag(last_param_token) == TokenTag::KeywordAnytype {
                    self.render_token(last_param_token, Space::None);
                    continue;
                }
                let param = fn_proto.params[param_i];
                param_i += 1;
                self.render_expression(param, Space::None);
                last_param_token = ast.last_token(param);
            }
            self.render_token(rparen, Space::Space); // )
        } else {
            // One parameter per line.
            self.ais.push_indent();
            self.render_token(lparen, Space::Newline); // (
            let mut param_i = 0usize;
            let mut last_param_token = lparen;
            loop {
                last_param_token += 1;
                match ast.token_tag(last_param_token) {
                    TokenTag::DocComment => {
                        self.render_token(last_param_token, Space::Newline);
                        continue;
                    }
                    TokenTag::Ellipsis3 => {
                        self.render_token(last_param_token, Space::Comma);
                        break;
                    }
                    TokenTag::KeywordNoalias | TokenTag::KeywordComptime => {
                        self.render_token(last_param_token, Space::Space);
                        last_param_token += 1;
                    }
                    TokenTag::Identifier => {}
                    TokenTag::KeywordAnytype => {
                        self.render_token(last_param_token, Space::Comma);
                        continue;
                    }
                    TokenTag::RParen => break,
                    TokenTag::Comma => continue,
                    _ => {}
                }
                if ast.token_tag(last_param_token) == TokenTag::Identifier
                    && ast.token_tag(last_param_token + 1) == TokenTag::Colon
                {
                    self.render_token(last_param_token, Space::None); // name
                    last_param_token += 1;
                    self.render_token(last_param_token, Space::Space); // :
                    last_param_token += 1;
                }
                if ast.token_tag(last_param_token) == TokenTag::KeywordAnytype {
                    self.render_token(last_param_token, Space::Comma);
                    continue;
                }
                let param = fn_proto.params[param_i];
                param_i += 1;
                self.render_expression(param, Space::Comma);
                last_param_token = ast.last_token(param);
            }
            self.ais.pop_indent();
            self.render_token(rparen, Space::Space); // )
        }
        if fn_proto.align_expr != 0 {
            let align_lparen = ast.first_token(fn_proto.align_expr) - 1;
            self.render_token(align_lparen - 1, Space::None); // align
            self.render_token(align_lparen, Space::None); // (
            self.render_expression(fn_proto.align_expr, Space::None);
            self.render_token(ast.last_token(fn_proto.align_expr) + 1, Space::Space);
            // )
        }
        if fn_proto.section_expr != 0 {
            let section_lparen = ast.first_token(fn_proto.section_expr) - 1;
            self.render_token(section_lparen - 1, Space::None); // linksection
            self.render_token(section_lparen, Space::None); // (
            self.render_expression(fn_proto.section_expr, Space::None);
            self.render_token(ast.last_token(fn_proto.section_expr) + 1, Space::Space);
            // )
        }
        if fn_proto.callconv_expr != 0 {
            let callconv_lparen = ast.first_token(fn_proto.callconv_expr) - 1;
            self.render_token(callconv_lparen - 1, Space::None); // callconv
            self.render_token(callconv_lparen, Space::None); // (
            self.render_expression(fn_proto.callconv_expr, Space::None);
            self.render_token(ast.last_token(fn_proto.callconv_expr) + 1, Space::Space);
            // )
        }
        if ast.token_tag(maybe_bang) == TokenTag::Bang {
            self.render_token(maybe_bang, Space::None); // !
        }
        self.render_expression(fn_proto.return_type, space)
    }

    fn render_container_decl(
        &mut self,
        container_node: NodeIndex,
        container_decl: full::ContainerDecl,
        space: Space,
    ) {
        let ast = self.ast;
        if let Some(layout_token) = container_decl.layout_token {
            self.render_token(layout_token, Space::Space); // packed/extern
        }
        let main = container_decl.main_token;
        let lbrace: TokenIndex;
        if let Some(enum_token) = container_decl.enum_token {
            self.render_token(main, Space::None); // union
            self.render_token(main + 1, Space::None); // (
            if container_decl.arg != 0 {
                self.render_token(enum_token, Space::None); // enum
                self.render_token(enum_token + 1, Space::None); // (
                self.render_expression(container_decl.arg, Space::None);
                let rparen = ast.last_token(container_decl.arg) + 1;
                self.render_token(rparen, Space::None); // )
                self.render_token(rparen + 1, Space::Space); // )
                lbrace = rparen + 2;
            } else {
                self.render_token(enum_token, Space::None); // enum
                self.render_token(enum_token + 1, Space::Space); // )
                lbrace = enum_token + 2;
            }
        } else if container_decl.arg != 0 {
            self.render_token(main, Space::None); // enum/union
            self.render_token(main + 1, Space::None); // (
            self.render_expression(container_decl.arg, Space::None);
            let rparen = ast.last_token(container_decl.arg) + 1;
            self.render_token(rparen, Space::Space); // )
            lbrace = rparen + 1;
        } else {
            self.render_token(main, Space::Space);
            lbrace = main + 1;
        }
        let rbrace = ast.last_token(container_node);
        if container_decl.members.is_empty() {
            self.ais.push_indent_next_line();
            self.render_token(lbrace, Space::None);
            self.ais.pop_indent();
            return self.render_token(rbrace, space); // }
        }
        let src_has_trailing_comma = ast.token_tag(rbrace - 1) == TokenTag::Comma;
        if !src_has_trailing_comma {
            // All-fields containers fit on one line when nothing needs its
            // own line.
            let mut one_line = !self.has_comment(lbrace, rbrace)
                && ast.token_tag(lbrace + 1) != TokenTag::ContainerDocComment;
            for &member in container_decl.members {
                if !ast.node_tag(member).is_container_field() {
                    one_line = false;
                    break;
                }
                let first = ast.first_token(member);
                if first > 0 && ast.token_tag(first - 1) == TokenTag::DocComment {
                    one_line = false;
                    break;
                }
                if !ast.tokens_on_same_line(first, ast.last_token(member)) {
                    one_line = false;
                    break;
                }
            }
            if one_line {
                self.render_token(lbrace, Space::Space); // {
                for &member in container_decl.members {
                    let field = ast.full_container_field(member).unwrap();
                    self.render_container_field(field, Space::CommaSpace);
                }
                return self.render_token(rbrace, space); // }
            }
        }
        // One member per line.
        self.ais.push_indent_next_line();
        self.render_token(lbrace, Space::Newline); // {
        self.render_container_doc_comments(lbrace + 1);
        for (i, &member) in container_decl.members.iter().enumerate() {
            if i != 0 {
                self.render_extra_newline(member);
            }
            self.render_member(member, member_space(ast.node_tag(member)));
        }
        self.ais.pop_indent();
        self.render_token(rbrace, space) // }
    }

    fn render_asm(&mut self, asm_node: full::Asm, space: Space) {
        let ast = self.ast;
        self.render_token(asm_node.asm_token, Space::Space); // asm
        let lparen = match asm_node.volatile_token {
            Some(volatile_token) => {
                self.render_token(volatile_token, Space::Space); // volatile
                volatile_token + 1
            }
            None => asm_node.asm_token + 1,
        };
        if asm_node.items.is_empty() {
            if let Some(first_clobber) = asm_node.first_clobber {
                // `asm ("foo" ::: "a", "b")`: walk the clobbers by token.
                self.render_token(lparen, Space::None); // (
                self.render_expression(asm_node.template, Space::Space);
                let colon1 = ast.last_token(asm_node.template) + 1;
                self.render_token(colon1, Space::None); // :
                self.render_token(colon1 + 1, Space::None); // :
                self.render_token(colon1 + 2, Space::Space); // :
                let mut tok_i = first_clobber;
                loop {
                    match ast.token_tag(tok_i + 1) {
                        TokenTag::RParen => {
                            self.render_token(tok_i, Space::None); // clobber
                            return self.render_token(tok_i + 1, space); // )
                        }
                        TokenTag::Comma => {
                            if ast.token_tag(tok_i + 2) == TokenTag::RParen {
                                self.render_token(tok_i, Space::None);
                                self.render_token(tok_i + 1, Space::None); // ,
                                return self.render_token(tok_i + 2, space); // )
                            }
                            self.render_token(tok_i, Space::None); // clobber
                            self.render_token(tok_i + 1, Space::Space); // ,
                            tok_i += 2;
                        }
                        _ => unreachable!("unexpected token in asm clobbers"),
                    }
                }
            }
            // `asm ("foo")`
            self.render_token(lparen, Space::None); // (
            self.render_expression(asm_node.template, Space::None);
            return self.render_token(asm_node.rparen, space); // )
        }
        self.ais.push_indent();
        self.render_token(lparen, Space::Newline); // (
        self.ais.set_indent_delta(ASM_INDENT_DELTA);
        self.render_expression(asm_node.template, Space::Newline);
        let colon1 = ast.last_token(asm_node.template) + 1;
        let colon2 = if asm_node.outputs.is_empty() {
            self.render_token(colon1, Space::Newline); // :
            colon1 + 1
        } else {
            self.render_token(colon1, Space::Space); // :
            self.ais.push_indent();
            let mut colon2 = 0;
            for (i, &output) in asm_node.outputs.iter().enumerate() {
                if i + 1 < asm_node.outputs.len() {
                    self.render_asm_output(output, Space::None);
                    let comma = ast.last_token(output) + 1;
                    self.render_token(comma, Space::Newline); // ,
                } else if asm_node.inputs.is_empty() && asm_node.first_clobber.is_none() {
                    self.render_asm_output(output, Space::Comma);
                    self.ais.pop_indent();
                    self.ais.set_indent_delta(INDENT_DELTA);
                    self.ais.pop_indent();
                    return self.render_token(asm_node.rparen, space); // )
                } else {
                    self.render_asm_output(output, Space::None);
                    let comma_or_colon = ast.last_token(output) + 1;
                    colon2 = if ast.token_tag(comma_or_colon) == TokenTag::Comma {
                        self.render_token(comma_or_colon, Space::Newline); // ,
                        comma_or_colon + 1
                    } else {
                        self.ais.insert_newline();
                        comma_or_colon
                    };
                }
            }
            self.ais.pop_indent();
            colon2
        };
        let colon3 = if asm_node.inputs.is_empty() {
            self.render_token(colon2, Space::Newline); // :
            colon2 + 1
        } else {
            self.render_token(colon2, Space::Space); // :
            self.ais.push_indent();
            let mut colon3 = 0;
            for (i, &input) in asm_node.inputs.iter().enumerate() {
                if i + 1 < asm_node.inputs.len() {
                    self.render_asm_input(input, Space::None);
                    let comma = ast.last_token(input) + 1;
                    self.render_token(comma, Space::Newline); // ,
                } else if asm_node.first_clobber.is_none() {
                    self.render_asm_input(input, Space::Comma);
                    self.ais.pop_indent();
                    self.ais.set_indent_delta(INDENT_DELTA);
                    self.ais.pop_indent();
                    return self.render_token(asm_node.rparen, space); // )
                } else {
                    self.render_asm_input(input, Space::None);
                    let comma_or_colon = ast.last_token(input) + 1;
                    colon3 = if ast.token_tag(comma_or_colon) == TokenTag::Comma {
                        self.render_token(comma_or_colon, Space::Newline); // ,
                        comma_or_colon + 1
                    } else {
                        self.ais.insert_newline();
                        comma_or_colon
                    };
                }
            }
            self.ais.pop_indent();
            colon3
        };
        let first_clobber = asm_node
            .first_clobber
            .expect("asm sections exhausted without clobbers");
        self.render_token(colon3, Space::Space); // :
        let mut tok_i = first_clobber;
        loop {
            match ast.token_tag(tok_i + 1) {
                TokenTag::RParen => {
                    self.render_token(tok_i, Space::Newline); // last clobber
                    self.ais.set_indent_delta(INDENT_DELTA);
                    self.ais.pop_indent();
                    return self.render_token(tok_i + 1, space); // )
                }
                TokenTag::Comma => {
                    if ast.token_tag(tok_i + 2) == TokenTag::RParen {
                        self.render_token(tok_i, Space::Comma); // clobber,
                        self.ais.set_indent_delta(INDENT_DELTA);
                        self.ais.pop_indent();
                        return self.render_token(tok_i + 2, space); // )
                    }
                    self.render_token(tok_i, Space::None); // clobber
                    self.render_token(tok_i + 1, Space::Space); // ,
                    tok_i += 2;
                }
                _ => unreachable!("unexpected token in asm clobbers"),
            }
        }
    }

    fn render_asm_output(&mut self, asm_output: NodeIndex, space: Space) {
        let ast = self.ast;
        debug_assert_eq!(ast.node_tag(asm_output), node::Tag::AsmOutput);
        let data = ast.node_data(asm_output);
        let main = ast.main_token(asm_output);
        self.render_token(main, Space::None); // [
        self.render_token(main + 1, Space::None); // name
        self.render_token(main + 2, Space::Space); // ]
        self.render_token(main + 3, Space::Space); // "constraint"
        self.render_token(main + 4, Space::None); // (
        if ast.token_tag(main + 5) == TokenTag::Arrow {
            self.render_token(main + 5, Space::Space); // ->
            self.render_expression(data.lhs, Space::None);
        } else {
            self.render_token(main + 5, Space::None); // variable
        }
        self.render_token(data.rhs, space) // )
    }

    fn render_asm_input(&mut self, asm_input: NodeIndex, space: Space) {
        let ast = self.ast;
        debug_assert_eq!(ast.node_tag(asm_input), node::Tag::AsmInput);
        let data = ast.node_data(asm_input);
        let main = ast.main_token(asm_input);
        self.render_token(main, Space::None); // [
        self.render_token(main + 1, Space::None); // name
        self.render_token(main + 2, Space::Space); // ]
        self.render_token(main + 3, Space::Space); // "constraint"
        self.render_token(main + 4, Space::None); // (
        self.render_expression(data.lhs, Space::None);
        self.render_token(data.rhs, space) // )
    }
}

/// Space mode for a member in a member list: container fields keep their
/// trailing comma, everything else ends its own line.
fn member_space(tag: node::Tag) -> Space {
    if tag.is_container_field() {
        Space::Comma
    } else {
        Space::Newline
    }
}

fn node_is_block(tag: node::Tag) -> bool {
    matches!(
        tag,
        node::Tag::BlockTwo
            | node::Tag::BlockTwoSemicolon
            | node::Tag::Block
            | node::Tag::BlockSemicolon
    )
}

/// Operands that read better with spaces around `..` in a slice.
fn node_causes_slice_op_space(tag: node::Tag) -> bool {
    matches!(
        tag,
        node::Tag::Catch
            | node::Tag::Add
            | node::Tag::AddWrap
            | node::Tag::ArrayCat
            | node::Tag::ArrayMult
            | node::Tag::BangEqual
            | node::Tag::BitAnd
            | node::Tag::BitOr
            | node::Tag::BitXor
            | node::Tag::BoolAnd
            | node::Tag::BoolOr
            | node::Tag::Div
            | node::Tag::EqualEqual
            | node::Tag::ErrorUnion
            | node::Tag::GreaterOrEqual
            | node::Tag::GreaterThan
            | node::Tag::LessOrEqual
            | node::Tag::LessThan
            | node::Tag::MergeErrorSets
            | node::Tag::Mod
            | node::Tag::Mul
            | node::Tag::MulWrap
            | node::Tag::Shl
            | node::Tag::Shr
            | node::Tag::Sub
            | node::Tag::SubWrap
            | node::Tag::Orelse
    )
}

fn has_newlines(text: &str, at_least: usize) -> bool {
    text.bytes().filter(|&b| b == b'\n').count() >= at_least
}
