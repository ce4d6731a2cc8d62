//! Full views: denormalized, named-field projections of compact nodes.
//!
//! A view is computed on demand by dispatching on the node tag and reading
//! `data`/`extra_data`; nothing is stored back. Modifier tokens that the
//! compact encoding leaves implicit (`pub`, `extern`, payload pipes,
//! labels, pointer qualifiers) are recovered by short positional token
//! scans anchored on tokens whose positions the grammar fixes.
//!
//! Views whose element lists may live inline in `lhs`/`rhs` (the `_one` /
//! `_two` tag shapes) borrow a caller-provided buffer, so no view ever
//! allocates.

use super::{extra, node, Ast, NodeIndex};
use crate::token::{Tag as TokenTag, TokenIndex};

/// A variable declaration with every clause in its place.
#[derive(Debug, Clone, Copy)]
pub struct VarDecl {
    pub visib_token: Option<TokenIndex>,
    pub extern_export_token: Option<TokenIndex>,
    pub lib_name: Option<TokenIndex>,
    pub threadlocal_token: Option<TokenIndex>,
    pub comptime_token: Option<TokenIndex>,
    /// The `var` or `const` keyword.
    pub mut_token: TokenIndex,
    pub type_node: NodeIndex,
    pub align_node: NodeIndex,
    pub section_node: NodeIndex,
    pub init_node: NodeIndex,
}

#[derive(Debug, Clone, Copy)]
pub struct If {
    pub if_token: TokenIndex,
    pub cond_expr: NodeIndex,
    pub then_expr: NodeIndex,
    pub else_expr: NodeIndex,
    /// First token of the `|payload|` capture, after the opening pipe.
    pub payload_token: Option<TokenIndex>,
    /// Capture name of `else |err|`.
    pub error_token: Option<TokenIndex>,
    pub else_token: Option<TokenIndex>,
}

#[derive(Debug, Clone, Copy)]
pub struct While {
    pub while_token: TokenIndex,
    pub cond_expr: NodeIndex,
    pub cont_expr: NodeIndex,
    pub then_expr: NodeIndex,
    pub else_expr: NodeIndex,
    pub label_token: Option<TokenIndex>,
    pub inline_token: Option<TokenIndex>,
    pub payload_token: Option<TokenIndex>,
    pub error_token: Option<TokenIndex>,
    pub else_token: Option<TokenIndex>,
}

#[derive(Debug, Clone, Copy)]
pub struct For {
    pub for_token: TokenIndex,
    pub input: NodeIndex,
    pub then_expr: NodeIndex,
    pub else_expr: NodeIndex,
    pub label_token: Option<TokenIndex>,
    pub inline_token: Option<TokenIndex>,
    /// First capture token; `|v, i|` captures are contiguous from here.
    pub payload_token: TokenIndex,
    pub else_token: Option<TokenIndex>,
}

#[derive(Debug, Clone, Copy)]
pub struct ContainerField {
    pub comptime_token: Option<TokenIndex>,
    pub name_token: TokenIndex,
    pub type_expr: NodeIndex,
    pub value_expr: NodeIndex,
    pub align_expr: NodeIndex,
}

/// A function prototype. `params` holds the parameter *type* nodes;
/// `anytype` and `...` parameters exist only as tokens and are surfaced by
/// [`FnProto::iterate`].
#[derive(Debug, Clone, Copy)]
pub struct FnProto<'a> {
    pub visib_token: Option<TokenIndex>,
    pub extern_export_inline_token: Option<TokenIndex>,
    pub lib_name: Option<TokenIndex>,
    pub name_token: Option<TokenIndex>,
    pub fn_token: TokenIndex,
    pub lparen: TokenIndex,
    pub params: &'a [NodeIndex],
    pub return_type: NodeIndex,
    pub align_expr: NodeIndex,
    pub section_expr: NodeIndex,
    pub callconv_expr: NodeIndex,
}

/// One parameter as yielded by [`FnProto::iterate`].
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub first_doc_comment: Option<TokenIndex>,
    pub comptime_noalias: Option<TokenIndex>,
    pub name_token: Option<TokenIndex>,
    /// Set for `anytype` and `...` parameters, which carry no type node.
    pub anytype_ellipsis3: Option<TokenIndex>,
    pub type_expr: NodeIndex,
}

/// Iterator over the parameters of a prototype, walking the token stream
/// between the parentheses so that `anytype` and `...` parameters appear
/// in order with the typed ones.
pub struct ParamIterator<'a> {
    ast: &'a Ast,
    params: &'a [NodeIndex],
    param_i: usize,
    tok_i: TokenIndex,
}

impl<'a> Iterator for ParamIterator<'a> {
    type Item = Param;

    fn next(&mut self) -> Option<Param> {
        let ast = self.ast;
        if ast.token_tag(self.tok_i) == TokenTag::Comma {
            self.tok_i += 1;
        }
        if ast.token_tag(self.tok_i) == TokenTag::RParen {
            return None;
        }
        let mut first_doc_comment = None;
        while ast.token_tag(self.tok_i) == TokenTag::DocComment {
            if first_doc_comment.is_none() {
                first_doc_comment = Some(self.tok_i);
            }
            self.tok_i += 1;
        }
        let mut comptime_noalias = None;
        if matches!(
            ast.token_tag(self.tok_i),
            TokenTag::KeywordComptime | TokenTag::KeywordNoalias
        ) {
            comptime_noalias = Some(self.tok_i);
            self.tok_i += 1;
        }
        let mut name_token = None;
        if ast.token_tag(self.tok_i) == TokenTag::Identifier
            && ast.token_tag(self.tok_i + 1) == TokenTag::Colon
        {
            name_token = Some(self.tok_i);
            self.tok_i += 2;
        }
        match ast.token_tag(self.tok_i) {
            TokenTag::KeywordAnytype | TokenTag::Ellipsis3 => {
                let token = self.tok_i;
                self.tok_i += 1;
                Some(Param {
                    first_doc_comment,
                    comptime_noalias,
                    name_token,
                    anytype_ellipsis3: Some(token),
                    type_expr: 0,
                })
            }
            _ => {
                if self.param_i >= self.params.len() {
                    return None;
                }
                let type_expr = self.params[self.param_i];
                self.param_i += 1;
                self.tok_i = ast.last_token(type_expr) + 1;
                Some(Param {
                    first_doc_comment,
                    comptime_noalias,
                    name_token,
                    anytype_ellipsis3: None,
                    type_expr,
                })
            }
        }
    }
}

impl<'a> FnProto<'a> {
    pub fn iterate(&self, ast: &'a Ast) -> ParamIterator<'a> {
        ParamIterator {
            ast,
            params: self.params,
            param_i: 0,
            tok_i: self.lparen + 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StructInit<'a> {
    pub lbrace: TokenIndex,
    pub type_expr: NodeIndex,
    /// The field value expressions; `.name =` is recovered from the tokens
    /// before each one.
    pub fields: &'a [NodeIndex],
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayInit<'a> {
    pub lbrace: TokenIndex,
    pub type_expr: NodeIndex,
    pub elements: &'a [NodeIndex],
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayType {
    pub lbracket: TokenIndex,
    pub elem_count: NodeIndex,
    pub sentinel: NodeIndex,
    pub elem_type: NodeIndex,
}

/// Pointer flavor, derived from the shape of the sigil tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtrSize {
    /// `*T`
    One,
    /// `[*]T`
    Many,
    /// `[*c]T`
    C,
    /// `[]T`
    Slice,
}

#[derive(Debug, Clone, Copy)]
pub struct PtrType {
    pub main_token: TokenIndex,
    pub size: PtrSize,
    pub allowzero_token: Option<TokenIndex>,
    pub const_token: Option<TokenIndex>,
    pub volatile_token: Option<TokenIndex>,
    pub align_node: NodeIndex,
    pub sentinel: NodeIndex,
    pub bit_range_start: NodeIndex,
    pub bit_range_end: NodeIndex,
    pub child_type: NodeIndex,
}

#[derive(Debug, Clone, Copy)]
pub struct Slice {
    pub sliced: NodeIndex,
    pub lbracket: TokenIndex,
    pub start: NodeIndex,
    pub end: NodeIndex,
    pub sentinel: NodeIndex,
}

#[derive(Debug, Clone, Copy)]
pub struct ContainerDecl<'a> {
    /// The `struct`/`union`/`enum`/`opaque` keyword.
    pub main_token: TokenIndex,
    /// `packed` or `extern`, when present.
    pub layout_token: Option<TokenIndex>,
    /// The `enum` keyword of a tagged union: `union(enum)`.
    pub enum_token: Option<TokenIndex>,
    pub arg: NodeIndex,
    pub members: &'a [NodeIndex],
}

#[derive(Debug, Clone, Copy)]
pub struct SwitchCase<'a> {
    /// Empty for an `else` prong.
    pub values: &'a [NodeIndex],
    pub arrow_token: TokenIndex,
    pub payload_token: Option<TokenIndex>,
    pub target_expr: NodeIndex,
}

#[derive(Debug, Clone, Copy)]
pub struct Asm<'a> {
    pub asm_token: TokenIndex,
    pub volatile_token: Option<TokenIndex>,
    pub template: NodeIndex,
    pub items: &'a [NodeIndex],
    pub outputs: &'a [NodeIndex],
    pub inputs: &'a [NodeIndex],
    pub first_clobber: Option<TokenIndex>,
    pub rparen: TokenIndex,
}

#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub async_token: Option<TokenIndex>,
    pub lparen: TokenIndex,
    pub fn_expr: NodeIndex,
    pub params: &'a [NodeIndex],
}

impl Ast {
    /// View a `global_var_decl`/`local_var_decl`/`simple_var_decl`/
    /// `aligned_var_decl` node. Returns `None` for other tags.
    pub fn full_var_decl(&self, node: NodeIndex) -> Option<VarDecl> {
        let data = self.node_data(node);
        let (type_node, align_node, section_node) = match self.node_tag(node) {
            node::Tag::GlobalVarDecl => {
                let e: extra::GlobalVarDecl = self.extra(data.lhs);
                (e.type_node, e.align_node, e.section_node)
            }
            node::Tag::LocalVarDecl => {
                let e: extra::LocalVarDecl = self.extra(data.lhs);
                (e.type_node, e.align_node, 0)
            }
            node::Tag::SimpleVarDecl => (data.lhs, 0, 0),
            node::Tag::AlignedVarDecl => (0, data.lhs, 0),
            _ => return None,
        };
        let mut result = VarDecl {
            visib_token: None,
            extern_export_token: None,
            lib_name: None,
            threadlocal_token: None,
            comptime_token: None,
            mut_token: self.main_token(node),
            type_node,
            align_node,
            section_node,
            init_node: data.rhs,
        };
        let mut i = result.mut_token;
        while i > 0 {
            i -= 1;
            match self.token_tag(i) {
                TokenTag::KeywordExtern | TokenTag::KeywordExport => {
                    result.extern_export_token = Some(i)
                }
                TokenTag::StringLiteral => result.lib_name = Some(i),
                TokenTag::KeywordThreadlocal => result.threadlocal_token = Some(i),
                TokenTag::KeywordComptime => result.comptime_token = Some(i),
                TokenTag::KeywordPub => result.visib_token = Some(i),
                _ => break,
            }
        }
        Some(result)
    }

    pub fn full_if(&self, node: NodeIndex) -> Option<If> {
        let data = self.node_data(node);
        let (then_expr, else_expr) = match self.node_tag(node) {
            node::Tag::IfSimple => (data.rhs, 0),
            node::Tag::If => {
                let e: extra::If = self.extra(data.rhs);
                (e.then_expr, e.else_expr)
            }
            _ => return None,
        };
        let mut result = If {
            if_token: self.main_token(node),
            cond_expr: data.lhs,
            then_expr,
            else_expr,
            payload_token: None,
            error_token: None,
            else_token: None,
        };
        let last_cond_token = self.last_token(result.cond_expr);
        if self.token_tag(last_cond_token + 2) == TokenTag::Pipe {
            result.payload_token = Some(last_cond_token + 3);
        }
        if else_expr != 0 {
            let else_token = self.last_token(then_expr) + 1;
            result.else_token = Some(else_token);
            if self.token_tag(else_token + 1) == TokenTag::Pipe {
                result.error_token = Some(else_token + 2);
            }
        }
        Some(result)
    }

    pub fn full_while(&self, node: NodeIndex) -> Option<While> {
        let data = self.node_data(node);
        let (cont_expr, then_expr, else_expr) = match self.node_tag(node) {
            node::Tag::WhileSimple => (0, data.rhs, 0),
            node::Tag::WhileCont => {
                let e: extra::WhileCont = self.extra(data.rhs);
                (e.cont_expr, e.then_expr, 0)
            }
            node::Tag::While => {
                let e: extra::While = self.extra(data.rhs);
                (e.cont_expr, e.then_expr, e.else_expr)
            }
            _ => return None,
        };
        let mut result = While {
            while_token: self.main_token(node),
            cond_expr: data.lhs,
            cont_expr,
            then_expr,
            else_expr,
            label_token: None,
            inline_token: None,
            payload_token: None,
            error_token: None,
            else_token: None,
        };
        let mut tok_i = result.while_token;
        if tok_i > 0 && self.token_tag(tok_i - 1) == TokenTag::KeywordInline {
            result.inline_token = Some(tok_i - 1);
            tok_i -= 1;
        }
        if tok_i > 1
            && self.token_tag(tok_i - 1) == TokenTag::Colon
            && self.token_tag(tok_i - 2) == TokenTag::Identifier
        {
            result.label_token = Some(tok_i - 2);
        }
        let last_cond_token = self.last_token(result.cond_expr);
        if self.token_tag(last_cond_token + 2) == TokenTag::Pipe {
            result.payload_token = Some(last_cond_token + 3);
        }
        if else_expr != 0 {
            let else_token = self.last_token(then_expr) + 1;
            result.else_token = Some(else_token);
            if self.token_tag(else_token + 1) == TokenTag::Pipe {
                result.error_token = Some(else_token + 2);
            }
        }
        Some(result)
    }

    pub fn full_for(&self, node: NodeIndex) -> Option<For> {
        let data = self.node_data(node);
        let (then_expr, else_expr) = match self.node_tag(node) {
            node::Tag::ForSimple => (data.rhs, 0),
            node::Tag::For => {
                let e: extra::If = self.extra(data.rhs);
                (e.then_expr, e.else_expr)
            }
            _ => return None,
        };
        let mut result = For {
            for_token: self.main_token(node),
            input: data.lhs,
            then_expr,
            else_expr,
            label_token: None,
            inline_token: None,
            payload_token: self.last_token(data.lhs) + 3,
            else_token: None,
        };
        let mut tok_i = result.for_token;
        if tok_i > 0 && self.token_tag(tok_i - 1) == TokenTag::KeywordInline {
            result.inline_token = Some(tok_i - 1);
            tok_i -= 1;
        }
        if tok_i > 1
            && self.token_tag(tok_i - 1) == TokenTag::Colon
            && self.token_tag(tok_i - 2) == TokenTag::Identifier
        {
            result.label_token = Some(tok_i - 2);
        }
        if else_expr != 0 {
            result.else_token = Some(self.last_token(then_expr) + 1);
        }
        Some(result)
    }

    pub fn full_container_field(&self, node: NodeIndex) -> Option<ContainerField> {
        let data = self.node_data(node);
        let (type_expr, value_expr, align_expr) = match self.node_tag(node) {
            node::Tag::ContainerField => {
                let e: extra::ContainerField = self.extra(data.rhs);
                (data.lhs, e.value_expr, e.align_expr)
            }
            node::Tag::ContainerFieldInit => (data.lhs, data.rhs, 0),
            node::Tag::ContainerFieldAlign => (data.lhs, 0, data.rhs),
            _ => return None,
        };
        let name_token = self.main_token(node);
        let comptime_token = if name_token > 0
            && self.token_tag(name_token - 1) == TokenTag::KeywordComptime
        {
            Some(name_token - 1)
        } else {
            None
        };
        Some(ContainerField {
            comptime_token,
            name_token,
            type_expr,
            value_expr,
            align_expr,
        })
    }

    /// View any of the four prototype shapes. The buffer backs the params
    /// slice for the single-parameter shapes.
    pub fn full_fn_proto<'a>(
        &'a self,
        buffer: &'a mut [NodeIndex; 1],
        node: NodeIndex,
    ) -> Option<FnProto<'a>> {
        let data = self.node_data(node);
        let (params, align_expr, section_expr, callconv_expr): (&[NodeIndex], _, _, _) =
            match self.node_tag(node) {
                node::Tag::FnProtoSimple => {
                    buffer[0] = data.lhs;
                    let count = usize::from(data.lhs != 0);
                    (&buffer[..count], 0, 0, 0)
                }
                node::Tag::FnProtoMulti => {
                    let e: extra::SubRange = self.extra(data.lhs);
                    (self.extra_slice(e.start, e.end), 0, 0, 0)
                }
                node::Tag::FnProtoOne => {
                    let e: extra::FnProtoOne = self.extra(data.lhs);
                    buffer[0] = e.param;
                    let count = usize::from(e.param != 0);
                    (
                        &buffer[..count],
                        e.align_expr,
                        e.section_expr,
                        e.callconv_expr,
                    )
                }
                node::Tag::FnProto => {
                    let e: extra::FnProto = self.extra(data.lhs);
                    (
                        self.extra_slice(e.params_start, e.params_end),
                        e.align_expr,
                        e.section_expr,
                        e.callconv_expr,
                    )
                }
                _ => return None,
            };
        let fn_token = self.main_token(node);
        let name_token = if self.token_tag(fn_token + 1) == TokenTag::Identifier {
            Some(fn_token + 1)
        } else {
            None
        };
        let lparen = match name_token {
            Some(name) => name + 1,
            None => fn_token + 1,
        };
        let mut result = FnProto {
            visib_token: None,
            extern_export_inline_token: None,
            lib_name: None,
            name_token,
            fn_token,
            lparen,
            params,
            return_type: data.rhs,
            align_expr,
            section_expr,
            callconv_expr,
        };
        let mut i = fn_token;
        while i > 0 {
            i -= 1;
            match self.token_tag(i) {
                TokenTag::KeywordExtern | TokenTag::KeywordExport | TokenTag::KeywordInline => {
                    result.extern_export_inline_token = Some(i)
                }
                TokenTag::StringLiteral => result.lib_name = Some(i),
                TokenTag::KeywordPub => result.visib_token = Some(i),
                _ => break,
            }
        }
        Some(result)
    }

    pub fn full_struct_init<'a>(
        &'a self,
        buffer: &'a mut [NodeIndex; 2],
        node: NodeIndex,
    ) -> Option<StructInit<'a>> {
        let data = self.node_data(node);
        let (type_expr, fields): (NodeIndex, &[NodeIndex]) = match self.node_tag(node) {
            node::Tag::StructInitOne | node::Tag::StructInitOneComma => {
                buffer[0] = data.rhs;
                (data.lhs, &buffer[..usize::from(data.rhs != 0)])
            }
            node::Tag::StructInitDotTwo | node::Tag::StructInitDotTwoComma => {
                buffer[0] = data.lhs;
                buffer[1] = data.rhs;
                let count = if data.rhs != 0 {
                    2
                } else {
                    usize::from(data.lhs != 0)
                };
                (0, &buffer[..count])
            }
            node::Tag::StructInitDot | node::Tag::StructInitDotComma => {
                (0, self.extra_slice(data.lhs, data.rhs))
            }
            node::Tag::StructInit | node::Tag::StructInitComma => {
                let e: extra::SubRange = self.extra(data.rhs);
                (data.lhs, self.extra_slice(e.start, e.end))
            }
            _ => return None,
        };
        Some(StructInit {
            lbrace: self.main_token(node),
            type_expr,
            fields,
        })
    }

    pub fn full_array_init<'a>(
        &'a self,
        buffer: &'a mut [NodeIndex; 2],
        node: NodeIndex,
    ) -> Option<ArrayInit<'a>> {
        let data = self.node_data(node);
        let (type_expr, elements): (NodeIndex, &[NodeIndex]) = match self.node_tag(node) {
            node::Tag::ArrayInitOne | node::Tag::ArrayInitOneComma => {
                buffer[0] = data.rhs;
                (data.lhs, &buffer[..usize::from(data.rhs != 0)])
            }
            node::Tag::ArrayInitDotTwo | node::Tag::ArrayInitDotTwoComma => {
                buffer[0] = data.lhs;
                buffer[1] = data.rhs;
                let count = if data.rhs != 0 {
                    2
                } else {
                    usize::from(data.lhs != 0)
                };
                (0, &buffer[..count])
            }
            node::Tag::ArrayInitDot | node::Tag::ArrayInitDotComma => {
                (0, self.extra_slice(data.lhs, data.rhs))
            }
            node::Tag::ArrayInit | node::Tag::ArrayInitComma => {
                let e: extra::SubRange = self.extra(data.rhs);
                (data.lhs, self.extra_slice(e.start, e.end))
            }
            _ => return None,
        };
        Some(ArrayInit {
            lbrace: self.main_token(node),
            type_expr,
            elements,
        })
    }

    pub fn full_array_type(&self, node: NodeIndex) -> Option<ArrayType> {
        let data = self.node_data(node);
        match self.node_tag(node) {
            node::Tag::ArrayType => Some(ArrayType {
                lbracket: self.main_token(node),
                elem_count: data.lhs,
                sentinel: 0,
                elem_type: data.rhs,
            }),
            node::Tag::ArrayTypeSentinel => {
                let e: extra::ArrayTypeSentinel = self.extra(data.rhs);
                Some(ArrayType {
                    lbracket: self.main_token(node),
                    elem_count: data.lhs,
                    sentinel: e.sentinel,
                    elem_type: e.elem_type,
                })
            }
            _ => None,
        }
    }

    pub fn full_ptr_type(&self, node: NodeIndex) -> Option<PtrType> {
        let data = self.node_data(node);
        let (sentinel, align_node, bit_range_start, bit_range_end, child_type) =
            match self.node_tag(node) {
                node::Tag::PtrTypeAligned => (0, data.lhs, 0, 0, data.rhs),
                node::Tag::PtrTypeSentinel => (data.lhs, 0, 0, 0, data.rhs),
                node::Tag::PtrType => {
                    let e: extra::PtrType = self.extra(data.lhs);
                    (e.sentinel, e.align_node, 0, 0, data.rhs)
                }
                node::Tag::PtrTypeBitRange => {
                    let e: extra::PtrTypeBitRange = self.extra(data.lhs);
                    (
                        e.sentinel,
                        e.align_node,
                        e.bit_range_start,
                        e.bit_range_end,
                        data.rhs,
                    )
                }
                _ => return None,
            };
        let main_token = self.main_token(node);
        let size = match self.token_tag(main_token) {
            TokenTag::Asterisk | TokenTag::AsteriskAsterisk => {
                match self.token_tag(main_token + 1) {
                    TokenTag::RBracket | TokenTag::Colon => PtrSize::Many,
                    TokenTag::Identifier
                        if main_token > 0
                            && self.token_tag(main_token - 1) == TokenTag::LBracket =>
                    {
                        PtrSize::C
                    }
                    _ => PtrSize::One,
                }
            }
            TokenTag::LBracket => PtrSize::Slice,
            _ => unreachable!("pointer type with non-sigil main token"),
        };
        let mut result = PtrType {
            main_token,
            size,
            allowzero_token: None,
            const_token: None,
            volatile_token: None,
            align_node,
            sentinel,
            bit_range_start,
            bit_range_end,
            child_type,
        };
        // Qualifiers sit between the sigil and the child type; the align
        // clause's own tokens are skipped implicitly because the scan only
        // records keyword hits.
        let mut i = self.first_token(child_type);
        while i > main_token {
            i -= 1;
            match self.token_tag(i) {
                TokenTag::KeywordAllowzero => result.allowzero_token = Some(i),
                TokenTag::KeywordConst => result.const_token = Some(i),
                TokenTag::KeywordVolatile => result.volatile_token = Some(i),
                _ => {}
            }
        }
        Some(result)
    }

    pub fn full_slice(&self, node: NodeIndex) -> Option<Slice> {
        let data = self.node_data(node);
        let (start, end, sentinel) = match self.node_tag(node) {
            node::Tag::SliceOpen => (data.rhs, 0, 0),
            node::Tag::Slice => {
                let e: extra::Slice = self.extra(data.rhs);
                (e.start, e.end, 0)
            }
            node::Tag::SliceSentinel => {
                let e: extra::SliceSentinel = self.extra(data.rhs);
                (e.start, e.end, e.sentinel)
            }
            _ => return None,
        };
        Some(Slice {
            sliced: data.lhs,
            lbracket: self.main_token(node),
            start,
            end,
            sentinel,
        })
    }

    pub fn full_container_decl<'a>(
        &'a self,
        buffer: &'a mut [NodeIndex; 2],
        node: NodeIndex,
    ) -> Option<ContainerDecl<'a>> {
        let data = self.node_data(node);
        let main_token = self.main_token(node);
        let (arg, members, tagged): (NodeIndex, &[NodeIndex], bool) = match self.node_tag(node) {
            node::Tag::ContainerDecl | node::Tag::ContainerDeclTrailing => {
                (0, self.extra_slice(data.lhs, data.rhs), false)
            }
            node::Tag::ContainerDeclTwo | node::Tag::ContainerDeclTwoTrailing => {
                buffer[0] = data.lhs;
                buffer[1] = data.rhs;
                let count = if data.rhs != 0 {
                    2
                } else {
                    usize::from(data.lhs != 0)
                };
                (0, &buffer[..count], false)
            }
            node::Tag::ContainerDeclArg | node::Tag::ContainerDeclArgTrailing => {
                let e: extra::SubRange = self.extra(data.rhs);
                (data.lhs, self.extra_slice(e.start, e.end), false)
            }
            node::Tag::TaggedUnion | node::Tag::TaggedUnionTrailing => {
                (0, self.extra_slice(data.lhs, data.rhs), true)
            }
            node::Tag::TaggedUnionTwo | node::Tag::TaggedUnionTwoTrailing => {
                buffer[0] = data.lhs;
                buffer[1] = data.rhs;
                let count = if data.rhs != 0 {
                    2
                } else {
                    usize::from(data.lhs != 0)
                };
                (0, &buffer[..count], true)
            }
            node::Tag::TaggedUnionEnumTag | node::Tag::TaggedUnionEnumTagTrailing => {
                let e: extra::SubRange = self.extra(data.rhs);
                (data.lhs, self.extra_slice(e.start, e.end), true)
            }
            _ => return None,
        };
        let layout_token = if main_token > 0
            && matches!(
                self.token_tag(main_token - 1),
                TokenTag::KeywordPacked | TokenTag::KeywordExtern
            ) {
            Some(main_token - 1)
        } else {
            None
        };
        Some(ContainerDecl {
            main_token,
            layout_token,
            enum_token: if tagged { Some(main_token + 2) } else { None },
            arg,
            members,
        })
    }

    pub fn full_switch_case<'a>(
        &'a self,
        buffer: &'a mut [NodeIndex; 1],
        node: NodeIndex,
    ) -> Option<SwitchCase<'a>> {
        let data = self.node_data(node);
        let values: &[NodeIndex] = match self.node_tag(node) {
            node::Tag::SwitchCaseOne => {
                buffer[0] = data.lhs;
                &buffer[..usize::from(data.lhs != 0)]
            }
            node::Tag::SwitchCase => {
                let e: extra::SubRange = self.extra(data.lhs);
                self.extra_slice(e.start, e.end)
            }
            _ => return None,
        };
        let arrow_token = self.main_token(node);
        let payload_token = if self.token_tag(arrow_token + 1) == TokenTag::Pipe {
            Some(arrow_token + 2)
        } else {
            None
        };
        Some(SwitchCase {
            values,
            arrow_token,
            payload_token,
            target_expr: data.rhs,
        })
    }

    pub fn full_asm(&self, node: NodeIndex) -> Option<Asm<'_>> {
        let data = self.node_data(node);
        let (template, items, rparen): (NodeIndex, &[NodeIndex], TokenIndex) =
            match self.node_tag(node) {
                node::Tag::AsmSimple => (data.lhs, &[], data.rhs),
                node::Tag::Asm => {
                    let e: extra::Asm = self.extra(data.rhs);
                    (
                        data.lhs,
                        self.extra_slice(e.items_start, e.items_end),
                        e.rparen,
                    )
                }
                _ => return None,
            };
        let asm_token = self.main_token(node);
        let volatile_token = if self.token_tag(asm_token + 1) == TokenTag::KeywordVolatile {
            Some(asm_token + 1)
        } else {
            None
        };
        let outputs_end = items
            .iter()
            .take_while(|&&item| self.node_tag(item) == node::Tag::AsmOutput)
            .count();
        let outputs = &items[..outputs_end];
        let inputs = &items[outputs_end..];
        // Clobbers are bare tokens after the last colon; locate the first
        // one by walking forward from the last item (or the template).
        let mut first_clobber = None;
        if items.is_empty() {
            let template_token = self.last_token(template);
            if self.token_tag(template_token + 1) == TokenTag::Colon
                && self.token_tag(template_token + 2) == TokenTag::Colon
                && self.token_tag(template_token + 3) == TokenTag::Colon
                && self.token_tag(template_token + 4) == TokenTag::StringLiteral
            {
                first_clobber = Some(template_token + 4);
            }
        } else if !inputs.is_empty() {
            let last_input = inputs[inputs.len() - 1];
            let mut i = self.last_token(last_input) + 1;
            if self.token_tag(i) == TokenTag::Comma {
                i += 1;
            }
            if self.token_tag(i) == TokenTag::Colon
                && self.token_tag(i + 1) == TokenTag::StringLiteral
            {
                first_clobber = Some(i + 1);
            }
        } else {
            let last_output = outputs[outputs.len() - 1];
            let mut i = self.last_token(last_output) + 1;
            if self.token_tag(i) == TokenTag::Comma {
                i += 1;
            }
            if self.token_tag(i) == TokenTag::Colon
                && self.token_tag(i + 1) == TokenTag::Colon
                && self.token_tag(i + 2) == TokenTag::StringLiteral
            {
                first_clobber = Some(i + 2);
            }
        }
        Some(Asm {
            asm_token,
            volatile_token,
            template,
            items,
            outputs,
            inputs,
            first_clobber,
            rparen,
        })
    }

    pub fn full_call<'a>(
        &'a self,
        buffer: &'a mut [NodeIndex; 1],
        node: NodeIndex,
    ) -> Option<Call<'a>> {
        let data = self.node_data(node);
        let (params, is_async): (&[NodeIndex], bool) = match self.node_tag(node) {
            node::Tag::CallOne | node::Tag::CallOneComma => {
                buffer[0] = data.rhs;
                (&buffer[..usize::from(data.rhs != 0)], false)
            }
            node::Tag::AsyncCallOne | node::Tag::AsyncCallOneComma => {
                buffer[0] = data.rhs;
                (&buffer[..usize::from(data.rhs != 0)], true)
            }
            node::Tag::Call | node::Tag::CallComma => {
                let e: extra::SubRange = self.extra(data.rhs);
                (self.extra_slice(e.start, e.end), false)
            }
            node::Tag::AsyncCall | node::Tag::AsyncCallComma => {
                let e: extra::SubRange = self.extra(data.rhs);
                (self.extra_slice(e.start, e.end), true)
            }
            _ => return None,
        };
        let async_token = if is_async {
            Some(self.first_token(data.lhs) - 1)
        } else {
            None
        };
        Some(Call {
            async_token,
            lparen: self.main_token(node),
            fn_expr: data.lhs,
            params,
        })
    }
}
