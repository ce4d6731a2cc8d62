//! Full views: denormalized node projections read back the right fields.

use silt::ast::node::Tag;

fn parsed(source: &str) -> silt::Ast {
    let ast = silt::parse(source);
    assert!(
        ast.errors.is_empty(),
        "parse errors in {:?}: {:?}",
        source,
        silt::api::error_messages(&ast)
    );
    ast
}

fn find_node(ast: &silt::Ast, want: &[Tag]) -> u32 {
    (0..ast.node_count() as u32)
        .find(|&n| want.contains(&ast.node_tag(n)))
        .expect("node not found")
}

#[test]
fn var_decl_view_exposes_modifier_tokens() {
    let ast = parsed("pub extern \"c\" threadlocal var x: u8 align(4) linksection(\".d\") = 0;\n");
    let decl = ast.root_decls()[0];
    let view = ast.full_var_decl(decl).unwrap();
    assert_eq!(ast.token_slice(view.visib_token.unwrap()), "pub");
    assert_eq!(ast.token_slice(view.extern_export_token.unwrap()), "extern");
    assert_eq!(ast.token_slice(view.lib_name.unwrap()), "\"c\"");
    assert_eq!(ast.token_slice(view.threadlocal_token.unwrap()), "threadlocal");
    assert_eq!(view.comptime_token, None);
    assert_eq!(ast.token_slice(view.mut_token), "var");
    assert_ne!(view.type_node, 0);
    assert_ne!(view.align_node, 0);
    assert_ne!(view.section_node, 0);
    assert_ne!(view.init_node, 0);
}

#[test]
fn if_view_finds_payload_and_error_tokens() {
    let ast = parsed("fn f() void {\n    if (get()) |value| use(value) else |err| handle(err);\n}\n");
    let n = find_node(&ast, &[Tag::If]);
    let view = ast.full_if(n).unwrap();
    assert_eq!(ast.token_slice(view.payload_token.unwrap()), "value");
    assert_eq!(ast.token_slice(view.error_token.unwrap()), "err");
    assert_eq!(ast.token_slice(view.else_token.unwrap()), "else");
    assert_ne!(view.else_expr, 0);
}

#[test]
fn while_view_collects_label_inline_and_continue() {
    let ast = parsed("fn f() void {\n    lbl: inline while (c) |v| : (step()) body();\n}\n");
    let n = find_node(&ast, &[Tag::WhileCont]);
    let view = ast.full_while(n).unwrap();
    assert_eq!(ast.token_slice(view.label_token.unwrap()), "lbl");
    assert_eq!(ast.token_slice(view.inline_token.unwrap()), "inline");
    assert_eq!(ast.token_slice(view.payload_token.unwrap()), "v");
    assert_ne!(view.cont_expr, 0);
    assert_eq!(view.else_expr, 0);
}

#[test]
fn for_view_points_at_first_capture() {
    let ast = parsed("fn f() void {\n    for (xs) |x, i| use(x, i);\n}\n");
    let n = find_node(&ast, &[Tag::ForSimple]);
    let view = ast.full_for(n).unwrap();
    assert_eq!(ast.token_slice(view.payload_token), "x");
    assert_eq!(view.else_token, None);
}

#[test]
fn fn_proto_view_iterates_parameters_in_order() {
    let ast = parsed("fn f(comptime T: type, n: usize, anytype) void {}\n");
    let decl = ast.root_decls()[0];
    let proto = ast.node_data(decl).lhs;
    let mut buffer = [0];
    let view = ast.full_fn_proto(&mut buffer, proto).unwrap();
    assert_eq!(ast.token_slice(view.name_token.unwrap()), "f");
    let params: Vec<_> = view.iterate(&ast).collect();
    assert_eq!(params.len(), 3);
    assert_eq!(ast.token_slice(params[0].comptime_noalias.unwrap()), "comptime");
    assert_eq!(ast.token_slice(params[0].name_token.unwrap()), "T");
    assert_eq!(ast.token_slice(params[1].name_token.unwrap()), "n");
    assert!(params[1].anytype_ellipsis3.is_none());
    assert_eq!(
        ast.token_slice(params[2].anytype_ellipsis3.unwrap()),
        "anytype"
    );
}

#[test]
fn ptr_type_view_reads_qualifiers_and_sentinel() {
    let ast = parsed("const p: [*:0]allowzero align(8) const volatile u8 = undefined;\n");
    let n = find_node(&ast, &[Tag::PtrType]);
    let view = ast.full_ptr_type(n).unwrap();
    assert_eq!(view.size, silt::ast::full::PtrSize::Many);
    assert_ne!(view.sentinel, 0);
    assert_ne!(view.align_node, 0);
    assert!(view.allowzero_token.is_some());
    assert!(view.const_token.is_some());
    assert!(view.volatile_token.is_some());
}

#[test]
fn slice_view_distinguishes_arities() {
    let ast = parsed("const a = xs[1..];\nconst b = xs[1..2];\nconst c = xs[1..2 :0];\n");
    let open = find_node(&ast, &[Tag::SliceOpen]);
    let bounded = find_node(&ast, &[Tag::Slice]);
    let sentineled = find_node(&ast, &[Tag::SliceSentinel]);
    let open_view = ast.full_slice(open).unwrap();
    assert_eq!(open_view.end, 0);
    assert_eq!(open_view.sentinel, 0);
    let bounded_view = ast.full_slice(bounded).unwrap();
    assert_ne!(bounded_view.end, 0);
    assert_eq!(bounded_view.sentinel, 0);
    let sentineled_view = ast.full_slice(sentineled).unwrap();
    assert_ne!(sentineled_view.sentinel, 0);
}

#[test]
fn container_decl_view_reports_tagged_union_shape() {
    let ast = parsed("const U = packed union(enum(u8)) {\n    a: u32,\n    b: void,\n};\n");
    let n = find_node(&ast, &[Tag::TaggedUnionEnumTag, Tag::TaggedUnionEnumTagTrailing]);
    let mut buffer = [0, 0];
    let view = ast.full_container_decl(&mut buffer, n).unwrap();
    assert_eq!(ast.token_slice(view.layout_token.unwrap()), "packed");
    assert_eq!(ast.token_slice(view.enum_token.unwrap()), "enum");
    assert_ne!(view.arg, 0);
    assert_eq!(view.members.len(), 2);
}

#[test]
fn switch_case_view_separates_values_and_payload() {
    let ast = parsed(
        "fn f(x: u8) u8 {\n    return switch (x) {\n        1, 2 => |v| v,\n        else => 0,\n    };\n}\n",
    );
    let n = find_node(&ast, &[Tag::SwitchCase]);
    let mut buffer = [0];
    let view = ast.full_switch_case(&mut buffer, n).unwrap();
    assert_eq!(view.values.len(), 2);
    assert_eq!(ast.token_slice(view.payload_token.unwrap()), "v");
    assert_ne!(view.target_expr, 0);
}

#[test]
fn asm_view_splits_outputs_inputs_and_clobbers() {
    let ast = parsed(
        "fn f(n: usize) usize {\n    return asm volatile (\"syscall\"\n        : [ret] \"={rax}\" (-> usize)\n        : [number] \"{rax}\" (n)\n        : \"rcx\", \"r11\"\n    );\n}\n",
    );
    let n = find_node(&ast, &[Tag::Asm]);
    let view = ast.full_asm(n).unwrap();
    assert!(view.volatile_token.is_some());
    assert_eq!(view.outputs.len(), 1);
    assert_eq!(view.inputs.len(), 1);
    assert_eq!(ast.token_slice(view.first_clobber.unwrap()), "\"rcx\"");
    assert_eq!(ast.token_slice(view.rparen), ")");
}

#[test]
fn clobber_only_asm_view() {
    let ast = parsed("fn f() void {\n    asm volatile (\"nop\" ::: \"memory\");\n}\n");
    let n = find_node(&ast, &[Tag::Asm]);
    let view = ast.full_asm(n).unwrap();
    assert!(view.items.is_empty());
    assert_eq!(ast.token_slice(view.first_clobber.unwrap()), "\"memory\"");
}

#[test]
fn call_view_marks_async_calls() {
    let ast = parsed("fn f() void {\n    _ = async worker(q);\n}\n");
    let n = find_node(&ast, &[Tag::AsyncCallOne]);
    let mut buffer = [0];
    let view = ast.full_call(&mut buffer, n).unwrap();
    assert_eq!(ast.token_slice(view.async_token.unwrap()), "async");
    assert_eq!(view.params.len(), 1);
}

#[test]
fn views_return_none_for_foreign_tags() {
    let ast = parsed("const a = 1;\n");
    let decl = ast.root_decls()[0];
    assert!(ast.full_if(decl).is_none());
    assert!(ast.full_while(decl).is_none());
    assert!(ast.full_asm(decl).is_none());
    let mut buffer = [0];
    assert!(ast.full_call(&mut buffer, decl).is_none());
}
