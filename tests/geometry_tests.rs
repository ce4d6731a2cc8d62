//! Token-geometry invariants, checked over every node of parsed sources.

static SOURCES: &[&str] = &[
    "const a = 1;\nconst b = foo(2, 3);\n",
    "pub extern \"c\" threadlocal var x: u8 align(4) linksection(\".data\") = 0;\n",
    "fn f(a: u8, b: *const u8) callconv(.C) !u8 {\n    if (a > 0) return a;\n    return b.*;\n}\n",
    "const S = struct {\n    a: u32 = 1,\n    b: ?*S = null,\n\n    fn method(self: *S) void {\n        self.a += 1;\n    }\n};\n",
    "fn loops() void {\n    outer: while (a) |v| : (v += 1) {\n        for (items) |item, i| {\n            if (item == 0) continue :outer;\n        }\n    } else done();\n}\n",
    "fn s(x: u8) u8 {\n    return switch (x) {\n        0 => 1,\n        1, 2 => 3,\n        3...9 => 4,\n        else => 0,\n    };\n}\n",
    "fn a() void {\n    asm volatile (\"syscall\"\n        : [ret] \"={rax}\" (-> usize)\n        : [number] \"{rax}\" (n)\n        : \"rcx\", \"r11\"\n    );\n}\n",
    "const E = error{ OutOfMemory, InvalidInput };\nconst R = E!void;\n",
    "const slice = items[1..2 :0];\nconst open = items[1..];\n",
    "const v: [4:0]u8 = undefined;\nconst p: *align(8) const u8 = undefined;\n",
];

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

#[test]
fn anchor_lies_within_span() {
    for source in SOURCES {
        let ast = parsed(source);
        for n in 0..ast.node_count() as u32 {
            let first = ast.first_token(n);
            let last = ast.last_token(n);
            let main = ast.main_token(n);
            assert!(first <= main && main <= last, "node {} in {:?}", n, source);
        }
    }
}

#[test]
fn root_decl_spans_are_ordered_and_disjoint() {
    for source in SOURCES {
        let ast = parsed(source);
        let decls = ast.root_decls();
        for pair in decls.windows(2) {
            let last_of_first = ast.last_token(pair[0]);
            let first_of_second = ast.first_token(pair[1]);
            assert!(
                last_of_first < first_of_second,
                "overlapping sibling spans in {:?}",
                source
            );
        }
    }
}

#[test]
fn spans_cover_whole_declarations() {
    // Reconstructing the source text from a declaration's token span must
    // land exactly on token boundaries.
    for source in SOURCES {
        let ast = parsed(source);
        for &decl in ast.root_decls() {
            let first = ast.first_token(decl);
            let last = ast.last_token(decl);
            let start = ast.token_start(first) as usize;
            let end = ast.token_start(last) as usize + ast.token_slice(last).len();
            let text = &source[start..end];
            assert!(!text.starts_with(char::is_whitespace), "span {:?}", text);
            assert!(!text.ends_with(char::is_whitespace), "span {:?}", text);
        }
    }
}

#[test]
fn call_children_nest_within_call_span() {
    let ast = parsed("const x = foo(bar(1), baz);\n");
    for n in 0..ast.node_count() as u32 {
        let mut buffer = [0];
        let Some(call) = ast.full_call(&mut buffer, n) else {
            continue;
        };
        let first = ast.first_token(n);
        let last = ast.last_token(n);
        let fn_first = ast.first_token(call.fn_expr);
        assert!(first <= fn_first);
        for &param in call.params {
            assert!(ast.first_token(param) > fn_first);
            assert!(ast.last_token(param) < last);
        }
    }
}

#[test]
fn while_parts_nest_within_loop_span() {
    let ast = parsed("fn f() void {\n    lbl: while (a) |v| : (v += 1) body() else |e| other();\n}\n");
    let mut seen = false;
    for n in 0..ast.node_count() as u32 {
        let Some(w) = ast.full_while(n) else { continue };
        seen = true;
        let first = ast.first_token(n);
        let last = ast.last_token(n);
        assert_eq!(ast.token_slice(first), "lbl");
        assert!(ast.first_token(w.cond_expr) > first);
        assert!(ast.last_token(w.cont_expr) < ast.first_token(w.then_expr));
        assert!(ast.last_token(w.then_expr) < ast.first_token(w.else_expr));
        assert!(ast.last_token(w.else_expr) == last);
    }
    assert!(seen, "no while node found");
}

#[test]
fn statement_spans_exclude_semicolons() {
    let ast = parsed("fn f() void {\n    foo();\n    bar();\n}\n");
    for n in 0..ast.node_count() as u32 {
        let last = ast.last_token(n);
        assert_ne!(ast.token_slice(last), ";", "node {} ends on a semicolon", n);
    }
}

#[test]
fn fn_proto_last_token_covers_latest_clause() {
    // The clauses can appear in any order; last_token must find the one
    // that starts latest and include its closing paren.
    for source in [
        "fn f(a: u8) align(4) linksection(\".t\") callconv(.C) u8;\n",
        "fn f(a: u8) callconv(.C) linksection(\".t\") align(4) u8;\n",
    ] {
        let ast = parsed(source);
        let decl = ast.root_decls()[0];
        let last = ast.last_token(decl);
        // Last token of the prototype is the return type.
        assert_eq!(ast.token_slice(last), "u8", "in {:?}", source);
        // And the token before the final `;` closes the last clause.
        let semi = last + 1;
        assert_eq!(ast.token_slice(semi), ";");
    }
}

#[test]
fn shared_double_asterisk_token_is_both_pointers_anchor() {
    let ast = parsed("var x: **u8 = undefined;\n");
    let mut anchors = Vec::new();
    for n in 0..ast.node_count() as u32 {
        if ast.full_ptr_type(n).is_some() {
            anchors.push(ast.main_token(n));
        }
    }
    assert_eq!(anchors.len(), 2);
    assert_eq!(anchors[0], anchors[1], "`**` token must be shared");
}

#[test]
fn labeled_block_span_includes_label() {
    let ast = parsed("fn f() void {\n    const v = blk: {\n        break :blk 1;\n    };\n    use(v);\n}\n");
    let mut found = false;
    for n in 0..ast.node_count() as u32 {
        use silt::ast::node::Tag;
        match ast.node_tag(n) {
            Tag::BlockTwo | Tag::BlockTwoSemicolon | Tag::Block | Tag::BlockSemicolon => {
                let first = ast.first_token(n);
                if ast.token_slice(first) == "blk" {
                    found = true;
                }
            }
            _ => {}
        }
    }
    assert!(found, "labeled block should start at its label token");
}
