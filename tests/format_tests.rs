//! End-to-end formatting scenarios: literal input, exact expected output.

use rstest::rstest;

fn format(source: &str) -> String {
    let ast = silt::parse(source);
    assert!(
        ast.errors.is_empty(),
        "unexpected parse errors for {:?}: {:?}",
        source,
        silt::api::error_messages(&ast)
    );
    ast.render()
}

#[rstest]
// Trivial function.
#[case("fn a()void{return;}", "fn a() void {\n    return;\n}\n")]
// Spacing of declarations.
#[case("const a=1;", "const a = 1;\n")]
#[case("var x:**u8;", "var x: **u8;\n")]
#[case("var p: [*:0]const u8 = undefined;\n", "var p: [*:0]const u8 = undefined;\n")]
// Anonymous init lists: trailing comma drives the layout.
#[case("const a=.{1};", "const a = .{1};\n")]
#[case("const a=.{1,2};", "const a = .{ 1, 2 };\n")]
#[case("const a=.{1,2,};", "const a = .{\n    1,\n    2,\n};\n")]
// Struct init.
#[case(
    "const p=Point{.x=1,.y=2};",
    "const p = Point{ .x = 1, .y = 2 };\n"
)]
#[case(
    "const p=Point{.x=1,.y=2,};",
    "const p = Point{\n    .x = 1,\n    .y = 2,\n};\n"
)]
// Error sets.
#[case("const E=error{A};", "const E = error{A};\n")]
#[case("const E=error{A,B};", "const E = error{ A, B };\n")]
#[case(
    "const E=error{A,B,};",
    "const E = error{\n    A,\n    B,\n};\n"
)]
// Containers.
#[case(
    "const S=struct{a:u32,b:u32};",
    "const S = struct { a: u32, b: u32 };\n"
)]
#[case(
    "const S=struct{a:u32,b:u32,};",
    "const S = struct {\n    a: u32,\n    b: u32,\n};\n"
)]
#[case("const S=struct{};", "const S = struct {};\n")]
#[case(
    "const U=union(enum){a:u32,b:void,};",
    "const U = union(enum) {\n    a: u32,\n    b: void,\n};\n"
)]
#[case(
    "const C=enum(u8){a,b,};",
    "const C = enum(u8) {\n    a,\n    b,\n};\n"
)]
fn canonical_declarations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(format(input), expected);
}

#[rstest]
// Trailing comma selects the multiline call layout.
#[case(
    "fn f() void {\n    foo(a,b,);\n}\n",
    "fn f() void {\n    foo(\n        a,\n        b,\n    );\n}\n"
)]
// No trailing comma selects the single-line layout.
#[case(
    "fn f() void {\n    foo(a,b);\n}\n",
    "fn f() void {\n    foo(a, b);\n}\n"
)]
// Labeled while with continue expression, payload, and error capture.
#[case(
    "fn f() void {\n    blk: while(a)|v|:(v+=1) body else |e| fail;\n}\n",
    "fn f() void {\n    blk: while (a) |v| : (v += 1) body else |e| fail;\n}\n"
)]
// If/else on one line.
#[case(
    "fn f() void {\n    if (a) b() else c();\n}\n",
    "fn f() void {\n    if (a) b() else c();\n}\n"
)]
// Defer and errdefer payloads.
#[case(
    "fn f() void {\n    defer close();\n    errdefer |e| log(e);\n}\n",
    "fn f() void {\n    defer close();\n    errdefer |e| log(e);\n}\n"
)]
// Clobber-only assembly.
#[case(
    "fn f() void {\n    asm volatile (\"nop\" ::: \"memory\");\n}\n",
    "fn f() void {\n    asm volatile (\"nop\" ::: \"memory\");\n}\n"
)]
// For loop with index capture.
#[case(
    "fn f() void {\n    for (items) |item, i| use(item, i);\n}\n",
    "fn f() void {\n    for (items) |item, i| use(item, i);\n}\n"
)]
// Switch statements keep one case per line with a trailing comma.
#[case(
    "fn f() u8 {\n    return switch (x) {\n        1 => a,\n        else => b,\n    };\n}\n",
    "fn f() u8 {\n    return switch (x) {\n        1 => a,\n        else => b,\n    };\n}\n"
)]
fn canonical_statements(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(format(input), expected);
}

#[test]
fn blank_line_between_top_level_items_is_preserved() {
    assert_eq!(
        format("const a=1;\n\n\nconst b=2;\n"),
        "const a = 1;\n\nconst b = 2;\n"
    );
}

#[test]
fn single_newline_between_items_stays_single() {
    assert_eq!(
        format("const a=1;\nconst b=2;\n"),
        "const a = 1;\nconst b = 2;\n"
    );
}

#[test]
fn trailing_comment_survives() {
    assert_eq!(
        format("const a = 1; // one\nconst b = 2;\n"),
        "const a = 1; // one\nconst b = 2;\n"
    );
}

#[test]
fn standalone_comment_line_survives() {
    assert_eq!(
        format("const a = 1;\n// note\nconst b = 2;\n"),
        "const a = 1;\n// note\nconst b = 2;\n"
    );
}

#[test]
fn doc_comments_stay_attached() {
    assert_eq!(
        format("/// docs\nconst a = 1;\n"),
        "/// docs\nconst a = 1;\n"
    );
}

#[test]
fn container_doc_comment_keeps_following_blank_line() {
    assert_eq!(
        format("//! module docs\n\nconst a = 1;\n"),
        "//! module docs\n\nconst a = 1;\n"
    );
}

#[test]
fn multiline_string_keeps_verbatim_lines() {
    assert_eq!(
        format("const s =\n    \\\\hello\n;\n"),
        "const s =\n    \\\\hello\n;\n"
    );
}

#[test]
fn function_modifiers_are_kept_in_order() {
    assert_eq!(
        format("pub extern \"c\" fn write(fd:i32)isize;"),
        "pub extern \"c\" fn write(fd: i32) isize;\n"
    );
}

#[test]
fn fn_clauses_render_after_params() {
    assert_eq!(
        format("fn f(a:u8)align(4)linksection(\".text\")callconv(.C)u8{return a;}"),
        "fn f(a: u8) align(4) linksection(\".text\") callconv(.C) u8 {\n    return a;\n}\n"
    );
}

#[test]
fn trailing_comma_in_fn_params_goes_multiline() {
    assert_eq!(
        format("fn f(a:u8,b:u8,)void{}"),
        "fn f(\n    a: u8,\n    b: u8,\n) void {}\n"
    );
}

#[test]
fn async_call_keeps_keyword() {
    assert_eq!(
        format("fn f() void {\n    _=async g(x);\n}\n"),
        "fn f() void {\n    _ = async g(x);\n}\n"
    );
}

#[test]
fn coroutine_statements_roundtrip() {
    assert_eq!(
        format("fn f() void {\n    suspend;\n    resume frame;\n    const v=await handle;\n}\n"),
        "fn f() void {\n    suspend;\n    resume frame;\n    const v = await handle;\n}\n"
    );
}

#[test]
fn empty_source_renders_empty() {
    assert_eq!(format(""), "");
}
