//! Format-preservation properties over a seed corpus.
//!
//! The formatter contract is that formatting is idempotent: for any source
//! that parses cleanly, `render(parse(render(parse(s))))` is byte-equal to
//! `render(parse(s))`, and the second pass reports no errors.

use proptest::prelude::*;

static SEEDS: &[&str] = &[
    "const a=1;",
    "const a = 1;\n\nconst b = 2;\n",
    "var x:**u8;",
    "var p: [*:0]const u8 = undefined;\n",
    "pub extern \"c\" fn write(fd:i32,buf:[*]const u8,count:usize)isize;",
    "fn a()void{return;}",
    "fn f() void {\n    foo(a,b,);\n}\n",
    "fn f() void {\n    foo(a,b);\n}\n",
    "fn max(a:u32,b:u32)u32{if(a>b)return a;return b;}",
    "fn f() void {\n    blk: while(a)|v|:(v+=1) body else |e| fail;\n}\n",
    "fn f() void {\n    for (items) |item, i| use(item, i);\n}\n",
    "const S=struct{a:u32,b:u32,};",
    "const S=struct{a:u32,b:u32};",
    "const U=union(enum){a:u32,b:void,};",
    "const C=enum(u8){a,b,};",
    "const E=error{A,B};",
    "const opt: ?u8 = null;\n",
    "const r = a orelse b catch |err| c;\n",
    "fn f() u8 {\n    return switch (x) {\n        1, 2 => a,\n        3...9 => b,\n        else => c,\n    };\n}\n",
    "fn f() void {\n    asm volatile (\"nop\" ::: \"memory\");\n}\n",
    "fn f() void {\n    defer close();\n    errdefer |e| log(e);\n    suspend;\n    resume frame;\n}\n",
    "fn f() void {\n    _=async g(x);\n    const v=await handle;\n}\n",
    "const a = 1; // trailing comment\nconst b = 2;\n",
    "// leading comment\nconst a = 1;\n",
    "//! module doc\n\n/// item doc\nconst a = 1;\n",
    "const s =\n    \\\\first line\n    \\\\second line\n;\n",
    "const slice = items[start..end :0];\n",
    "const part = items[1..];\n",
    "test \"arithmetic\" {\n    try expect(1 + 2 == 3);\n}\n",
    "usingnamespace other;\n",
    "comptime {\n    checkLayout();\n}\n",
];

fn render_once(source: &str) -> Option<String> {
    let ast = silt::parse(source);
    if !ast.errors.is_empty() {
        return None;
    }
    Some(ast.render())
}

proptest! {
    #[test]
    fn render_is_idempotent(source in proptest::sample::select(SEEDS)) {
        let first = render_once(source).expect("seed does not parse");
        let reparsed = silt::parse(&first);
        prop_assert!(
            reparsed.errors.is_empty(),
            "rendered output fails to reparse: {:?}",
            first
        );
        let second = reparsed.render();
        prop_assert_eq!(&first, &second);
    }

    #[test]
    fn rendered_output_is_newline_terminated(source in proptest::sample::select(SEEDS)) {
        let rendered = render_once(source).expect("seed does not parse");
        prop_assert!(rendered.is_empty() || rendered.ends_with('\n'));
    }

    #[test]
    fn comments_survive_formatting(source in proptest::sample::select(SEEDS)) {
        let rendered = render_once(source).expect("seed does not parse");
        let count_in = source.matches("//").count();
        let count_out = rendered.matches("//").count();
        prop_assert_eq!(count_in, count_out);
    }

    #[test]
    fn no_double_blank_lines(source in proptest::sample::select(SEEDS)) {
        let rendered = render_once(source).expect("seed does not parse");
        prop_assert!(!rendered.contains("\n\n\n"));
    }
}
