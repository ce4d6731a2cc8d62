//! Parse diagnostics: positions and exact message text.

fn first_message(source: &str) -> String {
    let ast = silt::parse(source);
    assert!(
        !ast.errors.is_empty(),
        "expected parse errors for {:?}",
        source
    );
    ast.error_message(&ast.errors[0])
}

#[test]
fn missing_name_in_var_decl() {
    insta::assert_snapshot!(
        first_message("const = 1;\n"),
        @"expected 'an identifier', found '='"
    );
}

#[test]
fn chained_comparison() {
    insta::assert_snapshot!(
        first_message("const x = a < b < c;\n"),
        @"comparison operators cannot be chained"
    );
}

#[test]
fn double_ampersand() {
    insta::assert_snapshot!(
        first_message("const x = a && b;\n"),
        @"`&&` is invalid; note that `and` is boolean AND"
    );
}

#[test]
fn extra_const_qualifier() {
    insta::assert_snapshot!(
        first_message("const p: *const const u8 = undefined;\n"),
        @"extra const qualifier"
    );
}

#[test]
fn missing_expression_after_operator() {
    insta::assert_snapshot!(
        first_message("fn f() void {\n    x = 1 +;\n}\n"),
        @"expected expression, found ';'"
    );
}

#[test]
fn junk_at_container_level() {
    insta::assert_snapshot!(
        first_message("1 + 2;\n"),
        @"expected test, comptime, var decl, or container field, found 'a number literal'"
    );
}

#[test]
fn missing_loop_payload() {
    insta::assert_snapshot!(
        first_message("fn f() void {\n    for (items) use(1);\n}\n"),
        @"expected loop payload, found 'an identifier'"
    );
}

#[test]
fn declarations_between_fields() {
    insta::assert_snapshot!(
        first_message("const S = struct {\n    a: u32,\n    const c = 1;\n    b: u32,\n};\n"),
        @"declarations are not allowed between container fields"
    );
}

#[test]
fn extern_function_with_body() {
    insta::assert_snapshot!(
        first_message("extern fn f() void {}\n"),
        @"extern functions have no body"
    );
}

#[test]
fn error_positions_are_one_based_in_api_output() {
    let ast = silt::parse("const a = 1;\nconst = 2;\n");
    let messages = silt::api::error_messages(&ast);
    assert_eq!(messages.len(), 1);
    assert!(
        messages[0].starts_with("2:7:"),
        "unexpected position in {:?}",
        messages[0]
    );
}

#[test]
fn render_refuses_trees_with_errors() {
    let ast = silt::parse("const = ;\n");
    assert!(!ast.errors.is_empty());
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| ast.render()));
    assert!(result.is_err(), "render must refuse trees with errors");
}
