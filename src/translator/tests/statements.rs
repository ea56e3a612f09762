use super::*;

#[test]
fn declare_assign_print() {
    let out = translate_source(
        "Program test Main [
            declare x real;
            let x = 1;
            print x;
        ]",
    );
    assert!(out.contains("pub mod test {"));
    assert!(out.contains("pub struct Main;"));
    assert!(out.contains(&body_line(&constant("CONST0", "RealValue", "1.0"))));
    assert!(out.contains(&body_line(&declared("x", "RealValue"))));
    assert!(out.contains(&body_line("x = CONST0.clone();")));
    assert!(out.contains(&body_line("print!(\"{}\", x.observe(&__rt));")));
    assert!(out.contains("test::Main::main()"));

    let constant = out.find("let CONST0").unwrap();
    let declaration = out.find("let mut x").unwrap();
    let assignment = out.find("x = CONST0").unwrap();
    let print = out.find("print!").unwrap();
    assert!(constant < declaration);
    assert!(declaration < assignment);
    assert!(assignment < print);
}

#[test]
fn declarations_map_datatypes() {
    let out = translate_body("declare c char; declare s STRING; declare r Real;");
    assert!(out.contains(&body_line(&declared("c", "CharValue"))));
    assert!(out.contains(&body_line(&declared("s", "StringValue"))));
    assert!(out.contains(&body_line(&declared("r", "RealValue"))));
}

#[test]
fn compound_assignments_call_mutating_methods() {
    let cases = [
        ("+=", "add_and_mutate"),
        ("-=", "sub_and_mutate"),
        ("*=", "mul_and_mutate"),
        ("/=", "div_and_mutate"),
        ("%=", "rem_and_mutate"),
        ("&=", "and_and_mutate"),
        ("|=", "or_and_mutate"),
        ("^=", "xor_and_mutate"),
        ("<<=", "shl_and_mutate"),
        (">>=", "shr_and_mutate"),
    ];
    for (symbol, method) in cases {
        let out = translate_body(&format!("declare x real; let x {symbol} 2;"));
        let expected = format!("x = x.{method}(&CONST0, &__rt);");
        assert!(out.contains(&body_line(&expected)), "{symbol}: {out}");
    }
}

#[test]
fn assigning_an_expression_takes_the_temporary() {
    let out = translate_body("declare x real; let x = x + 1;");
    assert!(out.contains(&body_line("x = x.add_and_mutate(&CONST0, &__rt);")));
}

#[test]
fn assigning_a_variable_copies_it() {
    let out = translate_body("declare x real; declare y real; let x = y;");
    assert!(out.contains(&body_line("x = y.clone();")));
}

#[test]
fn if_nests_its_body() {
    let out = translate_body("declare x real; if x < 3 [ print x; ]");
    assert!(out.contains(
        "\n            if x.lt_and_mutate(&CONST0, &__rt) {\n\
         \x20               print!(\"{}\", x.observe(&__rt));\n\
         \x20           }\n"
    ));
}

#[test]
fn while_nests_its_body() {
    let out = translate_body("declare i real; while i <= 10 [ let i += 1; ]");
    assert!(out.contains(
        "\n            while i.le_and_mutate(&CONST0, &__rt) {\n\
         \x20               i = i.add_and_mutate(&CONST1, &__rt);\n\
         \x20           }\n"
    ));
}

#[test]
fn nested_blocks_indent_further() {
    let out = translate_body("declare i real; while i < 3 [ if i > 1 [ print i; ] ]");
    assert!(out.contains("\n                    print!(\"{}\", i.observe(&__rt));\n"));
}

#[test]
fn declaration_and_assignment_names_fold_to_lower_case() {
    let out = translate_body("declare Counter real; let COUNTER = 1; print Counter;");
    assert!(out.contains(&body_line(&declared("counter", "RealValue"))));
    assert!(out.contains(&body_line("counter = CONST0.clone();")));
    // reads keep the source spelling
    assert!(out.contains(&body_line("print!(\"{}\", Counter.observe(&__rt));")));
}

#[test]
fn rust_keywords_are_escaped() {
    let out = translate_body("declare match real; let match = 2; print match;");
    assert!(out.contains(&body_line(&declared("r#match", "RealValue"))));
    assert!(out.contains(&body_line("r#match = CONST0.clone();")));
    assert!(out.contains(&body_line("print!(\"{}\", r#match.observe(&__rt));")));
}

#[test]
fn empty_statements_emit_nothing() {
    let empty = translate_body("");
    let semicolons = translate_body("; ; ;");
    assert_eq!(empty, semicolons);
}
