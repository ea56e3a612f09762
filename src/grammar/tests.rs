use super::parse;
use crate::tree::{Keyword, Node, NodeKind, Operator, TokenValue};

fn statements(source: &str) -> Vec<Node> {
    let tree = parse(source).expect("parse failed");
    let decl = &tree.root.children[0];
    assert_eq!(decl.kind, NodeKind::ProgramDeclaration);
    let list = &decl.children[3];
    assert_eq!(list.kind, NodeKind::StatementList);
    list.children.iter().map(|s| s.children[0].clone()).collect()
}

fn wrap(body: &str) -> String {
    format!("Program test Main [ {body} ]")
}

fn operator_of(node: &Node) -> Operator {
    match node.token.as_ref().map(|t| &t.value) {
        Some(TokenValue::Operator(op)) => *op,
        other => panic!("expected an operator token, got {:?}", other),
    }
}

#[test]
fn program_declaration_shape() {
    let tree = parse("Program test Main [ ]").unwrap();
    assert_eq!(tree.root.kind, NodeKind::Program);
    let decl = &tree.root.children[0];
    let kinds: Vec<NodeKind> = decl.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Keyword,
            NodeKind::NamespaceId,
            NodeKind::ProgramId,
            NodeKind::StatementList
        ]
    );
    assert_eq!(decl.children[1].text(), Some("test"));
    assert_eq!(decl.children[2].text(), Some("Main"));
}

#[test]
fn keywords_are_case_insensitive() {
    let stmts = statements("pRoGrAm test Main [ DECLARE x REAL; Print x; ]")
        .into_iter()
        .map(|s| s.kind)
        .collect::<Vec<_>>();
    assert_eq!(
        stmts,
        vec![NodeKind::LocalVariableDeclaration, NodeKind::PrintStatement]
    );
}

#[test]
fn every_statement_form_parses() {
    let source = wrap(
        "; print 1; if x < 2 [ ; ] while x > 0 [ let x -= 1; ] declare s string; let s = \"hi\";",
    );
    let kinds: Vec<NodeKind> = statements(&source).iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::EmptyStatement,
            NodeKind::PrintStatement,
            NodeKind::IfStatement,
            NodeKind::WhileLoop,
            NodeKind::LocalVariableDeclaration,
            NodeKind::Assignment,
        ]
    );
}

#[test]
fn declaration_carries_datatype_keyword() {
    let stmts = statements(&wrap("declare Letter char;"));
    let decl = &stmts[0];
    assert_eq!(decl.children[1].kind, NodeKind::IdentifierId);
    assert_eq!(decl.children[1].text(), Some("Letter"));
    let datatype = &decl.children[2];
    assert_eq!(datatype.kind, NodeKind::Datatype);
    assert_eq!(
        datatype.children[0].token.as_ref().unwrap().value,
        TokenValue::Keyword(Keyword::Char)
    );
}

#[test]
fn all_assignment_operators_parse() {
    for symbol in ["=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>="] {
        let stmts = statements(&wrap(&format!("let x {symbol} 1;")));
        let assignment = &stmts[0];
        assert_eq!(assignment.kind, NodeKind::Assignment);
        assert_eq!(assignment.children[2].kind, NodeKind::AssignmentOperator);
        assert_eq!(operator_of(&assignment.children[2]).symbol(), symbol);
        assert_eq!(assignment.children[3].kind, NodeKind::Expression);
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let stmts = statements(&wrap("print 1 + 2 * 3;"));
    let expr = &stmts[0].children[1];
    assert_eq!(expr.children.len(), 3);
    assert_eq!(operator_of(&expr.children[1]), Operator::Add);
    let rhs = &expr.children[2];
    assert_eq!(rhs.children.len(), 3);
    assert_eq!(operator_of(&rhs.children[1]), Operator::Mul);
}

#[test]
fn arithmetic_is_left_associative() {
    let stmts = statements(&wrap("print 1 - 2 - 3;"));
    let expr = &stmts[0].children[1];
    assert_eq!(operator_of(&expr.children[1]), Operator::Sub);
    let lhs = &expr.children[0];
    assert_eq!(lhs.children.len(), 3);
    assert_eq!(lhs.children[2].children[0].kind, NodeKind::Number);
}

#[test]
fn relational_binds_looser_than_arithmetic() {
    let stmts = statements(&wrap("if a + 1 < b * 2 [ ]"));
    let condition = &stmts[0].children[1];
    assert_eq!(condition.kind, NodeKind::Expression);
    let relational = &condition.children[0];
    assert_eq!(relational.kind, NodeKind::ConditionalExpression);
    assert_eq!(operator_of(&relational.children[1]), Operator::Lt);
    assert_eq!(operator_of(&relational.children[0].children[1]), Operator::Add);
    assert_eq!(operator_of(&relational.children[2].children[1]), Operator::Mul);
}

#[test]
fn chained_comparison_is_rejected() {
    let err = parse(&wrap("if a < b < c [ ]")).unwrap_err();
    assert_eq!(err.token, "<");
}

#[test]
fn parentheses_group_without_leaving_tokens() {
    let stmts = statements(&wrap("print (1 + 2) * 3;"));
    let expr = &stmts[0].children[1];
    assert_eq!(operator_of(&expr.children[1]), Operator::Mul);
    let group = &expr.children[0];
    assert_eq!(group.children.len(), 1);
    assert_eq!(group.children[0].children.len(), 3);
}

#[test]
fn literals_are_decoded() {
    let stmts = statements(&wrap(r#"print 'x'; print "a\nb"; print 2.5;"#));
    let values: Vec<TokenValue> = stmts
        .iter()
        .map(|s| s.children[1].children[0].token.clone().unwrap().value)
        .collect();
    assert_eq!(
        values,
        vec![
            TokenValue::Char('x'),
            TokenValue::Text("a\nb".to_owned()),
            TokenValue::Number(2.5),
        ]
    );
}

#[test]
fn comments_are_skipped() {
    let source = "// header\nProgram test Main [ /* nothing\n here */ print 1; // trailing\n ]";
    assert_eq!(statements(source).len(), 1);
}

#[test]
fn unicode_identifiers_are_accepted() {
    let stmts = statements(&wrap("declare größe real; print größe;"));
    assert_eq!(stmts[0].children[1].text(), Some("größe"));
}

#[test]
fn identifiers_cannot_start_with_a_digit() {
    assert!(parse(&wrap("declare 1x real;")).is_err());
}

#[test]
fn keyword_prefix_is_still_an_identifier() {
    let stmts = statements(&wrap("declare printer real;"));
    assert_eq!(stmts[0].children[1].text(), Some("printer"));
}

#[test]
fn syntax_error_reports_position_and_context() {
    let source = "Program test Main [\n  print ;\n]";
    let err = parse(source).unwrap_err();
    assert_eq!(err.token, ";");
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 9);
    assert_eq!(err.context, ";\n]");
    assert!(!err.expected.is_empty());
    let report = err.report();
    assert!(report.contains("Line #2"));
    assert!(report.contains("Character #9"));
    assert!(report.contains("Failed at: ;\n]..."));
}

#[test]
fn syntax_error_context_is_capped() {
    let source = "Program test Main [ print ) and a long tail that goes on ]";
    let err = parse(source).unwrap_err();
    assert_eq!(err.token, ")");
    assert_eq!(err.context.chars().count(), super::CONTEXT_CHARS);
}

#[test]
fn missing_closing_bracket_is_end_of_input() {
    let err = parse("Program test Main [ print 1;").unwrap_err();
    assert_eq!(err.token, "end of input");
}

#[test]
fn malformed_char_literal_is_a_syntax_error() {
    let err = parse(&wrap("print 'ab';")).unwrap_err();
    assert!(err.message.contains("exactly one character"));
    assert_eq!(err.token, "'ab';");
}
