use super::helpers::*;

#[test]
fn unclosed_group_points_back_at_open_paren() {
    insta::assert_snapshot!(snapshot("(tag1"), @r#"
    Query
      Group
        ParenOpen "("
        SimpleTag
          Word "tag1"
    ---
    error[syntax] at 5..5: missing closing `)` (related: group opened here at 0..1)
    "#);
}

#[test]
fn empty_group() {
    insta::assert_snapshot!(snapshot("()"), @r#"
    Query
      Group
        ParenOpen "("
        ParenClose ")"
    ---
    error[syntax] at 1..2: expected a clause
    "#);
}

#[test]
fn missing_value() {
    insta::assert_snapshot!(snapshot("score>="), @r#"
    Query
      FieldTerm
        FieldPath
          Word "score"
        GtEq ">="
    ---
    error[syntax] at 7..7: expected a value
    "#);
}

#[test]
fn missing_operator_after_dotted_path() {
    insta::assert_snapshot!(snapshot("a.b"), @r#"
    Query
      FieldTerm
        FieldPath
          Word "a"
          Dot "."
          Word "b"
    ---
    error[syntax] at 3..3: expected a comparison operator
    "#);
}

#[test]
fn dangling_pipe() {
    insta::assert_snapshot!(snapshot("tag1 |"), @r#"
    Query
      OrExpr
        SimpleTag
          Word "tag1"
        Pipe "|"
    ---
    error[syntax] at 6..6: expected a clause
    "#);
}

#[test]
fn dangling_ampersand() {
    insta::assert_snapshot!(snapshot("tag1 &"), @r#"
    Query
      AndExpr
        SimpleTag
          Word "tag1"
        Ampersand "&"
    ---
    error[syntax] at 6..6: expected a clause
    "#);
}

#[test]
fn lone_minus() {
    insta::assert_snapshot!(snapshot("-"), @r#"
    Query
      NotExpr
        Minus "-"
    ---
    error[syntax] at 1..1: expected a clause
    "#);
}

#[test]
fn unrecognized_characters_are_coalesced() {
    insta::assert_snapshot!(snapshot("a %% b"), @r#"
    Query
      SimpleTag
        Word "a"
      Error
        UnexpectedFragment "%%"
      SimpleTag
        Word "b"
    ---
    error[lexical] at 2..4: unrecognized characters
    error[syntax] at 5..6: unexpected token: `b`
    "#);
}

#[test]
fn unterminated_string_still_parses_as_value() {
    insta::assert_snapshot!(snapshot("artist:\"jane"), @r#"
    Query
      FieldTerm
        FieldPath
          Word "artist"
        Colon ":"
        Value
          UnterminatedStr "\"jane"
    ---
    error[lexical] at 7..12: unterminated string literal
    "#);
}

#[test]
fn group_recovers_at_closing_paren() {
    insta::assert_snapshot!(snapshot("(a %% b)"), @r#"
    Query
      Group
        ParenOpen "("
        SimpleTag
          Word "a"
        Error
          UnexpectedFragment "%%"
          Word "b"
        ParenClose ")"
    ---
    error[lexical] at 3..5: unrecognized characters
    error[syntax] at 3..5: unexpected token
    "#);
}

#[test]
fn empty_or_arm_syncs_to_closing_paren() {
    insta::assert_snapshot!(snapshot("(a | ) b"), @r#"
    Query
      AndExpr
        Group
          ParenOpen "("
          OrExpr
            SimpleTag
              Word "a"
            Pipe "|"
          ParenClose ")"
        SimpleTag
          Word "b"
    ---
    error[syntax] at 5..6: expected a clause
    "#);
}

#[test]
fn missing_sort_field() {
    insta::assert_snapshot!(snapshot("order:"), @r#"
    Query
      SortClause
        SortMarker "order:"
    ---
    error[syntax] at 6..6: expected a sort field name
    "#);
}

#[test]
fn clause_after_sort_is_reported_not_dropped() {
    insta::assert_snapshot!(snapshot("tag1 order:id tag2"), @r#"
    Query
      SimpleTag
        Word "tag1"
      SortClause
        SortMarker "order:"
        SortField
          Word "id"
      SimpleTag
        Word "tag2"
    ---
    error[syntax] at 14..18: unexpected token: `tag2`
    "#);
}

#[test]
fn pathological_nesting_hits_the_depth_limit() {
    let input = format!("{}a{}", "(".repeat(200), ")".repeat(200));
    let result = crate::parser::parse(&input);
    assert!(result.has_errors());
    assert!(
        result
            .diagnostics()
            .iter()
            .any(|d| d.message == "query is nested too deeply")
    );
    // The tree still covers every byte.
    assert_eq!(result.syntax().text().to_string(), input);
}

#[test]
fn every_error_path_keeps_the_tree_lossless() {
    for input in [
        "(tag1",
        "()",
        "score>=",
        "a.b",
        "tag1 |",
        "-",
        "a %% b",
        "artist:\"jane",
        "order:",
        "tag1 order:id tag2",
        ") ( |",
    ] {
        let result = crate::parser::parse(input);
        assert!(result.has_errors(), "input: {input:?}");
        assert_eq!(result.syntax().text().to_string(), input, "input: {input:?}");
    }
}
