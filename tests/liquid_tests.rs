use eleventy_liquid::ast::{Component, Expression, Filter, Token};
use eleventy_liquid::generate::{
    echo_block, get_liquid_block, get_liquid_statement, get_liquid_statement_filters, CompileContext,
};
use eleventy_liquid::{ErrorKind, Options};
use indoc::indoc;

/// Tokens as the editor stores them
fn expression(json: &str) -> Expression {
    serde_json::from_str(json).unwrap()
}

fn component(id: &str) -> Component {
    Component {
        id: id.to_string(),
        persistent_id: Some(format!("p-{}", id)),
        tag_name: Some("div".to_string()),
        ..Component::default()
    }
}

#[test]
fn test_statement_with_initial_scope() {
    let expression = expression(
        r#"[
            {"type": "property", "fieldId": "country", "label": "country", "dataSourceId": "countries", "kind": "object"},
            {"type": "property", "fieldId": "language", "label": "language", "kind": "object"},
            {"type": "property", "fieldId": "name", "label": "name", "kind": "scalar"}
        ]"#,
    );
    let liquid = get_liquid_statement(&expression, "var_test_0", "countries").unwrap();
    assert!(liquid.contains("countries.country.language.name"));
    assert!(liquid.starts_with("assign var_test_0 = "));
}

#[test]
fn test_statement_with_state_and_filters() {
    let expression = expression(
        r#"[
            {"type": "state", "componentId": "list1", "storedStateId": "__data", "exposed": false},
            {"type": "property", "fieldId": "tags", "label": "tags", "kind": "list"},
            {"type": "filter", "id": "join", "label": "join", "options": {"separator": ", "}},
            {"type": "filter", "id": "upcase", "label": "upcase", "options": {}}
        ]"#,
    );
    let liquid = get_liquid_statement(&expression, "v", "").unwrap();
    assert_eq!(liquid, "assign v = state_list1___data.tags | join: ,  | upcase");
}

#[test]
fn test_state_must_come_first() {
    let expression = expression(
        r#"[
            {"type": "property", "fieldId": "a", "label": "a", "kind": "object"},
            {"type": "state", "componentId": "c", "storedStateId": "s"}
        ]"#,
    );
    let err = get_liquid_statement(&expression, "v", "").unwrap_err();
    assert_eq!(err.kind, ErrorKind::MisplacedState);
    assert_eq!(err.message, "State can only be the first token in an expression");
}

#[test]
fn test_filter_cannot_start() {
    let expression = expression(
        r#"[
            {"type": "filter", "id": "first", "label": "first"},
            {"type": "property", "fieldId": "a", "label": "a", "kind": "scalar"}
        ]"#,
    );
    let err = get_liquid_statement(&expression, "v", "").unwrap_err();
    assert_eq!(err.kind, ErrorKind::LeadingFilter);
}

#[test]
fn test_property_after_filter() {
    let expression = expression(
        r#"[
            {"type": "property", "fieldId": "posts", "label": "posts", "dataSourceId": "cms", "kind": "list"},
            {"type": "filter", "id": "first", "label": "first"},
            {"type": "property", "fieldId": "title", "label": "title", "kind": "scalar"}
        ]"#,
    );
    let options = Options::default();
    let mut ctx = CompileContext::with_build_id(&options, 0);
    let err = get_liquid_block(&mut ctx, &component("c1"), &expression).unwrap_err();
    assert_eq!(err.kind, ErrorKind::PropertyAfterFilter);
    assert_eq!(err.expression.as_deref(), Some("posts -> first -> title"));
    // A rejected expression takes no variable
    assert_eq!(ctx.next_variable_name(&component("c1")), "var_c1_0");
}

#[test]
fn test_empty_filters() {
    assert_eq!(get_liquid_statement_filters(&[]), "");
    let first = Filter {
        id: "first".to_string(),
        label: "first".to_string(),
        options: Default::default(),
    };
    assert_eq!(get_liquid_statement_filters(&[&first]), " | first");
}

#[test]
fn test_variables_are_unique_within_a_pass() {
    let expression = expression(
        r#"[{"type": "property", "fieldId": "title", "label": "title", "dataSourceId": "cms", "kind": "scalar"}]"#,
    );
    let options = Options::default();
    let mut ctx = CompileContext::with_build_id(&options, 0);
    let first = echo_block(&mut ctx, &component("a"), &expression).unwrap();
    let second = echo_block(&mut ctx, &component("b"), &expression).unwrap();
    assert_eq!(
        first,
        indoc! {"
            {% liquid
              assign var_a_0 = cms.title
              echo var_a_0
            %}"}
    );
    assert!(second.contains("assign var_b_1 = cms.title"));
}

#[test]
fn test_fixed_literal_has_no_receiver() {
    let expression: Vec<Token> = expression(
        r#"[{"type": "property", "fieldId": "fixed", "label": "Fixed value", "dataSourceId": "cms", "kind": "scalar",
             "options": {"value": "Hello"}}]"#,
    );
    let options = Options::default();
    let mut ctx = CompileContext::with_build_id(&options, 0);
    let statements = get_liquid_block(&mut ctx, &component("c1"), &expression).unwrap();
    assert_eq!(statements[0].liquid, "assign var_c1_0 = \"Hello\"");
}

#[test]
fn test_independent_passes_compile_the_same_statements() {
    let expression = expression(
        r#"[
            {"type": "property", "fieldId": "posts", "label": "posts", "dataSourceId": "cms", "kind": "list"},
            {"type": "filter", "id": "first", "label": "first"}
        ]"#,
    );
    let options = Options::default();
    let mut first_pass = CompileContext::with_build_id(&options, 0);
    let mut second_pass = CompileContext::with_build_id(&options, 0);
    // The second pass has already used a variable
    second_pass.next_variable_name(&component("other"));

    let first = get_liquid_block(&mut first_pass, &component("c1"), &expression).unwrap();
    let second = get_liquid_block(&mut second_pass, &component("c1"), &expression).unwrap();
    assert_eq!(first[0].variable_name, "var_c1_0");
    assert_eq!(second[0].variable_name, "var_c1_1");
    assert_eq!(
        first[0].liquid.replace(&first[0].variable_name, "v"),
        second[0].liquid.replace(&second[0].variable_name, "v")
    );
    assert_eq!(first[0].liquid, "assign var_c1_0 = cms.posts | first");
}
