use super::liquid::{get_liquid_block, Statement};
use super::{CompileContext, Output};
use crate::ast::{Component, FieldKind, Operator, Token};
use crate::error::{ErrorKind, ExpressionError};
use crate::host::DataTree;

/// State id of the current item of a loop
pub const LOOP_DATA_STATE_ID: &str = "__data";

/// Liquid variable holding a published state
pub fn state_variable_name(component_id: &str, state_id: &str) -> String {
    format!("state_{}_{}", component_id, state_id)
}

/// A conditional binding: `expression <operator> [expression2]`
#[derive(Debug, Clone, Copy)]
pub struct Condition<'a> {
    pub expression: &'a [Token],
    pub operator: Operator,
    pub expression2: Option<&'a [Token]>,
}

fn last_variable(statements: &[Statement]) -> &str {
    statements.last().map(|s| s.variable_name.as_str()).unwrap_or_default()
}

fn persistent_id(component: &Component) -> Result<&str, ExpressionError> {
    match component.persistent_id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => {
            log::error!("component {} has no persistent id, it is required to publish states", component.id);
            Err(ExpressionError::new(ErrorKind::MissingPersistentId, "This component has no persistent ID")
                .with_help("Persistent IDs are required to get component states"))
        }
    }
}

/// `{% liquid ... %}` tag holding the statements and a last line
fn liquid_tag(statements: &[Statement], last_line: Option<&str>) -> String {
    let mut out = Output::new();
    out.line("{% liquid");
    out.indent();
    for statement in statements {
        out.line(&statement.liquid);
    }
    if let Some(last_line) = last_line {
        out.line(last_line);
    }
    out.dedent();
    out.push("%}");
    out.finish()
}

/// Output the value of an expression
pub fn echo_block(
    ctx: &mut CompileContext,
    component: &Component,
    expression: &[Token],
) -> Result<String, ExpressionError> {
    let statements = get_liquid_block(ctx, component, expression)?;
    let echo = format!("echo {}", last_variable(&statements));
    Ok(liquid_tag(&statements, Some(&echo)))
}

/// Single line form of the echo block, for YAML front matter
pub fn echo_inline(
    ctx: &mut CompileContext,
    component: &Component,
    expression: &[Token],
) -> Result<String, ExpressionError> {
    let statements = get_liquid_block(ctx, component, expression)?;
    let assigns: String = statements.iter().map(|s| format!("{{% {} %}}", s.liquid)).collect();
    Ok(format!("{}{{{{ {} }}}}", assigns, last_variable(&statements)))
}

/// Publish the value of an expression as a component state
pub fn assign_block(
    ctx: &mut CompileContext,
    state_id: &str,
    component: &Component,
    expression: &[Token],
) -> Result<String, ExpressionError> {
    let id = persistent_id(component)?;
    let statements = get_liquid_block(ctx, component, expression)?;
    let assign = format!("assign {} = {}", state_variable_name(id, state_id), last_variable(&statements));
    Ok(liquid_tag(&statements, Some(&assign)))
}

/// Start and end of a loop over a list expression; the item is the
/// component's `__data` state
pub fn loop_block(
    ctx: &mut CompileContext,
    data_tree: &dyn DataTree,
    component: &Component,
    expression: &[Token],
) -> Result<(String, String), ExpressionError> {
    if expression.is_empty() {
        return Err(ExpressionError::new(ErrorKind::EmptyExpression, "Expression cannot be empty"));
    }
    let field = data_tree.expression_result_type(expression, component).ok_or_else(|| {
        let labels: Vec<&str> = expression.iter().map(Token::label).collect();
        ExpressionError::new(
            ErrorKind::InvalidExpression,
            format!("Expression {} is invalid", labels.join(" -> ")),
        )
    })?;
    if field.kind != FieldKind::List {
        return Err(ExpressionError::new(
            ErrorKind::NotAList,
            format!("Provided property needs to be a list in order to loop, not a {}", field.kind),
        )
        .with_expression(expression));
    }
    let id = persistent_id(component)?;
    let statements = get_liquid_block(ctx, component, expression)?;
    let start = format!(
        "{}\n{{% for {} in {} %}}",
        liquid_tag(&statements, None),
        state_variable_name(id, LOOP_DATA_STATE_ID),
        last_variable(&statements),
    );
    Ok((start, "{% endfor %}".to_string()))
}

/// Start and end of a conditional
pub fn if_block(
    ctx: &mut CompileContext,
    component: &Component,
    condition: &Condition<'_>,
) -> Result<(String, String), ExpressionError> {
    let mut statements = get_liquid_block(ctx, component, condition.expression)?;
    let left = last_variable(&statements).to_string();

    let (test, end) = match condition.operator {
        Operator::Truthy => (format!("{{% if {} %}}", left), "{% endif %}"),
        Operator::Falsy => (format!("{{% unless {} %}}", left), "{% endunless %}"),
        Operator::EmptyArray => (format!("{{% if {}.size == 0 %}}", left), "{% endif %}"),
        Operator::NotEmptyArray => (format!("{{% if {}.size > 0 %}}", left), "{% endif %}"),
        Operator::Equal => compare(ctx, component, condition, &mut statements, &left, "==")?,
        Operator::NotEqual => compare(ctx, component, condition, &mut statements, &left, "!=")?,
        Operator::GreaterThan => compare(ctx, component, condition, &mut statements, &left, ">")?,
        Operator::LessThan => compare(ctx, component, condition, &mut statements, &left, "<")?,
        Operator::GreaterThanOrEqual => compare(ctx, component, condition, &mut statements, &left, ">=")?,
        Operator::LessThanOrEqual => compare(ctx, component, condition, &mut statements, &left, "<=")?,
    };

    Ok((format!("{}\n{}", liquid_tag(&statements, None), test), end.to_string()))
}

/// `{% if left <comparison> right %}`, or a truthiness test when there is
/// no second expression
fn compare(
    ctx: &mut CompileContext,
    component: &Component,
    condition: &Condition<'_>,
    statements: &mut Vec<Statement>,
    left: &str,
    comparison: &str,
) -> Result<(String, &'static str), ExpressionError> {
    let Some(expression2) = condition.expression2.filter(|e| !e.is_empty()) else {
        log::warn!(
            "component {}: operator {} has no second expression, testing the value only",
            component.id,
            comparison
        );
        return Ok((format!("{{% if {} %}}", left), "{% endif %}"));
    };
    let right_statements = get_liquid_block(ctx, component, expression2)?;
    let right = last_variable(&right_statements).to_string();
    statements.extend(right_statements);
    Ok((format!("{{% if {} {} {} %}}", left, comparison, right), "{% endif %}"))
}
