use super::CompileContext;
use crate::ast::{value_to_text, Component, Filter, Token};
use crate::error::{ErrorKind, ExpressionError};

/// One `assign` of an intermediate variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub variable_name: String,
    pub liquid: String,
}

/// Check the grammar of an expression: a property or state first, state only
/// first, filters last
pub fn validate_expression(expression: &[Token]) -> Result<(), ExpressionError> {
    let first = expression
        .first()
        .ok_or_else(|| ExpressionError::new(ErrorKind::EmptyExpression, "Expression cannot be empty"))?;
    if first.is_filter() {
        return Err(
            ExpressionError::new(ErrorKind::LeadingFilter, "Expression cannot start with a filter")
                .with_expression(expression)
                .with_help("Start the expression with a property or a state"),
        );
    }

    let mut seen_filter = false;
    for (index, token) in expression.iter().enumerate() {
        match token {
            Token::Filter(_) => seen_filter = true,
            _ if seen_filter => {
                return Err(ExpressionError::new(
                    ErrorKind::PropertyAfterFilter,
                    "A filter cannot be followed by a property or state",
                )
                .with_expression(expression)
                .with_help("Move the filters to the end of the expression"));
            }
            Token::State(_) if index != 0 => {
                return Err(ExpressionError::new(
                    ErrorKind::MisplacedState,
                    "State can only be the first token in an expression",
                )
                .with_expression(expression));
            }
            Token::State(_) | Token::Property(_) => {}
        }
    }
    Ok(())
}

/// Compile an expression to the statements assigning its value.
/// The value is held by the last statement's variable.
pub fn get_liquid_block(
    ctx: &mut CompileContext,
    component: &Component,
    expression: &[Token],
) -> Result<Vec<Statement>, ExpressionError> {
    validate_expression(expression)?;

    let receiver = match &expression[0] {
        Token::Property(property) if !property.is_fixed() => property
            .data_source_id
            .as_deref()
            .filter(|id| !ctx.is_global_data_source(id))
            .unwrap_or_default(),
        _ => "",
    };

    let variable_name = ctx.next_variable_name(component);
    let liquid = get_liquid_statement(expression, &variable_name, receiver)?;
    log::debug!("{}: {}", component.id, liquid);
    Ok(vec![Statement { variable_name, liquid }])
}

/// Compile an expression to `assign <variable> = [<receiver>.]<path>[ | <filters>]`
pub fn get_liquid_statement(
    expression: &[Token],
    variable_name: &str,
    receiver: &str,
) -> Result<String, ExpressionError> {
    if expression.is_empty() {
        return Err(ExpressionError::new(ErrorKind::EmptyExpression, "Expression cannot be empty"));
    }
    let first_filter = expression.iter().position(Token::is_filter);
    if first_filter == Some(0) {
        return Err(ExpressionError::new(ErrorKind::LeadingFilter, "Expression cannot start with a filter")
            .with_expression(expression));
    }

    let (properties, rest) = expression.split_at(first_filter.unwrap_or(expression.len()));
    let filters = rest
        .iter()
        .map(|token| match token {
            Token::Filter(filter) => Ok(filter),
            _ => Err(ExpressionError::new(
                ErrorKind::PropertyAfterFilter,
                "A filter cannot be followed by a property or state",
            )
            .with_expression(expression)),
        })
        .collect::<Result<Vec<&Filter>, _>>()?;

    let mut liquid = format!("assign {} = ", variable_name);
    if !receiver.is_empty() {
        liquid.push_str(receiver);
        liquid.push('.');
    }
    liquid.push_str(&get_liquid_statement_properties(properties)?);
    liquid.push_str(&get_liquid_statement_filters(&filters));
    Ok(liquid)
}

/// Dotted path of the property and state tokens
pub fn get_liquid_statement_properties(tokens: &[Token]) -> Result<String, ExpressionError> {
    let parts = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| match token {
            Token::State(state) if index == 0 => {
                Ok(super::state_variable_name(&state.component_id, &state.stored_state_id))
            }
            Token::State(_) => Err(ExpressionError::new(
                ErrorKind::MisplacedState,
                "State can only be the first token in an expression",
            )
            .with_expression(tokens)),
            Token::Property(property) if property.is_fixed() => Ok(quote(&property.fixed_value())),
            Token::Property(property) => Ok(property.field_id.clone()),
            Token::Filter(filter) => Err(ExpressionError::new(
                ErrorKind::InvalidExpression,
                format!("Only state or property can be used in an expression, got filter {}", filter.id),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("."))
}

/// ` | id: opt, opt | id ...`, empty without filters
pub fn get_liquid_statement_filters(filters: &[&Filter]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = filters
        .iter()
        .map(|filter| {
            if filter.options.is_empty() {
                filter.id.clone()
            } else {
                let values: Vec<String> = filter.options.values().map(value_to_text).collect();
                format!("{}: {}", filter.id, values.join(", "))
            }
        })
        .collect();
    format!(" | {}", rendered.join(" | "))
}

/// Liquid string literal. Liquid has no escapes, so with both quote
/// characters present the double quotes become `&quot;`.
fn quote(value: &str) -> String {
    match (value.contains('"'), value.contains('\'')) {
        (true, false) => format!("'{}'", value),
        (true, true) => {
            log::warn!("fixed value {} holds both quote characters, double quotes are published as &quot;", value);
            format!("\"{}\"", value.replace('"', "&quot;"))
        }
        (false, _) => format!("\"{}\"", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldKind, Property};
    use crate::config::Options;
    use indexmap::IndexMap;
    use serde_json::json;

    fn property(field_id: &str, data_source_id: Option<&str>) -> Token {
        Token::Property(Property {
            field_id: field_id.to_string(),
            label: field_id.to_string(),
            data_source_id: data_source_id.map(str::to_string),
            type_ids: vec![],
            kind: FieldKind::Scalar,
            options: None,
        })
    }

    fn filter(id: &str, options: &[(&str, serde_json::Value)]) -> Token {
        Token::Filter(Filter {
            id: id.to_string(),
            label: id.to_string(),
            options: options.iter().map(|(k, v)| (k.to_string(), v.clone())).collect::<IndexMap<_, _>>(),
        })
    }

    #[test]
    fn test_statement_with_receiver() {
        let expression = vec![property("continent", Some("countries")), property("name", None)];
        let liquid = get_liquid_statement(&expression, "var_1", "countries").unwrap();
        assert_eq!(liquid, "assign var_1 = countries.continent.name");
    }

    #[test]
    fn test_statement_with_filter() {
        let expression = vec![property("countries", Some("countries")), filter("first", &[])];
        let liquid = get_liquid_statement(&expression, "variableName", "continent").unwrap();
        assert_eq!(liquid, "assign variableName = continent.countries | first");
    }

    #[test]
    fn test_statement_filter_options() {
        let expression = vec![
            property("continents", Some("countries")),
            filter("where", &[("key", json!("code")), ("value", json!("EU"))]),
            filter("first", &[]),
            filter("slice", &[("start", json!(1)), ("end", json!(null))]),
        ];
        let liquid = get_liquid_statement(&expression, "v", "").unwrap();
        assert_eq!(liquid, "assign v = continents | where: code, EU | first | slice: 1, ");
    }

    #[test]
    fn test_fixed_literal() {
        let mut options = IndexMap::new();
        options.insert("value".to_string(), json!("hello"));
        let fixed = Token::Property(Property {
            field_id: "fixed".into(),
            label: "Fixed".into(),
            data_source_id: None,
            type_ids: vec![],
            kind: FieldKind::Scalar,
            options: Some(options),
        });
        assert_eq!(get_liquid_statement_properties(&[fixed]).unwrap(), "\"hello\"");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("say \"hi\""), "'say \"hi\"'");
        assert_eq!(quote("it's"), "\"it's\"");
        assert_eq!(quote("it's \"x\""), "\"it's &quot;x&quot;\"");
    }

    #[test]
    fn test_grammar_errors() {
        let err = get_liquid_statement(&[], "v", "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyExpression);

        let err = validate_expression(&[filter("first", &[]), property("a", None)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::LeadingFilter);

        let err =
            validate_expression(&[property("a", None), filter("first", &[]), property("b", None)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PropertyAfterFilter);
    }

    #[test]
    fn test_block_skips_global_receiver() {
        let options = Options::default();
        let mut ctx = CompileContext::with_build_id(&options, 0);
        let component = Component {
            id: "c9".into(),
            ..Component::default()
        };
        let statements =
            get_liquid_block(&mut ctx, &component, &[property("page", Some("eleventy")), property("url", None)])
                .unwrap();
        assert_eq!(statements[0].liquid, "assign var_c9_0 = page.url");
    }
}
