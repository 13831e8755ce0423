use crate::ast::{AttributeValue, Component, Operator, StoredState, Token};
use crate::error::PublishError;
use crate::generate::{assign_block, echo_block, if_block, loop_block, CompileContext, Condition, LOOP_DATA_STATE_ID};
use crate::host::DataTree;
use crate::html::{build_attributes, escape_attribute, is_attribute, is_void_element, ComputedAttribute};
use indexmap::IndexMap;

/// Renders components with data bindings to Liquid markup
pub struct ComponentRenderer<'a> {
    data_tree: &'a dyn DataTree,
}

impl<'a> ComponentRenderer<'a> {
    pub fn new(data_tree: &'a dyn DataTree) -> Self {
        Self { data_tree }
    }

    /// Render a component tree, children first
    pub fn render_tree(&self, ctx: &mut CompileContext, component: &Component) -> Result<String, PublishError> {
        let mut inner_html = component.content.clone();
        for child in &component.components {
            inner_html.push_str(&self.render_tree(ctx, child)?);
        }
        self.render_component(ctx, component, &inner_html, || serialize_plain(component, &inner_html))
    }

    /// Render one component whose inner HTML is already rendered.
    /// Components without bindings are left to `fallback`.
    pub fn render_component(
        &self,
        ctx: &mut CompileContext,
        component: &Component,
        inner_html: &str,
        fallback: impl FnOnce() -> String,
    ) -> Result<String, PublishError> {
        let private: Vec<&StoredState> = component.visible_states(false).collect();
        let public: Vec<&StoredState> = component.visible_states(true).collect();
        if private.is_empty() && public.is_empty() && !component.unwrap {
            return Ok(fallback());
        }

        let tag_name = component
            .tag_name
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| PublishError::MissingTagName(component.id.clone()))?;

        let property = |id: &str| find_property(&private, id);

        let inner_html = match property("innerHTML") {
            Some(expression) => echo_block(ctx, component, expression)?,
            None => inner_html.to_string(),
        };

        let (if_start, if_end) = match property("condition") {
            Some(expression) => {
                let operator = component.condition_operator.unwrap_or(Operator::Truthy);
                let condition = Condition {
                    expression,
                    operator,
                    expression2: if operator.is_binary() { property("condition2") } else { None },
                };
                if_block(ctx, component, &condition)?
            }
            None => Default::default(),
        };

        let (for_start, for_end) = match property(LOOP_DATA_STATE_ID) {
            Some(expression) => loop_block(ctx, self.data_tree, component, expression)?,
            None => Default::default(),
        };

        let states = public
            .iter()
            .map(|state| assign_block(ctx, &state.id, component, &state.expression))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n");

        let before = format!("{}{}{}", states, for_start, if_start);
        let after = format!("{}{}", if_end, for_end);

        if component.unwrap {
            return Ok(format!("{}{}{}", before, inner_html, after));
        }

        let computed = private
            .iter()
            .filter(|state| is_attribute(state.label()))
            .map(|state| {
                echo_block(ctx, component, &state.expression)
                    .map(|value| ComputedAttribute::new(state.label(), value))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let attributes = build_attributes(&static_attributes(component), &computed);
        let open_tag = if attributes.is_empty() {
            format!("<{}>", tag_name)
        } else {
            format!("<{} {}>", tag_name, attributes)
        };

        if is_void_element(&tag_name) {
            Ok(format!("{}{}{}", before, open_tag, after))
        } else {
            Ok(format!("{}{}{}</{}>{}", before, open_tag, inner_html, tag_name, after))
        }
    }
}

/// Expression of a binding targeting the component itself
fn find_property<'c>(private: &[&'c StoredState], id: &str) -> Option<&'c [Token]> {
    private
        .iter()
        .find(|state| !is_attribute(state.label()) && state.id == id)
        .map(|state| state.expression.as_slice())
}

/// Static attributes with the classes joined in `class`
fn static_attributes(component: &Component) -> IndexMap<String, AttributeValue> {
    let mut attributes: IndexMap<String, AttributeValue> = component
        .attributes
        .iter()
        .map(|(name, value)| {
            let value = match value {
                AttributeValue::Text(text) => AttributeValue::Text(escape_attribute(text)),
                flag => flag.clone(),
            };
            (name.clone(), value)
        })
        .collect();
    let classes: Vec<&str> = component.classes.iter().map(String::as_str).filter(|c| !c.is_empty()).collect();
    if !classes.is_empty() {
        attributes.insert("class".to_string(), AttributeValue::Text(escape_attribute(&classes.join(" "))));
    }
    attributes
}

/// Markup of a component without bindings
pub fn serialize_plain(component: &Component, inner_html: &str) -> String {
    let Some(tag_name) = component.tag_name.as_deref().filter(|tag| !tag.is_empty()) else {
        return inner_html.to_string();
    };
    let tag_name = tag_name.to_ascii_lowercase();
    let attributes = build_attributes(&static_attributes(component), &[]);
    let open_tag = if attributes.is_empty() {
        format!("<{}>", tag_name)
    } else {
        format!("<{} {}>", tag_name, attributes)
    };
    if is_void_element(&tag_name) {
        open_tag
    } else {
        format!("{}{}</{}>", open_tag, inner_html, tag_name)
    }
}
