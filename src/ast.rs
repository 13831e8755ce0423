use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Field id of a property holding a fixed literal instead of fetched data.
/// The literal lives in `options.value`.
pub const FIXED_TOKEN_ID: &str = "fixed";

/// A data binding: an ordered token sequence
pub type Expression = Vec<Token>;

/// Shape of a value produced by a field or an expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Scalar,
    Object,
    List,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Object => "object",
            FieldKind::List => "list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expression token, stored by the editor as `{"type": "property" | "state" | "filter", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Token {
    Property(Property),
    State(State),
    Filter(Filter),
}

impl Token {
    /// Human readable label, used in error messages
    pub fn label(&self) -> &str {
        match self {
            Token::Property(p) if !p.label.is_empty() => &p.label,
            Token::Property(p) => &p.field_id,
            Token::State(s) => s.label.as_deref().unwrap_or(&s.stored_state_id),
            Token::Filter(f) if !f.label.is_empty() => &f.label,
            Token::Filter(f) => &f.id,
        }
    }

    pub fn is_filter(&self) -> bool {
        matches!(self, Token::Filter(_))
    }
}

/// A field reachable from the current evaluation context of one data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub field_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    #[serde(default)]
    pub type_ids: Vec<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<IndexMap<String, Value>>,
}

impl Property {
    pub fn is_fixed(&self) -> bool {
        self.field_id == FIXED_TOKEN_ID
    }

    /// Literal value of a fixed property, empty when unset
    pub fn fixed_value(&self) -> String {
        match self.options.as_ref().and_then(|o| o.get("value")) {
            Some(value) => value_to_text(value),
            None => String::new(),
        }
    }
}

/// Reference to a value published by another component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub component_id: String,
    pub stored_state_id: String,
    #[serde(default)]
    pub exposed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Named transform applied to the value produced so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: IndexMap<String, Value>,
}

/// Text form of a JSON value as it appears in generated source
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Static type information for a field or an expression result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub type_ids: Vec<String>,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
}

/// Operator of a conditional binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "truthy")]
    Truthy,
    #[serde(rename = "falsy")]
    Falsy,
    #[serde(rename = "empty array")]
    EmptyArray,
    #[serde(rename = "not empty array")]
    NotEmptyArray,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl Operator {
    /// Binary operators compare the condition with a second expression
    pub fn is_binary(&self) -> bool {
        self.liquid_comparison().is_some()
    }

    pub fn liquid_comparison(&self) -> Option<&'static str> {
        match self {
            Operator::Equal => Some("=="),
            Operator::NotEqual => Some("!="),
            Operator::GreaterThan => Some(">"),
            Operator::LessThan => Some("<"),
            Operator::GreaterThanOrEqual => Some(">="),
            Operator::LessThanOrEqual => Some("<="),
            Operator::Truthy | Operator::Falsy | Operator::EmptyArray | Operator::NotEmptyArray => None,
        }
    }
}

/// Static HTML attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Text(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// A binding stored on a component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredState {
    pub id: String,
    pub label: Option<String>,
    pub hidden: bool,
    pub expression: Expression,
}

impl StoredState {
    pub fn new(id: impl Into<String>, expression: Expression) -> Self {
        Self {
            id: id.into(),
            expression,
            ..Self::default()
        }
    }

    /// Label of the binding, which is the attribute name for attribute bindings
    pub fn label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.id,
        }
    }

    /// Hidden and empty bindings take no part in rendering
    pub fn is_visible(&self) -> bool {
        !self.hidden && !self.expression.is_empty()
    }
}

/// A markup component of the page tree, as the editor model exposes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Component {
    /// Runtime id, unique within the document
    pub id: String,
    /// Stable id surviving serialization, required to publish state
    pub persistent_id: Option<String>,
    pub tag_name: Option<String>,
    pub attributes: IndexMap<String, AttributeValue>,
    pub classes: Vec<String>,
    /// Static text content, rendered before the children
    pub content: String,
    pub components: Vec<Component>,
    pub private_states: Vec<StoredState>,
    pub public_states: Vec<StoredState>,
    /// Drop the wrapping tag and keep the content
    pub unwrap: bool,
    pub condition_operator: Option<Operator>,
}

impl Component {
    pub fn states(&self, public: bool) -> &[StoredState] {
        if public {
            &self.public_states
        } else {
            &self.private_states
        }
    }

    pub fn state(&self, id: &str, public: bool) -> Option<&StoredState> {
        self.states(public).iter().find(|state| state.id == id)
    }

    /// Bindings that take part in rendering
    pub fn visible_states(&self, public: bool) -> impl Iterator<Item = &StoredState> {
        self.states(public).iter().filter(|state| state.is_visible())
    }

    /// Depth-first search by persistent id, including self
    pub fn find(&self, persistent_id: &str) -> Option<&Component> {
        if self.persistent_id.as_deref() == Some(persistent_id) {
            return Some(self);
        }
        self.components.iter().find_map(|child| child.find(persistent_id))
    }
}

/// Settings of one page, as the page settings form stores them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Pagination source: stored expression JSON, or legacy `dataSource.field`
    #[serde(rename = "eleventyPageData", skip_serializing_if = "Option::is_none")]
    pub page_data: Option<String>,
    #[serde(rename = "eleventyPageSize", deserialize_with = "number_or_string", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<String>,
    #[serde(rename = "eleventyPageReverse", deserialize_with = "flag")]
    pub page_reverse: bool,
    /// Stored expression JSON or plain string
    #[serde(rename = "eleventyPermalink", skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    /// Comma separated list of languages
    #[serde(rename = "silexLanguagesList", skip_serializing_if = "Option::is_none")]
    pub languages_list: Option<String>,
    #[serde(rename = "silexLanguagesDefault", skip_serializing_if = "Option::is_none")]
    pub languages_default: Option<String>,
    #[serde(rename = "eleventyNavigationKey", skip_serializing_if = "Option::is_none")]
    pub navigation_key: Option<String>,
    #[serde(rename = "eleventyNavigationTitle", skip_serializing_if = "Option::is_none")]
    pub navigation_title: Option<String>,
    #[serde(rename = "eleventyNavigationOrder", deserialize_with = "number_or_string", skip_serializing_if = "Option::is_none")]
    pub navigation_order: Option<String>,
    #[serde(rename = "eleventyNavigationParent", skip_serializing_if = "Option::is_none")]
    pub navigation_parent: Option<String>,
    #[serde(rename = "eleventyNavigationUrl", skip_serializing_if = "Option::is_none")]
    pub navigation_url: Option<String>,
    #[serde(rename = "eleventySeoTitle", skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(rename = "eleventySeoDescription", skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(rename = "eleventyFavicon", skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(rename = "eleventyOGImage", skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(rename = "eleventyOGTitle", skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(rename = "eleventyOGDescription", skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
}

impl PageSettings {
    /// Trimmed, non-empty languages of the languages list
    pub fn languages(&self) -> Vec<String> {
        self.languages_list
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Pages generated from data let the generator derive their permalink
    pub fn is_collection_page(&self) -> bool {
        non_empty(&self.page_data).is_some()
    }

    /// Settings holding stored expressions, by setting name
    pub fn expression_settings_mut(&mut self) -> [(&'static str, &mut Option<String>); 8] {
        [
            ("eleventyPageData", &mut self.page_data),
            ("eleventyPermalink", &mut self.permalink),
            ("eleventySeoTitle", &mut self.seo_title),
            ("eleventySeoDescription", &mut self.seo_description),
            ("eleventyFavicon", &mut self.favicon),
            ("eleventyOGImage", &mut self.og_image),
            ("eleventyOGTitle", &mut self.og_title),
            ("eleventyOGDescription", &mut self.og_description),
        ]
    }
}

/// `Some` only for non-blank strings
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Form inputs of type number come back as numbers or strings
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(value) => Some(value_to_text(&value)),
    })
}

/// Checkbox inputs come back as booleans or strings
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "on" | "1"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

/// One page of the site: its name, settings and main (body) component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub name: String,
    pub settings: PageSettings,
    pub component: Component,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    #[default]
    Graphql,
    #[serde(other)]
    Other,
}

/// Where and how to send a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transport {
    pub url: String,
    pub method: String,
    pub headers: Option<IndexMap<String, String>>,
}

/// A remote data source with its transport configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub url: String,
    pub method: String,
    pub headers: Option<IndexMap<String, String>>,
    /// Transport used from the build server, overrides the browser one
    pub server_to_server: Option<Transport>,
}

impl DataSource {
    /// Transport used at site-build time
    pub fn transport(&self) -> Transport {
        match &self.server_to_server {
            Some(s2s) => s2s.clone(),
            None => Transport {
                url: self.url.clone(),
                method: self.method.clone(),
                headers: self.headers.clone(),
            },
        }
    }
}
