//! A site described by one JSON document, implementing every host interface.
//!
//! ```json
//! {
//!   "pages": [{ "name": "Home", "settings": {}, "component": { ... } }],
//!   "dataSources": [{ "id": "cms", "type": "graphql", "url": "...", "method": "POST" }],
//!   "queries": { "Home": { "cms": "query { ... }" } },
//!   "types": [{ "id": "Query", "dataSourceId": "cms", "fields": [ ... ] }]
//! }
//! ```

use crate::ast::{Component, DataSource, Field, FieldKind, Page, State, Token};
use crate::error::PublishError;
use crate::generate::LOOP_DATA_STATE_ID;
use crate::host::{DataSources, DataTree, QueryAggregator};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File extension of site documents
pub const SITE_EXTENSION: &str = ".site.json";

/// Name of the GraphQL root type, whose fields can be queried
const ROOT_TYPE: &str = "Query";

/// States referencing states deeper than this are not resolved
const MAX_STATE_DEPTH: usize = 16;

/// A type of a data source schema
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeDefinition {
    pub id: String,
    pub data_source_id: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteDocument {
    pub pages: Vec<Page>,
    pub data_sources: Vec<DataSource>,
    /// Query payloads by page name, then by data source id
    pub queries: IndexMap<String, IndexMap<String, String>>,
    pub types: Vec<TypeDefinition>,
}

impl SiteDocument {
    pub fn from_json(json: &str) -> Result<Self, PublishError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, PublishError> {
        let json = std::fs::read_to_string(path).map_err(|err| PublishError::io(path, err))?;
        Self::from_json(&json)
    }

    /// Component with this persistent id, in any page
    pub fn find_component(&self, persistent_id: &str) -> Option<&Component> {
        self.pages.iter().find_map(|page| page.component.find(persistent_id))
    }

    fn resolve(&self, expression: &[Token], depth: usize) -> Option<Field> {
        if depth > MAX_STATE_DEPTH {
            log::warn!("state references are nested too deeply, giving up");
            return None;
        }
        let mut field: Option<Field> = None;
        for token in expression {
            field = Some(match token {
                Token::Property(property) => Field {
                    id: property.field_id.clone(),
                    label: property.label.clone(),
                    type_ids: property.type_ids.clone(),
                    kind: property.kind,
                    data_source_id: property.data_source_id.clone(),
                },
                Token::State(state) => match state.force_kind {
                    Some(kind) => Field {
                        id: state.stored_state_id.clone(),
                        label: token.label().to_string(),
                        type_ids: Vec::new(),
                        kind,
                        data_source_id: None,
                    },
                    None => self.resolve_state(state, depth)?,
                },
                Token::Filter(filter) => {
                    let mut current = field?;
                    current.kind = filter_output_kind(&filter.id, current.kind);
                    current
                }
            });
        }
        field
    }

    fn resolve_state(&self, state: &State, depth: usize) -> Option<Field> {
        let component = self.find_component(&state.component_id)?;
        if state.stored_state_id == LOOP_DATA_STATE_ID {
            // Current item of the loop
            let list = component.state(LOOP_DATA_STATE_ID, false)?;
            let mut field = self.resolve(&list.expression, depth + 1)?;
            field.kind = FieldKind::Object;
            return Some(field);
        }
        let stored = component
            .state(&state.stored_state_id, true)
            .or_else(|| component.state(&state.stored_state_id, false))?;
        self.resolve(&stored.expression, depth + 1)
    }
}

/// Name of a site document without its extension, `None` for other files
pub fn site_stem(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.strip_suffix(SITE_EXTENSION)
}

/// `<dir>/<stem>.site.json` to `<dir>/<stem><suffix>`
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = site_stem(path).unwrap_or("site");
    path.with_file_name(format!("{}{}", stem, suffix))
}

/// Kind of the value returned by a filter
fn filter_output_kind(filter_id: &str, input: FieldKind) -> FieldKind {
    match filter_id {
        "first" | "last" if input == FieldKind::List => FieldKind::Object,
        "size" | "join" | "json" | "date" | "strip_html" => FieldKind::Scalar,
        "where" | "where_exp" | "sort" | "sort_natural" | "reverse" | "uniq" | "compact" | "map" | "concat"
        | "split" => FieldKind::List,
        _ => input,
    }
}

impl DataTree for SiteDocument {
    fn expression_result_type(&self, expression: &[Token], _component: &Component) -> Option<Field> {
        self.resolve(expression, 0)
    }

    fn all_queryable_fields(&self) -> Vec<Field> {
        self.types
            .iter()
            .filter(|ty| ty.id == ROOT_TYPE)
            .flat_map(|ty| {
                ty.fields.iter().map(|field| Field {
                    data_source_id: field.data_source_id.clone().or_else(|| ty.data_source_id.clone()),
                    ..field.clone()
                })
            })
            .collect()
    }
}

impl DataSources for SiteDocument {
    fn data_source(&self, id: &str) -> Option<DataSource> {
        self.data_sources.iter().find(|ds| ds.id == id).cloned()
    }
}

impl QueryAggregator for SiteDocument {
    fn page_query(&self, page: &Page) -> IndexMap<String, String> {
        self.queries.get(&page.name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"{
        "pages": [{
            "name": "Home",
            "component": {
                "id": "c1", "persistentId": "body", "tagName": "body",
                "components": [{
                    "id": "c2", "persistentId": "list", "tagName": "ul",
                    "privateStates": [{"id": "__data", "expression": [
                        {"type": "property", "fieldId": "posts", "dataSourceId": "cms", "kind": "list"}
                    ]}],
                    "publicStates": [{"id": "count", "expression": [
                        {"type": "property", "fieldId": "posts", "dataSourceId": "cms", "kind": "list"},
                        {"type": "filter", "id": "size"}
                    ]}]
                }]
            }
        }],
        "dataSources": [{"id": "cms", "type": "graphql", "url": "https://cms/graphql", "method": "POST"}],
        "queries": {"Home": {"cms": "query { posts { title } }"}},
        "types": [{"id": "Query", "dataSourceId": "cms", "fields": [{"id": "posts", "label": "posts", "kind": "list"}]}]
    }"#;

    fn state(component_id: &str, state_id: &str) -> Token {
        Token::State(State {
            component_id: component_id.into(),
            stored_state_id: state_id.into(),
            exposed: true,
            force_kind: None,
            label: None,
        })
    }

    #[test]
    fn test_sibling_path() {
        let path = Path::new("tests/fixtures/basic/countries.site.json");
        assert_eq!(site_stem(path), Some("countries"));
        assert_eq!(site_stem(Path::new("notes.json")), None);
        assert_eq!(
            sibling_path(path, ".expected.txt"),
            PathBuf::from("tests/fixtures/basic/countries.expected.txt")
        );
    }

    #[test]
    fn test_resolve_kinds() {
        let site = SiteDocument::from_json(SITE).unwrap();
        let body = &site.pages[0].component;
        let list = site.find_component("list").unwrap();
        let data = &list.private_states[0].expression;
        assert_eq!(site.expression_result_type(data, body).unwrap().kind, FieldKind::List);
        assert_eq!(
            site.expression_result_type(&[state("list", "__data")], body).unwrap().kind,
            FieldKind::Object
        );
        assert_eq!(site.expression_result_type(&[state("list", "count")], body).unwrap().kind, FieldKind::Scalar);
        assert_eq!(site.expression_result_type(&[state("missing", "count")], body), None);
    }

    #[test]
    fn test_host_lookups() {
        let site = SiteDocument::from_json(SITE).unwrap();
        assert_eq!(site.data_source("cms").unwrap().url, "https://cms/graphql");
        assert!(site.data_source("other").is_none());
        assert_eq!(site.page_query(&site.pages[0])["cms"], "query { posts { title } }");
        let queryables = site.all_queryable_fields();
        assert_eq!(queryables.len(), 1);
        assert_eq!(queryables[0].data_source_id.as_deref(), Some("cms"));
    }

    #[test]
    fn test_filter_kinds() {
        assert_eq!(filter_output_kind("first", FieldKind::List), FieldKind::Object);
        assert_eq!(filter_output_kind("first", FieldKind::Scalar), FieldKind::Scalar);
        assert_eq!(filter_output_kind("where", FieldKind::List), FieldKind::List);
        assert_eq!(filter_output_kind("upcase", FieldKind::Scalar), FieldKind::Scalar);
    }
}
