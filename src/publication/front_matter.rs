use super::settings::{parse_setting, StoredSetting};
use crate::ast::{non_empty, Component, PageSettings, Token};
use crate::config::Options;
use crate::error::PublishError;
use crate::generate::{echo_inline, get_liquid_statement_properties, state_variable_name, CompileContext};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_SLUG: Regex = Regex::new(r"[^a-z0-9-]").unwrap();
    static ref DASHES: Regex = Regex::new(r"--+").unwrap();
}

/// File name of a page
pub fn slugify(text: &str) -> String {
    let slug = text.to_lowercase();
    let slug = WHITESPACE.replace_all(&slug, "-");
    let slug = NON_SLUG.replace_all(&slug, "");
    let slug = DASHES.replace_all(&slug, "-");
    slug.trim_matches('-').to_string()
}

/// Permalink of a page, `None` lets the generator derive it from pagination
pub fn get_permalink(
    ctx: &mut CompileContext,
    settings: &PageSettings,
    slug: &str,
    body: &Component,
) -> Result<Option<String>, PublishError> {
    if let Some(raw) = settings.permalink.as_deref() {
        match parse_setting("eleventyPermalink", raw)? {
            Some(StoredSetting::Text(text)) => return Ok(Some(text)),
            Some(StoredSetting::Expression(expression)) => {
                if let [Token::Property(property)] = expression.as_slice() {
                    if property.is_fixed() {
                        return Ok(Some(property.fixed_value()));
                    }
                }
                return Ok(Some(echo_inline(ctx, body, &expression)?));
            }
            None => {}
        }
    }
    if settings.is_collection_page() {
        Ok(None)
    } else if slug == "index" {
        Ok(Some("/index.html".to_string()))
    } else {
        Ok(Some(format!("/{}/index.html", slug)))
    }
}

/// Pagination source as a path in the generator's data: `<data source>.<field>...`
pub fn pagination_data(settings: &PageSettings, options: &Options) -> Result<Option<String>, PublishError> {
    let Some(raw) = non_empty(&settings.page_data) else {
        return Ok(None);
    };
    match parse_setting("eleventyPageData", raw)? {
        None => Ok(None),
        Some(StoredSetting::Text(path)) => Ok(Some(path)),
        Some(StoredSetting::Expression(expression)) => {
            let is_path = expression
                .iter()
                .all(|token| matches!(token, Token::Property(property) if !property.is_fixed()));
            if !is_path {
                return Err(PublishError::InvalidSettings {
                    name: "eleventyPageData".to_string(),
                    reason: "pagination data must be a path to a list, without filters or states".to_string(),
                });
            }
            let path = get_liquid_statement_properties(&expression)?;
            let receiver = match &expression[0] {
                Token::Property(property) => property
                    .data_source_id
                    .as_deref()
                    .filter(|id| !options.is_global_data_source(id)),
                _ => None,
            };
            Ok(Some(match receiver {
                Some(receiver) => format!("{}.{}", receiver, path),
                None => path,
            }))
        }
    }
}

/// Front matter block of a page, terminated by a blank line and `---`
pub fn get_front_matter(
    ctx: &mut CompileContext,
    options: &Options,
    settings: &PageSettings,
    slug: &str,
    body: &Component,
    collection: Option<&str>,
    lang: Option<&str>,
) -> Result<String, PublishError> {
    let mut lines = vec!["---".to_string()];

    if let Some(data) = pagination_data(settings, options)? {
        lines.push("pagination:".to_string());
        lines.push(format!("  data: {}", data));
        lines.push(format!("  size: {}", non_empty(&settings.page_size).unwrap_or("1")));
        if settings.page_reverse {
            lines.push("  reverse: true".to_string());
        }
    }
    if let Some(permalink) = get_permalink(ctx, settings, slug, body)? {
        lines.push(format!("permalink: \"{}\"", permalink.replace('"', "\\\"")));
    }
    if let Some(lang) = lang.filter(|lang| !lang.is_empty()) {
        lines.push(format!("lang: \"{}\"", lang.replace('"', "\\\"")));
    }
    if let Some(collection) = collection.filter(|collection| !collection.is_empty()) {
        lines.push(format!("collection: \"{}\"", collection.replace('"', "\\\"")));
    }

    let navigation = [
        ("key", &settings.navigation_key),
        ("title", &settings.navigation_title),
        ("order", &settings.navigation_order),
        ("parent", &settings.navigation_parent),
        ("url", &settings.navigation_url),
    ];
    let navigation: Vec<String> = navigation
        .iter()
        .filter_map(|(key, value)| non_empty(value).map(|value| format!("  {}: {}", key, value)))
        .collect();
    if !navigation.is_empty() {
        lines.push("eleventyNavigation:".to_string());
        lines.extend(navigation);
    }

    lines.retain(|line| !line.trim().is_empty());
    lines.extend(["", "---", ""].map(String::from));
    Ok(lines.join("\n"))
}

/// Liquid aliases of the pagination data, for the body's published states
pub fn get_body_states(body: &Component, options: &Options) -> String {
    let has_pagination = body.state("pagination", true).is_some_and(|state| !state.expression.is_empty());
    if !has_pagination {
        return String::new();
    }
    let Some(body_id) = body.persistent_id.as_deref().filter(|id| !id.is_empty()) else {
        log::error!("body has no persistent id, pagination states are not published");
        return String::new();
    };

    let mut aliases = vec![("pagination", "pagination"), ("items", "pagination.items")];
    if options.alias_pagination_pages {
        aliases.push(("pages", "pagination.pages"));
    }
    aliases
        .iter()
        .map(|(state_id, value)| format!("{{% assign {} = {} %}}\n", state_variable_name(body_id, state_id), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StoredState;
    use indoc::indoc;

    const PAGE_DATA: &str = r#"[{"type": "property", "propType": "field", "fieldId": "continents", "label": "continents",
        "typeIds": ["Continent"], "dataSourceId": "datasourceIdTest", "kind": "list", "options": {"filter": "{}"}}]"#;

    fn body() -> Component {
        Component {
            id: "ccidtest".into(),
            persistent_id: Some("body-id".into()),
            tag_name: Some("body".into()),
            ..Component::default()
        }
    }

    fn ctx() -> CompileContext {
        CompileContext::with_build_id(&Options::default(), 0)
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Page 1"), "page-1");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("--a -- b--"), "a-b");
        assert_eq!(slugify("Été"), "t");
    }

    #[test]
    fn test_permalink_defaults() {
        let settings = PageSettings::default();
        assert_eq!(get_permalink(&mut ctx(), &settings, "index", &body()).unwrap().as_deref(), Some("/index.html"));
        assert_eq!(
            get_permalink(&mut ctx(), &settings, "page-1", &body()).unwrap().as_deref(),
            Some("/page-1/index.html")
        );
        let collection = PageSettings {
            page_data: Some(PAGE_DATA.into()),
            ..PageSettings::default()
        };
        assert_eq!(get_permalink(&mut ctx(), &collection, "page-1", &body()).unwrap(), None);
    }

    #[test]
    fn test_front_matter_plain_page() {
        let front_matter = get_front_matter(
            &mut ctx(),
            &Options::default(),
            &PageSettings::default(),
            "page-1",
            &body(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(front_matter, "---\npermalink: \"/page-1/index.html\"\n\n---\n");
    }

    #[test]
    fn test_front_matter_collection_page() {
        let settings = PageSettings {
            page_data: Some(PAGE_DATA.into()),
            ..PageSettings::default()
        };
        let front_matter = get_front_matter(
            &mut ctx(),
            &Options::default(),
            &settings,
            "page-1",
            &body(),
            Some("collectionTest"),
            None,
        )
        .unwrap();
        assert_eq!(
            front_matter,
            indoc! {r#"
                ---
                pagination:
                  data: datasourceIdTest.continents
                  size: 1
                collection: "collectionTest"

                ---
            "#}
        );
    }

    #[test]
    fn test_front_matter_permalink_expression() {
        let settings = PageSettings {
            permalink: Some(PAGE_DATA.into()),
            ..PageSettings::default()
        };
        let front_matter =
            get_front_matter(&mut ctx(), &Options::default(), &settings, "page-1", &body(), None, None).unwrap();
        assert!(front_matter.contains(
            r#"permalink: "{% assign var_ccidtest_0 = datasourceIdTest.continents %}{{ var_ccidtest_0 }}""#
        ));
    }

    #[test]
    fn test_front_matter_fixed_permalink() {
        let settings = PageSettings {
            permalink: Some(
                r#"[{"type": "property", "fieldId": "fixed", "label": "Fixed value", "kind": "scalar",
                     "options": {"value": "/test/"}}]"#
                    .into(),
            ),
            ..PageSettings::default()
        };
        let front_matter =
            get_front_matter(&mut ctx(), &Options::default(), &settings, "page-1", &body(), None, None).unwrap();
        assert!(front_matter.contains("permalink: \"/test/\""));
    }

    #[test]
    fn test_front_matter_language_and_navigation() {
        let settings = PageSettings {
            page_data: Some("directus.posts".into()),
            page_size: Some("10".into()),
            page_reverse: true,
            navigation_key: Some("Blog".into()),
            navigation_order: Some("2".into()),
            ..PageSettings::default()
        };
        let front_matter =
            get_front_matter(&mut ctx(), &Options::default(), &settings, "blog", &body(), None, Some("fr")).unwrap();
        assert_eq!(
            front_matter,
            indoc! {r#"
                ---
                pagination:
                  data: directus.posts
                  size: 10
                  reverse: true
                lang: "fr"
                eleventyNavigation:
                  key: Blog
                  order: 2

                ---
            "#}
        );
    }

    #[test]
    fn test_front_matter_escapes_quotes() {
        let front_matter = get_front_matter(
            &mut ctx(),
            &Options::default(),
            &PageSettings::default(),
            "index",
            &body(),
            Some("My \"best\" page"),
            Some("e\"n"),
        )
        .unwrap();
        assert!(front_matter.contains("lang: \"e\\\"n\"\n"));
        assert!(front_matter.contains("collection: \"My \\\"best\\\" page\"\n"));
    }

    #[test]
    fn test_pagination_data_rejects_filters() {
        let settings = PageSettings {
            page_data: Some(
                r#"[{"type": "property", "fieldId": "posts", "dataSourceId": "cms", "kind": "list"},
                    {"type": "filter", "id": "first"}]"#
                    .into(),
            ),
            ..PageSettings::default()
        };
        let err = pagination_data(&settings, &Options::default()).unwrap_err();
        assert!(matches!(err, PublishError::InvalidSettings { .. }));
    }

    #[test]
    fn test_body_states() {
        let mut body = body();
        body.public_states.push(StoredState::new("pagination", serde_json::from_str(PAGE_DATA).unwrap()));
        assert_eq!(
            get_body_states(&body, &Options::default()),
            indoc! {"
                {% assign state_body-id_pagination = pagination %}
                {% assign state_body-id_items = pagination.items %}
                {% assign state_body-id_pages = pagination.pages %}
            "}
        );

        let options = Options {
            alias_pagination_pages: false,
            ..Options::default()
        };
        assert!(!get_body_states(&body, &options).contains("pages"));

        body.persistent_id = None;
        assert_eq!(get_body_states(&body, &Options::default()), "");
    }
}
