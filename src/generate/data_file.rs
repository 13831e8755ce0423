use super::{CompileContext, Output};
use crate::ast::{DataSource, DataSourceKind};
use crate::config::{CacheBuster, Options};
use crate::error::PublishError;
use crate::host::DataSources;
use indexmap::IndexMap;

/// JavaScript data file fetching every query of a page.
/// The module exports an async function resolving to `{ <data source id>: data }`.
pub fn get_data_file(
    ctx: &mut CompileContext,
    options: &Options,
    data_sources: &dyn DataSources,
    query: &IndexMap<String, String>,
) -> Result<String, PublishError> {
    let mut fetches = Vec::with_capacity(query.len());
    for (data_source_id, query_str) in query {
        let data_source = data_sources.data_source(data_source_id).ok_or_else(|| {
            log::error!("no data source for id {}", data_source_id);
            PublishError::UnknownDataSource(data_source_id.clone())
        })?;
        fetches.push(query_to_data_file(ctx, options, &data_source, query_str));
    }

    let mut out = Output::new();
    if options.fetch_plugin.is_some() {
        out.line("const EleventyFetch = require('@11ty/eleventy-fetch')");
    }
    out.line("module.exports = async function () {");
    out.indent();
    out.line("const result = {}");
    for fetch in fetches.iter().filter(|fetch| !fetch.is_empty()) {
        for line in fetch.lines() {
            out.line(line);
        }
    }
    out.line("return result");
    out.dedent();
    out.line("}");
    Ok(out.finish())
}

/// Fetch of one query, wrapped in a try/catch which logs and rethrows.
/// Empty for data sources which are not GraphQL.
pub fn query_to_data_file(
    ctx: &mut CompileContext,
    options: &Options,
    data_source: &DataSource,
    query: &str,
) -> String {
    if data_source.kind != DataSourceKind::Graphql {
        log::info!("skipping data source {}, it is not a GraphQL data source", data_source.id);
        return String::new();
    }

    let transport = data_source.transport();
    let url = with_cache_buster(ctx, options.cache_buster, &transport.url);
    let method = if transport.method.is_empty() { "POST" } else { transport.method.as_str() };
    let mut headers = transport.headers.unwrap_or_default();
    if !headers.keys().any(|key| key.eq_ignore_ascii_case("content-type")) {
        log::warn!(
            "no content-type in the headers of data source {}, using application/json. \
             Add a content-type header to the data source to remove this warning",
            data_source.id
        );
        headers.insert("content-type".to_string(), "application/json".to_string());
    }

    let id = js_string(&data_source.id);
    let mut out = Output::new();
    out.line("try {");
    out.indent();
    match &options.fetch_plugin {
        Some(plugin) => {
            out.line(&format!("const json = await EleventyFetch(`{}`, {{", url));
            out.indent();
            // Serializing a map of JSON values cannot fail
            let plugin = serde_json::to_string(plugin).unwrap_or_else(|_| "{}".to_string());
            out.line(&format!("...{},", plugin));
            out.line("type: 'json',");
            out.line("fetchOptions: {");
            out.indent();
            fetch_options(&mut out, &headers, method, query);
            out.dedent();
            out.line("},");
            out.dedent();
            out.line("})");
        }
        None => {
            out.line(&format!("const response = await fetch(`{}`, {{", url));
            out.indent();
            fetch_options(&mut out, &headers, method, query);
            out.dedent();
            out.line("})");
            out.line("if (!response.ok) {");
            out.indent();
            out.line("throw new Error(`HTTP error ${response.status}: ${response.statusText}`)");
            out.dedent();
            out.line("}");
            out.line("const json = await response.json()");
        }
    }
    out.line(&format!("result[{}] = json.data", id));
    out.dedent();
    out.line("} catch (e) {");
    out.indent();
    out.line(&format!(
        "console.error('Error fetching graphql data', e, {}, {})",
        id,
        js_string(&url)
    ));
    out.line("throw e");
    out.dedent();
    out.line("}");
    out.finish()
}

fn fetch_options(out: &mut Output, headers: &IndexMap<String, String>, method: &str, query: &str) {
    out.line("headers: {");
    out.indent();
    for (key, value) in headers {
        // Header values stay template literals so they can read `process.env`
        out.line(&format!("{}: `{}`,", js_string(key), value));
    }
    out.dedent();
    out.line("},");
    out.line(&format!("method: {},", js_string(method)));
    out.line("body: JSON.stringify({");
    out.indent();
    out.line(&format!("query: `{}`,", escape_template(query)));
    out.dedent();
    out.line("}),");
}

fn with_cache_buster(ctx: &CompileContext, cache_buster: CacheBuster, url: &str) -> String {
    let value = match cache_buster {
        CacheBuster::None => return url.to_string(),
        CacheBuster::Build => ctx.build_id(),
        CacheBuster::Random => match getrandom::u32() {
            Ok(value) => value % 1_000_000,
            Err(err) => {
                log::warn!("no random source for the cache buster, using the build id: {}", err);
                ctx.build_id()
            }
        },
    };
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}cache_buster={}", url, separator, value)
}

/// Single quoted JavaScript string literal
fn js_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Escape text for a JavaScript template literal
fn escape_template(value: &str) -> String {
    value.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}
