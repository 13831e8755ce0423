//! Publishes visually bound pages as Eleventy input: Liquid templates with
//! front matter, and data files fetching the GraphQL data they consume.

pub mod ast;
pub mod config;
pub mod error;
pub mod generate;
pub mod host;
pub mod html;
pub mod publication;
pub mod site;

pub use config::Options;
pub use error::{ErrorKind, ExpressionError, PublishError};
pub use publication::{FileType, PublishedFile, Publisher};
pub use site::{sibling_path, site_stem, SiteDocument, SITE_EXTENSION};

use ast::Token;
use generate::{echo_block, CompileContext};
use host::{CollectNotifier, Notification};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub files: Vec<PublishedFile>,
    pub notifications: Vec<Notification>,
}

impl PublishResult {
    /// Plain text listing of the files and notifications, as stored in
    /// `.expected.txt` fixtures
    pub fn snapshot(&self) -> String {
        let mut out = String::new();
        for notification in &self.notifications {
            out.push_str(&format!(
                "!!! {}: [{}] {}\n",
                notification.kind.as_str(),
                notification.group,
                notification.message
            ));
        }
        for file in &self.files {
            out.push_str(&format!("=== {} ({})\n{}\n", file.path, file.file_type.as_str(), file.content));
        }
        out
    }
}

/// Publish a site document with the default options
pub fn publish(site: &SiteDocument) -> Result<PublishResult, PublishError> {
    publish_with(site, &Options::default())
}

pub fn publish_with(site: &SiteDocument, options: &Options) -> Result<PublishResult, PublishError> {
    let mut ctx = CompileContext::new(options);
    publish_in(&mut ctx, site, options)
}

/// Publish within an existing context, e.g. one with a known build id
pub fn publish_in(
    ctx: &mut CompileContext,
    site: &SiteDocument,
    options: &Options,
) -> Result<PublishResult, PublishError> {
    let mut notifier = CollectNotifier::new();
    let files = Publisher::new(options, site).publish_with(ctx, &site.pages, &mut notifier)?;
    Ok(PublishResult {
        files,
        notifications: notifier.notifications,
    })
}

/// Compile a stored expression (JSON) to an echo block
pub fn compile_expression(json: &str, component_id: &str, options: &Options) -> Result<String, PublishError> {
    let expression: Vec<Token> = serde_json::from_str(json)?;
    let component = ast::Component {
        id: component_id.to_string(),
        ..ast::Component::default()
    };
    let mut ctx = CompileContext::with_build_id(options, 0);
    Ok(echo_block(&mut ctx, &component, &expression)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_expression() {
        let json = r#"[{"type": "property", "fieldId": "title", "label": "title", "dataSourceId": "cms", "kind": "scalar"},
                       {"type": "filter", "id": "upcase", "label": "upcase"}]"#;
        let block = compile_expression(json, "c1", &Options::default()).unwrap();
        assert!(block.contains("assign var_c1_0 = cms.title | upcase"));
        assert!(block.contains("echo var_c1_0"));
    }

    #[test]
    fn test_compile_expression_errors() {
        let err = compile_expression("[]", "c1", &Options::default()).unwrap_err();
        assert!(matches!(err, PublishError::Expression(ref e) if e.kind == ErrorKind::EmptyExpression));
        let err = compile_expression("not json", "c1", &Options::default()).unwrap_err();
        assert!(matches!(err, PublishError::Json(_)));
    }

    #[test]
    fn test_publish_empty_site() {
        let result = publish(&SiteDocument::default()).unwrap();
        assert!(result.files.is_empty());
        assert!(result.notifications.is_empty());
    }
}
