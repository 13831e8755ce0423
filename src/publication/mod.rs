//! Publication of a site: component rendering, front matter, data files.

mod assemble;
mod front_matter;
mod paths;
mod render;
mod settings;

pub use assemble::Assembler;
pub use front_matter::{get_body_states, get_front_matter, get_permalink, pagination_data, slugify};
pub use paths::{to_path, transform_path, transform_permalink};
pub use render::{serialize_plain, ComponentRenderer};
pub use settings::{parse_setting, seo_states, validate_settings, StoredSetting};

use crate::ast::Page;
use crate::config::Options;
use crate::error::PublishError;
use crate::generate::CompileContext;
use crate::host::{Host, Notification, Notifier, SETTINGS_ERRORS_GROUP};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Html,
    Css,
    Asset,
    Other,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Html => "html",
            FileType::Css => "css",
            FileType::Asset => "asset",
            FileType::Other => "other",
        }
    }
}

/// A file of the published site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedFile {
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub content: String,
}

/// Runs a whole publish pass over the pages of a site
pub struct Publisher<'a, H: Host> {
    options: &'a Options,
    host: &'a H,
}

impl<'a, H: Host> Publisher<'a, H> {
    pub fn new(options: &'a Options, host: &'a H) -> Self {
        Self { options, host }
    }

    /// Publish with a fresh context
    pub fn publish(&self, pages: &[Page], notifier: &mut dyn Notifier) -> Result<Vec<PublishedFile>, PublishError> {
        let mut ctx = CompileContext::new(self.options);
        self.publish_with(&mut ctx, pages, notifier)
    }

    /// Render every page, then assemble the file set. Pages which fail to
    /// compile are reported and left out.
    pub fn publish_with(
        &self,
        ctx: &mut CompileContext,
        pages: &[Page],
        notifier: &mut dyn Notifier,
    ) -> Result<Vec<PublishedFile>, PublishError> {
        let renderer = ComponentRenderer::new(self.host);
        let mut files = Vec::with_capacity(pages.len());
        let mut rendered = Vec::with_capacity(pages.len());

        for page in pages {
            let page = Page {
                settings: validate_settings(&page.settings, notifier),
                ..page.clone()
            };
            match renderer.render_tree(ctx, &page.component) {
                Ok(content) => {
                    let slug = slugify(if page.name.is_empty() { "index" } else { &page.name });
                    log::info!("rendered page {} to /{}.html", page.name, slug);
                    files.push(PublishedFile {
                        path: transform_path(&format!("/{}.html", slug), FileType::Html, self.options),
                        file_type: FileType::Html,
                        content,
                    });
                    rendered.push(page);
                }
                Err(err) if err.is_page_local() => {
                    log::error!("page {} is not published: {}", page.name, err);
                    notifier.notify(Notification::error(
                        format!("Page {}: {}", page.name, err),
                        SETTINGS_ERRORS_GROUP,
                    ));
                }
                Err(err) => return Err(err),
            }
        }

        if self.options.enable_eleventy {
            Assembler::new(self.options, self.host).transform_files(ctx, &rendered, &mut files, notifier)?;
        }
        Ok(files)
    }
}
