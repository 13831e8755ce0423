use super::front_matter::{get_body_states, get_front_matter, slugify};
use super::paths::transform_path;
use super::settings::seo_states;
use super::{FileType, PublishedFile};
use crate::ast::Page;
use crate::config::Options;
use crate::error::PublishError;
use crate::generate::{get_data_file, CompileContext};
use crate::host::{Host, Notification, Notifier, SETTINGS_ERRORS_GROUP};

/// Turns rendered pages into generator input: front matter, body prologue,
/// language variants and data files
pub struct Assembler<'a, H: Host> {
    options: &'a Options,
    host: &'a H,
}

/// Output of one page, before it is written into the file set
struct PageOutput {
    /// Page files, each followed by its data file when there is one
    files: Vec<PublishedFile>,
}

impl<'a, H: Host> Assembler<'a, H> {
    pub fn new(options: &'a Options, host: &'a H) -> Self {
        Self { options, host }
    }

    /// Add front matter and data files to the rendered pages of `files`.
    /// Pages whose settings do not compile are reported and removed.
    pub fn transform_files(
        &self,
        ctx: &mut CompileContext,
        pages: &[Page],
        files: &mut Vec<PublishedFile>,
        notifier: &mut dyn Notifier,
    ) -> Result<(), PublishError> {
        for page in pages {
            let slug = slugify(if page.name.is_empty() { "index" } else { &page.name });
            let path = transform_path(&format!("/{}.html", slug), FileType::Html, self.options);
            let index = files
                .iter()
                .position(|file| file.path == path)
                .ok_or_else(|| PublishError::MissingPageFile(path.clone()))?;
            if files[index].file_type != FileType::Html {
                return Err(PublishError::NotHtml(path));
            }

            match self.page_output(ctx, page, &slug, &files[index]) {
                Ok(output) => {
                    let mut new_files = output.files.into_iter();
                    if let Some(first) = new_files.next() {
                        files[index] = first;
                    }
                    files.extend(new_files);
                }
                Err(err) if err.is_page_local() => {
                    log::error!("page {} is not published: {}", page.name, err);
                    notifier.notify(Notification::error(
                        format!("Page {}: {}", page.name, err),
                        SETTINGS_ERRORS_GROUP,
                    ));
                    files.remove(index);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn page_output(
        &self,
        ctx: &mut CompileContext,
        page: &Page,
        slug: &str,
        page_file: &PublishedFile,
    ) -> Result<PageOutput, PublishError> {
        let settings = &page.settings;
        let body = &page.component;

        let mut query = self.host.page_query(&with_seo_states(page));
        query.retain(|_, payload| !payload.trim().is_empty());
        let data_file = if query.is_empty() {
            None
        } else {
            Some(PublishedFile {
                path: transform_path(&format!("/{}.11tydata.js", slug), FileType::Html, self.options),
                file_type: FileType::Other,
                content: get_data_file(ctx, self.options, self.host, &query)?,
            })
        };

        let languages = settings.languages();
        if languages.is_empty() {
            let front_matter =
                get_front_matter(ctx, self.options, settings, slug, body, Some(&page.name), None)?;
            let mut files = vec![PublishedFile {
                content: format!("{}{}{}", front_matter, get_body_states(body, self.options), page_file.content),
                ..page_file.clone()
            }];
            files.extend(data_file);
            return Ok(PageOutput { files });
        }

        let mut files = Vec::new();
        for lang in &languages {
            let front_matter =
                get_front_matter(ctx, self.options, settings, slug, body, Some(&page.name), Some(lang))?;
            files.push(PublishedFile {
                path: with_suffix(&page_file.path, ".html", lang),
                file_type: FileType::Html,
                content: format!("{}{}{}", front_matter, get_body_states(body, self.options), page_file.content),
            });
            if let Some(data_file) = &data_file {
                files.push(PublishedFile {
                    path: with_suffix(&data_file.path, ".11tydata.js", lang),
                    ..data_file.clone()
                });
            }
        }
        Ok(PageOutput { files })
    }
}

/// The page with its SEO and social sharing expressions added to the body,
/// as hidden public states the query has to cover
fn with_seo_states(page: &Page) -> Page {
    let mut page = page.clone();
    page.component.public_states.extend(seo_states(&page.settings));
    page
}

/// `/a.html` to `/a-fr.html`
fn with_suffix(path: &str, extension: &str, lang: &str) -> String {
    match path.strip_suffix(extension) {
        Some(stem) => format!("{}-{}{}", stem, lang, extension),
        None => path.to_string(),
    }
}
