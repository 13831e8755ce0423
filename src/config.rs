use crate::error::PublishError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// How data file URLs are made unique to bypass HTTP caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBuster {
    None,
    /// A fresh value for every fetch
    #[default]
    Random,
    /// One value for the whole publish pass
    Build,
}

/// Folders of the generator's input tree, relative to each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirOptions {
    pub input: String,
    pub silex: String,
    pub html: String,
    pub css: String,
    pub assets: String,
}

impl Default for DirOptions {
    fn default() -> Self {
        Self {
            input: String::new(),
            silex: String::new(),
            html: String::new(),
            css: "css".to_string(),
            assets: "assets".to_string(),
        }
    }
}

/// Public URL prefixes of published files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlOptions {
    pub css: String,
    pub assets: String,
}

impl Default for UrlOptions {
    fn default() -> Self {
        Self {
            css: "/css".to_string(),
            assets: "/assets".to_string(),
        }
    }
}

/// Configuration of the publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Move files into the generator's input tree and add front matter
    #[serde(rename = "enable11ty")]
    pub enable_eleventy: bool,
    /// Options object of `@11ty/eleventy-fetch`; plain `fetch` is used when unset
    pub fetch_plugin: Option<IndexMap<String, Value>>,
    pub cache_buster: CacheBuster,
    pub dir: DirOptions,
    pub urls: UrlOptions,
    /// Data sources living in the generator's global data, compiled without receiver
    pub global_data_sources: Vec<String>,
    /// Also alias `pagination.pages` in the body prologue
    pub alias_pagination_pages: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enable_eleventy: true,
            fetch_plugin: None,
            cache_buster: CacheBuster::default(),
            dir: DirOptions::default(),
            urls: UrlOptions::default(),
            global_data_sources: vec!["eleventy".to_string()],
            alias_pagination_pages: true,
        }
    }
}

/// Partial folder configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DirPatch {
    pub input: Option<String>,
    pub silex: Option<String>,
    pub html: Option<String>,
    pub css: Option<String>,
    pub assets: Option<String>,
}

/// Partial URL configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UrlPatch {
    pub css: Option<String>,
    pub assets: Option<String>,
}

/// Partial configuration, as users write it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsPatch {
    #[serde(rename = "enable11ty")]
    pub enable_eleventy: Option<bool>,
    pub fetch_plugin: Option<IndexMap<String, Value>>,
    pub cache_buster: Option<CacheBuster>,
    pub dir: Option<DirPatch>,
    pub urls: Option<UrlPatch>,
    pub global_data_sources: Option<Vec<String>>,
    pub alias_pagination_pages: Option<bool>,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl Options {
    /// Layer a partial configuration over this one, field by field.
    /// Lists replace the current value.
    pub fn merge(mut self, patch: OptionsPatch) -> Self {
        set(&mut self.enable_eleventy, patch.enable_eleventy);
        if patch.fetch_plugin.is_some() {
            self.fetch_plugin = patch.fetch_plugin;
        }
        set(&mut self.cache_buster, patch.cache_buster);
        if let Some(dir) = patch.dir {
            set(&mut self.dir.input, dir.input);
            set(&mut self.dir.silex, dir.silex);
            set(&mut self.dir.html, dir.html);
            set(&mut self.dir.css, dir.css);
            set(&mut self.dir.assets, dir.assets);
        }
        if let Some(urls) = patch.urls {
            set(&mut self.urls.css, urls.css);
            set(&mut self.urls.assets, urls.assets);
        }
        set(&mut self.global_data_sources, patch.global_data_sources);
        set(&mut self.alias_pagination_pages, patch.alias_pagination_pages);
        self
    }

    /// Parse a partial configuration and layer it over the defaults
    pub fn from_json(json: &str) -> Result<Self, PublishError> {
        let patch: OptionsPatch =
            serde_json::from_str(json).map_err(|err| PublishError::Config(err.to_string()))?;
        Ok(Options::default().merge(patch))
    }

    pub fn from_file(path: &Path) -> Result<Self, PublishError> {
        let json = std::fs::read_to_string(path).map_err(|err| PublishError::io(path, err))?;
        log::debug!("loading options from {}", path.display());
        Self::from_json(&json)
    }

    pub fn is_global_data_source(&self, id: &str) -> bool {
        self.global_data_sources.iter().any(|global| global == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.enable_eleventy);
        assert_eq!(options.cache_buster, CacheBuster::Random);
        assert_eq!(options.dir.css, "css");
        assert_eq!(options.urls.assets, "/assets");
        assert!(options.is_global_data_source("eleventy"));
        assert!(options.alias_pagination_pages);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let options = Options::from_json(r#"{"dir": {"input": "src"}, "cacheBuster": "build"}"#).unwrap();
        assert_eq!(options.dir.input, "src");
        assert_eq!(options.dir.assets, "assets");
        assert_eq!(options.cache_buster, CacheBuster::Build);
        assert!(options.enable_eleventy);
    }

    #[test]
    fn test_merge_replaces_lists() {
        let options = Options::from_json(r#"{"globalDataSources": ["site"]}"#).unwrap();
        assert_eq!(options.global_data_sources, vec!["site"]);
        assert!(!options.is_global_data_source("eleventy"));
    }

    #[test]
    fn test_fetch_plugin_options() {
        let options = Options::from_json(r#"{"fetchPlugin": {"duration": "1d", "type": "json"}}"#).unwrap();
        let plugin = options.fetch_plugin.unwrap();
        assert_eq!(plugin.keys().collect::<Vec<_>>(), vec!["duration", "type"]);
    }

    #[test]
    fn test_invalid_config() {
        let err = Options::from_json(r#"{"cacheBuster": "sometimes"}"#).unwrap_err();
        assert!(matches!(err, PublishError::Config(_)));
    }
}
