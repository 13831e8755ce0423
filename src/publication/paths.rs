use super::FileType;
use crate::config::Options;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EDGE_SLASHES: Regex = Regex::new(r"(^/|/$)").unwrap();
    static ref CSS_PREFIX: Regex = Regex::new(r"^/?css/").unwrap();
    static ref ASSETS_PREFIX: Regex = Regex::new(r"^/?assets/").unwrap();
}

/// Absolute path from segments, skipping empty ones
pub fn to_path(segments: &[&str]) -> String {
    let parts: Vec<String> = segments
        .iter()
        .map(|segment| EDGE_SLASHES.replace_all(segment, "").into_owned())
        .filter(|segment| !segment.is_empty())
        .collect();
    format!("/{}", parts.join("/"))
}

/// Where a published file lands in the generator's input tree
pub fn transform_path(path: &str, file_type: FileType, options: &Options) -> String {
    if !options.enable_eleventy {
        return path.to_string();
    }
    let dir = &options.dir;
    match file_type {
        FileType::Html => to_path(&[&dir.input, &dir.silex, &dir.html, path]),
        FileType::Css => to_path(&[&dir.input, &dir.silex, &dir.css, &CSS_PREFIX.replace(path, "")]),
        FileType::Asset => to_path(&[&dir.input, &dir.silex, &dir.assets, &ASSETS_PREFIX.replace(path, "")]),
        FileType::Other => {
            log::warn!("unknown file type in transform path: {}", path);
            path.to_string()
        }
    }
}

/// Public URL of a published file
pub fn transform_permalink(path: &str, file_type: FileType, options: &Options) -> String {
    if !options.enable_eleventy {
        return path.to_string();
    }
    match file_type {
        FileType::Html => to_path(&[path]),
        FileType::Css => to_path(&[&options.urls.css, &CSS_PREFIX.replace(path, "")]),
        FileType::Asset => to_path(&[&options.urls.assets, &ASSETS_PREFIX.replace(path, "")]),
        FileType::Other => {
            log::warn!("unknown file type in transform permalink: {}", path);
            path.to_string()
        }
    }
}
