//! Binary to generate/update .expected.txt and .expected.err fixture files
//!
//! Usage:
//!   cargo run --bin accept_expected               # Update all
//!   cargo run --bin accept_expected -- languages  # Update only fixtures matching "languages"

use eleventy_liquid::config::CacheBuster;
use eleventy_liquid::generate::CompileContext;
use eleventy_liquid::{publish_in, sibling_path, Options, SiteDocument, SITE_EXTENSION};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixtures_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(SITE_EXTENSION))
    {
        let path = entry.path();
        let path_str = path.to_string_lossy();

        // Apply filter if provided
        if let Some(ref f) = filter {
            if !path_str.contains(f) {
                skipped += 1;
                continue;
            }
        }

        process_file(path);
        updated += 1;
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn process_file(path: &Path) {
    let options_path = sibling_path(path, ".options.json");
    let options = if options_path.exists() {
        match Options::from_file(&options_path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Failed to read {:?}: {}", options_path, e);
                return;
            }
        }
    } else {
        Options::default()
    };
    let mut options = options;
    if options.cache_buster == CacheBuster::Random {
        options.cache_buster = CacheBuster::None;
    }

    let site = match SiteDocument::load(path) {
        Ok(site) => site,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return;
        }
    };

    let is_error_test = path.to_string_lossy().contains("/errors/");
    let mut ctx = CompileContext::with_build_id(&options, 0);

    match publish_in(&mut ctx, &site, &options) {
        Ok(result) => {
            if is_error_test {
                eprintln!("ERROR: {:?} published but is in errors/", path);
                return;
            }
            let expected = sibling_path(path, ".expected.txt");
            write(&expected, &result.snapshot());

            // Remove any stale .expected.err if this now publishes
            let expected_err = sibling_path(path, ".expected.err");
            if expected_err.exists() {
                let _ = fs::remove_file(&expected_err);
            }
        }
        Err(e) => {
            if is_error_test {
                write(&sibling_path(path, ".expected.err"), &e.render("", false));
            } else {
                eprintln!("ERROR: {:?} failed to publish but is not in errors/: {}", path, e);
            }
        }
    }
}

fn write(path: &Path, content: &str) {
    if let Err(e) = fs::write(path, content) {
        eprintln!("Failed to write {:?}: {}", path, e);
    } else {
        println!("  wrote {}", path.display());
    }
}
