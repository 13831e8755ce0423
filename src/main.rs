use clap::{Parser, Subcommand};
use eleventy_liquid::host::{DataTree, NotificationKind};
use eleventy_liquid::{
    compile_expression, publish_with, site_stem, Options, PublishError, PublishResult, SiteDocument, SITE_EXTENSION,
};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "eleventy-liquid")]
#[command(about = "Publish visually bound pages as Eleventy templates and data files")]
struct Cli {
    /// Options file (JSON), layered over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish *.site.json documents
    Publish {
        /// Path to a .site.json file or a directory
        path: PathBuf,

        /// Output directory
        #[arg(long, default_value = "_site")]
        out: PathBuf,

        /// Print the published files as JSON instead of writing them
        #[arg(long)]
        json: bool,
    },
    /// Compile one stored expression to a Liquid echo block
    Compile {
        /// Expression as stored by the editor (JSON array of tokens)
        #[arg(long)]
        expression: String,

        /// Component id used to name the variables
        #[arg(long, default_value = "cli")]
        component_id: String,
    },
    /// List the fields pages can be generated from
    Fields {
        /// Path to a .site.json file
        path: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let options = match &cli.config {
        Some(path) => Options::from_file(path).unwrap_or_else(|err| fail(&err, "")),
        None => Options::default(),
    };

    match cli.command {
        Commands::Publish { path, out, json } => publish_path(&path, &out, json, &options),
        Commands::Compile {
            expression,
            component_id,
        } => match compile_expression(&expression, &component_id, &options) {
            Ok(block) => println!("{}", block),
            Err(err) => fail(&err, "--expression"),
        },
        Commands::Fields { path } => list_fields(&path),
    }
}

fn fail(err: &PublishError, context: &str) -> ! {
    eprint!("{}", err.render(context, io::stderr().is_terminal()));
    std::process::exit(1);
}

fn publish_path(path: &Path, out: &Path, json: bool, options: &Options) {
    let start = Instant::now();
    if path.is_file() {
        if site_stem(path).is_none() {
            eprintln!("Error: {} is not a {} file", path.display(), SITE_EXTENSION);
            std::process::exit(1);
        }
        let count = publish_file(path, out, json, options);
        if !json {
            print_summary(count, start.elapsed());
        }
    } else if path.is_dir() {
        let mut count = 0;
        let mut sites = 0;
        for entry in WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && site_stem(e.path()).is_some())
        {
            sites += 1;
            count += publish_file(entry.path(), &out.join(site_stem(entry.path()).unwrap_or("site")), json, options);
        }
        if sites == 0 {
            eprintln!("No {} files found in {}", SITE_EXTENSION, path.display());
            std::process::exit(1);
        }
        if !json {
            print_summary(count, start.elapsed());
        }
    } else {
        eprintln!("Error: {} does not exist", path.display());
        std::process::exit(1);
    }
}

/// Publish one site document, returns the number of files written
fn publish_file(path: &Path, out: &Path, json: bool, options: &Options) -> usize {
    let context = path.display().to_string();
    let site = SiteDocument::load(path).unwrap_or_else(|err| fail(&err, &context));
    let result = publish_with(&site, options).unwrap_or_else(|err| fail(&err, &context));
    print_notifications(&result);

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{}", text),
            Err(err) => fail(&PublishError::from(err), &context),
        }
        return result.files.len();
    }

    for file in &result.files {
        let target = out.join(file.path.trim_start_matches('/'));
        if let Err(err) = write_file(&target, &file.content) {
            fail(&PublishError::io(&target, err), &context);
        }
        eprintln!("  ✓ {}", target.display());
    }
    result.files.len()
}

fn write_file(target: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)
}

fn list_fields(path: &Path) {
    let context = path.display().to_string();
    let site = SiteDocument::load(path).unwrap_or_else(|err| fail(&err, &context));
    for field in site.all_queryable_fields() {
        let data_source = field.data_source_id.as_deref().unwrap_or("-");
        println!("{}.{}\t{}", data_source, field.id, field.kind);
    }
}

fn print_notifications(result: &PublishResult) {
    let is_tty = io::stderr().is_terminal();
    for notification in &result.notifications {
        let (label, color) = match notification.kind {
            NotificationKind::Error => ("error", "\x1b[1;31m"),
            NotificationKind::Warning => ("warning", "\x1b[1;33m"),
            NotificationKind::Info => ("info", "\x1b[1;36m"),
        };
        if is_tty {
            eprintln!("{}{}:\x1b[0m [{}] {}", color, label, notification.group, notification.message);
        } else {
            eprintln!("{}: [{}] {}", label, notification.group, notification.message);
        }
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let files_word = if count == 1 { "file" } else { "files" };
    if io::stderr().is_terminal() {
        eprintln!("\n\x1b[1mPublished {} {} in {:.1?}\x1b[0m", count, files_word, elapsed);
    } else {
        eprintln!("\nPublished {} {} in {:.1?}", count, files_word, elapsed);
    }
}
