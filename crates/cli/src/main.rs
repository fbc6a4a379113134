mod echo;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use folio_core::{
    AllowSet, FolioError, JsonConfig, PipelineConfig, ProfileLoader, SiteOptions, convert_to_json, extract_epub,
    is_epub, process_issue, write_site,
};
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use echo::{
    format_size, print_banner, print_detail, print_error, print_info, print_step, print_success, print_summary,
    print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory inside the output directory that .epub input is unpacked to
const WORK_DIR: &str = ".work";

/// Split a periodical e-book into standalone article pages
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author = "Folio Contributors")]
#[command(version = "1.0.0")]
#[command(about = "Split a periodical e-book into standalone article pages", long_about = None)]
struct Args {
    /// Extracted issue directory or .epub file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output", value_name = "DIR")]
    output: PathBuf,

    /// Profile file with pipeline directives
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Section to keep (repeatable; replaces the default list)
    #[arg(long, value_name = "NAME")]
    allow_section: Vec<String>,

    /// Keep articles from every section
    #[arg(long, conflicts_with = "allow_section")]
    all_sections: bool,

    /// Minimum body length in characters
    #[arg(long, value_name = "NUM")]
    min_body_chars: Option<usize>,

    /// Maximum slug length in characters
    #[arg(long, value_name = "NUM")]
    max_slug_len: Option<usize>,

    /// Length limit for all-caps section labels
    #[arg(long, value_name = "NUM")]
    label_max_chars: Option<usize>,

    /// Absolute URL the site is published under
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Site and feed title
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,

    /// Print the article manifest to stdout
    #[arg(long)]
    json: bool,

    /// Keep the extraction directory for .epub input
    #[arg(long)]
    keep_work: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command-line flags take precedence over profile values
    fn apply(&self, config: &mut PipelineConfig, site: &mut SiteOptions) {
        if self.all_sections {
            config.allow = AllowSet::allow_all();
        } else if !self.allow_section.is_empty() {
            config.allow = AllowSet::new(&self.allow_section);
        }
        if let Some(value) = self.min_body_chars {
            config.min_body_chars = value;
        }
        if let Some(value) = self.max_slug_len {
            config.max_slug_len = value;
        }
        if let Some(value) = self.label_max_chars {
            config.classifier.label_max_chars = value;
        }
        if let Some(url) = &self.base_url {
            site.base_url = Some(url.clone());
        }
        if let Some(title) = &self.title {
            site.title = title.clone();
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Extraction directory for .epub input, removed on drop unless kept
struct WorkDir {
    path: PathBuf,
    keep: bool,
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove work directory");
        }
    }
}

/// Unpack an .epub into the work directory, or use a directory as-is
fn prepare_input(input: &Path, output: &Path, keep_work: bool) -> anyhow::Result<(PathBuf, Option<WorkDir>)> {
    if input.is_dir() {
        return Ok((input.to_path_buf(), None));
    }
    if !input.is_file() {
        anyhow::bail!("Input not found: {}", input.display());
    }
    if !is_epub(input) {
        anyhow::bail!("Input must be a directory or an .epub file: {}", input.display());
    }

    let path = output.join(WORK_DIR);
    if path.exists() {
        fs::remove_dir_all(&path).with_context(|| format!("Failed to clear {}", path.display()))?;
    }
    let work = WorkDir { path: path.clone(), keep: keep_work };
    let count = extract_epub(input, &path).with_context(|| format!("Failed to extract {}", input.display()))?;
    tracing::debug!(entries = count, work = %path.display(), "archive extracted");

    Ok((path, Some(work)))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let started = Instant::now();

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    if args.verbose {
        print_step(1, 4, "Loading profile");
    }

    let mut loader = ProfileLoader::with_user_profile();
    if let Some(path) = &args.profile {
        loader.add_file(path);
    }
    let profile = loader.load().context("Failed to load profile")?;

    let mut config = PipelineConfig::default();
    let mut site = SiteOptions::default();
    profile.apply(&mut config);
    profile.apply_site(&mut site);
    args.apply(&mut config, &mut site);

    if args.verbose {
        let allowed = if config.allow.is_allow_all() { "all".to_string() } else { config.allow.names().join(", ") };
        print_detail("Sections", allowed);
        print_detail("Min body", config.min_body_chars);
        eprintln!();
    }

    if args.verbose {
        print_step(2, 4, &format!("Reading {}", args.input.display().bright_white()));
        if let Ok(meta) = fs::metadata(&args.input)
            && meta.is_file()
        {
            print_detail("Size", format_size(meta.len()));
        }
        eprintln!();
    }

    let (root, _work) = prepare_input(&args.input, &args.output, args.keep_work)?;

    let issue = match process_issue(&root, &config) {
        Ok(issue) => issue,
        Err(FolioError::NoArticles) => {
            print_error("No articles survived segmentation and filtering");
            anyhow::bail!("Nothing to write for {}", args.input.display());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to process {}", args.input.display())),
    };

    if args.verbose {
        print_step(3, 4, "Writing site");
    }

    let report = write_site(&root, &args.output, &issue, &site)
        .with_context(|| format!("Failed to write site to {}", args.output.display()))?;

    for name in &report.missing_images {
        print_warning(&format!("Missing image: {}", name));
    }

    if args.json {
        if args.verbose {
            print_step(4, 4, "Printing manifest");
        }
        let json_config = JsonConfig { include_body: false, include_stats: true, pretty: true };
        let manifest = convert_to_json(&site.title, &issue.articles, Some(&issue.stats), &json_config)
            .context("Failed to serialize manifest")?;
        println!("{}", manifest);
    }

    if args.verbose {
        print_summary(&issue.stats, &report, started.elapsed());
    }

    print_success(&format!(
        "{} articles written to {}",
        report.pages,
        args.output.display().bright_white()
    ));

    Ok(())
}
