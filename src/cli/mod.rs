//! Command-line interface for promptfish.
//!
//! `fish` (the default) connects to the library, picks an eligible book and
//! prints one random sentence from it. `list`, `extract` and `config` expose
//! the individual stages for inspection.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use crate::config::{self, Overrides, Settings};
use crate::core::{NullReporter, Orchestrator, RandomSelector, Selector};
use crate::extract::{extract_sentences, SentenceBounds};
use crate::library::{classify, CatalogEntry, CatalogMode, Eligibility};

pub mod render;

use render::ConsoleReporter;

/// promptfish - fish a random sentence out of your ebook library
#[derive(Parser, Debug)]
#[command(name = "promptfish")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host name or address
    #[arg(long, global = true, env = "UNRAID_HOST")]
    pub host: Option<String>,

    /// SSH user
    #[arg(long, global = true, env = "UNRAID_USER")]
    pub user: Option<String>,

    /// SSH password (a key path takes precedence)
    #[arg(long, global = true, env = "UNRAID_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Private key file for SSH
    #[arg(long, global = true, env = "UNRAID_KEY_PATH")]
    pub key_path: Option<PathBuf>,

    /// SSH port
    #[arg(long, global = true, env = "UNRAID_PORT")]
    pub port: Option<u16>,

    /// Library root path on the server
    #[arg(long, global = true, env = "UNRAID_BOOK_PATH")]
    pub root: Option<String>,

    /// Extra subjects to exclude (comma-separated)
    #[arg(long, global = true, env = "EXCLUDE_SUBJECTS")]
    pub exclude_subjects: Option<String>,

    /// Extra title keywords to exclude (comma-separated)
    #[arg(long, global = true, env = "EXCLUDE_TITLE_KEYWORDS")]
    pub exclude_title_keywords: Option<String>,

    /// Extra tags that always count as fiction (comma-separated)
    #[arg(long, global = true, env = "PROMPTFISH_FICTION_TAGS")]
    pub fiction_tags: Option<String>,

    /// How to enumerate the library
    #[arg(long, global = true, value_enum, env = "PROMPTFISH_CATALOG")]
    pub catalog: Option<CatalogArg>,

    /// Treat the root as a local directory instead of connecting over SSH
    #[arg(long, global = true)]
    pub local: bool,

    /// Seed for deterministic selection
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Disable colours
    #[arg(long, global = true)]
    pub plain: bool,

    /// Shortest sentence kept is one character longer than this
    #[arg(long, global = true)]
    pub min_chars: Option<usize>,

    /// Longest sentence kept is one character shorter than this
    #[arg(long, global = true)]
    pub max_chars: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Pick a random book and print one sentence from it (default)
    Fish,

    /// List the books that would be fished from
    List {
        /// Include excluded books, with the reason
        #[arg(short, long)]
        all: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print sentences from a local EPUB file
    Extract {
        /// EPUB file
        file: PathBuf,

        /// Number of random sentences to print (0 prints all, in order)
        #[arg(short, long, default_value = "1")]
        count: usize,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Catalog mode for CLI (maps to CatalogMode)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CatalogArg {
    /// Query metadata.db with sqlite3 on the server
    Calibre,

    /// Recursive file search, no tags
    Find,

    /// Download metadata.db and query it locally
    CalibreLocal,
}

impl From<CatalogArg> for CatalogMode {
    fn from(arg: CatalogArg) -> Self {
        match arg {
            CatalogArg::Calibre => CatalogMode::Calibre,
            CatalogArg::Find => CatalogMode::Find,
            CatalogArg::CalibreLocal => CatalogMode::CalibreLocal,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(mut self) -> Result<ExitCode> {
        if self.plain {
            colored::control::set_override(false);
        }

        let selector = self.selector();
        let command = self.command.take().unwrap_or(Commands::Fish);

        match command {
            Commands::Fish => {
                let settings = self.settings()?;
                fish(&settings, selector).await
            }
            Commands::List { all, json } => {
                let settings = self.settings()?;
                list_books(&settings, all, json).await
            }
            Commands::Extract { file, count } => {
                let bounds = config::load_bounds(self.min_chars, self.max_chars)?;
                extract_file(&file, count, bounds, selector).await
            }
            Commands::Config => {
                let settings = self.settings()?;
                show_config(&settings);
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            user: self.user.clone(),
            port: self.port,
            password: self.password.clone(),
            key_path: self.key_path.clone(),
            root: self.root.clone(),
            catalog: self.catalog.map(Into::into),
            exclude_subjects: self.exclude_subjects.clone(),
            exclude_title_keywords: self.exclude_title_keywords.clone(),
            fiction_tags: self.fiction_tags.clone(),
            min_chars: self.min_chars,
            max_chars: self.max_chars,
            local: self.local,
        }
    }

    fn settings(&self) -> Result<Settings> {
        Ok(config::load(self.overrides())?)
    }

    fn selector(&self) -> Box<dyn Selector> {
        match self.seed {
            Some(seed) => Box::new(RandomSelector::seeded(seed)),
            None => Box::new(RandomSelector::new()),
        }
    }
}

fn orchestrator(settings: &Settings) -> Orchestrator {
    Orchestrator::new(
        settings.transport(),
        settings.catalog_source(),
        settings.filter.clone(),
    )
    .with_bounds(settings.bounds)
}

/// The main flow: fish one prompt
async fn fish(settings: &Settings, mut selector: Box<dyn Selector>) -> Result<ExitCode> {
    render::print_banner();

    let orchestrator = orchestrator(settings);
    let mut reporter = ConsoleReporter::new();
    let outcome = orchestrator
        .fish(selector.as_mut(), &mut reporter)
        .await?;

    render::print_outcome(&outcome);
    Ok(ExitCode::SUCCESS)
}

/// One row of `list --json`
#[derive(Debug, Serialize)]
struct ListedBook<'a> {
    path: &'a str,
    tags: Vec<&'a str>,
    eligibility: Option<Eligibility>,
}

/// JSON rows; decisions are only meaningful when the catalog carries tags
fn listed_rows(
    classified: Vec<(&CatalogEntry, Eligibility)>,
    has_tags: bool,
) -> Vec<ListedBook<'_>> {
    classified
        .into_iter()
        .map(|(entry, decision)| ListedBook {
            path: &entry.path,
            tags: entry.tags.iter().map(String::as_str).collect(),
            eligibility: has_tags.then_some(decision),
        })
        .collect()
}

/// Enumerate and filter without downloading anything
async fn list_books(settings: &Settings, all: bool, json: bool) -> Result<ExitCode> {
    let orchestrator = orchestrator(settings);

    let listing = if json {
        orchestrator.list(&mut NullReporter).await?
    } else {
        orchestrator.list(&mut ConsoleReporter::new()).await?
    };

    let has_tags = settings.catalog.has_tags();
    let entries = if all { &listing.all } else { &listing.eligible };
    let classified = classify(entries, orchestrator.filter());

    if json {
        let rows = listed_rows(classified, has_tags);
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    if listing.is_empty() {
        println!("{}", "No epub files found.".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    for (entry, decision) in classified {
        if all && has_tags {
            let marker = if decision.is_included() {
                "+".green()
            } else {
                "-".red()
            };
            println!("{} {}  {}", marker, entry.path, decision.to_string().dimmed());
        } else {
            println!("{}", entry.path);
        }
    }

    println!(
        "\nTotal: {} books, {} eligible",
        listing.all.len(),
        listing.eligible.len()
    );

    Ok(ExitCode::SUCCESS)
}

/// Run the sentence extractor on a local file
async fn extract_file(
    file: &Path,
    count: usize,
    bounds: SentenceBounds,
    mut selector: Box<dyn Selector>,
) -> Result<ExitCode> {
    let path = file.to_path_buf();
    let sentences = tokio::task::spawn_blocking(move || extract_sentences(&path, &bounds))
        .await
        .context("Extraction task panicked")?;

    let sentences = match sentences {
        Ok(sentences) => sentences,
        Err(e) => {
            render::print_error(&format!("Error reading epub: {}", e));
            return Ok(ExitCode::FAILURE);
        }
    };

    if sentences.is_empty() {
        render::print_error("Could not extract any valid sentences from this book.");
        return Ok(ExitCode::SUCCESS);
    }

    for sentence in pick_sentences(&sentences, count, selector.as_mut()) {
        println!("{}", sentence);
    }

    Ok(ExitCode::SUCCESS)
}

/// `count` distinct sentences chosen by the selector, or all of them in
/// document order when `count` is 0 or covers the whole list
fn pick_sentences<'a>(
    sentences: &'a [String],
    count: usize,
    selector: &mut dyn Selector,
) -> Vec<&'a String> {
    if count == 0 || count >= sentences.len() {
        return sentences.iter().collect();
    }

    let mut remaining: Vec<usize> = (0..sentences.len()).collect();
    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let index = remaining.swap_remove(selector.select(remaining.len()));
        picked.push(&sentences[index]);
    }
    picked
}

/// Show resolved configuration (password redacted)
fn show_config(settings: &Settings) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("  promptfish configuration");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Config file: {}",
        settings
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    match &settings.remote {
        Some(remote) => {
            println!("Remote:");
            println!("  Host:        {}", remote.host);
            println!("  User:        {}", remote.user);
            println!("  Port:        {}", remote.port);
            println!("  Auth:        {}", remote.credentials.describe());
            println!("  Timeout:     {}s", remote.timeout.as_secs());
        }
        None => println!("Remote: (local filesystem)"),
    }
    println!();
    println!("Library:");
    println!("  Root:        {}", settings.root);
    println!("  Catalog:     {}", settings.catalog);
    println!();
    println!("Filter:");
    println!("  Fiction tags:      {}", sorted(settings.filter.fiction_tags()));
    println!("  Excluded subjects: {}", sorted(settings.filter.excluded_subjects()));
    println!(
        "  Title keywords:    {}",
        settings.filter.title_keywords().join(", ")
    );
    println!();
    println!("Sentences:");
    println!(
        "  Length:      {} < chars < {}",
        settings.bounds.min_chars, settings.bounds.max_chars
    );
}

fn sorted<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    let mut values: Vec<&str> = values.into_iter().map(String::as_str).collect();
    values.sort_unstable();
    values.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedSelector;

    #[test]
    fn test_default_command_is_fish() {
        let cli = Cli::try_parse_from(["promptfish", "--root", "/books", "--local"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.local);
    }

    #[test]
    fn test_parse_list_with_global_flags() {
        let cli = Cli::try_parse_from([
            "promptfish",
            "list",
            "--all",
            "--catalog",
            "calibre-local",
            "--seed",
            "7",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::List { all: true, json: false })));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(
            cli.catalog.map(CatalogMode::from),
            Some(CatalogMode::CalibreLocal)
        );
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::try_parse_from([
            "promptfish",
            "--host",
            "tower",
            "--root",
            "/mnt/books",
            "--exclude-subjects",
            "gardening",
            "--port",
            "2200",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.host.as_deref(), Some("tower"));
        assert_eq!(overrides.port, Some(2200));
        assert_eq!(overrides.exclude_subjects.as_deref(), Some("gardening"));
    }

    #[test]
    fn test_pick_sentences_all() {
        let sentences: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let mut selector = FixedSelector(0);
        let all = pick_sentences(&sentences, 0, &mut selector);
        assert_eq!(all, vec!["a", "b", "c"]);

        let more = pick_sentences(&sentences, 10, &mut selector);
        assert_eq!(more.len(), 3);
    }

    #[test]
    fn test_pick_sentences_distinct() {
        let sentences: Vec<String> = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        let mut selector = FixedSelector(0);
        let picked = pick_sentences(&sentences, 2, &mut selector);
        // swap_remove(0) on [0,1,2,3] takes 0 then moves 3 to the front
        assert_eq!(picked, vec!["a", "d"]);
    }

    #[test]
    fn test_listed_rows_carry_filter_decisions() {
        let entries = vec![
            CatalogEntry::new("/b/Dune.epub").with_tags(["Science Fiction"]),
            CatalogEntry::new("/b/Bread.epub").with_tags(["Cooking"]),
        ];
        let config = crate::library::FilterConfig::default();

        let rows = listed_rows(classify(&entries, &config), true);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].path, "/b/Dune.epub");
        assert!(rows[0].eligibility.as_ref().is_some_and(Eligibility::is_included));
        assert!(rows[1].eligibility.as_ref().is_some_and(|e| !e.is_included()));

        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["tags"][0], "science fiction");

        let untagged = listed_rows(classify(&entries, &config), false);
        assert!(untagged.iter().all(|row| row.eligibility.is_none()));
    }
}
