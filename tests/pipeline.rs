//! Pipeline Integration Tests
//!
//! Full fishing runs against a scripted transport and against the local
//! filesystem, covering every way a run can end.

mod common;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use promptfish::adapters::{CommandOutput, LocalTransport, Transport, TransportError};
use promptfish::core::{FixedSelector, Orchestrator, RecordingReporter};
use promptfish::domain::{Progress, RunOutcome};
use promptfish::library::{CatalogMode, CatalogSource, FilterConfig};
use tempfile::TempDir;

use common::{build_epub, write_calibre_db, FixtureBook};

const SENTENCE: &str = "The ferry left without her, and she did not mind at all.";

/// What the scripted transport saw
#[derive(Debug, Default)]
struct TransportLog {
    commands: Vec<String>,
    downloads: Vec<PathBuf>,
}

/// Transport that answers from a script instead of a server
#[derive(Default)]
struct ScriptedTransport {
    /// (command prefix, response)
    responses: Vec<(&'static str, CommandOutput)>,
    /// remote path -> local fixture
    files: HashMap<String, PathBuf>,
    refuse_connection: bool,
    log: Arc<Mutex<TransportLog>>,
}

impl ScriptedTransport {
    fn respond(mut self, prefix: &'static str, stdout: &str, stderr: &str) -> Self {
        self.responses.push((
            prefix,
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                success: stderr.is_empty(),
            },
        ));
        self
    }

    fn serve(mut self, remote: &str, local: &Path) -> Self {
        self.files.insert(remote.to_string(), local.to_path_buf());
        self
    }

    fn log(&self) -> Arc<Mutex<TransportLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn target(&self) -> &str {
        "tower"
    }

    async fn connect(&self) -> Result<(), TransportError> {
        if self.refuse_connection {
            return Err(TransportError::Connect {
                host: "tower".to_string(),
                message: "Permission denied (publickey,password).".to_string(),
            });
        }
        Ok(())
    }

    async fn exec(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.log.lock().unwrap().commands.push(command.to_string());
        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput {
                success: true,
                ..Default::default()
            }))
    }

    async fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), TransportError> {
        self.log
            .lock()
            .unwrap()
            .downloads
            .push(local_path.to_path_buf());

        let source = self.files.get(remote_path).ok_or_else(|| TransportError::Download {
            remote: remote_path.to_string(),
            message: "No such file or directory".to_string(),
        })?;
        std::fs::copy(source, local_path)?;
        Ok(())
    }
}

fn orchestrator(transport: ScriptedTransport, mode: CatalogMode) -> Orchestrator {
    Orchestrator::new(
        Box::new(transport),
        CatalogSource::new("/books", mode),
        FilterConfig::default(),
    )
}

/// sqlite3 CLI output for two books, one of them excluded
const CALIBRE_ROWS: &str = "Cooks/Bread (1)|Bread - Cooks|Cooking|Baking\n\
Ann Author/Night Ferry (2)|Night Ferry - Ann Author|Cooking|Science Fiction\n";

const NOVEL_PATH: &str = "/books/Ann Author/Night Ferry (2)/Night Ferry - Ann Author.epub";

#[tokio::test]
async fn test_no_files_found_stops_before_download() {
    let transport = ScriptedTransport::default().respond("find", "", "");
    let log = transport.log();
    let orchestrator = orchestrator(transport, CatalogMode::Find);

    let mut reporter = RecordingReporter::default();
    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut reporter)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NoFilesFound);
    assert_eq!(outcome.message().as_deref(), Some("No epub files found."));
    assert_eq!(
        reporter.events,
        vec![
            Progress::Connecting {
                target: "tower".to_string()
            },
            Progress::Searching {
                root: "/books".to_string()
            },
        ]
    );
    assert!(log.lock().unwrap().downloads.is_empty());
}

#[tokio::test]
async fn test_search_errors_become_warnings() {
    let transport = ScriptedTransport::default().respond(
        "find",
        "",
        "find: '/books': Permission denied\n",
    );
    let orchestrator = orchestrator(transport, CatalogMode::Find);

    let mut reporter = RecordingReporter::default();
    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut reporter)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NoFilesFound);
    assert!(reporter.events.contains(&Progress::Warning {
        message: "Warning: 'find' command stderr: find: '/books': Permission denied".to_string()
    }));
}

#[tokio::test]
async fn test_search_errors_ignored_when_results_exist() {
    let transport = ScriptedTransport::default().respond(
        "find",
        "/books/a.epub\n",
        "find: '/books/private': Permission denied\n",
    );
    let orchestrator = orchestrator(transport, CatalogMode::Find);

    let listing = orchestrator
        .list(&mut RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(listing.eligible_paths(), vec!["/books/a.epub"]);
    assert!(listing.warnings.is_empty());
}

#[tokio::test]
async fn test_find_mode_skips_filtering() {
    let transport = ScriptedTransport::default().respond(
        "find",
        "/books/The Python Cookbook.epub\n/books/diet.epub\n",
        "",
    );
    let orchestrator = orchestrator(transport, CatalogMode::Find);

    let listing = orchestrator
        .list(&mut RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(listing.all.len(), 2);
    assert_eq!(listing.eligible.len(), 2);
}

#[tokio::test]
async fn test_all_filtered() {
    let transport = ScriptedTransport::default().respond(
        "sqlite3",
        "Cooks/Bread (1)|Bread - Cooks|Cooking\nCooks/Cakes (2)|Cakes - Cooks|Baking\n",
        "",
    );
    let log = transport.log();
    let orchestrator = orchestrator(transport, CatalogMode::Calibre);

    let mut reporter = RecordingReporter::default();
    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut reporter)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::AllFiltered { found: 2 });
    assert!(reporter.events.contains(&Progress::Found { count: 2 }));
    assert!(reporter.events.contains(&Progress::Filtered {
        eligible: 0,
        found: 2
    }));
    assert!(log.lock().unwrap().downloads.is_empty());
}

#[tokio::test]
async fn test_prompt_from_calibre_library() {
    let temp = TempDir::new().unwrap();
    let epub = build_epub(
        temp.path(),
        "novel.epub",
        &[&format!("<p>Hi. {}</p>", SENTENCE)],
    );

    let transport = ScriptedTransport::default()
        .respond("sqlite3", CALIBRE_ROWS, "")
        .serve(NOVEL_PATH, &epub);
    let log = transport.log();
    let orchestrator = orchestrator(transport, CatalogMode::Calibre);

    let mut reporter = RecordingReporter::default();
    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut reporter)
        .await
        .unwrap();

    let prompt = outcome.prompt().expect("a prompt");
    assert_eq!(prompt.sentence, SENTENCE);
    assert_eq!(prompt.book_path, NOVEL_PATH);
    assert_eq!(prompt.book_name, "Night Ferry - Ann Author.epub");
    assert_eq!(prompt.candidates, 1);

    assert_eq!(
        reporter.events[2..],
        [
            Progress::Found { count: 2 },
            Progress::Filtered {
                eligible: 1,
                found: 2
            },
            Progress::Selected {
                book: "Night Ferry - Ann Author.epub".to_string()
            },
            Progress::Downloading {
                book: "Night Ferry - Ann Author.epub".to_string()
            },
            Progress::Extracting,
            Progress::Extracted { count: 1 },
        ]
    );

    let log = log.lock().unwrap();
    assert!(log.commands[0].starts_with("sqlite3 \"/books/metadata.db\""));
    assert_eq!(log.downloads.len(), 1);
    assert!(!log.downloads[0].exists(), "staged file should be removed");
}

#[tokio::test]
async fn test_extraction_failure_is_graceful_and_cleans_up() {
    let temp = TempDir::new().unwrap();
    let bogus = temp.path().join("bogus.epub");
    std::fs::write(&bogus, "definitely not a zip archive").unwrap();

    let transport = ScriptedTransport::default()
        .respond("sqlite3", CALIBRE_ROWS, "")
        .serve(NOVEL_PATH, &bogus);
    let log = transport.log();
    let orchestrator = orchestrator(transport, CatalogMode::Calibre);

    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut RecordingReporter::default())
        .await
        .unwrap();

    match &outcome {
        RunOutcome::ExtractionFailed { book, error } => {
            assert_eq!(book, "Night Ferry - Ann Author.epub");
            assert!(!error.is_empty());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(outcome.message().unwrap().starts_with("Error reading epub: "));

    let log = log.lock().unwrap();
    assert!(!log.downloads[0].exists(), "staged file should be removed");
}

#[tokio::test]
async fn test_book_without_sentences() {
    let temp = TempDir::new().unwrap();
    let epub = build_epub(temp.path(), "short.epub", &["<p>Hi. Bye.</p>"]);

    let transport = ScriptedTransport::default()
        .respond("sqlite3", CALIBRE_ROWS, "")
        .serve(NOVEL_PATH, &epub);
    let orchestrator = orchestrator(transport, CatalogMode::Calibre);

    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::NoSentences {
            book: "Night Ferry - Ann Author.epub".to_string()
        }
    );
}

#[tokio::test]
async fn test_connection_failure_is_an_error() {
    let transport = ScriptedTransport {
        refuse_connection: true,
        ..Default::default()
    };
    let log = transport.log();
    let orchestrator = orchestrator(transport, CatalogMode::Calibre);

    let result = orchestrator
        .fish(&mut FixedSelector(0), &mut RecordingReporter::default())
        .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("Permission denied"));
    assert!(log.lock().unwrap().commands.is_empty());
}

#[tokio::test]
async fn test_download_failure_is_an_error_and_cleans_up() {
    let transport = ScriptedTransport::default().respond("sqlite3", CALIBRE_ROWS, "");
    let log = transport.log();
    let orchestrator = orchestrator(transport, CatalogMode::Calibre);

    let err = orchestrator
        .fish(&mut FixedSelector(0), &mut RecordingReporter::default())
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to download"));
    let log = log.lock().unwrap();
    assert!(!log.downloads[0].exists(), "staged file should be removed");
}

#[tokio::test]
async fn test_calibre_local_mode() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("metadata.db");
    write_calibre_db(
        &db,
        &[
            FixtureBook {
                book_path: "Cooks/Bread (1)",
                file_name: "Bread - Cooks",
                tags: &["Cooking"],
            },
            FixtureBook {
                book_path: "Ann Author/Night Ferry (2)",
                file_name: "Night Ferry - Ann Author",
                tags: &["Science Fiction", "Cooking"],
            },
            FixtureBook {
                book_path: "Nobody/Python Mastering (3)",
                file_name: "Python Mastering - Nobody",
                tags: &[],
            },
        ],
    );

    let transport = ScriptedTransport::default().serve("/books/metadata.db", &db);
    let log = transport.log();
    let orchestrator = orchestrator(transport, CatalogMode::CalibreLocal);

    let listing = orchestrator
        .list(&mut RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(listing.all.len(), 3);
    assert_eq!(listing.eligible_paths(), vec![NOVEL_PATH]);
    assert!(listing.all[1].tags.contains("science fiction"));
    assert!(listing.all[2].tags.is_empty());

    let log = log.lock().unwrap();
    assert!(log.commands.is_empty());
    assert!(!log.downloads[0].exists(), "staged database should be removed");
}

#[tokio::test]
async fn test_calibre_local_missing_database_warns() {
    let transport = ScriptedTransport::default();
    let orchestrator = orchestrator(transport, CatalogMode::CalibreLocal);

    let mut reporter = RecordingReporter::default();
    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut reporter)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NoFilesFound);
    assert!(reporter
        .events
        .iter()
        .any(|e| matches!(e, Progress::Warning { message } if message.contains("metadata.db"))));
}

#[tokio::test]
async fn test_local_filesystem_library() {
    let temp = TempDir::new().unwrap();
    let book_dir = temp.path().join("Ann Author").join("Night Ferry (2)");
    std::fs::create_dir_all(&book_dir).unwrap();
    build_epub(
        &book_dir,
        "Night Ferry - Ann Author.epub",
        &[&format!("<p>{}</p>", SENTENCE)],
    );
    std::fs::write(temp.path().join("notes.txt"), "not a book").unwrap();
    std::fs::write(temp.path().join("SHOUTING.EPUB"), "wrong case").unwrap();

    let root = temp.path().to_string_lossy().into_owned();
    let orchestrator = Orchestrator::new(
        Box::new(LocalTransport::new()),
        CatalogSource::new(root, CatalogMode::Find),
        FilterConfig::default(),
    );

    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut RecordingReporter::default())
        .await
        .unwrap();

    let prompt = outcome.prompt().expect("a prompt");
    assert_eq!(prompt.sentence, SENTENCE);
    assert_eq!(prompt.book_name, "Night Ferry - Ann Author.epub");
}

#[tokio::test]
async fn test_local_calibre_library_end_to_end() {
    let temp = TempDir::new().unwrap();
    write_calibre_db(
        &temp.path().join("metadata.db"),
        &[FixtureBook {
            book_path: "Ann Author/Night Ferry (2)",
            file_name: "Night Ferry - Ann Author",
            tags: &["Fantasy"],
        }],
    );
    let book_dir = temp.path().join("Ann Author").join("Night Ferry (2)");
    std::fs::create_dir_all(&book_dir).unwrap();
    build_epub(
        &book_dir,
        "Night Ferry - Ann Author.epub",
        &[&format!("<p>{}</p>", SENTENCE)],
    );

    let root = temp.path().to_string_lossy().into_owned();
    let orchestrator = Orchestrator::new(
        Box::new(LocalTransport::new()),
        CatalogSource::new(root, CatalogMode::CalibreLocal),
        FilterConfig::default(),
    );

    let outcome = orchestrator
        .fish(&mut FixedSelector(0), &mut RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(outcome.prompt().map(|p| p.sentence.as_str()), Some(SENTENCE));
}
