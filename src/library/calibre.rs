//! Calibre library metadata.
//!
//! Calibre keeps its catalog in `<library>/metadata.db`. One query joins
//! books to their EPUB files and tag names, producing one row per book file
//! with the tags concatenated by `|`. The query can run on the server through
//! the `sqlite3` CLI, or locally against a downloaded copy via rusqlite.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::adapters::shell_quote;

/// Database file name inside a Calibre library
pub const METADATA_DB: &str = "metadata.db";

/// Separator used by `GROUP_CONCAT` and by the sqlite3 CLI between columns
pub const FIELD_SEPARATOR: char = '|';

/// One row per (book, EPUB file) with all tag names joined by `|`
pub const EPUB_QUERY: &str = "SELECT b.path, d.name, GROUP_CONCAT(t.name, '|') \
FROM books b \
JOIN data d ON b.id = d.book \
LEFT JOIN books_tags_link btl ON b.id = btl.book \
LEFT JOIN tags t ON btl.tag = t.id \
WHERE d.format = 'EPUB' \
GROUP BY b.id, d.name;";

/// A book file as Calibre describes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibreRow {
    /// Book directory relative to the library root (e.g. "Author/Title (12)")
    pub book_path: String,

    /// File name without the `.epub` extension
    pub file_name: String,

    /// Raw tag names, in whatever case Calibre stored them
    pub tags: Vec<String>,
}

/// Path of metadata.db under a library root
pub fn database_path(root: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), METADATA_DB)
}

/// Shell command that runs the query on the server
pub fn remote_query_command(root: &str) -> String {
    format!(
        "sqlite3 {} {}",
        shell_quote(&database_path(root)),
        shell_quote(EPUB_QUERY)
    )
}

/// Parse sqlite3 CLI output (list mode, `|` separated).
///
/// Blank lines are ignored. Lines without at least a path and a file name
/// cannot be turned into a location and are skipped.
pub fn parse_rows(raw: &str) -> Vec<CalibreRow> {
    raw.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = line.split(FIELD_SEPARATOR);
            let book_path = fields.next()?;
            let Some(file_name) = fields.next() else {
                debug!(line = %line, "Skipping calibre row without a file name");
                return None;
            };

            Some(CalibreRow {
                book_path: book_path.to_string(),
                file_name: file_name.to_string(),
                tags: fields.filter(|t| !t.is_empty()).map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Run the query against a local copy of metadata.db
pub fn query_database(path: &Path) -> Result<Vec<CalibreRow>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open calibre database: {}", path.display()))?;

    let mut stmt = conn
        .prepare(EPUB_QUERY)
        .context("Failed to prepare calibre query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })
        .context("Failed to run calibre query")?;

    let mut result = Vec::new();
    for row in rows {
        let (book_path, file_name, tags) = row.context("Failed to read calibre row")?;
        result.push(CalibreRow {
            book_path,
            file_name,
            tags: tags
                .as_deref()
                .unwrap_or_default()
                .split(FIELD_SEPARATOR)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        });
    }

    Ok(result)
}
