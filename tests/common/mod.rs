//! Shared fixtures: EPUB archives and Calibre databases built on the fly.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Wrap body markup in an XHTML document
pub fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><style>p {{ margin: 0; }}</style></head>
<body>{}</body>
</html>"#,
        body
    )
}

/// Build an EPUB with one XHTML document per chapter, in manifest order.
///
/// A navigation document and a stylesheet are always included so readers
/// have to skip them.
pub fn build_epub(dir: &Path, name: &str, chapters: &[&str]) -> PathBuf {
    let entries: Vec<(String, String)> = chapters
        .iter()
        .enumerate()
        .map(|(i, body)| (format!("OEBPS/text/ch{}.xhtml", i + 1), xhtml(body)))
        .collect();

    let manifest: String = (1..=chapters.len())
        .map(|i| {
            format!(
                r#"<item id="ch{i}" href="text/ch{i}.xhtml" media-type="application/xhtml+xml"/>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n    ");

    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Fixture</dc:title>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="css" href="style.css" media-type="text/css"/>
    {manifest}
  </manifest>
  <spine>
  </spine>
</package>"#
    );

    let nav = xhtml("<nav><ol><li>Navigation entries must never become a prompt sentence.</li></ol></nav>");

    let mut files = vec![
        ("META-INF/container.xml".to_string(), CONTAINER_XML.to_string()),
        ("OEBPS/content.opf".to_string(), opf),
        ("OEBPS/nav.xhtml".to_string(), nav),
        ("OEBPS/style.css".to_string(), "p { text-indent: 1em; }".to_string()),
    ];
    files.extend(entries);

    write_zip(dir, name, &files)
}

/// Write an archive with the given entries
pub fn write_zip(dir: &Path, name: &str, files: &[(String, String)]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", options.compression_method(CompressionMethod::Stored))
        .unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    for (entry, content) in files {
        zip.start_file(entry.as_str(), options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
    path
}

/// One book in a fixture Calibre library
pub struct FixtureBook<'a> {
    pub book_path: &'a str,
    pub file_name: &'a str,
    pub tags: &'a [&'a str],
}

/// Create a minimal Calibre metadata.db at `path`
pub fn write_calibre_db(path: &Path, books: &[FixtureBook<'_>]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT, path TEXT NOT NULL);
         CREATE TABLE data (id INTEGER PRIMARY KEY, book INTEGER NOT NULL, format TEXT NOT NULL, name TEXT NOT NULL);
         CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
         CREATE TABLE books_tags_link (id INTEGER PRIMARY KEY, book INTEGER NOT NULL, tag INTEGER NOT NULL);",
    )
    .unwrap();

    for (i, book) in books.iter().enumerate() {
        let book_id = i as i64 + 1;
        conn.execute(
            "INSERT INTO books (id, title, path) VALUES (?1, ?2, ?3)",
            rusqlite::params![book_id, book.file_name, book.book_path],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO data (book, format, name) VALUES (?1, 'EPUB', ?2)",
            rusqlite::params![book_id, book.file_name],
        )
        .unwrap();

        for tag in book.tags {
            conn.execute(
                "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
                rusqlite::params![tag],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO books_tags_link (book, tag) SELECT ?1, id FROM tags WHERE name = ?2",
                rusqlite::params![book_id, tag],
            )
            .unwrap();
        }
    }
}
