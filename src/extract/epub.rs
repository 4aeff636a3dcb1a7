//! Minimal EPUB reader.
//!
//! Only what sentence extraction needs: locate the package document through
//! `META-INF/container.xml`, read its manifest, and hand back the textual
//! content documents in manifest order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;
use zip::result::ZipError;
use zip::ZipArchive;

use super::ExtractError;

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Media types treated as prose-bearing documents
const TEXT_MEDIA_TYPES: &[&str] = &["application/xhtml+xml", "text/html"];

/// A manifest item holding (X)HTML text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDocument {
    /// Manifest id
    pub id: String,

    /// Path of the document inside the archive
    pub path: String,

    /// Declared media type
    pub media_type: String,
}

/// An opened EPUB archive
pub struct EpubBundle<R: Read + Seek> {
    archive: ZipArchive<R>,
    documents: Vec<ContentDocument>,
}

impl EpubBundle<BufReader<File>> {
    /// Open an EPUB file from disk
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let file = File::open(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> EpubBundle<R> {
    /// Read an EPUB from any seekable source
    pub fn from_reader(reader: R) -> Result<Self, ExtractError> {
        let mut archive = ZipArchive::new(reader)?;

        let container = read_entry(&mut archive, CONTAINER_PATH)?
            .ok_or_else(|| ExtractError::MissingEntry(CONTAINER_PATH.to_string()))?;
        let package_path = parse_rootfile(&container)?;

        let package = read_entry(&mut archive, &package_path)?
            .ok_or_else(|| ExtractError::MissingEntry(package_path.clone()))?;
        let base_dir = match package_path.rfind('/') {
            Some(idx) => &package_path[..idx],
            None => "",
        };
        let documents = parse_manifest(&package, &package_path, base_dir)?;

        Ok(Self { archive, documents })
    }

    /// Textual content documents, in manifest order
    pub fn documents(&self) -> &[ContentDocument] {
        &self.documents
    }

    /// Read one content document as text.
    ///
    /// Returns `None` when the manifest points at a file the archive lacks.
    pub fn read_document(&mut self, document: &ContentDocument) -> Result<Option<String>, ExtractError> {
        let content = read_entry(&mut self.archive, &document.path)?;
        if content.is_none() {
            warn!(path = %document.path, "Manifest item missing from archive");
        }
        Ok(content)
    }
}

/// Read an archive entry as UTF-8 (lossy), `None` if absent
fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, ExtractError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;

    let text = String::from_utf8_lossy(&bytes);
    Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
}

/// First `rootfile/@full-path` in container.xml
fn parse_rootfile(container: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(container);

    loop {
        let event = reader.read_event().map_err(|source| ExtractError::Xml {
            entry: CONTAINER_PATH.to_string(),
            source,
        })?;

        match event {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                if let Some(path) = attributes(&e).remove("full-path") {
                    return Ok(path);
                }
            }
            Event::Eof => return Err(ExtractError::NoRootfile),
            _ => {}
        }
    }
}

/// Textual manifest items of the package document
fn parse_manifest(
    package: &str,
    package_path: &str,
    base_dir: &str,
) -> Result<Vec<ContentDocument>, ExtractError> {
    let mut reader = Reader::from_str(package);
    reader.config_mut().check_end_names = false;

    let mut documents = Vec::new();

    loop {
        let event = reader.read_event().map_err(|source| ExtractError::Xml {
            entry: package_path.to_string(),
            source,
        })?;

        match event {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"item" => {
                let mut attrs = attributes(&e);
                let media_type = attrs.remove("media-type").unwrap_or_default();
                let is_nav = attrs
                    .get("properties")
                    .is_some_and(|p| p.split_whitespace().any(|p| p == "nav"));

                if !TEXT_MEDIA_TYPES.contains(&media_type.as_str()) || is_nav {
                    continue;
                }

                let Some(href) = attrs.remove("href") else {
                    continue;
                };

                documents.push(ContentDocument {
                    id: attrs.remove("id").unwrap_or_default(),
                    path: resolve_href(base_dir, &href),
                    media_type,
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(documents)
}

/// Attribute map keyed by local name; malformed attributes are skipped
fn attributes(element: &BytesStart<'_>) -> HashMap<String, String> {
    element
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            (key, value)
        })
        .collect()
}

/// Resolve a manifest href against the package directory.
///
/// Drops any fragment, percent-decodes, and folds `.`/`..` segments.
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let decoded = percent_decode(href);

    let joined = if base_dir.is_empty() || decoded.starts_with('/') {
        decoded.trim_start_matches('/').to_string()
    } else {
        format!("{}/{}", base_dir, decoded)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Percent-decode an href; malformed escapes are kept as written
fn percent_decode(value: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}
