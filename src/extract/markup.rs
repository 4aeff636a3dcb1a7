//! Markup stripping for (X)HTML content documents.
//!
//! Produces flat text where every tag boundary becomes a single space.
//! Parsing is lenient: end-tag names are not checked, unknown entities are
//! kept verbatim, and a document quick-xml cannot read at all falls back to
//! a regex that drops anything between `<` and `>`.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use tracing::debug;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("tag pattern is valid"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*);")
        .expect("entity pattern is valid")
});

/// Elements whose text content is never prose
const SKIPPED_ELEMENTS: &[&[u8]] = &[b"script", b"style"];

/// Strip all markup from a document, keeping text content.
pub fn strip_markup(document: &str) -> String {
    match strip_with_reader(document) {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "Markup is not well-formed, using regex fallback");
            strip_with_regex(document)
        }
    }
}

fn strip_with_reader(document: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().check_end_names = false;

    let mut flat = FlatText::with_capacity(document.len() / 2);
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if SKIPPED_ELEMENTS.contains(&e.local_name().as_ref()) {
                    skip_depth += 1;
                }
                flat.gap();
            }
            Event::End(e) => {
                if SKIPPED_ELEMENTS.contains(&e.local_name().as_ref()) {
                    skip_depth = skip_depth.saturating_sub(1);
                }
                flat.gap();
            }
            Event::Empty(_) => flat.gap(),
            Event::Text(t) if skip_depth == 0 => {
                flat.push_unescaped(&String::from_utf8_lossy(&t));
            }
            Event::CData(c) if skip_depth == 0 => {
                flat.push(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(flat.into_string())
}

fn strip_with_regex(document: &str) -> String {
    let mut flat = FlatText::with_capacity(document.len());
    let mut last = 0;
    for tag in TAG_RE.find_iter(document) {
        flat.push_unescaped(&document[last..tag.start()]);
        flat.gap();
        last = tag.end();
    }
    flat.push_unescaped(&document[last..]);
    flat.into_string()
}

/// Text accumulator that turns tag boundaries into at most one space
struct FlatText {
    text: String,
    pending_gap: bool,
}

impl FlatText {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            pending_gap: false,
        }
    }

    fn gap(&mut self) {
        self.pending_gap = true;
    }

    fn push(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        if self.pending_gap
            && !self.text.is_empty()
            && !self.text.ends_with(char::is_whitespace)
            && !chunk.starts_with(char::is_whitespace)
        {
            self.text.push(' ');
        }
        self.pending_gap = false;
        self.text.push_str(chunk);
    }

    fn push_unescaped(&mut self, raw: &str) {
        self.push(&unescape_lenient(raw));
    }

    fn into_string(self) -> String {
        self.text
    }
}

/// Resolve each entity on its own; one that cannot be resolved stays as written
fn unescape_lenient(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    ENTITY_RE.replace_all(raw, |caps: &Captures| {
        let name = &caps[1];
        let resolved = match name.strip_prefix('#') {
            Some(num) => {
                let code = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32).map(String::from)
            }
            None => resolve_entity(name).map(String::from),
        };
        resolved.unwrap_or_else(|| caps[0].to_string())
    })
}

/// XML predefined entities plus the HTML ones common in ebooks
fn resolve_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "shy" => "\u{ad}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "copy" => "\u{a9}",
        "eacute" => "\u{e9}",
        "egrave" => "\u{e8}",
        "aacute" => "\u{e1}",
        "agrave" => "\u{e0}",
        "ouml" => "\u{f6}",
        "uuml" => "\u{fc}",
        "auml" => "\u{e4}",
        "szlig" => "\u{df}",
        _ => return None,
    };
    Some(value)
}
