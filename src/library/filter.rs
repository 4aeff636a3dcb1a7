//! Eligibility filter for catalog entries.
//!
//! Decides whether a book is narrative enough to fish a prompt from.
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. Any fiction tag → include (fiction always wins)
//! 2. Any excluded subject → exclude
//! 3. No tags at all → exclude if a title keyword occurs in the file name
//! 4. Otherwise → include

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use super::defaults;

/// Tag and keyword sets the filter works from.
///
/// Built once at startup and passed by reference; additions are merged on
/// top of the built-in defaults and never replace them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    fiction_tags: HashSet<String>,
    excluded_subjects: HashSet<String>,
    title_keywords: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            fiction_tags: defaults::FICTION_TAGS.iter().map(|s| s.to_string()).collect(),
            excluded_subjects: defaults::EXCLUDED_SUBJECTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            title_keywords: defaults::TITLE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FilterConfig {
    /// A config with no tags or keywords at all. Everything is included.
    pub fn empty() -> Self {
        Self {
            fiction_tags: HashSet::new(),
            excluded_subjects: HashSet::new(),
            title_keywords: Vec::new(),
        }
    }

    /// Add fiction tags (normalized to lowercase)
    pub fn with_fiction_tags(mut self, tags: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.fiction_tags.extend(normalize_all(tags));
        self
    }

    /// Add excluded subjects (normalized to lowercase)
    pub fn with_excluded_subjects(
        mut self,
        subjects: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        self.excluded_subjects.extend(normalize_all(subjects));
        self
    }

    /// Append title keywords, keeping order and skipping ones already present
    pub fn with_title_keywords(
        mut self,
        keywords: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        for keyword in normalize_all(keywords) {
            if !self.title_keywords.contains(&keyword) {
                self.title_keywords.push(keyword);
            }
        }
        self
    }

    pub fn fiction_tags(&self) -> &HashSet<String> {
        &self.fiction_tags
    }

    pub fn excluded_subjects(&self) -> &HashSet<String> {
        &self.excluded_subjects
    }

    pub fn title_keywords(&self) -> &[String] {
        &self.title_keywords
    }
}

/// Why an entry was excluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "matched", rename_all = "snake_case")]
pub enum ExcludeReason {
    /// Carried an excluded subject and no fiction tag
    ExcludedSubject(String),

    /// Untagged, and the file name contains a title keyword
    TitleKeyword(String),
}

/// Why an entry was included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "matched", rename_all = "snake_case")]
pub enum IncludeReason {
    /// Fiction override
    FictionTag(String),

    /// No tags and no title keyword hit
    Untagged,

    /// Tagged, but nothing matched either list
    Default,
}

/// Outcome of evaluating one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Include(IncludeReason),
    Exclude(ExcludeReason),
}

impl Eligibility {
    pub fn is_included(&self) -> bool {
        matches!(self, Eligibility::Include(_))
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Include(IncludeReason::FictionTag(tag)) => {
                write!(f, "include (fiction tag '{}')", tag)
            }
            Eligibility::Include(IncludeReason::Untagged) => write!(f, "include (untagged)"),
            Eligibility::Include(IncludeReason::Default) => write!(f, "include"),
            Eligibility::Exclude(ExcludeReason::ExcludedSubject(tag)) => {
                write!(f, "exclude (subject '{}')", tag)
            }
            Eligibility::Exclude(ExcludeReason::TitleKeyword(kw)) => {
                write!(f, "exclude (title keyword '{}')", kw)
            }
        }
    }
}

/// Evaluate an entry against the rule set, reporting which rule decided.
///
/// `tags` must already be lowercase; `file_name_lower` is the lowercased
/// file name the title keywords are matched against.
pub fn evaluate(tags: &BTreeSet<String>, file_name_lower: &str, config: &FilterConfig) -> Eligibility {
    if let Some(tag) = first_match(tags, &config.fiction_tags) {
        return Eligibility::Include(IncludeReason::FictionTag(tag));
    }

    if let Some(tag) = first_match(tags, &config.excluded_subjects) {
        return Eligibility::Exclude(ExcludeReason::ExcludedSubject(tag));
    }

    if tags.is_empty() {
        return match config
            .title_keywords
            .iter()
            .find(|kw| file_name_lower.contains(kw.as_str()))
        {
            Some(kw) => Eligibility::Exclude(ExcludeReason::TitleKeyword(kw.clone())),
            None => Eligibility::Include(IncludeReason::Untagged),
        };
    }

    Eligibility::Include(IncludeReason::Default)
}

/// Boolean form of [`evaluate`]
pub fn is_eligible(tags: &BTreeSet<String>, file_name_lower: &str, config: &FilterConfig) -> bool {
    evaluate(tags, file_name_lower, config).is_included()
}

/// Split a comma-separated override list into trimmed, lowercased items
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn first_match(tags: &BTreeSet<String>, list: &HashSet<String>) -> Option<String> {
    tags.iter().find(|t| list.contains(*t)).cloned()
}

fn normalize_all(items: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
