//! Word library: named word lists, the flat list-file format, and RON loading.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::word::WordEntry;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Named word lists available to substitutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library {
    lists: FxHashMap<String, Vec<WordEntry>>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a list.
    pub fn add_list<I, W>(&mut self, name: &str, entries: I)
    where
        I: IntoIterator<Item = W>,
        W: Into<WordEntry>,
    {
        self.lists
            .insert(name.to_string(), entries.into_iter().map(Into::into).collect());
    }

    pub fn get(&self, name: &str) -> Option<&[WordEntry]> {
        self.lists.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    /// Number of lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// List names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lists.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Combined entry count of the named lists. Unknown names count as empty.
    pub fn joined_len(&self, names: &[&str]) -> usize {
        names
            .iter()
            .map(|name| self.get(name).map_or(0, <[WordEntry]>::len))
            .sum()
    }

    /// Entry at `index` within the union of the named lists, walking the
    /// lists in order. Each list occupies as many indices as it has entries.
    pub fn joined_entry(&self, names: &[&str], mut index: usize) -> Option<&WordEntry> {
        for name in names {
            let entries = match self.get(name) {
                Some(entries) => entries,
                None => continue,
            };
            if index < entries.len() {
                return Some(&entries[index]);
            }
            index -= entries.len();
        }
        None
    }

    /// Merge another library into this one. Lists from `other` replace
    /// lists of the same name.
    pub fn merge(&mut self, other: Library) {
        for (name, entries) in other.lists {
            self.lists.insert(name, entries);
        }
    }

    /// Load a library from a RON map of list name to words.
    pub fn load_from_ron(path: &Path) -> Result<Library, LibraryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a library from a RON string: `{ "animal": ["cat", "dog"] }`.
    pub fn parse_ron(input: &str) -> Result<Library, LibraryError> {
        let lists: FxHashMap<String, Vec<WordEntry>> = ron::from_str(input)?;
        Ok(Library { lists })
    }
}

/// Contents of a word-list file: the lists plus an optional default pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFile {
    pub pattern: Option<String>,
    pub library: Library,
}

impl ListFile {
    pub fn load(path: &Path) -> Result<ListFile, LibraryError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    /// Parse the line-oriented list format.
    ///
    /// - Blank lines and lines starting with `#` are skipped.
    /// - `==name==` opens a new list; following lines are its words.
    /// - Lines before the first header set the pattern (the last one wins).
    pub fn parse(input: &str) -> ListFile {
        let mut file = ListFile::default();
        let mut current: Option<(String, Vec<WordEntry>)> = None;

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = list_header(line) {
                if let Some((name, entries)) = current.take() {
                    file.library.add_list(&name, entries);
                }
                current = Some((name.to_string(), Vec::new()));
                continue;
            }

            match current.as_mut() {
                Some((_, entries)) => entries.push(WordEntry::from(line)),
                None => file.pattern = Some(line.to_string()),
            }
        }

        if let Some((name, entries)) = current {
            file.library.add_list(&name, entries);
        }

        file
    }
}

fn list_header(line: &str) -> Option<&str> {
    if line.len() <= 4 {
        return None;
    }
    line.strip_prefix("==")?.strip_suffix("==")
}
