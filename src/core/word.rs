//! Word entries with inflected variants, e.g. `run^runs^running`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the default form and each variant form.
pub const VARIANT_MARKER: char = '^';

/// A variant request taken from a substitution specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKey {
    /// A digit names the slot directly: `$1`.
    NumericSlot(usize),
    /// A letter is looked up in the variant table: `$p`.
    NamedKey(char),
}

impl VariantKey {
    /// Build a key from one specifier character. Only ASCII digits and
    /// lowercase letters are valid keys.
    pub fn from_char(c: char) -> Option<Self> {
        if let Some(d) = c.to_digit(10) {
            Some(Self::NumericSlot(d as usize))
        } else if c.is_ascii_lowercase() {
            Some(Self::NamedKey(c))
        } else {
            None
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumericSlot(n) => write!(f, "{}", n),
            Self::NamedKey(c) => write!(f, "{}", c),
        }
    }
}

/// Ordered identifier characters; position `i` names variant slot `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantTable {
    identifiers: String,
}

impl VariantTable {
    pub fn new(identifiers: &str) -> Self {
        Self {
            identifiers: identifiers.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.identifiers
    }

    /// Map a key to its slot index, if it names one.
    pub fn slot(&self, key: VariantKey) -> Option<usize> {
        match key {
            VariantKey::NumericSlot(n) => Some(n),
            VariantKey::NamedKey(c) => self.identifiers.chars().position(|id| id == c),
        }
    }
}

/// Why a variant request fell back to the default form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantFallback {
    /// The key is not in the variant table.
    UnknownKey(VariantKey),
    /// The slot exists in the table but the entry has fewer variants.
    OutOfRange(usize),
}

/// One library word or phrase, possibly carrying variant forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordEntry(pub String);

impl WordEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of variant forms, i.e. the number of markers.
    pub fn variant_count(&self) -> usize {
        variant_count(&self.0)
    }

    /// The text before the first marker, or the whole entry.
    pub fn default_form(&self) -> &str {
        default_form(&self.0)
    }
}

impl From<&str> for WordEntry {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WordEntry {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for WordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn variant_count(text: &str) -> usize {
    text.matches(VARIANT_MARKER).count()
}

pub fn default_form(text: &str) -> &str {
    match text.find(VARIANT_MARKER) {
        Some(idx) => &text[..idx],
        None => text,
    }
}

/// Pick the requested form out of `text`.
///
/// Entries without markers come back unchanged. With no key, or when the
/// key can't be honoured, the default form is returned along with the
/// reason for the fallback. An empty variant segment also yields the
/// default, without a fallback reason.
pub fn select_variant<'a>(
    text: &'a str,
    key: Option<VariantKey>,
    table: &VariantTable,
) -> (&'a str, Option<VariantFallback>) {
    let count = variant_count(text);
    if count == 0 {
        return (text, None);
    }

    let default = default_form(text);
    let key = match key {
        Some(key) => key,
        None => return (default, None),
    };

    let slot = match table.slot(key) {
        Some(slot) => slot,
        None => return (default, Some(VariantFallback::UnknownKey(key))),
    };

    if slot >= count {
        return (default, Some(VariantFallback::OutOfRange(slot)));
    }

    // Segment `slot + 1` of the marker split is variant `slot`.
    let form = text
        .split(VARIANT_MARKER)
        .nth(slot + 1)
        .unwrap_or_default();

    if form.is_empty() {
        (default, None)
    } else {
        (form, None)
    }
}
