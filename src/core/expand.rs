//! Pattern expansion: the parser and the three directive resolvers.
//!
//! The parser scans a string into plaintext and directives, hands each
//! directive body to its resolver, and every resolver feeds its chosen
//! text back through the parser. Expansion is bounded by a depth limit so
//! a list that refers to itself can't recurse forever.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::core::directive::{scan, split_options, DirectiveKind, MatchMode, Token};
use crate::core::library::Library;
use crate::core::log::Logger;
use crate::core::word::{select_variant, VariantFallback, VariantKey, VariantTable};

/// Text substituted for a reference to a list with nothing to offer.
pub const MISSING: &str = "MISSING";

/// Default maximum nesting of parser calls.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Inclusion chance for `[text]` without an explicit `%chance`.
const DEFAULT_CHANCE: i64 = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),
}

/// Post-processing requested by a `$...` suffix on a substitution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Specifier {
    /// `A`: prefix "a" or "an".
    pub article: bool,
    /// `U`: upper-case the first character.
    pub upper: bool,
    /// First lowercase letter or digit, if any.
    pub key: Option<VariantKey>,
}

impl Specifier {
    pub fn parse(spec: &str) -> Self {
        Self {
            article: spec.contains('A'),
            upper: spec.contains('U'),
            key: spec
                .chars()
                .find(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                .and_then(VariantKey::from_char),
        }
    }
}

/// Split `name$spec` at the rightmost `$` that is followed by an ASCII
/// letter or digit. Returns the name and everything after the `$`.
pub fn split_specifier(body: &str) -> (&str, Option<&str>) {
    let bytes = body.as_bytes();
    for (idx, _) in body.rmatch_indices('$') {
        if bytes
            .get(idx + 1)
            .is_some_and(|b| b.is_ascii_alphanumeric())
        {
            return (&body[..idx], Some(&body[idx + 1..]));
        }
    }
    (body, None)
}

/// Prefix "an " before a vowel, "a " otherwise.
pub fn anify(word: &str) -> String {
    let vowel = word
        .chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'));
    if vowel {
        format!("an {}", word)
    } else {
        format!("a {}", word)
    }
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Leading integer of `text`, after optional whitespace and sign.
/// Anything unparseable reads as 0.
fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut value: i64 = 0;
    for d in digits.chars().map_while(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

/// One expansion pass over borrowed engine state.
pub struct Expander<'a, R: Rng> {
    library: &'a Library,
    variants: &'a VariantTable,
    log: &'a Logger,
    rng: &'a mut R,
    mode: MatchMode,
    max_depth: usize,
    depth: usize,
}

impl<'a, R: Rng> Expander<'a, R> {
    pub fn new(
        library: &'a Library,
        variants: &'a VariantTable,
        log: &'a Logger,
        rng: &'a mut R,
    ) -> Self {
        Self {
            library,
            variants,
            log,
            rng,
            mode: MatchMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Expand every directive in `text`, in order.
    pub fn parse(&mut self, text: &str) -> Result<String, ExpandError> {
        if self.depth >= self.max_depth {
            self.log.error(&format!(
                "Recursion limit of {} reached while expanding '{}'",
                self.max_depth, text
            ));
            return Err(ExpandError::RecursionLimitExceeded(self.max_depth));
        }

        self.depth += 1;
        let result = self.parse_tokens(text);
        self.depth -= 1;
        result
    }

    fn parse_tokens(&mut self, text: &str) -> Result<String, ExpandError> {
        let mut output = String::with_capacity(text.len());

        for token in scan(text, self.mode) {
            match token {
                Token::Plain(plain) => output.push_str(plain),
                Token::Unterminated(rest) => {
                    self.log.info(&format!(
                        "'{}' escaped or missing terminator, treating as plaintext.",
                        rest
                    ));
                    output.push_str(rest);
                }
                Token::Directive { kind, body } => {
                    let resolved = match kind {
                        DirectiveKind::Substitution => self.resolve_substitution(body)?,
                        DirectiveKind::Alternative => self.resolve_alternative(body)?,
                        DirectiveKind::Optional => self.resolve_optional(body)?,
                    };
                    output.push_str(&resolved);
                }
            }
        }

        Ok(output)
    }

    /// Resolve `<name>`, `<Name>`, `<a+b>` and `<name$Ap>` style bodies.
    pub fn resolve_substitution(&mut self, body: &str) -> Result<String, ExpandError> {
        let (name, spec) = split_specifier(body);
        let spec = spec.map(Specifier::parse).unwrap_or_default();

        let capitalize = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        let name = if capitalize {
            name.to_lowercase()
        } else {
            name.to_string()
        };

        let library = self.library;
        let entry = if name.contains('+') {
            let names: Vec<&str> = name.split('+').collect();
            let total = library.joined_len(&names);
            if total == 0 {
                self.log.warn(&format!("Missing wordlist: {}", name));
                return Ok(MISSING.to_string());
            }
            let index = self.rng.gen_range(0..total);
            library.joined_entry(&names, index)
        } else {
            library
                .get(&name)
                .and_then(|entries| entries.choose(&mut *self.rng))
        };

        let entry = match entry {
            Some(entry) => entry,
            None => {
                self.log.warn(&format!("Missing wordlist: {}", name));
                return Ok(MISSING.to_string());
            }
        };

        let expanded = self.parse(entry.as_str())?;

        let (form, fallback) = select_variant(&expanded, spec.key, self.variants);
        match fallback {
            Some(VariantFallback::UnknownKey(key)) => self.log.info(&format!(
                "Unknown variant identifier '{}', using default.",
                key
            )),
            Some(VariantFallback::OutOfRange(slot)) => self.log.info(&format!(
                "Variant slot {} not present in '{}', using default.",
                slot, expanded
            )),
            None => {}
        }

        let mut result = form.to_string();
        if spec.article {
            result = anify(&result);
        }
        if spec.upper || capitalize {
            result = capitalize_first(&result);
        }

        Ok(result)
    }

    /// Resolve `{a|b|c}` by picking one option uniformly.
    pub fn resolve_alternative(&mut self, body: &str) -> Result<String, ExpandError> {
        let options = split_options(body, self.mode);
        let choice = options.choose(&mut *self.rng).copied().unwrap_or_default();
        self.parse(choice)
    }

    /// Resolve `[text]` or `[text%chance]`. A draw in `1..=100` at or
    /// below the chance keeps the text.
    pub fn resolve_optional(&mut self, body: &str) -> Result<String, ExpandError> {
        let (text, chance) = match body.find('%') {
            Some(idx) => (&body[..idx], leading_int(&body[idx + 1..])),
            None => (body, DEFAULT_CHANCE),
        };

        let draw: i64 = self.rng.gen_range(1..=100);
        let chosen = if draw <= chance { text } else { "" };
        self.parse(chosen)
    }
}
