//! Directive scanning: splits a pattern into plaintext runs and
//! `<substitution>`, `{alternative}`, `[optional]` bodies.

use serde::{Deserialize, Serialize};

/// How a directive's closing delimiter is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// The first closing character ends the directive, even when a
    /// same-kind directive is nested inside it. `{{a|b}|c}` reads as the
    /// alternative `{a|b` followed by the plaintext `|c}`.
    #[default]
    FirstClose,
    /// Same-kind delimiters nest, so `{{a|b}|c}` is one alternative with
    /// the options `{a|b}` and `c`.
    Balanced,
}

/// Kind of a directive, keyed by its opening delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Substitution,
    Alternative,
    Optional,
}

impl DirectiveKind {
    pub fn from_open(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Substitution),
            '{' => Some(Self::Alternative),
            '[' => Some(Self::Optional),
            _ => None,
        }
    }

    pub fn open(&self) -> char {
        match self {
            Self::Substitution => '<',
            Self::Alternative => '{',
            Self::Optional => '[',
        }
    }

    pub fn close(&self) -> char {
        match self {
            Self::Substitution => '>',
            Self::Alternative => '}',
            Self::Optional => ']',
        }
    }
}

/// One piece of a scanned pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text emitted as-is.
    Plain(&'a str),
    /// A directive body, without its delimiters.
    Directive { kind: DirectiveKind, body: &'a str },
    /// An opening delimiter with no closing match. Holds the rest of the
    /// input from the opening character on, which is emitted as plaintext.
    Unterminated(&'a str),
}

const OPENERS: [char; 3] = ['<', '{', '['];

/// Split `input` into tokens, left to right.
pub fn scan(input: &str, mode: MatchMode) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let open_at = match rest.find(&OPENERS[..]) {
            Some(idx) => idx,
            None => {
                tokens.push(Token::Plain(rest));
                break;
            }
        };

        if open_at > 0 {
            tokens.push(Token::Plain(&rest[..open_at]));
            rest = &rest[open_at..];
        }

        let kind = match rest.chars().next().and_then(DirectiveKind::from_open) {
            Some(kind) => kind,
            None => break,
        };

        // Delimiters are ASCII, so byte offsets from here are char-aligned.
        match find_close(&rest[1..], kind, mode) {
            Some(close_at) => {
                tokens.push(Token::Directive {
                    kind,
                    body: &rest[1..1 + close_at],
                });
                rest = &rest[close_at + 2..];
            }
            None => {
                tokens.push(Token::Unterminated(rest));
                break;
            }
        }
    }

    tokens
}

/// Byte offset of the closing delimiter in `body_and_rest`.
fn find_close(body_and_rest: &str, kind: DirectiveKind, mode: MatchMode) -> Option<usize> {
    match mode {
        MatchMode::FirstClose => body_and_rest.find(kind.close()),
        MatchMode::Balanced => {
            let mut depth = 0usize;
            for (idx, c) in body_and_rest.char_indices() {
                if c == kind.open() {
                    depth += 1;
                } else if c == kind.close() {
                    if depth == 0 {
                        return Some(idx);
                    }
                    depth -= 1;
                }
            }
            None
        }
    }
}

/// Split an alternative body into its options.
///
/// In `FirstClose` mode every `|` separates options. In `Balanced` mode a
/// `|` inside a nested directive that the scanner would close doesn't
/// split; a stray opener with no close is plain text.
pub fn split_options(body: &str, mode: MatchMode) -> Vec<&str> {
    match mode {
        MatchMode::FirstClose => body.split('|').collect(),
        MatchMode::Balanced => {
            let bytes = body.as_bytes();
            let mut options = Vec::new();
            let mut start = 0;
            let mut idx = 0;

            // Delimiters and `|` are ASCII, so byte steps land on char
            // boundaries wherever we slice.
            while idx < bytes.len() {
                let c = bytes[idx] as char;
                if c == '|' {
                    options.push(&body[start..idx]);
                    start = idx + 1;
                } else if let Some(kind) = DirectiveKind::from_open(c) {
                    if let Some(close_at) = find_close(&body[idx + 1..], kind, mode) {
                        idx += close_at + 2;
                        continue;
                    }
                }
                idx += 1;
            }

            options.push(&body[start..]);
            options
        }
    }
}
