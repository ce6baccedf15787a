//! Static checks over a library and pattern: broken list references, empty
//! and unused lists, recursive lists, unterminated directives.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

use crate::core::directive::{scan, split_options, DirectiveKind, MatchMode, Token};
use crate::core::expand::split_specifier;
use crate::core::library::Library;

/// Where a piece of text came from.
const PATTERN_SOURCE: &str = "pattern";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintIssue {
    /// A substitution names a list the library doesn't have. For a join
    /// this means none of its members exist.
    MissingList { list: String, source: String },
    /// One member of a join is absent; the others still supply words.
    MissingJoinMember {
        list: String,
        join: String,
        source: String,
    },
    /// A list exists but has no entries.
    EmptyList(String),
    /// No pattern or entry refers to the list.
    UnusedList(String),
    /// The list can reach itself through its entries.
    RecursiveList(String),
    /// An opening delimiter without its closing partner.
    Unterminated { text: String, source: String },
}

impl LintIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingList { .. } => Severity::Error,
            Self::MissingJoinMember { .. }
            | Self::EmptyList(_)
            | Self::UnusedList(_)
            | Self::RecursiveList(_)
            | Self::Unterminated { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingList { list, source } => {
                write!(f, "{} references non-existent list '{}'", source, list)
            }
            Self::MissingJoinMember { list, join, source } => write!(
                f,
                "{} joins non-existent list '{}' in '{}'",
                source, list, join
            ),
            Self::EmptyList(list) => write!(f, "list '{}' has no entries", list),
            Self::UnusedList(list) => write!(f, "list '{}' is never referenced", list),
            Self::RecursiveList(list) => {
                write!(f, "list '{}' can expand into itself", list)
            }
            Self::Unterminated { text, source } => {
                write!(f, "{} has an unterminated directive at '{}'", source, text)
            }
        }
    }
}

/// Lists referenced by `text`, one group per substitution (a join gives a
/// group of several names), including references inside alternatives and
/// optionals, plus any unterminated directive text.
pub fn list_references(text: &str, mode: MatchMode) -> (Vec<Vec<String>>, Vec<String>) {
    let mut refs = Vec::new();
    let mut unterminated = Vec::new();
    collect_references(text, mode, &mut refs, &mut unterminated);
    (refs, unterminated)
}

fn collect_references(
    text: &str,
    mode: MatchMode,
    refs: &mut Vec<Vec<String>>,
    unterminated: &mut Vec<String>,
) {
    for token in scan(text, mode) {
        match token {
            Token::Plain(_) => {}
            Token::Unterminated(rest) => unterminated.push(rest.to_string()),
            Token::Directive { kind, body } => match kind {
                DirectiveKind::Substitution => {
                    let (name, _) = split_specifier(body);
                    let name = if name.starts_with(|c: char| c.is_ascii_uppercase()) {
                        name.to_lowercase()
                    } else {
                        name.to_string()
                    };
                    refs.push(name.split('+').map(str::to_string).collect());
                }
                DirectiveKind::Alternative => {
                    for option in split_options(body, mode) {
                        collect_references(option, mode, refs, unterminated);
                    }
                }
                DirectiveKind::Optional => {
                    let text = body.split('%').next().unwrap_or_default();
                    collect_references(text, mode, refs, unterminated);
                }
            },
        }
    }
}

/// Run every check. Unused lists are only reported when a pattern is
/// given, since without one every list is a potential entry point.
pub fn lint(library: &Library, pattern: Option<&str>, mode: MatchMode) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut graph: FxHashMap<&str, FxHashSet<String>> = FxHashMap::default();
    let mut referenced: FxHashSet<String> = FxHashSet::default();

    let check_text = |text: &str, source: &str, issues: &mut Vec<LintIssue>| {
        let (refs, unterminated) = list_references(text, mode);
        for rest in unterminated {
            issues.push(LintIssue::Unterminated {
                text: rest,
                source: source.to_string(),
            });
        }
        for group in &refs {
            let missing: Vec<&String> =
                group.iter().filter(|list| !library.contains(list)).collect();
            if missing.len() == group.len() {
                issues.push(LintIssue::MissingList {
                    list: group.join("+"),
                    source: source.to_string(),
                });
                continue;
            }
            for list in missing {
                issues.push(LintIssue::MissingJoinMember {
                    list: list.clone(),
                    join: group.join("+"),
                    source: source.to_string(),
                });
            }
        }
        refs.into_iter().flatten().collect::<Vec<_>>()
    };

    if let Some(pattern) = pattern {
        referenced.extend(check_text(pattern, PATTERN_SOURCE, &mut issues));
    }

    for name in library.names() {
        let entries = library.get(name).unwrap_or_default();
        if entries.is_empty() {
            issues.push(LintIssue::EmptyList(name.to_string()));
        }

        let source = format!("list '{}'", name);
        let edges = graph.entry(name).or_default();
        for entry in entries {
            let refs = check_text(entry.as_str(), &source, &mut issues);
            edges.extend(refs);
        }
    }

    for edges in graph.values() {
        referenced.extend(edges.iter().cloned());
    }

    for name in library.names() {
        if reaches_itself(&graph, name) {
            issues.push(LintIssue::RecursiveList(name.to_string()));
        }
        if pattern.is_some() && !referenced.contains(name) {
            issues.push(LintIssue::UnusedList(name.to_string()));
        }
    }

    issues
}

fn reaches_itself(graph: &FxHashMap<&str, FxHashSet<String>>, start: &str) -> bool {
    let mut stack: Vec<&str> = match graph.get(start) {
        Some(edges) => edges.iter().map(String::as_str).collect(),
        None => return false,
    };
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    while let Some(node) = stack.pop() {
        if node == start {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(edges) = graph.get(node) {
            stack.extend(edges.iter().map(String::as_str));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Library {
        let mut lib = Library::new();
        lib.add_list("animal", ["cat", "<size> dog"]);
        lib.add_list("size", ["big", "small"]);
        lib
    }

    #[test]
    fn references_cover_nested_directives() {
        let (refs, unterminated) = list_references(
            "<Animal$A> {ran|<verb$s>}[ to <place+town>%40]",
            MatchMode::FirstClose,
        );
        assert_eq!(
            refs,
            vec![
                vec!["animal".to_string()],
                vec!["verb".to_string()],
                vec!["place".to_string(), "town".to_string()],
            ]
        );
        assert!(unterminated.is_empty());
    }

    #[test]
    fn references_report_unterminated() {
        let (refs, unterminated) = list_references("<a> [oops", MatchMode::FirstClose);
        assert_eq!(refs, vec![vec!["a".to_string()]]);
        assert_eq!(unterminated, vec!["[oops"]);
    }

    #[test]
    fn clean_library_has_no_issues() {
        let issues = lint(&library(), Some("A <animal>."), MatchMode::FirstClose);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn missing_list_is_an_error() {
        let issues = lint(&library(), Some("<animal> <colour>"), MatchMode::FirstClose);
        assert_eq!(
            issues,
            vec![LintIssue::MissingList {
                list: "colour".to_string(),
                source: "pattern".to_string(),
            }]
        );
        assert_eq!(issues[0].severity(), Severity::Error);
    }

    #[test]
    fn partly_missing_join_is_a_warning() {
        let mut lib = Library::new();
        lib.add_list("a", ["x"]);
        let issues = lint(&lib, Some("<a+maybe>"), MatchMode::FirstClose);
        assert_eq!(
            issues,
            vec![LintIssue::MissingJoinMember {
                list: "maybe".to_string(),
                join: "a+maybe".to_string(),
                source: "pattern".to_string(),
            }]
        );
        assert_eq!(issues[0].severity(), Severity::Warning);
    }

    #[test]
    fn fully_missing_join_is_an_error() {
        let issues = lint(&library(), Some("<animal> <ghost+shade>"), MatchMode::FirstClose);
        assert_eq!(
            issues,
            vec![LintIssue::MissingList {
                list: "ghost+shade".to_string(),
                source: "pattern".to_string(),
            }]
        );
        assert_eq!(issues[0].severity(), Severity::Error);
    }

    #[test]
    fn empty_and_unused_lists() {
        let mut lib = library();
        lib.add_list("spare", Vec::<String>::new());
        let issues = lint(&lib, Some("<animal>"), MatchMode::FirstClose);
        assert!(issues.contains(&LintIssue::EmptyList("spare".to_string())));
        assert!(issues.contains(&LintIssue::UnusedList("spare".to_string())));
        assert!(issues.iter().all(|i| i.severity() == Severity::Warning));
    }

    #[test]
    fn unused_needs_a_pattern() {
        let issues = lint(&library(), None, MatchMode::FirstClose);
        assert!(issues.is_empty());
    }

    #[test]
    fn recursive_lists_are_flagged() {
        let mut lib = Library::new();
        lib.add_list("a", ["<b>"]);
        lib.add_list("b", ["{end|<a>}"]);
        lib.add_list("c", ["<a>"]);
        let issues = lint(&lib, None, MatchMode::FirstClose);
        assert!(issues.contains(&LintIssue::RecursiveList("a".to_string())));
        assert!(issues.contains(&LintIssue::RecursiveList("b".to_string())));
        assert!(!issues.contains(&LintIssue::RecursiveList("c".to_string())));
    }

    #[test]
    fn display_messages() {
        let issue = LintIssue::MissingList {
            list: "x".to_string(),
            source: "list 'y'".to_string(),
        };
        assert_eq!(issue.to_string(), "list 'y' references non-existent list 'x'");
    }
}
