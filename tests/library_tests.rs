/// Library loading and linting integration tests.
use madlib_engine::core::directive::MatchMode;
use madlib_engine::core::library::{Library, ListFile};
use madlib_engine::core::lint::{lint, LintIssue, Severity};
use std::path::Path;

#[test]
fn list_file_fixture_loads() {
    let file = ListFile::load(Path::new("tests/fixtures/test_lists.txt")).unwrap();
    assert_eq!(
        file.pattern.as_deref(),
        Some("The <animal> <verb$s> over <thing$A>.")
    );
    assert_eq!(file.library.names(), vec!["animal", "colour", "thing", "verb"]);

    let verbs = file.library.get("verb").unwrap();
    assert_eq!(verbs.len(), 2);
    assert_eq!(verbs[0].variant_count(), 2);
    assert_eq!(verbs[0].default_form(), "jump");
}

#[test]
fn ron_fixture_loads() {
    let lib = Library::load_from_ron(Path::new("tests/fixtures/test_library.ron")).unwrap();
    assert_eq!(lib.len(), 2);
    assert_eq!(lib.get("colour").unwrap().len(), 3);
    assert_eq!(lib.joined_len(&["animal", "colour"]), 5);
}

#[test]
fn missing_files_error() {
    assert!(ListFile::load(Path::new("tests/fixtures/nope.txt")).is_err());
    assert!(Library::load_from_ron(Path::new("tests/fixtures/nope.ron")).is_err());
}

#[test]
fn merged_fixtures_keep_later_lists() {
    let mut lib = Library::load_from_ron(Path::new("tests/fixtures/test_library.ron")).unwrap();
    let file = ListFile::load(Path::new("tests/fixtures/test_lists.txt")).unwrap();
    lib.merge(file.library);

    assert_eq!(lib.len(), 4);
    assert_eq!(lib.get("animal").unwrap()[0].as_str(), "fox");
    assert_eq!(lib.get("colour").unwrap().len(), 2);
}

#[test]
fn fixture_lints_clean() {
    let file = ListFile::load(Path::new("tests/fixtures/test_lists.txt")).unwrap();
    let issues = lint(&file.library, file.pattern.as_deref(), MatchMode::FirstClose);
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn sample_libraries_lint_clean() {
    for path in ["library_data/tavern.txt", "library_data/quests.txt"] {
        let file = ListFile::load(Path::new(path)).unwrap();
        assert!(file.pattern.is_some(), "{} has no pattern", path);
        let issues = lint(&file.library, file.pattern.as_deref(), MatchMode::FirstClose);
        assert!(issues.is_empty(), "{}: {:?}", path, issues);
    }
}

#[test]
fn lint_flags_broken_pattern_against_fixture() {
    let file = ListFile::load(Path::new("tests/fixtures/test_lists.txt")).unwrap();
    let issues = lint(
        &file.library,
        Some("<animal> <fish> [never closed"),
        MatchMode::FirstClose,
    );

    assert!(issues.contains(&LintIssue::MissingList {
        list: "fish".to_string(),
        source: "pattern".to_string(),
    }));
    assert!(issues.contains(&LintIssue::Unterminated {
        text: "[never closed".to_string(),
        source: "pattern".to_string(),
    }));
    // Only list entries still mention colour.
    assert!(issues.contains(&LintIssue::UnusedList("verb".to_string())));
    assert!(issues.contains(&LintIssue::UnusedList("thing".to_string())));
    assert!(!issues.contains(&LintIssue::UnusedList("colour".to_string())));
    assert_eq!(
        issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
            .count(),
        1
    );
}

#[test]
fn join_with_one_known_list_only_warns() {
    let file = ListFile::load(Path::new("tests/fixtures/test_lists.txt")).unwrap();
    let issues = lint(
        &file.library,
        Some("<animal+beast> <verb> <thing>"),
        MatchMode::FirstClose,
    );

    assert_eq!(
        issues,
        vec![LintIssue::MissingJoinMember {
            list: "beast".to_string(),
            join: "animal+beast".to_string(),
            source: "pattern".to_string(),
        }]
    );
    assert!(issues.iter().all(|i| i.severity() == Severity::Warning));
}
