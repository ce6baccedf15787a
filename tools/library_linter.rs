//! Library Linter: validates word-list references and coverage.
//!
//! Usage: library_linter <library_path> [--pattern <text>] [--balanced]
//!
//! `library_path` may be a single file or a directory, which is searched
//! recursively for `.txt` word-list files and `.ron` libraries.

use madlib_engine::core::directive::MatchMode;
use madlib_engine::core::library::{Library, ListFile};
use madlib_engine::core::lint::{lint, Severity};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: library_linter <library_path> [--pattern <text>] [--balanced]");
        process::exit(0);
    }

    let library_path = &args[1];
    let mut pattern = None;
    let mut mode = MatchMode::FirstClose;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--pattern" && i + 1 < args.len() {
            i += 1;
            pattern = Some(args[i].clone());
        } else if args[i] == "--balanced" {
            mode = MatchMode::Balanced;
        }
        i += 1;
    }

    let mut library = Library::default();
    let mut file_pattern = None;
    let path = Path::new(library_path);

    if path.is_file() {
        if let Err(e) = load_file(path, &mut library, &mut file_pattern) {
            eprintln!("ERROR: Failed to load library file: {}", e);
            process::exit(1);
        }
    } else if path.is_dir() {
        load_recursive(path, &mut library, &mut file_pattern);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", library_path);
        process::exit(1);
    }

    println!("Loaded {} word lists", library.len());

    let pattern = pattern.or(file_pattern);
    match pattern {
        Some(ref p) => println!("Checking pattern: {}", p),
        None => println!("No pattern found; unused-list checks skipped"),
    }

    let issues = lint(&library, pattern.as_deref(), mode);
    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .collect();
    let warnings: Vec<_> = issues
        .iter()
        .filter(|i| i.severity() == Severity::Warning)
        .collect();

    println!("\n=== Library Lint Report ===\n");

    if issues.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_file(
    path: &Path,
    library: &mut Library,
    pattern: &mut Option<String>,
) -> Result<(), madlib_engine::core::library::LibraryError> {
    if path.extension().and_then(|s| s.to_str()) == Some("ron") {
        library.merge(Library::load_from_ron(path)?);
    } else {
        let file = ListFile::load(path)?;
        library.merge(file.library);
        if file.pattern.is_some() {
            *pattern = file.pattern;
        }
    }
    Ok(())
}

fn load_recursive(dir: &Path, library: &mut Library, pattern: &mut Option<String>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_recursive(&path, library, pattern);
                continue;
            }
            let ext = path.extension().and_then(|s| s.to_str());
            if ext != Some("txt") && ext != Some("ron") {
                continue;
            }
            match load_file(&path, library, pattern) {
                Ok(()) => println!("  Loaded: {}", path.display()),
                Err(e) => eprintln!("  ERROR loading {}: {}", path.display(), e),
            }
        }
    }
}
