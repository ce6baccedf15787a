//! Madlib: expand patterns from the command line or an interactive shell.
//!
//! Usage: madlib <library>... [--pattern <text>] [--count <n>] [--seed <n>]
//!               [--variants <chars>] [--log-level <level>] [--config <file.ron>]
//!               [--balanced] [--interactive]
//!
//! Library files ending in `.ron` are read as RON maps; anything else is
//! read in the `==list==` word-list format.
//!
//! Interactive commands:
//!   gen [n]            expand the current pattern n times
//!   parse <text>       expand arbitrary text
//!   pattern <text>     replace the current pattern
//!   variants <chars>   replace the variant identifiers
//!   seed <n>           reseed the RNG
//!   lists              list loaded word lists
//!   help               list commands
//!   quit               exit

use madlib_engine::core::config::EngineConfig;
use madlib_engine::core::directive::MatchMode;
use madlib_engine::core::library::{Library, ListFile};
use madlib_engine::core::log::LogLevel;
use madlib_engine::MadlibEngine;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut library_paths = Vec::new();
    let mut pattern: Option<String> = None;
    let mut count = 1usize;
    let mut config = EngineConfig::default();
    let mut config_path: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut variants: Option<String> = None;
    let mut log_level: Option<LogLevel> = None;
    let mut balanced = false;
    let mut interactive = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pattern" if i + 1 < args.len() => {
                i += 1;
                pattern = Some(args[i].clone());
            }
            "--count" if i + 1 < args.len() => {
                i += 1;
                count = args[i].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --count must be a positive integer");
                    process::exit(1);
                });
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = Some(args[i].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --seed must be an unsigned integer");
                    process::exit(1);
                }));
            }
            "--variants" if i + 1 < args.len() => {
                i += 1;
                variants = Some(args[i].clone());
            }
            "--log-level" if i + 1 < args.len() => {
                i += 1;
                log_level = Some(args[i].parse().unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--balanced" => balanced = true,
            "--interactive" | "-i" => interactive = true,
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
            path => library_paths.push(path.to_string()),
        }
        i += 1;
    }

    if let Some(ref path) = config_path {
        config = EngineConfig::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("ERROR: Failed to load config {}: {}", path, e);
            process::exit(1);
        });
    }
    // Command-line flags override the config file.
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    if let Some(variants) = variants {
        config.variants = variants;
    }
    if let Some(level) = log_level {
        config.log_level = level;
    }
    if balanced {
        config.match_mode = MatchMode::Balanced;
    }

    let (library, file_pattern) = load_libraries(&library_paths);
    let pattern = pattern.or(file_pattern);

    let mut builder = MadlibEngine::builder().config(config).library(library);
    if let Some(ref pattern) = pattern {
        builder = builder.pattern(pattern);
    }
    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    if interactive {
        run_shell(&mut engine);
        return;
    }

    match engine.generate_many(count) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    }
}

fn load_libraries(paths: &[String]) -> (Library, Option<String>) {
    let mut library = Library::default();
    let mut pattern = None;

    for path_str in paths {
        let path = Path::new(path_str);
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            match Library::load_from_ron(path) {
                Ok(lib) => library.merge(lib),
                Err(e) => {
                    eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                    process::exit(1);
                }
            }
        } else {
            match ListFile::load(path) {
                Ok(file) => {
                    library.merge(file.library);
                    if file.pattern.is_some() {
                        pattern = file.pattern;
                    }
                }
                Err(e) => {
                    eprintln!("ERROR: Failed to load {}: {}", path.display(), e);
                    process::exit(1);
                }
            }
        }
    }

    (library, pattern)
}

fn run_shell(engine: &mut MadlibEngine) {
    let list_count = engine.library().map_or(0, Library::len);
    println!("Loaded {} word lists", list_count);
    match engine.pattern() {
        Some(pattern) => println!("Pattern: {}", pattern),
        None => println!("No pattern set. Use 'pattern <text>'."),
    }
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("madlib> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "gen" | "g" => {
                let n = if rest.is_empty() {
                    1
                } else {
                    match rest.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => {
                            println!("Invalid count: {}", rest);
                            continue;
                        }
                    }
                };
                match engine.generate_many(n) {
                    Ok(lines) => {
                        for line in lines {
                            println!("{}", line);
                        }
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "parse" => match engine.parse(rest) {
                Ok(text) => println!("{}", text),
                Err(e) => println!("ERROR: {}", e),
            },
            "pattern" => {
                if rest.is_empty() {
                    println!("Current pattern: {}", engine.pattern().unwrap_or("(none)"));
                    continue;
                }
                engine.set_pattern(rest);
                println!("Pattern set.");
            }
            "variants" => {
                engine.set_variants(rest);
                println!("Variants set to '{}'", rest);
            }
            "seed" => match rest.parse::<u64>() {
                Ok(seed) => {
                    engine.reseed(seed);
                    println!("Seed set to {}", seed);
                }
                Err(_) => println!("Invalid seed: {}", rest),
            },
            "lists" => match engine.library() {
                Some(library) => {
                    for name in library.names() {
                        let size = library.get(name).map_or(0, <[_]>::len);
                        println!("  {} ({} entries)", name, size);
                    }
                }
                None => println!("No library loaded."),
            },
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }
}

fn print_usage() {
    println!("Usage: madlib <library>... [--pattern <text>] [--count <n>] [--seed <n>]");
    println!("              [--variants <chars>] [--log-level <level>] [--config <file.ron>]");
    println!("              [--balanced] [--interactive]");
}

fn print_help() {
    println!("Commands:");
    println!("  gen [n]            expand the current pattern n times");
    println!("  parse <text>       expand arbitrary text");
    println!("  pattern <text>     replace the current pattern");
    println!("  variants <chars>   replace the variant identifiers");
    println!("  seed <n>           reseed the RNG");
    println!("  lists              list loaded word lists");
    println!("  help               show this help");
    println!("  quit               exit");
}
