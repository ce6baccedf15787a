//! The engine: owns a library, a pattern, a variant table, a logger and an
//! RNG, and expands the pattern on demand.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::core::directive::MatchMode;
use crate::core::expand::{ExpandError, Expander};
use crate::core::library::{Library, LibraryError, ListFile};
use crate::core::log::{LogLevel, LogSink, Logger, StderrSink};
use crate::core::word::{VariantTable, WordEntry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("no library defined")]
    NoLibrary,
    #[error("no pattern defined")]
    NoPattern,
    #[error("recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),
}

impl From<ExpandError> for GenerateError {
    fn from(err: ExpandError) -> Self {
        match err {
            ExpandError::RecursionLimitExceeded(limit) => Self::RecursionLimitExceeded(limit),
        }
    }
}

/// A pattern expander. Built via `MadlibEngine::builder()`.
///
/// One engine is meant to be driven from one thread at a time; every
/// method that draws random numbers takes `&mut self`.
pub struct MadlibEngine<R: Rng = StdRng> {
    library: Option<Library>,
    pattern: Option<String>,
    variants: VariantTable,
    log: Logger,
    match_mode: MatchMode,
    max_depth: usize,
    rng: R,
}

/// Builder for constructing a `MadlibEngine`.
pub struct MadlibEngineBuilder {
    pattern: Option<String>,
    library: Option<Library>,
    library_file: Option<String>,
    config: EngineConfig,
    sink: Option<Box<dyn LogSink>>,
}

impl MadlibEngine {
    pub fn builder() -> MadlibEngineBuilder {
        MadlibEngineBuilder {
            pattern: None,
            library: None,
            library_file: None,
            config: EngineConfig::default(),
            sink: None,
        }
    }
}

impl<R: Rng> MadlibEngine<R> {
    /// Expand the stored pattern once.
    pub fn generate(&mut self) -> Result<String, GenerateError> {
        if self.library.is_none() {
            self.log.warn("No library defined.");
            return Err(GenerateError::NoLibrary);
        }
        let pattern = match self.pattern.clone() {
            Some(pattern) => pattern,
            None => {
                self.log.warn("No pattern defined.");
                return Err(GenerateError::NoPattern);
            }
        };
        Ok(self.parse(&pattern)?)
    }

    /// Expand the stored pattern `count` times.
    pub fn generate_many(&mut self, count: usize) -> Result<Vec<String>, GenerateError> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.generate()?);
        }
        Ok(results)
    }

    /// Expand arbitrary text against the current library. Without a
    /// library every substitution comes back as `MISSING`.
    pub fn parse(&mut self, text: &str) -> Result<String, ExpandError> {
        let empty = Library::default();
        let library = self.library.as_ref().unwrap_or(&empty);
        Expander::new(library, &self.variants, &self.log, &mut self.rng)
            .match_mode(self.match_mode)
            .max_depth(self.max_depth)
            .parse(text)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        self.log.debug(&format!("Pattern set to '{}'", pattern));
        self.pattern = Some(pattern);
    }

    pub fn library(&self) -> Option<&Library> {
        self.library.as_ref()
    }

    /// Replace the whole library.
    pub fn set_library(&mut self, library: Library) {
        self.log.debug("Library updated");
        self.library = Some(library);
    }

    /// Insert or replace one list, creating the library if needed.
    pub fn add_list<I, W>(&mut self, name: &str, entries: I)
    where
        I: IntoIterator<Item = W>,
        W: Into<WordEntry>,
    {
        self.log.debug(&format!("Adding list '{}'", name));
        self.library
            .get_or_insert_with(Library::default)
            .add_list(name, entries);
    }

    /// Replace the library with the contents of a list file. A pattern
    /// line in the file replaces the current pattern.
    pub fn load_library_file(&mut self, path: &Path) -> Result<(), LibraryError> {
        self.log
            .info(&format!("Loading word lists from {}", path.display()));
        let file = match ListFile::load(path) {
            Ok(file) => file,
            Err(err) => {
                self.log.warn(&format!("Unable to open file: {}", err));
                return Err(err);
            }
        };

        for name in file.library.names() {
            self.log.debug(&format!("Adding list '{}'", name));
        }
        if let Some(pattern) = file.pattern {
            self.set_pattern(pattern);
        }
        self.library = Some(file.library);
        Ok(())
    }

    pub fn variants(&self) -> &VariantTable {
        &self.variants
    }

    pub fn set_variants(&mut self, identifiers: &str) {
        self.variants = VariantTable::new(identifiers);
    }

    pub fn log_level(&self) -> LogLevel {
        self.log.level()
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log.set_level(level);
        self.log.info(&format!("Loglevel set to '{}'", level));
    }

    pub fn set_sink(&mut self, sink: impl LogSink + 'static) {
        self.log.set_sink(Box::new(sink));
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn set_match_mode(&mut self, mode: MatchMode) {
        self.match_mode = mode;
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }
}

impl<R: Rng + SeedableRng> MadlibEngine<R> {
    /// Restart the random source from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }
}

impl MadlibEngineBuilder {
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn library(mut self, library: Library) -> Self {
        self.library = Some(library);
        self
    }

    /// Load lists (and a default pattern) from a list file at build time.
    /// File lists override same-named lists given via `library`; an
    /// explicit `pattern` wins over the file's pattern.
    pub fn library_file(mut self, path: &str) -> Self {
        self.library_file = Some(path.to_string());
        self
    }

    /// Replace every configurable setting at once. Call before the
    /// individual setters below if combining both.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn variants(mut self, identifiers: &str) -> Self {
        self.config.variants = identifiers.to_string();
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    pub fn sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build with a `StdRng` seeded from the configured seed, or from
    /// system entropy when no seed was given.
    pub fn build(self) -> Result<MadlibEngine, LibraryError> {
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(rng)
    }

    /// Build around a caller-supplied random source.
    pub fn build_with_rng<R: Rng>(self, rng: R) -> Result<MadlibEngine<R>, LibraryError> {
        let sink = self.sink.unwrap_or_else(|| Box::new(StderrSink));
        let log = Logger::new(self.config.log_level, sink);

        let mut library = self.library;
        let mut pattern = self.pattern;

        if let Some(ref path) = self.library_file {
            log.info(&format!("Loading word lists from {}", path));
            let file = ListFile::load(Path::new(path)).map_err(|err| {
                log.warn(&format!("Unable to open file: {}", err));
                err
            })?;
            library
                .get_or_insert_with(Library::default)
                .merge(file.library);
            if pattern.is_none() {
                pattern = file.pattern;
            }
        }

        Ok(MadlibEngine {
            library,
            pattern,
            variants: VariantTable::new(&self.config.variants),
            log,
            match_mode: self.config.match_mode,
            max_depth: self.config.max_depth,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expand::MISSING;
    use crate::core::log::MemorySink;
    use rand::rngs::mock::StepRng;

    fn build_test_engine() -> MadlibEngine {
        let mut library = Library::new();
        library.add_list("animal", ["cat", "dog", "owl"]);
        library.add_list("verb", ["run^runs^running", "leap^leaps^leaping"]);

        MadlibEngine::builder()
            .seed(42)
            .pattern("The <animal> <verb$s>.")
            .library(library)
            .variants("sp")
            .log_level(LogLevel::None)
            .build()
            .unwrap()
    }

    #[test]
    fn generate_produces_output() {
        let mut engine = build_test_engine();
        let result = engine.generate().unwrap();
        assert!(result.starts_with("The "));
        assert!(result.ends_with('.'));
        assert!(!result.contains('<'));
        assert!(!result.contains(MISSING));
    }

    #[test]
    fn generate_deterministic_same_seed() {
        let mut engine1 = build_test_engine();
        let mut engine2 = build_test_engine();
        assert_eq!(
            engine1.generate_many(20).unwrap(),
            engine2.generate_many(20).unwrap()
        );
    }

    #[test]
    fn generate_selects_variant() {
        let mut engine = build_test_engine();
        for line in engine.generate_many(20).unwrap() {
            assert!(
                line.ends_with(" runs.") || line.ends_with(" leaps."),
                "unexpected line: {}",
                line
            );
        }
    }

    #[test]
    fn generate_without_library() {
        let sink = MemorySink::new();
        let mut engine = MadlibEngine::builder()
            .pattern("<x>")
            .sink(sink.clone())
            .build()
            .unwrap();
        assert_eq!(engine.generate(), Err(GenerateError::NoLibrary));
        assert!(sink.contains(LogLevel::Warn, "No library defined."));
    }

    #[test]
    fn generate_without_pattern() {
        let sink = MemorySink::new();
        let mut engine = MadlibEngine::builder()
            .library(Library::new())
            .sink(sink.clone())
            .build()
            .unwrap();
        assert_eq!(engine.generate(), Err(GenerateError::NoPattern));
        assert!(sink.contains(LogLevel::Warn, "No pattern defined."));
    }

    #[test]
    fn add_list_creates_library() {
        let mut engine = MadlibEngine::builder()
            .pattern("<Word>!")
            .log_level(LogLevel::None)
            .build_with_rng(StepRng::new(0, 0))
            .unwrap();
        assert!(engine.library().is_none());
        engine.add_list("word", ["hello"]);
        assert_eq!(engine.generate().unwrap(), "Hello!");
    }

    #[test]
    fn parse_needs_no_library() {
        let mut engine = MadlibEngine::builder()
            .log_level(LogLevel::None)
            .build_with_rng(StepRng::new(0, 0))
            .unwrap();
        assert_eq!(engine.parse("hello world").unwrap(), "hello world");
        assert_eq!(engine.parse("<missing>").unwrap(), MISSING);
    }

    #[test]
    fn setters_replace_state() {
        let sink = MemorySink::new();
        let mut engine = MadlibEngine::builder()
            .log_level(LogLevel::Debug)
            .sink(sink.clone())
            .build_with_rng(StepRng::new(0, 0))
            .unwrap();

        engine.set_pattern("<verb$p>");
        engine.add_list("verb", ["go^goes^going"]);
        engine.set_variants("sp");
        assert_eq!(engine.generate().unwrap(), "going");

        engine.set_variants("ps");
        assert_eq!(engine.generate().unwrap(), "goes");

        let mut replacement = Library::new();
        replacement.add_list("verb", ["sit^sits^sitting"]);
        engine.set_library(replacement);
        assert_eq!(engine.generate().unwrap(), "sits");

        assert!(sink.contains(LogLevel::Debug, "Pattern set to '<verb$p>'"));
        assert!(sink.contains(LogLevel::Debug, "Adding list 'verb'"));
        assert!(sink.contains(LogLevel::Debug, "Library updated"));
    }

    #[test]
    fn set_log_level_logs_change() {
        let sink = MemorySink::new();
        let mut engine = MadlibEngine::builder()
            .sink(sink.clone())
            .build_with_rng(StepRng::new(0, 0))
            .unwrap();
        engine.set_log_level(LogLevel::Warn);
        assert_eq!(engine.log_level(), LogLevel::Warn);
        // The INFO announcement is filtered by the new WARN level.
        assert!(sink.records().is_empty());

        engine.set_log_level(LogLevel::All);
        assert!(sink.contains(LogLevel::Info, "Loglevel set to 'ALL'"));
    }

    #[test]
    fn recursion_limit_surfaces_from_generate() {
        let mut library = Library::new();
        library.add_list("loop", ["<loop>"]);
        let mut engine = MadlibEngine::builder()
            .library(library)
            .pattern("<loop>")
            .max_depth(16)
            .log_level(LogLevel::None)
            .build_with_rng(StepRng::new(0, 0))
            .unwrap();
        assert_eq!(
            engine.generate(),
            Err(GenerateError::RecursionLimitExceeded(16))
        );
    }

    #[test]
    fn config_applies_settings() {
        let config = EngineConfig {
            variants: "sp".to_string(),
            log_level: LogLevel::Error,
            match_mode: MatchMode::Balanced,
            max_depth: 5,
            seed: Some(3),
        };
        let engine = MadlibEngine::builder().config(config).build().unwrap();
        assert_eq!(engine.variants().as_str(), "sp");
        assert_eq!(engine.log_level(), LogLevel::Error);
        assert_eq!(engine.match_mode(), MatchMode::Balanced);
        assert_eq!(engine.max_depth, 5);
    }

    #[test]
    fn reseed_restarts_sequence() {
        let mut engine = build_test_engine();
        let first = engine.generate_many(10).unwrap();
        engine.reseed(42);
        assert_eq!(engine.generate_many(10).unwrap(), first);
    }

    #[test]
    fn missing_library_file_is_an_error() {
        let sink = MemorySink::new();
        let result = MadlibEngine::builder()
            .library_file("tests/fixtures/does_not_exist.txt")
            .sink(sink.clone())
            .build();
        assert!(matches!(result, Err(LibraryError::Io(_))));
        assert!(sink.contains(LogLevel::Warn, "Unable to open file"));
    }
}
