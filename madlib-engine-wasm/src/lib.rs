//! WASM bindings for madlib-engine: powers the interactive web demo.

use wasm_bindgen::prelude::*;

use madlib_engine::core::library::ListFile;
use madlib_engine::core::lint::{lint, Severity};
use madlib_engine::core::log::{LogLevel, MemorySink};
use madlib_engine::MadlibEngine;

// ---------------------------------------------------------------------------
// Embedded libraries: compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const TAVERN: &str = include_str!("../../library_data/tavern.txt");
    pub const QUESTS: &str = include_str!("../../library_data/quests.txt");
}

/// Variant identifiers for the embedded libraries: s = third person,
/// g = gerund, p = past.
const DEMO_VARIANTS: &str = "sgp";

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct ListInfo {
    name: String,
    size: usize,
}

#[derive(serde::Serialize)]
struct LintInfo {
    severity: &'static str,
    message: String,
}

#[derive(serde::Serialize)]
struct LogInfo {
    level: String,
    message: String,
}

// ---------------------------------------------------------------------------
// MadlibDemo: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct MadlibDemo {
    engine: MadlibEngine,
    logs: MemorySink,
    source: String,
}

#[wasm_bindgen]
impl MadlibDemo {
    /// Create a demo instance from one of the embedded libraries.
    #[wasm_bindgen(constructor)]
    pub fn new(library: &str, seed: u64) -> Result<MadlibDemo, JsError> {
        let source = match library {
            "tavern" => data::TAVERN,
            "quests" => data::QUESTS,
            _ => return Err(JsError::new(&format!("Unknown library: {library}"))),
        };
        Self::build(source, seed)
    }

    /// Create a demo instance from word-list text supplied by the page.
    pub fn from_source(source: &str, seed: u64) -> Result<MadlibDemo, JsError> {
        Self::build(source, seed)
    }

    /// Expand the library's pattern once.
    pub fn generate(&mut self) -> Result<String, JsError> {
        self.engine
            .generate()
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))
    }

    /// Expand the pattern `count` times. Returns a JSON array of strings.
    pub fn generate_many(&mut self, count: usize) -> Result<String, JsError> {
        let lines = self
            .engine
            .generate_many(count)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;
        serde_json::to_string(&lines)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Expand arbitrary text against the loaded library.
    pub fn expand(&mut self, text: &str) -> Result<String, JsError> {
        self.engine
            .parse(text)
            .map_err(|e| JsError::new(&format!("Expansion error: {e}")))
    }

    pub fn pattern(&self) -> Option<String> {
        self.engine.pattern().map(str::to_string)
    }

    pub fn set_pattern(&mut self, pattern: &str) {
        self.engine.set_pattern(pattern);
    }

    pub fn set_variants(&mut self, variants: &str) {
        self.engine.set_variants(variants);
    }

    /// Return a JSON array of `{ name, size }` for every loaded list.
    pub fn lists(&self) -> Result<String, JsError> {
        let lists: Vec<ListInfo> = match self.engine.library() {
            Some(library) => library
                .names()
                .into_iter()
                .map(|name| ListInfo {
                    name: name.to_string(),
                    size: library.get(name).map_or(0, <[_]>::len),
                })
                .collect(),
            None => Vec::new(),
        };
        serde_json::to_string(&lists)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return a JSON array of `{ severity, message }` lint findings.
    pub fn lint(&self) -> Result<String, JsError> {
        let issues = match self.engine.library() {
            Some(library) => lint(library, self.engine.pattern(), self.engine.match_mode()),
            None => Vec::new(),
        };
        let infos: Vec<LintInfo> = issues
            .iter()
            .map(|issue| LintInfo {
                severity: match issue.severity() {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                },
                message: issue.to_string(),
            })
            .collect();
        serde_json::to_string(&infos)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return and clear the captured log as a JSON array of
    /// `{ level, message }`.
    pub fn take_logs(&mut self) -> Result<String, JsError> {
        let logs: Vec<LogInfo> = self
            .logs
            .records()
            .into_iter()
            .map(|r| LogInfo {
                level: r.level.to_string(),
                message: r.message,
            })
            .collect();
        self.logs.clear();
        serde_json::to_string(&logs)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return JSON array of embedded library identifiers.
    pub fn available_libraries() -> String {
        serde_json::to_string(&["tavern", "quests"]).unwrap_or_else(|_| "[]".to_string())
    }

    /// Reset the random source with a new seed (same library and pattern).
    pub fn reset(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }

    /// The word-list text this demo was built from.
    pub fn source(&self) -> String {
        self.source.clone()
    }
}

// Private helpers
impl MadlibDemo {
    fn build(source: &str, seed: u64) -> Result<MadlibDemo, JsError> {
        let file = ListFile::parse(source);
        let logs = MemorySink::new();

        let mut builder = MadlibEngine::builder()
            .seed(seed)
            .variants(DEMO_VARIANTS)
            .log_level(LogLevel::Info)
            .sink(logs.clone())
            .library(file.library);
        if let Some(ref pattern) = file.pattern {
            builder = builder.pattern(pattern);
        }

        let engine = builder
            .build()
            .map_err(|e| JsError::new(&format!("Failed to build engine: {e}")))?;

        Ok(MadlibDemo {
            engine,
            logs,
            source: source.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_libraries_generate() {
        for name in ["tavern", "quests"] {
            let mut demo = MadlibDemo::new(name, 7).ok().unwrap();
            let line = demo.generate().ok().unwrap();
            assert!(!line.is_empty());
            assert!(!line.contains("MISSING"), "{}: {}", name, line);
            assert!(!line.contains('<'), "{}: {}", name, line);
        }
    }

    #[test]
    fn embedded_libraries_lint_clean() {
        for name in ["tavern", "quests"] {
            let demo = MadlibDemo::new(name, 1).ok().unwrap();
            assert_eq!(demo.lint().ok().unwrap(), "[]", "{} has lint findings", name);
        }
    }

    #[test]
    fn custom_source_and_logs() {
        let mut demo = MadlibDemo::from_source("<ghost> {a|b}\n==real==\nword\n", 3)
            .ok()
            .unwrap();
        let line = demo.generate().ok().unwrap();
        assert!(line.starts_with("MISSING "));

        let logs = demo.take_logs().ok().unwrap();
        assert!(logs.contains("Missing wordlist: ghost"));
        assert_eq!(demo.take_logs().ok().unwrap(), "[]");
    }

    #[test]
    fn same_seed_same_output() {
        let mut a = MadlibDemo::new("tavern", 99).ok().unwrap();
        let mut b = MadlibDemo::new("tavern", 99).ok().unwrap();
        assert_eq!(
            a.generate_many(5).ok().unwrap(),
            b.generate_many(5).ok().unwrap()
        );
    }
}
