pub mod config;
pub mod directive;
pub mod engine;
pub mod expand;
pub mod library;
pub mod lint;
pub mod log;
pub mod word;
