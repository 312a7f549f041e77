//! swiftfix - CLI tool for rewriting SwiftUI sources for older toolchains.
//!
//! This library provides the core functionality for swiftfix, including:
//! - Delimiter-aware rewrite rules for `.onChange(of:)` closures and `#Preview` macros
//! - A pure rewrite engine with a non-mutating pre-check
//! - Source file discovery with hidden/build directory pruning
//! - Configuration file parsing and cascade discovery
//! - A per-file pipeline that writes back only changed files
//!
//! # Example
//!
//! ```
//! use swiftfix::engine::Engine;
//! use swiftfix::rules::IssueKind;
//!
//! let engine = Engine::default();
//! let text = ".onChange(of: value) { oldValue, newValue in update(newValue) }";
//!
//! assert!(engine.precheck(text).contains(&IssueKind::OnChange));
//!
//! let outcome = engine.rewrite(text, "ContentView");
//! assert!(outcome.changed);
//! assert_eq!(outcome.text, ".onChange(of: value) { newValue in update(newValue) }");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod locate;
pub mod report;
pub mod rules;

pub use error::{FixError, Result};
