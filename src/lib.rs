//! # Regex Extract
//!
//! A regex capture-group extraction engine built to be loaded into a host
//! database as the scalar function `regex_extract(pattern, subject[, group])`.
//!
//! Given a pattern, a subject and an optional group index, the engine
//! returns the text of the leftmost match (group 0, the default) or of one
//! capture group, or `None` when nothing matched or the group did not take
//! part in the match. Invalid patterns and group indices the pattern does
//! not declare are errors, never `None`.
//!
//! Matching uses the `regex` crate, which runs in time linear in the
//! subject, so adversarial patterns cannot trigger catastrophic
//! backtracking.
//!
//! ## Quick Start
//!
//! ### Basic Usage
//!
//! ```rust
//! use regex_extract::RegexExtractEngine;
//!
//! let engine = RegexExtractEngine::new();
//!
//! // Whole match
//! assert_eq!(engine.extract("x(ab)", "xxabaa", None)?.as_deref(), Some("xab"));
//!
//! // A group inside a repetition keeps its last iteration
//! assert_eq!(
//!     engine.extract("g(oog)+le", "googoogoogle", Some(1))?.as_deref(),
//!     Some("oog")
//! );
//!
//! // No match
//! assert_eq!(engine.extract("[Cc]at", "hello", None)?, None);
//!
//! // The pattern declares one group only
//! assert!(engine.extract("x(ab)", "xxabaa", Some(2)).is_err());
//! # Ok::<(), regex_extract::ExtractError>(())
//! ```
//!
//! ### Host Registration
//!
//! ```rust
//! use regex_extract::host::{
//!     register_with_engine, FunctionCatalog, FunctionFlags, ScalarFn, StatusCode, ValueRef,
//! };
//! use regex_extract::{RegexExtractEngine, Result};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Catalog(Vec<(String, usize, ScalarFn)>);
//!
//! impl FunctionCatalog for Catalog {
//!     fn create_scalar_function(
//!         &mut self,
//!         name: &str,
//!         arity: usize,
//!         _flags: FunctionFlags,
//!         func: ScalarFn,
//!     ) -> Result<()> {
//!         self.0.push((name.to_string(), arity, func));
//!         Ok(())
//!     }
//! }
//!
//! let mut catalog = Catalog::default();
//! let status = register_with_engine(&mut catalog, Arc::new(RegexExtractEngine::new()));
//! assert_eq!(status, StatusCode::OkLoadPermanently);
//!
//! let (_, _, func) = &catalog.0[0];
//! let value = func(&[ValueRef::Text("[Cc]at"), ValueRef::Text("cat")])?;
//! # Ok::<(), regex_extract::ExtractError>(())
//! ```

pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod matcher;

// Primary engine interface
pub use engine::RegexExtractEngine;

// Compiler and configuration
pub use compiler::{CompileOptions, PatternCompiler};
pub use config::{EngineConfig, ParallelConfig};

// Core types and errors
pub use error::{ExtractError, Result};

// Matcher system
pub use matcher::{
    extract, resolve_selector, CacheConfig, CacheStats, CompiledMatcher, Match, PatternCache,
    Span,
};
