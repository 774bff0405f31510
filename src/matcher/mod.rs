//! Compiled matchers, the pattern cache and capture-group extraction.
//!
//! ## Architecture
//!
//! The matcher system separates compilation from evaluation:
//! - **Compilation Phase**: a pattern string becomes an immutable
//!   [`CompiledMatcher`], retained in a [`PatternCache`] keyed by the exact
//!   pattern string and the compile options
//! - **Evaluation Phase**: [`extract`] runs the shared matcher against a
//!   subject and resolves the requested group
//!
//! ## Example Usage
//!
//! ```rust
//! use regex_extract::matcher::{extract, PatternCache};
//! use regex_extract::PatternCompiler;
//!
//! let cache = PatternCache::new();
//! let compiler = PatternCompiler::new();
//!
//! for row in ["googoogoogle", "gooogle", "google"] {
//!     let matcher = cache.get_or_compile("g(oog)+le", &compiler)?;
//!     let _group = extract(&matcher, row, Some(1))?;
//! }
//! assert_eq!(cache.stats().compilations, 1);
//! # Ok::<(), regex_extract::ExtractError>(())
//! ```

pub mod cache;
pub mod compiled;
pub mod extract;
pub mod types;

pub use cache::{CacheConfig, CacheStats, PatternCache};
pub use compiled::CompiledMatcher;
pub use extract::{extract, resolve_selector};
pub use types::{Match, Span};
