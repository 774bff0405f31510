//! Host database boundary.
//!
//! The host (a SQL engine loading this crate as an extension) sees a single
//! scalar function in two arities:
//!
//! ```sql
//! regex_extract(pattern TEXT, subject TEXT) -> TEXT | NULL
//! regex_extract(pattern TEXT, subject TEXT, group INTEGER) -> TEXT | NULL
//! ```
//!
//! NULL is reserved for "no match" and "group did not participate" (and a
//! NULL subject). Invalid patterns, out-of-range groups and wrongly typed
//! arguments are errors that abort the calling query.
//!
//! The host catalog is abstracted by [`FunctionCatalog`]; [`register`] is
//! the single initialization entry point and reports a [`StatusCode`]. The
//! [`ffi`] module exposes the same entry point over a C ABI.

pub mod ffi;
pub mod logging;

use crate::config::EngineConfig;
use crate::engine::RegexExtractEngine;
use crate::error::{ExtractError, Result};
use crate::matcher::extract::{extract_index, resolve_selector};
use std::sync::{Arc, OnceLock};

/// Name the function is registered under.
pub const FUNCTION_NAME: &str = "regex_extract";

/// Environment variable naming a YAML/JSON configuration file for the
/// process-wide engine.
pub const CONFIG_ENV: &str = "REGEX_EXTRACT_CONFIG";

/// Borrowed argument value handed over by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    Null,
    Integer(i64),
    Real(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl ValueRef<'_> {
    /// Host type name, used in error messages.
    pub fn data_type(&self) -> &'static str {
        match self {
            ValueRef::Null => "null",
            ValueRef::Integer(_) => "integer",
            ValueRef::Real(_) => "real",
            ValueRef::Text(_) => "text",
            ValueRef::Blob(_) => "blob",
        }
    }
}

/// Result value handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Text(String),
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Value::Null, Value::Text)
    }
}

/// Flags describing a registered function, in SQLite's bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionFlags(i32);

impl FunctionFlags {
    pub const UTF8: FunctionFlags = FunctionFlags(0x0000_0001);
    pub const DETERMINISTIC: FunctionFlags = FunctionFlags(0x0000_0800);

    pub fn bits(self) -> i32 {
        self.0
    }

    pub fn contains(self, other: FunctionFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for FunctionFlags {
    type Output = FunctionFlags;

    fn bitor(self, rhs: FunctionFlags) -> FunctionFlags {
        FunctionFlags(self.0 | rhs.0)
    }
}

/// Scalar function body as the host invokes it.
pub type ScalarFn = Arc<dyn Fn(&[ValueRef<'_>]) -> Result<Value> + Send + Sync>;

/// The host's callable catalog.
pub trait FunctionCatalog {
    /// Bind `func` under `name` for calls with exactly `arity` arguments.
    fn create_scalar_function(
        &mut self,
        name: &str,
        arity: usize,
        flags: FunctionFlags,
        func: ScalarFn,
    ) -> Result<()>;
}

/// Status reported back to the host, using SQLite's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    Error = 1,
    /// Success; the host should keep the library loaded for the process
    OkLoadPermanently = 256,
}

impl StatusCode {
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        !matches!(self, StatusCode::Error)
    }
}

static GLOBAL_ENGINE: OnceLock<Arc<RegexExtractEngine>> = OnceLock::new();

/// Get the process-wide engine used by the C entry points.
///
/// Built on first use from the file named by `REGEX_EXTRACT_CONFIG`, or
/// from defaults when the variable is unset.
pub fn global_engine() -> Result<Arc<RegexExtractEngine>> {
    if let Some(engine) = GLOBAL_ENGINE.get() {
        return Ok(engine.clone());
    }
    let config = load_global_config()?;
    Ok(GLOBAL_ENGINE
        .get_or_init(|| Arc::new(RegexExtractEngine::with_config(config)))
        .clone())
}

/// Install the process-wide engine explicitly.
///
/// Returns `false` if it was already initialized.
pub fn init_global_engine(config: EngineConfig) -> bool {
    GLOBAL_ENGINE
        .set(Arc::new(RegexExtractEngine::with_config(config)))
        .is_ok()
}

fn load_global_config() -> Result<EngineConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => EngineConfig::from_file(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Evaluate one `regex_extract` call.
///
/// Arguments are `(pattern, subject)` or `(pattern, subject, group)`. The
/// pattern is compiled and the group validated before the subject is
/// looked at, so errors never depend on row data.
pub fn call_regex_extract(engine: &RegexExtractEngine, args: &[ValueRef<'_>]) -> Result<Value> {
    let (pattern, subject, group) = match args {
        [pattern, subject] => (pattern, subject, None),
        [pattern, subject, group] => (pattern, subject, Some(group)),
        _ => {
            return Err(ExtractError::InvalidArgument(format!(
                "{FUNCTION_NAME} expects 2 or 3 arguments, got {}",
                args.len()
            )))
        }
    };

    let pattern = match pattern {
        ValueRef::Text(text) => *text,
        other => {
            return Err(ExtractError::InvalidArgument(format!(
                "regex pattern must be text, got {}",
                other.data_type()
            )))
        }
    };

    let group = match group {
        None => None,
        Some(ValueRef::Integer(index)) => Some(*index),
        Some(other) => {
            return Err(ExtractError::InvalidArgument(format!(
                "capture group must be an integer, got {}",
                other.data_type()
            )))
        }
    };

    let matcher = engine.matcher(pattern)?;
    let index = resolve_selector(&matcher, group)?;

    match subject {
        ValueRef::Text(text) => Ok(extract_index(&matcher, text, index)
            .map(str::to_string)
            .into()),
        ValueRef::Null => Ok(Value::Null),
        other => Err(ExtractError::InvalidArgument(format!(
            "regex expects text as input, got {}",
            other.data_type()
        ))),
    }
}

fn add_functions(
    catalog: &mut dyn FunctionCatalog,
    engine: &Arc<RegexExtractEngine>,
) -> Result<()> {
    let flags = FunctionFlags::DETERMINISTIC | FunctionFlags::UTF8;

    for arity in [2, 3] {
        let engine = engine.clone();
        let func: ScalarFn =
            Arc::new(move |args: &[ValueRef<'_>]| call_regex_extract(&engine, args));
        catalog.create_scalar_function(FUNCTION_NAME, arity, flags, func)?;
    }
    Ok(())
}

/// Register `regex_extract` (both arities) bound to `engine`.
///
/// # Returns
/// * `StatusCode::OkLoadPermanently` - every arity was registered
/// * `StatusCode::Error` - the catalog refused a registration; the host
///   must treat the function as unregistered
pub fn register_with_engine(
    catalog: &mut dyn FunctionCatalog,
    engine: Arc<RegexExtractEngine>,
) -> StatusCode {
    match add_functions(catalog, &engine) {
        Ok(()) => {
            log::info!("[regex-extract] init ok");
            StatusCode::OkLoadPermanently
        }
        Err(e) => {
            log::error!("[regex-extract] init error: {}", e);
            StatusCode::Error
        }
    }
}

/// Initialization entry point: set up logging and register `regex_extract`
/// against the process-wide engine.
pub fn register(catalog: &mut dyn FunctionCatalog) -> StatusCode {
    let engine = match global_engine() {
        Ok(engine) => engine,
        Err(e) => {
            logging::init_logging(log::LevelFilter::Info);
            log::error!("[regex-extract] init error: {}", e);
            return StatusCode::Error;
        }
    };

    let level = engine
        .config()
        .level_filter()
        .unwrap_or(log::LevelFilter::Info);
    logging::init_logging(level);
    register_with_engine(catalog, engine)
}
