//! Integration tests for the host-facing `regex_extract` function.
//!
//! A small in-memory catalog plays the role of the host database: it
//! stores registered functions by `(name, arity)` and dispatches calls the
//! way a SQL engine would.

use regex_extract::host::{
    call_regex_extract, register, register_with_engine, FunctionCatalog, FunctionFlags, ScalarFn,
    StatusCode, Value, ValueRef, FUNCTION_NAME,
};
use regex_extract::{ExtractError, RegexExtractEngine, Result};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct InMemoryCatalog {
    functions: HashMap<(String, usize), ScalarFn>,
}

impl FunctionCatalog for InMemoryCatalog {
    fn create_scalar_function(
        &mut self,
        name: &str,
        arity: usize,
        flags: FunctionFlags,
        func: ScalarFn,
    ) -> Result<()> {
        assert!(flags.contains(FunctionFlags::DETERMINISTIC));
        self.functions.insert((name.to_string(), arity), func);
        Ok(())
    }
}

impl InMemoryCatalog {
    fn query(&self, name: &str, args: &[ValueRef<'_>]) -> Result<Value> {
        let func = self
            .functions
            .get(&(name.to_string(), args.len()))
            .ok_or_else(|| {
                ExtractError::InvalidArgument(format!("no such function: {name}/{}", args.len()))
            })?;
        func(args)
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

#[test]
fn test_load_and_query() {
    let mut catalog = InMemoryCatalog::default();
    let status = register(&mut catalog);
    assert_eq!(status, StatusCode::OkLoadPermanently);
    assert!(status.is_success());

    let q = |args: &[ValueRef<'_>]| catalog.query(FUNCTION_NAME, args).unwrap();

    assert_eq!(q(&[ValueRef::Text("x(ab)"), ValueRef::Text("xxabaa")]), text("xab"));
    assert_eq!(
        q(&[
            ValueRef::Text("x(ab)"),
            ValueRef::Text("xxabaa"),
            ValueRef::Integer(1)
        ]),
        text("ab")
    );
    assert_eq!(
        q(&[
            ValueRef::Text("x(ab)"),
            ValueRef::Text("xxabaa"),
            ValueRef::Integer(0)
        ]),
        text("xab")
    );
    assert_eq!(
        q(&[ValueRef::Text("g(oog)+le"), ValueRef::Text("googoogoogle")]),
        text("googoogoogle")
    );
    assert_eq!(
        q(&[
            ValueRef::Text("g(oog)+le"),
            ValueRef::Text("googoogoogle"),
            ValueRef::Integer(1)
        ]),
        text("oog")
    );
    assert_eq!(q(&[ValueRef::Text("[Cc]at"), ValueRef::Text("cat")]), text("cat"));
    assert_eq!(
        q(&[ValueRef::Text("[Cc]at"), ValueRef::Text("hello")]),
        Value::Null
    );
}

#[test]
fn test_second_catalog_after_first_is_gone() {
    let mut first = InMemoryCatalog::default();
    assert_eq!(register(&mut first), StatusCode::OkLoadPermanently);
    drop(first);

    let mut second = InMemoryCatalog::default();
    assert_eq!(register(&mut second), StatusCode::OkLoadPermanently);
    assert_eq!(
        second
            .query(
                FUNCTION_NAME,
                &[ValueRef::Text("x(ab)"), ValueRef::Text("xxabaa")]
            )
            .unwrap(),
        text("xab")
    );
}

#[test]
fn test_errors_abort_instead_of_returning_null() {
    let mut catalog = InMemoryCatalog::default();
    register_with_engine(&mut catalog, Arc::new(RegexExtractEngine::new()));

    let err = catalog
        .query(
            FUNCTION_NAME,
            &[ValueRef::Text("[unclosed"), ValueRef::Text("x")],
        )
        .unwrap_err();
    assert!(err.is_compile_error());
    assert!(err.to_string().contains("[unclosed"));

    let err = catalog
        .query(
            FUNCTION_NAME,
            &[
                ValueRef::Text("[Cc]at"),
                ValueRef::Text("hello"),
                ValueRef::Integer(1),
            ],
        )
        .unwrap_err();
    assert_eq!(
        err,
        ExtractError::SelectorError {
            group: 1,
            group_count: 0
        }
    );
}

#[test]
fn test_unregistered_arity_is_missing() {
    let mut catalog = InMemoryCatalog::default();
    register_with_engine(&mut catalog, Arc::new(RegexExtractEngine::new()));

    assert_eq!(catalog.functions.len(), 2);
    assert!(catalog
        .query(FUNCTION_NAME, &[ValueRef::Text("a")])
        .is_err());
}

#[test]
fn test_direct_call_shares_engine_cache() {
    let engine = Arc::new(RegexExtractEngine::new());
    let mut catalog = InMemoryCatalog::default();
    register_with_engine(&mut catalog, engine.clone());

    for row in ["cat", "Cat", "dog", "concatenate"] {
        let via_catalog = catalog
            .query(FUNCTION_NAME, &[ValueRef::Text("[Cc]at"), ValueRef::Text(row)])
            .unwrap();
        let direct =
            call_regex_extract(&engine, &[ValueRef::Text("[Cc]at"), ValueRef::Text(row)]).unwrap();
        assert_eq!(via_catalog, direct);
    }
    assert_eq!(engine.cache_stats().compilations, 1);
}
