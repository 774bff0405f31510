//! Tests for loading engine configuration from files.

use regex_extract::{EngineConfig, ExtractError, RegexExtractEngine};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, contents: &str) -> anyhow::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_yaml_file_configures_engine() -> anyhow::Result<()> {
    let file = write_config(
        ".yaml",
        r#"
cache:
  max_size: 2
compile:
  case_insensitive: true
parallel:
  enabled: false
log_level: warn
"#,
    )?;

    let config = EngineConfig::from_file(file.path())?;
    assert_eq!(config.cache.max_size, 2);
    assert!(!config.parallel.enabled);

    let engine = RegexExtractEngine::with_config(config);
    assert_eq!(engine.extract("cat", "CAT", None)?.as_deref(), Some("CAT"));
    engine.extract("a", "a", None)?;
    engine.extract("b", "b", None)?;
    assert_eq!(engine.cache().len(), 2);
    assert_eq!(engine.cache_stats().evictions, 1);
    Ok(())
}

#[test]
fn test_json_file_by_extension() -> anyhow::Result<()> {
    let file = write_config(".json", r#"{"cache": {"max_size": 7}}"#)?;
    let config = EngineConfig::from_file(file.path())?;
    assert_eq!(config.cache.max_size, 7);
    assert_eq!(config.log_level, "info");
    Ok(())
}

#[test]
fn test_missing_file_is_config_error() {
    let err = EngineConfig::from_file("/nonexistent/regex-extract.yaml").unwrap_err();
    assert!(matches!(err, ExtractError::ConfigError(_)));
}

#[test]
fn test_malformed_file_is_config_error() -> anyhow::Result<()> {
    let file = write_config(".yaml", "cache: [not, a, map]")?;
    let err = EngineConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ExtractError::ConfigError(msg) if msg.starts_with("YAML")));
    Ok(())
}
