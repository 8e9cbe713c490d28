use crate::{DispatcherConfig, RawCommand, RawSparkConfig};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

fn parse_yaml<T: DeserializeOwned>(raw: &str, what: &str) -> anyhow::Result<T> {
    let val: Value = serde_yaml::from_str(raw).with_context(|| format!("parsing yaml: {what}"))?;
    serde_yaml::from_value(val).with_context(|| format!("decoding {what}"))
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_yaml(&raw, &path.display().to_string())
}

pub fn parse_command_batch(raw: &str) -> anyhow::Result<Vec<RawCommand>> {
    parse_yaml(raw, "command batch")
}

/// Load a YAML list of commands.
pub fn load_command_batch(path: impl AsRef<Path>) -> anyhow::Result<Vec<RawCommand>> {
    load_yaml(path.as_ref())
}

pub fn load_dispatcher_config(path: impl AsRef<Path>) -> anyhow::Result<DispatcherConfig> {
    load_yaml(path.as_ref())
}

pub fn load_spark_config(path: impl AsRef<Path>) -> anyhow::Result<RawSparkConfig> {
    load_yaml(path.as_ref())
}
