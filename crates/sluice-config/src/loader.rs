//! Loading configs from DSL, JSON or YAML sources.
//!
//! A driver usually wants the tree as plain JSON plus, for DSL sources, a
//! hook to fire lifecycle events around its run. [`ConfigLoader`] produces
//! both as an [`ExecConfig`].

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::events::EventName;
use crate::interp::parse;
use crate::root::RootConfig;
use crate::value::stringify;

// ── ExecEvent ─────────────────────────────────────────────────────────────

/// Lifecycle hooks a driver fires around one run.
pub trait ExecEvent {
    /// Called once before processing begins.
    fn on_start(&self) -> anyhow::Result<Option<Value>>;

    /// Called once after processing ends with the driver's result data.
    fn on_complete(&self, diff: &Value) -> anyhow::Result<Option<Value>>;
}

impl ExecEvent for RootConfig {
    fn on_start(&self) -> anyhow::Result<Option<Value>> {
        self.dispatch(EventName::Start, &[])
    }

    fn on_complete(&self, diff: &Value) -> anyhow::Result<Option<Value>> {
        self.dispatch(EventName::Complete, std::slice::from_ref(diff))
    }
}

// ── ExecConfig ────────────────────────────────────────────────────────────

/// A loaded config: the tree as JSON and, for DSL sources, its event hook.
pub struct ExecConfig {
    source: Map<String, Value>,
    event: Option<Box<dyn ExecEvent>>,
}

impl ExecConfig {
    pub fn new(source: Map<String, Value>, event: Option<Box<dyn ExecEvent>>) -> Self {
        Self { source, event }
    }

    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    pub fn event(&self) -> Option<&dyn ExecEvent> {
        self.event.as_deref()
    }

    pub fn into_source(self) -> Map<String, Value> {
        self.source
    }
}

impl From<RootConfig> for ExecConfig {
    fn from(root: RootConfig) -> Self {
        let source = root.root_element().to_json();
        Self::new(source, Some(Box::new(root)))
    }
}

impl fmt::Debug for ExecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecConfig")
            .field("source", &self.source)
            .field("event", &self.event.is_some())
            .finish()
    }
}

// ── ConfigLoader ──────────────────────────────────────────────────────────

/// The source formats a [`ConfigLoader`] understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Dsl,
    Json,
    Yaml,
}

/// Reads config sources, picking the format by file extension.
///
/// DSL extensions (`.sluice`, `.rb` by default) are evaluated, `.json` is
/// read as JSON, and every other path is read as YAML.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    dsl_extensions: Vec<String>,
}

impl ConfigLoader {
    /// A loader treating `.sluice` and `.rb` files as DSL.
    pub fn new() -> Self {
        Self { dsl_extensions: vec!["sluice".to_string(), "rb".to_string()] }
    }

    /// Also treat files ending in `.{ext}` as DSL.
    pub fn with_dsl_extension(mut self, ext: impl Into<String>) -> Self {
        self.dsl_extensions.push(ext.into());
        self
    }

    pub fn is_dsl_path(&self, path: &Path) -> bool {
        self.format_of(path) == SourceFormat::Dsl
    }

    pub fn format_of(&self, path: &Path) -> SourceFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if self.dsl_extensions.iter().any(|d| d == ext) => SourceFormat::Dsl,
            Some("json") => SourceFormat::Json,
            _ => SourceFormat::Yaml,
        }
    }

    /// Evaluate DSL source.
    pub fn from_dsl_str(&self, src: &str) -> ConfigResult<ExecConfig> {
        Ok(parse(src)?.into())
    }

    /// Read a JSON object. JSON configs carry no event hook.
    pub fn from_json_str(&self, src: &str) -> ConfigResult<ExecConfig> {
        let source = expect_object(serde_json::from_str(src)?)?;
        Ok(ExecConfig::new(source, None))
    }

    /// Read a YAML mapping. YAML configs carry no event hook.
    pub fn from_yaml_str(&self, src: &str) -> ConfigResult<ExecConfig> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(src)?;
        let source = expect_object(yaml_to_json(&yaml))?;
        Ok(ExecConfig::new(source, None))
    }

    /// Build a config from `key=value` properties.
    ///
    /// Only keys starting with `prefix` are used, with the prefix stripped.
    /// Each value is read as a YAML literal, so `4` is a number, `true` a
    /// boolean and `[a, b]` a sequence.
    pub fn from_properties<I, K, V>(&self, props: I, prefix: &str) -> ConfigResult<Map<String, Value>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut source = Map::new();
        for (key, value) in props {
            let Some(name) = key.as_ref().strip_prefix(prefix) else {
                continue;
            };
            let yaml: serde_yaml::Value = serde_yaml::from_str(value.as_ref())?;
            log::trace!("property {} = {:?}", name, value.as_ref());
            source.insert(name.to_string(), yaml_to_json(&yaml));
        }
        Ok(source)
    }

    /// Read and load the file at `path`.
    pub fn from_path(&self, path: impl AsRef<Path>) -> ConfigResult<ExecConfig> {
        let path = path.as_ref();
        let src = read_source(path)?;
        let format = self.format_of(path);
        log::debug!("loading {} as {:?}", path.display(), format);
        match format {
            SourceFormat::Dsl => self.from_dsl_str(&src),
            SourceFormat::Json => self.from_json_str(&src),
            SourceFormat::Yaml => self.from_yaml_str(&src),
        }
    }

    /// Read and evaluate the DSL file at `path`, keeping its events.
    pub fn load_root(&self, path: impl AsRef<Path>) -> ConfigResult<RootConfig> {
        let path = path.as_ref();
        if !self.is_dsl_path(path) {
            return Err(ConfigError::NotDsl(path.to_path_buf()));
        }
        parse(&read_source(path)?)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_source(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
}

fn expect_object(value: Value) -> ConfigResult<Map<String, Value>> {
    match value {
        Value::Object(source) => Ok(source),
        other => Err(ConfigError::NotAnObject(other.to_string())),
    }
}

/// Convert a YAML tree to JSON. Non-string keys use their scalar string
/// form; tags are dropped.
fn yaml_to_json(yaml: &serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                // `.inf` and `.nan` have no JSON form
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => Value::Array(seq.iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let key = match k {
                        serde_yaml::Value::String(s) => s.clone(),
                        other => stringify(&yaml_to_json(other)),
                    };
                    (key, yaml_to_json(v))
                })
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
