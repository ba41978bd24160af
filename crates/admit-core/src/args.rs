//! Policy arguments supplied by the host as a JSON object.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{SdkError, SdkResult};
use crate::host::{ARGS_CONFIG_KEY, Host};

/// Parsed argument object. Empty when the host supplied none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Map<String, Value>,
}

/// Reads and parses the argument object.
///
/// Absent or blank configuration yields an empty mapping. Anything that is
/// present but not a JSON object is an error.
pub fn args(host: &Host<'_>) -> SdkResult<Args> {
    let Some(raw) = host.config().get(ARGS_CONFIG_KEY) else {
        return Ok(Args::default());
    };
    Args::parse(&raw)
}

/// Decodes the argument object into a typed struct.
pub fn args_as<T: DeserializeOwned>(host: &Host<'_>) -> SdkResult<T> {
    let args = args(host)?;
    serde_json::from_value(Value::Object(args.values)).map_err(SdkError::ArgsJson)
}

impl Args {
    pub fn parse(raw: &str) -> SdkResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str(raw).map_err(SdkError::ArgsJson)? {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(SdkError::ArgsNotObject(json_type_name(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the argument as text.
    ///
    /// Strings come back verbatim; other non-null values come back as
    /// their compact JSON text.
    pub fn string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    /// Reads a list argument given either as a JSON array or as a
    /// comma-separated string. Blank entries are dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s.trim().to_string()),
                    other => Some(other.to_string()),
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Accepts JSON booleans and the strings `"true"`/`"false"`.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
