//! Text front ends: parse JSON or YAML templates, optionally resolving them.
//!
//! YAML short forms are expanded to their long form while parsing:
//!
//! | YAML | JSON |
//! |---|---|
//! | `!Ref x` | `{"Ref": "x"}` |
//! | `!Condition x` | `{"Condition": "x"}` |
//! | `!GetAtt a.b` | `{"Fn::GetAtt": ["a", "b"]}` |
//! | `!Name v` | `{"Fn::Name": v}` |

use crate::cloud::CloudProvider;
use crate::config::ResolveOptions;
use crate::error::ResolveError;
use serde_json::{json, Map, Value};
use serde_yaml::value::TaggedValue;

pub fn parse_json(text: &str) -> Result<Value, ResolveError> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_yaml(text: &str) -> Result<Value, ResolveError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(yaml_to_json(yaml))
}

/// Parses and resolves a JSON template.
pub fn load_json(
    text: &str,
    options: &ResolveOptions,
    cloud: &dyn CloudProvider,
) -> Result<Value, ResolveError> {
    crate::resolved(parse_json(text)?, options, cloud)
}

/// Parses and resolves a YAML template.
pub fn load_yaml(
    text: &str,
    options: &ResolveOptions,
    cloud: &dyn CloudProvider,
) -> Result<Value, ResolveError> {
    crate::resolved(parse_yaml(text)?, options, cloud)
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!(i)
            } else if let Some(u) = n.as_u64() {
                json!(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut out = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                out.insert(mapping_key(key), yaml_to_json(value));
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => short_form(*tagged),
    }
}

fn mapping_key(key: serde_yaml::Value) -> String {
    match yaml_to_json(key) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn short_form(tagged: TaggedValue) -> Value {
    let tag = tagged.tag.to_string();
    let name = tag.trim_start_matches('!');
    let value = yaml_to_json(tagged.value);
    match name {
        "Ref" | "Condition" => single(name.to_string(), value),
        "GetAtt" => {
            let value = match value {
                Value::String(dotted) => match dotted.split_once('.') {
                    Some((resource, attribute)) => json!([resource, attribute]),
                    None => Value::String(dotted),
                },
                other => other,
            };
            single("Fn::GetAtt".to_string(), value)
        }
        other => single(format!("Fn::{}", other), value),
    }
}

fn single(key: String, value: Value) -> Value {
    let mut out = Map::with_capacity(1);
    out.insert(key, value);
    Value::Object(out)
}
