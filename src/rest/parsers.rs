/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use serde::Deserialize;
use serde_json::Value;

// Reads a number that may be sent as a JSON number or a numeric string
pub fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn lenient_u64(value: &Value) -> Option<u64> {
    lenient_i64(value).and_then(|v| u64::try_from(v).ok())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Content {
    Plain(String),
    Wrapped {
        #[serde(rename = "_content")]
        content: String,
    },
}

// Parses text sent either as "text" or as {"_content": "text"}
pub fn from_content<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Content::deserialize(deserializer)? {
        Content::Plain(s) | Content::Wrapped { content: s } => s,
    })
}

// Same as from_content but "" becomes None
pub fn from_content_to_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = from_content(deserializer)?;
    if s.is_empty() { Ok(None) } else { Ok(Some(s)) }
}

// Parses 0/1 flags that may be numbers, strings or booleans
pub fn from_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Value = Deserialize::deserialize(deserializer)?;
    Ok(match v {
        Value::Bool(b) => b,
        other => lenient_i64(&other).unwrap_or(0) != 0,
    })
}

// Parses numbers that may be sent as strings
pub fn from_int_or_str<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Value = Deserialize::deserialize(deserializer)?;
    lenient_u64(&v).ok_or_else(|| serde::de::Error::custom(format!("not a number: {}", v)))
}
