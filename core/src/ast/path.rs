//! JSON path segments and the `$`-rooted path syntax shared by MySQL,
//! Oracle and SQLite.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a JSON path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

impl PathSegment {
    /// Interpret a textual segment. Digit-only text is an array index.
    pub fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = text.parse::<u64>() {
                return PathSegment::Index(n);
            }
        }
        PathSegment::Key(text.to_string())
    }

    /// The segment as PostgreSQL path-array text.
    pub fn as_text(&self) -> String {
        match self {
            PathSegment::Key(k) => k.clone(),
            PathSegment::Index(n) => n.to_string(),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::parse(s)
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::parse(&s)
    }
}

impl From<u64> for PathSegment {
    fn from(n: u64) -> Self {
        PathSegment::Index(n)
    }
}

impl From<usize> for PathSegment {
    fn from(n: usize) -> Self {
        PathSegment::Index(n as u64)
    }
}

impl From<i32> for PathSegment {
    fn from(n: i32) -> Self {
        if n >= 0 {
            PathSegment::Index(n as u64)
        } else {
            PathSegment::Key(n.to_string())
        }
    }
}

/// JSON-quote an object key (`a` -> `"a"`).
pub fn quote_key(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}

/// Compile segments into a `$`-rooted path: `$."a"[0]."b"`.
pub fn compile_json_path(segments: &[PathSegment]) -> String {
    let mut path = String::from("$");
    for segment in segments {
        match segment {
            PathSegment::Index(n) => {
                path.push('[');
                path.push_str(&n.to_string());
                path.push(']');
            }
            PathSegment::Key(k) => {
                path.push('.');
                path.push_str(&quote_key(k));
            }
        }
    }
    path
}

/// Path to a single object key, never treated as an index: `$."0"`.
pub fn key_path(key: &str) -> String {
    nested_key_path(&[], key)
}

/// Path to object key `key` below `prefix`: `$."a"[0]."key"`.
pub fn nested_key_path(prefix: &[PathSegment], key: &str) -> String {
    format!("{}.{}", compile_json_path(prefix), quote_key(key))
}
