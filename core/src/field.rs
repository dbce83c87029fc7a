//! The JSON column contract: value preparation, decoding, validation and
//! per-dialect column DDL.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::ast::{Expr, PathSegment};
use crate::error::{JsonError, JsonResult};
use crate::transpiler::{Connection, Dialect, Fragment};

/// Turns a JSON document into the text stored in the column.
pub trait JsonEncoder: Send + Sync {
    fn encode(&self, value: &JsonValue) -> JsonResult<String>;
}

/// Parses stored text back into a JSON document.
pub trait JsonDecoder: Send + Sync {
    fn decode(&self, text: &str) -> JsonResult<JsonValue>;
}

/// Column default.
#[derive(Clone, Default)]
pub enum FieldDefault {
    /// No default.
    None,
    /// Computed per row.
    Callable(fn() -> JsonValue),
    /// A fixed value.
    Value(JsonValue),
    /// An empty object per row.
    #[default]
    EmptyObject,
}

impl FieldDefault {
    pub fn get(&self) -> Option<JsonValue> {
        match self {
            FieldDefault::None => None,
            FieldDefault::Callable(f) => Some(f()),
            FieldDefault::Value(v) => Some(v.clone()),
            FieldDefault::EmptyObject => Some(JsonValue::Object(Default::default())),
        }
    }

    /// A fixed list or object default.
    fn is_mutable_value(&self) -> bool {
        matches!(
            self,
            FieldDefault::Value(JsonValue::Array(_) | JsonValue::Object(_))
        )
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::None => write!(f, "None"),
            FieldDefault::Callable(_) => write!(f, "Callable"),
            FieldDefault::Value(v) => write!(f, "Value({})", v),
            FieldDefault::EmptyObject => write!(f, "EmptyObject"),
        }
    }
}

/// Severity of a field check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckLevel {
    Warning,
    Error,
}

/// A problem reported by [`JsonField::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    pub level: CheckLevel,
    pub id: &'static str,
    pub message: String,
    pub hint: Option<String>,
}

/// A JSON column.
#[derive(Clone)]
pub struct JsonField {
    pub name: String,
    pub null: bool,
    pub default: FieldDefault,
    encoder: Option<Arc<dyn JsonEncoder>>,
    decoder: Option<Arc<dyn JsonDecoder>>,
}

impl fmt::Debug for JsonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonField")
            .field("name", &self.name)
            .field("null", &self.null)
            .field("default", &self.default)
            .field("encoder", &self.encoder.is_some())
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

impl JsonField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            null: false,
            default: FieldDefault::default(),
            encoder: None,
            decoder: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    pub fn with_encoder(mut self, encoder: impl JsonEncoder + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    pub fn with_decoder(mut self, decoder: impl JsonDecoder + 'static) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    pub fn get_default(&self) -> Option<JsonValue> {
        self.default.get()
    }

    /// Serialize a value for storage. `None` stays SQL NULL.
    pub fn get_prep_value<T: Serialize + ?Sized>(&self, value: Option<&T>) -> JsonResult<Option<String>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let document = serde_json::to_value(value)?;
        let text = match &self.encoder {
            Some(encoder) => encoder.encode(&document)?,
            None => serde_json::to_string(&document)?,
        };
        Ok(Some(text))
    }

    /// Decode a stored value. Text that fails to decode is returned as a
    /// JSON string instead of an error.
    pub fn from_db_value(&self, value: Option<&str>, conn: &Connection) -> Option<JsonValue> {
        let text = value?;
        if conn.features.interprets_empty_strings_as_nulls && text.is_empty() {
            return None;
        }
        let decoded = match &self.decoder {
            Some(decoder) => decoder.decode(text),
            None => serde_json::from_str(text).map_err(JsonError::from),
        };
        match decoded {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::debug!(field = %self.name, error = %err, "returning undecodable JSON as text");
                Some(JsonValue::String(text.to_string()))
            }
        }
    }

    /// Check that a value can be stored in this column.
    pub fn validate<T: Serialize + ?Sized>(&self, value: Option<&T>) -> JsonResult<()> {
        match value {
            None if !self.null => Err(JsonError::Validation {
                code: "null",
                message: "This field cannot be null.".to_string(),
            }),
            None => Ok(()),
            Some(value) => self.get_prep_value(Some(value)).map(|_| ()).map_err(|_| {
                JsonError::Validation {
                    code: "invalid",
                    message: "Value must be valid JSON.".to_string(),
                }
            }),
        }
    }

    /// Configuration checks against the connections the field will be used
    /// with.
    pub fn check(&self, connections: &[Connection]) -> Vec<CheckMessage> {
        let mut messages = Vec::new();
        if self.default.is_mutable_value() {
            messages.push(CheckMessage {
                level: CheckLevel::Warning,
                id: "fields.E010",
                message: "JSONField default should not be a mutable object. Use a callable \
                          instead so that the default is not shared between rows."
                    .to_string(),
                hint: Some(
                    "Use FieldDefault::Callable or FieldDefault::EmptyObject instead of a fixed value."
                        .to_string(),
                ),
            });
        }
        if !connections.iter().any(|c| c.features.supports_json_field) {
            messages.push(CheckMessage {
                level: CheckLevel::Error,
                id: "fields.E180",
                message: "No database connection that supports JSONField is found.".to_string(),
                hint: Some(
                    "See the documentation of JSONField for supported database versions."
                        .to_string(),
                ),
            });
        }
        messages
    }

    /// Any name applied to the column is a key transform.
    pub fn get_transform(&self, lhs: Expr, name: &str) -> Expr {
        lhs.key(PathSegment::parse(name))
    }

    /// Column type in CREATE TABLE.
    pub fn db_type(&self, dialect: Dialect) -> &'static str {
        match dialect {
            Dialect::Postgres => "jsonb",
            Dialect::MySql => "json",
            Dialect::Oracle => "NCLOB",
            Dialect::Sqlite => "text",
        }
    }

    /// CHECK constraint that keeps the stored text valid JSON.
    pub fn check_constraint(&self, dialect: Dialect) -> Option<String> {
        let quoted = dialect.generator().quote_identifier(&self.name);
        match dialect {
            Dialect::Oracle => Some(format!("{} IS JSON", quoted)),
            Dialect::Sqlite => Some(format!("(JSON_VALID({q}) OR {q} IS NULL)", q = quoted)),
            Dialect::Postgres | Dialect::MySql => None,
        }
    }

    /// Wrap a selected column so a custom decoder sees raw text.
    pub fn select_format(&self, selected: Fragment, dialect: Dialect) -> Fragment {
        if dialect == Dialect::Postgres && self.decoder.is_some() {
            Fragment::new(format!("{}::text", selected.sql), selected.params)
        } else {
            selected
        }
    }
}
