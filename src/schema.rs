//! Declarative input/output schemas for tools.
//!
//! Every tool declares the shape of its arguments and result as an
//! [`ObjectSchema`]. The registry validates incoming arguments against the
//! input schema generically, before any handler code runs, and renders both
//! schemas as JSON Schema for `tools/list`.

use serde_json::{json, Map, Value};
use thiserror::Error;

pub use toolbelt_macro::Schema;

/// Types that describe their own JSON shape.
///
/// Usually derived with `#[derive(Schema)]`.
pub trait Schema {
    /// Build the schema for this type.
    fn schema() -> ObjectSchema;
}

/// Primitive kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Number,
}

impl FieldKind {
    /// JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Number => value.is_number(),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named field in an [`ObjectSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key in the arguments object.
    pub name: String,
    /// Expected JSON type.
    pub kind: FieldKind,
    /// Whether the field must be present and non-null.
    pub required: bool,
    /// Human-readable description, rendered into JSON Schema.
    pub description: Option<String>,
    /// Allowed values, compared case-insensitively. Empty means unrestricted.
    pub one_of: Vec<String>,
    /// Label used when a value outside `one_of` is rejected,
    /// e.g. `"unsupported algorithm"`.
    pub error: Option<String>,
}

impl FieldSpec {
    /// Create a required field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: None,
            one_of: Vec::new(),
            error: None,
        }
    }

    /// Mark the field as required or optional.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict the field to a fixed set of values.
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.one_of = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Set the label reported when a value is not one of the allowed ones.
    pub fn error(mut self, label: impl Into<String>) -> Self {
        self.error = Some(label.into());
        self
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), SchemaError> {
        let value = match value {
            None | Some(Value::Null) if self.required => {
                return Err(SchemaError::MissingField(self.name.clone()));
            }
            None | Some(Value::Null) => return Ok(()),
            Some(value) => value,
        };

        if !self.kind.accepts(value) {
            return Err(SchemaError::WrongType {
                field: self.name.clone(),
                expected: self.kind,
                found: json_type_name(value),
            });
        }

        if self.one_of.is_empty() {
            return Ok(());
        }
        if let Some(s) = value.as_str() {
            // Empty optional values fall back to the tool's default.
            if s.is_empty() && !self.required {
                return Ok(());
            }
            if !self.one_of.iter().any(|allowed| allowed.eq_ignore_ascii_case(s)) {
                return Err(SchemaError::NotAllowed {
                    field: self.name.clone(),
                    value: s.to_string(),
                    allowed: self.one_of.clone(),
                    label: self.error.clone(),
                });
            }
        }

        Ok(())
    }

    fn to_json_schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), Value::from(self.kind.as_str()));
        if let Some(description) = &self.description {
            property.insert("description".into(), Value::from(description.as_str()));
        }
        if !self.one_of.is_empty() {
            property.insert("enum".into(), Value::from(self.one_of.clone()));
        }
        Value::Object(property)
    }
}

/// Schema of a JSON object: an ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSchema {
    fields: Vec<FieldSpec>,
}

impl ObjectSchema {
    /// Create a schema with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Declared fields, in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check `value` against this schema.
    ///
    /// Fields not declared in the schema are ignored.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        let object = value.as_object().ok_or(SchemaError::NotAnObject {
            found: json_type_name(value),
        })?;

        for field in &self.fields {
            field.validate(object.get(&field.name))?;
        }

        Ok(())
    }

    /// Render as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Argument validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("arguments must be an object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("field '{field}' must be a {expected}, got {found}")]
    WrongType {
        field: String,
        expected: FieldKind,
        found: &'static str,
    },
    #[error("{}", not_allowed_message(.field, .value, .allowed, .label.as_deref()))]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
        /// Domain wording from [`FieldSpec::error`].
        label: Option<String>,
    },
    #[error("failed to decode arguments: {0}")]
    Decode(String),
}

impl SchemaError {
    /// Name of the offending field, when the error is about one.
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::MissingField(field)
            | SchemaError::WrongType { field, .. }
            | SchemaError::NotAllowed { field, .. } => Some(field.as_str()),
            SchemaError::NotAnObject { .. } | SchemaError::Decode(_) => None,
        }
    }
}

fn not_allowed_message(
    field: &str,
    value: &str,
    allowed: &[String],
    label: Option<&str>,
) -> String {
    match label {
        Some(label) => format!("{}: {} (use {})", label, value, or_list(allowed)),
        None => format!(
            "field '{}' has unsupported value '{}' (allowed: {})",
            field,
            value,
            allowed.join(", ")
        ),
    }
}

/// `a`, `a or b`, `a, b, or c`.
fn or_list(values: &[String]) -> String {
    match values {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} or {}", first, second),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
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
