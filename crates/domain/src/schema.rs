//! Data schemas — typed descriptions of property values, action inputs and
//! event payloads.
//!
//! A closed set of descriptors (boolean, integer, number, string, object,
//! array) that serialize to the JSON-Schema subset used by Thing
//! Descriptions and validate incoming JSON structurally.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ValidationError;

/// Schema of a single JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataSchema {
    Boolean,
    Integer(NumericSchema),
    Number(NumericSchema),
    String(StringSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
}

/// Bounds and unit shared by `integer` and `number` schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<JsonValue>,
}

/// Constraints of a `string` schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<JsonValue>,
}

/// Fields of an `object` schema. Undeclared fields are accepted as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, DataSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// Item schema and size bounds of an `array` schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArraySchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<DataSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl DataSchema {
    /// Unbounded `number` schema.
    #[must_use]
    pub fn number() -> Self {
        Self::Number(NumericSchema::default())
    }

    /// Unbounded `integer` schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer(NumericSchema::default())
    }

    /// Unconstrained `string` schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String(StringSchema::default())
    }

    /// The JSON-Schema `type` keyword of this schema.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    /// Check `value` against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found; nested failures are
    /// wrapped with the path segment (field name or index) they occurred at.
    pub fn validate(&self, value: &JsonValue) -> Result<(), ValidationError> {
        match self {
            Self::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(ValidationError::TypeMismatch {
                        expected: "boolean",
                    })
                }
            }
            Self::Integer(numeric) => {
                let actual = value
                    .as_f64()
                    .filter(|n| n.fract() == 0.0)
                    .ok_or(ValidationError::TypeMismatch {
                        expected: "integer",
                    })?;
                numeric.check(actual, value)
            }
            Self::Number(numeric) => {
                let actual = value.as_f64().ok_or(ValidationError::TypeMismatch {
                    expected: "number",
                })?;
                numeric.check(actual, value)
            }
            Self::String(string) => {
                let actual = value.as_str().ok_or(ValidationError::TypeMismatch {
                    expected: "string",
                })?;
                string.check(actual, value)
            }
            Self::Object(object) => object.check(value),
            Self::Array(array) => array.check(value),
        }
    }
}

impl NumericSchema {
    #[must_use]
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    #[must_use]
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    #[must_use]
    pub fn multiple_of(mut self, multiple_of: f64) -> Self {
        self.multiple_of = Some(multiple_of);
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    fn check(&self, actual: f64, raw: &JsonValue) -> Result<(), ValidationError> {
        if let Some(minimum) = self.minimum {
            if actual < minimum {
                return Err(ValidationError::BelowMinimum { minimum, actual });
            }
        }
        if let Some(maximum) = self.maximum {
            if actual > maximum {
                return Err(ValidationError::AboveMaximum { maximum, actual });
            }
        }
        if let Some(multiple_of) = self.multiple_of {
            let quotient = actual / multiple_of;
            if (quotient - quotient.round()).abs() > 1e-9 {
                return Err(ValidationError::NotMultipleOf {
                    multiple_of,
                    actual,
                });
            }
        }
        check_allowed(&self.allowed, raw)
    }
}

impl StringSchema {
    fn check(&self, actual: &str, raw: &JsonValue) -> Result<(), ValidationError> {
        let len = actual.chars().count();
        let too_short = self.min_length.is_some_and(|min| len < min);
        let too_long = self.max_length.is_some_and(|max| len > max);
        if too_short || too_long {
            return Err(ValidationError::LengthOutOfRange { actual: len });
        }
        check_allowed(&self.allowed, raw)
    }
}

impl ObjectSchema {
    /// Declare a field.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: DataSchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Declare a field and mark it as required.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>, schema: DataSchema) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, schema);
        self
    }

    fn check(&self, value: &JsonValue) -> Result<(), ValidationError> {
        let fields = value.as_object().ok_or(ValidationError::TypeMismatch {
            expected: "object",
        })?;
        for field in &self.required {
            if !fields.contains_key(field) {
                return Err(ValidationError::MissingField {
                    field: field.clone(),
                });
            }
        }
        for (field, schema) in &self.properties {
            if let Some(inner) = fields.get(field) {
                schema
                    .validate(inner)
                    .map_err(|source| ValidationError::InvalidField {
                        field: field.clone(),
                        source: Box::new(source),
                    })?;
            }
        }
        Ok(())
    }
}

impl ArraySchema {
    fn check(&self, value: &JsonValue) -> Result<(), ValidationError> {
        let items = value.as_array().ok_or(ValidationError::TypeMismatch {
            expected: "array",
        })?;
        let too_few = self.min_items.is_some_and(|min| items.len() < min);
        let too_many = self.max_items.is_some_and(|max| items.len() > max);
        if too_few || too_many {
            return Err(ValidationError::LengthOutOfRange {
                actual: items.len(),
            });
        }
        if let Some(schema) = &self.items {
            for (index, item) in items.iter().enumerate() {
                schema
                    .validate(item)
                    .map_err(|source| ValidationError::InvalidItem {
                        index,
                        source: Box::new(source),
                    })?;
            }
        }
        Ok(())
    }
}

fn check_allowed(allowed: &[JsonValue], raw: &JsonValue) -> Result<(), ValidationError> {
    if allowed.is_empty() || allowed.contains(raw) {
        Ok(())
    } else {
        Err(ValidationError::NotInEnum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn level_schema() -> DataSchema {
        DataSchema::Number(NumericSchema::default().minimum(0.0).maximum(100.0))
    }

    fn fade_input() -> DataSchema {
        DataSchema::Object(
            ObjectSchema::default()
                .required_property("level", level_schema())
                .required_property(
                    "duration",
                    DataSchema::Number(NumericSchema::default().unit("milliseconds")),
                ),
        )
    }

    #[test]
    fn should_accept_number_within_bounds() {
        assert!(level_schema().validate(&json!(50)).is_ok());
        assert!(level_schema().validate(&json!(0)).is_ok());
        assert!(level_schema().validate(&json!(100.0)).is_ok());
    }

    #[test]
    fn should_reject_number_above_maximum() {
        let err = level_schema().validate(&json!(150)).unwrap_err();
        assert!(matches!(err, ValidationError::AboveMaximum { .. }));
    }

    #[test]
    fn should_reject_number_below_minimum() {
        let err = level_schema().validate(&json!(-1)).unwrap_err();
        assert!(matches!(err, ValidationError::BelowMinimum { .. }));
    }

    #[test]
    fn should_reject_wrong_type() {
        let err = level_schema().validate(&json!("50")).unwrap_err();
        assert_eq!(err, ValidationError::TypeMismatch { expected: "number" });
        assert!(DataSchema::Boolean.validate(&json!(1)).is_err());
    }

    #[test]
    fn should_reject_fractional_integer() {
        let schema = DataSchema::integer();
        assert!(schema.validate(&json!(3)).is_ok());
        assert!(schema.validate(&json!(3.0)).is_ok());
        assert!(schema.validate(&json!(3.5)).is_err());
    }

    #[test]
    fn should_enforce_multiple_of() {
        let schema = DataSchema::Number(NumericSchema::default().multiple_of(0.5));
        assert!(schema.validate(&json!(2.5)).is_ok());
        assert!(matches!(
            schema.validate(&json!(2.25)),
            Err(ValidationError::NotMultipleOf { .. })
        ));
    }

    #[test]
    fn should_enforce_string_enum_and_length() {
        let schema = DataSchema::String(StringSchema {
            min_length: Some(2),
            max_length: None,
            allowed: vec![json!("warm"), json!("cold"), json!("x")],
        });
        assert!(schema.validate(&json!("warm")).is_ok());
        assert_eq!(
            schema.validate(&json!("hot")),
            Err(ValidationError::NotInEnum)
        );
        assert_eq!(
            schema.validate(&json!("x")),
            Err(ValidationError::LengthOutOfRange { actual: 1 })
        );
    }

    #[test]
    fn should_accept_valid_object() {
        let input = json!({"level": 40, "duration": 100});
        assert!(fade_input().validate(&input).is_ok());
    }

    #[test]
    fn should_report_missing_required_field() {
        let err = fade_input().validate(&json!({"level": 40})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "duration".to_string()
            }
        );
    }

    #[test]
    fn should_report_nested_field_failure() {
        let err = fade_input()
            .validate(&json!({"level": 400, "duration": 100}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field, .. } if field == "level"));
    }

    #[test]
    fn should_validate_array_items() {
        let schema = DataSchema::Array(ArraySchema {
            items: Some(Box::new(DataSchema::Boolean)),
            min_items: Some(1),
            max_items: Some(2),
        });
        assert!(schema.validate(&json!([true])).is_ok());
        assert!(matches!(
            schema.validate(&json!([true, 1])),
            Err(ValidationError::InvalidItem { index: 1, .. })
        ));
        assert!(schema.validate(&json!([])).is_err());
    }

    #[test]
    fn should_serialize_as_json_schema_subset() {
        let json = serde_json::to_value(level_schema()).unwrap();
        assert_eq!(json, json!({"type": "number", "minimum": 0.0, "maximum": 100.0}));
    }

    #[test]
    fn should_deserialize_tagged_object_schema() {
        let schema: DataSchema = serde_json::from_value(json!({
            "type": "object",
            "required": ["level"],
            "properties": {
                "level": {"type": "integer", "minimum": 0, "maximum": 100, "unit": "percent"}
            }
        }))
        .unwrap();
        assert_eq!(schema.type_name(), "object");
        assert!(schema.validate(&json!({"level": 10})).is_ok());
        assert!(schema.validate(&json!({})).is_err());
    }
}
