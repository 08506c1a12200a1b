//! Shaping of terminal aggregation values.

use crate::schema::Definition;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Shapes leaf values that are not further bucketed.
pub trait Formatter: Send + Sync {
    /// `field` is the engine field the value was computed from, when known.
    fn format(&self, field: Option<&str>, value: Value) -> Value;
}

/// Returns every value untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Formatter for Passthrough {
    fn format(&self, _field: Option<&str>, value: Value) -> Value {
        value
    }
}

/// Uses the declared field types of a Definition: epoch-millisecond values
/// of `date` fields become RFC 3339 strings.
#[derive(Debug, Clone, Copy)]
pub struct DefinitionFormatter<'a> {
    definition: &'a Definition,
}

impl<'a> DefinitionFormatter<'a> {
    pub fn new(definition: &'a Definition) -> Self {
        Self { definition }
    }
}

impl Formatter for DefinitionFormatter<'_> {
    fn format(&self, field: Option<&str>, value: Value) -> Value {
        let declared = field
            .and_then(|f| self.definition.get_field(f))
            .and_then(|f| f.declared_type());

        if declared != Some("date") {
            return value;
        }

        let millis = value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64));
        match millis.and_then(DateTime::<Utc>::from_timestamp_millis) {
            Some(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DefinitionBuilder, Field};
    use serde_json::json;

    #[test]
    fn test_passthrough() {
        assert_eq!(Passthrough.format(Some("x"), json!("qux")), json!("qux"));
    }

    #[test]
    fn test_definition_formatter_dates() {
        let mut builder = DefinitionBuilder::new();
        builder
            .register_field(Field::typed("created_at", "date"))
            .register_field(Field::typed("views", "integer"));
        let definition = builder.freeze();
        let formatter = DefinitionFormatter::new(&definition);

        assert_eq!(
            formatter.format(Some("created_at"), json!(0)),
            json!("1970-01-01T00:00:00.000Z")
        );
        assert_eq!(formatter.format(Some("views"), json!(42)), json!(42));
        assert_eq!(formatter.format(None, json!(0)), json!(0));
        assert_eq!(formatter.format(Some("created_at"), Value::Null), Value::Null);
    }
}
