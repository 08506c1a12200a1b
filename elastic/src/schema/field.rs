//! A single mapped attribute of a Definition.

use crate::schema::{Definition, Indexable};
use crate::{Document, Error, Result};
use serde_json::Value;

/// One named attribute mapped onto an engine field.
///
/// Fields are immutable once built. A compound field owns an already frozen
/// nested [`Definition`], so a Definition graph is always frozen bottom-up.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    options: Document,
    mapping_inference: bool,
    nested: Option<Definition>,
}

impl Field {
    pub fn new(name: impl Into<String>, options: Document, mapping_inference_enabled: bool) -> Self {
        Self {
            name: name.into(),
            options,
            mapping_inference: mapping_inference_enabled,
            nested: None,
        }
    }

    /// Field with an explicit engine type and nothing else.
    pub fn typed(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        let mut options = Document::new();
        options.insert("type".to_string(), Value::String(field_type.into()));
        Self::new(name, options, false)
    }

    /// Field whose options are inferred from the main target.
    pub fn inferred(name: impl Into<String>) -> Self {
        Self::new(name, Document::new(), true)
    }

    /// Attach a nested Definition, turning this into a compound field.
    pub fn with_nested(mut self, definition: Definition) -> Self {
        self.nested = Some(definition);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &Document {
        &self.options
    }

    pub fn declared_type(&self) -> Option<&str> {
        self.options.get("type").and_then(Value::as_str)
    }

    pub fn mapping_inference_enabled(&self) -> bool {
        self.mapping_inference
    }

    pub fn nested_definition(&self) -> Option<&Definition> {
        self.nested.as_ref()
    }

    pub fn is_compound(&self) -> bool {
        self.nested.is_some()
    }

    /// Always true: a Field has no mutable stage.
    pub fn is_frozen(&self) -> bool {
        true
    }

    /// Mapping fragment for this field.
    ///
    /// `target` is the owning Definition's main target and is only consulted
    /// when the type has to be inferred.
    pub fn mapping_options(&self, target: Option<&dyn Indexable>) -> Result<Document> {
        let mut mapping = if self.declared_type().is_some() {
            self.options.clone()
        } else if self.nested.is_some() {
            let mut options = self.options.clone();
            options.insert("type".to_string(), Value::String("nested".to_string()));
            options
        } else if self.mapping_inference {
            self.infer_options(target)?
        } else {
            return Err(Error::mapping(
                &self.name,
                "no explicit type and mapping inference is disabled",
            ));
        };

        if let Some(nested) = &self.nested {
            let properties = nested
                .as_mapping()?
                .remove("properties")
                .unwrap_or_else(|| Value::Object(Document::new()));
            mapping.insert("properties".to_string(), properties);
        }

        Ok(mapping)
    }

    fn infer_options(&self, target: Option<&dyn Indexable>) -> Result<Document> {
        let target = target
            .ok_or_else(|| Error::mapping(&self.name, "no indexable target to infer options from"))?;

        let mut inferred = target
            .elastic_field_options_for(&self.name)
            .map_err(|e| match e {
                e @ Error::MappingResolution { .. } => e,
                other => Error::mapping(&self.name, other.to_string()),
            })?;

        // Declared options win over inferred ones.
        for (key, value) in &self.options {
            inferred.insert(key.clone(), value.clone());
        }

        tracing::debug!(field = %self.name, "inferred mapping options");
        Ok(inferred)
    }

    /// Fully qualified names this field contributes: its own name, then
    /// `name.sub` for every expanded name of the nested Definition.
    pub fn expanded_names(&self) -> Box<dyn Iterator<Item = String> + '_> {
        let own = std::iter::once(self.name.clone());
        match &self.nested {
            None => Box::new(own),
            Some(nested) => Box::new(
                own.chain(
                    nested
                        .expanded_field_names()
                        .map(move |sub| format!("{}.{}", self.name, sub)),
                ),
            ),
        }
    }

    /// Resolve a path relative to this field. Scalar fields have no
    /// sub-fields and always return `None`.
    pub fn get_field(&self, path: &str) -> Option<&Field> {
        self.nested.as_ref().and_then(|nested| nested.get_field(path))
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.options == other.options
            && self.mapping_inference == other.mapping_inference
            && self.nested.as_ref().map(|d| d.fields().collect::<Vec<_>>())
                == other.nested.as_ref().map(|d| d.fields().collect::<Vec<_>>())
    }
}
