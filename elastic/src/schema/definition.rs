//! Definition registry: the two-stage (builder, frozen) schema object.

use crate::schema::options::CustomOptions;
use crate::schema::target::{validate_targets, TargetRef};
use crate::schema::{ElasticMode, Field, Indexable};
use crate::transport::Transport;
use crate::{Document, Error, Result};
use indexmap::IndexMap;
use serde_json::Value;

/// Insertion-ordered field registry shared by both stages.
#[derive(Debug, Clone, Default)]
struct FieldSet {
    fields: IndexMap<String, Field>,
}

impl FieldSet {
    /// Overwrites keep the position of the first registration.
    fn insert(&mut self, field: Field) -> Option<Field> {
        self.fields.insert(field.name().to_string(), field)
    }

    fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn get(&self, path: &str) -> Option<&Field> {
        match path.split_once('.') {
            None => self.fields.get(path),
            Some((head, rest)) => self.fields.get(head)?.get_field(rest),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    fn expanded_names(&self) -> impl Iterator<Item = String> + '_ {
        self.fields.values().flat_map(Field::expanded_names)
    }

    fn as_mapping(&self, target: Option<&dyn Indexable>) -> Result<Document> {
        let mut properties = Document::new();
        for field in self.fields.values() {
            properties.insert(
                field.name().to_string(),
                Value::Object(field.mapping_options(target)?),
            );
        }

        let mut mapping = Document::new();
        mapping.insert("properties".to_string(), Value::Object(properties));
        Ok(mapping)
    }
}

fn main_target_of(targets: &[TargetRef]) -> Result<&TargetRef> {
    targets
        .first()
        .ok_or_else(|| Error::Configuration("definition has no targets".to_string()))
}

fn main_indexable(targets: &[TargetRef]) -> Option<&dyn Indexable> {
    targets.first().and_then(|t| t.indexable())
}

/// Mutable stage of a Definition.
///
/// Targets are validated on assignment; fields and custom options can be
/// changed until [`DefinitionBuilder::freeze`] consumes the builder.
#[derive(Debug, Clone, Default)]
pub struct DefinitionBuilder {
    targets: Vec<TargetRef>,
    mode: Option<ElasticMode>,
    fields: FieldSet,
    custom_options: CustomOptions,
}

impl DefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the backing targets. The list must be non-empty, every member
    /// must be indexable and all members must share one elastic mode.
    pub fn set_targets(&mut self, targets: Vec<TargetRef>) -> Result<()> {
        let mode = validate_targets(&targets)?;
        tracing::debug!(
            targets = ?targets.iter().map(|t| t.name()).collect::<Vec<_>>(),
            %mode,
            "assigned definition targets"
        );
        self.targets = targets;
        self.mode = Some(mode);
        Ok(())
    }

    pub fn with_targets(mut self, targets: Vec<TargetRef>) -> Result<Self> {
        self.set_targets(targets)?;
        Ok(self)
    }

    pub fn targets(&self) -> &[TargetRef] {
        &self.targets
    }

    pub fn main_target(&self) -> Result<&TargetRef> {
        main_target_of(&self.targets)
    }

    pub fn elastic_mode(&self) -> Option<ElasticMode> {
        self.mode
    }

    /// Register a field, replacing any field of the same name in place.
    pub fn register_field(&mut self, field: Field) -> &mut Self {
        tracing::debug!(field = %field.name(), "registering field");
        if self.fields.insert(field).is_some() {
            tracing::debug!("field replaced an earlier registration");
        }
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    pub fn get_field(&self, path: &str) -> Option<&Field> {
        self.fields.get(path)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn expanded_field_names(&self) -> impl Iterator<Item = String> + '_ {
        self.fields.expanded_names()
    }

    pub fn as_mapping(&self) -> Result<Document> {
        self.fields.as_mapping(main_indexable(&self.targets))
    }

    pub fn custom_options(&self) -> &CustomOptions {
        &self.custom_options
    }

    pub fn custom_options_mut(&mut self) -> &mut CustomOptions {
        &mut self.custom_options
    }

    pub fn is_frozen(&self) -> bool {
        false
    }

    /// Finish construction. Nested Definitions are already frozen, so the
    /// result is immutable all the way down.
    pub fn freeze(self) -> Definition {
        tracing::debug!(fields = self.fields.fields.len(), "freezing definition");
        Definition {
            targets: self.targets,
            mode: self.mode,
            fields: self.fields,
            custom_options: self.custom_options,
        }
    }
}

/// Frozen Definition. Read-only and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Definition {
    targets: Vec<TargetRef>,
    mode: Option<ElasticMode>,
    fields: FieldSet,
    custom_options: CustomOptions,
}

impl Definition {
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::new()
    }

    pub fn targets(&self) -> &[TargetRef] {
        &self.targets
    }

    pub fn main_target(&self) -> Result<&TargetRef> {
        main_target_of(&self.targets)
    }

    pub fn elastic_mode(&self) -> Option<ElasticMode> {
        self.mode
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Resolve a possibly dotted path. A head segment without a nested
    /// Definition resolves nothing further and yields `None`.
    pub fn get_field(&self, path: &str) -> Option<&Field> {
        self.fields.get(path)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn expanded_field_names(&self) -> impl Iterator<Item = String> + '_ {
        self.fields.expanded_names()
    }

    /// Render `{"properties": {...}}`. The first failing field aborts the
    /// whole mapping.
    pub fn as_mapping(&self) -> Result<Document> {
        self.fields.as_mapping(main_indexable(&self.targets))
    }

    pub fn custom_options(&self) -> &CustomOptions {
        &self.custom_options
    }

    pub fn is_frozen(&self) -> bool {
        true
    }

    pub fn freeze(self) -> Self {
        self
    }

    /// Render the mapping and hand it to the transport.
    pub async fn put_mapping(&self, transport: &dyn Transport, index: &str) -> Result<Value> {
        let mapping = self.as_mapping()?;
        tracing::debug!(index, "putting mapping");
        transport.put_mapping(index, Value::Object(mapping)).await
    }
}
