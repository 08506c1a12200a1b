//! Backing target types and the Indexable capability.

use crate::{Document, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a backing type participates in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElasticMode {
    /// Documents are indexed from the backing store and can be reindexed.
    Index,
    /// The engine is the primary store for these documents.
    Storage,
}

impl fmt::Display for ElasticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElasticMode::Index => write!(f, "index"),
            ElasticMode::Storage => write!(f, "storage"),
        }
    }
}

/// Capability a backing type must expose to take part in a Definition.
pub trait Indexable: Send + Sync {
    fn elastic_mode(&self) -> ElasticMode;

    /// Infer mapping options for a field that declares no type.
    fn elastic_field_options_for(&self, field: &str) -> Result<Document> {
        Err(Error::mapping(field, "target does not support mapping inference"))
    }
}

/// A backing type descriptor. Only targets whose [`Target::indexable`]
/// returns `Some` may be assigned to a Definition.
pub trait Target: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn indexable(&self) -> Option<&dyn Indexable> {
        None
    }
}

/// Shared handle to a target.
pub type TargetRef = Arc<dyn Target>;

/// Target that lacks the Indexable capability.
#[derive(Debug, Clone)]
pub struct PlainTarget {
    name: String,
}

impl PlainTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Target for PlainTarget {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Indexable target backed by a static table of field options.
///
/// Fields missing from the table cannot be inferred.
#[derive(Debug, Clone)]
pub struct StaticTarget {
    name: String,
    mode: ElasticMode,
    field_options: Document,
}

impl StaticTarget {
    pub fn new(name: impl Into<String>, mode: ElasticMode) -> Self {
        Self {
            name: name.into(),
            mode,
            field_options: Document::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>, options: serde_json::Value) -> Self {
        self.field_options.insert(field.into(), options);
        self
    }

    pub fn mode(&self) -> ElasticMode {
        self.mode
    }
}

impl Target for StaticTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn indexable(&self) -> Option<&dyn Indexable> {
        Some(self)
    }
}

impl Indexable for StaticTarget {
    fn elastic_mode(&self) -> ElasticMode {
        self.mode
    }

    fn elastic_field_options_for(&self, field: &str) -> Result<Document> {
        match self.field_options.get(field) {
            Some(serde_json::Value::Object(options)) => Ok(options.clone()),
            Some(other) => Err(Error::mapping(
                field,
                format!("target {} declares non-object options: {}", self.name, other),
            )),
            None => Err(Error::mapping(
                field,
                format!("target {} has no options for this field", self.name),
            )),
        }
    }
}

/// View of another target where every inferred field name is prefixed,
/// used for fields of a nested Definition.
#[derive(Debug, Clone)]
pub struct ScopedTarget {
    inner: TargetRef,
    prefix: String,
}

impl ScopedTarget {
    pub fn new(inner: TargetRef, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }
}

impl Target for ScopedTarget {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn indexable(&self) -> Option<&dyn Indexable> {
        self.inner.indexable().map(|_| self as &dyn Indexable)
    }
}

impl Indexable for ScopedTarget {
    fn elastic_mode(&self) -> ElasticMode {
        self.inner
            .indexable()
            .map(|i| i.elastic_mode())
            .unwrap_or(ElasticMode::Index)
    }

    fn elastic_field_options_for(&self, field: &str) -> Result<Document> {
        let indexable = self.inner.indexable().ok_or_else(|| {
            Error::mapping(field, format!("target {} is not indexable", self.inner.name()))
        })?;
        indexable.elastic_field_options_for(&format!("{}.{}", self.prefix, field))
    }
}

/// Check a target list: non-empty, every member indexable, one shared mode.
pub(crate) fn validate_targets(targets: &[TargetRef]) -> Result<ElasticMode> {
    let first = targets
        .first()
        .ok_or_else(|| Error::Configuration("targets must not be empty".to_string()))?;

    let mut mode = None;
    for target in targets {
        let indexable = target.indexable().ok_or_else(|| {
            Error::Configuration(format!("target {} is not indexable", target.name()))
        })?;
        let target_mode = indexable.elastic_mode();
        match mode {
            None => mode = Some(target_mode),
            Some(m) if m != target_mode => {
                return Err(Error::Configuration(format!(
                    "targets must share one elastic mode: {} is {} but {} is {}",
                    first.name(),
                    m,
                    target.name(),
                    target_mode
                )));
            }
            Some(_) => {}
        }
    }

    mode.ok_or_else(|| Error::Configuration("targets must not be empty".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_target_inference() {
        let target = StaticTarget::new("Post", ElasticMode::Index)
            .with_field("title", json!({"type": "text"}));

        let options = target.elastic_field_options_for("title").unwrap();
        assert_eq!(options.get("type"), Some(&json!("text")));
        assert!(target.elastic_field_options_for("body").is_err());
    }

    #[test]
    fn test_plain_target_is_not_indexable() {
        assert!(PlainTarget::new("Bare").indexable().is_none());
    }

    #[test]
    fn test_scoped_target_prefixes_field() {
        let inner: TargetRef = Arc::new(
            StaticTarget::new("Post", ElasticMode::Storage)
                .with_field("author.name", json!({"type": "keyword"})),
        );
        let scoped = ScopedTarget::new(inner, "author");

        assert_eq!(scoped.elastic_mode(), ElasticMode::Storage);
        let options = scoped.elastic_field_options_for("name").unwrap();
        assert_eq!(options.get("type"), Some(&json!("keyword")));
    }

    #[test]
    fn test_validate_targets() {
        let index: TargetRef = Arc::new(StaticTarget::new("A", ElasticMode::Index));
        let storage: TargetRef = Arc::new(StaticTarget::new("B", ElasticMode::Storage));
        let plain: TargetRef = Arc::new(PlainTarget::new("C"));

        assert_eq!(validate_targets(&[index.clone()]).unwrap(), ElasticMode::Index);
        assert!(matches!(validate_targets(&[]), Err(Error::Configuration(_))));
        assert!(matches!(
            validate_targets(&[index.clone(), storage]),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            validate_targets(&[index, plain]),
            Err(Error::Configuration(_))
        ));
    }
}
