use crate::schema::{
    Definition, DefinitionBuilder, ElasticMode, Field, ScopedTarget, StaticTarget, TargetRef,
};
use crate::{Document, Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SchemaFile {
    name: String,
    targets: Vec<TargetDecl>,
    #[serde(default)]
    fields: Vec<FieldDecl>,
    #[serde(default)]
    options: Document,
}

#[derive(Debug, Deserialize)]
struct TargetDecl {
    name: String,
    #[serde(default = "default_mode")]
    mode: ElasticMode,
    /// Options answered when a field asks for inference
    #[serde(default)]
    fields: Document,
}

fn default_mode() -> ElasticMode {
    ElasticMode::Index
}

#[derive(Debug, Deserialize)]
struct FieldDecl {
    name: String,
    #[serde(default)]
    inference: Option<bool>,
    #[serde(default)]
    fields: Option<Vec<FieldDecl>>,
    #[serde(flatten)]
    options: Document,
}

/// A Definition loaded from a schema file, with the name it was declared under.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub name: String,
    pub definition: Definition,
}

pub struct SchemaLoader {
    schemas_dir: PathBuf,
    inference_default: bool,
}

impl SchemaLoader {
    pub fn new(schemas_dir: impl AsRef<Path>) -> Self {
        Self {
            schemas_dir: schemas_dir.as_ref().to_path_buf(),
            inference_default: true,
        }
    }

    /// Inference flag for fields that do not set `inference` themselves.
    pub fn with_inference_default(mut self, enabled: bool) -> Self {
        self.inference_default = enabled;
        self
    }

    pub fn load_all(&self) -> Result<HashMap<String, LoadedSchema>> {
        let mut schemas = HashMap::new();

        if !self.schemas_dir.exists() {
            return Err(Error::Configuration(format!(
                "Schemas directory does not exist: {}",
                self.schemas_dir.display()
            )));
        }

        for entry in fs::read_dir(&self.schemas_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml")) {
                continue;
            }

            let schema = self.load_schema(&path)?;
            if schemas.contains_key(&schema.name) {
                tracing::warn!(
                    "Schema {} declared twice, keeping {}",
                    schema.name,
                    path.display()
                );
            }
            schemas.insert(schema.name.clone(), schema);
        }

        Ok(schemas)
    }

    pub fn load_schema(&self, path: &Path) -> Result<LoadedSchema> {
        let content = fs::read_to_string(path)?;
        self.parse_schema(&content)
    }

    pub fn parse_schema(&self, content: &str) -> Result<LoadedSchema> {
        let file: SchemaFile = serde_yaml::from_str(content)?;
        let builder = self.build(&file)?;

        for issue in Self::lint(&builder) {
            tracing::warn!("Schema {}: {}", file.name, issue);
        }

        Ok(LoadedSchema {
            name: file.name,
            definition: builder.freeze(),
        })
    }

    fn build(&self, file: &SchemaFile) -> Result<DefinitionBuilder> {
        let targets: Vec<TargetRef> = file
            .targets
            .iter()
            .map(|decl| {
                let mut target = StaticTarget::new(&decl.name, decl.mode);
                for (field, options) in &decl.fields {
                    target = target.with_field(field, options.clone());
                }
                Arc::new(target) as TargetRef
            })
            .collect();

        let mut builder = DefinitionBuilder::new();
        builder.set_targets(targets.clone())?;
        for (key, value) in &file.options {
            builder.custom_options_mut().insert(key, value.clone());
        }
        for decl in &file.fields {
            builder.register_field(self.build_field(decl, &targets)?);
        }
        Ok(builder)
    }

    fn build_field(&self, decl: &FieldDecl, targets: &[TargetRef]) -> Result<Field> {
        if decl.name.is_empty() || decl.name.contains('.') {
            return Err(Error::Configuration(format!(
                "invalid field name '{}'",
                decl.name
            )));
        }

        let inference = decl.inference.unwrap_or(self.inference_default);
        let field = Field::new(&decl.name, decl.options.clone(), inference);

        let Some(children) = &decl.fields else {
            return Ok(field);
        };

        let scoped: Vec<TargetRef> = targets
            .iter()
            .map(|t| Arc::new(ScopedTarget::new(t.clone(), &decl.name)) as TargetRef)
            .collect();

        let mut nested = DefinitionBuilder::new();
        nested.set_targets(scoped.clone())?;
        for child in children {
            nested.register_field(self.build_field(child, &scoped)?);
        }

        Ok(field.with_nested(nested.freeze()))
    }

    /// Lint a definition and return a list of human-readable issues (empty = ok)
    pub fn lint(definition: &DefinitionBuilder) -> Vec<String> {
        let mut issues = Vec::new();
        if definition.fields().next().is_none() {
            issues.push("definition should have at least one field".to_string());
        }
        lint_fields(definition.fields(), "", &mut issues);
        issues
    }
}

fn lint_fields<'a>(
    fields: impl Iterator<Item = &'a Field>,
    prefix: &str,
    issues: &mut Vec<String>,
) {
    for field in fields {
        let path = format!("{}{}", prefix, field.name());
        match field.nested_definition() {
            Some(nested) => lint_fields(nested.fields(), &format!("{}.", path), issues),
            None if field.declared_type().is_none() && !field.mapping_inference_enabled() => {
                issues.push(format!(
                    "field '{}' has no type and mapping inference is disabled",
                    path
                ));
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    const POSTS: &str = r#"
name: posts
targets:
  - name: Post
    mode: index
    fields:
      title: { type: text }
      author.name: { type: keyword }
fields:
  - name: title
  - name: views
    type: integer
  - name: author
    fields:
      - name: name
options:
  Shards: 2
"#;

    #[test]
    fn test_parse_schema() -> Result<()> {
        let loaded = SchemaLoader::new(".").parse_schema(POSTS)?;
        let definition = &loaded.definition;

        assert_eq!(loaded.name, "posts");
        assert_eq!(definition.main_target()?.name(), "Post");
        assert_eq!(definition.custom_options().get(":shards"), Some(&json!(2)));
        assert_eq!(
            definition.expanded_field_names().collect::<Vec<_>>(),
            vec!["title", "views", "author", "author.name"]
        );

        let mapping = definition.as_mapping()?;
        assert_eq!(
            Value::Object(mapping),
            json!({
                "properties": {
                    "title": {"type": "text"},
                    "views": {"type": "integer"},
                    "author": {
                        "type": "nested",
                        "properties": {"name": {"type": "keyword"}}
                    }
                }
            })
        );
        Ok(())
    }

    #[test]
    fn test_inference_default_off() -> Result<()> {
        let loaded = SchemaLoader::new(".")
            .with_inference_default(false)
            .parse_schema(POSTS)?;
        assert!(matches!(
            loaded.definition.as_mapping(),
            Err(Error::MappingResolution { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_mixed_modes_rejected() {
        let yaml = r#"
name: broken
targets:
  - name: A
    mode: index
  - name: B
    mode: storage
"#;
        assert!(matches!(
            SchemaLoader::new(".").parse_schema(yaml),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_dotted_field_name_rejected() {
        let yaml = r#"
name: broken
targets: [{ name: A }]
fields:
  - name: a.b
    type: keyword
"#;
        assert!(SchemaLoader::new(".").parse_schema(yaml).is_err());
    }

    #[test]
    fn test_load_schemas_from_directory() -> Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("posts.yaml"), POSTS)?;
        fs::write(
            temp.path().join("notes.yml"),
            "name: notes\ntargets: [{ name: Note }]\nfields: [{ name: body, type: text }]\n",
        )?;
        fs::write(temp.path().join("notes.txt"), "ignored")?;

        let schemas = SchemaLoader::new(temp.path()).load_all()?;
        assert_eq!(schemas.len(), 2);
        assert!(schemas.contains_key("posts"));
        assert!(schemas.contains_key("notes"));
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let result = SchemaLoader::new("/definitely/not/here").load_all();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_lint() {
        let mut builder = DefinitionBuilder::new();
        assert_eq!(SchemaLoader::lint(&builder).len(), 1);

        builder.register_field(Field::new("raw", Document::new(), false));
        builder.register_field(Field::typed("ok", "keyword"));
        let issues = SchemaLoader::lint(&builder);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("raw"));
    }

    #[test]
    fn test_lint_reports_nested_fields_by_path() -> Result<()> {
        let yaml = r#"
name: posts
targets: [{ name: Post }]
fields:
  - name: title
    type: text
  - name: author
    fields:
      - name: nick
        inference: false
      - name: name
        type: keyword
"#;
        let loader = SchemaLoader::new(".");
        let file: SchemaFile = serde_yaml::from_str(yaml)?;
        let builder = loader.build(&file)?;

        assert_eq!(
            SchemaLoader::lint(&builder),
            vec!["field 'author.nick' has no type and mapping inference is disabled"]
        );
        assert!(matches!(
            builder.as_mapping(),
            Err(Error::MappingResolution { field, .. }) if field == "nick"
        ));
        Ok(())
    }
}
