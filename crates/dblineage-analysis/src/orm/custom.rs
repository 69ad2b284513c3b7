//! User-supplied ORM descriptors in TOML.
//!
//! ```toml
//! [[orm]]
//! name = "Objection"
//! language = "javascript"
//! file_indicators = ["from\\s+['\"]objection['\"]"]
//!
//! [[orm.usage]]
//! pattern = "\\.insert\\s*\\("
//! usage = "write"
//!
//! [[orm.model]]
//! pattern = "static\\s+tableName\\s*=\\s*['\"](\\w+)['\"]"
//! table_group = 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use dblineage_core::errors::RegistryError;
use dblineage_core::types::{Language, UsageType};

use super::descriptor::{FieldPattern, ModelPattern, OrmDescriptor, PatternUsage, UsagePattern};
use super::registry::compile_pattern;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsagePatternDef {
    pub pattern: String,
    /// A usage type name, or `definition`.
    pub usage: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPatternDef {
    pub pattern: String,
    #[serde(default = "default_group")]
    pub table_group: usize,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPatternDef {
    pub pattern: String,
    #[serde(default = "default_group")]
    pub field_group: usize,
    #[serde(default = "default_column_group")]
    pub column_group: usize,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_group() -> usize {
    1
}

fn default_column_group() -> usize {
    2
}

/// One `[[orm]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrmDescriptorDef {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub file_indicators: Vec<String>,
    #[serde(default)]
    pub usage: Vec<UsagePatternDef>,
    #[serde(default)]
    pub model: Vec<ModelPatternDef>,
    #[serde(default)]
    pub field: Vec<FieldPatternDef>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrmCatalogFile {
    #[serde(default)]
    pub orm: Vec<OrmDescriptorDef>,
}

/// Loader for TOML descriptor catalogs.
pub struct OrmCatalogLoader;

impl OrmCatalogLoader {
    pub fn load_from_str(toml_str: &str) -> Result<Vec<OrmDescriptor>, RegistryError> {
        let file: OrmCatalogFile =
            toml::from_str(toml_str).map_err(|e| RegistryError::CatalogParse {
                message: e.to_string(),
            })?;

        let mut descriptors = Vec::new();
        for def in file.orm {
            if def.enabled == Some(false) {
                continue;
            }
            descriptors.push(Self::compile(def)?);
        }
        Ok(descriptors)
    }

    pub fn load_from_file(path: &Path) -> Result<Vec<OrmDescriptor>, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::CatalogRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::load_from_str(&content)
    }

    fn compile(def: OrmDescriptorDef) -> Result<OrmDescriptor, RegistryError> {
        let name = def.name;
        let language: Language =
            def.language
                .parse()
                .map_err(|_| RegistryError::UnknownLanguage {
                    orm: name.clone(),
                    language: def.language.clone(),
                })?;

        let file_indicators = def
            .file_indicators
            .iter()
            .map(|p| compile_pattern(&name, p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut usage_patterns = Vec::with_capacity(def.usage.len());
        for u in def.usage {
            let usage = if u.usage.eq_ignore_ascii_case("definition") {
                PatternUsage::Definition
            } else {
                let kind: UsageType =
                    u.usage
                        .parse()
                        .map_err(|_| RegistryError::UnknownUsageType {
                            orm: name.clone(),
                            usage: u.usage.clone(),
                        })?;
                PatternUsage::Usage(kind)
            };
            usage_patterns.push(UsagePattern {
                regex: compile_pattern(&name, &u.pattern)?,
                usage,
                description: u.description.unwrap_or_default(),
            });
        }

        let model_patterns = def
            .model
            .into_iter()
            .map(|m| {
                Ok(ModelPattern {
                    regex: compile_pattern(&name, &m.pattern)?,
                    table_group: m.table_group,
                    description: m.description.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        let field_patterns = def
            .field
            .into_iter()
            .map(|f| {
                Ok(FieldPattern {
                    regex: compile_pattern(&name, &f.pattern)?,
                    field_group: f.field_group,
                    column_group: f.column_group,
                    description: f.description.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        Ok(OrmDescriptor {
            name,
            language,
            file_indicators,
            usage_patterns,
            model_patterns,
            field_patterns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[orm]]
name = "Objection"
language = "javascript"
file_indicators = ["from\\s+['\"]objection['\"]"]

[[orm.usage]]
pattern = "\\.insert\\s*\\("
usage = "write"
description = "Objection insert"

[[orm.usage]]
pattern = "static\\s+get\\s+jsonSchema"
usage = "definition"

[[orm.model]]
pattern = "static\\s+tableName\\s*=\\s*['\"](\\w+)['\"]"

[[orm]]
name = "Disabled"
language = "go"
enabled = false
"#;

    #[test]
    fn loads_enabled_descriptors() {
        let descriptors = OrmCatalogLoader::load_from_str(CATALOG).unwrap();
        assert_eq!(descriptors.len(), 1);
        let objection = &descriptors[0];
        assert_eq!(objection.name, "Objection");
        assert_eq!(objection.language, Language::JavaScript);
        assert_eq!(objection.usage_patterns.len(), 2);
        assert_eq!(objection.usage_patterns[1].usage, PatternUsage::Definition);
        assert_eq!(
            objection.model_tables("static tableName = 'Persons'"),
            vec!["persons".to_string()]
        );
    }

    #[test]
    fn invalid_regex_names_descriptor_and_pattern() {
        let toml = r#"
[[orm]]
name = "Broken"
language = "python"
file_indicators = ["(unclosed"]
"#;
        match OrmCatalogLoader::load_from_str(toml) {
            Err(RegistryError::InvalidPattern { orm, pattern, .. }) => {
                assert_eq!(orm, "Broken");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn unknown_usage_type_is_rejected() {
        let toml = r#"
[[orm]]
name = "Odd"
language = "ruby"

[[orm.usage]]
pattern = "x"
usage = "upsert"
"#;
        assert!(matches!(
            OrmCatalogLoader::load_from_str(toml),
            Err(RegistryError::UnknownUsageType { .. })
        ));
    }
}
