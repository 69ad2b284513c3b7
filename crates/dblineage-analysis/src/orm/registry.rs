//! The descriptor registry: built-in catalog plus optional custom entries.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::config::OrmConfig;
use dblineage_core::errors::RegistryError;
use dblineage_core::types::collections::FxHashMap;
use dblineage_core::types::Language;

use super::catalog::{self, DescriptorDef};
use super::custom::OrmCatalogLoader;
use super::descriptor::{FieldPattern, ModelPattern, OrmDescriptor, UsagePattern};

static BUILTIN: LazyLock<Vec<OrmDescriptor>> = LazyLock::new(|| {
    catalog::builtin()
        .filter_map(|def| match compile_def(def) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                tracing::error!(orm = def.name, error = %e, "skipping built-in ORM descriptor");
                None
            }
        })
        .collect()
});

/// Immutable set of ORM descriptors.
#[derive(Debug, Clone)]
pub struct OrmRegistry {
    descriptors: Vec<OrmDescriptor>,
}

impl Default for OrmRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OrmRegistry {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            descriptors: BUILTIN.clone(),
        }
    }

    pub fn empty() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Built-in catalog minus disabled descriptors, plus the custom catalog
    /// named by the configuration.
    pub fn from_config(config: &OrmConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::builtin();
        registry
            .descriptors
            .retain(|d| !config.is_disabled(&d.name));
        if let Some(path) = config.custom_descriptors.as_deref() {
            let custom = OrmCatalogLoader::load_from_file(Path::new(path))?;
            tracing::info!(path, count = custom.len(), "loaded custom ORM descriptors");
            registry.extend(custom);
        }
        Ok(registry)
    }

    /// Append descriptors after the existing ones.
    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = OrmDescriptor>) {
        self.descriptors.extend(descriptors);
    }

    pub fn descriptors(&self) -> &[OrmDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&OrmDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Every descriptor whose language fits and whose file indicators match.
    pub fn detect(&self, content: &str, language: Language) -> Vec<&OrmDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.applies_to(language) && d.indicated_by(content))
            .collect()
    }

    /// Lowercased field-to-column mappings declared in the content.
    pub fn field_mappings(content: &str, orms: &[&OrmDescriptor]) -> FxHashMap<String, String> {
        let mut mappings = FxHashMap::default();
        for orm in orms {
            orm.field_mappings(content, &mut mappings);
        }
        mappings
    }

    /// Lowercased table names declared in the content.
    pub fn model_tables(content: &str, orms: &[&OrmDescriptor]) -> Vec<String> {
        let mut tables = Vec::new();
        for orm in orms {
            for table in orm.model_tables(content) {
                if !tables.contains(&table) {
                    tables.push(table);
                }
            }
        }
        tables
    }
}

pub(crate) fn compile_pattern(orm: &str, pattern: &str) -> Result<Regex, RegistryError> {
    Regex::new(pattern).map_err(|e| RegistryError::InvalidPattern {
        orm: orm.to_string(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn compile_def(def: &DescriptorDef) -> Result<OrmDescriptor, RegistryError> {
    let name = def.name;
    Ok(OrmDescriptor {
        name: name.to_string(),
        language: def.language,
        file_indicators: def
            .file_indicators
            .iter()
            .map(|p| compile_pattern(name, p))
            .collect::<Result<_, _>>()?,
        usage_patterns: def
            .usage
            .iter()
            .map(|u| {
                Ok(UsagePattern {
                    regex: compile_pattern(name, u.pattern)?,
                    usage: u.usage,
                    description: u.description.to_string(),
                })
            })
            .collect::<Result<_, RegistryError>>()?,
        model_patterns: def
            .models
            .iter()
            .map(|m| {
                Ok(ModelPattern {
                    regex: compile_pattern(name, m.pattern)?,
                    table_group: m.table_group,
                    description: m.description.to_string(),
                })
            })
            .collect::<Result<_, RegistryError>>()?,
        field_patterns: def
            .fields
            .iter()
            .map(|f| {
                Ok(FieldPattern {
                    regex: compile_pattern(name, f.pattern)?,
                    field_group: f.field_group,
                    column_group: f.column_group,
                    description: f.description.to_string(),
                })
            })
            .collect::<Result<_, RegistryError>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dblineage_core::types::UsageType;

    #[test]
    fn every_builtin_pattern_compiles() {
        for def in catalog::builtin() {
            compile_def(def).unwrap_or_else(|e| panic!("{}: {e}", def.name));
        }
        assert_eq!(OrmRegistry::builtin().len(), catalog::builtin().count());
    }

    #[test]
    fn builtin_catalog_covers_every_orm() {
        let registry = OrmRegistry::builtin();
        for name in [
            "Prisma",
            "Sequelize",
            "TypeORM",
            "Knex",
            "Drizzle",
            "SQLAlchemy",
            "Django",
            "GORM",
            "Hibernate",
            "ActiveRecord",
            "Diesel",
            "EntityFramework",
        ] {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn detection_crosses_javascript_and_typescript() {
        let registry = OrmRegistry::builtin();
        let content = "import { PrismaClient } from '@prisma/client'\nconst prisma = new PrismaClient()";
        let ts: Vec<_> = registry
            .detect(content, Language::TypeScript)
            .iter()
            .map(|d| d.name.clone())
            .collect();
        let js: Vec<_> = registry
            .detect(content, Language::JavaScript)
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(ts, vec!["Prisma".to_string()]);
        assert_eq!(js, ts);
        assert!(registry.detect(content, Language::Python).is_empty());
    }

    #[test]
    fn definition_patterns_are_skipped() {
        let registry = OrmRegistry::builtin();
        let sqlalchemy = registry.get("SQLAlchemy").unwrap();
        let line = "    email = Column(String, nullable=False)";
        assert_eq!(sqlalchemy.classify(line, line), None);
        let query = "users = session.query(User).filter(User.email == email).all()";
        assert_eq!(sqlalchemy.classify(query, query), Some(UsageType::Filter));
    }
}
