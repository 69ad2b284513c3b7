//! Built-in descriptor catalog.
//!
//! Usage patterns are listed write, update, delete, join, filter,
//! projection, then read, with definition markers first. The registry keeps
//! this order, so it is the classification precedence.

mod csharp;
mod go;
mod java;
mod javascript;
mod python;
mod ruby;
mod rust;

use dblineage_core::types::{Language, UsageType};

use super::descriptor::PatternUsage;

pub(crate) const DEFINITION: PatternUsage = PatternUsage::Definition;
pub(crate) const READ: PatternUsage = PatternUsage::Usage(UsageType::Read);
pub(crate) const WRITE: PatternUsage = PatternUsage::Usage(UsageType::Write);
pub(crate) const UPDATE: PatternUsage = PatternUsage::Usage(UsageType::Update);
pub(crate) const DELETE: PatternUsage = PatternUsage::Usage(UsageType::Delete);
pub(crate) const JOIN: PatternUsage = PatternUsage::Usage(UsageType::Join);
pub(crate) const FILTER: PatternUsage = PatternUsage::Usage(UsageType::Filter);
pub(crate) const PROJECTION: PatternUsage = PatternUsage::Usage(UsageType::Projection);

/// Uncompiled descriptor.
#[derive(Debug)]
pub struct DescriptorDef {
    pub name: &'static str,
    pub language: Language,
    pub file_indicators: &'static [&'static str],
    pub usage: &'static [UsageDef],
    pub models: &'static [ModelDef],
    pub fields: &'static [FieldDef],
}

#[derive(Debug)]
pub struct UsageDef {
    pub pattern: &'static str,
    pub usage: PatternUsage,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct ModelDef {
    pub pattern: &'static str,
    pub table_group: usize,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct FieldDef {
    pub pattern: &'static str,
    pub field_group: usize,
    pub column_group: usize,
    pub description: &'static str,
}

pub(crate) const fn usage(
    pattern: &'static str,
    usage: PatternUsage,
    description: &'static str,
) -> UsageDef {
    UsageDef {
        pattern,
        usage,
        description,
    }
}

pub(crate) const fn model(
    pattern: &'static str,
    table_group: usize,
    description: &'static str,
) -> ModelDef {
    ModelDef {
        pattern,
        table_group,
        description,
    }
}

pub(crate) const fn field(
    pattern: &'static str,
    field_group: usize,
    column_group: usize,
    description: &'static str,
) -> FieldDef {
    FieldDef {
        pattern,
        field_group,
        column_group,
        description,
    }
}

/// Every built-in descriptor, in registration order.
pub fn builtin() -> impl Iterator<Item = &'static DescriptorDef> {
    javascript::DESCRIPTORS
        .iter()
        .chain(python::DESCRIPTORS)
        .chain(go::DESCRIPTORS)
        .chain(java::DESCRIPTORS)
        .chain(ruby::DESCRIPTORS)
        .chain(rust::DESCRIPTORS)
        .chain(csharp::DESCRIPTORS)
}
