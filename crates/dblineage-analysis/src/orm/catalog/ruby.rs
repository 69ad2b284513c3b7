//! ActiveRecord.

use dblineage_core::types::Language;

use super::*;

pub(super) static DESCRIPTORS: &[DescriptorDef] = &[DescriptorDef {
    name: "ActiveRecord",
    language: Language::Ruby,
    file_indicators: &[
        r"ActiveRecord::Base",
        r"ApplicationRecord",
        r"ActiveRecord::Migration",
        r"has_many\s+:",
        r"belongs_to\s+:",
    ],
    usage: &[
        usage(r"\bt\.\w+\s+:", DEFINITION, "ActiveRecord migration column"),
        usage(r"\.create\s*\(|\.create!\s*\(|\.new\s*\(.*\.save", WRITE, "ActiveRecord create"),
        usage(
            r"\.update\s*\(|\.update!\s*\(|\.update_attribute",
            UPDATE,
            "ActiveRecord update",
        ),
        usage(
            r"\.destroy\s*\(|\.delete\s*\(|\.destroy_all",
            DELETE,
            "ActiveRecord destroy",
        ),
        usage(
            r"\.joins\s*\(|\.includes\s*\(|\.eager_load\s*\(|has_many|belongs_to|has_one",
            JOIN,
            "ActiveRecord joins/associations",
        ),
        usage(
            r"\.where\s*\(|\.find_by\s*\(|\.having\s*\(",
            FILTER,
            "ActiveRecord where",
        ),
        usage(r"\.select\s*\(|\.pluck\s*\(", PROJECTION, "ActiveRecord select/pluck"),
        usage(
            r"\.find\s*\(|\.all\b",
            READ,
            "ActiveRecord read",
        ),
    ],
    models: &[model(
        r#"self\.table_name\s*=\s*['"](\w+)['"]"#,
        1,
        "ActiveRecord table_name",
    )],
    fields: &[],
}];
